//! Rental Analysis CLI
//!
//! Command-line interface for analyzing a property, its amortization
//! schedule, multi-year returns, and scenario trees

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use rental_analysis::analysis::{AnalysisOptions, AnalysisResult, RentabilityCalculator};
use rental_analysis::projection::{AmortizationScheduler, MultiYearReturnProjector, ReturnAssumptions};
use rental_analysis::property::load_property_json;
use rental_analysis::scenario::{load_scenarios, ScenarioRunner};
use rental_analysis::{Assumptions, PropertyInput};

#[derive(Parser)]
#[command(
    name = "rental_analysis",
    version,
    about = "Profitability and financing analysis of rental properties"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit JSON instead of a text summary
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding revised reference tables (expense_benchmarks.csv)
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one property
    Analyze(AnalyzeArgs),
    /// Print or export the amortization schedule of a property's loan
    Schedule(ScheduleArgs),
    /// Project multi-year returns and the IRR
    Project(ProjectArgs),
    /// Resolve a scenario tree off a property
    Scenarios(ScenariosArgs),
}

#[derive(Args)]
struct PropertyArgs {
    /// Property JSON file (raw form record)
    property: PathBuf,

    /// Use advanced expense mode
    #[arg(long)]
    advanced: bool,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    input: PropertyArgs,

    /// Principal already insured by a prior loan
    #[arg(long, default_value_t = 0.0)]
    initial_loan: f64,
}

#[derive(Args)]
struct ScheduleArgs {
    #[command(flatten)]
    input: PropertyArgs,

    /// Annual property appreciation (fraction)
    #[arg(long, default_value_t = 0.03)]
    appreciation: f64,

    /// Write the full schedule to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct ProjectArgs {
    #[command(flatten)]
    input: PropertyArgs,

    #[arg(long, default_value_t = 5)]
    years: u32,

    #[arg(long, default_value_t = 0.02)]
    revenue_growth: f64,

    #[arg(long, default_value_t = 0.02)]
    expense_growth: f64,

    #[arg(long, default_value_t = 0.03)]
    value_growth: f64,
}

#[derive(Args)]
struct ScenariosArgs {
    #[command(flatten)]
    input: PropertyArgs,

    /// Scenario list JSON file
    scenarios: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let assumptions = match &cli.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => Assumptions::default_tables(),
    };

    match cli.command {
        Commands::Analyze(args) => run_analyze(args, assumptions, cli.json),
        Commands::Schedule(args) => run_schedule(args, assumptions, cli.json),
        Commands::Project(args) => run_project(args, assumptions, cli.json),
        Commands::Scenarios(args) => run_scenarios(args, assumptions, cli.json),
    }
}

fn load_property(path: &Path) -> Result<PropertyInput> {
    load_property_json(path).with_context(|| format!("reading property {}", path.display()))
}

fn options(input: &PropertyArgs) -> AnalysisOptions {
    if input.advanced {
        AnalysisOptions::advanced()
    } else {
        AnalysisOptions::simple()
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_analyze(args: AnalyzeArgs, assumptions: Assumptions, json: bool) -> Result<()> {
    let property = load_property(&args.input.property)?;
    let options = options(&args.input).with_initial_loan_amount(args.initial_loan);
    let result = RentabilityCalculator::new(assumptions).analyze(&property, &options);

    if json {
        return print_json(&result);
    }
    print_analysis(&property, &result);
    Ok(())
}

fn run_schedule(args: ScheduleArgs, assumptions: Assumptions, json: bool) -> Result<()> {
    let property = load_property(&args.input.property)?;
    let analysis = RentabilityCalculator::new(assumptions).analyze(&property, &options(&args.input));
    let schedule = AmortizationScheduler::from_analysis(&property, &analysis)
        .with_appreciation(args.appreciation)
        .build();

    if let Some(path) = &args.csv {
        schedule
            .write_csv_path(path)
            .with_context(|| format!("writing schedule to {}", path.display()))?;
        println!("Schedule written to {}", path.display());
    }

    if json {
        return print_json(&schedule.summary());
    }

    println!("{:>5} {:>14} {:>12} {:>12} {:>14} {:>14}", "Year", "Balance", "Interest", "Principal", "Value", "Equity");
    println!("{}", "-".repeat(76));
    let mut interest = 0.0;
    let mut principal = 0.0;
    for row in &schedule.rows {
        interest += row.interest;
        principal += row.principal;
        if row.period % 12 == 0 || row.period as usize == schedule.rows.len() {
            println!(
                "{:>5} {:>14.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2}",
                row.year, row.balance, interest, principal, row.property_value, row.equity
            );
            interest = 0.0;
            principal = 0.0;
        }
    }

    let summary = schedule.summary();
    println!("\nTotal interest: ${:.2} over {} months", summary.total_interest, summary.total_months);
    Ok(())
}

fn run_project(args: ProjectArgs, assumptions: Assumptions, json: bool) -> Result<()> {
    let property = load_property(&args.input.property)?;
    let analysis = RentabilityCalculator::new(assumptions).analyze(&property, &options(&args.input));
    let projector = MultiYearReturnProjector::new(ReturnAssumptions {
        years: args.years,
        revenue_growth: args.revenue_growth,
        expense_growth: args.expense_growth,
        value_growth: args.value_growth,
    });
    let projection = projector.project(&property, &analysis, None);

    if json {
        return print_json(&projection);
    }

    println!("{}-year hold", projection.years);
    for (year, cash_flow) in projection.yearly_cash_flows.iter().enumerate() {
        println!("  Year {:>2}: cash flow ${:.2}", year + 1, cash_flow);
    }
    println!("  Debt reduction:    ${:.2}", projection.debt_reduction);
    println!("  Appreciation:      ${:.2}", projection.appreciation);
    println!("  Net sale proceeds: ${:.2}", projection.net_sale_proceeds);
    println!("  Total return:      {:.2}%", projection.total_return);
    println!("  Annualized return: {:.2}%", projection.annualized_return);
    println!("  IRR:               {:.2}%", projection.internal_rate_of_return);
    Ok(())
}

fn run_scenarios(args: ScenariosArgs, assumptions: Assumptions, json: bool) -> Result<()> {
    let property = load_property(&args.input.property)?;
    let scenarios = load_scenarios(&args.scenarios)
        .with_context(|| format!("reading scenarios {}", args.scenarios.display()))?;

    let runner = ScenarioRunner::with_assumptions(property, assumptions).advanced(args.input.advanced);
    let resolved = runner.resolve(&scenarios).context("resolving scenario tree")?;

    if json {
        return print_json(&resolved);
    }

    println!(
        "{:<20} {:<18} {:>14} {:>12} {:>12} {:>14}",
        "Scenario", "Type", "Loan", "Payment", "Cash flow", "Withdrawal"
    );
    println!("{}", "-".repeat(95));
    for entry in resolved.iter() {
        let analysis = &entry.derived.analysis;
        let withdrawal = entry
            .derived
            .equity_withdrawal
            .map(|w| format!("{:.2}", w))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:<18} {:>14.2} {:>12.2} {:>12.2} {:>14}{}",
            entry.scenario.name,
            format!("{:?}", entry.scenario.kind()),
            analysis.total_loan_amount,
            analysis.monthly_payment,
            analysis.cash_flow,
            withdrawal,
            if entry.derived.is_viable() { "" } else { "  NOT VIABLE" },
        );
    }
    Ok(())
}

fn print_analysis(property: &PropertyInput, r: &AnalysisResult) {
    println!("{}", property.name.as_deref().unwrap_or("Property"));
    println!("  Price:               ${:.2} ({} units, ${:.2}/door)", property.purchase_price, property.units(), r.price_per_door);
    println!();
    println!("  Gross revenue:       ${:.2}", r.gross_revenue);
    println!("  Vacancy:             ${:.2}", r.vacancy_amount);
    println!("  Benchmark expenses:  ${:.2}", r.total_expenses);
    println!("  Actual expenses:     ${:.2}", r.total_actual_expenses);
    println!("  NOI (benchmark):     ${:.2}", r.net_operating_income);
    println!("  Net income (actual): ${:.2}", r.effective_net_income);
    println!();
    println!("  Max loan:            ${:.2} (debt service ${:.2}, LTV ${:.2})", r.max_loan_amount, r.loan_by_debt_service, r.loan_by_ltv);
    println!("  Insurance premium:   ${:.2}", r.insurance_premium);
    println!("  Total loan:          ${:.2}", r.total_loan_amount);
    println!("  Economic value:      ${:.2}", r.economic_value);
    println!("  Monthly payment:     ${:.2}", r.monthly_payment);
    println!("  Cash flow:           ${:.2}/yr (${:.2}/mo)", r.cash_flow, r.monthly_cash_flow());
    println!();
    println!("  Down payment:        ${:.2}", r.down_payment);
    println!("  Acquisition costs:   ${:.2}", r.acquisition_costs);
    println!("  Total investment:    ${:.2}", r.total_investment);
    println!();
    println!("  Cap rate:            {:.2}%", r.cap_rate);
    println!("  Cash-on-cash:        {:.2}%", r.cash_on_cash_return);
    println!("  DSCR:                {:.2}", r.debt_coverage_ratio);
    println!("  LTV:                 {:.2}%", r.loan_to_value);
    println!("  Year-1 return:       {:.2}%", r.total_return);
}
