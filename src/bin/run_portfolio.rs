//! Analyze a whole portfolio of properties from a CSV of raw form records
//!
//! Usage: run_portfolio [portfolio.csv] [output.csv]
//!
//! Environment:
//!   ADVANCED_EXPENSES  use advanced expense mode when set to 1/true
//!   PROJECTION_YEARS   hold period for the return projection (default 5)
//!   REVENUE_GROWTH, EXPENSE_GROWTH, VALUE_GROWTH  annual fractions

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use rental_analysis::projection::{MultiYearReturnProjector, ReturnAssumptions};
use rental_analysis::property::load_properties;
use rental_analysis::{AnalysisOptions, Assumptions, RentabilityCalculator};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioRow {
    name: String,
    purchase_price: f64,
    units: u32,
    effective_revenue: f64,
    net_operating_income: f64,
    total_loan_amount: f64,
    insurance_premium: f64,
    monthly_payment: f64,
    cash_flow: f64,
    total_investment: f64,
    cap_rate: f64,
    cash_on_cash_return: f64,
    debt_coverage_ratio: f64,
    total_return: f64,
    projected_irr: f64,
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    matches!(
        env::var(key).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input_path = args.get(1).map(String::as_str).unwrap_or("data/sample_portfolio.csv");
    let output_path = args.get(2).map(String::as_str).unwrap_or("portfolio_analysis.csv");

    let options = if env_flag("ADVANCED_EXPENSES") {
        AnalysisOptions::advanced()
    } else {
        AnalysisOptions::simple()
    };
    let defaults = ReturnAssumptions::default();
    let return_assumptions = ReturnAssumptions {
        years: env::var("PROJECTION_YEARS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.years),
        revenue_growth: env_f64("REVENUE_GROWTH", defaults.revenue_growth),
        expense_growth: env_f64("EXPENSE_GROWTH", defaults.expense_growth),
        value_growth: env_f64("VALUE_GROWTH", defaults.value_growth),
    };

    let start = Instant::now();
    println!("Loading properties from {}...", input_path);
    let properties =
        load_properties(input_path).with_context(|| format!("loading {}", input_path))?;
    println!("Loaded {} properties in {:?}", properties.len(), start.elapsed());

    let assumptions = Assumptions::from_csv().unwrap_or_else(|e| {
        log::warn!("Using built-in reference tables ({})", e);
        Assumptions::default_tables()
    });
    let calculator = RentabilityCalculator::new(assumptions);
    let projector = MultiYearReturnProjector::new(return_assumptions);

    println!("Analyzing...");
    let run_start = Instant::now();

    let rows: Vec<PortfolioRow> = properties
        .par_iter()
        .enumerate()
        .map(|(i, property)| {
            let result = calculator.analyze(property, &options);
            let projection = projector.project(property, &result, None);
            PortfolioRow {
                name: property.name.clone().unwrap_or_else(|| format!("property-{}", i + 1)),
                purchase_price: property.purchase_price,
                units: property.units(),
                effective_revenue: result.effective_revenue,
                net_operating_income: result.net_operating_income,
                total_loan_amount: result.total_loan_amount,
                insurance_premium: result.insurance_premium,
                monthly_payment: result.monthly_payment,
                cash_flow: result.cash_flow,
                total_investment: result.total_investment,
                cap_rate: result.cap_rate,
                cash_on_cash_return: result.cash_on_cash_return,
                debt_coverage_ratio: result.debt_coverage_ratio,
                total_return: result.total_return,
                projected_irr: projection.internal_rate_of_return,
            }
        })
        .collect();

    println!("Analysis complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {}", output_path))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", output_path);

    let total_price: f64 = rows.iter().map(|r| r.purchase_price).sum();
    let total_loans: f64 = rows.iter().map(|r| r.total_loan_amount).sum();
    let total_cash_flow: f64 = rows.iter().map(|r| r.cash_flow).sum();
    let negative = rows.iter().filter(|r| r.cash_flow < 0.0).count();

    println!("\nPortfolio Summary:");
    println!("  Properties:      {}", rows.len());
    println!("  Total price:     ${:.0}", total_price);
    println!("  Total loans:     ${:.0}", total_loans);
    println!("  Annual cash flow: ${:.0}", total_cash_flow);
    println!("  Negative cash flow: {}", negative);
    for row in &rows {
        println!(
            "  {:<24} cap {:>6.2}%  CoC {:>7.2}%  DSCR {:>5.2}  IRR {:>6.2}%",
            row.name, row.cap_rate, row.cash_on_cash_return, row.debt_coverage_ratio, row.projected_irr
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
