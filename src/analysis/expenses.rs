//! Operating-expense totals: the benchmark-normalized ("SCHL") figure a lender
//! would underwrite, and the actual figure the owner pays

use serde::{Deserialize, Serialize};

use crate::assumptions::ExpenseBenchmark;
use crate::property::PropertyInput;

/// Benchmark-driven lines of the normalized total
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkExpenses {
    pub maintenance: f64,
    pub management: f64,
    pub salaries: f64,
    pub replacement_reserve: f64,
    /// max(benchmark floor, itemized other costs)
    pub other_costs: f64,
}

/// Both operating-expense totals, vacancy excluded
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTotals {
    pub schl_operating: f64,
    pub actual_operating: f64,
    pub replacement_reserve: f64,
    /// Present only in advanced mode
    pub benchmark_lines: Option<BenchmarkExpenses>,
}

/// Expenses the benchmark cannot normalize: taxes, insurance, utilities
fn fixed_charges(property: &PropertyInput) -> f64 {
    let e = &property.expenses;
    e.taxes() + e.insurance + e.utilities()
}

/// Compute both totals for one property.
///
/// In simple mode the consolidated total serves as both figures. In advanced
/// mode the normalized total replaces the owner's maintenance, management and
/// concierge lines with benchmark figures, adds the replacement reserve, and
/// floors the itemized other costs at the benchmark rate.
pub fn compute_expenses(
    property: &PropertyInput,
    effective_revenue: f64,
    benchmark: Option<&ExpenseBenchmark>,
    advanced: bool,
) -> ExpenseTotals {
    let e = &property.expenses;
    let units = property.units() as f64;

    let replacement_reserve = benchmark
        .map(|b| b.replacement_reserve.annual_reserve(&property.equipment))
        .unwrap_or(0.0);

    let owner_operating = e.maintenance + e.management_rate * effective_revenue + e.concierge;

    if !advanced {
        let total = fixed_charges(property) + owner_operating + e.other;
        return ExpenseTotals {
            schl_operating: total,
            actual_operating: total,
            replacement_reserve,
            benchmark_lines: None,
        };
    }

    let itemized_other = property.advanced_expenses.total();

    let lines = match benchmark {
        Some(b) => BenchmarkExpenses {
            maintenance: b.maintenance * units,
            management: b.management_rate * effective_revenue,
            salaries: b.salaries * units,
            replacement_reserve,
            other_costs: (b.other_cost_rate * effective_revenue).max(itemized_other),
        },
        None => BenchmarkExpenses {
            other_costs: itemized_other,
            ..Default::default()
        },
    };

    let schl_operating = fixed_charges(property)
        + lines.maintenance
        + lines.management
        + lines.salaries
        + lines.replacement_reserve
        + lines.other_costs;

    let actual_operating = fixed_charges(property) + owner_operating + itemized_other + e.other;

    ExpenseTotals {
        schl_operating,
        actual_operating,
        replacement_reserve,
        benchmark_lines: Some(lines),
    }
}
