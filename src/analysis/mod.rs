//! Single-property rentability analysis

mod engine;
mod expenses;
pub mod mortgage;
mod result;

pub use engine::{AnalysisOptions, RentabilityCalculator};
pub use expenses::{compute_expenses, BenchmarkExpenses, ExpenseTotals};
pub use mortgage::{
    interest_only_payment, loan_months, monthly_rate, payment, present_value, principal_paid,
    remaining_balance, safe_div, MAX_LOAN_YEARS,
};
pub use result::AnalysisResult;
