//! Output record of a single rentability analysis

use serde::{Deserialize, Serialize};

use super::expenses::BenchmarkExpenses;
use super::mortgage::safe_div;
use crate::assumptions::PremiumQuote;

/// Snapshot of one property analysis.
///
/// Monetary fields are annual unless prefixed `monthly_`. Fields ending in
/// `_pct` (and the ratio fields) are percentages 0-100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    // Revenue
    pub gross_revenue: f64,
    pub vacancy_amount: f64,
    pub effective_revenue: f64,

    // Expenses
    /// Benchmark-normalized operating expenses, vacancy excluded
    pub schl_expenses: f64,
    /// Actual operating expenses, vacancy excluded
    pub actual_expenses: f64,
    /// Benchmark operating expenses + vacancy
    pub total_expenses: f64,
    /// Actual operating expenses + vacancy
    pub total_actual_expenses: f64,
    pub replacement_reserve: f64,
    pub benchmark_found: bool,
    pub benchmark_lines: Option<BenchmarkExpenses>,

    // Income
    /// Benchmark-based NOI
    pub net_operating_income: f64,
    /// Actual income before debt service; drives cash flow
    pub effective_net_income: f64,

    // Financing
    pub loan_by_debt_service: f64,
    pub loan_by_ltv: f64,
    pub max_loan_amount: f64,
    /// LTV ceiling applied to the loan (fraction)
    pub ltv_ceiling: f64,
    pub economic_value: f64,
    pub insurance: PremiumQuote,
    pub insurance_premium: f64,
    pub total_loan_amount: f64,
    pub monthly_payment: f64,
    pub annual_debt_service: f64,
    pub cash_flow: f64,

    // Investment
    pub down_payment: f64,
    pub land_transfer_tax: f64,
    pub acquisition_costs: f64,
    pub total_investment: f64,
    pub price_per_door: f64,

    // Ratios (percent)
    pub cap_rate: f64,
    pub cash_on_cash_return: f64,
    /// Effective net income / annual debt service (a ratio, not a percent)
    pub debt_coverage_ratio: f64,
    pub loan_to_value: f64,

    // Year-1 returns
    pub loan_paydown_year1: f64,
    pub appreciation_year1: f64,
    pub value_generated_year1: f64,
    pub loan_paydown_return: f64,
    pub appreciation_return: f64,
    pub total_return: f64,
}

impl AnalysisResult {
    /// Monthly cash flow
    pub fn monthly_cash_flow(&self) -> f64 {
        self.cash_flow / 12.0
    }

    /// True when the actual income covers the debt service
    pub fn is_cash_flow_positive(&self) -> bool {
        self.cash_flow >= 0.0
    }

    /// Recompute everything downstream of the monthly payment.
    ///
    /// Expects `effective_net_income`, `monthly_payment`, `total_investment`,
    /// `loan_paydown_year1` and `appreciation_year1` to be set.
    pub(crate) fn refresh_returns(&mut self) {
        self.annual_debt_service = self.monthly_payment * 12.0;
        self.cash_flow = self.effective_net_income - self.annual_debt_service;

        self.cash_on_cash_return = safe_div(self.cash_flow, self.total_investment) * 100.0;
        self.debt_coverage_ratio = safe_div(self.effective_net_income, self.annual_debt_service);

        self.value_generated_year1 =
            self.cash_flow + self.loan_paydown_year1 + self.appreciation_year1;
        self.loan_paydown_return = safe_div(self.loan_paydown_year1, self.total_investment) * 100.0;
        self.appreciation_return = safe_div(self.appreciation_year1, self.total_investment) * 100.0;
        self.total_return = safe_div(self.value_generated_year1, self.total_investment) * 100.0;
    }
}
