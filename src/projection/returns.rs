//! Multi-year holding-period returns with an IRR

use serde::{Deserialize, Serialize};

use super::engine::ScheduleLoan;
use super::irr::calculate_irr;
use crate::analysis::{safe_div, AnalysisResult};
use crate::property::PropertyInput;

/// Growth assumptions for a holding period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnAssumptions {
    pub years: u32,
    /// Annual growth of effective revenue
    pub revenue_growth: f64,
    /// Annual growth of actual operating expenses
    pub expense_growth: f64,
    /// Annual property appreciation, applied to the purchase price without compounding
    pub value_growth: f64,
}

impl Default for ReturnAssumptions {
    fn default() -> Self {
        Self {
            years: 5,
            revenue_growth: 0.02,
            expense_growth: 0.02,
            value_growth: 0.03,
        }
    }
}

/// A child scenario taking over the loan partway through the hold
#[derive(Debug, Clone, Copy)]
pub struct ScenarioSwitch<'a> {
    pub property: &'a PropertyInput,
    pub analysis: &'a AnalysisResult,
    /// Last month on the parent loan
    pub switch_month: u32,
    /// Cash taken out at the switch (refinancing); 0 otherwise
    pub equity_withdrawal: f64,
}

/// Projected returns; rates are percentages 0-100
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnProjection {
    pub years: u32,
    pub total_return: f64,
    pub annualized_return: f64,
    pub internal_rate_of_return: f64,
    /// Cash flows + debt reduction + appreciation
    pub value_generated: f64,
    pub cumulative_cash_flow: f64,
    /// Initial debt minus ending debt
    pub debt_reduction: f64,
    pub appreciation: f64,
    pub ending_balance: f64,
    pub ending_value: f64,
    pub net_sale_proceeds: f64,
    pub yearly_cash_flows: Vec<f64>,
    /// `[-investment, cf1, ..., cfN + net sale proceeds]`
    pub irr_cash_flows: Vec<f64>,
}

/// Operating base a year's cash flow grows from
struct CashFlowBase {
    cash_flow: f64,
    effective_revenue: f64,
    actual_expenses: f64,
}

impl CashFlowBase {
    fn from_analysis(analysis: &AnalysisResult) -> Self {
        Self {
            cash_flow: analysis.cash_flow,
            effective_revenue: analysis.effective_revenue,
            actual_expenses: analysis.actual_expenses,
        }
    }

    /// Annual cash flow after `elapsed` years of growth
    fn grown(&self, elapsed: u32, revenue_growth: f64, expense_growth: f64) -> f64 {
        let revenue_factor = (1.0 + revenue_growth).powf(elapsed as f64) - 1.0;
        let expense_factor = (1.0 + expense_growth).powf(elapsed as f64) - 1.0;
        self.cash_flow + self.effective_revenue * revenue_factor - self.actual_expenses * expense_factor
    }
}

/// Projects returns over a multi-year hold
#[derive(Debug, Clone, Default)]
pub struct MultiYearReturnProjector {
    assumptions: ReturnAssumptions,
}

impl MultiYearReturnProjector {
    pub fn new(assumptions: ReturnAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &ReturnAssumptions {
        &self.assumptions
    }

    /// Project the hold of an analyzed property, optionally switching to a child scenario
    pub fn project(
        &self,
        property: &PropertyInput,
        analysis: &AnalysisResult,
        child: Option<&ScenarioSwitch<'_>>,
    ) -> ReturnProjection {
        let a = &self.assumptions;
        if a.years == 0 {
            return ReturnProjection::default();
        }
        let months = a.years.saturating_mul(12);

        let parent_base = CashFlowBase::from_analysis(analysis);
        let child_base = child.map(|c| CashFlowBase::from_analysis(c.analysis));
        // Year holding the child's first month
        let child_start_year = child.map(|c| c.switch_month / 12 + 1);

        // Debt
        let mut loan = ScheduleLoan::from_analysis(property, analysis);
        let mut balance = loan.principal.max(0.0);
        for month in 1..=months {
            if let Some(c) = child {
                if month == c.switch_month.saturating_add(1) {
                    loan = ScheduleLoan::from_analysis(c.property, c.analysis);
                    balance = loan.principal.max(0.0);
                }
            }
            let interest = loan.interest_on(balance);
            let principal = (loan.monthly_payment - interest).min(balance).max(0.0);
            balance -= principal;
        }

        // Operating cash flow
        let mut yearly_cash_flows = Vec::with_capacity(a.years as usize);
        for year in 1..=a.years {
            let cash_flow = match (child, &child_base, child_start_year) {
                (Some(c), Some(base), Some(start)) if year >= start => {
                    let grown = base.grown(year - start, a.revenue_growth, a.expense_growth);
                    if year == start {
                        c.equity_withdrawal + grown
                    } else {
                        grown
                    }
                }
                _ => parent_base.grown(year - 1, a.revenue_growth, a.expense_growth),
            };
            yearly_cash_flows.push(cash_flow);
        }

        let price = property.purchase_price;
        let appreciation = (price * a.value_growth * a.years as f64).max(-price);
        let ending_value = price + appreciation;
        let debt_reduction = analysis.total_loan_amount - balance;
        let cumulative_cash_flow: f64 = yearly_cash_flows.iter().sum();
        let value_generated = cumulative_cash_flow + debt_reduction + appreciation;

        let investment = analysis.total_investment;
        let total = safe_div(value_generated, investment);
        let annualized = if 1.0 + total > 0.0 {
            (1.0 + total).powf(1.0 / a.years as f64) - 1.0
        } else {
            -1.0
        };

        let net_sale_proceeds = ending_value - balance;
        let mut irr_cash_flows = Vec::with_capacity(yearly_cash_flows.len() + 1);
        irr_cash_flows.push(-investment);
        irr_cash_flows.extend_from_slice(&yearly_cash_flows);
        if let Some(last) = irr_cash_flows.last_mut() {
            *last += net_sale_proceeds;
        }
        let irr = calculate_irr(&irr_cash_flows);

        ReturnProjection {
            years: a.years,
            total_return: total * 100.0,
            annualized_return: annualized * 100.0,
            internal_rate_of_return: irr * 100.0,
            value_generated,
            cumulative_cash_flow,
            debt_reduction,
            appreciation,
            ending_balance: balance,
            ending_value,
            net_sale_proceeds,
            yearly_cash_flows,
            irr_cash_flows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{monthly_rate, payment, remaining_balance};
    use crate::projection::irr::npv;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn unlevered() -> (PropertyInput, AnalysisResult) {
        let property = PropertyInput {
            purchase_price: 100_000.0,
            ..Default::default()
        };
        let analysis = AnalysisResult {
            cash_flow: 1_000.0,
            total_investment: 100_000.0,
            ..Default::default()
        };
        (property, analysis)
    }

    fn flat(years: u32, value_growth: f64) -> MultiYearReturnProjector {
        MultiYearReturnProjector::new(ReturnAssumptions {
            years,
            revenue_growth: 0.0,
            expense_growth: 0.0,
            value_growth,
        })
    }

    #[test]
    fn test_five_year_unlevered_hold() {
        let (property, analysis) = unlevered();
        let projection = flat(5, 0.03).project(&property, &analysis, None);

        // 5 x 1000 + 100000 x 3% x 5
        assert_abs_diff_eq!(projection.appreciation, 15_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(projection.ending_value, 115_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(projection.value_generated, 20_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(projection.total_return, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(projection.annualized_return, 3.71, epsilon = 5e-3);
        assert_abs_diff_eq!(projection.internal_rate_of_return, 3.78, epsilon = 5e-3);
        assert_eq!(projection.irr_cash_flows[5], 116_000.0);
        assert!(npv(&projection.irr_cash_flows, projection.internal_rate_of_return / 100.0).abs() < 1e-6);
        assert_eq!(projection.irr_cash_flows.len(), 6);
    }

    #[test]
    fn test_appreciation_is_linear_and_floored() {
        let (property, analysis) = unlevered();

        let ten_years = flat(10, 0.05).project(&property, &analysis, None);
        assert_abs_diff_eq!(ten_years.appreciation, 50_000.0, epsilon = 1e-9);

        let collapse = flat(4, -0.5).project(&property, &analysis, None);
        assert_eq!(collapse.ending_value, 0.0);
        assert_eq!(collapse.appreciation, -100_000.0);
    }

    #[test]
    fn test_zero_years() {
        let (property, analysis) = unlevered();
        assert_eq!(flat(0, 0.03).project(&property, &analysis, None), ReturnProjection::default());
    }

    #[test]
    fn test_growth_applies_from_year_two() {
        let (property, mut analysis) = unlevered();
        analysis.effective_revenue = 20_000.0;
        analysis.actual_expenses = 19_000.0;
        let projector = MultiYearReturnProjector::new(ReturnAssumptions {
            years: 3,
            revenue_growth: 0.10,
            expense_growth: 0.0,
            value_growth: 0.0,
        });
        let projection = projector.project(&property, &analysis, None);

        assert_relative_eq!(projection.yearly_cash_flows[0], 1_000.0);
        assert_relative_eq!(projection.yearly_cash_flows[1], 3_000.0, max_relative = 1e-9);
        assert_relative_eq!(projection.yearly_cash_flows[2], 5_200.0, max_relative = 1e-9);
    }

    #[test]
    fn test_levered_debt_reduction_matches_closed_form() {
        let mut property = PropertyInput {
            purchase_price: 500_000.0,
            ..Default::default()
        };
        property.financing.interest_rate = 0.05;
        property.financing.amortization_years = 25;
        let r = monthly_rate(0.05);
        let analysis = AnalysisResult {
            total_loan_amount: 400_000.0,
            monthly_payment: payment(400_000.0, r, 300),
            cash_flow: 5_000.0,
            total_investment: 120_000.0,
            ..Default::default()
        };

        let projection = flat(5, 0.0).project(&property, &analysis, None);
        let expected = remaining_balance(400_000.0, r, 300, 60);

        assert_relative_eq!(projection.ending_balance, expected, max_relative = 1e-9);
        assert_relative_eq!(projection.debt_reduction, 400_000.0 - expected, max_relative = 1e-9);
        assert_relative_eq!(projection.net_sale_proceeds, 500_000.0 - expected, max_relative = 1e-9);
    }

    #[test]
    fn test_never_recovered_investment_has_zero_irr() {
        let (property, mut analysis) = unlevered();
        analysis.cash_flow = -5_000.0;
        let projection = flat(3, -1.0).project(&property, &analysis, None);
        assert_eq!(projection.internal_rate_of_return, 0.0);
    }

    #[test]
    fn test_child_switch_adds_withdrawal() {
        let (property, analysis) = unlevered();
        let child_analysis = AnalysisResult {
            cash_flow: 2_000.0,
            ..Default::default()
        };
        let switch = ScenarioSwitch {
            property: &property,
            analysis: &child_analysis,
            switch_month: 24,
            equity_withdrawal: 10_000.0,
        };
        let projection = flat(4, 0.0).project(&property, &analysis, Some(&switch));

        assert_eq!(projection.yearly_cash_flows, vec![1_000.0, 1_000.0, 12_000.0, 2_000.0]);
    }
}
