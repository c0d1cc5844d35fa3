//! Synthetic property records for derived scenarios
//!
//! Each builder names every field of the record it produces, so it is explicit
//! which fields are inherited from the base, which are grown, and which are
//! dropped.

use super::{OptimizationParams, RefinancingParams, RenewalParams, ScenarioFees};
use crate::property::{AcquisitionCosts, PropertyInput};

fn growth_factor(rate: f64, years: u32) -> f64 {
    (1.0 + rate).powf(years as f64)
}

/// Fees carried as acquisition costs that count in both expense modes
fn fee_costs(fees: &ScenarioFees) -> AcquisitionCosts {
    AcquisitionCosts {
        notary_fees: fees.legal,
        other_costs: fees.appraisal + fees.prepayment_penalty + fees.other,
        ..Default::default()
    }
}

/// Market value: the appraisal when given, else the appreciated base price
fn market_value(base: &PropertyInput, appraisal: Option<f64>, rate: f64, years: u32) -> f64 {
    appraisal.unwrap_or_else(|| base.purchase_price * growth_factor(rate, years))
}

/// Property to refinance `years_elapsed` after the base.
///
/// Inherits identity, physical data and equipment. Grows revenue and
/// expenses. Replaces the price with the market value. Drops the original
/// acquisition costs in favour of the scenario fees.
pub fn refinancing_property(base: &PropertyInput, params: &RefinancingParams) -> PropertyInput {
    let years = params.years_elapsed;
    let revenue_factor = growth_factor(params.revenue_growth, years);
    let expense_factor = growth_factor(params.expense_growth, years);

    PropertyInput {
        name: base.name.clone(),
        purchase_price: market_value(base, params.market_value, params.appreciation_rate, years),
        number_of_units: base.number_of_units,
        province: base.province,
        structure_type: base.structure_type,
        is_initial_purchase: false,
        revenue: base.revenue.scaled(revenue_factor),
        expenses: base.expenses.scaled(expense_factor),
        advanced_expenses: base.advanced_expenses.scaled(expense_factor),
        equipment: base.equipment,
        financing: params.financing.apply(&base.financing),
        acquisition: fee_costs(&params.fees),
    }
}

/// Property at renewal, `term_years` after the base.
///
/// The amortization is replaced by what remains on the parent loan. Growth
/// rates default to 0, leaving the operating figures unchanged.
pub fn renewal_property(
    base: &PropertyInput,
    params: &RenewalParams,
    term_years: u32,
    remaining_amortization_years: u32,
) -> PropertyInput {
    let revenue_factor = growth_factor(params.revenue_growth, term_years);
    let expense_factor = growth_factor(params.expense_growth, term_years);

    let mut financing = params.financing.apply(&base.financing);
    financing.amortization_years = remaining_amortization_years;

    PropertyInput {
        name: base.name.clone(),
        purchase_price: base.purchase_price * growth_factor(params.appreciation_rate, term_years),
        number_of_units: base.number_of_units,
        province: base.province,
        structure_type: base.structure_type,
        is_initial_purchase: false,
        revenue: base.revenue.scaled(revenue_factor),
        expenses: base.expenses.scaled(expense_factor),
        advanced_expenses: base.advanced_expenses.scaled(expense_factor),
        equipment: base.equipment,
        financing,
        acquisition: AcquisitionCosts::default(),
    }
}

/// Property with replacement operating figures.
///
/// Overridden revenue and expense blocks replace the base's outright, without
/// growth; blocks not overridden are inherited as they are.
pub fn optimization_property(base: &PropertyInput, params: &OptimizationParams) -> PropertyInput {
    PropertyInput {
        name: base.name.clone(),
        purchase_price: market_value(
            base,
            params.market_value,
            params.appreciation_rate,
            params.years_elapsed,
        ),
        number_of_units: base.number_of_units,
        province: base.province,
        structure_type: base.structure_type,
        is_initial_purchase: false,
        revenue: params.revenue.clone().unwrap_or_else(|| base.revenue.clone()),
        expenses: params.expenses.clone().unwrap_or_else(|| base.expenses.clone()),
        advanced_expenses: params
            .advanced_expenses
            .clone()
            .unwrap_or_else(|| base.advanced_expenses.clone()),
        equipment: base.equipment,
        financing: params.financing.apply(&base.financing),
        acquisition: fee_costs(&params.fees),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{ExpenseInput, Province, RevenueInput};
    use crate::scenario::FinancingOverrides;
    use approx::assert_relative_eq;

    fn base() -> PropertyInput {
        let mut p = PropertyInput {
            name: Some("Triplex".to_string()),
            purchase_price: 600_000.0,
            number_of_units: 3,
            province: Some(Province::Quebec),
            revenue: RevenueInput {
                annual_rent: 45_000.0,
                vacancy_rate: 0.03,
                ..Default::default()
            },
            expenses: ExpenseInput {
                municipal_taxes: 5_000.0,
                management_rate: 0.04,
                ..Default::default()
            },
            ..Default::default()
        };
        p.acquisition.notary_fees = 2_000.0;
        p.financing.interest_rate = 0.05;
        p
    }

    #[test]
    fn test_refinancing_grows_and_strips() {
        let params = RefinancingParams {
            years_elapsed: 5,
            revenue_growth: 0.02,
            expense_growth: 0.03,
            appreciation_rate: 0.04,
            fees: ScenarioFees {
                appraisal: 500.0,
                legal: 1_000.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let p = refinancing_property(&base(), &params);

        assert!(!p.is_initial_purchase);
        assert_relative_eq!(p.purchase_price, 600_000.0 * 1.04_f64.powi(5), max_relative = 1e-12);
        assert_relative_eq!(p.revenue.annual_rent, 45_000.0 * 1.02_f64.powi(5), max_relative = 1e-12);
        assert_eq!(p.revenue.vacancy_rate, 0.03);
        assert_relative_eq!(p.expenses.municipal_taxes, 5_000.0 * 1.03_f64.powi(5), max_relative = 1e-12);
        assert_eq!(p.expenses.management_rate, 0.04);
        assert_eq!(p.acquisition.simple_total(), 1_500.0);
        assert_eq!(p.acquisition.advanced_total(), 1_500.0);
        assert_eq!(p.name.as_deref(), Some("Triplex"));
    }

    #[test]
    fn test_refinancing_uses_appraisal() {
        let params = RefinancingParams {
            years_elapsed: 5,
            appreciation_rate: 0.04,
            market_value: Some(750_000.0),
            ..Default::default()
        };
        assert_eq!(refinancing_property(&base(), &params).purchase_price, 750_000.0);
    }

    #[test]
    fn test_renewal_sets_remaining_amortization() {
        let params = RenewalParams {
            financing: FinancingOverrides {
                interest_rate: Some(0.06),
                ..Default::default()
            },
            ..Default::default()
        };
        let p = renewal_property(&base(), &params, 5, 20);

        assert_eq!(p.financing.amortization_years, 20);
        assert_eq!(p.financing.interest_rate, 0.06);
        assert_eq!(p.purchase_price, 600_000.0);
        assert_eq!(p.revenue, base().revenue);
        assert_eq!(p.acquisition, AcquisitionCosts::default());
    }

    #[test]
    fn test_optimization_overrides_without_growth() {
        let params = OptimizationParams {
            years_elapsed: 3,
            revenue: Some(RevenueInput {
                annual_rent: 52_000.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let p = optimization_property(&base(), &params);

        assert_eq!(p.revenue.annual_rent, 52_000.0);
        assert_eq!(p.revenue.vacancy_rate, 0.0);
        assert_eq!(p.expenses, base().expenses);
        assert_eq!(p.purchase_price, 600_000.0);
    }
}
