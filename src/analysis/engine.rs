//! Rentability calculator: one property record in, one full analysis out
//!
//! The calculation is total. Missing or malformed inputs have already been
//! coerced to 0 at the property boundary, and every ratio guards its
//! denominator, so `analyze` never fails.

use log::debug;

use super::expenses::compute_expenses;
use super::mortgage::{
    interest_only_payment, loan_months, monthly_rate, payment, present_value, principal_paid,
    safe_div, MAX_LOAN_YEARS,
};
use super::result::AnalysisResult;
use crate::assumptions::{Assumptions, PremiumRequest};
use crate::property::{FinancingType, PropertyInput};

/// Caller-controlled switches for one analysis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalysisOptions {
    /// Use the granular expense fields and the benchmark-normalized total
    pub advanced_expenses: bool,
    /// Principal already insured by a parent scenario
    pub initial_loan_amount: f64,
    /// Size the loan on debt service alone, without the purchase-price LTV cap
    pub ignore_ltv: bool,
}

impl AnalysisOptions {
    pub fn simple() -> Self {
        Self::default()
    }

    pub fn advanced() -> Self {
        Self {
            advanced_expenses: true,
            ..Self::default()
        }
    }

    pub fn with_initial_loan_amount(mut self, amount: f64) -> Self {
        self.initial_loan_amount = amount.max(0.0);
        self
    }

    pub fn ignoring_ltv(mut self) -> Self {
        self.ignore_ltv = true;
        self
    }
}

/// Loan amounts produced by the two sizing constraints
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct LoanSizing {
    by_debt_service: f64,
    by_ltv: f64,
    max_loan: f64,
    ltv_ceiling: f64,
}

/// Profitability and financeability analysis of a rental property
#[derive(Debug, Clone, Default)]
pub struct RentabilityCalculator {
    assumptions: Assumptions,
}

impl RentabilityCalculator {
    /// Create a calculator over the given reference tables
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Run the full analysis for one property
    pub fn analyze(&self, property: &PropertyInput, options: &AnalysisOptions) -> AnalysisResult {
        let financing = &property.financing;
        let price = property.purchase_price;
        let units = property.units();

        // Revenue
        let gross_revenue = property.revenue.gross();
        let vacancy_amount = gross_revenue * property.revenue.vacancy_rate;
        let effective_revenue = gross_revenue - vacancy_amount;

        // Expenses
        let benchmark =
            self.assumptions
                .benchmarks
                .lookup(property.province, property.structure_type, units);
        if benchmark.is_none() {
            debug!(
                "No expense benchmark for {:?} {:?} with {} units",
                property.province, property.structure_type, units
            );
        }
        let totals = compute_expenses(
            property,
            effective_revenue,
            benchmark,
            options.advanced_expenses,
        );
        let total_expenses = totals.schl_operating + vacancy_amount;
        let total_actual_expenses = totals.actual_operating + vacancy_amount;
        let net_operating_income = gross_revenue - total_expenses;
        let effective_net_income = gross_revenue - total_actual_expenses;

        // Loan
        let sizing = self.size_loan(property, net_operating_income, options.ignore_ltv);
        let max_loan_amount = sizing.max_loan;
        let economic_value = safe_div(max_loan_amount, sizing.ltv_ceiling).max(0.0);

        let insurance = self.assumptions.insurance.quote(&PremiumRequest {
            financing_type: financing.financing_type,
            loan_amount: max_loan_amount,
            property_value: price,
            amortization_years: financing.amortization_years.min(MAX_LOAN_YEARS),
            aph_points: financing.aph_points,
            initial_loan_amount: options.initial_loan_amount,
            units,
        });
        let total_loan_amount = max_loan_amount + insurance.premium;

        let is_private = financing.financing_type == FinancingType::Private;
        let contract_rate = monthly_rate(financing.interest_rate);
        let months = loan_months(financing.amortization_years);
        let monthly_payment = if is_private {
            interest_only_payment(total_loan_amount, financing.interest_rate)
        } else {
            payment(total_loan_amount, contract_rate, months)
        };

        // Acquisition
        let mode_costs = if options.advanced_expenses {
            property.acquisition.advanced_total()
        } else {
            property.acquisition.simple_total()
        };
        let land_transfer_tax = if property.is_initial_purchase {
            property
                .acquisition
                .welcome_tax_override
                .unwrap_or_else(|| self.assumptions.transfer_tax.compute(price))
        } else {
            0.0
        };
        let origination_fee = max_loan_amount * financing.origination_fee_rate;
        let acquisition_costs = mode_costs
            + land_transfer_tax
            + insurance.premium_tax
            + insurance.analysis_fee
            + origination_fee;

        let down_payment = price - max_loan_amount;
        let total_investment = down_payment + acquisition_costs;

        // Year-1 figures
        let loan_paydown_year1 = if is_private {
            0.0
        } else {
            principal_paid(total_loan_amount, contract_rate, monthly_payment, 12)
        };
        let appreciation_year1 = price * self.assumptions.year_one_appreciation;

        let mut result = AnalysisResult {
            gross_revenue,
            vacancy_amount,
            effective_revenue,
            schl_expenses: totals.schl_operating,
            actual_expenses: totals.actual_operating,
            total_expenses,
            total_actual_expenses,
            replacement_reserve: totals.replacement_reserve,
            benchmark_found: benchmark.is_some(),
            benchmark_lines: totals.benchmark_lines,
            net_operating_income,
            effective_net_income,
            loan_by_debt_service: sizing.by_debt_service,
            loan_by_ltv: sizing.by_ltv,
            max_loan_amount,
            ltv_ceiling: sizing.ltv_ceiling,
            economic_value,
            insurance_premium: insurance.premium,
            insurance,
            total_loan_amount,
            monthly_payment,
            down_payment,
            land_transfer_tax,
            acquisition_costs,
            total_investment,
            price_per_door: price / units as f64,
            cap_rate: safe_div(net_operating_income, price) * 100.0,
            loan_to_value: safe_div(max_loan_amount, price) * 100.0,
            loan_paydown_year1,
            appreciation_year1,
            ..Default::default()
        };
        result.refresh_returns();
        result
    }

    /// Maximum loan under the debt-service and LTV constraints.
    ///
    /// Private loans skip debt-service sizing: the loan is the user's LTV
    /// applied to the price.
    fn size_loan(&self, property: &PropertyInput, noi: f64, ignore_ltv: bool) -> LoanSizing {
        let financing = &property.financing;
        let price = property.purchase_price;
        let ltv_ceiling = self.assumptions.insurance.ltv_limits.max_ltv(
            financing.financing_type,
            financing.aph_points,
            financing.private_ltv,
        );
        let by_ltv = (price * ltv_ceiling).max(0.0);

        if financing.financing_type == FinancingType::Private {
            return LoanSizing {
                by_debt_service: 0.0,
                by_ltv,
                max_loan: by_ltv,
                ltv_ceiling,
            };
        }

        let monthly_ceiling = (safe_div(noi, financing.debt_coverage_ratio) / 12.0).max(0.0);
        let by_debt_service = present_value(
            monthly_ceiling,
            monthly_rate(financing.sizing_rate()),
            loan_months(financing.amortization_years),
        );

        let max_loan = if ignore_ltv {
            by_debt_service
        } else if by_debt_service > by_ltv {
            debug!(
                "Loan capped by {:.0}% LTV: {:.2} -> {:.2}",
                ltv_ceiling * 100.0,
                by_debt_service,
                by_ltv
            );
            by_ltv
        } else {
            by_debt_service
        };

        LoanSizing {
            by_debt_service,
            by_ltv,
            max_loan,
            ltv_ceiling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{FinancingInput, Province, RawProperty, RevenueInput};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn calculator() -> RentabilityCalculator {
        RentabilityCalculator::new(Assumptions::default_tables())
    }

    fn property(financing_type: FinancingType, rent: f64) -> PropertyInput {
        PropertyInput {
            purchase_price: 1_000_000.0,
            number_of_units: 1,
            revenue: RevenueInput {
                annual_rent: rent,
                ..Default::default()
            },
            financing: FinancingInput {
                financing_type,
                interest_rate: 0.05,
                qualification_rate: 0.05,
                amortization_years: 25,
                debt_coverage_ratio: 1.1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_conventional_capped_by_ltv() {
        let result = calculator().analyze(
            &property(FinancingType::Conventional, 200_000.0),
            &AnalysisOptions::simple(),
        );

        assert!(result.loan_by_debt_service > 800_000.0);
        assert_relative_eq!(result.max_loan_amount, 800_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.down_payment, 200_000.0, max_relative = 1e-9);
        assert_eq!(result.insurance_premium, 0.0);
        assert_eq!(result.total_loan_amount, result.max_loan_amount);
        assert_relative_eq!(result.loan_to_value, 80.0, max_relative = 1e-12);
        assert_relative_eq!(result.economic_value, 1_000_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_debt_service_constrained_loan() {
        let result = calculator().analyze(
            &property(FinancingType::Conventional, 50_000.0),
            &AnalysisOptions::simple(),
        );

        assert!(result.loan_by_debt_service < result.loan_by_ltv);
        assert_eq!(result.max_loan_amount, result.loan_by_debt_service);
        // The loan's payment consumes exactly NOI / DCR
        assert_relative_eq!(result.annual_debt_service, 50_000.0 / 1.1, max_relative = 1e-9);
        assert_relative_eq!(
            result.economic_value,
            result.max_loan_amount / 0.80,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_ignore_ltv_keeps_debt_service_loan() {
        let result = calculator().analyze(
            &property(FinancingType::Conventional, 200_000.0),
            &AnalysisOptions::simple().ignoring_ltv(),
        );
        assert_eq!(result.max_loan_amount, result.loan_by_debt_service);
        assert!(result.max_loan_amount > 800_000.0);
    }

    #[test]
    fn test_private_loan_cash_flow_identity() {
        let mut p = property(FinancingType::Private, 120_000.0);
        p.financing.private_ltv = 0.70;
        p.financing.interest_rate = 0.08;
        let result = calculator().analyze(&p, &AnalysisOptions::simple());

        assert_relative_eq!(result.max_loan_amount, 700_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.cash_flow, 120_000.0 - 700_000.0 * 0.08, max_relative = 1e-9);
        assert_eq!(result.insurance_premium, 0.0);
        assert_eq!(result.loan_paydown_year1, 0.0);
        assert_relative_eq!(result.economic_value, 1_000_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_cmhc_premium_billed_on_delta() {
        let calc = calculator();
        let p = property(FinancingType::Cmhc, 200_000.0);
        let fresh = calc.analyze(&p, &AnalysisOptions::simple());
        let carried = calc.analyze(
            &p,
            &AnalysisOptions::simple().with_initial_loan_amount(200_000.0),
        );

        assert_eq!(fresh.max_loan_amount, carried.max_loan_amount);
        assert_relative_eq!(fresh.max_loan_amount, 850_000.0, max_relative = 1e-12);
        assert_relative_eq!(
            fresh.insurance_premium - carried.insurance_premium,
            200_000.0 * fresh.insurance.rate,
            max_relative = 1e-9
        );
        for result in [&fresh, &carried] {
            assert_relative_eq!(
                result.total_loan_amount,
                result.max_loan_amount + result.insurance_premium,
                max_relative = 1e-12
            );
        }
        assert_eq!(fresh.insurance.analysis_fee, 150.0);
    }

    #[test]
    fn test_aph_ceiling_and_economic_value() {
        let mut p = property(FinancingType::CmhcAph, 200_000.0);
        p.financing.aph_points = 100;
        let result = calculator().analyze(&p, &AnalysisOptions::simple());

        assert_relative_eq!(result.max_loan_amount, 950_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.economic_value, 1_000_000.0, max_relative = 1e-9);
        assert_relative_eq!(result.insurance.rebate, 0.30);
    }

    #[test]
    fn test_land_transfer_tax_on_initial_purchase_only() {
        let calc = calculator();
        let mut p = property(FinancingType::Conventional, 200_000.0);
        p.purchase_price = 500_000.0;

        let initial = calc.analyze(&p, &AnalysisOptions::simple());
        assert_abs_diff_eq!(initial.land_transfer_tax, 5_653.5, epsilon = 1e-6);

        p.acquisition.welcome_tax_override = Some(1_000.0);
        let overridden = calc.analyze(&p, &AnalysisOptions::simple());
        assert_eq!(overridden.land_transfer_tax, 1_000.0);

        p.is_initial_purchase = false;
        let derived = calc.analyze(&p, &AnalysisOptions::simple());
        assert_eq!(derived.land_transfer_tax, 0.0);
    }

    #[test]
    fn test_acquisition_costs_by_mode() {
        let calc = calculator();
        let mut p = property(FinancingType::Conventional, 200_000.0);
        p.acquisition.notary_fees = 2_000.0;
        p.acquisition.renovation_costs = 30_000.0;
        p.acquisition.welcome_tax_override = Some(0.0);
        p.financing.origination_fee_rate = 0.01;

        let simple = calc.analyze(&p, &AnalysisOptions::simple());
        let advanced = calc.analyze(&p, &AnalysisOptions::advanced());

        assert_relative_eq!(simple.acquisition_costs, 2_000.0 + 8_000.0, max_relative = 1e-9);
        assert_relative_eq!(advanced.acquisition_costs, 32_000.0 + 8_000.0, max_relative = 1e-9);
        assert_relative_eq!(
            simple.total_investment,
            simple.down_payment + simple.acquisition_costs,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_vacancy_and_expense_totals() {
        let mut p = property(FinancingType::Conventional, 100_000.0);
        p.revenue.vacancy_rate = 0.05;
        p.expenses.municipal_taxes = 10_000.0;
        let result = calculator().analyze(&p, &AnalysisOptions::simple());

        assert_relative_eq!(result.vacancy_amount, 5_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.effective_revenue, 95_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.total_expenses, 15_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.net_operating_income, 85_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.cap_rate, 8.5, max_relative = 1e-12);
    }

    #[test]
    fn test_advanced_mode_benchmark_noi_below_actual() {
        let mut p = property(FinancingType::Conventional, 100_000.0);
        p.province = Some(Province::Quebec);
        p.number_of_units = 6;
        let result = calculator().analyze(&p, &AnalysisOptions::advanced());

        assert!(result.benchmark_found);
        assert!(result.net_operating_income < result.effective_net_income);
        assert_relative_eq!(
            result.cash_flow,
            result.effective_net_income - result.annual_debt_service,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_year_one_returns() {
        let result = calculator().analyze(
            &property(FinancingType::Conventional, 200_000.0),
            &AnalysisOptions::simple(),
        );

        assert_relative_eq!(result.appreciation_year1, 30_000.0, max_relative = 1e-12);
        assert!(result.loan_paydown_year1 > 0.0);
        assert_relative_eq!(
            result.value_generated_year1,
            result.cash_flow + result.loan_paydown_year1 + result.appreciation_year1,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_degenerate_property_is_total() {
        let result = calculator().analyze(&PropertyInput::default(), &AnalysisOptions::simple());

        assert_eq!(result.cap_rate, 0.0);
        assert_eq!(result.max_loan_amount, 0.0);
        assert_eq!(result.economic_value, 0.0);
        assert_eq!(result.total_return, 0.0);
        assert!(result.cash_flow.is_finite());
    }

    #[test]
    fn test_huge_loan_years_are_total() {
        let raw: RawProperty = serde_json::from_str(
            r#"{
                "purchasePrice": 1000000,
                "annualRent": 120000,
                "financingType": "cmhc",
                "interestRate": 5,
                "amortizationYears": "400000000",
                "termYears": "4000000000"
            }"#,
        )
        .unwrap();
        let normalized = raw.normalize();
        assert_eq!(normalized.financing.amortization_years, MAX_LOAN_YEARS);
        assert_eq!(normalized.financing.term_years, MAX_LOAN_YEARS);

        let result = calculator().analyze(&normalized, &AnalysisOptions::simple());
        assert!(result.max_loan_amount.is_finite());
        assert!(result.monthly_payment.is_finite() && result.monthly_payment > 0.0);
        assert!(result.loan_paydown_year1.is_finite());

        // Records built directly are capped the same way
        let mut direct = property(FinancingType::Cmhc, 120_000.0);
        direct.financing.amortization_years = u32::MAX;
        let capped = {
            let mut p = direct.clone();
            p.financing.amortization_years = MAX_LOAN_YEARS;
            calculator().analyze(&p, &AnalysisOptions::simple())
        };
        let result = calculator().analyze(&direct, &AnalysisOptions::simple());
        assert_relative_eq!(result.loan_by_debt_service, capped.loan_by_debt_service, max_relative = 1e-12);
        assert_relative_eq!(result.monthly_payment, capped.monthly_payment, max_relative = 1e-12);
    }
}
