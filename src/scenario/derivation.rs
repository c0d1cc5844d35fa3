//! Derive a child scenario's analysis from its parent's amortized loan

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::builder::{optimization_property, refinancing_property, renewal_property};
use super::{
    InitialFinancingParams, OptimizationParams, RefinancingParams, RenewalParams, ScenarioFees,
    ScenarioParams,
};
use crate::analysis::{
    interest_only_payment, loan_months, monthly_rate, payment, principal_paid, remaining_balance,
    safe_div, AnalysisOptions, AnalysisResult, RentabilityCalculator,
};
use crate::assumptions::PremiumQuote;
use crate::projection::{RefinanceEvent, ScenarioSwitch, ScheduleLoan};
use crate::property::{FinancingType, PropertyInput};

/// An already-resolved parent: its record and its analysis
#[derive(Debug, Clone, Copy)]
pub struct ParentState<'a> {
    pub property: &'a PropertyInput,
    pub analysis: &'a AnalysisResult,
}

impl<'a> ParentState<'a> {
    pub fn new(property: &'a PropertyInput, analysis: &'a AnalysisResult) -> Self {
        Self { property, analysis }
    }

    /// Outstanding balance after `months` payments.
    ///
    /// Interest-only loans never amortize and keep their full principal.
    pub fn balance_after(&self, months: u32) -> f64 {
        let loan = ScheduleLoan::from_analysis(self.property, self.analysis);
        if loan.interest_only {
            return loan.principal;
        }
        let elapsed = months.min(loan.amortization_months);
        remaining_balance(
            loan.principal,
            monthly_rate(loan.annual_rate),
            loan.amortization_months,
            elapsed,
        )
    }

    /// Already-insured principal carried into a child at `balance`.
    ///
    /// When the parent financed a premium, only the loan share of the balance
    /// counts, scaled by `balance / total loan`.
    pub fn carried_principal(&self, balance: f64) -> f64 {
        let analysis = self.analysis;
        if analysis.insurance_premium > 0.0 {
            analysis.max_loan_amount * safe_div(balance, analysis.total_loan_amount)
        } else {
            balance
        }
    }
}

/// A resolved scenario: its synthetic property and analysis, plus the
/// parent-loan figures it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAnalysis {
    pub property: PropertyInput,
    pub analysis: AnalysisResult,
    /// Parent balance when the child takes over
    pub parent_balance: f64,
    /// Principal the child is not re-insured for
    pub initial_loan_amount: f64,
    /// New loan - parent balance - fees; refinancing and optimization only
    pub equity_withdrawal: Option<f64>,
    pub remaining_amortization_years: u32,
    /// Parent payments made before the child takes over
    pub elapsed_months: u32,
}

impl DerivedAnalysis {
    /// False when a refinancing would not even cover the parent balance and fees
    pub fn is_viable(&self) -> bool {
        self.equity_withdrawal.map_or(true, |w| w >= 0.0)
    }

    /// Splice point for a schedule continuing from the parent loan
    pub fn refinance_event(&self) -> RefinanceEvent {
        RefinanceEvent::from_analysis(self.elapsed_months, &self.property, &self.analysis)
    }

    /// Switch point for a multi-year projection held from the parent
    pub fn switch(&self) -> ScenarioSwitch<'_> {
        ScenarioSwitch {
            property: &self.property,
            analysis: &self.analysis,
            switch_month: self.elapsed_months,
            equity_withdrawal: self.equity_withdrawal.unwrap_or(0.0),
        }
    }
}

/// Builds and analyzes the synthetic property of each scenario kind
#[derive(Debug, Clone, Copy)]
pub struct ScenarioDerivationEngine<'a> {
    calculator: &'a RentabilityCalculator,
    options: AnalysisOptions,
}

impl<'a> ScenarioDerivationEngine<'a> {
    /// `options` carries the expense mode; loan options are set per scenario
    pub fn new(calculator: &'a RentabilityCalculator, options: AnalysisOptions) -> Self {
        Self {
            calculator,
            options: AnalysisOptions {
                advanced_expenses: options.advanced_expenses,
                ..AnalysisOptions::default()
            },
        }
    }

    /// Derive any scenario kind from its parent
    pub fn derive(&self, parent: &ParentState<'_>, params: &ScenarioParams) -> DerivedAnalysis {
        match params {
            ScenarioParams::InitialFinancing(p) => self.initial_financing(parent.property, p),
            ScenarioParams::Refinancing(p) => self.refinancing(parent, p),
            ScenarioParams::Renewal(p) => self.renewal(parent, p),
            ScenarioParams::Optimization(p) => self.optimization(parent, p),
        }
    }

    /// Alternative financing of a root property; nothing carries over
    pub fn initial_financing(&self, root: &PropertyInput, params: &InitialFinancingParams) -> DerivedAnalysis {
        let mut property = root.clone();
        property.financing = params.financing.apply(&root.financing);
        let analysis = self.calculator.analyze(&property, &self.options);

        DerivedAnalysis {
            remaining_amortization_years: property.financing.amortization_years,
            property,
            analysis,
            parent_balance: 0.0,
            initial_loan_amount: 0.0,
            equity_withdrawal: None,
            elapsed_months: 0,
        }
    }

    pub fn refinancing(&self, parent: &ParentState<'_>, params: &RefinancingParams) -> DerivedAnalysis {
        let property = refinancing_property(parent.property, params);
        self.refinance(parent, property, params.years_elapsed, &params.fees)
    }

    pub fn optimization(&self, parent: &ParentState<'_>, params: &OptimizationParams) -> DerivedAnalysis {
        let property = optimization_property(parent.property, params);
        self.refinance(parent, property, params.years_elapsed, &params.fees)
    }

    /// Size a new loan on `property` and take out what exceeds the parent balance
    fn refinance(
        &self,
        parent: &ParentState<'_>,
        property: PropertyInput,
        years_elapsed: u32,
        fees: &ScenarioFees,
    ) -> DerivedAnalysis {
        let elapsed_months = loan_months(years_elapsed);
        let parent_balance = parent.balance_after(elapsed_months);
        let initial_loan_amount = parent.carried_principal(parent_balance);

        let options = self
            .options
            .with_initial_loan_amount(initial_loan_amount)
            .ignoring_ltv();
        let analysis = self.calculator.analyze(&property, &options);

        let equity_withdrawal = analysis.max_loan_amount - parent_balance - fees.total();
        if equity_withdrawal < 0.0 {
            warn!(
                "Refinancing after {} years does not cover the parent balance: withdrawal {:.2}",
                years_elapsed, equity_withdrawal
            );
        }

        DerivedAnalysis {
            remaining_amortization_years: property.financing.amortization_years,
            property,
            analysis,
            parent_balance,
            initial_loan_amount,
            equity_withdrawal: Some(equity_withdrawal),
            elapsed_months,
        }
    }

    /// Renew the parent's outstanding balance at the end of its term.
    ///
    /// The loan is not resized: payment, cash flow and returns come from the
    /// carried balance amortized over what remains of the parent schedule.
    pub fn renewal(&self, parent: &ParentState<'_>, params: &RenewalParams) -> DerivedAnalysis {
        let parent_financing = &parent.property.financing;
        let term_years = parent_financing.term_years;
        let remaining = remaining_amortization(parent_financing.amortization_years, term_years);
        let elapsed_months = loan_months(term_years);

        let parent_balance = parent.balance_after(elapsed_months);
        let property = renewal_property(parent.property, params, term_years, remaining);

        let mut analysis = self.calculator.analyze(&property, &self.options);
        self.carry_balance(&property, &mut analysis, parent_balance);
        debug!(
            "Renewal of {:.2} over {} remaining years: payment {:.2}",
            parent_balance, remaining, analysis.monthly_payment
        );

        DerivedAnalysis {
            property,
            analysis,
            parent_balance,
            initial_loan_amount: parent_balance,
            equity_withdrawal: None,
            remaining_amortization_years: remaining,
            elapsed_months,
        }
    }

    /// Replace the sized loan of `analysis` by a fixed carried balance
    fn carry_balance(&self, property: &PropertyInput, analysis: &mut AnalysisResult, balance: f64) {
        let financing = &property.financing;
        let rate = monthly_rate(financing.interest_rate);
        let months = loan_months(financing.amortization_years);
        let interest_only = financing.financing_type == FinancingType::Private;

        let monthly_payment = if interest_only {
            interest_only_payment(balance, financing.interest_rate)
        } else {
            payment(balance, rate, months)
        };

        analysis.loan_by_debt_service = balance;
        analysis.loan_by_ltv = balance;
        analysis.max_loan_amount = balance;
        analysis.insurance = PremiumQuote::default();
        analysis.insurance_premium = 0.0;
        analysis.total_loan_amount = balance;
        analysis.monthly_payment = monthly_payment;
        analysis.economic_value = safe_div(balance, analysis.ltv_ceiling).max(0.0);
        analysis.loan_to_value = safe_div(balance, property.purchase_price) * 100.0;

        analysis.acquisition_costs = if self.options.advanced_expenses {
            property.acquisition.advanced_total()
        } else {
            property.acquisition.simple_total()
        };
        analysis.land_transfer_tax = 0.0;
        analysis.down_payment = property.purchase_price - balance;
        analysis.total_investment = analysis.down_payment + analysis.acquisition_costs;

        analysis.loan_paydown_year1 = if interest_only {
            0.0
        } else {
            principal_paid(balance, rate, monthly_payment, 12)
        };
        analysis.refresh_returns();
    }
}

/// Amortization left on a loan after `term_years`, never below 0
pub fn remaining_amortization(amortization_years: u32, term_years: u32) -> u32 {
    amortization_years.saturating_sub(term_years)
}
