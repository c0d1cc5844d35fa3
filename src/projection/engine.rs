//! Month-by-month amortization of a loan, optionally refinanced mid-course

use log::debug;

use super::cashflows::AmortizationSchedule;
use super::state::ScheduleState;
use crate::analysis::{loan_months, monthly_rate, AnalysisResult};
use crate::property::{FinancingType, PropertyInput};

/// Terms of one loan in a schedule
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScheduleLoan {
    /// Amount borrowed, insurance premium included
    pub principal: f64,
    pub monthly_payment: f64,
    /// Contract rate, compounded semi-annually
    pub annual_rate: f64,
    pub amortization_months: u32,
    /// Private loans pay interest only
    pub interest_only: bool,
}

impl ScheduleLoan {
    pub fn new(principal: f64, monthly_payment: f64, annual_rate: f64, amortization_months: u32) -> Self {
        Self {
            principal,
            monthly_payment,
            annual_rate,
            amortization_months,
            interest_only: false,
        }
    }

    /// Loan terms carried by an analysis of `property`
    pub fn from_analysis(property: &PropertyInput, analysis: &AnalysisResult) -> Self {
        let financing = &property.financing;
        Self {
            principal: analysis.total_loan_amount,
            monthly_payment: analysis.monthly_payment,
            annual_rate: financing.interest_rate,
            amortization_months: loan_months(financing.amortization_years),
            interest_only: financing.financing_type == FinancingType::Private,
        }
    }

    /// Interest accrued on `balance` over one month
    pub fn interest_on(&self, balance: f64) -> f64 {
        if self.interest_only {
            balance * self.annual_rate / 12.0
        } else {
            balance * monthly_rate(self.annual_rate)
        }
    }
}

/// A child loan replacing the running one
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RefinanceEvent {
    /// Last period paid on the parent loan; the child starts the period after
    pub refinance_month: u32,
    pub loan: ScheduleLoan,
    /// Minimum property value once the child loan is in place
    pub value_floor: f64,
    /// Child acquisition-style costs added to the sunk costs
    pub additional_costs: f64,
}

impl RefinanceEvent {
    /// Event for a child scenario analysis starting after `refinance_month`
    pub fn from_analysis(refinance_month: u32, property: &PropertyInput, analysis: &AnalysisResult) -> Self {
        Self {
            refinance_month,
            loan: ScheduleLoan::from_analysis(property, analysis),
            value_floor: analysis.economic_value.max(analysis.total_loan_amount),
            additional_costs: analysis.acquisition_costs,
        }
    }
}

/// Builds amortization schedules
#[derive(Debug, Clone)]
pub struct AmortizationScheduler {
    loan: ScheduleLoan,
    property_value: f64,
    annual_appreciation: f64,
    sunk_costs: f64,
    refinance: Option<RefinanceEvent>,
}

impl AmortizationScheduler {
    /// Create a scheduler for a loan on a property worth `property_value`
    pub fn new(loan: ScheduleLoan, property_value: f64) -> Self {
        Self {
            loan,
            property_value,
            annual_appreciation: 0.0,
            sunk_costs: 0.0,
            refinance: None,
        }
    }

    /// Scheduler for the loan of an analyzed property; its acquisition costs are sunk
    pub fn from_analysis(property: &PropertyInput, analysis: &AnalysisResult) -> Self {
        Self::new(ScheduleLoan::from_analysis(property, analysis), property.purchase_price)
            .with_sunk_costs(analysis.acquisition_costs)
    }

    pub fn with_appreciation(mut self, annual_rate: f64) -> Self {
        self.annual_appreciation = annual_rate;
        self
    }

    pub fn with_sunk_costs(mut self, costs: f64) -> Self {
        self.sunk_costs = costs;
        self
    }

    pub fn with_refinance(mut self, event: RefinanceEvent) -> Self {
        self.refinance = Some(event);
        self
    }

    /// Number of rows the schedule will hold
    pub fn total_months(&self) -> u32 {
        match &self.refinance {
            Some(event) => event.refinance_month.saturating_add(event.loan.amortization_months),
            None => self.loan.amortization_months,
        }
    }

    /// Build the schedule from period 1 to `total_months()`
    pub fn build(&self) -> AmortizationSchedule {
        let mut schedule = AmortizationSchedule::new();
        let mut state = ScheduleState::new(self.loan, self.property_value, self.sunk_costs);
        let monthly_growth = (1.0 + self.annual_appreciation).max(0.0).powf(1.0 / 12.0);

        for period in 1..=self.total_months() {
            if let Some(event) = &self.refinance {
                if period == event.refinance_month.saturating_add(1) {
                    debug!(
                        "Refinancing at period {}: balance {:.2} -> {:.2}",
                        period, state.balance, event.loan.principal
                    );
                    state.splice(event);
                    schedule.refinance_period = Some(period);
                }
            }

            schedule.add_row(state.advance_month(monthly_growth));
        }

        schedule
    }
}
