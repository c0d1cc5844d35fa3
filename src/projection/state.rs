//! Running state of a loan and its property during a schedule

use super::engine::{RefinanceEvent, ScheduleLoan};
use super::cashflows::AmortizationRow;

/// State of the loan and property at a point in the schedule
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// Current period (1-indexed, 0 before the first payment)
    pub period: u32,

    /// Loan currently being repaid
    pub loan: ScheduleLoan,

    /// Outstanding balance
    pub balance: f64,

    /// Principal repaid so far, across every loan in the schedule
    pub cumulative_principal: f64,

    /// Appreciated property value
    pub property_value: f64,

    /// Acquisition-style costs paid so far
    pub sunk_costs: f64,
}

impl ScheduleState {
    /// Initialize state at the start of a loan
    pub fn new(loan: ScheduleLoan, property_value: f64, sunk_costs: f64) -> Self {
        Self {
            period: 0,
            balance: loan.principal.max(0.0),
            loan,
            cumulative_principal: 0.0,
            property_value,
            sunk_costs,
        }
    }

    /// Replace the running loan with a refinanced one.
    ///
    /// The tracked value is never left below what was just borrowed against
    /// the property.
    pub fn splice(&mut self, event: &RefinanceEvent) {
        self.loan = event.loan;
        self.balance = event.loan.principal.max(0.0);
        if event.value_floor > self.property_value {
            self.property_value = event.value_floor;
        }
        self.sunk_costs += event.additional_costs;
    }

    /// Pay one period and return its row
    pub fn advance_month(&mut self, monthly_growth: f64) -> AmortizationRow {
        self.period += 1;
        let mut row = AmortizationRow::new(self.period);

        let interest = self.loan.interest_on(self.balance);
        let principal = (self.loan.monthly_payment - interest).min(self.balance).max(0.0);

        self.balance -= principal;
        self.cumulative_principal += principal;
        self.property_value *= monthly_growth;

        row.payment = interest + principal;
        row.interest = interest;
        row.principal = principal;
        row.cumulative_principal = self.cumulative_principal;
        row.balance = self.balance;
        row.property_value = self.property_value;
        row.equity = self.equity();
        row
    }

    /// Property value net of debt and sunk costs
    pub fn equity(&self) -> f64 {
        self.property_value - self.balance - self.sunk_costs
    }
}
