//! Amortization schedules and multi-year return projections

mod cashflows;
mod engine;
pub mod irr;
mod returns;
mod state;

pub use cashflows::{AmortizationRow, AmortizationSchedule, ScheduleSummary};
pub use engine::{AmortizationScheduler, RefinanceEvent, ScheduleLoan};
pub use irr::{calculate_irr, npv};
pub use returns::{MultiYearReturnProjector, ReturnAssumptions, ReturnProjection, ScenarioSwitch};
pub use state::ScheduleState;
