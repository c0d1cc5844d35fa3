//! Rental Analysis - Profitability and financing engine for income-producing rental properties
//!
//! This library provides:
//! - Single-property rentability analysis (expenses, loan sizing, insurance premiums, returns)
//! - Reference tables for expense benchmarks, mortgage insurance, and land-transfer tax
//! - What-if scenarios (refinancing, renewal, optimization) chained off an acquisition
//! - Month-by-month amortization schedules with a mid-course refinancing
//! - Multi-year return projections with an IRR solver

pub mod error;
pub mod property;
pub mod assumptions;
pub mod analysis;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{EngineError, EngineResult};
pub use property::{parse_flexible_number, FinancingType, PropertyInput, Province, RawProperty};
pub use assumptions::Assumptions;
pub use analysis::{AnalysisOptions, AnalysisResult, RentabilityCalculator};
pub use projection::{AmortizationScheduler, MultiYearReturnProjector, ReturnAssumptions, ReturnProjection};
pub use scenario::{DerivedAnalysis, Scenario, ScenarioDerivationEngine, ScenarioRunner};
