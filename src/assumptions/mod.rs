//! Reference tables injected into the engine: expense benchmarks,
//! mortgage-insurance premiums, and land-transfer tax

mod benchmark;
mod insurance;
mod transfer_tax;
pub mod loader;

pub use benchmark::{
    BenchmarkRow, ExpenseBenchmark, ExpenseBenchmarkTable, ReplacementReserveRates, SizeClass,
    SMALL_BUILDING_MAX_UNITS,
};
pub use insurance::{
    AphTier, InsurancePremiumSchedule, LtvLimits, PremiumBracket, PremiumQuote, PremiumRequest,
};
pub use transfer_tax::{LandTransferTax, TaxBracket};

use std::path::Path;

use crate::error::EngineResult;

/// Appreciation assumed by the year-1 return figures of a single analysis.
///
/// Multi-year projections take their own rate; the two are deliberately kept
/// separate.
pub const YEAR_ONE_APPRECIATION_RATE: f64 = 0.03;

/// Container for all reference tables
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub benchmarks: ExpenseBenchmarkTable,
    pub insurance: InsurancePremiumSchedule,
    pub transfer_tax: LandTransferTax,
    pub year_one_appreciation: f64,
}

impl Assumptions {
    /// Create assumptions from the built-in tables
    pub fn default_tables() -> Self {
        Self {
            benchmarks: ExpenseBenchmarkTable::default_table(),
            insurance: InsurancePremiumSchedule::default(),
            transfer_tax: LandTransferTax::default_brackets(),
            year_one_appreciation: YEAR_ONE_APPRECIATION_RATE,
        }
    }

    /// Load the benchmark table from CSV in the default location (data/assumptions/)
    pub fn from_csv() -> EngineResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load the benchmark table from CSV in a specific directory; other tables keep their defaults
    pub fn from_csv_path(path: &Path) -> EngineResult<Self> {
        let rows = loader::load_benchmarks(path)?;
        log::info!("Loaded {} expense benchmark rows from {}", rows.len(), path.display());

        Ok(Self {
            benchmarks: ExpenseBenchmarkTable::from_rows(rows),
            ..Self::default_tables()
        })
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_tables()
    }
}
