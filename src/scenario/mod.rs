//! What-if scenarios chained off an initial acquisition
//!
//! A scenario stores only its deltas from the parent. Resolving it builds a
//! synthetic property from the parent's resolved record and analyzes it:
//!
//! ```text
//! root property ── initialFinancing
//!        └── refinancing (year 5) ── renewal ── optimization
//! ```

mod builder;
mod derivation;
mod runner;

pub use builder::{optimization_property, refinancing_property, renewal_property};
pub use derivation::{remaining_amortization, DerivedAnalysis, ParentState, ScenarioDerivationEngine};
pub use runner::{ResolvedScenario, ResolvedScenarios, ScenarioRunner};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::property::{
    AdvancedExpenseInput, ExpenseInput, FinancingInput, FinancingType, RevenueInput,
};

/// Scenario kind, as tagged on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioKind {
    InitialFinancing,
    Refinancing,
    Renewal,
    Optimization,
}

/// A named node of the scenario tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_scenario_id: Option<String>,
    #[serde(flatten)]
    pub params: ScenarioParams,
}

impl Scenario {
    pub fn new(id: impl Into<String>, params: ScenarioParams) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            parent_scenario_id: None,
            params,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_scenario_id = Some(parent_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn kind(&self) -> ScenarioKind {
        self.params.kind()
    }
}

/// Per-kind deltas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScenarioParams {
    InitialFinancing(InitialFinancingParams),
    Refinancing(RefinancingParams),
    Renewal(RenewalParams),
    Optimization(OptimizationParams),
}

impl ScenarioParams {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioParams::InitialFinancing(_) => ScenarioKind::InitialFinancing,
            ScenarioParams::Refinancing(_) => ScenarioKind::Refinancing,
            ScenarioParams::Renewal(_) => ScenarioKind::Renewal,
            ScenarioParams::Optimization(_) => ScenarioKind::Optimization,
        }
    }
}

/// Alternative financing of the root acquisition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialFinancingParams {
    pub financing: FinancingOverrides,
}

/// New loan sized on the grown income after `years_elapsed`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefinancingParams {
    pub years_elapsed: u32,
    pub revenue_growth: f64,
    pub expense_growth: f64,
    pub appreciation_rate: f64,
    /// Appraised value; otherwise the price appreciated over the elapsed years
    pub market_value: Option<f64>,
    pub financing: FinancingOverrides,
    pub fees: ScenarioFees,
}

/// Rate/term change on the outstanding balance at the end of the parent's term
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenewalParams {
    pub financing: FinancingOverrides,
    pub revenue_growth: f64,
    pub expense_growth: f64,
    pub appreciation_rate: f64,
}

/// Replacement operating figures, refinanced like a refinancing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizationParams {
    pub years_elapsed: u32,
    pub appreciation_rate: f64,
    pub market_value: Option<f64>,
    pub revenue: Option<RevenueInput>,
    pub expenses: Option<ExpenseInput>,
    pub advanced_expenses: Option<AdvancedExpenseInput>,
    pub financing: FinancingOverrides,
    pub fees: ScenarioFees,
}

/// Financing fields a scenario may replace; `None` keeps the parent's value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancingOverrides {
    pub financing_type: Option<FinancingType>,
    pub interest_rate: Option<f64>,
    pub amortization_years: Option<u32>,
    pub term_years: Option<u32>,
    pub qualification_rate: Option<f64>,
    pub debt_coverage_ratio: Option<f64>,
    pub aph_points: Option<u32>,
    pub private_ltv: Option<f64>,
    pub origination_fee_rate: Option<f64>,
}

impl FinancingOverrides {
    /// Merge onto a parent's financing
    pub fn apply(&self, base: &FinancingInput) -> FinancingInput {
        FinancingInput {
            financing_type: self.financing_type.unwrap_or(base.financing_type),
            interest_rate: self.interest_rate.unwrap_or(base.interest_rate),
            amortization_years: self.amortization_years.unwrap_or(base.amortization_years),
            term_years: self.term_years.unwrap_or(base.term_years),
            qualification_rate: self.qualification_rate.unwrap_or(base.qualification_rate),
            debt_coverage_ratio: self.debt_coverage_ratio.unwrap_or(base.debt_coverage_ratio),
            aph_points: self.aph_points.unwrap_or(base.aph_points),
            private_ltv: self.private_ltv.unwrap_or(base.private_ltv),
            origination_fee_rate: self.origination_fee_rate.unwrap_or(base.origination_fee_rate),
        }
    }
}

/// One-off costs of putting a child loan in place
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioFees {
    pub appraisal: f64,
    pub legal: f64,
    pub prepayment_penalty: f64,
    pub other: f64,
}

impl ScenarioFees {
    pub fn total(&self) -> f64 {
        self.appraisal + self.legal + self.prepayment_penalty + self.other
    }
}

/// Load a scenario list from a JSON file holding an array of scenarios
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> EngineResult<Vec<Scenario>> {
    let file = File::open(path)?;
    load_scenarios_from_reader(BufReader::new(file))
}

/// Load a scenario list from any JSON reader
pub fn load_scenarios_from_reader<R: std::io::Read>(reader: R) -> EngineResult<Vec<Scenario>> {
    let scenarios: Vec<Scenario> = serde_json::from_reader(reader)?;
    log::debug!("Loaded {} scenarios", scenarios.len());
    Ok(scenarios)
}
