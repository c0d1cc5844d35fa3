//! Scenario runner: resolves a scenario tree root-to-leaf
//!
//! Analyzes the root property once, then derives every scenario from its
//! already-resolved parent.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use serde::Serialize;

use super::derivation::{DerivedAnalysis, ParentState, ScenarioDerivationEngine};
use super::{Scenario, ScenarioKind};
use crate::analysis::{AnalysisOptions, AnalysisResult, RentabilityCalculator};
use crate::assumptions::Assumptions;
use crate::error::{EngineError, EngineResult};
use crate::property::PropertyInput;

/// A scenario and its derived analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedScenario {
    pub scenario: Scenario,
    pub derived: DerivedAnalysis,
}

/// Resolved scenarios in resolution order (every parent before its children)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedScenarios {
    entries: Vec<ResolvedScenario>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ResolvedScenarios {
    fn push(&mut self, entry: ResolvedScenario) {
        self.index.insert(entry.scenario.id.clone(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedScenario> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedScenario> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolution order as scenario ids
    pub fn order(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.scenario.id.as_str()).collect()
    }
}

/// Pre-loaded runner for one root property
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv(property)?.advanced(true);
/// let resolved = runner.resolve(&scenarios)?;
/// for entry in resolved.iter() {
///     println!("{}: {:.2}", entry.scenario.name, entry.derived.analysis.cash_flow);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    calculator: RentabilityCalculator,
    root: PropertyInput,
    options: AnalysisOptions,
}

impl ScenarioRunner {
    /// Create runner with default in-memory assumptions
    pub fn new(root: PropertyInput) -> Self {
        Self::with_assumptions(root, Assumptions::default_tables())
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv(root: PropertyInput) -> EngineResult<Self> {
        Ok(Self::with_assumptions(root, Assumptions::from_csv()?))
    }

    /// Create runner from specific assumptions directory
    pub fn from_csv_path(root: PropertyInput, path: &Path) -> EngineResult<Self> {
        Ok(Self::with_assumptions(root, Assumptions::from_csv_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(root: PropertyInput, assumptions: Assumptions) -> Self {
        Self {
            calculator: RentabilityCalculator::new(assumptions),
            root,
            options: AnalysisOptions::simple(),
        }
    }

    /// Switch every analysis to advanced expense mode
    pub fn advanced(mut self, advanced: bool) -> Self {
        self.options.advanced_expenses = advanced;
        self
    }

    pub fn root(&self) -> &PropertyInput {
        &self.root
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.calculator.assumptions()
    }

    pub fn calculator(&self) -> &RentabilityCalculator {
        &self.calculator
    }

    /// Analysis of the root property as entered
    pub fn root_analysis(&self) -> AnalysisResult {
        self.calculator.analyze(&self.root, &self.options)
    }

    /// Resolve every scenario
    pub fn resolve(&self, scenarios: &[Scenario]) -> EngineResult<ResolvedScenarios> {
        let order = resolution_order(scenarios)?;
        let resolved = self.resolve_in_order(scenarios, &order);
        info!("Resolved {} scenarios", resolved.len());
        Ok(resolved)
    }

    /// Resolve one scenario and the chain of ancestors it depends on
    pub fn resolve_one(&self, scenarios: &[Scenario], id: &str) -> EngineResult<DerivedAnalysis> {
        // Validates the whole tree even though only one chain is computed
        resolution_order(scenarios)?;

        let index = id_index(scenarios)?;
        let mut chain = Vec::new();
        let mut current = index.get(id).copied();
        if current.is_none() {
            return Err(EngineError::UnknownScenario(id.to_string()));
        }
        while let Some(i) = current {
            chain.push(i);
            current = parent_index(&scenarios[i], &index);
        }
        chain.reverse();

        let mut resolved = self.resolve_in_order(scenarios, &chain);
        resolved
            .entries
            .pop()
            .map(|entry| entry.derived)
            .ok_or_else(|| EngineError::UnknownScenario(id.to_string()))
    }

    fn resolve_in_order(&self, scenarios: &[Scenario], order: &[usize]) -> ResolvedScenarios {
        let engine = ScenarioDerivationEngine::new(&self.calculator, self.options);
        let root_analysis = self.root_analysis();
        let mut resolved = ResolvedScenarios::default();

        for &i in order {
            let scenario = &scenarios[i];
            let parent_entry = scenario
                .parent_scenario_id
                .as_deref()
                .and_then(|id| resolved.get(id));
            let parent = match parent_entry {
                Some(entry) => ParentState::new(&entry.derived.property, &entry.derived.analysis),
                None => ParentState::new(&self.root, &root_analysis),
            };

            let derived = engine.derive(&parent, &scenario.params);
            resolved.push(ResolvedScenario {
                scenario: scenario.clone(),
                derived,
            });
        }

        resolved
    }
}

fn id_index(scenarios: &[Scenario]) -> EngineResult<HashMap<&str, usize>> {
    let mut index = HashMap::with_capacity(scenarios.len());
    for (i, scenario) in scenarios.iter().enumerate() {
        if index.insert(scenario.id.as_str(), i).is_some() {
            return Err(EngineError::DuplicateScenario(scenario.id.clone()));
        }
    }
    Ok(index)
}

fn parent_index(scenario: &Scenario, index: &HashMap<&str, usize>) -> Option<usize> {
    scenario
        .parent_scenario_id
        .as_deref()
        .and_then(|parent| index.get(parent).copied())
}

/// Indices of `scenarios` ordered so that every parent precedes its children.
///
/// Rejects duplicate ids, unknown parents, initial-financing scenarios with a
/// parent, and parent chains that loop back on themselves.
fn resolution_order(scenarios: &[Scenario]) -> EngineResult<Vec<usize>> {
    let index = id_index(scenarios)?;

    for scenario in scenarios {
        let Some(parent) = scenario.parent_scenario_id.as_deref() else {
            continue;
        };
        if scenario.kind() == ScenarioKind::InitialFinancing {
            return Err(EngineError::InvalidScenario {
                scenario: scenario.id.clone(),
                reason: "initial financing cannot have a parent".to_string(),
            });
        }
        if !index.contains_key(parent) {
            return Err(EngineError::UnknownParent {
                scenario: scenario.id.clone(),
                parent: parent.to_string(),
            });
        }
    }

    let mut placed = vec![false; scenarios.len()];
    let mut order = Vec::with_capacity(scenarios.len());

    for start in 0..scenarios.len() {
        let mut chain = Vec::new();
        let mut current = Some(start);

        while let Some(i) = current {
            if placed[i] {
                break;
            }
            if chain.contains(&i) {
                return Err(EngineError::CycleDetected(scenarios[i].id.clone()));
            }
            chain.push(i);
            current = parent_index(&scenarios[i], &index);
        }

        for &i in chain.iter().rev() {
            placed[i] = true;
            order.push(i);
        }
    }

    Ok(order)
}
