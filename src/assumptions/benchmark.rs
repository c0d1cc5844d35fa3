//! Reference operating-expense ratios by province, structure, and building size
//!
//! Lenders normalize itemized expenses against these figures. Dollar amounts
//! are per unit per year; rates are fractions of effective revenue.

use serde::{Deserialize, Serialize};

use crate::property::{EquipmentCounts, Province, StructureType};

/// Largest unit count still treated as a small building
pub const SMALL_BUILDING_MAX_UNITS: u32 = 11;

/// Building size class used as the last lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeClass {
    /// Up to 11 units
    Small,
    /// More than 11 units
    Large,
    /// Applies regardless of size
    Any,
}

impl SizeClass {
    pub fn for_units(units: u32) -> Self {
        if units <= SMALL_BUILDING_MAX_UNITS {
            SizeClass::Small
        } else {
            SizeClass::Large
        }
    }
}

/// Replacement-reserve contributions per piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementReserveRates {
    /// Per appliance per year (fridge, stove, dishwasher, washer, dryer)
    pub appliance: f64,
    /// Per heat pump per year
    pub heat_pump: f64,
    /// Per elevator per month
    pub elevator: f64,
}

impl ReplacementReserveRates {
    /// Annual reserve for the given equipment
    pub fn annual_reserve(&self, equipment: &EquipmentCounts) -> f64 {
        equipment.appliances() as f64 * self.appliance
            + equipment.heat_pumps as f64 * self.heat_pump
            + equipment.elevators as f64 * self.elevator * 12.0
    }
}

/// One benchmark entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBenchmark {
    /// Maintenance per unit per year
    pub maintenance: f64,
    /// Management fee as a fraction of effective revenue
    pub management_rate: f64,
    /// Janitor / concierge salaries per unit per year
    pub salaries: f64,
    /// Floor for miscellaneous costs as a fraction of effective revenue
    pub other_cost_rate: f64,
    pub replacement_reserve: ReplacementReserveRates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRow {
    pub province: Province,
    pub structure_type: StructureType,
    pub size_class: SizeClass,
    pub benchmark: ExpenseBenchmark,
}

/// Immutable benchmark lookup table
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBenchmarkTable {
    rows: Vec<BenchmarkRow>,
}

const STANDARD_RESERVE: ReplacementReserveRates = ReplacementReserveRates {
    appliance: 45.0,
    heat_pump: 115.0,
    elevator: 350.0,
};

fn entry(
    province: Province,
    structure_type: StructureType,
    size_class: SizeClass,
    maintenance: f64,
    management_rate: f64,
    salaries: f64,
    other_cost_rate: f64,
) -> BenchmarkRow {
    BenchmarkRow {
        province,
        structure_type,
        size_class,
        benchmark: ExpenseBenchmark {
            maintenance,
            management_rate,
            salaries,
            other_cost_rate,
            replacement_reserve: STANDARD_RESERVE,
        },
    }
}

impl ExpenseBenchmarkTable {
    /// Build from explicit rows (e.g., a revised table loaded from CSV)
    pub fn from_rows(rows: Vec<BenchmarkRow>) -> Self {
        Self { rows }
    }

    /// Default table for the provinces the lender publishes figures for
    pub fn default_table() -> Self {
        use Province::*;
        use SizeClass::*;
        use StructureType::*;

        Self {
            rows: vec![
                entry(Quebec, WoodFrame, Small, 610.0, 0.042, 0.0, 0.015),
                entry(Quebec, WoodFrame, Large, 610.0, 0.050, 365.0, 0.020),
                entry(Quebec, Concrete, Any, 740.0, 0.050, 440.0, 0.025),
                entry(Ontario, WoodFrame, Small, 650.0, 0.045, 0.0, 0.015),
                entry(Ontario, WoodFrame, Large, 650.0, 0.050, 400.0, 0.020),
                entry(Ontario, Concrete, Any, 800.0, 0.050, 480.0, 0.025),
                entry(BritishColumbia, WoodFrame, Any, 700.0, 0.050, 380.0, 0.020),
                entry(BritishColumbia, Concrete, Any, 850.0, 0.050, 500.0, 0.025),
                entry(Alberta, WoodFrame, Any, 620.0, 0.050, 350.0, 0.020),
                entry(Alberta, Concrete, Any, 780.0, 0.050, 460.0, 0.025),
            ],
        }
    }

    pub fn rows(&self) -> &[BenchmarkRow] {
        &self.rows
    }

    /// Find the benchmark for a building.
    ///
    /// An exact size-class row wins over an `Any` row. Returns `None` when the
    /// province is unknown or has no row for the structure type.
    pub fn lookup(
        &self,
        province: Option<Province>,
        structure_type: StructureType,
        units: u32,
    ) -> Option<&ExpenseBenchmark> {
        let province = province?;
        let size_class = SizeClass::for_units(units);

        let candidates = || {
            self.rows
                .iter()
                .filter(move |r| r.province == province && r.structure_type == structure_type)
        };

        candidates()
            .find(|r| r.size_class == size_class)
            .or_else(|| candidates().find(|r| r.size_class == SizeClass::Any))
            .map(|r| &r.benchmark)
    }
}

impl Default for ExpenseBenchmarkTable {
    fn default() -> Self {
        Self::default_table()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_threshold() {
        assert_eq!(SizeClass::for_units(1), SizeClass::Small);
        assert_eq!(SizeClass::for_units(11), SizeClass::Small);
        assert_eq!(SizeClass::for_units(12), SizeClass::Large);
    }

    #[test]
    fn test_lookup_by_size() {
        let table = ExpenseBenchmarkTable::default_table();

        let small = table.lookup(Some(Province::Quebec), StructureType::WoodFrame, 6).unwrap();
        assert_eq!(small.salaries, 0.0);

        let large = table.lookup(Some(Province::Quebec), StructureType::WoodFrame, 24).unwrap();
        assert_eq!(large.salaries, 365.0);
    }

    #[test]
    fn test_lookup_falls_back_to_any() {
        let table = ExpenseBenchmarkTable::default_table();
        let small = table.lookup(Some(Province::Quebec), StructureType::Concrete, 4).unwrap();
        let large = table.lookup(Some(Province::Quebec), StructureType::Concrete, 40).unwrap();
        assert_eq!(small, large);
    }

    #[test]
    fn test_lookup_missing() {
        let table = ExpenseBenchmarkTable::default_table();
        assert!(table.lookup(None, StructureType::WoodFrame, 4).is_none());
        assert!(table.lookup(Some(Province::Manitoba), StructureType::WoodFrame, 4).is_none());
    }

    #[test]
    fn test_elevator_reserve_is_annualized() {
        let equipment = EquipmentCounts {
            fridges: 4,
            stoves: 4,
            heat_pumps: 2,
            elevators: 1,
            ..Default::default()
        };
        // 8 * 45 + 2 * 115 + 1 * 350 * 12
        assert_eq!(STANDARD_RESERVE.annual_reserve(&equipment), 360.0 + 230.0 + 4200.0);
    }
}
