//! CSV-based loader for revised reference tables
//!
//! Loads expense benchmarks from data/assumptions/expense_benchmarks.csv

use std::fs::File;
use std::path::Path;

use super::benchmark::{BenchmarkRow, ExpenseBenchmark, ReplacementReserveRates, SizeClass};
use crate::error::{EngineError, EngineResult};
use crate::property::{Province, StructureType};

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// File name of the benchmark table inside the assumptions directory
pub const BENCHMARK_FILE: &str = "expense_benchmarks.csv";

/// Raw CSV row matching expense_benchmarks.csv columns
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    province: String,
    structure_type: String,
    size_class: String,
    maintenance: f64,
    management_rate: f64,
    salaries: f64,
    other_cost_rate: f64,
    appliance_reserve: f64,
    heat_pump_reserve: f64,
    elevator_reserve: f64,
}

fn invalid(reason: String) -> EngineError {
    EngineError::InvalidTable {
        table: BENCHMARK_FILE.to_string(),
        reason,
    }
}

impl CsvRow {
    fn into_row(self) -> EngineResult<BenchmarkRow> {
        let province = Province::from_code(&self.province)
            .ok_or_else(|| invalid(format!("unknown province: {}", self.province)))?;

        let structure_type = StructureType::from_code(&self.structure_type)
            .ok_or_else(|| invalid(format!("unknown structure type: {}", self.structure_type)))?;

        let size_class = match self.size_class.trim().to_ascii_lowercase().as_str() {
            "small" => SizeClass::Small,
            "large" => SizeClass::Large,
            "any" => SizeClass::Any,
            other => return Err(invalid(format!("unknown size class: {}", other))),
        };

        let values = [
            self.maintenance,
            self.management_rate,
            self.salaries,
            self.other_cost_rate,
            self.appliance_reserve,
            self.heat_pump_reserve,
            self.elevator_reserve,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid(format!(
                "negative or non-finite value for {} {:?}",
                self.province, structure_type
            )));
        }

        Ok(BenchmarkRow {
            province,
            structure_type,
            size_class,
            benchmark: ExpenseBenchmark {
                maintenance: self.maintenance,
                management_rate: self.management_rate,
                salaries: self.salaries,
                other_cost_rate: self.other_cost_rate,
                replacement_reserve: ReplacementReserveRates {
                    appliance: self.appliance_reserve,
                    heat_pump: self.heat_pump_reserve,
                    elevator: self.elevator_reserve,
                },
            },
        })
    }
}

/// Load benchmark rows from any CSV reader
pub fn load_benchmarks_from_reader<R: std::io::Read>(reader: R) -> EngineResult<Vec<BenchmarkRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let record: CsvRow = result?;
        rows.push(record.into_row()?);
    }

    if rows.is_empty() {
        return Err(invalid("no rows".to_string()));
    }

    Ok(rows)
}

/// Load benchmark rows from the given assumptions directory
pub fn load_benchmarks(path: &Path) -> EngineResult<Vec<BenchmarkRow>> {
    let file = File::open(path.join(BENCHMARK_FILE))?;
    load_benchmarks_from_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "province,structureType,sizeClass,maintenance,managementRate,salaries,otherCostRate,applianceReserve,heatPumpReserve,elevatorReserve\n";

    #[test]
    fn test_load_benchmarks() {
        let data = format!(
            "{HEADER}QC,woodFrame,small,600,0.04,0,0.01,40,100,300\nQC,concrete,any,700,0.05,400,0.02,40,100,300\n"
        );
        let rows = load_benchmarks_from_reader(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].province, Province::Quebec);
        assert_eq!(rows[0].size_class, SizeClass::Small);
        assert_eq!(rows[1].structure_type, StructureType::Concrete);
        assert_eq!(rows[1].benchmark.replacement_reserve.elevator, 300.0);
    }

    #[test]
    fn test_rejects_unknown_province() {
        let data = format!("{HEADER}XX,woodFrame,small,600,0.04,0,0.01,40,100,300\n");
        let err = load_benchmarks_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTable { .. }));
    }

    #[test]
    fn test_rejects_negative_values() {
        let data = format!("{HEADER}QC,woodFrame,small,-600,0.04,0,0.01,40,100,300\n");
        assert!(load_benchmarks_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_empty_table() {
        assert!(load_benchmarks_from_reader(HEADER.as_bytes()).is_err());
    }
}
