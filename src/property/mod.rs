//! Property records: the raw form boundary, its normalization, and loading

mod data;
mod raw;
pub mod loader;

pub use data::{
    AcquisitionCosts, AdvancedExpenseInput, EquipmentCounts, ExpenseInput, FinancingInput,
    FinancingType, PropertyInput, Province, RevenueInput, StructureType,
};
pub use raw::{parse_flexible_number, FlexNumber, RawProperty};
pub use loader::{load_properties, load_properties_from_reader, load_property_json};
