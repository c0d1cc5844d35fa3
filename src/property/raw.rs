//! Raw boundary record and locale-tolerant number parsing
//!
//! Form fields arrive as plain numbers or as locale-formatted strings such as
//! `"1 250,50 $"` or `"4,5 %"`. Every numeric field passes through
//! [`parse_flexible_number`] exactly once, here, before the engine sees it.
//! Percentages are 0-100 on this side of the boundary and fractions after it.

use serde::{Deserialize, Serialize};

use crate::analysis::MAX_LOAN_YEARS;

use super::data::{
    AcquisitionCosts, AdvancedExpenseInput, EquipmentCounts, ExpenseInput, FinancingInput,
    FinancingType, PropertyInput, Province, RevenueInput, StructureType,
};

/// Parse a locale-formatted number.
///
/// Whitespace (including non-breaking spaces), `$` and `%` are stripped and a
/// comma is read as the decimal separator. Returns `0.0` when the remainder is
/// empty, unparseable, or not finite. Never panics.
pub fn parse_flexible_number(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != '%')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// A numeric form field: either a JSON number or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexNumber {
    Number(f64),
    Text(String),
}

impl FlexNumber {
    /// Numeric value, `0.0` on failure
    pub fn value(&self) -> f64 {
        match self {
            FlexNumber::Number(n) if n.is_finite() => *n,
            FlexNumber::Number(_) => 0.0,
            FlexNumber::Text(s) => parse_flexible_number(s),
        }
    }
}

impl From<f64> for FlexNumber {
    fn from(value: f64) -> Self {
        FlexNumber::Number(value)
    }
}

impl From<&str> for FlexNumber {
    fn from(value: &str) -> Self {
        FlexNumber::Text(value.to_string())
    }
}

fn num(field: &Option<FlexNumber>) -> f64 {
    field.as_ref().map(FlexNumber::value).unwrap_or(0.0)
}

fn pct(field: &Option<FlexNumber>) -> f64 {
    num(field) / 100.0
}

/// Non-negative whole count, `default` when missing or unparseable
fn count(field: &Option<FlexNumber>, default: u32) -> u32 {
    match field.as_ref().map(FlexNumber::value) {
        Some(v) if v >= 0.0 && v < u32::MAX as f64 => v.floor() as u32,
        _ => default,
    }
}

/// Loan duration in years, capped at [`MAX_LOAN_YEARS`]
fn loan_years(field: &Option<FlexNumber>, default: u32) -> u32 {
    count(field, default).min(MAX_LOAN_YEARS)
}

/// Flat record exactly as collected by the input forms
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProperty {
    pub name: Option<String>,
    pub purchase_price: Option<FlexNumber>,
    pub number_of_units: Option<FlexNumber>,
    pub province: Option<String>,
    pub structure_type: Option<String>,

    // Revenue
    pub annual_rent: Option<FlexNumber>,
    pub parking_revenue: Option<FlexNumber>,
    pub internet_revenue: Option<FlexNumber>,
    pub storage_revenue: Option<FlexNumber>,
    pub other_revenue: Option<FlexNumber>,
    pub vacancy_rate: Option<FlexNumber>,

    // Operating expenses
    pub municipal_taxes: Option<FlexNumber>,
    pub school_taxes: Option<FlexNumber>,
    pub insurance: Option<FlexNumber>,
    pub electricity: Option<FlexNumber>,
    pub heating: Option<FlexNumber>,
    pub maintenance: Option<FlexNumber>,
    pub management_rate: Option<FlexNumber>,
    pub concierge: Option<FlexNumber>,
    pub other_expenses: Option<FlexNumber>,

    // Advanced operating expenses
    pub snow_removal: Option<FlexNumber>,
    pub landscaping: Option<FlexNumber>,
    pub extermination: Option<FlexNumber>,
    pub fire_inspection: Option<FlexNumber>,
    pub cleaning: Option<FlexNumber>,
    pub elevator_maintenance: Option<FlexNumber>,
    pub common_area_electricity: Option<FlexNumber>,
    pub water_heater_rental: Option<FlexNumber>,
    pub telecommunications: Option<FlexNumber>,
    pub accounting_fees: Option<FlexNumber>,
    pub legal_fees: Option<FlexNumber>,
    pub advertising: Option<FlexNumber>,
    pub security: Option<FlexNumber>,
    pub waste_removal: Option<FlexNumber>,
    pub miscellaneous_expenses: Option<FlexNumber>,

    // Equipment
    pub heat_pumps: Option<FlexNumber>,
    pub fridges: Option<FlexNumber>,
    pub stoves: Option<FlexNumber>,
    pub dishwashers: Option<FlexNumber>,
    pub washers: Option<FlexNumber>,
    pub dryers: Option<FlexNumber>,
    pub elevators: Option<FlexNumber>,

    // Financing
    pub financing_type: Option<String>,
    pub interest_rate: Option<FlexNumber>,
    pub amortization_years: Option<FlexNumber>,
    pub term_years: Option<FlexNumber>,
    pub qualification_rate: Option<FlexNumber>,
    pub debt_coverage_ratio: Option<FlexNumber>,
    pub aph_points: Option<FlexNumber>,
    pub private_ltv: Option<FlexNumber>,
    pub origination_fee: Option<FlexNumber>,

    // Acquisition costs
    pub notary_fees: Option<FlexNumber>,
    pub inspection_fees: Option<FlexNumber>,
    pub other_acquisition_costs: Option<FlexNumber>,
    pub appraisal_fees: Option<FlexNumber>,
    pub environmental_study_fees: Option<FlexNumber>,
    pub renovation_costs: Option<FlexNumber>,
    pub financing_fees: Option<FlexNumber>,
    pub welcome_tax: Option<FlexNumber>,
}

impl RawProperty {
    /// Normalize every field into a [`PropertyInput`]
    pub fn normalize(&self) -> PropertyInput {
        let defaults = FinancingInput::default();

        PropertyInput {
            name: self.name.clone(),
            purchase_price: num(&self.purchase_price),
            number_of_units: count(&self.number_of_units, 1).max(1),
            province: self.province.as_deref().and_then(Province::from_code),
            structure_type: self
                .structure_type
                .as_deref()
                .and_then(StructureType::from_code)
                .unwrap_or_default(),
            is_initial_purchase: true,
            revenue: RevenueInput {
                annual_rent: num(&self.annual_rent),
                parking: num(&self.parking_revenue),
                internet: num(&self.internet_revenue),
                storage: num(&self.storage_revenue),
                other: num(&self.other_revenue),
                vacancy_rate: pct(&self.vacancy_rate),
            },
            expenses: ExpenseInput {
                municipal_taxes: num(&self.municipal_taxes),
                school_taxes: num(&self.school_taxes),
                insurance: num(&self.insurance),
                electricity: num(&self.electricity),
                heating: num(&self.heating),
                maintenance: num(&self.maintenance),
                management_rate: pct(&self.management_rate),
                concierge: num(&self.concierge),
                other: num(&self.other_expenses),
            },
            advanced_expenses: AdvancedExpenseInput {
                snow_removal: num(&self.snow_removal),
                landscaping: num(&self.landscaping),
                extermination: num(&self.extermination),
                fire_inspection: num(&self.fire_inspection),
                cleaning: num(&self.cleaning),
                elevator_maintenance: num(&self.elevator_maintenance),
                common_area_electricity: num(&self.common_area_electricity),
                water_heater_rental: num(&self.water_heater_rental),
                telecommunications: num(&self.telecommunications),
                accounting_fees: num(&self.accounting_fees),
                legal_fees: num(&self.legal_fees),
                advertising: num(&self.advertising),
                security: num(&self.security),
                waste_removal: num(&self.waste_removal),
                miscellaneous: num(&self.miscellaneous_expenses),
            },
            equipment: EquipmentCounts {
                heat_pumps: count(&self.heat_pumps, 0),
                fridges: count(&self.fridges, 0),
                stoves: count(&self.stoves, 0),
                dishwashers: count(&self.dishwashers, 0),
                washers: count(&self.washers, 0),
                dryers: count(&self.dryers, 0),
                elevators: count(&self.elevators, 0),
            },
            financing: FinancingInput {
                financing_type: self
                    .financing_type
                    .as_deref()
                    .and_then(FinancingType::from_code)
                    .unwrap_or_default(),
                interest_rate: pct(&self.interest_rate),
                amortization_years: loan_years(&self.amortization_years, defaults.amortization_years),
                term_years: loan_years(&self.term_years, defaults.term_years),
                qualification_rate: pct(&self.qualification_rate),
                debt_coverage_ratio: self
                    .debt_coverage_ratio
                    .as_ref()
                    .map(FlexNumber::value)
                    .unwrap_or(defaults.debt_coverage_ratio),
                aph_points: count(&self.aph_points, 0),
                private_ltv: pct(&self.private_ltv),
                origination_fee_rate: pct(&self.origination_fee),
            },
            acquisition: AcquisitionCosts {
                notary_fees: num(&self.notary_fees),
                inspection_fees: num(&self.inspection_fees),
                other_costs: num(&self.other_acquisition_costs),
                appraisal_fees: num(&self.appraisal_fees),
                environmental_study_fees: num(&self.environmental_study_fees),
                renovation_costs: num(&self.renovation_costs),
                financing_fees: num(&self.financing_fees),
                welcome_tax_override: self.welcome_tax.as_ref().map(FlexNumber::value),
            },
        }
    }
}

impl From<RawProperty> for PropertyInput {
    fn from(raw: RawProperty) -> Self {
        raw.normalize()
    }
}
