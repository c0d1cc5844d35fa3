//! Normalized property and financing records consumed by the engine

use serde::{Deserialize, Serialize};

/// Canadian province or territory the property sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    #[serde(rename = "QC")]
    Quebec,
    #[serde(rename = "ON")]
    Ontario,
    #[serde(rename = "BC")]
    BritishColumbia,
    #[serde(rename = "AB")]
    Alberta,
    #[serde(rename = "MB")]
    Manitoba,
    #[serde(rename = "SK")]
    Saskatchewan,
    #[serde(rename = "NS")]
    NovaScotia,
    #[serde(rename = "NB")]
    NewBrunswick,
    #[serde(rename = "NL")]
    NewfoundlandAndLabrador,
    #[serde(rename = "PE")]
    PrinceEdwardIsland,
}

impl Province {
    /// Parse a two-letter province code, case-insensitive
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "QC" => Some(Province::Quebec),
            "ON" => Some(Province::Ontario),
            "BC" => Some(Province::BritishColumbia),
            "AB" => Some(Province::Alberta),
            "MB" => Some(Province::Manitoba),
            "SK" => Some(Province::Saskatchewan),
            "NS" => Some(Province::NovaScotia),
            "NB" => Some(Province::NewBrunswick),
            "NL" => Some(Province::NewfoundlandAndLabrador),
            "PE" => Some(Province::PrinceEdwardIsland),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Province::Quebec => "QC",
            Province::Ontario => "ON",
            Province::BritishColumbia => "BC",
            Province::Alberta => "AB",
            Province::Manitoba => "MB",
            Province::Saskatchewan => "SK",
            Province::NovaScotia => "NS",
            Province::NewBrunswick => "NB",
            Province::NewfoundlandAndLabrador => "NL",
            Province::PrinceEdwardIsland => "PE",
        }
    }
}

/// Building structure, used to pick the expense benchmark row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructureType {
    #[default]
    WoodFrame,
    Concrete,
}

impl StructureType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "woodframe" | "wood_frame" | "wood" => Some(StructureType::WoodFrame),
            "concrete" => Some(StructureType::Concrete),
            _ => None,
        }
    }
}

/// Financing program for the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingType {
    /// Uninsured bank loan, 80% LTV ceiling
    #[default]
    Conventional,
    /// Government-insured loan, 85% LTV ceiling
    Cmhc,
    /// Insured loan under the points-based affordability program
    CmhcAph,
    /// Interest-only private loan sized by a user-supplied LTV
    Private,
}

impl FinancingType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "conventional" => Some(FinancingType::Conventional),
            "cmhc" | "schl" => Some(FinancingType::Cmhc),
            "cmhc_aph" | "aph" => Some(FinancingType::CmhcAph),
            "private" => Some(FinancingType::Private),
            _ => None,
        }
    }

    /// Whether the loan carries a mortgage-insurance premium
    pub fn is_insured(&self) -> bool {
        matches!(self, FinancingType::Cmhc | FinancingType::CmhcAph)
    }
}

/// Gross revenue streams (annual) and vacancy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevenueInput {
    pub annual_rent: f64,
    pub parking: f64,
    pub internet: f64,
    pub storage: f64,
    pub other: f64,
    /// Fraction of gross revenue lost to vacancy
    pub vacancy_rate: f64,
}

impl RevenueInput {
    pub fn gross(&self) -> f64 {
        self.annual_rent + self.parking + self.internet + self.storage + self.other
    }

    /// Scale every revenue stream, leaving the vacancy rate untouched
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            annual_rent: self.annual_rent * factor,
            parking: self.parking * factor,
            internet: self.internet * factor,
            storage: self.storage * factor,
            other: self.other * factor,
            vacancy_rate: self.vacancy_rate,
        }
    }
}

/// Consolidated operating expenses (annual)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseInput {
    pub municipal_taxes: f64,
    pub school_taxes: f64,
    pub insurance: f64,
    pub electricity: f64,
    pub heating: f64,
    pub maintenance: f64,
    /// Fraction of effective revenue paid for management
    pub management_rate: f64,
    pub concierge: f64,
    pub other: f64,
}

impl ExpenseInput {
    pub fn taxes(&self) -> f64 {
        self.municipal_taxes + self.school_taxes
    }

    pub fn utilities(&self) -> f64 {
        self.electricity + self.heating
    }

    /// Scale every dollar amount; the management rate is a ratio and stays put
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            municipal_taxes: self.municipal_taxes * factor,
            school_taxes: self.school_taxes * factor,
            insurance: self.insurance * factor,
            electricity: self.electricity * factor,
            heating: self.heating * factor,
            maintenance: self.maintenance * factor,
            management_rate: self.management_rate,
            concierge: self.concierge * factor,
            other: self.other * factor,
        }
    }
}

/// Itemized operating costs only used in advanced mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancedExpenseInput {
    pub snow_removal: f64,
    pub landscaping: f64,
    pub extermination: f64,
    pub fire_inspection: f64,
    pub cleaning: f64,
    pub elevator_maintenance: f64,
    pub common_area_electricity: f64,
    pub water_heater_rental: f64,
    pub telecommunications: f64,
    pub accounting_fees: f64,
    pub legal_fees: f64,
    pub advertising: f64,
    pub security: f64,
    pub waste_removal: f64,
    pub miscellaneous: f64,
}

impl AdvancedExpenseInput {
    fn fields(&self) -> [f64; 15] {
        [
            self.snow_removal,
            self.landscaping,
            self.extermination,
            self.fire_inspection,
            self.cleaning,
            self.elevator_maintenance,
            self.common_area_electricity,
            self.water_heater_rental,
            self.telecommunications,
            self.accounting_fees,
            self.legal_fees,
            self.advertising,
            self.security,
            self.waste_removal,
            self.miscellaneous,
        ]
    }

    /// Sum of the itemized "other costs"
    pub fn total(&self) -> f64 {
        self.fields().iter().sum()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            snow_removal: self.snow_removal * factor,
            landscaping: self.landscaping * factor,
            extermination: self.extermination * factor,
            fire_inspection: self.fire_inspection * factor,
            cleaning: self.cleaning * factor,
            elevator_maintenance: self.elevator_maintenance * factor,
            common_area_electricity: self.common_area_electricity * factor,
            water_heater_rental: self.water_heater_rental * factor,
            telecommunications: self.telecommunications * factor,
            accounting_fees: self.accounting_fees * factor,
            legal_fees: self.legal_fees * factor,
            advertising: self.advertising * factor,
            security: self.security * factor,
            waste_removal: self.waste_removal * factor,
            miscellaneous: self.miscellaneous * factor,
        }
    }
}

/// Equipment counts used to size the replacement reserve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentCounts {
    pub heat_pumps: u32,
    pub fridges: u32,
    pub stoves: u32,
    pub dishwashers: u32,
    pub washers: u32,
    pub dryers: u32,
    pub elevators: u32,
}

impl EquipmentCounts {
    /// Appliances sharing the per-appliance reserve rate
    pub fn appliances(&self) -> u32 {
        self.fridges + self.stoves + self.dishwashers + self.washers + self.dryers
    }
}

/// Loan program and terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancingInput {
    pub financing_type: FinancingType,
    /// Contract rate (annual, fraction)
    pub interest_rate: f64,
    pub amortization_years: u32,
    pub term_years: u32,
    /// Stress-test rate used for loan sizing; 0 means "use the contract rate"
    pub qualification_rate: f64,
    pub debt_coverage_ratio: f64,
    pub aph_points: u32,
    /// Loan-to-value for private loans (fraction)
    pub private_ltv: f64,
    /// Lender fee as a fraction of the loan amount
    pub origination_fee_rate: f64,
}

impl Default for FinancingInput {
    fn default() -> Self {
        Self {
            financing_type: FinancingType::Conventional,
            interest_rate: 0.0,
            amortization_years: 25,
            term_years: 5,
            qualification_rate: 0.0,
            debt_coverage_ratio: 1.2,
            aph_points: 0,
            private_ltv: 0.0,
            origination_fee_rate: 0.0,
        }
    }
}

impl FinancingInput {
    /// Rate used to size the loan
    pub fn sizing_rate(&self) -> f64 {
        if self.qualification_rate > 0.0 {
            self.qualification_rate
        } else {
            self.interest_rate
        }
    }
}

/// One-off costs paid at acquisition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcquisitionCosts {
    pub notary_fees: f64,
    pub inspection_fees: f64,
    pub other_costs: f64,
    // Advanced-mode only
    pub appraisal_fees: f64,
    pub environmental_study_fees: f64,
    pub renovation_costs: f64,
    pub financing_fees: f64,
    /// Replaces the computed land-transfer tax when present
    pub welcome_tax_override: Option<f64>,
}

impl AcquisitionCosts {
    /// Costs entered in the simple form
    pub fn simple_total(&self) -> f64 {
        self.notary_fees + self.inspection_fees + self.other_costs
    }

    /// Costs entered in the advanced form
    pub fn advanced_total(&self) -> f64 {
        self.simple_total()
            + self.appraisal_fees
            + self.environmental_study_fees
            + self.renovation_costs
            + self.financing_fees
    }
}

/// A fully normalized property and financing record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyInput {
    pub name: Option<String>,
    pub purchase_price: f64,
    pub number_of_units: u32,
    pub province: Option<Province>,
    pub structure_type: StructureType,
    /// False for synthetic records built for derived scenarios
    pub is_initial_purchase: bool,
    pub revenue: RevenueInput,
    pub expenses: ExpenseInput,
    pub advanced_expenses: AdvancedExpenseInput,
    pub equipment: EquipmentCounts,
    pub financing: FinancingInput,
    pub acquisition: AcquisitionCosts,
}

impl Default for PropertyInput {
    fn default() -> Self {
        Self {
            name: None,
            purchase_price: 0.0,
            number_of_units: 1,
            province: None,
            structure_type: StructureType::WoodFrame,
            is_initial_purchase: true,
            revenue: RevenueInput::default(),
            expenses: ExpenseInput::default(),
            advanced_expenses: AdvancedExpenseInput::default(),
            equipment: EquipmentCounts::default(),
            financing: FinancingInput::default(),
            acquisition: AcquisitionCosts::default(),
        }
    }
}

impl PropertyInput {
    /// Unit count, never below one
    pub fn units(&self) -> u32 {
        self.number_of_units.max(1)
    }
}
