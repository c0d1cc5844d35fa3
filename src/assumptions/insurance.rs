//! Mortgage-insurance premium schedule and loan-to-value ceilings
//!
//! Premium rate = (bracket rate + amortization surcharge) * (1 - APH rebate),
//! billed only on the part of the loan not already insured by a prior scenario.

use serde::{Deserialize, Serialize};

use crate::property::FinancingType;

/// Tolerance when comparing an LTV against a bracket boundary
const LTV_EPSILON: f64 = 1e-9;

/// Upper LTV bound of a premium bracket and its rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumBracket {
    pub max_ltv: f64,
    pub rate: f64,
}

/// Minimum score for a tiered APH benefit, and the value it unlocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AphTier {
    pub min_points: u32,
    pub value: f64,
}

fn tier_value(tiers: &[AphTier], points: u32) -> Option<f64> {
    tiers
        .iter()
        .filter(|t| points >= t.min_points)
        .max_by_key(|t| t.min_points)
        .map(|t| t.value)
}

fn bracket_rate(brackets: &[PremiumBracket], ltv: f64) -> f64 {
    brackets
        .iter()
        .find(|b| ltv <= b.max_ltv + LTV_EPSILON)
        .or_else(|| brackets.last())
        .map(|b| b.rate)
        .unwrap_or(0.0)
}

/// Loan-to-value ceilings by financing program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LtvLimits {
    pub conventional: f64,
    pub cmhc: f64,
    /// APH points -> LTV ceiling; scores below every tier get `cmhc`
    pub aph_tiers: Vec<AphTier>,
}

impl Default for LtvLimits {
    fn default() -> Self {
        Self {
            conventional: 0.80,
            cmhc: 0.85,
            aph_tiers: vec![
                AphTier { min_points: 70, value: 0.90 },
                AphTier { min_points: 100, value: 0.95 },
            ],
        }
    }
}

impl LtvLimits {
    /// Ceiling for the APH program at the given score
    pub fn aph_ceiling(&self, aph_points: u32) -> f64 {
        tier_value(&self.aph_tiers, aph_points).unwrap_or(self.cmhc)
    }

    /// Ceiling for any financing program; private loans use the user's ratio
    pub fn max_ltv(&self, financing_type: FinancingType, aph_points: u32, private_ltv: f64) -> f64 {
        match financing_type {
            FinancingType::Conventional => self.conventional,
            FinancingType::Cmhc => self.cmhc,
            FinancingType::CmhcAph => self.aph_ceiling(aph_points),
            FinancingType::Private => private_ltv.max(0.0),
        }
    }
}

/// Everything needed to price an insured loan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PremiumRequest {
    pub financing_type: FinancingType,
    pub loan_amount: f64,
    pub property_value: f64,
    pub amortization_years: u32,
    pub aph_points: u32,
    /// Principal already insured by a prior scenario
    pub initial_loan_amount: f64,
    pub units: u32,
}

/// Priced premium with its components
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumQuote {
    /// LTV used for bracket selection (fraction)
    pub ltv: f64,
    pub base_rate: f64,
    pub surcharge: f64,
    pub rebate: f64,
    /// Final premium rate (fraction)
    pub rate: f64,
    /// Loan amount the premium is billed on
    pub insured_amount: f64,
    pub premium: f64,
    pub premium_tax: f64,
    pub analysis_fee: f64,
}

/// Premium brackets, surcharges, rebates, and fees for insured loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePremiumSchedule {
    pub standard: Vec<PremiumBracket>,
    /// Brackets for APH loans above `aph_high_ltv_threshold`
    pub aph_high_ltv: Vec<PremiumBracket>,
    pub aph_high_ltv_threshold: f64,
    /// Surcharge per started step beyond the base amortization
    pub surcharge_per_step: f64,
    pub surcharge_step_years: u32,
    pub base_amortization_years: u32,
    pub aph_rebates: Vec<AphTier>,
    pub premium_tax_rate: f64,
    pub analysis_fee_per_unit: f64,
    pub ltv_limits: LtvLimits,
}

impl Default for InsurancePremiumSchedule {
    fn default() -> Self {
        Self {
            standard: vec![
                PremiumBracket { max_ltv: 0.65, rate: 0.0260 },
                PremiumBracket { max_ltv: 0.70, rate: 0.0285 },
                PremiumBracket { max_ltv: 0.75, rate: 0.0335 },
                PremiumBracket { max_ltv: 0.80, rate: 0.0435 },
                PremiumBracket { max_ltv: 0.85, rate: 0.0535 },
            ],
            aph_high_ltv: vec![
                PremiumBracket { max_ltv: 0.90, rate: 0.0590 },
                PremiumBracket { max_ltv: 1.00, rate: 0.0615 },
            ],
            aph_high_ltv_threshold: 0.85,
            surcharge_per_step: 0.0025,
            surcharge_step_years: 5,
            base_amortization_years: 25,
            aph_rebates: vec![
                AphTier { min_points: 50, value: 0.10 },
                AphTier { min_points: 70, value: 0.20 },
                AphTier { min_points: 100, value: 0.30 },
            ],
            premium_tax_rate: 0.09,
            analysis_fee_per_unit: 150.0,
            ltv_limits: LtvLimits::default(),
        }
    }
}

impl InsurancePremiumSchedule {
    /// Bracket rate for an LTV, before surcharge and rebate
    pub fn base_rate(&self, financing_type: FinancingType, ltv: f64) -> f64 {
        if financing_type == FinancingType::CmhcAph && ltv > self.aph_high_ltv_threshold + LTV_EPSILON {
            bracket_rate(&self.aph_high_ltv, ltv)
        } else {
            bracket_rate(&self.standard, ltv)
        }
    }

    /// Surcharge for amortizations longer than the base period
    pub fn amortization_surcharge(&self, amortization_years: u32) -> f64 {
        if amortization_years <= self.base_amortization_years || self.surcharge_step_years == 0 {
            return 0.0;
        }
        let extra = amortization_years - self.base_amortization_years;
        let steps = extra.div_ceil(self.surcharge_step_years);
        steps as f64 * self.surcharge_per_step
    }

    /// Fraction of the premium rebated for an APH score
    pub fn aph_rebate(&self, aph_points: u32) -> f64 {
        tier_value(&self.aph_rebates, aph_points).unwrap_or(0.0)
    }

    /// Price the premium for a loan; uninsured programs get an all-zero quote
    pub fn quote(&self, request: &PremiumRequest) -> PremiumQuote {
        if !request.financing_type.is_insured() {
            return PremiumQuote::default();
        }

        let mut ltv = if request.property_value > 0.0 {
            request.loan_amount / request.property_value
        } else {
            0.0
        };
        if request.financing_type == FinancingType::CmhcAph {
            ltv = ltv.min(self.ltv_limits.aph_ceiling(request.aph_points));
        }

        let base_rate = self.base_rate(request.financing_type, ltv);
        let surcharge = self.amortization_surcharge(request.amortization_years);
        let rebate = if request.financing_type == FinancingType::CmhcAph {
            self.aph_rebate(request.aph_points)
        } else {
            0.0
        };
        let rate = (base_rate + surcharge) * (1.0 - rebate);

        let insured_amount = (request.loan_amount - request.initial_loan_amount).max(0.0);
        let premium = insured_amount * rate;

        PremiumQuote {
            ltv,
            base_rate,
            surcharge,
            rebate,
            rate,
            insured_amount,
            premium,
            premium_tax: premium * self.premium_tax_rate,
            analysis_fee: request.units as f64 * self.analysis_fee_per_unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn request(financing_type: FinancingType, loan: f64, value: f64) -> PremiumRequest {
        PremiumRequest {
            financing_type,
            loan_amount: loan,
            property_value: value,
            amortization_years: 25,
            aph_points: 0,
            initial_loan_amount: 0.0,
            units: 4,
        }
    }

    #[test]
    fn test_standard_brackets() {
        let schedule = InsurancePremiumSchedule::default();
        assert_eq!(schedule.base_rate(FinancingType::Cmhc, 0.50), 0.0260);
        assert_eq!(schedule.base_rate(FinancingType::Cmhc, 0.65), 0.0260);
        assert_eq!(schedule.base_rate(FinancingType::Cmhc, 0.72), 0.0335);
        assert_eq!(schedule.base_rate(FinancingType::Cmhc, 0.85), 0.0535);
        // Above the last bracket the top rate applies
        assert_eq!(schedule.base_rate(FinancingType::Cmhc, 0.95), 0.0535);
    }

    #[test]
    fn test_aph_high_ltv_brackets() {
        let schedule = InsurancePremiumSchedule::default();
        assert_eq!(schedule.base_rate(FinancingType::CmhcAph, 0.80), 0.0435);
        assert_eq!(schedule.base_rate(FinancingType::CmhcAph, 0.88), 0.0590);
        assert_eq!(schedule.base_rate(FinancingType::CmhcAph, 0.95), 0.0615);
    }

    #[test]
    fn test_amortization_surcharge() {
        let schedule = InsurancePremiumSchedule::default();
        assert_eq!(schedule.amortization_surcharge(25), 0.0);
        assert_relative_eq!(schedule.amortization_surcharge(30), 0.0025);
        assert_relative_eq!(schedule.amortization_surcharge(27), 0.0025);
        assert_relative_eq!(schedule.amortization_surcharge(40), 0.0075, max_relative = 1e-12);
    }

    #[test]
    fn test_aph_rebates_and_ceilings() {
        let schedule = InsurancePremiumSchedule::default();
        assert_eq!(schedule.aph_rebate(40), 0.0);
        assert_eq!(schedule.aph_rebate(50), 0.10);
        assert_eq!(schedule.aph_rebate(70), 0.20);
        assert_eq!(schedule.aph_rebate(120), 0.30);

        let limits = &schedule.ltv_limits;
        assert_eq!(limits.aph_ceiling(50), 0.85);
        assert_eq!(limits.aph_ceiling(70), 0.90);
        assert_eq!(limits.aph_ceiling(100), 0.95);
        assert_eq!(limits.max_ltv(FinancingType::Conventional, 0, 0.0), 0.80);
        assert_eq!(limits.max_ltv(FinancingType::Private, 0, 0.65), 0.65);
    }

    #[test]
    fn test_uninsured_programs_pay_nothing() {
        let schedule = InsurancePremiumSchedule::default();
        let quote = schedule.quote(&request(FinancingType::Conventional, 800_000.0, 1_000_000.0));
        assert_eq!(quote, PremiumQuote::default());
    }

    #[test]
    fn test_quote_components() {
        let schedule = InsurancePremiumSchedule::default();
        let quote = schedule.quote(&request(FinancingType::Cmhc, 850_000.0, 1_000_000.0));

        assert_relative_eq!(quote.rate, 0.0535);
        assert_relative_eq!(quote.premium, 850_000.0 * 0.0535, max_relative = 1e-12);
        assert_relative_eq!(quote.premium_tax, quote.premium * 0.09, max_relative = 1e-12);
        assert_eq!(quote.analysis_fee, 600.0);
    }

    #[test]
    fn test_aph_rebate_applies_after_surcharge() {
        let schedule = InsurancePremiumSchedule::default();
        let req = PremiumRequest {
            amortization_years: 40,
            aph_points: 100,
            ..request(FinancingType::CmhcAph, 950_000.0, 1_000_000.0)
        };
        let quote = schedule.quote(&req);
        assert_relative_eq!(quote.rate, (0.0615 + 0.0075) * 0.7, max_relative = 1e-12);
    }

    #[test]
    fn test_premium_billed_on_delta_only() {
        let schedule = InsurancePremiumSchedule::default();
        let full = schedule.quote(&request(FinancingType::Cmhc, 800_000.0, 1_000_000.0));
        let delta = schedule.quote(&PremiumRequest {
            initial_loan_amount: 200_000.0,
            ..request(FinancingType::Cmhc, 800_000.0, 1_000_000.0)
        });
        assert_relative_eq!(full.premium - delta.premium, 200_000.0 * full.rate, max_relative = 1e-9);

        let covered = schedule.quote(&PremiumRequest {
            initial_loan_amount: 900_000.0,
            ..request(FinancingType::Cmhc, 800_000.0, 1_000_000.0)
        });
        assert_eq!(covered.premium, 0.0);
    }
}
