//! Progressive land-transfer ("welcome") tax on the purchase price

use serde::{Deserialize, Serialize};

/// Marginal rate applied from `lower_bound` up to the next bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub lower_bound: f64,
    pub rate: f64,
}

/// Land-transfer tax brackets, sorted by lower bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandTransferTax {
    brackets: Vec<TaxBracket>,
}

impl LandTransferTax {
    pub fn from_brackets(mut brackets: Vec<TaxBracket>) -> Self {
        brackets.sort_by(|a, b| a.lower_bound.total_cmp(&b.lower_bound));
        Self { brackets }
    }

    pub fn default_brackets() -> Self {
        Self::from_brackets(vec![
            TaxBracket { lower_bound: 0.0, rate: 0.005 },
            TaxBracket { lower_bound: 61_500.0, rate: 0.010 },
            TaxBracket { lower_bound: 307_800.0, rate: 0.015 },
            TaxBracket { lower_bound: 601_525.0, rate: 0.030 },
        ])
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Tax owed on a purchase price, applied marginally
    pub fn compute(&self, price: f64) -> f64 {
        if !(price > 0.0) {
            return 0.0;
        }

        self.brackets
            .iter()
            .enumerate()
            .map(|(i, bracket)| {
                let upper = self
                    .brackets
                    .get(i + 1)
                    .map(|next| next.lower_bound)
                    .unwrap_or(f64::INFINITY);
                let taxable = price.min(upper) - bracket.lower_bound;
                taxable.max(0.0) * bracket.rate
            })
            .sum()
    }
}

impl Default for LandTransferTax {
    fn default() -> Self {
        Self::default_brackets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_bracket_only() {
        let tax = LandTransferTax::default_brackets();
        assert_relative_eq!(tax.compute(50_000.0), 250.0);
        assert_relative_eq!(tax.compute(61_500.0), 307.5);
    }

    #[test]
    fn test_marginal_application() {
        let tax = LandTransferTax::default_brackets();
        // 307.5 + 2463 + 2883
        assert_relative_eq!(tax.compute(500_000.0), 5_653.5, max_relative = 1e-12);
        // 307.5 + 2463 + 4405.875 + 11954.25
        assert_relative_eq!(tax.compute(1_000_000.0), 19_130.625, max_relative = 1e-12);
    }

    #[test]
    fn test_non_positive_price() {
        let tax = LandTransferTax::default_brackets();
        assert_eq!(tax.compute(0.0), 0.0);
        assert_eq!(tax.compute(-10.0), 0.0);
        assert_eq!(tax.compute(f64::NAN), 0.0);
    }

    #[test]
    fn test_unsorted_brackets_are_sorted() {
        let tax = LandTransferTax::from_brackets(vec![
            TaxBracket { lower_bound: 100.0, rate: 0.1 },
            TaxBracket { lower_bound: 0.0, rate: 0.0 },
        ]);
        assert_relative_eq!(tax.compute(200.0), 10.0);
    }
}
