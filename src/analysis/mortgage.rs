//! Mortgage arithmetic shared by the analysis, scenario, and projection code
//!
//! Rates quoted on Canadian mortgages compound semi-annually; every monthly
//! rate in the crate comes from [`monthly_rate`].

/// Longest amortization, term, or elapsed period a loan can span
pub const MAX_LOAN_YEARS: u32 = 100;

/// Months in `years` of a loan, with `years` capped at [`MAX_LOAN_YEARS`]
pub fn loan_months(years: u32) -> u32 {
    years.min(MAX_LOAN_YEARS) * 12
}

/// Convert an annual rate compounded semi-annually to the equivalent monthly rate.
///
/// `(1 + annual / 2)^(1/6) - 1`. Rates at or below -200% have no meaning and
/// map to 0.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    let half = 1.0 + annual_rate / 2.0;
    if !(half > 0.0) || !annual_rate.is_finite() {
        return 0.0;
    }
    half.powf(1.0 / 6.0) - 1.0
}

/// Level payment that amortizes `principal` over `n_months`.
///
/// Zero rate spreads the principal evenly; zero periods yields no payment.
pub fn payment(principal: f64, monthly_rate: f64, n_months: u32) -> f64 {
    if n_months == 0 {
        return 0.0;
    }
    if monthly_rate.abs() < 1e-12 {
        return principal / n_months as f64;
    }
    let discount = (1.0 + monthly_rate).powf(-(n_months as f64));
    principal * monthly_rate / (1.0 - discount)
}

/// Principal that a level payment can carry over `n_months` (annuity present value)
pub fn present_value(payment: f64, monthly_rate: f64, n_months: u32) -> f64 {
    if n_months == 0 {
        return 0.0;
    }
    if monthly_rate.abs() < 1e-12 {
        return payment * n_months as f64;
    }
    let discount = (1.0 + monthly_rate).powf(-(n_months as f64));
    payment * (1.0 - discount) / monthly_rate
}

/// Monthly payment of an interest-only loan
pub fn interest_only_payment(principal: f64, annual_rate: f64) -> f64 {
    principal * annual_rate / 12.0
}

/// Balance left after `elapsed` of `total` scheduled payments.
///
/// Closed form `L * (F^N - F^n) / (F^N - 1)` with `F = 1 + r`. A loan with no
/// schedule keeps its principal; a finished schedule owes nothing.
pub fn remaining_balance(principal: f64, monthly_rate: f64, total: u32, elapsed: u32) -> f64 {
    if total == 0 {
        return principal;
    }
    if elapsed >= total {
        return 0.0;
    }
    if monthly_rate.abs() < 1e-12 {
        return principal * (1.0 - elapsed as f64 / total as f64);
    }
    let factor = 1.0 + monthly_rate;
    let owed = if factor > 1.0 {
        // Same ratio divided through by F^N, finite for any schedule length
        (1.0 - factor.powf(elapsed as f64 - total as f64)) / (1.0 - factor.powf(-(total as f64)))
    } else {
        let f_total = factor.powf(total as f64);
        (f_total - factor.powf(elapsed as f64)) / (f_total - 1.0)
    };
    principal * owed
}

/// Principal repaid over the first `periods` payments of a loan
pub fn principal_paid(principal: f64, monthly_rate: f64, payment: f64, periods: u32) -> f64 {
    let mut balance = principal;
    let mut repaid = 0.0;

    for _ in 0..periods {
        if balance <= 0.0 {
            break;
        }
        let interest = balance * monthly_rate;
        let portion = (payment - interest).min(balance).max(0.0);
        balance -= portion;
        repaid += portion;
    }

    repaid
}

/// Division that yields 0 instead of infinity or NaN
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_semi_annual_conversion() {
        let r = monthly_rate(0.05);
        // Six monthly periods compound to one half-year period
        assert_relative_eq!((1.0 + r).powi(6), 1.025, max_relative = 1e-12);
        assert_eq!(monthly_rate(0.0), 0.0);
        assert_eq!(monthly_rate(-5.0), 0.0);
    }

    #[test]
    fn test_canadian_payment() {
        // 100k at 5% over 25 years with semi-annual compounding
        let pmt = payment(100_000.0, monthly_rate(0.05), 300);
        assert_abs_diff_eq!(pmt, 581.60, epsilon = 0.01);
    }

    #[test]
    fn test_payment_and_present_value_are_inverse() {
        let r = monthly_rate(0.065);
        let pmt = payment(250_000.0, r, 360);
        assert_relative_eq!(present_value(pmt, r, 360), 250_000.0, max_relative = 1e-10);
    }

    #[test]
    fn test_zero_rate_and_zero_term() {
        assert_eq!(payment(12_000.0, 0.0, 12), 1_000.0);
        assert_eq!(present_value(1_000.0, 0.0, 12), 12_000.0);
        assert_eq!(payment(12_000.0, 0.01, 0), 0.0);
        assert_eq!(present_value(1_000.0, 0.01, 0), 0.0);
        assert_eq!(remaining_balance(12_000.0, 0.0, 12, 3), 9_000.0);
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let r = monthly_rate(0.05);
        assert_relative_eq!(remaining_balance(500_000.0, r, 300, 0), 500_000.0, max_relative = 1e-12);
        assert_eq!(remaining_balance(500_000.0, r, 300, 300), 0.0);
        assert_eq!(remaining_balance(500_000.0, r, 300, 400), 0.0);
        assert_eq!(remaining_balance(500_000.0, r, 0, 10), 500_000.0);
    }

    #[test]
    fn test_closed_form_matches_iteration() {
        let r = monthly_rate(0.05);
        let pmt = payment(400_000.0, r, 300);
        let repaid = principal_paid(400_000.0, r, pmt, 60);
        let closed = remaining_balance(400_000.0, r, 300, 60);
        assert_relative_eq!(400_000.0 - repaid, closed, max_relative = 1e-9);
    }

    #[test]
    fn test_interest_only_repays_nothing() {
        let r = monthly_rate(0.08);
        let pmt = 200_000.0 * r;
        assert_abs_diff_eq!(principal_paid(200_000.0, r, pmt, 12), 0.0, epsilon = 1e-6);
        assert_relative_eq!(interest_only_payment(120_000.0, 0.10), 1_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_loan_months_capped() {
        assert_eq!(loan_months(25), 300);
        assert_eq!(loan_months(MAX_LOAN_YEARS), 1_200);
        assert_eq!(loan_months(u32::MAX), 1_200);
    }

    #[test]
    fn test_long_schedules_stay_finite() {
        let r = monthly_rate(0.05);
        assert_relative_eq!(payment(100_000.0, r, u32::MAX), 100_000.0 * r, max_relative = 1e-12);
        assert_relative_eq!(present_value(1_000.0, r, u32::MAX), 1_000.0 / r, max_relative = 1e-12);

        let balance = remaining_balance(100_000.0, r, u32::MAX, 120);
        assert!(balance.is_finite());
        assert_relative_eq!(balance, 100_000.0, max_relative = 1e-12);
        assert_relative_eq!(
            remaining_balance(100_000.0, r, u32::MAX, u32::MAX - 12),
            present_value(payment(100_000.0, r, u32::MAX), r, 12),
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, 4.0), 2.5);
        assert_eq!(safe_div(1.0, f64::NAN), 0.0);
    }
}
