//! Internal Rate of Return (IRR) calculation
//!
//! Used to rate a multi-year holding period from its yearly cash flows

use log::debug;

/// Lowest rate searched (-99.99% per period)
pub const IRR_LOWER_BOUND: f64 = -0.9999;

/// Highest rate searched (100% per period)
pub const IRR_UPPER_BOUND: f64 = 1.0;

const MAX_ITERATIONS: usize = 1000;
const NEWTON_ITERATIONS: usize = 50;
const NPV_TOLERANCE: f64 = 1e-7;

/// Net present value of `cashflows` at a periodic `rate`; index 0 is undiscounted
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

/// Calculate the periodic IRR of a cash-flow series.
///
/// Searches `[IRR_LOWER_BOUND, IRR_UPPER_BOUND]`. Returns 0 when the NPV has
/// the same sign at both ends, since no root can be bracketed (for example an
/// investment that is never recovered). Newton-Raphson runs first; bisection
/// takes over if it leaves the bracket or stalls.
///
/// # Returns
/// * `f64` - rate per period as a decimal (0.05 for 5%)
pub fn calculate_irr(cashflows: &[f64]) -> f64 {
    if cashflows.is_empty() {
        return 0.0;
    }

    let npv_low = npv(cashflows, IRR_LOWER_BOUND);
    let npv_high = npv(cashflows, IRR_UPPER_BOUND);

    if npv_low.abs() < NPV_TOLERANCE {
        return IRR_LOWER_BOUND;
    }
    if npv_high.abs() < NPV_TOLERANCE {
        return IRR_UPPER_BOUND;
    }
    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        debug!(
            "IRR not bracketed: npv({}) = {}, npv({}) = {}",
            IRR_LOWER_BOUND, npv_low, IRR_UPPER_BOUND, npv_high
        );
        return 0.0;
    }

    if let Some(rate) = newton(cashflows) {
        return rate;
    }

    debug!("Newton-Raphson did not converge, falling back to bisection");
    bisection(cashflows, npv_low)
}

fn newton(cashflows: &[f64]) -> Option<f64> {
    let mut rate = 0.1;

    for _ in 0..NEWTON_ITERATIONS {
        let (value, derivative) = npv_and_derivative(cashflows, rate);
        if value.abs() < NPV_TOLERANCE {
            return Some(rate);
        }
        if derivative.abs() < 1e-20 || !derivative.is_finite() {
            return None;
        }

        let next = rate - value / derivative;
        if !(IRR_LOWER_BOUND..=IRR_UPPER_BOUND).contains(&next) {
            return None;
        }
        rate = next;
    }

    None
}

fn bisection(cashflows: &[f64], npv_low: f64) -> f64 {
    let mut low = IRR_LOWER_BOUND;
    let mut high = IRR_UPPER_BOUND;
    let mut low_sign = npv_low.signum();
    let mut mid = (low + high) / 2.0;

    for _ in 0..MAX_ITERATIONS {
        mid = (low + high) / 2.0;
        let npv_mid = npv(cashflows, mid);

        if npv_mid.abs() < NPV_TOLERANCE || high - low < f64::EPSILON {
            return mid;
        }

        if npv_mid.signum() == low_sign {
            low = mid;
            low_sign = npv_mid.signum();
        } else {
            high = mid;
        }
    }

    mid
}
