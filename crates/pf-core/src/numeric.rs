use core::cmp::Ordering;

use crate::PfError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair for approximate comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, PfError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(PfError::OutOfRange { what, value: v })
    }
}

/// Finite and inside `[lo, hi]`.
pub fn ensure_within(v: Real, lo: Real, hi: Real, what: &'static str) -> Result<Real, PfError> {
    let v = ensure_finite(v, what)?;
    if (lo..=hi).contains(&v) {
        Ok(v)
    } else {
        Err(PfError::OutOfRange { what, value: v })
    }
}

/// Maps an undefined value to `+inf` so it ranks behind every defined one.
#[inline]
pub fn or_worst(v: Option<Real>) -> Real {
    v.unwrap_or(Real::INFINITY)
}

/// Ascending order with `None` after every `Some`.
pub fn cmp_defined_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
