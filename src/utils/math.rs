//! Fixed-point arithmetic and financial math primitives.
//!
//! Two decimal conventions run through the protocol: 18-decimal [`Wad`]
//! values for rates, balances and risk parameters, and 27-decimal [`Ray`]
//! values for cumulative yield indices. Both are backed by
//! [`rust_decimal::Decimal`] (96-bit mantissa, 28 significant digits), which
//! keeps 27-decimal index quotients precise where a 128-bit integer
//! representation would overflow.
//!
//! Transcendental functions (exp, ln, sqrt, pow) are implemented over
//! `Decimal` with explicit series/Newton iterations converging to
//! [`SERIES_TOLERANCE`]; every higher-level financial formula in the crate
//! reduces to them.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::{Error, Result};
use crate::utils::constants::{EXP_INPUT_LIMIT, SECONDS_PER_YEAR, SERIES_TOLERANCE};

// ═══════════════════════════════════════════════════════════════════════════════
// WAD
// ═══════════════════════════════════════════════════════════════════════════════

/// Signed fixed-point number with 18 decimal places.
///
/// Used for rates, APYs, token balances, risk parameters and margin
/// requirements. Multiplication and division round the result back to 18
/// decimal places.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Wad(Decimal);

impl Wad {
    /// Decimal places of the representation
    pub const DECIMALS: u32 = 18;

    /// Zero value
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// One (1.0)
    pub const ONE: Self = Self(Decimal::ONE);

    /// Create a new Wad, rounding to 18 decimal places
    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp(Self::DECIMALS))
    }

    /// Create from a signed integer
    pub fn from_int(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    /// The underlying decimal value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the value is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if the value is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Minimum of two values
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Maximum of two values
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    /// Natural exponential e^self
    pub fn exp(self) -> Result<Self> {
        Ok(Self::new(dec_exp(self.0)?))
    }

    /// Natural logarithm; fails on non-positive input
    pub fn ln(self) -> Result<Self> {
        Ok(Self::new(dec_ln(self.0)?))
    }

    /// Square root; fails on negative input
    pub fn sqrt(self) -> Result<Self> {
        Ok(Self::new(dec_sqrt(self.0)?))
    }

    /// self^exponent for strictly positive self
    pub fn pow(self, exponent: Self) -> Result<Self> {
        Ok(Self::new(dec_pow(self.0, exponent.0)?))
    }
}

impl Add for Wad {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Wad {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul for Wad {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.0 * rhs.0)
    }
}

impl Div for Wad {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self::new(self.0 / rhs.0)
    }
}

impl Neg for Wad {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAY
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed-point number with 27 decimal places.
///
/// Used for cumulative yield-index values (e.g. a lending pool's normalized
/// income). Index values are non-negative by protocol assumption; the type
/// itself carries no arithmetic beyond comparison and conversion, because
/// index math always routes through [`growth_between`] and the Wad layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Ray(Decimal);

impl Ray {
    /// Decimal places of the representation
    pub const DECIMALS: u32 = 27;

    /// Zero value
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// One (1.0), a freshly initialized yield index
    pub const ONE: Self = Self(Decimal::ONE);

    /// Create a new Ray, rounding to 27 decimal places
    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp(Self::DECIMALS))
    }

    /// The underlying decimal value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the value is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Convert to the 18-decimal Wad convention, rounding
    pub fn to_wad(&self) -> Wad {
        Wad::new(self.0)
    }

    /// Widen an 18-decimal Wad into the Ray convention
    pub fn from_wad(wad: Wad) -> Self {
        Self(wad.value())
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSCENDENTAL FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// e^x over Decimal.
///
/// Negative inputs go through the reciprocal; positive inputs are halved
/// into `[0, 0.25]`, summed by Taylor series to [`SERIES_TOLERANCE`], then
/// squared back. Inputs above [`EXP_INPUT_LIMIT`] would overflow the
/// mantissa and fail with `MathDomain`.
pub fn dec_exp(x: Decimal) -> Result<Decimal> {
    if x.is_sign_negative() {
        let positive = dec_exp(-x)?;
        return Ok(Decimal::ONE / positive);
    }
    if x > EXP_INPUT_LIMIT {
        return Err(Error::MathDomain {
            operation: format!("exp({x})"),
        });
    }

    let mut reduced = x;
    let mut halvings = 0u32;
    while reduced > dec!(0.25) {
        reduced /= dec!(2);
        halvings += 1;
    }

    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for n in 1u32..64 {
        term = term * reduced / Decimal::from(n);
        sum += term;
        if term < SERIES_TOLERANCE {
            break;
        }
    }

    for _ in 0..halvings {
        sum *= sum;
    }
    Ok(sum)
}

/// Natural logarithm over Decimal; fails on non-positive input.
///
/// The argument is pulled into `(0.9, 1.1)` by repeated square roots, then
/// evaluated with the artanh series `ln z = 2·(t + t³/3 + t⁵/5 + …)` for
/// `t = (z−1)/(z+1)`.
pub fn dec_ln(x: Decimal) -> Result<Decimal> {
    if x <= Decimal::ZERO {
        return Err(Error::MathDomain {
            operation: format!("ln({x})"),
        });
    }

    let mut reduced = x;
    let mut doublings = 0u32;
    while reduced > dec!(1.1) || reduced < dec!(0.9) {
        reduced = dec_sqrt(reduced)?;
        doublings += 1;
        if doublings > 32 {
            return Err(Error::MathDomain {
                operation: format!("ln({x})"),
            });
        }
    }

    let t = (reduced - Decimal::ONE) / (reduced + Decimal::ONE);
    let t_squared = t * t;
    let mut term = t;
    let mut sum = t;
    let mut n = 3u32;
    while term.abs() > SERIES_TOLERANCE && n < 199 {
        term *= t_squared;
        sum += term / Decimal::from(n);
        n += 2;
    }

    Ok(dec!(2) * sum * Decimal::from(1u64 << doublings))
}

/// Square root over Decimal via Newton iteration; fails on negative input.
pub fn dec_sqrt(x: Decimal) -> Result<Decimal> {
    if x.is_sign_negative() {
        return Err(Error::MathDomain {
            operation: format!("sqrt({x})"),
        });
    }
    if x.is_zero() {
        return Ok(Decimal::ZERO);
    }

    // f64 seed gets within ~1e-15 relative; a handful of Newton steps does
    // the rest
    let seed = x
        .to_f64()
        .map(f64::sqrt)
        .and_then(Decimal::from_f64)
        .filter(|s| !s.is_zero())
        .unwrap_or(x);

    let mut guess = seed;
    for _ in 0..32 {
        let next = (guess + x / guess) / dec!(2);
        if (next - guess).abs() <= SERIES_TOLERANCE {
            return Ok(next);
        }
        guess = next;
    }
    Ok(guess)
}

/// base^exponent for strictly positive base, via exp(exponent · ln(base)).
pub fn dec_pow(base: Decimal, exponent: Decimal) -> Result<Decimal> {
    if exponent.is_zero() {
        return Ok(Decimal::ONE);
    }
    let log = dec_ln(base)?;
    let scaled = exponent.checked_mul(log).ok_or_else(|| Error::MathDomain {
        operation: format!("pow({base}, {exponent})"),
    })?;
    dec_exp(scaled)
}

// ═══════════════════════════════════════════════════════════════════════════════
// DAY COUNT AND ACCRUAL
// ═══════════════════════════════════════════════════════════════════════════════

/// Convert a seconds duration to a fractional year (365-day convention)
pub fn year_fraction(seconds: u64) -> Wad {
    Wad::new(Decimal::from(seconds) / Decimal::from(SECONDS_PER_YEAR))
}

/// Compounding growth factor `(1 + apy)^yearFraction(seconds)`
pub fn accrual_factor(apy: Wad, seconds: u64) -> Result<Wad> {
    if seconds == 0 {
        return Ok(Wad::ONE);
    }
    let base = Decimal::ONE + apy.value();
    Ok(Wad::new(dec_pow(base, year_fraction(seconds).value())?))
}

/// Annualize a raw growth rate observed over `seconds`:
/// `(1 + rate)^(1/yearFraction) − 1`
pub fn annualized(rate: Wad, seconds: u64) -> Result<Wad> {
    if seconds == 0 {
        return Err(Error::MathDomain {
            operation: "annualized over zero seconds".into(),
        });
    }
    let exponent = Decimal::from(SECONDS_PER_YEAR) / Decimal::from(seconds);
    let grown = dec_pow(Decimal::ONE + rate.value(), exponent)?;
    Ok(Wad::new(grown - Decimal::ONE))
}

/// Un-annualized growth between two index values, `to/from − 1`.
///
/// A decreasing index clamps to zero rather than producing a negative rate;
/// the protocol assumes cumulative indices are non-decreasing and downstream
/// margin math relies on non-negative rates. The clamp is logged.
pub fn growth_between(from: Ray, to: Ray) -> Result<Wad> {
    if from.is_zero() {
        return Err(Error::MathDomain {
            operation: "growth from zero index".into(),
        });
    }
    if to <= from {
        if to < from {
            tracing::warn!(%from, %to, "yield index decreased; clamping rate to zero");
        }
        return Ok(Wad::ZERO);
    }
    Ok(Wad::new(to.value() / from.value() - Decimal::ONE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
        (a - b).abs() <= tolerance
    }

    const TIGHT: Decimal = dec!(0.000000000000000001);

    #[test]
    fn test_wad_basic_ops() {
        let one = Wad::ONE;
        let two = Wad::from_int(2);

        assert_eq!(one + one, two);
        assert_eq!(two - one, one);
        assert_eq!(one * two, two);
        assert_eq!(two / one, two);
        assert_eq!(-one + one, Wad::ZERO);
        assert!((-one).is_negative());
        assert_eq!((-two).abs(), two);
    }

    #[test]
    fn test_wad_rounds_to_18_places() {
        let third = Wad::ONE / Wad::from_int(3);
        assert_eq!(third.value().scale(), 18);
    }

    #[test]
    fn test_ray_wad_conversion() {
        let ray = Ray::new(dec!(1.234567890123456789012345678));
        assert_eq!(ray.value().scale(), 27);
        assert_eq!(ray.to_wad(), Wad::new(dec!(1.234567890123456789)));
        assert_eq!(Ray::from_wad(Wad::ONE), Ray::ONE);
    }

    #[test]
    fn test_exp_known_values() {
        assert_eq!(dec_exp(Decimal::ZERO).unwrap(), Decimal::ONE);
        assert!(close(
            dec_exp(Decimal::ONE).unwrap(),
            dec!(2.7182818284590452353602874714),
            TIGHT
        ));
        assert!(close(
            dec_exp(dec!(-1)).unwrap(),
            dec!(0.3678794411714423215955237702),
            TIGHT
        ));
    }

    #[test]
    fn test_exp_rejects_overflow() {
        assert!(dec_exp(dec!(100)).is_err());
    }

    #[test]
    fn test_ln_known_values() {
        assert_eq!(dec_ln(Decimal::ONE).unwrap(), Decimal::ZERO);
        assert!(close(
            dec_ln(dec!(2)).unwrap(),
            dec!(0.6931471805599453094172321215),
            TIGHT
        ));
        assert!(dec_ln(Decimal::ZERO).is_err());
        assert!(dec_ln(dec!(-1)).is_err());
    }

    #[test]
    fn test_exp_ln_roundtrip() {
        for value in [dec!(0.02), dec!(0.5), dec!(3), dec!(40)] {
            let roundtrip = dec_ln(dec_exp(value).unwrap()).unwrap();
            assert!(close(roundtrip, value, dec!(0.000000000000000000001)));
        }
    }

    #[test]
    fn test_sqrt_known_values() {
        assert_eq!(dec_sqrt(Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert_eq!(dec_sqrt(dec!(4)).unwrap(), dec!(2));
        assert!(close(
            dec_sqrt(dec!(2)).unwrap(),
            dec!(1.4142135623730950488016887242),
            TIGHT
        ));
        assert!(dec_sqrt(dec!(-1)).is_err());
    }

    #[test]
    fn test_pow() {
        assert!(close(
            dec_pow(dec!(2), dec!(10)).unwrap(),
            dec!(1024),
            dec!(0.000000000001)
        ));
        assert_eq!(dec_pow(dec!(5), Decimal::ZERO).unwrap(), Decimal::ONE);
        assert!(dec_pow(Decimal::ZERO, dec!(2)).is_err());
    }

    #[test]
    fn test_year_fraction() {
        assert_eq!(year_fraction(SECONDS_PER_YEAR), Wad::ONE);
        assert_eq!(year_fraction(0), Wad::ZERO);
        assert!(close(
            year_fraction(crate::utils::constants::SECONDS_PER_WEEK).value(),
            dec!(0.019178082191780822),
            TIGHT
        ));
    }

    #[test]
    fn test_annualized_inverts_accrual() {
        let apy = Wad::new(dec!(0.05));
        let seconds = 13 * crate::utils::constants::SECONDS_PER_DAY;
        let factor = accrual_factor(apy, seconds).unwrap();
        let rate = Wad::new(factor.value() - Decimal::ONE);
        let measured = annualized(rate, seconds).unwrap();
        assert!(close(measured.value(), apy.value(), dec!(0.000000000001)));
    }

    #[test]
    fn test_annualized_zero_window_fails() {
        assert!(annualized(Wad::ZERO, 0).is_err());
    }

    #[test]
    fn test_growth_between_clamps_decrease() {
        let from = Ray::new(dec!(1.5));
        let to = Ray::new(dec!(1.2));
        assert_eq!(growth_between(from, to).unwrap(), Wad::ZERO);
        assert_eq!(growth_between(from, from).unwrap(), Wad::ZERO);
        assert!(growth_between(Ray::ZERO, to).is_err());

        let grown = growth_between(Ray::ONE, Ray::new(dec!(1.1))).unwrap();
        assert!(close(grown.value(), dec!(0.1), TIGHT));
    }
}
