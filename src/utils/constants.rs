//! Protocol constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and
//! modification.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ═══════════════════════════════════════════════════════════════════════════════
// DAY-COUNT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Seconds in a 365-day year (the protocol day-count convention)
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Seconds in a day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in a week
pub const SECONDS_PER_WEEK: u64 = 604_800;

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED-POINT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Decimal places of the Wad convention
pub const WAD_DECIMALS: u32 = 18;

/// Decimal places of the Ray convention
pub const RAY_DECIMALS: u32 = 27;

/// Convergence tolerance for series and Newton iterations (1e-27)
pub const SERIES_TOLERANCE: Decimal = dec!(0.000000000000000000000000001);

/// Largest exponent accepted by `dec_exp`; e^65 is near the top of the
/// Decimal mantissa range
pub const EXP_INPUT_LIMIT: Decimal = dec!(65);

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Hard cap on observation buffer capacity
pub const MAX_OBSERVATION_CARDINALITY: u16 = u16::MAX;

/// Default lookback window for the historical APY (one week)
pub const DEFAULT_SECONDS_AGO: u64 = SECONDS_PER_WEEK;

/// Default minimum interval between oracle writes
pub const DEFAULT_MIN_SECONDS_SINCE_LAST_UPDATE: u64 = 3_600;

// ═══════════════════════════════════════════════════════════════════════════════
// MARGIN MODEL CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Annualized accrual rate of one fixed token (1% per year)
pub const FIXED_RATE_PER_YEAR: Decimal = dec!(0.01);

/// Reference-deployment upper APY multiplier (initial margin scaling)
pub const DEFAULT_APY_UPPER_MULTIPLIER: Decimal = dec!(1.5);

/// Reference-deployment lower APY multiplier (initial margin scaling)
pub const DEFAULT_APY_LOWER_MULTIPLIER: Decimal = dec!(0.7);

/// Reference-deployment minimum margin delta for liquidation margin
pub const DEFAULT_MIN_DELTA_LM: Decimal = dec!(0.0125);

/// Reference-deployment minimum margin delta for initial margin
pub const DEFAULT_MIN_DELTA_IM: Decimal = dec!(0.05);

/// Reference-deployment APY process variance
pub const DEFAULT_SIGMA_SQUARED: Decimal = dec!(0.01);

/// Reference-deployment mean-reversion drift coefficient
pub const DEFAULT_ALPHA: Decimal = dec!(0.04);

/// Reference-deployment mean-reversion speed coefficient
pub const DEFAULT_BETA: Decimal = dec!(1.0);

/// Reference-deployment upper-bound safety multiplier
pub const DEFAULT_XI_UPPER: Decimal = dec!(2.0);

/// Reference-deployment lower-bound safety multiplier
pub const DEFAULT_XI_LOWER: Decimal = dec!(1.5);

/// Reference-deployment maximum allowable term (one year, in seconds)
pub const DEFAULT_T_MAX_SECONDS: Decimal = dec!(31536000);

// ═══════════════════════════════════════════════════════════════════════════════
// TICK CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Price ratio of one tick step
pub const TICK_BASE: Decimal = dec!(1.0001);

/// Lowest tick a liquidity range may reference
pub const MIN_TICK: i32 = -887_272;

/// Highest tick a liquidity range may reference
pub const MAX_TICK: i32 = 887_272;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_count() {
        assert_eq!(SECONDS_PER_YEAR, 365 * SECONDS_PER_DAY);
        assert_eq!(SECONDS_PER_WEEK, 7 * SECONDS_PER_DAY);
    }

    #[test]
    fn test_reference_multipliers_ordered() {
        assert!(DEFAULT_APY_LOWER_MULTIPLIER < Decimal::ONE);
        assert!(DEFAULT_APY_UPPER_MULTIPLIER > Decimal::ONE);
        assert!(DEFAULT_MIN_DELTA_LM < DEFAULT_MIN_DELTA_IM);
        assert!(DEFAULT_XI_LOWER < DEFAULT_XI_UPPER);
    }

    #[test]
    fn test_tick_bounds_symmetric() {
        assert_eq!(MIN_TICK, -MAX_TICK);
    }
}
