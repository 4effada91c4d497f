//! Margin calculator parameters and computation inputs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::constants::{
    DEFAULT_ALPHA, DEFAULT_APY_LOWER_MULTIPLIER, DEFAULT_APY_UPPER_MULTIPLIER, DEFAULT_BETA,
    DEFAULT_MIN_DELTA_IM, DEFAULT_MIN_DELTA_LM, DEFAULT_SIGMA_SQUARED, DEFAULT_T_MAX_SECONDS,
    DEFAULT_XI_LOWER, DEFAULT_XI_UPPER, MAX_TICK, MIN_TICK,
};
use crate::utils::math::Wad;

// ═══════════════════════════════════════════════════════════════════════════════
// RISK PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// The statistical risk-bound model's parameters.
///
/// Set once per deployment and mutated only through the owner-gated
/// configuration surface. Defaults reproduce the reference deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginCalculatorParameters {
    /// Scales the upper APY bound when computing initial margin
    pub apy_upper_multiplier: Wad,

    /// Scales the lower APY bound when computing initial margin
    pub apy_lower_multiplier: Wad,

    /// Minimum margin per unit of variable exposure, liquidation margin
    pub min_delta_lm: Wad,

    /// Minimum margin per unit of variable exposure, initial margin
    pub min_delta_im: Wad,

    /// Variance of the APY process
    pub sigma_squared: Wad,

    /// Mean-reversion drift coefficient
    pub alpha: Wad,

    /// Mean-reversion speed coefficient
    pub beta: Wad,

    /// Safety multiplier on the upper confidence bound
    pub xi_upper: Wad,

    /// Safety multiplier on the lower confidence bound
    pub xi_lower: Wad,

    /// Maximum allowable term, in seconds
    pub t_max: Wad,
}

impl Default for MarginCalculatorParameters {
    fn default() -> Self {
        Self {
            apy_upper_multiplier: Wad::new(DEFAULT_APY_UPPER_MULTIPLIER),
            apy_lower_multiplier: Wad::new(DEFAULT_APY_LOWER_MULTIPLIER),
            min_delta_lm: Wad::new(DEFAULT_MIN_DELTA_LM),
            min_delta_im: Wad::new(DEFAULT_MIN_DELTA_IM),
            sigma_squared: Wad::new(DEFAULT_SIGMA_SQUARED),
            alpha: Wad::new(DEFAULT_ALPHA),
            beta: Wad::new(DEFAULT_BETA),
            xi_upper: Wad::new(DEFAULT_XI_UPPER),
            xi_lower: Wad::new(DEFAULT_XI_LOWER),
            t_max: Wad::new(DEFAULT_T_MAX_SECONDS),
        }
    }
}

impl MarginCalculatorParameters {
    /// Validate the parameter set.
    ///
    /// All scalars must be non-negative; `sigma_squared`, `beta` and
    /// `t_max` must be strictly positive because the bound formula divides
    /// by them.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("apy_upper_multiplier", self.apy_upper_multiplier),
            ("apy_lower_multiplier", self.apy_lower_multiplier),
            ("min_delta_lm", self.min_delta_lm),
            ("min_delta_im", self.min_delta_im),
            ("alpha", self.alpha),
            ("xi_upper", self.xi_upper),
            ("xi_lower", self.xi_lower),
        ];
        for (name, value) in non_negative {
            if value.is_negative() {
                return Err(Error::InvalidParameter {
                    name: name.into(),
                    reason: "cannot be negative".into(),
                });
            }
        }
        let strictly_positive = [
            ("sigma_squared", self.sigma_squared),
            ("beta", self.beta),
            ("t_max", self.t_max),
        ];
        for (name, value) in strictly_positive {
            if value.is_negative() || value.is_zero() {
                return Err(Error::InvalidParameter {
                    name: name.into(),
                    reason: "must be strictly positive".into(),
                });
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPUTATION INPUTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Snapshot of a fixed/variable trader position, passed as pure input to a
/// margin computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderMarginRequirementParams {
    /// Signed fixed-token balance; positive means the position receives
    /// fixed
    pub fixed_token_balance: Wad,

    /// Signed variable-token balance; negative marks a fixed taker
    pub variable_token_balance: Wad,

    /// Term start, UNIX seconds
    pub term_start: u64,

    /// Term end, UNIX seconds
    pub term_end: u64,

    /// Compute the liquidation margin rather than the initial margin
    pub is_lm: bool,

    /// Historical APY of the underlying yield source
    pub historical_apy: Wad,
}

impl TraderMarginRequirementParams {
    /// Validate term boundaries
    pub fn validate(&self) -> Result<()> {
        if self.term_end == 0 || self.term_start >= self.term_end {
            return Err(Error::InvalidTerm {
                start: self.term_start,
                end: self.term_end,
            });
        }
        Ok(())
    }
}

/// Snapshot of a liquidity-providing position over a tick range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMarginRequirementParams {
    /// Lower tick of the liquidity range
    pub tick_lower: i32,

    /// Upper tick of the liquidity range
    pub tick_upper: i32,

    /// Current tick of the pool
    pub current_tick: i32,

    /// Active liquidity of the position
    pub liquidity: Wad,

    /// Signed fixed-token balance already held by the position
    pub fixed_token_balance: Wad,

    /// Signed variable-token balance already held by the position
    pub variable_token_balance: Wad,

    /// Variable factor accrued from term start to now
    pub variable_factor: Wad,

    /// Term start, UNIX seconds
    pub term_start: u64,

    /// Term end, UNIX seconds
    pub term_end: u64,

    /// Compute the liquidation margin rather than the initial margin
    pub is_lm: bool,

    /// Historical APY of the underlying yield source
    pub historical_apy: Wad,
}

impl PositionMarginRequirementParams {
    /// Validate term boundaries and the tick range
    pub fn validate(&self) -> Result<()> {
        if self.term_end == 0 || self.term_start >= self.term_end {
            return Err(Error::InvalidTerm {
                start: self.term_start,
                end: self.term_end,
            });
        }
        if self.tick_lower >= self.tick_upper {
            return Err(Error::InvalidParameter {
                name: "tick_lower".into(),
                reason: "lower tick must be below upper tick".into(),
            });
        }
        if self.tick_lower < MIN_TICK || self.tick_upper > MAX_TICK {
            return Err(Error::InvalidParameter {
                name: "tick_range".into(),
                reason: "tick outside the supported range".into(),
            });
        }
        if self.liquidity.is_negative() {
            return Err(Error::InvalidParameter {
                name: "liquidity".into(),
                reason: "cannot be negative".into(),
            });
        }
        Ok(())
    }

    /// Project onto trader params with the given token balances
    pub fn trader(&self, fixed: Wad, variable: Wad) -> TraderMarginRequirementParams {
        TraderMarginRequirementParams {
            fixed_token_balance: fixed,
            variable_token_balance: variable,
            term_start: self.term_start,
            term_end: self.term_end,
            is_lm: self.is_lm,
            historical_apy: self.historical_apy,
        }
    }
}
