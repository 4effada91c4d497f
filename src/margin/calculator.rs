//! Statistical APY bounds and trader margin requirements.
//!
//! The bound model projects a confidence interval around the historical
//! APY that tightens as maturity approaches. With `k = 4*alpha/sigma^2`,
//! `tf = exp(-beta * timeRemaining / tMax)`,
//! `lambda = 4*beta*tf*apy / (sigma^2 * (1 - tf))` and
//! `zeta = sigma^2 * (1 - tf) / (4*beta)`, the bound is
//! `zeta * (k + lambda +/- xi * sqrt(2*(k + 2*lambda)))`, floored at zero.
//! A fixed taker's worst case is the upper bound, a variable taker's the
//! lower; initial margin scales the bound by the configured multiplier,
//! liquidation margin does not.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::margin::params::{MarginCalculatorParameters, TraderMarginRequirementParams};
use crate::utils::constants::FIXED_RATE_PER_YEAR;
use crate::utils::math::{year_fraction, Wad};

/// Decay of risk-bound width over the remaining term.
///
/// `exp(-beta * (term_end - current) / t_max)`, in `(0, 1)` for a valid
/// term. Fails with `InvalidTerm` when `term_end` is zero or not in the
/// future.
pub fn compute_time_factor(
    params: &MarginCalculatorParameters,
    term_end: u64,
    current: u64,
) -> Result<Wad> {
    if term_end == 0 || current >= term_end {
        return Err(Error::InvalidTerm { start: current, end: term_end });
    }
    let remaining = Wad::new(Decimal::from(term_end - current));
    let exponent = -(params.beta * remaining / params.t_max);
    exponent.exp()
}

/// Statistical bound on the APY realized between `current` and `term_end`.
///
/// Negative historical APY readings are clamped to zero before entering
/// the model. The result is floored at zero, so the lower bound can never
/// go negative.
pub fn compute_apy_bound(
    params: &MarginCalculatorParameters,
    term_end: u64,
    current: u64,
    historical_apy: Wad,
    is_upper: bool,
) -> Result<Wad> {
    let time_factor = compute_time_factor(params, term_end, current)?;
    let apy = historical_apy.max(Wad::ZERO);

    let four = Wad::from_int(4);
    let two = Wad::from_int(2);
    let one_minus_tf = Wad::ONE - time_factor;

    let k = four * params.alpha / params.sigma_squared;
    let lambda = four * params.beta * time_factor * apy / (params.sigma_squared * one_minus_tf);
    let zeta = params.sigma_squared * one_minus_tf / (four * params.beta);

    let xi = if is_upper { params.xi_upper } else { params.xi_lower };
    let critical = xi * (two * (k + two * lambda)).sqrt()?;

    let bound = if is_upper {
        zeta * (k + lambda + critical)
    } else {
        zeta * (k + lambda - critical)
    };
    Ok(bound.max(Wad::ZERO))
}

/// Worst-case growth of the variable leg between now and maturity.
///
/// A fixed taker is hurt by rising rates, so its worst case tracks the
/// upper bound; a variable taker tracks the lower bound. Initial margin
/// additionally scales the bound by the side's configured multiplier.
/// The bound is evaluated over `[current, term_end]` and accrued over
/// `time_to_maturity`.
pub fn worst_case_variable_factor_at_maturity(
    params: &MarginCalculatorParameters,
    time_to_maturity: u64,
    term_end: u64,
    current: u64,
    is_ft: bool,
    is_lm: bool,
    historical_apy: Wad,
) -> Result<Wad> {
    let bound = compute_apy_bound(params, term_end, current, historical_apy, is_ft)?;
    let scaled = if is_lm {
        bound
    } else if is_ft {
        bound * params.apy_upper_multiplier
    } else {
        bound * params.apy_lower_multiplier
    };
    Ok(scaled * year_fraction(time_to_maturity))
}

/// Growth of one fixed token over the full term at the protocol's fixed
/// rate convention (1% per year)
pub fn fixed_factor(term_start: u64, term_end: u64) -> Result<Wad> {
    if term_end == 0 || term_start >= term_end {
        return Err(Error::InvalidTerm { start: term_start, end: term_end });
    }
    Ok(Wad::new(FIXED_RATE_PER_YEAR) * year_fraction(term_end - term_start))
}

/// Margin requirement for a fixed/variable trader position at `now`
pub fn get_trader_margin_requirement(
    params: &MarginCalculatorParameters,
    trader: &TraderMarginRequirementParams,
    now: u64,
) -> Result<Wad> {
    trader.validate()?;
    margin_requirement(params, trader, Wad::ZERO, now)
}

/// Worst-case-loss requirement for a token-balance pair.
///
/// `accrued_variable_factor` is the variable growth already realized from
/// term start to `now`; it is zero for plain trader positions and the
/// position's recorded factor for liquidity positions. The modeled loss is
/// floored by the minimum-delta requirement and by zero.
pub(crate) fn margin_requirement(
    params: &MarginCalculatorParameters,
    trader: &TraderMarginRequirementParams,
    accrued_variable_factor: Wad,
    now: u64,
) -> Result<Wad> {
    let time_to_maturity = match trader.term_end.checked_sub(now) {
        Some(remaining) if remaining > 0 => remaining,
        _ => return Err(Error::InvalidTerm { start: now, end: trader.term_end }),
    };

    let is_ft = trader.variable_token_balance.is_negative();
    let worst_case = worst_case_variable_factor_at_maturity(
        params,
        time_to_maturity,
        trader.term_end,
        now,
        is_ft,
        trader.is_lm,
        trader.historical_apy,
    )?;

    let fixed_leg = trader.fixed_token_balance * fixed_factor(trader.term_start, trader.term_end)?;
    let variable_leg = trader.variable_token_balance * (accrued_variable_factor + worst_case);
    let modeled_loss = -(fixed_leg + variable_leg);

    let min_delta = if trader.is_lm { params.min_delta_lm } else { params.min_delta_im };
    let floor = min_delta * trader.variable_token_balance.abs() * year_fraction(time_to_maturity);

    Ok(modeled_loss.max(floor).max(Wad::ZERO))
}
