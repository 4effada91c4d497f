//! Margin requirements for liquidity-providing positions.
//!
//! An LP's risk envelope must cover the worst outcome across three paths:
//! the liquidity never trades, the market traverses the range downward and
//! converts it into variable exposure, or the market traverses upward and
//! converts it into fixed-taker exposure. The requirement is the maximum
//! trader requirement over the three resulting balance snapshots.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::margin::calculator::margin_requirement;
use crate::margin::params::{MarginCalculatorParameters, PositionMarginRequirementParams};
use crate::utils::constants::TICK_BASE;
use crate::utils::math::{dec_exp, dec_ln, Wad};

/// Square root of the price ratio at `tick`: `1.0001^(tick/2)`.
///
/// Kept as a raw decimal so extreme negative ticks do not round to zero
/// before entering a division.
fn sqrt_price(tick: i32) -> Result<Decimal> {
    let half_tick = Decimal::from(tick) / Decimal::from(2u32);
    dec_exp(half_tick * dec_ln(TICK_BASE)?)
}

/// Token amounts released by traversing the range `[sqrt_lower,
/// sqrt_upper]` with `liquidity`, as unsigned magnitudes `(fixed,
/// variable)`
fn range_deltas(liquidity: Wad, sqrt_lower: Decimal, sqrt_upper: Decimal) -> Result<(Wad, Wad)> {
    let overflow = || Error::MathDomain { operation: "range_deltas".into() };
    let fixed = liquidity
        .value()
        .checked_mul(sqrt_upper - sqrt_lower)
        .ok_or_else(overflow)?;
    let inverse_span = Decimal::ONE
        .checked_div(sqrt_lower)
        .and_then(|lower| Decimal::ONE.checked_div(sqrt_upper).map(|upper| lower - upper))
        .ok_or_else(overflow)?;
    let variable = liquidity.value().checked_mul(inverse_span).ok_or_else(overflow)?;
    Ok((Wad::new(fixed), Wad::new(variable)))
}

/// Margin requirement for a liquidity position at `now`.
///
/// Evaluates the trader requirement for the position's current balances
/// and for the two full-conversion counterfactuals (range traversed down
/// to `tick_lower`, range traversed up to `tick_upper`, both from the
/// current tick clamped into the range) and returns the maximum.
pub fn get_position_margin_requirement(
    params: &MarginCalculatorParameters,
    position: &PositionMarginRequirementParams,
    now: u64,
) -> Result<Wad> {
    position.validate()?;

    let clamped_tick = position.current_tick.clamp(position.tick_lower, position.tick_upper);
    let sqrt_lower = sqrt_price(position.tick_lower)?;
    let sqrt_clamped = sqrt_price(clamped_tick)?;
    let sqrt_upper = sqrt_price(position.tick_upper)?;

    let fixed = position.fixed_token_balance;
    let variable = position.variable_token_balance;

    // downward traversal converts liquidity into variable exposure
    let (down_fixed, down_variable) = range_deltas(position.liquidity, sqrt_lower, sqrt_clamped)?;
    // upward traversal converts liquidity into fixed-taker exposure
    let (up_fixed, up_variable) = range_deltas(position.liquidity, sqrt_clamped, sqrt_upper)?;

    let scenarios = [
        (fixed, variable),
        (fixed - down_fixed, variable + down_variable),
        (fixed + up_fixed, variable - up_variable),
    ];

    let mut requirement = Wad::ZERO;
    for (scenario_fixed, scenario_variable) in scenarios {
        let trader = position.trader(scenario_fixed, scenario_variable);
        let scenario_requirement =
            margin_requirement(params, &trader, position.variable_factor, now)?;
        requirement = requirement.max(scenario_requirement);
    }
    Ok(requirement)
}
