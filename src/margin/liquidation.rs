//! Liquidation predicates.
//!
//! A position becomes liquidatable when its posted margin falls below the
//! liquidation requirement, regardless of how the computation inputs were
//! flagged by the caller.

use crate::error::Result;
use crate::margin::calculator::get_trader_margin_requirement;
use crate::margin::params::{
    MarginCalculatorParameters, PositionMarginRequirementParams, TraderMarginRequirementParams,
};
use crate::margin::position::get_position_margin_requirement;
use crate::utils::math::Wad;

/// Whether a trader position with `current_margin` posted can be
/// liquidated at `now`
pub fn is_liquidatable_trader(
    params: &MarginCalculatorParameters,
    trader: &TraderMarginRequirementParams,
    now: u64,
    current_margin: Wad,
) -> Result<bool> {
    let snapshot = TraderMarginRequirementParams { is_lm: true, ..*trader };
    let requirement = get_trader_margin_requirement(params, &snapshot, now)?;
    if current_margin < requirement {
        tracing::warn!(
            margin = %current_margin,
            requirement = %requirement,
            "trader position below liquidation margin"
        );
        return Ok(true);
    }
    Ok(false)
}

/// Whether a liquidity position with `current_margin` posted can be
/// liquidated at `now`
pub fn is_liquidatable_position(
    params: &MarginCalculatorParameters,
    position: &PositionMarginRequirementParams,
    now: u64,
    current_margin: Wad,
) -> Result<bool> {
    let snapshot = PositionMarginRequirementParams { is_lm: true, ..*position };
    let requirement = get_position_margin_requirement(params, &snapshot, now)?;
    if current_margin < requirement {
        tracing::warn!(
            margin = %current_margin,
            requirement = %requirement,
            "liquidity position below liquidation margin"
        );
        return Ok(true);
    }
    Ok(false)
}
