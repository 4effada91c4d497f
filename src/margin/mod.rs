//! Margin engine: statistical APY bounds, worst-case settlement cash
//! flows and margin requirements.
//!
//! - [`params`]: the risk-parameter struct and per-computation snapshots
//! - [`calculator`]: time factor, APY bounds and trader requirements
//! - [`position`]: tick-range liquidity positions
//! - [`liquidation`]: liquidation predicates

pub mod calculator;
pub mod liquidation;
pub mod params;
pub mod position;
