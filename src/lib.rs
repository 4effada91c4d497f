//! # Termrate Protocol Core
//!
//! The core of an interest-rate-swap protocol: participants take fixed or
//! variable rate exposure on top of yield-bearing tokens over a fixed term,
//! with margining and liquidation driven by a statistical risk model.
//!
//! ## Architecture
//!
//! The crate consists of several core modules:
//!
//! - **Utils**: fixed-point arithmetic (Wad/Ray), transcendental functions,
//!   day-count conversions, clocks and protocol constants
//! - **Oracle**: circular-buffer time series of yield-index observations
//!   with binary-search lookup and compounding interpolation
//! - **Margin**: statistical APY bounds, worst-case settlement cash flows,
//!   trader and liquidity-position margin requirements, liquidation checks
//! - **Core**: owner-gated, validated protocol configuration
//!
//! ## Design Principles
//!
//! - **Deterministic**: all arithmetic is decimal fixed-point; no floats in
//!   any result path
//! - **Pure**: every operation is a function of its inputs; timestamps are
//!   passed explicitly and ambient time lives behind a capability trait
//! - **Modular**: the yield source is a trait, so new lending protocols can
//!   be added without touching the oracle or calculator logic
//!
//! ## Example
//!
//! ```rust,ignore
//! use termrate::prelude::*;
//!
//! let source = ConstantRateSource::new(asset, t0, Ray::ONE, apy)?;
//! let mut oracle = RateOracle::initialize(source, asset, settings, t0)?;
//!
//! oracle.write_rate(t0 + 86_400)?;
//! let apy = oracle.get_historical_apy(t0 + 86_400)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod error;
pub mod margin;
pub mod oracle;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::config::{AccountId, OracleSettings, ProtocolConfig};
    pub use crate::error::{Error, Result};
    pub use crate::margin::{
        calculator::{
            compute_apy_bound, compute_time_factor, fixed_factor,
            get_trader_margin_requirement, worst_case_variable_factor_at_maturity,
        },
        liquidation::{is_liquidatable_position, is_liquidatable_trader},
        params::{
            MarginCalculatorParameters, PositionMarginRequirementParams,
            TraderMarginRequirementParams,
        },
        position::get_position_margin_requirement,
    };
    pub use crate::oracle::{
        buffer::{Observation, ObservationBuffer},
        rate_oracle::RateOracle,
        sources::{AssetId, ConstantRateSource, RecordedSource, YieldSource},
    };
    pub use crate::utils::{
        math::{Ray, Wad},
        time::{Clock, ManualClock, SystemClock},
    };
}

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "termrate";
