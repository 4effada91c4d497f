//! Rate oracle: a circular-buffer time series of yield-index observations.
//!
//! - [`buffer`]: the bounded, growable observation array and its
//!   rotated binary search
//! - [`sources`]: the yield-source capability trait and concrete sources
//! - [`rate_oracle`]: throttled writes, counterfactual index lookup and
//!   APY derivation

pub mod buffer;
pub mod rate_oracle;
pub mod sources;
