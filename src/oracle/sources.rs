//! Yield sources.
//!
//! A [`YieldSource`] exposes the live cumulative yield index of an asset.
//! The oracle snapshots this index into its observation buffer and also
//! reads it directly when a query lands at the current instant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::math::{accrual_factor, Ray, Wad};

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Identifier of a yield-bearing asset, e.g. "aUSDC" or "cDAI"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create an asset identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Capability trait for reading an asset's live yield index
pub trait YieldSource {
    /// Current cumulative yield index of `asset` at time `now`.
    ///
    /// The index is monotone non-decreasing in `now` for well-behaved
    /// sources. Fails with `SourceUnavailable` when the source cannot
    /// produce a reading for this asset at this time.
    fn current_index(&self, asset: &AssetId, now: u64) -> Result<Ray>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONSTANT-RATE SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

/// A source whose index compounds at a fixed APY from a known start point.
///
/// Useful for simulations and as a stand-in for stable lending markets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantRateSource {
    asset: AssetId,
    start_time: u64,
    start_index: Ray,
    apy: Wad,
}

impl ConstantRateSource {
    /// Create a source compounding at `apy` from `start_index` at
    /// `start_time`
    pub fn new(asset: AssetId, start_time: u64, start_index: Ray, apy: Wad) -> Result<Self> {
        if start_index.is_zero() {
            return Err(Error::InvalidParameter {
                name: "start_index".into(),
                reason: "starting index cannot be zero".into(),
            });
        }
        if apy.is_negative() {
            return Err(Error::InvalidParameter {
                name: "apy".into(),
                reason: "rate cannot be negative".into(),
            });
        }
        Ok(Self { asset, start_time, start_index, apy })
    }

    /// The asset this source serves
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }
}

impl YieldSource for ConstantRateSource {
    fn current_index(&self, asset: &AssetId, now: u64) -> Result<Ray> {
        if asset != &self.asset {
            return Err(Error::SourceUnavailable { asset: asset.to_string() });
        }
        let elapsed = now.checked_sub(self.start_time).ok_or_else(|| Error::SourceUnavailable {
            asset: asset.to_string(),
        })?;
        let factor = accrual_factor(self.apy, elapsed)?;
        Ok(Ray::new(self.start_index.value() * factor.value()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDED SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

/// A source replaying a recorded series of index readings.
///
/// `current_index` returns the latest recorded point at or before `now`,
/// holding each reading flat until the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedSource {
    points: BTreeMap<AssetId, BTreeMap<u64, Ray>>,
}

impl RecordedSource {
    /// Create an empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an index reading for `asset` at `timestamp`
    pub fn record(&mut self, asset: AssetId, timestamp: u64, index_value: Ray) {
        self.points.entry(asset).or_default().insert(timestamp, index_value);
    }
}

impl YieldSource for RecordedSource {
    fn current_index(&self, asset: &AssetId, now: u64) -> Result<Ray> {
        let series = self
            .points
            .get(asset)
            .ok_or_else(|| Error::SourceUnavailable { asset: asset.to_string() })?;
        let (_, value) = series
            .range(..=now)
            .next_back()
            .ok_or_else(|| Error::SourceUnavailable { asset: asset.to_string() })?;
        if value.is_zero() {
            return Err(Error::SourceUnavailable { asset: asset.to_string() });
        }
        Ok(*value)
    }
}
