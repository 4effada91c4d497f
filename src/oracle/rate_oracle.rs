//! The rate oracle: throttled index snapshots and APY derivation.
//!
//! The oracle pairs a live [`YieldSource`] with an [`ObservationBuffer`].
//! Writes snapshot the live index, throttled to at most one observation per
//! `min_seconds_since_last_update`. Reads reconstruct the index at any past
//! instant by geometric interpolation between the bracketing observations,
//! then derive rates, APYs and variable factors from index ratios.

use crate::core::config::OracleSettings;
use crate::error::{Error, Result};
use crate::oracle::buffer::{Observation, ObservationBuffer};
use crate::oracle::sources::{AssetId, YieldSource};
use crate::utils::math::{accrual_factor, annualized, growth_between, Ray, Wad};

/// Rate oracle over a single asset's yield index
#[derive(Debug, Clone)]
pub struct RateOracle<S: YieldSource> {
    source: S,
    asset: AssetId,
    settings: OracleSettings,
    buffer: ObservationBuffer,
}

impl<S: YieldSource> RateOracle<S> {
    /// Create an oracle seeded with the source's live index at `now`
    pub fn initialize(source: S, asset: AssetId, settings: OracleSettings, now: u64) -> Result<Self> {
        settings.validate()?;
        let index_value = source.current_index(&asset, now)?;
        if index_value.is_zero() {
            return Err(Error::SourceUnavailable { asset: asset.to_string() });
        }
        tracing::info!(asset = %asset, now, "rate oracle initialized");
        Ok(Self {
            source,
            asset,
            settings,
            buffer: ObservationBuffer::initialize(now, index_value),
        })
    }

    /// The asset this oracle tracks
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }

    /// The underlying observation buffer
    pub fn buffer(&self) -> &ObservationBuffer {
        &self.buffer
    }

    /// Replace the oracle settings
    pub fn apply_settings(&mut self, settings: OracleSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Request observation-buffer growth; returns the effective target
    pub fn grow(&mut self, cardinality_next: u16) -> u16 {
        self.buffer.grow(cardinality_next)
    }

    /// Live source reading; a zero index is treated as an outage
    fn read_live(&self, now: u64) -> Result<Ray> {
        let index_value = self.source.current_index(&self.asset, now)?;
        if index_value.is_zero() {
            return Err(Error::SourceUnavailable { asset: self.asset.to_string() });
        }
        Ok(index_value)
    }

    /// Snapshot the live index into the buffer.
    ///
    /// A write at the exact timestamp of the newest observation is an
    /// idempotent no-op. Writes earlier than the newest observation, or
    /// sooner than `min_seconds_since_last_update` after it, fail with
    /// `ThrottleViolation`. Returns the buffer's `(index, cardinality)`.
    pub fn write_rate(&mut self, now: u64) -> Result<(u16, u16)> {
        let newest = self.buffer.newest();
        if now == newest.timestamp {
            return Ok((self.buffer.index(), self.buffer.cardinality()));
        }

        let min_interval = self.settings.min_seconds_since_last_update;
        let elapsed = now.checked_sub(newest.timestamp).ok_or(Error::ThrottleViolation {
            elapsed: 0,
            min_interval,
        })?;
        if elapsed < min_interval {
            return Err(Error::ThrottleViolation { elapsed, min_interval });
        }

        let index_value = self.read_live(now)?;
        let (index, cardinality) = self.buffer.write(now, index_value);
        tracing::debug!(
            asset = %self.asset,
            now,
            index,
            cardinality,
            value = %index_value,
            "rate observation written"
        );
        Ok((index, cardinality))
    }

    /// Reconstruct the yield index at `queried`.
    ///
    /// Exact observation timestamps return the stored value; instants
    /// between observations are interpolated geometrically at the APY
    /// implied by the bracketing pair. Queries after the newest observation
    /// bracket against a live source reading at `now`; queries before the
    /// oldest surviving observation fail with `InsufficientHistory`.
    pub fn observe_single(&self, now: u64, queried: u64) -> Result<Ray> {
        if queried > now {
            return Err(Error::InvalidParameter {
                name: "queried".into(),
                reason: "cannot observe the future".into(),
            });
        }
        if queried == now {
            return self.read_live(now);
        }

        let (before, after) = self.buffer.surrounding(queried)?;
        if before.timestamp == queried {
            return Ok(before.index_value);
        }
        let after = match after {
            Some(observation) => observation,
            None => Observation::new(now, self.read_live(now)?),
        };
        if after.timestamp == queried {
            return Ok(after.index_value);
        }

        let growth = growth_between(before.index_value, after.index_value)?;
        let apy = annualized(growth, after.timestamp - before.timestamp)?;
        let factor = accrual_factor(apy, queried - before.timestamp)?;
        Ok(Ray::new(before.index_value.value() * factor.value()))
    }

    /// Proportional index growth over `[from, to]`, clamped at zero
    pub fn get_rate_from_to(&self, now: u64, from: u64, to: u64) -> Result<Wad> {
        if from > to {
            return Err(Error::InvalidTerm { start: from, end: to });
        }
        let index_from = self.observe_single(now, from)?;
        let index_to = self.observe_single(now, to)?;
        growth_between(index_from, index_to)
    }

    /// Annualized rate over `[from, to]`
    pub fn get_apy_from_to(&self, now: u64, from: u64, to: u64) -> Result<Wad> {
        if from >= to {
            return Err(Error::InvalidTerm { start: from, end: to });
        }
        let rate = self.get_rate_from_to(now, from, to)?;
        annualized(rate, to - from)
    }

    /// Annualized rate over the configured lookback window ending at `now`
    pub fn get_historical_apy(&self, now: u64) -> Result<Wad> {
        let from = now.checked_sub(self.settings.seconds_ago).ok_or_else(|| {
            Error::InvalidParameter {
                name: "seconds_ago".into(),
                reason: "lookback window extends before the epoch".into(),
            }
        })?;
        self.get_apy_from_to(now, from, now)
    }

    /// Realized variable factor of a term.
    ///
    /// Zero before the term starts. Before maturity this is the growth
    /// from `term_start` to `now`; at and after maturity it freezes at the
    /// growth from `term_start` to `term_end`.
    pub fn variable_factor(&self, now: u64, term_start: u64, term_end: u64) -> Result<Wad> {
        if term_start >= term_end {
            return Err(Error::InvalidTerm { start: term_start, end: term_end });
        }
        if now <= term_start {
            return Ok(Wad::ZERO);
        }
        let to = term_end.min(now);
        self.get_rate_from_to(now, term_start, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::sources::ConstantRateSource;
    use crate::utils::constants::SECONDS_PER_DAY;
    use rust_decimal_macros::dec;

    const START: u64 = 1_600_000_000;

    fn oracle(apy: &str) -> RateOracle<ConstantRateSource> {
        let asset = AssetId::new("aUSDC");
        let source = ConstantRateSource::new(
            asset.clone(),
            START,
            Ray::ONE,
            Wad::new(apy.parse().unwrap()),
        )
        .unwrap();
        let settings = OracleSettings {
            seconds_ago: 7 * SECONDS_PER_DAY,
            min_seconds_since_last_update: 3_600,
        };
        RateOracle::initialize(source, asset, settings, START).unwrap()
    }

    fn seeded(apy: &str, days: u64) -> (RateOracle<ConstantRateSource>, u64) {
        let mut oracle = oracle(apy);
        oracle.grow(64);
        let mut now = START;
        for _ in 0..days {
            now += SECONDS_PER_DAY;
            oracle.write_rate(now).unwrap();
        }
        (oracle, now)
    }

    #[test]
    fn test_write_throttle() {
        let mut oracle = oracle("0.1");
        oracle.grow(8);

        // too soon
        let err = oracle.write_rate(START + 60).unwrap_err();
        assert_eq!(err, Error::ThrottleViolation { elapsed: 60, min_interval: 3_600 });

        oracle.write_rate(START + 3_600).unwrap();

        // same timestamp is a no-op, not an error
        let cursor = oracle.write_rate(START + 3_600).unwrap();
        assert_eq!(cursor, (oracle.buffer().index(), oracle.buffer().cardinality()));

        // out of order
        let err = oracle.write_rate(START + 1_800).unwrap_err();
        assert_eq!(err, Error::ThrottleViolation { elapsed: 0, min_interval: 3_600 });
    }

    #[test]
    fn test_observe_single_exact_and_interpolated() {
        let (oracle, now) = seeded("0.1", 10);

        // exact stored timestamp
        let stored = oracle.buffer().newest();
        assert_eq!(oracle.observe_single(now, stored.timestamp).unwrap(), stored.index_value);

        // midway between two dailies: geometric interpolation at constant
        // APY must reproduce the source's own index
        let midpoint = START + 3 * SECONDS_PER_DAY + SECONDS_PER_DAY / 2;
        let interpolated = oracle.observe_single(now, midpoint).unwrap();
        let exact = accrual_factor(Wad::new(dec!(0.1)), midpoint - START).unwrap();
        assert!((interpolated.value() - exact.value()).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_observe_single_rejects_future_and_deep_past() {
        let (oracle, now) = seeded("0.1", 3);
        assert!(matches!(
            oracle.observe_single(now, now + 1),
            Err(Error::InvalidParameter { .. })
        ));

        // force a wrap so the seed observation is overwritten
        let mut tight = self::oracle("0.1");
        tight.grow(2);
        tight.write_rate(START + SECONDS_PER_DAY).unwrap();
        tight.write_rate(START + 2 * SECONDS_PER_DAY).unwrap();
        let err = tight
            .observe_single(START + 2 * SECONDS_PER_DAY, START + 1)
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientHistory { .. }));
    }

    #[test]
    fn test_historical_apy_recovers_source_rate() {
        let (oracle, now) = seeded("0.1", 10);
        let apy = oracle.get_historical_apy(now).unwrap();
        assert!((apy.value() - dec!(0.1)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_variable_factor_freezes_at_maturity() {
        let (oracle, now) = seeded("0.1", 20);
        let term_start = START + 2 * SECONDS_PER_DAY;
        let term_end = START + 9 * SECONDS_PER_DAY;

        let at_maturity = oracle.variable_factor(now, term_start, term_end).unwrap();
        let expected = oracle.get_rate_from_to(now, term_start, term_end).unwrap();
        assert_eq!(at_maturity, expected);

        // before maturity the factor accrues only to now
        let mid = START + 5 * SECONDS_PER_DAY;
        let accruing = oracle.variable_factor(mid, term_start, term_end).unwrap();
        let partial = oracle.get_rate_from_to(mid, term_start, mid).unwrap();
        assert_eq!(accruing, partial);
        assert!(accruing < at_maturity);
    }

    #[test]
    fn test_invalid_term_rejected() {
        let (oracle, now) = seeded("0.1", 5);
        assert!(matches!(
            oracle.variable_factor(now, now, now),
            Err(Error::InvalidTerm { .. })
        ));
        assert!(matches!(
            oracle.get_apy_from_to(now, now, now),
            Err(Error::InvalidTerm { .. })
        ));
        assert!(matches!(
            oracle.get_rate_from_to(now, now, now - 1),
            Err(Error::InvalidTerm { .. })
        ));
    }

    #[test]
    fn test_query_beyond_newest_brackets_live_reading() {
        let (oracle, mut now) = seeded("0.1", 5);
        // half a day past the newest observation, no new write
        now += SECONDS_PER_DAY / 2;
        let queried = now - SECONDS_PER_DAY / 4;
        let observed = oracle.observe_single(now, queried).unwrap();
        let exact = accrual_factor(Wad::new(dec!(0.1)), queried - START).unwrap();
        assert!((observed.value() - exact.value()).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_variable_factor_zero_before_term_starts() {
        let (oracle, now) = seeded("0.1", 5);
        let factor = oracle
            .variable_factor(now, now + SECONDS_PER_DAY, now + 2 * SECONDS_PER_DAY)
            .unwrap();
        assert_eq!(factor, Wad::ZERO);
    }

    #[test]
    fn test_zero_source_reading_is_an_outage() {
        #[derive(Debug)]
        struct DeadSource;
        impl YieldSource for DeadSource {
            fn current_index(&self, _asset: &AssetId, _now: u64) -> crate::error::Result<Ray> {
                Ok(Ray::ZERO)
            }
        }

        let settings = OracleSettings::default();
        let err = RateOracle::initialize(DeadSource, AssetId::new("aUSDC"), settings, START)
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }

    #[test]
    fn test_apply_settings_validates() {
        let (mut oracle, _) = seeded("0.1", 1);
        let bad = OracleSettings { seconds_ago: 0, min_seconds_since_last_update: 0 };
        assert!(oracle.apply_settings(bad).is_err());

        let good = OracleSettings { seconds_ago: 60, min_seconds_since_last_update: 0 };
        oracle.apply_settings(good).unwrap();
    }
}
