//! Protocol configuration and parameters.
//!
//! Configuration is explicit state passed into the oracle and calculator
//! rather than ambient globals. Mutation goes through owner-gated setters
//! that re-validate on every change.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::margin::params::MarginCalculatorParameters;
use crate::utils::constants::{DEFAULT_MIN_SECONDS_SINCE_LAST_UPDATE, DEFAULT_SECONDS_AGO};

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte account identifier, displayed as 0x-prefixed hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId([u8; 20]);

impl AccountId {
    /// Create from raw bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE SETTINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Tunable oracle parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Lookback window for the historical APY, in seconds
    pub seconds_ago: u64,

    /// Minimum interval between oracle writes, in seconds
    pub min_seconds_since_last_update: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            seconds_ago: DEFAULT_SECONDS_AGO,
            min_seconds_since_last_update: DEFAULT_MIN_SECONDS_SINCE_LAST_UPDATE,
        }
    }
}

impl OracleSettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.seconds_ago == 0 {
            return Err(Error::InvalidParameter {
                name: "seconds_ago".into(),
                reason: "lookback window cannot be zero".into(),
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Owner-gated protocol configuration: oracle settings plus the margin
/// calculator's risk parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    owner: AccountId,
    oracle: OracleSettings,
    margin: MarginCalculatorParameters,
}

impl ProtocolConfig {
    /// Create a validated configuration
    pub fn new(
        owner: AccountId,
        oracle: OracleSettings,
        margin: MarginCalculatorParameters,
    ) -> Result<Self> {
        oracle.validate()?;
        margin.validate()?;
        Ok(Self { owner, oracle, margin })
    }

    /// The configuration owner
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Current oracle settings
    pub fn oracle(&self) -> &OracleSettings {
        &self.oracle
    }

    /// Current margin calculator parameters
    pub fn margin(&self) -> &MarginCalculatorParameters {
        &self.margin
    }

    /// Update the historical-APY lookback window
    pub fn set_seconds_ago(&mut self, caller: &AccountId, seconds_ago: u64) -> Result<()> {
        self.authorize(caller)?;
        let updated = OracleSettings { seconds_ago, ..self.oracle };
        updated.validate()?;
        self.oracle = updated;
        tracing::info!(%caller, seconds_ago, "oracle lookback updated");
        Ok(())
    }

    /// Update the minimum interval between oracle writes
    pub fn set_min_seconds_since_last_update(
        &mut self,
        caller: &AccountId,
        min_seconds: u64,
    ) -> Result<()> {
        self.authorize(caller)?;
        self.oracle.min_seconds_since_last_update = min_seconds;
        tracing::info!(%caller, min_seconds, "oracle write throttle updated");
        Ok(())
    }

    /// Replace the margin calculator parameters
    pub fn set_margin_parameters(
        &mut self,
        caller: &AccountId,
        params: MarginCalculatorParameters,
    ) -> Result<()> {
        self.authorize(caller)?;
        params.validate()?;
        self.margin = params;
        tracing::info!(%caller, "margin calculator parameters updated");
        Ok(())
    }

    fn authorize(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.owner {
            return Err(Error::Unauthorized(caller.to_string()));
        }
        Ok(())
    }
}
