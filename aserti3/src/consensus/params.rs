// SPDX-License-Identifier: CC0-1.0

//! Consensus parameters.
//!
//! This module provides a predefined set of parameters for different networks and a way to load
//! custom ones (with the `serde` feature, for example from a JSON configuration file).

use core::fmt;

use crate::network::Network;
use crate::pow::Target;

/// Parameters that influence chain consensus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct Params {
    /// Network for which parameters are valid.
    pub network: Network,
    /// Proof of work limit value. It contains the lowest possible difficulty.
    pub pow_limit: Target,
    /// Determines whether minimal difficulty may be used for blocks or not.
    pub allow_min_difficulty_blocks: bool,
    /// Expected amount of time to mine one block, in seconds.
    pub pow_target_spacing: i64,
    /// Expected amount of time to mine a difficulty adjustment interval worth of blocks, in
    /// seconds.
    pub pow_target_timespan: i64,
}

impl Params {
    /// The mainnet parameters.
    pub const MAINNET: Params = Params {
        network: Network::Mainnet,
        pow_limit: Target::MAX_MAINNET,
        allow_min_difficulty_blocks: false,
        pow_target_spacing: 10 * 60,            // 10 minutes.
        pow_target_timespan: 14 * 24 * 60 * 60, // 2 weeks.
    };

    /// The testnet parameters.
    pub const TESTNET: Params = Params {
        network: Network::Testnet,
        pow_limit: Target::MAX_MAINNET,
        allow_min_difficulty_blocks: true,
        pow_target_spacing: 10 * 60,            // 10 minutes.
        pow_target_timespan: 14 * 24 * 60 * 60, // 2 weeks.
    };

    /// The regtest parameters.
    pub const REGTEST: Params = Params {
        network: Network::Regtest,
        pow_limit: Target::MAX_REGTEST,
        allow_min_difficulty_blocks: true,
        pow_target_spacing: 10 * 60,            // 10 minutes.
        pow_target_timespan: 14 * 24 * 60 * 60, // 2 weeks.
    };

    /// Creates parameters set for the given network.
    pub const fn new(network: Network) -> Self {
        match network {
            Network::Mainnet => Params::MAINNET,
            Network::Testnet => Params::TESTNET,
            Network::Regtest => Params::REGTEST,
        }
    }

    /// Calculates the number of blocks between difficulty adjustments.
    ///
    /// The retarget rule refuses to run on chains shorter than this.
    ///
    /// # Panics
    ///
    /// If `pow_target_spacing` is zero, see [`Params::validate`].
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        self.pow_target_timespan / self.pow_target_spacing
    }

    /// Checks that these parameters can drive the retarget rule.
    pub fn validate(&self) -> Result<(), InvalidParamsError> {
        if self.pow_target_spacing <= 0 {
            return Err(InvalidParamsError::NonPositiveSpacing(self.pow_target_spacing));
        }
        if self.pow_target_timespan < self.pow_target_spacing {
            return Err(InvalidParamsError::TimespanShorterThanSpacing {
                timespan: self.pow_target_timespan,
                spacing: self.pow_target_spacing,
            });
        }
        if self.pow_limit == Target::ZERO {
            return Err(InvalidParamsError::ZeroPowLimit);
        }
        Ok(())
    }
}

impl From<Network> for Params {
    fn from(value: Network) -> Self { Self::new(value) }
}

impl From<&Network> for Params {
    fn from(value: &Network) -> Self { Self::new(*value) }
}

impl AsRef<Params> for Params {
    fn as_ref(&self) -> &Params { self }
}

/// Consensus parameters that cannot drive the retarget rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidParamsError {
    /// Target block spacing must be positive.
    NonPositiveSpacing(i64),
    /// The adjustment timespan must cover at least one block.
    TimespanShorterThanSpacing {
        /// Configured timespan, in seconds.
        timespan: i64,
        /// Configured spacing, in seconds.
        spacing: i64,
    },
    /// A zero proof of work limit admits no block at all.
    ZeroPowLimit,
}

impl fmt::Display for InvalidParamsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InvalidParamsError::*;

        match *self {
            NonPositiveSpacing(spacing) =>
                write!(f, "target block spacing must be positive, got {}s", spacing),
            TimespanShorterThanSpacing { timespan, spacing } => write!(
                f,
                "target timespan {}s is shorter than the block spacing {}s",
                timespan, spacing
            ),
            ZeroPowLimit => f.write_str("proof of work limit is zero"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidParamsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for params in [&Params::MAINNET, &Params::TESTNET, &Params::REGTEST] {
            assert_eq!(params.validate(), Ok(()));
            assert_eq!(params.difficulty_adjustment_interval(), 2016);
            assert_eq!(Params::new(params.network), *params);
        }
        assert!(!Params::MAINNET.allow_min_difficulty_blocks);
        assert!(Params::REGTEST.pow_limit > Params::MAINNET.pow_limit);
    }

    #[test]
    fn validate_rejects_unusable_params() {
        let mut params = Params::MAINNET;
        params.pow_target_spacing = 0;
        assert_eq!(params.validate(), Err(InvalidParamsError::NonPositiveSpacing(0)));

        let mut params = Params::MAINNET;
        params.pow_target_timespan = 599;
        assert_eq!(
            params.validate(),
            Err(InvalidParamsError::TimespanShorterThanSpacing { timespan: 599, spacing: 600 })
        );

        let mut params = Params::MAINNET;
        params.pow_limit = Target::ZERO;
        assert_eq!(params.validate(), Err(InvalidParamsError::ZeroPowLimit));
    }

    #[test]
    fn custom_interval() {
        let params = Params {
            pow_target_spacing: 150,
            pow_target_timespan: 3_600,
            ..Params::REGTEST
        };
        assert_eq!(params.difficulty_adjustment_interval(), 24);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn params_from_json() {
        let json = r#"{
            "network": "testnet",
            "pow_limit": "00000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "allow_min_difficulty_blocks": true,
            "pow_target_spacing": 600,
            "pow_target_timespan": 1209600
        }"#;
        let params: Params = serde_json::from_str(json).unwrap();
        assert_eq!(params, Params::TESTNET);

        let round_trip: Params =
            serde_json::from_str(&serde_json::to_string(&params).unwrap()).unwrap();
        assert_eq!(round_trip, params);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn params_bincode() {
        let bytes = bincode::serialize(&Params::REGTEST).unwrap();
        let params: Params = bincode::deserialize(&bytes).unwrap();
        assert_eq!(params, Params::REGTEST);
    }
}
