// SPDX-License-Identifier: CC0-1.0

//! Networks with their own proof-of-work parameters.
//!
//! ```
//! use aserti3::Network;
//!
//! let network: Network = "regtest".parse().unwrap();
//! assert_eq!(network, Network::Regtest);
//! assert_eq!(network.to_string(), "regtest");
//! ```

use core::fmt;
use core::str::FromStr;

use crate::consensus::Params;

/// The network a chain belongs to.
#[derive(Copy, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Network {
    /// Mainnet.
    Mainnet,
    /// Public testnet, min-difficulty blocks allowed.
    Testnet,
    /// Local regression testing.
    Regtest,
}

impl Network {
    /// Returns the network's short name, as used by node configuration files.
    pub fn to_core_arg(self) -> &'static str {
        match self {
            Network::Mainnet => "main",
            Network::Testnet => "test",
            Network::Regtest => "regtest",
        }
    }

    /// Converts a short name as returned by [`Network::to_core_arg`] to a network.
    pub fn from_core_arg(core_arg: &str) -> Result<Self, ParseNetworkError> {
        match core_arg {
            "main" => Ok(Network::Mainnet),
            "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(ParseNetworkError(())),
        }
    }

    /// Returns the consensus parameters of this network.
    pub fn params(self) -> &'static Params {
        match self {
            Network::Mainnet => &Params::MAINNET,
            Network::Testnet => &Params::TESTNET,
            Network::Regtest => &Params::REGTEST,
        }
    }
}

impl AsRef<Params> for Network {
    fn as_ref(&self) -> &Params { self.params() }
}

/// An error in parsing network string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseNetworkError(());

impl fmt::Display for ParseNetworkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("failed to parse network, expected one of mainnet, testnet, regtest")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseNetworkError {}

impl FromStr for Network {
    type Err = ParseNetworkError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(ParseNetworkError(())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn string_round_trip() {
        for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
            assert_eq!(network.to_string().parse::<Network>().unwrap(), network);
            assert_eq!(Network::from_core_arg(network.to_core_arg()).unwrap(), network);
        }
        assert!("bitcoin".parse::<Network>().is_err());
        assert!(Network::from_core_arg("signet").is_err());
    }

    #[test]
    fn network_params() {
        assert_eq!(Network::Mainnet.params().network, Network::Mainnet);
        assert!(Network::Testnet.params().allow_min_difficulty_blocks);
        assert_eq!(AsRef::<Params>::as_ref(&Network::Regtest), &Params::REGTEST);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_lowercase() {
        use serde_test::{assert_tokens, Token};

        assert_tokens(
            &Network::Regtest,
            &[Token::UnitVariant { name: "Network", variant: "regtest" }],
        );
    }
}
