use std::{fmt, str::FromStr};

/// Ethereum hard forks in chronological order.
///
/// Each hard fork fixes one immutable jump table: the same opcode byte may
/// gain existence, lose a gas discount, or swap its dynamic-gas formula from
/// one fork to the next, but never within a fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Fork {
    /// Initial Ethereum release (July 2015)
    Frontier = 0,
    /// First planned hard fork (March 2016) - adds DELEGATECALL
    Homestead = 1,
    /// EIP-150 gas repricing fork (October 2016)
    TangerineWhistle = 2,
    /// EIP-158/160/170 state-clearing fork (November 2016)
    SpuriousDragon = 3,
    /// First of Metropolis series (October 2017) - adds REVERT, STATICCALL,
    /// RETURNDATASIZE, RETURNDATACOPY
    Byzantium = 4,
    /// Second of Metropolis series (February 2019) - adds SHL, SHR, SAR,
    /// EXTCODEHASH, CREATE2
    Constantinople = 5,
    /// October 2019 fork - adds CHAINID, SELFBALANCE; EIP-1884 repricing
    Istanbul = 6,
    /// April 2021 fork - EIP-2929 access-list gas accounting
    Berlin = 7,
    /// August 2021 fork (default) - adds BASEFEE; EIP-3529 refund reduction
    #[default]
    London = 8,
}

impl Fork {
    /// All forks, in activation order.
    pub const ALL: [Fork; 9] = [
        Fork::Frontier,
        Fork::Homestead,
        Fork::TangerineWhistle,
        Fork::SpuriousDragon,
        Fork::Byzantium,
        Fork::Constantinople,
        Fork::Istanbul,
        Fork::Berlin,
        Fork::London,
    ];

    /// Returns true if `self` is at or after `other`.
    #[inline]
    pub const fn is_active(self, other: Self) -> bool {
        self as u8 >= other as u8
    }

    /// The canonical lowercase name of the fork.
    pub const fn name(self) -> &'static str {
        match self {
            Fork::Frontier => "frontier",
            Fork::Homestead => "homestead",
            Fork::TangerineWhistle => "tangerine",
            Fork::SpuriousDragon => "spurious",
            Fork::Byzantium => "byzantium",
            Fork::Constantinople => "constantinople",
            Fork::Istanbul => "istanbul",
            Fork::Berlin => "berlin",
            Fork::London => "london",
        }
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown fork name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fork: {0}")]
pub struct UnknownForkError(String);

impl FromStr for Fork {
    type Err = UnknownForkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "frontier" => Ok(Fork::Frontier),
            "homestead" => Ok(Fork::Homestead),
            "tangerine" | "tangerinewhistle" | "eip150" => Ok(Fork::TangerineWhistle),
            "spurious" | "spuriousdragon" | "eip158" => Ok(Fork::SpuriousDragon),
            "byzantium" => Ok(Fork::Byzantium),
            "constantinople" => Ok(Fork::Constantinople),
            "istanbul" => Ok(Fork::Istanbul),
            "berlin" => Ok(Fork::Berlin),
            "london" => Ok(Fork::London),
            other => Err(UnknownForkError(other.to_string())),
        }
    }
}
