use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Bitcoin network an extended public key belongs to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    /// Prefix used when a record is encoded for this network.
    pub fn xpub_prefix(self) -> Prefix {
        match self {
            Network::Mainnet => Prefix::Xpub,
            Network::Testnet | Network::Regtest => Prefix::Tpub,
        }
    }

    /// Version bytes of [`Network::xpub_prefix`].
    pub fn version(self) -> [u8; 4] {
        self.xpub_prefix().version()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(Error::UnknownNetwork(s.to_string())),
        }
    }
}

/// The ten SLIP-132 style extended public key prefixes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Prefix {
    Xpub,
    Ypub,
    Zpub,
    /// `Ypub`, multisig P2WSH nested in P2SH
    YpubMultisig,
    /// `Zpub`, multisig native P2WSH
    ZpubMultisig,
    Tpub,
    Upub,
    Vpub,
    /// `Upub`, testnet multisig P2WSH nested in P2SH
    UpubMultisig,
    /// `Vpub`, testnet multisig native P2WSH
    VpubMultisig,
}

// Version bytes for serialization
pub const VERSION_XPUB: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
pub const VERSION_YPUB: [u8; 4] = [0x04, 0x9D, 0x7C, 0xB2];
pub const VERSION_ZPUB: [u8; 4] = [0x04, 0xB2, 0x47, 0x46];
pub const VERSION_YPUB_MULTISIG: [u8; 4] = [0x02, 0x95, 0xB4, 0x3F];
pub const VERSION_ZPUB_MULTISIG: [u8; 4] = [0x02, 0xAA, 0x7E, 0xD3];
pub const VERSION_TPUB: [u8; 4] = [0x04, 0x35, 0x87, 0xCF];
pub const VERSION_UPUB: [u8; 4] = [0x04, 0x4A, 0x52, 0x62];
pub const VERSION_VPUB: [u8; 4] = [0x04, 0x5F, 0x1C, 0xF6];
pub const VERSION_UPUB_MULTISIG: [u8; 4] = [0x02, 0x42, 0x89, 0xEF];
pub const VERSION_VPUB_MULTISIG: [u8; 4] = [0x02, 0x57, 0x54, 0x83];

impl Prefix {
    pub const ALL: [Prefix; 10] = [
        Prefix::Xpub,
        Prefix::Ypub,
        Prefix::Zpub,
        Prefix::YpubMultisig,
        Prefix::ZpubMultisig,
        Prefix::Tpub,
        Prefix::Upub,
        Prefix::Vpub,
        Prefix::UpubMultisig,
        Prefix::VpubMultisig,
    ];

    pub fn version(self) -> [u8; 4] {
        match self {
            Prefix::Xpub => VERSION_XPUB,
            Prefix::Ypub => VERSION_YPUB,
            Prefix::Zpub => VERSION_ZPUB,
            Prefix::YpubMultisig => VERSION_YPUB_MULTISIG,
            Prefix::ZpubMultisig => VERSION_ZPUB_MULTISIG,
            Prefix::Tpub => VERSION_TPUB,
            Prefix::Upub => VERSION_UPUB,
            Prefix::Vpub => VERSION_VPUB,
            Prefix::UpubMultisig => VERSION_UPUB_MULTISIG,
            Prefix::VpubMultisig => VERSION_VPUB_MULTISIG,
        }
    }

    pub fn from_version(version: [u8; 4]) -> Option<Prefix> {
        Prefix::ALL.into_iter().find(|p| p.version() == version)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Prefix::Xpub => "xpub",
            Prefix::Ypub => "ypub",
            Prefix::Zpub => "zpub",
            Prefix::YpubMultisig => "Ypub",
            Prefix::ZpubMultisig => "Zpub",
            Prefix::Tpub => "tpub",
            Prefix::Upub => "upub",
            Prefix::Vpub => "vpub",
            Prefix::UpubMultisig => "Upub",
            Prefix::VpubMultisig => "Vpub",
        }
    }

    /// Mainnet for the x/y/z family, testnet for t/u/v. Regtest shares testnet prefixes.
    pub fn network(self) -> Network {
        match self {
            Prefix::Xpub
            | Prefix::Ypub
            | Prefix::Zpub
            | Prefix::YpubMultisig
            | Prefix::ZpubMultisig => Network::Mainnet,
            Prefix::Tpub
            | Prefix::Upub
            | Prefix::Vpub
            | Prefix::UpubMultisig
            | Prefix::VpubMultisig => Network::Testnet,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prefix {
    type Err = Error;

    /// Case-sensitive: `ypub` and `Ypub` are different prefixes.
    fn from_str(s: &str) -> Result<Self> {
        Prefix::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::InvalidPrefix(s.to_string()))
    }
}

/// Fails with [`Error::InvalidPrefix`] unless `prefix` is one of the ten known prefixes.
pub fn validate_prefix(prefix: &str) -> Result<Prefix> {
    prefix.parse()
}

/// Version bytes for a textual prefix.
pub fn version_for(prefix: &str) -> Result<[u8; 4]> {
    Ok(validate_prefix(prefix)?.version())
}

/// Prefixes named in network-mismatch messages.
pub fn prefix_required_for(network: Network) -> &'static [Prefix] {
    match network {
        Network::Mainnet => &[Prefix::Xpub],
        Network::Testnet | Network::Regtest => &[Prefix::Xpub, Prefix::Tpub],
    }
}

/// Multisig script types a public key may be used with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AddressType {
    P2sh,
    P2shP2wsh,
    P2wsh,
}

impl AddressType {
    /// Witness-based script types only accept compressed keys.
    pub fn requires_compressed_keys(self) -> bool {
        !matches!(self, AddressType::P2sh)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AddressType::P2sh => "P2SH",
            AddressType::P2shP2wsh => "P2SH-P2WSH",
            AddressType::P2wsh => "P2WSH",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P2SH" => Ok(AddressType::P2sh),
            "P2SH-P2WSH" => Ok(AddressType::P2shP2wsh),
            "P2WSH" => Ok(AddressType::P2wsh),
            _ => Err(Error::UnknownAddressType(s.to_string())),
        }
    }
}
