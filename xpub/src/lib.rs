//! Extended public keys for multi-network, multi-script-type HD wallets.
//!
//! The central type is [`ExtendedPublicKey`], which serializes to the 78-byte BIP32 layout
//! through [`ExtendedKeyCodec`]. Prefix conversion, fingerprints, key compression and path
//! parsing are also usable on their own.

pub mod convert;
pub mod derivation;
pub mod error;
pub mod extended_key;
pub mod keys;
pub mod network;
pub mod path;

pub use convert::convert_extended_public_key;
pub use derivation::{
    ChildKeyDeriver, Secp256k1Deriver, derive_child_extended_public_key, derive_child_public_key,
};
pub use error::{Error, Result};
pub use extended_key::{
    EXTENDED_KEY_LENGTH, ExtendedKeyCodec, ExtendedPublicKey, ExtendedPublicKeyBuilder,
    validate_extended_public_key, validate_extended_public_key_for_network,
    validate_root_fingerprint,
};
pub use keys::{
    PublicKeyValidator, Secp256k1Validator, compress_public_key, fingerprint_from_public_key,
    fingerprint_to_fixed_length_hex, is_key_compressed, validate_public_key,
};
pub use network::{AddressType, Network, Prefix, validate_prefix};
pub use path::{DerivationPath, HARDENED_OFFSET, PathMode, validate_bip32_path};
