//! Error type.
//!
//! Every fallible operation returns [`Result`]. The `validate_*` functions render the same
//! errors as strings through [`render`], so the `Display` text of each variant doubles as the
//! user-facing validation message.

use crate::network::AddressType;
use crypto_utils::Base58Error;

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0} cannot be blank.")]
    Blank(&'static str),

    #[error("Missing required field: {0}.")]
    MissingField(&'static str),

    #[error("Invalid hex: {0}")]
    InvalidHex(&'static str),

    #[error("Invalid key length: expected {expected} bytes, got {got}.")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Invalid public key.")]
    InvalidPublicKey,

    #[error("{0} does not support uncompressed public keys.")]
    UncompressedKey(AddressType),

    #[error("Invalid prefix \"{0}\" for extended public key.")]
    InvalidPrefix(String),

    #[error("Extended public key must begin with {0}.")]
    NetworkMismatch(String),

    #[error("Invalid extended public key. Value {0} is too short")]
    ValueTooShort(String),

    #[error("Extended public key is too short.")]
    ExtendedKeyTooShort,

    #[error("Invalid extended public key: {0}")]
    InvalidExtendedKey(String),

    #[error("Invalid checksum.")]
    ChecksumMismatch,

    #[error("Invalid base58: {0}")]
    InvalidBase58(String),

    #[error("Truncated extended key: expected {expected} bytes, got {got}.")]
    TruncatedInput { expected: usize, got: usize },

    #[error("{0}")]
    InvalidPath(&'static str),

    #[error("Root fingerprint must be 8 hex characters, got \"{0}\".")]
    InvalidFingerprint(String),

    #[error("Supply either a BIP32 path or a depth and index, not both.")]
    ConflictingDerivation,

    #[error("Unable to convert extended public key: {0}")]
    ConversionFailed(String),

    #[error("Unknown network \"{0}\".")]
    UnknownNetwork(String),

    #[error("Unknown address type \"{0}\".")]
    UnknownAddressType(String),

    #[error("Unable to derive child key: {0}")]
    Derivation(String),
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        match e {
            hex::FromHexError::OddLength => Error::InvalidHex("odd-length string."),
            hex::FromHexError::InvalidHexCharacter { .. } => {
                Error::InvalidHex("only characters a-f, A-F and 0-9 allowed.")
            }
            hex::FromHexError::InvalidStringLength => Error::InvalidHex("unexpected length."),
        }
    }
}

impl From<Base58Error> for Error {
    fn from(e: Base58Error) -> Self {
        match e {
            Base58Error::InvalidChecksum => Error::ChecksumMismatch,
            other => Error::InvalidBase58(other.to_string()),
        }
    }
}

/// Validator adapter: empty string on success, the error message otherwise.
pub(crate) fn render<T>(result: Result<T>) -> String {
    match result {
        Ok(_) => String::new(),
        Err(e) => e.to_string(),
    }
}
