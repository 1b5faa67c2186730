use crate::hash::sha256d;

/// Length of the base58Check checksum suffix.
pub const CHECKSUM_LENGTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Base58Error {
    #[error("invalid base58 character '{0}'")]
    InvalidCharacter(char),

    #[error("non-ASCII character at position {0}")]
    NonAsciiCharacter(usize),

    #[error("invalid base58 length")]
    InvalidLength,

    #[error("Invalid checksum")]
    InvalidChecksum,
}

impl From<bs58::decode::Error> for Base58Error {
    fn from(e: bs58::decode::Error) -> Self {
        match e {
            bs58::decode::Error::InvalidCharacter { character, .. } => {
                Base58Error::InvalidCharacter(character)
            }
            bs58::decode::Error::NonAsciiCharacter { index } => Base58Error::NonAsciiCharacter(index),
            _ => Base58Error::InvalidLength,
        }
    }
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    if s.is_empty() {
        return Err(Base58Error::InvalidLength);
    }
    Ok(bs58::decode(s).into_vec()?)
}

/// First four bytes of the double SHA-256 of `payload`.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = sha256d(payload);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[..CHECKSUM_LENGTH]);
    out
}

pub fn base58_check_encode(payload: &[u8]) -> String {
    let mut extended = Vec::with_capacity(payload.len() + CHECKSUM_LENGTH);
    extended.extend_from_slice(payload);
    extended.extend_from_slice(&checksum(payload));
    base58_encode(&extended)
}

pub fn base58_check_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    let raw = base58_decode(s)?;
    if raw.len() < CHECKSUM_LENGTH {
        return Err(Base58Error::InvalidLength);
    }
    let (payload, expected) = raw.split_at(raw.len() - CHECKSUM_LENGTH);
    if checksum(payload) != expected {
        return Err(Base58Error::InvalidChecksum);
    }
    Ok(payload.to_vec())
}
