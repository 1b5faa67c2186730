//! Public key helpers: compression, fingerprints and structural validation.

use crate::error::{Error, Result, render};
use crate::network::AddressType;
use crypto_utils::hash::hash160;
use secp256k1::PublicKey;

pub const COMPRESSED_KEY_LENGTH: usize = 33;
pub const UNCOMPRESSED_KEY_LENGTH: usize = 65;

/// Checks that bytes form a valid public key. Curve arithmetic lives behind this seam.
pub trait PublicKeyValidator {
    fn is_valid_public_key(&self, key: &[u8]) -> bool;
}

/// Validates keys by parsing them as secp256k1 points.
#[derive(Copy, Clone, Debug, Default)]
pub struct Secp256k1Validator;

impl PublicKeyValidator for Secp256k1Validator {
    fn is_valid_public_key(&self, key: &[u8]) -> bool {
        PublicKey::from_slice(key).is_ok()
    }
}

pub fn is_key_compressed(pubkey: &[u8]) -> bool {
    pubkey.len() == COMPRESSED_KEY_LENGTH && matches!(pubkey[0], 0x02 | 0x03)
}

/// Compresses `0x04 || X || Y` into `(0x02 | Y parity) || X`.
pub fn compress_public_key(pubkey: &[u8]) -> Result<[u8; COMPRESSED_KEY_LENGTH]> {
    if pubkey.len() != UNCOMPRESSED_KEY_LENGTH || pubkey[0] != 0x04 {
        return Err(Error::InvalidKeyLength {
            expected: UNCOMPRESSED_KEY_LENGTH,
            got: pubkey.len(),
        });
    }
    let mut compressed = [0u8; COMPRESSED_KEY_LENGTH];
    compressed[0] = 0x02 | (pubkey[UNCOMPRESSED_KEY_LENGTH - 1] & 0x01);
    compressed[1..].copy_from_slice(&pubkey[1..COMPRESSED_KEY_LENGTH]);
    Ok(compressed)
}

/// Returns the compressed form of either encoding.
pub fn normalize_public_key(pubkey: &[u8]) -> Result<[u8; COMPRESSED_KEY_LENGTH]> {
    if is_key_compressed(pubkey) {
        let mut out = [0u8; COMPRESSED_KEY_LENGTH];
        out.copy_from_slice(pubkey);
        return Ok(out);
    }
    match pubkey.len() {
        UNCOMPRESSED_KEY_LENGTH => compress_public_key(pubkey),
        got => Err(Error::InvalidKeyLength {
            expected: COMPRESSED_KEY_LENGTH,
            got,
        }),
    }
}

pub fn is_key_compressed_hex(pubkey_hex: &str) -> bool {
    hex::decode(pubkey_hex)
        .map(|bytes| is_key_compressed(&bytes))
        .unwrap_or(false)
}

pub fn compress_public_key_hex(pubkey_hex: &str) -> Result<String> {
    let bytes = hex::decode(pubkey_hex)?;
    Ok(hex::encode(compress_public_key(&bytes)?))
}

/// 4-byte parent fingerprint: HASH160(compressed pubkey)[0..4] as a big-endian integer.
pub fn fingerprint_from_public_key(pubkey: &[u8]) -> Result<u32> {
    let compressed = normalize_public_key(pubkey)?;
    let id = hash160(&compressed);
    Ok(u32::from_be_bytes([id[0], id[1], id[2], id[3]]))
}

pub fn fingerprint_from_public_key_hex(pubkey_hex: &str) -> Result<u32> {
    fingerprint_from_public_key(&hex::decode(pubkey_hex)?)
}

pub fn fingerprint_to_fixed_length_hex(fingerprint: u32) -> String {
    format!("{fingerprint:08x}")
}

/// Raising twin of [`validate_public_key`].
pub fn check_public_key(pubkey_hex: &str, address_type: Option<AddressType>) -> Result<()> {
    check_public_key_with(&Secp256k1Validator, pubkey_hex, address_type)
}

pub fn check_public_key_with<V: PublicKeyValidator>(
    validator: &V,
    pubkey_hex: &str,
    address_type: Option<AddressType>,
) -> Result<()> {
    if pubkey_hex.trim().is_empty() {
        return Err(Error::Blank("Public key"));
    }
    let bytes = hex::decode(pubkey_hex)?;
    if !validator.is_valid_public_key(&bytes) {
        return Err(Error::InvalidPublicKey);
    }
    match address_type {
        Some(kind) if kind.requires_compressed_keys() && !is_key_compressed(&bytes) => {
            Err(Error::UncompressedKey(kind))
        }
        _ => Ok(()),
    }
}

/// Empty string for a usable public key, otherwise a description of the problem.
pub fn validate_public_key(pubkey_hex: &str, address_type: Option<AddressType>) -> String {
    render(check_public_key(pubkey_hex, address_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use secp256k1::{Secp256k1, SecretKey};

    const VALID_PUBKEY: &str = "02a8513d9931896d5d3afc8063148db75d8851fd1fc41b1098ba2a6a766db563d4";

    fn uncompressed_sample() -> ([u8; 65], [u8; 33]) {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[0x11; 32]).unwrap();
        let pk = PublicKey::from_secret_key(&secp, &sk);
        (pk.serialize_uncompressed(), pk.serialize())
    }

    #[test]
    fn compression_matches_secp256k1() {
        let (uncompressed, compressed) = uncompressed_sample();
        assert!(!is_key_compressed(&uncompressed));
        assert_eq!(compress_public_key(&uncompressed).unwrap(), compressed);
        assert!(is_key_compressed(&compressed));
        assert_eq!(normalize_public_key(&compressed).unwrap(), compressed);
    }

    #[test]
    fn compression_uses_y_parity() {
        let mut key = [0u8; 65];
        key[0] = 0x04;
        key[1..33].copy_from_slice(&[0xab; 32]);
        key[64] = 0x02;
        assert_eq!(compress_public_key(&key).unwrap()[0], 0x02);
        key[64] = 0x03;
        let compressed = compress_public_key(&key).unwrap();
        assert_eq!(compressed[0], 0x03);
        assert_eq!(&compressed[1..], &[0xab; 32]);
    }

    #[test]
    fn compression_rejects_malformed_input() {
        assert_eq!(
            compress_public_key(&[0x04; 64]).unwrap_err(),
            Error::InvalidKeyLength {
                expected: 65,
                got: 64
            }
        );
        let mut wrong_tag = [0u8; 65];
        wrong_tag[0] = 0x02;
        assert!(compress_public_key(&wrong_tag).is_err());
        assert!(compress_public_key_hex("zz").is_err());
    }

    #[test]
    fn fingerprint_vector() {
        let key = hex!("03b32dc780fba98db25b4b72cf2b69da228f5e10ca6aa8f46eabe7f9fe22c994ee");
        let fp = fingerprint_from_public_key(&key).unwrap();
        assert_eq!(fp, 724365675);
        assert_eq!(fingerprint_to_fixed_length_hex(fp), "2b2cf16b");
    }

    #[test]
    fn fingerprint_bip32_master() {
        let fp = fingerprint_from_public_key_hex(
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2",
        )
        .unwrap();
        assert_eq!(fingerprint_to_fixed_length_hex(fp), "3442193e");
    }

    #[test]
    fn fingerprint_ignores_encoding() {
        let (uncompressed, compressed) = uncompressed_sample();
        assert_eq!(
            fingerprint_from_public_key(&uncompressed).unwrap(),
            fingerprint_from_public_key(&compressed).unwrap()
        );
        assert!(fingerprint_from_public_key(&[0x02; 20]).is_err());
    }

    #[test]
    fn fixed_length_hex_is_unsigned_and_padded() {
        assert_eq!(fingerprint_to_fixed_length_hex(0), "00000000");
        assert_eq!(fingerprint_to_fixed_length_hex(0xab), "000000ab");
        assert_eq!(fingerprint_to_fixed_length_hex(u32::MAX), "ffffffff");
        assert_eq!(fingerprint_to_fixed_length_hex(0x8000_0000), "80000000");
    }

    #[test]
    fn validate_public_keys() {
        assert_eq!(validate_public_key(VALID_PUBKEY, None), "");
        assert_eq!(validate_public_key("", None), "Public key cannot be blank.");
        assert_eq!(
            validate_public_key("02a8513d9931896d5d3afc8063148db75d8851fd1fc41b1098ba2a6a766db563d", None),
            "Invalid hex: odd-length string."
        );
        assert_eq!(
            validate_public_key("zz", None),
            "Invalid hex: only characters a-f, A-F and 0-9 allowed."
        );
        assert_eq!(validate_public_key("0201", None), "Invalid public key.");
    }

    #[test]
    fn witness_types_reject_uncompressed_keys() {
        let (uncompressed, _) = uncompressed_sample();
        let uncompressed_hex = hex::encode(uncompressed);
        assert_eq!(
            validate_public_key(&uncompressed_hex, Some(AddressType::P2sh)),
            ""
        );
        assert_eq!(
            validate_public_key(&uncompressed_hex, Some(AddressType::P2wsh)),
            "P2WSH does not support uncompressed public keys."
        );
        assert_eq!(
            validate_public_key(&uncompressed_hex, Some(AddressType::P2shP2wsh)),
            "P2SH-P2WSH does not support uncompressed public keys."
        );
        assert_eq!(validate_public_key(VALID_PUBKEY, Some(AddressType::P2wsh)), "");
    }

    struct RejectAll;

    impl PublicKeyValidator for RejectAll {
        fn is_valid_public_key(&self, _key: &[u8]) -> bool {
            false
        }
    }

    #[test]
    fn custom_validator() {
        assert_eq!(
            check_public_key_with(&RejectAll, VALID_PUBKEY, None).unwrap_err(),
            Error::InvalidPublicKey
        );
    }
}
