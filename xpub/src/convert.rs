use crate::error::{Error, Result};
use crate::network::validate_prefix;
use crypto_utils::base58::{base58_check_decode, base58_check_encode};
use log::debug;

/// Rewrites the version bytes of `extended_public_key` to those of `target_prefix`.
///
/// Only the first four bytes of the decoded body change; depth, fingerprint, index, chain
/// code and key data are carried over untouched and a fresh checksum is appended. Both the
/// source and the target prefix must be one of the ten known prefixes.
pub fn convert_extended_public_key(extended_public_key: &str, target_prefix: &str) -> Result<String> {
    let key = extended_public_key.trim();
    let source_prefix: String = key.chars().take(4).collect();
    let target = validate_prefix(target_prefix)?;
    validate_prefix(&source_prefix)?;

    let mut body = base58_check_decode(key)
        .map_err(|e| Error::ConversionFailed(Error::from(e).to_string()))?;
    if body.len() < 4 {
        return Err(Error::ConversionFailed(
            Error::TruncatedInput {
                expected: 4,
                got: body.len(),
            }
            .to_string(),
        ));
    }
    body[..4].copy_from_slice(&target.version());
    let converted = base58_check_encode(&body);
    debug!("converted extended public key from {source_prefix} to {target}");
    Ok(converted)
}
