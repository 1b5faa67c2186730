use crate::error::{Error, Result};
use crate::extended_key::{
    CHAIN_CODE_LENGTH, ExtendedKeyCodec, ExtendedPublicKey, check_extended_public_key_for_network,
};
use crate::keys::fingerprint_from_public_key;
use crate::network::Network;
use crate::path::{DerivationPath, HARDENED_OFFSET, PathMode};
use crypto_utils::hmac::hmac_sha512;
use log::debug;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

/// Public child key derivation (CKDpub).
pub trait ChildKeyDeriver {
    fn derive_child(&self, parent: &ExtendedPublicKey, index: u32) -> Result<ExtendedPublicKey>;

    /// Applies [`ChildKeyDeriver::derive_child`] for every index of `path`, in order.
    fn derive_path(
        &self,
        parent: &ExtendedPublicKey,
        path: &DerivationPath,
    ) -> Result<ExtendedPublicKey> {
        let mut key = parent.clone();
        for &index in &path.0 {
            key = self.derive_child(&key, index)?;
        }
        Ok(key)
    }
}

/// CKDpub over secp256k1.
#[derive(Clone, Debug)]
pub struct Secp256k1Deriver {
    secp: Secp256k1<secp256k1::All>,
}

impl Default for Secp256k1Deriver {
    fn default() -> Self {
        Secp256k1Deriver {
            secp: Secp256k1::new(),
        }
    }
}

impl ChildKeyDeriver for Secp256k1Deriver {
    fn derive_child(&self, parent: &ExtendedPublicKey, index: u32) -> Result<ExtendedPublicKey> {
        if index >= HARDENED_OFFSET {
            return Err(Error::Derivation(
                "hardened children need the private key".to_string(),
            ));
        }
        let parent_pub = PublicKey::from_slice(parent.public_key())
            .map_err(|_| Error::InvalidPublicKey)?;

        // Non-hardened: 33-byte compressed pubkey (parent_pub) + 4-byte index
        let mut data = Vec::with_capacity(33 + 4);
        data.extend(parent.public_key());
        data.extend(index.to_be_bytes());

        let i = hmac_sha512(parent.chain_code(), &data);
        let (il, ir) = i.split_at(CHAIN_CODE_LENGTH);

        // Child public key: G*IL + parent_pub
        let tweak = SecretKey::from_slice(il)
            .map_err(|_| Error::Derivation(format!("invalid tweak at index {index}")))?;
        let child_point = parent_pub
            .combine(&PublicKey::from_secret_key(&self.secp, &tweak))
            .map_err(|_| Error::Derivation(format!("invalid child key at index {index}")))?;

        let mut chain_code = [0u8; CHAIN_CODE_LENGTH];
        chain_code.copy_from_slice(ir);

        let depth = parent
            .depth()
            .checked_add(1)
            .ok_or_else(|| Error::Derivation("maximum derivation depth exceeded".to_string()))?;

        Ok(ExtendedPublicKey::from_parts(
            parent.network(),
            depth,
            fingerprint_from_public_key(parent.public_key())?,
            index,
            chain_code,
            child_point.serialize(),
        ))
    }
}

fn derive(extended_public_key: &str, path: &str, network: Network) -> Result<ExtendedPublicKey> {
    check_extended_public_key_for_network(extended_public_key, network)?;
    let path = DerivationPath::parse_with_mode(path, PathMode::Unhardened)?;
    let parent = ExtendedPublicKey::from_base58(extended_public_key)?.with_network(network);
    let child = Secp256k1Deriver::default().derive_path(&parent, &path)?;
    debug!("derived {} from {}", path, parent.base58());
    Ok(child)
}

/// Compressed public key (hex) at `path` below `extended_public_key`.
pub fn derive_child_public_key(
    extended_public_key: &str,
    path: &str,
    network: Network,
) -> Result<String> {
    Ok(derive(extended_public_key, path, network)?.public_key_hex())
}

/// Extended public key (base58) at `path` below `extended_public_key`.
pub fn derive_child_extended_public_key(
    extended_public_key: &str,
    path: &str,
    network: Network,
) -> Result<String> {
    Ok(derive(extended_public_key, path, network)?.to_string())
}
