use crate::error::{Error, Result, render};
use crate::keys::{
    COMPRESSED_KEY_LENGTH, PublicKeyValidator, Secp256k1Validator, fingerprint_to_fixed_length_hex,
    normalize_public_key,
};
use crate::network::{Network, Prefix, prefix_required_for};
use crate::path::{DerivationPath, PathMode};
use crypto_utils::base58::{base58_check_decode, base58_check_encode};
use log::{debug, trace};
use std::fmt;
use std::str::FromStr;

/// version (4) | depth (1) | parent_fp (4) | child_index (4) | chain_code (32) | key_data (33)
pub const EXTENDED_KEY_LENGTH: usize = 78;
pub const CHAIN_CODE_LENGTH: usize = 32;
/// Shortest base58Check text a 78-byte body can produce.
pub const MIN_BASE58_LENGTH: usize = 111;

const ROOT_FINGERPRINT_LENGTH: usize = 8;

/// Binary and base58Check serialization of a BIP32 extended key.
pub trait ExtendedKeyCodec: Sized {
    fn encode(&self) -> [u8; EXTENDED_KEY_LENGTH];

    /// Reads the fixed layout. Only the length is checked.
    fn decode(data: &[u8]) -> Result<Self>;

    fn to_base58(&self) -> String {
        base58_check_encode(&self.encode())
    }

    fn from_base58(s: &str) -> Result<Self> {
        let data = base58_check_decode(s.trim())?;
        Self::decode(&data)
    }
}

/// Extended public key (xpub) together with wallet metadata that is not serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    version: [u8; 4],
    depth: u8,
    parent_fingerprint: u32,
    child_index: u32,
    chain_code: [u8; CHAIN_CODE_LENGTH],
    public_key: [u8; COMPRESSED_KEY_LENGTH],
    network: Network,
    root_fingerprint: Option<String>,
    path: Option<DerivationPath>,
    base58: String,
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[offset..offset + N]);
    out
}

impl ExtendedKeyCodec for ExtendedPublicKey {
    fn encode(&self) -> [u8; EXTENDED_KEY_LENGTH] {
        let mut payload = [0u8; EXTENDED_KEY_LENGTH];
        payload[0..4].copy_from_slice(&self.version);
        payload[4] = self.depth;
        payload[5..9].copy_from_slice(&self.parent_fingerprint.to_be_bytes());
        payload[9..13].copy_from_slice(&self.child_index.to_be_bytes());
        payload[13..45].copy_from_slice(&self.chain_code);
        payload[45..78].copy_from_slice(&self.public_key);
        payload
    }

    fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < EXTENDED_KEY_LENGTH {
            return Err(Error::TruncatedInput {
                expected: EXTENDED_KEY_LENGTH,
                got: data.len(),
            });
        }
        if data.len() > EXTENDED_KEY_LENGTH {
            return Err(Error::InvalidKeyLength {
                expected: EXTENDED_KEY_LENGTH,
                got: data.len(),
            });
        }
        let version: [u8; 4] = read_array(data, 0);
        // regtest shares testnet version bytes, so it decodes as testnet
        let network = Prefix::from_version(version)
            .map(Prefix::network)
            .unwrap_or_default();
        let key = ExtendedPublicKey {
            version,
            depth: data[4],
            parent_fingerprint: u32::from_be_bytes(read_array(data, 5)),
            child_index: u32::from_be_bytes(read_array(data, 9)),
            chain_code: read_array(data, 13),
            public_key: read_array(data, 45),
            network,
            root_fingerprint: None,
            path: None,
            base58: base58_check_encode(data),
        };
        trace!("decoded extended public key {}", key.base58);
        Ok(key)
    }
}

impl ExtendedPublicKey {
    pub fn builder() -> ExtendedPublicKeyBuilder {
        ExtendedPublicKeyBuilder::default()
    }

    pub fn version(&self) -> [u8; 4] {
        self.version
    }

    /// `None` when the record was decoded from unknown version bytes.
    pub fn prefix(&self) -> Option<Prefix> {
        Prefix::from_version(self.version)
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> u32 {
        self.parent_fingerprint
    }

    pub fn child_index(&self) -> u32 {
        self.child_index
    }

    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_LENGTH] {
        &self.chain_code
    }

    pub fn public_key(&self) -> &[u8; COMPRESSED_KEY_LENGTH] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    pub fn chain_code_hex(&self) -> String {
        hex::encode(self.chain_code)
    }

    pub fn parent_fingerprint_hex(&self) -> String {
        fingerprint_to_fixed_length_hex(self.parent_fingerprint)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn root_fingerprint(&self) -> Option<&str> {
        self.root_fingerprint.as_deref()
    }

    pub fn path(&self) -> Option<&DerivationPath> {
        self.path.as_ref()
    }

    /// Text form cached when the serialized fields last changed.
    pub fn base58(&self) -> &str {
        &self.base58
    }

    /// Re-targets the record at `network`; version bytes and cached text follow.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self.version = network.version();
        self.base58 = self.to_base58();
        debug!("extended public key moved to {network}: {}", self.base58);
        self
    }

    /// Attaches derivation metadata. Depth and index are left as they are.
    pub fn with_bip32_path(mut self, path: &str) -> Result<Self> {
        self.path = Some(path.parse()?);
        Ok(self)
    }

    pub fn with_root_fingerprint(mut self, root_fingerprint: &str) -> Result<Self> {
        validate_root_fingerprint(root_fingerprint)?;
        self.root_fingerprint = Some(root_fingerprint.to_string());
        Ok(self)
    }

    /// Assembles a record from already-validated parts, e.g. a derived child.
    pub(crate) fn from_parts(
        network: Network,
        depth: u8,
        parent_fingerprint: u32,
        child_index: u32,
        chain_code: [u8; CHAIN_CODE_LENGTH],
        public_key: [u8; COMPRESSED_KEY_LENGTH],
    ) -> Self {
        let mut key = ExtendedPublicKey {
            version: network.version(),
            depth,
            parent_fingerprint,
            child_index,
            chain_code,
            public_key,
            network,
            root_fingerprint: None,
            path: None,
            base58: String::new(),
        };
        key.base58 = key.to_base58();
        key
    }
}

impl fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base58)
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ExtendedPublicKey::from_base58(s)
    }
}

/// Collects raw key material for an [`ExtendedPublicKey`].
///
/// Either a BIP32 path or a depth (and optionally an index) locates the key; supplying both is
/// an error. Public keys may be given compressed or uncompressed.
#[derive(Clone, Debug, Default)]
pub struct ExtendedPublicKeyBuilder {
    path: Option<String>,
    depth: Option<u8>,
    index: Option<u32>,
    public_key: Option<String>,
    chain_code: Option<String>,
    parent_fingerprint: Option<u32>,
    network: Network,
    root_fingerprint: Option<String>,
}

impl ExtendedPublicKeyBuilder {
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn public_key(mut self, pubkey_hex: impl Into<String>) -> Self {
        self.public_key = Some(pubkey_hex.into());
        self
    }

    pub fn chain_code(mut self, chain_code_hex: impl Into<String>) -> Self {
        self.chain_code = Some(chain_code_hex.into());
        self
    }

    pub fn parent_fingerprint(mut self, fingerprint: u32) -> Self {
        self.parent_fingerprint = Some(fingerprint);
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn root_fingerprint(mut self, root_fingerprint: impl Into<String>) -> Self {
        self.root_fingerprint = Some(root_fingerprint.into());
        self
    }

    pub fn build(self) -> Result<ExtendedPublicKey> {
        let (path, depth, child_index) = match (self.path, self.depth, self.index) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(Error::ConflictingDerivation);
            }
            (Some(path), None, None) => {
                let path = DerivationPath::parse_with_mode(&path, PathMode::Any)?;
                let (depth, index) = (path.depth(), path.terminal_index());
                (Some(path), depth, index)
            }
            (None, Some(depth), index) => (None, depth, index.unwrap_or(0)),
            (None, None, _) => return Err(Error::MissingField("depth")),
        };

        let chain_code_hex = self.chain_code.ok_or(Error::MissingField("chaincode"))?;
        let chain_code = hex::decode(&chain_code_hex)?;
        let chain_code: [u8; CHAIN_CODE_LENGTH] =
            chain_code
                .as_slice()
                .try_into()
                .map_err(|_| Error::InvalidKeyLength {
                    expected: CHAIN_CODE_LENGTH,
                    got: chain_code.len(),
                })?;

        let pubkey_hex = self.public_key.ok_or(Error::MissingField("pubkey"))?;
        let public_key = normalize_public_key(&hex::decode(&pubkey_hex)?)?;

        let parent_fingerprint = self
            .parent_fingerprint
            .ok_or(Error::MissingField("parent fingerprint"))?;

        if let Some(root) = &self.root_fingerprint {
            validate_root_fingerprint(root)?;
        }

        let mut key = ExtendedPublicKey::from_parts(
            self.network,
            depth,
            parent_fingerprint,
            child_index,
            chain_code,
            public_key,
        );
        key.path = path;
        key.root_fingerprint = self.root_fingerprint;
        debug!(
            "built {} extended public key at depth {} index {}",
            key.network, key.depth, key.child_index
        );
        Ok(key)
    }
}

/// Fails with [`Error::InvalidFingerprint`] unless `value` is exactly 8 hex characters.
pub fn validate_root_fingerprint(value: &str) -> Result<()> {
    if value.len() != ROOT_FINGERPRINT_LENGTH || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidFingerprint(value.to_string()));
    }
    Ok(())
}

fn leading_prefix(key: &str) -> String {
    key.chars().take(4).collect()
}

pub fn check_extended_public_key_for_network(key: &str, network: Network) -> Result<()> {
    if leading_prefix(key) == network.xpub_prefix().as_str() {
        return Ok(());
    }
    let required = prefix_required_for(network)
        .iter()
        .map(|p| format!("'{p}'"))
        .collect::<Vec<_>>()
        .join(" or ");
    Err(Error::NetworkMismatch(required))
}

/// Empty string when `key` carries the prefix `network` expects.
pub fn validate_extended_public_key_for_network(key: &str, network: Network) -> String {
    render(check_extended_public_key_for_network(key, network))
}

/// Raising twin of [`validate_extended_public_key`]; returns the decoded record.
pub fn check_extended_public_key(key: &str, network: Network) -> Result<ExtendedPublicKey> {
    if key.trim().is_empty() {
        return Err(Error::Blank("Extended public key"));
    }
    if key.chars().count() < 4 {
        return Err(Error::ValueTooShort(key.to_string()));
    }
    check_extended_public_key_for_network(key, network)?;
    if key.chars().count() < MIN_BASE58_LENGTH {
        return Err(Error::ExtendedKeyTooShort);
    }
    let decoded = ExtendedPublicKey::from_base58(key)
        .map_err(|e| Error::InvalidExtendedKey(e.to_string()))?;
    if !Secp256k1Validator.is_valid_public_key(decoded.public_key()) {
        return Err(Error::InvalidExtendedKey(Error::InvalidPublicKey.to_string()));
    }
    Ok(decoded)
}

/// Empty string for a decodable extended public key on `network`, otherwise the first problem.
pub fn validate_extended_public_key(key: &str, network: Network) -> String {
    render(check_extended_public_key(key, network))
}
