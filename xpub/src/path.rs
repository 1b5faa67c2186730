use crate::error::{Error, Result, render};
use std::fmt;
use std::str::FromStr;

/// Index offset for hardened children (index >= 0x80000000) i.e., 0x80000000 = 2³¹
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Depth is serialized as a single byte.
pub const MAX_DEPTH: usize = u8::MAX as usize;

const PATH_INVALID: &str = "BIP32 path is invalid.";
const PATH_NOT_HARDENED: &str = "BIP32 path must be fully-hardened.";
const PATH_HAS_HARDENED: &str = "BIP32 path cannot include hardened segments.";
const PATH_TOO_DEEP: &str = "BIP32 path is too deep.";
const PATH_NOT_DESCENDANT: &str = "BIP32 path is not a descendant of the given path.";
const INDEX_INVALID: &str = "BIP32 index is invalid.";
const INDEX_TOO_HIGH: &str = "BIP32 index is too high.";

/// Restriction on which kinds of segments a path may contain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PathMode {
    #[default]
    Any,
    /// Every segment hardened, e.g. account paths like `m/48'/0'/0'/2'`.
    Hardened,
    /// No hardened segments; required for public derivation.
    Unhardened,
}

/// A BIP-32 derivation path (e.g., "m/45'/0'/0'/0/1").
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(pub Vec<u32>);

/// Strips a single leading `m/`.
fn normalize(path: &str) -> &str {
    path.strip_prefix("m/").unwrap_or(path)
}

/// Parses one segment such as `44'`, `44h` or `7`.
fn parse_index(segment: &str) -> Result<u32> {
    if segment.is_empty() {
        return Err(Error::Blank("BIP32 index"));
    }
    let (digits, hardened) = match segment.strip_suffix('\'').or_else(|| segment.strip_suffix('h')) {
        Some(digits) => (digits, true),
        None => (segment, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidPath(INDEX_INVALID));
    }
    let index: u32 = digits
        .parse()
        .map_err(|_| Error::InvalidPath(INDEX_TOO_HIGH))?;
    if hardened {
        hardened_bip32_index(index)
    } else if index >= HARDENED_OFFSET {
        Err(Error::InvalidPath(INDEX_TOO_HIGH))
    } else {
        Ok(index)
    }
}

/// Offsets `index` into the hardened half of the index space.
pub fn hardened_bip32_index(index: u32) -> Result<u32> {
    if index >= HARDENED_OFFSET {
        return Err(Error::InvalidPath(INDEX_TOO_HIGH));
    }
    Ok(index + HARDENED_OFFSET)
}

impl DerivationPath {
    /// Parses an absolute (`m/0'/1`) or relative (`0'/1`) path and checks it against `mode`.
    pub fn parse_with_mode(path: &str, mode: PathMode) -> Result<Self> {
        if path.trim().is_empty() {
            return Err(Error::Blank("BIP32 path"));
        }
        let relative = normalize(path);
        if relative.is_empty() {
            return Err(Error::InvalidPath(PATH_INVALID));
        }

        let mut indices = Vec::new();
        for segment in relative.split('/') {
            let index = parse_index(segment).map_err(|e| match e {
                Error::InvalidPath(INDEX_TOO_HIGH) => e,
                _ => Error::InvalidPath(PATH_INVALID),
            })?;
            indices.push(index);
        }
        if indices.len() > MAX_DEPTH {
            return Err(Error::InvalidPath(PATH_TOO_DEEP));
        }

        let path = DerivationPath(indices);
        match mode {
            PathMode::Hardened if !path.is_fully_hardened() => {
                Err(Error::InvalidPath(PATH_NOT_HARDENED))
            }
            PathMode::Unhardened if path.has_hardened() => {
                Err(Error::InvalidPath(PATH_HAS_HARDENED))
            }
            _ => Ok(path),
        }
    }

    /// Number of segments; fits a byte for any parsed path.
    pub fn depth(&self) -> u8 {
        self.0.len().min(MAX_DEPTH) as u8
    }

    /// Last child index, or 0 for the root path.
    pub fn terminal_index(&self) -> u32 {
        self.0.last().copied().unwrap_or(0)
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.0.iter().all(|&i| i >= HARDENED_OFFSET)
    }

    pub fn has_hardened(&self) -> bool {
        self.0.iter().any(|&i| i >= HARDENED_OFFSET)
    }

    /// The path one level up; `None` for the root.
    pub fn parent(&self) -> Option<DerivationPath> {
        let (_, parent) = self.0.split_last()?;
        Some(DerivationPath(parent.to_vec()))
    }

    /// Segments of `self` below `ancestor`, e.g. `m/45'/0/1` relative to `m/45'` is `0/1`.
    pub fn relative_to(&self, ancestor: &DerivationPath) -> Result<DerivationPath> {
        match self.0.strip_prefix(ancestor.0.as_slice()) {
            Some(rest) => Ok(DerivationPath(rest.to_vec())),
            None => Err(Error::InvalidPath(PATH_NOT_DESCENDANT)),
        }
    }

    /// Renders without the leading `m/`.
    pub fn to_relative_string(&self) -> String {
        self.0
            .iter()
            .map(|&i| {
                if i >= HARDENED_OFFSET {
                    format!("{}'", i - HARDENED_OFFSET)
                } else {
                    i.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DerivationPath::parse_with_mode(s, PathMode::Any)
    }
}

impl From<Vec<u32>> for DerivationPath {
    fn from(indices: Vec<u32>) -> Self {
        DerivationPath(indices)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "m");
        }
        write!(f, "m/{}", self.to_relative_string())
    }
}

/// Empty string when `path` parses under `mode`, otherwise the reason it does not.
pub fn validate_bip32_path(path: &str, mode: PathMode) -> String {
    render(DerivationPath::parse_with_mode(path, mode))
}

/// Validates a single segment such as `45'`.
pub fn validate_bip32_index(segment: &str, mode: PathMode) -> String {
    let checked = parse_index(segment).and_then(|index| match mode {
        PathMode::Hardened if index < HARDENED_OFFSET => Err(Error::InvalidPath(PATH_NOT_HARDENED)),
        PathMode::Unhardened if index >= HARDENED_OFFSET => {
            Err(Error::InvalidPath(PATH_HAS_HARDENED))
        }
        _ => Ok(index),
    });
    render(checked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let dp: DerivationPath = "m/0'/1/2'/2/1000000000".parse().unwrap();
        let seq = vec![HARDENED_OFFSET, 1, HARDENED_OFFSET + 2, 2, 1000000000];
        assert_eq!(dp.0, seq);
        assert_eq!(dp.depth(), 5);
        assert_eq!(dp.terminal_index(), 1000000000);
        assert_eq!(dp.to_string(), "m/0'/1/2'/2/1000000000");
    }

    #[test]
    fn relative_and_h_marker() {
        let relative: DerivationPath = "45h/0/7".parse().unwrap();
        let absolute: DerivationPath = "m/45'/0/7".parse().unwrap();
        assert_eq!(relative, absolute);
        assert_eq!(absolute.to_relative_string(), "45'/0/7");
    }

    #[test]
    fn prefix_is_stripped_once() {
        // a second `m/` reaches index validation
        assert_eq!(
            "m/m/0".parse::<DerivationPath>().unwrap_err(),
            Error::InvalidPath(PATH_INVALID)
        );
        // stripping is case-sensitive
        assert!("M/0".parse::<DerivationPath>().is_err());
    }

    #[test]
    fn invalid_paths() {
        assert_eq!(validate_bip32_path("", PathMode::Any), "BIP32 path cannot be blank.");
        assert_eq!(validate_bip32_path("m/", PathMode::Any), "BIP32 path is invalid.");
        assert_eq!(validate_bip32_path("m", PathMode::Any), "BIP32 path is invalid.");
        assert_eq!(validate_bip32_path("m//1", PathMode::Any), "BIP32 path is invalid.");
        assert_eq!(validate_bip32_path("m/abc", PathMode::Any), "BIP32 path is invalid.");
        assert_eq!(validate_bip32_path("m/+1", PathMode::Any), "BIP32 path is invalid.");
        assert_eq!(
            validate_bip32_path("m/2147483648", PathMode::Any),
            "BIP32 index is too high."
        );
        assert_eq!(
            validate_bip32_path("m/2147483648'", PathMode::Any),
            "BIP32 index is too high."
        );
        assert_eq!(
            validate_bip32_path("m/99999999999", PathMode::Any),
            "BIP32 index is too high."
        );
        assert_eq!(validate_bip32_path("m/2147483647'", PathMode::Any), "");
    }

    #[test]
    fn depth_limit() {
        let at_limit = vec!["0"; MAX_DEPTH].join("/");
        assert_eq!(
            DerivationPath::parse_with_mode(&at_limit, PathMode::Any)
                .unwrap()
                .depth(),
            255
        );
        let over = vec!["0"; MAX_DEPTH + 1].join("/");
        assert_eq!(validate_bip32_path(&over, PathMode::Any), "BIP32 path is too deep.");
    }

    #[test]
    fn modes() {
        assert_eq!(validate_bip32_path("m/48'/0'/0'/2'", PathMode::Hardened), "");
        assert_eq!(
            validate_bip32_path("m/48'/0'/0", PathMode::Hardened),
            "BIP32 path must be fully-hardened."
        );
        assert_eq!(validate_bip32_path("m/0/1", PathMode::Unhardened), "");
        assert_eq!(
            validate_bip32_path("m/0'/1", PathMode::Unhardened),
            "BIP32 path cannot include hardened segments."
        );
        assert_eq!(validate_bip32_index("45'", PathMode::Hardened), "");
        assert_eq!(
            validate_bip32_index("45", PathMode::Hardened),
            "BIP32 path must be fully-hardened."
        );
        assert_eq!(validate_bip32_index("", PathMode::Any), "BIP32 index cannot be blank.");
        assert_eq!(validate_bip32_index("x", PathMode::Any), "BIP32 index is invalid.");
    }

    #[test]
    fn parent_and_relative() {
        let child: DerivationPath = "m/45'/0/1".parse().unwrap();
        let parent = child.parent().unwrap();
        assert_eq!(parent.to_string(), "m/45'/0");
        let ancestor: DerivationPath = "m/45'".parse().unwrap();
        assert_eq!(child.relative_to(&ancestor).unwrap().to_relative_string(), "0/1");
        let stranger: DerivationPath = "m/44'".parse().unwrap();
        assert!(child.relative_to(&stranger).is_err());
        assert_eq!(DerivationPath::default().parent(), None);
        assert_eq!(DerivationPath::default().to_string(), "m");
    }

    #[test]
    fn hardened_index() {
        assert_eq!(hardened_bip32_index(45).unwrap(), HARDENED_OFFSET + 45);
        assert!(hardened_bip32_index(HARDENED_OFFSET).is_err());
    }
}
