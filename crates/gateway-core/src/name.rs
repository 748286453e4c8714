//! Subname parsing and ENS namehashing.
//!
//! Every name served by the gateway has the shape `label.parent.root`, where `root` is the
//! configured [`Zone`] and `parent` is one of the fixed [`ParentSubdomain`]s.

use alloy_primitives::{B256, keccak256};
use std::{fmt, str::FromStr, sync::Arc};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

pub use alloy_ens::namehash;

/// Errors returned when a name does not belong to the gateway's namespace.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,
    #[error(
        "invalid label `{0}`: use only lowercase letters, numbers, and hyphens (not at start/end)"
    )]
    InvalidLabel(String),
    #[error("name `{0}` has no label below a parent subdomain")]
    MissingLabel(String),
    #[error("unknown parent subdomain `{parent}`, expected one of: {expected}")]
    UnknownParent { parent: String, expected: String },
    #[error("name `{name}` is not a subname of `{root}`")]
    OutsideZone { name: String, root: String },
    #[error("invalid root domain `{0}`")]
    InvalidRoot(String),
    #[error("malformed DNS-encoded name")]
    MalformedDns,
}

/// The parent subdomains under which free subnames can be registered.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ParentSubdomain {
    Test,
    Test2,
}

impl ParentSubdomain {
    /// Comma separated list of every accepted parent, for error messages.
    pub fn expected() -> String {
        Self::iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
    }
}

/// The root domain the gateway serves, e.g. `divi.eth`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Zone {
    root: Arc<str>,
}

impl Zone {
    /// Creates a zone rooted at `root`.
    ///
    /// Every dot separated part of the root must itself be a valid label.
    pub fn new(root: impl AsRef<str>) -> Result<Self, NameError> {
        let root = root.as_ref();
        if root.is_empty() || !root.split('.').all(is_valid_label) {
            return Err(NameError::InvalidRoot(root.to_string()));
        }
        Ok(Self { root: root.into() })
    }

    /// Returns the root domain.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the namehash of the root domain.
    pub fn node(&self) -> B256 {
        namehash(&self.root)
    }

    /// Builds the name `label.parent.root`.
    pub fn name(&self, label: &str, parent: ParentSubdomain) -> Result<Name, NameError> {
        if !is_valid_label(label) {
            return Err(NameError::InvalidLabel(label.to_string()));
        }
        Ok(Name { label: label.to_string(), parent, root: self.root.clone() })
    }

    /// Parses a fully qualified name such as `alice.test.divi.eth`.
    pub fn parse(&self, name: &str) -> Result<Name, NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        let rest = name
            .strip_suffix(&*self.root)
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(|| NameError::OutsideZone {
                name: name.to_string(),
                root: self.root.to_string(),
            })?;
        let Some((label, parent)) = rest.split_once('.') else {
            return Err(NameError::MissingLabel(name.to_string()));
        };
        let parent = ParentSubdomain::from_str(parent).map_err(|_| NameError::UnknownParent {
            parent: parent.to_string(),
            expected: ParentSubdomain::expected(),
        })?;
        self.name(label, parent)
    }

    /// Decodes a DNS wire-format name, as carried by `resolve(bytes,bytes)`, and parses it.
    pub fn decode_dns(&self, wire: &[u8]) -> Result<Name, NameError> {
        self.parse(&decode_dns_name(wire)?)
    }
}

/// A validated `label.parent.root` name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
    label: String,
    parent: ParentSubdomain,
    root: Arc<str>,
}

impl Name {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> ParentSubdomain {
        self.parent
    }

    /// Returns the namehash of this name.
    pub fn node(&self) -> B256 {
        compute_node(self)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.label, self.parent, self.root)
    }
}

/// Computes the ENS namehash of a validated name.
pub fn compute_node(name: &Name) -> B256 {
    namehash(&name.to_string())
}

/// Returns the keccak256 hash of a single label.
pub fn labelhash(label: &str) -> B256 {
    keccak256(label.as_bytes())
}

/// Returns `true` if `label` matches `^[a-z0-9]([a-z0-9-]*[a-z0-9])?$`.
pub fn is_valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    first != &b'-'
        && last != &b'-'
        && bytes.iter().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// Decodes a DNS wire-format name into its dotted form.
///
/// The encoding is a sequence of length-prefixed labels terminated by a zero byte.
pub fn decode_dns_name(wire: &[u8]) -> Result<String, NameError> {
    let mut labels = Vec::new();
    let mut pos = 0;
    loop {
        let len = *wire.get(pos).ok_or(NameError::MalformedDns)? as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        let raw = wire.get(pos..pos + len).ok_or(NameError::MalformedDns)?;
        let label = std::str::from_utf8(raw).map_err(|_| NameError::MalformedDns)?;
        if label.contains('.') {
            return Err(NameError::MalformedDns);
        }
        labels.push(label);
        pos += len;
    }
    if pos != wire.len() {
        return Err(NameError::MalformedDns);
    }
    Ok(labels.join("."))
}

/// Encodes a dotted name into DNS wire format.
pub fn encode_dns_name(name: &str) -> Result<Vec<u8>, NameError> {
    let mut wire = Vec::with_capacity(name.len() + 2);
    if !name.is_empty() {
        for label in name.split('.') {
            let len = u8::try_from(label.len()).map_err(|_| NameError::MalformedDns)?;
            if len == 0 {
                return Err(NameError::MalformedDns);
            }
            wire.push(len);
            wire.extend_from_slice(label.as_bytes());
        }
    }
    wire.push(0);
    Ok(wire)
}
