//! Gateway configuration.
//!
//! Values are merged from, in ascending priority: built-in defaults, `gateway.toml` (or the file
//! named by `GATEWAY_CONFIG`), `GATEWAY_*` environment variables, and command line arguments.

use ens_gateway_core::{NameError, ResponseSigner, SignerError, Zone, signing::load_signer};
use figment::{
    Figment, Provider,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    fmt,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    time::Duration,
};

/// Default port the gateway listens on.
pub const GATEWAY_PORT: u16 = 8080;
/// Default root domain, the parent name the front-end rents subnames under.
pub const DEFAULT_ROOT_DOMAIN: &str = "divi.eth";
/// Default journal file.
pub const DEFAULT_STORE_PATH: &str = "gateway-records.jsonl";
/// Default validity window of signed responses, in seconds.
pub const DEFAULT_SIGNATURE_TTL: u64 = 300;

/// Default maximum length in bytes of a text record key.
pub const DEFAULT_MAX_TEXT_KEY_LENGTH: usize = 256;

/// Config keys holding secrets, with the environment variable each is read from.
///
/// These are read verbatim: figment parses other environment values, which would turn a numeric
/// password such as `0123` into the integer `123`.
const SECRET_ENV_KEYS: [(&str, &str); 2] =
    [("private_key", "PRIVATE_KEY"), ("keystore_password", "KEYSTORE_PASSWORD")];

/// A string that is never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

/// Accepts numbers as well, since config files and environment values may hold an all-digit
/// password or key.
impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Val {
            String(String),
            Unsigned(u64),
            Signed(i64),
            Float(f64),
        }

        Ok(Self(match Val::deserialize(deserializer)? {
            Val::String(s) => s,
            Val::Unsigned(n) => n.to_string(),
            Val::Signed(n) => n.to_string(),
            Val::Float(n) => n.to_string(),
        }))
    }
}

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Limits applied to the text records of a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextLimits {
    pub max_records: usize,
    pub max_key_len: usize,
    pub max_value_len: usize,
}

/// Gateway configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// The address the server binds to.
    pub host: IpAddr,
    /// The port the server binds to, `0` picks a free one.
    pub port: u16,
    /// Root domain; names are served as `label.parent.<root_domain>`.
    pub root_domain: String,
    /// Path of the record journal.
    pub store_path: PathBuf,
    /// Keep records in memory only.
    pub ephemeral: bool,
    /// Hex encoded signing key.
    #[serde(skip_serializing)]
    pub private_key: Option<Secret>,
    /// Encrypted JSON keystore holding the signing key.
    pub keystore: Option<PathBuf>,
    /// Password of `keystore`.
    #[serde(skip_serializing)]
    pub keystore_password: Option<Secret>,
    /// Seconds a signed response stays valid.
    pub signature_ttl: u64,
    /// Maximum number of text records per registration.
    pub max_text_records: usize,
    /// Maximum length in bytes of a text record key.
    pub max_text_key_length: usize,
    /// Maximum length in bytes of a single text record value.
    pub max_text_length: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: GATEWAY_PORT,
            root_domain: DEFAULT_ROOT_DOMAIN.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            ephemeral: false,
            private_key: None,
            keystore: None,
            keystore_password: None,
            signature_ttl: DEFAULT_SIGNATURE_TTL,
            max_text_records: 32,
            max_text_key_length: DEFAULT_MAX_TEXT_KEY_LENGTH,
            max_text_length: 1024,
        }
    }
}

impl GatewayConfig {
    /// The default config file name.
    pub const FILE_NAME: &'static str = "gateway.toml";

    /// Prefix of the environment variables read by [`figment`](Self::figment).
    pub const ENV_PREFIX: &'static str = "GATEWAY_";

    /// Returns the default figment: defaults, then the config file, then the environment.
    pub fn figment() -> Figment {
        Self::figment_with_file(Env::var_or("GATEWAY_CONFIG", Self::FILE_NAME))
    }

    /// Same as [`figment`](Self::figment) but reads the given config file.
    pub fn figment_with_file(path: impl AsRef<Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG"]));
        for (key, var) in SECRET_ENV_KEYS {
            if let Some(value) = Env::var(&format!("{}{var}", Self::ENV_PREFIX)) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        figment
    }

    /// Loads the config from the default figment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_provider(Self::figment())
    }

    /// Extracts a config from the given provider.
    pub fn from_provider<T: Provider>(provider: T) -> Result<Self, figment::Error> {
        Figment::from(provider).extract()
    }

    /// Config for tests: in-memory storage, a free port, and a throwaway key.
    pub fn test() -> Self {
        Self {
            port: 0,
            ephemeral: true,
            root_domain: "divicompany.eth".to_string(),
            // anvil's first dev account
            private_key: Some(Secret::new(
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            )),
            ..Default::default()
        }
    }

    /// Sets the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the root domain.
    #[must_use]
    pub fn with_root_domain(mut self, root_domain: impl Into<String>) -> Self {
        self.root_domain = root_domain.into();
        self
    }

    /// Persists records to `path` instead of keeping them in memory.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self.ephemeral = false;
        self
    }

    /// Sets the hex encoded signing key.
    #[must_use]
    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(Secret::new(key));
        self
    }

    /// Sets the validity window of signed responses.
    #[must_use]
    pub fn with_signature_ttl(mut self, ttl: Duration) -> Self {
        self.signature_ttl = ttl.as_secs();
        self
    }

    /// Returns the configured zone.
    pub fn zone(&self) -> Result<Zone, NameError> {
        Zone::new(&self.root_domain)
    }

    /// Loads the signing key.
    pub fn signer(&self) -> Result<ResponseSigner, SignerError> {
        let key = load_signer(
            self.private_key.as_ref().map(Secret::expose),
            self.keystore.as_deref(),
            self.keystore_password.as_ref().map(Secret::expose),
        )?;
        Ok(ResponseSigner::new(key, Duration::from_secs(self.signature_ttl)))
    }

    pub fn text_limits(&self) -> TextLimits {
        TextLimits {
            max_records: self.max_text_records,
            max_key_len: self.max_text_key_length,
            max_value_len: self.max_text_length,
        }
    }
}
