//! Command line interface of the `ens-gateway` binary.

use crate::config::GatewayConfig;
use clap::{CommandFactory, Parser, Subcommand};
use ens_gateway_core::namehash;
use eyre::Result;
use figment::{
    Metadata, Profile, Provider,
    error::Kind::InvalidType,
    value::{Dict, Map, Value},
};
use serde::Serialize;
use std::{net::IpAddr, path::PathBuf};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "ens_gateway=info,ens_gateway_core=info,tower_http=info";

/// Free ENS subnames, served offchain over CCIP-Read.
#[derive(Debug, Parser)]
#[command(name = "ens-gateway", version, next_display_order = None)]
pub struct GatewayArgs {
    #[command(subcommand)]
    pub cmd: GatewaySubcommand,
}

#[derive(Debug, Subcommand)]
pub enum GatewaySubcommand {
    /// Run the gateway server.
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Print the namehash of an ENS name.
    #[command(visible_aliases = ["nh", "node"])]
    Namehash {
        /// The name, e.g. `alice.test.divi.eth`.
        name: String,
    },

    /// Generate shell completions script.
    #[command(visible_alias = "com")]
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments of `ens-gateway serve`.
///
/// Flags override the config file and the `GATEWAY_*` environment. The signing key is only read
/// from the config file or the environment, never from the command line.
#[derive(Clone, Debug, Default, Serialize, Parser)]
#[command(next_help_heading = "Server options")]
pub struct ServeArgs {
    /// Config file to read instead of `gateway.toml`.
    #[arg(long, short, value_name = "PATH")]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// The address to bind to.
    #[arg(long, value_name = "IP")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<IpAddr>,

    /// The port to listen on.
    #[arg(long, short, value_name = "NUM")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// The root domain subnames are served under.
    #[arg(long, value_name = "NAME")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_domain: Option<String>,

    /// Path of the record journal.
    #[arg(long, value_name = "PATH", conflicts_with = "ephemeral")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Keep records in memory only, they are lost on exit.
    #[arg(long)]
    #[serde(skip)]
    pub ephemeral: bool,

    /// Encrypted JSON keystore holding the signing key.
    ///
    /// The password is read from `GATEWAY_KEYSTORE_PASSWORD`.
    #[arg(long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keystore: Option<PathBuf>,

    /// Seconds a signed response stays valid.
    #[arg(long, value_name = "SECONDS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_ttl: Option<u64>,
}

impl ServeArgs {
    /// Merges these arguments over the config file and environment.
    pub fn load_config(&self) -> Result<GatewayConfig, figment::Error> {
        let figment = match &self.config {
            Some(path) => GatewayConfig::figment_with_file(path),
            None => GatewayConfig::figment(),
        };
        GatewayConfig::from_provider(figment.merge(self))
    }

    /// Runs the gateway until ctrl-c is received.
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let handle = crate::try_spawn(config).await?;
        tokio::signal::ctrl_c().await?;
        info!(target: "gateway", "received shutdown signal, shutting down");
        handle.shutdown().await
    }
}

impl Provider for ServeArgs {
    fn metadata(&self) -> Metadata {
        Metadata::named("Serve Args Provider")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let value = Value::serialize(self)?;
        let error = InvalidType(value.to_actual(), "map".into());
        let mut dict = value.into_dict().ok_or(error)?;

        // The two flags conflict, so either one decides the storage mode.
        if self.ephemeral {
            dict.insert("ephemeral".to_string(), true.into());
        } else if self.store_path.is_some() {
            dict.insert("ephemeral".to_string(), false.into());
        }

        Ok(Map::from([(Profile::Default, dict)]))
    }
}

/// Run the `ens-gateway` command line interface.
pub fn run() -> Result<()> {
    setup()?;
    run_command(GatewayArgs::parse())
}

/// Installs the error report handler and the log subscriber.
pub fn setup() -> Result<()> {
    color_eyre::install()?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| eyre::eyre!(err))?;
    Ok(())
}

/// Run the subcommand.
pub fn run_command(args: GatewayArgs) -> Result<()> {
    match args.cmd {
        GatewaySubcommand::Serve(serve) => {
            tokio::runtime::Builder::new_multi_thread().enable_all().build()?.block_on(serve.run())
        }
        GatewaySubcommand::Namehash { name } => {
            println!("{}", namehash(&name));
            Ok(())
        }
        GatewaySubcommand::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut GatewayArgs::command(),
                "ens-gateway",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
