use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use semver::Version;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use tacopkm::Result;
use tacopkm_core::{InstallTarget, LibraryName};

/// Client for a decentralized package manager backed by an EVM
/// registry contract and an IPFS artifact store.
#[derive(Parser, Debug)]
#[clap(name = "tpkm", author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Wallet {
    /// Create a new keystore, confirming before overwriting one.
    Create {
        #[clap(long)]
        password: Option<String>,
    },
    /// Import an existing private key into a keystore.
    Import {
        private_key: String,
        #[clap(long)]
        password: Option<String>,
    },
    /// Print the wallet's address without decrypting it.
    Address,
    /// Print the wallet's native balance on the active network.
    Balance,
}

#[derive(Subcommand, Debug)]
enum Config {
    /// Add or update a named network profile.
    Add {
        name: String,
        #[clap(long)]
        rpc: Url,
        #[clap(long)]
        contract: Address,
        #[clap(long)]
        set_active: bool,
    },
    /// Select the active network profile.
    SetActive { name: String },
    /// List every profile name.
    List,
    /// Show a profile, or the active one if omitted.
    Show { name: Option<String> },
    /// Remove a profile.
    Remove { name: String },
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wallet / keystore operations.
    #[clap(subcommand)]
    Wallet(Wallet),
    /// Network profile operations.
    #[clap(subcommand)]
    Config(Config),
    /// Create a starter `lib.config.json` in the current directory.
    Init {
        name: LibraryName,
    },
    /// Register a new library.
    Register {
        name: LibraryName,
        #[clap(long, default_value = "")]
        description: String,
        #[clap(long)]
        tags: Vec<String>,
        #[clap(long, default_value = "")]
        language: String,
        #[clap(long)]
        private: bool,
    },
    /// List every registered library name.
    List,
    /// Show library (and optionally version) metadata.
    Info {
        target: String,
        #[clap(long)]
        versions: bool,
    },
    /// Run the publish pipeline against a directory.
    Publish {
        #[clap(parse(from_os_str))]
        directory: PathBuf,
        #[clap(long)]
        version: Option<String>,
    },
    /// Resolve and install a library's dependency tree.
    Install { target: String },
    /// Mark a published version deprecated.
    Deprecate { target: String },
    /// Grant a private library's authorization to an address.
    Authorize { name: LibraryName, user: Address },
    /// Revoke a private library's authorization from an address.
    Revoke { name: LibraryName, user: Address },
    /// Set a library's license terms.
    SetLicense {
        name: LibraryName,
        #[clap(long, default_value = "none")]
        fee: String,
        #[clap(long)]
        required: bool,
    },
    /// Purchase a license for a library.
    PurchaseLicense {
        name: LibraryName,
        #[clap(long)]
        amount: Option<String>,
    },
    /// Permanently delete a library. Two-step confirmation.
    Delete { name: LibraryName },
    /// Transfer ownership of the registry contract. Two-step confirmation.
    AbandonRegistry {
        #[clap(long)]
        burn_address: Address,
    },
}

fn parse_install_target(raw: &str) -> Result<InstallTarget> {
    let (name, version) = match raw.split_once('@') {
        Some((name, version)) => (name, Some(Version::parse(version).map_err(|e| {
            tacopkm_client::Error::classified(
                tacopkm_client::Kind::Validation,
                format!("invalid version '{version}': {e}"),
            )
        })?)),
        None => (raw, None),
    };
    let name: LibraryName = name.parse().map_err(tacopkm_client::Error::from)?;
    Ok(InstallTarget { name, version })
}

/// Parse a `<name>@<version>` compound argument, requiring the version
/// component (unlike `install`/`info`, `deprecate` has no "latest"
/// meaning for an omitted version).
fn parse_versioned_target(raw: &str) -> Result<(LibraryName, Version)> {
    let (name, version) = raw.split_once('@').ok_or_else(|| {
        tacopkm_client::Error::classified(
            tacopkm_client::Kind::Validation,
            format!("expected '<name>@<version>', got '{raw}'"),
        )
    })?;
    let name: LibraryName = name.parse().map_err(tacopkm_client::Error::from)?;
    let version = Version::parse(version).map_err(|e| {
        tacopkm_client::Error::classified(
            tacopkm_client::Kind::Validation,
            format!("invalid version '{version}': {e}"),
        )
    })?;
    Ok((name, version))
}

async fn run() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Command::Wallet(Wallet::Create { password }) => {
            tacopkm::commands::wallet_create(password.map(SecretString::new)).await?;
        }
        Command::Wallet(Wallet::Import { private_key, password }) => {
            tacopkm::commands::wallet_import(private_key, password.map(SecretString::new)).await?;
        }
        Command::Wallet(Wallet::Address) => {
            tacopkm::commands::wallet_address().await?;
        }
        Command::Wallet(Wallet::Balance) => {
            tacopkm::commands::wallet_balance().await?;
        }
        Command::Config(Config::Add { name, rpc, contract, set_active }) => {
            tacopkm::commands::config_add(name, rpc, contract, set_active).await?;
        }
        Command::Config(Config::SetActive { name }) => {
            tacopkm::commands::config_set_active(name).await?;
        }
        Command::Config(Config::List) => {
            tacopkm::commands::config_list().await?;
        }
        Command::Config(Config::Show { name }) => {
            tacopkm::commands::config_show(name).await?;
        }
        Command::Config(Config::Remove { name }) => {
            tacopkm::commands::config_remove(name).await?;
        }
        Command::Init { name } => {
            tacopkm::commands::init(name).await?;
        }
        Command::Register { name, description, tags, language, private } => {
            tacopkm::commands::register(name, description, tags, language, private).await?;
        }
        Command::List => {
            tacopkm::commands::list().await?;
        }
        Command::Info { target, versions } => {
            let (name, version) = match target.split_once('@') {
                Some((name, version)) => (
                    name.parse().map_err(tacopkm_client::Error::from)?,
                    Some(Version::parse(version).map_err(|e| {
                        tacopkm_client::Error::classified(
                            tacopkm_client::Kind::Validation,
                            format!("invalid version '{version}': {e}"),
                        )
                    })?),
                ),
                None => (target.parse().map_err(tacopkm_client::Error::from)?, None),
            };
            tacopkm::commands::info(name, version, versions).await?;
        }
        Command::Publish { directory, version } => {
            tacopkm::commands::publish(directory, version).await?;
        }
        Command::Install { target } => {
            let target = parse_install_target(&target)?;
            tacopkm::commands::install(target).await?;
        }
        Command::Deprecate { target } => {
            let (name, version) = parse_versioned_target(&target)?;
            tacopkm::commands::deprecate(name, version).await?;
        }
        Command::Authorize { name, user } => {
            tacopkm::commands::authorize(name, user).await?;
        }
        Command::Revoke { name, user } => {
            tacopkm::commands::revoke(name, user).await?;
        }
        Command::SetLicense { name, fee, required } => {
            tacopkm::commands::set_license(name, fee, required).await?;
        }
        Command::PurchaseLicense { name, amount } => {
            tacopkm::commands::purchase_license(name, amount).await?;
        }
        Command::Delete { name } => {
            tacopkm::commands::delete(name).await?;
        }
        Command::AbandonRegistry { burn_address } => {
            tacopkm::commands::abandon_registry(burn_address).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        if std::env::var_os(tacopkm_core::DEBUG_ENV).is_some() {
            tracing::error!("{e:?}");
        } else {
            tracing::error!("{e}");
            if let Some(hint) = e.kind().hint() {
                tracing::error!("hint: {hint}");
            }
        }
        std::process::exit(1);
    }
}
