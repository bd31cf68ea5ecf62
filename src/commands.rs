//! Thin command layer (`§6`): maps each CLI verb to one or two client
//! core operations, builds the [`Context`] each command needs, and
//! renders the result. No business logic lives here.
use std::path::PathBuf;

use alloy::primitives::Address;
use secrecy::SecretString;
use semver::Version;

use tacopkm_client::chain::ReadOnlyClient;
use tacopkm_client::ipfs::IpfsClient;
use tacopkm_client::ui::Interactive;
use tacopkm_client::{keystore, network, Context};
use tacopkm_core::{InstallTarget, LibraryName};

use crate::Result;

async fn ensure_network() -> Result<network::Effective> {
    let store = network::Store::load(&network::default_path()?)?;
    Ok(network::resolve(&store)?)
}

async fn open_context(effective: &network::Effective) -> Result<Context> {
    let chain = ReadOnlyClient::connect(&effective.rpc_url, effective.contract_address).await?;
    chain.get_address().await?;
    let ipfs = IpfsClient::connect(&effective.ipfs_url)?;
    Ok(Context::new(chain, ipfs, Box::new(Interactive)))
}

/// If `path` already exists, ask the user to confirm before the
/// caller is allowed to overwrite it (`§4.2`: create/import refuse to
/// clobber an existing keystore unless the caller confirms).
fn confirm_overwrite_if_exists(path: &std::path::Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let mut ui = Interactive;
    use tacopkm_client::ui::Ui;
    if ui.confirm(&format!("{} already exists, overwrite?", path.display()))? {
        Ok(true)
    } else {
        Err(tacopkm_client::Error::AlreadyExists(path.to_path_buf()))
    }
}

async fn with_wallet(ctx: Context, effective: &network::Effective, password: Option<SecretString>) -> Result<Context> {
    let path = keystore::default_path()?;
    let password = match password {
        Some(password) => password,
        None => keystore::prompt_password(None)?,
    };
    let signer = keystore::decrypt_signer(&path, &password)?;
    let signing = ctx.chain.load_wallet(&effective.rpc_url, signer).await?;
    Ok(ctx.with_signer(signing))
}

/// `wallet create [--password]`.
pub async fn wallet_create(password: Option<SecretString>) -> Result<()> {
    let path = keystore::default_path()?;
    let overwrite = confirm_overwrite_if_exists(&path)?;
    let password = match password {
        Some(password) => password,
        None => keystore::prompt_password(Some("New wallet password: "))?,
    };
    let address = keystore::create(&path, password, overwrite)?;
    println!("{address}");
    Ok(())
}

/// `wallet import <privateKey> [--password]`.
pub async fn wallet_import(private_key: String, password: Option<SecretString>) -> Result<()> {
    let path = keystore::default_path()?;
    let overwrite = confirm_overwrite_if_exists(&path)?;
    let password = match password {
        Some(password) => password,
        None => keystore::prompt_password(Some("New wallet password: "))?,
    };
    let address = keystore::import(&path, &private_key, password, overwrite)?;
    println!("{address}");
    Ok(())
}

/// `wallet address`.
pub async fn wallet_address() -> Result<()> {
    let path = keystore::default_path()?;
    let address = keystore::address_without_decrypt(&path)?;
    println!("{address}");
    Ok(())
}

/// `wallet balance`.
pub async fn wallet_balance() -> Result<()> {
    let effective = ensure_network().await?;
    let path = keystore::default_path()?;
    let address = keystore::address_without_decrypt(&path)?;
    let ctx = open_context(&effective).await?;
    let balance = ctx.chain.balance_of(address).await?;
    println!("{balance}");
    Ok(())
}

/// `config add <name> --rpc --contract [--set-active]`.
pub async fn config_add(name: String, rpc: url::Url, contract: Address, set_active: bool) -> Result<()> {
    let path = network::default_path()?;
    let mut store = network::Store::load(&path)?;
    store.add(name, rpc, contract, set_active)?;
    store.save(&path)?;
    Ok(())
}

/// `config set-active <name>`.
pub async fn config_set_active(name: String) -> Result<()> {
    let path = network::default_path()?;
    let mut store = network::Store::load(&path)?;
    store.set_active(&name)?;
    store.save(&path)?;
    Ok(())
}

/// `config list`.
pub async fn config_list() -> Result<()> {
    let store = network::Store::load(&network::default_path()?)?;
    for name in store.list() {
        println!("{name}");
    }
    Ok(())
}

/// `config show [name]`.
pub async fn config_show(name: Option<String>) -> Result<()> {
    let store = network::Store::load(&network::default_path()?)?;
    match store.show(name.as_deref()) {
        Some((name, profile)) => println!("{name}: {} @ {}", profile.rpc_url, profile.contract_address),
        None => println!("no active network profile configured"),
    }
    Ok(())
}

/// `config remove <name>`.
pub async fn config_remove(name: String) -> Result<()> {
    let path = network::default_path()?;
    let mut store = network::Store::load(&path)?;
    let cleared_active = store.remove(&name)?;
    store.save(&path)?;
    if cleared_active {
        println!("warning: '{name}' was the active network; no network is active now");
    }
    Ok(())
}

/// `init`.
pub async fn init(name: LibraryName) -> Result<()> {
    let path = tacopkm_client::publisher::write_template(&std::env::current_dir()?, &name)?;
    println!("wrote {}", path.display());
    Ok(())
}

/// `register <name> [--description] [--tags] [--language] [--private]`.
pub async fn register(
    name: LibraryName,
    description: String,
    tags: Vec<String>,
    language: String,
    is_private: bool,
) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let ctx = with_wallet(ctx, &effective, None).await?;
    tacopkm_client::registry_ops::register(&ctx, &name, &description, tags, &language, is_private).await?;
    Ok(())
}

/// `list`.
pub async fn list() -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    for name in ctx.chain.get_all_library_names().await? {
        println!("{name}");
    }
    Ok(())
}

/// `info <name>[@version] [--versions]`.
pub async fn info(name: LibraryName, version: Option<Version>, show_versions: bool) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let ctx = match keystore::address_without_decrypt(&keystore::default_path()?) {
        Ok(address) => ctx.with_known_caller(address),
        Err(_) => ctx,
    };
    let info = tacopkm_client::info::gather(&ctx, &name, version.as_ref(), show_versions).await?;

    println!("{}: owner {}", info.name, info.record.owner);
    println!("  private: {}", info.record.is_private);
    println!("  license required: {} (fee {} wei)", info.record.license_required, info.record.license_fee);
    println!("  access: {:?}", info.access);
    if let Some((version, record)) = info.version {
        println!("  {version}: ipfs {} deprecated {}", record.ipfs_hash, record.deprecated);
        for (dep_name, dep_constraint) in record.dependencies {
            println!("    depends on {dep_name} {dep_constraint}");
        }
    }
    if let Some(versions) = info.versions {
        for version in versions {
            println!("  - {version}");
        }
    }
    Ok(())
}

/// `publish <directory> [--version]`.
pub async fn publish(directory: PathBuf, version_override: Option<String>) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    ctx.ipfs.probe().await?;
    let ctx = with_wallet(ctx, &effective, None).await?;
    let config = tacopkm_client::publisher::read_config(&directory, version_override.as_deref())?;
    tacopkm_client::publisher::publish(&ctx, &directory, config).await?;
    Ok(())
}

/// `install <name>[@version]`. No password is requested: the access
/// gate only needs the caller's address, which is readable from an
/// existing keystore without decrypting it. Installing with no
/// keystore at all is still valid; the gate then treats the caller as
/// absent.
pub async fn install(target: InstallTarget) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    ctx.ipfs.probe().await?;
    let ctx = match keystore::address_without_decrypt(&keystore::default_path()?) {
        Ok(address) => ctx.with_known_caller(address),
        Err(_) => ctx,
    };
    let install_root = tacopkm_client::resolver::default_install_root();
    let resolved = tacopkm_client::resolver::install(&ctx, target, install_root).await?;
    for (name, version) in resolved.entries() {
        println!("installed {name}@{version}");
    }
    Ok(())
}

/// `deprecate <name>@<version>`.
pub async fn deprecate(name: LibraryName, version: Version) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let ctx = with_wallet(ctx, &effective, None).await?;
    tacopkm_client::registry_ops::deprecate(&ctx, &name, &version).await?;
    Ok(())
}

/// `authorize <name> <userAddress>`.
pub async fn authorize(name: LibraryName, user: Address) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let ctx = with_wallet(ctx, &effective, None).await?;
    tacopkm_client::registry_ops::authorize(&ctx, &name, user).await?;
    Ok(())
}

/// `revoke <name> <userAddress>`.
pub async fn revoke(name: LibraryName, user: Address) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let ctx = with_wallet(ctx, &effective, None).await?;
    tacopkm_client::registry_ops::revoke(&ctx, &name, user).await?;
    Ok(())
}

/// `set-license <name> --fee --required`.
pub async fn set_license(name: LibraryName, fee: String, required: bool) -> Result<()> {
    let fee_wei = tacopkm_core::parse_fee(&fee).map_err(tacopkm_client::Error::from)?;
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let ctx = with_wallet(ctx, &effective, None).await?;
    tacopkm_client::license::set_license(&ctx, &name, fee_wei, required).await?;
    Ok(())
}

/// `purchase-license <name> [--amount]`.
pub async fn purchase_license(name: LibraryName, amount: Option<String>) -> Result<()> {
    let amount_wei = amount
        .map(|a| tacopkm_core::parse_fee(&a).map_err(tacopkm_client::Error::from))
        .transpose()?;
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let ctx = with_wallet(ctx, &effective, None).await?;
    tacopkm_client::license::purchase_license(&ctx, &name, amount_wei).await?;
    Ok(())
}

/// `delete <name>`.
pub async fn delete(name: LibraryName) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let mut ctx = with_wallet(ctx, &effective, None).await?;
    tacopkm_client::registry_ops::delete(&mut ctx, &name).await?;
    Ok(())
}

/// `abandon-registry --burn-address <address>`.
pub async fn abandon_registry(burn_address: Address) -> Result<()> {
    let effective = ensure_network().await?;
    let ctx = open_context(&effective).await?;
    let mut ctx = with_wallet(ctx, &effective, None).await?;
    tacopkm_client::registry_ops::abandon_registry(&mut ctx, burn_address).await?;
    Ok(())
}
