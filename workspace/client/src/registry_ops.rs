//! Registry-mutating operations that are not part of publish/resolve:
//! register, deprecate, authorize/revoke, delete, and abandon-registry
//! (`§6` CLI surface). Two-step confirmations live here, against the
//! injectable [`crate::ui::Ui`] rather than stdin directly.
use alloy::primitives::Address;
use semver::Version;

use tacopkm_core::LibraryName;

use crate::context::Context;
use crate::error::Kind;
use crate::ui::Ui;
use crate::{Error, Result};

/// `register <name>`.
pub async fn register(
    ctx: &Context,
    name: &LibraryName,
    description: &str,
    tags: Vec<String>,
    language: &str,
    is_private: bool,
) -> Result<()> {
    let signer = ctx.require_signer()?;
    signer.register_library(name, description, tags, language, is_private).await
}

/// `deprecate <name>@<version>`. Caller must own the library.
pub async fn deprecate(ctx: &Context, name: &LibraryName, version: &Version) -> Result<()> {
    let signer = ctx.require_signer()?;
    let info = ctx.chain.get_library_info(name).await?;
    if info.owner != signer.address() {
        return Err(Error::classified(
            Kind::Permission,
            format!("'{name}' is owned by {}, not the loaded wallet", info.owner),
        ));
    }
    signer.deprecate_version(name, version).await
}

/// `authorize <name> <userAddress>`. Owner-only ACL grant on a private
/// library; the contract itself rejects authorizing the owner.
pub async fn authorize(ctx: &Context, name: &LibraryName, user: Address) -> Result<()> {
    let signer = ctx.require_signer()?;
    signer.authorize_user(name, user).await
}

/// `revoke <name> <userAddress>`.
pub async fn revoke(ctx: &Context, name: &LibraryName, user: Address) -> Result<()> {
    let signer = ctx.require_signer()?;
    signer.revoke_authorization(name, user).await
}

/// `delete <name>`. Two-step confirmation: a yes/no, then the caller
/// must type the library name back exactly. The contract is the
/// authority on "no published versions"; the client-side version
/// count check is UX only (`§9` open question).
pub async fn delete(ctx: &mut Context, name: &LibraryName) -> Result<()> {
    let signer = ctx.require_signer()?;
    let info = ctx.chain.get_library_info(name).await?;
    if info.owner != signer.address() {
        return Err(Error::classified(
            Kind::Permission,
            format!("'{name}' is owned by {}, not the loaded wallet", info.owner),
        ));
    }

    let versions = ctx.chain.get_version_numbers(name).await?;
    if !versions.is_empty() {
        ctx.ui
            .warn(&format!("'{name}' has {} published version(s); the contract will refuse to delete it", versions.len()));
    }

    confirm_delete(ctx.ui.as_mut(), name)?;

    let signer = ctx.require_signer()?;
    signer.delete_library(name).await
}

/// The two-step `delete` confirmation, split out of [`delete`] so it
/// can be exercised against a [`crate::ui::Scripted`] UI without a
/// chain or wallet.
fn confirm_delete(ui: &mut dyn Ui, name: &LibraryName) -> Result<()> {
    if !ui.confirm(&format!("delete '{name}' permanently?"))? {
        return Err(Error::ConfirmationFailed);
    }
    if !ui.confirm_phrase(&format!("type '{name}' to confirm: "), name.as_str())? {
        return Err(Error::ConfirmationFailed);
    }
    Ok(())
}

/// `abandon-registry --burn-address <address>`. Transfers ownership of
/// the registry contract itself; a two-step confirmation (an
/// understanding prompt, then a typed phrase) guards it.
pub async fn abandon_registry(ctx: &mut Context, new_owner: Address) -> Result<()> {
    let signer = ctx.require_signer()?;
    let owner = ctx.chain.registry_owner().await?;
    if owner != signer.address() {
        return Err(Error::classified(
            Kind::Permission,
            "only the registry owner may transfer ownership".into(),
        ));
    }

    confirm_abandon(ctx.ui.as_mut())?;

    let signer = ctx.require_signer()?;
    signer.transfer_ownership(new_owner).await
}

const ABANDON_PHRASE: &str = "I understand this is irreversible";

/// The two-step `abandon-registry` confirmation, split out of
/// [`abandon_registry`] so it can be exercised against a
/// [`crate::ui::Scripted`] UI without a chain or wallet.
fn confirm_abandon(ui: &mut dyn Ui) -> Result<()> {
    if !ui.confirm("this permanently transfers control of the entire registry contract. continue?")? {
        return Err(Error::ConfirmationFailed);
    }
    if !ui.confirm_phrase(&format!("type '{ABANDON_PHRASE}' to confirm: "), ABANDON_PHRASE)? {
        return Err(Error::ConfirmationFailed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Scripted;

    fn name(s: &str) -> LibraryName {
        s.parse().unwrap()
    }

    #[test]
    fn confirm_delete_succeeds_when_both_steps_are_accepted() {
        let mut ui = Scripted::with_confirms([true, true]);
        assert!(confirm_delete(&mut ui, &name("left-pad")).is_ok());
        assert_eq!(2, ui.asked.len());
    }

    #[test]
    fn confirm_delete_fails_when_the_first_yes_no_is_declined() {
        let mut ui = Scripted::with_confirms([false]);
        let err = confirm_delete(&mut ui, &name("left-pad")).unwrap_err();
        assert!(matches!(err, Error::ConfirmationFailed));
        // The typed-phrase step is never reached once the yes/no is declined.
        assert_eq!(1, ui.asked.len());
    }

    #[test]
    fn confirm_delete_fails_when_the_typed_name_is_rejected() {
        // Scripted's confirm_phrase answers true/false like any other
        // confirm; a `false` here stands in for "typed the wrong name".
        let mut ui = Scripted::with_confirms([true, false]);
        let err = confirm_delete(&mut ui, &name("left-pad")).unwrap_err();
        assert!(matches!(err, Error::ConfirmationFailed));
        assert_eq!(2, ui.asked.len());
    }

    #[test]
    fn confirm_abandon_succeeds_when_both_steps_are_accepted() {
        let mut ui = Scripted::with_confirms([true, true]);
        assert!(confirm_abandon(&mut ui).is_ok());
        assert_eq!(2, ui.asked.len());
    }

    #[test]
    fn confirm_abandon_fails_when_the_understanding_prompt_is_declined() {
        let mut ui = Scripted::with_confirms([false]);
        let err = confirm_abandon(&mut ui).unwrap_err();
        assert!(matches!(err, Error::ConfirmationFailed));
        assert_eq!(1, ui.asked.len());
    }

    #[test]
    fn confirm_abandon_fails_when_the_typed_phrase_is_rejected() {
        let mut ui = Scripted::with_confirms([true, false]);
        let err = confirm_abandon(&mut ui).unwrap_err();
        assert!(matches!(err, Error::ConfirmationFailed));
        assert_eq!(2, ui.asked.len());
    }
}
