//! Explicit per-command context (`§9` Design Notes): no global
//! singletons for the provider, contract or IPFS client — the command
//! layer builds one `Context` and threads it through every core call.
use alloy::primitives::Address;

use crate::chain::{ReadOnlyClient, SigningClient};
use crate::ipfs::IpfsClient;
use crate::ui::Ui;

/// Everything a core operation needs, assembled once per command.
pub struct Context {
    /// Read-only (and, once a wallet is loaded, signing) chain handle.
    pub chain: ReadOnlyClient,
    /// Signing handle, present only after `load_wallet`.
    pub signer: Option<SigningClient>,
    /// The caller's address when a keystore exists but has not been
    /// decrypted: enough to evaluate the access gate (`§4.6` steps 2
    /// and 4), which only ever reads `hasAccess`/`hasUserLicense` for
    /// an address, never signs anything. Superseded by `signer`'s
    /// address once a wallet is actually loaded.
    pub known_caller: Option<Address>,
    /// IPFS content-store client.
    pub ipfs: IpfsClient,
    /// Injectable UI capability (prompts, confirmations).
    pub ui: Box<dyn Ui>,
}

impl Context {
    /// Build a context around a read-only chain handle and IPFS
    /// client, with no wallet loaded.
    pub fn new(chain: ReadOnlyClient, ipfs: IpfsClient, ui: Box<dyn Ui>) -> Self {
        Context {
            chain,
            signer: None,
            known_caller: None,
            ipfs,
            ui,
        }
    }

    /// The caller's address: the signer's, if a wallet is loaded,
    /// otherwise the keystore's plain `address` field when one was
    /// supplied via [`Context::with_known_caller`], otherwise absent
    /// (`§4.6`'s "caller's address may be absent").
    pub fn caller(&self) -> Option<Address> {
        self.signer.as_ref().map(SigningClient::address).or(self.known_caller)
    }

    /// Attach a signing handle, enabling write operations.
    pub fn with_signer(mut self, signer: SigningClient) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Record a caller address known from an undecrypted keystore,
    /// without requiring a password. No-op if a signer is already
    /// attached.
    pub fn with_known_caller(mut self, address: Address) -> Self {
        self.known_caller = Some(address);
        self
    }

    /// The signing handle, or a `PERMISSION`-classified error naming
    /// the missing wallet.
    pub fn require_signer(&self) -> crate::Result<&SigningClient> {
        self.signer.as_ref().ok_or_else(|| {
            crate::Error::classified(
                crate::error::Kind::Auth,
                "this command requires a wallet; run `wallet create` or `wallet import` first".into(),
            )
        })
    }
}
