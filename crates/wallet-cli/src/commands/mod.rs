//! CLI command implementations.

mod account;
mod analytics;
mod auth;
mod references;
mod snapshots;
mod transactions;

pub use account::{account_email, account_password};
pub use analytics::{analytics_balances, analytics_budget, analytics_income, analytics_summary};
pub use auth::{login, logout, register, status, whoami};
pub use references::references;
pub use snapshots::snapshots_list;
pub use transactions::{transactions_add, transactions_delete, transactions_list, TransactionArgs};

use crate::hooks::{StderrNotifier, TerminalRedirect};
use crate::output::OutputFormat;
use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;
use wallet_api::WalletApi;
use wallet_auth::{ApiClient, SessionStore};
use wallet_core::{Config, Paths};

/// Everything a command needs: the client, its session store, the typed
/// API, and the output format.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub store: SessionStore,
    pub api: WalletApi,
    pub redirect: Arc<TerminalRedirect>,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(paths: Paths, config: Config, format: OutputFormat) -> Result<Self> {
        paths.ensure_dirs()?;
        let vault = wallet_storage::open_vault(paths.credentials_file());
        let client = ApiClient::from_config(&config, vault)?;

        let redirect = Arc::new(TerminalRedirect::new());
        client.register_sink(Arc::new(StderrNotifier::new(format)));
        client.set_login_redirect(redirect.clone());

        debug!(api_url = %client.base_url(), "Client ready");

        Ok(Self {
            paths,
            config,
            store: SessionStore::new(client.clone()),
            api: WalletApi::new(client),
            redirect,
            format,
        })
    }

    pub fn client(&self) -> &ApiClient {
        self.store.client()
    }

    /// Fail early when there is nothing to authenticate with.
    pub fn require_session(&self) -> Result<()> {
        if !self.store.has_session() {
            anyhow::bail!("Not logged in. Run `wallet login` first.");
        }
        Ok(())
    }
}

/// Read a non-empty line from stdin after printing `label`.
fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let line = line.trim().to_string();

    if line.is_empty() {
        anyhow::bail!("{} is required", label.trim_end_matches(": "));
    }
    Ok(line)
}

/// Read a non-empty password without echo.
fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(label)?;
    if password.is_empty() {
        anyhow::bail!("{} is required", label.trim_end_matches(": "));
    }
    Ok(password)
}
