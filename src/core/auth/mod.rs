// ─── Account capability ───
// Authentication itself lives outside the launcher core; the pipeline only
// needs the selected account and a way to refresh its token.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountProfile {
    pub uuid: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub profile: AccountProfile,
    pub access_token: String,
}

impl Account {
    pub fn offline(username: &str) -> Self {
        Self {
            profile: AccountProfile {
                uuid: "00000000-0000-0000-0000-000000000000".into(),
                username: username.trim().to_string(),
            },
            access_token: "offline_access_token".into(),
        }
    }
}

#[async_trait]
pub trait AccountProvider: Send + Sync {
    fn current_account_id(&self) -> Option<String>;
    fn current_account(&self) -> Option<Account>;
    async fn refresh_token(&self, account_id: &str) -> LauncherResult<()>;
}

/// Credentials resolved for one launch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAccount {
    pub uuid: String,
    pub username: String,
    pub access_token: String,
}

impl From<Account> for LaunchAccount {
    fn from(account: Account) -> Self {
        Self {
            uuid: account.profile.uuid,
            username: account.profile.username,
            access_token: account.access_token,
        }
    }
}

/// Resolve the selected account and try to refresh its token.
///
/// A missing account aborts the launch. A failed refresh keeps the stale
/// token: the game may still accept it and the user can relaunch otherwise.
pub async fn setup_account(provider: &dyn AccountProvider) -> LauncherResult<LaunchAccount> {
    let mut account = provider
        .current_account()
        .ok_or(LauncherError::Unauthenticated)?;

    match provider.current_account_id() {
        Some(account_id) => match provider.refresh_token(&account_id).await {
            Ok(()) => {
                if let Some(refreshed) = provider.current_account() {
                    account = refreshed;
                }
                info!("Refreshed account token of {}", account.profile.username);
            }
            Err(err) => warn!("Could not refresh account token: {}", err),
        },
        None => warn!("Selected account has no identifier, skipping token refresh"),
    }

    info!(
        "Setting up user {} (UUID: {})",
        account.profile.username, account.profile.uuid
    );
    Ok(account.into())
}

/// Provider holding a single fixed account. Used for offline play and by
/// embedders that handle authentication elsewhere.
pub struct StaticAccountProvider {
    id: String,
    account: Mutex<Option<Account>>,
}

impl StaticAccountProvider {
    pub fn new(id: &str, account: Option<Account>) -> Self {
        Self {
            id: id.to_string(),
            account: Mutex::new(account),
        }
    }

    pub fn offline(username: &str) -> Self {
        Self::new("offline", Some(Account::offline(username)))
    }
}

#[async_trait]
impl AccountProvider for StaticAccountProvider {
    fn current_account_id(&self) -> Option<String> {
        self.current_account().map(|_| self.id.clone())
    }

    fn current_account(&self) -> Option<Account> {
        self.account
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    async fn refresh_token(&self, _account_id: &str) -> LauncherResult<()> {
        Ok(())
    }
}
