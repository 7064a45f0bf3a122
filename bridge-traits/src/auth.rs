//! Account Token Abstraction
//!
//! Access to the signed-in account and OAuth tokens scoped to the games
//! service management API. Token acquisition may block on the host side;
//! the bridge always calls it off the coordinator task.

use async_trait::async_trait;

use crate::error::Result;

/// OAuth token provider for the signed-in games account.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Name (usually the email) of the account currently signed in.
    ///
    /// Returns [`BridgeError::NotSignedIn`](crate::BridgeError::NotSignedIn)
    /// when no account is available.
    async fn account_name(&self) -> Result<String>;

    /// Fetch an access token for `account` with the given OAuth scope string.
    async fn access_token(&self, account: &str, scope: &str) -> Result<String>;
}
