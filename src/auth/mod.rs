//! This module provides access credentials for the Classroom API
//!
//! A credential is persisted in a [`CredentialStore`] between runs. It is reused as long as it is valid,
//! refreshed when it has expired, and obtained from scratch through an [`AuthorizationFlow`] otherwise.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::{AuthorizationFlow, CredentialStore};

pub mod installed_flow;
pub mod token_store;

pub use installed_flow::InstalledAppFlow;
pub use token_store::{MemoryTokenStore, TokenFile};

/// How long before its actual expiry a token is considered expired
pub fn refresh_threshold() -> Duration {
    Duration::seconds(3 * 60 + 45)
}

/// The OAuth client a credential has been issued to. This is needed to refresh it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
}

/// An access token, and what is needed to renew it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// When the access token stops being accepted. `None` means "never"
    #[serde(default)]
    expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    scopes: Vec<String>,
    #[serde(flatten)]
    client: OAuthClient,
}

impl Credential {
    pub fn new(access_token: String, refresh_token: Option<String>, expiry: Option<DateTime<Utc>>,
               scopes: Vec<String>, client: OAuthClient) -> Self
    {
        Self { access_token, refresh_token, expiry, scopes, client }
    }

    pub fn access_token(&self) -> &str              { &self.access_token }
    pub fn refresh_token(&self) -> Option<&str>     { self.refresh_token.as_deref() }
    pub fn expiry(&self) -> Option<&DateTime<Utc>>  { self.expiry.as_ref() }
    pub fn scopes(&self) -> &[String]               { &self.scopes }
    pub fn client(&self) -> &OAuthClient            { &self.client }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            None => false,
            Some(expiry) => now >= expiry - refresh_threshold(),
        }
    }

    /// Whether this credential can be used as is
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_empty() == false && self.is_expired(now) == false
    }

    /// Returns a copy with a renewed access token.
    /// The refresh token is kept in case the identity provider did not issue a new one
    pub fn refreshed(&self, access_token: String, expiry: Option<DateTime<Utc>>, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            expiry,
            refresh_token: refresh_token.or_else(|| self.refresh_token.clone()),
            scopes: self.scopes.clone(),
            client: self.client.clone(),
        }
    }
}


/// Returns a usable credential, persisting it in `store` whenever it had to be renewed
pub async fn ensure_credential<S, F>(store: &S, flow: &F, now: DateTime<Utc>) -> Result<Credential>
where
    S: CredentialStore + ?Sized,
    F: AuthorizationFlow + Sync + ?Sized,
{
    let stored = store.load()?;
    if let Some(credential) = &stored {
        if credential.is_valid(now) {
            log::debug!("Reusing the stored credential");
            return Ok(credential.clone());
        }
    }

    let fresh = match stored {
        Some(credential) if credential.is_expired(now) && credential.refresh_token().is_some() => {
            log::info!("The stored credential has expired, refreshing it");
            flow.refresh(&credential).await?
        },
        _ => {
            log::info!("No usable credential, starting an interactive authorization");
            flow.authorize().await?
        },
    };

    store.save(&fresh)?;
    Ok(fresh)
}
