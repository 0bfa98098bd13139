//! Credential provider
//!
//! Produces a usable access token once at process start. The installed-app
//! consent flow, the redirect listener, token refresh and the token file are
//! all handled by `yup-oauth2`; this module only decides which of its calls
//! to make and in what order.

use std::path::PathBuf;

use snafu::{OptionExt, ResultExt, ensure};
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::error::{
    AuthenticatorSnafu, ClientSecretsMissingSnafu, EmptyTokenSnafu, InvalidClientSecretsSnafu,
    OAuthSnafu, Result,
};

/// Full read/write access to the user's Drive.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Where the credential lifecycle currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    /// Nothing obtained yet in this run.
    Absent,
    Valid(String),
    Expired,
    /// An expired token about to be renewed through its refresh token.
    Refreshing,
}

impl CredentialState {
    /// Classify a token handed back by the authenticator.
    pub fn observe(token: Option<&str>, expired: bool) -> Result<Self> {
        let token = token.context(EmptyTokenSnafu)?;
        if expired {
            Ok(CredentialState::Expired)
        } else {
            Ok(CredentialState::Valid(token.to_string()))
        }
    }

    /// Transition taken without talking to the network.
    pub fn advance(self) -> Self {
        match self {
            CredentialState::Expired => CredentialState::Refreshing,
            other => other,
        }
    }
}

/// Loads, refreshes or interactively obtains the Drive access token.
pub struct CredentialProvider {
    secrets_path: PathBuf,
    token_path: PathBuf,
}

impl CredentialProvider {
    pub fn new(secrets_path: PathBuf, token_path: PathBuf) -> Self {
        Self {
            secrets_path,
            token_path,
        }
    }

    /// Drive the credential state machine until a valid token is available.
    ///
    /// A missing or unusable token file starts the consent flow: the
    /// authorization URL is printed and the redirect is received on a local
    /// port. Every token obtained is written back to the token file.
    pub async fn access_token(&self) -> Result<String> {
        ensure!(
            self.secrets_path.exists(),
            ClientSecretsMissingSnafu {
                path: self.secrets_path.clone()
            }
        );
        let secret = yup_oauth2::read_application_secret(&self.secrets_path)
            .await
            .context(InvalidClientSecretsSnafu {
                path: self.secrets_path.clone(),
            })?;

        let auth =
            InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                .persist_tokens_to_disk(self.token_path.clone())
                .build()
                .await
                .context(AuthenticatorSnafu)?;
        let scopes = [DRIVE_SCOPE];

        let mut state = CredentialState::Absent;
        loop {
            state = match state.advance() {
                CredentialState::Valid(token) => return Ok(token),
                CredentialState::Absent => {
                    let token = auth.token(&scopes).await.context(OAuthSnafu)?;
                    CredentialState::observe(token.token(), token.is_expired())?
                }
                CredentialState::Refreshing => {
                    log::info!("access token expired, refreshing");
                    let token = auth
                        .force_refreshed_token(&scopes)
                        .await
                        .context(OAuthSnafu)?;
                    // A refreshed token is used as is; asking again could loop.
                    let access = token.token().context(EmptyTokenSnafu)?;
                    CredentialState::Valid(access.to_string())
                }
                // advance() never yields Expired
                CredentialState::Expired => CredentialState::Refreshing,
            };
        }
    }
}
