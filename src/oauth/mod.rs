/// OAuth authorization-code flow for the mailbox connection. Produces the
/// token bundle a MailboxSession is built from; there is no refresh path,
/// a rejected credential means the user reconnects from scratch.
use anyhow::{anyhow, Result};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::config::Config;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &[&str] = &["https://www.googleapis.com/auth/gmail.readonly"];

#[derive(Debug, Clone)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}

pub struct OAuthManager {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    // state -> (owner, pkce verifier), pending until the callback arrives
    pending: RwLock<HashMap<String, (String, PkceCodeVerifier)>>,
}

impl OAuthManager {
    pub fn new(config: &Config) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.oauth_redirect_url.clone(),
            pending: RwLock::new(HashMap::new()),
        }
    }

    fn client(&self) -> Result<BasicClient> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(anyhow!(
                "GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET are not configured"
            ));
        }
        Ok(BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.clone())),
            AuthUrl::new(AUTH_URL.to_string())?,
            Some(TokenUrl::new(TOKEN_URL.to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(self.redirect_url.clone())?))
    }

    /// Build the authorization URL for an owner and remember the CSRF state
    /// plus PKCE verifier until the callback comes back.
    pub async fn authorization_url(&self, owner: &str) -> Result<String> {
        let client = self.client()?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);
        for scope in SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (auth_url, csrf_state) = request.url();

        self.pending.write().await.insert(
            csrf_state.secret().clone(),
            (owner.to_string(), pkce_verifier),
        );

        Ok(auth_url.to_string())
    }

    /// Validate the callback state and exchange the code for tokens.
    /// Returns the owner the flow was started for.
    pub async fn exchange_callback(&self, code: &str, state: &str) -> Result<(String, OAuthTokens)> {
        let (owner, pkce_verifier) = self
            .pending
            .write()
            .await
            .remove(state)
            .ok_or_else(|| anyhow!("invalid or expired oauth state"))?;

        let client = self.client()?;
        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .map_err(|e| anyhow!("token exchange failed: {e}"))?;

        let tokens = OAuthTokens {
            access_token: token.access_token().secret().clone(),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            expires_at: token
                .expires_in()
                .map(|d| chrono::Utc::now().timestamp() + d.as_secs() as i64),
        };

        Ok((owner, tokens))
    }
}
