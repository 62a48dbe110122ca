use crate::types::{FetchConfig, NewsError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::info;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// The signed-in user, as returned by the auth backend.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
}

/// Email/password authentication against the Firebase Identity Toolkit REST
/// API. Backend failure messages are surfaced verbatim; there is no retry and
/// no lockout policy on this side.
pub struct AuthClient {
    client: Client,
    api_key: String,
}

impl AuthClient {
    pub fn new(api_key: String, config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession> {
        let session = self.credential_call("accounts:signInWithPassword", email, password).await?;
        info!("Signed in {}", session.email);
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<UserSession> {
        let session = self.credential_call("accounts:signUp", email, password).await?;
        info!("Created account for {}", session.email);
        Ok(session)
    }

    async fn credential_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSession> {
        let url = format!("{IDENTITY_TOOLKIT_URL}/{endpoint}?key={}", self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Auth(extract_error_message(&body, status)));
        }

        let payload: AuthResponse = response.json().await?;
        Ok(UserSession {
            user_id: payload.local_id,
            email: payload.email,
            id_token: payload.id_token,
        })
    }
}

/// The backend reports failures as `{"error": {"message": "..."}}`; that
/// message is what the user sees. Anything unparseable falls back to the
/// HTTP status.
fn extract_error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|| status.to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    id_token: String,
    #[serde(default)]
    email: String,
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
