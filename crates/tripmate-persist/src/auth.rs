use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct LoginData {
    access_token: String,
}

/// Login/logout against the backend, persisting the token client-side
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.tokens().token().is_some()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let builder = self
            .api
            .request(Method::POST, "/auth/login")?
            .json(&json!({ "username": username, "password": password }));

        let data: LoginData = self.api.send_json(builder).await?;
        self.api.tokens().set_token(&data.access_token)?;
        tracing::info!("Logged in as {}", username);
        Ok(())
    }

    /// Clears the local token even when the server call fails
    pub async fn logout(&self) -> Result<()> {
        let result = match self.api.request(Method::POST, "/auth/logout") {
            Ok(builder) => self.api.send_empty(builder).await,
            Err(e) => Err(e),
        };

        self.api.tokens().clear_token()?;
        if let Err(ref e) = result {
            tracing::warn!("Logout request failed, local token cleared anyway: {}", e);
        }
        result
    }
}
