pub mod models;

use async_trait::async_trait;
use reqwest::StatusCode;

pub use models::{Lead, LeadId, NewLead, TokenResponse};

const LEADS_PATH: &str = "/api/leads";
const TOKEN_PATH: &str = "/api/token";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("server responded with {0}")]
    Status(StatusCode),

    #[error("could not decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// The two calls the lead views make. Every call carries the bearer token
/// explicitly; implementations must pass it through unchanged.
#[async_trait]
pub trait LeadApi {
    async fn list_leads(&self, token: &str) -> Result<Vec<Lead>, ApiError>;

    async fn create_lead(&self, token: &str, lead: &NewLead) -> Result<(), ApiError>;
}

/// `reqwest`-backed client for the leads REST API.
///
/// One attempt per call: no retries and no request timeout.
#[derive(Debug, Clone)]
pub struct HttpLeadApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLeadApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for a bearer token via the OAuth2 password form.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let token: TokenResponse = check_status(response)?
            .json()
            .await
            .map_err(ApiError::Decode)?;
        Ok(token.access_token)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status))
    }
}

#[async_trait]
impl LeadApi for HttpLeadApi {
    async fn list_leads(&self, token: &str) -> Result<Vec<Lead>, ApiError> {
        let response = self
            .http
            .get(self.url(LEADS_PATH))
            .bearer_auth(token)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        check_status(response)?
            .json::<Vec<Lead>>()
            .await
            .map_err(ApiError::Decode)
    }

    async fn create_lead(&self, token: &str, lead: &NewLead) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url(LEADS_PATH))
            .bearer_auth(token)
            .json(lead)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        // Body of the created lead is not consumed
        check_status(response)?;
        Ok(())
    }
}
