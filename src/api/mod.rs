//! Remote services: the user listing and the two validation endpoints.
//!
//! Calls are single-shot: no retry, no backoff, no client timeout. Errors are
//! handed back to the caller, which decides how to report them.
pub mod wire;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::error::{Context, Result, simple_error};
use crate::model::{EmailCheck, PhoneCheck, UserPage};

pub const DEFAULT_USERS_BASE_URL: &str = "https://dummyjson.com";
pub const DEFAULT_EMAIL_VALIDATION_URL: &str = "https://emailvalidation.abstractapi.com/v1/";
pub const DEFAULT_PHONE_VALIDATION_URL: &str = "https://phonevalidation.abstractapi.com/v1/";

/// Operations the forms and the list screen need from the outside world.
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn fetch_users(&self, limit: usize, skip: usize) -> Result<UserPage>;
    async fn validate_email(&self, email: &str) -> Result<EmailCheck>;
    async fn validate_phone(&self, phone: &str) -> Result<PhoneCheck>;
}

/// Base URLs and keys for [`HttpUserApi`].
#[derive(Clone, Debug)]
pub struct ApiEndpoints {
    pub users_base_url: String,
    pub email_validation_url: String,
    pub phone_validation_url: String,
    pub email_api_key: Option<String>,
    pub phone_api_key: Option<String>,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            users_base_url: DEFAULT_USERS_BASE_URL.to_string(),
            email_validation_url: DEFAULT_EMAIL_VALIDATION_URL.to_string(),
            phone_validation_url: DEFAULT_PHONE_VALIDATION_URL.to_string(),
            email_api_key: None,
            phone_api_key: None,
        }
    }
}

#[derive(Clone)]
pub struct HttpUserApi {
    client: reqwest::Client,
    endpoints: ApiEndpoints,
}

impl HttpUserApi {
    pub fn new(endpoints: ApiEndpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.endpoints.users_base_url.trim_end_matches('/'))
    }

    async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_ctx(|| format!("request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "remote call rejected");
            return Err(simple_error(format!("{url} answered with status {status}")));
        }
        let text = response
            .text()
            .await
            .with_ctx(|| format!("reading body from {url}"))?;
        trace!(url, body = %text, "response");
        serde_json::from_str::<T>(&text).with_ctx(|| format!("unexpected payload from {url}"))
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn fetch_users(&self, limit: usize, skip: usize) -> Result<UserPage> {
        let url = self.users_url();
        let resp: wire::UsersResponse = self
            .get_json(&url, &[("limit", limit.to_string()), ("skip", skip.to_string())])
            .await?;
        Ok(resp.into())
    }

    async fn validate_email(&self, email: &str) -> Result<EmailCheck> {
        let key = self.endpoints.email_api_key.clone().unwrap_or_default();
        let resp: wire::EmailValidationResponse = self
            .get_json(
                &self.endpoints.email_validation_url,
                &[("api_key", key), ("email", email.to_string())],
            )
            .await?;
        Ok(resp.into())
    }

    async fn validate_phone(&self, phone: &str) -> Result<PhoneCheck> {
        let key = self.endpoints.phone_api_key.clone().unwrap_or_default();
        let resp: wire::PhoneValidationResponse = self
            .get_json(
                &self.endpoints.phone_validation_url,
                &[("api_key", key), ("phone", phone.to_string())],
            )
            .await?;
        Ok(resp.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_url_tolerates_trailing_slash() {
        let api = HttpUserApi::new(ApiEndpoints {
            users_base_url: "http://localhost:9/".into(),
            ..ApiEndpoints::default()
        });
        assert_eq!(api.users_url(), "http://localhost:9/users");
    }
}
