use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::dto::ErrorBody;
use petfinder_application::{
    error::{AppError, AppResult},
    infrastructure_config::Config,
};

/// Connection details for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub base_url: Url,
    pub anon_key: SecretString,
    pub avatar_bucket: String,
    pub profiles_table: String,
    pub site_url: Url,
    pub request_timeout: Option<Duration>,
}

impl SupabaseSettings {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self {
            base_url: config.supabase.base_url()?,
            anon_key: config.supabase.anon_key.clone(),
            avatar_bucket: config.supabase.avatar_bucket.clone(),
            profiles_table: config.supabase.profiles_table.clone(),
            site_url: config.site.site_url()?,
            request_timeout: config.supabase.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Thin wrapper over `reqwest` that knows Supabase's headers and error
/// bodies.
pub struct SupabaseHttp {
    client: Client,
    base_url: Url,
    anon_key: SecretString,
}

impl SupabaseHttp {
    pub fn new(settings: &SupabaseSettings) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| AppError::ConfigError {
            message: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            anon_key: settings.anon_key.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the project URL, percent-encoding each one.
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::InvalidUrl {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds a request carrying the project key. `bearer` defaults to the
    /// anon key when no user token is available.
    pub fn request(&self, method: Method, url: Url, bearer: Option<&SecretString>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(token.expose_secret())
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let body = self.send_text(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn send_empty(&self, request: RequestBuilder) -> AppResult<()> {
        self.send_text(request).await.map(|_| ())
    }

    async fn send_text(&self, request: RequestBuilder) -> AppResult<String> {
        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Supabase response");

        if status.is_success() {
            return response.text().await.map_err(network_error);
        }
        Err(error_from_response(status, response).await)
    }
}

fn network_error(error: reqwest::Error) -> AppError {
    AppError::Network {
        message: error.to_string(),
    }
}

async fn error_from_response(status: StatusCode, response: Response) -> AppError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    AppError::RemoteService {
        status: Some(status.as_u16()),
        message,
    }
}
