//! Blocking Content Management API client.

use modelgen::ContentTypeDef;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Collection, SchemaPage, SchemaSource, StackInfo, PAGE_SIZE};
use crate::error::FetchError;

const USER_AGENT: &str = concat!("contentstack-modelgen/", env!("CARGO_PKG_VERSION"));

/// How requests are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// User session token, sent as `authtoken`.
    Authtoken(String),
    /// Stack management token, sent as `authorization`.
    ManagementToken(String),
}

/// Stack API key plus a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub auth: Auth,
}

impl Credentials {
    /// Build credentials from optional CLI/env values.
    ///
    /// A management token wins over an authtoken when both are given.
    pub fn from_parts(
        api_key: Option<String>,
        authtoken: Option<String>,
        management_token: Option<String>,
    ) -> Result<Self, FetchError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| FetchError::missing_credentials("an API key is required (--api-key)"))?;

        let auth = match (management_token, authtoken) {
            (Some(token), _) if !token.trim().is_empty() => Auth::ManagementToken(token),
            (_, Some(token)) if !token.trim().is_empty() => Auth::Authtoken(token),
            _ => {
                return Err(FetchError::missing_credentials(
                    "an authtoken (--authtoken) or management token (--management-token) is required",
                ))
            }
        };

        Ok(Self { api_key, auth })
    }
}

#[derive(Debug, Deserialize)]
struct StackResponse {
    stack: StackInfo,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default, alias = "global_fields")]
    content_types: Vec<ContentTypeDef>,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

/// Content Management API client.
#[derive(Debug, Clone)]
pub struct ContentstackClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    branch: Option<String>,
}

impl ContentstackClient {
    /// Create a client for `host` (e.g. `api.contentstack.io`).
    pub fn new(host: &str, credentials: Credentials, branch: Option<String>) -> Result<Self, FetchError> {
        let base_url = base_url(host);
        let http = Client::builder()
            .build()
            .map_err(|source| FetchError::Http {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            credentials,
            branch,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let mut request = self
            .http
            .get(url)
            .header("api_key", &self.credentials.api_key)
            .header("x-user-agent", USER_AGENT);

        request = match &self.credentials.auth {
            Auth::Authtoken(token) => request.header("authtoken", token),
            Auth::ManagementToken(token) => request.header("authorization", token),
        };

        if let Some(branch) = &self.branch {
            request = request.header("branch", branch);
        }

        request
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, ?query, "GET");

        let response = self
            .request(&url)
            .query(query)
            .send()
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(api_error(status, &body));
        }

        response.json::<T>().map_err(|e| FetchError::decode(url, e.to_string()))
    }
}

impl SchemaSource for ContentstackClient {
    fn stack(&self) -> Result<StackInfo, FetchError> {
        let response: StackResponse = self.get("stacks", &[])?;
        Ok(response.stack)
    }

    fn fetch_page(&self, collection: Collection, skip: usize) -> Result<SchemaPage, FetchError> {
        let query = [
            ("include_count", "true".to_string()),
            ("skip", skip.to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ];
        let response: PageResponse = self.get(collection.key(), &query)?;
        let count = response
            .count
            .unwrap_or(skip + response.content_types.len());

        Ok(SchemaPage {
            items: response.content_types,
            count,
        })
    }
}

/// Normalise a host into the `/v3` API base URL.
fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    let with_scheme = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    if with_scheme.ends_with("/v3") {
        with_scheme
    } else {
        format!("{with_scheme}/v3")
    }
}

fn api_error(status: StatusCode, body: &str) -> FetchError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let mut message = parsed
        .error_message
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    if let Some(errors) = parsed.errors.filter(|e| !e.is_null()) {
        message = format!("{message} {errors}");
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        FetchError::Unauthorized {
            status: status.as_u16(),
            message,
        }
    } else {
        FetchError::Api {
            status: status.as_u16(),
            code: parsed.error_code,
            message,
        }
    }
}
