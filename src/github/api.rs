//! Host REST API access.
//!
//! `ApiTransport` is the seam tests mock; `HttpTransport` is the reqwest
//! implementation used by the server.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{PageLocation, RepoContext};

const PUBLIC_HOST: &str = "github.com";
const PUBLIC_API_HOST: &str = "api.github.com";

#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// GET `url` and return the JSON body. Non-2xx answers become
    /// `AppError::Api`, transport failures `AppError::Network`.
    async fn get_json(&self, url: &str, token: Option<&str>) -> Result<Value>;
}

/// Base URL of the API serving a page: the public API host for the public
/// site, `/api/v3` on the same host for self-hosted instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base: String,
}

impl ApiEndpoint {
    pub fn for_page(page: &PageLocation) -> Self {
        let base = if page.host == PUBLIC_HOST {
            format!("{}://{}", page.scheme, PUBLIC_API_HOST)
        } else {
            format!("{}://{}/api/v3", page.scheme, page.host)
        };
        Self { base }
    }

    /// `{base}/repos/{owner}/{name}{path}`
    pub fn repo_url(&self, repo: &RepoContext, path: &str) -> String {
        format!("{}/repos/{}/{}{}", self.base, repo.owner, repo.name, path)
    }
}

pub async fn get<T: DeserializeOwned>(
    transport: &dyn ApiTransport,
    url: &str,
    token: Option<&str>,
) -> Result<T> {
    let value = transport.get_json(url, token).await?;
    serde_json::from_value(value)
        .map_err(|e| AppError::Decode(format!("unexpected response from {}: {}", url, e)))
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get_json(&self, url: &str, token: Option<&str>) -> Result<Value> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, concat!("octotree/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/vnd.github+json")
            .header(CACHE_CONTROL, "no-cache");

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| AppError::Decode(format!("failed to parse {}: {}", url, e)));
        }

        let rate_limited = status == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.trim() == "0");

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        tracing::debug!("GET {} -> {} ({})", url, status, message);

        Err(AppError::Api {
            status: status.as_u16(),
            message,
            rate_limited,
        })
    }
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Canned responses keyed by exact URL; records every request.
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<HashMap<String, std::result::Result<Value, u16>>>,
        requests: Mutex<Vec<(String, Option<String>)>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, url: &str, body: Value) {
            self.responses.lock().unwrap().insert(url.to_string(), Ok(body));
        }

        pub fn fail(&self, url: &str, status: u16) {
            self.responses.lock().unwrap().insert(url.to_string(), Err(status));
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
        }

        pub fn tokens(&self) -> Vec<Option<String>> {
            self.requests.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }

        pub fn count_matching(&self, needle: &str) -> usize {
            self.requests().iter().filter(|u| u.contains(needle)).count()
        }
    }

    #[async_trait]
    impl ApiTransport for MockTransport {
        async fn get_json(&self, url: &str, token: Option<&str>) -> Result<Value> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), token.map(String::from)));
            match self.responses.lock().unwrap().get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(AppError::Api {
                    status: *status,
                    message: "mock failure".to_string(),
                    rate_limited: false,
                }),
                None => Err(AppError::Api {
                    status: 404,
                    message: format!("no mock for {}", url),
                    rate_limited: false,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_host_uses_api_host() {
        let page = PageLocation::parse("https://github.com/ovity/octotree").unwrap();
        let endpoint = ApiEndpoint::for_page(&page);
        let repo = RepoContext::new("ovity", "octotree");
        assert_eq!(
            endpoint.repo_url(&repo, ""),
            "https://api.github.com/repos/ovity/octotree"
        );
    }

    #[test]
    fn test_self_hosted_uses_api_sub_path() {
        let page = PageLocation::parse("http://git.corp:8080/team/app/tree/main").unwrap();
        let endpoint = ApiEndpoint::for_page(&page);
        let repo = RepoContext::new("team", "app");
        assert_eq!(
            endpoint.repo_url(&repo, "/git/trees/abc"),
            "http://git.corp:8080/api/v3/repos/team/app/git/trees/abc"
        );
    }
}
