//! The HTTP client: attaches credentials to outgoing requests, watches every
//! response for an expired credential, and drives the refresh coordinator
//! before replaying a rejected request exactly once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::endpoints::{EndpointClass, EndpointPolicy};
use crate::errors::Error;
use crate::refresh::RefreshCoordinator;
use crate::session::SessionSignal;

const USER_AGENT: &str = "storefront-client/0.1.0";

/// Replayable request descriptor. The `retried` flag is carried explicitly so
/// a request is never resubmitted more than once per credential expiry,
/// however the episode resolves.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A completed response: successful status plus the raw body.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_str(&self.body)?)
    }

    fn into_body(self) -> String {
        self.body
    }
}

/// Client handle shared by all request-issuing code in the application.
/// Cloning is cheap; every clone shares the credential store, the session
/// signal, and the refresh coordinator.
#[derive(Clone)]
pub struct StorefrontClient {
    http: Client,
    base_url: reqwest::Url,
    store: Arc<CredentialStore>,
    session: Arc<SessionSignal>,
    refresher: Arc<RefreshCoordinator>,
    policy: EndpointPolicy,
}

impl StorefrontClient {
    pub fn new(config: Config) -> Result<Self, Error> {
        let base_url = config.parsed_base_url()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let store = Arc::new(match config.credentials_path {
            Some(path) => CredentialStore::open(path)?,
            None => CredentialStore::in_memory(),
        });
        let session = Arc::new(SessionSignal::new(Arc::clone(&store)));
        let refresher = Arc::new(RefreshCoordinator::new(
            http.clone(),
            &base_url,
            Arc::clone(&store),
            Arc::clone(&session),
        )?);
        Ok(Self {
            http,
            base_url,
            store,
            session,
            refresher,
            policy: EndpointPolicy,
        })
    }

    pub fn credentials(&self) -> Arc<CredentialStore> {
        Arc::clone(&self.store)
    }

    /// The session signal; subscribe via `invalidated()` to learn when the
    /// application must force re-authentication.
    pub fn session(&self) -> Arc<SessionSignal> {
        Arc::clone(&self.session)
    }

    /// Send a request through the full pipeline: classify, attach, dispatch,
    /// and on a first expired-credential rejection of a protected endpoint,
    /// refresh and replay once.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, Error> {
        let class = self.policy.classify(&request.path);
        let token = match class {
            EndpointClass::Protected => self.store.access().await,
            EndpointClass::Public => None,
        };

        let response = self.dispatch(&request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED
            || class == EndpointClass::Public
            || request.retried
        {
            return Self::finish(response, &request.path);
        }

        request.retried = true;
        debug!(path = %request.path, "credential rejected; entering refresh episode");
        let fresh = self.refresher.obtain_fresh_token().await?;
        let response = self.dispatch(&request, Some(&fresh)).await?;
        Self::finish(response, &request.path)
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid request path '{}': {e}", request.path)))?;
        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok(ApiResponse { status, body })
    }

    fn finish(response: ApiResponse, path: &str) -> Result<ApiResponse, Error> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(Error::Unauthorized {
                path: path.to_string(),
            })
        } else {
            Err(Error::Api {
                status,
                body: response.into_body(),
            })
        }
    }
}
