// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use fiche_app::Customer;
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::cookie::{CookieStore, Jar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";

/// Failure taxonomy of the backend gateway. Errors are terminal for the
/// triggering call; retry is always an explicit caller decision.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("cannot reach {base_url} -- check that the backend is running ({source})")]
    Network {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("customer {did} was not found on the server")]
    NotFound { did: String },
    #[error("{message}")]
    Validation { status: u16, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Body of the create-or-update-from-sheet endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetImport {
    pub name: String,
    pub did_number: String,
    pub sheet_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportReceipt {
    #[serde(default)]
    pub message: String,
}

/// Blocking client for the customer backend. Holds a cookie jar so the
/// `csrftoken` cookie the server sets rides along on every call and gets
/// echoed back as `X-CSRFToken` on state-changing requests.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    jar: Arc<Jar>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let origin: Url = base_url
            .parse()
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(origin.scheme(), "http" | "https") {
            bail!("api.base_url must use http or https, got {:?}", origin.scheme());
        }

        let jar = Arc::new(Jar::default());
        let http = HttpClient::builder()
            .timeout(timeout)
            .cookie_provider(jar.clone())
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            jar,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full fleet snapshot. Callers render an empty list plus a retryable
    /// error state on failure.
    pub fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        let response = self
            .http
            .get(format!("{}/customers/", self.base_url))
            .send()
            .map_err(|error| self.network_error(error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, response));
        }
        response.json().map_err(|source| ApiError::Decode {
            what: "customer list",
            source,
        })
    }

    /// One record, used to refresh the selection after a write.
    pub fn get_customer(&self, did: &str) -> Result<Customer, ApiError> {
        let response = self
            .http
            .get(format!("{}/customers/{did}/", self.base_url))
            .send()
            .map_err(|error| self.network_error(error))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                did: did.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(self.status_error(status, response));
        }
        response.json().map_err(|source| ApiError::Decode {
            what: "customer record",
            source,
        })
    }

    /// Triggers the backend-side sheet re-import. 4xx bodies are surfaced
    /// verbatim so the user sees the backend's own validation text.
    pub fn upsert_from_sheet(&self, import: &SheetImport) -> Result<ImportReceipt, ApiError> {
        let endpoint = format!("{}/customers/create-or-update-from-sheet/", self.base_url);
        let request = self.http.post(&endpoint).json(import);
        let response = self
            .with_csrf_header(request, &endpoint)
            .send()
            .map_err(|error| self.network_error(error))?;

        let status = response.status();
        if status.is_client_error() {
            let message = error_message(status, &response.text().unwrap_or_default());
            return Err(ApiError::Validation {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(self.status_error(status, response));
        }
        response.json().map_err(|source| ApiError::Decode {
            what: "import receipt",
            source,
        })
    }

    /// Connectivity probe for `--check`.
    pub fn ping(&self) -> Result<usize, ApiError> {
        Ok(self.list_customers()?.len())
    }

    fn with_csrf_header(&self, request: RequestBuilder, endpoint: &str) -> RequestBuilder {
        match self.csrf_token(endpoint) {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    /// Value of the `csrftoken` cookie the backend set earlier, if any
    /// applies to the target endpoint.
    fn csrf_token(&self, endpoint: &str) -> Option<String> {
        let target: Url = endpoint.parse().ok()?;
        let header = self.jar.cookies(&target)?;
        let raw = header.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == CSRF_COOKIE).then(|| value.to_owned())
        })
    }

    fn network_error(&self, source: reqwest::Error) -> ApiError {
        ApiError::Network {
            base_url: self.base_url.clone(),
            source,
        }
    }

    fn status_error(&self, status: StatusCode, response: Response) -> ApiError {
        let message = error_message(status, &response.text().unwrap_or_default());
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }
}

/// Extracts display text from an error body: the `error` field, then
/// `detail`, then short plain text, then the bare status code.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(message) = envelope.error.filter(|message| !message.is_empty()) {
            return message;
        }
        if let Some(message) = envelope.detail.filter(|message| !message.is_empty()) {
            return message;
        }
    }
    if !body.trim().is_empty() && body.len() < 200 && !body.contains('{') {
        return body.trim().to_owned();
    }
    format!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    detail: Option<String>,
}
