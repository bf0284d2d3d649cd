//! Blocking HTTP plumbing shared by the remote catalog clients.
//!
//! Calls block until the endpoint answers; no timeout is enforced at this
//! layer and nothing is retried. Non-2xx statuses always surface as errors
//! carrying the numeric status code.

pub mod ensembl;
pub mod uniprot;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::{IrisError, Result};

const USER_AGENT: &str = concat!("iris/", env!("CARGO_PKG_VERSION"));

/// Build the blocking client used by all catalog lookups.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(Into::into)
}

/// Fail on any non-2xx status, citing the numeric code.
pub(crate) fn check_status(status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(IrisError::Status(status.as_u16()))
    }
}

/// Response body from [`rest_query`].
#[derive(Debug, Clone)]
pub enum RestResponse {
    Json(Value),
    Text(String),
}

/// Issue a GET against `server` + `query`, requesting `content_type`.
/// JSON bodies are decoded when `application/json` is requested; everything
/// else comes back as raw text.
pub fn rest_query(
    client: &Client,
    server: &str,
    query: &str,
    content_type: &str,
) -> Result<RestResponse> {
    let response = client
        .get(format!("{server}{query}"))
        .header("Content-Type", content_type)
        .send()?;
    check_status(response.status())?;

    if content_type == "application/json" {
        Ok(RestResponse::Json(response.json()?))
    } else {
        Ok(RestResponse::Text(response.text()?))
    }
}
