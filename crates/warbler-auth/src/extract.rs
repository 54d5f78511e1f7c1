//! Credential extraction from request headers
//!
//! Both the session bearer token and the webhook API key arrive in the
//! `Authorization` header as `<scheme> <credential>`. The scheme word is
//! required to be present but is otherwise not validated; the second
//! whitespace-delimited field is returned verbatim.

use http::header::AUTHORIZATION;
use http::HeaderMap;
use thiserror::Error;

/// Why extraction failed; internal diagnostics only
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// No `Authorization` header on the request
    #[error("no authorization header")]
    MissingHeader,
    /// Header present but not `<scheme> <credential>`
    #[error("malformed authorization header")]
    MalformedHeader,
}

/// Pull the bearer token out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ExtractError> {
    second_field(headers)
}

/// Pull the webhook API key out of the `Authorization` header
///
/// Same wire shape as the bearer token; the two differ only in what the
/// caller compares the result against.
pub fn api_key(headers: &HeaderMap) -> Result<String, ExtractError> {
    second_field(headers)
}

fn second_field(headers: &HeaderMap) -> Result<String, ExtractError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(ExtractError::MissingHeader)?;
    let value = value.to_str().map_err(|_| ExtractError::MalformedHeader)?;

    let mut fields = value.split_whitespace();
    fields.next().ok_or(ExtractError::MalformedHeader)?;
    fields
        .next()
        .map(str::to_owned)
        .ok_or(ExtractError::MalformedHeader)
}
