//! Operator extractor.
//!
//! Authentication happens upstream. The proxy forwards the login name and
//! role as headers, and this extractor turns them into an
//! [`OperatorContext`].

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use logbook_core::{OperatorContext, Role};

use crate::error::ApiError;

pub const OPERATOR_HEADER: &str = "x-operator";
pub const ROLE_HEADER: &str = "x-operator-role";

/// The authenticated caller of a handler.
#[derive(Debug, Clone)]
pub struct Operator(pub OperatorContext);

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, ApiError> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or(ApiError::Unauthenticated(name))
}

/// Read the operator context from request headers.
///
/// A role name outside the closed set is a deployment fault, not a client
/// error, and surfaces as a configuration error.
pub fn operator_from_headers(headers: &HeaderMap) -> Result<OperatorContext, ApiError> {
  let operator = header(headers, OPERATOR_HEADER)?;
  let role = Role::from_name(header(headers, ROLE_HEADER)?)?;
  Ok(OperatorContext::new(operator, role))
}

impl<S> FromRequestParts<S> for Operator
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    operator_from_headers(&parts.headers).map(Operator)
  }
}
