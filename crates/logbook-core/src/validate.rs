//! Field validation shared by the checkpoint and the ledger.

use std::collections::BTreeSet;

use crate::{Error, Result};

/// Trim `value`, rejecting it if nothing is left.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation(format!("{field} must not be blank")));
  }
  Ok(trimmed.to_owned())
}

/// Trim an optional value; blank collapses to `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
  value
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_owned)
}

/// Lookup keys (ID, AWB and ULD numbers) are stored trimmed and upper-cased.
/// Blank collapses to `None`.
pub(crate) fn normalized_key(value: Option<&str>) -> Option<String> {
  optional(value).map(|v| v.to_uppercase())
}

/// Normalise a batch of ULD numbers into a set. Blank entries are rejected
/// rather than dropped, since they usually mean a mis-keyed form.
pub(crate) fn uld_numbers<'a>(
  ulds: impl IntoIterator<Item = &'a String>,
) -> Result<BTreeSet<String>> {
  ulds
    .into_iter()
    .map(|u| required("ULD number", u).map(|u| u.to_uppercase()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn required_trims() {
    assert_eq!(required("name", "  Jane Doe ").unwrap(), "Jane Doe");
    assert!(matches!(required("name", "   "), Err(Error::Validation(_))));
  }

  #[test]
  fn optional_collapses_blank() {
    assert_eq!(optional(Some("  ")), None);
    assert_eq!(optional(Some(" Acme ")).as_deref(), Some("Acme"));
    assert_eq!(optional(None), None);
  }

  #[test]
  fn normalized_key_uppercases_beyond_ascii() {
    assert_eq!(normalized_key(Some(" ä12 ")).as_deref(), Some("Ä12"));
    assert_eq!(normalized_key(Some("straße")).as_deref(), Some("STRASSE"));
    assert_eq!(normalized_key(Some("  ")), None);
  }

  #[test]
  fn uld_numbers_dedupe_and_uppercase() {
    let raw = vec!["ake12345kq".to_string(), "AKE12345KQ".to_string()];
    let set = uld_numbers(&raw).unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.contains("AKE12345KQ"));

    let bad = vec!["PMC001".to_string(), " ".to_string()];
    assert!(uld_numbers(&bad).is_err());
  }
}
