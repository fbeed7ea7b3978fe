use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request forwarded verbatim to the external natural-language conversion
/// capability. The buffer text is not rewritten or normalized first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
  pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResponse {
  pub result: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
  #[error("conversion service failed: {0}")]
  Service(String),
  #[error("conversion request timed out")]
  Timeout,
}

/// The unit-conversion delegate. It owns no calculator state; the session
/// treats it as an opaque request/response collaborator whose latency and
/// failures it must tolerate.
pub trait UnitConverter {
  fn convert(
    &self,
    request: ConversionRequest,
  ) -> impl Future<Output = Result<ConversionResponse, ConvertError>> + Send;
}

/// Best-effort numeric prefix of a conversion result: the first run of
/// digits with at most one decimal point. It becomes the new buffer and last
/// answer so chained arithmetic stays possible even though the full result
/// carries a unit suffix.
pub fn numeric_prefix(text: &str) -> String {
  let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
    return "0".to_string();
  };
  let mut out = String::new();
  let mut seen_point = false;
  if start > 0 && text.as_bytes()[start - 1] == b'.' {
    out.push('.');
    seen_point = true;
  }
  for c in text[start..].chars() {
    if c.is_ascii_digit() {
      out.push(c);
    } else if c == '.' && !seen_point {
      seen_point = true;
      out.push(c);
    } else {
      break;
    }
  }
  out
}
