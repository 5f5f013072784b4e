//! Listing page and pagination cursor.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::post::present_or_null;

/// Opaque token naming the next listing page.
///
/// The empty cursor means "from the beginning".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    /// Cursor for the first page.
    pub fn start() -> Self {
        Self::default()
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// True for the first-page cursor, which is also what an exhausted listing returns.
    pub fn is_start(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Option<String>> for Cursor {
    fn from(token: Option<String>) -> Self {
        Self(token.unwrap_or_default())
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_start() {
            f.write_str("<start>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// One parsed listing page.
///
/// Items are kept as raw JSON; [`crate::services::extractor`] decides what
/// they mean.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub children: Vec<Value>,
    pub after: Cursor,
}

#[derive(Deserialize)]
struct Envelope {
    data: EnvelopeData,
}

#[derive(Deserialize)]
struct EnvelopeData {
    children: Vec<Value>,
    #[serde(deserialize_with = "present_or_null")]
    after: Option<String>,
}

impl PageResult {
    /// Parse a listing response body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let envelope: Envelope = serde_json::from_slice(body)
            .map_err(|e| AppError::malformed(format!("listing envelope: {e}")))?;
        Ok(Self {
            children: envelope.data.children,
            after: Cursor::from(envelope.data.after),
        })
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
