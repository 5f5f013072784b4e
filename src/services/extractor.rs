//! Post extraction from a listing page.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{NormalizedPost, PageResult, RawPost};

/// Map every text-bearing item of `page` to a [`NormalizedPost`].
///
/// Items without body text are skipped. An item missing any expected field
/// fails the whole page.
pub fn extract_posts(page: &PageResult) -> Result<Vec<NormalizedPost>> {
    let mut posts = Vec::with_capacity(page.len());
    for (i, child) in page.children.iter().enumerate() {
        let raw = parse_item(i, child)?;
        if raw.is_text_post() {
            posts.push(NormalizedPost::from(raw));
        }
    }
    Ok(posts)
}

fn parse_item(index: usize, child: &Value) -> Result<RawPost> {
    let data = child
        .get("data")
        .ok_or_else(|| AppError::malformed(format!("item {index} has no data object")))?;
    RawPost::deserialize(data).map_err(|e| AppError::malformed(format!("item {index}: {e}")))
}
