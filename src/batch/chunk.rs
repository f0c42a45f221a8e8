//! Chunker.

use crate::{Error, ErrorContext, Result};

/// Split `items` into contiguous groups of `size`, the last one holding the remainder.
///
/// Order is preserved within and across groups. An empty input yields no groups.
pub fn chunk<T>(items: Vec<T>, size: usize) -> Result<Vec<Vec<T>>> {
    if size == 0 {
        return Err(Error::configuration_with_context(
            "batch size must be a positive integer",
            ErrorContext::new()
                .with_field_path("batch_size")
                .with_source("chunk"),
        ));
    }

    let mut groups = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        groups.push(iter.by_ref().take(size).collect());
    }
    Ok(groups)
}
