//! Request groups.

use super::request::{RequestDescriptor, RequestFields};

/// Requests sent together in one multiplexed call, paired positionally with
/// the input items they were built from.
///
/// A retry resubmits the same `requests`; `items` are only consumed once the
/// group reaches a terminal outcome.
#[derive(Debug)]
pub struct Group<T> {
    /// Position of the group in the run, used for log correlation.
    pub index: usize,
    pub requests: Vec<RequestDescriptor>,
    pub items: Vec<T>,
}

impl<T> Group<T> {
    /// Build descriptors for `items`, invoking `builder` once per item.
    pub fn build<F>(index: usize, items: Vec<T>, builder: &F) -> Self
    where
        F: Fn(&T) -> RequestFields,
    {
        let requests = items
            .iter()
            .map(|item| RequestDescriptor::from_fields(builder(item)))
            .collect();
        Self {
            index,
            requests,
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
