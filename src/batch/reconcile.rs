//! Response Reconciler.
//!
//! Maps the sub-responses of one envelope back to the group's input items.
//! Matching is positional; [`correlate`] first restores request order when the
//! server echoed every correlation id but answered out of order.

use crate::types::{GroupResult, Outcome, RequestDescriptor, SubResponse};
use crate::Error;
use std::collections::HashMap;

/// Reorder `responses` to follow `requests` when ids allow it.
///
/// Applied only when every response carries an id and the ids are exactly the
/// request ids; otherwise the server's order is kept as-is.
pub fn correlate(requests: &[RequestDescriptor], responses: Vec<SubResponse>) -> Vec<SubResponse> {
    if requests.len() != responses.len() {
        return responses;
    }
    let in_order = requests
        .iter()
        .zip(&responses)
        .all(|(req, resp)| resp.correlation_id.as_deref() == Some(req.correlation_id.as_str()));
    if in_order {
        return responses;
    }

    let mut by_id: HashMap<String, SubResponse> = HashMap::with_capacity(responses.len());
    for resp in &responses {
        match &resp.correlation_id {
            Some(id) if !by_id.contains_key(id) => {
                by_id.insert(id.clone(), resp.clone());
            }
            // Missing or duplicated ids: positional matching is all we can do
            _ => return responses,
        }
    }
    let mut ordered = Vec::with_capacity(requests.len());
    for req in requests {
        match by_id.remove(&req.correlation_id) {
            Some(resp) => ordered.push(resp),
            None => return responses,
        }
    }
    ordered
}

/// Cardinality mismatch between an envelope and its group. Gives the items back
/// so the caller can still account for every one of them.
#[derive(Debug)]
pub struct ReconcileError<T> {
    pub expected: usize,
    pub actual: usize,
    pub items: Vec<T>,
}

impl<T> ReconcileError<T> {
    pub fn into_parts(self) -> (Error, Vec<T>) {
        (
            Error::ResponseMismatch {
                expected: self.expected,
                actual: self.actual,
            },
            self.items,
        )
    }
}

/// Classify each position: 2xx with a body is a success, anything else a failure.
pub fn reconcile<T>(
    responses: &[SubResponse],
    items: Vec<T>,
) -> std::result::Result<GroupResult<T>, ReconcileError<T>> {
    if responses.len() != items.len() {
        return Err(ReconcileError {
            expected: items.len(),
            actual: responses.len(),
            items,
        });
    }

    Ok(items
        .into_iter()
        .zip(responses)
        .map(|(item, resp)| match (&resp.body, resp.is_success()) {
            (Some(body), true) => Outcome::success(item, body.clone()),
            _ => Outcome::failure(item, failure_message(resp)),
        })
        .collect())
}

/// Human-readable reason for a failed sub-response.
pub fn failure_message(resp: &SubResponse) -> String {
    if let Some(msg) = resp.embedded_error_message() {
        return msg.to_string();
    }
    if let Some(msg) = &resp.error_message {
        return msg.clone();
    }
    if resp.is_success() {
        format!("no response body (status {})", resp.status_code)
    } else {
        format!("request failed with status {}", resp.status_code)
    }
}
