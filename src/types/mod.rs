//! # Types Module
//!
//! Data model shared by the batch engine and its transports.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RequestFields`] | What the caller's builder produces for one input item |
//! | [`RequestDescriptor`] | `RequestFields` plus a correlation id, as sent on the wire |
//! | [`SubResponse`] | One entry of the multiplexed response |
//! | [`Group`] | Requests sent together, paired with their input items |
//! | [`Outcome`] | Terminal classification of one input item |
//! | [`BatchResult`] | Success/failure partition of a whole run |
//!
//! ## Example
//!
//! ```rust
//! use batchplex::types::{Method, RequestFields};
//!
//! let fields = RequestFields::patch("/users/42")
//!     .with_payload(serde_json::json!({ "displayName": "Ada" }))
//!     .with_header("If-Match", "*");
//! assert_eq!(fields.method, Method::Patch);
//! ```

pub mod group;
pub mod outcome;
pub mod request;
pub mod response;

pub use group::Group;
pub use outcome::{BatchResult, GroupResult, Outcome};
pub use request::{Method, RequestDescriptor, RequestFields};
pub use response::SubResponse;
