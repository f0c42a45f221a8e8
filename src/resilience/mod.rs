//! # Resilience Primitives Module
//!
//! Admission control for batch runs.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`throttle`] | Minimum-interval gate between group dispatches |
//!
//! ```rust
//! use batchplex::resilience::throttle::DispatchThrottle;
//! use std::time::Duration;
//!
//! # async fn demo() {
//! let throttle = DispatchThrottle::new(Duration::from_millis(250));
//! throttle.admit().await; // immediate
//! throttle.admit().await; // waits ~250ms
//! # }
//! ```

pub mod throttle;

pub use throttle::{DispatchThrottle, DispatchThrottleSnapshot};
