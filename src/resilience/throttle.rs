use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct DispatchThrottleSnapshot {
    pub interval: Duration,
    /// Number of admissions granted so far.
    pub admitted: u64,
    /// Estimated wait until the next admission (ms), if one would wait now.
    pub estimated_wait_ms: Option<u64>,
}

#[derive(Debug)]
struct State {
    /// Earliest instant the next admission may be granted.
    next_slot: Option<Instant>,
    admitted: u64,
}

/// Minimum-interval admission gate.
///
/// Each call to [`admit`](Self::admit) returns no earlier than `interval` after
/// the previous admission. Waiters are served in lock order. A zero interval
/// disables the gate.
pub struct DispatchThrottle {
    interval: Duration,
    state: Mutex<State>,
}

impl DispatchThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(State {
                next_slot: None,
                admitted: 0,
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next admission slot (may sleep).
    pub async fn admit(&self) {
        // Held across the sleep so concurrent callers queue behind each other.
        let mut st = self.state.lock().await;
        if !self.interval.is_zero() {
            if let Some(slot) = st.next_slot {
                if slot > Instant::now() {
                    tokio::time::sleep_until(slot).await;
                }
            }
            st.next_slot = Some(Instant::now() + self.interval);
        }
        st.admitted += 1;
    }

    pub async fn snapshot(&self) -> DispatchThrottleSnapshot {
        let st = self.state.lock().await;
        let now = Instant::now();
        let estimated_wait_ms = st
            .next_slot
            .filter(|slot| *slot > now)
            .map(|slot| slot.duration_since(now).as_millis() as u64);
        DispatchThrottleSnapshot {
            interval: self.interval,
            admitted: st.admitted,
            estimated_wait_ms,
        }
    }
}
