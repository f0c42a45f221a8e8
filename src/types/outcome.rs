//! Per-item outcomes and the aggregate batch result.

/// Terminal classification of one input item.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success {
        item: T,
        body: serde_json::Value,
    },
    Failure {
        item: T,
        error: String,
    },
}

impl<T> Outcome<T> {
    pub fn success(item: T, body: serde_json::Value) -> Self {
        Outcome::Success { item, body }
    }

    pub fn failure(item: T, error: impl Into<String>) -> Self {
        Outcome::Failure {
            item,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn item(&self) -> &T {
        match self {
            Outcome::Success { item, .. } | Outcome::Failure { item, .. } => item,
        }
    }
}

/// Outcomes of one group, in the group's request order.
pub type GroupResult<T> = Vec<Outcome<T>>;

/// Success/failure partition of a whole run.
///
/// Entries are appended in group completion order, so the lists are not
/// necessarily in input order; within one group the order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<T> {
    pub successful: Vec<(T, serde_json::Value)>,
    pub failed: Vec<(T, String)>,
}

impl<T> BatchResult<T> {
    pub fn new() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: Outcome<T>) {
        match outcome {
            Outcome::Success { item, body } => self.successful.push((item, body)),
            Outcome::Failure { item, error } => self.failed.push((item, error)),
        }
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = Outcome<T>>) {
        for o in outcomes {
            self.push(o);
        }
    }

    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
    pub fn success_count(&self) -> usize {
        self.successful.len()
    }
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.successful.len() as f64 / self.total() as f64
        }
    }

    pub fn into_parts(self) -> (Vec<(T, serde_json::Value)>, Vec<(T, String)>) {
        (self.successful, self.failed)
    }
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Outcome<T>> for BatchResult<T> {
    fn from_iter<I: IntoIterator<Item = Outcome<T>>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}
