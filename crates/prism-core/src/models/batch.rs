use serde::{Deserialize, Serialize};

/// One item that failed inside a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub key: String,
    pub error: String,
}

impl BatchFailure {
    pub fn new(key: impl Into<String>, error: impl ToString) -> Self {
        Self {
            key: key.into(),
            error: error.to_string(),
        }
    }
}

/// Successful results plus per-item failures. One bad item never aborts the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failures: Vec<BatchFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}
