use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ClassifierStatus {
    pub ready: bool,
    pub model_name: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    pub score: f32,
}

/// Ranked output of a single classify call.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub categories: Vec<Category>,
    pub inference_time_ms: u64,
}

impl ClassificationOutcome {
    pub fn top(&self) -> Option<&Category> {
        self.categories.first()
    }
}
