use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::QuestionId;

/// One respondent's completed submission. Created outside the engine and
/// only ever read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerRecord {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    /// Seconds between the first view and the submission.
    #[serde(default)]
    pub duration_secs: u64,
    #[serde(default)]
    pub answers: BTreeMap<QuestionId, String>,
}

impl AnswerRecord {
    /// Non-empty answer for `question`, if any.
    pub fn answer(&self, question: &QuestionId) -> Option<&str> {
        self.answers
            .get(question)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Duration as `mm:ss`.
    pub fn duration_label(&self) -> String {
        format!("{:02}:{:02}", self.duration_secs / 60, self.duration_secs % 60)
    }
}
