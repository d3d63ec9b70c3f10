//! Read-only response aggregation over a question list and the submitted
//! answer records.
//!
//! There is no visit-tracking feed: views and starts are approximated as an
//! externally supplied baseline plus the number of completed submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answers::AnswerRecord;
use crate::config::EngineConfig;
use crate::contract::contract;
use crate::spec::question::{Question, QuestionId, QuestionKind};

/// Counters supplied by the host in place of real event tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Baseline {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub starts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStats {
    pub views: u64,
    pub starts: u64,
    pub completed: u64,
    pub completion_rate: String,
}

/// Percentage of starts that completed, one decimal digit, clamped to
/// `[0, 100]`. Exactly `"0%"` when nothing was started.
pub fn completion_rate(completed: u64, starts: u64) -> String {
    if starts == 0 {
        return "0%".to_string();
    }
    let rate = (completed as f64 / starts as f64 * 100.0).clamp(0.0, 100.0);
    format!("{rate:.1}%")
}

pub fn compute_stats(records: &[AnswerRecord], baseline: Baseline) -> ResponseStats {
    let completed = records.len() as u64;
    let views = baseline.views + completed;
    let starts = baseline.starts + completed;
    ResponseStats {
        views,
        starts,
        completed,
        completion_rate: completion_rate(completed, starts),
    }
}

/// Per-question body of the summary view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryBody {
    /// Counting choices needs a live backing store the engine does not have.
    Unavailable,
    /// Leading answers in record order; `None` marks an unanswered record.
    RecentAnswers { answers: Vec<Option<String>> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub question_id: QuestionId,
    /// 1-based position among data-collecting questions.
    pub number: usize,
    pub title: String,
    pub kind: QuestionKind,
    pub body: SummaryBody,
}

fn data_questions(questions: &[Question]) -> impl Iterator<Item = &Question> {
    questions.iter().filter(|question| !question.is_structural())
}

/// One summary per non-structural question.
pub fn summarize_questions(
    questions: &[Question],
    records: &[AnswerRecord],
    recent: usize,
) -> Vec<QuestionSummary> {
    data_questions(questions)
        .enumerate()
        .map(|(index, question)| {
            let body = if contract(question.kind).is_choice_like() {
                SummaryBody::Unavailable
            } else {
                SummaryBody::RecentAnswers {
                    answers: records
                        .iter()
                        .take(recent)
                        .map(|record| record.answer(&question.id).map(str::to_string))
                        .collect(),
                }
            };
            QuestionSummary {
                question_id: question.id.clone(),
                number: index + 1,
                title: question.title.clone(),
                kind: question.kind,
                body,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub question_id: QuestionId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// 1-based position in submission order.
    pub number: usize,
    pub record_id: String,
    pub submitted_at: DateTime<Utc>,
    pub duration: String,
    pub cells: Vec<String>,
}

/// Individual view: one row per record, one column per data question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualTable {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

pub fn individual_table(
    questions: &[Question],
    records: &[AnswerRecord],
    missing_cell: &str,
) -> IndividualTable {
    let columns: Vec<TableColumn> = data_questions(questions)
        .map(|question| TableColumn {
            question_id: question.id.clone(),
            title: question.title.clone(),
        })
        .collect();
    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| TableRow {
            number: index + 1,
            record_id: record.id.clone(),
            submitted_at: record.submitted_at,
            duration: record.duration_label(),
            cells: columns
                .iter()
                .map(|column| {
                    record
                        .answer(&column.question_id)
                        .unwrap_or(missing_cell)
                        .to_string()
                })
                .collect(),
        })
        .collect();
    IndividualTable { columns, rows }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResponseBody {
    /// No submissions yet; not an error.
    AwaitingResponses,
    Responses {
        summary: Vec<QuestionSummary>,
        table: IndividualTable,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseReport {
    pub stats: ResponseStats,
    pub body: ResponseBody,
}

impl ResponseReport {
    pub fn is_empty(&self) -> bool {
        matches!(self.body, ResponseBody::AwaitingResponses)
    }
}

pub fn build_report(
    questions: &[Question],
    records: &[AnswerRecord],
    baseline: Baseline,
    config: &EngineConfig,
) -> ResponseReport {
    let stats = compute_stats(records, baseline);
    let body = if records.is_empty() {
        ResponseBody::AwaitingResponses
    } else {
        ResponseBody::Responses {
            summary: summarize_questions(questions, records, config.recent_answers),
            table: individual_table(questions, records, &config.missing_cell),
        }
    };
    ResponseReport { stats, body }
}
