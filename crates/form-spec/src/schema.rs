use schemars::schema_for;
use serde_json::Value;

use crate::answers::AnswerRecord;
use crate::publish::PublishedSnapshot;
use crate::spec::form::FormRecord;

/// JSON Schema of a persisted form record.
pub fn form_record_schema() -> Value {
    schema_for!(FormRecord).to_value()
}

/// JSON Schema of the snapshot served by a share link.
pub fn published_snapshot_schema() -> Value {
    schema_for!(PublishedSnapshot).to_value()
}

/// JSON Schema of one submitted answer record.
pub fn answer_record_schema() -> Value {
    schema_for!(AnswerRecord).to_value()
}
