use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use form_spec::{
    AnswerRecord, Baseline, Direction, EditError, EmbedError, EmbedMode, EmbedSize, EngineConfig,
    FileRef, FormEditingSession, FormRecord, JsonDirStore, PublishError, QuestionId, QuestionKind,
    QuestionPatch, SocialNetwork, build_preview, contract, outline as form_outline,
    render_json_ui as form_render_json_ui, render_text as form_render_text,
};

const DEFAULT_FORM: &str = include_str!("../../form-spec/tests/fixtures/survey_form.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config/{0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse input/{0}")]
    InputParse(#[source] serde_json::Error),
    #[error("form '{0}' is not available")]
    FormUnavailable(String),
    #[error("unknown question type '{0}'")]
    UnknownKind(String),
    #[error("no store_dir configured")]
    NoStore,
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Embed(#[from] EmbedError),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_json: Option<String>,
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    store_dir: Option<String>,
}

fn load_config(config_json: &str) -> Result<ComponentConfig, ComponentError> {
    if config_json.trim().is_empty() {
        Ok(ComponentConfig::default())
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
    }
}

fn open_form(
    form_id: &str,
    config_json: &str,
) -> Result<(FormEditingSession, ComponentConfig), ComponentError> {
    let config = load_config(config_json)?;
    let form_json = config.form_json.as_deref().unwrap_or(DEFAULT_FORM);
    let record: FormRecord = serde_json::from_str(form_json).map_err(ComponentError::ConfigParse)?;
    if record.id != form_id {
        return Err(ComponentError::FormUnavailable(form_id.to_string()));
    }
    let session = FormEditingSession::open(record, config.engine.clone())?;
    Ok((session, config))
}

fn parse_input<T: for<'de> Deserialize<'de> + Default>(json: &str) -> Result<T, ComponentError> {
    if json.trim().is_empty() {
        Ok(T::default())
    } else {
        serde_json::from_str(json).map_err(ComponentError::InputParse)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ComponentError> {
    serde_json::to_value(value).map_err(ComponentError::JsonEncode)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn session_state(session: &FormEditingSession) -> Result<Value, ComponentError> {
    Ok(json!({
        "form": encode(&session.to_record())?,
        "active": session.questions().active_id(),
        "phase": encode(&session.publisher().phase())?,
        "draft_exists": session.publisher().draft_exists(),
    }))
}

pub fn describe(form_id: &str, config_json: &str) -> String {
    respond(open_form(form_id, config_json).and_then(|(session, _)| session_state(&session)))
}

pub fn kind_contract(kind: &str) -> String {
    respond(
        QuestionKind::from_tag(kind)
            .ok_or_else(|| ComponentError::UnknownKind(kind.to_string()))
            .and_then(|kind| encode(contract(kind))),
    )
}

pub fn kind_catalog() -> String {
    let catalog = QuestionKind::ALL
        .iter()
        .map(|kind| encode(contract(*kind)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array);
    respond(catalog)
}

#[derive(Debug, Deserialize, Default)]
struct AnswerCheck {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: String,
}

/// Checks one answer against the format its question type expects.
pub fn validate_answer(input_json: &str) -> String {
    respond(parse_input::<AnswerCheck>(input_json).and_then(|check| {
        let kind = QuestionKind::from_tag(&check.kind)
            .ok_or_else(|| ComponentError::UnknownKind(check.kind.clone()))?;
        let answer = contract(kind).answer;
        Ok(json!({
            "valid": answer.accepts(&check.value),
            "pattern": answer.pattern(),
        }))
    }))
}

fn question_id(id: &str) -> Option<QuestionId> {
    (!id.trim().is_empty()).then(|| QuestionId::from(id))
}

pub fn preview_json_ui(form_id: &str, config_json: &str, question_id_str: &str) -> String {
    respond(open_form(form_id, config_json).and_then(|(session, _)| {
        let id = question_id(question_id_str);
        let payload = build_preview(&session, id.as_ref())?;
        Ok(form_render_json_ui(&payload))
    }))
}

pub fn preview_text(form_id: &str, config_json: &str, question_id_str: &str) -> String {
    respond_string(open_form(form_id, config_json).and_then(|(session, _)| {
        let id = question_id(question_id_str);
        let payload = build_preview(&session, id.as_ref())?;
        Ok(form_render_text(&payload))
    }))
}

pub fn outline(form_id: &str, config_json: &str) -> String {
    respond(open_form(form_id, config_json).map(|(session, _)| {
        let entries = form_outline(session.questions())
            .into_iter()
            .map(|entry| {
                json!({
                    "id": entry.id,
                    "badge": entry.badge,
                    "title": entry.title,
                    "label": entry.kind_label,
                    "active": entry.active,
                })
            })
            .collect::<Vec<_>>();
        Value::Array(entries)
    }))
}

/// Editor operations accepted by [`apply_edit`].
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum EditOp {
    Append,
    InsertAfter { index: isize },
    Move { index: usize, direction: Direction },
    Remove { id: Option<QuestionId> },
    Select { id: QuestionId },
    Next,
    Previous,
    Update {
        id: Option<QuestionId>,
        #[serde(default)]
        patch: QuestionPatch,
    },
    AddOption { id: QuestionId, text: String },
    RemoveOption { id: QuestionId, index: usize },
    UpdateOption {
        id: QuestionId,
        index: usize,
        text: String,
    },
    AttachFile { id: QuestionId, file: FileRef },
    DetachFile { id: QuestionId },
    SetTitle { title: String },
}

#[derive(Debug, Deserialize)]
struct EditRequest {
    /// Cursor position to restore before applying the operation.
    #[serde(default)]
    active: Option<QuestionId>,
    #[serde(flatten)]
    op: EditOp,
}

fn apply(session: &mut FormEditingSession, op: EditOp) -> Result<(), EditError> {
    match op {
        EditOp::Append => {
            session.create_and_append();
        }
        EditOp::InsertAfter { index } => {
            session.create_and_insert_after(index)?;
        }
        EditOp::Move { index, direction } => {
            session.move_question(index, direction);
        }
        EditOp::Remove { id: Some(id) } => {
            session.remove(&id)?;
        }
        EditOp::Remove { id: None } => {
            session.remove_active()?;
        }
        EditOp::Select { id } => session.select(&id)?,
        EditOp::Next => session.select_next(),
        EditOp::Previous => session.select_previous(),
        EditOp::Update { id: Some(id), patch } => session.update(&id, patch)?,
        EditOp::Update { id: None, patch } => session.update_active(patch)?,
        EditOp::AddOption { id, text } => session.add_option(&id, &text)?,
        EditOp::RemoveOption { id, index } => {
            session.remove_option(&id, index)?;
        }
        EditOp::UpdateOption { id, index, text } => session.update_option(&id, index, &text)?,
        EditOp::AttachFile { id, file } => session.attach_file(&id, file)?,
        EditOp::DetachFile { id } => {
            session.detach_file(&id)?;
        }
        EditOp::SetTitle { title } => session.set_title(&title),
    }
    Ok(())
}

/// Applies one editor operation and returns the updated form with the cursor.
pub fn apply_edit(form_id: &str, config_json: &str, edit_json: &str) -> String {
    respond(open_form(form_id, config_json).and_then(|(mut session, _)| {
        let request: EditRequest =
            serde_json::from_str(edit_json).map_err(ComponentError::InputParse)?;
        if let Some(active) = &request.active {
            session.select(active)?;
        }
        debug!(form_id, op = ?request.op, "applying edit");
        apply(&mut session, request.op)?;
        session_state(&session)
    }))
}

/// Publishes the form into the configured `store_dir`.
pub fn publish(form_id: &str, config_json: &str) -> String {
    respond(open_form(form_id, config_json).and_then(|(mut session, config)| {
        let root = config.store_dir.ok_or(ComponentError::NoStore)?;
        let store = JsonDirStore::new(root);
        let snapshot = session.request_publish(&store)?;
        encode(snapshot)
    }))
}

#[derive(Debug, Deserialize, Default)]
struct EmbedRequest {
    #[serde(default)]
    mode: EmbedMode,
    #[serde(default)]
    size: EmbedSize,
}

pub fn embed_code(form_id: &str, config_json: &str, embed_json: &str) -> String {
    respond_string(open_form(form_id, config_json).and_then(|(session, _)| {
        let request: EmbedRequest = parse_input(embed_json)?;
        Ok(session.embed_code(request.mode, &request.size)?)
    }))
}

pub fn share_links(form_id: &str, config_json: &str) -> String {
    respond(open_form(form_id, config_json).map(|(session, _)| {
        let link = session.share_link();
        let mut social = serde_json::Map::new();
        for network in SocialNetwork::ALL {
            let name = match network {
                SocialNetwork::Facebook => "facebook",
                SocialNetwork::Twitter => "twitter",
                SocialNetwork::Linkedin => "linkedin",
                SocialNetwork::Whatsapp => "whatsapp",
            };
            social.insert(name.into(), Value::String(session.social_share_url(network)));
        }
        json!({
            "url": link.url,
            "slug": link.slug,
            "draft_notice": session.publisher().shows_draft_notice(),
            "social": social,
        })
    }))
}

pub fn report(form_id: &str, config_json: &str, answers_json: &str, baseline_json: &str) -> String {
    respond(open_form(form_id, config_json).and_then(|(session, _)| {
        let records: Vec<AnswerRecord> = parse_input(answers_json)?;
        let baseline: Baseline = parse_input(baseline_json)?;
        encode(&session.report(&records, baseline))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_ID: &str = "form-42";

    fn parse(output: &str) -> Value {
        serde_json::from_str(output).expect("valid json")
    }

    #[test]
    fn describe_returns_form_with_share_link() {
        let value = parse(&describe(FORM_ID, ""));
        assert_eq!(value["form"]["id"], FORM_ID);
        assert_eq!(value["form"]["share"]["slug"], "pesquisa-de-satisfacao-2024");
        assert_eq!(value["active"], "welcome");
        assert_eq!(value["phase"], "draft");
    }

    #[test]
    fn unknown_form_is_an_error_object() {
        let value = parse(&describe("other", ""));
        assert_eq!(value["error"], "form 'other' is not available");
    }

    #[test]
    fn contract_lookup_by_tag() {
        let value = parse(&kind_contract("multiple-choice"));
        assert_eq!(value["owned"]["options"], true);
        assert_eq!(value["affordance"]["widget"], "options_editor");
        assert!(parse(&kind_contract("slider"))["error"].is_string());
        assert_eq!(
            parse(&kind_catalog()).as_array().map(Vec::len),
            Some(QuestionKind::ALL.len())
        );
    }

    #[test]
    fn answer_validation_uses_kind_format() {
        let valid = parse(&validate_answer(
            r#"{"type": "email", "value": "ana@example.com"}"#,
        ));
        assert_eq!(valid["valid"], true);
        let invalid = parse(&validate_answer(r#"{"type": "email", "value": "ana"}"#));
        assert_eq!(invalid["valid"], false);
    }

    #[test]
    fn edit_appends_before_thank_you() {
        let value = parse(&apply_edit(FORM_ID, "", r#"{"op": "append"}"#));
        let questions = value["form"]["questions"].as_array().expect("questions");
        assert_eq!(questions.len(), 8);
        assert_eq!(questions[6]["type"], "short-text");
        assert_eq!(questions[7]["type"], "thank-you");
        assert_eq!(value["active"], questions[6]["id"]);
        assert_eq!(value["draft_exists"], true);
    }

    #[test]
    fn edit_restores_cursor_before_update() {
        let edit = json!({
            "active": "feedback",
            "op": "update",
            "patch": { "title": "Comentários" }
        });
        let value = parse(&apply_edit(FORM_ID, "", &edit.to_string()));
        assert_eq!(value["form"]["questions"][5]["title"], "Comentários");
        assert_eq!(value["active"], "feedback");
    }

    #[test]
    fn edit_errors_are_reported() {
        let value = parse(&apply_edit(
            FORM_ID,
            "",
            r#"{"op": "add_option", "id": "name", "text": "x"}"#,
        ));
        assert_eq!(value["error"], "proper-name questions have no options");
    }

    #[test]
    fn preview_defaults_to_active_question() {
        let value = parse(&preview_json_ui(FORM_ID, "", ""));
        assert_eq!(value["question"]["id"], "welcome");
        assert_eq!(value["step"], Value::Null);
        let text = preview_text(FORM_ID, "", "plan");
        assert!(text.contains("1) Grátis"));
    }

    #[test]
    fn outline_lists_every_question() {
        let value = parse(&outline(FORM_ID, ""));
        assert_eq!(value.as_array().map(Vec::len), Some(7));
        assert_eq!(value[0]["badge"], "Start");
    }

    #[test]
    fn embed_regular_uses_requested_size() {
        let request = json!({
            "mode": "regular",
            "size": {
                "width": { "value": "50", "unit": "%" },
                "height": { "value": "300", "unit": "px" }
            }
        });
        let markup = embed_code(FORM_ID, "", &request.to_string());
        assert!(markup.contains(r#"width="50%""#));
        assert!(markup.contains(r#"height="300px""#));
    }

    #[test]
    fn share_links_cover_every_network() {
        let value = parse(&share_links(FORM_ID, ""));
        assert!(
            value["social"]["whatsapp"]
                .as_str()
                .is_some_and(|url| url.starts_with("https://api.whatsapp.com/"))
        );
        assert_eq!(value["draft_notice"], true);
    }

    fn config_without_share(questions: Value) -> String {
        let mut form: Value = serde_json::from_str(DEFAULT_FORM).expect("fixture");
        form.as_object_mut().expect("object").remove("share");
        if !questions.is_null() {
            form["questions"] = questions;
        }
        json!({ "form_json": form.to_string() }).to_string()
    }

    #[test]
    fn share_link_is_stable_between_calls() {
        let first = parse(&share_links(FORM_ID, ""));
        let second = parse(&share_links(FORM_ID, ""));
        assert_eq!(
            first["url"],
            "https://form.respondi.app/pesquisa-de-satisfacao-2024-482"
        );
        assert_eq!(first["url"], second["url"]);

        let config = config_without_share(Value::Null);
        let first = parse(&share_links(FORM_ID, &config));
        let second = parse(&share_links(FORM_ID, &config));
        assert!(first["url"].is_string());
        assert_eq!(first["url"], second["url"]);
        let markup = embed_code(FORM_ID, &config, "");
        assert!(markup.contains(first["url"].as_str().expect("url")));
    }

    #[test]
    fn inconsistent_form_is_reported_as_error() {
        let config = config_without_share(json!([
            { "id": "x", "type": "thank-you", "title": "Fim" },
            { "id": "x", "type": "email", "title": "E-mail" },
            { "id": "w", "type": "welcome", "title": "Oi" }
        ]));
        let value = parse(&describe(FORM_ID, &config));
        assert_eq!(value["error"], "question id 'x' appears more than once");
    }

    #[test]
    fn publish_requires_store_dir() {
        let value = parse(&publish(FORM_ID, ""));
        assert_eq!(value["error"], "no store_dir configured");
    }

    #[test]
    fn empty_report_is_not_an_error() {
        let value = parse(&report(FORM_ID, "", "[]", ""));
        assert_eq!(value["stats"]["completion_rate"], "0%");
        assert_eq!(value["body"]["state"], "awaiting_responses");
    }
}
