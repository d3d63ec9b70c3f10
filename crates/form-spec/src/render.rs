use serde_json::{Map, Value, json};

use crate::contract::{Affordance, contract};
use crate::editor::{EditError, QuestionList};
use crate::session::FormEditingSession;
use crate::spec::form::FormStyle;
use crate::spec::question::{FileRef, QuestionId, QuestionKind};

/// Title shown for an untitled data-collecting question.
pub const QUESTION_PLACEHOLDER: &str = "Adicione uma pergunta...";
/// Title shown for an untitled welcome or thank-you step.
pub const CLOSING_PLACEHOLDER: &str = "Obrigado por participar!";
/// Sidebar title of an untitled question.
pub const UNTITLED: &str = "Sem título";

/// Everything a preview surface needs to draw one question.
#[derive(Debug, Clone)]
pub struct PreviewPayload {
    pub form_title: String,
    pub question_id: QuestionId,
    pub kind: QuestionKind,
    pub kind_label: &'static str,
    /// 1-based position; `None` for welcome and thank-you steps.
    pub step: Option<usize>,
    pub total: usize,
    pub title: String,
    /// True when `title` is the placeholder rather than the question's own.
    pub title_is_placeholder: bool,
    pub description: Option<String>,
    pub show_required_toggle: bool,
    pub required: bool,
    pub affordance: Affordance,
    pub options: Option<Vec<String>>,
    pub list_items: Option<Vec<String>>,
    pub attached_file: Option<FileRef>,
    pub style: FormStyle,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Builds the preview of `id`, or of the active question when `id` is
/// `None`.
pub fn build_preview(
    session: &FormEditingSession,
    id: Option<&QuestionId>,
) -> Result<PreviewPayload, EditError> {
    let list = session.questions();
    let index = match id {
        Some(id) => list
            .position(id)
            .ok_or_else(|| EditError::NotFound(id.clone()))?,
        None => list.active_index(),
    };
    let question = &list.questions()[index];
    let kind_contract = contract(question.kind);

    let title_is_placeholder = question.title.trim().is_empty();
    let title = if !title_is_placeholder {
        question.title.clone()
    } else if kind_contract.structural {
        CLOSING_PLACEHOLDER.to_string()
    } else {
        QUESTION_PLACEHOLDER.to_string()
    };

    let description = (kind_contract.shows_description() && !question.description.is_empty())
        .then(|| question.description.clone());
    let list_items = kind_contract
        .owned
        .list_options
        .then(|| question.list_items());

    Ok(PreviewPayload {
        form_title: session.title().to_string(),
        question_id: question.id.clone(),
        kind: question.kind,
        kind_label: kind_contract.label,
        step: kind_contract.shows_step_badge().then_some(index + 1),
        total: list.len(),
        title,
        title_is_placeholder,
        description,
        show_required_toggle: kind_contract.shows_required_toggle(),
        required: question.required,
        affordance: kind_contract.affordance,
        options: question.options.clone(),
        list_items,
        attached_file: question.attached_file.clone(),
        style: session.style().clone(),
        has_previous: index > 0,
        has_next: index + 1 < list.len(),
    })
}

/// One sidebar row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub id: QuestionId,
    /// Position for data questions, `Start` for the welcome step and the
    /// question count for the thank-you step.
    pub badge: String,
    pub title: String,
    pub kind_label: &'static str,
    pub active: bool,
}

pub fn outline(list: &QuestionList) -> Vec<OutlineEntry> {
    let total = list.len();
    list.iter()
        .enumerate()
        .map(|(index, question)| {
            let badge = match question.kind {
                QuestionKind::Welcome => "Start".to_string(),
                QuestionKind::ThankYou => total.to_string(),
                _ => (index + 1).to_string(),
            };
            let title = if question.title.trim().is_empty() {
                UNTITLED.to_string()
            } else {
                question.title.clone()
            };
            OutlineEntry {
                id: question.id.clone(),
                badge,
                title,
                kind_label: question.kind.label(),
                active: &question.id == list.active_id(),
            }
        })
        .collect()
}

/// Render the preview as a structured JSON value.
pub fn render_json_ui(payload: &PreviewPayload) -> Value {
    let mut question = Map::new();
    question.insert("id".into(), Value::String(payload.question_id.to_string()));
    question.insert("type".into(), Value::String(payload.kind.as_str().into()));
    question.insert("label".into(), Value::String(payload.kind_label.into()));
    question.insert("title".into(), Value::String(payload.title.clone()));
    question.insert(
        "title_is_placeholder".into(),
        Value::Bool(payload.title_is_placeholder),
    );
    question.insert(
        "description".into(),
        payload
            .description
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    question.insert(
        "show_required_toggle".into(),
        Value::Bool(payload.show_required_toggle),
    );
    question.insert("required".into(), Value::Bool(payload.required));
    question.insert("affordance".into(), json!(payload.affordance));
    if let Some(options) = &payload.options {
        question.insert("options".into(), json!(options));
    }
    if let Some(items) = &payload.list_items {
        question.insert("list_items".into(), json!(items));
    }
    if let Some(file) = &payload.attached_file {
        question.insert(
            "attached_file".into(),
            json!({
                "reference": file.reference,
                "name": file.name,
                "size": file.size_label(),
            }),
        );
    }

    json!({
        "form_title": payload.form_title,
        "step": payload.step,
        "total": payload.total,
        "question": Value::Object(question),
        "style": {
            "button_color": payload.style.button_color,
            "question_color": payload.style.question_color,
            "answer_color": payload.style.answer_color,
            "background_color": payload.style.background_color,
            "background_image": payload.style.background_image,
            "logo": payload.style.logo,
            "font_family": payload.style.font.css_family(),
            "button_radius_px": payload.style.button_radius_px(),
            "show_branding": !payload.style.remove_branding,
        },
        "navigation": {
            "has_previous": payload.has_previous,
            "has_next": payload.has_next,
        },
    })
}

/// Render the preview as human-friendly text.
pub fn render_text(payload: &PreviewPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {}", payload.form_title));
    match payload.step {
        Some(step) => lines.push(format!(
            "Step {step}/{} ({})",
            payload.total, payload.kind_label
        )),
        None => lines.push(format!("{} ({} steps)", payload.kind_label, payload.total)),
    }
    let mut title = format!("  {}", payload.title);
    if payload.required {
        title.push_str(" *");
    }
    lines.push(title);
    if let Some(description) = &payload.description {
        lines.push(format!("  {description}"));
    }

    if let Some(options) = &payload.options {
        for (index, option) in options.iter().enumerate() {
            lines.push(format!("  {}) {option}", index + 1));
        }
    }
    if let Some(items) = &payload.list_items {
        for item in items {
            lines.push(format!("  - {item}"));
        }
    }
    if let Some(file) = &payload.attached_file {
        lines.push(format!("  File: {} ({})", file.name, file.size_label()));
    }
    match payload.affordance {
        Affordance::TextInput { placeholder }
        | Affordance::TextArea { placeholder }
        | Affordance::PhoneInput { placeholder }
        | Affordance::AddressInput { placeholder }
        | Affordance::SchedulerUrl { placeholder } => {
            lines.push(format!("  [{placeholder}]"));
        }
        Affordance::ScaleSelector { min, max } => {
            lines.push(format!("  Scale: {min}..{max}"));
        }
        Affordance::ContinueButton { label } | Affordance::StartButton { label } => {
            lines.push(format!("  <{label}>"));
        }
        _ => {}
    }

    let mut navigation = Vec::new();
    if payload.has_previous {
        navigation.push("previous");
    }
    if payload.has_next {
        navigation.push("next");
    }
    if !navigation.is_empty() {
        lines.push(format!("Navigation: {}", navigation.join(", ")));
    }

    lines.join("\n")
}
