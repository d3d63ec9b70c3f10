use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::contract::contract;

/// Closed set of question kinds a form step can take.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    ShortText,
    ProperName,
    LongText,
    Email,
    Phone,
    Date,
    Scheduler,
    Link,
    IdentityDocument,
    Cpf,
    Cnpj,
    Number,
    Currency,
    Address,
    MultipleChoice,
    SatisfactionScale,
    ImageChoice,
    ListSelect,
    FileAttachment,
    Message,
    TermsAcceptance,
    Welcome,
    ThankYou,
}

impl QuestionKind {
    /// Every kind, in the order the kind picker lists them.
    pub const ALL: [QuestionKind; 23] = [
        QuestionKind::ShortText,
        QuestionKind::ProperName,
        QuestionKind::LongText,
        QuestionKind::Email,
        QuestionKind::Phone,
        QuestionKind::Date,
        QuestionKind::Scheduler,
        QuestionKind::Link,
        QuestionKind::IdentityDocument,
        QuestionKind::Cpf,
        QuestionKind::Cnpj,
        QuestionKind::Number,
        QuestionKind::Currency,
        QuestionKind::Address,
        QuestionKind::MultipleChoice,
        QuestionKind::SatisfactionScale,
        QuestionKind::ImageChoice,
        QuestionKind::ListSelect,
        QuestionKind::FileAttachment,
        QuestionKind::Message,
        QuestionKind::TermsAcceptance,
        QuestionKind::Welcome,
        QuestionKind::ThankYou,
    ];

    /// Kind given to questions created by the editor.
    pub const DEFAULT: QuestionKind = QuestionKind::ShortText;

    /// Label shown in the kind picker and response tables.
    pub fn label(self) -> &'static str {
        contract(self).label
    }

    /// Flow-control steps that collect no data.
    pub fn is_structural(self) -> bool {
        contract(self).structural
    }

    /// Machine tag used in serialized forms.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::ShortText => "short-text",
            QuestionKind::ProperName => "proper-name",
            QuestionKind::LongText => "long-text",
            QuestionKind::Email => "email",
            QuestionKind::Phone => "phone",
            QuestionKind::Date => "date",
            QuestionKind::Scheduler => "scheduler",
            QuestionKind::Link => "link",
            QuestionKind::IdentityDocument => "identity-document",
            QuestionKind::Cpf => "cpf",
            QuestionKind::Cnpj => "cnpj",
            QuestionKind::Number => "number",
            QuestionKind::Currency => "currency",
            QuestionKind::Address => "address",
            QuestionKind::MultipleChoice => "multiple-choice",
            QuestionKind::SatisfactionScale => "satisfaction-scale",
            QuestionKind::ImageChoice => "image-choice",
            QuestionKind::ListSelect => "list-select",
            QuestionKind::FileAttachment => "file-attachment",
            QuestionKind::Message => "message",
            QuestionKind::TermsAcceptance => "terms-acceptance",
            QuestionKind::Welcome => "welcome",
            QuestionKind::ThankYou => "thank-you",
        }
    }

    /// Parses a machine tag back into a kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable question identifier, unique within a form and never reused.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fresh random identifier for a newly created question.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Reference handed back by the binary-storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileRef {
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

impl FileRef {
    /// Size in kilobytes with two decimals, as shown next to the file name.
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size as f64 / 1024.0)
    }
}

/// One step of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_file: Option<FileRef>,
}

impl Question {
    /// Builds a question with empty description, `required = false` and the
    /// optional fields its kind owns initialized empty.
    pub fn new(id: QuestionId, kind: QuestionKind, title: impl Into<String>) -> Self {
        let mut question = Self {
            id,
            kind,
            title: title.into(),
            description: String::new(),
            required: false,
            options: None,
            list_options: None,
            attached_file: None,
        };
        question.reshape();
        question
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if contract(self.kind).owned.options {
            self.options = Some(options.into_iter().map(Into::into).collect());
        }
        self
    }

    pub fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }

    /// Drops optional fields the current kind does not own and initializes
    /// the ones it does.
    pub(crate) fn reshape(&mut self) {
        let owned = contract(self.kind).owned;
        if owned.options {
            self.options.get_or_insert_with(Vec::new);
        } else {
            self.options = None;
        }
        if owned.list_options {
            self.list_options.get_or_insert_with(String::new);
        } else {
            self.list_options = None;
        }
        if !owned.attached_file {
            self.attached_file = None;
        }
    }

    /// Items of a list-select question, one per non-blank line.
    pub fn list_items(&self) -> Vec<String> {
        self.list_options
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Partial update for a question; only present fields overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<QuestionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_options: Option<String>,
}

impl QuestionPatch {
    pub fn kind(kind: QuestionKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
