use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::editor::default_questions;
use crate::publish::PublishedSnapshot;
use crate::share::ShareLink;
use crate::spec::question::Question;

/// Longest title accepted from the settings surface.
pub const MAX_TITLE_CHARS: usize = 60;

/// Font families offered for the public form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum FontChoice {
    #[default]
    Lato,
    Inter,
    Roboto,
    #[serde(rename = "Open Sans")]
    OpenSans,
}

impl FontChoice {
    pub fn name(self) -> &'static str {
        match self {
            FontChoice::Lato => "Lato",
            FontChoice::Inter => "Inter",
            FontChoice::Roboto => "Roboto",
            FontChoice::OpenSans => "Open Sans",
        }
    }

    /// CSS `font-family` value with a sans-serif fallback.
    pub fn css_family(self) -> String {
        format!("{}, sans-serif", self.name())
    }
}

/// Look of the public form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FormStyle {
    pub button_color: String,
    pub question_color: String,
    pub answer_color: String,
    pub background_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub font: FontChoice,
    /// Corner rounding step, 0 to 8.
    pub border_radius: u8,
    pub remove_branding: bool,
}

impl Default for FormStyle {
    fn default() -> Self {
        Self {
            button_color: "#2979FF".into(),
            question_color: "#263238".into(),
            answer_color: "#2979FF".into(),
            background_color: "#ffffff".into(),
            background_image: None,
            logo: None,
            font: FontChoice::default(),
            border_radius: 2,
            remove_branding: false,
        }
    }
}

impl FormStyle {
    pub const MAX_BORDER_RADIUS: u8 = 8;

    /// Button corner radius in pixels.
    pub fn button_radius_px(&self) -> u32 {
        u32::from(self.border_radius.min(Self::MAX_BORDER_RADIUS)) * 4
    }
}

/// Persisted publish status. The transient publishing phase is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PublishState {
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default = "default_draft_exists")]
    pub draft_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

fn default_draft_exists() -> bool {
    true
}

impl Default for PublishState {
    fn default() -> Self {
        Self {
            status: PublishStatus::Draft,
            draft_exists: true,
            published_at: None,
        }
    }
}

/// Stored shape of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub publish_state: PublishState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareLink>,
    #[serde(default)]
    pub style: FormStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<PublishedSnapshot>,
    pub created_at: DateTime<Utc>,
}

impl FormRecord {
    /// Fresh draft owned by `owner_id`, seeded with the default questions.
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            title: clamp_title(&title.into()),
            questions: default_questions(),
            publish_state: PublishState::default(),
            share: None,
            style: FormStyle::default(),
            published: None,
            created_at: Utc::now(),
        }
    }

    pub fn share_slug(&self) -> Option<&str> {
        self.share.as_ref().map(|share| share.slug.as_str())
    }
}

/// Truncates a title to [`MAX_TITLE_CHARS`] characters.
pub fn clamp_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}
