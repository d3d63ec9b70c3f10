use std::fmt;

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::spec::form::FormStyle;

const REGULAR: &str = r#"<iframe src="{{url}}" width="{{width}}" height="{{height}}" frameborder="0" style="border:0; border-radius: 8px;"></iframe>"#;

const FULLSCREEN: &str = r#"<style>body,html{margin:0;padding:0;height:100%;overflow:hidden;}</style><iframe src="{{url}}" width="100%" height="100%" frameborder="0" style="border:0; position:absolute; top:0; left:0;"></iframe>"#;

const BUTTON_NEW_TAB: &str = r#"<a href="{{url}}" target="_blank" style="background-color: {{button_color}}; color: #fff; padding: 12px 24px; border-radius: {{radius}}px; text-decoration: none; font-family: {{font}};">{{label}}</a>"#;

const BUTTON_MODAL: &str = r#"<button type="button" onclick="document.getElementById('{{modal_id}}').style.display='flex'" style="background-color: {{button_color}}; color: #fff; padding: 12px 24px; border: 0; border-radius: {{radius}}px; cursor: pointer; font-family: {{font}};">{{label}}</button><div id="{{modal_id}}" onclick="this.style.display='none'" style="display:none; position:fixed; inset:0; background:rgba(0,0,0,0.6); align-items:center; justify-content:center; z-index:9999;"><iframe src="{{url}}" width="90%" height="90%" frameborder="0" style="border:0; border-radius: 8px; background:#fff;"></iframe></div>"#;

const BUTTON_LABEL: &str = "Abrir Formulário";

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("failed to render embed markup: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// How the form is placed on a host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedMode {
    #[default]
    Regular,
    Fullscreen,
    ButtonNewTab,
    ButtonModal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "px")]
    Px,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Percent => f.write_str("%"),
            Unit::Px => f.write_str("px"),
        }
    }
}

/// A length as typed into the share surface, e.g. `50` + `%`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub value: String,
    pub unit: Unit,
}

impl Dimension {
    pub fn new(value: impl Into<String>, unit: Unit) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value.trim(), self.unit)
    }
}

/// Frame size for the regular embed mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedSize {
    pub width: Dimension,
    pub height: Dimension,
}

impl Default for EmbedSize {
    fn default() -> Self {
        Self {
            width: Dimension::new("100", Unit::Percent),
            height: Dimension::new("500", Unit::Px),
        }
    }
}

/// Embeddable markup for `share_url`. Only the regular mode reads `size`;
/// the button modes read the button color, radius and font from `style`.
pub fn embed_code(
    share_url: &str,
    mode: EmbedMode,
    size: &EmbedSize,
    style: &FormStyle,
) -> Result<String, EmbedError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);

    let template = match mode {
        EmbedMode::Regular => REGULAR,
        EmbedMode::Fullscreen => FULLSCREEN,
        EmbedMode::ButtonNewTab => BUTTON_NEW_TAB,
        EmbedMode::ButtonModal => BUTTON_MODAL,
    };
    let data = json!({
        "url": share_url,
        "width": size.width.to_string(),
        "height": size.height.to_string(),
        "button_color": style.button_color,
        "radius": style.button_radius_px(),
        "font": style.font.css_family(),
        "label": BUTTON_LABEL,
        "modal_id": modal_id(share_url),
    });
    Ok(handlebars.render_template(template, &data)?)
}

fn modal_id(share_url: &str) -> String {
    let tail = share_url.rsplit('/').next().unwrap_or_default();
    format!("respondi-modal-{tail}")
}
