use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("slug pattern compiles"));

/// Maps accented Latin letters to their base letter.
fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Lower-cases the title, transliterates accents, collapses every run of
/// non-alphanumerics into one hyphen and trims hyphens from both ends.
/// Applying it to its own output returns the same slug.
pub fn derive_slug(title: &str) -> String {
    let folded: String = title.to_lowercase().chars().map(fold_diacritic).collect();
    NON_ALPHANUMERIC
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Public link of a form. Generated once and never regenerated, so links
/// already handed out keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShareLink {
    pub slug: String,
    pub suffix: u32,
    pub url: String,
}

impl ShareLink {
    /// Builds the link for `title` with an explicit disambiguating suffix.
    pub fn with_suffix(title: &str, config: &EngineConfig, suffix: u32) -> Self {
        let mut slug = derive_slug(title);
        if slug.is_empty() {
            slug = config.fallback_slug.clone();
        }
        let url = format!(
            "{}/{}-{}",
            config.share_base_url.trim_end_matches('/'),
            slug,
            suffix
        );
        Self { slug, suffix, url }
    }

    /// Builds the link for `title` with a random suffix.
    pub fn generate(title: &str, config: &EngineConfig) -> Self {
        let suffix = rand::thread_rng().gen_range(0..config.suffix_range.max(1));
        let link = Self::with_suffix(title, config, suffix);
        debug!(slug = %link.slug, suffix, "generated share link");
        link
    }

    /// Builds the link of a stored form that has none yet. The suffix is
    /// derived from the form id, so every reopen yields the same URL until
    /// the record is saved with it.
    pub fn for_form(form_id: &str, title: &str, config: &EngineConfig) -> Self {
        let suffix = (fnv1a(form_id.as_bytes()) % u64::from(config.suffix_range.max(1))) as u32;
        let link = Self::with_suffix(title, config, suffix);
        debug!(form_id, slug = %link.slug, suffix, "derived share link");
        link
    }
}

// 64-bit FNV-1a; stable across builds and platforms.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Social networks the share surface links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialNetwork {
    Facebook,
    Twitter,
    Linkedin,
    Whatsapp,
}

impl SocialNetwork {
    pub const ALL: [SocialNetwork; 4] = [
        SocialNetwork::Facebook,
        SocialNetwork::Twitter,
        SocialNetwork::Linkedin,
        SocialNetwork::Whatsapp,
    ];

    /// Share-intent URL for `share_url` with an accompanying `text`.
    pub fn share_url(self, share_url: &str, text: &str) -> String {
        let url = urlencoding::encode(share_url);
        match self {
            SocialNetwork::Facebook => {
                format!("https://www.facebook.com/sharer/sharer.php?u={url}")
            }
            SocialNetwork::Twitter => format!(
                "https://twitter.com/intent/tweet?url={url}&text={}",
                urlencoding::encode(text)
            ),
            SocialNetwork::Linkedin => {
                format!("https://www.linkedin.com/sharing/share-offsite/?url={url}")
            }
            SocialNetwork::Whatsapp => format!(
                "https://api.whatsapp.com/send?text={}",
                urlencoding::encode(&format!("{text} {share_url}"))
            ),
        }
    }
}
