//! Embed tag: the 3-digit identifier a source card carries in its icon
//!
//! A card opts into embedding with `icon: EMBED#042`. The prefix is matched
//! case-insensitively, the digits exactly. Canonical tags run from "001" to
//! "999"; "000" is never produced by the scanner and rejected by validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::EmbedderError;

/// `^EMBED#(\d{3})$`, prefix case-insensitive, ASCII digits only
static ICON_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:EMBED)#([0-9]{3})$").expect("icon pattern is a valid regex")
});

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}$").expect("tag pattern is a valid regex"));

/// Lowest and highest canonical tag values
pub const MIN_TAG: u16 = 1;
pub const MAX_TAG: u16 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmbedTag(String);

impl EmbedTag {
    /// Build a tag from its numeric value (1..=999)
    pub fn from_number(n: u16) -> Option<Self> {
        (MIN_TAG..=MAX_TAG)
            .contains(&n)
            .then(|| EmbedTag(format!("{:03}", n)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn number(&self) -> u16 {
        // Validated on construction: always three ASCII digits
        self.0.parse().unwrap_or(0)
    }

    /// URL fragment that makes a widget with this tag visible: `#embed_042`
    pub fn fragment(&self) -> String {
        format!("#embed_{}", self.0)
    }

    /// Icon value a source card must carry: `EMBED#042`
    pub fn icon(&self) -> String {
        format!("EMBED#{}", self.0)
    }
}

impl fmt::Display for EmbedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EmbedTag {
    type Err = EmbedderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_embed_id(s)?;
        Ok(EmbedTag(s.to_string()))
    }
}

impl TryFrom<String> for EmbedTag {
    type Error = EmbedderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EmbedTag> for String {
    fn from(tag: EmbedTag) -> Self {
        tag.0
    }
}

/// Standalone tag validation, usable without a widget
pub fn validate_embed_id(id: &str) -> Result<(), EmbedderError> {
    if !TAG_PATTERN.is_match(id) {
        return Err(EmbedderError::configuration("embed_id must be 3 digits (001-999)"));
    }
    let n: u16 = id.parse().unwrap_or(0);
    if !(MIN_TAG..=MAX_TAG).contains(&n) {
        return Err(EmbedderError::configuration("embed_id must be between 001 and 999"));
    }
    Ok(())
}

/// Extract the 3-digit group from an icon value, if it is an embed marker
pub fn tag_in_icon(icon: &str) -> Option<&str> {
    ICON_PATTERN
        .captures(icon)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
