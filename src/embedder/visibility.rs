//! Visibility of an embedder's root element

use serde::Serialize;

use super::hub::InstanceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn from_default(default_visible: bool) -> Self {
        if default_visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Visibility::Visible => Visibility::Hidden,
            Visibility::Hidden => Visibility::Visible,
        }
    }

    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }

    /// CSS `display` value for the root element
    pub fn css_display(self) -> &'static str {
        match self {
            Visibility::Visible => "block",
            Visibility::Hidden => "none",
        }
    }
}

/// A visibility assignment the DOM layer has to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibilityChange {
    pub id: InstanceId,
    pub visibility: Visibility,
}
