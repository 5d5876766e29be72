//! Focus session records and distraction blocker toggles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Preset focus lengths offered by the timer, in minutes.
pub const FOCUS_PRESETS_MINUTES: [u32; 4] = [15, 25, 45, 60];

/// What a timer session was for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    /// Heads-down work.
    #[default]
    Focus,
    /// Short rest between focus sessions.
    ShortBreak,
    /// Longer rest after several focus sessions.
    LongBreak,
}

impl SessionKind {
    /// Label shown above the timer.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }
}

/// A completed timer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    /// Unique id.
    pub id: Uuid,
    /// Session purpose.
    #[serde(default)]
    pub kind: SessionKind,
    /// Configured length in minutes.
    pub duration: u32,
    /// When the session began.
    pub start_time: DateTime<Utc>,
    /// When the session completed.
    pub end_time: DateTime<Utc>,
    /// Number of blockers enabled when the session completed.
    pub distractions_avoided: u32,
}

/// A site or app the user wants blocked during focus sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistractionBlocker {
    /// Stable id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short glyph shown next to the name.
    pub icon: String,
    /// Whether it is blocked.
    pub enabled: bool,
}

impl DistractionBlocker {
    /// Creates a blocker.
    pub fn new(id: &str, name: &str, icon: &str, enabled: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            enabled,
        }
    }

    /// The blocker list a fresh install starts with.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("1", "YouTube", "\u{1f3a5}", true),
            Self::new("2", "Instagram", "\u{1f4f7}", true),
            Self::new("3", "WhatsApp", "\u{1f4ac}", false),
            Self::new("4", "Twitter", "\u{1f426}", true),
            Self::new("5", "TikTok", "\u{1f3b5}", false),
        ]
    }
}
