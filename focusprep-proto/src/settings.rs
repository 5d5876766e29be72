//! User-facing preferences and the application-level records persisted
//! alongside the board: theme, profile, focus settings and notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Color theme selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light palette.
    Light,
    /// Dark palette.
    Dark,
    /// Follow the host preference.
    #[default]
    System,
}

impl ThemeMode {
    /// Resolves `System` against the host preference.
    #[must_use]
    pub const fn resolve(self, host_prefers_dark: bool) -> Self {
        match self {
            Self::System if host_prefers_dark => Self::Dark,
            Self::System => Self::Light,
            other => other,
        }
    }

    /// Light ↔ dark toggle; `System` toggles to `Dark`.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light | Self::System => Self::Dark,
        }
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Focus timer and notification preferences.
///
/// Durations are in minutes. Unknown or missing keys in a stored blob fall
/// back to the defaults field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusSettings {
    /// Length of a focus session.
    pub default_focus_duration: u32,
    /// Length of a short break.
    pub break_duration: u32,
    /// Length of a long break.
    pub long_break_duration: u32,
    /// Start the break timer automatically when a focus session completes.
    pub auto_start_breaks: bool,
    /// Play background sounds during focus sessions.
    pub background_sounds: bool,
    /// Show notifications.
    pub notifications_enabled: bool,
    /// Play a sound on completion.
    pub sound_enabled: bool,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            default_focus_duration: 25,
            break_duration: 5,
            long_break_duration: 15,
            auto_start_breaks: false,
            background_sounds: false,
            notifications_enabled: true,
            sound_enabled: true,
        }
    }
}

/// A partial settings update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// New focus length in minutes.
    pub default_focus_duration: Option<u32>,
    /// New short break length in minutes.
    pub break_duration: Option<u32>,
    /// New long break length in minutes.
    pub long_break_duration: Option<u32>,
    /// Toggle automatic breaks.
    pub auto_start_breaks: Option<bool>,
    /// Toggle background sounds.
    pub background_sounds: Option<bool>,
    /// Toggle notifications.
    pub notifications_enabled: Option<bool>,
    /// Toggle completion sound.
    pub sound_enabled: Option<bool>,
}

impl FocusSettings {
    /// Returns a copy with every `Some` field of `patch` applied.
    #[must_use]
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            default_focus_duration: patch
                .default_focus_duration
                .unwrap_or(self.default_focus_duration),
            break_duration: patch.break_duration.unwrap_or(self.break_duration),
            long_break_duration: patch
                .long_break_duration
                .unwrap_or(self.long_break_duration),
            auto_start_breaks: patch.auto_start_breaks.unwrap_or(self.auto_start_breaks),
            background_sounds: patch.background_sounds.unwrap_or(self.background_sounds),
            notifications_enabled: patch
                .notifications_enabled
                .unwrap_or(self.notifications_enabled),
            sound_enabled: patch.sound_enabled.unwrap_or(self.sound_enabled),
        }
    }
}

/// Display profile of the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Informational; expires on its own.
    Info,
    /// Something succeeded.
    Success,
    /// Something needs attention.
    Warning,
    /// Something failed.
    Error,
}

/// An in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique id.
    pub id: Uuid,
    /// Severity.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Whether the user has seen it.
    pub read: bool,
    /// When it was raised.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification stamped with `now`.
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            created_at: now,
        }
    }
}

/// The subset of application state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedAppState {
    /// Signed-in profile, if any.
    pub user: Option<UserProfile>,
    /// Whether a profile is active.
    pub is_authenticated: bool,
    /// Theme selection.
    pub theme: ThemeMode,
    /// Focus settings.
    pub settings: FocusSettings,
}
