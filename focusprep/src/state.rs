//! Application-level state: profile, theme, notifications and settings.
//!
//! State changes go through the pure [`reduce`] function. [`AppStore`] owns
//! the current value, persists the durable part after every dispatch and
//! notifies subscribers.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use focusprep_proto::codec::APP_STATE_KEY;
use focusprep_proto::settings::{
    FocusSettings, Notification, NotificationKind, PersistedAppState, SettingsPatch, ThemeMode,
    UserProfile,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::{KeyValueStore, load_or_default, save_logged};

/// How long an info notification stays visible.
pub const INFO_NOTIFICATION_TTL: TimeDelta = TimeDelta::seconds(5);

/// The whole application state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Signed-in profile, if any.
    pub user: Option<UserProfile>,
    /// Whether a profile is signed in.
    pub is_authenticated: bool,
    /// Selected theme.
    pub theme: ThemeMode,
    /// Visible notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Timer and notification preferences.
    pub settings: FocusSettings,
}

impl AppState {
    /// The part of the state that survives restarts.
    #[must_use]
    pub fn persisted(&self) -> PersistedAppState {
        PersistedAppState {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
            theme: self.theme,
            settings: self.settings.clone(),
        }
    }

    /// Notifications not yet marked read.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

/// A state transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Sign a profile in.
    SetUser(UserProfile),
    /// Sign out, dropping notifications.
    Logout,
    /// Change the theme.
    SetTheme(ThemeMode),
    /// Show a notification.
    AddNotification(Notification),
    /// Dismiss a notification.
    RemoveNotification(Uuid),
    /// Mark a notification read.
    MarkNotificationRead(Uuid),
    /// Merge settings changes.
    UpdateSettings(SettingsPatch),
    /// Replace the durable part with a saved copy.
    Hydrate(PersistedAppState),
}

/// Applies `action` to `state`.
#[must_use]
pub fn reduce(mut state: AppState, action: AppAction) -> AppState {
    match action {
        AppAction::SetUser(user) => {
            state.user = Some(user);
            state.is_authenticated = true;
        }
        AppAction::Logout => {
            state.user = None;
            state.is_authenticated = false;
            state.notifications.clear();
        }
        AppAction::SetTheme(theme) => state.theme = theme,
        AppAction::AddNotification(notification) => state.notifications.insert(0, notification),
        AppAction::RemoveNotification(id) => state.notifications.retain(|n| n.id != id),
        AppAction::MarkNotificationRead(id) => {
            if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
                n.read = true;
            }
        }
        AppAction::UpdateSettings(patch) => state.settings = state.settings.merged(&patch),
        AppAction::Hydrate(saved) => {
            state.user = saved.user;
            state.is_authenticated = saved.is_authenticated;
            state.theme = saved.theme;
            state.settings = saved.settings;
        }
    }
    state
}

/// Callback invoked with the new state after each dispatch.
pub type StateListener = Box<dyn FnMut(&AppState) + Send>;

/// Owner of the application state.
pub struct AppStore {
    state: AppState,
    store: Arc<dyn KeyValueStore>,
    listeners: Vec<StateListener>,
}

impl AppStore {
    /// Creates a store hydrated from whatever `store` has saved.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let saved: PersistedAppState = load_or_default(store.as_ref(), APP_STATE_KEY);
        let state = reduce(AppState::default(), AppAction::Hydrate(saved));
        debug!(theme = %state.theme, authenticated = state.is_authenticated, "app state hydrated");
        Self {
            state,
            store,
            listeners: Vec::new(),
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Registers an observer called after every dispatch.
    pub fn subscribe(&mut self, listener: impl FnMut(&AppState) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Applies `action`, persists and notifies subscribers.
    ///
    /// Signing out removes the saved blob instead of overwriting it.
    pub fn dispatch(&mut self, action: AppAction) {
        let logout = matches!(action, AppAction::Logout);
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);

        if logout {
            if let Err(e) = self.store.remove(APP_STATE_KEY) {
                warn!(error = %e, "failed to clear saved app state");
            }
        } else {
            save_logged(self.store.as_ref(), APP_STATE_KEY, &self.state.persisted());
        }
        self.notify();
    }

    /// Shows a notification unless notifications are turned off. Returns
    /// the notification id when one was added.
    pub fn notify_user(
        &mut self,
        kind: NotificationKind,
        title: &str,
        message: &str,
        now: DateTime<Utc>,
    ) -> Option<Uuid> {
        if !self.state.settings.notifications_enabled {
            return None;
        }
        let notification = Notification::new(kind, title, message, now);
        let id = notification.id;
        self.dispatch(AppAction::AddNotification(notification));
        Some(id)
    }

    /// Drops info notifications older than [`INFO_NOTIFICATION_TTL`].
    /// Returns how many were removed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let stale: Vec<Uuid> = self
            .state
            .notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::Info && now - n.created_at >= INFO_NOTIFICATION_TTL)
            .map(|n| n.id)
            .collect();
        if stale.is_empty() {
            return 0;
        }
        let mut state = std::mem::take(&mut self.state);
        for id in &stale {
            state = reduce(state, AppAction::RemoveNotification(*id));
        }
        self.state = state;
        self.notify();
        stale.len()
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
