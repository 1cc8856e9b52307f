//! App Domain
//!
//! Shell-level UI state shared by every page: theme, sidebar, session and
//! the notification queue.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::middleware::Validators;
use crate::store::Action;

/// Store name of the app domain.
pub const APP_STORE: &str = "app";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Provider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub level: NotificationLevel,
}

// == State ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub theme: Theme,
    pub sidebar_open: bool,
    pub loading: bool,
    pub session: Option<Session>,
    pub notifications: Vec<Notification>,
}

// == Actions ==
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum AppAction {
    SetTheme(Theme),
    ToggleSidebar,
    SetLoading(bool),
    SignIn(Session),
    SignOut,
    Notify(Notification),
    Dismiss(String),
}

impl Action for AppAction {
    fn kind(&self) -> &'static str {
        match self {
            AppAction::SetTheme(_) => "set_theme",
            AppAction::ToggleSidebar => "toggle_sidebar",
            AppAction::SetLoading(_) => "set_loading",
            AppAction::SignIn(_) => "sign_in",
            AppAction::SignOut => "sign_out",
            AppAction::Notify(_) => "notify",
            AppAction::Dismiss(_) => "dismiss",
        }
    }
}

// == Reducer ==
pub fn reduce(state: &Arc<AppState>, action: &AppAction) -> anyhow::Result<Arc<AppState>> {
    let unchanged = || Ok(Arc::clone(state));
    let next = match action {
        AppAction::SetTheme(theme) if state.theme == *theme => return unchanged(),
        AppAction::SetTheme(theme) => AppState {
            theme: *theme,
            ..(**state).clone()
        },
        AppAction::ToggleSidebar => AppState {
            sidebar_open: !state.sidebar_open,
            ..(**state).clone()
        },
        AppAction::SetLoading(loading) if state.loading == *loading => return unchanged(),
        AppAction::SetLoading(loading) => AppState {
            loading: *loading,
            ..(**state).clone()
        },
        AppAction::SignIn(session) => AppState {
            session: Some(session.clone()),
            ..(**state).clone()
        },
        AppAction::SignOut if state.session.is_none() => return unchanged(),
        AppAction::SignOut => AppState {
            session: None,
            notifications: Vec::new(),
            ..(**state).clone()
        },
        AppAction::Notify(notification) => {
            let mut next = (**state).clone();
            next.notifications.retain(|n| n.id != notification.id);
            next.notifications.push(notification.clone());
            next
        }
        AppAction::Dismiss(id) if !state.notifications.iter().any(|n| &n.id == id) => {
            return unchanged()
        }
        AppAction::Dismiss(id) => {
            let mut next = (**state).clone();
            next.notifications.retain(|n| &n.id != id);
            next
        }
    };
    Ok(Arc::new(next))
}

// == Validation ==
pub fn validators() -> Validators<AppAction> {
    Validators::new()
        .rule("sign_in", |action: &AppAction| {
            matches!(action, AppAction::SignIn(s) if !s.user_id.trim().is_empty())
        })
        .rule("notify", |action: &AppAction| {
            matches!(action, AppAction::Notify(n) if !n.id.is_empty() && !n.message.trim().is_empty())
        })
}
