//! Client view state and the reducer that advances it.

use crate::models::{PlayerId, TeamId, User};

/// Whether results come from the API or from the local mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionMode {
    #[default]
    Online,
    /// The API couldn't be reached; changes live only in the local mirror.
    Degraded { reason: String },
}

impl ConnectionMode {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ConnectionMode::Degraded { .. })
    }
}

/// Which screen is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Login,
    Dashboard,
    Team(TeamId),
    Player(PlayerId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub view: View,
    pub mode: ConnectionMode,
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SignedIn(User),
    SignedOut,
    Navigate(View),
    RequestStarted,
    /// The API answered; any degraded state is over.
    RequestSucceeded,
    /// The API couldn't be reached and the mirror was used instead.
    FellBack { reason: String },
    RequestFailed(String),
    DismissError,
}

/// Compute the next state. The input state is left untouched.
pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    let mut next = state.clone();
    match action {
        Action::SignedIn(user) => {
            next.user = Some(user);
            next.view = View::Dashboard;
            next.error = None;
        }
        Action::SignedOut => {
            next = ViewState {
                mode: state.mode.clone(),
                ..ViewState::default()
            };
        }
        Action::Navigate(view) => {
            next.view = if next.user.is_some() { view } else { View::Login };
        }
        Action::RequestStarted => {
            next.loading = true;
            next.error = None;
        }
        Action::RequestSucceeded => {
            next.loading = false;
            next.mode = ConnectionMode::Online;
        }
        Action::FellBack { reason } => {
            next.loading = false;
            next.mode = ConnectionMode::Degraded { reason };
        }
        Action::RequestFailed(message) => {
            next.loading = false;
            next.error = Some(message);
        }
        Action::DismissError => {
            next.error = None;
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use chrono::Utc;

    fn coach() -> User {
        User {
            id: RecordId::new(1),
            email: "coach@example.com".to_string(),
            password_hash: String::new(),
            name: "Coach".to_string(),
            profile_pic: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_in_and_out() {
        let state = ViewState::default();
        assert_eq!(state.view, View::Login);

        let signed_in = reduce(&state, Action::SignedIn(coach()));
        assert_eq!(signed_in.view, View::Dashboard);
        assert_eq!(signed_in.user.as_ref().map(|u| u.id), Some(RecordId::new(1)));
        // Input untouched
        assert!(state.user.is_none());

        let signed_out = reduce(&signed_in, Action::SignedOut);
        assert_eq!(signed_out.view, View::Login);
        assert!(signed_out.user.is_none());
    }

    #[test]
    fn test_navigation_requires_user() {
        let state = reduce(&ViewState::default(), Action::Navigate(View::Team(RecordId::new(3))));
        assert_eq!(state.view, View::Login);

        let state = reduce(&ViewState::default(), Action::SignedIn(coach()));
        let state = reduce(&state, Action::Navigate(View::Player(RecordId::new(9))));
        assert_eq!(state.view, View::Player(RecordId::new(9)));
    }

    #[test]
    fn test_degraded_then_recovered() {
        let state = reduce(&ViewState::default(), Action::RequestStarted);
        assert!(state.loading);

        let state = reduce(
            &state,
            Action::FellBack {
                reason: "connection refused".to_string(),
            },
        );
        assert!(!state.loading);
        assert_eq!(
            state.mode,
            ConnectionMode::Degraded {
                reason: "connection refused".to_string()
            }
        );

        let state = reduce(&state, Action::RequestSucceeded);
        assert_eq!(state.mode, ConnectionMode::Online);
    }

    #[test]
    fn test_failure_sets_and_dismisses_error() {
        let state = reduce(&ViewState::default(), Action::RequestStarted);
        let state = reduce(&state, Action::RequestFailed("Access denied".to_string()));
        assert_eq!(state.error.as_deref(), Some("Access denied"));
        assert_eq!(state.mode, ConnectionMode::Online);

        let state = reduce(&state, Action::RequestStarted);
        assert!(state.error.is_none());

        let state = reduce(&state, Action::RequestFailed("again".to_string()));
        let state = reduce(&state, Action::DismissError);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_sign_out_keeps_connection_mode() {
        let state = reduce(
            &ViewState::default(),
            Action::FellBack {
                reason: "timeout".to_string(),
            },
        );
        let state = reduce(&state, Action::SignedIn(coach()));
        let state = reduce(&state, Action::SignedOut);
        assert!(state.mode.is_degraded());
    }
}
