use crate::api::GenerateError;
use shared::models::NovelSettings;
use std::rc::Rc;
use uuid::Uuid;
use yew::prelude::*;

/// Whole application state: the current settings value plus the ephemeral
/// generation session (accumulated text, loading flag, error).
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub settings: NovelSettings,
    /// Concatenation of the fragments delivered so far, in arrival order.
    pub content: String,
    pub is_generating: bool,
    pub error: Option<GenerateError>,
    /// Identity of the session currently allowed to mutate the text.
    pub session_id: Option<Uuid>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            settings: NovelSettings::default(),
            content: String::new(),
            is_generating: false,
            error: None,
            session_id: None,
        }
    }
}

pub enum Action {
    /// Replace the settings value wholesale (one field changed in the UI).
    UpdateSettings(NovelSettings),
    /// Replace only the style reference, e.g. after an async file import.
    SetReferenceText(String),
    /// Begin a new generation: clears text and error, marks loading, and
    /// installs the session id that subsequent stream actions must match.
    StartSession(Uuid),
    AppendFragment { session_id: Uuid, text: String },
    FinishSession(Uuid),
    FailSession {
        session_id: Uuid,
        error: GenerateError,
    },
}

impl Reducible for State {
    type Action = Action;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();

        match action {
            Action::UpdateSettings(settings) => {
                next.settings = settings;
            }
            Action::SetReferenceText(text) => {
                next.settings = NovelSettings {
                    reference_text: text,
                    ..next.settings
                };
            }
            Action::StartSession(session_id) => {
                next.content.clear();
                next.error = None;
                next.is_generating = true;
                next.session_id = Some(session_id);
            }
            Action::AppendFragment { session_id, text } => {
                // Fragments from a superseded stream are discarded.
                if next.session_id == Some(session_id) {
                    next.content.push_str(&text);
                }
            }
            Action::FinishSession(session_id) => {
                if next.session_id == Some(session_id) {
                    next.is_generating = false;
                }
            }
            Action::FailSession { session_id, error } => {
                if next.session_id == Some(session_id) {
                    next.error = Some(error);
                    next.is_generating = false;
                }
            }
        }

        next.into()
    }
}

pub type StoreContext = UseReducerHandle<State>;

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(state: State, action: Action) -> State {
        (*Reducible::reduce(Rc::new(state), action)).clone()
    }

    fn started(session_id: Uuid) -> State {
        let mut state = State::default();
        state.settings.synopsis = "A hero falls for a demon lord".to_string();
        apply(state, Action::StartSession(session_id))
    }

    #[test]
    fn start_resets_text_and_error() {
        let mut state = State::default();
        state.content = "이전 원고".to_string();
        state.error = Some(GenerateError::Network("boom".to_string()));

        let id = Uuid::new_v4();
        let state = apply(state, Action::StartSession(id));

        assert_eq!(state.content, "");
        assert_eq!(state.error, None);
        assert!(state.is_generating);
        assert_eq!(state.session_id, Some(id));
    }

    #[test]
    fn fragments_concatenate_in_arrival_order() {
        let id = Uuid::new_v4();
        let mut state = started(id);
        for text in ["안녕", "하세요"] {
            state = apply(
                state,
                Action::AppendFragment {
                    session_id: id,
                    text: text.to_string(),
                },
            );
        }
        assert!(state.is_generating);
        let state = apply(state, Action::FinishSession(id));

        assert_eq!(state.content, "안녕하세요");
        assert!(!state.is_generating);
        assert_eq!(state.error, None);
    }

    #[test]
    fn failure_keeps_delivered_fragments() {
        let id = Uuid::new_v4();
        let mut state = started(id);
        state = apply(
            state,
            Action::AppendFragment {
                session_id: id,
                text: "첫 문장.".to_string(),
            },
        );
        state = apply(
            state,
            Action::FailSession {
                session_id: id,
                error: GenerateError::Blocked("SAFETY".to_string()),
            },
        );

        assert_eq!(state.content, "첫 문장.");
        assert_eq!(state.error, Some(GenerateError::Blocked("SAFETY".to_string())));
        assert!(!state.is_generating);
    }

    #[test]
    fn stale_session_actions_are_discarded() {
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();
        let mut state = started(old);
        state = apply(state, Action::StartSession(new));

        // Leftovers from the superseded stream must not touch the new session.
        state = apply(
            state,
            Action::AppendFragment {
                session_id: old,
                text: "늦은 조각".to_string(),
            },
        );
        state = apply(
            state,
            Action::FailSession {
                session_id: old,
                error: GenerateError::Network("aborted".to_string()),
            },
        );
        state = apply(state, Action::FinishSession(old));

        assert_eq!(state.content, "");
        assert_eq!(state.error, None);
        assert!(state.is_generating);

        state = apply(
            state,
            Action::AppendFragment {
                session_id: new,
                text: "새 원고".to_string(),
            },
        );
        assert_eq!(state.content, "새 원고");
    }

    #[test]
    fn settings_replaced_wholesale() {
        let mut settings = NovelSettings::default();
        settings.synopsis = "마왕과 용사".to_string();
        let state = apply(State::default(), Action::UpdateSettings(settings.clone()));
        assert_eq!(state.settings, settings);

        let state = apply(state, Action::SetReferenceText("문체 예시".to_string()));
        assert_eq!(state.settings.reference_text, "문체 예시");
        assert_eq!(state.settings.synopsis, "마왕과 용사");
    }
}
