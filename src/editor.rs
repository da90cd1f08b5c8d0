//! Modal form for creating a lead.
//!
//! The editor owns its form state. It never touches the lead list; it reports
//! an [`EditorOutcome`] and the list view decides what to do next.

use crossterm::event::{KeyCode, KeyEvent};

use crate::api::{LeadApi, LeadId, NewLead};

pub const CREATE_FAILED: &str = "Something went wrong when creating lead";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    Company,
    Email,
    Note,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::FirstName,
        Field::LastName,
        Field::Company,
        Field::Email,
        Field::Note,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::Company => "Company",
            Field::Email => "Email",
            Field::Note => "Note",
        }
    }

    /// Shown with a marker in the form, but not enforced
    pub fn looks_required(self) -> bool {
        matches!(self, Field::FirstName | Field::LastName)
    }

    fn next(self) -> Self {
        match self {
            Field::FirstName => Field::LastName,
            Field::LastName => Field::Company,
            Field::Company => Field::Email,
            Field::Email => Field::Note,
            Field::Note => Field::FirstName,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::FirstName => Field::Note,
            Field::LastName => Field::FirstName,
            Field::Company => Field::LastName,
            Field::Email => Field::Company,
            Field::Note => Field::Email,
        }
    }
}

/// How the editor finished. Both outcomes go through the same completion
/// path in the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOutcome {
    Saved,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub note: String,
}

impl FormState {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Company => &self.company,
            Field::Email => &self.email,
            Field::Note => &self.note,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Company => &mut self.company,
            Field::Email => &mut self.email,
            Field::Note => &mut self.note,
        }
    }

    fn to_new_lead(&self) -> NewLead {
        NewLead {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            company: self.company.clone(),
            email: self.email.clone(),
            note: self.note.clone(),
        }
    }
}

pub struct LeadEditor {
    token: String,
    pub form: FormState,
    pub focus: Field,
    /// Only drawn and fed keys while active
    pub active: bool,
    /// `None` is create mode. Updating an existing lead is not supported.
    pub target: Option<LeadId>,
    /// Not cleared automatically; stays until the next failure overwrites it
    pub error_message: String,
}

impl LeadEditor {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            form: FormState::default(),
            focus: Field::FirstName,
            active: false,
            target: None,
            error_message: String::new(),
        }
    }

    pub fn open(&mut self, target: Option<LeadId>) {
        self.active = true;
        self.target = target;
        self.focus = Field::FirstName;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        *self.form.get_mut(field) = value.into();
    }

    fn reset_form(&mut self) {
        self.form = FormState::default();
        self.focus = Field::FirstName;
    }

    /// Post the current form as a new lead.
    ///
    /// Returns `Some(Saved)` after a successful create, with the form cleared.
    /// On failure the form is kept as typed, the error message is set and
    /// `None` is returned so the modal stays open for a retry.
    pub async fn submit_create<A: LeadApi + ?Sized>(&mut self, api: &A) -> Option<EditorOutcome> {
        if let Some(target) = &self.target {
            tracing::debug!(lead_id = %target, "update mode is not supported, ignoring submit");
            return None;
        }

        let lead = self.form.to_new_lead();
        match api.create_lead(&self.token, &lead).await {
            Ok(()) => {
                tracing::info!(first_name = %lead.first_name, last_name = %lead.last_name, "lead created");
                self.reset_form();
                Some(EditorOutcome::Saved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "creating lead failed");
                self.error_message = CREATE_FAILED.to_string();
                None
            }
        }
    }

    pub fn cancel(&mut self) -> EditorOutcome {
        self.reset_form();
        EditorOutcome::Cancelled
    }

    /// Handle a key while the modal is active. Returns the outcome once the
    /// editor is finished.
    pub async fn handle_key<A: LeadApi + ?Sized>(&mut self, key: KeyEvent, api: &A) -> Option<EditorOutcome> {
        match key.code {
            KeyCode::Esc => return Some(self.cancel()),
            KeyCode::F(2) => return self.submit_create(api).await,
            KeyCode::Enter => {
                if self.focus == Field::Note {
                    return self.submit_create(api).await;
                }
                self.focus = self.focus.next();
            }
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Backspace => {
                self.form.get_mut(self.focus).pop();
            }
            KeyCode::Char(c) => self.form.get_mut(self.focus).push(c),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{ApiError, Lead};
    use async_trait::async_trait;
    use crossterm::event::KeyModifiers;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// In-memory `LeadApi` that replays queued responses and records calls.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub list_responses: Mutex<VecDeque<Result<Vec<Lead>, StatusCode>>>,
        pub create_responses: Mutex<VecDeque<Result<(), StatusCode>>>,
        pub list_tokens: Mutex<Vec<String>>,
        pub created: Mutex<Vec<(String, NewLead)>>,
    }

    impl FakeApi {
        pub fn push_list(&self, response: Result<Vec<Lead>, StatusCode>) {
            self.list_responses.lock().unwrap().push_back(response);
        }

        pub fn push_create(&self, response: Result<(), StatusCode>) {
            self.create_responses.lock().unwrap().push_back(response);
        }

        pub fn list_calls(&self) -> usize {
            self.list_tokens.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LeadApi for FakeApi {
        async fn list_leads(&self, token: &str) -> Result<Vec<Lead>, ApiError> {
            self.list_tokens.lock().unwrap().push(token.to_string());
            self.list_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(Vec::new()))
                .map_err(ApiError::Status)
        }

        async fn create_lead(&self, token: &str, lead: &NewLead) -> Result<(), ApiError> {
            self.created.lock().unwrap().push((token.to_string(), lead.clone()));
            self.create_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
                .map_err(ApiError::Status)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn filled_editor() -> LeadEditor {
        let mut editor = LeadEditor::new("tok");
        editor.open(None);
        editor.update_field(Field::FirstName, "Ada");
        editor.update_field(Field::LastName, "Lovelace");
        editor.update_field(Field::Company, "Engines");
        editor.update_field(Field::Email, "ada@example.com");
        editor.update_field(Field::Note, "met at conference");
        editor
    }

    #[test]
    fn test_update_field_is_idempotent() {
        let mut once = LeadEditor::new("tok");
        once.update_field(Field::Email, "a@b.c");

        let mut twice = LeadEditor::new("tok");
        twice.update_field(Field::Email, "a@b.c");
        twice.update_field(Field::Email, "a@b.c");

        assert_eq!(once.form, twice.form);
        assert_eq!(twice.form.get(Field::Email), "a@b.c");
    }

    #[tokio::test]
    async fn test_submit_success_clears_form_and_reports_saved() {
        let api = FakeApi::default();
        let mut editor = filled_editor();

        let outcome = editor.submit_create(&api).await;

        assert_eq!(outcome, Some(EditorOutcome::Saved));
        assert_eq!(editor.form, FormState::default());
        let created = api.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, "tok");
        assert_eq!(created[0].1.note, "met at conference");
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_fields_and_sets_error() {
        let api = FakeApi::default();
        api.push_create(Err(StatusCode::INTERNAL_SERVER_ERROR));
        let mut editor = filled_editor();
        let before = editor.form.clone();

        let outcome = editor.submit_create(&api).await;

        assert_eq!(outcome, None);
        assert_eq!(editor.form, before);
        assert_eq!(editor.error_message, CREATE_FAILED);
        assert!(editor.active);
    }

    #[tokio::test]
    async fn test_submit_with_empty_fields_is_not_blocked() {
        let api = FakeApi::default();
        let mut editor = LeadEditor::new("tok");
        editor.open(None);

        assert_eq!(editor.submit_create(&api).await, Some(EditorOutcome::Saved));
        assert_eq!(api.created.lock().unwrap()[0].1, NewLead::default());
    }

    #[tokio::test]
    async fn test_submit_in_update_mode_sends_nothing() {
        let api = FakeApi::default();
        let mut editor = filled_editor();
        editor.open(Some(LeadId::Number(4)));

        assert_eq!(editor.submit_create(&api).await, None);
        assert!(api.created.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_clears_form() {
        let mut editor = filled_editor();

        assert_eq!(editor.cancel(), EditorOutcome::Cancelled);
        assert_eq!(editor.form, FormState::default());
    }

    #[tokio::test]
    async fn test_typing_tabbing_and_enter_on_last_field_submits() {
        let api = FakeApi::default();
        let mut editor = LeadEditor::new("tok");
        editor.open(None);

        for c in "Al".chars() {
            assert_eq!(editor.handle_key(key(KeyCode::Char(c)), &api).await, None);
        }
        editor.handle_key(key(KeyCode::Backspace), &api).await;
        editor.handle_key(key(KeyCode::Char('n')), &api).await;
        editor.handle_key(key(KeyCode::Tab), &api).await;
        editor.handle_key(key(KeyCode::Char('T')), &api).await;
        editor.handle_key(key(KeyCode::BackTab), &api).await;
        assert_eq!(editor.focus, Field::FirstName);

        // Enter walks down to Note, then submits
        for _ in 0..4 {
            assert_eq!(editor.handle_key(key(KeyCode::Enter), &api).await, None);
        }
        assert_eq!(editor.focus, Field::Note);
        let outcome = editor.handle_key(key(KeyCode::Enter), &api).await;

        assert_eq!(outcome, Some(EditorOutcome::Saved));
        let created = api.created.lock().unwrap();
        assert_eq!(created[0].1.first_name, "An");
        assert_eq!(created[0].1.last_name, "T");
    }

    #[tokio::test]
    async fn test_escape_cancels() {
        let api = FakeApi::default();
        let mut editor = filled_editor();

        let outcome = editor.handle_key(key(KeyCode::Esc), &api).await;

        assert_eq!(outcome, Some(EditorOutcome::Cancelled));
        assert!(api.created.lock().unwrap().is_empty());
    }
}
