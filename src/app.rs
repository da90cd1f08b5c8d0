use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::api::{Lead, LeadApi};
use crate::editor::{EditorOutcome, LeadEditor};
use crate::format::format_updated;

pub const LOAD_FAILED: &str = "Something went wrong!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Editor,
    Help,
}

/// One table row, cells in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRow {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub note: String,
    pub updated: String,
}

impl From<&Lead> for LeadRow {
    fn from(lead: &Lead) -> Self {
        Self {
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            company: lead.company.clone().unwrap_or_default(),
            email: lead.email.clone().unwrap_or_default(),
            note: lead.note.clone().unwrap_or_default(),
            updated: format_updated(&lead.date_last_updated),
        }
    }
}

/// The lead list view: owns the loaded leads and hosts the editor.
pub struct App<A> {
    api: A,
    token: String,

    pub popup: Popup,

    /// `None` until the first successful load
    pub leads: Option<Vec<Lead>>,
    pub loaded: bool,
    pub selected: usize,

    /// Never cleared by a later successful load
    pub error_message: String,
    pub status_message: Option<String>,

    /// Also holds the modal's target lead; `None` is create mode
    pub editor: LeadEditor,
}

impl<A: LeadApi> App<A> {
    pub fn new(api: A, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            editor: LeadEditor::new(token.clone()),
            api,
            token,
            popup: Popup::None,
            leads: None,
            loaded: false,
            selected: 0,
            error_message: String::new(),
            status_message: None,
        }
    }

    pub fn modal_active(&self) -> bool {
        self.popup == Popup::Editor
    }

    /// Fetch all leads once. On failure the current list and `loaded` are
    /// left untouched.
    pub async fn load_leads(&mut self) {
        match self.api.list_leads(&self.token).await {
            Ok(leads) => {
                tracing::info!(count = leads.len(), "leads loaded");
                if self.selected >= leads.len() {
                    self.selected = leads.len().saturating_sub(1);
                }
                self.leads = Some(leads);
                self.loaded = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, "loading leads failed");
                self.error_message = LOAD_FAILED.to_string();
            }
        }
    }

    pub fn open_create_editor(&mut self) {
        tracing::debug!("opening lead editor in create mode");
        self.editor.open(None);
        self.popup = Popup::Editor;
    }

    /// Completion path for both save and cancel. The modal closes only once
    /// the reload has settled.
    pub async fn on_editor_closed(&mut self, outcome: EditorOutcome) {
        tracing::debug!(?outcome, "lead editor closed");
        self.load_leads().await;
        if outcome == EditorOutcome::Saved {
            self.status_message = Some("Lead created".to_string());
        }
        self.editor.close();
        self.popup = Popup::None;
    }

    /// Rows as displayed, empty until the first load
    pub fn rows(&self) -> Vec<LeadRow> {
        self.leads
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(LeadRow::from)
            .collect()
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        match self.popup {
            Popup::Editor => {
                if let Some(outcome) = self.editor.handle_key(key, &self.api).await {
                    self.on_editor_closed(outcome).await;
                }
            }
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q')
                ) {
                    self.popup = Popup::None;
                }
            }
            Popup::None => self.handle_normal_key(key).await,
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('n') => self.open_create_editor(),
            KeyCode::Char('R') => {
                self.status_message = None;
                self.load_leads().await;
            }
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,
            // Update/Delete are shown on every row but do nothing yet
            _ => {}
        }
    }

    /// A left click outside the modal (on the backdrop) cancels it.
    /// `modal` is the area the modal was drawn in.
    pub async fn handle_mouse(&mut self, mouse: MouseEvent, modal: Rect) {
        if !self.modal_active() || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let inside = mouse.column >= modal.x
            && mouse.column < modal.x + modal.width
            && mouse.row >= modal.y
            && mouse.row < modal.y + modal.height;
        if !inside {
            let outcome = self.editor.cancel();
            self.on_editor_closed(outcome).await;
        }
    }

    fn move_down(&mut self) {
        let len = self.leads.as_ref().map(Vec::len).unwrap_or(0);
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    fn move_up(&mut self) {
        let len = self.leads.as_ref().map(Vec::len).unwrap_or(0);
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        }
    }
}
