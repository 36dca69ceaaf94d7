//! # TUI Application State
//!
//! This module defines the core state and logic for the interactive TUI application.
//!
//! Key handling never awaits the network. A key that starts a remote operation
//! returns a [`Job`]; the event loop runs the job on a background task and feeds
//! the resulting [`Done`] back through [`App::apply`]. Each job is stamped with
//! the screen visit it was issued from, so results arriving after the user left
//! that screen are dropped. Upload and re-chunk results are the exception: they
//! always land, and refresh the file list whenever the chat screen is mounted.

use crate::ingest::read_upload_file;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ragfile::documents::{DeleteTicket, RefreshTicket, RefreshTrigger, ViewTicket, Viewer};
use ragfile::ingest::{RechunkTicket, Rechunker, UploadTicket};
use ragfile::navigation::{Navigator, Route};
use ragfile::query::{AskRejected, QueryTicket};
use ragfile::screens::{ChatScreen, HomeScreen};
use ragfile::status::OpStatus;
use ragfile::types::{RechunkReceipt, UploadReceipt};
use ragfile::{ClientError, ConfigField, IngestedFile, QueryResult, RagService};
use std::path::Path;
use tracing::{debug, info};

/// Represents the different input modes for the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// The user is navigating the UI.
    Normal,
    /// A numeric configuration field is being edited.
    Field,
    /// The question box on the chat screen has focus.
    Question,
    /// The user is typing the path of a file to add to the upload selection.
    Path,
}

/// The screen currently mounted.
#[derive(Debug)]
pub enum Screen {
    Home(HomeScreen),
    Chat(Box<ChatScreen>),
}

/// A remote operation to run off the UI loop.
#[derive(Clone, Debug)]
pub enum Effect {
    Upload(UploadTicket),
    Rechunk(RechunkTicket),
    Ask(QueryTicket),
    Refresh(RefreshTicket),
    Delete(DeleteTicket),
    View(ViewTicket),
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Upload(_) => "upload",
            Effect::Rechunk(_) => "rechunk",
            Effect::Ask(_) => "ask",
            Effect::Refresh(_) => "refresh",
            Effect::Delete(_) => "delete",
            Effect::View(_) => "view",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Job {
    pub visit: u64,
    pub effect: Effect,
}

#[derive(Debug)]
pub enum Outcome {
    Upload(UploadTicket, Result<UploadReceipt, ClientError>),
    Rechunk(RechunkTicket, Result<RechunkReceipt, ClientError>),
    Ask(QueryTicket, Result<QueryResult, ClientError>),
    Refresh(RefreshTicket, Result<Vec<IngestedFile>, ClientError>),
    Delete(DeleteTicket, Result<(), ClientError>),
    View(ViewTicket, Result<String, ClientError>),
}

/// The result of a [`Job`], tagged with the visit that issued it.
#[derive(Debug)]
pub struct Done {
    pub visit: u64,
    pub outcome: Outcome,
}

impl Job {
    /// Performs the remote call. Safe to run on any task.
    pub async fn run(self, service: &dyn RagService) -> Done {
        let outcome = match self.effect {
            Effect::Upload(ticket) => {
                let result = service.upload(&ticket.files, ticket.chunk_size).await;
                Outcome::Upload(ticket, result)
            }
            Effect::Rechunk(ticket) => {
                let result = service.rechunk(ticket.chunk_size).await;
                Outcome::Rechunk(ticket, result)
            }
            Effect::Ask(ticket) => {
                let result = service.chat(&ticket.request).await;
                Outcome::Ask(ticket, result)
            }
            Effect::Refresh(ticket) => {
                let result = service.list_files().await;
                Outcome::Refresh(ticket, result)
            }
            Effect::Delete(ticket) => {
                let result = service.delete_file(&ticket.filename).await;
                Outcome::Delete(ticket, result)
            }
            Effect::View(ticket) => {
                let result = service.read_file(&ticket.filename).await;
                Outcome::View(ticket, result)
            }
        };
        Done {
            visit: self.visit,
            outcome,
        }
    }
}

/// The core state for the TUI application.
pub struct App {
    /// `true` if the application is running, `false` to exit.
    pub running: bool,
    pub navigator: Navigator,
    pub screen: Screen,
    /// Incremented on every mount.
    visit: u64,
    /// The home screen's re-chunk slot while another screen is mounted.
    parked_rechunk: Rechunker,
    /// The current input mode.
    pub input_mode: InputMode,
    /// Edit buffer for numeric fields and file paths.
    pub input_text: String,
    /// The focused field on the home screen.
    pub focus: ConfigField,
    /// Row of the highlighted file in the chat screen's file table.
    pub selected_file: usize,
    /// A message to display in the status bar.
    pub status: String,
    /// The service URL, shown in the header.
    pub server_url: String,
}

impl App {
    pub fn new(server_url: &str) -> Self {
        Self {
            running: true,
            navigator: Navigator::new(Route::Home),
            screen: Screen::Home(HomeScreen::new()),
            visit: 0,
            parked_rechunk: Rechunker::new(),
            input_mode: InputMode::Normal,
            input_text: String::new(),
            focus: ConfigField::ChunkSize,
            selected_file: 0,
            status: home_hint().to_string(),
            server_url: server_url.to_string(),
        }
    }

    /// Enters the application through a path, as a bookmark would.
    pub fn open_path(&mut self, path: &str) -> Vec<Job> {
        self.navigator.open_path(path);
        self.mount()
    }

    /// Sets the `running` flag to false to exit the main loop.
    pub fn quit(&mut self) {
        self.running = false;
    }

    fn mount(&mut self) -> Vec<Job> {
        self.visit += 1;
        self.input_mode = InputMode::Normal;
        self.input_text.clear();
        self.selected_file = 0;
        if let Screen::Home(home) = &mut self.screen {
            self.parked_rechunk = std::mem::take(&mut home.rechunk);
        }

        match self.navigator.current() {
            Route::Home => {
                let mut home = HomeScreen::new();
                home.rechunk = std::mem::take(&mut self.parked_rechunk);
                self.screen = Screen::Home(home);
                self.focus = ConfigField::ChunkSize;
                self.status = home_hint().to_string();
                Vec::new()
            }
            Route::Chat => {
                let mut chat = ChatScreen::mount(&mut self.navigator);
                info!(
                    "Chat mounted (visit #{}) with chunk size {}, model {}, {} chunk(s)",
                    self.visit,
                    chat.config().chunk_size,
                    chat.config().model,
                    chat.config().retrieval_depth
                );
                let jobs = chat
                    .documents
                    .begin_refresh(RefreshTrigger::User)
                    .map(|ticket| self.job(Effect::Refresh(ticket)))
                    .into_iter()
                    .collect();
                self.screen = Screen::Chat(Box::new(chat));
                self.status = chat_hint().to_string();
                jobs
            }
        }
    }

    fn job(&self, effect: Effect) -> Job {
        Job {
            visit: self.visit,
            effect,
        }
    }

    // --- Input ---

    /// Handles one key press, returning the remote operations it started.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Job> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return Vec::new();
        }

        match self.input_mode {
            InputMode::Field => {
                self.on_field_key(key);
                Vec::new()
            }
            InputMode::Question => self.on_question_key(key),
            InputMode::Path => {
                self.on_path_key(key);
                Vec::new()
            }
            InputMode::Normal if matches!(self.screen, Screen::Home(_)) => self.on_home_key(key),
            InputMode::Normal => self.on_chat_key(key),
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) -> Vec<Job> {
        let Screen::Home(home) = &mut self.screen else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Tab | KeyCode::Down => self.focus = next_field(self.focus),
            KeyCode::BackTab | KeyCode::Up => self.focus = previous_field(self.focus),
            KeyCode::Left if self.focus == ConfigField::Model => {
                let model = home.store.to_payload().model.previous();
                home.store.set_model(model);
            }
            KeyCode::Right if self.focus == ConfigField::Model => {
                let model = home.store.to_payload().model.next();
                home.store.set_model(model);
            }
            KeyCode::Char(c) if c.is_ascii_digit() && self.focus != ConfigField::Model => {
                self.input_mode = InputMode::Field;
                self.input_text = c.to_string();
            }
            KeyCode::Char('r') => {
                let config = home.store.to_payload();
                match home.rechunk.begin_rechunk(&config) {
                    Some(ticket) => {
                        self.status = format!(
                            "Re-chunking all files with chunk size {}...",
                            ticket.chunk_size
                        );
                        return vec![self.job(Effect::Rechunk(ticket))];
                    }
                    None => self.status = "A re-chunk is already running.".to_string(),
                }
            }
            KeyCode::Enter => {
                home.go_to_chat(&mut self.navigator);
                return self.mount();
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_field_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.input_text.push(c),
            KeyCode::Backspace => {
                self.input_text.pop();
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_text.clear();
                self.status = home_hint().to_string();
            }
            KeyCode::Enter => self.commit_field(),
            KeyCode::Tab => {
                self.commit_field();
                self.focus = next_field(self.focus);
            }
            _ => {}
        }
    }

    /// Applies the edit buffer to the focused field. Invalid input keeps the old value.
    fn commit_field(&mut self) {
        self.input_mode = InputMode::Normal;
        let input = std::mem::take(&mut self.input_text);
        let Screen::Home(home) = &mut self.screen else {
            return;
        };
        self.status = match home.store.set_field(self.focus, &input) {
            Ok(()) => format!(
                "{} set to {}",
                capitalize(self.focus.name()),
                home.store.field_text(self.focus)
            ),
            Err(e) => e.to_string(),
        };
    }

    fn on_chat_key(&mut self, key: KeyEvent) -> Vec<Job> {
        let Screen::Chat(chat) = &mut self.screen else {
            return Vec::new();
        };

        // Popups take every key until they are closed.
        if let Some(filename) = chat.documents.pending_confirmation().map(str::to_string) {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    if let Some(ticket) = chat.documents.confirm_delete() {
                        self.status = format!("Deleting {filename}...");
                        return vec![self.job(Effect::Delete(ticket))];
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    chat.documents.cancel_delete();
                    self.status = chat_hint().to_string();
                }
                _ => {}
            }
            return Vec::new();
        }
        if *chat.documents.viewer() != Viewer::Closed {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')
            ) {
                chat.documents.close_view();
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc => {
                chat.query.abandon();
                self.navigator.navigate(Route::Home, None);
                return self.mount();
            }
            KeyCode::Char('i') => self.input_mode = InputMode::Question,
            KeyCode::Enter => return self.ask(),
            KeyCode::Char('x') => {
                chat.query.abandon();
                chat.query.dismiss();
            }
            KeyCode::Char('a') => {
                self.input_mode = InputMode::Path;
                self.input_text.clear();
                self.status = "Type a file path and press <Enter> to add it.".to_string();
            }
            KeyCode::Char('c') => {
                chat.uploader.clear_selection();
                self.status = chat.uploader.selection_summary();
            }
            KeyCode::Char('u') => {
                let chunk_size = chat.config().chunk_size;
                match chat.uploader.begin_upload(chunk_size) {
                    Some(ticket) => {
                        self.status = format!("Uploading {} file(s)...", ticket.files.len());
                        return vec![self.job(Effect::Upload(ticket))];
                    }
                    None if chat.uploader.selection().is_empty() => {
                        self.status = "Add files with 'a' before uploading.".to_string();
                    }
                    None => self.status = "An upload is already running.".to_string(),
                }
            }
            KeyCode::Char('f') => {
                if let Some(ticket) = chat.documents.begin_refresh(RefreshTrigger::User) {
                    self.status = "Refreshing files...".to_string();
                    return vec![self.job(Effect::Refresh(ticket))];
                }
            }
            KeyCode::Up => self.selected_file = self.selected_file.saturating_sub(1),
            KeyCode::Down => {
                if self.selected_file + 1 < chat.documents.files().len() {
                    self.selected_file += 1;
                }
            }
            KeyCode::Char('v') => {
                if let Some(file) = chat.documents.files().get(self.selected_file) {
                    let filename = file.filename.clone();
                    let ticket = chat.documents.begin_view(&filename);
                    return vec![self.job(Effect::View(ticket))];
                }
            }
            KeyCode::Char('d') => {
                if let Some(file) = chat.documents.files().get(self.selected_file) {
                    let filename = file.filename.clone();
                    if !chat.documents.request_delete(&filename) {
                        self.status = "A delete is already running.".to_string();
                    }
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_question_key(&mut self, key: KeyEvent) -> Vec<Job> {
        let Screen::Chat(chat) = &mut self.screen else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Char(c) => chat.query.question_mut().push(c),
            KeyCode::Backspace => {
                chat.query.question_mut().pop();
            }
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                return self.ask();
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_path_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.input_text.push(c),
            KeyCode::Backspace => {
                self.input_text.pop();
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_text.clear();
                self.status = chat_hint().to_string();
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let path = std::mem::take(&mut self.input_text);
                let Screen::Chat(chat) = &mut self.screen else {
                    return;
                };
                self.status = match read_upload_file(Path::new(path.trim())) {
                    Ok(file) => {
                        chat.uploader.add(file);
                        chat.uploader.selection_summary()
                    }
                    Err(e) => format!("{e:#}"),
                };
            }
            _ => {}
        }
    }

    fn ask(&mut self) -> Vec<Job> {
        let Screen::Chat(chat) = &mut self.screen else {
            return Vec::new();
        };
        match chat.query.begin_ask() {
            Ok(ticket) => {
                self.status = "Thinking...".to_string();
                vec![self.job(Effect::Ask(ticket))]
            }
            Err(AskRejected::EmptyQuestion) => {
                self.status = "Type a question first (press 'i').".to_string();
                Vec::new()
            }
            Err(AskRejected::InFlight) => {
                self.status = "Still waiting for the previous answer.".to_string();
                Vec::new()
            }
        }
    }

    // --- Results ---

    /// Applies a finished job, returning any follow-up jobs.
    pub fn apply(&mut self, done: Done) -> Vec<Job> {
        let follow_up = match done.outcome {
            Outcome::Rechunk(ticket, result) => self.apply_rechunk(&ticket, result),
            Outcome::Upload(ticket, result) => self.apply_upload(done.visit, &ticket, result),
            outcome if done.visit == self.visit => self.apply_to_screen(outcome),
            _ => {
                debug!(
                    "Dropping result from visit #{} (current is #{})",
                    done.visit, self.visit
                );
                None
            }
        };

        follow_up
            .map(|ticket| self.job(Effect::Refresh(ticket)))
            .into_iter()
            .collect()
    }

    fn apply_rechunk(
        &mut self,
        ticket: &RechunkTicket,
        result: Result<RechunkReceipt, ClientError>,
    ) -> Option<RefreshTicket> {
        let rechunker = match &mut self.screen {
            Screen::Home(home) => &mut home.rechunk,
            Screen::Chat(_) => &mut self.parked_rechunk,
        };
        let changed = rechunker.complete_rechunk(ticket, result);
        if let Some(message) = describe(rechunker.status()) {
            self.status = message;
        }
        if changed {
            self.refresh_after_mutation()
        } else {
            None
        }
    }

    fn apply_upload(
        &mut self,
        visit: u64,
        ticket: &UploadTicket,
        result: Result<UploadReceipt, ClientError>,
    ) -> Option<RefreshTicket> {
        if visit == self.visit {
            if let Screen::Chat(chat) = &mut self.screen {
                let applied = chat.uploader.complete_upload(ticket, result);
                if let Some(message) = describe(chat.uploader.status()) {
                    self.status = message;
                }
                return if applied {
                    chat.documents.begin_refresh(RefreshTrigger::AfterMutation)
                } else {
                    None
                };
            }
        }

        // Issued from an earlier chat visit whose selection is gone.
        match result {
            Ok(receipt) => {
                info!(
                    "[upload] {} file(s) accepted after visit #{visit} ended",
                    receipt.uploaded_count
                );
                self.status = format!("Uploaded {} files successfully", receipt.uploaded_count);
                self.refresh_after_mutation()
            }
            Err(e) => {
                self.status = format!("Upload failed: {e}");
                None
            }
        }
    }

    /// Chunk counts changed on the server. Home has no list; the next chat mount loads one.
    fn refresh_after_mutation(&mut self) -> Option<RefreshTicket> {
        match &mut self.screen {
            Screen::Chat(chat) => chat.documents.begin_refresh(RefreshTrigger::AfterMutation),
            Screen::Home(_) => None,
        }
    }

    fn apply_to_screen(&mut self, outcome: Outcome) -> Option<RefreshTicket> {
        let Screen::Chat(chat) = &mut self.screen else {
            debug!("Result does not belong to the mounted screen");
            return None;
        };
        match outcome {
            Outcome::Ask(ticket, result) => {
                if chat.query.complete(&ticket, result) {
                    self.status = chat_hint().to_string();
                }
            }
            Outcome::Refresh(ticket, result) => {
                if chat.documents.complete_refresh(&ticket, result) {
                    let count = chat.documents.files().len();
                    self.selected_file = self.selected_file.min(count.saturating_sub(1));
                    if let Some(message) = chat.documents.refresh_status().error() {
                        self.status = message.to_string();
                    }
                }
            }
            Outcome::Delete(ticket, result) => {
                let follow_up = chat.documents.complete_delete(&ticket, result);
                if let Some(message) = describe(chat.documents.delete_status()) {
                    self.status = message;
                }
                return follow_up;
            }
            Outcome::View(ticket, result) => {
                chat.documents.complete_view(&ticket, result);
            }
            Outcome::Upload(..) | Outcome::Rechunk(..) => {}
        }
        None
    }
}

fn describe(status: &OpStatus<String>) -> Option<String> {
    match status {
        OpStatus::Succeeded(message) | OpStatus::Failed(message) => Some(message.clone()),
        _ => None,
    }
}

fn next_field(field: ConfigField) -> ConfigField {
    let i = ConfigField::ALL.iter().position(|f| *f == field).unwrap_or(0);
    ConfigField::ALL[(i + 1) % ConfigField::ALL.len()]
}

fn previous_field(field: ConfigField) -> ConfigField {
    let i = ConfigField::ALL.iter().position(|f| *f == field).unwrap_or(0);
    ConfigField::ALL[(i + ConfigField::ALL.len() - 1) % ConfigField::ALL.len()]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn home_hint() -> &'static str {
    "<Tab> next field, digits edit, <←/→> model, 'r' re-chunk, <Enter> chat, 'q' quit"
}

fn chat_hint() -> &'static str {
    "'i' ask, 'a' add file, 'u' upload, 'f' refresh, 'v' view, 'd' delete, <Esc> home"
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragfile::query::QueryStatus;
    use ragfile::LlmModel;
    use ragfile_test_utils::{setup_tracing, Call, MockRagService};
    use std::io::Write;

    fn press(app: &mut App, code: KeyCode) -> Vec<Job> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(press(app, KeyCode::Char(c)).is_empty());
        }
    }

    /// Runs jobs one after another, as the event loop would, including follow-ups.
    async fn drain(app: &mut App, mut jobs: Vec<Job>, service: &MockRagService) {
        while let Some(job) = jobs.pop() {
            let done = job.run(service).await;
            jobs.extend(app.apply(done));
        }
    }

    fn chat(app: &App) -> &ChatScreen {
        match &app.screen {
            Screen::Chat(chat) => chat,
            other => panic!("Expected the chat screen, but got {other:?}"),
        }
    }

    #[test]
    fn test_home_edits_are_handed_to_chat() {
        // --- 1. Arrange ---
        let mut app = App::new("http://localhost:8000");

        // --- 2. Act ---
        type_text(&mut app, "900");
        assert!(press(&mut app, KeyCode::Enter).is_empty());
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "12");
        press(&mut app, KeyCode::Enter);
        let jobs = press(&mut app, KeyCode::Enter);

        // --- 3. Assert ---
        assert_eq!(app.navigator.current(), Route::Chat);
        let config = chat(&app).config();
        assert_eq!(config.chunk_size, 900);
        assert_eq!(config.model, LlmModel::Llama2);
        assert_eq!(config.retrieval_depth, 12);
        assert!(matches!(
            jobs.as_slice(),
            [Job {
                effect: Effect::Refresh(_),
                ..
            }]
        ));
    }

    #[test]
    fn test_out_of_range_edit_keeps_previous_value() {
        let mut app = App::new("http://localhost:8000");
        type_text(&mut app, "10");
        press(&mut app, KeyCode::Enter);

        assert!(app.status.contains("between 50 and 2000"));
        match &app.screen {
            Screen::Home(home) => assert_eq!(home.store.field_text(ConfigField::ChunkSize), "500"),
            other => panic!("Expected the home screen, but got {other:?}"),
        }
    }

    #[test]
    fn test_direct_entry_uses_defaults() {
        let mut app = App::new("http://localhost:8000");
        let jobs = app.open_path("/chat");
        assert_eq!(jobs.len(), 1);
        assert_eq!(chat(&app).config().chunk_size, 500);
        assert_eq!(chat(&app).config().model, LlmModel::TinyLlama);
    }

    #[test]
    fn test_second_submit_while_waiting_starts_nothing() {
        let mut app = App::new("http://localhost:8000");
        app.open_path("/chat");

        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "hello");
        let first = press(&mut app, KeyCode::Enter);
        let second = press(&mut app, KeyCode::Enter);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(app.status, "Still waiting for the previous answer.");
        assert_eq!(chat(&app).query.status(), &QueryStatus::Submitting);
    }

    #[test]
    fn test_empty_question_is_not_sent() {
        let mut app = App::new("http://localhost:8000");
        app.open_path("/chat");
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "   ");
        assert!(press(&mut app, KeyCode::Enter).is_empty());
        assert_eq!(chat(&app).query.status(), &QueryStatus::Idle);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation_then_reloads() {
        // --- 1. Arrange ---
        setup_tracing();
        let service = MockRagService::new();
        service.seed_file("a.txt", "alpha", 500);
        service.seed_file("b.txt", "beta", 500);
        let mut app = App::new("http://localhost:8000");
        let jobs = app.open_path("/chat");
        drain(&mut app, jobs, &service).await;
        assert_eq!(chat(&app).documents.files().len(), 2);

        // --- 2. Act ---
        assert!(press(&mut app, KeyCode::Char('d')).is_empty());
        assert_eq!(chat(&app).documents.pending_confirmation(), Some("a.txt"));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(chat(&app).documents.pending_confirmation(), None);

        press(&mut app, KeyCode::Char('d'));
        let jobs = press(&mut app, KeyCode::Char('y'));
        drain(&mut app, jobs, &service).await;

        // --- 3. Assert ---
        let files = chat(&app).documents.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "b.txt");
        assert_eq!(app.status, "Deleted a.txt");
        let calls = service.get_calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[Call::DeleteFile("a.txt".to_string()), Call::ListFiles]
        );
    }

    #[tokio::test]
    async fn test_results_from_a_previous_visit_are_dropped() {
        setup_tracing();
        let service = MockRagService::new();
        let mut app = App::new("http://localhost:8000");
        app.open_path("/chat");

        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "what changed?");
        let mut jobs = press(&mut app, KeyCode::Enter);
        let ask = jobs.pop().unwrap();

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Enter);

        let done = ask.run(&service).await;
        assert!(app.apply(done).is_empty());
        assert_eq!(chat(&app).query.status(), &QueryStatus::Idle);
    }

    #[tokio::test]
    async fn test_add_path_then_upload_refreshes_list() {
        setup_tracing();
        let service = MockRagService::new();
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all("x".repeat(1200).as_bytes()).unwrap();

        let mut app = App::new("http://localhost:8000");
        let jobs = app.open_path("/chat");
        drain(&mut app, jobs, &service).await;

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, file.path().to_str().unwrap());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status, "1 file(s) selected");

        let jobs = press(&mut app, KeyCode::Char('u'));
        drain(&mut app, jobs, &service).await;

        assert_eq!(app.status, "Uploaded 1 files successfully");
        assert!(chat(&app).uploader.selection().is_empty());
        assert_eq!(chat(&app).documents.files()[0].chunk_count, 3);
    }

    #[tokio::test]
    async fn test_rechunk_from_home() {
        setup_tracing();
        let service = MockRagService::new();
        let mut app = App::new("http://localhost:8000");
        type_text(&mut app, "800");
        press(&mut app, KeyCode::Enter);

        let jobs = press(&mut app, KeyCode::Char('r'));
        assert!(press(&mut app, KeyCode::Char('r')).is_empty());
        drain(&mut app, jobs, &service).await;

        assert_eq!(app.status, "Re-chunked all files with chunk size 800");
        assert_eq!(service.get_calls(), vec![Call::Rechunk { chunk_size: 800 }]);
    }

    #[tokio::test]
    async fn test_rechunk_finishing_after_entering_chat_reloads_counts() {
        // --- 1. Arrange ---
        setup_tracing();
        let service = MockRagService::new();
        service.seed_file("a.txt", &"x".repeat(1000), 500);
        let mut app = App::new("http://localhost:8000");
        type_text(&mut app, "100");
        press(&mut app, KeyCode::Enter);
        let rechunk = press(&mut app, KeyCode::Char('r')).pop().unwrap();

        // --- 2. Act ---
        let jobs = press(&mut app, KeyCode::Enter);
        drain(&mut app, jobs, &service).await;
        assert_eq!(chat(&app).documents.files()[0].chunk_count, 2);

        let done = rechunk.run(&service).await;
        let jobs = app.apply(done);
        assert_eq!(jobs.len(), 1);
        drain(&mut app, jobs, &service).await;

        // --- 3. Assert ---
        assert_eq!(chat(&app).documents.files()[0].chunk_count, 10);
        assert_eq!(app.status, "Re-chunked all files with chunk size 100");
        assert_eq!(service.get_calls().last(), Some(&Call::ListFiles));
    }

    #[tokio::test]
    async fn test_rechunk_guard_survives_a_chat_visit() {
        setup_tracing();
        let service = MockRagService::new();
        let mut app = App::new("http://localhost:8000");

        let first = press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        let second = press(&mut app, KeyCode::Char('r'));

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(app.status, "A re-chunk is already running.");

        drain(&mut app, first, &service).await;
        assert_eq!(app.status, "Re-chunked all files with chunk size 500");
        assert_eq!(press(&mut app, KeyCode::Char('r')).len(), 1);
    }

    #[tokio::test]
    async fn test_upload_finishing_on_a_later_visit_reloads_list() {
        // --- 1. Arrange ---
        setup_tracing();
        let service = MockRagService::new();
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all("x".repeat(1200).as_bytes()).unwrap();

        let mut app = App::new("http://localhost:8000");
        let jobs = app.open_path("/chat");
        drain(&mut app, jobs, &service).await;
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, file.path().to_str().unwrap());
        press(&mut app, KeyCode::Enter);
        let upload = press(&mut app, KeyCode::Char('u')).pop().unwrap();

        // --- 2. Act ---
        press(&mut app, KeyCode::Esc);
        let jobs = press(&mut app, KeyCode::Enter);
        drain(&mut app, jobs, &service).await;
        assert!(chat(&app).documents.files().is_empty());

        let done = upload.run(&service).await;
        let jobs = app.apply(done);
        drain(&mut app, jobs, &service).await;

        // --- 3. Assert ---
        assert_eq!(app.status, "Uploaded 1 files successfully");
        assert_eq!(chat(&app).documents.files().len(), 1);
        assert_eq!(chat(&app).documents.files()[0].chunk_count, 3);
    }
}
