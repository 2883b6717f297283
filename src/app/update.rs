//! Event loop and key handling.
//!
//! Network work runs on the tokio runtime; results come back as [`AppEvent`]s
//! through a channel and are applied here, on the UI thread, so the store and
//! forms only ever change in one place.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::api::UserApi;
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState, Screen};
use crate::error::{self, DynError};
use crate::forms::FormError;
use crate::forms::FormFields;
use crate::forms::add::{self, AddCommit, AddUserForm, AddVerdict, NewUserDraft};
use crate::forms::edit::{self, EditDraft, EditUserForm};
use crate::forms::login::LOGIN_DELAY;
use crate::model::{PhoneCheck, UserPage};
use crate::store::UserAction;
use crate::ui;

pub const VALIDATION_FAILED: &str = "Validation failed. Please try again.";
pub const LOGIN_SUCCESSFUL: &str = "Login Successful!";

/// Results of background work, applied by [`apply_event`].
#[derive(Debug)]
pub enum AppEvent {
    UsersFetched(std::result::Result<UserPage, DynError>),
    AddVerified {
        ticket: u64,
        draft: NewUserDraft,
        result: std::result::Result<AddVerdict, DynError>,
    },
    EditVerified {
        ticket: u64,
        draft: EditDraft,
        result: std::result::Result<PhoneCheck, DynError>,
    },
    LoginAccepted,
}

/// Spawns background work and collects its results.
pub struct Tasks {
    handle: Handle,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
}

impl Tasks {
    pub fn new(handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { handle, tx, rx }
    }

    pub fn try_recv(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next result. Used by tests and headless drivers.
    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    pub fn fetch_users(&self, api: Arc<dyn UserApi>, limit: usize) {
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = api.fetch_users(limit, 0).await;
            let _ = tx.send(AppEvent::UsersFetched(result));
        });
    }

    pub fn verify_new_user(&self, api: Arc<dyn UserApi>, ticket: u64, draft: NewUserDraft) {
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = add::verify(api.as_ref(), &draft).await;
            let _ = tx.send(AppEvent::AddVerified { ticket, draft, result });
        });
    }

    pub fn verify_edit(&self, api: Arc<dyn UserApi>, ticket: u64, draft: EditDraft) {
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = edit::verify(api.as_ref(), &draft).await;
            let _ = tx.send(AppEvent::EditVerified { ticket, draft, result });
        });
    }

    pub fn login_delay(&self) {
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            tokio::time::sleep(LOGIN_DELAY).await;
            let _ = tx.send(AppEvent::LoginAccepted);
        });
    }
}

/// Merge the local slot into the store and request the remote listing.
pub fn start(app: &mut AppState, tasks: &Tasks) {
    let restored = app.storage.reconcile(&mut app.store);
    info!(restored, path = %app.storage.path().display(), "local users restored");
    request_users(app, tasks);
}

fn request_users(app: &mut AppState, tasks: &Tasks) {
    if app.store.is_loading() {
        return;
    }
    app.store.dispatch(UserAction::FetchPending);
    tasks.fetch_users(Arc::clone(&app.api), app.fetch_limit);
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut AppState,
    tasks: &mut Tasks,
) -> Result<()> {
    start(app, tasks);

    loop {
        while let Some(ev) = tasks.try_recv() {
            apply_event(app, ev);
        }

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(app, tasks, key) {
                    break;
                }
            }
        }
    }
    info!(uptime_secs = app.started_at.elapsed().as_secs(), "exiting");
    Ok(())
}

/// Apply one background result to the state.
pub fn apply_event(app: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::UsersFetched(Ok(page)) => {
            info!(received = page.users.len(), total = page.total, "users fetched");
            app.store.dispatch(UserAction::FetchFulfilled(page));
            app.clamp_selection();
        }
        AppEvent::UsersFetched(Err(e)) => {
            warn!(error = %error::root_cause(e.as_ref()), "fetching users failed");
            app.store.dispatch(UserAction::FetchRejected(e.to_string()));
        }
        AppEvent::AddVerified { ticket, draft, result } => on_add_verified(app, ticket, draft, result),
        AppEvent::EditVerified { ticket, draft, result } => on_edit_verified(app, ticket, draft, result),
        AppEvent::LoginAccepted => {
            if app.screen != Screen::Login || !app.login.submitting {
                debug!("login accepted after leaving the login screen");
                return;
            }
            app.login.submitting = false;
            app.show_list();
            app.alert(LOGIN_SUCCESSFUL);
        }
    }
}

fn on_add_verified(
    app: &mut AppState,
    ticket: u64,
    draft: NewUserDraft,
    result: std::result::Result<AddVerdict, DynError>,
) {
    // A verdict only belongs to the submission that asked for it
    let Some(form) = app.add_form.as_mut().filter(|f| f.submitting && f.ticket == ticket) else {
        debug!(email = %draft.email, ticket, "dropping verdict for a closed add form");
        return;
    };
    let verdict = match result {
        Ok(v) => v,
        Err(e) => {
            form.abort_submit();
            warn!(error = %error::root_cause(e.as_ref()), "add validation request failed");
            app.alert(VALIDATION_FAILED);
            return;
        }
    };
    if !form.finish_submit(&verdict) {
        debug!(email_ok = verdict.email.is_valid(), phone_ok = verdict.phone.valid, "add rejected");
        return;
    }
    match add::commit_new_user(draft, &mut app.store, &app.storage) {
        Ok(AddCommit::Added(_)) => {
            app.show_list();
            app.alert("User added successfully!");
        }
        Ok(AddCommit::Duplicate) => app.alert("A user with this email already exists."),
        Err(e) => {
            // The store already holds the user; only the file write failed
            error!(error = %e, "saving added user failed");
            app.show_list();
            app.alert(format!("User added, but saving failed: {e}"));
        }
    }
}

fn on_edit_verified(
    app: &mut AppState,
    ticket: u64,
    draft: EditDraft,
    result: std::result::Result<PhoneCheck, DynError>,
) {
    let Some(form) = app.edit_form.as_mut().filter(|f| f.submitting && f.ticket == ticket) else {
        debug!(email = %draft.original_email, ticket, "dropping verdict for a closed edit form");
        return;
    };
    let check = match result {
        Ok(c) => c,
        Err(e) => {
            form.abort_submit();
            warn!(error = %error::root_cause(e.as_ref()), "edit validation request failed");
            app.alert(VALIDATION_FAILED);
            return;
        }
    };
    if !form.finish_submit(&check) {
        app.alert("Phone number is not valid.");
        return;
    }
    match edit::commit_edit(draft, &mut app.store, &app.storage) {
        Ok(_) => {
            app.show_list();
            app.alert("User updated successfully!");
        }
        Err(e) => {
            error!(error = %e, "saving edited user failed");
            app.show_list();
            app.alert(format!("User updated, but saving failed: {e}"));
        }
    }
}

/// Handle one key press. Returns `false` when the app should exit.
pub fn handle_key(app: &mut AppState, tasks: &Tasks, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        return false;
    }
    match app.input_mode {
        InputMode::Modal => handle_modal_key(app, key),
        InputMode::Search => handle_search_key(app, key),
        InputMode::Form => handle_form_key(app, tasks, key),
        InputMode::Normal => return handle_list_key(app, tasks, key),
    }
    true
}

fn handle_list_key(app: &mut AppState, tasks: &Tasks, key: KeyEvent) -> bool {
    let Some(action) = app.keymap.resolve(&key) else {
        return true;
    };
    let view = app.view();
    let (rows, total_pages) = (view.rows.len(), view.total_pages);
    match action {
        KeyAction::Quit => return false,
        KeyAction::Ignore => {}
        KeyAction::OpenHelp => {
            app.modal = Some(ModalState::Help { scroll: 0 });
            app.input_mode = InputMode::Modal;
        }
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::NewUser => {
            app.add_form = Some(AddUserForm::new());
            app.go_to(Screen::AddUser);
        }
        KeyAction::EditSelection => open_edit(app),
        KeyAction::DeleteSelection => {
            if let Some(u) = app.selected_user() {
                app.modal = Some(ModalState::DeleteConfirm {
                    email: u.email.clone(),
                    name: u.full_name(),
                    selected: 1,
                });
                app.input_mode = InputMode::Modal;
            }
        }
        KeyAction::Reload => request_users(app, tasks),
        KeyAction::ToggleKeybindsPane => app.show_keybinds = !app.show_keybinds,
        KeyAction::MoveUp => app.selected_index = app.selected_index.saturating_sub(1),
        KeyAction::MoveDown => {
            if app.selected_index + 1 < rows {
                app.selected_index += 1;
            }
        }
        KeyAction::PrevPage => {
            if app.current_page > 1 {
                app.current_page -= 1;
                app.selected_index = 0;
            }
        }
        KeyAction::NextPage => {
            if app.current_page < total_pages {
                app.current_page += 1;
                app.selected_index = 0;
            }
        }
    }
    true
}

fn open_edit(app: &mut AppState) {
    let Some(email) = app.selected_user().map(|u| u.email.clone()) else {
        return;
    };
    match EditUserForm::load(&email, &app.storage, &app.store) {
        Some(form) => {
            app.edit_form = Some(form);
            app.go_to(Screen::EditUser { email });
        }
        None => app.alert("User not found."),
    }
}

fn handle_search_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.selected_index = 0;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.search_query.pop();
            app.selected_index = 0;
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.selected_index = 0;
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) {
    let Some(modal) = app.modal.clone() else {
        app.input_mode = app.base_mode();
        return;
    };
    match modal {
        ModalState::Info { .. } => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q')) {
                app.close_modal();
            }
        }
        ModalState::Help { scroll } => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => app.close_modal(),
            KeyCode::Up | KeyCode::Char('k') => {
                app.modal = Some(ModalState::Help { scroll: scroll.saturating_sub(1) });
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.modal = Some(ModalState::Help { scroll: scroll.saturating_add(1) });
            }
            _ => {}
        },
        ModalState::DeleteConfirm { email, name, selected } => match key.code {
            KeyCode::Esc | KeyCode::Char('n') => app.close_modal(),
            KeyCode::Char('y') => delete_user(app, &email),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                app.modal = Some(ModalState::DeleteConfirm { email, name, selected: 1 - selected.min(1) });
            }
            KeyCode::Enter if selected == 0 => delete_user(app, &email),
            KeyCode::Enter => app.close_modal(),
            _ => {}
        },
    }
}

/// Remove the user from the list and the local slot, then report.
pub fn delete_user(app: &mut AppState, email: &str) {
    app.store.dispatch(UserAction::Remove { email: email.to_string() });
    if app.current_page > app.view().total_pages {
        app.current_page = app.current_page.saturating_sub(1).max(1);
    }
    app.clamp_selection();
    match app.storage.record_removed(email) {
        Ok(()) => {
            info!(email, "user deleted");
            app.alert("User deleted successfully!");
        }
        Err(e) => {
            error!(email, error = %e, "removing user from local file failed");
            app.alert(format!("User deleted, but saving failed: {e}"));
        }
    }
}

fn handle_form_key(app: &mut AppState, tasks: &Tasks, key: KeyEvent) {
    match app.screen {
        Screen::Login => {
            if key.code == KeyCode::Enter {
                if app.login.submit() {
                    tasks.login_delay();
                }
            } else {
                edit_fields(&mut app.login, key);
            }
        }
        Screen::AddUser => {
            let Some(form) = app.add_form.as_mut() else {
                return app.show_list();
            };
            match key.code {
                KeyCode::Esc => app.show_list(),
                KeyCode::Enter => match form.begin_submit() {
                    Ok(draft) => {
                        app.last_ticket += 1;
                        form.ticket = app.last_ticket;
                        tasks.verify_new_user(Arc::clone(&app.api), form.ticket, draft);
                    }
                    Err(e) => report_form_error(app, e),
                },
                _ => edit_fields(form, key),
            }
        }
        Screen::EditUser { .. } => {
            let Some(form) = app.edit_form.as_mut() else {
                return app.show_list();
            };
            match key.code {
                KeyCode::Esc => app.show_list(),
                KeyCode::Enter => match form.begin_submit() {
                    Ok(draft) => {
                        app.last_ticket += 1;
                        form.ticket = app.last_ticket;
                        tasks.verify_edit(Arc::clone(&app.api), form.ticket, draft);
                    }
                    Err(e) => report_form_error(app, e),
                },
                _ => edit_fields(form, key),
            }
        }
        Screen::Users => app.input_mode = InputMode::Normal,
    }
}

fn report_form_error(app: &mut AppState, e: FormError) {
    match e {
        FormError::AlreadySubmitting => debug!("submit ignored while validating"),
        other => app.alert(other.to_string()),
    }
}

fn edit_fields<F: FormFields>(form: &mut F, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.insert_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmailCheck, User};
    use crate::storage::LocalStore;
    use async_trait::async_trait;

    struct NoApi;

    #[async_trait]
    impl UserApi for NoApi {
        async fn fetch_users(&self, _limit: usize, _skip: usize) -> crate::error::Result<UserPage> {
            Err(crate::error::simple_error("offline"))
        }
        async fn validate_email(&self, _email: &str) -> crate::error::Result<EmailCheck> {
            Err(crate::error::simple_error("offline"))
        }
        async fn validate_phone(&self, _phone: &str) -> crate::error::Result<PhoneCheck> {
            Err(crate::error::simple_error("offline"))
        }
    }

    fn user(i: usize) -> User {
        User {
            id: Some(i as u64),
            first_name: format!("First{i}"),
            last_name: format!("Last{i}"),
            email: format!("u{i}@x.io"),
            phone: "1".into(),
            image: None,
            is_new: false,
        }
    }

    fn app_with(n: usize, dir: &tempfile::TempDir) -> AppState {
        let mut app = AppState::new(
            Arc::new(NoApi),
            LocalStore::new(dir.path().join("users.json")),
            Screen::Users,
        );
        app.store.dispatch(UserAction::FetchFulfilled(UserPage {
            users: (0..n).map(user).collect(),
            total: n as u64,
        }));
        app
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn paging_stops_at_both_ends() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(25, &dir);
        let tasks = Tasks::new(Handle::current());
        handle_key(&mut app, &tasks, press(KeyCode::Left));
        assert_eq!(app.current_page, 1);
        for _ in 0..5 {
            handle_key(&mut app, &tasks, press(KeyCode::Right));
        }
        assert_eq!(app.current_page, 3);
        assert_eq!(app.view().rows.len(), 5);
    }

    #[tokio::test]
    async fn search_keys_edit_query_and_escape_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(12, &dir);
        let tasks = Tasks::new(Handle::current());
        handle_key(&mut app, &tasks, press(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);
        for c in "first1".chars() {
            handle_key(&mut app, &tasks, press(KeyCode::Char(c)));
        }
        // First1, First10, First11
        assert_eq!(app.view().matched, 3);
        handle_key(&mut app, &tasks, press(KeyCode::Esc));
        assert!(app.search_query.is_empty());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn delete_confirm_defaults_to_no() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(3, &dir);
        let tasks = Tasks::new(Handle::current());
        handle_key(&mut app, &tasks, press(KeyCode::Delete));
        handle_key(&mut app, &tasks, press(KeyCode::Enter));
        assert_eq!(app.store.len(), 3);
        assert!(app.modal.is_none());

        handle_key(&mut app, &tasks, press(KeyCode::Delete));
        handle_key(&mut app, &tasks, press(KeyCode::Left));
        handle_key(&mut app, &tasks, press(KeyCode::Enter));
        assert_eq!(app.store.len(), 2);
        assert!(!app.store.contains_email("u0@x.io"));
        assert_eq!(
            app.modal,
            Some(ModalState::Info { message: "User deleted successfully!".into() })
        );
    }

    #[tokio::test]
    async fn failed_fetch_leaves_local_users() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(2, &dir);
        let mut tasks = Tasks::new(Handle::current());
        request_users(&mut app, &tasks);
        assert!(app.store.is_loading());
        let ev = tasks.recv().await.unwrap();
        apply_event(&mut app, ev);
        assert!(!app.store.is_loading());
        assert_eq!(app.store.len(), 2);
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn verdict_for_closed_form_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(1, &dir);
        let draft = NewUserDraft {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.co".into(),
            phone: "1".into(),
            image: "https://img/a".into(),
        };
        let verdict = AddVerdict {
            email: EmailCheck { valid_format: true, mx_found: true },
            phone: PhoneCheck { valid: true },
        };
        apply_event(&mut app, AppEvent::AddVerified { ticket: 1, draft, result: Ok(verdict) });
        assert_eq!(app.store.len(), 1);
    }

    #[tokio::test]
    async fn validation_error_shows_alert_and_reenables_submit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(0, &dir);
        let mut tasks = Tasks::new(Handle::current());
        handle_key(&mut app, &tasks, press(KeyCode::Char('n')));
        let form = app.add_form.as_mut().unwrap();
        form.first_name = "A".into();
        form.last_name = "B".into();
        form.email = "a@b.co".into();
        form.phone = "1".into();
        form.image_source = "https://img/a".into();
        handle_key(&mut app, &tasks, press(KeyCode::Enter));
        assert!(app.add_form.as_ref().unwrap().submitting);

        let ev = tasks.recv().await.unwrap();
        apply_event(&mut app, ev);
        assert_eq!(app.modal, Some(ModalState::Info { message: VALIDATION_FAILED.into() }));
        assert!(!app.add_form.as_ref().unwrap().submitting);
        assert!(app.store.is_empty());
    }
}
