pub mod components;
pub mod forms;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode, ModalState, Screen};

pub fn render(f: &mut Frame, app: &AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    render_header(f, root[0], app);

    let (main, side) = if app.show_keybinds && app.screen == Screen::Users {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(44)].as_ref())
            .split(root[1]);
        (cols[0], Some(cols[1]))
    } else {
        (root[1], None)
    };

    match &app.screen {
        Screen::Login => forms::render_form(f, main, app, "Login", &app.login, app.login.submitting),
        Screen::Users => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
                .split(main);
            users::render_users_table(f, body[0], app);
            users::render_user_details(f, body[1], app);
        }
        Screen::AddUser => {
            if let Some(form) = &app.add_form {
                forms::render_form(f, main, app, "Add user", form, form.submitting);
            }
        }
        Screen::EditUser { email } => {
            if let Some(form) = &app.edit_form {
                let title = format!("Edit user {email}");
                forms::render_form(f, main, app, &title, form, form.submitting);
            }
        }
    }
    if let Some(side) = side {
        components::render_keybinds_panel(f, side, app);
    }

    components::render_status_bar(f, root[2], app);

    if let Some(state) = &app.modal {
        render_modal(f, f.area(), app, state);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let hint = match (&app.screen, app.input_mode) {
        (_, InputMode::Modal) => String::new(),
        (Screen::Users, InputMode::Search) => format!("  Search: {}_  (Enter: keep, Esc: clear)", app.search_query),
        (Screen::Users, _) => "  /: search  n: new  e: edit  d: delete  ?: help  q: quit".to_string(),
        (Screen::Login, _) => "  Tab/Shift-Tab: field  Enter: log in  Ctrl+C: quit".to_string(),
        _ => "  Tab/Shift-Tab: field  Enter: submit  Esc: back".to_string(),
    };
    let p = Paragraph::new(format!("users:{}{}", app.store.len(), hint))
        .block(
            Block::default()
                .title("user-manager")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    match state {
        ModalState::Info { .. } => components::render_info_modal(f, area, app, state),
        ModalState::DeleteConfirm { .. } => components::render_delete_modal(f, area, app, state),
        ModalState::Help { scroll } => components::render_help_modal(f, area, app, *scroll),
    }
}
