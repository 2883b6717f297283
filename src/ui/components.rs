//! Shared UI components (status bar, keybinds panel, modals).
//!
use std::collections::{BTreeMap, BTreeSet};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode, ModalState};
use crate::store::FetchStatus;

/// Render the bottom status bar with mode, load state and counts.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Form => "FORM",
        InputMode::Modal => "MODAL",
    };
    let fetch = match app.store.status() {
        FetchStatus::Idle => "idle",
        FetchStatus::Pending => "loading",
        FetchStatus::Fulfilled => "loaded",
        FetchStatus::Rejected => "offline",
    };
    let local = app.store.users().iter().filter(|u| u.is_new).count();
    let msg = format!(
        "mode: {mode}  fetch: {fetch}  users:{} (local:{local})  remote total:{}  data: {}",
        app.store.len(),
        app.store.total(),
        app.storage.path().display(),
    );
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Render the right-side keybinds viewer grouped by section.
pub fn render_keybinds_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("Keybindings")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);

    let mut general: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    let mut navigation: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();

    for ((mods, code), action) in app.keymap.all_bindings() {
        let key = Keymap::format_key(mods, code);
        let (section, label) = match action {
            KeyAction::Quit => (&mut general, "Quit"),
            KeyAction::OpenHelp => (&mut general, "Help"),
            KeyAction::StartSearch => (&mut general, "Search"),
            KeyAction::NewUser => (&mut general, "New user"),
            KeyAction::EditSelection => (&mut general, "Edit user"),
            KeyAction::DeleteSelection => (&mut general, "Delete user"),
            KeyAction::Reload => (&mut general, "Reload"),
            KeyAction::ToggleKeybindsPane => (&mut general, "Toggle this pane"),
            KeyAction::MoveUp => (&mut navigation, "Move up"),
            KeyAction::MoveDown => (&mut navigation, "Move down"),
            KeyAction::PrevPage => (&mut navigation, "Previous page"),
            KeyAction::NextPage => (&mut navigation, "Next page"),
            KeyAction::Ignore => continue,
        };
        section.entry(label).or_default().insert(key);
    }

    let contextual = [
        ("Next / previous field", "Tab, Shift+Tab"),
        ("Submit form", "Enter"),
        ("Back / close", "Esc"),
    ];

    let max_label = general
        .keys()
        .chain(navigation.keys())
        .chain(contextual.iter().map(|(l, _)| l))
        .map(|l| l.len())
        .max()
        .unwrap_or(0);
    let sep = " │ ";
    let col1_w = max_label.min((inner.width as usize).saturating_sub(sep.chars().count() + 8));

    let row = |label: &str, value: String| -> Line<'static> {
        let lbl: String = label.chars().take(col1_w).collect();
        Line::from(vec![
            Span::raw(format!("  {lbl:>col1_w$}{sep}")),
            Span::styled(value, Style::default().add_modifier(Modifier::ITALIC)),
        ])
    };
    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)));

    let mut lines: Vec<Line> = vec![heading("General:")];
    for (label, keys) in &general {
        lines.push(row(label, keys.iter().cloned().collect::<Vec<_>>().join(", ")));
    }
    lines.push(Line::raw(""));
    lines.push(heading("Navigation:"));
    for (label, keys) in &navigation {
        lines.push(row(label, keys.iter().cloned().collect::<Vec<_>>().join(", ")));
    }
    lines.push(Line::raw(""));
    lines.push(heading("Forms:"));
    for (label, value) in contextual {
        lines.push(row(label, value.to_string()));
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(block, area);
    f.render_widget(p, inner);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { message } = state {
        let max_w = area.width.saturating_sub(6).max(30);
        let min_w = 44u16.min(max_w);
        let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
        let max_h = area.height.saturating_sub(6).max(5);
        let height = (approx_lines + 4).min(max_h).max(5);
        let rect = centered_rect(min_w, height, area);
        let body = vec![
            Line::raw(message.clone()),
            Line::raw(""),
            Line::from(Span::styled("Enter: OK", Style::default().fg(app.theme.muted))),
        ];
        let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
            Block::default()
                .title("Info")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

pub fn render_delete_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::DeleteConfirm { email, name, selected } = state {
        let rect = centered_rect(56, 7, area);
        let yes = if *selected == 0 { "[Yes]" } else { " Yes " };
        let no = if *selected == 1 { "[No]" } else { " No  " };
        let body = format!("Delete {name} <{email}>?\n\n  {yes}    {no}");
        let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
            Block::default()
                .title("Confirm delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.invalid)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the help modal with usage notes and key tips.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 76u16.min(area.width.saturating_sub(4)).max(50);
    let height = 22u16.min(area.height.saturating_sub(4)).max(12);
    let rect = centered_rect(width, height, area);

    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::ITALIC));
    let bold = |t: &'static str| Line::from(Span::styled(t, Style::default().add_modifier(Modifier::BOLD)));
    let lines: Vec<Line> = vec![
        bold("User list"),
        Line::from(vec![Span::raw("Move: "), key("Up/Down, j/k")]),
        Line::from(vec![Span::raw("Change page: "), key("Left/Right, h/l, PageUp/PageDown")]),
        Line::from(vec![
            Span::raw("Search: "),
            key("/"),
            Span::raw(" then type; filters by name or email as you type"),
        ]),
        Line::from(vec![Span::raw("Add user: "), key("n")]),
        Line::from(vec![Span::raw("Edit selected: "), key("e, Enter")]),
        Line::from(vec![Span::raw("Delete selected: "), key("d, Delete")]),
        Line::from(vec![Span::raw("Fetch again: "), key("r")]),
        Line::from(vec![Span::raw("Keybindings pane: "), key("Shift+K")]),
        Line::from(vec![Span::raw("Quit: "), key("q, Ctrl+C")]),
        Line::raw(""),
        bold("Forms"),
        Line::from(vec![Span::raw("Next / previous field: "), key("Tab, Down / Shift+Tab, Up")]),
        Line::from(vec![Span::raw("Submit: "), key("Enter")]),
        Line::from(vec![Span::raw("Back to the list: "), key("Esc")]),
        Line::raw("Email and phone are checked online before a user is saved."),
        Line::raw("An image can be a URL or a path to a local picture."),
        Line::raw(""),
        Line::raw("Users marked New were created or edited here and are kept"),
        Line::raw("in the local data file between runs."),
        Line::raw(""),
        Line::from(vec![Span::raw("Close help: "), key("Esc / Enter")]),
    ];

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
