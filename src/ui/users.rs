use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use crate::app::AppState;
use crate::forms::image;

pub fn render_users_table(f: &mut Frame, area: Rect, app: &AppState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)].as_ref())
        .split(area);
    let view = app.view();

    let rows = view.rows.iter().map(|u| {
        let badge = if u.is_new {
            Cell::from(Span::styled("New", Style::default().fg(app.theme.badge).add_modifier(Modifier::BOLD)))
        } else {
            Cell::from("")
        };
        Row::new(vec![
            badge,
            Cell::from(u.full_name()),
            Cell::from(u.email.clone()),
            Cell::from(u.phone.clone()),
        ])
        .style(Style::default().fg(app.theme.text))
    });

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(35),
        Constraint::Percentage(40),
        Constraint::Percentage(25),
    ];
    let header = Row::new(vec!["", "NAME", "EMAIL", "PHONE"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let title = if app.store.is_loading() && app.store.is_empty() {
        "Users (loading...)".to_string()
    } else if app.search_query.is_empty() {
        "Users".to_string()
    } else {
        format!("Users matching \"{}\" ({})", app.search_query, view.matched)
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    let mut state = TableState::default();
    if !view.rows.is_empty() {
        state.select(Some(app.selected_index.min(view.rows.len() - 1)));
    }
    f.render_stateful_widget(table, parts[0], &mut state);

    let pager = if view.total_pages == 0 {
        "no users".to_string()
    } else {
        format!("< page {} of {} >", view.page, view.total_pages)
    };
    f.render_widget(
        Paragraph::new(pager).style(Style::default().fg(app.theme.muted)),
        parts[1],
    );
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let label = Style::default().fg(app.theme.muted);
    let lines: Vec<Line> = match app.selected_user() {
        Some(u) => {
            let mut lines = vec![
                Line::from(vec![Span::styled("Name:  ", label), Span::raw(u.full_name())]),
                Line::from(vec![Span::styled("Email: ", label), Span::raw(u.email.clone())]),
                Line::from(vec![Span::styled("Phone: ", label), Span::raw(u.phone.clone())]),
                Line::from(vec![
                    Span::styled("Image: ", label),
                    Span::raw(image::describe(u.image.as_deref())),
                ]),
            ];
            if let Some(id) = u.id {
                lines.push(Line::from(vec![Span::styled("Id:    ", label), Span::raw(id.to_string())]));
            }
            if u.is_new {
                lines.push(Line::raw(""));
                lines.push(Line::from(Span::styled(
                    "Created or edited locally",
                    Style::default().fg(app.theme.badge),
                )));
            }
            lines
        }
        None => vec![Line::from(Span::styled("No user selected", label))],
    };

    let p = Paragraph::new(lines)
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}
