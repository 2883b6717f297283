//! One renderer for every form screen, driven by [`FormFields`].
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::AppState;
use crate::forms::FormFields;
use crate::ui::components::centered_rect;

pub fn render_form(f: &mut Frame, area: Rect, app: &AppState, title: &str, form: &dyn FormFields, submitting: bool) {
    let labels = form.labels();
    let label_w = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = 72u16.min(area.width.saturating_sub(2)).max(40);
    let height = (labels.len() as u16 * 2 + 5).min(area.height);
    let rect = centered_rect(width, height, area);

    let mut lines: Vec<Line> = Vec::with_capacity(labels.len() * 2 + 2);
    for (idx, label) in labels.iter().enumerate() {
        let focused = idx == form.focus();
        let marker = if focused { "▶ " } else { "  " };
        let raw = form.value(idx);
        let value = if form.is_secret(idx) {
            "*".repeat(raw.chars().count())
        } else {
            raw.to_string()
        };
        let cursor = if focused && !submitting { "_" } else { "" };
        let label_style = if focused {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{label:>label_w$}: "), label_style),
            Span::styled(format!("{value}{cursor}"), Style::default().fg(app.theme.text)),
        ]));

        let note = form.note(idx);
        let note_style = match note {
            "Valid" => Style::default().fg(app.theme.valid),
            "read-only" => Style::default().fg(app.theme.muted).add_modifier(Modifier::ITALIC),
            _ => Style::default().fg(app.theme.invalid),
        };
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(label_w + 4)),
            Span::styled(note.to_string(), note_style),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(if submitting {
        Line::from(Span::styled(
            "Validating...",
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from(Span::styled("Enter: submit   Esc: back", Style::default().fg(app.theme.muted)))
    });

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
