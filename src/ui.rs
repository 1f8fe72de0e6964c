use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Focus, StatusKind};
use crate::client::Liveness;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(f.size());

    let liveness = match app.liveness {
        Some(Liveness::ReachableOk) => Span::styled("backend ok", Style::default().fg(Color::Green)),
        Some(Liveness::ReachableError) => {
            Span::styled("backend error", Style::default().fg(Color::Yellow))
        }
        Some(Liveness::Unreachable) => {
            Span::styled("backend unreachable", Style::default().fg(Color::Red))
        }
        None => Span::styled("checking backend...", Style::default().fg(Color::DarkGray)),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "SDS Console",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        liveness,
    ]))
    .block(Block::default().borders(Borders::ALL).title("Overview"));
    f.render_widget(header, chunks[0]);

    let input_style = if app.focus == Focus::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let input = Paragraph::new(Line::raw(app.input.clone())).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style)
            .title("SMILES"),
    );
    f.render_widget(input, chunks[1]);

    f.render_widget(feedback_paragraph(app), chunks[2]);

    let sections_style = if app.focus == Focus::Sections {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let body = match &app.report {
        Some(report) => app.view.lines(report),
        None => vec![Line::styled(
            "No report yet. Enter a SMILES string and press Enter.",
            Style::default().fg(Color::DarkGray),
        )],
    };
    let title = report_title(app);
    let sections = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(sections_style)
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    f.render_widget(sections, chunks[3]);

    let help = Paragraph::new(vec![
        Line::raw(
            "Input: type + Enter generate  •  Tab switch pane  •  Esc quit  •  PgUp/PgDn scroll",
        ),
        Line::raw(
            "Sections: ↑/↓ move • Enter/Space toggle • e/c expand/collapse all • d/j export docx/json • x clear",
        ),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, chunks[4]);
}

fn feedback_paragraph(app: &App) -> Paragraph<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    if app.generating {
        lines.push(Line::styled(
            "generating...",
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(validation) = &app.validation {
        let style = if validation.valid {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        for text in validation.summary_lines() {
            lines.push(Line::styled(text, style));
        }
    }
    if let Some((kind, text)) = &app.status {
        let style = match kind {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        };
        lines.push(Line::styled(text.clone(), style));
    }
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Feedback"))
        .wrap(Wrap { trim: true })
}

fn report_title(app: &App) -> String {
    match app
        .report
        .as_ref()
        .and_then(|r| r.metadata.as_ref())
    {
        Some(meta) => {
            let mut title = "Report".to_string();
            if let Some(canonical) = &meta.canonical_smiles {
                title.push_str(&format!(" — {canonical}"));
            }
            if let Some(elapsed) = meta.generation_time_display() {
                title.push_str(&format!(" ({elapsed})"));
            }
            title
        }
        None => "Report".to_string(),
    }
}
