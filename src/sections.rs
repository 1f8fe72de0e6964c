//! Collapsible section display over a [`ReportDocument`].

use std::collections::HashSet;

use ratatui::prelude::*;

use crate::render;
use crate::report::{ReportDocument, Section};

/// Sections expanded when a fresh report arrives: identification and
/// hazard identification.
const DEFAULT_EXPANDED: [u32; 2] = [1, 2];

/// Expand/collapse and cursor state, owned by the display and reset only on
/// explicit user action.
#[derive(Debug, Default)]
pub struct SectionView {
    expanded: HashSet<String>,
    selected: usize,
}

impl SectionView {
    pub fn new(doc: &ReportDocument) -> Self {
        let expanded = doc
            .sections
            .iter()
            .filter(|s| DEFAULT_EXPANDED.contains(&s.number))
            .map(|s| s.key.clone())
            .collect();
        Self {
            expanded,
            selected: 0,
        }
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    pub fn toggle(&mut self, key: &str) {
        if !self.expanded.remove(key) {
            self.expanded.insert(key.to_string());
        }
    }

    pub fn expand_all(&mut self, doc: &ReportDocument) {
        self.expanded = doc.sections.iter().map(|s| s.key.clone()).collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn selected_key<'a>(&self, doc: &'a ReportDocument) -> Option<&'a str> {
        doc.sections.get(self.selected).map(|s| s.key.as_str())
    }

    pub fn select_next(&mut self, doc: &ReportDocument) {
        if self.selected + 1 < doc.sections.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn toggle_selected(&mut self, doc: &ReportDocument) {
        if let Some(key) = self.selected_key(doc).map(str::to_string) {
            self.toggle(&key);
        }
    }

    /// Full display: one header line per section and, where expanded, the
    /// rendered field table followed by sources and notes.
    pub fn lines(&self, doc: &ReportDocument) -> Vec<Line<'static>> {
        let mut out = Vec::new();
        for (idx, section) in doc.sections.iter().enumerate() {
            out.push(self.header_line(section, idx == self.selected));
            if self.is_expanded(&section.key) {
                push_body(&mut out, section);
                out.push(Line::raw(""));
            }
        }
        out
    }

    /// Plain-text variant with everything expanded, for the one-shot CLI.
    pub fn plain_report(doc: &ReportDocument) -> Vec<String> {
        let mut view = SectionView {
            // no cursor marker in non-interactive output
            selected: usize::MAX,
            ..SectionView::default()
        };
        view.expand_all(doc);
        view.lines(doc).iter().map(render::line_text).collect()
    }

    fn header_line(&self, section: &Section, selected: bool) -> Line<'static> {
        let marker = if self.is_expanded(&section.key) {
            "▾"
        } else {
            "▸"
        };
        let mut spans = vec![
            Span::raw(if selected { "> " } else { "  " }.to_string()),
            Span::styled(
                format!("{marker} {}. {}", section.number, section.title),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  ({} fields)", section.data.len())),
        ];
        if section.is_hazard() {
            spans.push(Span::styled(
                "  ⚠ hazards",
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }
}

fn push_body(out: &mut Vec<Line<'static>>, section: &Section) {
    for (field, value) in &section.data {
        out.push(Line::from(vec![
            Span::raw("    ".to_string()),
            Span::styled(
                field.clone(),
                Style::default().add_modifier(Modifier::UNDERLINED),
            ),
        ]));
        for line in render::render_value(value) {
            let mut spans = vec![Span::raw("      ".to_string())];
            spans.extend(line.spans);
            out.push(Line::from(spans));
        }
    }
    if !section.data_sources.is_empty() {
        out.push(Line::from(vec![
            Span::raw("    ".to_string()),
            Span::styled(
                format!("Sources: {}", section.data_sources.join(", ")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    for note in &section.notes {
        out.push(Line::from(vec![
            Span::raw("    ".to_string()),
            Span::styled(
                format!("Note: {note}"),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
}
