//! Interactive application: input handling, debounced validation, report
//! generation and export, and the draw/poll event loop.
//!
//! All network calls run on spawned tasks and report back over an mpsc
//! channel, so the interface never blocks on the backend. Every validation
//! and generation request carries a monotonically increasing token; a
//! completion whose token is no longer the latest issued is discarded, so a
//! slow early request can never overwrite the result of a later one.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{event, execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::client::{ExportFormat, Liveness, SdsBackend, SdsClient};
use crate::config::Config;
use crate::error::Result as SdsResult;
use crate::report::{ReportDocument, ValidationResponse};
use crate::sections::SectionView;
use crate::ui;

/// Completion events delivered from spawned request tasks.
#[derive(Debug)]
pub enum AppEvent {
    Health(Liveness),
    Validation {
        token: u64,
        result: SdsResult<ValidationResponse>,
    },
    Generation {
        token: u64,
        smiles: String,
        result: SdsResult<ReportDocument>,
    },
    Download {
        result: SdsResult<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

pub struct App {
    pub input: String,
    pub focus: Focus,
    pub liveness: Option<Liveness>,
    pub validation: Option<ValidationResponse>,
    pub report: Option<ReportDocument>,
    pub view: SectionView,
    pub status: Option<(StatusKind, String)>,
    pub generating: bool,
    pub scroll: u16,
    debounce: Duration,
    min_validate_len: usize,
    last_edit: Option<Instant>,
    validate_token: u64,
    generate_token: u64,
    report_smiles: Option<String>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            input: String::new(),
            focus: Focus::Input,
            liveness: None,
            validation: None,
            report: None,
            view: SectionView::default(),
            status: None,
            generating: false,
            scroll: 0,
            debounce: Duration::from_millis(config.ui.debounce_ms),
            min_validate_len: config.ui.min_validate_len,
            last_edit: None,
            validate_token: 0,
            generate_token: 0,
            report_smiles: None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.last_edit = Some(Instant::now());
    }

    pub fn backspace(&mut self) {
        self.input.pop();
        self.last_edit = Some(Instant::now());
    }

    /// Discard the current report and input; expand state resets with it.
    pub fn clear_form(&mut self) {
        self.input.clear();
        self.validation = None;
        self.report = None;
        self.view = SectionView::default();
        self.status = None;
        self.scroll = 0;
        self.last_edit = None;
        self.report_smiles = None;
    }

    /// Fires at most once per quiet period: returns the input to validate
    /// when the debounce deadline has passed and the input is long enough.
    pub fn debounce_due(&mut self, now: Instant) -> Option<String> {
        let edited = self.last_edit?;
        if now.duration_since(edited) < self.debounce {
            return None;
        }
        self.last_edit = None;
        let smiles = self.input.trim();
        (smiles.len() >= self.min_validate_len).then(|| smiles.to_string())
    }

    /// Local reasons generation is refused; no network call happens when
    /// this returns Some.
    pub fn generate_blocker(&self) -> Option<&'static str> {
        if self.input.trim().is_empty() {
            Some("enter a SMILES string")
        } else if self.generating {
            Some("generation already in progress")
        } else if self.validation.as_ref().is_some_and(|v| !v.valid) {
            Some("current input failed validation")
        } else {
            None
        }
    }

    pub fn next_validate_token(&mut self) -> u64 {
        self.validate_token += 1;
        self.validate_token
    }

    pub fn begin_generate(&mut self) -> u64 {
        self.generating = true;
        self.generate_token += 1;
        self.generate_token
    }

    /// SMILES the currently displayed report was generated from; downloads
    /// re-issue exactly this identifier.
    pub fn report_smiles(&self) -> Option<&str> {
        self.report_smiles.as_deref()
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some((kind, text.into()));
    }

    /// Fold a completion into the state. Stale tokens are dropped here.
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Health(state) => {
                self.liveness = Some(state);
            }
            AppEvent::Validation { token, result } => {
                if token != self.validate_token {
                    tracing::debug!(token, latest = self.validate_token, "stale validation dropped");
                    return;
                }
                match result {
                    Ok(validation) => self.validation = Some(validation),
                    Err(e) => {
                        self.set_status(StatusKind::Error, format!("validation failed: {}", e.user_message()));
                    }
                }
            }
            AppEvent::Generation { token, smiles, result } => {
                if token != self.generate_token {
                    tracing::debug!(token, latest = self.generate_token, "stale generation dropped");
                    return;
                }
                self.generating = false;
                match result {
                    Ok(report) => {
                        self.view = SectionView::new(&report);
                        self.scroll = 0;
                        self.set_status(
                            StatusKind::Info,
                            format!("report ready ({} sections)", report.sections.len()),
                        );
                        self.report = Some(report);
                        // only a report that is actually displayed owns the
                        // identifier exports re-issue
                        self.report_smiles = Some(smiles);
                    }
                    Err(e) => {
                        self.set_status(StatusKind::Error, format!("generation failed: {}", e.user_message()));
                    }
                }
            }
            AppEvent::Download { result } => match result {
                Ok(path) => {
                    self.set_status(StatusKind::Info, format!("saved {}", path.display()));
                }
                Err(e) => {
                    self.set_status(StatusKind::Error, format!("download failed: {}", e.user_message()));
                }
            },
        }
    }
}

fn spawn_health(client: Arc<SdsClient>, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let state = client.health().await;
        let _ = tx.send(AppEvent::Health(state));
    });
}

fn spawn_validate(client: Arc<SdsClient>, tx: UnboundedSender<AppEvent>, token: u64, smiles: String) {
    tokio::spawn(async move {
        let result = client.validate(&smiles).await;
        let _ = tx.send(AppEvent::Validation { token, result });
    });
}

fn spawn_generate(client: Arc<SdsClient>, tx: UnboundedSender<AppEvent>, token: u64, smiles: String) {
    tokio::spawn(async move {
        let result = client.generate(&smiles).await;
        let _ = tx.send(AppEvent::Generation { token, smiles, result });
    });
}

fn spawn_download(
    client: Arc<SdsClient>,
    tx: UnboundedSender<AppEvent>,
    smiles: String,
    format: ExportFormat,
) {
    tokio::spawn(async move {
        let result = async {
            let bytes = client.export(&smiles, format).await?;
            let name = format!(
                "sds_{}.{}",
                chrono::Local::now().format("%Y%m%d_%H%M%S"),
                format.extension()
            );
            let path = PathBuf::from(name);
            tokio::fs::write(&path, bytes).await?;
            Ok(path)
        }
        .await;
        let _ = tx.send(AppEvent::Download { result });
    });
}

/// Run the interactive mode until the user quits.
pub async fn run(config: Config, client: Arc<SdsClient>) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut term = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(&config);

    // One probe at startup, not a poll
    spawn_health(client.clone(), tx.clone());

    let result = event_loop(&mut term, &mut app, client, tx, &mut rx).await;

    terminal::disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::LeaveAlternateScreen)?;
    result
}

async fn event_loop(
    term: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: Arc<SdsClient>,
    tx: UnboundedSender<AppEvent>,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        term.draw(|f| ui::draw(f, app))?;

        while let Ok(ev) = rx.try_recv() {
            app.apply(ev);
        }

        if let Some(smiles) = app.debounce_due(Instant::now()) {
            let token = app.next_validate_token();
            spawn_validate(client.clone(), tx.clone(), token, smiles);
        }

        if event::poll(Duration::from_millis(50))? {
            if let event::Event::Key(k) = event::read()? {
                use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
                if k.kind == KeyEventKind::Release {
                    continue;
                }
                match k.code {
                    KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Esc => break,
                    KeyCode::Tab => {
                        app.focus = match app.focus {
                            Focus::Input => Focus::Sections,
                            Focus::Sections => Focus::Input,
                        };
                    }
                    KeyCode::PageUp => app.scroll = app.scroll.saturating_sub(10),
                    KeyCode::PageDown => app.scroll = app.scroll.saturating_add(10),
                    code => match app.focus {
                        Focus::Input => handle_input_key(app, &client, &tx, code),
                        Focus::Sections => handle_sections_key(app, &client, &tx, code),
                    },
                }
            }
        }
    }
    Ok(())
}

fn handle_input_key(
    app: &mut App,
    client: &Arc<SdsClient>,
    tx: &UnboundedSender<AppEvent>,
    code: crossterm::event::KeyCode,
) {
    use crossterm::event::KeyCode;
    match code {
        KeyCode::Char(c) => app.push_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => request_generate(app, client, tx),
        _ => {}
    }
}

fn handle_sections_key(
    app: &mut App,
    client: &Arc<SdsClient>,
    tx: &UnboundedSender<AppEvent>,
    code: crossterm::event::KeyCode,
) {
    use crossterm::event::KeyCode;
    match code {
        KeyCode::Up => {
            app.view.select_prev();
        }
        KeyCode::Down => {
            if let Some(report) = &app.report {
                app.view.select_next(report);
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(report) = &app.report {
                app.view.toggle_selected(report);
            }
        }
        KeyCode::Char('e') => {
            if let Some(report) = &app.report {
                app.view.expand_all(report);
            }
        }
        KeyCode::Char('c') => app.view.collapse_all(),
        KeyCode::Char('d') => request_download(app, client, tx, ExportFormat::Docx),
        KeyCode::Char('j') => request_download(app, client, tx, ExportFormat::Json),
        KeyCode::Char('g') => request_generate(app, client, tx),
        KeyCode::Char('x') => app.clear_form(),
        _ => {}
    }
}

fn request_generate(app: &mut App, client: &Arc<SdsClient>, tx: &UnboundedSender<AppEvent>) {
    if let Some(reason) = app.generate_blocker() {
        app.set_status(StatusKind::Error, reason);
        return;
    }
    let token = app.begin_generate();
    let smiles = app.input.trim().to_string();
    app.set_status(StatusKind::Info, "generating report...");
    spawn_generate(client.clone(), tx.clone(), token, smiles);
}

fn request_download(
    app: &mut App,
    client: &Arc<SdsClient>,
    tx: &UnboundedSender<AppEvent>,
    format: ExportFormat,
) {
    let Some(smiles) = app.report_smiles().map(str::to_string) else {
        app.set_status(StatusKind::Error, "generate a report first");
        return;
    };
    app.set_status(StatusKind::Info, format!("exporting {}...", format.extension()));
    spawn_download(client.clone(), tx.clone(), smiles, format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdsConsoleError;
    use crate::report::GenerateResponse;
    use serde_json::json;

    fn app() -> App {
        App::new(&Config::default())
    }

    fn sample_report() -> ReportDocument {
        let response: GenerateResponse = serde_json::from_value(json!({
            "sds": {
                "Section1": {"title": "Identification", "data": {"Name": "Ethanol"}},
                "Section2": {"title": "Hazards", "data": {"Signal Word": "Danger"}}
            }
        }))
        .unwrap();
        response.into_document()
    }

    fn valid_validation() -> ValidationResponse {
        serde_json::from_value(json!({"valid": true, "canonical_smiles": "CCO"})).unwrap()
    }

    fn invalid_validation() -> ValidationResponse {
        serde_json::from_value(json!({"valid": false, "error": "bad token"})).unwrap()
    }

    #[test]
    fn empty_input_blocks_generation_locally() {
        let app = app();
        assert_eq!(app.generate_blocker(), Some("enter a SMILES string"));
    }

    #[test]
    fn negative_validation_blocks_generation() {
        let mut app = app();
        app.push_char('C');
        app.validation = Some(invalid_validation());
        assert_eq!(app.generate_blocker(), Some("current input failed validation"));
        app.validation = Some(valid_validation());
        assert_eq!(app.generate_blocker(), None);
    }

    #[test]
    fn in_flight_generation_blocks_another() {
        let mut app = app();
        app.push_char('C');
        let _ = app.begin_generate();
        assert_eq!(app.generate_blocker(), Some("generation already in progress"));
    }

    #[test]
    fn debounce_waits_for_quiet_period_and_min_length() {
        let mut app = app();
        app.push_char('C');
        app.push_char('C');
        app.push_char('O');
        assert_eq!(app.debounce_due(Instant::now()), None);
        let later = Instant::now() + Duration::from_millis(600);
        assert_eq!(app.debounce_due(later), Some("CCO".to_string()));
        // fires once per edit burst
        assert_eq!(app.debounce_due(later), None);

        app.clear_form();
        app.push_char('C');
        let later = Instant::now() + Duration::from_millis(600);
        assert_eq!(app.debounce_due(later), None);
    }

    #[test]
    fn stale_validation_result_is_discarded() {
        let mut app = app();
        let first = app.next_validate_token();
        let latest = app.next_validate_token();
        app.apply(AppEvent::Validation {
            token: latest,
            result: Ok(valid_validation()),
        });
        app.apply(AppEvent::Validation {
            token: first,
            result: Ok(invalid_validation()),
        });
        assert!(app.validation.as_ref().unwrap().valid);
    }

    #[test]
    fn stale_generation_result_is_discarded() {
        let mut app = app();
        app.push_char('C');
        let first = app.begin_generate();
        app.generating = false;
        let latest = app.begin_generate();
        app.apply(AppEvent::Generation {
            token: first,
            smiles: "C".to_string(),
            result: Err(SdsConsoleError::Internal {
                message: "slow request".to_string(),
            }),
        });
        // the stale failure neither clears the in-flight flag nor sets an error
        assert!(app.generating);
        app.apply(AppEvent::Generation {
            token: latest,
            smiles: "C".to_string(),
            result: Ok(sample_report()),
        });
        assert!(!app.generating);
        assert_eq!(app.report.as_ref().unwrap().sections.len(), 2);
    }

    #[test]
    fn generation_success_resets_view_to_defaults() {
        let mut app = app();
        app.push_char('C');
        let token = app.begin_generate();
        app.apply(AppEvent::Generation {
            token,
            smiles: "C".to_string(),
            result: Ok(sample_report()),
        });
        assert!(app.view.is_expanded("Section1"));
        assert!(app.view.is_expanded("Section2"));
        assert_eq!(app.scroll, 0);
        match &app.status {
            Some((StatusKind::Info, text)) => assert!(text.contains("2 sections")),
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn generation_failure_surfaces_one_shot_message() {
        let mut app = app();
        app.push_char('C');
        let token = app.begin_generate();
        app.apply(AppEvent::Generation {
            token,
            smiles: "C".to_string(),
            result: Err(crate::client::api_error(422, r#"{"error": "no ring closure"}"#)),
        });
        match &app.status {
            Some((StatusKind::Error, text)) => {
                assert_eq!(text, "generation failed: no ring closure");
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn failed_generation_keeps_the_displayed_report_identifier() {
        let mut app = app();
        for c in "CCO".chars() {
            app.push_char(c);
        }
        let token = app.begin_generate();
        app.apply(AppEvent::Generation {
            token,
            smiles: "CCO".to_string(),
            result: Ok(sample_report()),
        });
        assert_eq!(app.report_smiles(), Some("CCO"));

        // a later failed generation for different input leaves the old
        // report on screen; exports must still re-issue its identifier
        let token = app.begin_generate();
        app.apply(AppEvent::Generation {
            token,
            smiles: "XYZ".to_string(),
            result: Err(SdsConsoleError::Http {
                message: "boom".to_string(),
            }),
        });
        assert!(app.report.is_some());
        assert_eq!(app.report_smiles(), Some("CCO"));
    }

    #[test]
    fn clear_form_discards_report_and_state() {
        let mut app = app();
        app.push_char('C');
        let token = app.begin_generate();
        app.apply(AppEvent::Generation {
            token,
            smiles: "C".to_string(),
            result: Ok(sample_report()),
        });
        app.clear_form();
        assert!(app.input.is_empty());
        assert!(app.report.is_none());
        assert!(app.validation.is_none());
        assert!(app.report_smiles().is_none());
    }
}
