use std::{io, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fishwatch_core::{FishingPhase, FishingSession, ParseEvent, SessionEntry, SourceEvent};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    fn phase_color(&self, phase: FishingPhase) -> Color {
        match phase {
            FishingPhase::Idle => self.muted,
            FishingPhase::Casting => self.success,
            FishingPhase::Mooching => self.warning,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front-end showing the live fishing state.
pub struct FishwatchApp {
    session: FishingSession,
    journal_path: PathBuf,
    source_label: Option<String>,
    source_rx: Option<mpsc::Receiver<SourceEvent>>,
    theme: Theme,
    status: String,
    should_quit: bool,
}

impl FishwatchApp {
    pub fn new(session: FishingSession, journal_path: PathBuf) -> Self {
        Self {
            session,
            journal_path,
            source_label: None,
            source_rx: None,
            theme: Theme::default(),
            status: "Ready".to_string(),
            should_quit: false,
        }
    }

    pub fn attach_source(&mut self, label: String, receiver: mpsc::Receiver<SourceEvent>) {
        self.source_label = Some(label);
        self.source_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.source_rx.is_none() {
            self.status = "No chat log configured; set log_path in the config file".to_string();
        }

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut source_rx = self.source_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            if let Some(rx) = source_rx.as_mut() {
                let mut source_closed = false;
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_source = rx.recv() => {
                        match maybe_source {
                            Some(event) => self.handle_source_event(event),
                            None => source_closed = true,
                        }
                    }
                }
                if source_closed {
                    self.status = "Chat log source stopped".to_string();
                    source_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }
        }

        restore_terminal(&mut terminal)?;
        self.persist_journal();
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                self.handle_key(key);
                true
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') => {
                self.session.reset();
                self.status = "Left the water; state reset".to_string();
            }
            KeyCode::Char('l') => {
                let locale = self.session.locale().next();
                self.session.set_locale(locale);
                self.status = format!("Locale switched to {}", locale.label());
            }
            KeyCode::Char('c') => {
                self.session.clear_history();
                self.status = "History cleared".to_string();
            }
            _ => {}
        }
    }

    fn handle_source_event(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Line(line) => {
                if let Some(event) = self.session.ingest(&line) {
                    self.status = describe_event(&event);
                }
                if self.session.take_journal_dirty() {
                    self.persist_journal();
                }
            }
            SourceEvent::Error(err) => {
                error!(?err, "chat log source failed");
                self.status = format!("Chat log error: {err}");
            }
        }
    }

    fn persist_journal(&mut self) {
        match self.session.journal().persist(&self.journal_path) {
            Ok(()) => info!(path = %self.journal_path.display(), "journal saved"),
            Err(err) => {
                error!(?err, "failed to save journal");
                self.status = format!("Failed to save journal: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[0]);

        self.render_state(frame, top[0]);
        self.render_stats(frame, top[1]);
        self.render_history(frame, rows[1]);
        self.render_status(frame, rows[2]);
    }

    fn render_state(&self, frame: &mut Frame, area: Rect) {
        let state = self.session.state();
        let label = Style::default().fg(self.theme.muted);
        let spot = match (&state.current_spot, state.is_undiscovered_spot) {
            (_, true) => Span::styled(
                "undiscovered fishing hole",
                Style::default()
                    .fg(self.theme.warning)
                    .add_modifier(Modifier::ITALIC),
            ),
            (Some(spot), false) => Span::styled(
                spot.clone(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            (None, false) => Span::styled("—", Style::default().fg(self.theme.muted)),
        };
        let flag = |value: bool| {
            if value {
                Span::styled("yes", Style::default().fg(self.theme.warning))
            } else {
                Span::styled("no", Style::default().fg(self.theme.primary_fg))
            }
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Phase     ", label),
                Span::styled(
                    state.phase.label(),
                    Style::default()
                        .fg(self.theme.phase_color(state.phase))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![Span::styled("Spot      ", label), spot]),
            Line::from(vec![Span::styled("Mooching  ", label), flag(state.is_mooching)]),
            Line::from(vec![
                Span::styled("Locale    ", label),
                Span::styled(
                    self.session.locale().label(),
                    Style::default().fg(self.theme.primary_fg),
                ),
            ]),
        ];

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Fishing"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let stats = self.session.stats();
        let journal = self.session.journal();
        let locale = self.session.locale();
        let lines = vec![
            Line::from(format!(
                "Casts {}  (undiscovered {})",
                stats.casts, stats.undiscovered_casts
            )),
            Line::from(format!("Mooches {}", stats.mooches)),
            Line::from(format!(
                "Spots logged {}  (journal {})",
                stats.discoveries,
                journal.count(locale)
            )),
            Line::from(Span::styled(
                format!("Lines read {}", stats.lines),
                Style::default().fg(self.theme.muted),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Session"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .session
            .history()
            .take(visible)
            .map(|entry| self.history_item(entry))
            .collect();
        let list = if items.is_empty() {
            List::new(vec![ListItem::new(Span::styled(
                "Waiting for fishing activity…",
                Style::default().fg(self.theme.muted),
            ))])
        } else {
            List::new(items)
        };
        frame.render_widget(
            list.block(Block::default().borders(Borders::ALL).title("Events")),
            area,
        );
    }

    fn history_item(&self, entry: &SessionEntry) -> ListItem<'static> {
        let color = match entry.event {
            ParseEvent::CastStarted { .. } => self.theme.success,
            ParseEvent::AreaDiscovered { .. } => self.theme.accent,
            ParseEvent::MoochAttempted => self.theme.warning,
        };
        ListItem::new(Line::from(vec![
            Span::styled(
                format!("{} ", entry.at.format("%H:%M:%S")),
                Style::default().fg(self.theme.muted),
            ),
            Span::styled(
                format!("{:<10} ", entry.event.kind()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(describe_event(&entry.event)),
        ]))
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let source = self
            .source_label
            .as_deref()
            .map(|label| format!("Following {label}"))
            .unwrap_or_else(|| "No source".to_string());
        let status_style = if self.status.starts_with("Failed") || self.status.contains("error") {
            Style::default().fg(self.theme.danger)
        } else {
            Style::default().fg(self.theme.primary_fg)
        };
        let paragraph = Paragraph::new(vec![Line::from(vec![
            Span::styled(self.status.clone(), status_style),
            Span::styled(
                format!("  •  {source}  •  q quit  r reset  l locale  c clear"),
                Style::default().fg(self.theme.muted),
            ),
        ])])
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn describe_event(event: &ParseEvent) -> String {
    match event {
        ParseEvent::CastStarted {
            spot: Some(spot), ..
        } => format!("Cast at {spot}"),
        ParseEvent::CastStarted { spot: None, .. } => {
            "Cast at an undiscovered fishing hole".to_string()
        }
        ParseEvent::AreaDiscovered { spot } => format!("{spot} added to the fishing log"),
        ParseEvent::MoochAttempted => "Mooch attempted".to_string(),
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}
