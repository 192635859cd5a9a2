use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use oracle_lens::accuracy::rate_label;
use oracle_lens::chart::SeriesChart;
use oracle_lens::config::Config;
use oracle_lens::evidence::{
    TagClass, coherence_lock, confidence_bar, evidence_label, game_option_label, lock_label,
    lock_subtitle, lock_summary_label, lock_tag_class, outcome_label, season_row, snapshot_label,
};
use oracle_lens::gate::Gate;
use oracle_lens::narrative::sanitize_narrative;
use oracle_lens::provider::spawn_season_provider;
use oracle_lens::record::SENTINEL;
use oracle_lens::settings;
use oracle_lens::state::{AppState, Delta, ProviderCommand, Screen, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: &Config, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let gate = Gate::new(config.password.as_deref());
        let state = AppState::new(
            config.teams.clone(),
            &config.team,
            config.season,
            gate,
            settings::load_signal_gain(),
        );
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.screen == Screen::Gate {
            self.on_gate_key(key);
            return;
        }
        if self.state.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.notice = None;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('t') | KeyCode::Right => {
                self.state.cycle_team_next();
                self.request_season(false);
            }
            KeyCode::Char('T') | KeyCode::Left => {
                self.state.cycle_team_prev();
                self.request_season(false);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_season(true),
            KeyCode::Char('g') | KeyCode::Char('G') => {
                let gain = self.state.cycle_gain();
                match settings::save_signal_gain(gain) {
                    Ok(()) => self
                        .state
                        .push_log(format!(
                            "[INFO] Signal gain: {} (level {})",
                            gain.label(),
                            gain.level()
                        )),
                    Err(err) => self
                        .state
                        .push_log(format!("[WARN] Signal gain not saved: {err:#}")),
                }
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn on_gate_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => {
                if self.state.submit_gate() {
                    self.state.push_log("[INFO] Gate passed");
                }
            }
            KeyCode::Backspace => self.state.gate.pop_char(),
            KeyCode::Char(ch) => self.state.gate.push_char(ch),
            _ => {}
        }
    }

    fn request_season(&mut self, bust: bool) {
        let cmd = self.state.begin_request(bust);
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Season fetch unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.loading = false;
            self.state.push_log("[WARN] Season request failed");
        }
    }
}

fn main() -> io::Result<()> {
    let config = Config::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _provider = spawn_season_provider(
        tx,
        cmd_rx,
        config.data.clone(),
        config.http_timeout_secs,
    );

    let mut app = App::new(&config, Some(cmd_tx));
    app.request_season(false);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    if app.state.screen == Screen::Gate {
        render_gate(frame, frame.size(), &app.state);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_lens_screen(frame, chunks[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "j/k/↑/↓ Game | t/T/←/→ Team | r Refresh | g Signal gain | ? Help | q Quit",
    );
    frame.render_widget(footer, chunks[3]);

    if let Some(notice) = &app.state.notice {
        render_notice(frame, frame.size(), notice);
    } else if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let loading = if state.loading { " | loading…" } else { "" };
    format!(
        "ORACLE LENS | {} | Season {} | Gain: {} | {} | {}{loading}",
        state.current_team(),
        state.season,
        state.gain.label(),
        state.loaded_tag,
        lock_summary_label(state.snapshot.as_ref().map(|s| s.games.as_slice())),
    )
}

fn render_lens_screen(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(56), Constraint::Percentage(44)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(12)])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10),
            Constraint::Min(6),
            Constraint::Length(9),
        ])
        .split(columns[1]);

    render_season_table(frame, left[0], state);

    let (running, expected) = state.running_series();
    let chart = SeriesChart::new(&running)
        .secondary(&expected)
        .title("Running hit rate (solid) vs expected win (dashed)")
        .placeholder("No callable games yet");
    frame.render_widget(chart, left[1]);

    render_lens(frame, right[0], state);

    let narrative = Paragraph::new(narrative_text(state))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(format!("Narrative ({})", state.gain.label()))
                .borders(Borders::ALL),
        );
    frame.render_widget(narrative, right[1]);

    let accuracy = Paragraph::new(accuracy_text(state))
        .block(Block::default().title("Accuracy").borders(Borders::ALL));
    frame.render_widget(accuracy, right[2]);
}

fn table_columns() -> [Constraint; 10] {
    [
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Min(8),
    ]
}

fn render_season_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Season").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 || inner.width == 0 {
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);
    let widths = table_columns();

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let headers = [
        "Wk", "Opp", "Res", "Score", "Pick", "Exp", "Conf", "Evidence", "Lock", "Snapshot",
    ];
    for (col, title) in header_cols.iter().zip(headers) {
        render_cell_text(frame, *col, title, bold);
    }

    let games = state.games();
    let list_area = sections[1];
    if games.is_empty() {
        let empty = Paragraph::new(SENTINEL).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let selected = state.selected_index().unwrap_or(0);
    let (start, end) = visible_range(selected, games.len(), list_area.height as usize);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let row_style = if idx == selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if idx == selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);
        let game = &games[idx];
        let cells = season_row(game);
        let lock_style = tag_style(lock_tag_class(coherence_lock(game)), row_style);
        for (col, (pos, cell)) in cols.iter().zip(cells.iter().enumerate()) {
            let style = if pos == 8 { lock_style } else { row_style };
            render_cell_text(frame, *col, cell, style);
        }
    }
}

fn render_lens(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Lens").borders(Borders::ALL);
    let Some(game) = state.selected_game() else {
        let lines = [
            "Evidence:   —",
            "Exp win:    —",
            "Confidence: —",
            "Bars:       —",
            "Reality:    —",
            "Lock:       —",
            "—",
            "Snapshot:   —",
        ];
        frame.render_widget(Paragraph::new(lines.join("\n")).block(block), area);
        return;
    };

    let lock = coherence_lock(game);
    let lines = vec![
        Line::from(Span::styled(
            game_option_label(game),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Evidence:   {}", evidence_label(game))),
        Line::from(format!("Exp win:    {}", game.expected_win_label())),
        Line::from(format!("Confidence: {}", game.confidence_label())),
        Line::from(format!(
            "Bars:       {}",
            confidence_bar(game.oracle.confidence)
        )),
        Line::from(format!("Reality:    {}", outcome_label(game))),
        Line::from(vec![
            Span::raw("Lock:       "),
            Span::styled(
                lock_label(lock),
                tag_style(lock_tag_class(lock), Style::default()).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(lock_subtitle(game)),
        Line::from(format!("Snapshot:   {}", snapshot_label(game))),
    ];
    let lens = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(lens, area);
}

fn narrative_text(state: &AppState) -> String {
    let Some(game) = state.selected_game() else {
        return format!("Pregame: {SENTINEL}\n\nPostgame: {SENTINEL}");
    };
    format!(
        "Pregame: {}\n\nPostgame: {}",
        sanitize_narrative(game.oracle.pregame_story.as_deref(), state.gain),
        sanitize_narrative(game.oracle.postgame_story.as_deref(), state.gain),
    )
}

fn accuracy_text(state: &AppState) -> String {
    let Some(acc) = &state.accuracy else {
        return format!("Calls: {SENTINEL} | Correct: {SENTINEL} | Rate: {SENTINEL}");
    };
    let mut lines = vec![
        format!(
            "Calls: {} | Correct: {} | Rate: {}",
            acc.calls,
            acc.correct,
            rate_label(acc.rate)
        ),
        format!("{:<6} {:>5} {:>7} {:>6}", "Opp", "Calls", "Correct", "Rate"),
    ];
    for row in acc.opponents.iter().take(5) {
        lines.push(format!(
            "{:<6} {:>5} {:>7} {:>6}",
            row.opponent,
            row.calls,
            row.correct,
            rate_label(row.rate)
        ));
    }
    lines.join("\n")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn tag_style(class: TagClass, base: Style) -> Style {
    match class {
        TagClass::Good => base.fg(Color::Green),
        TagClass::Bad => base.fg(Color::Red),
        TagClass::Neutral => base,
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_gate(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from("Oracle Lens is locked."),
        Line::from(""),
        Line::from(format!("Password: {}", state.gate.masked_input())),
    ];
    if state.gate.failed {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Wrong password.",
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter to unlock | Esc to quit",
        Style::default().fg(Color::DarkGray),
    )));

    let gate = Paragraph::new(lines)
        .block(Block::default().title("Gate").borders(Borders::ALL));
    frame.render_widget(gate, popup_area);
}

fn render_notice(frame: &mut Frame, area: Rect, notice: &str) {
    let popup_area = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup_area);
    let text = format!("{notice}\n\nEnter/Esc to dismiss");
    let panel = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().title("Load failed").borders(Borders::ALL));
    frame.render_widget(panel, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Oracle Lens - Help",
        "",
        "  j/k or ↑/↓   Previous/next game",
        "  t or →       Next team",
        "  T or ←       Previous team",
        "  r            Refresh (bypass caches)",
        "  g            Cycle signal gain (Quiet/Balanced/Amplified)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Evidence: n=K : C leans win, D leans loss or lacks history.",
        "Lock: MATCH story held, DIVERGE story broke, — unresolved.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
