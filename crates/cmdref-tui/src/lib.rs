// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use cmdref_app::{
    ARGS_BATCH_SIZE, CommandEntry, Focus, LoadPhase, PanelCommand, PanelEvent, PanelState,
    SHELL_ACTIONS, ShellCommand, ShellEvent, ShellState,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

const HALF_PAGE_ROWS: usize = 10;

/// Progress of one load cycle, emitted by the loader and drained on the UI
/// thread. Every event names the cycle it belongs to; the panel drops
/// events from superseded cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    Metadata {
        cycle: u64,
        entries: Vec<CommandEntry>,
    },
    ArgsBatch {
        cycle: u64,
        resolved: Vec<(String, String)>,
    },
    Completed {
        cycle: u64,
    },
    Failed {
        cycle: u64,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Loader(LoaderEvent),
}

/// Seam between the panel and whatever owns the command registry. The
/// default `spawn_load` runs the whole pipeline synchronously on the
/// caller's thread, emitting the same event sequence a threaded loader
/// would; binaries override it to keep the UI loop free.
pub trait RegistryRuntime {
    /// Phase 1: enumerate ids and fetch label/caption per id, degrading
    /// failed fields to empty strings. Only the enumeration may fail.
    fn load_metadata(&mut self) -> Result<Vec<CommandEntry>>;

    /// Phase 2, one batch: resolve argument schemas for `ids` and return
    /// the formatted summaries that resolved. Per-command failures are
    /// swallowed here.
    fn resolve_args_batch(&mut self, ids: &[String]) -> Vec<(String, String)>;

    fn spawn_load(&mut self, cycle: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let send = |event: LoaderEvent| {
            tx.send(InternalEvent::Loader(event))
                .map_err(|_| anyhow::anyhow!("loader event channel closed"))
        };

        match self.load_metadata() {
            Ok(entries) => {
                let ids = entries
                    .iter()
                    .map(|entry| entry.id.clone())
                    .collect::<Vec<_>>();
                send(LoaderEvent::Metadata { cycle, entries })?;
                for batch in ids.chunks(ARGS_BATCH_SIZE) {
                    let resolved = self.resolve_args_batch(batch);
                    if !resolved.is_empty() {
                        send(LoaderEvent::ArgsBatch { cycle, resolved })?;
                    }
                }
                send(LoaderEvent::Completed { cycle })
            }
            Err(error) => send(LoaderEvent::Failed {
                cycle,
                error: format!("{error:#}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct PaletteUiState {
    visible: bool,
    selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct TableUiState {
    selected_row: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    palette: PaletteUiState,
    table: TableUiState,
    filter_editing: bool,
    help_visible: bool,
    status_token: u64,
    refreshed_at: Option<String>,
}

pub fn run_app<R: RegistryRuntime>(
    shell: &mut ShellState,
    runtime: &mut R,
    open_reference_on_start: bool,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if open_reference_on_start {
        let events = shell.dispatch(ShellCommand::OpenReference);
        handle_shell_events(events, shell, runtime, &mut view_data, &internal_tx);
    }

    let mut result = Ok(());
    loop {
        process_internal_events(shell, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, shell, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(shell, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: RegistryRuntime>(
    shell: &mut ShellState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                let _ = shell.dispatch(ShellCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Loader(loader_event) => {
                handle_loader_event(shell, runtime, view_data, tx, loader_event);
            }
        }
    }
}

fn handle_loader_event<R: RegistryRuntime>(
    shell: &mut ShellState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    loader_event: LoaderEvent,
) {
    let command = match loader_event {
        LoaderEvent::Metadata { cycle, entries } => PanelCommand::ApplyMetadata { cycle, entries },
        LoaderEvent::ArgsBatch { cycle, resolved } => {
            PanelCommand::ApplyArgsBatch { cycle, resolved }
        }
        LoaderEvent::Completed { cycle } => {
            view_data.refreshed_at = Some(clock_stamp());
            PanelCommand::FinishLoad { cycle }
        }
        LoaderEvent::Failed { cycle, error } => PanelCommand::FailLoad { cycle, error },
    };

    let events = shell.dispatch(ShellCommand::Panel(command));
    handle_shell_events(events, shell, runtime, view_data, tx);
}

fn handle_shell_events<R: RegistryRuntime>(
    events: Vec<ShellEvent>,
    shell: &mut ShellState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    for event in events {
        match event {
            ShellEvent::Panel(PanelEvent::LoadRequested { cycle }) => {
                if let Err(error) = runtime.spawn_load(cycle, tx.clone()) {
                    emit_status(shell, view_data, tx, format!("load failed: {error:#}"));
                }
            }
            ShellEvent::Panel(PanelEvent::LoadFailed { error }) => {
                emit_status(shell, view_data, tx, format!("load failed: {error}"));
            }
            ShellEvent::Panel(PanelEvent::SnapshotReplaced { total }) => {
                view_data.table.selected_row = 0;
                emit_status(shell, view_data, tx, format!("loaded {total} commands"));
            }
            ShellEvent::UnknownAction(id) => {
                emit_status(shell, view_data, tx, format!("unknown action {id:?}"));
            }
            _ => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    shell: &mut ShellState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    let _ = shell.dispatch(ShellCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn invoke_action<R: RegistryRuntime>(
    shell: &mut ShellState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    action_id: &str,
) {
    let events = shell.dispatch(ShellCommand::InvokeAction(action_id.to_owned()));
    handle_shell_events(events, shell, runtime, view_data, tx);
}

fn handle_key_event<R: RegistryRuntime>(
    shell: &mut ShellState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.palette.visible {
        handle_palette_key(shell, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.filter_editing {
        handle_filter_key(shell, view_data, key);
        return false;
    }

    match key.code {
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::Char(':') => {
            view_data.palette.visible = true;
            view_data.palette.selected = 0;
            return false;
        }
        _ => {}
    }

    match shell.focus {
        Focus::Home => handle_home_key(key),
        Focus::Panel => {
            handle_panel_key(shell, runtime, view_data, internal_tx, key);
            false
        }
    }
}

fn handle_home_key(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
}

fn handle_palette_key<R: RegistryRuntime>(
    shell: &mut ShellState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.palette.visible = false;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.palette.selected = view_data.palette.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.palette.selected =
                (view_data.palette.selected + 1).min(SHELL_ACTIONS.len().saturating_sub(1));
        }
        KeyCode::Enter => {
            view_data.palette.visible = false;
            if let Some(action) = SHELL_ACTIONS.get(view_data.palette.selected) {
                invoke_action(shell, runtime, view_data, internal_tx, action.id);
            }
        }
        _ => {}
    }
}

fn handle_filter_key(shell: &mut ShellState, view_data: &mut ViewData, key: KeyEvent) {
    if key.code == KeyCode::Char('u') && key.modifiers.contains(KeyModifiers::CONTROL) {
        let _ = shell.dispatch(ShellCommand::Panel(PanelCommand::ClearQuery));
        view_data.table.selected_row = 0;
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            view_data.filter_editing = false;
        }
        KeyCode::Backspace => {
            let _ = shell.dispatch(ShellCommand::Panel(PanelCommand::PopQuery));
            view_data.table.selected_row = 0;
        }
        KeyCode::Char(ch) => {
            let _ = shell.dispatch(ShellCommand::Panel(PanelCommand::PushQuery(ch)));
            view_data.table.selected_row = 0;
        }
        _ => {}
    }
}

fn handle_panel_key<R: RegistryRuntime>(
    shell: &mut ShellState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let visible_rows = shell
        .slot
        .instance()
        .map(|panel| panel.visible_entries().len())
        .unwrap_or(0);

    match key.code {
        KeyCode::Char('/') => {
            view_data.filter_editing = true;
        }
        KeyCode::Char('r') => {
            emit_status(shell, view_data, internal_tx, "refreshing commands");
            let events = shell.dispatch(ShellCommand::Panel(PanelCommand::Refresh));
            handle_shell_events(events, shell, runtime, view_data, internal_tx);
        }
        KeyCode::Esc => {
            let events = shell.dispatch(ShellCommand::DetachReference);
            handle_shell_events(events, shell, runtime, view_data, internal_tx);
        }
        KeyCode::Char('x') => {
            let events = shell.dispatch(ShellCommand::DisposeReference);
            handle_shell_events(events, shell, runtime, view_data, internal_tx);
            emit_status(shell, view_data, internal_tx, "reference panel closed");
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.table.selected_row = view_data.table.selected_row.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.table.selected_row =
                clamp_row(view_data.table.selected_row + 1, visible_rows);
        }
        KeyCode::PageUp => {
            view_data.table.selected_row =
                view_data.table.selected_row.saturating_sub(HALF_PAGE_ROWS);
        }
        KeyCode::PageDown => {
            view_data.table.selected_row =
                clamp_row(view_data.table.selected_row + HALF_PAGE_ROWS, visible_rows);
        }
        KeyCode::Char('g') | KeyCode::Home => {
            view_data.table.selected_row = 0;
        }
        KeyCode::Char('G') | KeyCode::End => {
            view_data.table.selected_row = visible_rows.saturating_sub(1);
        }
        KeyCode::Char('q') => {
            // Quit is reserved for Home and ctrl+q; inside the panel `q`
            // is inert so a stray keypress cannot tear the app down.
        }
        _ => {}
    }
}

fn clamp_row(candidate: usize, row_count: usize) -> usize {
    candidate.min(row_count.saturating_sub(1))
}

fn clock_stamp() -> String {
    let layout = format_description!("[hour]:[minute]:[second]");
    OffsetDateTime::now_utc().format(&layout).unwrap_or_default()
}

fn render(frame: &mut ratatui::Frame<'_>, shell: &ShellState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(shell, view_data))
        .block(Block::default().title("cmdref").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    match panel_if_shown(shell) {
        Some(panel) => render_panel_table(frame, layout[1], panel, view_data),
        None => {
            let body = Paragraph::new(home_text())
                .block(Block::default().borders(Borders::ALL).title("home"));
            frame.render_widget(body, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(shell, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if view_data.palette.visible {
        let area = centered_rect(64, 40, frame.area());
        frame.render_widget(Clear, area);
        let palette = Paragraph::new(palette_text(view_data))
            .block(Block::default().title("actions").borders(Borders::ALL));
        frame.render_widget(palette, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn panel_if_shown(shell: &ShellState) -> Option<&PanelState> {
    if shell.focus == Focus::Panel && shell.slot.is_attached() {
        shell.slot.instance()
    } else {
        None
    }
}

fn header_text(shell: &ShellState, view_data: &ViewData) -> String {
    let Some(panel) = panel_if_shown(shell) else {
        return "press : for actions, ? for help".to_owned();
    };

    let cursor = if view_data.filter_editing { "█" } else { "" };
    let mut text = format!(
        "filter: {}{cursor}  ·  {}",
        panel.query(),
        panel.count_text()
    );
    if panel.phase() != LoadPhase::Idle {
        text.push_str("  ·  ");
        text.push_str(panel.phase().label());
        text.push('…');
    } else if let Some(stamp) = &view_data.refreshed_at {
        text.push_str("  ·  refreshed ");
        text.push_str(stamp);
    }
    text
}

fn home_text() -> String {
    let mut lines = vec![
        "no panel is open".to_owned(),
        String::new(),
        "registered actions:".to_owned(),
    ];
    for action in SHELL_ACTIONS {
        lines.push(format!(
            "  {}: {} — {}",
            action.category, action.label, action.caption
        ));
    }
    lines.push(String::new());
    lines.push("press : to pick an action, q to quit".to_owned());
    lines.join("\n")
}

fn render_panel_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    panel: &PanelState,
    view_data: &ViewData,
) {
    let visible = panel.visible_entries();

    let header_cells = ["Command ID", "Label", "Description", "Arguments"]
        .into_iter()
        .map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells);

    // Window the rows around the selection; ratatui's plain Table has no
    // scroll state of its own.
    let capacity = usize::from(area.height.saturating_sub(3)).max(1);
    let selected = clamp_row(view_data.table.selected_row, visible.len());
    let first = selected.saturating_sub(capacity.saturating_sub(1));

    let rows = visible
        .iter()
        .enumerate()
        .skip(first)
        .take(capacity)
        .map(|(row_index, entry)| {
            let style = if row_index == selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new([
                Cell::from(entry.id.clone()).style(style.fg(Color::Cyan)),
                Cell::from(entry.label.clone()).style(style),
                Cell::from(entry.caption.clone()).style(style),
                Cell::from(panel.args_text(entry).to_owned()).style(style),
            ])
        });

    let widths = [
        Constraint::Percentage(28),
        Constraint::Percentage(18),
        Constraint::Percentage(32),
        Constraint::Percentage(22),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title("commands reference")
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn status_text(shell: &ShellState, view_data: &ViewData) -> String {
    if let Some(status) = &shell.status_line {
        return status.clone();
    }

    // With no transient status, show the selected row in full; the
    // terminal stand-in for the original's hover tooltips.
    if let Some(panel) = panel_if_shown(shell) {
        let visible = panel.visible_entries();
        if let Some(entry) = visible.get(clamp_row(view_data.table.selected_row, visible.len())) {
            let args = panel.args_text(entry);
            return if args.is_empty() {
                entry.id.clone()
            } else {
                format!("{} — {}", entry.id, args)
            };
        }
    }
    String::new()
}

fn palette_text(view_data: &ViewData) -> String {
    SHELL_ACTIONS
        .iter()
        .enumerate()
        .map(|(index, action)| {
            let marker = if index == view_data.palette.selected {
                "→"
            } else {
                " "
            };
            format!("{marker} {}: {} — {}", action.category, action.label, action.caption)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn help_overlay_text() -> &'static str {
    "keys\n\
     \n\
     :          open the action palette\n\
     ?          toggle this help\n\
     ctrl+q     quit from anywhere; q quits from home\n\
     \n\
     reference panel\n\
     /          edit the filter (enter or esc to stop, ctrl+u clears)\n\
     r          refresh: re-enumerate and re-resolve arguments\n\
     j/k, arrows, pgup/pgdn, g/G   move the selection\n\
     esc        hide the panel (kept alive; reopen restores it)\n\
     x          close the panel for good"
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

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
