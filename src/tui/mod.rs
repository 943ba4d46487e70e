mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::model::{AlgorithmId, RunConfig, Status, VizEvent};
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Tabs},
    Terminal,
};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;

    // Unbounded channels avoid backpressure between the step loop and the renderer.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<VizEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_cfg = cfg.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_cfg, event_rx, cmd_tx));

    let res = orchestrator::run_controller(cfg, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    cfg: RunConfig,
    mut event_rx: UnboundedReceiver<VizEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState {
        size: cfg.size,
        speed: cfg.speed,
        algorithm: cfg.algorithm,
        ..Default::default()
    };
    if state.algorithm.is_none() {
        state.info = "Pick an algorithm with keys 1-6, then press space".into();
    }

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(&mut state, k) {
                    KeyOutcome::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    KeyOutcome::Send(cmd) => {
                        if cmd_tx.send(cmd).is_err() {
                            break Err(anyhow::anyhow!("controller stopped unexpectedly"));
                        }
                    }
                    KeyOutcome::None => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();

    res
}

#[derive(Debug)]
enum KeyOutcome {
    None,
    Send(UiCommand),
    Quit,
}

/// Map a key press to a controller command, updating local view state.
fn handle_key(state: &mut UiState, k: KeyEvent) -> KeyOutcome {
    match (k.modifiers, k.code) {
        (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => KeyOutcome::Quit,
        (_, KeyCode::Tab) => {
            state.tab = (state.tab + 1) % 2;
            KeyOutcome::None
        }
        (_, KeyCode::Char('?')) => {
            state.tab = 1;
            KeyOutcome::None
        }
        (_, KeyCode::Esc) if state.tab != 0 => {
            state.tab = 0;
            KeyOutcome::None
        }
        (_, KeyCode::Char('t')) => {
            state.theme = state.theme.toggled();
            state.info = format!("Theme: {}", state.theme.name);
            KeyOutcome::None
        }
        (_, KeyCode::Char(c @ '1'..='6')) => {
            let idx = (c as usize) - ('1' as usize);
            let algorithm = AlgorithmId::ALL[idx];
            state.algorithm = Some(algorithm);
            KeyOutcome::Send(UiCommand::Select(algorithm))
        }
        (_, KeyCode::Char(' ')) | (_, KeyCode::Enter) | (_, KeyCode::Char('s')) => {
            if state.algorithm.is_none() {
                state.info = "Select an algorithm first (keys 1-6)".into();
                KeyOutcome::None
            } else if state.is_sorting() {
                KeyOutcome::None
            } else {
                KeyOutcome::Send(UiCommand::Start)
            }
        }
        (_, KeyCode::Char('c')) | (_, KeyCode::Esc) => KeyOutcome::Send(UiCommand::Cancel),
        (_, KeyCode::Char('g')) => KeyOutcome::Send(UiCommand::Generate { size: None }),
        (_, KeyCode::Char('[')) | (_, KeyCode::Char(']')) => {
            let size = state.resized(k.code == KeyCode::Char(']'));
            if size == state.size {
                return KeyOutcome::None;
            }
            state.size = size;
            KeyOutcome::Send(UiCommand::Generate { size: Some(size) })
        }
        (_, KeyCode::Char('+')) | (_, KeyCode::Char('=')) | (_, KeyCode::Char('-')) => {
            let next = if k.code == KeyCode::Char('-') {
                state.speed.slower()
            } else {
                state.speed.faster()
            };
            if next == state.speed {
                return KeyOutcome::None;
            }
            state.speed = next;
            KeyOutcome::Send(UiCommand::SetSpeed(next.get()))
        }
        _ => KeyOutcome::None,
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Visualizer"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("sort-visualizer"))
        .highlight_style(Style::default().fg(state.theme.accent));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_visualizer(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f, state.theme),
    }
}

fn draw_visualizer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(7)].as_ref())
        .split(area);

    draw_bars(rows[0], f, state);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[1]);
    draw_stats(panels[0], f, state);
    draw_controls(panels[1], f, state);
}

/// Bar width and gap that fit `n` bars into `inner` columns.
fn bar_geometry(inner: u16, n: usize) -> (u16, u16) {
    if n == 0 {
        return (1, 0);
    }
    let n = u16::try_from(n).unwrap_or(u16::MAX);
    let gap = if inner >= n.saturating_mul(2) { 1 } else { 0 };
    let width = inner.saturating_sub(gap * n.saturating_sub(1)) / n;
    (width.max(1), gap)
}

fn draw_bars(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let theme = state.theme;
    let sorted = state.status == Status::Sorted;
    let bars: Vec<Bar> = state
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let color = if sorted {
                theme.sorted
            } else if state.highlight.contains(&i) {
                theme.highlight
            } else {
                theme.bar
            };
            Bar::default()
                .value(u64::from(v))
                .text_value(String::new())
                .style(Style::default().fg(color))
        })
        .collect();

    let (width, gap) = bar_geometry(area.width.saturating_sub(2), bars.len());
    let max = state.values.iter().copied().max().unwrap_or(1);
    let title = match state.algorithm {
        Some(a) => format!("{} ({} values)", a.label(), state.values.len()),
        None => format!("No algorithm selected ({} values)", state.values.len()),
    };

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(width)
        .bar_gap(gap)
        .max(u64::from(max));
    f.render_widget(chart, area);
}

fn draw_stats(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let theme = state.theme;
    let status_color = match state.status {
        Status::Ready => theme.muted,
        Status::Sorting => theme.highlight,
        Status::Sorted => theme.sorted,
    };
    let elapsed = state
        .elapsed_ms
        .map(|ms| format!("{ms} ms"))
        .unwrap_or_else(|| "-".into());

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(theme.muted)),
            Span::styled(
                state.status.label(),
                Style::default()
                    .fg(status_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Comparisons: ", Style::default().fg(theme.muted)),
            Span::raw(state.comparisons.to_string()),
            Span::styled("   Swaps: ", Style::default().fg(theme.muted)),
            Span::raw(state.swaps.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Time: ", Style::default().fg(theme.muted)),
            Span::raw(elapsed),
        ]),
        Line::from(Span::styled(
            state.info.clone(),
            Style::default().fg(theme.accent),
        )),
    ];
    if let Some(last) = state.last_run_line() {
        lines.push(Line::from(Span::styled(last, Style::default().fg(theme.muted))));
    }
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Stats"));
    f.render_widget(p, area);
}

fn draw_controls(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let theme = state.theme;
    let mut algos: Vec<Span> = Vec::with_capacity(AlgorithmId::ALL.len() * 2);
    for (i, a) in AlgorithmId::ALL.iter().enumerate() {
        let style = if state.algorithm == Some(*a) {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        algos.push(Span::styled(format!("{}:{}", i + 1, a.as_str()), style));
        algos.push(Span::raw(" "));
    }

    let lines = vec![
        Line::from(algos),
        Line::from(vec![
            Span::styled("Speed: ", Style::default().fg(theme.muted)),
            Span::raw(format!(
                "{}/10 ({} ms/step)",
                state.speed.get(),
                crate::engine::step_delay(state.speed).as_millis()
            )),
            Span::styled("   Size: ", Style::default().fg(theme.muted)),
            Span::raw(state.size.to_string()),
        ]),
        Line::from(Span::styled(
            "space start  c cancel  g new  [ ] size  - + speed  ? help",
            Style::default().fg(theme.muted),
        )),
    ];
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(p, area);
}
