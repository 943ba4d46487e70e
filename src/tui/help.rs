use super::state::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn keybind(key: &'static str, pad: usize, action: &'static str, theme: Theme) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(theme.accent)),
        Span::raw(" ".repeat(pad)),
        Span::raw(action),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, theme: Theme) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(theme.accent)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(theme.accent)),
            Span::raw("  Quit"),
        ]),
        keybind("1-6", 9, "Select bubble/selection/insertion/merge/quick/heap", theme),
        keybind("space", 7, "Start sorting", theme),
        keybind("c", 11, "Cancel the running sort", theme),
        keybind("g", 11, "Generate a new array", theme),
        keybind("[ / ]", 7, "Shrink / grow the array (regenerates)", theme),
        keybind("- / +", 7, "Slower / faster", theme),
        keybind("t", 11, "Toggle dark/light theme", theme),
        keybind("tab", 9, "Switch tabs", theme),
        keybind("?", 11, "Show this help", theme),
        Line::from(""),
        Line::from("Bars:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("■", Style::default().fg(theme.highlight)),
            Span::raw("  compared, swapped or scanned in the current step"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("■", Style::default().fg(theme.sorted)),
            Span::raw("  sorted result"),
        ]),
        Line::from(""),
        Line::from("Speed levels map to step delays of 500, 400, 300, 200, 100, 50, 25, 10, 5, 1 ms."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
