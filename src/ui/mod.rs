mod components;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::sync::OnceLock;

use crate::app::{App, Phase, Popup};
use crate::config::ColorOverrides;
use crate::theme::Theme;
use self::components::{centered_fixed, centered_rect};

// Cell geometry: bordered box around one digit, one column of gap between
const CELL_WIDTH: u16 = 5;
const CELL_HEIGHT: u16 = 3;
const CELL_GAP: u16 = 1;

// Theme is resolved once at startup, before the first draw
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme for this session (config overrides applied on top of
/// the default palette). Later calls are ignored.
pub fn init_theme(overrides: Option<&ColorOverrides>) {
    let _ = THEME.set(Theme::load(overrides));
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(5),    // Code entry box
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_info_line(f, app, chunks[0]);
    draw_code_box(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > terminal phase > attempt counter > ready
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(warning())))
    } else if app.phase == Phase::Accepted {
        Line::from(Span::styled(
            "✓ Code accepted",
            Style::default().fg(success()).add_modifier(Modifier::BOLD),
        ))
    } else if app.phase == Phase::LockedOut {
        Line::from(Span::styled(
            "✗ Attempt limit reached",
            Style::default().fg(danger()).add_modifier(Modifier::BOLD),
        ))
    } else if let Some(attempts) = app.attempts_display() {
        Line::from(Span::styled(
            format!("Attempt {}", attempts),
            Style::default().fg(text_dim()),
        ))
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(text_dim())))
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_code_box(f: &mut Frame, app: &App, area: Rect) {
    let n = app.input.len() as u16;
    let row_width = n * CELL_WIDTH + n.saturating_sub(1) * CELL_GAP;

    let box_area = centered_fixed(row_width + 4, CELL_HEIGHT + 2, area);

    let border_color = match app.phase {
        Phase::Entering => accent(),
        Phase::Checking => warning(),
        Phase::Accepted => success(),
        Phase::LockedOut => danger(),
    };

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", app.prompt),
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(box_area);
    f.render_widget(block, box_area);

    let cells_x = inner.x + (inner.width.saturating_sub(row_width)) / 2;
    let disabled = app.input.is_disabled();

    for (i, slot) in app.input.slots().iter().enumerate() {
        let cell = Rect {
            x: cells_x + i as u16 * (CELL_WIDTH + CELL_GAP),
            y: inner.y,
            width: CELL_WIDTH,
            height: CELL_HEIGHT,
        };
        if cell.x + cell.width > inner.x + inner.width {
            break; // Terminal too narrow for the full row
        }

        let focused = i == app.input.focused_slot() && !disabled;

        let cell_border = if disabled {
            Style::default().fg(inactive())
        } else if focused {
            Style::default().fg(accent()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(inactive())
        };

        let digit_style = if disabled {
            Style::default().fg(text_dim())
        } else if focused {
            Style::default()
                .fg(text())
                .bg(bg_selected())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(text()).add_modifier(Modifier::BOLD)
        };

        let shown = match slot {
            Some(_) if app.mask => '•',
            Some(c) => *c,
            None => '·',
        };
        let shown_style = if slot.is_some() {
            digit_style
        } else {
            digit_style.fg(text_dim()).remove_modifier(Modifier::BOLD)
        };

        let content = Paragraph::new(Line::from(Span::styled(shown.to_string(), shown_style)))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(cell_border),
            );
        f.render_widget(content, cell);

        if focused && app.popup == Popup::None {
            f.set_cursor_position((cell.x + cell.width / 2, cell.y + 1));
        }
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.phase {
        Phase::Entering => vec![
            ("0-9", "Type"),
            ("⌫", "Erase"),
            ("←→", "Move"),
            ("Ctrl+V", "Paste"),
            ("?", "Help"),
            ("Esc", "Cancel"),
        ],
        Phase::Checking => vec![("Esc", "Cancel")],
        _ => vec![],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 50 {
        3
    } else if area.width < 70 {
        4
    } else {
        hints.len()
    };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 70 { 90 } else { 60 },
        if area.height < 25 { 90 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "═══ Entering a code ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  0-9        ", Style::default().fg(accent())),
            Span::raw("Fill the focused cell and advance"),
        ]),
        Line::from(vec![
            Span::styled("  Backspace  ", Style::default().fg(accent())),
            Span::raw("Erase the cell, or the one before it when empty"),
        ]),
        Line::from(vec![
            Span::styled("  ←/→        ", Style::default().fg(accent())),
            Span::raw("Move between cells"),
        ]),
        Line::from(vec![
            Span::styled("  Ctrl+V     ", Style::default().fg(accent())),
            Span::raw("Paste a code from the clipboard (fills from the left)"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Verification ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::raw(
            "  A full code is submitted immediately. With --expect or --check",
        )]),
        Line::from(vec![Span::raw(
            "  a rejected code clears the cells for another try, up to the",
        )]),
        Line::from(vec![Span::raw("  configured attempt limit.")]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Scripting ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  kodo                 ", Style::default().fg(accent())),
            Span::raw("Print the entered code on stdout"),
        ]),
        Line::from(vec![
            Span::styled("  kodo --json          ", Style::default().fg(accent())),
            Span::raw("Machine-readable result"),
        ]),
        Line::from(vec![
            Span::styled("  kodo --check CMD     ", Style::default().fg(accent())),
            Span::raw("CMD gets the code as $1 and $KODO_CODE"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Config: ", Style::default().fg(text_dim())),
            Span::styled(
                "~/.config/kodo/config.toml",
                Style::default().fg(text_dim()),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰌋 kodo Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
