use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, MouseButton, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
};
use seatplan_core::editor::CellEditor;
use seatplan_core::submit::BusBackend;
use seatplan_core::views::{GridMetrics, Highlight, hit_test, render_layout};
use seatplan_protocol::{Point, RenderCommand, ThemeToken, Viewport};

use crate::app::App;

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::SeatFill => Color::Blue,
        ThemeToken::SeatText => Color::White,
        ThemeToken::PathFill => Color::Black,
        ThemeToken::PathBorder => Color::DarkGray,
        ThemeToken::DeckHeaderText => Color::Cyan,
        ThemeToken::HoverHighlight => Color::LightYellow,
        ThemeToken::SelectionHighlight => Color::Green,
        ThemeToken::Background => Color::Black,
    }
}

/// Where the grid sits on screen: below the header, two columns in.
pub fn grid_viewport(area: Rect) -> Viewport {
    Viewport {
        x: f64::from(area.x) + 2.0,
        y: f64::from(area.y) + 1.0,
        width: f64::from(area.width.saturating_sub(2)),
        height: f64::from(area.height.saturating_sub(3)),
        dpr: 1.0,
    }
}

fn put_str(buf: &mut Buffer, x: u16, y: u16, text: &str, style: Style) {
    let area = *buf.area();
    if y < area.y || y >= area.bottom() {
        return;
    }
    for (i, ch) in text.chars().enumerate() {
        let Some(cx) = x.checked_add(i as u16) else {
            break;
        };
        if cx < area.x {
            continue;
        }
        if cx >= area.right() {
            break;
        }
        buf[(cx, y)].set_char(ch).set_style(style);
    }
}

/// Text shown inside a cell `width` characters wide.
fn cell_text(label: Option<&str>, highlighted: bool, width: usize) -> String {
    let inner = width.saturating_sub(2);
    let body = match label {
        Some(code) => {
            let code: String = code.chars().take(inner).collect();
            format!("{code:^inner$}")
        }
        None => format!("{:^inner$}", "·"),
    };
    if highlighted {
        format!("[{body}]")
    } else {
        format!(" {body} ")
    }
}

/// Paint grid commands into `buf`, one terminal cell per renderer unit.
pub fn draw_commands(buf: &mut Buffer, cmds: &[RenderCommand]) {
    for cmd in cmds {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                ..
            } => {
                let highlighted = matches!(
                    border_color,
                    Some(ThemeToken::HoverHighlight | ThemeToken::SelectionHighlight)
                );
                let mut style = if label.is_some() {
                    Style::default()
                        .fg(theme_to_color(ThemeToken::SeatText))
                        .bg(theme_to_color(*color))
                } else {
                    Style::default()
                        .fg(theme_to_color(ThemeToken::PathBorder))
                        .bg(theme_to_color(*color))
                };
                if highlighted && let Some(token) = border_color {
                    style = style.fg(theme_to_color(*token)).add_modifier(Modifier::BOLD);
                }
                let text = cell_text(label.as_deref(), highlighted, rect.w as usize);
                put_str(buf, rect.x as u16, rect.y as u16, &text, style);
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                ..
            } => {
                let style = Style::default()
                    .fg(theme_to_color(*color))
                    .add_modifier(Modifier::BOLD);
                put_str(buf, position.x as u16, position.y as u16, text, style);
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Popup title: the cell, its code before editing, and `*` once the draft
/// differs from it.
fn editor_title(editor: &CellEditor) -> String {
    let dirty = if editor.is_dirty() { " *" } else { "" };
    format!(" Seat {} at {}{dirty} ", editor.original(), editor.coord())
}

fn draw_editor(frame: &mut Frame, editor: &CellEditor) {
    let area = popup_area(frame.area(), 32, 4);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(editor_title(editor))
        .title_bottom(" enter apply · esc cancel ")
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    let text = format!("{}_", editor.draft());
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw<B: BusBackend>(frame: &mut Frame, app: &App<B>) -> Viewport {
    let area = frame.area();

    let header_area = Rect::new(area.x, area.y, area.width, 1);
    let header = Block::default()
        .title(app.title())
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, header_area);

    let viewport = grid_viewport(area);
    let highlight = Highlight {
        cursor: Some(app.cursor),
        editing: app.session.editor().map(CellEditor::coord),
    };
    let cmds = render_layout(
        app.session.layout(),
        &viewport,
        &GridMetrics::TERMINAL,
        &highlight,
    );
    draw_commands(frame.buffer_mut(), &cmds);

    let hint = app.session.cell_hint(app.cursor);
    let footer_area = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1);
    let footer = Paragraph::new(format!(" {hint} │ {}", app.status))
        .style(Style::default().fg(Color::Gray).bg(Color::Black));
    frame.render_widget(footer, footer_area);

    if let Some(editor) = app.session.editor() {
        draw_editor(frame, editor);
    }
    viewport
}

/// Run the interactive editor until the user quits or a save succeeds.
pub fn run_tui<B: BusBackend>(app: &mut App<B>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: BusBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App<B>,
) -> Result<()> {
    while !app.should_quit {
        let mut viewport = None;
        terminal.draw(|frame| viewport = Some(draw(frame, app)))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => app.handle_key(key),
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                if app.session.editor().is_some() {
                    continue;
                }
                let Some(viewport) = viewport else {
                    continue;
                };
                let point = Point::new(f64::from(mouse.column), f64::from(mouse.row));
                let dims = app.session.layout().dimensions();
                if let Some(coord) = hit_test(dims, &viewport, &GridMetrics::TERMINAL, point) {
                    app.click_at(coord);
                }
            }
            _ => {}
        }
    }
    Ok(())
}
