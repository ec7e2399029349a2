//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write as _;

use seatplan_protocol::{RenderCommand, TextAlign, ThemeToken};

use crate::model::SeatLayout;
use crate::views::{GridMetrics, Highlight, render_layout};

const PADDING: f64 = 16.0;

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the color palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:12px">"#,
    );

    let bg = resolve_color(ThemeToken::Background, dark);
    let _ = write!(svg, r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#);

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                ..
            } => {
                let fill = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}" rx="6""#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                if let Some(border) = border_color {
                    let stroke = resolve_color(*border, dark);
                    let dash = if *border == ThemeToken::PathBorder {
                        r#" stroke-dasharray="4 3""#
                    } else {
                        ""
                    };
                    let _ = write!(svg, r#" stroke="{stroke}" stroke-width="1.5"{dash}"#);
                }
                svg.push_str("/>");

                if let Some(label) = label {
                    let text_color = resolve_color(ThemeToken::SeatText, dark);
                    let _ = write!(
                        svg,
                        r#"<text x="{}" y="{}" fill="{text_color}" text-anchor="middle" dominant-baseline="middle" font-weight="bold">{}</text>"#,
                        rect.x + rect.w / 2.0,
                        rect.y + rect.h / 2.0,
                        escape_xml(label),
                    );
                }
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let fill = resolve_color(*color, dark);
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{fill}" font-size="{font_size}" text-anchor="{anchor}" dominant-baseline="middle">{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                );
            }
            RenderCommand::BeginGroup { id, .. } => {
                let _ = write!(svg, r#"<g id="{}">"#, escape_xml(id));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Render every deck of `layout` as a standalone SVG at web-dialog scale.
pub fn render_layout_svg(layout: &SeatLayout, dark: bool) -> String {
    let metrics = GridMetrics::PIXELS;
    let (w, h) = metrics.layout_extent(layout.dimensions());
    let viewport = seatplan_protocol::Viewport {
        x: PADDING,
        y: PADDING,
        width: w,
        height: h,
        dpr: 1.0,
    };
    let commands = render_layout(layout, &viewport, &metrics, &Highlight::default());
    render_svg(&commands, w + 2.0 * PADDING, h + 2.0 * PADDING, dark)
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::SeatFill => "#42a5f5",
            ThemeToken::SeatText => "#0d1b2a",
            ThemeToken::PathFill => "#262626",
            ThemeToken::PathBorder => "#5c5c5c",
            ThemeToken::DeckHeaderText => "#ececec",
            ThemeToken::HoverHighlight => "#ffeb3b",
            ThemeToken::SelectionHighlight => "#66bb6a",
            ThemeToken::Background => "#181818",
        }
    } else {
        match token {
            ThemeToken::SeatFill => "#1976d2",
            ThemeToken::SeatText => "#ffffff",
            ThemeToken::PathFill => "#f5f5f5",
            ThemeToken::PathBorder => "#cccccc",
            ThemeToken::DeckHeaderText => "#1a1a2e",
            ThemeToken::HoverHighlight => "#ffb300",
            ThemeToken::SelectionHighlight => "#2e7d32",
            ThemeToken::Background => "#ffffff",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::default_layout;
    use crate::model::{Cell, Coord, Dimensions};
    use seatplan_protocol::Rect;

    #[test]
    fn basic_svg_output() {
        let commands = vec![RenderCommand::DrawRect {
            rect: Rect::new(10.0, 20.0, 45.0, 45.0),
            color: ThemeToken::SeatFill,
            border_color: None,
            label: Some("A01".into()),
            cell: None,
        }];
        let svg = render_svg(&commands, 400.0, 200.0, false);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(">A01</text>"));
        assert!(svg.contains("#1976d2"));
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 45.0, 45.0),
            color: ThemeToken::SeatFill,
            border_color: None,
            label: Some("<A&1>".into()),
            cell: None,
        }];
        let svg = render_svg(&commands, 100.0, 100.0, true);
        assert!(svg.contains("&lt;A&amp;1&gt;"));
    }

    #[test]
    fn layout_svg_has_one_group_per_deck_and_dashed_paths() {
        let mut layout = default_layout(Dimensions::new(2, 2, 2));
        *layout.get_mut(Coord::new(1, 0, 0)).unwrap() = Cell::path();
        let svg = render_layout_svg(&layout, false);
        assert_eq!(svg.matches("<g id=").count(), 2);
        assert!(svg.contains(r#"id="deck-1""#));
        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
        assert!(svg.contains(">Deck 2</text>"));
        assert!(!svg.contains(">B01<"));
    }
}
