use seatplan_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};

use crate::model::{Coord, Dimensions, SeatLayout};

const HEADER_FONT_SIZE: f64 = 12.0;

/// Cell geometry in renderer units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub cell_w: f64,
    pub cell_h: f64,
    pub gap: f64,
    /// Space reserved above the grid for the deck title.
    pub header_h: f64,
    /// Horizontal space between two decks.
    pub deck_gap: f64,
}

impl GridMetrics {
    /// Character-cell metrics: 5-wide cells fit a code like `A01` with
    /// padding, one line tall.
    pub const TERMINAL: GridMetrics = GridMetrics {
        cell_w: 5.0,
        cell_h: 1.0,
        gap: 1.0,
        header_h: 2.0,
        deck_gap: 4.0,
    };

    /// Pixel metrics matching the 45px cells of the web dialog.
    pub const PIXELS: GridMetrics = GridMetrics {
        cell_w: 45.0,
        cell_h: 45.0,
        gap: 8.0,
        header_h: 24.0,
        deck_gap: 32.0,
    };

    /// Square cells scaled to fit every deck of `dims` side by side in
    /// `viewport`, capped at [`PIXELS`](Self::PIXELS) size.
    pub fn fit(viewport: &Viewport, dims: Dimensions) -> GridMetrics {
        let base = Self::PIXELS;
        let (w, h) = base.layout_extent(dims);
        if w <= 0.0 || h <= 0.0 {
            return base;
        }
        let scale = (viewport.width / w).min(viewport.height / h).min(1.0);
        GridMetrics {
            cell_w: base.cell_w * scale,
            cell_h: base.cell_h * scale,
            gap: base.gap * scale,
            header_h: base.header_h * scale,
            deck_gap: base.deck_gap * scale,
        }
    }

    /// Width and height of one deck, header included.
    pub fn deck_extent(&self, dims: Dimensions) -> (f64, f64) {
        let cols = dims.cols as f64;
        let rows = dims.rows as f64;
        let w = cols * self.cell_w + (cols - 1.0).max(0.0) * self.gap;
        let h = self.header_h + rows * self.cell_h + (rows - 1.0).max(0.0) * self.gap;
        (w, h)
    }

    /// Width and height of all decks laid out left to right.
    pub fn layout_extent(&self, dims: Dimensions) -> (f64, f64) {
        let (deck_w, deck_h) = self.deck_extent(dims);
        let decks = dims.decks as f64;
        let w = decks * deck_w + (decks - 1.0).max(0.0) * self.deck_gap;
        (w, deck_h)
    }

    fn cell_rect(&self, origin: Point, row: usize, col: usize) -> Rect {
        Rect::new(
            origin.x + col as f64 * (self.cell_w + self.gap),
            origin.y + self.header_h + row as f64 * (self.cell_h + self.gap),
            self.cell_w,
            self.cell_h,
        )
    }

    fn deck_origin(&self, viewport: &Viewport, dims: Dimensions, deck: usize) -> Point {
        let (deck_w, _) = self.deck_extent(dims);
        Point::new(
            viewport.x + deck as f64 * (deck_w + self.deck_gap),
            viewport.y,
        )
    }
}

/// Cells to draw with a highlight border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Highlight {
    pub cursor: Option<Coord>,
    /// The cell open in the code editor. Wins over `cursor`.
    pub editing: Option<Coord>,
}

impl Highlight {
    fn border_for(&self, coord: Coord) -> Option<ThemeToken> {
        if self.editing == Some(coord) {
            Some(ThemeToken::SelectionHighlight)
        } else if self.cursor == Some(coord) {
            Some(ThemeToken::HoverHighlight)
        } else {
            None
        }
    }
}

/// Render one deck of the layout at the deck's slot in `viewport`.
///
/// Seats are filled and labelled with their code. Paths get a muted fill,
/// a border and no label.
pub fn render_deck(
    layout: &SeatLayout,
    deck: usize,
    viewport: &Viewport,
    metrics: &GridMetrics,
    highlight: &Highlight,
) -> Vec<RenderCommand> {
    let dims = layout.dimensions();
    if deck >= dims.decks {
        return Vec::new();
    }

    let origin = metrics.deck_origin(viewport, dims, deck);
    let mut commands = Vec::with_capacity(dims.rows * dims.cols + 3);

    commands.push(RenderCommand::BeginGroup {
        id: format!("deck-{deck}"),
        label: Some(format!("Deck {}", deck + 1)),
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(origin.x, origin.y + metrics.header_h * 0.5),
        text: format!("Deck {}", deck + 1),
        color: ThemeToken::DeckHeaderText,
        font_size: HEADER_FONT_SIZE,
        align: TextAlign::Left,
    });

    for row in 0..dims.rows {
        for col in 0..dims.cols {
            let coord = Coord::new(deck, row, col);
            let Some(cell) = layout.get(coord) else {
                continue;
            };
            let rect = metrics.cell_rect(origin, row, col);
            let border = highlight.border_for(coord);
            let cmd = if cell.is_seat {
                RenderCommand::DrawRect {
                    rect,
                    color: ThemeToken::SeatFill,
                    border_color: border,
                    label: Some(cell.code.clone()),
                    cell: Some(coord.into()),
                }
            } else {
                RenderCommand::DrawRect {
                    rect,
                    color: ThemeToken::PathFill,
                    border_color: border.or(Some(ThemeToken::PathBorder)),
                    label: None,
                    cell: Some(coord.into()),
                }
            };
            commands.push(cmd);
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

/// Render every deck side by side.
pub fn render_layout(
    layout: &SeatLayout,
    viewport: &Viewport,
    metrics: &GridMetrics,
    highlight: &Highlight,
) -> Vec<RenderCommand> {
    (0..layout.dimensions().decks)
        .flat_map(|deck| render_deck(layout, deck, viewport, metrics, highlight))
        .collect()
}

/// Map a point in renderer units back to the cell under it. Gaps and
/// headers hit nothing.
pub fn hit_test(
    dims: Dimensions,
    viewport: &Viewport,
    metrics: &GridMetrics,
    point: Point,
) -> Option<Coord> {
    (0..dims.decks).find_map(|deck| {
        let origin = metrics.deck_origin(viewport, dims, deck);
        let x = point.x - origin.x;
        let y = point.y - origin.y - metrics.header_h;
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / (metrics.cell_w + metrics.gap)).floor() as usize;
        let row = (y / (metrics.cell_h + metrics.gap)).floor() as usize;
        if row >= dims.rows || col >= dims.cols {
            return None;
        }
        metrics
            .cell_rect(origin, row, col)
            .contains(point)
            .then_some(Coord::new(deck, row, col))
    })
}
