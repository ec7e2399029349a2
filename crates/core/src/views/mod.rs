pub mod seat_grid;

pub use seat_grid::{GridMetrics, Highlight, hit_test, render_deck, render_layout};
