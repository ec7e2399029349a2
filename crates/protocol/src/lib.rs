pub mod commands;
pub mod theme;
pub mod types;
pub mod wire;

pub use commands::{RenderCommand, TextAlign};
pub use theme::ThemeToken;
pub use types::{CellRef, Point, Rect, Viewport};
pub use wire::{
    BusDetail, BusPayload, BusType, CreatedBus, SaveSeatMapRequest, SeatDefinition, SeatRecord,
};
