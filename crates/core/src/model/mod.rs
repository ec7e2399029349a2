pub mod cell;
pub mod layout;
pub mod tool;

pub use cell::{Cell, Coord};
pub use layout::{Dimensions, LayoutError, LayoutLimits, SeatLayout};
pub use tool::ToolMode;
