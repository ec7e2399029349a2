//! Seat-map layout engine: a 3D grid of seat and path cells, the editing
//! state machine over it, and conversion to and from the fleet backend's
//! seat records.

pub mod config;
pub mod editor;
pub mod flatten;
pub mod generate;
pub mod model;
pub mod parsers;
pub mod submit;
pub mod svg;
pub mod views;
