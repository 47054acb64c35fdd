//! Rendering helpers shared by the map screen.

pub mod map_canvas;
pub mod search_box;
