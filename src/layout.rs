//! Layered placement of tables for the diagram.
//!
//! Tables are layered by their references (referenced tables above the
//! tables pointing at them), ordered within layers by barycenter, then
//! nudged horizontally toward connected tables before overlaps are
//! resolved.

mod analysis;
mod anchors;
mod engine;
mod placement;
mod types;

pub use anchors::{EdgeAnchor, Side, edge_anchors};
pub use engine::LayoutEngine;
pub use placement::{column_icons, row_label, table_size};
pub use types::{Layout, Position};
