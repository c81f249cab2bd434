//! Edge attachment points for relationship lines.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::model::{Endpoint, Schema, Table};

use super::types::{Layout, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Where a relationship line leaves its source table and enters its target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeAnchor {
    /// Index into `Schema::relationships`.
    pub relationship: usize,
    pub from: (f64, f64),
    pub from_side: Side,
    pub to: (f64, f64),
    pub to_side: Side,
}

/// Vertical centre of the row holding the first endpoint column, or of the
/// first row when none of the columns exist.
fn row_center(table: &Table, endpoint: &Endpoint, pos: &Position, config: &LayoutConfig) -> f64 {
    let row = table
        .columns
        .iter()
        .position(|c| {
            endpoint
                .columns
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&c.name))
        })
        .unwrap_or(0);
    pos.y + config.header_height + row as f64 * config.row_height + config.row_height / 2.0
}

/// Anchors for every relationship whose tables are both laid out.
///
/// Lines leave from the facing sides: a source left of its target exits
/// right and enters the target on the left, and vice versa. Self
/// references use the right edge at both ends.
pub fn edge_anchors(layout: &Layout, schema: &Schema, config: &LayoutConfig) -> Vec<EdgeAnchor> {
    let mut anchors = Vec::new();

    for (index, rel) in schema.relationships.iter().enumerate() {
        let (Some(from_table), Some(to_table)) =
            (schema.table(&rel.from.table), schema.table(&rel.to.table))
        else {
            continue;
        };
        let (Some(from_pos), Some(to_pos)) =
            (layout.position(&from_table.name), layout.position(&to_table.name))
        else {
            continue;
        };

        let from_y = row_center(from_table, &rel.from, from_pos, config);
        let to_y = row_center(to_table, &rel.to, to_pos, config);

        let (from_x, from_side, to_x, to_side) = if rel.is_self_reference() {
            (from_pos.right(), Side::Right, to_pos.right(), Side::Right)
        } else if from_pos.center_x() < to_pos.center_x() {
            (from_pos.right(), Side::Right, to_pos.x, Side::Left)
        } else {
            (from_pos.x, Side::Left, to_pos.right(), Side::Right)
        };

        anchors.push(EdgeAnchor {
            relationship: index,
            from: (from_x, from_y),
            from_side,
            to: (to_x, to_y),
            to_side,
        });
    }

    anchors
}
