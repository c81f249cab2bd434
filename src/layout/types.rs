//! Data structures for layout results.

use std::collections::BTreeMap;

use serde::Serialize;

/// A table's box in layout coordinates, origin at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Position {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Edges count as inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Computed layout: positions keyed by table name, kept apart from the
/// schema so re-layout never touches table data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub positions: BTreeMap<String, Position>,
    /// Table names per layer, top to bottom, in final left-to-right order.
    pub layers: Vec<Vec<String>>,
    /// Canvas extent: far table edges plus the outer padding.
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Exact lookup first, then case-insensitive.
    pub fn position(&self, name: &str) -> Option<&Position> {
        self.positions.get(name).or_else(|| {
            self.positions
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, p)| p)
        })
    }

    pub fn position_mut(&mut self, name: &str) -> Option<&mut Position> {
        let key = if self.positions.contains_key(name) {
            name.to_string()
        } else {
            self.positions
                .keys()
                .find(|k| k.eq_ignore_ascii_case(name))?
                .clone()
        };
        self.positions.get_mut(&key)
    }

    /// Move a table, e.g. while it is being dragged. The canvas grows to
    /// keep the table inside; it never shrinks. Returns false for an
    /// unknown table.
    pub fn move_table(&mut self, name: &str, x: f64, y: f64) -> bool {
        let Some(pos) = self.position_mut(name) else {
            return false;
        };
        pos.x = x;
        pos.y = y;
        let (right, bottom) = (pos.right(), pos.bottom());
        self.width = self.width.max(right);
        self.height = self.height.max(bottom);
        true
    }

    /// Layer index of a table.
    pub fn layer_of(&self, name: &str) -> Option<usize> {
        self.layers
            .iter()
            .position(|layer| layer.iter().any(|n| n.eq_ignore_ascii_case(name)))
    }

    /// `(min_x, min_y, max_x, max_y)` over all tables.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        if self.positions.is_empty() {
            return None;
        }
        let mut bounds = (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for pos in self.positions.values() {
            bounds.0 = bounds.0.min(pos.x);
            bounds.1 = bounds.1.min(pos.y);
            bounds.2 = bounds.2.max(pos.right());
            bounds.3 = bounds.3.max(pos.bottom());
        }
        Some(bounds)
    }
}
