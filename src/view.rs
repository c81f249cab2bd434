//! Viewport state for interactive hosts: pan, zoom and hit testing.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::layout::Layout;
use crate::model::{Column, Table};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 4.0;
const FIT_MAX_SCALE: f64 = 1.5;
const FIT_PADDING: f64 = 60.0;

/// Maps world (layout) coordinates to screen coordinates:
/// `screen = world * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewTransform {
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.offset_x) / self.scale, (sy - self.offset_y) / self.scale)
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (wx * self.scale + self.offset_x, wy * self.scale + self.offset_y)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Zoom by `factor` keeping the screen point `(cx, cy)` fixed.
    pub fn zoom_at(&mut self, factor: f64, cx: f64, cy: f64) {
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = scale / self.scale;
        self.offset_x = cx - (cx - self.offset_x) * ratio;
        self.offset_y = cy - (cy - self.offset_y) * ratio;
        self.scale = scale;
    }

    /// Zoom level as a whole percentage.
    pub fn zoom_percent(&self) -> i64 {
        (self.scale * 100.0).round() as i64
    }

    /// Centre the whole layout in a viewport, never enlarging past 1.5x.
    /// `None` for an empty layout.
    pub fn fit(layout: &Layout, viewport_width: f64, viewport_height: f64) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = layout.bounds()?;
        let content_w = max_x - min_x + FIT_PADDING * 2.0;
        let content_h = max_y - min_y + FIT_PADDING * 2.0;

        let scale = (viewport_width / content_w)
            .min(viewport_height / content_h)
            .min(FIT_MAX_SCALE);

        Some(Self {
            scale,
            offset_x: (viewport_width - content_w * scale) / 2.0 - min_x * scale
                + FIT_PADDING * scale,
            offset_y: (viewport_height - content_h * scale) / 2.0 - min_y * scale
                + FIT_PADDING * scale,
        })
    }
}

/// First table (in schema order) whose box contains the world point.
pub fn table_at<'a>(layout: &Layout, tables: &'a [Table], wx: f64, wy: f64) -> Option<&'a Table> {
    tables.iter().find(|t| {
        layout
            .position(&t.name)
            .is_some_and(|pos| pos.contains(wx, wy))
    })
}

/// Table and column under a world point; the header row never matches.
pub fn column_at<'a>(
    layout: &Layout,
    tables: &'a [Table],
    config: &LayoutConfig,
    wx: f64,
    wy: f64,
) -> Option<(&'a Table, &'a Column)> {
    tables.iter().find_map(|table| {
        let pos = layout.position(&table.name)?;
        if wx < pos.x || wx > pos.right() || wy < pos.y + config.header_height || wy > pos.bottom()
        {
            return None;
        }
        let row = ((wy - pos.y - config.header_height) / config.row_height).floor() as usize;
        table.columns.get(row).map(|column| (table, column))
    })
}
