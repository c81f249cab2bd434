//! Table sizing and placement.

use crate::config::LayoutConfig;
use crate::measure::TextMeasurer;
use crate::model::{Column, Table};

use super::analysis::DependencyGraph;
use super::types::Position;

/// Key/link/unique markers shown before a column name.
pub fn column_icons(column: &Column) -> String {
    let mut icons = String::new();
    if column.is_primary_key {
        icons.push('🔑');
    }
    if column.foreign_key.is_some() {
        icons.push('🔗');
    }
    if column.is_unique && !column.is_primary_key {
        icons.push('◆');
    }
    icons
}

/// Text of one column row as rendered: icons, name, then the type.
pub fn row_label(column: &Column) -> String {
    format!(
        "{} {}  {}",
        column_icons(column),
        column.name,
        column.data_type.to_uppercase()
    )
}

/// Width and height of a table box.
///
/// Width fits the widest of header and rows, clamped to the configured
/// band and rounded up to a whole pixel.
pub fn table_size<M: TextMeasurer + ?Sized>(
    table: &Table,
    config: &LayoutConfig,
    measurer: &M,
) -> (f64, f64) {
    let header = measurer.measure(&config.header_font, &table.name) + config.header_margin;
    let widest = table
        .columns
        .iter()
        .map(|c| measurer.measure(&config.column_font, &row_label(c)) + config.row_margin)
        .fold(header, f64::max);

    let width = (widest + config.width_padding)
        .min(config.max_width)
        .max(config.min_width)
        .ceil();
    let height = config.header_height
        + table.columns.len() as f64 * config.row_height
        + config.table_padding;

    (width, height)
}

/// Initial grid: layers stacked top to bottom, each centred against the
/// widest layer. Returns positions indexed by table.
pub fn place_layers(
    layers: &[Vec<usize>],
    sizes: &[(f64, f64)],
    config: &LayoutConfig,
) -> Vec<Position> {
    let mut positions: Vec<Position> = sizes
        .iter()
        .map(|&(width, height)| Position {
            x: 0.0,
            y: 0.0,
            width,
            height,
        })
        .collect();

    let layer_width = |layer: &[usize]| -> f64 {
        let boxes: f64 = layer.iter().map(|&t| sizes[t].0).sum();
        boxes + config.gap_x * layer.len().saturating_sub(1) as f64
    };
    let max_layer_width = layers
        .iter()
        .map(|l| layer_width(l.as_slice()))
        .fold(0.0, f64::max);

    let mut y = config.padding_y;
    for layer in layers {
        let mut x = config.padding_x + (max_layer_width - layer_width(layer.as_slice())) / 2.0;
        let mut tallest: f64 = 0.0;
        for &t in layer {
            positions[t].x = x;
            positions[t].y = y;
            x += sizes[t].0 + config.gap_x;
            tallest = tallest.max(sizes[t].1);
        }
        y += tallest + config.gap_y;
    }

    positions
}

fn mean_center(members: &[usize], positions: &[Position]) -> Option<f64> {
    if members.is_empty() {
        return None;
    }
    let sum: f64 = members.iter().map(|&t| positions[t].center_x()).sum();
    Some(sum / members.len() as f64)
}

/// Iterative horizontal relaxation.
///
/// Each pass pulls tables toward the mean centre of their parents (top to
/// bottom) and then toward the mean centre of their children (bottom to
/// top). Updates apply immediately, so later tables see moved neighbours.
pub fn relax(
    graph: &DependencyGraph,
    layers: &[Vec<usize>],
    positions: &mut [Position],
    config: &LayoutConfig,
) {
    for _ in 0..config.relaxation_passes {
        for layer in layers.iter().skip(1) {
            for &t in layer {
                if let Some(target) = mean_center(&graph.parents[t], positions) {
                    positions[t].x += (target - positions[t].center_x()) * config.forward_pull;
                }
            }
        }

        for layer in layers[..layers.len().saturating_sub(1)].iter().rev() {
            for &t in layer {
                if let Some(target) = mean_center(&graph.children[t], positions) {
                    positions[t].x += (target - positions[t].center_x()) * config.backward_pull;
                }
            }
        }
    }
}

/// Push tables right so neighbours within a layer keep `min_gap` apart.
///
/// Works on whole units (x rounded, gap rounded up) so later integral
/// translation cannot eat into the gap.
pub fn resolve_overlaps(layers: &[Vec<usize>], positions: &mut [Position], config: &LayoutConfig) {
    let gap = config.min_gap.ceil();
    for layer in layers {
        for &t in layer {
            positions[t].x = positions[t].x.round();
        }
        let mut order = layer.clone();
        order.sort_by(|&a, &b| positions[a].x.total_cmp(&positions[b].x));

        for pair in order.windows(2) {
            let (prev, cur) = (pair[0], pair[1]);
            let min_x = positions[prev].right() + gap;
            if positions[cur].x < min_x {
                positions[cur].x = min_x;
            }
        }
    }
}

/// Translate so the top-left table sits at the padding, then round.
///
/// The shift itself is a whole number, so integral horizontal gaps are
/// kept exactly.
pub fn normalize(positions: &mut [Position], config: &LayoutConfig) {
    let min_x = positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }

    let shift_x = (config.padding_x - min_x).round();
    let shift_y = (config.padding_y - min_y).round();
    for pos in positions.iter_mut() {
        pos.x = (pos.x + shift_x).round();
        pos.y = (pos.y + shift_y).round();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForeignKeyRef;

    fn fixed(_font: &str, text: &str) -> f64 {
        text.chars().count() as f64 * 7.0
    }

    fn boxed(x: f64, y: f64) -> Position {
        Position {
            x,
            y,
            width: 240.0,
            height: 70.0,
        }
    }

    fn column(name: &str, data_type: &str) -> Column {
        Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_icons() {
        let mut col = column("id", "INT");
        col.is_primary_key = true;
        col.is_unique = true;
        assert_eq!(column_icons(&col), "🔑");

        let mut col = column("user_id", "INT");
        col.is_unique = true;
        col.foreign_key = Some(ForeignKeyRef {
            table: "users".to_string(),
            column: "id".to_string(),
        });
        assert_eq!(column_icons(&col), "🔗◆");
        assert_eq!(row_label(&col), "🔗◆ user_id  INT");
    }

    #[test]
    fn test_small_table_uses_min_width() {
        let config = LayoutConfig::default();
        let mut table = Table::new("t", None);
        table.columns.push(column("id", "INT"));
        let (w, h) = table_size(&table, &config, &fixed);
        assert_eq!(w, 240.0);
        assert_eq!(h, 36.0 + 26.0 + 8.0);
    }

    #[test]
    fn test_wide_table_capped() {
        let config = LayoutConfig::default();
        let mut table = Table::new("t", None);
        table.columns.push(column(&"x".repeat(100), "VARCHAR(255)"));
        let (w, _) = table_size(&table, &config, &fixed);
        assert_eq!(w, 380.0);
    }

    #[test]
    fn test_width_rounded_up() {
        let config = LayoutConfig::default();
        let measure = |_: &str, _: &str| 250.2;
        let table = Table::new("t", None);
        // 250.2 + 60 + 30
        let (w, h) = table_size(&table, &config, &measure);
        assert_eq!(w, 341.0);
        assert_eq!(h, 44.0);
    }

    #[test]
    fn test_layers_are_centred() {
        let config = LayoutConfig::default();
        let sizes = vec![(240.0, 70.0), (240.0, 96.0), (240.0, 70.0)];
        let layers = vec![vec![0, 1], vec![2]];
        let positions = place_layers(&layers, &sizes, &config);

        assert_eq!(positions[0].x, 80.0);
        assert_eq!(positions[1].x, 80.0 + 240.0 + 120.0);
        assert_eq!(positions[2].x, 80.0 + 180.0);
        assert_eq!(positions[2].y, 70.0 + 96.0 + 90.0);
    }

    #[test]
    fn test_resolve_overlaps_pushes_right() {
        let config = LayoutConfig::default();
        let mut positions = vec![boxed(100.0, 0.0), boxed(50.0, 0.0)];
        resolve_overlaps(&[vec![0, 1]], &mut positions, &config);
        assert_eq!(positions[1].x, 50.0);
        assert_eq!(positions[0].x, 50.0 + 240.0 + 50.0);
    }

    #[test]
    fn test_fractional_min_gap_survives_normalize() {
        let config = LayoutConfig {
            min_gap: 50.5,
            ..LayoutConfig::default()
        };
        let mut positions = vec![boxed(10.3, 0.0), boxed(20.7, 0.0), boxed(30.4, 0.0)];
        let layers = [vec![0, 1, 2]];
        resolve_overlaps(&layers, &mut positions, &config);
        normalize(&mut positions, &config);

        for pair in positions.windows(2) {
            assert!(pair[0].right() + 50.5 <= pair[1].x);
        }
        assert_eq!(positions[0].x, 80.0);
        assert_eq!(positions[1].x, 80.0 + 240.0 + 51.0);
    }

    #[test]
    fn test_normalize_moves_to_padding() {
        let config = LayoutConfig::default();
        let mut positions = vec![boxed(-30.4, 10.0), boxed(500.2, 200.6)];
        normalize(&mut positions, &config);
        assert_eq!((positions[0].x, positions[0].y), (80.0, 70.0));
        assert_eq!((positions[1].x, positions[1].y), (610.0, 261.0));
    }
}
