//! Layout engine core implementation.

use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::measure::TextMeasurer;
use crate::model::{Relationship, Table};

use super::analysis::{DependencyGraph, assign_layers, order_layers};
use super::placement::{normalize, place_layers, relax, resolve_overlaps, table_size};
use super::types::Layout;

/// Layout engine configuration and computation.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub(crate) config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute positions for `tables`. Relationships only shape the
    /// layering; ones naming unknown tables are ignored.
    pub fn layout<M: TextMeasurer + ?Sized>(
        &self,
        tables: &[Table],
        relationships: &[Relationship],
        measurer: &M,
    ) -> Layout {
        if tables.is_empty() {
            return Layout::default();
        }

        // Box sizes feed every phase below
        let sizes: Vec<(f64, f64)> = tables
            .iter()
            .map(|t| table_size(t, &self.config, measurer))
            .collect();

        // Phase 1: Layer assignment
        let graph = DependencyGraph::build(tables, relationships);
        let mut layers = assign_layers(&graph);

        // Phase 2: Barycenter ordering
        order_layers(&graph, &mut layers);
        debug!(layers = layers.len(), "assigned layers");

        // Phase 3: Initial placement
        let mut positions = place_layers(&layers, &sizes, &self.config);

        // Phase 4: Relaxation
        relax(&graph, &layers, &mut positions, &self.config);

        // Phase 5: Overlap resolution
        resolve_overlaps(&layers, &mut positions, &self.config);

        // Phase 6: Normalization
        normalize(&mut positions, &self.config);

        let mut layout = Layout::default();
        for (table, pos) in tables.iter().zip(positions) {
            layout.positions.entry(table.name.clone()).or_insert(pos);
        }
        layout.layers = layers
            .iter()
            .map(|layer| layer.iter().map(|&t| tables[t].name.clone()).collect())
            .collect();
        if let Some((_, _, max_x, max_y)) = layout.bounds() {
            layout.width = max_x + self.config.padding_x;
            layout.height = max_y + self.config.padding_y;
        }

        info!(tables = tables.len(), layers = layout.layers.len(), "computed layout");
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::extract;

    fn fixed(_font: &str, text: &str) -> f64 {
        text.chars().count() as f64 * 7.0
    }

    fn layout_sql(sql: &str) -> Layout {
        let schema = extract(sql);
        LayoutEngine::default().layout(&schema.tables, &schema.relationships, &fixed)
    }

    fn assert_no_overlap(layout: &Layout, min_gap: f64) {
        for layer in &layout.layers {
            let mut boxes: Vec<_> = layer.iter().filter_map(|n| layout.position(n)).collect();
            boxes.sort_by(|a, b| a.x.total_cmp(&b.x));
            for pair in boxes.windows(2) {
                assert!(
                    pair[1].x >= pair[0].right() + min_gap,
                    "overlap: {:?} {:?}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let layout = LayoutEngine::default().layout(&[], &[], &fixed);
        assert!(layout.is_empty());
        assert!(layout.layers.is_empty());
    }

    #[test]
    fn test_single_table_at_padding() {
        let layout = layout_sql("CREATE TABLE t (id INT);");
        let pos = layout.position("t").unwrap();
        assert_eq!((pos.x, pos.y), (80.0, 70.0));
        assert_eq!(layout.width, 80.0 + 240.0 + 80.0);
        assert_eq!(layout.height, 70.0 + 70.0 + 70.0);
    }

    #[test]
    fn test_chain_descends() {
        let layout = layout_sql(
            r#"
            CREATE TABLE c (id INT, b_id INT REFERENCES b(id));
            CREATE TABLE b (id INT, a_id INT REFERENCES a(id));
            CREATE TABLE a (id INT);
            "#,
        );
        let y = |n: &str| layout.position(n).unwrap().y;
        assert!(y("a") < y("b"));
        assert!(y("b") < y("c"));
        assert_eq!(layout.layers, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn test_star_has_no_overlap() {
        let layout = layout_sql(
            r#"
            CREATE TABLE hub (id INT);
            CREATE TABLE s1 (id INT, h INT REFERENCES hub(id));
            CREATE TABLE s2 (id INT, h INT REFERENCES hub(id));
            CREATE TABLE s3 (id INT, h INT REFERENCES hub(id));
            CREATE TABLE s4 (id INT, h INT REFERENCES hub(id));
            CREATE TABLE s5 (id INT, h INT REFERENCES hub(id));
            "#,
        );
        assert_eq!(layout.len(), 6);
        assert_eq!(layout.layers[1].len(), 5);
        assert_no_overlap(&layout, 50.0);
    }

    #[test]
    fn test_mutual_references_still_placed() {
        let layout = layout_sql(
            r#"
            CREATE TABLE a (id INT, b_id INT REFERENCES b(id));
            CREATE TABLE b (id INT, a_id INT REFERENCES a(id));
            "#,
        );
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.layers.concat().len(), 2);
    }

    #[test]
    fn test_self_reference_does_not_affect_layering() {
        let layout = layout_sql("CREATE TABLE emp (id INT, boss_id INT REFERENCES emp(id));");
        assert_eq!(layout.layers, vec![vec!["emp"]]);
    }

    #[test]
    fn test_coordinates_are_integral() {
        let layout = layout_sql(
            r#"
            CREATE TABLE a (id INT);
            CREATE TABLE b (id INT, a_id INT REFERENCES a(id));
            CREATE TABLE c (id INT, a_id INT REFERENCES a(id), b_id INT REFERENCES b(id));
            "#,
        );
        for pos in layout.positions.values() {
            assert_eq!(pos.x, pos.x.round());
            assert_eq!(pos.y, pos.y.round());
            assert!(pos.x >= 80.0 && pos.y >= 70.0);
        }
    }

    #[test]
    fn test_relaxation_disabled_keeps_grid() {
        let config = LayoutConfig {
            relaxation_passes: 0,
            ..LayoutConfig::default()
        };
        let schema = extract(
            r#"
            CREATE TABLE a (id INT);
            CREATE TABLE b (id INT);
            "#,
        );
        let layout =
            LayoutEngine::new(config).layout(&schema.tables, &schema.relationships, &fixed);
        assert_eq!(layout.position("a").unwrap().x, 80.0);
        assert_eq!(layout.position("b").unwrap().x, 80.0 + 240.0 + 120.0);
    }

    #[test]
    fn test_fractional_min_gap_is_kept() {
        let config = LayoutConfig {
            min_gap: 50.5,
            ..LayoutConfig::default()
        };
        let mut sql = String::from("CREATE TABLE hub (id INT);");
        for i in 0..8 {
            sql.push_str(&format!("CREATE TABLE s{i} (id INT, h INT REFERENCES hub(id));"));
        }
        let schema = extract(&sql);
        let layout =
            LayoutEngine::new(config).layout(&schema.tables, &schema.relationships, &fixed);
        assert_eq!(layout.layers[1].len(), 8);
        assert_no_overlap(&layout, 50.5);
    }
}
