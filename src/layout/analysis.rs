//! Dependency analysis: reference graph, layering and in-layer ordering.

use std::collections::HashMap;

use crate::model::{Relationship, Table};

/// Reference graph over table indices.
///
/// Edges run from the referencing table to the referenced one. Self
/// references and relationships naming unknown tables are left out.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Tables that reference table `i`.
    pub children: Vec<Vec<usize>>,
    /// Tables that table `i` references.
    pub parents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn build(tables: &[Table], relationships: &[Relationship]) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, table) in tables.iter().enumerate() {
            index.entry(table.name.to_ascii_lowercase()).or_insert(i);
        }

        let mut children = vec![Vec::new(); tables.len()];
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];

        for rel in relationships {
            let from = index.get(&rel.from.table.to_ascii_lowercase());
            let to = index.get(&rel.to.table.to_ascii_lowercase());
            let (Some(&from), Some(&to)) = (from, to) else {
                continue;
            };
            if from == to || parents[from].contains(&to) {
                continue;
            }
            parents[from].push(to);
            children[to].push(from);
        }

        Self { children, parents }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    fn sort_by_child_count(&self, layer: &mut [usize]) {
        layer.sort_by(|&a, &b| self.children[b].len().cmp(&self.children[a].len()));
    }
}

/// Topological layering.
///
/// Layer 0 holds tables that reference nothing; each following layer holds
/// tables whose parents are all placed. When every table is on a cycle the
/// table with the most children seeds layer 0. Tables never reached end up
/// together in a final layer.
pub fn assign_layers(graph: &DependencyGraph) -> Vec<Vec<usize>> {
    let n = graph.len();
    let mut layers = Vec::new();
    if n == 0 {
        return layers;
    }

    let mut assigned = vec![false; n];
    let mut current: Vec<usize> = (0..n).filter(|&i| graph.parents[i].is_empty()).collect();

    if current.is_empty() {
        // First table wins ties
        let seed = (0..n).fold(0, |best, i| {
            if graph.children[i].len() > graph.children[best].len() {
                i
            } else {
                best
            }
        });
        current.push(seed);
    }

    while !current.is_empty() {
        graph.sort_by_child_count(&mut current);
        for &t in &current {
            assigned[t] = true;
        }

        let mut next: Vec<usize> = Vec::new();
        for &t in &current {
            for &child in &graph.children[t] {
                if assigned[child] || next.contains(&child) {
                    continue;
                }
                if graph.parents[child].iter().all(|&p| assigned[p]) {
                    next.push(child);
                }
            }
        }

        layers.push(current);
        current = next;
    }

    let orphans: Vec<usize> = (0..n).filter(|&i| !assigned[i]).collect();
    if !orphans.is_empty() {
        layers.push(orphans);
    }

    layers
}

/// Barycenter ordering: each layer after the first is sorted by the mean
/// index of its parents in the layer above. Tables without such parents
/// sort to the middle.
pub fn order_layers(graph: &DependencyGraph, layers: &mut [Vec<usize>]) {
    for li in 1..layers.len() {
        let (above, below) = layers.split_at_mut(li);
        let prev = &above[li - 1];
        let prev_index: HashMap<usize, usize> =
            prev.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        let middle = prev.len() as f64 / 2.0;

        let mut keyed: Vec<(f64, usize)> = below[0]
            .iter()
            .map(|&t| {
                let indices: Vec<f64> = graph.parents[t]
                    .iter()
                    .filter_map(|p| prev_index.get(p))
                    .map(|&i| i as f64)
                    .collect();
                let key = if indices.is_empty() {
                    middle
                } else {
                    indices.iter().sum::<f64>() / indices.len() as f64
                };
                (key, t)
            })
            .collect();

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        below[0] = keyed.into_iter().map(|(_, t)| t).collect();
    }
}
