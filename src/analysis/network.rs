use std::f64::consts::TAU;
use std::fmt;

use rand::Rng;

use crate::analysis::round_to;
use crate::data::model::{Column, HumanDevelopment, Table};

/// Iterations of the spring layout.
const SPRING_ITERATIONS: usize = 50;

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Level(HumanDevelopment),
    Iso(String),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Level(level) => write!(f, "{level}"),
            NodeKind::Iso(iso) => f.write_str(iso),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

/// Undirected weighted graph linking development levels to ISO codes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkGraph {
    pub column: Option<Column>,
    pub nodes: Vec<NodeKind>,
    pub edges: Vec<Edge>,
}

impl NetworkGraph {
    fn node(&mut self, kind: NodeKind) -> usize {
        match self.nodes.iter().position(|n| *n == kind) {
            Some(i) => i,
            None => {
                self.nodes.push(kind);
                self.nodes.len() - 1
            }
        }
    }

    /// Add or overwrite the edge between `a` and `b`.
    fn connect(&mut self, a: usize, b: usize, weight: f64) {
        match self
            .edges
            .iter_mut()
            .find(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
        {
            Some(edge) => edge.weight = weight,
            None => self.edges.push(Edge { a, b, weight }),
        }
    }

    /// Weighted adjacency matrix.
    fn adjacency(&self) -> Vec<Vec<f64>> {
        let n = self.nodes.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for edge in &self.edges {
            matrix[edge.a][edge.b] = edge.weight;
            matrix[edge.b][edge.a] = edge.weight;
        }
        matrix
    }
}

/// Sample `sample_size` rows and link each row's level to its ISO code.
///
/// Edge weight is `round(GII * 40, 2)` for `GII`, the raw value otherwise.
pub fn build_network<R: Rng + ?Sized>(
    table: &Table,
    column: Column,
    sample_size: usize,
    rng: &mut R,
) -> NetworkGraph {
    let mut graph = NetworkGraph {
        column: Some(column),
        ..Default::default()
    };
    let amount = sample_size.min(table.len());
    for i in rand::seq::index::sample(rng, table.len(), amount) {
        let record = &table.records()[i];
        let level = graph.node(NodeKind::Level(record.human_development));
        let iso = graph.node(NodeKind::Iso(record.iso.clone()));
        let value = record.number(column).unwrap_or_default();
        let weight = if column == Column::Gii {
            round_to(value * 40.0, 2)
        } else {
            value
        };
        graph.connect(level, iso, weight);
    }
    log::debug!(
        "Built network of {} nodes and {} edges on {column}",
        graph.nodes.len(),
        graph.edges.len()
    );
    graph
}

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Circular,
    Shell,
    Spiral,
    Random,
    Spring,
}

impl Layout {
    pub const ALL: [Layout; 5] = [
        Layout::Circular,
        Layout::Shell,
        Layout::Spiral,
        Layout::Random,
        Layout::Spring,
    ];
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layout::Circular => "circular",
            Layout::Shell => "shell",
            Layout::Spiral => "spiral",
            Layout::Random => "random",
            Layout::Spring => "spring",
        })
    }
}

/// Node positions for `graph`, one per node in node order.
pub fn layout<R: Rng + ?Sized>(graph: &NetworkGraph, layout: Layout, rng: &mut R) -> Vec<[f64; 2]> {
    let n = graph.nodes.len();
    match layout {
        Layout::Circular if n == 1 => vec![[0.0, 0.0]],
        Layout::Circular => circle(n, 1.0),
        Layout::Shell => {
            let (inner, outer): (Vec<usize>, Vec<usize>) =
                (0..n).partition(|&i| matches!(graph.nodes[i], NodeKind::Level(_)));
            let mut positions = vec![[0.0, 0.0]; n];
            for (ring, radius) in [(inner, 0.5), (outer, 1.0)] {
                for (i, p) in ring.iter().zip(circle(ring.len(), radius)) {
                    positions[*i] = p;
                }
            }
            positions
        }
        Layout::Spiral => {
            let resolution = 0.35;
            let positions = (0..n)
                .map(|i| {
                    let d = i as f64;
                    let angle = resolution * d;
                    [d * angle.cos(), d * angle.sin()]
                })
                .collect();
            rescale(positions)
        }
        Layout::Random => (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect(),
        Layout::Spring => spring(graph, rng),
    }
}

/// `n` points evenly spaced on a circle, starting on the positive x axis.
fn circle(n: usize, radius: f64) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let theta = TAU * i as f64 / n as f64;
            [radius * theta.cos(), radius * theta.sin()]
        })
        .collect()
}

/// Centre on the origin and scale so the largest coordinate is 1.
fn rescale(mut positions: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    if positions.is_empty() {
        return positions;
    }
    let n = positions.len() as f64;
    let cx = positions.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = positions.iter().map(|p| p[1]).sum::<f64>() / n;
    let mut extent = 0.0f64;
    for p in &mut positions {
        p[0] -= cx;
        p[1] -= cy;
        extent = extent.max(p[0].abs()).max(p[1].abs());
    }
    if extent > 0.0 {
        for p in &mut positions {
            p[0] /= extent;
            p[1] /= extent;
        }
    }
    positions
}

/// Fruchterman–Reingold force-directed layout from random starting points.
fn spring<R: Rng + ?Sized>(graph: &NetworkGraph, rng: &mut R) -> Vec<[f64; 2]> {
    let n = graph.nodes.len();
    if n <= 1 {
        return vec![[0.0, 0.0]; n];
    }
    let adjacency = graph.adjacency();
    let k = (1.0 / n as f64).sqrt();
    let mut positions: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen(), rng.gen()]).collect();
    let mut temperature = 0.1;
    let cooling = temperature / (SPRING_ITERATIONS + 1) as f64;

    for _ in 0..SPRING_ITERATIONS {
        let mut displacement = vec![[0.0f64; 2]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = positions[i][0] - positions[j][0];
                let dy = positions[i][1] - positions[j][1];
                let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                let force = k * k / (distance * distance) - adjacency[i][j] * distance / k;
                displacement[i][0] += dx * force;
                displacement[i][1] += dy * force;
            }
        }
        for (p, d) in positions.iter_mut().zip(&displacement) {
            let length = (d[0] * d[0] + d[1] * d[1]).sqrt().max(0.01);
            p[0] += d[0] * temperature / length;
            p[1] += d[1] * temperature / length;
        }
        temperature -= cooling;
    }
    rescale(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(rows: usize) -> Table {
        let records = (0..rows)
            .map(|i| {
                let mut numbers = [0.0; 9];
                numbers[0] = i as f64 / 100.0;
                numbers[2] = i as f64 * 10.0;
                Record {
                    country: format!("C{i}"),
                    iso: format!("X{i:02}"),
                    human_development: HumanDevelopment::ALL[i % 4],
                    numbers,
                }
            })
            .collect();
        Table::from_records(records)
    }

    #[test]
    fn graph_is_bounded_by_levels_and_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = build_network(&table(40), Column::Gii, 15, &mut rng);
        assert!(graph.nodes.len() <= 4 + 15);
        assert_eq!(graph.edges.len(), 15);
        let isos = graph
            .nodes
            .iter()
            .filter(|n| matches!(n, NodeKind::Iso(_)))
            .count();
        assert_eq!(isos, 15);
    }

    #[test]
    fn gii_weights_are_scaled() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = build_network(&table(3), Column::Gii, 15, &mut rng);
        assert_eq!(graph.edges.len(), 3);
        for edge in &graph.edges {
            let NodeKind::Iso(iso) = &graph.nodes[edge.b] else {
                panic!("edge should end on an ISO node");
            };
            let i: f64 = iso[1..].parse().unwrap();
            assert_eq!(edge.weight, round_to(i / 100.0 * 40.0, 2));
        }

        let graph = build_network(&table(3), Column::MaternalMortality, 15, &mut rng);
        assert!(graph.edges.iter().any(|e| e.weight == 20.0));
    }

    #[test]
    fn circular_layout_is_on_unit_circle() {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = build_network(&table(20), Column::Gii, 15, &mut rng);
        for p in layout(&graph, Layout::Circular, &mut rng) {
            assert!(((p[0] * p[0] + p[1] * p[1]).sqrt() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn shell_puts_levels_inside() {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = build_network(&table(20), Column::Gii, 10, &mut rng);
        let positions = layout(&graph, Layout::Shell, &mut rng);
        for (node, p) in graph.nodes.iter().zip(&positions) {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            match node {
                NodeKind::Level(_) => assert!((r - 0.5).abs() < 1e-12),
                NodeKind::Iso(_) => assert!((r - 1.0).abs() < 1e-12),
            }
        }
    }

    #[test]
    fn layouts_are_finite_and_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        let graph = build_network(&table(30), Column::Rank, 15, &mut rng);
        for kind in Layout::ALL {
            let positions = layout(&graph, kind, &mut rng);
            assert_eq!(positions.len(), graph.nodes.len());
            for p in positions {
                assert!(p.iter().all(|v| v.is_finite() && v.abs() <= 1.0 + 1e-9), "{kind}: {p:?}");
            }
        }
    }
}
