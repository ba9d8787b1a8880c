//! Force-directed layout of the dependency graph.
//!
//! A bounded relaxation, not an optimal drawing. Nodes start at seeded
//! random positions inside the canvas and then, for a fixed number of
//! iterations:
//!
//! 1. every pair of nodes closer than `repulsion_threshold` is pushed apart
//!    with magnitude `repulsion_strength / distance`;
//! 2. every edge pulls (or pushes) its endpoints with magnitude
//!    `(distance - spring_length) * spring_strength`;
//! 3. each node moves by its summed force, capped at `max_displacement`,
//!    and is clamped so its whole circle stays on the canvas.
//!
//! With the same graph, canvas and seed the output is identical.

use crate::config::LayoutConfig;
use crate::core::{Category, DependencyGraph, Priority, TaskId};
use crate::{rlog_debug, rlog_error, Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Below this distance two nodes are treated as coincident.
const MIN_DISTANCE: f64 = 0.01;

/// Spreads the fallback directions of coincident pairs around the circle.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// A graph node with canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: TaskId,
    pub label: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Vec2 {
    x: f64,
    y: f64,
}

impl Vec2 {
    fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Keep `v` inside `[lo, hi]`; an empty interval collapses to its midpoint.
fn clamp_axis(v: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo {
        (lo + hi) / 2.0
    } else {
        v.clamp(lo, hi)
    }
}

fn sample_axis(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        (lo + hi) / 2.0
    }
}

/// Computes node positions for a dependency graph.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `graph` on a `width` x `height` canvas using the configured seed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCanvas`] when either dimension is not a
    /// positive finite number.
    pub fn layout(&self, graph: &DependencyGraph, width: f64, height: f64) -> Result<Vec<LayoutNode>> {
        self.layout_with_seed(graph, width, height, self.config.seed)
    }

    pub fn layout_with_seed(
        &self,
        graph: &DependencyGraph,
        width: f64,
        height: f64,
        seed: u64,
    ) -> Result<Vec<LayoutNode>> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(width) && valid(height)) {
            rlog_error!("layout: invalid canvas {}x{}", width, height);
            return Err(Error::InvalidCanvas { width, height });
        }
        if graph.is_empty() {
            rlog_debug!("layout: empty graph, nothing to place");
            return Ok(Vec::new());
        }

        let cfg = &self.config;
        let r = cfg.node_radius;
        let (min_x, max_x) = (r, width - r);
        let (min_y, max_y) = (r, height - r);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut positions: Vec<Vec2> = graph
            .nodes()
            .map(|_| Vec2 {
                x: sample_axis(&mut rng, min_x, max_x),
                y: sample_axis(&mut rng, min_y, max_y),
            })
            .collect();
        let edges = graph.index_edges();
        let n = positions.len();

        for _ in 0..cfg.iterations {
            let mut forces = vec![Vec2::default(); n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = Vec2 {
                        x: positions[i].x - positions[j].x,
                        y: positions[i].y - positions[j].y,
                    };
                    let mut dist = delta.length();
                    let dir = if dist < MIN_DISTANCE {
                        let angle = (i * n + j) as f64 * GOLDEN_ANGLE;
                        dist = MIN_DISTANCE;
                        Vec2 {
                            x: angle.cos(),
                            y: angle.sin(),
                        }
                    } else {
                        Vec2 {
                            x: delta.x / dist,
                            y: delta.y / dist,
                        }
                    };
                    if dist < cfg.repulsion_threshold {
                        let magnitude = cfg.repulsion_strength / dist;
                        forces[i].x += dir.x * magnitude;
                        forces[i].y += dir.y * magnitude;
                        forces[j].x -= dir.x * magnitude;
                        forces[j].y -= dir.y * magnitude;
                    }
                }
            }

            for &(source, target) in &edges {
                if source == target {
                    continue;
                }
                let delta = Vec2 {
                    x: positions[target].x - positions[source].x,
                    y: positions[target].y - positions[source].y,
                };
                let dist = delta.length();
                if dist < MIN_DISTANCE {
                    continue;
                }
                let magnitude = (dist - cfg.spring_length) * cfg.spring_strength;
                let (fx, fy) = (delta.x / dist * magnitude, delta.y / dist * magnitude);
                forces[source].x += fx;
                forces[source].y += fy;
                forces[target].x -= fx;
                forces[target].y -= fy;
            }

            for (pos, force) in positions.iter_mut().zip(&forces) {
                let len = force.length();
                let scale = if len > cfg.max_displacement {
                    cfg.max_displacement / len
                } else {
                    1.0
                };
                pos.x = clamp_axis(pos.x + force.x * scale, min_x, max_x);
                pos.y = clamp_axis(pos.y + force.y * scale, min_y, max_y);
            }
        }

        rlog_debug!(
            "layout: {} nodes, {} edges, {} iterations on {}x{}",
            n,
            edges.len(),
            cfg.iterations,
            width,
            height
        );

        Ok(graph
            .nodes()
            .zip(positions)
            .map(|(node, pos)| LayoutNode {
                id: node.id.clone(),
                label: node.label.clone(),
                category: node.category,
                priority: node.priority,
                parent_id: node.parent_id.clone(),
                x: pos.x,
                y: pos.y,
                radius: r,
            })
            .collect())
    }
}

/// Lay out `graph` with the default configuration.
pub fn layout(graph: &DependencyGraph, width: f64, height: f64) -> Result<Vec<LayoutNode>> {
    LayoutEngine::default().layout(graph, width, height)
}
