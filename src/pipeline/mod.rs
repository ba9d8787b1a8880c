//! The requirements pipeline.
//!
//! Document text flows through the [`extractor`] into phases and tasks,
//! which feed both the graph [`builder`] (and from there the [`layout`]
//! engine) and the [`router`]. The [`relevance`] retriever runs
//! independently on knowledge resources and a conversational query.
//!
//! [`Pipeline`] bundles the stages behind one configuration.

pub mod builder;
pub mod extractor;
pub mod layout;
pub mod relevance;
pub mod router;
pub mod rules;

pub use builder::{build_graph, build_graph_from_phases};
pub use extractor::{Extraction, TaskExtractor};
pub use layout::{LayoutEngine, LayoutNode};
pub use relevance::{track_resource_usage, track_resource_usage_at, RelevanceScorer, ScoredResource};
pub use router::{route, route_descriptions, route_with, Routing};

use crate::config::Config;
use crate::core::{DependencyGraph, KnowledgeResource, Phase, Task, TaskId};
use crate::{rlog, Result};
use serde::{Deserialize, Serialize};

/// Everything derived from one requirements document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    pub phases: Vec<Phase>,
    pub requirements: Vec<String>,
    pub graph: DependencyGraph,
    pub routing: Routing,
    /// Dependency cycles present in the graph, for renderers that flag them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<Vec<TaskId>>,
}

impl ProjectPlan {
    /// Top-level tasks in document order.
    pub fn tasks(&self) -> Vec<&Task> {
        self.phases.iter().flat_map(|p| p.tasks.iter()).collect()
    }

    pub fn task_count(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }

    /// Hours across all tasks and subtasks.
    pub fn total_effort(&self) -> f64 {
        self.phases.iter().map(Phase::total_effort).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.task_count() == 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// All pipeline stages configured from one [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    extractor: TaskExtractor,
    layout: LayoutEngine,
    scorer: RelevanceScorer,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            extractor: TaskExtractor::new(config.extractor),
            layout: LayoutEngine::new(config.layout),
            scorer: RelevanceScorer::new(config.relevance),
        }
    }

    pub fn extractor(&self) -> &TaskExtractor {
        &self.extractor
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Extract, derive tasks, build the graph and route, in one pass.
    pub fn plan(&self, document: &str) -> ProjectPlan {
        let extraction = self.extractor.plan_document(document);
        let graph = build_graph(&extraction.task_list());
        let routing = route(&extraction.phases);
        let cycles = graph.cycle_members();

        rlog!(
            "plan: {} phases, {} tasks, {} nodes, {} edges, {} cycles",
            extraction.phases.len(),
            routing.total(),
            graph.node_count(),
            graph.edge_count(),
            cycles.len()
        );

        ProjectPlan {
            phases: extraction.phases,
            requirements: extraction.requirements,
            graph,
            routing,
            cycles,
        }
    }

    pub fn layout(
        &self,
        graph: &DependencyGraph,
        width: f64,
        height: f64,
    ) -> Result<Vec<LayoutNode>> {
        self.layout.layout(graph, width, height)
    }

    pub fn find_relevant(
        &self,
        resources: &[KnowledgeResource],
        query: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeResource>> {
        self.scorer.find_relevant(resources, query, limit)
    }
}
