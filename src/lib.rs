//! Requirements-intelligence pipeline.
//!
//! Turns a free-form requirements document into a structured plan: phases
//! and tasks with category, priority, effort and dependencies; a dependency
//! graph with 2-D layout; tasks routed to specialist categories; and
//! query-driven retrieval of knowledge resources.
//!
//! ```
//! use reqplan::core::Category;
//! use reqplan::Pipeline;
//!
//! let doc = "## Setup\n- Configure CI pipeline (critical)\n- Build login form (depends on Configure CI pipeline)";
//! let plan = Pipeline::default().plan(doc);
//!
//! assert_eq!(plan.task_count(), 2);
//! assert_eq!(plan.routing.get(Category::Devops), ["Configure CI pipeline (critical)"]);
//! assert_eq!(plan.graph.edge_count(), 1);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod pipeline;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::builder::build_graph;
pub use pipeline::extractor::{extract, extract_requirements, extract_tasks_with_dependencies};
pub use pipeline::layout::layout;
pub use pipeline::relevance::{find_relevant, score, track_resource_usage};
pub use pipeline::router::route;
pub use pipeline::{Pipeline, ProjectPlan};
