//! Core domain models for the planning pipeline.
//!
//! Tasks and phases produced by the extractor, the dependency graph built
//! from them, and the knowledge resources consumed by the retriever.

pub mod graph;
pub mod resource;
pub mod task;

pub use graph::{DependencyGraph, Edge, EdgeKind, GraphSnapshot, Node};
pub use resource::KnowledgeResource;
pub use task::{Category, Phase, PhaseItem, Priority, Task, TaskId};
