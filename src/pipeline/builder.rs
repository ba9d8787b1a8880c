//! Builds the dependency graph from extracted tasks.

use crate::core::{DependencyGraph, EdgeKind, Node, Phase, Task, TaskId};
use crate::{rlog_debug, rlog_warn};

/// Build a graph with one node per task and subtask.
///
/// Hierarchy edges run from each parent to its subtasks; dependency edges
/// run from a task to every task it depends on. Dependencies naming tasks
/// outside `tasks` are dropped. Cycles are kept as they are.
pub fn build_graph(tasks: &[Task]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();

    for task in tasks {
        add_nodes(&mut graph, task, None);
    }

    let mut dropped = 0usize;
    for task in tasks {
        add_edges(&mut graph, task, &mut dropped);
    }

    rlog_debug!(
        "build_graph: {} nodes, {} edges, {} dangling dependencies dropped",
        graph.node_count(),
        graph.edge_count(),
        dropped
    );
    graph
}

/// Build a graph from the tasks of every phase.
pub fn build_graph_from_phases(phases: &[Phase]) -> DependencyGraph {
    let tasks: Vec<Task> = phases.iter().flat_map(|p| p.tasks.iter().cloned()).collect();
    build_graph(&tasks)
}

fn add_nodes(graph: &mut DependencyGraph, task: &Task, parent: Option<&TaskId>) {
    graph.add_node(Node {
        id: task.id.clone(),
        label: task.title.clone(),
        category: task.category,
        priority: task.priority,
        parent_id: parent.cloned(),
    });
    for sub in &task.subtasks {
        add_nodes(graph, sub, Some(&task.id));
    }
}

fn add_edges(graph: &mut DependencyGraph, task: &Task, dropped: &mut usize) {
    for sub in &task.subtasks {
        graph.add_edge(&task.id, &sub.id, EdgeKind::Hierarchy);
    }
    for dep in &task.dependencies {
        if !graph.contains(dep) {
            *dropped += 1;
            rlog_warn!("build_graph: {} depends on unknown {}, edge dropped", task.id, dep);
            continue;
        }
        graph.add_edge(&task.id, dep, EdgeKind::Dependency);
    }
    for sub in &task.subtasks {
        add_edges(graph, sub, dropped);
    }
}
