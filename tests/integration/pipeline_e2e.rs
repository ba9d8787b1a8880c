//! End-to-end planning tests.
//!
//! These tests run requirement documents through extraction, graph
//! building, routing and layout, and check that the stages agree.

use std::collections::BTreeSet;

use reqplan::core::{Category, EdgeKind, Priority, Task, TaskId};
use reqplan::pipeline::{build_graph_from_phases, route_with, LayoutEngine};
use reqplan::{build_graph, extract, extract_tasks_with_dependencies, layout, route, Pipeline, ProjectPlan};

use crate::fixtures::{LOOSE_DOC, SETUP_DOC, SHOP_DOC};

fn id(s: &str) -> TaskId {
    TaskId::from(s)
}

fn assert_in_bounds(plan_nodes: &[reqplan::pipeline::LayoutNode], width: f64, height: f64) {
    for n in plan_nodes {
        assert!(n.x >= n.radius && n.x <= width - n.radius, "x out of bounds: {:?}", n);
        assert!(n.y >= n.radius && n.y <= height - n.radius, "y out of bounds: {:?}", n);
    }
}

/// Test: Setup document
/// Given a phase with a CI task and a dependent login form task
/// When the document is planned
/// Then priority, dependency and routing follow the keywords
#[test]
fn test_setup_document_end_to_end() {
    let plan = Pipeline::default().plan(SETUP_DOC);

    let tasks = plan.tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].priority, Priority::High);
    assert!(tasks[1].dependencies.contains(&tasks[0].id));

    assert_eq!(plan.routing.get(Category::Devops), ["Configure CI pipeline (critical)"]);
    assert_eq!(
        plan.routing.get(Category::Frontend),
        ["Build login form (depends on Configure CI pipeline)"]
    );

    assert_eq!(
        plan.graph.edge_set(),
        BTreeSet::from([(id("task-2"), id("task-1"), EdgeKind::Dependency)])
    );
}

/// Test: Two-step API matches the one-call pipeline
#[test]
fn test_free_functions_agree_with_pipeline() {
    let mut extraction = extract(SHOP_DOC);
    assert!(extraction.phases.iter().all(|p| p.tasks.is_empty()));
    extract_tasks_with_dependencies(&mut extraction.phases);

    let plan = Pipeline::default().plan(SHOP_DOC);
    assert_eq!(extraction.phases, plan.phases);
    assert_eq!(extraction.requirements, plan.requirements);
    assert_eq!(build_graph(&extraction.task_list()), plan.graph);
    assert_eq!(build_graph_from_phases(&extraction.phases), plan.graph);
    assert_eq!(route(&extraction.phases), plan.routing);
}

/// Test: Multi-phase document
/// Given headers, nested items, effort markers and dependencies
/// When the document is planned
/// Then every derived field is consistent across phases
#[test]
fn test_shop_document_phases_and_tasks() {
    let plan = Pipeline::default().plan(SHOP_DOC);

    let titles: Vec<&str> = plan.phases.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Online Shop", "Phase 1: Discovery", "Phase 2: Build", "Phase 3: Launch"]
    );
    assert!(plan.phases[0].tasks.is_empty());

    assert_eq!(plan.task_count(), 9);
    let ids: Vec<&str> = plan.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["task-1", "task-2", "task-3", "task-4", "task-5", "task-6", "task-7", "task-8", "task-9"]
    );

    let tasks = plan.tasks();
    assert_eq!(tasks[0].title, "Run user research interviews");
    assert_eq!(tasks[0].estimated_effort, 24.0);
    assert_eq!(tasks[2].estimated_effort, 2.0);
    assert_eq!(tasks[3].priority, Priority::High);
    assert_eq!(tasks[4].estimated_effort, 40.0);
    assert_eq!(tasks[6].priority, Priority::Low);

    let schema = tasks[3];
    let sub_ids: Vec<&str> = schema.subtasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(sub_ids, vec!["task-4.1", "task-4.2"]);
    assert!(schema.subtasks.iter().all(|s| s.parent_id == Some(id("task-4"))));
    assert_eq!(schema.subtasks[1].dependencies, vec![id("task-4.1")]);

    assert_eq!(tasks[1].dependencies, vec![id("task-1")]);
    assert_eq!(tasks[4].dependencies, vec![id("task-4")]);
    assert_eq!(tasks[5].dependencies, vec![id("task-5")]);
    assert_eq!(tasks[7].dependencies, vec![id("task-3")]);

    assert_eq!(plan.total_effort(), 98.0);
}

/// Test: Requirements collect list items and requirement statements
#[test]
fn test_shop_document_requirements() {
    let plan = Pipeline::default().plan(SHOP_DOC);
    assert_eq!(plan.requirements.len(), 13);
    assert_eq!(plan.requirements[0], "The shop must support guest checkout.");
    assert_eq!(plan.requirements[1], "Payments should settle within one business day.");
    assert!(plan
        .requirements
        .contains(&"Add inventory table (depends on Add orders table)".to_string()));
}

/// Test: Graph mirrors the task tree
/// Given the multi-phase document
/// When the graph is built
/// Then every task and subtask is a node and every edge is accounted for
#[test]
fn test_shop_document_graph() {
    let plan = Pipeline::default().plan(SHOP_DOC);
    let graph = &plan.graph;

    assert_eq!(graph.node_count(), 11);
    let all_ids: BTreeSet<TaskId> = plan
        .tasks()
        .into_iter()
        .flat_map(Task::flatten)
        .map(|t| t.id.clone())
        .collect();
    assert_eq!(graph.node_ids(), all_ids);

    let expected = BTreeSet::from([
        (id("task-4"), id("task-4.1"), EdgeKind::Hierarchy),
        (id("task-4"), id("task-4.2"), EdgeKind::Hierarchy),
        (id("task-2"), id("task-1"), EdgeKind::Dependency),
        (id("task-4.2"), id("task-4.1"), EdgeKind::Dependency),
        (id("task-5"), id("task-4"), EdgeKind::Dependency),
        (id("task-6"), id("task-5"), EdgeKind::Dependency),
        (id("task-8"), id("task-3"), EdgeKind::Dependency),
    ]);
    assert_eq!(graph.edge_set(), expected);

    for edge in graph.edges() {
        assert!(graph.contains(&edge.source));
        assert!(graph.contains(&edge.target));
    }

    assert!(!graph.has_cycles());
    assert!(plan.cycles.is_empty());
    assert_eq!(
        graph.node(&id("task-4.2")).map(|n| n.parent_id.clone()),
        Some(Some(id("task-4")))
    );
}

/// Test: Routing is total over top-level tasks
#[test]
fn test_shop_document_routing() {
    let plan = Pipeline::default().plan(SHOP_DOC);
    let routing = &plan.routing;

    assert_eq!(routing.categories().count(), 6);
    assert_eq!(routing.total(), plan.task_count());

    assert_eq!(routing.get(Category::Frontend).len(), 1);
    assert_eq!(routing.get(Category::Backend).len(), 1);
    assert_eq!(routing.get(Category::Database).len(), 1);
    assert_eq!(
        routing.get(Category::Devops),
        [
            "Set up Docker deployment (after Hold kickoff meeting)",
            "Configure monitoring and alerting"
        ]
    );
    assert_eq!(routing.get(Category::Ux).len(), 2);
    assert_eq!(routing.get(Category::Management).len(), 2);

    for task in plan.tasks() {
        let hits = routing
            .iter()
            .filter(|(_, descriptions)| descriptions.contains(&task.description))
            .count();
        assert_eq!(hits, 1, "{} routed {} times", task.id, hits);
        assert_eq!(routing.category_of(&task.description), Some(task.category));
    }
}

/// Test: Observer sees each routing decision with its phase
#[test]
fn test_route_with_reports_phase_titles() {
    let extraction = Pipeline::default().extractor().plan_document(SHOP_DOC);
    let mut seen: Vec<(String, Category)> = Vec::new();
    let routing = route_with(&extraction.phases, |phase, category, _| {
        seen.push((phase.to_string(), category));
    });

    assert_eq!(seen.len(), routing.total());
    assert_eq!(seen[0], ("Phase 1: Discovery".to_string(), Category::Ux));
    assert_eq!(seen[8], ("Phase 3: Launch".to_string(), Category::Devops));
}

/// Test: Items before any header
#[test]
fn test_loose_items_get_implicit_phase() {
    let plan = Pipeline::default().plan(LOOSE_DOC);
    assert_eq!(plan.phases.len(), 1);
    assert_eq!(plan.phases[0].title, "Tasks");
    assert_eq!(plan.task_count(), 2);
    assert_eq!(plan.routing.get(Category::Management).len(), 2);
}

/// Test: Prose without structure
#[test]
fn test_unstructured_document_yields_empty_plan() {
    let plan = Pipeline::default().plan("We met on Tuesday and talked about the roadmap.");
    assert!(plan.is_empty());
    assert!(plan.phases.is_empty());
    assert!(plan.requirements.is_empty());
    assert!(plan.graph.is_empty());
    assert_eq!(plan.routing.total(), 0);
    assert!(layout(&plan.graph, 800.0, 600.0).unwrap().is_empty());
}

/// Test: Planning is deterministic
#[test]
fn test_planning_is_idempotent() {
    let pipeline = Pipeline::default();
    let first = pipeline.plan(SHOP_DOC);
    let second = pipeline.plan(SHOP_DOC);
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

/// Test: Plans survive a JSON round trip
#[test]
fn test_plan_json_round_trip() {
    let plan = Pipeline::default().plan(SHOP_DOC);
    let json = plan.to_json().unwrap();
    assert!(json.contains("\"parentId\": \"task-4\""));
    assert!(json.contains("\"type\": \"hierarchy\""));

    let restored: ProjectPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, plan);
}

/// Test: Layout of a planned graph
/// Given the multi-phase graph
/// When it is laid out twice with the same seed
/// Then positions are identical and every node stays on the canvas
#[test]
fn test_layout_of_planned_graph() {
    let pipeline = Pipeline::default();
    let plan = pipeline.plan(SHOP_DOC);

    let first = pipeline.layout(&plan.graph, 800.0, 600.0).unwrap();
    let second = pipeline.layout(&plan.graph, 800.0, 600.0).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), plan.graph.node_count());
    assert_in_bounds(&first, 800.0, 600.0);

    let placed: BTreeSet<TaskId> = first.iter().map(|n| n.id.clone()).collect();
    assert_eq!(placed, plan.graph.node_ids());
}

/// Test: Single node layout
#[test]
fn test_single_node_layout_within_bounds() {
    let plan = Pipeline::default().plan("- Write docs");
    let nodes = layout(&plan.graph, 320.0, 240.0).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_in_bounds(&nodes, 320.0, 240.0);
}

/// Test: Cycles built by hand are tolerated end to end
#[test]
fn test_hand_built_cycle_is_reported_and_laid_out() {
    let mut a = Task::new(id("a"), "a", "a");
    let mut b = Task::new(id("b"), "b", "b");
    let c = Task::new(id("c"), "c", "c");
    a.add_dependency(id("b"));
    b.add_dependency(id("a"));

    let graph = build_graph(&[a, b, c]);
    assert!(graph.has_cycles());
    let cycles = graph.cycle_members();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].iter().collect::<BTreeSet<_>>(), BTreeSet::from([&id("a"), &id("b")]));

    let nodes = LayoutEngine::default()
        .layout_with_seed(&graph, 400.0, 400.0, 7)
        .unwrap();
    assert_eq!(nodes.len(), 3);
    assert_in_bounds(&nodes, 400.0, 400.0);
}
