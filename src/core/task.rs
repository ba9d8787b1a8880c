//! Task and phase data model.
//!
//! A document parses into an ordered list of [`Phase`]s. Each phase keeps the
//! raw list items it was built from and, once derived, the structured
//! [`Task`]s with their category, priority, effort and dependencies.

use serde::{Deserialize, Serialize};

/// Identifier of a task within one extraction result.
///
/// Top-level tasks are numbered `task-1`, `task-2`, ... across the whole
/// document. Subtasks extend their parent's id: `task-3.1`, `task-3.1.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Id for the `n`th top-level task (1-based).
    pub fn top_level(n: usize) -> Self {
        Self(format!("task-{}", n))
    }

    /// Id for the `n`th subtask (1-based) of this task.
    pub fn child(&self, n: usize) -> Self {
        Self(format!("{}.{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Specialist category a task is routed to.
///
/// Declaration order is the routing rule order: when a task matches several
/// categories the earliest one wins. `Management` is the fallback bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Backend,
    Database,
    Devops,
    Ux,
    #[serde(alias = "general")]
    Management,
}

impl Category {
    /// All categories in rule order.
    pub const ALL: [Category; 6] = [
        Category::Frontend,
        Category::Backend,
        Category::Database,
        Category::Devops,
        Category::Ux,
        Category::Management,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::Database => "database",
            Category::Devops => "devops",
            Category::Ux => "ux",
            Category::Management => "management",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Management
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A structured unit of work derived from one list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Cleaned-up name used for display and dependency resolution.
    pub title: String,
    /// The list item text as written in the document.
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    /// Estimated effort in hours.
    pub estimated_effort: f64,
    /// Ids of tasks that must finish before this one starts. Insertion ordered, no duplicates.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
}

impl Task {
    /// Create a task with default classification and no relations.
    pub fn new(id: TaskId, title: &str, description: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            category: Category::default(),
            priority: Priority::default(),
            estimated_effort: 0.0,
            dependencies: Vec::new(),
            subtasks: Vec::new(),
            parent_id: None,
        }
    }

    /// Record a dependency. Self references and repeats are ignored.
    pub fn add_dependency(&mut self, id: TaskId) -> bool {
        if id == self.id || self.dependencies.contains(&id) {
            return false;
        }
        self.dependencies.push(id);
        true
    }

    pub fn depends_on(&self, id: &TaskId) -> bool {
        self.dependencies.contains(id)
    }

    /// This task followed by all of its descendants, depth first.
    pub fn flatten(&self) -> Vec<&Task> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Task>) {
        out.push(self);
        for sub in &self.subtasks {
            sub.collect_into(out);
        }
    }

    /// Effort of this task plus every descendant.
    pub fn total_effort(&self) -> f64 {
        self.estimated_effort + self.subtasks.iter().map(Task::total_effort).sum::<f64>()
    }
}

/// One list item captured from a phase, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseItem {
    pub text: String,
    /// Leading whitespace width; tabs count as four columns.
    pub indent: usize,
}

/// A titled section of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub title: String,
    #[serde(default)]
    pub items: Vec<PhaseItem>,
    /// Empty until tasks are derived from `items`.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Phase {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Raw task description strings in document order.
    pub fn raw_tasks(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of effort across derived tasks and their subtasks.
    pub fn total_effort(&self) -> f64 {
        self.tasks.iter().map(Task::total_effort).sum()
    }
}
