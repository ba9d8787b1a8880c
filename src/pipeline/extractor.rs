//! Markdown-to-task extraction.
//!
//! The extractor works in two steps:
//!
//! 1. [`TaskExtractor::extract`] segments the document into phases (one per
//!    section header) holding raw list items, and collects requirement
//!    statements from anywhere in the document.
//! 2. [`TaskExtractor::extract_tasks_with_dependencies`] turns each phase's
//!    raw items into [`Task`]s: category, priority, effort, dependencies and
//!    nested subtasks.
//!
//! Neither step fails. Text without headers or list items simply yields
//! empty results.

use crate::config::ExtractorConfig;
use crate::core::{Phase, PhaseItem, Task, TaskId};
use crate::pipeline::rules;
use crate::{rlog_debug, rlog_trace, rlog_warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Phase title used for list items that appear before any header.
pub const IMPLICIT_PHASE_TITLE: &str = "Tasks";

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+(.+?)(?:\s+#+)?\s*$").unwrap());

/// A line that is entirely one bold run: `**Backend work**` or `__Backend work__:`.
/// `**Users** must reset **passwords**` is prose, not a header.
static BOLD_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\*\*([^*]+)\*\*|__([^_]+)__)\s*:?\s*$").unwrap()
});

/// `Phase 1: Setup`, `2. Milestone II - Launch`, `Sprint: hardening`.
static PHASE_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\d+[.)]\s+)?((?:phase|stage|milestone|sprint|step|iteration)(?:\s*(?:\d+|[ivx]+)\b[^\n]*|\s*:[^\n]*))$",
    )
    .unwrap()
});

/// Bullet or numbered list item with an optional checkbox.
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(?:[-*+•]|\d+[.)])\s+(?:\[[ xX]\]\s+)?(.*\S)\s*$").unwrap()
});

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(```|~~~)").unwrap());

/// Result of segmenting a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub phases: Vec<Phase>,
    pub requirements: Vec<String>,
}

impl Extraction {
    /// Top-level tasks across all phases, in document order.
    pub fn tasks(&self) -> Vec<&Task> {
        self.phases.iter().flat_map(|p| p.tasks.iter()).collect()
    }

    /// Owned copy of the top-level tasks, ready for graph building.
    pub fn task_list(&self) -> Vec<Task> {
        self.phases.iter().flat_map(|p| p.tasks.iter().cloned()).collect()
    }

    /// Every task and subtask, depth first.
    pub fn all_tasks(&self) -> Vec<&Task> {
        self.tasks().into_iter().flat_map(Task::flatten).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty() && self.requirements.is_empty()
    }
}

/// One classified document line.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Header(String),
    Item { text: &'a str, indent: usize },
    Statement(&'a str),
    Blank,
}

fn classify_line(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }
    if let Some(caps) = HEADING_RE.captures(line) {
        return Line::Header(header_title(&caps[1]));
    }
    if let Some(caps) = BOLD_LINE_RE.captures(line) {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        return Line::Header(header_title(inner));
    }
    if let Some(caps) = PHASE_TITLE_RE.captures(line) {
        return Line::Header(header_title(&caps[1]));
    }
    if let Some(caps) = LIST_ITEM_RE.captures(line) {
        let indent = caps[1]
            .chars()
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum();
        let text = caps.get(2).map_or("", |m| m.as_str());
        return Line::Item { text, indent };
    }
    Line::Statement(line.trim())
}

fn header_title(raw: &str) -> String {
    rules::strip_emphasis(raw)
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// Lines outside fenced code blocks.
fn content_lines(document: &str) -> impl Iterator<Item = &str> {
    let mut in_fence = false;
    document.lines().filter(move |line| {
        if FENCE_RE.is_match(line) {
            in_fence = !in_fence;
            return false;
        }
        !in_fence
    })
}

/// Extracts phases, requirements and tasks from requirement documents.
#[derive(Debug, Clone, Default)]
pub struct TaskExtractor {
    config: ExtractorConfig,
}

impl TaskExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Segment a document into phases and collect its requirements.
    ///
    /// Phases carry raw items only; call
    /// [`extract_tasks_with_dependencies`](Self::extract_tasks_with_dependencies)
    /// to derive tasks, or use [`plan_document`](Self::plan_document).
    pub fn extract(&self, document: &str) -> Extraction {
        let mut phases: Vec<Phase> = Vec::new();

        for line in content_lines(document) {
            match classify_line(line) {
                Line::Header(title) => {
                    rlog_trace!("extract: phase header '{}'", title);
                    phases.push(Phase::new(&title));
                }
                Line::Item { text, indent } => {
                    if phases.is_empty() {
                        phases.push(Phase::new(IMPLICIT_PHASE_TITLE));
                    }
                    if let Some(phase) = phases.last_mut() {
                        phase.items.push(PhaseItem {
                            text: text.to_string(),
                            indent,
                        });
                    }
                }
                Line::Statement(_) | Line::Blank => {}
            }
        }

        let requirements = self.extract_requirements(document);
        rlog_debug!(
            "extract: {} phases, {} items, {} requirements",
            phases.len(),
            phases.iter().map(|p| p.items.len()).sum::<usize>(),
            requirements.len()
        );
        Extraction {
            phases,
            requirements,
        }
    }

    /// Every list item plus every statement using requirement language,
    /// in document order with exact duplicates removed.
    pub fn extract_requirements(&self, document: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut requirements = Vec::new();

        for line in content_lines(document) {
            let candidate = match classify_line(line) {
                Line::Item { text, .. } => rules::strip_emphasis(text),
                Line::Statement(text) if rules::is_requirement(text) => {
                    rules::strip_emphasis(text)
                }
                _ => continue,
            };
            if !candidate.is_empty() && seen.insert(candidate.clone()) {
                requirements.push(candidate);
            }
        }
        requirements
    }

    /// Derive structured tasks for every phase and attach them.
    ///
    /// Ids are numbered across all phases passed in. Dependencies resolve
    /// only against tasks that appear earlier in the document; references
    /// that match nothing are dropped.
    pub fn extract_tasks_with_dependencies(&self, phases: &mut [Phase]) {
        let mut builder = TaskTreeBuilder::new(&self.config);
        for phase in phases.iter_mut() {
            phase.tasks = builder.build_phase(&phase.items);
        }
        rlog_debug!(
            "extract_tasks: {} top-level tasks, {} total, {} dropped references",
            builder.top_level,
            builder.seen.len(),
            builder.dropped
        );
    }

    /// Segment the document and derive tasks in one call.
    pub fn plan_document(&self, document: &str) -> Extraction {
        let mut extraction = self.extract(document);
        self.extract_tasks_with_dependencies(&mut extraction.phases);
        extraction
    }
}

/// An item whose subtasks are still being collected.
struct OpenTask {
    indent: usize,
    task: Task,
}

/// Builds task trees phase by phase while tracking titles seen so far.
struct TaskTreeBuilder<'c> {
    config: &'c ExtractorConfig,
    top_level: usize,
    /// (id, lowercased title) in document order.
    seen: Vec<(TaskId, String)>,
    dropped: usize,
}

impl<'c> TaskTreeBuilder<'c> {
    fn new(config: &'c ExtractorConfig) -> Self {
        Self {
            config,
            top_level: 0,
            seen: Vec::new(),
            dropped: 0,
        }
    }

    fn build_phase(&mut self, items: &[PhaseItem]) -> Vec<Task> {
        let mut roots = Vec::new();
        let mut open: Vec<OpenTask> = Vec::new();

        for item in items {
            while open.last().is_some_and(|o| o.indent >= item.indent) {
                close_top(&mut open, &mut roots);
            }

            let (id, parent_id) = match open.last() {
                Some(parent) => (
                    parent.task.id.child(parent.task.subtasks.len() + 1),
                    Some(parent.task.id.clone()),
                ),
                None => {
                    self.top_level += 1;
                    (TaskId::top_level(self.top_level), None)
                }
            };

            let mut task = self.derive_task(id, &item.text);
            task.parent_id = parent_id;
            self.seen.push((task.id.clone(), task.title.to_lowercase()));
            open.push(OpenTask {
                indent: item.indent,
                task,
            });
        }

        while !open.is_empty() {
            close_top(&mut open, &mut roots);
        }
        roots
    }

    fn derive_task(&mut self, id: TaskId, text: &str) -> Task {
        let title = rules::clean_title(text);
        let mut task = Task::new(id, &title, text);
        task.category = rules::classify(text);
        task.priority = rules::priority(text);
        task.estimated_effort =
            rules::effort_hours(text, self.config).unwrap_or(self.config.default_effort_hours);

        for reference in rules::dependency_references(text) {
            match self.resolve(&reference) {
                Some(dep) => {
                    task.add_dependency(dep);
                }
                None => {
                    self.dropped += 1;
                    rlog_warn!("extract_tasks: {} unresolved reference '{}' dropped", task.id, reference);
                }
            }
        }

        rlog_trace!(
            "extract_tasks: {} '{}' category={} priority={} effort={}",
            task.id,
            task.title,
            task.category,
            task.priority,
            task.estimated_effort
        );
        task
    }

    /// First earlier task whose title contains the reference, else the first
    /// whose title is contained in the reference.
    fn resolve(&self, reference: &str) -> Option<TaskId> {
        let needle = reference.to_lowercase();
        self.seen
            .iter()
            .find(|(_, title)| title.contains(&needle))
            .or_else(|| {
                self.seen
                    .iter()
                    .find(|(_, title)| !title.is_empty() && needle.contains(title.as_str()))
            })
            .map(|(id, _)| id.clone())
    }
}

fn close_top(open: &mut Vec<OpenTask>, roots: &mut Vec<Task>) {
    if let Some(done) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.task.subtasks.push(done.task),
            None => roots.push(done.task),
        }
    }
}

/// Segment `document` with the default configuration.
pub fn extract(document: &str) -> Extraction {
    TaskExtractor::default().extract(document)
}

/// Requirement statements of `document`.
pub fn extract_requirements(document: &str) -> Vec<String> {
    TaskExtractor::default().extract_requirements(document)
}

/// Derive tasks for `phases` with the default configuration.
pub fn extract_tasks_with_dependencies(phases: &mut [Phase]) {
    TaskExtractor::default().extract_tasks_with_dependencies(phases)
}
