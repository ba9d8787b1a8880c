//! Keyword routing of tasks to specialist categories.
//!
//! Routing is purely lexical and reuses the category rules from
//! [`rules`](crate::pipeline::rules): the first matching rule in
//! frontend, backend, database, devops, ux order wins, anything else goes to
//! management. The result always lists all six categories.

use crate::core::{Category, Phase};
use crate::pipeline::rules;
use crate::rlog_debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task descriptions grouped by specialist category.
///
/// Every category is present, possibly with an empty list. Iteration follows
/// rule order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Routing(BTreeMap<Category, Vec<String>>);

impl Routing {
    /// A routing with every category mapped to an empty list.
    pub fn empty() -> Self {
        Self(Category::ALL.iter().map(|c| (*c, Vec::new())).collect())
    }

    pub fn get(&self, category: Category) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    fn push(&mut self, category: Category, description: &str) {
        self.0
            .entry(category)
            .or_default()
            .push(description.to_string());
    }

    /// Total number of routed tasks.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.0.iter().map(|(c, tasks)| (*c, tasks.as_slice()))
    }

    /// The category a description was routed to, if it was routed.
    pub fn category_of(&self, description: &str) -> Option<Category> {
        self.iter()
            .find(|(_, tasks)| tasks.iter().any(|t| t == description))
            .map(|(c, _)| c)
    }
}

impl Default for Routing {
    fn default() -> Self {
        Self::empty()
    }
}

/// Route raw task descriptions.
pub fn route_descriptions<'a, I>(descriptions: I) -> Routing
where
    I: IntoIterator<Item = &'a str>,
{
    let mut routing = Routing::empty();
    for description in descriptions {
        routing.push(rules::classify(description), description);
    }
    routing
}

/// Route every top-level task of every phase by its description.
pub fn route(phases: &[Phase]) -> Routing {
    route_with(phases, |_, _, _| {})
}

/// Route like [`route`], reporting each assignment to `observer` as
/// `(phase title, category, description)` in document order.
pub fn route_with<F>(phases: &[Phase], mut observer: F) -> Routing
where
    F: FnMut(&str, Category, &str),
{
    let mut routing = Routing::empty();
    for phase in phases {
        for task in &phase.tasks {
            let category = rules::classify(&task.description);
            observer(&phase.title, category, &task.description);
            routing.push(category, &task.description);
        }
    }
    rlog_debug!(
        "route: {} tasks across {} phases",
        routing.total(),
        phases.len()
    );
    routing
}
