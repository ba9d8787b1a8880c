//! Relevance scoring and retrieval of knowledge resources.
//!
//! A resource's score is a weighted sum of case-insensitive substring matches
//! of the query terms against its fields. Title matches weigh most, then
//! tags, then category, then description and content. Commerce fields
//! (price point, market segment) add a small signal, and resources that
//! matched any text get a logarithmic bonus for past usage.
//!
//! Scores are transient: [`RelevanceScorer::find_relevant`] returns plain
//! copies of the resources, never scored or mutated records.

use crate::config::RelevanceConfig;
use crate::core::KnowledgeResource;
use crate::{rlog_debug, rlog_error, rlog_trace, Error, Result};
use chrono::{DateTime, Utc};

/// A resource paired with its score for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredResource<'a> {
    pub resource: &'a KnowledgeResource,
    pub score: f64,
}

/// Lowercased query terms, deduplicated in order of appearance.
fn query_terms(query: &str, min_len: usize) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= min_len.max(1))
    {
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }
    terms
}

fn contains_lower(field: Option<&str>, term: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(term))
}

/// Scores knowledge resources against conversational queries.
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    config: RelevanceConfig,
}

impl RelevanceScorer {
    pub fn new(config: RelevanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelevanceConfig {
        &self.config
    }

    /// Score one resource. Empty or whitespace queries score zero.
    pub fn score(&self, resource: &KnowledgeResource, query: &str) -> f64 {
        let phrase = query.trim().to_lowercase();
        if phrase.is_empty() {
            return 0.0;
        }
        let terms = query_terms(&phrase, self.config.min_term_len);
        self.score_terms(resource, &phrase, &terms)
    }

    fn score_terms(&self, resource: &KnowledgeResource, phrase: &str, terms: &[String]) -> f64 {
        let cfg = &self.config;
        let title = resource.title.to_lowercase();
        let tags: Vec<String> = resource.tags.iter().map(|t| t.to_lowercase()).collect();

        let mut score = 0.0;
        if title.contains(phrase) {
            score += cfg.title_phrase_bonus;
        }
        for term in terms {
            let term = term.as_str();
            if title.contains(term) {
                score += cfg.title_weight;
            }
            if tags.iter().any(|tag| tag.contains(term)) {
                score += cfg.tag_weight;
            }
            if contains_lower(resource.category.as_deref(), term) {
                score += cfg.category_weight;
            }
            if contains_lower(resource.description.as_deref(), term)
                || contains_lower(resource.content.as_deref(), term)
            {
                score += cfg.content_weight;
            }
            if contains_lower(resource.price_point.as_deref(), term)
                || contains_lower(resource.market_segment.as_deref(), term)
            {
                score += cfg.commerce_weight;
            }
        }

        if score > 0.0 {
            if let Some(count) = resource.access_count {
                score += cfg.usage_weight * (count as f64).ln_1p();
            }
        }
        score
    }

    /// Every resource with its score, best first.
    ///
    /// The sort is stable, so equal scores keep collection order. An empty
    /// query yields an empty list.
    pub fn rank<'a>(
        &self,
        resources: &'a [KnowledgeResource],
        query: &str,
    ) -> Vec<ScoredResource<'a>> {
        let phrase = query.trim().to_lowercase();
        if phrase.is_empty() {
            return Vec::new();
        }
        let terms = query_terms(&phrase, self.config.min_term_len);

        let mut scored: Vec<ScoredResource<'a>> = resources
            .iter()
            .map(|resource| ScoredResource {
                resource,
                score: self.score_terms(resource, &phrase, &terms),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        for s in &scored {
            rlog_trace!("rank: {} score={:.3}", s.resource.id, s.score);
        }
        scored
    }

    /// The `limit` best resources for `query`, as copies without scores.
    ///
    /// Zero-score resources are not filtered out: with fewer than `limit`
    /// matches the remainder is filled in collection order.
    ///
    /// # Errors
    /// Returns [`Error::InvalidLimit`] when `limit` is zero.
    pub fn find_relevant(
        &self,
        resources: &[KnowledgeResource],
        query: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeResource>> {
        if limit == 0 {
            rlog_error!("find_relevant: limit must be at least 1");
            return Err(Error::InvalidLimit);
        }
        let found: Vec<KnowledgeResource> = self
            .rank(resources, query)
            .into_iter()
            .take(limit)
            .map(|s| s.resource.clone())
            .collect();
        rlog_debug!(
            "find_relevant: {} of {} resources for query '{}'",
            found.len(),
            resources.len(),
            query.trim()
        );
        Ok(found)
    }
}

/// Score with the default weights.
pub fn score(resource: &KnowledgeResource, query: &str) -> f64 {
    RelevanceScorer::default().score(resource, query)
}

/// Retrieve with the default weights.
pub fn find_relevant(
    resources: &[KnowledgeResource],
    query: &str,
    limit: usize,
) -> Result<Vec<KnowledgeResource>> {
    RelevanceScorer::default().find_relevant(resources, query, limit)
}

/// A copy of `resource` with one more access recorded now.
pub fn track_resource_usage(resource: &KnowledgeResource) -> KnowledgeResource {
    track_resource_usage_at(resource, Utc::now())
}

/// A copy of `resource` with one more access recorded at `now`.
pub fn track_resource_usage_at(
    resource: &KnowledgeResource,
    now: DateTime<Utc>,
) -> KnowledgeResource {
    let mut updated = resource.clone();
    updated.access_count = Some(resource.access_count.unwrap_or(0).saturating_add(1));
    updated.last_accessed = Some(now);
    updated
}
