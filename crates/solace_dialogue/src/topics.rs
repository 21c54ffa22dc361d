//! Topic clustering: groups turns into named, revisit-counted clusters.
//!
//! A turn is labeled with the best-matching named topic from the lexicon, or
//! with its most salient keyword when no named topic applies. It joins an
//! existing cluster when the labels agree or when enough of its keywords
//! overlap the cluster's accumulated keywords.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use solace_core::config::TOPIC_OVERLAP;
use solace_core::lexicon::lexicon;
use solace_core::text::{is_stopword, normalize_term, tokenize};
use std::collections::BTreeSet;

/// Label for turns with no usable keyword.
pub const GENERAL_TOPIC: &str = "general";

/// Oldest clusters are evicted beyond this many.
const MAX_CLUSTERS: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCluster {
    pub cluster_name: String,
    /// Always at least 1.
    pub visit_count: u32,
    pub last_visited: DateTime<Utc>,
    /// Normalized keywords seen in turns assigned to this cluster.
    pub keywords: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct TopicClustering {
    clusters: Vec<TopicCluster>,
    overlap_threshold: f32,
    /// Latest visit stamp handed out; stamps are strictly increasing.
    last_stamp: Option<DateTime<Utc>>,
}

impl Default for TopicClustering {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicClustering {
    pub fn new() -> Self {
        Self::with_threshold(TOPIC_OVERLAP)
    }

    pub fn with_threshold(overlap_threshold: f32) -> Self {
        Self {
            clusters: Vec::new(),
            overlap_threshold,
            last_stamp: None,
        }
    }

    /// Assign a turn to a cluster and return the cluster's name.
    ///
    /// Empty input leaves the clusters untouched and returns [`GENERAL_TOPIC`].
    pub fn observe(&mut self, turn_text: &str) -> String {
        let tokens = tokenize(turn_text);
        if tokens.is_empty() {
            return GENERAL_TOPIC.to_string();
        }
        let keywords = extract_keywords(&tokens);
        let label = topic_label(&tokens, &keywords);
        let now = self.next_stamp();

        if let Some(idx) = self.find_match(&label, &keywords) {
            let cluster = &mut self.clusters[idx];
            cluster.visit_count += 1;
            cluster.last_visited = now;
            cluster.keywords.extend(keywords);
            tracing::debug!(
                "Topic '{}' revisited ({} visits)",
                cluster.cluster_name,
                cluster.visit_count
            );
            return cluster.cluster_name.clone();
        }

        if self.clusters.len() >= MAX_CLUSTERS {
            if let Some(oldest) = self
                .clusters
                .iter()
                .enumerate()
                .min_by_key(|(_, c)| c.last_visited)
                .map(|(i, _)| i)
            {
                self.clusters.remove(oldest);
            }
        }

        tracing::debug!("New topic cluster '{}'", label);
        self.clusters.push(TopicCluster {
            cluster_name: label.clone(),
            visit_count: 1,
            last_visited: now,
            keywords,
        });
        label
    }

    /// Clusters ordered most-recently-visited first, ties broken by visit count.
    pub fn get_active_clusters(&self) -> Vec<TopicCluster> {
        let mut active = self.clusters.clone();
        active.sort_by(|a, b| {
            b.last_visited
                .cmp(&a.last_visited)
                .then(b.visit_count.cmp(&a.visit_count))
        });
        active
    }

    /// Names of the active clusters, in [`get_active_clusters`] order.
    ///
    /// [`get_active_clusters`]: Self::get_active_clusters
    pub fn active_topic_names(&self) -> Vec<String> {
        self.get_active_clusters()
            .into_iter()
            .map(|c| c.cluster_name)
            .collect()
    }

    /// The cluster touched by the latest `observe` call.
    pub fn current_cluster(&self) -> Option<&TopicCluster> {
        self.clusters.iter().max_by_key(|c| c.last_visited)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn reset_clusters(&mut self) {
        self.clusters.clear();
        self.last_stamp = None;
    }

    /// Current time, nudged forward if the clock hasn't advanced since the
    /// previous visit so recency ordering stays total.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn find_match(&self, label: &str, keywords: &BTreeSet<String>) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, cluster) in self.clusters.iter().enumerate() {
            // Exact or substring label agreement beats any keyword overlap.
            if labels_agree(&cluster.cluster_name, label) {
                return Some(i);
            }
            if keywords.is_empty() {
                continue;
            }
            let shared = keywords.intersection(&cluster.keywords).count();
            let overlap = shared as f32 / keywords.len() as f32;
            if overlap >= self.overlap_threshold && best.map_or(true, |(_, b)| overlap > b) {
                best = Some((i, overlap));
            }
        }
        best.map(|(i, _)| i)
    }
}

fn labels_agree(existing: &str, label: &str) -> bool {
    if existing == label {
        return true;
    }
    // Substring agreement only for real words, so "art" doesn't swallow "party".
    let long_enough = existing.chars().count() >= 4 && label.chars().count() >= 4;
    long_enough && (existing.contains(label) || label.contains(existing))
}

fn extract_keywords(tokens: &[String]) -> BTreeSet<String> {
    tokens
        .iter()
        .filter(|t| !is_stopword(t))
        .map(|t| normalize_term(t))
        .collect()
}

/// Best named topic by keyword hits; otherwise the longest keyword in text
/// order; otherwise [`GENERAL_TOPIC`].
fn topic_label(tokens: &[String], keywords: &BTreeSet<String>) -> String {
    let mut best: Option<(&str, usize)> = None;
    for topic in &lexicon().topics {
        let hits = keywords
            .iter()
            .filter(|k| topic.keywords.contains_word(k))
            .count();
        if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
            best = Some((topic.name, hits));
        }
    }
    if let Some((name, _)) = best {
        return name.to_string();
    }

    let mut salient: Option<String> = None;
    for t in tokens.iter().filter(|t| !is_stopword(t)) {
        let term = normalize_term(t);
        if salient
            .as_ref()
            .map_or(true, |s| term.chars().count() > s.chars().count())
        {
            salient = Some(term);
        }
    }
    salient.unwrap_or_else(|| GENERAL_TOPIC.to_string())
}
