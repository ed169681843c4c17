//! Multi-factor relevance scoring between a browsing context and stored items.
//!
//! Combines five weighted sub-scores, each independently in [0.0, 1.0]:
//! URL/domain similarity, category equality, keyword/tag overlap, concept
//! overlap, and content-text similarity over significant words. Weights are
//! configured once and validated to sum to 1.0.
//!
//! Sub-scores past a fixed per-dimension threshold contribute a
//! human-readable reason string; reasons are advisory only and never feed
//! back into the math.

use crate::config::ScorerConfig;
use crate::error::{ResurfaceError, Result};
use crate::types::{BrowsingContext, StoredItem};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Reason thresholds per dimension
const URL_REASON_THRESHOLD: f32 = 0.5;
const KEYWORD_REASON_THRESHOLD: f32 = 0.3;
const CONCEPT_REASON_THRESHOLD: f32 = 0.3;
const CONTENT_REASON_THRESHOLD: f32 = 0.2;

/// Cap on significant words considered per side for content similarity
const SIGNIFICANT_WORD_LIMIT: usize = 100;

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9][A-Za-z0-9'\-]*").expect("valid word pattern"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "this", "that", "with", "from", "have", "what", "your", "about", "which", "when",
        "will", "there", "their", "were", "would", "could", "should", "been", "they", "them",
        "then", "than", "these", "those", "some", "more", "most", "other", "into", "over",
        "only", "also", "just", "very", "such", "here", "where", "after", "before", "because",
        "while", "through", "each", "both", "between", "under", "again", "once", "does",
        "doing", "having", "until", "above", "below", "same", "being", "itself", "still",
    ]
    .into_iter()
    .collect()
});

/// Multi-part public suffixes the naive registrable-domain rule must widen for
const MULTI_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "gov.uk", "ac.uk", "com.au", "net.au", "co.jp", "co.nz", "com.br",
];

/// Scoring outcome for one item
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRelevance {
    /// Weighted sum in [0.0, 1.0], rounded to 2 decimals
    pub score: f32,

    /// Human-readable match reasons
    pub reasons: Vec<String>,
}

/// Weighted multi-signal relevance scorer
pub struct RelevanceScorer {
    config: ScorerConfig,
}

impl RelevanceScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Score one stored item against the current browsing context
    ///
    /// Zero-length inputs for a dimension yield 0 for that dimension, not an
    /// error; a malformed item (no URL and no title) is a scoring error the
    /// caller skips per-item.
    pub fn score(&self, context: &BrowsingContext, item: &StoredItem) -> Result<ScoredRelevance> {
        if !item.is_well_formed() {
            return Err(ResurfaceError::Scoring(format!(
                "item {} has neither url nor title",
                item.id
            )));
        }

        let mut reasons = Vec::new();

        let (url_score, url_reason) = url_similarity(&context.url, &item.url);
        if url_score > URL_REASON_THRESHOLD {
            if let Some(reason) = url_reason {
                reasons.push(reason);
            }
        }

        let category_score = if context.category == item.category {
            reasons.push(format!("Same category: {}", item.category));
            1.0
        } else {
            0.0
        };

        let keyword_score = keyword_overlap(&context.keywords, &item.tags);
        if keyword_score > KEYWORD_REASON_THRESHOLD {
            reasons.push(format!(
                "Shared keywords: {}",
                shared_terms(&context.keywords, &item.tags).join(", ")
            ));
        }

        let concept_score = keyword_overlap(&context.concepts, &item.concepts);
        if concept_score > CONCEPT_REASON_THRESHOLD {
            reasons.push(format!(
                "Related concepts: {}",
                shared_terms(&context.concepts, &item.concepts).join(", ")
            ));
        }

        let content_score = content_similarity(&context.content, &item.content);
        if content_score > CONTENT_REASON_THRESHOLD {
            reasons.push("Similar page content".to_string());
        }

        let weighted = url_score * self.config.url_weight
            + category_score * self.config.category_weight
            + keyword_score * self.config.keyword_weight
            + concept_score * self.config.concept_weight
            + content_score * self.config.content_weight;

        let score = round2(weighted.clamp(0.0, 1.0));

        debug!(
            item = %item.id,
            url = url_score,
            category = category_score,
            keywords = keyword_score,
            concepts = concept_score,
            content = content_score,
            score,
            "scored item"
        );

        Ok(ScoredRelevance { score, reasons })
    }
}

/// URL similarity: 0.8 exact host, 0.6 same registrable domain, else
/// path-segment overlap scaled by 0.4. Unparseable URLs score 0.
fn url_similarity(a: &str, b: &str) -> (f32, Option<String>) {
    let (Ok(ua), Ok(ub)) = (Url::parse(a), Url::parse(b)) else {
        return (0.0, None);
    };
    let (Some(host_a), Some(host_b)) = (ua.host_str(), ub.host_str()) else {
        return (0.0, None);
    };

    if host_a.eq_ignore_ascii_case(host_b) {
        return (0.8, Some(format!("Same site: {}", host_a.to_lowercase())));
    }

    let domain_a = registrable_domain(host_a);
    let domain_b = registrable_domain(host_b);
    if domain_a.eq_ignore_ascii_case(&domain_b) {
        return (0.6, Some(format!("Same domain: {}", domain_a.to_lowercase())));
    }

    let segments_a = path_segments(&ua);
    let segments_b = path_segments(&ub);
    (jaccard(&segments_a, &segments_b) * 0.4, None)
}

/// Naive registrable domain (eTLD+1): last two labels, widened to three for
/// the known multi-part suffixes. A full public-suffix list is out of scope.
fn registrable_domain(host: &str) -> String {
    let host = host.to_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }

    let last_two = labels[labels.len() - 2..].join(".");
    let take = if MULTI_PART_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };
    labels[labels.len().saturating_sub(take)..].join(".")
}

fn path_segments(url: &Url) -> HashSet<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| s.to_lowercase())
                .collect()
        })
        .unwrap_or_default()
}

/// Case-insensitive Jaccard similarity over two string sets
///
/// Empty input on either side yields 0, never an error.
fn keyword_overlap(left: &[String], right: &[String]) -> f32 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let left_set: HashSet<String> = left.iter().map(|s| s.to_lowercase()).collect();
    let right_set: HashSet<String> = right.iter().map(|s| s.to_lowercase()).collect();
    jaccard(&left_set, &right_set)
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Terms present on both sides, sorted for deterministic reason strings
fn shared_terms(left: &[String], right: &[String]) -> Vec<String> {
    let right_set: HashSet<String> = right.iter().map(|s| s.to_lowercase()).collect();
    let mut shared: Vec<String> = left
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| right_set.contains(s))
        .collect();
    shared.sort();
    shared.dedup();
    shared.truncate(3);
    shared
}

/// Jaccard similarity over each side's leading significant words
fn content_similarity(a: &str, b: &str) -> f32 {
    let words_a = significant_words(a, SIGNIFICANT_WORD_LIMIT);
    let words_b = significant_words(b, SIGNIFICANT_WORD_LIMIT);
    jaccard(&words_a, &words_b)
}

/// First `limit` distinct words longer than 3 chars that are not stop words,
/// lowercased, in document order
fn significant_words(text: &str, limit: usize) -> HashSet<String> {
    let mut words = HashSet::new();
    for m in WORD_PATTERN.find_iter(text) {
        let word = m.as_str().to_lowercase();
        if word.len() > 3 && !STOP_WORDS.contains(word.as_str()) {
            words.insert(word);
            if words.len() >= limit {
                break;
            }
        }
    }
    words
}

pub(crate) fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}
