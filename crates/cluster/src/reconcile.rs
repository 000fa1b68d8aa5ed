//! Fuzzy reconciliation of model-returned category labels onto the
//! facilitator's canonical category list.
//!
//! The model is asked to echo category labels verbatim but routinely does
//! not: it lowercases, drops the `•` qualifier separator, trims words, or
//! invents close paraphrases. [`reconcile`] maps any candidate string back
//! onto a canonical label through four tiers, and [`assign_notes`] uses it
//! to build the final buckets while enforcing the hard post-condition that
//! every input note appears in exactly one bucket.

use std::collections::HashSet;

use serde::Serialize;
use boardstorm_core::types::DbId;

use crate::prompt::RawCluster;

/// Separator used in category labels to attach a qualifier, e.g.
/// `"Tech • ideas"`. Models frequently drop it.
pub const LABEL_SEPARATOR: char = '•';

/// Minimum overlapping-token count for a tier-4 keyword match.
const MIN_TOKEN_OVERLAP: usize = 1;

/// Tokens shorter than this are ignored when scoring keyword overlap.
const MIN_TOKEN_LENGTH: usize = 3;

/// Common words that carry no category signal.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "you",
    "our", "your", "not", "all", "any", "can", "has", "have", "how", "what",
];

/// A note snapshot handed to the clustering call: id plus content.
#[derive(Debug, Clone, Serialize)]
pub struct NoteSnapshot {
    pub id: DbId,
    pub content: String,
}

/// One note's placement inside a category bucket.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NoteAssignment {
    pub note_id: DbId,
    /// Model-reported confidence, clamped to 0..=1. Zero for notes the
    /// model omitted and we force-assigned to the default category.
    pub confidence: f64,
}

/// A reconciled category bucket, labeled with the canonical category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBucket {
    pub label: String,
    pub notes: Vec<NoteAssignment>,
}

// ---------------------------------------------------------------------------
// Label reconciliation
// ---------------------------------------------------------------------------

/// Map a model-returned label onto a canonical category.
///
/// Tiers, in order:
/// 1. exact match, case-insensitive;
/// 2. main-part match: the candidate equals the canonical label with its
///    `•` qualifier stripped, or equals the part before the separator;
/// 3. substring containment in either direction;
/// 4. keyword overlap: highest count of shared significant tokens, ties
///    broken by first-declared category.
///
/// Returns `None` when no tier clears its threshold; callers fall back to
/// the first canonical category so no note is ever dropped.
pub fn reconcile<'a>(candidate: &str, canonical: &'a [String]) -> Option<&'a str> {
    let cand = normalize(candidate);
    if cand.is_empty() {
        return None;
    }

    // Tier 1: exact, case-insensitive.
    for label in canonical {
        if normalize(label) == cand {
            return Some(label);
        }
    }

    // Tier 2: main part before / without the separator.
    for label in canonical {
        if label.contains(LABEL_SEPARATOR) {
            let stripped = normalize(&label.replace(LABEL_SEPARATOR, " "));
            let head = normalize(label.split(LABEL_SEPARATOR).next().unwrap_or(""));
            if cand == stripped || cand == head {
                return Some(label);
            }
        }
    }

    // Tier 3: substring containment either direction.
    for label in canonical {
        let norm = normalize(label);
        if norm.contains(&cand) || cand.contains(&norm) {
            return Some(label);
        }
    }

    // Tier 4: keyword overlap, first-declared category wins ties.
    let cand_tokens = tokens(&cand);
    let mut best: Option<(&'a str, usize)> = None;
    for label in canonical {
        let overlap = tokens(&normalize(label))
            .intersection(&cand_tokens)
            .count();
        if overlap >= MIN_TOKEN_OVERLAP && best.map_or(true, |(_, b)| overlap > b) {
            best = Some((label, overlap));
        }
    }
    best.map(|(label, _)| label)
}

/// Lowercase, collapse runs of whitespace, trim.
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Significant tokens of a normalized string.
fn tokens(s: &str) -> HashSet<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TOKEN_LENGTH && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Note assignment
// ---------------------------------------------------------------------------

/// Build the final category buckets from the model's raw clusters.
///
/// Post-condition, guaranteed regardless of how malformed or adversarial
/// the raw clusters are: the union of notes across all buckets is exactly
/// the input note set — no duplicates (first placement wins), no
/// fabricated ids (unknown ids are discarded), no omissions (left-over
/// notes land in the first canonical category with confidence 0).
///
/// Buckets come back in canonical declaration order; empty buckets are
/// kept so the caller sees every category it asked for. With no canonical
/// categories there is no fallback bucket either, so the result is empty
/// (the client validates `MIN_CATEGORIES` before ever calling the model).
pub fn assign_notes(
    raw: &[RawCluster],
    canonical: &[String],
    notes: &[NoteSnapshot],
) -> Vec<CategoryBucket> {
    if canonical.is_empty() {
        return Vec::new();
    }

    let known: HashSet<DbId> = notes.iter().map(|n| n.id).collect();
    let mut buckets: Vec<CategoryBucket> = canonical
        .iter()
        .map(|label| CategoryBucket {
            label: label.clone(),
            notes: Vec::new(),
        })
        .collect();

    let mut placed: HashSet<DbId> = HashSet::new();

    for cluster in raw {
        // Unmatched labels fall back to the first canonical category
        // rather than creating a bucket the facilitator never declared.
        let label = reconcile(&cluster.category, canonical)
            .unwrap_or_else(|| canonical[0].as_str());
        let idx = buckets
            .iter()
            .position(|b| b.label == label)
            .unwrap_or(0);

        for raw_note in &cluster.notes {
            if !known.contains(&raw_note.id) || !placed.insert(raw_note.id) {
                continue;
            }
            buckets[idx].notes.push(NoteAssignment {
                note_id: raw_note.id,
                confidence: raw_note.confidence.clamp(0.0, 1.0),
            });
        }
    }

    // Notes the model dropped entirely go to the default (first) category.
    for note in notes {
        if placed.insert(note.id) {
            buckets[0].notes.push(NoteAssignment {
                note_id: note.id,
                confidence: 0.0,
            });
        }
    }

    buckets
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
