//! AI note-clustering adapter.
//!
//! Calls an OpenAI-compatible chat-completions endpoint to group a board's
//! notes under facilitator-defined categories, then deterministically
//! reconciles whatever label strings the model echoes back onto the
//! canonical category list. The model is untrusted for exact-string
//! fidelity; [`reconcile`] is, and it guarantees that every input note
//! lands in exactly one output bucket no matter how mangled the reply is.

pub mod client;
pub mod prompt;
pub mod reconcile;

pub use client::{ClusterClient, ClusterError, ClusterRequest, ClusterSettings};
pub use prompt::RawCluster;
pub use reconcile::{assign_notes, reconcile, CategoryBucket, NoteAssignment, NoteSnapshot};

/// Inclusive bounds on the number of facilitator-defined categories.
pub const MIN_CATEGORIES: usize = 2;
pub const MAX_CATEGORIES: usize = 50;

/// Upper bound on category label length, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Upper bound on the number of notes per clustering call.
pub const MAX_NOTES: usize = 500;
