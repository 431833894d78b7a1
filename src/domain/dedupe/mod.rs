//! Duplicate detection: pairwise scoring, inline matching, and the
//! candidate-match records the review workflow operates on.

mod duplicate_match;
mod matcher;
mod scoring;

pub use duplicate_match::{ordered_pair, DuplicateMatch, MergeHistory};
pub use matcher::{find_inline_match, InlineMatch};
pub use scoring::{
    score_pair, ContactSnapshot, ScoreBreakdown, SnapshotAddress, INLINE_MATCH_THRESHOLD,
    SCAN_THRESHOLD,
};
