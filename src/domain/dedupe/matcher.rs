//! Ingestion-time inline matching.
//!
//! A narrower matcher than the batch scanner: it reuses the same component
//! scores but only reports a match when the composite clears a much higher
//! bar AND at least one primary identifier (email or phone) matches exactly.
//! The exact-match gate keeps fuzzy name/address similarity alone from
//! auto-linking an incoming donor to the wrong contact.

use super::scoring::{score_pair, ContactSnapshot, ScoreBreakdown, INLINE_MATCH_THRESHOLD};

/// Result of an inline match attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineMatch {
    pub candidate: ContactSnapshot,
    pub scores: ScoreBreakdown,
}

/// Finds the best existing contact the incoming donor may be attached to
/// without waiting for the asynchronous scan.
///
/// Returns `None` unless some candidate scores >= 90 with an exact email or
/// phone match. Ties break toward the higher confidence.
pub fn find_inline_match(
    incoming: &ContactSnapshot,
    candidates: &[ContactSnapshot],
) -> Option<InlineMatch> {
    candidates
        .iter()
        .filter(|candidate| candidate.id != incoming.id)
        .map(|candidate| (candidate, score_pair(incoming, candidate)))
        .filter(|(_, scores)| {
            scores.confidence >= INLINE_MATCH_THRESHOLD
                && (scores.email == 100 || scores.phone == 100)
        })
        .max_by_key(|(_, scores)| scores.confidence)
        .map(|(candidate, scores)| InlineMatch {
            candidate: candidate.clone(),
            scores,
        })
}
