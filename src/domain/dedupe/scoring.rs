//! Pairwise contact similarity scoring.
//!
//! Four weak identifiers are compared independently and combined into a
//! weighted confidence score. All scores live in [0, 100]; every component
//! and the composite are symmetric in their arguments.

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::domain::foundation::ContactId;

/// Weight of each component in the composite confidence score.
///
/// Exact-match channels (email, phone) outweigh the fuzzy signals because
/// they also serve as the inline matcher's exact-identifier gate.
const NAME_WEIGHT: f64 = 0.30;
const EMAIL_WEIGHT: f64 = 0.35;
const PHONE_WEIGHT: f64 = 0.20;
const ADDRESS_WEIGHT: f64 = 0.15;

/// Minimum confidence for the batch scanner to persist a candidate pair.
pub const SCAN_THRESHOLD: u8 = 50;

/// Minimum confidence for ingestion-time auto-linking (plus the exact gate).
pub const INLINE_MATCH_THRESHOLD: u8 = 90;

/// Address components carried by a snapshot, already detached from the row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// Read-only view of one contact's identifying data, the scanner's unit of
/// comparison. Built once per contact per scan; scoring never touches the
/// repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    pub id: ContactId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub addresses: Vec<SnapshotAddress>,
}

/// Per-signal scores plus the weighted composite, all in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub name: u8,
    pub email: u8,
    pub phone: u8,
    pub address: u8,
    pub confidence: u8,
}

/// Scores a pair of contact snapshots.
pub fn score_pair(a: &ContactSnapshot, b: &ContactSnapshot) -> ScoreBreakdown {
    let name = name_score(a, b);
    let email = email_score(&a.emails, &b.emails);
    let phone = phone_score(&a.phones, &b.phones);
    let address = address_score(&a.addresses, &b.addresses);

    let confidence = (name as f64) * NAME_WEIGHT
        + (email as f64) * EMAIL_WEIGHT
        + (phone as f64) * PHONE_WEIGHT
        + (address as f64) * ADDRESS_WEIGHT;

    ScoreBreakdown {
        name,
        email,
        phone,
        address,
        confidence: clamp_score(confidence),
    }
}

/// Fuzzy name similarity over (first, last), tolerant of missing parts.
///
/// A name part absent on either side contributes 0 for that part.
fn name_score(a: &ContactSnapshot, b: &ContactSnapshot) -> u8 {
    let first = part_similarity(a.first_name.as_deref(), b.first_name.as_deref());
    let last = part_similarity(a.last_name.as_deref(), b.last_name.as_deref());
    clamp_score((first + last) / 2.0 * 100.0)
}

fn part_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => {
            let a = normalize_name(a);
            let b = normalize_name(b);
            if a.is_empty() || b.is_empty() {
                0.0
            } else {
                jaro_winkler(&a, &b)
            }
        }
        _ => 0.0,
    }
}

/// Email similarity: exact match 100, shared local-part 70, shared domain 30.
fn email_score(a: &[String], b: &[String]) -> u8 {
    let mut best = 0u8;
    for ea in a {
        let ea = ea.trim().to_lowercase();
        for eb in b {
            let eb = eb.trim().to_lowercase();
            if ea.is_empty() || eb.is_empty() {
                continue;
            }
            if ea == eb {
                return 100;
            }
            let split_a = ea.split_once('@');
            let split_b = eb.split_once('@');
            if let (Some((local_a, domain_a)), Some((local_b, domain_b))) = (split_a, split_b) {
                if local_a == local_b && !local_a.is_empty() {
                    best = best.max(70);
                } else if domain_a == domain_b && !domain_a.is_empty() {
                    best = best.max(30);
                }
            }
        }
    }
    best
}

/// Phone similarity on digit-only forms; a last-7-digit match counts as a
/// match to absorb country-code and formatting variance.
fn phone_score(a: &[String], b: &[String]) -> u8 {
    for pa in a {
        let pa = normalize_phone(pa);
        if pa.is_empty() {
            continue;
        }
        for pb in b {
            let pb = normalize_phone(pb);
            if pb.is_empty() {
                continue;
            }
            if pa == pb {
                return 100;
            }
            if pa.len() >= 7 && pb.len() >= 7 && pa[pa.len() - 7..] == pb[pb.len() - 7..] {
                return 100;
            }
        }
    }
    0
}

/// Component-wise address comparison; the best-scoring location pair wins.
///
/// Points: zip 40, street 30, city 20, state 10.
fn address_score(a: &[SnapshotAddress], b: &[SnapshotAddress]) -> u8 {
    let mut best = 0u8;
    for la in a {
        for lb in b {
            let mut score = 0u8;
            if component_eq(&la.zip, &lb.zip) {
                score += 40;
            }
            if component_eq(&la.street, &lb.street) {
                score += 30;
            }
            if component_eq(&la.city, &lb.city) {
                score += 20;
            }
            if component_eq(&la.state, &lb.state) {
                score += 10;
            }
            best = best.max(score);
        }
    }
    best
}

fn component_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            let a = a.trim();
            let b = b.trim();
            !a.is_empty() && a.eq_ignore_ascii_case(b)
        }
        _ => false,
    }
}

/// Lowercases and strips the diacritics common in donor names.
fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ñ' => 'n',
        'ç' => 'c',
        'ß' => 's',
        other => other,
    }
}

fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}
