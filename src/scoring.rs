//! Compatibility scoring between two profiles.
//!
//! A fixed point-budget model: five sub-scores whose maxima add up to 100.
//! Scoring never fails; missing optional attributes simply earn nothing.
//!
//! The mutual preference check tests each side's own age range on its own,
//! so a one-sided fit earns half of that sub-score. Because both sides are
//! always added, swapping requester and candidate yields the same total.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::models::Profile;

/// Maximum points per sub-score
pub mod weights {
    /// Age proximity
    pub const AGE: u8 = 20;
    /// Location proximity
    pub const LOCATION: u8 = 15;
    /// Same prayer frequency
    pub const PRAYER: u8 = 10;
    /// Same Islamic education level
    pub const EDUCATION: u8 = 8;
    /// Same marriage timeline
    pub const TIMELINE: u8 = 7;
    /// Shared interests cap
    pub const INTERESTS: u8 = 20;
    /// Points per shared interest
    pub const PER_INTEREST: u8 = 4;
    /// Each side of the mutual preference check
    pub const PREFERENCE_SIDE: u8 = 10;
    /// Total budget
    pub const TOTAL: u8 = AGE + LOCATION + PRAYER + EDUCATION + TIMELINE + INTERESTS + 2 * PREFERENCE_SIDE;
}

/// Per-dimension points earned by a candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Age proximity (0..=20)
    pub age: u8,
    /// Location proximity (0..=15)
    pub location: u8,
    /// Islamic values alignment (0..=25)
    pub values: u8,
    /// Shared interests (0..=20)
    pub interests: u8,
    /// Mutual preference fit (0..=20)
    pub preferences: u8,
}

impl ScoreBreakdown {
    /// Final score, never above 100
    #[must_use]
    pub fn total(&self) -> u8 {
        let sum = u16::from(self.age)
            + u16::from(self.location)
            + u16::from(self.values)
            + u16::from(self.interests)
            + u16::from(self.preferences);
        // capped sub-scores add up to at most 100
        u8::try_from(sum.min(100)).unwrap_or(100)
    }
}

/// Compatibility score of `candidate` from `requester`'s point of view.
#[must_use]
pub fn score(requester: &Profile, candidate: &Profile) -> u8 {
    breakdown(requester, candidate).total()
}

/// All five sub-scores for a pair.
#[must_use]
pub fn breakdown(requester: &Profile, candidate: &Profile) -> ScoreBreakdown {
    ScoreBreakdown {
        age: age_points(requester.age, candidate.age),
        location: location_points(requester, candidate),
        values: values_points(requester, candidate),
        interests: interest_points(requester, candidate),
        preferences: preference_points(requester, candidate),
    }
}

fn age_points(a: u8, b: u8) -> u8 {
    match a.abs_diff(b) {
        0..=2 => weights::AGE,
        3..=5 => 15,
        6..=8 => 10,
        9..=12 => 5,
        _ => 0,
    }
}

fn same_place(a: &str, b: &str) -> bool {
    let a = a.trim();
    !a.is_empty() && a.to_lowercase() == b.trim().to_lowercase()
}

fn location_points(a: &Profile, b: &Profile) -> u8 {
    if same_place(&a.location.city, &b.location.city) {
        return weights::LOCATION;
    }
    if same_place(&a.location.country, &b.location.country) {
        return 10;
    }
    if a.location.country.trim().is_empty() || b.location.country.trim().is_empty() {
        return 0;
    }
    5
}

fn values_points(a: &Profile, b: &Profile) -> u8 {
    fn both_equal<T: PartialEq>(x: Option<T>, y: Option<T>) -> bool {
        matches!((x, y), (Some(x), Some(y)) if x == y)
    }

    let mut points = 0;
    if both_equal(a.prayer_frequency, b.prayer_frequency) {
        points += weights::PRAYER;
    }
    if both_equal(a.islamic_education, b.islamic_education) {
        points += weights::EDUCATION;
    }
    if both_equal(a.marriage_timeline, b.marriage_timeline) {
        points += weights::TIMELINE;
    }
    points
}

/// Canonical form of an interest tag: NFKC, trimmed, lowercase.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.nfkc().collect::<String>().trim().to_lowercase()
}

fn normalized_tags(profile: &Profile) -> BTreeSet<String> {
    profile
        .interests
        .iter()
        .map(|tag| normalize_tag(tag))
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Number of distinct interest tags both profiles share.
#[must_use]
pub fn shared_interest_count(a: &Profile, b: &Profile) -> usize {
    let theirs = normalized_tags(b);
    normalized_tags(a).intersection(&theirs).count()
}

fn interest_points(a: &Profile, b: &Profile) -> u8 {
    let shared = shared_interest_count(a, b).min(usize::from(weights::INTERESTS / weights::PER_INTEREST));
    // bounded by the cap above, so the cast cannot truncate
    u8::try_from(shared).map_or(weights::INTERESTS, |n| n * weights::PER_INTEREST)
}

fn preference_points(requester: &Profile, candidate: &Profile) -> u8 {
    let mut points = 0;
    if requester.preferences.age_range.contains(candidate.age) {
        points += weights::PREFERENCE_SIDE;
    }
    if candidate.preferences.age_range.contains(requester.age) {
        points += weights::PREFERENCE_SIDE;
    }
    points
}
