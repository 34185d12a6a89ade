//! Candidate ranking.
//!
//! Takes an already-fetched candidate pool, drops candidates that fail the
//! requester's optional preference filters, scores the rest and returns the
//! best `limit` in descending score order. Equal scores keep pool order.

use crate::models::{Profile, ScoredProfile};
use crate::scoring;

/// True when `candidate` passes the requester's optional filters.
///
/// Distance is only enforced when both sides carry coordinates. Education and
/// occupation filters require the candidate to have a matching value.
#[must_use]
pub fn passes_preference_filters(requester: &Profile, candidate: &Profile) -> bool {
    let prefs = &requester.preferences;

    if let Some(max_km) = prefs.max_distance_km {
        if let (Some(here), Some(there)) = (requester.location.coordinates, candidate.location.coordinates) {
            if here.distance_km(&there) > f64::from(max_km) {
                return false;
            }
        }
    }

    if let Some(wanted) = prefs.education_level.as_deref() {
        let matches = candidate
            .education
            .as_deref()
            .is_some_and(|education| education.trim().eq_ignore_ascii_case(wanted.trim()));
        if !matches {
            return false;
        }
    }

    if !prefs.occupations.is_empty() {
        let Some(occupation) = candidate.occupation.as_deref() else {
            return false;
        };
        let occupation = occupation.trim();
        if !prefs.occupations.iter().any(|o| o.trim().eq_ignore_ascii_case(occupation)) {
            return false;
        }
    }

    true
}

/// Score, sort and truncate a candidate pool for `requester`.
#[must_use]
pub fn rank_candidates(requester: &Profile, pool: Vec<Profile>, limit: usize) -> Vec<ScoredProfile> {
    let mut scored: Vec<ScoredProfile> = pool
        .into_iter()
        .filter(|candidate| candidate.wallet_address != requester.wallet_address)
        .filter(|candidate| passes_preference_filters(requester, candidate))
        .map(|candidate| ScoredProfile {
            compatibility_score: scoring::score(requester, &candidate),
            profile: candidate,
        })
        .collect();

    // sort_by is stable: ties keep their fetch order
    scored.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeRange, Gender, GeoPoint, Location, MediaRefs, Preferences};
    use chrono::Utc;

    fn person(id: u8, age: u8, city: &str) -> Profile {
        Profile {
            wallet_address: format!("0x{id:040x}"),
            display_name: format!("Person {id}"),
            age,
            gender: Gender::Male,
            location: Location {
                city: city.to_string(),
                country: "Canada".to_string(),
                coordinates: None,
            },
            bio: String::new(),
            interests: Default::default(),
            prayer_frequency: None,
            hijab_preference: None,
            beard_preference: None,
            islamic_education: None,
            marriage_timeline: None,
            education: None,
            occupation: None,
            preferences: Preferences {
                age_range: AgeRange::new(20, 40),
                max_distance_km: None,
                education_level: None,
                occupations: Vec::new(),
            },
            media: MediaRefs::default(),
            is_verified: false,
            is_active: true,
            created_at: Utc::now(),
            last_active: Utc::now(),
        }
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let requester = person(1, 30, "Toronto");
        let pool = vec![
            person(2, 45, "Vancouver"),
            person(3, 30, "Toronto"),
            person(4, 34, "Toronto"),
            person(5, 31, "Montreal"),
        ];

        let ranked = rank_candidates(&requester, pool, 3);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].compatibility_score >= w[1].compatibility_score));
        assert_eq!(ranked[0].profile.wallet_address, format!("0x{:040x}", 3));
    }

    #[test]
    fn test_ties_keep_pool_order() {
        let requester = person(1, 30, "Toronto");
        let pool = vec![person(7, 30, "Toronto"), person(6, 30, "Toronto"), person(8, 30, "Toronto")];

        let ranked = rank_candidates(&requester, pool, 10);
        let order: Vec<_> = ranked.iter().map(|s| s.profile.display_name.as_str()).collect();
        assert_eq!(order, vec!["Person 7", "Person 6", "Person 8"]);
    }

    #[test]
    fn test_requester_never_ranked() {
        let requester = person(1, 30, "Toronto");
        let ranked = rank_candidates(&requester, vec![requester.clone()], 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_distance_filter_only_applies_with_coordinates() {
        let mut requester = person(1, 30, "Toronto");
        requester.preferences.max_distance_km = Some(100);
        requester.location.coordinates = Some(GeoPoint { latitude: 43.65, longitude: -79.38 });

        let mut far = person(2, 30, "Vancouver");
        far.location.coordinates = Some(GeoPoint { latitude: 49.28, longitude: -123.12 });
        let unknown = person(3, 30, "Ottawa");

        assert!(!passes_preference_filters(&requester, &far));
        assert!(passes_preference_filters(&requester, &unknown));
    }

    #[test]
    fn test_education_and_occupation_filters() {
        let mut requester = person(1, 30, "Toronto");
        requester.preferences.education_level = Some("Bachelor".to_string());
        requester.preferences.occupations = vec!["Engineer".to_string(), "Nurse".to_string()];

        let mut fits = person(2, 30, "Toronto");
        fits.education = Some("bachelor".to_string());
        fits.occupation = Some("nurse".to_string());
        assert!(passes_preference_filters(&requester, &fits));

        let mut wrong_job = fits.clone();
        wrong_job.occupation = Some("Pilot".to_string());
        assert!(!passes_preference_filters(&requester, &wrong_job));

        let mut no_education = fits;
        no_education.education = None;
        assert!(!passes_preference_filters(&requester, &no_education));
    }
}
