//! Property and example tests for compatibility scoring

mod common;

use common::{man, woman};
use nikah_match::models::{AgeRange, IslamicEducation, MarriageTimeline, PrayerFrequency, Profile};
use nikah_match::scoring::{breakdown, score, shared_interest_count};
use proptest::prelude::*;

const CITIES: [&str; 4] = ["London", "Leeds", "Paris", ""];
const COUNTRIES: [&str; 3] = ["United Kingdom", "France", ""];
const TAGS: [&str; 8] = ["reading", "hiking", "cooking", "football", "chess", "travel", "poetry", "Reading "];

fn prayer() -> impl Strategy<Value = Option<PrayerFrequency>> {
    prop_oneof![
        Just(None),
        Just(Some(PrayerFrequency::Always)),
        Just(Some(PrayerFrequency::Usually)),
        Just(Some(PrayerFrequency::Sometimes)),
        Just(Some(PrayerFrequency::Rarely)),
    ]
}

fn education() -> impl Strategy<Value = Option<IslamicEducation>> {
    prop_oneof![
        Just(None),
        Just(Some(IslamicEducation::Basic)),
        Just(Some(IslamicEducation::Intermediate)),
        Just(Some(IslamicEducation::Advanced)),
    ]
}

fn timeline() -> impl Strategy<Value = Option<MarriageTimeline>> {
    prop_oneof![
        Just(None),
        Just(Some(MarriageTimeline::WithinSixMonths)),
        Just(Some(MarriageTimeline::WithinOneYear)),
        Just(Some(MarriageTimeline::OneToTwoYears)),
    ]
}

prop_compose! {
    fn arb_profile()(
        id in 1u32..10_000,
        female in any::<bool>(),
        age in 18u8..80,
        range_min in 18u8..60,
        range_span in 0u8..30,
        city in 0usize..CITIES.len(),
        country in 0usize..COUNTRIES.len(),
        tags in proptest::sample::subsequence(TAGS.to_vec(), 0..=TAGS.len()),
        prayer in prayer(),
        education in education(),
        timeline in timeline(),
    ) -> Profile {
        let builder = if female { woman(id, age) } else { man(id, age) };
        let mut profile = builder
            .range(range_min, range_min.saturating_add(range_span))
            .city(CITIES[city], COUNTRIES[country])
            .interests(&tags)
            .build();
        profile.prayer_frequency = prayer;
        profile.islamic_education = education;
        profile.marriage_timeline = timeline;
        profile
    }
}

proptest! {
    #[test]
    fn score_stays_within_bounds(a in arb_profile(), b in arb_profile()) {
        prop_assert!(score(&a, &b) <= 100);
    }

    #[test]
    fn score_is_symmetric(a in arb_profile(), b in arb_profile()) {
        prop_assert_eq!(breakdown(&a, &b), breakdown(&b, &a));
        prop_assert_eq!(score(&a, &b), score(&b, &a));
    }

    #[test]
    fn sub_scores_respect_their_caps(a in arb_profile(), b in arb_profile()) {
        let parts = breakdown(&a, &b);
        prop_assert!(parts.age <= 20);
        prop_assert!(parts.location <= 15);
        prop_assert!(parts.values <= 25);
        prop_assert!(parts.interests <= 20);
        prop_assert!(parts.interests % 4 == 0);
        prop_assert!([0, 10, 20].contains(&parts.preferences));
        prop_assert_eq!(parts.total(), parts.age + parts.location + parts.values + parts.interests + parts.preferences);
    }

    #[test]
    fn complete_profile_scores_100_against_itself(mut a in arb_profile()) {
        a.location.city = "London".to_string();
        a.location.country = "United Kingdom".to_string();
        a.preferences.age_range = AgeRange::new(a.age, a.age);
        a.interests = ["reading", "hiking", "cooking", "football", "chess"].iter().map(|t| (*t).to_string()).collect();
        a.prayer_frequency = Some(PrayerFrequency::Usually);
        a.islamic_education = Some(IslamicEducation::Advanced);
        a.marriage_timeline = Some(MarriageTimeline::WithinSixMonths);
        prop_assert_eq!(score(&a, &a), 100);
    }
}

#[test]
fn test_worked_example() {
    let requester = woman(1, 26).range(24, 30).interests(&["reading", "hiking", "cooking"]).build();
    let candidate = man(2, 27).range(25, 32).interests(&["reading", "hiking", "football"]).build();

    assert_eq!(score(&requester, &candidate), 88);
    assert_eq!(score(&candidate, &requester), 88);
}

#[test]
fn test_one_sided_preference_fit_earns_half() {
    let requester = woman(1, 26).range(24, 30).build();
    let candidate = man(2, 27).range(30, 40).build();

    assert_eq!(breakdown(&requester, &candidate).preferences, 10);
}

#[test]
fn test_bare_profiles_score_only_on_age_and_preferences() {
    let a = woman(1, 30).city("", "").no_values().build();
    let b = man(2, 31).city("", "").no_values().build();

    let parts = breakdown(&a, &b);
    assert_eq!(parts.age, 20);
    assert_eq!(parts.location, 0);
    assert_eq!(parts.values, 0);
    assert_eq!(parts.interests, 0);
    assert_eq!(parts.preferences, 20);
}

#[test]
fn test_interest_matching_ignores_case_and_padding() {
    let a = woman(1, 30).interests(&["Reading", "  HIKING"]).build();
    let b = man(2, 30).interests(&["reading", "hiking "]).build();

    assert_eq!(shared_interest_count(&a, &b), 2);
    assert_eq!(breakdown(&a, &b).interests, 8);
}
