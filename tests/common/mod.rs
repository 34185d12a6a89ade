//! Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use nikah_match::models::{
    AgeRange, Gender, IslamicEducation, Location, MarriageTimeline, MediaRefs, Preferences, PrayerFrequency, Profile,
};

/// Deterministic EVM-style wallet address for fixture `n`
pub fn wallet(n: u32) -> String {
    format!("0x{n:040x}")
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().unwrap_or_else(Utc::now)
}

/// Builder for test profiles with sensible defaults
pub struct ProfileBuilder {
    profile: Profile,
}

impl ProfileBuilder {
    pub fn new(n: u32, gender: Gender, age: u8) -> Self {
        let created = fixed_time();
        Self {
            profile: Profile {
                wallet_address: wallet(n),
                display_name: format!("Person {n}"),
                age,
                gender,
                location: Location {
                    city: "London".to_string(),
                    country: "United Kingdom".to_string(),
                    coordinates: None,
                },
                bio: String::new(),
                interests: Default::default(),
                prayer_frequency: Some(PrayerFrequency::Always),
                hijab_preference: None,
                beard_preference: None,
                islamic_education: Some(IslamicEducation::Intermediate),
                marriage_timeline: Some(MarriageTimeline::WithinOneYear),
                education: None,
                occupation: None,
                preferences: Preferences {
                    age_range: AgeRange::new(18, 60),
                    max_distance_km: None,
                    education_level: None,
                    occupations: Vec::new(),
                },
                media: MediaRefs::default(),
                is_verified: false,
                is_active: true,
                created_at: created,
                last_active: created,
            },
        }
    }

    pub fn range(mut self, min: u8, max: u8) -> Self {
        self.profile.preferences.age_range = AgeRange::new(min, max);
        self
    }

    pub fn city(mut self, city: &str, country: &str) -> Self {
        self.profile.location.city = city.to_string();
        self.profile.location.country = country.to_string();
        self
    }

    pub fn interests(mut self, tags: &[&str]) -> Self {
        self.profile.interests = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    pub fn no_values(mut self) -> Self {
        self.profile.prayer_frequency = None;
        self.profile.islamic_education = None;
        self.profile.marriage_timeline = None;
        self
    }

    pub fn occupation(mut self, occupation: &str) -> Self {
        self.profile.occupation = Some(occupation.to_string());
        self
    }

    pub fn wants_occupations(mut self, occupations: &[&str]) -> Self {
        self.profile.preferences.occupations = occupations.iter().map(|o| (*o).to_string()).collect();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.profile.is_active = false;
        self
    }

    pub fn build(self) -> Profile {
        self.profile
    }
}

pub fn man(n: u32, age: u8) -> ProfileBuilder {
    ProfileBuilder::new(n, Gender::Male, age)
}

pub fn woman(n: u32, age: u8) -> ProfileBuilder {
    ProfileBuilder::new(n, Gender::Female, age)
}
