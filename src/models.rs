//! Data models for profiles and match interactions
//!
//! This module contains all data structures used throughout the library,
//! including profiles, their preference sub-records, interaction events,
//! and the derived shapes returned to callers.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MatchError, Result};

/// Binary gender used for coarse candidate filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

impl Gender {
    /// The gender a profile is matched against
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }

    /// Stable storage label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(MatchError::Validation(format!("unknown gender: {other}"))),
        }
    }
}

/// How often the person prays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrayerFrequency {
    /// All five daily prayers
    Always,
    /// Most daily prayers
    Usually,
    /// Some of the time
    Sometimes,
    /// Rarely
    Rarely,
}

/// Level of Islamic education
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IslamicEducation {
    /// Basic
    Basic,
    /// Intermediate
    Intermediate,
    /// Advanced
    Advanced,
}

/// When the person intends to marry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarriageTimeline {
    /// Within six months
    WithinSixMonths,
    /// Within a year
    WithinOneYear,
    /// One to two years
    OneToTwoYears,
}

/// Hijab or beard preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoveringPreference {
    /// Required
    Required,
    /// Preferred but not required
    Preferred,
    /// No preference
    NoPreference,
}

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
}

impl GeoPoint {
    /// Great-circle distance in kilometres (haversine)
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Where a person lives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// City name
    pub city: String,
    /// Country name
    pub country: String,
    /// Optional coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

/// Inclusive age bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    /// Lower bound (inclusive)
    pub min: u8,
    /// Upper bound (inclusive)
    pub max: u8,
}

impl AgeRange {
    /// Create a new range; bounds are not checked here
    #[must_use]
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// True when `age` lies within the bounds
    #[must_use]
    pub const fn contains(&self, age: u8) -> bool {
        self.min <= age && age <= self.max
    }

    /// True when `min <= max`
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// What a person is looking for in a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Desired age range
    pub age_range: AgeRange,
    /// Maximum distance to a match in kilometres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance_km: Option<u32>,
    /// Required education level of a match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    /// Acceptable occupations (empty means any)
    #[serde(default)]
    pub occupations: Vec<String>,
}

/// Photo and intro media references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRefs {
    /// Photo URLs
    #[serde(default)]
    pub photos: Vec<String>,
    /// Video introduction URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_intro_url: Option<String>,
    /// Voice introduction URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_intro_url: Option<String>,
}

/// One person seeking a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Wallet address; unique and immutable once created
    pub wallet_address: String,
    /// Display name
    pub display_name: String,
    /// Age in years
    pub age: u8,
    /// Gender
    pub gender: Gender,
    /// Home location
    pub location: Location,
    /// Free-text biography
    #[serde(default)]
    pub bio: String,
    /// Interest tags
    #[serde(default)]
    pub interests: BTreeSet<String>,
    /// Prayer frequency
    #[serde(default)]
    pub prayer_frequency: Option<PrayerFrequency>,
    /// Hijab preference
    #[serde(default)]
    pub hijab_preference: Option<CoveringPreference>,
    /// Beard preference
    #[serde(default)]
    pub beard_preference: Option<CoveringPreference>,
    /// Islamic education level
    #[serde(default)]
    pub islamic_education: Option<IslamicEducation>,
    /// Marriage timeline intention
    #[serde(default)]
    pub marriage_timeline: Option<MarriageTimeline>,
    /// Secular education, tested by `Preferences::education_level`
    #[serde(default)]
    pub education: Option<String>,
    /// Occupation, tested by `Preferences::occupations`
    #[serde(default)]
    pub occupation: Option<String>,
    /// Match preferences
    pub preferences: Preferences,
    /// Media references
    #[serde(default)]
    pub media: MediaRefs,
    /// Identity verification flag
    #[serde(default)]
    pub is_verified: bool,
    /// False once the owner deactivates the profile
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
    /// When the owner was last active
    pub last_active: DateTime<Utc>,
}

const fn default_active() -> bool {
    true
}

/// Explicit field-level update for a profile; `None` leaves a field unchanged.
///
/// Optional attributes take `Option<Option<T>>`: an explicit JSON `null`
/// deserializes to `Some(None)` and clears the attribute. The wallet address
/// and creation time are not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name
    pub display_name: Option<String>,
    /// New age
    pub age: Option<u8>,
    /// New location
    pub location: Option<Location>,
    /// New biography
    pub bio: Option<String>,
    /// Replacement interest set
    pub interests: Option<BTreeSet<String>>,
    /// New prayer frequency; `Some(None)` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    pub prayer_frequency: Option<Option<PrayerFrequency>>,
    /// New hijab preference; `Some(None)` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    pub hijab_preference: Option<Option<CoveringPreference>>,
    /// New beard preference; `Some(None)` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    pub beard_preference: Option<Option<CoveringPreference>>,
    /// New Islamic education level; `Some(None)` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    pub islamic_education: Option<Option<IslamicEducation>>,
    /// New marriage timeline; `Some(None)` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    pub marriage_timeline: Option<Option<MarriageTimeline>>,
    /// New education; `Some(None)` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    pub education: Option<Option<String>>,
    /// New occupation; `Some(None)` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    pub occupation: Option<Option<String>>,
    /// Replacement preferences
    pub preferences: Option<Preferences>,
    /// Replacement media references
    pub media: Option<MediaRefs>,
}

/// Keep an explicit `null` distinct from an absent field
fn present_or_null<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProfileUpdate {
    /// Apply every set field to `profile`
    pub fn apply_to(self, profile: &mut Profile) {
        if let Some(display_name) = self.display_name {
            profile.display_name = display_name;
        }
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(location) = self.location {
            profile.location = location;
        }
        if let Some(bio) = self.bio {
            profile.bio = bio;
        }
        if let Some(interests) = self.interests {
            profile.interests = interests;
        }
        if let Some(prayer_frequency) = self.prayer_frequency {
            profile.prayer_frequency = prayer_frequency;
        }
        if let Some(hijab_preference) = self.hijab_preference {
            profile.hijab_preference = hijab_preference;
        }
        if let Some(beard_preference) = self.beard_preference {
            profile.beard_preference = beard_preference;
        }
        if let Some(islamic_education) = self.islamic_education {
            profile.islamic_education = islamic_education;
        }
        if let Some(marriage_timeline) = self.marriage_timeline {
            profile.marriage_timeline = marriage_timeline;
        }
        if let Some(education) = self.education {
            profile.education = education;
        }
        if let Some(occupation) = self.occupation {
            profile.occupation = occupation;
        }
        if let Some(preferences) = self.preferences {
            profile.preferences = preferences;
        }
        if let Some(media) = self.media {
            profile.media = media;
        }
    }
}

/// Coarse filter used to fetch a candidate pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFilter {
    /// Gender candidates must have
    pub gender: Gender,
    /// Minimum candidate age (inclusive)
    pub age_min: u8,
    /// Maximum candidate age (inclusive)
    pub age_max: u8,
    /// Identity to leave out (the requester)
    pub exclude_key: String,
}

impl CandidateFilter {
    /// Pool filter for `requester`: opposite gender within the requester's age range
    #[must_use]
    pub fn for_requester(requester: &Profile) -> Self {
        Self {
            gender: requester.gender.opposite(),
            age_min: requester.preferences.age_range.min,
            age_max: requester.preferences.age_range.max,
            exclude_key: requester.wallet_address.clone(),
        }
    }

    /// Reject inverted bounds before any query runs
    pub fn validate(&self) -> Result<()> {
        if self.age_min > self.age_max {
            return Err(MatchError::Validation(format!(
                "age_min {} is greater than age_max {}",
                self.age_min, self.age_max
            )));
        }
        Ok(())
    }

    /// True when an active `profile` satisfies the filter
    #[must_use]
    pub fn matches(&self, profile: &Profile) -> bool {
        profile.is_active
            && profile.gender == self.gender
            && profile.age >= self.age_min
            && profile.age <= self.age_max
            && profile.wallet_address != self.exclude_key
    }
}

/// A profile annotated with its compatibility score against a requester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProfile {
    /// The candidate
    #[serde(flatten)]
    pub profile: Profile,
    /// Score in 0..=100
    pub compatibility_score: u8,
}

/// Kind of interaction event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// A message was sent
    Message,
    /// A profile was viewed
    ViewProfile,
}

impl InteractionType {
    /// Stable storage label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::ViewProfile => "view_profile",
        }
    }
}

impl FromStr for InteractionType {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "message" => Ok(Self::Message),
            "view_profile" => Ok(Self::ViewProfile),
            other => Err(MatchError::Validation(format!("unknown interaction type: {other}"))),
        }
    }
}

/// Medium of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Text message
    Text,
    /// Audio message
    Audio,
    /// Video message
    Video,
}

impl MessageKind {
    /// Stable storage label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(MatchError::Validation(format!("unknown message kind: {other}"))),
        }
    }
}

/// Message body attached to a `message` interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Medium
    pub kind: MessageKind,
    /// Inline content (text messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Media URL (audio/video messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Data for appending a new interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteraction {
    /// Sender wallet address
    pub sender: String,
    /// Recipient wallet address
    pub recipient: String,
    /// Interaction type
    pub interaction_type: InteractionType,
    /// Message body for `message` interactions
    pub message: Option<MessagePayload>,
    /// Event time
    pub created_at: DateTime<Utc>,
}

/// Immutable, stored interaction event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInteraction {
    /// Store-assigned identifier, increasing in append order
    pub id: i64,
    /// Sender wallet address
    pub sender: String,
    /// Recipient wallet address
    pub recipient: String,
    /// Interaction type
    pub interaction_type: InteractionType,
    /// Message body for `message` interactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessagePayload>,
    /// Event time
    pub created_at: DateTime<Utc>,
}

impl MatchInteraction {
    /// Attach a store identifier to a new interaction
    #[must_use]
    pub fn from_new(id: i64, new: NewInteraction) -> Self {
        Self {
            id,
            sender: new.sender,
            recipient: new.recipient,
            interaction_type: new.interaction_type,
            message: new.message,
            created_at: new.created_at,
        }
    }
}

/// A counterpart in the inbox or outbox view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPartner {
    /// The other party's profile
    pub profile: Profile,
    /// Time of the most recent message with this counterpart
    pub last_interaction_at: DateTime<Utc>,
    /// Number of messages exchanged in this direction
    pub message_count: usize,
}
