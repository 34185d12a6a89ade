use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MatchError, Result};
use crate::models::{AgeRange, Profile};

fn invalid(message: impl Into<String>) -> MatchError {
    MatchError::Validation(message.into())
}

#[allow(clippy::expect_used)]
fn evm_address() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static EVM address pattern"))
}

#[allow(clippy::expect_used)]
fn base58_address() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("static base58 address pattern"))
}

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a wallet address used as a profile identity key
    pub fn validate_wallet_address(address: &str) -> Result<()> {
        if address.trim().is_empty() {
            return Err(invalid("Wallet address cannot be empty"));
        }

        if evm_address().is_match(address) || base58_address().is_match(address) {
            return Ok(());
        }

        Err(invalid(format!("Unrecognised wallet address format: {address}")))
    }

    /// Validate a wallet address and return its canonical form.
    ///
    /// EVM hex addresses are case-insensitive (EIP-55 checksum casing is only
    /// presentation), so they are lowercased. Base58 addresses are case-sensitive
    /// and returned unchanged.
    pub fn normalize_wallet_address(address: &str) -> Result<String> {
        Self::validate_wallet_address(address)?;
        if evm_address().is_match(address) {
            Ok(address.to_ascii_lowercase())
        } else {
            Ok(address.to_string())
        }
    }

    /// Validate display name
    pub fn validate_display_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(invalid("Display name cannot be empty"));
        }

        if name.chars().count() > 100 {
            return Err(invalid("Display name too long (max 100 characters)"));
        }

        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(invalid("Display name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate age against the configured minimum
    pub fn validate_age(age: u8, minimum_age: u8) -> Result<()> {
        if age < minimum_age {
            return Err(invalid(format!("Age {age} is below the minimum of {minimum_age}")));
        }

        if age > 120 {
            return Err(invalid(format!("Age {age} is not plausible")));
        }

        Ok(())
    }

    /// Validate a preferred age range
    pub fn validate_age_range(range: &AgeRange, minimum_age: u8) -> Result<()> {
        if !range.is_ordered() {
            return Err(invalid(format!(
                "Age range minimum {} is greater than maximum {}",
                range.min, range.max
            )));
        }

        if range.min < minimum_age {
            return Err(invalid(format!(
                "Age range minimum {} is below the minimum of {minimum_age}",
                range.min
            )));
        }

        Ok(())
    }

    /// Validate a page size
    pub fn validate_limit(limit: usize, max_limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(invalid("Limit must be greater than 0"));
        }

        if limit > max_limit {
            return Err(invalid(format!("Limit {limit} exceeds maximum of {max_limit}")));
        }

        Ok(())
    }

    /// Validate a media URL (photos, intro video/voice)
    pub fn validate_media_url(url: &str) -> Result<()> {
        if url.len() > 2048 {
            return Err(invalid("Media URL too long (max 2048 characters)"));
        }

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(invalid(format!("Media URL must be http(s): {url}")));
        }

        if url.chars().any(char::is_whitespace) {
            return Err(invalid("Media URL contains whitespace"));
        }

        Ok(())
    }

    /// Validate a whole profile before it is stored
    pub fn validate_profile(profile: &Profile, minimum_age: u8) -> Result<()> {
        Self::validate_wallet_address(&profile.wallet_address)?;
        Self::validate_display_name(&profile.display_name)?;
        Self::validate_age(profile.age, minimum_age)?;
        Self::validate_age_range(&profile.preferences.age_range, minimum_age)?;

        if profile.interests.len() > 50 {
            return Err(invalid("Too many interests (max 50)"));
        }

        if profile.bio.chars().count() > 5000 {
            return Err(invalid("Biography too long (max 5000 characters)"));
        }

        if let Some(coordinates) = profile.location.coordinates {
            if !(-90.0..=90.0).contains(&coordinates.latitude) || !(-180.0..=180.0).contains(&coordinates.longitude) {
                return Err(invalid("Coordinates out of range"));
            }
        }

        let media = &profile.media;
        for url in media
            .photos
            .iter()
            .chain(media.video_intro_url.iter())
            .chain(media.voice_intro_url.iter())
        {
            Self::validate_media_url(url)?;
        }

        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Validate database URL
    pub fn validate_database_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(invalid("Database URL cannot be empty"));
        }

        if !url.starts_with("sqlite:") {
            return Err(invalid("Only SQLite databases are supported"));
        }

        if url.len() > 1000 {
            return Err(invalid("Database URL too long"));
        }

        Ok(())
    }
}
