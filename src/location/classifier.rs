//! Location token classification
//!
//! Pure string inspection; no I/O and no hard errors. Shapes that match
//! nothing specific fall through as international postal codes and are left
//! for the resolver to accept or reject.

use super::{canada, outposts};
use crate::models::{LocationKind, PostalShape};

/// First letters that do not start any ICAO location indicator
const NON_ICAO_PREFIXES: [char; 4] = ['I', 'J', 'Q', 'X'];

/// Classify a raw location token
#[must_use]
pub fn classify(token: &str) -> LocationKind {
    let token = token.trim();

    if let Some(outpost) = outposts::find(token) {
        return LocationKind::NamedOutpost {
            name: outpost.name,
            coordinates: outpost.coordinates(),
        };
    }

    if is_icao_code(token) {
        return LocationKind::IcaoCode(token.to_ascii_uppercase());
    }

    if token.len() == 5 && token.chars().all(|c| c.is_ascii_digit()) {
        return LocationKind::PostalCode {
            code: token.to_string(),
            shape: PostalShape::Ambiguous5Digit,
            country: None,
        };
    }

    if let Some(code) = canada::normalize_postal_code(token) {
        return LocationKind::PostalCode {
            code,
            shape: PostalShape::Canada,
            country: Some("ca".to_string()),
        };
    }

    LocationKind::PostalCode {
        code: token.to_string(),
        shape: PostalShape::International,
        country: None,
    }
}

fn is_icao_code(token: &str) -> bool {
    token.len() == 4
        && token.chars().all(|c| c.is_ascii_alphabetic())
        && token
            .chars()
            .next()
            .is_some_and(|c| !NON_ICAO_PREFIXES.contains(&c.to_ascii_uppercase()))
}
