//! Named outposts: research stations and DXpedition islands addressed by name
//!
//! These never go through the geocoder.

use crate::models::Coordinates;

/// A fixed remote location
#[derive(Debug, Clone, Copy)]
pub struct Outpost {
    /// Lookup key, lower-case
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl Outpost {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

const fn outpost(name: &'static str, latitude: f64, longitude: f64) -> Outpost {
    Outpost {
        name,
        latitude,
        longitude,
    }
}

pub const OUTPOSTS: &[Outpost] = &[
    // Antarctic stations
    outpost("mcmurdo", -77.8463, 166.6762),
    outpost("southpole", -89.9978, 139.2729),
    outpost("palmer", -64.7742, -64.0527),
    outpost("vostok", -78.4645, 106.8373),
    outpost("concordia", -75.1000, 123.3333),
    outpost("rothera", -67.5679, -68.1274),
    outpost("halley", -75.5810, -26.6600),
    outpost("davis", -68.5766, 77.9674),
    outpost("casey", -66.2821, 110.5276),
    outpost("mawson", -67.6026, 62.8738),
    outpost("scottbase", -77.8494, 166.7681),
    // Arctic stations
    outpost("alert", 82.5018, -62.3481),
    outpost("eureka", 79.9889, -85.9408),
    outpost("nyalesund", 78.9236, 11.9300),
    outpost("summitcamp", 72.5796, -38.4592),
    // DXpedition islands
    outpost("bouvet", -54.4208, 3.3464),
    outpost("heard", -53.1000, 73.5167),
    outpost("peter1", -68.8500, -90.5833),
    outpost("kerguelen", -49.3500, 70.2167),
    outpost("crozet", -46.4333, 51.8667),
    outpost("tristan", -37.0667, -12.3167),
    outpost("pitcairn", -25.0667, -130.1000),
    outpost("clipperton", 10.3000, -109.2167),
    outpost("janmayen", 70.9833, -8.5000),
    outpost("macquarie", -54.5000, 158.9500),
    outpost("southgeorgia", -54.2833, -36.5000),
    outpost("southsandwich", -57.7833, -26.4500),
    outpost("navassa", 18.4000, -75.0167),
    outpost("bakerisland", 0.1936, -176.4769),
    outpost("kure", 28.3925, -178.2936),
];

/// Case-insensitive exact lookup
#[must_use]
pub fn find(token: &str) -> Option<&'static Outpost> {
    let token = token.trim();
    OUTPOSTS.iter().find(|o| o.name.eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let outpost = find("McMurdo").unwrap();
        assert_eq!(outpost.name, "mcmurdo");
        assert!(find("MCMURDO").is_some());
        assert!(find("atlantis").is_none());
    }

    #[test]
    fn test_table_is_sane() {
        for outpost in OUTPOSTS {
            assert!(outpost.coordinates().is_valid(), "{}", outpost.name);
            assert_eq!(outpost.name, outpost.name.to_ascii_lowercase());
            assert_eq!(
                OUTPOSTS.iter().filter(|o| o.name == outpost.name).count(),
                1,
                "duplicate outpost {}",
                outpost.name
            );
        }
    }
}
