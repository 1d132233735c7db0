//! Canadian postal code helpers and proxy-city tables
//!
//! Geocoders often miss full Canadian postal codes. When that happens the
//! forward sortation area (first three characters) or, failing that, the
//! leading letter picks a nearby city to geocode instead.

/// FSA → proxy city
const FSA_CITIES: &[(&str, &str)] = &[
    ("A1A", "St. John's, NL"),
    ("A1C", "St. John's, NL"),
    ("A2H", "Corner Brook, NL"),
    ("B1P", "Sydney, NS"),
    ("B3H", "Halifax, NS"),
    ("B3J", "Halifax, NS"),
    ("C1A", "Charlottetown, PE"),
    ("E1C", "Moncton, NB"),
    ("E2L", "Saint John, NB"),
    ("E3B", "Fredericton, NB"),
    ("G1R", "Quebec City, QC"),
    ("G7H", "Saguenay, QC"),
    ("H2X", "Montreal, QC"),
    ("H3B", "Montreal, QC"),
    ("J1H", "Sherbrooke, QC"),
    ("J8Y", "Gatineau, QC"),
    ("K1A", "Ottawa, ON"),
    ("K1P", "Ottawa, ON"),
    ("K7L", "Kingston, ON"),
    ("L5B", "Mississauga, ON"),
    ("L8P", "Hamilton, ON"),
    ("M5H", "Toronto, ON"),
    ("M5V", "Toronto, ON"),
    ("N2L", "Waterloo, ON"),
    ("N6A", "London, ON"),
    ("N9A", "Windsor, ON"),
    ("P3E", "Sudbury, ON"),
    ("P7B", "Thunder Bay, ON"),
    ("R3C", "Winnipeg, MB"),
    ("R7A", "Brandon, MB"),
    ("S4P", "Regina, SK"),
    ("S7K", "Saskatoon, SK"),
    ("T2P", "Calgary, AB"),
    ("T5J", "Edmonton, AB"),
    ("T1J", "Lethbridge, AB"),
    ("V6B", "Vancouver, BC"),
    ("V8W", "Victoria, BC"),
    ("V1Y", "Kelowna, BC"),
    ("V2L", "Prince George, BC"),
    ("X0A", "Iqaluit, NU"),
    ("X1A", "Yellowknife, NT"),
    ("Y1A", "Whitehorse, YT"),
];

/// Leading letter → proxy city
const LETTER_CITIES: &[(char, &str)] = &[
    ('A', "St. John's, NL"),
    ('B', "Halifax, NS"),
    ('C', "Charlottetown, PE"),
    ('E', "Fredericton, NB"),
    ('G', "Quebec City, QC"),
    ('H', "Montreal, QC"),
    ('J', "Sherbrooke, QC"),
    ('K', "Ottawa, ON"),
    ('L', "Mississauga, ON"),
    ('M', "Toronto, ON"),
    ('N', "London, ON"),
    ('P', "Sudbury, ON"),
    ('R', "Winnipeg, MB"),
    ('S', "Regina, SK"),
    ('T', "Calgary, AB"),
    ('V', "Vancouver, BC"),
    ('X', "Yellowknife, NT"),
    ('Y', "Whitehorse, YT"),
];

/// Parse `A9A9A9` / `A9A 9A9` (any case, surrounding whitespace ignored) into
/// the canonical `A9A 9A9` form.
#[must_use]
pub fn normalize_postal_code(token: &str) -> Option<String> {
    let token = token.trim();
    let compact: Vec<char> = match token.len() {
        6 => token.chars().collect(),
        7 if token.as_bytes()[3] == b' ' => token.chars().filter(|c| *c != ' ').collect(),
        _ => return None,
    };
    if compact.len() != 6 {
        return None;
    }

    let shape_ok = compact.iter().enumerate().all(|(i, c)| {
        if i % 2 == 0 {
            c.is_ascii_alphabetic()
        } else {
            c.is_ascii_digit()
        }
    });
    if !shape_ok {
        return None;
    }

    let upper: String = compact.iter().map(char::to_ascii_uppercase).collect();
    Some(format!("{} {}", &upper[..3], &upper[3..]))
}

/// Proxy city for the forward sortation area of a normalized code
#[must_use]
pub fn fsa_city(postal_code: &str) -> Option<&'static str> {
    let fsa = postal_code.get(..3)?;
    FSA_CITIES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(fsa))
        .map(|(_, city)| *city)
}

/// Proxy city for the leading letter of a normalized code
#[must_use]
pub fn letter_city(postal_code: &str) -> Option<&'static str> {
    let letter = postal_code.chars().next()?.to_ascii_uppercase();
    LETTER_CITIES
        .iter()
        .find(|(key, _)| *key == letter)
        .map(|(_, city)| *city)
}

/// Proxy cities to try, most specific first, without duplicates
#[must_use]
pub fn proxy_cities(postal_code: &str) -> Vec<&'static str> {
    let mut cities = Vec::with_capacity(2);
    if let Some(city) = fsa_city(postal_code) {
        cities.push(city);
    }
    if let Some(city) = letter_city(postal_code) {
        if !cities.contains(&city) {
            cities.push(city);
        }
    }
    cities
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("K1A 0B1", Some("K1A 0B1"))]
    #[case("k1a0b1", Some("K1A 0B1"))]
    #[case(" m5v 3l9 ", Some("M5V 3L9"))]
    #[case("K1A  0B1", None)]
    #[case("K1A-0B1", None)]
    #[case("12345", None)]
    #[case("KA1 0B1", None)]
    fn test_normalize_postal_code(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_postal_code(input).as_deref(), expected);
    }

    #[test]
    fn test_fsa_before_letter() {
        assert_eq!(proxy_cities("K7L 3N6"), vec!["Kingston, ON", "Ottawa, ON"]);
        // FSA and letter agree: no duplicate lookup
        assert_eq!(proxy_cities("K1A 0B1"), vec!["Ottawa, ON"]);
        // Unknown FSA: letter only
        assert_eq!(proxy_cities("K9Z 9Z9"), vec!["Ottawa, ON"]);
    }

    #[test]
    fn test_unknown_letter() {
        assert!(letter_city("D1A 1A1").is_none());
        assert!(proxy_cities("D1A 1A1").is_empty());
    }

    #[test]
    fn test_fsa_keys_are_well_formed() {
        for (fsa, _) in FSA_CITIES {
            assert_eq!(fsa.len(), 3);
            let letter = fsa.chars().next().unwrap();
            assert!(letter_city(fsa).is_some(), "no letter entry for {letter}");
        }
    }
}
