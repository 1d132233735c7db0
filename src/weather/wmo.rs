//! WMO weather interpretation codes used by the gridded forecast provider

/// Convert a WMO weather code to the condition phrase used for announcements
#[must_use]
pub fn weather_code_to_condition(code: u8) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Foggy",
        51 => "Light Drizzle",
        53 => "Drizzle",
        55 => "Heavy Drizzle",
        56 => "Light Freezing Drizzle",
        57 => "Heavy Freezing Drizzle",
        61 => "Light Rain",
        63 => "Rain",
        65 => "Heavy Rain",
        66 => "Light Freezing Rain",
        67 => "Heavy Freezing Rain",
        71 => "Light Snow",
        73 => "Snow",
        75 => "Heavy Snow",
        77 => "Snow Grains",
        80 => "Light Showers",
        81 => "Showers",
        82 => "Heavy Showers",
        85 => "Light Snow Showers",
        86 => "Heavy Snow Showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm With Hail",
        99 => "Thunderstorm With Heavy Hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "Clear")]
    #[case(1, "Mainly Clear")]
    #[case(2, "Partly Cloudy")]
    #[case(3, "Overcast")]
    #[case(45, "Foggy")]
    #[case(48, "Foggy")]
    #[case(57, "Heavy Freezing Drizzle")]
    #[case(63, "Rain")]
    #[case(77, "Snow Grains")]
    #[case(86, "Heavy Snow Showers")]
    #[case(99, "Thunderstorm With Heavy Hail")]
    fn test_known_codes(#[case] code: u8, #[case] expected: &str) {
        assert_eq!(weather_code_to_condition(code), expected);
    }

    #[rstest]
    #[case(4)]
    #[case(50)]
    #[case(98)]
    #[case(255)]
    fn test_unknown_codes(#[case] code: u8) {
        assert_eq!(weather_code_to_condition(code), "Unknown");
    }
}
