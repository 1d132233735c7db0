//! Condition text → sound asset ids
//!
//! The mapping is heuristic, so it is expressed as an ordered list of
//! strategies. The first strategy that selects anything wins.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Assets tried, in order, when nothing in the condition text matches
pub const DEFAULT_ASSETS: [&str; 3] = ["clear", "sunny", "fair"];

/// Shortest token or asset id considered for substring matching
const MIN_SUBSTRING_LEN: usize = 3;

/// Available sound assets, identified by lower-cased file stem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundAssets {
    ids: BTreeSet<String>,
}

impl SoundAssets {
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Index the files in an asset directory.
    ///
    /// A missing or unreadable directory yields an empty set; announcements
    /// then carry the temperature only.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Sound asset directory {} unavailable: {}", dir.display(), e);
                return Self::default();
            }
        };

        let assets = Self::from_names(entries.filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() {
                return None;
            }
            path.file_stem()?.to_str().map(str::to_string)
        }));
        debug!("Indexed {} sound assets in {}", assets.len(), dir.display());
        assets
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One way of picking assets for a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Tokens that are asset ids, in token order
    Exact,
    /// Per token, the first asset containing it or contained in it; both
    /// must be at least `MIN_SUBSTRING_LEN` long
    Substring,
    /// The first of a fixed list that exists
    Default(&'static [&'static str]),
}

/// Strategies in the order they are tried
pub const STRATEGIES: [MatchStrategy; 3] = [
    MatchStrategy::Exact,
    MatchStrategy::Substring,
    MatchStrategy::Default(&DEFAULT_ASSETS),
];

impl MatchStrategy {
    #[must_use]
    pub fn select(&self, tokens: &[String], assets: &SoundAssets) -> Vec<String> {
        match self {
            MatchStrategy::Exact => dedup(
                tokens
                    .iter()
                    .filter(|token| assets.contains(token))
                    .cloned(),
            ),
            MatchStrategy::Substring => dedup(
                tokens
                    .iter()
                    .filter(|token| token.len() >= MIN_SUBSTRING_LEN)
                    .filter_map(|token| {
                        assets
                            .iter()
                            .filter(|id| id.len() >= MIN_SUBSTRING_LEN)
                            .find(|id| id.contains(token.as_str()) || token.contains(id))
                            .map(str::to_string)
                    }),
            ),
            MatchStrategy::Default(candidates) => candidates
                .iter()
                .find(|id| assets.contains(id))
                .map(|id| vec![(*id).to_string()])
                .unwrap_or_default(),
        }
    }
}

fn dedup(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    for id in ids {
        if !selected.contains(&id) {
            selected.push(id);
        }
    }
    selected
}

/// Asset ids for a condition phrase; empty when nothing applies
#[must_use]
pub fn condition_assets(condition: &str, assets: &SoundAssets) -> Vec<String> {
    let tokens: Vec<String> = condition
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    for strategy in &STRATEGIES {
        let selected = strategy.select(&tokens, assets);
        if !selected.is_empty() {
            debug!("Condition '{}' matched {:?} via {:?}", condition, selected, strategy);
            return selected;
        }
    }

    debug!("No sound asset for condition '{}'", condition);
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_exact_keeps_token_order() {
        let assets = SoundAssets::from_names(["cloudy", "partly", "rain"]);
        assert_eq!(
            condition_assets("Partly Cloudy", &assets),
            ids(&["partly", "cloudy"])
        );
    }

    #[test]
    fn test_light_rain_selects_rain() {
        let assets = SoundAssets::from_names(["rain", "clear"]);
        assert_eq!(condition_assets("Light Rain", &assets), ids(&["rain"]));
    }

    #[test]
    fn test_substring_when_no_exact_match() {
        let assets = SoundAssets::from_names(["rainy", "clear", "cloud"]);
        assert_eq!(
            MatchStrategy::Exact.select(&ids(&["light", "rain"]), &assets),
            Vec::<String>::new()
        );
        assert_eq!(condition_assets("Light Rain", &assets), ids(&["rainy"]));
        assert_eq!(condition_assets("Mostly Cloudy", &assets), ids(&["cloud"]));
    }

    #[test]
    fn test_short_tokens_do_not_substring_match() {
        let assets = SoundAssets::from_names(["thunderstorm"]);
        assert!(
            MatchStrategy::Substring
                .select(&ids(&["with", "st"]), &assets)
                .is_empty()
        );
    }

    #[test]
    fn test_short_asset_ids_do_not_substring_match() {
        let assets = SoundAssets::from_names(["a", "in", "fog"]);
        assert!(
            MatchStrategy::Substring
                .select(&ids(&["rain", "drizzle"]), &assets)
                .is_empty()
        );
        assert!(condition_assets("Freezing Drizzle", &assets).is_empty());
        assert_eq!(condition_assets("Foggy", &assets), ids(&["fog"]));
    }

    #[test]
    fn test_default_chain_order() {
        let assets = SoundAssets::from_names(["fair", "sunny"]);
        assert_eq!(condition_assets("Zephyr Breeze", &assets), ids(&["sunny"]));
    }

    #[test]
    fn test_nothing_matches_skips_condition() {
        let assets = SoundAssets::from_names(["rain", "snow"]);
        assert!(condition_assets("Zephyr Breeze", &assets).is_empty());
        assert!(condition_assets("Clear", &SoundAssets::default()).is_empty());
    }

    #[test]
    fn test_duplicate_tokens_select_once() {
        let assets = SoundAssets::from_names(["snow"]);
        assert_eq!(condition_assets("Snow Snow", &assets), ids(&["snow"]));
    }

    #[test]
    fn test_from_dir_uses_file_stems() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Rain.ulaw", "clear.gsm", "snow"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();

        let assets = SoundAssets::from_dir(dir.path());
        assert_eq!(assets.iter().collect::<Vec<_>>(), vec!["clear", "rain", "snow"]);
    }

    #[test]
    fn test_from_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SoundAssets::from_dir(&dir.path().join("missing")).is_empty());
    }
}
