//! Static language & contributor-pair catalogue: `languages`,
//! `conversations_by_language`, and `contributor_pairs_by_language`,
//! loaded once from an embedded JSON document rather than a config file,
//! since the set of recognized languages and pairs is fixed at build time.

use std::collections::HashMap;

use recspec_types::{RecspecError, RecspecResult};
use serde::Deserialize;

const CATALOGUE_JSON: &str = include_str!("catalogue.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Language {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawCatalogue {
    languages: Vec<Language>,
    conversations_by_language: HashMap<String, Vec<String>>,
    contributor_pairs_by_language: HashMap<String, Vec<(u64, u64)>>,
}

/// Read-only, host-shareable language/contributor-pair catalogue.
#[derive(Debug, Clone)]
pub struct Catalogue {
    languages: HashMap<String, Language>,
    conversations_by_language: HashMap<String, Vec<String>>,
    contributor_pairs_by_language: HashMap<String, Vec<(u64, u64)>>,
}

impl Catalogue {
    /// Parses the embedded catalogue document once.
    pub fn embedded() -> Self {
        let raw: RawCatalogue =
            serde_json::from_str(CATALOGUE_JSON).expect("embedded catalogue.json is valid");
        let languages = raw
            .languages
            .into_iter()
            .map(|l| (l.code.clone(), l))
            .collect();
        Self {
            languages,
            conversations_by_language: raw.conversations_by_language,
            contributor_pairs_by_language: raw.contributor_pairs_by_language,
        }
    }

    /// Builds a catalogue from host-supplied JSON matching the §6 shape,
    /// for hosts that maintain their own contributor rosters.
    pub fn from_json(json: &str) -> RecspecResult<Self> {
        let raw: RawCatalogue = serde_json::from_str(json).map_err(|e| RecspecError::CatalogueMiss {
            reason: format!("malformed catalogue JSON: {e}"),
        })?;
        let languages = raw
            .languages
            .into_iter()
            .map(|l| (l.code.clone(), l))
            .collect();
        Ok(Self {
            languages,
            conversations_by_language: raw.conversations_by_language,
            contributor_pairs_by_language: raw.contributor_pairs_by_language,
        })
    }

    pub fn is_known_language(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    pub fn language(&self, code: &str) -> Option<&Language> {
        self.languages.get(code)
    }

    pub fn conversations(&self, code: &str) -> Option<&[String]> {
        self.conversations_by_language.get(code).map(|v| v.as_slice())
    }

    /// `true` iff `{user_id, agent_id}` is an allowed pair for `lang`,
    /// treated as unordered so either contributor may be recorded as the
    /// "user" and the other as the "agent".
    pub fn has_contributor_pair(&self, lang: &str, user_id: u64, agent_id: u64) -> bool {
        self.contributor_pairs_by_language
            .get(lang)
            .map(|pairs| {
                pairs
                    .iter()
                    .any(|&(a, b)| (a, b) == (user_id, agent_id) || (a, b) == (agent_id, user_id))
            })
            .unwrap_or(false)
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalogue_parses() {
        let cat = Catalogue::embedded();
        assert!(cat.is_known_language("en_us"));
        assert!(!cat.is_known_language("xx_yy"));
    }

    #[test]
    fn contributor_pair_is_swap_invariant() {
        let cat = Catalogue::embedded();
        assert!(cat.has_contributor_pair("en_us", 4394, 14981));
        assert!(cat.has_contributor_pair("en_us", 14981, 4394));
        assert!(!cat.has_contributor_pair("en_us", 1, 2));
    }
}
