use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::{CountryResolver, normalize_name};
use crate::error::{PipelineError, Result};

const EMBEDDED_TABLE: &str = include_str!("../../data/country_codes.csv");

#[derive(Debug, Deserialize)]
struct RegistryRow {
    code: u32,
    name: String,
    /// `|`-separated alternative spellings.
    #[serde(default)]
    aliases: String,
}

/// CSV-backed country registry keyed by Polity IV `ccode` values.
///
/// Polity numbering mostly follows Correlates of War but diverges for
/// successor states, e.g. Serbia 342, Yugoslavia 345, Serbia and
/// Montenegro 347, Montenegro 348.
///
/// Stored as a CSV table on disk:
/// ```text
/// code,name,aliases
/// 2,United States of America,United States|USA|US
/// 310,Hungary,
/// ```
#[derive(Debug, Clone, Default)]
pub struct CountryRegistry {
    names: HashMap<u32, String>,
    keys: HashMap<String, u32>,
}

impl CountryRegistry {
    /// The table shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_reader(EMBEDDED_TABLE.as_bytes())
    }

    /// Loads a registry from a CSV file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let registry = Self::from_reader(File::open(path)?)?;
        info!(path = %path.display(), countries = registry.len(), "Country registry loaded");
        Ok(registry)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut registry = Self::default();

        for result in rdr.deserialize() {
            let row: RegistryRow = result
                .map_err(|e| PipelineError::Parse(format!("country registry: {e}")))?;

            let spellings = std::iter::once(row.name.as_str())
                .chain(row.aliases.split('|'))
                .map(normalize_name)
                .filter(|k| !k.is_empty());

            for key in spellings {
                let existing = *registry.keys.entry(key.clone()).or_insert(row.code);
                if existing != row.code {
                    debug!(key = %key, kept = existing, ignored = row.code, "Duplicate registry key");
                }
            }
            registry.names.entry(row.code).or_insert(row.name);
        }

        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Longest registry key occurring as whole words inside `key`; `None` on a tie between codes.
    fn contained_match(&self, key: &str) -> Option<u32> {
        let padded = format!(" {key} ");
        let mut best: Option<(usize, u32)> = None;
        let mut ambiguous = false;

        for (candidate, &code) in &self.keys {
            if !padded.contains(&format!(" {candidate} ")) {
                continue;
            }
            match best {
                Some((len, _)) if candidate.len() < len => {}
                Some((len, best_code)) if candidate.len() == len => {
                    if best_code != code {
                        ambiguous = true;
                    }
                }
                _ => {
                    best = Some((candidate.len(), code));
                    ambiguous = false;
                }
            }
        }

        if ambiguous {
            None
        } else {
            best.map(|(_, code)| code)
        }
    }
}

impl CountryResolver for CountryRegistry {
    fn name_to_code(&self, name: &str) -> Option<u32> {
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        self.keys
            .get(&key)
            .copied()
            .or_else(|| self.contained_match(&key))
    }

    fn code_to_name(&self, code: u32) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CountryRegistry {
        CountryRegistry::from_reader(
            "code,name,aliases\n2,United States of America,USA|United States\n310,Hungary,\n1,Alpha,\n9,Omega,\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_and_alias_lookup() {
        let registry = small();
        assert_eq!(registry.name_to_code("Hungary"), Some(310));
        assert_eq!(registry.name_to_code("USA"), Some(2));
        assert_eq!(registry.name_to_code("the United States"), Some(2));
        assert_eq!(registry.code_to_name(2), Some("United States of America"));
        assert_eq!(registry.code_to_name(3), None);
    }

    #[test]
    fn test_contained_match() {
        let registry = small();
        assert_eq!(registry.name_to_code("Republic of Hungary"), Some(310));
        assert_eq!(registry.name_to_code("Hungary[12]"), Some(310));
    }

    #[test]
    fn test_ambiguous_or_unknown_is_none() {
        let registry = small();
        assert_eq!(registry.name_to_code("Alpha Omega"), None);
        assert_eq!(registry.name_to_code("Atlantis"), None);
        assert_eq!(registry.name_to_code("   "), None);
    }

    #[test]
    fn test_missing_aliases_column() {
        let registry = CountryRegistry::from_reader("code,name\n290,Poland\n".as_bytes()).unwrap();
        assert_eq!(registry.name_to_code("poland"), Some(290));
    }

    #[test]
    fn test_bad_row_is_parse_error() {
        let err = CountryRegistry::from_reader("code,name,aliases\nabc,Nowhere,\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_embedded_table_covers_nato() {
        let registry = CountryRegistry::embedded().unwrap();
        for (name, code) in [
            ("United States", 2),
            ("Canada", 20),
            ("United Kingdom", 200),
            ("Czech Republic", 316),
            ("Czechia", 316),
            ("North Macedonia", 343),
            ("Turkey", 640),
            ("Türkiye", 640),
            ("Germany", 255),
            ("Hungary", 310),
            ("Poland", 290),
            ("Montenegro", 348),
        ] {
            assert_eq!(registry.name_to_code(name), Some(code), "{name}");
        }
    }

    #[test]
    fn test_embedded_table_uses_polity_successor_codes() {
        let registry = CountryRegistry::embedded().unwrap();
        for (name, code) in [
            ("Kosovo", 341),
            ("Serbia", 342),
            ("Yugoslavia", 345),
            ("Serbia and Montenegro", 347),
            ("Montenegro[c]", 348),
            ("Vietnam", 818),
        ] {
            assert_eq!(registry.name_to_code(name), Some(code), "{name}");
        }
        assert_eq!(registry.code_to_name(341), Some("Kosovo"));
        assert_eq!(registry.code_to_name(348), Some("Montenegro"));
    }
}
