//! Dataset registry: every dataset definition embedded at compile time.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the
//! binary via [`include_str!`].

use crate::dataset_def::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    (
        "chicago_recent",
        include_str!("../datasets/chicago_recent.toml"),
    ),
    (
        "chicago_historical",
        include_str!("../datasets/chicago_historical.toml"),
    ),
];

/// Returns all embedded dataset definitions.
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed. The configs ship with
/// the binary, so this is covered by the registry tests.
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up an embedded dataset by id.
#[must_use]
pub fn find_dataset(id: &str) -> Option<DatasetDefinition> {
    all_datasets().into_iter().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_datasets() {
        let datasets = all_datasets();
        assert_eq!(datasets.len(), DATASET_TOMLS.len());
    }

    #[test]
    fn file_names_match_ids() {
        for (name, _) in DATASET_TOMLS {
            let def = find_dataset(name).unwrap_or_else(|| panic!("{name} not found"));
            assert_eq!(&def.id, name);
        }
    }

    #[test]
    fn unknown_dataset_is_none() {
        assert!(find_dataset("atlantis").is_none());
    }
}
