//! Validation of Consent Management Platform IDs.
//!
//! The IAB publishes the registry of approved CMPs as a JSON document.
//! [`CmpList`] holds the IDs of that registry once a document has been
//! loaded and answers whether a given CMP ID is registered. Fetching the
//! document is left to the caller.

use fnv::FnvHashMap;
use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;

/// The error type for failures to load a CMP list document.
#[derive(Error, Debug)]
pub enum CmpLoadError {
    /// The document is not valid JSON or does not have the CMP list shape.
    #[error("unable to parse CMP list document")]
    Parse(#[from] serde_json::Error),
}

/// One CMP record of the IAB CMP list document.
///
/// Fields absent from the document default to their zero value.
#[derive(Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Cmp {
    pub id: u16,
    pub name: String,
    pub is_commercial: bool,
    pub environments: Vec<String>,
}

#[derive(Deserialize)]
struct CmpListDocument {
    #[serde(default)]
    cmps: FnvHashMap<String, Cmp>,
}

/// Parses a CMP list document into its records.
///
/// The document keys records by the string form of their ID; only the
/// records are returned, in no particular order.
pub fn parse_cmp_list(json: &str) -> Result<Vec<Cmp>, CmpLoadError> {
    let document: CmpListDocument = serde_json::from_str(json)?;
    Ok(document.cmps.into_values().collect())
}

/// The set of CMP IDs considered valid.
///
/// A freshly created list has no document loaded and treats every ID as
/// invalid. This is distinct from a loaded document that happens to contain
/// no CMPs, even though both answer every membership query with false.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CmpList {
    ids: Option<BTreeSet<u16>>,
}

impl CmpList {
    /// Creates a list with no document loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loaded list straight from a set of IDs.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        Self {
            ids: Some(ids.into_iter().collect()),
        }
    }

    /// Replaces the IDs of this list with those of a CMP list document.
    ///
    /// On error the previously loaded IDs are kept.
    pub fn load_json(&mut self, json: &str) -> Result<(), CmpLoadError> {
        let cmps = parse_cmp_list(json)?;
        self.ids = Some(cmps.iter().map(|cmp| cmp.id).collect());
        Ok(())
    }

    /// Whether a document has been loaded into this list.
    pub fn is_loaded(&self) -> bool {
        self.ids.is_some()
    }

    /// Whether the given CMP ID is registered. Always false until a
    /// document has been loaded.
    pub fn contains(&self, cmp_id: u16) -> bool {
        self.ids
            .as_ref()
            .map(|ids| ids.contains(&cmp_id))
            .unwrap_or(false)
    }

    /// The loaded IDs, or `None` when no document has been loaded.
    pub fn ids(&self) -> Option<&BTreeSet<u16>> {
        self.ids.as_ref()
    }
}
