//! Field-name validation shared by every name collection in a [`super::DimensionsSpec`].

use std::collections::{BTreeSet, HashSet};

use crate::error::{SchemaError, SchemaResult};

/// Validate one collection of field names.
///
/// Fails if any name is empty (or only whitespace) or if a name appears more than once.
/// Duplicates are detected case-insensitively, so `"Page"` and `"page"` collide.
/// `collection` only labels the error message.
pub fn validate_fields<I, S>(collection: &str, names: I) -> SchemaResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates: BTreeSet<String> = BTreeSet::new();

    for (idx, name) in names.into_iter().enumerate() {
        let name = name.as_ref();
        if name.trim().is_empty() {
            return Err(SchemaError::InvalidFieldName {
                message: format!("{collection} entry {idx} has an empty name"),
            });
        }
        let key = name.to_lowercase();
        if !seen.insert(key.clone()) {
            duplicates.insert(key);
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::InvalidFieldName {
            message: format!(
                "duplicate {collection} entries found: [{}]",
                duplicates.into_iter().collect::<Vec<_>>().join(", ")
            ),
        })
    }
}
