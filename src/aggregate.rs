//! Type-aware merging of inheritable properties across an ancestor chain.
//!
//! Merging is driven by a small tagged union, [`Mergeable`], with one
//! merge rule per tag: text concatenates, lists concatenate, maps
//! shallow-merge with later contributors overriding earlier keys. An
//! empty contributor list yields `None` so callers can tell "nothing
//! contributed" from "contributed emptiness".

use std::collections::BTreeMap;

use crate::data::types::{ContentItem, ItemId};

// ============================================================================
// Mergeable Values
// ============================================================================

/// One contributor's value for an inheritable property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mergeable {
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl Mergeable {
    /// Merge `other` into `self` in contributor order.
    ///
    /// Contributors of a mismatched shape are ignored; the accumulated
    /// shape wins (the first contributor fixes it).
    pub fn merge(self, other: Mergeable) -> Mergeable {
        match (self, other) {
            (Mergeable::Text(a), Mergeable::Text(b)) => Mergeable::Text(a + &b),
            (Mergeable::List(mut a), Mergeable::List(b)) => {
                a.extend(b);
                Mergeable::List(a)
            }
            (Mergeable::Map(mut a), Mergeable::Map(b)) => {
                a.extend(b);
                Mergeable::Map(a)
            }
            (first, _) => first,
        }
    }

    /// Unwrap a text value; empty string for other shapes.
    pub fn into_text(self) -> String {
        match self {
            Mergeable::Text(text) => text,
            _ => String::new(),
        }
    }

    /// Unwrap a map value; empty map for other shapes.
    pub fn into_map(self) -> BTreeMap<String, String> {
        match self {
            Mergeable::Map(map) => map,
            _ => BTreeMap::new(),
        }
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Merge one property across `contributors` in order.
///
/// `select` extracts a contributor's value; returning `None` skips that
/// contributor. Yields `None` when no contributor produced a value.
pub fn aggregate<'a, F>(
    contributors: &[ItemId],
    lookup: &BTreeMap<&str, &'a ContentItem>,
    select: F,
) -> Option<Mergeable>
where
    F: Fn(&'a ContentItem) -> Option<Mergeable>,
{
    let mut merged: Option<Mergeable> = None;
    for id in contributors {
        let Some(&item) = lookup.get(id.as_str()) else {
            continue;
        };
        let Some(value) = select(item) else {
            continue;
        };
        merged = Some(match merged {
            Some(acc) => acc.merge(value),
            None => value,
        });
    }
    merged
}

/// A contributor's `vars` map with its `exclusive_vars` stripped.
///
/// Exclusion is applied per contributor, before merging: a name an
/// ancestor marks exclusive never reaches descendants from *that*
/// ancestor, while the same name from other contributors survives.
pub fn inheritable_vars(item: &ContentItem) -> Option<Mergeable> {
    if item.vars.is_empty() {
        return None;
    }
    let mut vars = item.vars.clone();
    for name in &item.exclusive_vars {
        vars.remove(name);
    }
    Some(Mergeable::Map(vars))
}

/// A non-empty HTML fragment as a text contribution.
pub fn fragment(value: &str) -> Option<Mergeable> {
    if value.is_empty() {
        None
    } else {
        Some(Mergeable::Text(value.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
