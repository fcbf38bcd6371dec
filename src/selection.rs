/*!
 * Parsing and resolution of video ID selections.
 *
 * A selection is either the literal `all` or a comma-separated list of
 * numbers and inclusive `start-end` ranges, e.g. `1,4-6,9-10`.
 */

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::catalog::CatalogResponse;
use crate::errors::SelectionError;

// @const: Whole-expression grammar
static SELECTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+|\d+-\d+)(,(\d+|\d+-\d+))*$").expect("selection pattern is valid")
});

/// Literal that requests every video in the catalog
pub const ALL_KEYWORD: &str = "all";

/// Requested video IDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every video up to the highest catalog ID
    All,
    /// An explicit set of IDs
    Ids(BTreeSet<u32>),
}

impl Selection {
    /// Final work set: expand `All` against the catalog, then drop IDs already on disk
    pub fn resolve(&self, catalog: &CatalogResponse, existing: &BTreeSet<u32>) -> BTreeSet<u32> {
        let requested = match self {
            Selection::All => resolve_all(catalog),
            Selection::Ids(ids) => ids.clone(),
        };
        requested.difference(existing).copied().collect()
    }
}

impl FromStr for Selection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse a selection expression
pub fn parse(expression: &str) -> Result<Selection, SelectionError> {
    if expression == ALL_KEYWORD {
        return Ok(Selection::All);
    }

    if !SELECTION_REGEX.is_match(expression) {
        return Err(SelectionError::InvalidFormat(expression.to_string()));
    }

    let mut ids = BTreeSet::new();
    for part in expression.split(',') {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_number(start, expression)?;
                let end = parse_number(end, expression)?;
                if start > end {
                    return Err(SelectionError::InvalidRange(part.to_string()));
                }
                ids.extend(start..=end);
            }
            None => {
                ids.insert(parse_number(part, expression)?);
            }
        }
    }

    Ok(Selection::Ids(ids))
}

// Digits already matched the grammar; only overflow can fail here
fn parse_number(digits: &str, expression: &str) -> Result<u32, SelectionError> {
    digits.parse()
        .map_err(|_| SelectionError::InvalidFormat(expression.to_string()))
}

/// Every ID from 1 up to the highest ID in the catalog
pub fn resolve_all(catalog: &CatalogResponse) -> BTreeSet<u32> {
    let max_id = catalog.max_id();
    info!("Fetching everything up until {}", max_id);
    (1..=max_id).collect()
}
