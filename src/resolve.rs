//! Campus selection by label.

use tracing::debug;

use crate::error::{MapError, Result};
use crate::models::{Campus, CampusTable};

/// Outcome of looking up a label in the campus table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    Found(&'a Campus),
    NotFound,
    /// More than one row carries the label
    Ambiguous { count: usize },
}

impl<'a> Resolution<'a> {
    pub fn into_result(self, label: &str) -> Result<&'a Campus> {
        match self {
            Resolution::Found(campus) => Ok(campus),
            Resolution::NotFound => Err(MapError::NotFound(label.to_string())),
            Resolution::Ambiguous { count } => Err(MapError::Ambiguous {
                label: label.to_string(),
                count,
            }),
        }
    }
}

/// Look up exactly one campus by label (trimmed, case-sensitive)
pub fn resolve<'a>(table: &'a CampusTable, label: &str) -> Resolution<'a> {
    let label = label.trim();
    let mut matches = table.matching(label);

    let resolution = match (matches.next(), matches.next()) {
        (None, _) => Resolution::NotFound,
        (Some(campus), None) => Resolution::Found(campus),
        (Some(_), Some(_)) => Resolution::Ambiguous {
            count: 2 + matches.count(),
        },
    };

    debug!("Resolved campus '{}': {:?}", label, resolution);
    resolution
}

/// Shorthand for `resolve(..).into_result(..)`
pub fn resolve_one<'a>(table: &'a CampusTable, label: &str) -> Result<&'a Campus> {
    resolve(table, label).into_result(label.trim())
}
