//! Campus records loaded from the source CSV.

use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A school campus entrance point (WGS84 degrees)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campus {
    /// Human-readable campus name, used for selection and file names
    pub label: String,
    pub lon: f64,
    pub lat: f64,
}

impl Campus {
    pub fn new(label: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            label: label.into(),
            lon,
            lat,
        }
    }

    /// Entrance point as a geo point (x = lon, y = lat)
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Read-only table of campuses in source order.
///
/// Duplicate labels are kept so that selection can report them as ambiguous
/// instead of silently picking one.
#[derive(Debug, Clone, Default)]
pub struct CampusTable {
    campuses: Vec<Campus>,
}

impl CampusTable {
    pub fn new(campuses: Vec<Campus>) -> Self {
        Self { campuses }
    }

    pub fn len(&self) -> usize {
        self.campuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campuses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Campus> {
        self.campuses.iter()
    }

    /// All campuses whose label equals `label` exactly
    pub fn matching<'a, 'b>(&'a self, label: &'b str) -> impl Iterator<Item = &'a Campus> + 'b
    where
        'a: 'b,
    {
        self.campuses.iter().filter(move |c| c.label == label)
    }

    /// Sorted, de-duplicated labels for the campus selector
    pub fn labels(&self) -> Vec<&str> {
        self.campuses
            .iter()
            .map(|c| c.label.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Labels that occur on more than one row, sorted
    pub fn duplicate_labels(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for campus in &self.campuses {
            *counts.entry(campus.label.as_str()).or_default() += 1;
        }
        let mut dups: Vec<&str> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(label, _)| label)
            .collect();
        dups.sort_unstable();
        dups
    }
}

impl FromIterator<Campus> for CampusTable {
    fn from_iter<I: IntoIterator<Item = Campus>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CampusTable {
        vec![
            Campus::new("Roosevelt High School", -118.2, 34.04),
            Campus::new("Belmont High School", -118.26, 34.06),
            Campus::new("Roosevelt High School", -118.3, 34.1),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_labels_sorted_and_deduplicated() {
        let t = table();
        assert_eq!(t.len(), 3);
        assert_eq!(
            t.labels(),
            vec!["Belmont High School", "Roosevelt High School"]
        );
    }

    #[test]
    fn test_duplicate_labels() {
        let t = table();
        assert_eq!(t.duplicate_labels(), vec!["Roosevelt High School"]);
        assert_eq!(t.matching("Roosevelt High School").count(), 2);
    }

    #[test]
    fn test_point_is_lon_lat() {
        let c = Campus::new("X", -118.25, 34.05);
        assert_eq!(c.point().x(), -118.25);
        assert_eq!(c.point().y(), 34.05);
    }
}
