//! Campus CSV fetching and parsing.

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};
use url::Url;

use crate::error::{MapError, Result};
use crate::models::{Campus, CampusTable};

/// Where the campus CSV lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(Url),
    Local(PathBuf),
}

impl FromStr for SourceLocation {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MapError::InvalidSource(s.to_string()));
        }

        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(SourceLocation::Remote(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(SourceLocation::Local)
                .map_err(|_| MapError::InvalidSource(s.to_string())),
            // Anything else (including Windows drive letters parsed as schemes) is a path
            _ => Ok(SourceLocation::Local(PathBuf::from(s))),
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocation::Remote(url) => write!(f, "{}", url),
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Names of the label / longitude / latitude columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub label: String,
    pub lon: String,
    pub lat: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            label: "LABEL".to_string(),
            lon: "LON".to_string(),
            lat: "LAT".to_string(),
        }
    }
}

/// Fetch or read the campus table from `location`
pub async fn load_campuses(location: &SourceLocation, columns: &ColumnNames) -> Result<CampusTable> {
    info!("Loading campus data from {}", location);

    let table = match location {
        SourceLocation::Remote(url) => {
            let body = fetch_remote(url).await?;
            parse_campuses(body.as_slice(), columns)?
        }
        SourceLocation::Local(path) => {
            let body = read_local(path).await?;
            parse_campuses(body.as_slice(), columns)?
        }
    };

    let duplicates = table.duplicate_labels();
    if !duplicates.is_empty() {
        warn!(
            "{} campus labels appear more than once and cannot be selected: {:?}",
            duplicates.len(),
            duplicates
        );
    }

    info!("Loaded {} campuses", table.len());
    Ok(table)
}

async fn fetch_remote(url: &Url) -> Result<Vec<u8>> {
    let fetch_err = |source| MapError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .user_agent(concat!("impact-zone/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(fetch_err)?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?;

    let bytes = response.bytes().await.map_err(fetch_err)?;
    Ok(bytes.to_vec())
}

async fn read_local(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| MapError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse campus rows from CSV.
///
/// Headers and cells are whitespace-trimmed. A missing column or malformed
/// CSV fails the whole load; rows with an empty label or a blank or bad
/// coordinate are logged and skipped.
pub fn parse_campuses<R: Read>(reader: R, columns: &ColumnNames) -> Result<CampusTable> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| MapError::MissingColumn(name.to_string()))
    };

    let label_idx = position(&columns.label)?;
    let lon_idx = position(&columns.lon)?;
    let lat_idx = position(&columns.lat)?;

    let mut campuses = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Header is line 1
        let row = i + 2;

        let campus = parse_row(
            row,
            record.get(label_idx).unwrap_or(""),
            record.get(lon_idx).unwrap_or(""),
            record.get(lat_idx).unwrap_or(""),
        );
        match campus {
            Ok(campus) => campuses.push(campus),
            Err(e) => {
                warn!("Skipping campus row: {}", e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} unusable campus rows", skipped);
    }

    Ok(CampusTable::new(campuses))
}

fn parse_row(row: usize, label: &str, lon: &str, lat: &str) -> Result<Campus> {
    if label.is_empty() {
        return Err(MapError::InvalidField {
            row,
            field: "label",
            value: String::new(),
        });
    }

    let lon = parse_coordinate(lon, row, "longitude", 180.0)?;
    let lat = parse_coordinate(lat, row, "latitude", 90.0)?;
    Ok(Campus::new(label, lon, lat))
}

fn parse_coordinate(value: &str, row: usize, field: &'static str, limit: f64) -> Result<f64> {
    let invalid = || MapError::InvalidField {
        row,
        field,
        value: value.to_string(),
    };

    let parsed: f64 = value.parse().map_err(|_| invalid())?;
    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(invalid());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = " LABEL ,LON , LAT\n\
        Lincoln High School, -118.2082, 34.0795\n\
        Belmont High School,-118.2630,34.0640\n";

    #[test]
    fn test_parse_trims_headers_and_cells() {
        let table = parse_campuses(CSV.as_bytes(), &ColumnNames::default()).unwrap();
        assert_eq!(table.len(), 2);
        let first = table.iter().next().unwrap();
        assert_eq!(first.label, "Lincoln High School");
        assert_eq!(first.lon, -118.2082);
        assert_eq!(first.lat, 34.0795);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "ID,LABEL,LON,LAT,DISTRICT\n7,X,-118.25,34.05,Central\n";
        let table = parse_campuses(csv.as_bytes(), &ColumnNames::default()).unwrap();
        assert_eq!(table.labels(), vec!["X"]);
    }

    #[test]
    fn test_custom_column_names() {
        let csv = "name,x,y\nX,-118.25,34.05\n";
        let columns = ColumnNames {
            label: "name".into(),
            lon: "x".into(),
            lat: "y".into(),
        };
        let table = parse_campuses(csv.as_bytes(), &columns).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let csv = "LABEL,LON\nX,-118.25\n";
        let err = parse_campuses(csv.as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, MapError::MissingColumn(ref c) if c == "LAT"));
    }

    #[test]
    fn test_bad_coordinate_names_row() {
        let err = parse_row(3, "B", "west", "34.05").unwrap_err();
        match err {
            MapError::InvalidField { row, field, value } => {
                assert_eq!(row, 3);
                assert_eq!(field, "longitude");
                assert_eq!(value, "west");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_latitude() {
        let err = parse_row(2, "A", "-118.25", "134.05").unwrap_err();
        assert!(matches!(err, MapError::InvalidField { field: "latitude", .. }));
    }

    #[test]
    fn test_empty_label() {
        let err = parse_row(2, "", "-118.25", "34.05").unwrap_err();
        assert!(matches!(err, MapError::InvalidField { field: "label", .. }));
    }

    #[test]
    fn test_unusable_rows_are_skipped() {
        let csv = "LABEL,LON,LAT\n\
            A,-118.25,34.05\n\
            Y,,\n\
            B,west,34.05\n\
            C,-118.25,134.05\n\
            ,-118.25,34.05\n\
            D,-118.30,34.10\n";
        let table = parse_campuses(csv.as_bytes(), &ColumnNames::default()).unwrap();
        assert_eq!(table.labels(), vec!["A", "D"]);
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let csv = "LABEL,LON,LAT\nA,-118.25\n";
        let err = parse_campuses(csv.as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, MapError::Csv(_)));
    }

    #[test]
    fn test_source_location_parsing() {
        let remote: SourceLocation = "https://example.com/schools.csv".parse().unwrap();
        assert!(matches!(remote, SourceLocation::Remote(_)));

        let local: SourceLocation = "data/schools.csv".parse().unwrap();
        assert_eq!(local, SourceLocation::Local(PathBuf::from("data/schools.csv")));

        let file: SourceLocation = "file:///tmp/schools.csv".parse().unwrap();
        assert_eq!(file, SourceLocation::Local(PathBuf::from("/tmp/schools.csv")));

        assert!("   ".parse::<SourceLocation>().is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails_loudly() {
        let location = SourceLocation::Local(PathBuf::from("/nonexistent/schools.csv"));
        let err = load_campuses(&location, &ColumnNames::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::Read { .. }));
        assert!(err.is_data_error());
    }
}
