// csv_utils.rs
use crate::error_utils::{PartialDataWarning, PipelineError, PipelineResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Header names the museum CSV must carry. Delimiter and header names are a
/// fixed external contract with the published dataset; a missing column is a
/// fatal `SchemaError`, never a silent partial load.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "nom_officiel_du_musee",
    "region_administrative",
    "departement",
    "commune",
    "adresse",
    "telephone",
    "latitude",
    "longitude",
    "date_arrete_attribution_appellation",
];

/// The sentinel callers pass to mean "no filter on this level". Owned by the
/// UI layer; the pipeline never injects it into its own domain data.
pub const ALL: &str = "ALL";

/// Represents one accredited museum, i.e. one row of the source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuseumRecord {
    pub official_name: String,
    pub region: String,
    pub department: String,
    pub commune: String,
    pub address: String,
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// The date the museum was officially accredited as a "Museum of
    /// France". `None` when the source value is absent or unparseable; such
    /// records are excluded from the designation time series only.
    pub designation_date: Option<NaiveDate>,
}

impl MuseumRecord {
    /// True when both coordinates are finite and usable by a map surface.
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Represents the immutable museum dataset loaded once per session. No
/// record is ever mutated or deleted after load; every query over it is a
/// pure function returning a fresh derived structure.
#[derive(Debug, Clone)]
pub struct MuseumDataset {
    records: Vec<MuseumRecord>,
    warning: PartialDataWarning,
    skipped_rows: usize,
}

impl MuseumDataset {
    /// Reads the `;`-delimited museum CSV at `file_path` and returns the
    /// loaded dataset, validating the schema first.
    ///
    /// Fatal failures: unreadable file, malformed CSV, or any column of
    /// `REQUIRED_COLUMNS` missing from the header row. Recoverable per-row
    /// issues never abort the load: an absent or unparseable designation
    /// date leaves `designation_date` as `None` (tallied in
    /// `partial_data_warning()`), an unparseable coordinate becomes NaN and
    /// is skipped by map consumers, and a row with a blank region,
    /// department or commune is dropped (tallied in `skipped_rows()`),
    /// since every aggregation keys on those three columns.
    ///
    /// ```
    /// use museefr::csv_utils::{MuseumDataset, REQUIRED_COLUMNS};
    /// use csv::WriterBuilder;
    ///
    /// let tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    /// let mut writer = WriterBuilder::new()
    ///     .delimiter(b';')
    ///     .from_path(tmp.path())
    ///     .unwrap();
    /// writer.write_record(REQUIRED_COLUMNS).unwrap();
    /// writer.write_record(&[
    ///     "Musée du Louvre", "Île-de-France", "Paris", "Paris",
    ///     "Rue de Rivoli", "01 40 20 50 50", "48.8606", "2.3376",
    ///     "2003-01-24",
    /// ]).unwrap();
    /// writer.flush().unwrap();
    ///
    /// let dataset = MuseumDataset::from_csv(tmp.path().to_str().unwrap()).unwrap();
    /// assert_eq!(dataset.len(), 1);
    /// assert_eq!(dataset.records()[0].commune, "Paris");
    /// ```
    pub fn from_csv(file_path: &str) -> PipelineResult<Self> {
        let path = Path::new(file_path);
        let file = File::open(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut rdr = csv::ReaderBuilder::new().delimiter(b';').from_reader(file);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|source| PipelineError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(String::from)
            .collect();

        let mut indices = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for column in REQUIRED_COLUMNS {
            match headers.iter().position(|h| h == column) {
                Some(idx) => indices.push(idx),
                None => {
                    return Err(PipelineError::Schema {
                        path: path.to_path_buf(),
                        column: column.to_string(),
                    })
                }
            }
        }
        let name_idx = indices[0];
        let region_idx = indices[1];
        let department_idx = indices[2];
        let commune_idx = indices[3];
        let address_idx = indices[4];
        let phone_idx = indices[5];
        let lat_idx = indices[6];
        let lon_idx = indices[7];
        let date_idx = indices[8];

        let mut records = Vec::new();
        let mut warning = PartialDataWarning::default();
        let mut skipped_rows = 0usize;

        for result in rdr.records() {
            let row = result.map_err(|source| PipelineError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

            let field = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();

            let region = field(region_idx);
            let department = field(department_idx);
            let commune = field(commune_idx);
            if region.is_empty() || department.is_empty() || commune.is_empty() {
                skipped_rows += 1;
                continue;
            }

            let raw_date = field(date_idx);
            let designation_date = if raw_date.is_empty() {
                warning.missing_dates += 1;
                None
            } else {
                match parse_designation_date(&raw_date) {
                    Some(date) => Some(date),
                    None => {
                        warning.unparseable_dates += 1;
                        None
                    }
                }
            };

            let phone = {
                let value = field(phone_idx);
                if value.is_empty() {
                    None
                } else {
                    Some(value)
                }
            };

            records.push(MuseumRecord {
                official_name: field(name_idx),
                region,
                department,
                commune,
                address: field(address_idx),
                phone,
                latitude: field(lat_idx).parse().unwrap_or(f64::NAN),
                longitude: field(lon_idx).parse().unwrap_or(f64::NAN),
                designation_date,
            });
        }

        Ok(MuseumDataset {
            records,
            warning,
            skipped_rows,
        })
    }

    /// Builds a dataset directly from records, bypassing file IO.
    ///
    /// ```
    /// use museefr::csv_utils::MuseumDataset;
    ///
    /// let dataset = MuseumDataset::from_records(vec![]);
    /// assert!(dataset.is_empty());
    /// ```
    pub fn from_records(records: Vec<MuseumRecord>) -> Self {
        let warning = PartialDataWarning {
            missing_dates: records
                .iter()
                .filter(|r| r.designation_date.is_none())
                .count(),
            unparseable_dates: 0,
        };
        MuseumDataset {
            records,
            warning,
            skipped_rows: 0,
        }
    }

    pub fn records(&self) -> &[MuseumRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tally of records loaded without a usable designation date.
    pub fn partial_data_warning(&self) -> &PartialDataWarning {
        &self.warning
    }

    /// Rows dropped at load time for lacking a region, department or
    /// commune value.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Count of distinct values in the column selected by `key`.
    pub fn distinct_count(&self, key: fn(&MuseumRecord) -> &str) -> usize {
        let mut seen: HashSet<&str> = HashSet::new();
        for record in &self.records {
            seen.insert(key(record));
        }
        seen.len()
    }
}

/// Parses a designation date. The published dataset uses ISO `YYYY-MM-DD`;
/// `DD/MM/YYYY` and ISO datetimes also appear in older extracts.
pub fn parse_designation_date(raw: &str) -> Option<NaiveDate> {
    let date_formats = ["%Y-%m-%d", "%d/%m/%Y"];
    let datetime_formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    date_formats
        .iter()
        .find_map(|&format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            datetime_formats
                .iter()
                .find_map(|&format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
}
