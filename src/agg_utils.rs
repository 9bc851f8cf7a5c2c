// agg_utils.rs
use crate::csv_utils::{MuseumRecord, ALL};
use crate::error_utils::JoinGapWarning;
use crate::geo_utils::{RegionGeometry, RegionGeometrySet};
use chrono::Datelike;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One shaded area of the choropleth: a region outline plus its museum
/// count. `count` is `None` when the region appears in the geometry file
/// but not in the data; consumers render that as "no data", never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCount {
    pub geometry: RegionGeometry,
    pub count: Option<usize>,
}

/// Result of left-joining museum counts onto the region geometry set. The
/// join is lossy in one direction: counted regions with no matching
/// geometry cannot be drawn, so they are dropped from `rows` but reported
/// in `gaps` for the operator to inspect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethJoin {
    pub rows: Vec<RegionCount>,
    pub gaps: JoinGapWarning,
}

/// Groups records by region and counts membership. Empty input yields an
/// empty mapping. Callers re-sort as needed; no ordering is guaranteed.
///
/// ```
/// use museefr::agg_utils::count_by_region;
/// use museefr::csv_utils::MuseumRecord;
///
/// let record = |region: &str| MuseumRecord {
///     official_name: "Musée".to_string(),
///     region: region.to_string(),
///     department: "D".to_string(),
///     commune: "C".to_string(),
///     address: String::new(),
///     phone: None,
///     latitude: 46.0,
///     longitude: 2.0,
///     designation_date: None,
/// };
///
/// let counts = count_by_region(&[record("A"), record("A"), record("B")]);
/// assert_eq!(counts["A"], 2);
/// assert_eq!(counts["B"], 1);
/// ```
pub fn count_by_region(records: &[MuseumRecord]) -> HashMap<String, usize> {
    count_by(records, |r| r.region.as_str())
}

/// Groups records by department and counts membership. Same contract as
/// `count_by_region`.
pub fn count_by_department(records: &[MuseumRecord]) -> HashMap<String, usize> {
    count_by(records, |r| r.department.as_str())
}

fn count_by(
    records: &[MuseumRecord],
    key: fn(&MuseumRecord) -> &str,
) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        *counts.entry(key(record).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Left-joins region counts onto every known geometry, in geometry file
/// order. A geometry with no matching count gets `count: None`; a count
/// key with no geometry is dropped from the rows and listed in the gap
/// report. Never fails on mismatched keys.
pub fn join_region_counts(
    counts: &HashMap<String, usize>,
    geometries: &RegionGeometrySet,
) -> ChoroplethJoin {
    let mut rows = Vec::with_capacity(geometries.len());
    let mut geometries_without_data = Vec::new();
    let mut matched: HashSet<&str> = HashSet::new();

    for geometry in geometries.geometries() {
        let count = counts.get(&geometry.name).copied();
        if count.is_some() {
            matched.insert(geometry.name.as_str());
        } else {
            geometries_without_data.push(geometry.name.clone());
        }
        rows.push(RegionCount {
            geometry: geometry.clone(),
            count,
        });
    }

    let mut regions_without_geometry: Vec<String> = counts
        .keys()
        .filter(|region| !matched.contains(region.as_str()))
        .cloned()
        .collect();
    regions_without_geometry.sort();

    ChoroplethJoin {
        rows,
        gaps: JoinGapWarning {
            regions_without_geometry,
            geometries_without_data,
        },
    }
}

/// The `n` communes with the most museums, descending by count. Ties keep
/// the first-encountered order of the input sequence. When `n` exceeds the
/// number of distinct communes, every commune is returned.
pub fn top_n_by_commune(records: &[MuseumRecord], n: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let commune = record.commune.as_str();
        if !counts.contains_key(commune) {
            order.push(record.commune.clone());
        }
        *counts.entry(commune).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|commune| {
            let count = counts[commune.as_str()];
            (commune, count)
        })
        .collect();
    // sort_by is stable, so equal counts keep first-seen order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Museums accredited per year, ascending by year with no duplicate years.
/// Records without a parsed designation date are excluded silently.
pub fn count_by_designation_year(records: &[MuseumRecord]) -> Vec<(i32, usize)> {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for record in records {
        if let Some(date) = record.designation_date {
            *counts.entry(date.year()).or_insert(0) += 1;
        }
    }

    let mut series: Vec<(i32, usize)> = counts.into_iter().collect();
    series.sort_by_key(|&(year, _)| year);
    series
}

/// Two-level department/commune filter. The `ALL` sentinel on either level
/// means "no filter at this level", so passing it on both returns every
/// record unchanged; a commune that does not belong to the selected
/// department simply yields an empty result.
pub fn cascading_filter(
    records: &[MuseumRecord],
    department: &str,
    commune: &str,
) -> Vec<MuseumRecord> {
    records
        .iter()
        .filter(|r| department == ALL || r.department == department)
        .filter(|r| commune == ALL || r.commune == commune)
        .cloned()
        .collect()
}

/// The commune choices valid for `department`: the sorted distinct communes
/// of the records already filtered to that department. Options are always a
/// function of the current department selection, never the global dataset
/// (with the `ALL` sentinel the filtered subset is the whole dataset).
pub fn commune_options(records: &[MuseumRecord], department: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut options: Vec<String> = Vec::new();
    for record in records {
        if department != ALL && record.department != department {
            continue;
        }
        if seen.insert(record.commune.as_str()) {
            options.push(record.commune.clone());
        }
    }
    options.sort();
    options
}

/// The department choices, sorted. Mirrors `commune_options` at the first
/// filter level.
pub fn department_options(records: &[MuseumRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut options: Vec<String> = Vec::new();
    for record in records {
        if seen.insert(record.department.as_str()) {
            options.push(record.department.clone());
        }
    }
    options.sort();
    options
}

/// Distinct region names in first-seen order. The UI layer prepends its own
/// "all regions" sentinel; the pipeline never injects one.
pub fn available_regions(records: &[MuseumRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut regions: Vec<String> = Vec::new();
    for record in records {
        if seen.insert(record.region.as_str()) {
            regions.push(record.region.clone());
        }
    }
    regions
}

/// Records of one region, or every record for the `ALL` sentinel.
pub fn filter_by_region(records: &[MuseumRecord], region: &str) -> Vec<MuseumRecord> {
    records
        .iter()
        .filter(|r| region == ALL || r.region == region)
        .cloned()
        .collect()
}
