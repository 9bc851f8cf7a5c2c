// dashboard_utils.rs
use crate::agg_utils::{
    cascading_filter, count_by_department, count_by_designation_year, count_by_region,
    filter_by_region, join_region_counts, top_n_by_commune, ChoroplethJoin,
};
use crate::csv_utils::{MuseumDataset, MuseumRecord, ALL};
use crate::geo_utils::RegionGeometrySet;
use serde::Serialize;

/// Center of metropolitan France, the map default when no region is
/// selected.
pub const FRANCE_CENTER: (f64, f64) = (46.603354, 1.888334);
pub const COUNTRY_ZOOM: u8 = 6;
pub const REGION_ZOOM: u8 = 7;

/// How many slices the commune pie chart shows.
pub const PIE_TOP_N: usize = 10;

/// One marker on the museum map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

/// Everything the map surface needs for one render: a center, a zoom level
/// and the markers. Selecting a region centers the view on the mean
/// coordinates of its museums; the `ALL` sentinel centers on France.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: u8,
    pub points: Vec<MapPoint>,
}

/// Grouping axis of the museum histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupBy {
    Region,
    Department,
}

/// One bar of the histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// One slice of the top-communes pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
}

/// One row of the filterable museum table. `informations` merges the
/// address and, when present, the phone number on a second line; any markup
/// is the rendering layer's business.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub official_name: String,
    pub department: String,
    pub commune: String,
    pub informations: String,
}

/// Headline figures for the page chrome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub museums: usize,
    pub regions: usize,
    pub departments: usize,
    pub communes: usize,
    pub museums_with_designation_date: usize,
}

/// Builds the map view for `region` (`ALL` for the whole country). Records
/// without finite coordinates are left off the map. A selected region with
/// no mappable museum falls back to the France-wide view rather than a NaN
/// center.
pub fn map_view(records: &[MuseumRecord], region: &str) -> MapView {
    let filtered = filter_by_region(records, region);
    let points: Vec<MapPoint> = filtered
        .iter()
        .filter(|r| r.has_valid_coordinates())
        .map(|r| MapPoint {
            latitude: r.latitude,
            longitude: r.longitude,
            label: format!("{} ({}, {})", r.official_name, r.region, r.department),
        })
        .collect();

    if region == ALL || points.is_empty() {
        return MapView {
            center_latitude: FRANCE_CENTER.0,
            center_longitude: FRANCE_CENTER.1,
            zoom: COUNTRY_ZOOM,
            points,
        };
    }

    let n = points.len() as f64;
    MapView {
        center_latitude: points.iter().map(|p| p.latitude).sum::<f64>() / n,
        center_longitude: points.iter().map(|p| p.longitude).sum::<f64>() / n,
        zoom: REGION_ZOOM,
        points,
    }
}

/// Bars of the distribution histogram, grouped by region or department and
/// sorted by category name.
pub fn histogram(records: &[MuseumRecord], group_by: GroupBy) -> Vec<CategoryCount> {
    let counts = match group_by {
        GroupBy::Region => count_by_region(records),
        GroupBy::Department => count_by_department(records),
    };

    let mut bars: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    bars.sort_by(|a, b| a.category.cmp(&b.category));
    bars
}

/// Shaded areas of the museum-density choropleth, one per region geometry,
/// with the join gap report alongside.
pub fn choropleth_rows(
    records: &[MuseumRecord],
    geometries: &RegionGeometrySet,
) -> ChoroplethJoin {
    join_region_counts(&count_by_region(records), geometries)
}

/// Points of the designation-date line chart, ascending by year.
pub fn designation_time_series(records: &[MuseumRecord]) -> Vec<(i32, usize)> {
    count_by_designation_year(records)
}

/// Slices of the "cities with the most museums" pie chart, largest first.
pub fn top_communes_pie(records: &[MuseumRecord]) -> Vec<PieSlice> {
    top_n_by_commune(records, PIE_TOP_N)
        .into_iter()
        .map(|(label, value)| PieSlice { label, value })
        .collect()
}

/// Rows of the interactive table for the current department/commune
/// selection.
pub fn table_rows(records: &[MuseumRecord], department: &str, commune: &str) -> Vec<TableRow> {
    cascading_filter(records, department, commune)
        .into_iter()
        .map(|r| {
            let informations = match &r.phone {
                Some(phone) => format!("{}\n{}", r.address, phone),
                None => r.address.clone(),
            };
            TableRow {
                official_name: r.official_name,
                department: r.department,
                commune: r.commune,
                informations,
            }
        })
        .collect()
}

pub fn summary(dataset: &MuseumDataset) -> DatasetSummary {
    let records = dataset.records();
    DatasetSummary {
        museums: dataset.len(),
        regions: dataset.distinct_count(|r| r.region.as_str()),
        departments: dataset.distinct_count(|r| r.department.as_str()),
        communes: dataset.distinct_count(|r| r.commune.as_str()),
        museums_with_designation_date: records
            .iter()
            .filter(|r| r.designation_date.is_some())
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::{RegionGeometry, RegionShape};

    fn record(region: &str, lat: f64, lon: f64) -> MuseumRecord {
        MuseumRecord {
            official_name: "Musée Test".to_string(),
            region: region.to_string(),
            department: "Dép".to_string(),
            commune: "Ville".to_string(),
            address: "2 place de la Mairie".to_string(),
            phone: None,
            latitude: lat,
            longitude: lon,
            designation_date: None,
        }
    }

    #[test]
    fn country_view_centers_on_france() {
        let records = vec![record("A", 48.0, 2.0), record("B", 44.0, 4.0)];
        let view = map_view(&records, ALL);
        assert_eq!(view.center_latitude, FRANCE_CENTER.0);
        assert_eq!(view.center_longitude, FRANCE_CENTER.1);
        assert_eq!(view.zoom, COUNTRY_ZOOM);
        assert_eq!(view.points.len(), 2);
    }

    #[test]
    fn region_view_centers_on_mean_coordinates() {
        let records = vec![
            record("A", 48.0, 2.0),
            record("A", 46.0, 4.0),
            record("B", 10.0, 10.0),
        ];
        let view = map_view(&records, "A");
        assert_eq!(view.center_latitude, 47.0);
        assert_eq!(view.center_longitude, 3.0);
        assert_eq!(view.zoom, REGION_ZOOM);
        assert_eq!(view.points.len(), 2);
        assert_eq!(view.points[0].label, "Musée Test (A, Dép)");
    }

    #[test]
    fn non_finite_coordinates_stay_off_the_map() {
        let records = vec![record("A", f64::NAN, 2.0), record("A", 46.0, 4.0)];
        let view = map_view(&records, "A");
        assert_eq!(view.points.len(), 1);
        assert_eq!(view.center_latitude, 46.0);
    }

    #[test]
    fn region_without_mappable_museums_falls_back_to_country_view() {
        let records = vec![record("A", f64::NAN, f64::NAN)];
        let view = map_view(&records, "A");
        assert!(view.points.is_empty());
        assert_eq!(view.center_latitude, FRANCE_CENTER.0);
        assert_eq!(view.zoom, COUNTRY_ZOOM);
    }

    #[test]
    fn histogram_sorts_bars_by_category() {
        let records = vec![
            record("Occitanie", 43.0, 3.0),
            record("Bretagne", 48.0, -3.0),
            record("Occitanie", 43.5, 3.5),
        ];
        let bars = histogram(&records, GroupBy::Region);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].category, "Bretagne");
        assert_eq!(bars[0].count, 1);
        assert_eq!(bars[1].category, "Occitanie");
        assert_eq!(bars[1].count, 2);

        let by_department = histogram(&records, GroupBy::Department);
        assert_eq!(by_department.len(), 1);
        assert_eq!(by_department[0].count, 3);
    }

    #[test]
    fn choropleth_rows_cover_all_geometries() {
        let records = vec![record("A", 48.0, 2.0)];
        let geometries = RegionGeometrySet::from_geometries(vec![RegionGeometry {
            name: "A".to_string(),
            shape: RegionShape::Polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0], [0.0, 0.0]]]),
        }]);
        let join = choropleth_rows(&records, &geometries);
        assert_eq!(join.rows.len(), 1);
        assert_eq!(join.rows[0].count, Some(1));
        assert!(join.gaps.is_clean());
    }

    #[test]
    fn pie_keeps_at_most_ten_slices() {
        let mut records = Vec::new();
        for i in 0..12 {
            let mut r = record("R", 46.0, 2.0);
            r.commune = format!("Ville-{i:02}");
            records.push(r);
        }
        // Make one commune dominate.
        let mut big = record("R", 46.0, 2.0);
        big.commune = "Ville-05".to_string();
        records.push(big);

        let slices = top_communes_pie(&records);
        assert_eq!(slices.len(), PIE_TOP_N);
        assert_eq!(slices[0].label, "Ville-05");
        assert_eq!(slices[0].value, 2);
    }

    #[test]
    fn table_rows_merge_address_and_phone() {
        let mut with_phone = record("R", 46.0, 2.0);
        with_phone.phone = Some("05 61 00 00 00".to_string());
        let without_phone = record("R", 46.0, 2.0);

        let rows = table_rows(&[with_phone, without_phone], ALL, ALL);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].informations, "2 place de la Mairie\n05 61 00 00 00");
        assert_eq!(rows[1].informations, "2 place de la Mairie");
    }

    #[test]
    fn summary_counts_distinct_values() {
        let mut records = vec![record("A", 48.0, 2.0), record("B", 44.0, 4.0)];
        records[1].department = "Autre".to_string();
        records[1].designation_date = chrono::NaiveDate::from_ymd_opt(2002, 1, 4);
        let dataset = MuseumDataset::from_records(records);

        let summary = summary(&dataset);
        assert_eq!(summary.museums, 2);
        assert_eq!(summary.regions, 2);
        assert_eq!(summary.departments, 2);
        assert_eq!(summary.communes, 1);
        assert_eq!(summary.museums_with_designation_date, 1);
    }
}
