// cache_utils.rs
use crate::csv_utils::MuseumDataset;
use crate::error_utils::AnyhowResult;
use crate::geo_utils::RegionGeometrySet;
use lazy_static::lazy_static;
use std::sync::{Arc, RwLock};

/// Everything a dashboard session queries: the museum dataset and the
/// region outlines, loaded together and never written afterwards.
#[derive(Debug)]
pub struct DashboardData {
    pub dataset: MuseumDataset,
    pub geometries: RegionGeometrySet,
}

lazy_static! {
    static ref DASHBOARD_CACHE: RwLock<Option<Arc<DashboardData>>> = RwLock::new(None);
}

/// Returns the process-wide dashboard data, loading it on the first call
/// and returning the cached `Arc` on every later one. Sharing the loaded
/// copy across sessions is safe because nothing is written after load.
///
/// A failed load leaves the cache empty, so the next call retries from
/// scratch; there is no partially initialized state.
pub fn load_or_init(csv_path: &str, geojson_path: &str) -> AnyhowResult<Arc<DashboardData>> {
    if let Some(data) = get() {
        return Ok(data);
    }

    let dataset = MuseumDataset::from_csv(csv_path)?;
    let geometries = RegionGeometrySet::from_geojson_file(geojson_path)?;
    let data = Arc::new(DashboardData {
        dataset,
        geometries,
    });

    let mut guard = DASHBOARD_CACHE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    // Another thread may have won the race while we were loading; keep the
    // first copy so every caller shares one.
    if let Some(existing) = guard.as_ref() {
        return Ok(Arc::clone(existing));
    }
    *guard = Some(Arc::clone(&data));
    Ok(data)
}

/// The cached dashboard data, if the cache has been initialized.
pub fn get() -> Option<Arc<DashboardData>> {
    DASHBOARD_CACHE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .as_ref()
        .map(Arc::clone)
}

#[cfg(test)]
fn reset() {
    *DASHBOARD_CACHE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_utils::REQUIRED_COLUMNS;
    use crate::error_utils::PipelineError;
    use csv::WriterBuilder;
    use std::io::Write;

    // One test covers the whole lifecycle: the cache is process-global, so
    // splitting these stages into separate tests would race under the
    // parallel test runner.
    #[test]
    fn init_once_lifecycle() {
        reset();

        let csv_tmp = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp csv");
        let mut writer = WriterBuilder::new()
            .delimiter(b';')
            .from_path(csv_tmp.path())
            .expect("csv writer");
        writer.write_record(REQUIRED_COLUMNS).expect("header");
        writer
            .write_record([
                "Musée des Beaux-Arts",
                "Bretagne",
                "Ille-et-Vilaine",
                "Rennes",
                "20 Quai Émile Zola",
                "",
                "48.109",
                "-1.674",
                "2002-05-17",
            ])
            .expect("row");
        writer.flush().expect("flush");

        let mut geo_tmp = tempfile::Builder::new()
            .suffix(".geojson")
            .tempfile()
            .expect("temp geojson");
        geo_tmp
            .write_all(
                br#"{"type":"FeatureCollection","features":[
                    {"type":"Feature","properties":{"nom":"Bretagne"},
                     "geometry":{"type":"Polygon","coordinates":[[[-4.0,48.0],[-1.0,48.0],[-2.5,49.0],[-4.0,48.0]]]}}
                ]}"#,
            )
            .expect("write geojson");

        let csv_path = csv_tmp.path().to_str().unwrap();
        let geo_path = geo_tmp.path().to_str().unwrap();

        // A failed load must leave the cache empty, and the pipeline error
        // must survive the composite result intact.
        let err = load_or_init("missing.csv", geo_path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Io { .. })
        ));
        assert!(get().is_none());

        let first = load_or_init(csv_path, geo_path).unwrap();
        assert_eq!(first.dataset.len(), 1);
        assert_eq!(first.geometries.names(), vec!["Bretagne"]);

        // Later calls return the same shared copy, even with other paths.
        let second = load_or_init(csv_path, geo_path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let cached = get().expect("cache populated");
        assert!(Arc::ptr_eq(&first, &cached));

        reset();
        assert!(get().is_none());
    }
}
