// lib.rs
//! # MUSEEFR
//!
//! The data pipeline behind the "Museums of France" dashboard. More than
//! 1,200 museums hold the state "Musée de France" accreditation; this crate
//! loads the published dataset once and answers every aggregation and
//! filtering query the dashboard's maps, charts and table need, as pure
//! functions returning plain serializable structures. No chart, map or UI
//! toolkit type ever crosses the API boundary.
//!
//! ## `csv_utils`
//!
//! - **Purpose**: Load and type the `;`-delimited museum CSV.
//! - **Features**:
//!   - **MuseumRecord**: One accredited museum, with region, department,
//!     commune, address, optional phone, coordinates and the optional
//!     designation date.
//!   - **MuseumDataset**: The immutable record set, loaded once per
//!     session. Validates the fixed header contract up front (a missing
//!     required column is a fatal schema error), tolerates per-row date
//!     and coordinate issues, and tallies them instead of failing.
//!   - Multi-format designation-date parsing via `chrono`.
//!
//! ## `geo_utils`
//!
//! - **Purpose**: Load the region outlines used by the choropleth.
//! - **Features**:
//!   - Parses a GeoJSON FeatureCollection with `serde_json`, keeping the
//!     `nom` property as the join key.
//!   - Flattens Polygon/MultiPolygon coordinates into plain nested
//!     vectors, so consumers never depend on a geometry library.
//!
//! ## `agg_utils`
//!
//! - **Purpose**: The pure aggregation and filtering operations.
//! - **Features**:
//!   - Count museums by region or department.
//!   - Left-join region counts onto every geometry for the choropleth,
//!     reporting join gaps instead of erroring on them.
//!   - Top-N communes with stable tie order.
//!   - Museums per designation year, ascending, skipping records without
//!     a usable date.
//!   - Cascading department → commune filter, where commune options are
//!     always derived from the currently selected department.
//!
//! ## `dashboard_utils`
//!
//! - **Purpose**: Chart-ready derived tables, one function per dashboard
//!   surface.
//! - **Features**:
//!   - Map view with region-dependent center and zoom.
//!   - Region/department histogram bars.
//!   - Choropleth rows, designation time series, top-10 commune pie.
//!   - Filterable table rows with merged address/phone informations.
//!   - Headline dataset summary.
//!
//! ## `cache_utils`
//!
//! - **Purpose**: Process-wide read-only cache with an explicit init-once
//!   lifecycle.
//! - **Features**:
//!   - First call loads CSV and GeoJSON together; every later call shares
//!     the same immutable copy. A failed load leaves the cache empty.
//!
//! ## `error_utils`
//!
//! - **Purpose**: The error taxonomy.
//! - **Features**:
//!   - `PipelineError`: fatal load errors (unreadable input, malformed
//!     CSV/GeoJSON, missing required column).
//!   - `PartialDataWarning` and `JoinGapWarning`: recoverable data-quality
//!     findings returned as values, never raised.
//!
//! ## License
//!
//! This project is licensed under the MIT License - see the LICENSE file for details.

pub mod agg_utils;
pub mod cache_utils;
pub mod csv_utils;
pub mod dashboard_utils;
pub mod error_utils;
pub mod geo_utils;
