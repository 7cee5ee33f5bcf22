//! Data pipeline behind the Premier League player-statistics charts:
//! CSV ingestion, record normalization, predicate filtering, metric
//! resolution, grouped statistics, and derived insights. Rendering is a
//! separate concern; everything here produces view-ready values, never
//! pixels.

pub mod aggregate;
pub mod dataset;
pub mod export;
pub mod filters;
pub mod insights;
pub mod metrics;
pub mod record;
pub mod sample_feed;
pub mod selection_bus;
pub mod view;
