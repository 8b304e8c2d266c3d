// File: crates/pullscope-core/src/error.rs
// Summary: Error taxonomy for aggregation, registration and rendering.

use thiserror::Error;

use crate::model::QueryKey;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    /// The data source failed or returned nothing for the query key.
    #[error("no data available for {key}: {reason}")]
    DataUnavailable { key: QueryKey, reason: String },

    /// `attach` was called before the host provided a drawable surface.
    #[error("render surface is not available yet")]
    SurfaceUnavailable,

    /// A renderer was constructed before `registry::register_once` ran.
    #[error("chart capabilities are not registered; call register_once() at startup")]
    CapabilitiesMissing,

    #[error("dataset `{dataset}` has out-of-order points at index {index}")]
    UnorderedPoints { dataset: String, index: usize },

    #[error("dataset name `{0}` appears more than once")]
    DuplicateDataset(String),

    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("surface failed to present frame: {0}")]
    Present(String),
}

impl ChartError {
    /// Whether the host should treat this as something other than a degraded chart.
    ///
    /// Nothing in the chart subsystem takes the host application down; caller errors
    /// are reported but still leave the view usable.
    pub fn is_fatal(&self) -> bool {
        false
    }

    /// Errors the host should surface to the user as a status message.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, ChartError::DataUnavailable { .. })
    }
}
