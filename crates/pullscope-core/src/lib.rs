// File: crates/pullscope-core/src/lib.rs
// Summary: Core library entry point; aggregation, capability registry, chart renderer and zoom state.

pub mod aggregate;
pub mod axis;
pub mod chart;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod interaction;
pub mod interp;
pub mod model;
pub mod options;
pub mod registry;
pub mod scale;
pub mod scene;
pub mod theme;
pub mod types;
pub mod viewport;

pub use aggregate::{aggregate, aggregate_with_report, AggregateQuery, AggregateReport, Aggregation, Resolution};
pub use chart::{ChartRenderer, DrawConfig, Gesture, Hover, HoverItem, RenderHandle, RenderSurface, SeriesConfig};
pub use error::{ChartError, ChartResult};
pub use interaction::{InteractionController, Transition, ViewEvent, ViewState, ZoomState};
pub use interp::Interpolation;
pub use model::{BucketGrid, Dataset, Point, PointTimeseries, QueryKey, Sample, Timestamp};
pub use options::ChartOptions;
pub use registry::{register_once, registry, Registry};
pub use scene::Scene;
pub use theme::{Rgba, Theme};
pub use viewport::Viewport;
