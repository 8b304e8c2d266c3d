// File: crates/pullscope-query/src/lib.rs
// Summary: Data access for charts: source seam, fixture and CSV sources, cancellable loads, mounts.

pub mod csv_source;
pub mod error;
pub mod fixture;
pub mod loader;
pub mod mount;
pub mod source;

pub use csv_source::CsvSource;
pub use error::{SourceError, SourceResult};
pub use fixture::{FixtureSource, DAMAGE};
pub use loader::{LoadOutcome, LoadSettings, LoadTicket, QueryLoader};
pub use mount::{ChartMount, MountStatus};
pub use source::{DataSource, Encounter, Pull, PullResult};
