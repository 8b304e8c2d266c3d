// File: crates/pullscope-core/src/axis.rs
// Summary: Axis models: continuous time axis (x) and value axis (y).

use serde::{Deserialize, Serialize};

use crate::registry::TimeUnit;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub display: bool,
    pub title: Option<String>,
    pub min_unit: TimeUnit,
}

impl TimeAxis {
    pub fn new(title: Option<String>) -> Self {
        Self { display: true, title, min_unit: TimeUnit::Second }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueAxis {
    pub display: bool,
    pub title: Option<String>,
    /// Lower bound the default view includes; data below it still widens the axis.
    pub suggested_min: Option<f64>,
}

impl ValueAxis {
    pub fn new(title: impl Into<String>) -> Self {
        Self { display: true, title: Some(title.into()), suggested_min: Some(0.0) }
    }
}
