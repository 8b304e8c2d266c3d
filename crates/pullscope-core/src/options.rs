// File: crates/pullscope-core/src/options.rs
// Summary: Serializable chart options with defaults; hosts load them from config files.

use serde::{Deserialize, Serialize};

use crate::interp::Interpolation;
use crate::registry::TimeUnit;
use crate::theme::{self, Theme};
use crate::types::Insets;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub title: Option<String>,
    pub x_title: Option<String>,
    pub y_title: String,
    pub y_suggested_min: Option<f64>,
    pub time_unit: TimeUnit,
    pub interpolation: Interpolation,
    /// Width / height of the drawing surface.
    pub aspect_ratio: f32,
    pub line_width: f32,
    /// Marker radius for every point; 0 hides markers (isolated points still show).
    pub point_radius: f32,
    pub show_legend: bool,
    pub theme: String,
    pub insets: Insets,
    pub x_ticks: usize,
    pub y_ticks: usize,
    /// Spacing beyond `gap_factor * interval` between neighbours is drawn as a break.
    pub gap_factor: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: None,
            x_title: None,
            y_title: "Per Second Amounts".to_string(),
            y_suggested_min: Some(0.0),
            time_unit: TimeUnit::Second,
            interpolation: Interpolation::MonotoneCubic,
            aspect_ratio: 3.0,
            line_width: 2.0,
            point_radius: 0.0,
            show_legend: true,
            theme: "dark".to_string(),
            insets: Insets::default(),
            x_ticks: 8,
            y_ticks: 5,
            gap_factor: 1.5,
        }
    }
}

impl ChartOptions {
    pub fn theme(&self) -> Theme {
        theme::find(&self.theme)
    }

    /// Surface height for a given width honouring the aspect ratio.
    pub fn height_for(&self, width: u32) -> u32 {
        let ratio = if self.aspect_ratio > 0.0 { self.aspect_ratio } else { 3.0 };
        ((width as f32 / ratio).round() as u32).max(1)
    }
}
