// File: crates/pullscope-core/src/theme.rs
// Summary: Light/Dark theming and the dataset color palette, renderer-agnostic.

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color; backends convert to their native color type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Default dataset colors, cycled by dataset index.
pub const PALETTE: [Rgba; 7] = [
    Rgba::opaque(0x36, 0xa2, 0xeb), // blue
    Rgba::opaque(0xff, 0x63, 0x84), // red
    Rgba::opaque(0x4b, 0xc0, 0xc0), // teal
    Rgba::opaque(0xff, 0x9f, 0x40), // orange
    Rgba::opaque(0x99, 0x66, 0xff), // purple
    Rgba::opaque(0xff, 0xcd, 0x56), // yellow
    Rgba::opaque(0xc9, 0xcb, 0xcf), // grey
];

pub fn palette_color(index: usize) -> Rgba {
    PALETTE[index % PALETTE.len()]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgba,
    pub grid: Rgba,
    pub axis_line: Rgba,
    pub axis_label: Rgba,
    pub tick: Rgba,
    pub crosshair: Rgba,
    pub selection: Rgba,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Rgba::opaque(18, 18, 20),
            grid: Rgba::opaque(40, 40, 45),
            axis_line: Rgba::opaque(180, 180, 190),
            axis_label: Rgba::opaque(235, 235, 245),
            tick: Rgba::opaque(150, 150, 160),
            crosshair: Rgba::opaque(255, 230, 70),
            selection: Rgba::new(64, 160, 255, 64),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Rgba::opaque(250, 250, 252),
            grid: Rgba::opaque(230, 230, 235),
            axis_line: Rgba::opaque(60, 60, 70),
            axis_label: Rgba::opaque(20, 20, 30),
            tick: Rgba::opaque(100, 100, 110),
            crosshair: Rgba::opaque(30, 120, 240),
            selection: Rgba::new(32, 120, 200, 48),
        }
    }
}

impl Default for Theme {
    fn default() -> Self { Self::dark() }
}

/// Return a list of built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::dark(), Theme::light()]
}

/// Find a theme by its `name`, falling back to dark.
pub fn find(name: &str) -> Theme {
    for t in presets() { if t.name.eq_ignore_ascii_case(name) { return t; } }
    Theme::dark()
}
