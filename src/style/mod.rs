//! # Style Primitives
//!
//! The handful of visual properties a drawing surface understands: fill
//! color, cell borders, horizontal alignment and font face. Nothing here
//! cascades or inherits; each table field carries its own value.

use serde::{Deserialize, Serialize};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    /// Light grey used for striped rows.
    pub const STRIPE: Color = Color {
        r: 0.878,
        g: 0.878,
        b: 0.878,
        a: 1.0,
    };
    /// Darker grey used for headings and banners.
    pub const SHADE: Color = Color {
        r: 0.784,
        g: 0.784,
        b: 0.784,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Fully transparent colors are never painted.
    pub fn is_visible(&self) -> bool {
        self.a > 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Horizontal placement of text inside a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Which sides of a cell get a border stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Border {
    pub const ALL: Border = Border {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };
    pub const NONE: Border = Border {
        top: false,
        right: false,
        bottom: false,
        left: false,
    };

    pub fn is_all(&self) -> bool {
        self.top && self.right && self.bottom && self.left
    }

    pub fn is_none(&self) -> bool {
        !(self.top || self.right || self.bottom || self.left)
    }
}

impl Default for Border {
    fn default() -> Self {
        Border::ALL
    }
}

/// A font family, weight, slant and size (in points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFace {
    #[serde(default = "default_family")]
    pub family: String,
    /// Font weight (100-900). Anything from 600 up renders bold.
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub italic: bool,
    #[serde(default = "default_size")]
    pub size: f64,
}

fn default_family() -> String {
    "Helvetica".to_string()
}

fn default_weight() -> u32 {
    400
}

fn default_size() -> f64 {
    10.0
}

impl FontFace {
    pub fn new(family: &str, size: f64) -> Self {
        Self {
            family: family.to_string(),
            weight: 400,
            italic: false,
            size,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = 700;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }
}

impl Default for FontFace {
    fn default() -> Self {
        Self::new("Helvetica", default_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_face_builders() {
        let f = FontFace::new("Times", 12.0).bold().italic();
        assert!(f.is_bold());
        assert!(f.italic);
        assert!(!FontFace::default().is_bold());
    }

    #[test]
    fn color_alpha_defaults_to_opaque() {
        let c: Color = serde_json::from_str(r#"{"r":0.5,"g":0.5,"b":0.5}"#).unwrap();
        assert!(c.is_visible());
        assert_eq!(c.a, 1.0);
    }
}
