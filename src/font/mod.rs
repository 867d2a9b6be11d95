//! # Font Management
//!
//! Resolves a [`FontFace`] to one of the standard PDF fonts and measures
//! text with its AFM metrics. Standard fonts need no embedding, so the PDF
//! writer only has to name them.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use crate::style::FontFace;
use std::collections::HashMap;

/// A font registry that maps font family + weight + style to a standard font.
pub struct FontRegistry {
    fonts: HashMap<FontKey, StandardFont>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl FontKey {
    /// Key for a face with its weight snapped to regular or bold.
    pub fn for_face(face: &FontFace) -> Self {
        Self {
            family: face.family.clone(),
            weight: if face.is_bold() { 700 } else { 400 },
            italic: face.italic,
        }
    }
}

/// The standard PDF fonts the engine can draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => metrics::HELVETICA_METRICS,
            Self::HelveticaBold | Self::HelveticaBoldOblique => metrics::HELVETICA_BOLD_METRICS,
            Self::TimesRoman | Self::TimesItalic => metrics::TIMES_ROMAN_METRICS,
            Self::TimesBold | Self::TimesBoldItalic => metrics::TIMES_BOLD_METRICS,
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => metrics::COURIER_METRICS,
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = vec![
            (("Helvetica", 400, false), StandardFont::Helvetica),
            (("Helvetica", 700, false), StandardFont::HelveticaBold),
            (("Helvetica", 400, true), StandardFont::HelveticaOblique),
            (("Helvetica", 700, true), StandardFont::HelveticaBoldOblique),
            (("Arial", 400, false), StandardFont::Helvetica),
            (("Arial", 700, false), StandardFont::HelveticaBold),
            (("Arial", 400, true), StandardFont::HelveticaOblique),
            (("Arial", 700, true), StandardFont::HelveticaBoldOblique),
            (("Times", 400, false), StandardFont::TimesRoman),
            (("Times", 700, false), StandardFont::TimesBold),
            (("Times", 400, true), StandardFont::TimesItalic),
            (("Times", 700, true), StandardFont::TimesBoldItalic),
            (("Courier", 400, false), StandardFont::Courier),
            (("Courier", 700, false), StandardFont::CourierBold),
            (("Courier", 400, true), StandardFont::CourierOblique),
            (("Courier", 700, true), StandardFont::CourierBoldOblique),
        ];

        for ((family, weight, italic), font) in standard_mappings {
            fonts.insert(
                FontKey {
                    family: family.to_string(),
                    weight,
                    italic,
                },
                font,
            );
        }

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if the family is unknown.
    pub fn resolve(&self, face: &FontFace) -> StandardFont {
        let key = FontKey::for_face(face);
        if let Some(font) = self.fonts.get(&key) {
            return *font;
        }

        let key = FontKey {
            family: "Helvetica".to_string(),
            ..key
        };
        self.fonts
            .get(&key)
            .copied()
            .unwrap_or(StandardFont::Helvetica)
    }

    /// Alias an extra family name to an already registered standard font.
    pub fn register_alias(&mut self, family: &str, weight: u32, italic: bool, font: StandardFont) {
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight,
                italic,
            },
            font,
        );
    }
}

/// Shared font context used by text measurement and PDF serialization.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, face: &FontFace) -> f64 {
        self.registry
            .resolve(face)
            .metrics()
            .char_width(ch, face.size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, face: &FontFace) -> f64 {
        self.registry
            .resolve(face)
            .metrics()
            .measure_string(text, face.size, 0.0)
    }

    /// Resolve a font face to the standard font that will draw it.
    pub fn resolve(&self, face: &FontFace) -> StandardFont {
        self.registry.resolve(face)
    }

    /// Access the underlying font registry mutably.
    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}
