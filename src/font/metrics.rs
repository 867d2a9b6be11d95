//! Advance widths for the standard PDF fonts, in 1/1000 em.
//!
//! Tables cover the printable ASCII range (0x20..=0x7E) and come from the
//! Adobe AFM files. Latin-1 letters are measured as their unaccented base
//! letter. Slanted variants are measured with the upright tables. That is
//! exact for Helvetica and Courier. Times-Italic and Times-BoldItalic have
//! their own AFM widths, so italic Times text is an approximation.

/// Width metrics for one standard font.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    widths: &'static [u16; 95],
    default_width: u16,
}

impl StandardFontMetrics {
    pub const fn new(widths: &'static [u16; 95], default_width: u16) -> Self {
        Self {
            widths,
            default_width,
        }
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_units(&self, ch: char) -> u16 {
        let ch = fold_latin1(ch);
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            self.widths[(cp - 0x20) as usize]
        } else {
            match ch {
                '\u{00A0}' => self.widths[0],
                '\u{2018}' | '\u{2019}' | '\u{201A}' => self.widths[('\'' as usize) - 0x20],
                '\u{2013}' | '\u{2014}' => self.widths[('-' as usize) - 0x20] * 3 / 2,
                '\u{0152}' => self.widths[('O' as usize) - 0x20] + self.widths[('E' as usize) - 0x20],
                '\u{0153}' => self.widths[('o' as usize) - 0x20] + self.widths[('e' as usize) - 0x20],
                _ => self.default_width,
            }
        }
    }

    /// Advance width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.char_units(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a whole string in points.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

/// Map accented Latin-1 letters to their base letter.
fn fold_latin1(ch: char) -> char {
    match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => ch,
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

const COURIER: [u16; 95] = [600; 95];

pub const HELVETICA_METRICS: StandardFontMetrics = StandardFontMetrics::new(&HELVETICA, 556);
pub const HELVETICA_BOLD_METRICS: StandardFontMetrics =
    StandardFontMetrics::new(&HELVETICA_BOLD, 611);
pub const TIMES_ROMAN_METRICS: StandardFontMetrics = StandardFontMetrics::new(&TIMES_ROMAN, 500);
pub const TIMES_BOLD_METRICS: StandardFontMetrics = StandardFontMetrics::new(&TIMES_BOLD, 556);
pub const COURIER_METRICS: StandardFontMetrics = StandardFontMetrics::new(&COURIER, 600);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space_width() {
        assert!((HELVETICA_METRICS.char_width(' ', 12.0) - 3.336).abs() < 0.001);
    }

    #[test]
    fn accented_letters_use_base_width() {
        assert_eq!(
            HELVETICA_METRICS.char_units('é'),
            HELVETICA_METRICS.char_units('e')
        );
        assert_eq!(TIMES_ROMAN_METRICS.char_units('Ç'), TIMES_ROMAN_METRICS.char_units('C'));
    }

    #[test]
    fn courier_is_monospaced() {
        let a = COURIER_METRICS.measure_string("iiii", 10.0, 0.0);
        let b = COURIER_METRICS.measure_string("MMMM", 10.0, 0.0);
        assert!((a - b).abs() < 1e-9);
        assert!((a - 24.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_chars_get_default_width() {
        assert_eq!(HELVETICA_METRICS.char_units('\u{4E2D}'), 556);
    }
}
