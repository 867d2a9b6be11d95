//! # Page Break Decisions
//!
//! Logic for deciding whether the next row starts a new page.
//! A group banner is kept together with the first row of its group, so a
//! group title never sits alone at the bottom of a page.

/// What to do with the next row (and its banner, if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Draw on the current page.
    Place,
    /// Open a new page, repeat the heading, then draw.
    NewPage,
}

/// Decide whether a row, preceded by an optional banner, needs a new page.
///
/// `overflows` answers "would a block this tall cross the bottom margin
/// here?". With a banner, the banner and the row are checked as one block.
/// On a page that holds nothing but a repeated heading the answer is always
/// [`BreakDecision::Place`]: breaking again could never make more room.
pub fn decide_break(
    overflows: impl FnOnce(f64) -> bool,
    banner_height: Option<f64>,
    row_height: f64,
    page_is_fresh: bool,
) -> BreakDecision {
    if page_is_fresh {
        return BreakDecision::Place;
    }

    let needed = banner_height.unwrap_or(0.0) + row_height;
    if overflows(needed) {
        BreakDecision::NewPage
    } else {
        BreakDecision::Place
    }
}

/// An overflow predicate for a page with `remaining` height left.
pub fn remaining(remaining: f64) -> impl Fn(f64) -> bool {
    move |height| height > remaining
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_fits() {
        assert_eq!(decide_break(remaining(20.0), None, 10.0, false), BreakDecision::Place);
        assert_eq!(decide_break(remaining(10.0), None, 10.0, false), BreakDecision::Place);
    }

    #[test]
    fn row_overflows() {
        assert_eq!(decide_break(remaining(9.0), None, 10.0, false), BreakDecision::NewPage);
    }

    #[test]
    fn banner_is_kept_with_its_row() {
        // The banner alone fits, banner + row does not: break before the banner.
        assert_eq!(
            decide_break(remaining(12.0), Some(6.0), 10.0, false),
            BreakDecision::NewPage
        );
        assert_eq!(
            decide_break(remaining(16.0), Some(6.0), 10.0, false),
            BreakDecision::Place
        );
    }

    #[test]
    fn fresh_page_never_breaks() {
        assert_eq!(decide_break(|_| true, Some(6.0), 500.0, true), BreakDecision::Place);
    }

    #[test]
    fn fresh_page_skips_the_probe() {
        let mut asked = false;
        let decision = decide_break(
            |_| {
                asked = true;
                true
            },
            None,
            1.0,
            true,
        );
        assert_eq!(decision, BreakDecision::Place);
        assert!(!asked);
    }
}
