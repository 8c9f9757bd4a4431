//! Two-click arc selection over the stability masks
//!
//! A front end feeds pixel clicks in; every second accepted click completes an
//! arc and the selector starts over. Clicks on pixels outside both stability
//! classes are rejected without changing state.

use crate::core::arc_phase::arc_phase_series;
use crate::core::stability::StabilityMasks;
use crate::types::{PixelCoord, SarResult};
use ndarray::{Array1, Array3};

/// Selector state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Empty,
    One(PixelCoord),
}

/// Result of feeding one click to the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Pixel is in neither stability class (or outside the image); ignored
    Rejected(PixelCoord),
    /// First end point of an arc accepted
    First(PixelCoord),
    /// Both end points chosen, the selector is empty again
    Arc(PixelCoord, PixelCoord),
}

/// Click-driven arc picker restricted to first-order and TCS pixels
#[derive(Debug, Clone)]
pub struct ArcSelector {
    masks: StabilityMasks,
    state: SelectionState,
}

impl ArcSelector {
    pub fn new(masks: StabilityMasks) -> Self {
        Self {
            masks,
            state: SelectionState::Empty,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn masks(&self) -> &StabilityMasks {
        &self.masks
    }

    /// Feed a click at (row, col)
    pub fn click(&mut self, row: usize, col: usize) -> SelectionEvent {
        let pixel = PixelCoord::new(row, col);

        if !self.masks.contains(pixel) {
            log::warn!(
                "Invalid selection at {}. Only select first-order or second-order points.",
                pixel
            );
            return SelectionEvent::Rejected(pixel);
        }

        match self.state {
            SelectionState::Empty => {
                self.state = SelectionState::One(pixel);
                SelectionEvent::First(pixel)
            }
            SelectionState::One(first) => {
                self.state = SelectionState::Empty;
                log::info!("Arc selected between {} and {}", first, pixel);
                SelectionEvent::Arc(first, pixel)
            }
        }
    }

    /// Forget a half-finished selection
    pub fn reset(&mut self) {
        self.state = SelectionState::Empty;
    }

    /// Arc phase series for a completed selection
    pub fn arc_series(
        &self,
        arc_phases: &Array3<f64>,
        a: PixelCoord,
        b: PixelCoord,
    ) -> SarResult<Array1<f64>> {
        arc_phase_series(arc_phases, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn masks() -> StabilityMasks {
        StabilityMasks {
            first_order: array![[true, false, false], [false, false, false]],
            tcs: array![[false, false, true], [false, true, false]],
        }
    }

    #[test]
    fn test_two_valid_clicks_make_an_arc() {
        let mut selector = ArcSelector::new(masks());
        assert_eq!(selector.state(), SelectionState::Empty);

        assert_eq!(selector.click(0, 0), SelectionEvent::First(PixelCoord::new(0, 0)));
        assert_eq!(selector.state(), SelectionState::One(PixelCoord::new(0, 0)));

        assert_eq!(
            selector.click(1, 1),
            SelectionEvent::Arc(PixelCoord::new(0, 0), PixelCoord::new(1, 1))
        );
        assert_eq!(selector.state(), SelectionState::Empty);

        // the next click starts a new arc
        assert_eq!(selector.click(0, 2), SelectionEvent::First(PixelCoord::new(0, 2)));
    }

    #[test]
    fn test_invalid_click_leaves_state_untouched() {
        let mut selector = ArcSelector::new(masks());
        selector.click(0, 2);

        assert_eq!(selector.click(0, 1), SelectionEvent::Rejected(PixelCoord::new(0, 1)));
        assert_eq!(selector.click(9, 9), SelectionEvent::Rejected(PixelCoord::new(9, 9)));
        assert_eq!(selector.state(), SelectionState::One(PixelCoord::new(0, 2)));

        selector.reset();
        assert_eq!(selector.state(), SelectionState::Empty);
    }

    #[test]
    fn test_arc_series_from_selection() {
        let selector = ArcSelector::new(masks());
        let phases = Array3::from_shape_fn((4, 2, 3), |(t, r, c)| (t * (r + c)) as f64);

        let series = selector
            .arc_series(&phases, PixelCoord::new(1, 1), PixelCoord::new(0, 0))
            .unwrap();
        assert_eq!(series, array![0.0, 2.0, 4.0, 6.0]);
    }
}
