//! Crop selection state machine
//!
//! The drag-to-crop interaction as an explicit state machine, independent of
//! any GUI toolkit:
//!
//! | From | Event | To |
//! |------|-------|----|
//! | Idle / Committed | Arm (image present) | Armed |
//! | Armed | PointerDown inside the image | Dragging |
//! | Dragging | PointerMove with primary held | Dragging |
//! | Dragging | PointerUp, big enough | Committed |
//! | Dragging | PointerUp, too small | Idle |
//! | Armed / Dragging | Cancel | state before arming |
//! | Committed | Clear | Idle |
//! | any | Reset | Idle |
//!
//! [`transition`] is pure: it maps `(state, event, context)` to the next state
//! and the resulting change to the crop. [`CropSelector`] keeps the current
//! state for callers that do not want to thread it through themselves.
//!
//! Anchor and current points are stored in image coordinates, converted the
//! moment a pointer event arrives, so a viewport resize mid-drag does not
//! move the selection.

use serde::{Deserialize, Serialize};

use crate::{
    model::{CropBox, ImagePoint, ImageSize, ViewportPoint, ViewportRect},
    preview::PreviewTransform,
};

/// Selection state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    /// No selection in progress and no crop
    Idle,
    /// Waiting for a pointer-down on the image
    Armed {
        /// Crop that was committed before arming; restored on cancel
        previous: Option<CropBox>,
    },
    /// Primary button held since a pointer-down on the image
    Dragging {
        anchor:   ImagePoint,
        current:  ImagePoint,
        previous: Option<CropBox>,
    },
    /// A crop is in effect
    Committed(CropBox),
}

impl SelectionState {
    /// The crop currently in effect.
    ///
    /// While re-selecting, the previously committed crop stays in effect
    /// until the new drag is released or cancelled.
    pub fn crop_box(&self) -> Option<CropBox> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Armed { previous } | SelectionState::Dragging { previous, .. } => {
                *previous
            }
            SelectionState::Committed(crop) => Some(*crop),
        }
    }

    /// True while armed or dragging.
    pub fn is_selecting(&self) -> bool {
        matches!(self, SelectionState::Armed { .. } | SelectionState::Dragging { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionState::Idle => "idle",
            SelectionState::Armed { .. } => "armed",
            SelectionState::Dragging { .. } => "dragging",
            SelectionState::Committed(_) => "committed",
        }
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// Enter selection mode
    Arm,
    PointerDown { x: i32, y: i32 },
    PointerMove {
        x:            i32,
        y:            i32,
        #[serde(default = "default_primary_down")]
        primary_down: bool,
    },
    PointerUp { x: i32, y: i32 },
    /// Leave selection mode, restoring whatever preceded arming
    Cancel,
    /// Drop the committed crop
    Clear,
    /// A new capture replaced the image
    Reset,
}

fn default_primary_down() -> bool {
    true
}

impl SelectionEvent {
    pub fn pointer_down(p: ViewportPoint) -> Self {
        SelectionEvent::PointerDown { x: p.x, y: p.y }
    }

    pub fn pointer_move(p: ViewportPoint, primary_down: bool) -> Self {
        SelectionEvent::PointerMove {
            x: p.x,
            y: p.y,
            primary_down,
        }
    }

    pub fn pointer_up(p: ViewportPoint) -> Self {
        SelectionEvent::PointerUp { x: p.x, y: p.y }
    }
}

/// What the selector may consult while handling an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionContext {
    /// Size of the captured image, `None` before the first capture
    pub image:    Option<ImageSize>,
    /// Current preview fit, `None` until a viewport is known
    pub preview:  Option<PreviewTransform>,
    /// Minimum crop side in image pixels
    pub min_side: u32,
}

/// How an event changed the crop in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropChange {
    Unchanged,
    Set(CropBox),
    Cleared,
}

/// Next state plus the crop change that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: SelectionState,
    pub crop:  CropChange,
}

impl Transition {
    fn to(state: SelectionState, crop: CropChange) -> Self {
        Self { state, crop }
    }

    fn stay(state: &SelectionState) -> Self {
        Self::to(*state, CropChange::Unchanged)
    }
}

/// Turns a finished drag into a crop box, or `None` when it is too small.
///
/// Edges are normalized with min/max, truncated to whole pixels and clamped
/// to the image.
pub fn finalize_drag(
    anchor: ImagePoint,
    end: ImagePoint,
    image: ImageSize,
    min_side: u32,
) -> Option<CropBox> {
    let w = f64::from(image.width);
    let h = f64::from(image.height);

    let left = anchor.x.min(end.x).clamp(0.0, w) as u32;
    let top = anchor.y.min(end.y).clamp(0.0, h) as u32;
    let right = anchor.x.max(end.x).clamp(0.0, w) as u32;
    let bottom = anchor.y.max(end.y).clamp(0.0, h) as u32;

    CropBox::within(left, top, right, bottom, image, min_side.max(1)).ok()
}

/// Pure transition function.
pub fn transition(
    state: &SelectionState,
    event: &SelectionEvent,
    ctx: &SelectionContext,
) -> Transition {
    use SelectionState::*;

    match (*state, *event) {
        (_, SelectionEvent::Reset) => {
            let crop = if state.crop_box().is_some() {
                CropChange::Cleared
            } else {
                CropChange::Unchanged
            };
            Transition::to(Idle, crop)
        }

        (Idle, SelectionEvent::Arm) if ctx.image.is_some() => {
            Transition::to(Armed { previous: None }, CropChange::Unchanged)
        }
        (Committed(crop), SelectionEvent::Arm) if ctx.image.is_some() => {
            Transition::to(
                Armed {
                    previous: Some(crop),
                },
                CropChange::Unchanged,
            )
        }

        (Armed { previous }, SelectionEvent::PointerDown { x, y }) => {
            let anchor = ctx
                .preview
                .and_then(|t| t.to_image(ViewportPoint::new(x, y)));
            match anchor {
                Some(anchor) => Transition::to(
                    Dragging {
                        anchor,
                        current: anchor,
                        previous,
                    },
                    CropChange::Unchanged,
                ),
                None => Transition::stay(state),
            }
        }

        (
            Dragging {
                anchor, previous, ..
            },
            SelectionEvent::PointerMove {
                x,
                y,
                primary_down: true,
            },
        ) => match ctx.preview {
            Some(t) => Transition::to(
                Dragging {
                    anchor,
                    current: t.to_image_clamped(ViewportPoint::new(x, y)),
                    previous,
                },
                CropChange::Unchanged,
            ),
            None => Transition::stay(state),
        },

        (Dragging { anchor, current, .. }, SelectionEvent::PointerUp { x, y }) => {
            let end = ctx
                .preview
                .map(|t| t.to_image_clamped(ViewportPoint::new(x, y)))
                .unwrap_or(current);

            match ctx
                .image
                .and_then(|image| finalize_drag(anchor, end, image, ctx.min_side))
            {
                Some(crop) => Transition::to(Committed(crop), CropChange::Set(crop)),
                None => Transition::to(Idle, CropChange::Cleared),
            }
        }

        (Armed { previous } | Dragging { previous, .. }, SelectionEvent::Cancel) => {
            Transition::to(previous.map_or(Idle, Committed), CropChange::Unchanged)
        }

        (Committed(_), SelectionEvent::Clear) => Transition::to(Idle, CropChange::Cleared),

        _ => Transition::stay(state),
    }
}

/// Stateful wrapper around [`transition`].
///
/// # Examples
///
/// ```
/// use cropshot_core::{
///     model::{ImageSize, ViewportPoint},
///     preview::PreviewTransform,
///     selection::{CropSelector, SelectionContext, SelectionEvent},
/// };
///
/// let image = ImageSize::new(1000, 800);
/// let ctx = SelectionContext {
///     image:    Some(image),
///     preview:  PreviewTransform::compute(image, ImageSize::new(500, 500)),
///     min_side: 10,
/// };
///
/// let mut selector = CropSelector::new();
/// selector.handle(SelectionEvent::Arm, &ctx);
/// selector.handle(SelectionEvent::pointer_down(ViewportPoint::new(100, 50)), &ctx);
/// selector.handle(SelectionEvent::pointer_move(ViewportPoint::new(300, 250), true), &ctx);
/// selector.handle(SelectionEvent::pointer_up(ViewportPoint::new(300, 250)), &ctx);
///
/// assert_eq!(selector.crop_box().unwrap().to_string(), "(200, 0) -> (600, 400)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSelector {
    state: SelectionState,
}

impl Default for CropSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl CropSelector {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn crop_box(&self) -> Option<CropBox> {
        self.state.crop_box()
    }

    /// Applies one event and returns the crop change it caused.
    pub fn handle(&mut self, event: SelectionEvent, ctx: &SelectionContext) -> CropChange {
        let next = transition(&self.state, &event, ctx);

        if next.state != self.state {
            tracing::debug!(
                from = self.state.name(),
                to = next.state.name(),
                ?event,
                "Selection transition"
            );
        }
        match next.crop {
            CropChange::Set(crop) => tracing::info!(%crop, "Crop committed"),
            CropChange::Cleared => tracing::debug!("Crop cleared"),
            CropChange::Unchanged => {}
        }

        self.state = next.state;
        next.crop
    }

    /// Commits a crop that did not come from a drag (command line, restore).
    ///
    /// The caller validates it against the image first.
    pub fn commit(&mut self, crop: CropBox) -> CropChange {
        tracing::info!(%crop, "Crop committed directly");
        self.state = SelectionState::Committed(crop);
        CropChange::Set(crop)
    }

    /// The single crop button: cancel while selecting, clear a committed
    /// crop, arm otherwise.
    pub fn toggle(&mut self, ctx: &SelectionContext) -> CropChange {
        let event = match self.state {
            SelectionState::Armed { .. } | SelectionState::Dragging { .. } => {
                SelectionEvent::Cancel
            }
            SelectionState::Committed(_) => SelectionEvent::Clear,
            SelectionState::Idle => SelectionEvent::Arm,
        };
        self.handle(event, ctx)
    }

    /// Rectangle to draw over the preview, if any.
    ///
    /// Live drag rectangle while dragging, the committed crop when committed,
    /// nothing otherwise.
    pub fn overlay(&self, preview: Option<&PreviewTransform>) -> Option<ViewportRect> {
        let t = preview?;
        match self.state {
            SelectionState::Dragging { anchor, current, .. } => {
                Some(t.rect_to_viewport(anchor, current))
            }
            SelectionState::Committed(crop) => Some(t.crop_to_viewport(crop)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SelectionContext {
        let image = ImageSize::new(1000, 800);
        SelectionContext {
            image:    Some(image),
            preview:  PreviewTransform::compute(image, ImageSize::new(500, 500)),
            min_side: 10,
        }
    }

    fn crop(left: u32, top: u32, right: u32, bottom: u32) -> CropBox {
        CropBox {
            left,
            top,
            right,
            bottom,
        }
    }

    fn drag(selector: &mut CropSelector, from: (i32, i32), to: (i32, i32)) -> CropChange {
        let ctx = ctx();
        selector.handle(SelectionEvent::Arm, &ctx);
        selector.handle(SelectionEvent::pointer_down(ViewportPoint::new(from.0, from.1)), &ctx);
        selector.handle(SelectionEvent::pointer_move(ViewportPoint::new(to.0, to.1), true), &ctx);
        selector.handle(SelectionEvent::pointer_up(ViewportPoint::new(to.0, to.1)), &ctx)
    }

    #[test]
    fn test_arm_requires_image() {
        let mut ctx = ctx();
        ctx.image = None;
        let t = transition(&SelectionState::Idle, &SelectionEvent::Arm, &ctx);
        assert_eq!(t.state, SelectionState::Idle);
    }

    #[test]
    fn test_full_drag_commits() {
        let mut selector = CropSelector::new();
        let change = drag(&mut selector, (100, 50), (300, 250));
        assert_eq!(change, CropChange::Set(crop(200, 0, 600, 400)));
        assert_eq!(*selector.state(), SelectionState::Committed(crop(200, 0, 600, 400)));
    }

    #[test]
    fn test_reverse_drag_is_normalized() {
        let mut selector = CropSelector::new();
        drag(&mut selector, (300, 250), (100, 50));
        assert_eq!(selector.crop_box(), Some(crop(200, 0, 600, 400)));
    }

    #[test]
    fn test_small_drag_discarded() {
        let mut selector = CropSelector::new();
        // 4 viewport px = 8 image px at scale 0.5
        let change = drag(&mut selector, (100, 100), (104, 104));
        assert_eq!(change, CropChange::Cleared);
        assert_eq!(*selector.state(), SelectionState::Idle);
        assert_eq!(selector.crop_box(), None);
    }

    #[test]
    fn test_pointer_down_in_letterbox_dropped() {
        let ctx = ctx();
        let armed = SelectionState::Armed { previous: None };
        let t = transition(&armed, &SelectionEvent::PointerDown { x: 100, y: 10 }, &ctx);
        assert_eq!(t.state, armed);
    }

    #[test]
    fn test_move_without_primary_ignored() {
        let ctx = ctx();
        let state = SelectionState::Dragging {
            anchor:   ImagePoint::new(10.0, 10.0),
            current:  ImagePoint::new(20.0, 20.0),
            previous: None,
        };
        let event = SelectionEvent::pointer_move(ViewportPoint::new(400, 400), false);
        let t = transition(&state, &event, &ctx);
        assert_eq!(t.state, state);
    }

    #[test]
    fn test_move_updates_current_not_anchor() {
        let ctx = ctx();
        let anchor = ImagePoint::new(200.0, 100.0);
        let state = SelectionState::Dragging {
            anchor,
            current: anchor,
            previous: None,
        };
        let event = SelectionEvent::pointer_move(ViewportPoint::new(-50, 200), true);
        let t = transition(&state, &event, &ctx);
        match t.state {
            SelectionState::Dragging { anchor: a, current, .. } => {
                assert_eq!(a, anchor);
                assert_eq!(current, ImagePoint::new(0.0, 300.0));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_cancel_restores_previous_commit() {
        let mut selector = CropSelector::new();
        drag(&mut selector, (100, 50), (300, 250));
        let ctx = ctx();

        selector.handle(SelectionEvent::Arm, &ctx);
        assert_eq!(selector.crop_box(), Some(crop(200, 0, 600, 400)));
        selector.handle(SelectionEvent::pointer_down(ViewportPoint::new(10, 60)), &ctx);
        selector.handle(SelectionEvent::Cancel, &ctx);

        assert_eq!(*selector.state(), SelectionState::Committed(crop(200, 0, 600, 400)));
    }

    #[test]
    fn test_cancel_from_fresh_arm_goes_idle() {
        let ctx = ctx();
        let armed = SelectionState::Armed { previous: None };
        let t = transition(&armed, &SelectionEvent::Cancel, &ctx);
        assert_eq!(t.state, SelectionState::Idle);
        assert_eq!(t.crop, CropChange::Unchanged);
    }

    #[test]
    fn test_clear_only_from_committed() {
        let ctx = ctx();
        let committed = SelectionState::Committed(crop(0, 0, 10, 10));
        let t = transition(&committed, &SelectionEvent::Clear, &ctx);
        assert_eq!(t, Transition::to(SelectionState::Idle, CropChange::Cleared));

        let armed = SelectionState::Armed { previous: None };
        assert_eq!(transition(&armed, &SelectionEvent::Clear, &ctx).state, armed);
    }

    #[test]
    fn test_reset_from_every_state() {
        let ctx = ctx();
        let states = [
            SelectionState::Idle,
            SelectionState::Armed { previous: None },
            SelectionState::Dragging {
                anchor:   ImagePoint::new(1.0, 1.0),
                current:  ImagePoint::new(2.0, 2.0),
                previous: Some(crop(0, 0, 10, 10)),
            },
            SelectionState::Committed(crop(0, 0, 10, 10)),
        ];
        for state in states {
            let t = transition(&state, &SelectionEvent::Reset, &ctx);
            assert_eq!(t.state, SelectionState::Idle);
            assert_eq!(t.state.crop_box(), None);
        }
    }

    #[test]
    fn test_toggle_cycle() {
        let ctx = ctx();
        let mut selector = CropSelector::new();

        selector.toggle(&ctx);
        assert!(selector.state().is_selecting());
        selector.toggle(&ctx);
        assert_eq!(*selector.state(), SelectionState::Idle);

        drag(&mut selector, (100, 50), (300, 250));
        assert_eq!(selector.toggle(&ctx), CropChange::Cleared);
        assert_eq!(selector.crop_box(), None);
    }

    #[test]
    fn test_overlay() {
        let ctx = ctx();
        let mut selector = CropSelector::new();
        assert_eq!(selector.overlay(ctx.preview.as_ref()), None);

        selector.handle(SelectionEvent::Arm, &ctx);
        selector.handle(SelectionEvent::pointer_down(ViewportPoint::new(100, 50)), &ctx);
        // Zero-size drag still draws a 1x1 rectangle
        assert_eq!(
            selector.overlay(ctx.preview.as_ref()),
            Some(ViewportRect::new(100, 50, 1, 1))
        );

        selector.handle(SelectionEvent::pointer_move(ViewportPoint::new(300, 250), true), &ctx);
        selector.handle(SelectionEvent::pointer_up(ViewportPoint::new(300, 250)), &ctx);
        assert_eq!(
            selector.overlay(ctx.preview.as_ref()),
            Some(ViewportRect::new(100, 50, 200, 200))
        );
        assert_eq!(selector.overlay(None), None);
    }

    #[test]
    fn test_finalize_truncates() {
        let image = ImageSize::new(100, 100);
        let got =
            finalize_drag(ImagePoint::new(10.9, 20.2), ImagePoint::new(40.7, 60.99), image, 10);
        assert_eq!(got, Some(crop(10, 20, 40, 60)));
    }

    #[test]
    fn test_event_json() {
        let event: SelectionEvent =
            serde_json::from_str(r#"{"type":"pointer_move","x":3,"y":4}"#).unwrap();
        assert_eq!(event, SelectionEvent::pointer_move(ViewportPoint::new(3, 4), true));
        let event: SelectionEvent = serde_json::from_str(r#"{"type":"arm"}"#).unwrap();
        assert_eq!(event, SelectionEvent::Arm);
    }
}
