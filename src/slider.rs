//! Reveal-comparison control: two superimposed images, one clipped against the
//! other at a draggable divider.
//!
//! The transition function is pure and independent of any event-dispatch
//! mechanism; mouse and touch input are unified into [`PointerEvent`] at the
//! boundary. While a drag is active the embedding must listen for moves over
//! the entire input surface, not just the widget; [`CaptureChange`] tells it
//! exactly when to acquire and release that global subscription, and
//! [`CompareSlider::release`] covers the widget-disposal path.

/// Identifies one pointer sequence (a mouse button hold or a touch contact).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PointerId(pub u32);

/// Unified mouse/touch input, reduced to the horizontal axis the divider
/// tracks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { id: PointerId, x: f32 },
    Move { id: PointerId, x: f32 },
    Up { id: PointerId },
    Cancel { id: PointerId },
}

/// Horizontal placement of the widget within the input surface.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WidgetBounds {
    pub left: f32,
    pub width: f32,
}

impl WidgetBounds {
    pub fn new(left: f32, width: f32) -> Self {
        Self { left, width }
    }

    fn contains_x(&self, x: f32) -> bool {
        x >= self.left && x <= self.left + self.width
    }
}

/// What the embedding must do with its global move/up listeners after a
/// transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureChange {
    /// A drag began: subscribe to moves/ups over the whole input surface.
    Acquired,
    /// The drag ended: drop the global subscription.
    Released,
    Unchanged,
}

/// Derived presentation values for one frame of the widget.
///
/// The "before" image always renders at full widget width underneath; the
/// "after" image is clipped to `[0, after_clip_width]`, left-anchored; the
/// handle glyph is centered on the divider via a half-width offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderLayout {
    pub after_clip_width: f32,
    pub divider_x: f32,
    pub handle_left: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SliderState {
    pub position_percent: f32,
    pub dragging: bool,
}

/// The comparison slider state machine: `Idle` ⇄ `Dragging`.
#[derive(Clone, Debug)]
pub struct CompareSlider {
    position_percent: f32,
    active_pointer: Option<PointerId>,
}

impl Default for CompareSlider {
    fn default() -> Self {
        Self {
            position_percent: 50.0,
            active_pointer: None,
        }
    }
}

impl CompareSlider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position_percent(&self) -> f32 {
        self.position_percent
    }

    pub fn dragging(&self) -> bool {
        self.active_pointer.is_some()
    }

    pub fn state(&self) -> SliderState {
        SliderState {
            position_percent: self.position_percent,
            dragging: self.dragging(),
        }
    }

    /// Applies one pointer event.
    ///
    /// - `Down` within the widget bounds starts a drag and immediately
    ///   recomputes the position from the down coordinate. A second `Down`
    ///   while already dragging is ignored: one drag session at a time.
    /// - `Move` for the active pointer recomputes the position from any
    ///   coordinate, including ones outside the widget.
    /// - `Up`/`Cancel` for the active pointer ends the drag.
    /// - Events for other pointers are ignored.
    pub fn on_pointer(&mut self, event: PointerEvent, bounds: WidgetBounds) -> CaptureChange {
        match event {
            PointerEvent::Down { id, x } => {
                if self.active_pointer.is_some() || !bounds.contains_x(x) {
                    return CaptureChange::Unchanged;
                }
                self.active_pointer = Some(id);
                self.position_percent = position_from_x(x, bounds);
                CaptureChange::Acquired
            }
            PointerEvent::Move { id, x } => {
                if self.active_pointer != Some(id) {
                    return CaptureChange::Unchanged;
                }
                self.position_percent = position_from_x(x, bounds);
                CaptureChange::Unchanged
            }
            PointerEvent::Up { id } | PointerEvent::Cancel { id } => {
                if self.active_pointer != Some(id) {
                    return CaptureChange::Unchanged;
                }
                self.active_pointer = None;
                CaptureChange::Released
            }
        }
    }

    /// Ends any active drag; the widget-disposal path for the global capture.
    pub fn release(&mut self) -> CaptureChange {
        if self.active_pointer.take().is_some() {
            CaptureChange::Released
        } else {
            CaptureChange::Unchanged
        }
    }

    pub fn layout(&self, bounds: WidgetBounds, handle_glyph_width: f32) -> SliderLayout {
        let after_clip_width = bounds.width * self.position_percent / 100.0;
        let divider_x = bounds.left + after_clip_width;
        SliderLayout {
            after_clip_width,
            divider_x,
            handle_left: divider_x - handle_glyph_width / 2.0,
        }
    }
}

/// `clamp(0, 100, (x − left) / width × 100)`.
fn position_from_x(x: f32, bounds: WidgetBounds) -> f32 {
    if bounds.width <= 0.0 {
        return 0.0;
    }
    ((x - bounds.left) / bounds.width * 100.0).clamp(0.0, 100.0)
}
