use glam::Vec2;

/// Pixel scroll distance that counts as one wheel notch.
pub const PIXELS_PER_LINE: f32 = 50.0;

/// A camera action produced from raw pointer input.
///
/// Controls consume actions, never raw window events, so the desktop app and
/// headless tests drive the camera the same way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    /// Orbit around the target by a pointer delta in pixels.
    Rotate { dx: f32, dy: f32 },
    /// Move the target by a pointer delta in pixels.
    Pan { dx: f32, dy: f32 },
    /// Dolly by wheel notches; positive moves towards the target.
    Dolly(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns button state plus cursor motion into [`ControlAction`]s.
///
/// Primary drag rotates, secondary drag pans, middle drag dollies.
#[derive(Debug, Default)]
pub struct PointerTracker {
    held: Option<PointerButton>,
    last: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Option<PointerButton> {
        self.held
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        if pressed {
            // First button wins until it is released.
            if self.held.is_none() {
                self.held = Some(button);
            }
        } else if self.held == Some(button) {
            self.held = None;
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<ControlAction> {
        let pos = Vec2::new(x, y);
        let prev = self.last.replace(pos)?;
        let delta = pos - prev;
        if delta == Vec2::ZERO {
            return None;
        }
        match self.held? {
            PointerButton::Primary => Some(ControlAction::Rotate {
                dx: delta.x,
                dy: delta.y,
            }),
            PointerButton::Secondary => Some(ControlAction::Pan {
                dx: delta.x,
                dy: delta.y,
            }),
            PointerButton::Middle => Some(ControlAction::Dolly(-delta.y.signum())),
        }
    }

    /// Wheel scroll in lines; scrolling up (positive) moves closer.
    pub fn wheel(&mut self, lines: f32) -> Option<ControlAction> {
        if lines == 0.0 {
            None
        } else {
            Some(ControlAction::Dolly(lines.signum()))
        }
    }

    /// Smooth (trackpad) scroll in pixels, converted to fractional notches.
    /// One event never exceeds a full notch.
    pub fn wheel_pixels(&mut self, pixels: f32) -> Option<ControlAction> {
        let steps = (pixels / PIXELS_PER_LINE).clamp(-1.0, 1.0);
        if steps == 0.0 || !steps.is_finite() {
            None
        } else {
            Some(ControlAction::Dolly(steps))
        }
    }

    pub fn cursor_left(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_without_button_is_ignored() {
        let mut t = PointerTracker::new();
        assert_eq!(t.cursor_moved(10.0, 10.0), None);
        assert_eq!(t.cursor_moved(20.0, 10.0), None);
    }

    #[test]
    fn primary_drag_rotates() {
        let mut t = PointerTracker::new();
        t.cursor_moved(10.0, 10.0);
        t.button(PointerButton::Primary, true);
        assert_eq!(
            t.cursor_moved(15.0, 8.0),
            Some(ControlAction::Rotate { dx: 5.0, dy: -2.0 })
        );
        t.button(PointerButton::Primary, false);
        assert_eq!(t.held(), None);
    }

    #[test]
    fn secondary_drag_pans() {
        let mut t = PointerTracker::new();
        t.button(PointerButton::Secondary, true);
        t.cursor_moved(0.0, 0.0);
        assert_eq!(
            t.cursor_moved(3.0, 4.0),
            Some(ControlAction::Pan { dx: 3.0, dy: 4.0 })
        );
    }

    #[test]
    fn first_button_wins() {
        let mut t = PointerTracker::new();
        t.button(PointerButton::Primary, true);
        t.button(PointerButton::Secondary, true);
        assert_eq!(t.held(), Some(PointerButton::Primary));
        t.button(PointerButton::Secondary, false);
        assert_eq!(t.held(), Some(PointerButton::Primary));
    }

    #[test]
    fn pixel_scroll_is_fractional() {
        let mut t = PointerTracker::new();
        assert_eq!(t.wheel_pixels(5.0), Some(ControlAction::Dolly(0.1)));
        assert_eq!(t.wheel_pixels(-25.0), Some(ControlAction::Dolly(-0.5)));
        assert_eq!(t.wheel_pixels(400.0), Some(ControlAction::Dolly(1.0)));
        assert_eq!(t.wheel_pixels(0.0), None);
    }

    #[test]
    fn wheel_and_middle_drag_dolly() {
        let mut t = PointerTracker::new();
        assert_eq!(t.wheel(2.0), Some(ControlAction::Dolly(1.0)));
        assert_eq!(t.wheel(-0.5), Some(ControlAction::Dolly(-1.0)));
        assert_eq!(t.wheel(0.0), None);

        t.button(PointerButton::Middle, true);
        t.cursor_moved(0.0, 0.0);
        assert_eq!(t.cursor_moved(0.0, -3.0), Some(ControlAction::Dolly(1.0)));
    }

    #[test]
    fn leaving_resets_anchor() {
        let mut t = PointerTracker::new();
        t.button(PointerButton::Primary, true);
        t.cursor_moved(0.0, 0.0);
        t.cursor_left();
        assert_eq!(t.cursor_moved(100.0, 100.0), None);
    }
}
