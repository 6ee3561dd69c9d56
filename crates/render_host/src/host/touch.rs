//! Finger tracking for touch camera control
//!
//! One finger down drags the camera view like the mouse. As soon as a second
//! finger touches, the whole gesture becomes a pinch: the change in distance
//! between the first two tracked fingers moves the camera forward or back,
//! and looking stays suppressed until only one finger remains.

use crate::events::TouchPhase;
use crate::foundation::math::Vec2;

/// Fingers tracked at once; further fingers are ignored
pub const MAX_FINGERS: usize = 5;

/// Camera motion derived from one touch event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchGesture {
    /// Nothing to apply
    None,
    /// Single-finger drag, in pixels; `dy` is positive upward
    Look {
        /// Horizontal drag
        dx: f32,
        /// Vertical drag
        dy: f32,
    },
    /// Change in finger spread, in pixels; positive when spreading
    Pinch {
        /// Spread delta
        delta: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Finger {
    id: u64,
    position: Vec2,
}

/// Tracked fingers for the current window
#[derive(Debug, Clone, Default)]
pub struct FingerTrackState {
    fingers: Vec<Finger>,
    spread: Option<f32>,
}

impl FingerTrackState {
    /// Empty tracker
    pub fn new() -> Self {
        Self {
            fingers: Vec::with_capacity(MAX_FINGERS),
            spread: None,
        }
    }

    /// Fingers currently down
    pub fn active(&self) -> usize {
        self.fingers.len()
    }

    /// Whether more than one finger is down
    pub fn is_multi_touch(&self) -> bool {
        self.fingers.len() > 1
    }

    /// Forget every finger
    pub fn clear(&mut self) {
        self.fingers.clear();
        self.spread = None;
    }

    /// Feed one touch event and get the resulting gesture
    pub fn handle(&mut self, phase: TouchPhase, id: u64, x: f32, y: f32) -> TouchGesture {
        let position = Vec2::new(x, y);
        match phase {
            TouchPhase::Down => {
                let tracked = self.fingers.len();
                match self.fingers.iter_mut().find(|finger| finger.id == id) {
                    Some(finger) => finger.position = position,
                    None if tracked < MAX_FINGERS => self.fingers.push(Finger { id, position }),
                    None => {
                        log::trace!("ignoring finger {id}: {MAX_FINGERS} already tracked");
                        return TouchGesture::None;
                    }
                }
                self.spread = self.current_spread();
                TouchGesture::None
            }
            TouchPhase::Moved => {
                let Some(index) = self.fingers.iter().position(|finger| finger.id == id) else {
                    return TouchGesture::None;
                };
                let previous = std::mem::replace(&mut self.fingers[index].position, position);

                if self.is_multi_touch() {
                    let (Some(before), Some(after)) = (self.spread, self.current_spread()) else {
                        return TouchGesture::None;
                    };
                    self.spread = Some(after);
                    if index > 1 {
                        return TouchGesture::None;
                    }
                    TouchGesture::Pinch { delta: after - before }
                } else {
                    TouchGesture::Look {
                        dx: position.x - previous.x,
                        dy: previous.y - position.y,
                    }
                }
            }
            TouchPhase::Up | TouchPhase::Cancelled => {
                self.fingers.retain(|finger| finger.id != id);
                self.spread = self.current_spread();
                TouchGesture::None
            }
        }
    }

    fn current_spread(&self) -> Option<f32> {
        match self.fingers.as_slice() {
            [first, second, ..] => Some((first.position - second.position).norm()),
            _ => None,
        }
    }
}
