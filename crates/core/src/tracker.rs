//! Pointer tracking state machine for one tilted element.
//!
//! The tracker is host-agnostic: each pointer event returns the
//! [`TiltEffect`]s the host must perform (set a transition, request an
//! animation frame, arm or cancel the reset timer, write a transform). The
//! host feeds animation frames and timer expiry back in.
//!
//! ```text
//!  Idle --enter--> Tracking --leave--> Settling --reset elapsed--> Idle
//!                     ^                    |
//!                     +-------enter--------+
//! ```
//!
//! At most one frame request is outstanding at a time. Moves that arrive
//! while a frame is pending only replace the sample the frame will use.

use crate::config::TiltConfig;
use crate::depth::DepthMarker;
use crate::tilt::{PointerSample, Transform};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TiltPhase {
    #[default]
    Idle,
    Tracking,
    /// Pointer left; waiting for the reset timer.
    Settling,
}

/// Where depth-marked descendants should sit.
#[derive(Debug, Clone, PartialEq)]
pub enum DepthPose {
    /// At their declared depth.
    Raised,
    /// Back at zero, animated with the given CSS transition.
    Lowered { transition: String },
}

/// A transform write for the element and its depth-marked descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct TiltUpdate {
    pub transform: Transform,
    pub depth: DepthPose,
}

impl TiltUpdate {
    pub fn element_css(&self) -> String {
        self.transform.css()
    }

    pub fn depth_css(&self, marker: &DepthMarker) -> String {
        marker.css(matches!(self.depth, DepthPose::Raised))
    }

    /// Transition to set on descendants before writing [`TiltUpdate::depth_css`].
    pub fn depth_transition(&self) -> Option<&str> {
        match &self.depth {
            DepthPose::Raised => None,
            DepthPose::Lowered { transition } => Some(transition),
        }
    }
}

/// Work the host must perform in response to a tracker call.
#[derive(Debug, Clone, PartialEq)]
pub enum TiltEffect {
    /// Set the element's CSS `transition`.
    SetTransition(String),
    /// Call [`TiltTracker::frame`] on the next animation frame.
    RequestFrame,
    /// Call [`TiltTracker::reset_elapsed`] after this many milliseconds.
    ScheduleReset { after_ms: u32 },
    /// Drop the pending reset timer.
    CancelReset,
    Apply(TiltUpdate),
}

#[derive(Debug, Clone)]
pub struct TiltTracker {
    config: TiltConfig,
    phase: TiltPhase,
    sample: PointerSample,
    frame_pending: bool,
}

impl TiltTracker {
    pub fn new(config: TiltConfig) -> Self {
        Self {
            config,
            phase: TiltPhase::Idle,
            sample: PointerSample::NEUTRAL,
            frame_pending: false,
        }
    }

    pub fn phase(&self) -> TiltPhase {
        self.phase
    }

    pub fn is_frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// The sample the next frame will use.
    pub fn latest_sample(&self) -> PointerSample {
        self.sample
    }

    pub fn pointer_enter(&mut self) -> Vec<TiltEffect> {
        let mut effects = Vec::with_capacity(3);
        if self.phase == TiltPhase::Settling {
            effects.push(TiltEffect::CancelReset);
        }
        self.phase = TiltPhase::Tracking;
        effects.push(TiltEffect::SetTransition(self.config.transition()));
        effects.extend(self.request_frame());
        effects
    }

    /// Records `sample` and requests a frame unless one is already pending.
    ///
    /// Ignored outside [`TiltPhase::Tracking`].
    pub fn pointer_move(&mut self, sample: PointerSample) -> Vec<TiltEffect> {
        if self.phase != TiltPhase::Tracking {
            return Vec::new();
        }
        self.sample = sample;
        self.request_frame().into_iter().collect()
    }

    pub fn pointer_leave(&mut self) -> Vec<TiltEffect> {
        if self.phase != TiltPhase::Tracking {
            return Vec::new();
        }
        self.phase = TiltPhase::Settling;
        log::debug!("tilt settling in {}ms", self.config.speed_ms);
        vec![
            TiltEffect::SetTransition(self.config.transition()),
            TiltEffect::ScheduleReset {
                after_ms: self.config.speed_ms,
            },
        ]
    }

    /// Consumes the pending frame request and emits the tilt for the
    /// latest sample while tracking.
    pub fn frame(&mut self) -> Vec<TiltEffect> {
        self.frame_pending = false;
        if self.phase != TiltPhase::Tracking {
            return Vec::new();
        }
        vec![TiltEffect::Apply(TiltUpdate {
            transform: Transform::tilted(&self.sample, &self.config),
            depth: DepthPose::Raised,
        })]
    }

    /// Emits the neutral transform once the leave delay has passed.
    ///
    /// A stale timer (the pointer came back in the meantime) is ignored.
    pub fn reset_elapsed(&mut self) -> Vec<TiltEffect> {
        if self.phase != TiltPhase::Settling {
            return Vec::new();
        }
        self.phase = TiltPhase::Idle;
        vec![TiltEffect::Apply(TiltUpdate {
            transform: Transform::neutral(&self.config),
            depth: DepthPose::Lowered {
                transition: self.config.transition(),
            },
        })]
    }

    fn request_frame(&mut self) -> Option<TiltEffect> {
        if self.frame_pending {
            return None;
        }
        self.frame_pending = true;
        Some(TiltEffect::RequestFrame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilt::TiltAngles;

    fn tracker() -> TiltTracker {
        TiltTracker::new(TiltConfig::default())
    }

    fn sample(x: f64, y: f64) -> PointerSample {
        PointerSample {
            x,
            y,
            width: 100.0,
            height: 100.0,
        }
    }

    fn count_frame_requests(effects: &[TiltEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, TiltEffect::RequestFrame))
            .count()
    }

    fn applied(effects: &[TiltEffect]) -> &TiltUpdate {
        match effects {
            [TiltEffect::Apply(update)] => update,
            other => panic!("expected a single Apply, got {other:?}"),
        }
    }

    #[test]
    fn starts_idle_without_pending_frame() {
        let t = tracker();
        assert_eq!(t.phase(), TiltPhase::Idle);
        assert!(!t.is_frame_pending());
    }

    #[test]
    fn enter_sets_transition_and_requests_frame() {
        let mut t = tracker();
        let fx = t.pointer_enter();
        assert_eq!(
            fx,
            vec![
                TiltEffect::SetTransition("transform 1000ms cubic-bezier(.03,.98,.52,.99)".into()),
                TiltEffect::RequestFrame,
            ]
        );
        assert_eq!(t.phase(), TiltPhase::Tracking);
    }

    #[test]
    fn move_while_idle_is_ignored() {
        let mut t = tracker();
        assert!(t.pointer_move(sample(10.0, 10.0)).is_empty());
        assert_eq!(t.latest_sample(), PointerSample::NEUTRAL);
        assert!(!t.is_frame_pending());
    }

    #[test]
    fn moves_within_one_frame_coalesce_to_latest_sample() {
        let mut t = tracker();
        let mut effects = t.pointer_enter();
        t.frame();

        for (x, y) in [(10.0, 10.0), (20.0, 30.0), (0.0, 100.0)] {
            effects.extend(t.pointer_move(sample(x, y)));
        }
        // one request from enter, one for the burst of moves
        assert_eq!(count_frame_requests(&effects), 2);

        let fx = t.frame();
        let update = applied(&fx);
        assert_eq!(
            update.transform.angles,
            TiltAngles {
                rotate_x: 10.0,
                rotate_y: 10.0
            }
        );
        assert_eq!(update.depth, DepthPose::Raised);
    }

    #[test]
    fn burst_of_moves_requests_exactly_one_frame() {
        let mut t = tracker();
        t.pointer_enter();
        t.frame();
        let requests: usize = (0..50)
            .map(|i| count_frame_requests(&t.pointer_move(sample(i as f64, 0.0))))
            .sum();
        assert_eq!(requests, 1);
        assert!(t.is_frame_pending());
    }

    #[test]
    fn next_move_after_frame_requests_again() {
        let mut t = tracker();
        t.pointer_enter();
        t.frame();
        assert_eq!(count_frame_requests(&t.pointer_move(sample(1.0, 1.0))), 1);
        t.frame();
        assert_eq!(count_frame_requests(&t.pointer_move(sample(2.0, 2.0))), 1);
    }

    #[test]
    fn leave_schedules_reset_after_transition() {
        let mut t = TiltTracker::new(TiltConfig {
            speed_ms: 250,
            ..TiltConfig::default()
        });
        t.pointer_enter();
        let fx = t.pointer_leave();
        assert!(fx.contains(&TiltEffect::ScheduleReset { after_ms: 250 }));
        assert_eq!(t.phase(), TiltPhase::Settling);
    }

    #[test]
    fn reset_returns_neutral_and_lowers_depth_markers() {
        let mut t = TiltTracker::new(TiltConfig {
            scale: 1.1,
            ..TiltConfig::default()
        });
        t.pointer_enter();
        t.pointer_move(sample(0.0, 0.0));
        t.frame();
        t.pointer_leave();

        let fx = t.reset_elapsed();
        let update = applied(&fx);
        assert!(update.transform.is_neutral());
        assert_eq!(update.transform.scale, 1.0);
        let marker = DepthMarker { depth_px: 40 };
        assert_eq!(update.depth_css(&marker), "translateZ(0)");
        assert_eq!(
            update.depth_transition(),
            Some("transform 1000ms cubic-bezier(.03,.98,.52,.99)")
        );
        assert_eq!(t.phase(), TiltPhase::Idle);
    }

    #[test]
    fn frame_after_leave_writes_nothing() {
        let mut t = tracker();
        t.pointer_enter();
        t.pointer_leave();
        assert!(t.frame().is_empty());
        assert!(!t.is_frame_pending());
    }

    #[test]
    fn move_after_leave_is_ignored() {
        let mut t = tracker();
        t.pointer_enter();
        t.frame();
        t.pointer_leave();
        assert!(t.pointer_move(sample(5.0, 5.0)).is_empty());
    }

    #[test]
    fn reenter_while_settling_cancels_reset() {
        let mut t = tracker();
        t.pointer_enter();
        t.frame();
        t.pointer_leave();
        let fx = t.pointer_enter();
        assert_eq!(fx.first(), Some(&TiltEffect::CancelReset));
        assert_eq!(t.phase(), TiltPhase::Tracking);
        assert!(t.reset_elapsed().is_empty(), "stale reset must not flatten the card");
    }

    #[test]
    fn reset_without_leave_is_ignored() {
        let mut t = tracker();
        assert!(t.reset_elapsed().is_empty());
        t.pointer_enter();
        assert!(t.reset_elapsed().is_empty());
    }

    #[test]
    fn raised_update_uses_marker_depth() {
        let update = TiltUpdate {
            transform: Transform::neutral(&TiltConfig::default()),
            depth: DepthPose::Raised,
        };
        assert_eq!(update.depth_css(&DepthMarker { depth_px: 12 }), "translateZ(12px)");
        assert_eq!(update.depth_transition(), None);
    }

    #[test]
    fn zero_sized_element_tilts_flat() {
        let mut t = tracker();
        t.pointer_enter();
        t.frame();
        t.pointer_move(PointerSample {
            x: 5.0,
            y: 5.0,
            width: 0.0,
            height: 0.0,
        });
        let fx = t.frame();
        assert_eq!(applied(&fx).transform.angles, TiltAngles::default());
    }
}
