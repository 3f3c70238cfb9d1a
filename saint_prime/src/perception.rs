//! Landmark sources — LeapMotion hardware or keyboard/mouse simulation.
//!
//! The public interface is a [`TimedFrame`] delivered over a `mpsc`
//! channel, stamped when the source produced it.  The render loop is the single consumer and drains it every
//! tick, so the session is only ever touched from one thread.  Sources run
//! at their own cadence, independent of the render rate.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use saint_core::landmarks::poses;
use saint_core::{PerceptionFrame, Point};
use tracing::{debug, info};

/// Nominal camera cadence for the simulator (~30 fps).
pub const SIM_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Pinch gap used when the simulator starts pinching.
const SIM_DEFAULT_GAP: f32 = 0.05;
/// Widest simulated pinch; just inside the default pinch threshold.
const SIM_MAX_GAP:     f32 = 0.079;

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// One perception result and the instant its source produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedFrame {
    pub at:    Instant,
    pub frame: PerceptionFrame,
}

impl TimedFrame {
    pub fn now(frame: PerceptionFrame) -> Self {
        TimedFrame { at: Instant::now(), frame }
    }
}

/// Anything that can deliver [`PerceptionFrame`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TimedFrame>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<TimedFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library.
///
/// The first tracked hand is flattened onto the camera plane: Leap `x`
/// (mm, user's right positive) and `y` (mm above the device) are mapped
/// into `[0,1]²` over a 500 mm box.  `x` is pre-mirrored so the cursor,
/// which mirrors again, follows the hand.  Frames without a hand become
/// [`PerceptionFrame::Absent`].
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<TimedFrame>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                tracing::error!(error = ?e, "failed to create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            tracing::error!(error = ?e, "failed to open LeapMotion device");
            return;
        }
        info!("LeapMotion landmark source started");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(e) => {
                    tracing::warn!(error = ?e, "leap poll failed");
                    continue;
                }
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<_> = frame.hands().collect();
                let out = match hands.first() {
                    Some(hand) => PerceptionFrame::Hand(leap_hand_to_sample(hand)),
                    None       => PerceptionFrame::Absent,
                };
                if tx.send(TimedFrame::now(out)).is_err() { return; }
            }
        }
    }
}

/// Map a Leap position (mm, device-relative) into the unit square.
///
/// The box spans 500 mm, centred left/right and starting 50 mm above the
/// device.  Hands outside the box pin to its edge.
pub fn leap_to_unit(x_mm: f32, y_mm: f32) -> Point {
    const HALF_SPAN: f32 = 250.0;
    const FLOOR:     f32 = 50.0;
    const SPAN:      f32 = 500.0;

    Point::new(
        (1.0 - (x_mm + HALF_SPAN) / SPAN).clamp(0.0, 1.0),
        (1.0 - (y_mm - FLOOR) / SPAN).clamp(0.0, 1.0),
    )
}

#[cfg(feature = "leap")]
fn leap_hand_to_sample(hand: &leaprs::Hand) -> saint_core::LandmarkSample {
    use saint_core::landmarks::LANDMARK_COUNT;

    let norm = leap_to_unit;

    let mut pts = [Point::ZERO; LANDMARK_COUNT];
    let digits: Vec<_> = hand.digits().collect();
    if let Some(middle) = digits.get(2) {
        let w = middle.metacarpal().prev_joint();
        pts[0] = norm(w.x, w.y);
    }
    for (f, digit) in digits.iter().take(5).enumerate() {
        let joints = [
            digit.metacarpal().next_joint(),
            digit.proximal().next_joint(),
            digit.intermediate().next_joint(),
            digit.distal().next_joint(),
        ];
        for (k, j) in joints.iter().enumerate() {
            pts[1 + f * 4 + k] = norm(j.x, j.y);
        }
    }
    saint_core::LandmarkSample::new(pts)
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Hand shape the simulator should synthesise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPose {
    Absent,
    OpenPalm,
    Pointing,
    Pinch,
    Fist,
}

/// Raw input from the window, forwarded to the simulator thread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse position as a fraction of the window, unmirrored.
    Pointer(Point),
    Pose(SimPose),
    /// Widen (positive) or narrow the simulated pinch gap.
    PinchDelta(f32),
    Quit,
}

/// Synthesises landmark samples from [`SimInput`] at camera cadence.
///
/// The window sends `SimInput` events here; this thread turns the current
/// pointer/pose state into a [`PerceptionFrame`] every
/// [`SIM_FRAME_INTERVAL`], so the session sees the same decoupled feed a
/// camera would produce.
pub struct SimLandmarkSource {
    pub rx:       Receiver<SimInput>,
    pub interval: Duration,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkSource { rx, interval: SIM_FRAME_INTERVAL }
    }
}

/// Simulator state between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    pub pointer: Point,
    pub pose:    SimPose,
    pub gap:     f32,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { pointer: Point::new(0.5, 0.5), pose: SimPose::Absent, gap: SIM_DEFAULT_GAP }
    }
}

impl SimHand {
    /// Fold one input into the state.  Returns false on `Quit`.
    pub fn apply(&mut self, input: SimInput) -> bool {
        match input {
            SimInput::Pointer(p)     => self.pointer = p,
            SimInput::Pose(pose)     => {
                if pose == SimPose::Pinch && self.pose != SimPose::Pinch {
                    self.gap = SIM_DEFAULT_GAP;
                }
                self.pose = pose;
            }
            SimInput::PinchDelta(d)  => self.gap = (self.gap + d).clamp(0.0, SIM_MAX_GAP),
            SimInput::Quit           => return false,
        }
        true
    }

    /// The frame a camera would report for this state.
    pub fn frame(&self) -> PerceptionFrame {
        // Pre-mirror so the derived cursor lands under the mouse.
        let tip = Point::new(1.0 - self.pointer.x, self.pointer.y);
        let sample = match self.pose {
            SimPose::Absent   => return PerceptionFrame::Absent,
            SimPose::OpenPalm => poses::open_palm(tip),
            SimPose::Pointing => poses::pointing(tip),
            SimPose::Pinch    => poses::pinch(tip, self.gap),
            SimPose::Fist     => poses::fist(tip),
        };
        PerceptionFrame::Hand(sample)
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<TimedFrame>) {
        info!(interval_ms = self.interval.as_millis() as u64, "simulated landmark source started");
        let mut hand = SimHand::default();
        let mut next_emit = Instant::now();

        loop {
            let wait = next_emit.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(wait) {
                Ok(input) => {
                    if !hand.apply(input) {
                        debug!("simulator quitting");
                        return;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Timeout)      => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }

            if tx.send(TimedFrame::now(hand.frame())).is_err() { return; }
            next_emit += self.interval;
            // Don't try to catch up after a stall.
            let now = Instant::now();
            if next_emit < now { next_emit = now + self.interval; }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saint_core::{GestureFeatures, Mode, SessionConfig, ViewportSize};
    use saint_core::classifier::decide_mode;

    fn mode_of(hand: &SimHand) -> Option<Mode> {
        let vp = ViewportSize::new(800.0, 600.0);
        let cfg = SessionConfig::default();
        hand.frame().sample().map(|s| decide_mode(&GestureFeatures::extract(s, vp, &cfg), false, &cfg))
    }

    #[test]
    fn poses_map_to_modes() {
        let mut hand = SimHand::default();
        assert_eq!(mode_of(&hand), None);
        for (pose, mode) in [
            (SimPose::OpenPalm, Mode::Standby),
            (SimPose::Pointing, Mode::Draw),
            (SimPose::Pinch,    Mode::Zoom),
            (SimPose::Fist,     Mode::Animate),
        ] {
            hand.apply(SimInput::Pose(pose));
            assert_eq!(mode_of(&hand), Some(mode), "{pose:?}");
        }
    }

    #[test]
    fn cursor_follows_pointer() {
        let mut hand = SimHand::default();
        hand.apply(SimInput::Pose(SimPose::Pointing));
        hand.apply(SimInput::Pointer(Point::new(0.25, 0.75)));
        let vp = ViewportSize::new(800.0, 600.0);
        let f = GestureFeatures::extract(hand.frame().sample().unwrap(), vp, &SessionConfig::default());
        assert!((f.cursor.x - 200.0).abs() < 1e-3);
        assert!((f.cursor.y - 450.0).abs() < 1e-3);
    }

    #[test]
    fn pinch_gap_stays_below_threshold() {
        let mut hand = SimHand::default();
        hand.apply(SimInput::Pose(SimPose::Pinch));
        for _ in 0..100 { hand.apply(SimInput::PinchDelta(0.01)); }
        assert!(hand.gap < 0.08);
        for _ in 0..100 { hand.apply(SimInput::PinchDelta(-0.01)); }
        assert_eq!(hand.gap, 0.0);
    }

    #[test]
    fn leap_positions_stay_in_unit_square() {
        let centre = leap_to_unit(0.0, 300.0);
        assert!((centre.x - 0.5).abs() < 1e-6 && (centre.y - 0.5).abs() < 1e-6);
        // x is pre-mirrored: the user's right maps toward 0.
        assert!(leap_to_unit(100.0, 300.0).x < 0.5);
        for (x, y) in [(-900.0, 0.0), (900.0, 1200.0), (0.0, -40.0)] {
            let p = leap_to_unit(x, y);
            assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y), "{p:?}");
        }
        assert_eq!(leap_to_unit(-900.0, 1200.0), Point::new(1.0, 0.0));
    }

    #[test]
    fn quit_stops_simulator() {
        let (tx, rx) = mpsc::channel();
        let frames = spawn_landmark_source(SimLandmarkSource {
            rx,
            interval: Duration::from_millis(1),
        });
        tx.send(SimInput::Pose(SimPose::Pointing)).unwrap();
        // At least one frame arrives, then the source shuts down on Quit.
        let first = frames.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(first.frame, PerceptionFrame::Hand(_) | PerceptionFrame::Absent));
        let second = frames.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(second.at >= first.at);
        tx.send(SimInput::Quit).unwrap();
        while frames.recv_timeout(Duration::from_secs(2)).is_ok() {}
    }
}
