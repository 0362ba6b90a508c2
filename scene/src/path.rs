//! The scripted camera path of the campus tour.
//!
//! The tour is a list of consecutive time segments. Each segment owns the formulas for the eye
//! and target components, which are polynomials of at most second degree in path time.
use cgmath::{Point3, Vector3};
use serde::Deserialize;

use crate::camera::CameraSample;

/// Upper bounds of the tour's time segments, in path time units.
pub const BREAKPOINTS: [f32; 15] = [
    25.0, 45.0, 55.0, 75.0, 80.0, 85.0, 100.0, 120.0, 145.0, 170.0, 210.0, 260.0, 290.0, 330.0, 500.0,
];

/// What the path does once time runs past its last segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathEnd {
    /// Freeze on the pose at the end of the last segment.
    #[default]
    Hold,
    /// Keep evaluating the last segment's formulas.
    Extrapolate,
}

/// A single camera coordinate as a function of path time `t`, with `d = t - origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Poly {
    Constant(f32),
    /// `base + rate * d`
    Linear { base: f32, origin: f32, rate: f32 },
    /// `base + curvature * d * d`
    Quadratic { base: f32, origin: f32, curvature: f32 },
    /// `base + d * (d * curvature + rate)`
    Horner { base: f32, origin: f32, rate: f32, curvature: f32 },
}

impl Poly {
    pub fn eval(&self, t: f32) -> f32 {
        match *self {
            Poly::Constant(c) => c,
            Poly::Linear { base, origin, rate } => base + (t - origin) * rate,
            Poly::Quadratic { base, origin, curvature } => {
                let d = t - origin;
                base + curvature * d * d
            }
            Poly::Horner { base, origin, rate, curvature } => {
                let d = t - origin;
                base + d * (d * curvature + rate)
            }
        }
    }
}

const fn c(value: f32) -> Poly {
    Poly::Constant(value)
}

const fn lin(base: f32, origin: f32, rate: f32) -> Poly {
    Poly::Linear { base, origin, rate }
}

const fn quad(base: f32, origin: f32, curvature: f32) -> Poly {
    Poly::Quadratic { base, origin, curvature }
}

const fn horner(base: f32, origin: f32, rate: f32, curvature: f32) -> Poly {
    Poly::Horner { base, origin, rate, curvature }
}

/// A half-open time window `[previous end, end)` with its camera formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSegment {
    pub end: f32,
    pub eye: [Poly; 3],
    pub target: [Poly; 3],
    pub up: [f32; 3],
}

impl TimeSegment {
    pub const fn new(end: f32, eye: [Poly; 3], target: [Poly; 3]) -> Self {
        Self {
            end,
            eye,
            target,
            up: [0.0, 1.0, 0.0],
        }
    }

    /// Evaluates this segment's formulas at `t`, regardless of whether `t` lies inside the window.
    pub fn sample(&self, t: f32) -> CameraSample {
        let [ex, ey, ez] = self.eye;
        let [tx, ty, tz] = self.target;
        CameraSample {
            eye: Point3::new(ex.eval(t), ey.eval(t), ez.eval(t)),
            target: Point3::new(tx.eval(t), ty.eval(t), tz.eval(t)),
            up: Vector3::from(self.up),
        }
    }
}

/// Piecewise camera path mapping path time to a [`CameraSample`].
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPath {
    segments: Vec<TimeSegment>,
    end: PathEnd,
}

impl CameraPath {
    /// Creates a path from segments ordered by strictly increasing end time.
    pub fn new(segments: Vec<TimeSegment>, end: PathEnd) -> Result<Self, String> {
        if segments.is_empty() {
            return Err("Camera path needs at least one segment".to_string());
        }
        if segments.windows(2).any(|w| !(w[0].end < w[1].end)) {
            return Err("Camera path segment ends must be strictly increasing".to_string());
        }
        Ok(Self { segments, end })
    }

    /// The fixed campus tour.
    pub fn campus_tour() -> Self {
        let [b0, b1, b2, b3, b4, b5, b6, b7, b8, b9, b10, b11, b12, b13, b14] = BREAKPOINTS;
        let segments = vec![
            TimeSegment::new(b0,
                [lin(20.0, 0.0, 1.0), c(5.0), quad(35.0, 15.0, -0.05)],
                [c(30.0), c(0.0), c(10.0)]),
            TimeSegment::new(b1,
                [quad(50.0, 35.0, -0.05), c(5.0), lin(30.0, 25.0, -1.0)],
                [lin(30.0, 25.0, -0.5), c(0.0), lin(10.0, 25.0, -0.3)]),
            TimeSegment::new(b2,
                [lin(45.0, 45.0, -1.2), c(5.0), quad(5.0, 55.0, 0.05)],
                [lin(20.0, 45.0, -0.5), c(0.0), lin(4.0, 45.0, -0.3)]),
            TimeSegment::new(b3,
                [lin(33.0, 55.0, -1.2), lin(5.0, 55.0, -0.2), c(5.0)],
                [lin(15.0, 55.0, -0.5), lin(0.0, 55.0, 0.03), c(1.0)]),
            TimeSegment::new(b4,
                [lin(9.0, 75.0, -1.2), lin(1.0, 75.0, -0.1), quad(5.0, 75.0, -0.1)],
                [lin(5.0, 75.0, -0.8), c(0.6), lin(1.0, 75.0, -0.5)]),
            TimeSegment::new(b5,
                [quad(0.5, 85.0, 0.1), c(0.5), lin(2.5, 80.0, -1.0)],
                [c(1.0), c(0.6), lin(-1.5, 80.0, -0.5)]),
            TimeSegment::new(b6,
                [c(0.5), c(0.5), lin(-2.5, 85.0, -1.0)],
                [lin(1.0, 85.0, 0.2), c(0.6), lin(-4.0, 85.0, -2.0)]),
            TimeSegment::new(b7,
                [quad(0.5, 100.0, 0.04), lin(0.5, 100.0, 0.05), lin(-17.5, 100.0, -1.0)],
                [lin(4.0, 100.0, 0.25), lin(0.6, 100.0, 0.045), lin(-34.0, 100.0, -1.0)]),
            TimeSegment::new(b8,
                [lin(16.5, 120.0, 0.8), lin(1.5, 120.0, 0.1), quad(-50.0, 145.0, 0.02)],
                [lin(9.0, 120.0, 0.5), lin(1.5, 120.0, 0.1), quad(-72.0, 150.0, 0.02)]),
            TimeSegment::new(b9,
                [lin(36.5, 145.0, 0.8), c(4.0), quad(-50.0, 145.0, 0.04)],
                [lin(22.0, 145.0, 1.5), c(4.0), c(-72.0)]),
            TimeSegment::new(b10,
                [lin(56.5, 170.0, 0.8), c(4.0), quad(15.0, 210.0, -0.025)],
                [lin(60.0, 170.0, 0.5), c(4.0), c(-72.0)]),
            TimeSegment::new(b11,
                [lin(88.5, 210.0, 0.8), c(4.0), quad(15.0, 210.0, -0.01)],
                [lin(80.0, 210.0, -0.4), c(4.0), lin(-72.0, 210.0, 0.4)]),
            TimeSegment::new(b12,
                [quad(131.2, 266.0, -0.075), c(4.0), lin(-10.0, 260.0, -1.0)],
                [lin(60.0, 260.0, -0.5), c(4.0), lin(-52.0, 260.0, 0.4)]),
            TimeSegment::new(b13,
                [quad(7.0, 335.0, 0.04), horner(4.0, 290.0, 0.5, 0.01), quad(-65.0, 340.0, 0.01)],
                [lin(45.0, 290.0, -0.5), c(4.0), lin(-40.0, 290.0, 0.4)]),
            TimeSegment::new(b14,
                [lin(8.0, 330.0, -0.4), horner(40.0, 330.0, 0.9, 0.02), lin(-64.0, 330.0, -0.2)],
                [c(25.0), c(4.0), c(-24.0)]),
        ];
        Self { segments, end: PathEnd::Hold }
    }

    pub fn with_end(mut self, end: PathEnd) -> Self {
        self.end = end;
        self
    }

    pub fn segments(&self) -> &[TimeSegment] {
        &self.segments
    }

    pub fn end_policy(&self) -> PathEnd {
        self.end
    }

    /// Path time at which the last segment ends.
    pub fn duration(&self) -> f32 {
        self.segments.last().map_or(0.0, |s| s.end)
    }

    /// Index of the first segment whose end lies after `t`, or `None` once the path has run out.
    ///
    /// A time equal to a breakpoint belongs to the later segment. Times before zero fall into the
    /// first segment.
    pub fn segment_index(&self, t: f32) -> Option<usize> {
        let index = self.segments.partition_point(|s| !(t < s.end));
        (index < self.segments.len()).then_some(index)
    }

    /// Camera sample at path time `t`.
    pub fn evaluate(&self, t: f32) -> CameraSample {
        match self.segment_index(t) {
            Some(index) => self.segments[index].sample(t),
            None => {
                let last = &self.segments[self.segments.len() - 1];
                match self.end {
                    PathEnd::Hold => last.sample(last.end),
                    PathEnd::Extrapolate => last.sample(t),
                }
            }
        }
    }
}

impl Default for CameraPath {
    fn default() -> Self {
        Self::campus_tour()
    }
}

/// Remembers the active segment between frames and logs every change.
#[derive(Debug, Default)]
pub struct SegmentTracker {
    current: Option<Option<usize>>,
}

impl SegmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the segment active at `t`. Returns `true` when it differs from the previous call.
    pub fn observe(&mut self, path: &CameraPath, t: f32) -> bool {
        let index = path.segment_index(t);
        if self.current == Some(index) {
            return false;
        }
        self.current = Some(index);
        match index {
            Some(i) => {
                let sample = path.segments[i].sample(t);
                log::debug!(
                    "Camera segment {} of {} entered at t = {:.2}, eye {:?}, target {:?}",
                    i, path.segments.len(), t, sample.eye, sample.target
                );
            }
            None => log::debug!("Camera path finished at t = {:.2}, {:?}", t, path.end),
        }
        true
    }

    pub fn current(&self) -> Option<usize> {
        self.current.flatten()
    }
}
