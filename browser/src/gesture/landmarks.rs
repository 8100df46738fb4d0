//! Hand landmark data produced by the detector.
//!
//! Models the 21 normalized 2D landmarks of one detected hand, plus the
//! skeleton connections used by the debug overlay.

use tracing::debug;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark whose vertical position stands for the whole hand.
pub const TRACKED_LANDMARK: HandLandmark = HandLandmark::Wrist;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// All landmarks in detector output order.
    pub const ALL: [HandLandmark; LANDMARK_COUNT] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexMcp,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleMcp,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingMcp,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    /// Fingertip landmarks, traced by the debug overlay.
    pub fn fingertips() -> [HandLandmark; 5] {
        [
            Self::ThumbTip,
            Self::IndexTip,
            Self::MiddleTip,
            Self::RingTip,
            Self::PinkyTip,
        ]
    }
}

/// Skeleton edges between landmark indices, drawn by the debug overlay.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

// ── Landmark point ─────────────────────────────────────────

/// One landmark in normalized image coordinates (0.0-1.0, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ── Landmark frame ─────────────────────────────────────────

/// All landmarks of the primary hand for one camera frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Build a frame from detector output.
    ///
    /// `points` must contain exactly 21 entries, each finite and within
    /// 0.0-1.0; anything else is rejected.
    pub fn from_points(points: &[Landmark]) -> Option<Self> {
        let Ok(points) = <[Landmark; LANDMARK_COUNT]>::try_from(points) else {
            debug!(
                "Hand landmarks: expected {} points, got {}",
                LANDMARK_COUNT,
                points.len()
            );
            return None;
        };
        let unit = 0.0..=1.0;
        if let Some((landmark, p)) = HandLandmark::ALL
            .iter()
            .zip(points.iter())
            .find(|(_, p)| !(unit.contains(&p.x) && unit.contains(&p.y)))
        {
            debug!(
                "Hand landmarks: {} out of range ({}, {})",
                landmark.as_str(),
                p.x,
                p.y
            );
            return None;
        }
        Some(Self { points })
    }

    pub fn point(&self, landmark: HandLandmark) -> Landmark {
        self.points[landmark.index()]
    }

    /// Vertical hand position fed to the gesture classifier.
    pub fn hand_y(&self) -> f32 {
        self.point(TRACKED_LANDMARK).y
    }

    /// Axis-aligned bounds as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        self.points.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }

    /// Skeleton line segments for drawing.
    pub fn segments(&self) -> impl Iterator<Item = (Landmark, Landmark)> + '_ {
        HAND_CONNECTIONS
            .iter()
            .map(|&(a, b)| (self.points[a], self.points[b]))
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
fn test_points(y: f32) -> Vec<Landmark> {
    (0..LANDMARK_COUNT)
        .map(|i| Landmark::new(0.4 + i as f32 * 0.01, y - i as f32 * 0.01))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_count() {
        assert_eq!(HandLandmark::Wrist.index(), 0);
        assert_eq!(HandLandmark::PinkyTip.index(), 20);
        assert_eq!(LANDMARK_COUNT, 21);
    }

    #[test]
    fn test_from_points_valid() {
        let frame = LandmarkFrame::from_points(&test_points(0.6)).unwrap();
        assert!((frame.hand_y() - 0.6).abs() < f32::EPSILON);
        assert!((frame.point(HandLandmark::IndexTip).x - 0.48).abs() < 0.001);
    }

    #[test]
    fn test_from_points_wrong_count() {
        let points = vec![Landmark::default(); 10];
        assert!(LandmarkFrame::from_points(&points).is_none());
        let points = vec![Landmark::default(); 26];
        assert!(LandmarkFrame::from_points(&points).is_none());
    }

    #[test]
    fn test_from_points_rejects_non_finite() {
        let mut points = test_points(0.6);
        points[0].y = f32::NAN;
        assert!(LandmarkFrame::from_points(&points).is_none());

        let mut points = test_points(0.6);
        points[12].x = f32::INFINITY;
        assert!(LandmarkFrame::from_points(&points).is_none());

        let points = vec![Landmark::new(0.5, f32::NAN); LANDMARK_COUNT];
        assert!(LandmarkFrame::from_points(&points).is_none());
    }

    #[test]
    fn test_from_points_rejects_out_of_frame() {
        let mut points = test_points(0.6);
        points[4].y = -0.1;
        assert!(LandmarkFrame::from_points(&points).is_none());

        let mut points = test_points(0.6);
        points[20].x = 1.5;
        assert!(LandmarkFrame::from_points(&points).is_none());
    }

    #[test]
    fn test_all_matches_index() {
        for (i, landmark) in HandLandmark::ALL.iter().enumerate() {
            assert_eq!(landmark.index(), i);
        }
    }

    #[test]
    fn test_bounds() {
        let frame = LandmarkFrame::from_points(&test_points(0.6)).unwrap();
        let (x0, y0, x1, y1) = frame.bounds();
        assert!((x0 - 0.4).abs() < 0.001);
        assert!((x1 - 0.6).abs() < 0.001);
        assert!((y0 - 0.4).abs() < 0.001);
        assert!((y1 - 0.6).abs() < 0.001);
    }

    #[test]
    fn test_segments_cover_connections() {
        let frame = LandmarkFrame::from_points(&test_points(0.5)).unwrap();
        assert_eq!(frame.segments().count(), HAND_CONNECTIONS.len());
        let (a, b) = frame.segments().next().unwrap();
        assert_eq!(a, frame.point(HandLandmark::Wrist));
        assert_eq!(b, frame.point(HandLandmark::ThumbCmc));
    }

    #[test]
    fn test_connections_in_range() {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }

    #[test]
    fn test_landmark_as_str() {
        assert_eq!(HandLandmark::Wrist.as_str(), "wrist");
        assert_eq!(HandLandmark::ThumbTip.as_str(), "thumb-tip");
        assert_eq!(HandLandmark::PinkyTip.as_str(), "pinky-tip");
        assert_eq!(HandLandmark::fingertips()[4], HandLandmark::PinkyTip);
    }
}
