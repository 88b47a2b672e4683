use crate::foundation::core::{Canvas, Point, Rgba8, Vec2};

/// One of the four fixed canvas regions a shard is filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Quadrant {
    /// Top-left.
    A,
    /// Top-right.
    B,
    /// Bottom-left.
    C,
    /// Bottom-right.
    D,
}

impl Quadrant {
    /// Classify a display-space centroid against the canvas midlines.
    pub fn from_centroid(centroid: Point, canvas: Canvas) -> Self {
        let left = centroid.x < canvas.half_width();
        let top = centroid.y < canvas.half_height();
        match (left, top) {
            (true, true) => Quadrant::A,
            (false, true) => Quadrant::B,
            (true, false) => Quadrant::C,
            (false, false) => Quadrant::D,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Quadrant::A => 0,
            Quadrant::B => 1,
            Quadrant::C => 2,
            Quadrant::D => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::A => "A",
            Quadrant::B => "B",
            Quadrant::C => "C",
            Quadrant::D => "D",
        }
    }

    pub fn color(self) -> Rgba8 {
        match self {
            Quadrant::A => Rgba8::opaque(255, 0, 0),
            Quadrant::B => Rgba8::opaque(0, 0, 255),
            Quadrant::C => Rgba8::opaque(0, 255, 0),
            Quadrant::D => Rgba8::opaque(0, 0, 0),
        }
    }

    /// Top-left corner of the quadrant on `canvas`.
    pub fn offset(self, canvas: Canvas) -> Vec2 {
        let (hw, hh) = (canvas.half_width(), canvas.half_height());
        match self {
            Quadrant::A => Vec2::new(0.0, 0.0),
            Quadrant::B => Vec2::new(hw, 0.0),
            Quadrant::C => Vec2::new(0.0, hh),
            Quadrant::D => Vec2::new(hw, hh),
        }
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shard/quadrant.rs"]
mod tests;
