use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Boundary value for constructing a system and extracting results.
/// The engine itself stores particles column-wise (see `DiskMc`).
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pos: Position,
    radius: f64,
}

impl Particle {
    pub fn new(pos: Position, radius: f64) -> Self {
        Self { pos, radius }
    }

    pub fn from_xy(x: f64, y: f64, radius: f64) -> Self {
        Self::new(Position::new([x, y]), radius)
    }

    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn x(&self) -> f64 {
        self.pos.x()
    }

    pub fn y(&self) -> f64 {
        self.pos.y()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}
