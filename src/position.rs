use crate::Prng;
use rand::Rng;
use xyzvec::XYVec;

pub type DimVec = XYVec<f64>;
pub type Position = DimVec;

/// Uniform random point in [0, width) x [0, height).
pub fn random_pos_in_box(rng: &mut Prng, width: f64, height: f64) -> Position {
    let x: f64 = rng.random_range(0.0..width);
    let y: f64 = rng.random_range(0.0..height);
    Position::new([x, y])
}
