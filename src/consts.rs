/// Hard limits assumed by the rest of the crate.
/// Particle indices are stored as u32 in the cell grid arena.
pub const MAX_PARTICLES: usize = 100_000;

/// Placement attempts the random initializer gets per requested particle
/// before it gives up and returns a partial configuration.
pub const INIT_ATTEMPTS_PER_PARTICLE: usize = 100;
