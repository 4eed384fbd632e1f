//! Sampling whether the cold room door is open.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The chance that the door is open on any given tick, in percent
const DOOR_OPEN_PERCENT: u32 = 10;

/// Decides whether the door is open on a tick.
///
/// Called exactly once per tick, before the thermostat is consulted.
pub trait DoorSampler {
    /// Whether the door is open for the current tick
    fn is_door_open(&mut self) -> bool;
}

/// A door which is open on a random 10% of ticks
#[derive(Debug, Clone)]
pub struct RandomDoor<R: Rng = StdRng> {
    rng: R,
}

impl RandomDoor<StdRng> {
    /// Create a door whose openings are determined by `seed`
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomDoor<R> {
    /// Create a door which draws from the given random number generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DoorSampler for RandomDoor<R> {
    fn is_door_open(&mut self) -> bool {
        // Draw a whole number so that the probability is exact
        self.rng.gen_range(0..100) < DOOR_OPEN_PERCENT
    }
}
