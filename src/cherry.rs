use crate::pathfinding::Position;
use crate::Grid;
use rand::Rng;

/// Sampling attempts before `relocate` gives up
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Where the cherry lands when sampling finds nothing
pub const DEFAULT_FALLBACK: Position = Position { x: 2, y: 1 };

/// The target every ghost races toward
#[derive(Clone, Debug)]
pub struct Cherry {
    pub position: Position,
    max_attempts: usize,
    fallback: Position,
}

impl Cherry {
    pub fn new(position: Position) -> Self {
        Cherry {
            position,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fallback: DEFAULT_FALLBACK,
        }
    }

    pub fn with_limits(mut self, max_attempts: usize, fallback: Position) -> Self {
        self.max_attempts = max_attempts;
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> Position {
        self.fallback
    }

    /// Sample interior cells until one is floor and not under a ghost.
    ///
    /// Falls back to the fixed default cell after `max_attempts` misses and
    /// returns false in that case. Reachability is not checked here.
    pub fn relocate<R: Rng + ?Sized>(&mut self, grid: &Grid, avoid: &[Position], rng: &mut R) -> bool {
        if grid.cols >= 3 && grid.rows >= 3 {
            for _ in 0..self.max_attempts {
                let candidate = Position::new(rng.gen_range(1..=grid.cols - 2), rng.gen_range(1..=grid.rows - 2));

                if grid.is_valid(candidate.x, candidate.y) && !avoid.contains(&candidate) {
                    self.position = candidate;
                    return true;
                }
            }
        }

        log::debug!("No free cherry cell after {} attempts, using {}", self.max_attempts, self.fallback);
        self.position = self.fallback;
        false
    }
}
