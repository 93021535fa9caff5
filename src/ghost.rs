use crate::pathfinding::{Position, SearchAlgorithm, RANDOM_WALK_MAX_ITERATIONS};
use crate::Grid;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fixed color tag of a ghost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GhostColor {
    Cyan,
    Pink,
    Orange,
    Red,
}

impl GhostColor {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            GhostColor::Cyan => (0, 200, 220),
            GhostColor::Pink => (250, 140, 200),
            GhostColor::Orange => (250, 160, 40),
            GhostColor::Red => (230, 40, 40),
        }
    }
}

/// A racer that follows paths produced by its own search algorithm
#[derive(Clone, Debug)]
pub struct Ghost {
    pub name: String,
    pub color: GhostColor,
    algorithm: SearchAlgorithm,
    /// Where the ghost is placed on every reset
    start: Position,
    position: Position,
    /// Remaining steps, not including the current cell
    path: VecDeque<Position>,
    /// Seconds from race start to reaching the cherry
    finish_time: Option<f64>,
    /// Iteration cap handed to the random walk
    walk_budget: usize,
}

impl Ghost {
    pub fn new(name: impl Into<String>, color: GhostColor, start: Position, algorithm: SearchAlgorithm) -> Self {
        Ghost {
            name: name.into(),
            color,
            algorithm,
            start,
            position: start,
            path: VecDeque::new(),
            finish_time: None,
            walk_budget: RANDOM_WALK_MAX_ITERATIONS,
        }
    }

    pub fn with_walk_budget(mut self, walk_budget: usize) -> Self {
        self.walk_budget = walk_budget;
        self
    }

    /// Put the ghost at `start`, dropping its path and finish time
    pub fn reset(&mut self, start: Position) {
        self.position = start;
        self.path.clear();
        self.finish_time = None;
    }

    pub fn reset_to_start(&mut self) {
        self.reset(self.start);
    }

    /// Replace the pending path with a fresh search toward `target`
    pub fn plan_to<R: Rng + ?Sized>(&mut self, grid: &Grid, target: Position, rng: &mut R) {
        let mut path: VecDeque<Position> = self
            .algorithm
            .find_path_with_budget(grid, self.position, target, rng, self.walk_budget)
            .into();

        if path.front() == Some(&self.position) {
            path.pop_front();
        }

        if path.is_empty() && self.position != target {
            log::debug!("{} ({}) found no path from {} to {}", self.name, self.algorithm, self.position, target);
        }
        self.path = path;
    }

    /// Step onto the next cell of the path. Returns false if there was nothing to follow.
    pub fn advance(&mut self) -> bool {
        match self.path.pop_front() {
            Some(next) => {
                self.position = next;
                true
            }
            None => false,
        }
    }

    pub fn has_reached(&self, position: Position) -> bool {
        self.position == position
    }

    /// Record the finish time unless one is already set
    pub fn record_finish(&mut self, time: f64) -> bool {
        if self.finish_time.is_some() {
            return false;
        }
        self.finish_time = Some(time);
        true
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    pub fn is_finished(&self) -> bool {
        self.finish_time.is_some()
    }

    pub fn finish_time(&self) -> Option<f64> {
        self.finish_time
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn algorithm(&self) -> SearchAlgorithm {
        self.algorithm
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn path(&self) -> &VecDeque<Position> {
        &self.path
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corridor() -> Grid {
        Grid::parse("1111111\n1000001\n1111111\n").unwrap()
    }

    #[test]
    fn test_plan_drops_current_cell() {
        let grid = corridor();
        let mut ghost = Ghost::new("Cyan", GhostColor::Cyan, Position::new(1, 1), SearchAlgorithm::Bfs);
        let mut rng = StdRng::seed_from_u64(0);

        ghost.plan_to(&grid, Position::new(4, 1), &mut rng);
        let steps: Vec<_> = ghost.path().iter().copied().collect();
        assert_eq!(steps, vec![Position::new(2, 1), Position::new(3, 1), Position::new(4, 1)]);
    }

    #[test]
    fn test_advance_follows_path_then_stops() {
        let grid = corridor();
        let mut ghost = Ghost::new("Pink", GhostColor::Pink, Position::new(1, 1), SearchAlgorithm::Dfs);
        let mut rng = StdRng::seed_from_u64(0);
        ghost.plan_to(&grid, Position::new(3, 1), &mut rng);

        assert!(ghost.advance());
        assert!(ghost.advance());
        assert!(ghost.has_reached(Position::new(3, 1)));
        assert!(!ghost.advance());
        assert_eq!(ghost.position(), Position::new(3, 1));
    }

    #[test]
    fn test_plan_to_own_cell_is_empty() {
        let grid = corridor();
        let mut ghost = Ghost::new("Orange", GhostColor::Orange, Position::new(2, 1), SearchAlgorithm::Dijkstra);
        let mut rng = StdRng::seed_from_u64(0);
        ghost.plan_to(&grid, Position::new(2, 1), &mut rng);
        assert!(!ghost.has_path());
        assert!(!ghost.advance());
    }

    #[test]
    fn test_finish_time_is_set_once() {
        let mut ghost = Ghost::new("Cyan", GhostColor::Cyan, Position::new(1, 1), SearchAlgorithm::AStar);
        assert!(ghost.record_finish(1.5));
        assert!(!ghost.record_finish(3.0));
        assert_eq!(ghost.finish_time(), Some(1.5));

        ghost.reset_to_start();
        assert!(!ghost.is_finished());
    }

    #[test]
    fn test_reset_restores_start_and_clears_path() {
        let grid = corridor();
        let mut ghost = Ghost::new("Red", GhostColor::Red, Position::new(1, 1), SearchAlgorithm::Bfs);
        let mut rng = StdRng::seed_from_u64(0);
        ghost.plan_to(&grid, Position::new(5, 1), &mut rng);
        ghost.advance();
        ghost.record_finish(0.4);

        ghost.reset_to_start();
        assert_eq!(ghost.position(), Position::new(1, 1));
        assert!(!ghost.has_path());
        assert_eq!(ghost.finish_time(), None);

        ghost.reset(Position::new(4, 1));
        assert_eq!(ghost.position(), Position::new(4, 1));
        assert_eq!(ghost.start(), Position::new(1, 1));
    }
}
