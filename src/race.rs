use crate::cherry::Cherry;
use crate::config::Config;
use crate::ghost::{Ghost, GhostColor};
use crate::grid::{self, Grid};
use crate::pathfinding::{flood, reachable, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceState {
    Idle,
    Running,
    Finished,
}

impl fmt::Display for RaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RaceState::Idle => "IDLE",
            RaceState::Running => "RUNNING",
            RaceState::Finished => "FINISHED",
        };
        f.write_str(label)
    }
}

/// Commands issued by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceCommand {
    Start,
    Restart,
    GenerateNewMap,
    GenerateNewCherry,
}

impl RaceCommand {
    pub fn label(&self) -> &'static str {
        match self {
            RaceCommand::Start => "Start Game",
            RaceCommand::Restart => "Restart Game",
            RaceCommand::GenerateNewMap => "Generate New Map",
            RaceCommand::GenerateNewCherry => "Generate New Cherry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub name: String,
    pub color: GhostColor,
    pub algorithm: String,
    /// None for ghosts that never reached the cherry
    pub finish_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GhostSnapshot {
    pub name: String,
    pub color: GhostColor,
    pub algorithm: String,
    pub position: Position,
    pub finish_time: Option<f64>,
}

/// Read-only view of the race for renderers and reports
#[derive(Debug, Clone, Serialize)]
pub struct RaceSnapshot {
    pub state: RaceState,
    pub elapsed: f64,
    pub cherry: Position,
    /// False when the last placement could not find a cell every ghost reaches
    pub cherry_verified: bool,
    pub ghosts: Vec<GhostSnapshot>,
    pub ranking: Vec<RankingEntry>,
    pub results_visible: bool,
    pub grid_revision: u64,
}

/// Knobs for map regeneration and cherry validation
#[derive(Debug, Clone)]
pub struct RaceSettings {
    pub template_rows: Vec<i32>,
    pub wall_probability: f64,
    /// Sampling rounds before the cherry is drawn directly from the shared region
    pub max_reposition_rounds: usize,
}

impl Default for RaceSettings {
    fn default() -> Self {
        RaceSettings {
            template_rows: grid::DEFAULT_TEMPLATE_ROWS.to_vec(),
            wall_probability: grid::DEFAULT_WALL_PROBABILITY,
            max_reposition_rounds: 50,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Owns the grid, ghosts and cherry and runs the idle/running/finished cycle.
///
/// Time is supplied by the caller in seconds, so the controller works the same
/// against a wall clock or a simulated one.
pub struct RaceController {
    grid: Grid,
    ghosts: Vec<Ghost>,
    cherry: Cherry,
    cherry_verified: bool,
    settings: RaceSettings,
    rng: StdRng,
    state: RaceState,
    start_time: Option<f64>,
    end_time: Option<f64>,
    timer_reset: bool,
    ranking: Vec<RankingEntry>,
    results_visible: bool,
}

impl RaceController {
    pub fn new(grid: Grid, ghosts: Vec<Ghost>, cherry: Cherry, settings: RaceSettings, rng: StdRng) -> Self {
        for ghost in &ghosts {
            let start = ghost.start();
            if !grid.is_valid(start.x, start.y) {
                log::warn!("{} starts on a blocked cell {}", ghost.name, start);
            }
        }

        let mut race = RaceController {
            grid,
            ghosts,
            cherry,
            cherry_verified: false,
            settings,
            rng,
            state: RaceState::Idle,
            start_time: None,
            end_time: None,
            timer_reset: false,
            ranking: Vec::new(),
            results_visible: false,
        };
        race.cherry_verified = race.cherry_reachable_by_all();
        race
    }

    /// Build the race described by `config`: load the map, place the ghosts
    /// and put the cherry somewhere every ghost can reach.
    pub fn from_config(config: &Config) -> Self {
        let grid = Grid::load_or_fallback(&config.map.path, config.map.fallback_rows, config.map.fallback_cols);

        let ghosts = config
            .ghosts
            .iter()
            .map(|g| {
                Ghost::new(g.name.clone(), g.color, g.start(), g.algorithm)
                    .with_walk_budget(config.race.random_walk_max_iterations)
            })
            .collect();

        let fallback = config.race.cherry_fallback();
        let cherry = Cherry::new(fallback).with_limits(config.race.cherry_max_attempts, fallback);

        let rng = match config.race.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let settings = RaceSettings {
            template_rows: config.map.template_rows.clone(),
            wall_probability: config.map.wall_probability,
            max_reposition_rounds: config.race.max_reposition_rounds,
        };

        let mut race = Self::new(grid, ghosts, cherry, settings, rng);
        race.reposition_cherry();
        race
    }

    /// Begin a race. Only accepted from IDLE.
    pub fn start(&mut self, now: f64) -> bool {
        if self.state != RaceState::Idle {
            return false;
        }

        for ghost in &mut self.ghosts {
            ghost.reset_to_start();
        }
        self.start_time = Some(now);
        self.end_time = None;
        self.timer_reset = false;
        self.results_visible = false;
        self.state = RaceState::Running;

        log::info!("Race started, cherry at {}", self.cherry.position);
        true
    }

    /// Advance every unfinished ghost by at most one cell.
    /// Returns true on the tick that finishes the race.
    pub fn tick(&mut self, now: f64) -> bool {
        if self.state != RaceState::Running {
            return false;
        }
        let Some(start_time) = self.start_time else {
            return false;
        };

        let target = self.cherry.position;
        for ghost in self.ghosts.iter_mut().filter(|g| !g.is_finished()) {
            if !ghost.has_path() {
                ghost.plan_to(&self.grid, target, &mut self.rng);
            }
            ghost.advance();

            if ghost.has_reached(target) {
                let time = round_to(now - start_time, 2);
                if ghost.record_finish(time) {
                    log::info!("{} ({}) reached the cherry in {:.2}s", ghost.name, ghost.algorithm_name(), time);
                }
            }
        }

        if self.ghosts.iter().all(Ghost::is_finished) {
            self.finish(now);
            return true;
        }
        false
    }

    fn finish(&mut self, now: f64) {
        self.end_time = Some(now);
        self.ranking = Self::compute_ranking(&self.ghosts);
        self.results_visible = true;
        self.state = RaceState::Finished;

        log::info!("Race finished");
        for (place, entry) in self.ranking.iter().enumerate() {
            match entry.finish_time {
                Some(t) => log::info!("  {}. {} ({}) {:.2}s", place + 1, entry.name, entry.algorithm, t),
                None => log::info!("  {}. {} ({}) did not finish", place + 1, entry.name, entry.algorithm),
            }
        }
    }

    /// Order ghosts by finish time; unfinished ghosts go last and ties keep roster order
    pub fn compute_ranking(ghosts: &[Ghost]) -> Vec<RankingEntry> {
        let mut entries: Vec<RankingEntry> = ghosts
            .iter()
            .map(|g| RankingEntry {
                name: g.name.clone(),
                color: g.color,
                algorithm: g.algorithm_name().to_string(),
                finish_time: g.finish_time(),
            })
            .collect();

        entries.sort_by(|a, b| {
            let a = a.finish_time.unwrap_or(f64::INFINITY);
            let b = b.finish_time.unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });
        entries
    }

    /// Send everyone back to the start and clear the timer
    pub fn restart(&mut self) -> bool {
        if self.state == RaceState::Running {
            return false;
        }
        self.reset_race(false, false);
        true
    }

    /// Re-roll the map, then place a new cherry on it
    pub fn regenerate_map(&mut self) -> bool {
        if self.state == RaceState::Running {
            return false;
        }
        self.reset_race(true, true);
        true
    }

    pub fn regenerate_cherry(&mut self) -> bool {
        if self.state == RaceState::Running {
            return false;
        }
        self.reset_race(false, true);
        true
    }

    fn reset_race(&mut self, new_map: bool, new_cherry: bool) {
        self.state = RaceState::Idle;
        self.start_time = None;
        self.end_time = None;
        self.timer_reset = true;
        self.results_visible = false;

        if new_map {
            self.grid
                .regenerate(&mut self.rng, &self.settings.template_rows, self.settings.wall_probability);
            log::info!("Generated new map (revision {})", self.grid.get_revision());
        }

        for ghost in &mut self.ghosts {
            ghost.reset_to_start();
        }

        if new_map || new_cherry {
            self.reposition_cherry();
        }
    }

    /// Move the cherry to a cell every ghost can reach from where it stands.
    ///
    /// The region shared by every ghost's BFS flood is computed first. Each
    /// round samples with `Cherry::relocate` and keeps the sample if it lies in
    /// that region. After `max_reposition_rounds` misses the cherry is drawn
    /// uniformly from the region's free cells instead. An unreachable cherry is
    /// only kept, with a warning, when the region has no free cell.
    ///
    /// Returns whether every ghost can reach the new cherry. Refused, and
    /// false, while a race is running.
    pub fn reposition_cherry(&mut self) -> bool {
        if self.state == RaceState::Running {
            return false;
        }

        let positions: Vec<Position> = self.ghosts.iter().map(Ghost::position).collect();
        let verified = if positions.is_empty() {
            self.cherry.relocate(&self.grid, &positions, &mut self.rng);
            true
        } else {
            self.place_in_shared_region(&positions)
        };

        self.cherry_verified = verified;
        for ghost in &mut self.ghosts {
            ghost.clear_path();
        }
        verified
    }

    fn place_in_shared_region(&mut self, positions: &[Position]) -> bool {
        let shared = self.shared_region(positions);
        let max_rounds = self.settings.max_reposition_rounds.max(1);

        for round in 1..=max_rounds {
            self.cherry.relocate(&self.grid, positions, &mut self.rng);
            let cell = self.cherry.position;
            if shared.contains(&cell) && !positions.contains(&cell) {
                log::debug!("Cherry placed at {} after {} round(s)", cell, round);
                return true;
            }
        }

        let free: Vec<Position> = shared
            .iter()
            .copied()
            .filter(|p| self.grid.is_valid(p.x, p.y) && !positions.contains(p))
            .collect();
        let interior: Vec<Position> = free
            .iter()
            .copied()
            .filter(|p| p.x > 0 && p.y > 0 && p.x < self.grid.cols - 1 && p.y < self.grid.rows - 1)
            .collect();
        let mut candidates = if interior.is_empty() { free } else { interior };
        // HashSet order varies between runs; sort so seeded draws repeat
        candidates.sort_by_key(|p| (p.y, p.x));

        match candidates.choose(&mut self.rng) {
            Some(&cell) => {
                log::debug!(
                    "Cherry drawn from {} shared cells after {} missed rounds: {}",
                    candidates.len(),
                    max_rounds,
                    cell
                );
                self.cherry.position = cell;
                true
            }
            None => {
                log::warn!(
                    "No free cell is reachable by every ghost; cherry left at {}",
                    self.cherry.position
                );
                false
            }
        }
    }

    /// Cells reachable from every one of `positions`
    fn shared_region(&self, positions: &[Position]) -> HashSet<Position> {
        let mut floods = positions.iter().map(|&p| flood(&self.grid, p));
        let Some(mut shared) = floods.next() else {
            return HashSet::new();
        };
        for other in floods {
            shared.retain(|p| other.contains(p));
        }
        shared
    }

    /// Put the cherry on a specific floor cell. Not accepted while running.
    pub fn place_cherry(&mut self, position: Position) -> bool {
        if self.state == RaceState::Running || !self.grid.is_valid(position.x, position.y) {
            return false;
        }
        self.cherry.position = position;
        self.cherry_verified = self.cherry_reachable_by_all();
        for ghost in &mut self.ghosts {
            ghost.clear_path();
        }
        true
    }

    /// Dispatch a UI command. Returns false when the current state forbids it.
    pub fn apply(&mut self, command: RaceCommand, now: f64) -> bool {
        match command {
            RaceCommand::Start => self.start(now),
            RaceCommand::Restart => self.restart(),
            RaceCommand::GenerateNewMap => self.regenerate_map(),
            RaceCommand::GenerateNewCherry => self.regenerate_cherry(),
        }
    }

    /// Seconds shown on the race timer, to one decimal
    pub fn elapsed(&self, now: f64) -> f64 {
        if self.timer_reset {
            return 0.0;
        }
        match self.start_time {
            Some(start) => round_to(self.end_time.unwrap_or(now) - start, 1),
            None => 0.0,
        }
    }

    pub fn cherry_reachable_by_all(&self) -> bool {
        let target = self.cherry.position;
        self.ghosts.iter().all(|g| reachable(&self.grid, g.position(), target))
    }

    pub fn snapshot(&self, now: f64) -> RaceSnapshot {
        RaceSnapshot {
            state: self.state,
            elapsed: self.elapsed(now),
            cherry: self.cherry.position,
            cherry_verified: self.cherry_verified,
            ghosts: self
                .ghosts
                .iter()
                .map(|g| GhostSnapshot {
                    name: g.name.clone(),
                    color: g.color,
                    algorithm: g.algorithm_name().to_string(),
                    position: g.position(),
                    finish_time: g.finish_time(),
                })
                .collect(),
            ranking: self.ranking.clone(),
            results_visible: self.results_visible,
            grid_revision: self.grid.get_revision(),
        }
    }

    pub fn dismiss_results(&mut self) {
        self.results_visible = false;
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn cherry(&self) -> &Cherry {
        &self.cherry
    }

    /// Whether every ghost could reach the cherry when it was last placed
    pub fn cherry_verified(&self) -> bool {
        self.cherry_verified
    }

    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Ranking of the most recently finished race
    pub fn ranking(&self) -> &[RankingEntry] {
        &self.ranking
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    pub fn timer_reset(&self) -> bool {
        self.timer_reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::SearchAlgorithm;

    fn corridor_race() -> RaceController {
        let grid = Grid::parse("11111111\n10000001\n11111111\n").unwrap();
        let ghosts = vec![
            Ghost::new("Cyan", GhostColor::Cyan, Position::new(1, 1), SearchAlgorithm::Bfs),
            Ghost::new("Orange", GhostColor::Orange, Position::new(3, 1), SearchAlgorithm::Dijkstra),
        ];
        let mut race = RaceController::new(
            grid,
            ghosts,
            Cherry::new(Position::new(6, 1)),
            RaceSettings::default(),
            StdRng::seed_from_u64(1),
        );
        assert!(race.place_cherry(Position::new(6, 1)));
        race
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234, 2), 1.23);
        assert_eq!(round_to(1.25, 1), 1.3);
        assert_eq!(round_to(0.04, 1), 0.0);
    }

    #[test]
    fn test_tick_is_noop_when_idle() {
        let mut race = corridor_race();
        assert!(!race.tick(1.0));
        assert_eq!(race.ghosts()[0].position(), Position::new(1, 1));
    }

    #[test]
    fn test_corridor_race_finishes_in_order() {
        let mut race = corridor_race();
        assert!(race.start(10.0));

        let mut now = 10.0;
        let mut finished = false;
        for _ in 0..10 {
            now += 0.1;
            if race.tick(now) {
                finished = true;
                break;
            }
        }

        assert!(finished);
        assert_eq!(race.state(), RaceState::Finished);
        let ranking = race.ranking();
        assert_eq!(ranking[0].name, "Orange");
        assert_eq!(ranking[0].finish_time, Some(0.3));
        assert_eq!(ranking[1].name, "Cyan");
        assert_eq!(ranking[1].finish_time, Some(0.5));
        assert!(race.results_visible());
        assert_eq!(race.elapsed(99.0), 0.5);
    }

    #[test]
    fn test_finished_rejects_start_and_ignores_tick() {
        let mut race = corridor_race();
        race.start(0.0);
        let mut now = 0.0;
        while race.state() == RaceState::Running {
            now += 0.1;
            race.tick(now);
        }

        assert!(!race.start(now));
        assert!(!race.tick(now + 1.0));
        assert_eq!(race.end_time(), Some(now));

        assert!(race.restart());
        assert_eq!(race.state(), RaceState::Idle);
        assert!(race.timer_reset());
        assert_eq!(race.elapsed(now), 0.0);
        assert!(!race.results_visible());
        // The previous ranking stays available after a restart
        assert_eq!(race.ranking().len(), 2);
        assert!(race.ghosts().iter().all(|g| !g.is_finished()));
    }

    #[test]
    fn test_running_rejects_other_commands() {
        let mut race = corridor_race();
        race.start(0.0);
        race.tick(0.1);
        let before: Vec<Position> = race.ghosts().iter().map(Ghost::position).collect();

        assert!(!race.apply(RaceCommand::Start, 0.2));
        assert!(!race.apply(RaceCommand::Restart, 0.2));
        assert!(!race.apply(RaceCommand::GenerateNewMap, 0.2));
        assert!(!race.apply(RaceCommand::GenerateNewCherry, 0.2));
        assert!(!race.reposition_cherry());
        assert!(!race.place_cherry(Position::new(2, 1)));

        let after: Vec<Position> = race.ghosts().iter().map(Ghost::position).collect();
        assert_eq!(before, after);
        assert_eq!(race.state(), RaceState::Running);
        assert_eq!(race.start_time(), Some(0.0));
    }

    #[test]
    fn test_elapsed_while_running() {
        let mut race = corridor_race();
        assert_eq!(race.elapsed(5.0), 0.0);
        race.start(2.0);
        assert_eq!(race.elapsed(3.26), 1.3);
    }

    #[test]
    fn test_ranking_puts_unfinished_last() {
        let mut a = Ghost::new("A", GhostColor::Cyan, Position::new(0, 0), SearchAlgorithm::Bfs);
        let b = Ghost::new("B", GhostColor::Pink, Position::new(0, 0), SearchAlgorithm::Dfs);
        let mut c = Ghost::new("C", GhostColor::Red, Position::new(0, 0), SearchAlgorithm::AStar);
        let mut d = Ghost::new("D", GhostColor::Orange, Position::new(0, 0), SearchAlgorithm::Dijkstra);
        a.record_finish(2.0);
        c.record_finish(1.0);
        d.record_finish(2.0);

        let names: Vec<_> = RaceController::compute_ranking(&[a, b, c, d])
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "D", "B"]);
    }
}
