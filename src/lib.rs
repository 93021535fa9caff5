pub mod cherry;
pub mod command_log;
pub mod config;
pub mod ghost;
pub mod grid;
pub mod pathfinding;
pub mod race;

pub use cherry::Cherry;
pub use config::Config;
pub use ghost::{Ghost, GhostColor};
pub use grid::{Cell, Grid, GridError};
pub use pathfinding::{reachable, Position, SearchAlgorithm};
pub use race::{RaceCommand, RaceController, RaceState, RankingEntry};
