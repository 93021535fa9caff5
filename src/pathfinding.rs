use crate::Grid;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;

/// Iteration cap for the random walk
pub const RANDOM_WALK_MAX_ITERATIONS: usize = 1000;

/// Neighbor offsets, in expansion order
const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A position on the grid (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn manhattan(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// 4-connected floor neighbors of `pos`
pub fn neighbors(grid: &Grid, pos: Position) -> impl Iterator<Item = Position> + '_ {
    DIRECTIONS
        .iter()
        .map(move |(dx, dy)| Position::new(pos.x + dx, pos.y + dy))
        .filter(move |p| grid.is_valid(p.x, p.y))
}

/// The search strategy a ghost races with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAlgorithm {
    Bfs,
    Dfs,
    #[serde(alias = "a_star", alias = "a*")]
    AStar,
    Dijkstra,
    /// Randomized walk with backtracking. Historically labelled "Kruskal".
    #[serde(alias = "kruskal", alias = "random_walk")]
    RandomWalk,
}

impl SearchAlgorithm {
    pub const ALL: [SearchAlgorithm; 5] = [
        SearchAlgorithm::Bfs,
        SearchAlgorithm::Dfs,
        SearchAlgorithm::AStar,
        SearchAlgorithm::Dijkstra,
        SearchAlgorithm::RandomWalk,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            SearchAlgorithm::Bfs => "BFS",
            SearchAlgorithm::Dfs => "DFS",
            SearchAlgorithm::AStar => "AStar",
            SearchAlgorithm::Dijkstra => "Dijkstra",
            SearchAlgorithm::RandomWalk => "Kruskal",
        }
    }

    pub fn is_deterministic(&self) -> bool {
        !matches!(self, SearchAlgorithm::RandomWalk)
    }

    /// Find a path from `start` to `goal`, both inclusive.
    ///
    /// An empty result means no path exists. The random walk may instead
    /// return a partial path that doesn't end at `goal`.
    pub fn find_path<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        rng: &mut R,
    ) -> Vec<Position> {
        self.find_path_with_budget(grid, start, goal, rng, RANDOM_WALK_MAX_ITERATIONS)
    }

    /// Same as `find_path` with an explicit iteration cap for the random walk
    pub fn find_path_with_budget<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        rng: &mut R,
        max_iterations: usize,
    ) -> Vec<Position> {
        let path = match self {
            SearchAlgorithm::Bfs => bfs(grid, start, goal),
            SearchAlgorithm::Dfs => dfs(grid, start, goal),
            SearchAlgorithm::AStar => a_star(grid, start, goal),
            SearchAlgorithm::Dijkstra => dijkstra(grid, start, goal),
            SearchAlgorithm::RandomWalk => random_walk(grid, start, goal, rng, max_iterations).path,
        };

        log::trace!("[{}] {} -> {}: {}", self.name(), start, goal, format_path(&path));
        path
    }
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Walk the parent links back from `goal` and return the path in start-to-goal order
fn reconstruct(parents: &HashMap<Position, Position>, start: Position, goal: Position) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                current = parent;
                path.push(current);
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

/// Breadth-first search. Shortest in edge count.
pub fn bfs(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    let mut queue = VecDeque::from([start]);
    let mut visited = HashSet::from([start]);
    let mut parents = HashMap::new();

    while let Some(pos) = queue.pop_front() {
        if pos == goal {
            return reconstruct(&parents, start, goal);
        }

        for next in neighbors(grid, pos) {
            if visited.insert(next) {
                parents.insert(next, pos);
                queue.push_back(next);
            }
        }
    }

    Vec::new()
}

/// Depth-first search. Cells are marked visited when pushed, so the most
/// recently pushed neighbor is explored first and each cell is claimed once.
pub fn dfs(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    let mut stack = vec![start];
    let mut visited = HashSet::from([start]);
    let mut parents = HashMap::new();

    while let Some(pos) = stack.pop() {
        if pos == goal {
            return reconstruct(&parents, start, goal);
        }

        for next in neighbors(grid, pos) {
            if visited.insert(next) {
                parents.insert(next, pos);
                stack.push(next);
            }
        }
    }

    Vec::new()
}

/// A node in the priority-queue searches
#[derive(Debug, Clone)]
struct PathNode {
    cost: i32,
    /// Push order, so equal costs pop first-in first-out
    seq: u64,
    path: Vec<Position>,
}

impl PathNode {
    fn position(&self) -> Position {
        self.path[self.path.len() - 1]
    }
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl Eq for PathNode {}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first search over whole paths. `cost` scores a freshly extended path;
/// the visited set is consulted when a node is popped, not when it's pushed.
fn best_first<F>(grid: &Grid, start: Position, goal: Position, cost: F) -> Vec<Position>
where
    F: Fn(&[Position]) -> i32,
{
    let mut open: BinaryHeap<PathNode> = BinaryHeap::new();
    let mut visited: HashSet<Position> = HashSet::new();
    let mut seq = 0;

    open.push(PathNode { cost: 0, seq, path: vec![start] });

    while let Some(node) = open.pop() {
        let pos = node.position();

        if pos == goal {
            return node.path;
        }

        if !visited.insert(pos) {
            continue;
        }

        for next in neighbors(grid, pos) {
            if visited.contains(&next) {
                continue;
            }
            let mut path = node.path.clone();
            path.push(next);
            seq += 1;
            open.push(PathNode { cost: cost(&path[..]), seq, path });
        }
    }

    Vec::new()
}

/// A* keyed on path length plus Manhattan distance to the goal
pub fn a_star(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    best_first(grid, start, goal, |path| {
        path.len() as i32 + path[path.len() - 1].manhattan(&goal)
    })
}

/// Dijkstra with unit step cost
pub fn dijkstra(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    best_first(grid, start, goal, |path| path.len() as i32 - 1)
}

/// Result of a random walk
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome {
    pub path: Vec<Position>,
    pub iterations: usize,
    pub reached: bool,
}

/// Randomized walk with backtracking.
///
/// Each step picks uniformly among floor neighbors that are not on the path
/// and have not been abandoned as dead ends. With no such neighbor the tail is
/// popped and the walk resumes from the new tail. Stops at the goal, after
/// `max_iterations` steps, or when it has backtracked to the start with
/// nowhere left to go.
pub fn random_walk<R: Rng + ?Sized>(
    grid: &Grid,
    start: Position,
    goal: Position,
    rng: &mut R,
    max_iterations: usize,
) -> WalkOutcome {
    let mut path = vec![start];
    // Cells on the path plus popped dead ends
    let mut visited = HashSet::from([start]);
    let mut current = start;
    let mut iterations = 0;

    while current != goal && iterations < max_iterations {
        let options: Vec<Position> = neighbors(grid, current)
            .filter(|p| !visited.contains(p))
            .collect();

        if let Some(&next) = options.choose(rng) {
            path.push(next);
            visited.insert(next);
            current = next;
        } else if path.len() > 1 {
            path.pop();
            current = path[path.len() - 1];
        } else {
            break;
        }

        iterations += 1;
    }

    WalkOutcome {
        reached: current == goal,
        path,
        iterations,
    }
}

/// Whether `to` can be reached from `from`. Always answered by BFS.
pub fn reachable(grid: &Grid, from: Position, to: Position) -> bool {
    !bfs(grid, from, to).is_empty()
}

/// Every cell BFS can reach from `from`, `from` included
pub fn flood(grid: &Grid, from: Position) -> HashSet<Position> {
    let mut queue = VecDeque::from([from]);
    let mut seen = HashSet::from([from]);
    while let Some(pos) = queue.pop_front() {
        for next in neighbors(grid, pos) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Format path for display
pub fn format_path(path: &[Position]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    path.iter()
        .map(|pos| pos.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
