use ghostrace::{Grid, Position};
use rand::Rng;
use std::collections::{HashMap, VecDeque};

/// Parse an ASCII maze
/// Format:
/// - #: wall
/// - .: floor
/// - S: start (floor)
/// - G: goal (floor)
pub fn parse_maze(text: &str) -> (Grid, Option<Position>, Option<Position>) {
    let mut start = None;
    let mut goal = None;
    let mut encoded = String::new();

    let lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    for (y, line) in lines.enumerate() {
        for (x, ch) in line.chars().enumerate() {
            match ch {
                '#' => encoded.push('1'),
                'S' => {
                    start = Some(Position::new(x as i32, y as i32));
                    encoded.push('0');
                }
                'G' => {
                    goal = Some(Position::new(x as i32, y as i32));
                    encoded.push('0');
                }
                _ => encoded.push('0'),
            }
        }
        encoded.push('\n');
    }

    let grid = Grid::parse(&encoded).expect("maze should be rectangular");
    (grid, start, goal)
}

/// Random grid with walls at probability `p`
pub fn random_grid<R: Rng>(rng: &mut R, rows: i32, cols: i32, p: f64) -> Grid {
    let walls: Vec<i32> = (0..rows * cols).filter(|_| rng.gen_bool(p)).collect();
    Grid::with_walls(rows, cols, &walls)
}

/// Reference edge-count distances from `from` to every reachable floor cell
pub fn distances_from(grid: &Grid, from: Position) -> HashMap<Position, usize> {
    let mut dist = HashMap::from([(from, 0)]);
    let mut queue = VecDeque::from([from]);

    while let Some(pos) = queue.pop_front() {
        let d = dist[&pos];
        for (dx, dy) in [(0, 1), (1, 0), (0, -1), (-1, 0)] {
            let next = Position::new(pos.x + dx, pos.y + dy);
            if grid.is_valid(next.x, next.y) && !dist.contains_key(&next) {
                dist.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }

    dist
}

/// Check that a path only visits floor cells and moves one orthogonal step at a time
pub fn assert_walkable(grid: &Grid, path: &[Position]) {
    for pos in path {
        assert!(grid.is_valid(pos.x, pos.y), "path visits blocked cell {}", pos);
    }
    for pair in path.windows(2) {
        assert!(
            pair[0].is_adjacent(&pair[1]),
            "path jumps from {} to {}",
            pair[0],
            pair[1]
        );
    }
}

/// Visualize a path on a grid
pub fn visualize_path(grid: &Grid, path: &[Position]) -> String {
    let mut result = String::new();

    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let pos = Position::new(x, y);
            let symbol = if path.first() == Some(&pos) {
                'S'
            } else if path.last() == Some(&pos) {
                'G'
            } else if path.contains(&pos) {
                '*'
            } else if grid.is_wall(x, y) {
                '#'
            } else {
                '.'
            };
            result.push(symbol);
        }
        result.push('\n');
    }

    result
}
