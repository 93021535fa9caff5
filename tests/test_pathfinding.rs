mod common;

use common::{assert_walkable, distances_from, parse_maze, random_grid, visualize_path};
use ghostrace::pathfinding::{a_star, bfs, dfs, dijkstra, random_walk, reachable};
use ghostrace::{Grid, Position, SearchAlgorithm};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_bfs_open_room() {
    let (grid, start, goal) = parse_maze(
        "
        #####
        #S..#
        #...#
        #..G#
        #####
        ",
    );
    let (start, goal) = (start.unwrap(), goal.unwrap());

    let path = bfs(&grid, start, goal);
    println!("{}", visualize_path(&grid, &path));

    assert_eq!(path.len(), 5, "4 edges from (1,1) to (3,3)");
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    assert_walkable(&grid, &path);
}

#[test]
fn test_bisected_grid_has_no_path() {
    let (grid, left, right) = parse_maze(
        "
        #######
        #S.#..#
        #..#..#
        #..#.G#
        #######
        ",
    );
    let (left, right) = (left.unwrap(), right.unwrap());

    assert!(bfs(&grid, left, right).is_empty());
    assert!(bfs(&grid, right, left).is_empty());
    assert!(!reachable(&grid, left, right));
    assert!(!reachable(&grid, right, left));

    assert!(dfs(&grid, left, right).is_empty());
    assert!(a_star(&grid, left, right).is_empty());
    assert!(dijkstra(&grid, left, right).is_empty());
}

#[test]
fn test_detour_around_wall() {
    let (grid, start, goal) = parse_maze(
        "
        #########
        #.......#
        #.#####.#
        #S#...#G#
        #.#.#.#.#
        #...#...#
        #########
        ",
    );
    let (start, goal) = (start.unwrap(), goal.unwrap());
    let expected = distances_from(&grid, start)[&goal] + 1;

    for path in [bfs(&grid, start, goal), a_star(&grid, start, goal), dijkstra(&grid, start, goal)] {
        assert_eq!(path.len(), expected, "\n{}", visualize_path(&grid, &path));
        assert_walkable(&grid, &path);
    }
}

#[test]
fn test_shortest_algorithms_agree_on_random_grids() {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..25 {
        let grid = random_grid(&mut rng, 9, 11, 0.3);
        let floors: Vec<Position> = grid.floor_cells().map(|(x, y)| Position::new(x, y)).collect();

        for &start in floors.iter().step_by(3) {
            let distances = distances_from(&grid, start);
            for &goal in floors.iter().step_by(2) {
                let b = bfs(&grid, start, goal);
                let a = a_star(&grid, start, goal);
                let d = dijkstra(&grid, start, goal);

                match distances.get(&goal) {
                    Some(&dist) => {
                        assert_eq!(b.len(), dist + 1, "BFS {} -> {}", start, goal);
                        assert_eq!(a.len(), dist + 1, "A* {} -> {}", start, goal);
                        assert_eq!(d.len(), dist + 1, "Dijkstra {} -> {}", start, goal);
                        assert_walkable(&grid, &a);
                        assert_walkable(&grid, &d);
                    }
                    None => {
                        assert!(b.is_empty() && a.is_empty() && d.is_empty());
                    }
                }
            }
        }
    }
}

#[test]
fn test_reachability_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..10 {
        let grid = random_grid(&mut rng, 8, 8, 0.35);
        let floors: Vec<Position> = grid.floor_cells().map(|(x, y)| Position::new(x, y)).collect();
        for &a in &floors {
            for &b in floors.iter().step_by(4) {
                assert_eq!(reachable(&grid, a, b), reachable(&grid, b, a), "{} <-> {}", a, b);
            }
        }
    }
}

#[test]
fn test_dfs_and_random_walk_paths_are_walkable() {
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..15 {
        let grid = random_grid(&mut rng, 10, 10, 0.25);
        let floors: Vec<Position> = grid.floor_cells().map(|(x, y)| Position::new(x, y)).collect();
        if floors.len() < 2 {
            continue;
        }
        let start = floors[0];
        let goal = floors[floors.len() - 1];

        let path = dfs(&grid, start, goal);
        if !path.is_empty() {
            assert_eq!(path.last(), Some(&goal));
            assert_walkable(&grid, &path);
        }

        let outcome = random_walk(&grid, start, goal, &mut rng, 1000);
        assert_eq!(outcome.path.first(), Some(&start));
        assert_walkable(&grid, &outcome.path);
        if outcome.reached {
            assert_eq!(outcome.path.last(), Some(&goal));
        }
    }
}

#[test]
fn test_dfs_is_not_always_shortest() {
    let grid = Grid::new(6, 6);
    let start = Position::new(0, 0);
    let goal = Position::new(5, 0);

    let path = dfs(&grid, start, goal);
    assert_walkable(&grid, &path);
    assert_eq!(path.last(), Some(&goal));
    assert!(path.len() > bfs(&grid, start, goal).len());
}

#[test]
fn test_random_walk_terminates_without_solution() {
    // Goal sealed off from a roomy area the walk can wander forever
    let (grid, start, goal) = parse_maze(
        "
        ############
        #S.........#
        #..........#
        #..........#
        #......#####
        #......#.G.#
        ############
        ",
    );
    let (start, goal) = (start.unwrap(), goal.unwrap());

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = random_walk(&grid, start, goal, &mut rng, 1000);
        assert!(outcome.iterations <= 1000);
        assert!(!outcome.reached);
        assert_ne!(outcome.path.last(), Some(&goal));
        assert_walkable(&grid, &outcome.path);
    }

    let mut rng = StdRng::seed_from_u64(1);
    let short = random_walk(&grid, start, goal, &mut rng, 25);
    assert!(short.iterations <= 25);
}

#[test]
fn test_random_walk_follows_single_corridor() {
    let (grid, start, goal) = parse_maze(
        "
        #########
        #S.....G#
        #########
        ",
    );
    let mut rng = StdRng::seed_from_u64(0);
    let outcome = random_walk(&grid, start.unwrap(), goal.unwrap(), &mut rng, 1000);

    assert!(outcome.reached);
    assert_eq!(outcome.path.len(), 7);
    assert_eq!(outcome.iterations, 6);
}

#[test]
fn test_every_algorithm_reaches_goal_in_open_room() {
    let grid = Grid::new(7, 7);
    let start = Position::new(1, 1);
    let goal = Position::new(5, 4);

    for algorithm in SearchAlgorithm::ALL {
        let mut rng = StdRng::seed_from_u64(3);
        let path = algorithm.find_path_with_budget(&grid, start, goal, &mut rng, 100_000);
        assert_eq!(path.first(), Some(&start), "{}", algorithm);
        assert_eq!(path.last(), Some(&goal), "{}", algorithm);
        assert_walkable(&grid, &path);
    }
}
