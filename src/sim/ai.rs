//! Pursuer decision-making
//!
//! Decisions happen only on tile centers. A pursuer never reverses unless it
//! is in a dead end, chases by minimising Manhattan distance to its target
//! and flees by maximising it. A seeded RNG occasionally swaps in the
//! second-best direction so pursuit is not perfectly predictable.

use glam::IVec2;
use rand::Rng;

use super::maze::{EntityClass, MazeModel, Tile};
use super::motion::{Dir, Mover, Steer};

/// Directions a pursuer may take from a center, reverse excluded unless it
/// is the only way out
pub fn legal_directions(maze: &MazeModel, pos: IVec2, current: Dir) -> Vec<Dir> {
    let open: Vec<Dir> = Dir::ALL
        .into_iter()
        .filter(|&d| maze.step(EntityClass::Pursuer, pos, d).is_some())
        .collect();
    let forward: Vec<Dir> = open
        .iter()
        .copied()
        .filter(|&d| d != current.reverse())
        .collect();
    if forward.is_empty() { open } else { forward }
}

fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a - b).abs().element_sum()
}

/// Pick a heading from `tile`'s center toward (or away from) `target`.
///
/// With probability `jitter` the choice is uniform between the two best
/// candidates. Returns `None` when no direction is open.
pub fn choose_direction<R: Rng>(
    maze: &MazeModel,
    tile: Tile,
    current: Dir,
    target: IVec2,
    frightened: bool,
    jitter: f64,
    rng: &mut R,
) -> Option<Dir> {
    let mut choices = legal_directions(maze, maze.tile_center(tile), current);
    if choices.is_empty() {
        return None;
    }

    choices.sort_by_key(|&d| {
        let distance = manhattan(maze.tile_center(maze.neighbor(tile, d)), target);
        if frightened { -distance } else { distance }
    });

    if choices.len() > 1 && rng.random_bool(jitter) {
        return Some(choices[rng.random_range(0..2)]);
    }
    Some(choices[0])
}

/// Steering for one pursuer during one tick
pub struct PursuerSteer<'a, R: Rng> {
    /// Player pixel position
    pub target: IVec2,
    pub frightened: bool,
    pub jitter: f64,
    pub rng: &'a mut R,
}

impl<R: Rng> Steer for PursuerSteer<'_, R> {
    fn steer(&mut self, maze: &MazeModel, mover: &Mover, tile: Tile) -> Dir {
        let mut target = self.target;
        if maze.is_house(tile) && !self.frightened {
            // Rise out of the pen first
            if maze.step(EntityClass::Pursuer, mover.pos, Dir::Up).is_some() {
                return Dir::Up;
            }
            target = maze.tile_center(maze.house_exit());
        }
        choose_direction(
            maze,
            tile,
            mover.dir,
            target,
            self.frightened,
            self.jitter,
            &mut *self.rng,
        )
        .unwrap_or(mover.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn classic() -> MazeModel {
        MazeModel::classic().expect("classic layout parses")
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_reverse_excluded_in_corridor() {
        let maze = classic();
        // Middle of the row-5 corridor: only left and right are open
        let pos = maze.tile_center(Tile::new(3, 5));
        assert_eq!(legal_directions(&maze, pos, Dir::Right), vec![Dir::Right]);
    }

    #[test]
    fn test_dead_end_allows_reverse() {
        let maze = MazeModel::parse(&["XXXXX", "X0123", "XXXXX"]).expect("layout parses");
        // (1, 1) has walls on three sides
        let pos = maze.tile_center(Tile::new(1, 1));
        assert_eq!(legal_directions(&maze, pos, Dir::Left), vec![Dir::Right]);
    }

    #[test]
    fn test_chase_minimises_and_flee_maximises() {
        let maze = classic();
        // Junction at (6, 5): left, right, up and down are all open
        let tile = Tile::new(6, 5);
        let target = maze.tile_center(Tile::new(26, 5));
        let mut rng = rng();

        let chase = choose_direction(&maze, tile, Dir::Up, target, false, 0.0, &mut rng);
        assert_eq!(chase, Some(Dir::Right));

        let flee = choose_direction(&maze, tile, Dir::Up, target, true, 0.0, &mut rng);
        assert_eq!(flee, Some(Dir::Left));
    }

    #[test]
    fn test_jitter_stays_within_two_best() {
        let maze = classic();
        let tile = Tile::new(6, 5);
        let target = maze.tile_center(Tile::new(26, 5));
        let mut rng = rng();
        for _ in 0..200 {
            let dir = choose_direction(&maze, tile, Dir::Up, target, false, 1.0, &mut rng);
            // Right is best, up second, left last
            assert!(matches!(dir, Some(Dir::Right) | Some(Dir::Up)));
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let maze = classic();
        let tile = Tile::new(6, 5);
        let target = maze.tile_center(Tile::new(1, 29));
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(
                choose_direction(&maze, tile, Dir::Left, target, false, 0.25, &mut a),
                choose_direction(&maze, tile, Dir::Left, target, false, 0.25, &mut b),
            );
        }
    }

    #[test]
    fn test_pursuer_rises_out_of_house() {
        let maze = classic();
        let home = maze.home(0);
        let mover = Mover::new(maze.tile_center(home), Dir::Down);
        let mut rng = rng();
        let mut steer = PursuerSteer {
            target: maze.tile_center(maze.player_start()),
            frightened: false,
            jitter: 0.0,
            rng: &mut rng,
        };
        assert_eq!(steer.steer(&maze, &mover, home), Dir::Up);
    }

    #[test]
    fn test_pursuer_heads_for_exit_when_ceiling_blocks() {
        let maze = classic();
        // (13, 11) is inside the pen region with a wall above
        let tile = Tile::new(13, 11);
        let mover = Mover::new(maze.tile_center(tile), Dir::Up);
        let mut rng = rng();
        let mut steer = PursuerSteer {
            target: maze.tile_center(Tile::new(1, 29)),
            frightened: false,
            jitter: 0.0,
            rng: &mut rng,
        };
        // Exit is at (15, 10), to the right
        assert_eq!(steer.steer(&maze, &mover, tile), Dir::Right);
    }
}
