//! Pixel motion on the standing masks
//!
//! Speeds are in pixels per second. Each mover keeps a fractional
//! accumulator; every whole pixel it gains becomes one attempted step.
//! Headings only change while a mover sits exactly on a tile center.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::maze::{EntityClass, MazeModel, Tile};

/// Travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Left,
    Right,
    Up,
    Down,
}

impl Dir {
    /// Candidate order used wherever directions are enumerated
    pub const ALL: [Dir; 4] = [Dir::Left, Dir::Right, Dir::Up, Dir::Down];

    /// Unit pixel offset (screen coordinates, y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Dir::Left => IVec2::new(-1, 0),
            Dir::Right => IVec2::new(1, 0),
            Dir::Up => IVec2::new(0, -1),
            Dir::Down => IVec2::new(0, 1),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Dir::Left | Dir::Right)
    }
}

/// Position and heading of anything that moves through the maze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub pos: IVec2,
    pub dir: Dir,
    /// Fractional pixels not yet stepped
    pub acc: f32,
}

impl Mover {
    pub fn new(pos: IVec2, dir: Dir) -> Self {
        Self { pos, dir, acc: 0.0 }
    }

    /// Put the mover back on a tile center with no pending motion
    pub fn place(&mut self, pos: IVec2, dir: Dir) {
        self.pos = pos;
        self.dir = dir;
        self.acc = 0.0;
    }
}

/// Picks a heading whenever a mover reaches a tile center
pub trait Steer {
    /// Heading to continue with from `tile`'s center
    fn steer(&mut self, maze: &MazeModel, mover: &Mover, tile: Tile) -> Dir;
}

/// Latches a buffered direction when the next pixel that way is standable
#[derive(Debug, Clone, Copy)]
pub struct Latch {
    pub class: EntityClass,
    pub desired: Dir,
}

impl Steer for Latch {
    fn steer(&mut self, maze: &MazeModel, mover: &Mover, _tile: Tile) -> Dir {
        if maze.step(self.class, mover.pos, self.desired).is_some() {
            self.desired
        } else {
            mover.dir
        }
    }
}

/// Advance a mover by `speed * dt` pixels.
///
/// Returns every tile whose center the mover occupied during the tick, in
/// order, including the starting position when it is a center.
pub fn advance<S: Steer>(
    mover: &mut Mover,
    maze: &MazeModel,
    class: EntityClass,
    speed: f32,
    dt: f32,
    steer: &mut S,
) -> Vec<Tile> {
    let mut centers = Vec::new();

    if let Some(tile) = maze.center_tile(mover.pos) {
        mover.dir = steer.steer(maze, mover, tile);
        centers.push(tile);
    }

    mover.acc += speed * dt;
    while mover.acc >= 1.0 {
        mover.acc -= 1.0;
        let Some(next) = maze.step(class, mover.pos, mover.dir) else {
            // Blocked: stay on the last standable pixel, drop pending motion
            mover.acc = 0.0;
            break;
        };
        mover.pos = next;
        if let Some(tile) = maze.center_tile(mover.pos) {
            mover.dir = steer.steer(maze, mover, tile);
            centers.push(tile);
        }
    }

    centers
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classic() -> MazeModel {
        MazeModel::classic().expect("classic layout parses")
    }

    /// Steering that never changes heading
    struct Straight;

    impl Steer for Straight {
        fn steer(&mut self, _maze: &MazeModel, mover: &Mover, _tile: Tile) -> Dir {
            mover.dir
        }
    }

    /// Wraps a steer and remembers where each call happened
    struct Recording<S> {
        inner: S,
        calls: Vec<(IVec2, Tile, Dir)>,
    }

    impl<S: Steer> Steer for Recording<S> {
        fn steer(&mut self, maze: &MazeModel, mover: &Mover, tile: Tile) -> Dir {
            let dir = self.inner.steer(maze, mover, tile);
            self.calls.push((mover.pos, tile, dir));
            dir
        }
    }

    #[test]
    fn test_accumulator_quantizes_motion() {
        let maze = classic();
        let start = maze.tile_center(Tile::new(6, 5));
        let mut mover = Mover::new(start, Dir::Right);

        // 24 px/s at 50 Hz is under one pixel per tick
        advance(&mut mover, &maze, EntityClass::Player, 24.0, 0.02, &mut Straight);
        assert_eq!(mover.pos, start);
        assert!((mover.acc - 0.48).abs() < 1e-5);

        advance(&mut mover, &maze, EntityClass::Player, 24.0, 0.02, &mut Straight);
        assert_eq!(mover.pos, start);

        advance(&mut mover, &maze, EntityClass::Player, 24.0, 0.02, &mut Straight);
        assert_eq!(mover.pos, start + IVec2::X);
    }

    #[test]
    fn test_blocked_mover_stops_at_wall() {
        let maze = classic();
        let start = maze.tile_center(Tile::new(1, 1));
        let mut mover = Mover::new(start, Dir::Up);
        advance(&mut mover, &maze, EntityClass::Player, 100.0, 0.5, &mut Straight);
        assert_eq!(mover.pos, start);
        assert_eq!(mover.acc, 0.0);
    }

    #[test]
    fn test_turn_latches_only_at_center() {
        let maze = classic();
        // Row 5 is a long corridor; column 6 continues downward
        let start = maze.tile_center(Tile::new(5, 5));
        let mut mover = Mover::new(start, Dir::Right);
        let mut latch = Latch {
            class: EntityClass::Player,
            desired: Dir::Down,
        };

        // One pixel: not a center, heading kept
        advance(&mut mover, &maze, EntityClass::Player, 1.0, 1.0, &mut latch);
        assert_eq!(mover.dir, Dir::Right);

        // Three more pixels reach the center of (6, 5), then turn down
        let centers = advance(&mut mover, &maze, EntityClass::Player, 3.0, 1.0, &mut latch);
        assert_eq!(centers, vec![Tile::new(6, 5)]);
        assert_eq!(mover.pos, maze.tile_center(Tile::new(6, 5)));
        assert_eq!(mover.dir, Dir::Down);
    }

    #[test]
    fn test_reverse_waits_for_center() {
        let maze = classic();
        let start = maze.tile_center(Tile::new(5, 5));
        let mut mover = Mover::new(start + IVec2::X, Dir::Right);
        let mut latch = Latch {
            class: EntityClass::Player,
            desired: Dir::Left,
        };
        advance(&mut mover, &maze, EntityClass::Player, 1.0, 1.0, &mut latch);
        assert_eq!(mover.dir, Dir::Right);
        assert_eq!(mover.pos, start + IVec2::new(2, 0));
    }

    #[test]
    fn test_tunnel_wrap_preserves_row_and_heading() {
        let maze = classic();
        let mut mover = Mover::new(maze.tile_center(Tile::new(0, 14)), Dir::Left);
        let mut latch = Latch {
            class: EntityClass::Player,
            desired: Dir::Left,
        };
        let centers = advance(&mut mover, &maze, EntityClass::Player, 1.0, 1.0, &mut latch);
        assert_eq!(mover.pos, maze.tile_center(Tile::new(27, 14)));
        assert_eq!(mover.dir, Dir::Left);
        assert_eq!(centers, vec![Tile::new(0, 14), Tile::new(27, 14)]);
    }

    proptest! {
        #[test]
        fn prop_movers_stay_on_mask(
            dirs in proptest::collection::vec(0usize..4, 1..200),
            pursuer in any::<bool>(),
        ) {
            let maze = classic();
            let class = if pursuer { EntityClass::Pursuer } else { EntityClass::Player };
            let start = if pursuer { maze.home(0) } else { maze.player_start() };
            let mut mover = Mover::new(maze.tile_center(start), Dir::Left);
            for d in dirs {
                let mut steer = Recording {
                    inner: Latch { class, desired: Dir::ALL[d] },
                    calls: Vec::new(),
                };
                let before = mover.clone();
                // Up to three pixels per tick
                advance(&mut mover, &maze, class, 60.0, 0.05, &mut steer);
                prop_assert!(maze.can_stand(class, mover.pos));

                // Every steer call sits on the center of the tile it names
                for &(pos, tile, _) in &steer.calls {
                    prop_assert_eq!(maze.center_tile(pos), Some(tile));
                }
                // The heading only comes from those calls
                match steer.calls.last() {
                    Some(&(_, _, dir)) => {
                        prop_assert_eq!(mover.dir, dir);
                    }
                    None => {
                        prop_assert_eq!(mover.dir, before.dir);
                    }
                }
            }
        }
    }
}
