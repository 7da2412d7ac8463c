//! Static maze model
//!
//! The tile grid is parsed once from an ASCII layout. From it we derive two
//! pixel-space standing masks (player and pursuer) so that every per-pixel
//! passability check during motion is a single lookup.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::motion::Dir;
use crate::consts::*;

/// Classic 28x31 layout.
///
/// `X` wall, ` ` open, `-` gate, `H` house, `0`-`3` house tile that is the
/// home of the pursuer with that index.
pub const CLASSIC_LAYOUT: [&str; 31] = [
    "XXXXXXXXXXXXXXXXXXXXXXXXXXXX",
    "X            XX            X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X                          X",
    "X XXXX XX XXXXXXXX XX XXXX X",
    "X XXXX XX XXXXXXXX XX XXXX X",
    "X      XX    XX    XX      X",
    "XXXXXX XXXXX XX XXXXX XXXXXX",
    "     X XXXXX XX XXXXX X     ",
    "     X XX HHHHHHHH XX X     ",
    "     X XX X------X XX X     ",
    "XXXXXX XX XHHHHHHX XX XXXXXX",
    "          XHH01HHX          ",
    "XXXXXX XX XHH23HHX XX XXXXXX",
    "     X XX XXXXXXXX XX X     ",
    "     X XX HHHHHHHH XX X     ",
    "     X XX XXXXXXXX XX X     ",
    "XXXXXX XX XXXXXXXX XX XXXXXX",
    "X            XX            X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X   XX                XX   X",
    "XXX XX XX XXXXXXXX XX XX XXX",
    "XXX XX XX XXXXXXXX XX XX XXX",
    "X      XX    XX    XX      X",
    "X XXXXXXXXXX XX XXXXXXXXXX X",
    "X XXXXXXXXXX XX XXXXXXXXXX X",
    "X                          X",
    "XXXXXXXXXXXXXXXXXXXXXXXXXXXX",
];

/// Tiles checked in order for the pursuers' house exit
const HOUSE_EXIT_CANDIDATES: [Tile; 5] = [
    Tile::new(14, 10),
    Tile::new(13, 10),
    Tile::new(15, 10),
    Tile::new(14, 9),
    Tile::new(14, 11),
];
const HOUSE_EXIT_FALLBACK: Tile = Tile::new(14, 10);

/// Row of the power-pellet corners (top pair, bottom pair)
const POWER_ROWS: [i32; 2] = [3, 23];

/// Discrete maze coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub col: i32,
    pub row: i32,
}

impl Tile {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The adjacent tile in `dir` (no wrapping)
    pub fn offset(self, dir: Dir) -> Self {
        let d = dir.delta();
        Self::new(self.col + d.x, self.row + d.y)
    }
}

/// Tile attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Open,
    /// Entrance of the pursuers' pen: pursuers only
    Gate,
    /// Inside the pursuers' pen: open, but never holds pellets
    House,
}

/// Which standing mask an entity moves on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityClass {
    Player,
    Pursuer,
}

/// Layout errors. A bad layout is a configuration error and is reported at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    Empty,
    RaggedRow { row: usize, expected: usize, found: usize },
    UnknownGlyph { row: usize, col: usize, glyph: char },
    DuplicateHome { index: usize },
    MissingHome { index: usize },
    NoPlayerStart,
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "maze layout is empty"),
            Self::RaggedRow { row, expected, found } => write!(
                f,
                "maze layout is not rectangular: row {row} has {found} columns, expected {expected}"
            ),
            Self::UnknownGlyph { row, col, glyph } => {
                write!(f, "unknown maze glyph {glyph:?} at row {row}, column {col}")
            }
            Self::DuplicateHome { index } => {
                write!(f, "home marker '{index}' appears more than once")
            }
            Self::MissingHome { index } => write!(f, "home marker '{index}' is missing"),
            Self::NoPlayerStart => write!(f, "no open tile available for the player start"),
        }
    }
}

impl std::error::Error for MazeError {}

/// Boolean pixel grid of legal entity positions
#[derive(Debug, Clone)]
pub struct StandingMask {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl StandingMask {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    fn index(&self, px: IVec2) -> Option<usize> {
        (px.x >= 0 && px.y >= 0 && px.x < self.width && px.y < self.height)
            .then(|| (px.y * self.width + px.x) as usize)
    }

    fn mark(&mut self, px: IVec2) {
        if let Some(i) = self.index(px) {
            self.cells[i] = true;
        }
    }

    /// Whether an entity may stand on `px` (false outside the grid)
    pub fn contains(&self, px: IVec2) -> bool {
        self.index(px).is_some_and(|i| self.cells[i])
    }

    /// Number of standable pixels
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Starting pellet layout of a level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PelletLayout {
    pub pellets: BTreeSet<Tile>,
    pub power: BTreeSet<Tile>,
}

/// Immutable maze: tile grid plus everything derived from it
#[derive(Debug, Clone)]
pub struct MazeModel {
    cols: i32,
    rows: i32,
    tiles: Vec<TileKind>,
    homes: [Tile; PURSUER_COUNT],
    player_start: Tile,
    house_exit: Tile,
    tunnel_rows: Vec<bool>,
    player_mask: StandingMask,
    pursuer_mask: StandingMask,
}

impl MazeModel {
    /// Build the classic layout
    pub fn classic() -> Result<Self, MazeError> {
        Self::parse(&CLASSIC_LAYOUT)
    }

    /// Parse an ASCII layout (see [`CLASSIC_LAYOUT`] for glyphs)
    pub fn parse<S: AsRef<str>>(layout: &[S]) -> Result<Self, MazeError> {
        let expected = layout
            .first()
            .map(|line| line.as_ref().chars().count())
            .filter(|&n| n > 0)
            .ok_or(MazeError::Empty)?;

        let mut tiles = Vec::with_capacity(expected * layout.len());
        let mut homes: [Option<Tile>; PURSUER_COUNT] = [None; PURSUER_COUNT];

        for (row, line) in layout.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != expected {
                return Err(MazeError::RaggedRow { row, expected, found });
            }
            for (col, glyph) in line.chars().enumerate() {
                let kind = match glyph {
                    'X' => TileKind::Wall,
                    ' ' => TileKind::Open,
                    '-' => TileKind::Gate,
                    'H' => TileKind::House,
                    _ => match glyph.to_digit(10).map(|d| d as usize) {
                        Some(index) if index < PURSUER_COUNT => {
                            let tile = Tile::new(col as i32, row as i32);
                            if homes[index].replace(tile).is_some() {
                                return Err(MazeError::DuplicateHome { index });
                            }
                            TileKind::House
                        }
                        _ => return Err(MazeError::UnknownGlyph { row, col, glyph }),
                    },
                };
                tiles.push(kind);
            }
        }

        let mut home_tiles = [Tile::new(0, 0); PURSUER_COUNT];
        for (index, home) in homes.iter().enumerate() {
            home_tiles[index] = home.ok_or(MazeError::MissingHome { index })?;
        }

        let cols = expected as i32;
        let rows = layout.len() as i32;
        let mut maze = Self {
            cols,
            rows,
            tiles,
            homes: home_tiles,
            player_start: Tile::new(1, 1),
            house_exit: HOUSE_EXIT_FALLBACK,
            tunnel_rows: Vec::new(),
            player_mask: StandingMask::new(0, 0),
            pursuer_mask: StandingMask::new(0, 0),
        };

        maze.player_start = maze.find_player_start()?;
        maze.house_exit = HOUSE_EXIT_CANDIDATES
            .into_iter()
            .find(|&t| maze.is_open_for_player(t))
            .unwrap_or(HOUSE_EXIT_FALLBACK);
        maze.tunnel_rows = (0..rows)
            .map(|row| {
                maze.is_open_for_pursuer(Tile::new(0, row))
                    && maze.is_open_for_pursuer(Tile::new(cols - 1, row))
            })
            .collect();
        let (player_mask, pursuer_mask) = maze.build_masks();
        maze.player_mask = player_mask;
        maze.pursuer_mask = pursuer_mask;

        log::debug!(
            "Maze {}x{}: {} player pixels, {} pursuer pixels, start {:?}, exit {:?}",
            cols,
            rows,
            maze.player_mask.count(),
            maze.pursuer_mask.count(),
            maze.player_start,
            maze.house_exit
        );
        Ok(maze)
    }

    /// Middle column, scanning upward from the second-to-last row
    fn find_player_start(&self) -> Result<Tile, MazeError> {
        let mid = self.cols / 2;
        (1..=self.rows - 2)
            .rev()
            .map(|row| Tile::new(mid, row))
            .chain(std::iter::once(Tile::new(1, 1)))
            .find(|&t| self.is_open_for_player(t))
            .ok_or(MazeError::NoPlayerStart)
    }

    fn build_masks(&self) -> (StandingMask, StandingMask) {
        let mut player = StandingMask::new(self.pixel_width(), self.pixel_height());
        let mut pursuer = StandingMask::new(self.pixel_width(), self.pixel_height());

        for row in 0..self.rows {
            for col in 0..self.cols {
                let tile = Tile::new(col, row);
                if !self.is_open_for_pursuer(tile) {
                    continue;
                }
                let center = self.tile_center(tile);
                let player_open = self.is_open_for_player(tile);
                pursuer.mark(center);
                if player_open {
                    player.mark(center);
                }

                // Bands to the right and down cover every adjacent pair once
                for next in [Tile::new(col + 1, row), Tile::new(col, row + 1)] {
                    if !self.is_open_for_pursuer(next) {
                        continue;
                    }
                    let shared = player_open && self.is_open_for_player(next);
                    for px in band(center, self.tile_center(next)) {
                        pursuer.mark(px);
                        if shared {
                            player.mark(px);
                        }
                    }
                }
            }
        }

        (player, pursuer)
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Pixel extent of the maze
    pub fn pixel_width(&self) -> i32 {
        ORIGIN_X + self.cols * CELL_W
    }

    pub fn pixel_height(&self) -> i32 {
        ORIGIN_Y + self.rows * CELL_H
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.col >= 0 && tile.row >= 0 && tile.col < self.cols && tile.row < self.rows
    }

    /// Tile attribute; anything outside the grid is a wall
    pub fn kind(&self, tile: Tile) -> TileKind {
        if self.in_bounds(tile) {
            self.tiles[(tile.row * self.cols + tile.col) as usize]
        } else {
            TileKind::Wall
        }
    }

    pub fn is_wall(&self, tile: Tile) -> bool {
        self.kind(tile) == TileKind::Wall
    }

    pub fn is_gate_tile(&self, tile: Tile) -> bool {
        self.kind(tile) == TileKind::Gate
    }

    /// Pen tiles, gate included
    pub fn is_house(&self, tile: Tile) -> bool {
        matches!(self.kind(tile), TileKind::House | TileKind::Gate)
    }

    /// Walls and gates excluded
    pub fn is_open_for_player(&self, tile: Tile) -> bool {
        matches!(self.kind(tile), TileKind::Open | TileKind::House)
    }

    /// Walls excluded, gates included
    pub fn is_open_for_pursuer(&self, tile: Tile) -> bool {
        !self.is_wall(tile)
    }

    pub fn is_open_for(&self, class: EntityClass, tile: Tile) -> bool {
        match class {
            EntityClass::Player => self.is_open_for_player(tile),
            EntityClass::Pursuer => self.is_open_for_pursuer(tile),
        }
    }

    pub fn tile_center(&self, tile: Tile) -> IVec2 {
        IVec2::new(
            ORIGIN_X + tile.col * CELL_W + CELL_W / 2,
            ORIGIN_Y + tile.row * CELL_H + CELL_H / 2,
        )
    }

    /// Nearest tile to a pixel, clamped to the grid
    pub fn pixel_to_tile(&self, px: IVec2) -> Tile {
        let col = ((px.x - ORIGIN_X - CELL_W / 2) as f32 / CELL_W as f32).round() as i32;
        let row = ((px.y - ORIGIN_Y - CELL_H / 2) as f32 / CELL_H as f32).round() as i32;
        Tile::new(col.clamp(0, self.cols - 1), row.clamp(0, self.rows - 1))
    }

    /// The tile whose center is exactly `px`, if any
    pub fn center_tile(&self, px: IVec2) -> Option<Tile> {
        let tile = self.pixel_to_tile(px);
        (self.tile_center(tile) == px).then_some(tile)
    }

    pub fn is_tunnel_row(&self, row: i32) -> bool {
        row >= 0 && self.tunnel_rows.get(row as usize).copied().unwrap_or(false)
    }

    pub fn tunnel_rows(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.rows).filter(|&row| self.is_tunnel_row(row))
    }

    pub fn mask(&self, class: EntityClass) -> &StandingMask {
        match class {
            EntityClass::Player => &self.player_mask,
            EntityClass::Pursuer => &self.pursuer_mask,
        }
    }

    pub fn can_stand(&self, class: EntityClass, px: IVec2) -> bool {
        self.mask(class).contains(px)
    }

    /// Destination of a one-pixel step from `pos`, or `None` if blocked.
    ///
    /// Leaving a tunnel row through its edge lands on the opposite edge's
    /// tile center.
    pub fn step(&self, class: EntityClass, pos: IVec2, dir: Dir) -> Option<IVec2> {
        let next = self.tunnel_wrap(pos, dir).unwrap_or(pos + dir.delta());
        self.can_stand(class, next).then_some(next)
    }

    fn tunnel_wrap(&self, pos: IVec2, dir: Dir) -> Option<IVec2> {
        if !dir.is_horizontal() {
            return None;
        }
        let row = self.pixel_to_tile(pos).row;
        if !self.is_tunnel_row(row) {
            return None;
        }
        let left = self.tile_center(Tile::new(0, row));
        let right = self.tile_center(Tile::new(self.cols - 1, row));
        if pos.y != left.y {
            return None;
        }
        match dir {
            Dir::Left if pos.x <= left.x => Some(right),
            Dir::Right if pos.x >= right.x => Some(left),
            _ => None,
        }
    }

    /// Adjacent tile in `dir`, wrapping horizontally on tunnel rows
    pub fn neighbor(&self, tile: Tile, dir: Dir) -> Tile {
        let next = tile.offset(dir);
        if dir.is_horizontal() && self.is_tunnel_row(tile.row) {
            Tile::new(next.col.rem_euclid(self.cols), next.row)
        } else {
            next
        }
    }

    pub fn player_start(&self) -> Tile {
        self.player_start
    }

    pub fn home(&self, index: usize) -> Tile {
        self.homes[index]
    }

    pub fn homes(&self) -> &[Tile; PURSUER_COUNT] {
        &self.homes
    }

    pub fn house_exit(&self) -> Tile {
        self.house_exit
    }

    /// Tiles reachable by the player from `start` (4-neighbour flood fill)
    pub fn reachable_from(&self, start: Tile) -> BTreeSet<Tile> {
        let mut seen = BTreeSet::new();
        if !self.is_open_for_player(start) {
            return seen;
        }
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(tile) = queue.pop_front() {
            for dir in Dir::ALL {
                let next = tile.offset(dir);
                if self.is_open_for_player(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Pellets on every reachable non-house tile, with the four corners
    /// promoted to power pellets when reachable
    pub fn pellet_layout(&self) -> PelletLayout {
        let reachable = self.reachable_from(self.player_start);
        let mut layout = PelletLayout {
            pellets: reachable
                .iter()
                .copied()
                .filter(|&t| !self.is_house(t))
                .collect(),
            power: BTreeSet::new(),
        };
        for corner in self.power_corners() {
            if reachable.contains(&corner) && layout.pellets.remove(&corner) {
                layout.power.insert(corner);
            }
        }
        layout
    }

    fn power_corners(&self) -> [Tile; 4] {
        let [top, bottom] = POWER_ROWS;
        [
            Tile::new(1, top),
            Tile::new(self.cols - 2, top),
            Tile::new(1, bottom),
            Tile::new(self.cols - 2, bottom),
        ]
    }
}

/// Inclusive straight pixel run between two points sharing a row or column
fn band(from: IVec2, to: IVec2) -> impl Iterator<Item = IVec2> {
    let step = (to - from).signum();
    let len = (to - from).abs().max_element();
    (0..=len).map(move |i| from + step * i)
}
