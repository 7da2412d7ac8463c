//! Character-grid frame built from a render snapshot
//!
//! Each maze tile covers two terminal columns and one row, so one screen
//! column is two horizontal pixels and one screen row is two vertical
//! pixels. Composition is pure; only [`super::terminal`] touches the tty.

use crossterm::style::Color;
use glam::IVec2;

use crate::consts::ORIGIN_Y;
use crate::sim::{Dir, GamePhase, MazeModel, RenderSnapshot, Tile, TileKind};
use crate::ui::MenuItem;

const PURSUER_COLORS: [Color; 4] = [Color::Red, Color::Magenta, Color::Cyan, Color::DarkYellow];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        color: Color::Reset,
    };

    pub fn new(ch: char, color: Color) -> Self {
        Self { ch, color }
    }
}

/// One full screen: maze cells plus two text lines
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Cell>,
    /// Score line above the maze
    pub hud: String,
    /// Prompt line below the maze
    pub status: String,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
            hud: String::new(),
            status: String::new(),
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Out-of-range writes are dropped
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    pub fn put_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.set(x + i as i32, y, Cell::new(ch, color));
        }
    }

    /// Text of one row, for tests and logs
    pub fn row_text(&self, y: usize) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|c| c.ch)
            .collect()
    }
}

/// Screen cell of a pixel position
pub fn screen_cell(px: IVec2) -> IVec2 {
    IVec2::new(px.x.div_euclid(2), (px.y - ORIGIN_Y).div_euclid(2))
}

fn tile_cells(tile: Tile) -> (IVec2, IVec2) {
    (
        IVec2::new(tile.col * 2, tile.row),
        IVec2::new(tile.col * 2 + 1, tile.row),
    )
}

fn player_glyph(facing: Dir, mouth_open: bool) -> char {
    if !mouth_open {
        return 'O';
    }
    match facing {
        Dir::Left => '>',
        Dir::Right => '<',
        Dir::Up => 'v',
        Dir::Down => '^',
    }
}

fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the frame for `snap`, with the pause menu on top when `menu` is set
pub fn compose(maze: &MazeModel, snap: &RenderSnapshot, menu: Option<MenuItem>) -> Frame {
    let mut frame = Frame::new((maze.cols() * 2) as usize, maze.rows() as usize);

    for row in 0..maze.rows() {
        for col in 0..maze.cols() {
            let tile = Tile::new(col, row);
            let cell = match maze.kind(tile) {
                TileKind::Wall => Cell::new('█', Color::DarkBlue),
                TileKind::Gate => Cell::new('-', Color::Grey),
                TileKind::Open | TileKind::House => continue,
            };
            let (a, b) = tile_cells(tile);
            frame.set(a.x, a.y, cell);
            frame.set(b.x, b.y, cell);
        }
    }

    for &tile in &snap.pellets {
        let (_, center) = tile_cells(tile);
        frame.set(center.x, center.y, Cell::new('·', Color::White));
    }
    if snap.power_visible {
        for &tile in &snap.power {
            let (_, center) = tile_cells(tile);
            frame.set(center.x, center.y, Cell::new('o', Color::Yellow));
        }
    }

    for (i, pursuer) in snap.pursuers.iter().enumerate() {
        let at = screen_cell(pursuer.pos);
        let color = PURSUER_COLORS[i % PURSUER_COLORS.len()];
        let cell = if pursuer.frightened {
            Cell::new('W', Color::Blue)
        } else if pursuer.in_house {
            // Still waiting to leave
            Cell::new('m', color)
        } else {
            Cell::new('M', color)
        };
        frame.set(at.x, at.y, cell);
    }

    let at = screen_cell(snap.player.pos);
    let player = match snap.phase {
        GamePhase::Dying => Cell::new('*', Color::Yellow),
        _ => Cell::new(
            player_glyph(snap.player.facing, snap.player.mouth_open),
            Color::Yellow,
        ),
    };
    frame.set(at.x, at.y, player);

    let hud = &snap.hud;
    frame.hud = format!(
        "SCORE {:>7}  HIGH {:>7}  LIVES {}  LEVEL {}  TIME {}",
        hud.score,
        hud.high_score,
        hud.lives,
        hud.level,
        format_time(hud.play_secs)
    );
    frame.status = if snap.paused {
        "PAUSED  up/down select  enter confirm  esc resume".to_string()
    } else {
        match snap.phase {
            GamePhase::Waiting => "READY! press a direction to start".to_string(),
            GamePhase::Dying => "CAUGHT!".to_string(),
            GamePhase::Playing => "p/esc pause  q quit".to_string(),
        }
    };

    if let Some(selected) = menu {
        draw_menu(&mut frame, selected);
    }
    frame
}

fn draw_menu(frame: &mut Frame, selected: MenuItem) {
    const BOX_W: i32 = 16;
    let box_h = MenuItem::ALL.len() as i32 + 2;
    let left = (frame.width as i32 - BOX_W) / 2;
    let top = (frame.height as i32 - box_h) / 2;

    for y in top..top + box_h {
        for x in left..left + BOX_W {
            let edge = y == top || y == top + box_h - 1 || x == left || x == left + BOX_W - 1;
            let ch = if edge { '#' } else { ' ' };
            frame.set(x, y, Cell::new(ch, Color::White));
        }
    }
    for (i, item) in MenuItem::ALL.into_iter().enumerate() {
        let marker = if item == selected { "> " } else { "  " };
        let color = if item == selected {
            Color::Yellow
        } else {
            Color::White
        };
        let text = format!("{}{}", marker, item.label());
        frame.put_text(left + 2, top + 1 + i as i32, &text, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameState;
    use crate::tuning::Tuning;
    use std::sync::Arc;

    fn classic_state() -> GameState {
        let maze = Arc::new(MazeModel::classic().expect("classic layout parses"));
        GameState::new(maze, Tuning::default(), 1, 4200)
    }

    #[test]
    fn test_frame_size_and_walls() {
        let state = classic_state();
        let frame = compose(state.maze(), &state.snapshot(), None);
        assert_eq!(frame.width, 56);
        assert_eq!(frame.height, 31);
        assert!(frame.row_text(0).chars().all(|c| c == '█'));
    }

    #[test]
    fn test_entities_on_tile_cells() {
        let state = classic_state();
        let frame = compose(state.maze(), &state.snapshot(), None);

        // Player start (14, 29) faces left with its mouth open
        assert_eq!(frame.get(29, 29), Some(Cell::new('>', Color::Yellow)));
        // First pursuer waits at home (13, 14)
        assert_eq!(frame.get(27, 14), Some(Cell::new('m', Color::Red)));
        // Power pellet corner (1, 3)
        assert_eq!(frame.get(3, 3).map(|c| c.ch), Some('o'));
        assert!(frame.hud.contains("HIGH    4200"));
        assert!(frame.status.starts_with("READY"));
    }

    #[test]
    fn test_pursuer_glyph_follows_house_and_fright() {
        let mut state = classic_state();
        let corridor = state.maze().tile_center(Tile::new(6, 5));
        state.pursuers[0].mover.pos = corridor;
        state.pursuers[0].in_house = false;
        state.pursuers[1].frightened = 3.0;

        let frame = compose(state.maze(), &state.snapshot(), None);
        let at = screen_cell(corridor);
        assert_eq!(
            frame.get(at.x as usize, at.y as usize),
            Some(Cell::new('M', Color::Red))
        );
        // Pursuer 1 home (14, 14)
        assert_eq!(frame.get(29, 14), Some(Cell::new('W', Color::Blue)));
    }

    #[test]
    fn test_power_pellets_blink() {
        let mut state = classic_state();
        state.power_visible = false;
        let frame = compose(state.maze(), &state.snapshot(), None);
        assert_eq!(frame.get(3, 3).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn test_menu_overlay() {
        let mut state = classic_state();
        state.set_paused(true);
        let frame = compose(state.maze(), &state.snapshot(), Some(MenuItem::Restart));
        let text: Vec<String> = (0..frame.height).map(|y| frame.row_text(y)).collect();
        assert!(text.iter().any(|row| row.contains("> RESTART")));
        assert!(text.iter().any(|row| row.contains("  RESUME")));
        assert!(frame.status.starts_with("PAUSED"));
    }

    #[test]
    fn test_screen_cell_mapping() {
        // Tile centers land on the right-hand column of their tile
        assert_eq!(screen_cell(IVec2::new(2, 2)), IVec2::new(1, 0));
        assert_eq!(screen_cell(IVec2::new(58, 60)), IVec2::new(29, 29));
        assert_eq!(screen_cell(IVec2::new(59, 60)), IVec2::new(29, 29));
        assert_eq!(screen_cell(IVec2::new(60, 60)), IVec2::new(30, 29));
    }
}
