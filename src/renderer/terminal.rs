//! Terminal output
//!
//! Redraws only the cells that changed since the previous frame, and does a
//! full redraw whenever the terminal is resized.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};

use super::frame::{Cell, Frame};

/// Raw mode and alternate screen for as long as it lives
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(Hide)?;
        Ok(Self { active: true })
    }

    /// Restore the terminal now rather than on drop
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let mut stdout = io::stdout();
        stdout.execute(Show)?;
        stdout.execute(LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            log::warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Diffing renderer for [`Frame`]s
pub struct TerminalRenderer {
    last: Vec<Cell>,
    last_hud: String,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            last_hud: String::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Draw `frame` centred in a `term_w` x `term_h` terminal
    pub fn draw<W: Write>(
        &mut self,
        out: &mut W,
        frame: &Frame,
        (term_w, term_h): (u16, u16),
    ) -> io::Result<()> {
        let needed_w = frame.width as u16;
        let needed_h = frame.height as u16 + 2;

        if term_w < needed_w || term_h < needed_h {
            out.queue(MoveTo(0, 0))?;
            out.queue(Clear(ClearType::All))?;
            out.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            )))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y || self.last.len() != frame.cells.len()
        {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
            self.last = vec![Cell::BLANK; frame.cells.len()];
        }

        if self.needs_full || frame.hud != self.last_hud {
            self.print_line(out, self.origin_y - 1, &frame.hud)?;
            self.last_hud.clone_from(&frame.hud);
        }
        if self.needs_full || frame.status != self.last_status {
            self.print_line(out, self.origin_y + frame.height as u16, &frame.status)?;
            self.last_status.clone_from(&frame.status);
        }

        for (idx, &cell) in frame.cells.iter().enumerate() {
            if self.needs_full || cell != self.last[idx] {
                self.last[idx] = cell;
                let x = self.origin_x + (idx % frame.width) as u16;
                let y = self.origin_y + (idx / frame.width) as u16;
                out.queue(MoveTo(x, y))?;
                out.queue(SetForegroundColor(cell.color))?;
                out.queue(Print(cell.ch))?;
            }
        }
        out.queue(ResetColor)?;
        self.needs_full = false;

        out.flush()
    }

    fn print_line<W: Write>(&self, out: &mut W, y: u16, text: &str) -> io::Result<()> {
        out.queue(MoveTo(self.origin_x, y))?;
        out.queue(SetForegroundColor(Color::White))?;
        out.queue(Clear(ClearType::CurrentLine))?;
        out.queue(Print(text))?;
        out.queue(ResetColor)?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_frame() -> Frame {
        let mut frame = Frame::new(4, 2);
        frame.set(1, 1, Cell::new('x', Color::Red));
        frame.hud = "SCORE 0".to_string();
        frame
    }

    #[test]
    fn test_second_draw_is_smaller() {
        let mut renderer = TerminalRenderer::new();
        let frame = small_frame();

        let mut first = Vec::new();
        renderer.draw(&mut first, &frame, (80, 24)).unwrap();
        let mut second = Vec::new();
        renderer.draw(&mut second, &frame, (80, 24)).unwrap();
        assert!(second.len() < first.len());
        assert!(String::from_utf8_lossy(&first).contains("SCORE 0"));
        assert!(!String::from_utf8_lossy(&second).contains("SCORE 0"));
    }

    #[test]
    fn test_changed_cell_is_redrawn() {
        let mut renderer = TerminalRenderer::new();
        let mut frame = small_frame();
        renderer.draw(&mut Vec::new(), &frame, (80, 24)).unwrap();

        frame.set(2, 0, Cell::new('z', Color::Green));
        let mut out = Vec::new();
        renderer.draw(&mut out, &frame, (80, 24)).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('z'));
        assert!(!text.contains('x'));
    }

    #[test]
    fn test_too_small_terminal_message() {
        let mut renderer = TerminalRenderer::new();
        let mut out = Vec::new();
        renderer.draw(&mut out, &small_frame(), (2, 2)).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("Terminal too small"));
    }
}
