//! Keyboard input mailbox
//!
//! The reader thread sends one message per key press. The simulation loop
//! drains the channel once per frame without blocking and folds everything
//! into a single snapshot. Terminals rarely report key releases, so a
//! direction counts as held while it was seen within the last
//! [`HOLD_WINDOW`] (key repeat keeps it alive).

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::{Dir, TickInput};

/// How long a direction stays held after its last press or repeat
pub const HOLD_WINDOW: Duration = Duration::from_millis(160);

/// Poll interval of the reader thread
const READ_POLL: Duration = Duration::from_millis(50);

/// What a key means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Dir),
    Confirm,
    Cancel,
    Pause,
    Quit,
}

/// Map a terminal key event. Arrows, WASD and hjkl all steer.
pub fn map_key(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => KeyAction::Move(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => KeyAction::Move(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => KeyAction::Move(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => KeyAction::Move(Dir::Right),
        KeyCode::Enter | KeyCode::Char(' ') => KeyAction::Confirm,
        KeyCode::Esc => KeyAction::Cancel,
        KeyCode::Char('p') => KeyAction::Pause,
        KeyCode::Char('q') => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

#[derive(Debug, Clone, Copy)]
struct KeyMsg {
    action: KeyAction,
    at: Instant,
}

/// Producer half, owned by the reader thread
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<KeyMsg>,
}

impl InputSender {
    /// Returns false once the mailbox is gone
    pub fn publish(&self, action: KeyAction, at: Instant) -> bool {
        self.tx.send(KeyMsg { action, at }).is_ok()
    }
}

/// Everything the host loop learns from one poll
#[derive(Debug, Clone, Default)]
pub struct HostInput {
    /// Snapshot for the simulation tick
    pub tick: TickInput,
    /// Direction presses since the last poll, oldest first (menu navigation)
    pub presses: Vec<Dir>,
    pub quit: bool,
}

/// Consumer half, polled by the simulation loop
#[derive(Debug)]
pub struct InputMailbox {
    rx: Receiver<KeyMsg>,
    last_seen: [Option<Instant>; 4],
    disconnected: bool,
}

/// Create a connected sender/mailbox pair
pub fn mailbox() -> (InputSender, InputMailbox) {
    let (tx, rx) = mpsc::channel();
    (
        InputSender { tx },
        InputMailbox {
            rx,
            last_seen: [None; 4],
            disconnected: false,
        },
    )
}

fn slot(dir: Dir) -> usize {
    match dir {
        Dir::Up => 0,
        Dir::Down => 1,
        Dir::Left => 2,
        Dir::Right => 3,
    }
}

impl InputMailbox {
    /// Drain pending presses and build the snapshot for `now`. Never blocks.
    pub fn poll(&mut self, now: Instant) -> HostInput {
        let mut out = HostInput::default();
        loop {
            match self.rx.try_recv() {
                Ok(msg) => match msg.action {
                    KeyAction::Move(dir) => {
                        self.last_seen[slot(dir)] = Some(msg.at);
                        out.presses.push(dir);
                    }
                    KeyAction::Confirm => out.tick.confirm = true,
                    KeyAction::Cancel => out.tick.cancel = true,
                    KeyAction::Pause => out.tick.pause = true,
                    KeyAction::Quit => out.quit = true,
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        log::warn!("Keyboard reader stopped");
                        self.disconnected = true;
                    }
                    break;
                }
            }
        }

        let held = |dir: Dir| {
            self.last_seen[slot(dir)]
                .is_some_and(|t| now.saturating_duration_since(t) <= HOLD_WINDOW)
        };
        out.tick.up = held(Dir::Up);
        out.tick.down = held(Dir::Down);
        out.tick.left = held(Dir::Left);
        out.tick.right = held(Dir::Right);
        out
    }
}

/// Read crossterm key events on a background thread until the mailbox is
/// dropped or the player quits
pub fn spawn_keyboard_reader(sender: InputSender) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("keyboard".into())
        .spawn(move || {
            loop {
                match event::poll(READ_POLL) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(e) => {
                        log::warn!("Keyboard poll failed: {}", e);
                        return;
                    }
                }
                let key = match event::read() {
                    Ok(Event::Key(key)) => key,
                    Ok(_) => continue,
                    Err(e) => {
                        log::warn!("Keyboard read failed: {}", e);
                        return;
                    }
                };
                let Some(action) = map_key(&key) else {
                    continue;
                };
                if !sender.publish(action, Instant::now()) || action == KeyAction::Quit {
                    return;
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(&press(KeyCode::Left)), Some(KeyAction::Move(Dir::Left)));
        assert_eq!(map_key(&press(KeyCode::Char('k'))), Some(KeyAction::Move(Dir::Up)));
        assert_eq!(map_key(&press(KeyCode::Enter)), Some(KeyAction::Confirm));
        assert_eq!(map_key(&press(KeyCode::Esc)), Some(KeyAction::Cancel));
        assert_eq!(map_key(&press(KeyCode::Char('x'))), None);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c), Some(KeyAction::Quit));
    }

    #[test]
    fn test_release_is_ignored() {
        let mut key = press(KeyCode::Up);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(&key), None);
    }

    #[test]
    fn test_poll_folds_presses() {
        let (tx, mut rx) = mailbox();
        let t0 = Instant::now();
        tx.publish(KeyAction::Move(Dir::Left), t0);
        tx.publish(KeyAction::Pause, t0);
        tx.publish(KeyAction::Move(Dir::Up), t0);

        let input = rx.poll(t0);
        assert!(input.tick.left && input.tick.up);
        assert_eq!(input.tick.direction(), Some(Dir::Up));
        assert!(input.tick.pause);
        assert_eq!(input.presses, vec![Dir::Left, Dir::Up]);

        // Edges are consumed, holds persist inside the window
        let again = rx.poll(t0 + Duration::from_millis(100));
        assert!(!again.tick.pause);
        assert!(again.presses.is_empty());
        assert!(again.tick.up);

        let later = rx.poll(t0 + Duration::from_millis(500));
        assert_eq!(later.tick.direction(), None);
    }

    #[test]
    fn test_poll_never_blocks_after_disconnect() {
        let (tx, mut rx) = mailbox();
        tx.publish(KeyAction::Quit, Instant::now());
        drop(tx);
        assert!(rx.poll(Instant::now()).quit);
        assert!(!rx.poll(Instant::now()).quit);
    }
}
