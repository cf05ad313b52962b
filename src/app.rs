//! App: terminal init, main loop, pointer and key handling.

use crate::input::{Action, Pointer, key_to_action, mouse_to_pointer};
use crate::state::GameState;
use crate::theme::Theme;
use crate::ui::{self, Geometry};
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

/// The block currently held by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grab {
    /// Pool index; only valid until the next pool change.
    pub index: usize,
    /// Board cell under the pointer or keyboard cursor.
    pub cursor: (i32, i32),
    /// Held by a mouse drag (released on button up) rather than picked by key.
    pub dragging: bool,
}

pub struct App {
    args: Args,
    theme: Theme,
    state: GameState,
    screen: Screen,
    grab: Option<Grab>,
    /// Layout of the last drawn frame, used for mouse hit tests.
    geometry: Geometry,
}

impl App {
    pub fn new(args: Args, config: &GameConfig, theme: Theme) -> Result<Self> {
        let state = GameState::new(config)?;
        Ok(Self {
            args,
            theme,
            state,
            screen: Screen::Playing,
            grab: None,
            geometry: Geometry::default(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            self.tick();

            let size = terminal.size()?;
            let grid = self.state.grid();
            self.geometry = ui::geometry(
                Rect::new(0, 0, size.width, size.height),
                grid.width(),
                grid.height(),
                self.state.pool_capacity(),
            );
            terminal.draw(|f| {
                ui::draw(
                    f,
                    self.screen,
                    &self.state,
                    &self.theme,
                    &self.geometry,
                    self.grab.as_ref(),
                );
            })?;

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.apply_action(key_to_action(key)) {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => {
                            if let Some(pointer) = mouse_to_pointer(mouse) {
                                self.on_pointer(pointer);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Per-frame update: pool refill and game-over check, then drop stale grabs.
    fn tick(&mut self) {
        self.state.tick();
        if self.grab.is_some_and(|g| g.index >= self.state.pool().len()) {
            self.grab = None;
        }
        if self.screen == Screen::Playing && self.state.is_game_over() {
            self.screen = Screen::GameOver;
            self.grab = None;
        }
    }

    /// Apply a key action. Returns true when the app should exit.
    fn apply_action(&mut self, action: Action) -> bool {
        match (self.screen, action) {
            (_, Action::Quit) => return true,
            (_, Action::Restart) => {
                self.state.reset();
                self.screen = Screen::Playing;
                self.grab = None;
            }
            (Screen::GameOver, _) => {}
            (Screen::Playing, Action::Grab(index)) => {
                if index < self.state.pool().len() {
                    let grid = self.state.grid();
                    let centre = ((grid.width() / 2) as i32, (grid.height() / 2) as i32);
                    let cursor = self.grab.map_or(centre, |g| g.cursor);
                    self.grab = Some(Grab {
                        index,
                        cursor,
                        dragging: false,
                    });
                }
            }
            (Screen::Playing, Action::MoveLeft) => self.move_cursor(-1, 0),
            (Screen::Playing, Action::MoveRight) => self.move_cursor(1, 0),
            (Screen::Playing, Action::MoveUp) => self.move_cursor(0, -1),
            (Screen::Playing, Action::MoveDown) => self.move_cursor(0, 1),
            (Screen::Playing, Action::Drop) => {
                self.try_drop();
            }
            (Screen::Playing, Action::Cancel) => self.grab = None,
            (Screen::Playing, Action::None) => {}
        }
        false
    }

    fn move_cursor(&mut self, dx: i32, dy: i32) {
        let (w, h) = (self.state.grid().width() as i32, self.state.grid().height() as i32);
        if let Some(grab) = self.grab.as_mut() {
            grab.cursor.0 = (grab.cursor.0 + dx).clamp(0, w - 1);
            grab.cursor.1 = (grab.cursor.1 + dy).clamp(0, h - 1);
        }
    }

    fn on_pointer(&mut self, pointer: Pointer) {
        if self.screen != Screen::Playing {
            return;
        }
        let geom = self.geometry;
        match pointer {
            Pointer::Press(x, y) => {
                if let Some(index) = geom.tray_slot(x, y, self.state.pool().len()) {
                    self.grab = Some(Grab {
                        index,
                        cursor: geom.board_cell(x, y),
                        dragging: true,
                    });
                } else if let Some(grab) = self.grab.as_mut() {
                    grab.cursor = geom.board_cell(x, y);
                    grab.dragging = true;
                }
            }
            Pointer::Drag(x, y) => {
                if let Some(grab) = self.grab.as_mut() {
                    grab.cursor = geom.board_cell(x, y);
                }
            }
            Pointer::Hover(x, y) => {
                if let Some(grab) = self.grab.as_mut() {
                    if geom.over_board(x, y) {
                        grab.cursor = geom.board_cell(x, y);
                    }
                }
            }
            Pointer::Release(x, y) => {
                let Some(grab) = self.grab.as_mut() else {
                    return;
                };
                if !grab.dragging {
                    return;
                }
                grab.cursor = geom.board_cell(x, y);
                if !geom.over_board(x, y) || !self.try_drop() {
                    // released off the board or over an illegal spot
                    self.grab = None;
                }
            }
        }
    }

    /// Drop the grabbed block at the cursor if the placement is legal.
    /// Returns true on a successful drop.
    fn try_drop(&mut self) -> bool {
        let Some(grab) = self.grab else {
            return false;
        };
        let Ok(block) = self.state.block(grab.index) else {
            self.grab = None;
            return false;
        };
        let (ax, ay) = ui::anchor_for(grab.cursor, block.shape);
        if !self.state.can_drop(grab.index, ax, ay) {
            return false;
        }
        match self.state.drop_block(grab.index, ax, ay) {
            Ok(outcome) => {
                if outcome.lines > 0 {
                    log::debug!("{} cleared {} line(s)", outcome.block.shape.name, outcome.lines);
                }
                self.grab = None;
                true
            }
            Err(e) => {
                log::debug!("drop rejected: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Palette;

    fn app() -> App {
        let args = Args {
            width: 10,
            height: 10,
            pool_size: 3,
            seed: Some(3),
            theme: None,
            palette: Palette::Normal,
            frame_rate: 30.0,
            log_file: None,
        };
        let config = GameConfig::from(&args);
        let mut app = App::new(args, &config, Theme::default()).unwrap();
        app.geometry = ui::geometry(Rect::new(0, 0, 120, 40), 10, 10, 3);
        app
    }

    /// Terminal position of the centre of board cell (x, y).
    fn cell_pos(app: &App, x: u16, y: u16) -> (u16, u16) {
        (app.geometry.board.x + x * ui::CELL_W, app.geometry.board.y + y)
    }

    #[test]
    fn test_keyboard_grab_move_drop() {
        let mut app = app();
        let pool = app.state.pool().to_vec();
        assert!(!app.apply_action(Action::Grab(2)));
        for _ in 0..10 {
            app.apply_action(Action::MoveLeft);
            app.apply_action(Action::MoveUp);
        }
        assert_eq!(app.grab.unwrap().cursor, (0, 0));
        // push the cursor far enough in that any shape's anchor is on the board
        for _ in 0..2 {
            app.apply_action(Action::MoveRight);
            app.apply_action(Action::MoveDown);
        }
        app.apply_action(Action::Drop);
        assert!(app.grab.is_none());
        assert_eq!(app.state.pool(), &pool[..2]);
        assert_eq!(app.state.blocks_placed(), 1);
    }

    #[test]
    fn test_grab_out_of_range_ignored() {
        let mut app = app();
        app.apply_action(Action::Grab(5));
        assert!(app.grab.is_none());
    }

    #[test]
    fn test_mouse_drag_and_release_on_board() {
        let mut app = app();
        let pool = app.state.pool().to_vec();
        let tray = app.geometry.tray;
        app.on_pointer(Pointer::Press(tray.x, tray.y + 1));
        assert_eq!(app.grab.map(|g| g.index), Some(0));
        let (x, y) = cell_pos(&app, 4, 4);
        app.on_pointer(Pointer::Drag(x, y));
        assert_eq!(app.grab.unwrap().cursor, (4, 4));
        app.on_pointer(Pointer::Release(x, y));
        assert!(app.grab.is_none());
        assert_eq!(app.state.pool(), &pool[1..]);
    }

    #[test]
    fn test_release_off_board_cancels() {
        let mut app = app();
        let tray = app.geometry.tray;
        app.on_pointer(Pointer::Press(tray.x + tray.width - 1, tray.y + 1));
        assert_eq!(app.grab.map(|g| g.index), Some(2));
        app.on_pointer(Pointer::Release(0, 0));
        assert!(app.grab.is_none());
        assert_eq!(app.state.pool().len(), 3);
        assert_eq!(app.state.grid().filled_count(), 0);
    }

    #[test]
    fn test_illegal_release_cancels_without_mutation() {
        let mut app = app();
        let tray = app.geometry.tray;
        app.on_pointer(Pointer::Press(tray.x, tray.y + 1));
        let (x, y) = cell_pos(&app, 4, 4);
        app.on_pointer(Pointer::Release(x, y));
        let placed = app.state.grid().clone();

        // any shape is illegal somewhere: off an edge or over the block just placed
        let shape = app.state.block(0).unwrap().shape;
        let (cx, cy) = (0..10u16)
            .flat_map(|y| (0..10u16).map(move |x| (x, y)))
            .find(|&(cx, cy)| {
                let (ax, ay) = ui::anchor_for((i32::from(cx), i32::from(cy)), shape);
                !app.state.can_drop(0, ax, ay)
            })
            .expect("an illegal cell");
        let (x, y) = cell_pos(&app, cx, cy);
        app.on_pointer(Pointer::Press(tray.x, tray.y + 1));
        app.on_pointer(Pointer::Release(x, y));
        assert!(app.grab.is_none());
        assert_eq!(app.state.grid(), &placed);
        assert_eq!(app.state.pool().len(), 2);
    }

    #[test]
    fn test_pool_refills_after_three_drops() {
        let mut app = app();
        for (cx, cy) in [(2, 2), (7, 2), (2, 7)] {
            app.apply_action(Action::Grab(0));
            let grab = app.grab.as_mut().unwrap();
            grab.cursor = (cx, cy);
            assert!(app.try_drop());
            app.tick();
        }
        assert_eq!(app.state.pool().len(), 3);
        assert_eq!(app.screen, Screen::Playing);
    }

    #[test]
    fn test_restart_from_game_over() {
        let mut app = app();
        app.screen = Screen::GameOver;
        app.apply_action(Action::Grab(0));
        assert!(app.grab.is_none());
        app.apply_action(Action::Restart);
        assert_eq!(app.screen, Screen::Playing);
        assert!(app.apply_action(Action::Quit));
    }
}
