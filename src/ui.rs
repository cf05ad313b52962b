//! Layout and drawing: board, block tray, drag preview, sidebar, game over.

use crate::GameConfig;
use crate::app::{Grab, Screen};
use crate::catalog::{MAX_SHAPE_EXTENT, Shape};
use crate::grid::{Cell, CompletedLines};
use crate::state::GameState;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Terminal columns per grid cell (cells are drawn as "██").
pub const CELL_W: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;
/// Tray: border + slot label row + the tallest shape.
const TRAY_HEIGHT: u16 = MAX_SHAPE_EXTENT as u16 + 3;
/// Tray columns reserved per pool slot: widest shape plus a gap.
const TRAY_SLOT_WIDTH: u16 = MAX_SHAPE_EXTENT as u16 * CELL_W + 2;

/// Screen rects for one frame. `board` and `tray` are inner rects (inside their borders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub board: Rect,
    pub tray: Rect,
    pub sidebar: Rect,
}

fn outer(inner: Rect) -> Rect {
    Rect {
        x: inner.x.saturating_sub(1),
        y: inner.y.saturating_sub(1),
        width: inner.width + 2,
        height: inner.height + 2,
    }
}

fn inner(outer: Rect) -> Rect {
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Centre the board, the tray below it and the sidebar to its right in `area`.
pub fn geometry(area: Rect, grid_w: usize, grid_h: usize, pool_capacity: usize) -> Geometry {
    let cells = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    let board_w = cells(grid_w).saturating_mul(CELL_W).saturating_add(2);
    let board_h = cells(grid_h).saturating_add(2);
    let tray_w = cells(pool_capacity)
        .saturating_mul(TRAY_SLOT_WIDTH)
        .saturating_add(2)
        .max(board_w);
    let total_w = tray_w.saturating_add(SIDEBAR_WIDTH);
    let total_h = board_h.saturating_add(TRAY_HEIGHT);
    let x0 = area.x + area.width.saturating_sub(total_w) / 2;
    let y0 = area.y + area.height.saturating_sub(total_h) / 2;
    let board_outer = Rect {
        x: x0 + (tray_w - board_w) / 2,
        y: y0,
        width: board_w,
        height: board_h,
    };
    let tray_outer = Rect {
        x: x0,
        y: y0 + board_h,
        width: tray_w,
        height: TRAY_HEIGHT,
    };
    Geometry {
        board: inner(board_outer),
        tray: inner(tray_outer),
        sidebar: Rect {
            x: x0 + tray_w,
            y: y0,
            width: SIDEBAR_WIDTH,
            height: total_h,
        },
    }
}

/// Largest grid (width, height) whose board, tray and sidebar fit the terminal.
pub fn max_grid_for_terminal(term_cols: u16, term_rows: u16) -> (usize, usize) {
    let w = term_cols.saturating_sub(SIDEBAR_WIDTH + 2) / CELL_W;
    let h = term_rows.saturating_sub(TRAY_HEIGHT + 2);
    (usize::from(w.max(1)), usize::from(h.max(1)))
}

/// Largest pool whose tray slots fit beside the sidebar; at least one.
pub fn max_pool_for_terminal(term_cols: u16) -> usize {
    let slots = term_cols.saturating_sub(SIDEBAR_WIDTH + 2) / TRAY_SLOT_WIDTH;
    usize::from(slots.max(1))
}

/// Shrink grid and pool so board, tray and sidebar all fit the terminal.
pub fn fit_to_terminal(config: &GameConfig, term_cols: u16, term_rows: u16) -> GameConfig {
    let (max_w, max_h) = max_grid_for_terminal(term_cols, term_rows);
    GameConfig {
        width: config.width.min(max_w),
        height: config.height.min(max_h),
        pool_size: config.pool_size.min(max_pool_for_terminal(term_cols)),
        seed: config.seed,
    }
}

/// Pool index under a horizontal offset into the tray: the tray width is
/// split evenly across the current pool size.
pub fn pool_index_at(x_offset: u16, tray_width: u16, pool_len: usize) -> Option<usize> {
    if pool_len == 0 || x_offset >= tray_width {
        return None;
    }
    Some(usize::from(x_offset) * pool_len / usize::from(tray_width))
}

/// Columns [start, end) of tray slot `index`; matches `pool_index_at`.
fn slot_span(index: usize, tray_width: u16, pool_len: usize) -> (u16, u16) {
    let w = usize::from(tray_width);
    let start = (index * w).div_ceil(pool_len);
    let end = ((index + 1) * w).div_ceil(pool_len);
    (start as u16, end as u16)
}

/// Anchor that puts the middle of `shape` under the pointer cell.
pub fn anchor_for(cell: (i32, i32), shape: &Shape) -> (i32, i32) {
    let cx = (shape.width() as i32 - 1) / 2;
    let cy = (shape.height() as i32 - 1) / 2;
    (cell.0 - cx, cell.1 - cy)
}

impl Geometry {
    /// Board cell under a terminal position; may lie outside the grid.
    pub fn board_cell(&self, col: u16, row: u16) -> (i32, i32) {
        let dx = i32::from(col) - i32::from(self.board.x);
        let dy = i32::from(row) - i32::from(self.board.y);
        (dx.div_euclid(i32::from(CELL_W)), dy)
    }

    pub fn over_board(&self, col: u16, row: u16) -> bool {
        self.board.contains(Position { x: col, y: row })
    }

    /// Pool slot under a terminal position, if it is inside the tray.
    pub fn tray_slot(&self, col: u16, row: u16, pool_len: usize) -> Option<usize> {
        if !self.tray.contains(Position { x: col, y: row }) {
            return None;
        }
        pool_index_at(col - self.tray.x, self.tray.width, pool_len)
    }
}

/// Draw the current screen.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    geom: &Geometry,
    grab: Option<&Grab>,
) {
    let area = frame.area();
    let buf = frame.buffer_mut();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_style(Style::default().bg(theme.bg));
            }
        }
    }
    draw_board(buf, state, theme, geom, grab);
    draw_tray(buf, state, theme, geom, grab);
    draw_sidebar(buf, state, theme, geom.sidebar);
    if screen == Screen::GameOver {
        draw_game_over(buf, state, theme, geom, area);
    }
}

/// Preview cells of the grabbed block at its anchor and the lines it would complete.
struct Preview {
    cells: Vec<(i32, i32)>,
    color: Color,
    legal: bool,
    lines: CompletedLines,
}

fn preview(state: &GameState, theme: &Theme, grab: Option<&Grab>) -> Option<Preview> {
    let grab = grab?;
    let block = state.block(grab.index).ok()?;
    let (ax, ay) = anchor_for(grab.cursor, block.shape);
    let legal = state.can_drop(grab.index, ax, ay);
    let lines = if legal {
        state.grid().completed_lines_after(block.shape, ax, ay)
    } else {
        CompletedLines::default()
    };
    Some(Preview {
        cells: block
            .shape
            .cells()
            .iter()
            .map(|&(dx, dy)| (ax + i32::from(dx), ay + i32::from(dy)))
            .collect(),
        color: if legal {
            theme.block_color(block.color)
        } else {
            theme.inactive_fg
        },
        legal,
        lines,
    })
}

fn put(buf: &mut Buffer, x: u16, y: u16, symbol: &str, style: Style) {
    for (i, ch) in symbol.chars().enumerate() {
        if let Some(cell) = buf.cell_mut((x + i as u16, y)) {
            cell.set_char(ch).set_style(style);
        }
    }
}

fn draw_board(buf: &mut Buffer, state: &GameState, theme: &Theme, geom: &Geometry, grab: Option<&Grab>) {
    let grid = state.grid();
    let title = format!(" Lines: {} ", state.lines_cleared());
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
        .render(outer(geom.board), buf);

    let preview = preview(state, theme, grab);
    for (y, row) in grid.rows().iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let rx = geom.board.x + x as u16 * CELL_W;
            let ry = geom.board.y + y as u16;
            let clearing = preview.as_ref().is_some_and(|p| p.lines.contains(x, y));
            let (symbol, style) = match cell {
                Cell::Filled(_) if clearing => ("██", Style::default().fg(theme.title).bg(theme.bg)),
                Cell::Filled(c) => ("██", Style::default().fg(theme.block_color(*c)).bg(theme.bg)),
                Cell::Empty => (" ·", Style::default().fg(theme.div_line).bg(theme.bg)),
            };
            put(buf, rx, ry, symbol, style);
        }
    }

    if let Some(p) = preview {
        let symbol = if p.legal { "▓▓" } else { "░░" };
        for (x, y) in p.cells {
            let in_grid = x >= 0 && y >= 0 && (x as usize) < grid.width() && (y as usize) < grid.height();
            if !in_grid {
                continue;
            }
            // the whole completed line flashes in the title colour, preview cells included
            let fg = if p.lines.contains(x as usize, y as usize) { theme.title } else { p.color };
            let rx = geom.board.x + x as u16 * CELL_W;
            let ry = geom.board.y + y as u16;
            put(buf, rx, ry, symbol, Style::default().fg(fg).bg(theme.bg));
        }
    }
}

fn draw_tray(buf: &mut Buffer, state: &GameState, theme: &Theme, geom: &Geometry, grab: Option<&Grab>) {
    let title = format!(" Blocks {}/{} ", state.pool().len(), state.pool_capacity());
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
        .render(outer(geom.tray), buf);

    let pool = state.pool();
    for (i, block) in pool.iter().enumerate() {
        let (start, end) = slot_span(i, geom.tray.width, pool.len());
        let slot = Rect {
            x: geom.tray.x + start,
            y: geom.tray.y,
            width: end - start,
            height: geom.tray.height,
        };
        let held = grab.is_some_and(|g| g.index == i);
        let label_style = if held {
            Style::default().fg(theme.bg).bg(theme.title).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.main_fg).bg(theme.bg)
        };
        put(buf, slot.x, slot.y, &format!("{}", i + 1), label_style);
        let color = if held { theme.inactive_fg } else { theme.block_color(block.color) };
        draw_mini_shape(buf, block.shape, color, theme.bg, slot);
    }
}

/// Draw a shape centred in the slot below its label row.
fn draw_mini_shape(buf: &mut Buffer, shape: &Shape, fg: Color, bg: Color, slot: Rect) {
    let bw = shape.width() as u16 * CELL_W;
    let bh = shape.height() as u16;
    let body_h = slot.height.saturating_sub(1);
    let off_x = slot.width.saturating_sub(bw) / 2;
    let off_y = 1 + body_h.saturating_sub(bh) / 2;
    for &(dx, dy) in shape.cells() {
        let x = slot.x + off_x + dx as u16 * CELL_W;
        let y = slot.y + off_y + dy as u16;
        if x + CELL_W <= slot.x + slot.width && y < slot.y + slot.height {
            put(buf, x, y, "██", Style::default().fg(fg).bg(bg));
        }
    }
}

fn draw_sidebar(buf: &mut Buffer, state: &GameState, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let key_style = Style::default().fg(theme.blocks[4]);
    let lines = vec![
        Line::from(vec![
            Span::styled("Lines:  ", title_style),
            Span::styled(state.lines_cleared().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Placed: ", title_style),
            Span::styled(state.blocks_placed().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Filled: ", title_style),
            Span::styled(
                format!(
                    "{}/{}",
                    state.grid().filled_count(),
                    state.grid().width() * state.grid().height()
                ),
                fg_style,
            ),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(" drag ", key_style), Span::from("place block")]),
        Line::from(vec![Span::styled(" 1-9  ", key_style), Span::from("pick block")]),
        Line::from(vec![Span::styled(" ←↑↓→ ", key_style), Span::from("move")]),
        Line::from(vec![Span::styled(" ⏎    ", key_style), Span::from("drop")]),
        Line::from(vec![Span::styled(" Esc  ", key_style), Span::from("cancel")]),
        Line::from(vec![Span::styled(" R    ", key_style), Span::from("restart")]),
        Line::from(vec![Span::styled(" Q    ", key_style), Span::from("quit")]),
    ];
    let p = Paragraph::new(lines).style(fg_style.bg(theme.bg)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" blastui ", title_style)),
    );
    p.render(area, buf);
    draw_colour_strip(buf, theme, area);
}

/// Row of the nine block colours along the bottom of the sidebar.
fn draw_colour_strip(buf: &mut Buffer, theme: &Theme, sidebar: Rect) {
    if sidebar.height < 3 {
        return;
    }
    let y = sidebar.y + sidebar.height - 2;
    for (i, &c) in theme.blocks.iter().enumerate() {
        put(buf, sidebar.x + 2 + i as u16 * CELL_W, y, "██", Style::default().fg(c).bg(theme.bg));
    }
}

fn draw_game_over(buf: &mut Buffer, state: &GameState, theme: &Theme, geom: &Geometry, area: Rect) {
    let popup_w = 30u16;
    let popup_h = 8u16;
    let board = outer(geom.board);
    let popup = Rect {
        x: board.x + board.width.saturating_sub(popup_w) / 2,
        y: board.y + board.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    }
    .intersection(area);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" No room left ", Style::default().fg(Color::White).bg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Lines: {}  Placed: {} ", state.lines_cleared(), state.blocks_placed()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" R  Restart    Q  Quit ", Style::default().fg(theme.main_fg))),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Game Over ", Style::default().fg(theme.title))),
        );
    p.render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SHAPES;

    fn shape(name: &str) -> &'static Shape {
        SHAPES.iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_pool_index_splits_tray_evenly() {
        assert_eq!(pool_index_at(0, 36, 3), Some(0));
        assert_eq!(pool_index_at(11, 36, 3), Some(0));
        assert_eq!(pool_index_at(12, 36, 3), Some(1));
        assert_eq!(pool_index_at(35, 36, 3), Some(2));
        assert_eq!(pool_index_at(36, 36, 3), None);
        // after a removal the same tray is split in two
        assert_eq!(pool_index_at(12, 36, 2), Some(0));
        assert_eq!(pool_index_at(18, 36, 2), Some(1));
        assert_eq!(pool_index_at(5, 36, 0), None);
    }

    #[test]
    fn test_slot_span_matches_pool_index() {
        for len in 1..=4 {
            for w in [20u16, 36, 37] {
                for i in 0..len {
                    let (start, end) = slot_span(i, w, len);
                    for x in start..end {
                        assert_eq!(pool_index_at(x, w, len), Some(i), "x={x} w={w} len={len}");
                    }
                }
                assert_eq!(slot_span(len - 1, w, len).1, w);
            }
        }
    }

    #[test]
    fn test_anchor_centres_shape() {
        assert_eq!(anchor_for((4, 4), shape("monomino")), (4, 4));
        assert_eq!(anchor_for((4, 4), shape("square3")), (3, 3));
        assert_eq!(anchor_for((4, 4), shape("i5-h")), (2, 4));
        assert_eq!(anchor_for((4, 4), shape("domino-h")), (4, 4));
    }

    #[test]
    fn test_geometry_board_cell_round_trip() {
        let area = Rect::new(0, 0, 120, 40);
        let g = geometry(area, 10, 10, 3);
        assert_eq!(g.board.width, 20);
        assert_eq!(g.board.height, 10);
        assert!(g.tray.y > g.board.y + g.board.height);
        assert_eq!(g.board_cell(g.board.x, g.board.y), (0, 0));
        assert_eq!(g.board_cell(g.board.x + 1, g.board.y), (0, 0));
        assert_eq!(g.board_cell(g.board.x + 19, g.board.y + 9), (9, 9));
        assert_eq!(g.board_cell(g.board.x - 1, g.board.y - 1), (-1, -1));
        assert!(g.over_board(g.board.x + 5, g.board.y + 5));
        assert!(!g.over_board(g.board.x + 20, g.board.y));
    }

    #[test]
    fn test_geometry_tray_slot() {
        let g = geometry(Rect::new(0, 0, 120, 40), 10, 10, 3);
        assert_eq!(g.tray_slot(g.tray.x, g.tray.y + 2, 3), Some(0));
        assert_eq!(g.tray_slot(g.tray.x + g.tray.width - 1, g.tray.y, 3), Some(2));
        assert_eq!(g.tray_slot(g.board.x, g.board.y, 3), None);
    }

    #[test]
    fn test_max_grid_fits_geometry() {
        let (w, h) = max_grid_for_terminal(100, 40);
        let g = geometry(Rect::new(0, 0, 100, 40), w, h, 3);
        assert!(g.sidebar.x + g.sidebar.width <= 100);
        assert!(g.tray.y + g.tray.height < 40);
        assert_eq!(max_grid_for_terminal(0, 0), (1, 1));
    }

    #[test]
    fn test_fit_to_terminal_accounts_for_tray() {
        let wanted = GameConfig {
            width: 10,
            height: 10,
            pool_size: 8,
            seed: Some(1),
        };
        let fitted = fit_to_terminal(&wanted, 100, 40);
        assert_eq!((fitted.width, fitted.height, fitted.seed), (10, 10, Some(1)));
        assert!(fitted.pool_size < 8);
        let g = geometry(Rect::new(0, 0, 100, 40), fitted.width, fitted.height, fitted.pool_size);
        assert!(g.sidebar.x + g.sidebar.width <= 100);
        assert!(g.tray.x + g.tray.width <= 100);

        // already fits: unchanged
        let small = GameConfig { pool_size: 3, ..wanted };
        assert_eq!(fit_to_terminal(&small, 100, 40), small);
        assert_eq!(max_pool_for_terminal(0), 1);
    }

    #[test]
    fn test_geometry_saturates_on_huge_pool() {
        let g = geometry(Rect::new(0, 0, 100, 40), 10, 10, 6000);
        assert_eq!(g.board.width, 10 * CELL_W);
        assert_eq!(g.tray.width, u16::MAX - 2);
    }
}
