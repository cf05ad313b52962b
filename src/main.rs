//! Blastui: Block Blast-style placement puzzle in the terminal.

mod app;
mod catalog;
mod error;
mod grid;
mod input;
mod spawner;
mod state;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Upper bound for `--width` / `--height`.
const MAX_GRID_SIDE: i64 = 64;

/// Options derived from CLI that the engine needs (grid size, pool size, seed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub pool_size: usize,
    pub seed: Option<u64>,
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        Self {
            width: usize::from(args.width),
            height: usize::from(args.height),
            pool_size: usize::from(args.pool_size),
            seed: args.seed,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let wanted = GameConfig::from(&args);
    // Fit before the first grid is allocated; the size is fixed for the session.
    let (term_cols, term_rows) = crossterm::terminal::size()?;
    let config = ui::fit_to_terminal(&wanted, term_cols, term_rows);
    if config != wanted {
        log::warn!(
            "{}x{} grid with {} blocks does not fit a {term_cols}x{term_rows} terminal, using {}x{} with {}",
            wanted.width,
            wanted.height,
            wanted.pool_size,
            config.width,
            config.height,
            config.pool_size
        );
    }
    let mut app = App::new(args, &config, theme)?;
    app.run()?;
    Ok(())
}

/// Logs go to a file only; stderr would tear through the alternate screen.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("blastui {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Block Blast-style placement puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blastui",
    version,
    about = "Block Blast-style puzzle in the terminal. Drag blocks onto the grid; full rows and columns clear.",
    long_about = "Blastui is a terminal placement puzzle inspired by Block Blast.\n\n\
        Drag a block from the tray below the board and drop it on free cells. Every completely \
        filled row or column is cleared. When the tray is empty it is refilled; the game ends \
        when no block in the tray fits anywhere.\n\n\
        CONTROLS (mouse):\n  Press on a tray block, drag over the board, release to drop. Release off the board to cancel.\n\n\
        CONTROLS (keyboard):\n  1-9         Pick block    Arrows/hjkl  Move     Enter/Space Drop\n  Esc         Cancel        R            Restart  Q           Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme); block_red..block_cyan keys set the block colours."
)]
pub struct Args {
    /// Grid width in cells (1-64; shrunk further if the terminal is narrower).
    #[arg(long, default_value = "10", value_name = "COLS", value_parser = clap::value_parser!(u16).range(1..=MAX_GRID_SIDE))]
    pub width: u16,

    /// Grid height in cells (1-64; shrunk further if the terminal is shorter).
    #[arg(long, default_value = "10", value_name = "ROWS", value_parser = clap::value_parser!(u16).range(1..=MAX_GRID_SIDE))]
    pub height: u16,

    /// Number of blocks offered per refill (1-9, one per grab key).
    #[arg(short, long, default_value = "3", value_name = "N", value_parser = clap::value_parser!(u8).range(1..=9))]
    pub pool_size: u8,

    /// RNG seed for a reproducible sequence of blocks.
    #[arg(short, long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Write logs to this file (level from RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["blastui"]).unwrap();
        let config = GameConfig::from(&args);
        assert_eq!((config.width, config.height, config.pool_size), (10, 10, 3));
        assert_eq!(config.seed, None);
        assert_eq!(args.palette, Palette::Normal);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::try_parse_from([
            "blastui", "--width", "8", "--height", "6", "-p", "2", "-s", "42", "--palette", "contrast",
        ])
        .unwrap();
        let config = GameConfig::from(&args);
        assert_eq!((config.width, config.height, config.pool_size), (8, 6, 2));
        assert_eq!(config.seed, Some(42));
        assert_eq!(args.palette, Palette::HighContrast);
    }

    #[test]
    fn test_cli_rejects_out_of_range_sizes() {
        for bad in [
            ["blastui", "--pool-size", "0"],
            ["blastui", "--pool-size", "10"],
            ["blastui", "--pool-size", "6000"],
            ["blastui", "--width", "0"],
            ["blastui", "--width", "100000"],
            ["blastui", "--height", "65"],
        ] {
            assert!(Args::try_parse_from(bad).is_err(), "{bad:?} accepted");
        }
        let args = Args::try_parse_from(["blastui", "-p", "9", "--width", "64", "--height", "1"]).unwrap();
        let config = GameConfig::from(&args);
        assert_eq!((config.width, config.height, config.pool_size), (64, 1, 9));
    }
}
