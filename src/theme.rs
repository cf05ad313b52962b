//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.
//! The block palette lives here, not in the engine: the engine only knows `BlockColor`.

use crate::catalog::BlockColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Theme keys for the nine block colours, in `BlockColor::index` order.
const BLOCK_KEYS: [&str; 9] = [
    "block_red",
    "block_orange",
    "block_yellow",
    "block_green",
    "block_blue",
    "block_navy",
    "block_purple",
    "block_pink",
    "block_cyan",
];

const ONEDARK_BLOCKS: [&str; 9] = [
    "#E06C75", "#D19A66", "#E5C07B", "#98C379", "#61AFEF", "#3E5F9E", "#C678DD", "#F2A7C3",
    "#56B6C2",
];

/// Block palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// One colour per `BlockColor`.
    pub blocks: [Color; 9],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text.
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Drag preview over an illegal anchor.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

/// Parse a built-in hex constant; only called with literals known to be valid.
fn hex(s: &str) -> Color {
    parse_hex(s).unwrap_or(Color::Reset)
}

impl Theme {
    /// One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            blocks: ONEDARK_BLOCKS.map(hex),
            bg: hex("#282C34"),
            div_line: hex("#3F444F"),
            main_fg: hex("#ABB2BF"),
            title: hex("#E5C07B"),
            inactive_fg: hex("#5C6370"),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override block colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.blocks = [
                    "#FF0000", "#FF8800", "#FFFF00", "#00FF00", "#0088FF", "#0000CC", "#AA00FF",
                    "#FF66CC", "#00FFFF",
                ]
                .map(hex);
            }
            crate::Palette::Colorblind => {
                // Tol "muted" set plus two neutrals, no red/green pair alone
                self.blocks = [
                    "#CC6677", "#DDCC77", "#EE7733", "#117733", "#88CCEE", "#332288", "#AA4499",
                    "#DDDDDD", "#44AA99",
                ]
                .map(hex);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let defaults = Self::onedark_default();
        let mut blocks = defaults.blocks;
        for (slot, key) in blocks.iter_mut().zip(BLOCK_KEYS) {
            if let Some(c) = get(key) {
                *slot = c;
            }
        }
        // Non-block keys match btop themes, so stock btop files work as-is.
        Self {
            blocks,
            bg: get("main_bg")
                .or_else(|| get("meter_bg"))
                .unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    /// Terminal colour for a block colour.
    #[inline]
    pub fn block_color(&self, color: BlockColor) -> Color {
        self.blocks[color.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .map(|v| v * scale)
            .ok_or_else(|| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2, 1)?, channel(2..4, 1)?, channel(4..6, 1)?),
        3 => (channel(0..1, 17)?, channel(1..2, 17)?, channel(2..3, 17)?),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_block_keys_override_palette() {
        let map = parse_theme_file("theme[block_navy]=\"#000080\"\ntheme[main_bg]='#101010'");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.block_color(BlockColor::Navy), Color::Rgb(0, 0, 0x80));
        assert_eq!(theme.bg, Color::Rgb(0x10, 0x10, 0x10));
        assert_eq!(
            theme.block_color(BlockColor::Red),
            Theme::onedark_default().block_color(BlockColor::Red)
        );
    }

    #[test]
    fn test_default_palette_has_distinct_blocks() {
        let theme = Theme::default();
        for (i, a) in theme.blocks.iter().enumerate() {
            assert!(theme.blocks[i + 1..].iter().all(|b| b != a));
        }
    }
}
