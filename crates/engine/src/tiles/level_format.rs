//! Plain-text level grids: foreground rows, a `---` line, background rows.
//! Each row is whitespace-separated type ids; blank lines are skipped.

use std::fmt::Write as _;

use super::types::TileTypeId;

pub const LAYER_SEPARATOR: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelGrid {
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` ids each.
    pub foreground: Vec<TileTypeId>,
    pub background: Vec<TileTypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelParseError {
    pub line: usize,
    pub reason: String,
}

impl LevelParseError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

#[derive(Default)]
struct LayerRows {
    width: Option<usize>,
    rows: usize,
    ids: Vec<TileTypeId>,
}

impl LayerRows {
    fn push_row(
        &mut self,
        line: usize,
        row: Vec<TileTypeId>,
        expected_width: Option<usize>,
    ) -> Result<(), LevelParseError> {
        let expected = self.width.or(expected_width);
        if let Some(expected) = expected {
            if row.len() != expected {
                return Err(LevelParseError::new(
                    line,
                    format!("row has {} columns, expected {expected}", row.len()),
                ));
            }
        }
        self.width = Some(row.len());
        self.rows += 1;
        self.ids.extend(row);
        Ok(())
    }
}

pub fn parse_level(raw: &str) -> Result<LevelGrid, LevelParseError> {
    let mut foreground = LayerRows::default();
    let mut background = LayerRows::default();
    let mut separator_line: Option<usize> = None;

    for (index, text) in raw.lines().enumerate() {
        let line = index + 1;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == LAYER_SEPARATOR {
            if separator_line.is_some() {
                return Err(LevelParseError::new(line, "more than one layer separator"));
            }
            if foreground.rows == 0 {
                return Err(LevelParseError::new(line, "foreground layer has no rows"));
            }
            separator_line = Some(line);
            continue;
        }

        let row = parse_row(line, trimmed)?;
        if separator_line.is_none() {
            foreground.push_row(line, row, None)?;
        } else {
            background.push_row(line, row, foreground.width)?;
        }
    }

    let Some(separator_line) = separator_line else {
        return Err(LevelParseError::new(
            raw.lines().count().max(1),
            format!("missing '{LAYER_SEPARATOR}' line between foreground and background"),
        ));
    };
    if background.rows != foreground.rows {
        return Err(LevelParseError::new(
            separator_line,
            format!(
                "foreground has {} rows but background has {}",
                foreground.rows, background.rows
            ),
        ));
    }

    Ok(LevelGrid {
        width: foreground.width.unwrap_or(0),
        height: foreground.rows,
        foreground: foreground.ids,
        background: background.ids,
    })
}

fn parse_row(line: usize, text: &str) -> Result<Vec<TileTypeId>, LevelParseError> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<u16>().map(TileTypeId).map_err(|_| {
                LevelParseError::new(line, format!("'{token}' is not a tile type id"))
            })
        })
        .collect()
}

pub fn write_level(grid: &LevelGrid) -> String {
    let mut out = String::new();
    write_layer(&mut out, &grid.foreground, grid.width);
    out.push_str(LAYER_SEPARATOR);
    out.push('\n');
    write_layer(&mut out, &grid.background, grid.width);
    out
}

fn write_layer(out: &mut String, ids: &[TileTypeId], width: usize) {
    if width == 0 {
        return;
    }
    for row in ids.chunks(width) {
        for (col, id) in row.iter().enumerate() {
            if col > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{id}");
        }
        out.push('\n');
    }
}
