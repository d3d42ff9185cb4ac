// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::{Display, EnumString};
use unicode_width::UnicodeWidthStr;

/// Blank columns between two columns of the grid.
pub const COLUMN_GAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionLayout {
    pub columns: usize,
    pub rows: usize,
}

/// Terminal area available to the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub columns: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Candidate indices, column major. Every column but the last is full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionGrid {
    pub columns: Vec<Vec<usize>>,
}

impl CompletionGrid {
    /// Column and row of `index`.
    #[must_use]
    pub fn position_of(&self, index: usize) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(column, entries)| {
            entries
                .iter()
                .position(|it| *it == index)
                .map(|row| (column, row))
        })
    }

    #[must_use]
    pub fn first(&self) -> Option<usize> { self.columns.first()?.first().copied() }

    #[must_use]
    pub fn len(&self) -> usize { self.columns.iter().map(Vec::len).sum() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Rows of the grid, for rendering. Short columns leave `None` holes.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<Option<usize>>> {
        let row_count = self.columns.iter().map(Vec::len).max().unwrap_or(0);
        (0..row_count)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| column.get(row).copied())
                    .collect()
            })
            .collect()
    }
}

/// Smallest column count whose row count fits in `max_rows`. `None` means no row
/// limit: the grid is roughly square.
#[must_use]
pub fn compute_layout(len: usize, max_rows: Option<usize>) -> CompletionLayout {
    let Some(max_rows) = max_rows else {
        let columns = len.isqrt().max(1);
        let rows = len.div_ceil(columns).max(1);
        return CompletionLayout { columns, rows };
    };

    (1..=len.max(1))
        .map(|columns| CompletionLayout {
            columns,
            rows: len.div_ceil(columns),
        })
        .find(|it| it.rows <= max_rows)
        .unwrap_or(CompletionLayout {
            columns: 1,
            rows: len.max(1),
        })
}

/// Packs `0..len` into the columns of `layout`, top to bottom then left to right.
#[must_use]
pub fn build_grid(layout: CompletionLayout, len: usize) -> CompletionGrid {
    if layout.rows == 0 {
        return CompletionGrid::default();
    }
    let columns = (0..layout.columns)
        .map(|column| {
            let start = column * layout.rows;
            let end = (start + layout.rows).min(len);
            (start..end).collect::<Vec<_>>()
        })
        .filter(|it| !it.is_empty())
        .collect();
    CompletionGrid { columns }
}

/// Next active index after moving in `direction`.
///
/// - Up and down wrap inside the column.
/// - Left and right go to the same row of the neighbor column (or its last row if it
///   is shorter), wrapping from the last column to the first and back.
/// - An index that isn't in the grid moves to the first candidate.
///
/// `None` when there is nowhere to go (a single row column, a single column grid, or an
/// empty grid). The caller rings the bell.
#[must_use]
pub fn navigate(current: usize, direction: NavDirection, grid: &CompletionGrid) -> Option<usize> {
    if grid.is_empty() {
        return None;
    }
    let Some((column, row)) = grid.position_of(current) else {
        return grid.first();
    };
    let entries = &grid.columns[column];
    let last_row = entries.len() - 1;
    let last_column = grid.columns.len() - 1;

    match direction {
        NavDirection::Up | NavDirection::Down if last_row == 0 => None,
        NavDirection::Up => {
            let next = if row == 0 { last_row } else { row - 1 };
            entries.get(next).copied()
        }
        NavDirection::Down => {
            let next = if row == last_row { 0 } else { row + 1 };
            entries.get(next).copied()
        }
        NavDirection::Left | NavDirection::Right if last_column == 0 => None,
        NavDirection::Left => {
            let next = if column == 0 { last_column } else { column - 1 };
            pick_row(grid, next, row)
        }
        NavDirection::Right => {
            let next = if column == last_column { 0 } else { column + 1 };
            pick_row(grid, next, row)
        }
    }
}

fn pick_row(grid: &CompletionGrid, column: usize, row: usize) -> Option<usize> {
    let entries = grid.columns.get(column)?;
    let last_row = entries.len().checked_sub(1)?;
    entries.get(row.min(last_row)).copied()
}

/// Like [`compute_layout`], but the grid must also fit in `viewport`, w/ columns as wide
/// as their widest label plus [`COLUMN_GAP`]. `None` if it can't: the caller falls back
/// to a flat list.
#[must_use]
pub fn fit_layout(
    labels: &[&str],
    max_rows: Option<usize>,
    viewport: Viewport,
) -> Option<CompletionLayout> {
    let max_rows = max_rows.map_or(viewport.rows, |it| it.min(viewport.rows));
    let layout = compute_layout(labels.len(), Some(max_rows));
    if layout.rows > max_rows {
        return None;
    }
    let grid = build_grid(layout, labels.len());
    let width: usize = grid
        .columns
        .iter()
        .map(|column| {
            column
                .iter()
                .map(|index| labels[*index].width())
                .max()
                .unwrap_or(0)
                + COLUMN_GAP
        })
        .sum();
    (width <= viewport.columns).then_some(layout)
}
