//! Spsds: a streamable addressing a tabular data sheet.
//!
//! The iteration index walks one axis of a [`Table`]:
//!
//! | Mode | Fixed | Sample `k` |
//! |------|-------|------------|
//! | [`AddressingMode::Row`] | column `c` | cell `(k, c)` |
//! | [`AddressingMode::Column`] | row `r` | cell `(r, k)` |
//! | [`AddressingMode::Bundle`] | row `r`, column `c` | item `k` of the stack at `(r, c)` |
//! | [`AddressingMode::Marker`] | nothing | marker `k` |
//!
//! Positions round to the nearest index and clamp to `[0, bound - 1]`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sampler_core::{AddressingMode, MemoryTable, Spsds, Streamable};
//!
//! let table = Arc::new(MemoryTable::from_column([0.0, 10.0, 20.0]));
//! let spsds = Spsds::new(table);
//! spsds.set_column_index(0);
//! assert_eq!(spsds.mode(), AddressingMode::Row);
//! assert_eq!(spsds.get_real_at(1.6).unwrap(), 20.0);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SampleError};
use crate::logging::targets;
use crate::position::{self, Position, UNDEFINED};
use crate::stream::{Cursor, Stream};
use crate::table::{Cell, Table};

/// Which axis of the table the iteration index walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// Rows are iterated; the column is fixed.
    Row,
    /// Columns are iterated; the row is fixed.
    Column,
    /// The stack in a fixed cell is iterated.
    Bundle,
    /// The table's marker sequence is iterated.
    Marker,
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Row => "row",
            Self::Column => "column",
            Self::Bundle => "bundle",
            Self::Marker => "marker",
        };
        f.write_str(name)
    }
}

/// Fixed indices an [`Spsds`] is created with.
///
/// Both set selects bundle addressing, a row alone column addressing, a
/// column alone row addressing, and neither marker addressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpsdsConfig {
    /// Fixed row index.
    pub row: Option<usize>,
    /// Fixed column index.
    pub column: Option<usize>,
}

impl SpsdsConfig {
    /// Fix a row; columns are iterated.
    pub fn row(row: usize) -> Self {
        Self {
            row: Some(row),
            column: None,
        }
    }

    /// Fix a column; rows are iterated.
    pub fn column(column: usize) -> Self {
        Self {
            row: None,
            column: Some(column),
        }
    }

    /// Fix a cell; its stack is iterated.
    pub fn bundle(row: usize, column: usize) -> Self {
        Self {
            row: Some(row),
            column: Some(column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Addressing {
    Row { column: usize },
    Column { row: usize },
    Bundle { row: usize, column: usize },
    Marker,
}

impl Addressing {
    fn from_indices(row: Option<usize>, column: Option<usize>) -> Self {
        match (row, column) {
            (Some(row), Some(column)) => Self::Bundle { row, column },
            (Some(row), None) => Self::Column { row },
            (None, Some(column)) => Self::Row { column },
            (None, None) => Self::Marker,
        }
    }

    fn mode(self) -> AddressingMode {
        match self {
            Self::Row { .. } => AddressingMode::Row,
            Self::Column { .. } => AddressingMode::Column,
            Self::Bundle { .. } => AddressingMode::Bundle,
            Self::Marker => AddressingMode::Marker,
        }
    }
}

/// Cursor state of an [`Spsds`].
pub struct SheetCursor {
    table: Arc<dyn Table>,
    addressing: Addressing,
    index: usize,
}

impl SheetCursor {
    /// Number of samples along the addressed axis.
    fn bound(&self) -> usize {
        match self.addressing {
            Addressing::Row { .. } => self.table.row_count(),
            Addressing::Column { .. } => self.table.column_count(),
            Addressing::Bundle { row, column } => self.table.stack_len(row, column).unwrap_or(0),
            Addressing::Marker => self.table.marker_count(),
        }
    }

    /// The cell at the iteration index.
    fn current(&self) -> Result<Cell> {
        let index = self.index;
        let cell = match self.addressing {
            Addressing::Row { column } => self.table.cell(index, column),
            Addressing::Column { row } => self.table.cell(row, index),
            Addressing::Bundle { row, column } => match self.table.stack_item(row, column, index) {
                Some(item) => item,
                None => {
                    tracing::warn!(
                        target: targets::SPSDS,
                        row,
                        column,
                        "bundle addressing on a cell that is not a stack"
                    );
                    return Err(SampleError::not_a_stack(row, column));
                }
            },
            Addressing::Marker => self.table.marker(index),
        };
        Ok(cell)
    }

    fn readdress(&mut self, addressing: Addressing) {
        self.addressing = addressing;
        self.index = 0;
        tracing::debug!(
            target: targets::SPSDS,
            mode = %addressing.mode(),
            bound = self.bound(),
            "addressing changed"
        );
    }
}

impl Cursor for SheetCursor {
    fn arrival(&self) -> Position {
        position::last_position(self.bound())
    }

    fn locate(&self) -> Position {
        self.index as Position
    }

    fn seek(&mut self, pos: Position) -> Position {
        if position::is_undefined(pos) {
            return UNDEFINED;
        }
        self.index = position::to_index(pos, self.bound()).unwrap_or(0);
        self.locate()
    }

    fn read_bool(&self) -> Result<bool> {
        Ok(self.current()?.to_bool())
    }

    fn read_long(&self) -> Result<i64> {
        Ok(self.current()?.to_long())
    }

    fn read_real(&self) -> Result<f64> {
        Ok(self.current()?.to_real())
    }
}

/// A streamable over one axis of a table.
///
/// Changing the fixed indices switches the addressing mode and returns the
/// iteration index to `0`.
pub type Spsds = Stream<SheetCursor>;

impl Stream<SheetCursor> {
    /// Create a marker-addressed stream over `table`.
    pub fn new(table: Arc<dyn Table>) -> Self {
        Self::with_config(table, SpsdsConfig::default())
    }

    /// Create a stream with fixed indices from `config`.
    pub fn with_config(table: Arc<dyn Table>, config: SpsdsConfig) -> Self {
        Self::from_cursor(SheetCursor {
            table,
            addressing: Addressing::from_indices(config.row, config.column),
            index: 0,
        })
    }

    /// Fix the row and iterate columns.
    pub fn set_row_index(&self, row: usize) {
        self.with_write(|c| c.readdress(Addressing::Column { row }));
    }

    /// Fix the column and iterate rows.
    pub fn set_column_index(&self, column: usize) {
        self.with_write(|c| c.readdress(Addressing::Row { column }));
    }

    /// Fix both indices (bundle addressing), or fall back to the single
    /// index modes when only one is given.
    pub fn set_indices(&self, row: Option<usize>, column: Option<usize>) {
        self.with_write(|c| c.readdress(Addressing::from_indices(row, column)));
    }

    /// Drop the fixed indices and iterate markers.
    pub fn clear_indices(&self) {
        self.with_write(|c| c.readdress(Addressing::Marker));
    }

    /// The current addressing mode.
    pub fn mode(&self) -> AddressingMode {
        self.with_read(|c| c.addressing.mode())
    }

    /// The fixed row, if the mode has one.
    pub fn row_index(&self) -> Option<usize> {
        self.with_read(|c| match c.addressing {
            Addressing::Column { row } | Addressing::Bundle { row, .. } => Some(row),
            _ => None,
        })
    }

    /// The fixed column, if the mode has one.
    pub fn column_index(&self) -> Option<usize> {
        self.with_read(|c| match c.addressing {
            Addressing::Row { column } | Addressing::Bundle { column, .. } => Some(column),
            _ => None,
        })
    }

    /// The table being addressed.
    pub fn table(&self) -> Arc<dyn Table> {
        self.with_read(|c| c.table.clone())
    }
}

static_assertions::assert_impl_all!(Spsds: Send, Sync);
