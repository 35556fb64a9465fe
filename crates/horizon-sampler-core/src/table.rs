//! The tabular cell-storage collaborator.
//!
//! The sampling engine does not own tabular storage. It reads through the
//! [`Table`] trait, which any storage engine can implement. [`MemoryTable`]
//! is a simple in-memory implementation, useful on its own and in tests.

use std::fmt;

use parking_lot::RwLock;

/// A literal stored in a table cell.
///
/// A cell can be read as any of the three value types through best-effort
/// conversion. A [`Cell::Stack`] holds an ordered sequence of literals and
/// is what bundle addressing walks.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// No value.
    #[default]
    Empty,
    /// A boolean literal.
    Bool(bool),
    /// An integer literal.
    Long(i64),
    /// A real literal.
    Real(f64),
    /// A text literal, converted by parsing.
    Text(String),
    /// A stack of literals.
    Stack(Vec<Cell>),
}

impl Cell {
    /// Convert to a boolean.
    ///
    /// Numbers are true when non-zero, text when it reads as `true` or a
    /// non-zero number, stacks when non-empty.
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Bool(b) => *b,
            Self::Long(n) => *n != 0,
            Self::Real(r) => *r != 0.0 && !r.is_nan(),
            Self::Text(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    true
                } else if s.eq_ignore_ascii_case("false") {
                    false
                } else {
                    s.parse::<f64>().map(|r| r != 0.0 && !r.is_nan()).unwrap_or(false)
                }
            }
            Self::Stack(items) => !items.is_empty(),
        }
    }

    /// Convert to an integer. Reals are truncated toward zero.
    pub fn to_long(&self) -> i64 {
        match self {
            Self::Empty | Self::Stack(_) => 0,
            Self::Bool(b) => i64::from(*b),
            Self::Long(n) => *n,
            Self::Real(r) => real_to_long(*r),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(real_to_long))
                    .unwrap_or(0)
            }
        }
    }

    /// Convert to a real. Values with no numeric reading are undefined.
    pub fn to_real(&self) -> f64 {
        match self {
            Self::Empty | Self::Stack(_) => f64::NAN,
            Self::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Long(n) => *n as f64,
            Self::Real(r) => *r,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }

    /// Whether this cell holds a stack.
    pub fn is_stack(&self) -> bool {
        matches!(self, Self::Stack(_))
    }

    /// The stack contents, if this cell is a stack.
    pub fn as_stack(&self) -> Option<&[Cell]> {
        match self {
            Self::Stack(items) => Some(items),
            _ => None,
        }
    }
}

fn real_to_long(r: f64) -> i64 {
    if r.is_nan() {
        0
    } else {
        r as i64
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "<empty>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Stack(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Self::Long(i64::from(value))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Cell>> for Cell {
    fn from(value: Vec<Cell>) -> Self {
        Self::Stack(value)
    }
}

/// Read access to tabular cell storage.
///
/// Out-of-range reads return [`Cell::Empty`]. Implementations may lock
/// internally and must be shareable across threads.
pub trait Table: Send + Sync {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Number of columns.
    fn column_count(&self) -> usize;

    /// The cell at `(row, column)`.
    fn cell(&self, row: usize, column: usize) -> Cell;

    /// Length of the table's marker sequence.
    fn marker_count(&self) -> usize;

    /// The marker at `index`.
    fn marker(&self, index: usize) -> Cell;

    /// Length of the stack at `(row, column)`, or `None` if that cell is not
    /// a stack.
    ///
    /// The default reads the whole cell; storage that can borrow its cells
    /// should override this.
    fn stack_len(&self, row: usize, column: usize) -> Option<usize> {
        self.cell(row, column).as_stack().map(<[Cell]>::len)
    }

    /// Item `index` of the stack at `(row, column)`, or `None` if that cell
    /// is not a stack. Items past the end read as [`Cell::Empty`].
    fn stack_item(&self, row: usize, column: usize, index: usize) -> Option<Cell> {
        match self.cell(row, column) {
            Cell::Stack(mut items) if index < items.len() => Some(items.swap_remove(index)),
            Cell::Stack(_) => Some(Cell::Empty),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Sheet {
    rows: Vec<Vec<Cell>>,
    columns: usize,
    markers: Vec<Cell>,
}

/// An in-memory table with interior mutability.
///
/// Rows may be ragged; missing cells read as [`Cell::Empty`] and the column
/// count is the width of the widest row.
///
/// # Thread Safety
///
/// `MemoryTable` guards its contents with a `RwLock` and is `Send + Sync`.
#[derive(Debug, Default)]
pub struct MemoryTable {
    sheet: RwLock<Sheet>,
}

impl MemoryTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows of cells.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<Cell>,
    {
        let table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Create a one-column table.
    pub fn from_column<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        Self::from_rows(values.into_iter().map(|v| [v]))
    }

    /// Append a row.
    pub fn push_row<C>(&self, row: C)
    where
        C: IntoIterator,
        C::Item: Into<Cell>,
    {
        let row: Vec<Cell> = row.into_iter().map(Into::into).collect();
        let mut sheet = self.sheet.write();
        sheet.columns = sheet.columns.max(row.len());
        sheet.rows.push(row);
    }

    /// Overwrite the cell at `(row, column)`, growing the table as needed.
    pub fn set(&self, row: usize, column: usize, cell: impl Into<Cell>) {
        let mut sheet = self.sheet.write();
        if sheet.rows.len() <= row {
            sheet.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut sheet.rows[row];
        if cells.len() <= column {
            cells.resize(column + 1, Cell::Empty);
        }
        cells[column] = cell.into();
        sheet.columns = sheet.columns.max(column + 1);
    }

    /// Replace the marker sequence.
    pub fn set_markers<I>(&self, markers: I)
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        self.sheet.write().markers = markers.into_iter().map(Into::into).collect();
    }
}

impl Table for MemoryTable {
    fn row_count(&self) -> usize {
        self.sheet.read().rows.len()
    }

    fn column_count(&self) -> usize {
        self.sheet.read().columns
    }

    fn cell(&self, row: usize, column: usize) -> Cell {
        self.sheet
            .read()
            .rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .cloned()
            .unwrap_or_default()
    }

    fn marker_count(&self) -> usize {
        self.sheet.read().markers.len()
    }

    fn marker(&self, index: usize) -> Cell {
        self.sheet
            .read()
            .markers
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    fn stack_len(&self, row: usize, column: usize) -> Option<usize> {
        self.sheet
            .read()
            .rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(Cell::as_stack)
            .map(<[Cell]>::len)
    }

    fn stack_item(&self, row: usize, column: usize, index: usize) -> Option<Cell> {
        let sheet = self.sheet.read();
        let items = sheet.rows.get(row)?.get(column)?.as_stack()?;
        Some(items.get(index).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_conversions() {
        assert!(Cell::Long(3).to_bool());
        assert!(!Cell::Real(0.0).to_bool());
        assert!(Cell::Text("TRUE".into()).to_bool());
        assert!(!Cell::Empty.to_bool());

        assert_eq!(Cell::Real(2.9).to_long(), 2);
        assert_eq!(Cell::Real(-2.9).to_long(), -2);
        assert_eq!(Cell::Bool(true).to_long(), 1);
        assert_eq!(Cell::Text(" 42 ".into()).to_long(), 42);
        assert_eq!(Cell::Text("4.5".into()).to_long(), 4);

        assert_eq!(Cell::Long(7).to_real(), 7.0);
        assert!(Cell::Empty.to_real().is_nan());
        assert!(Cell::Text("abc".into()).to_real().is_nan());
    }

    #[test]
    fn test_cell_stack() {
        let cell = Cell::from(vec![Cell::Long(1), Cell::Long(2)]);
        assert!(cell.is_stack());
        assert_eq!(cell.as_stack().map(<[Cell]>::len), Some(2));
        assert_eq!(cell.to_string(), "[1, 2]");
        assert!(Cell::Long(1).as_stack().is_none());
    }

    #[test]
    fn test_memory_table_ragged_rows() {
        let table = MemoryTable::from_rows(vec![vec![1, 2, 3], vec![4]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(0, 2), Cell::Long(3));
        assert_eq!(table.cell(1, 2), Cell::Empty);
        assert_eq!(table.cell(9, 0), Cell::Empty);
    }

    #[test]
    fn test_memory_table_set_grows() {
        let table = MemoryTable::new();
        table.set(2, 1, 5.5);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell(2, 1), Cell::Real(5.5));
    }

    #[test]
    fn test_memory_table_stack_access() {
        let table = MemoryTable::from_rows(vec![vec![
            Cell::from(vec![Cell::Long(4), Cell::Long(5)]),
            Cell::Long(1),
        ]]);
        assert_eq!(table.stack_len(0, 0), Some(2));
        assert_eq!(table.stack_item(0, 0, 1), Some(Cell::Long(5)));
        assert_eq!(table.stack_item(0, 0, 2), Some(Cell::Empty));
        assert_eq!(table.stack_len(0, 1), None);
        assert_eq!(table.stack_item(0, 1, 0), None);
        assert_eq!(table.stack_len(3, 3), None);
    }

    /// A table with a single cell that only implements the required reads.
    struct SingleCell(Cell);

    impl Table for SingleCell {
        fn row_count(&self) -> usize {
            1
        }

        fn column_count(&self) -> usize {
            1
        }

        fn cell(&self, row: usize, column: usize) -> Cell {
            if row == 0 && column == 0 {
                self.0.clone()
            } else {
                Cell::Empty
            }
        }

        fn marker_count(&self) -> usize {
            0
        }

        fn marker(&self, _index: usize) -> Cell {
            Cell::Empty
        }
    }

    #[test]
    fn test_default_stack_access() {
        let table = SingleCell(Cell::from(vec![Cell::Real(0.5), Cell::Real(1.5)]));
        assert_eq!(table.stack_len(0, 0), Some(2));
        assert_eq!(table.stack_item(0, 0, 0), Some(Cell::Real(0.5)));
        assert_eq!(table.stack_item(0, 0, 7), Some(Cell::Empty));

        let plain = SingleCell(Cell::Real(1.0));
        assert_eq!(plain.stack_len(0, 0), None);
        assert_eq!(plain.stack_item(0, 0, 0), None);
    }

    #[test]
    fn test_memory_table_markers() {
        let table = MemoryTable::from_column([1.0, 2.0]);
        table.set_markers(["a", "b", "c"]);
        assert_eq!(table.marker_count(), 3);
        assert_eq!(table.marker(1), Cell::Text("b".into()));
        assert_eq!(table.marker(3), Cell::Empty);
    }
}
