//! Streamables: continuous positions over sampled data.
//!
//! This module provides the two layers every data source is built from:
//!
//! - **[`Cursor`]**: the unsynchronized positioning state of a source. It
//!   supplies the domain, the current position, typed reads at that
//!   position, and inherits the shared forward/backward value search.
//! - **[`Streamable`]**: the thread-safe, object-safe interface consumers
//!   and decorators use. [`Stream<C>`] turns any cursor into a streamable by
//!   guarding it with a `RwLock`.
//!
//! # Value Search
//!
//! A forward search steps sample by sample toward the arrival. It stops on
//! the first sample that equals the target exactly, or as soon as two
//! consecutive samples bracket the target (ascending or descending); in that
//! case it steps back once so the result is the last sample not past the
//! target. A search that runs off the end returns the boundary position.
//! Backward searches mirror this toward the departure. Boolean searches
//! only ever match exactly.
//!
//! # Example
//!
//! ```
//! use horizon_sampler_core::{Series, Streamable};
//!
//! let series = Series::new([0.0, 10.0, 20.0, 10.0, 0.0]);
//! assert_eq!(series.arrival(), 4.0);
//! assert_eq!(series.forward(15.0).unwrap(), 1.0);
//! assert_eq!(series.get_real().unwrap(), 10.0);
//! ```

use std::fmt;

use parking_lot::RwLock;

use crate::error::Result;
use crate::logging::{span_names, targets, PerfSpan};
use crate::position::{self, Position, UNDEFINED};
use crate::table::Cell;

/// A thread-safe data source with a continuous, bounded position.
///
/// Every operation is linearized on the implementing instance: queries take
/// a shared lock, anything that moves the position takes an exclusive lock
/// for its whole duration.
pub trait Streamable: Send + Sync {
    /// Lower bound of the domain.
    fn departure(&self) -> Position;

    /// Upper bound of the domain, or [`UNDEFINED`] if unbounded.
    fn arrival(&self) -> Position;

    /// The current position.
    fn locate(&self) -> Position;

    /// Re-establish the initial state and return the position.
    fn reset(&self) -> Position;

    /// Move to the departure.
    fn begin(&self) -> Position;

    /// Move to the arrival.
    fn end(&self) -> Position;

    /// Move to `pos`, clamped into the domain. Returns the new position.
    fn move_to(&self, pos: Position) -> Position;

    /// Advance to the following sample.
    fn next(&self) -> Position;

    /// Advance by `incr`.
    fn next_by(&self, incr: Position) -> Position;

    /// Step back to the preceding sample.
    fn prev(&self) -> Position;

    /// Step back by `decr`.
    fn prev_by(&self, decr: Position) -> Position;

    /// Read the current sample as a boolean.
    fn get_bool(&self) -> Result<bool>;

    /// Read the current sample as an integer.
    fn get_long(&self) -> Result<i64>;

    /// Read the current sample as a real.
    fn get_real(&self) -> Result<f64>;

    /// Move to `pos`, then read a boolean.
    fn get_bool_at(&self, pos: Position) -> Result<bool>;

    /// Move to `pos`, then read an integer.
    fn get_long_at(&self, pos: Position) -> Result<i64>;

    /// Move to `pos`, then read a real.
    fn get_real_at(&self, pos: Position) -> Result<f64>;

    /// Search toward the arrival for `target`.
    fn forward(&self, target: f64) -> Result<Position>;

    /// Search toward the departure for `target`.
    fn backward(&self, target: f64) -> Result<Position>;

    /// Search toward the arrival for an integer `target`.
    fn forward_long(&self, target: i64) -> Result<Position>;

    /// Search toward the departure for an integer `target`.
    fn backward_long(&self, target: i64) -> Result<Position>;

    /// Search toward the arrival for a sample equal to `target`.
    fn forward_bool(&self, target: bool) -> Result<Position>;

    /// Search toward the departure for a sample equal to `target`.
    fn backward_bool(&self, target: bool) -> Result<Position>;
}

/// The positioning state behind a [`Stream`].
///
/// Only the domain, position and typed reads are source specific; every
/// default here matches an abstract source with no data: the domain starts
/// at `0` and is unbounded, there is no position, and reads yield `false`,
/// `0` and [`UNDEFINED`].
pub trait Cursor: Send + Sync {
    /// Lower bound of the domain.
    fn departure(&self) -> Position {
        0.0
    }

    /// Upper bound of the domain.
    fn arrival(&self) -> Position {
        UNDEFINED
    }

    /// The current position.
    fn locate(&self) -> Position {
        UNDEFINED
    }

    /// Move to `pos`, clamped into the domain.
    fn seek(&mut self, pos: Position) -> Position {
        let _ = pos;
        UNDEFINED
    }

    /// Advance to the following sample.
    fn step_next(&mut self) -> Position {
        let pos = self.locate();
        self.seek(pos + 1.0)
    }

    /// Step back to the preceding sample.
    fn step_prev(&mut self) -> Position {
        let pos = self.locate();
        self.seek(pos - 1.0)
    }

    /// Return to the initial state.
    fn rewind(&mut self) -> Position {
        let departure = self.departure();
        self.seek(departure)
    }

    /// Read the current sample as a boolean.
    fn read_bool(&self) -> Result<bool> {
        Ok(false)
    }

    /// Read the current sample as an integer.
    fn read_long(&self) -> Result<i64> {
        Ok(0)
    }

    /// Read the current sample as a real.
    fn read_real(&self) -> Result<f64> {
        Ok(UNDEFINED)
    }

    /// Search toward the arrival for `target`.
    fn search_forward(&mut self, target: f64) -> Result<Position> {
        scan(self, Direction::Forward, target, |c| c.read_real(), true)
    }

    /// Search toward the departure for `target`.
    fn search_backward(&mut self, target: f64) -> Result<Position> {
        scan(self, Direction::Backward, target, |c| c.read_real(), true)
    }

    /// Search toward the arrival for an integer `target`.
    fn search_forward_long(&mut self, target: i64) -> Result<Position> {
        scan(self, Direction::Forward, target, |c| c.read_long(), true)
    }

    /// Search toward the departure for an integer `target`.
    fn search_backward_long(&mut self, target: i64) -> Result<Position> {
        scan(self, Direction::Backward, target, |c| c.read_long(), true)
    }

    /// Search toward the arrival for a boolean `target`.
    fn search_forward_bool(&mut self, target: bool) -> Result<Position> {
        scan(self, Direction::Forward, target, |c| c.read_bool(), false)
    }

    /// Search toward the departure for a boolean `target`.
    fn search_backward_bool(&mut self, target: bool) -> Result<Position> {
        scan(self, Direction::Backward, target, |c| c.read_bool(), false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Whether another step is possible from `pos`.
    fn can_step<C: Cursor + ?Sized>(self, cursor: &C, pos: Position) -> bool {
        match self {
            Self::Forward => pos < cursor.arrival(),
            Self::Backward => pos > cursor.departure(),
        }
    }

    fn step<C: Cursor + ?Sized>(self, cursor: &mut C) -> Position {
        match self {
            Self::Forward => cursor.step_next(),
            Self::Backward => cursor.step_prev(),
        }
    }

    fn step_back<C: Cursor + ?Sized>(self, cursor: &mut C) -> Position {
        match self {
            Self::Forward => cursor.step_prev(),
            Self::Backward => cursor.step_next(),
        }
    }

    fn boundary<C: Cursor + ?Sized>(self, cursor: &C) -> Position {
        match self {
            Self::Forward => cursor.arrival(),
            Self::Backward => cursor.departure(),
        }
    }
}

/// Whether the step from `last` to `value` strictly brackets `target`.
fn crossed<T: PartialOrd>(last: T, value: T, target: T) -> bool {
    let ascending = value > last && last < target && target < value;
    let descending = value < last && last > target && target > value;
    ascending || descending
}

/// The shared sample-by-sample value search.
fn scan<C, T, F>(
    cursor: &mut C,
    direction: Direction,
    target: T,
    read: F,
    follow_trend: bool,
) -> Result<Position>
where
    C: Cursor + ?Sized,
    T: PartialOrd + Copy + fmt::Debug,
    F: Fn(&C) -> Result<T>,
{
    let mut pos = cursor.locate();
    let mut last = read(&*cursor)?;
    if last == target {
        return Ok(pos);
    }

    while direction.can_step(&*cursor, pos) {
        let stepped = direction.step(cursor);
        if position::is_undefined(stepped) || stepped == pos {
            break;
        }
        pos = stepped;

        let value = read(&*cursor)?;
        if value == target {
            tracing::trace!(target: targets::STREAM, value = ?target, pos, "exact hit");
            return Ok(pos);
        }
        if follow_trend && crossed(last, value, target) {
            let settled = direction.step_back(cursor);
            tracing::trace!(
                target: targets::STREAM,
                value = ?target,
                pos = settled,
                "crossed target"
            );
            return Ok(settled);
        }
        last = value;
    }

    let boundary = direction.boundary(&*cursor);
    tracing::trace!(
        target: targets::STREAM,
        value = ?target,
        boundary,
        ?direction,
        "search exhausted"
    );
    Ok(boundary)
}

/// A [`Cursor`] guarded by a `RwLock`, exposed as a [`Streamable`].
///
/// # Thread Safety
///
/// `Stream<C>` is `Send + Sync` whenever the cursor is. Operations are
/// linearized per stream; nothing orders two distinct streams accessed
/// concurrently.
pub struct Stream<C> {
    cursor: RwLock<C>,
}

impl<C: Cursor> Stream<C> {
    /// Wrap a cursor.
    pub fn from_cursor(cursor: C) -> Self {
        Self {
            cursor: RwLock::new(cursor),
        }
    }

    /// Execute a function with shared access to the cursor.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&C) -> R,
    {
        f(&self.cursor.read())
    }

    /// Execute a function with exclusive access to the cursor.
    pub fn with_write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut C) -> R,
    {
        f(&mut self.cursor.write())
    }

    /// Move to `pos` and read with `read`, or yield `fallback` if the move
    /// produced no position.
    fn read_at<T, F>(&self, pos: Position, fallback: T, read: F) -> Result<T>
    where
        F: FnOnce(&C) -> Result<T>,
    {
        let mut cursor = self.cursor.write();
        if position::is_undefined(cursor.seek(pos)) {
            return Ok(fallback);
        }
        read(&cursor)
    }
}

impl<C: Cursor> Streamable for Stream<C> {
    fn departure(&self) -> Position {
        self.cursor.read().departure()
    }

    fn arrival(&self) -> Position {
        self.cursor.read().arrival()
    }

    fn locate(&self) -> Position {
        self.cursor.read().locate()
    }

    fn reset(&self) -> Position {
        self.cursor.write().rewind()
    }

    fn begin(&self) -> Position {
        let mut cursor = self.cursor.write();
        let departure = cursor.departure();
        cursor.seek(departure)
    }

    fn end(&self) -> Position {
        let mut cursor = self.cursor.write();
        let arrival = cursor.arrival();
        cursor.seek(arrival)
    }

    fn move_to(&self, pos: Position) -> Position {
        let moved = self.cursor.write().seek(pos);
        tracing::trace!(target: targets::STREAM, requested = pos, moved, "move");
        moved
    }

    fn next(&self) -> Position {
        self.cursor.write().step_next()
    }

    fn next_by(&self, incr: Position) -> Position {
        let mut cursor = self.cursor.write();
        let pos = cursor.locate();
        cursor.seek(pos + incr)
    }

    fn prev(&self) -> Position {
        self.cursor.write().step_prev()
    }

    fn prev_by(&self, decr: Position) -> Position {
        let mut cursor = self.cursor.write();
        let pos = cursor.locate();
        cursor.seek(pos - decr)
    }

    fn get_bool(&self) -> Result<bool> {
        self.cursor.read().read_bool()
    }

    fn get_long(&self) -> Result<i64> {
        self.cursor.read().read_long()
    }

    fn get_real(&self) -> Result<f64> {
        self.cursor.read().read_real()
    }

    fn get_bool_at(&self, pos: Position) -> Result<bool> {
        self.read_at(pos, false, |c| c.read_bool())
    }

    fn get_long_at(&self, pos: Position) -> Result<i64> {
        self.read_at(pos, 0, |c| c.read_long())
    }

    fn get_real_at(&self, pos: Position) -> Result<f64> {
        self.read_at(pos, UNDEFINED, |c| c.read_real())
    }

    fn forward(&self, target: f64) -> Result<Position> {
        let _span = PerfSpan::new(span_names::SEARCH);
        self.cursor.write().search_forward(target)
    }

    fn backward(&self, target: f64) -> Result<Position> {
        let _span = PerfSpan::new(span_names::SEARCH);
        self.cursor.write().search_backward(target)
    }

    fn forward_long(&self, target: i64) -> Result<Position> {
        self.cursor.write().search_forward_long(target)
    }

    fn backward_long(&self, target: i64) -> Result<Position> {
        self.cursor.write().search_backward_long(target)
    }

    fn forward_bool(&self, target: bool) -> Result<Position> {
        self.cursor.write().search_forward_bool(target)
    }

    fn backward_bool(&self, target: bool) -> Result<Position> {
        self.cursor.write().search_backward_bool(target)
    }
}

impl<C: Cursor> fmt::Debug for Stream<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cursor = self.cursor.read();
        f.debug_struct("Stream")
            .field("cursor", &std::any::type_name::<C>())
            .field("departure", &cursor.departure())
            .field("arrival", &cursor.arrival())
            .field("position", &cursor.locate())
            .finish()
    }
}

/// Cursor over an in-memory sequence of samples at integer positions.
#[derive(Debug, Clone, Default)]
pub struct SeriesCursor {
    samples: Vec<Cell>,
    index: usize,
}

impl SeriesCursor {
    fn current(&self) -> Cell {
        self.samples.get(self.index).cloned().unwrap_or_default()
    }
}

impl Cursor for SeriesCursor {
    fn arrival(&self) -> Position {
        position::last_position(self.samples.len())
    }

    fn locate(&self) -> Position {
        self.index as Position
    }

    fn seek(&mut self, pos: Position) -> Position {
        match position::to_index(pos, self.samples.len()) {
            Some(index) => {
                self.index = index;
                self.locate()
            }
            None if self.samples.is_empty() && !position::is_undefined(pos) => 0.0,
            None => UNDEFINED,
        }
    }

    fn read_bool(&self) -> Result<bool> {
        Ok(self.current().to_bool())
    }

    fn read_long(&self) -> Result<i64> {
        Ok(self.current().to_long())
    }

    fn read_real(&self) -> Result<f64> {
        Ok(self.current().to_real())
    }
}

/// A streamable over an in-memory sequence of samples.
///
/// Sample `k` sits at position `k`; moves round to the nearest sample.
pub type Series = Stream<SeriesCursor>;

impl Stream<SeriesCursor> {
    /// Create a series positioned at its first sample.
    pub fn new<I>(samples: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        Self::from_cursor(SeriesCursor {
            samples: samples.into_iter().map(Into::into).collect(),
            index: 0,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.with_read(|c| c.samples.len())
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static_assertions::assert_impl_all!(Series: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// A cursor that only provides the abstract defaults.
    struct Abstract;

    impl Cursor for Abstract {}

    fn peak() -> Series {
        Series::new([0.0, 10.0, 20.0, 10.0, 0.0])
    }

    #[test]
    fn test_abstract_defaults() {
        let stream = Stream::from_cursor(Abstract);
        assert_eq!(stream.departure(), 0.0);
        assert!(position::is_undefined(stream.arrival()));
        assert!(position::is_undefined(stream.locate()));
        assert!(position::is_undefined(stream.move_to(3.0)));
        assert!(!stream.get_bool().unwrap());
        assert_eq!(stream.get_long().unwrap(), 0);
        assert!(stream.get_real().unwrap().is_nan());
    }

    #[test]
    fn test_abstract_search_degrades_to_sentinel() {
        let stream = Stream::from_cursor(Abstract);
        assert!(position::is_undefined(stream.forward(1.0).unwrap()));
        assert_eq!(stream.backward(1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_move_clamps_into_domain() {
        let series = peak();
        assert_eq!(series.move_to(series.departure() - 1.0), series.departure());
        assert_eq!(series.move_to(series.arrival() + 1.0), series.arrival());
    }

    #[test]
    fn test_begin_end_next_prev() {
        let series = peak();
        assert_eq!(series.end(), 4.0);
        assert_eq!(series.next(), 4.0);
        assert_eq!(series.prev(), 3.0);
        assert_eq!(series.prev_by(2.0), 1.0);
        assert_eq!(series.next_by(2.0), 3.0);
        assert_eq!(series.begin(), 0.0);
        assert_eq!(series.prev(), 0.0);
    }

    #[test]
    fn test_get_at_moves() {
        let series = peak();
        assert_eq!(series.get_real_at(2.0).unwrap(), 20.0);
        assert_eq!(series.locate(), 2.0);
        assert_eq!(series.get_long_at(3.0).unwrap(), 10);
        assert!(series.get_bool_at(1.0).unwrap());
        assert!(!series.get_bool_at(0.0).unwrap());
    }

    #[test]
    fn test_get_at_undefined_position_reads_default() {
        let series = peak();
        series.move_to(2.0);
        assert!(series.get_real_at(UNDEFINED).unwrap().is_nan());
        assert_eq!(series.get_long_at(UNDEFINED).unwrap(), 0);
        assert_eq!(series.locate(), 2.0);
    }

    #[test]
    fn test_forward_hits_every_sample_of_monotonic_sequence() {
        let values = [1.0, 3.0, 4.0, 8.0, 9.5];
        for (k, v) in values.iter().enumerate() {
            let series = Series::new(values);
            assert_eq!(series.forward(*v).unwrap(), k as Position);
        }
    }

    #[test]
    fn test_forward_crossing_steps_back() {
        let series = peak();
        assert_eq!(series.forward(15.0).unwrap(), 1.0);
        assert_eq!(series.locate(), 1.0);
    }

    #[test]
    fn test_forward_descending_crossing() {
        let series = peak();
        series.move_to(2.0);
        assert_eq!(series.forward(5.0).unwrap(), 3.0);
    }

    #[test]
    fn test_forward_exhaustion_returns_arrival() {
        let series = peak();
        assert_eq!(series.forward(99.0).unwrap(), 4.0);
    }

    #[test]
    fn test_backward_search() {
        let series = peak();
        series.end();
        assert_eq!(series.backward(15.0).unwrap(), 3.0);
        assert_eq!(series.backward(20.0).unwrap(), 2.0);
        assert_eq!(series.backward(-1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_long_search() {
        let series = Series::new([0, 2, 4, 6]);
        assert_eq!(series.forward_long(4).unwrap(), 2.0);
        series.begin();
        assert_eq!(series.forward_long(5).unwrap(), 2.0);
        assert_eq!(series.backward_long(0).unwrap(), 0.0);
    }

    #[test]
    fn test_bool_search_is_exact_only() {
        let series = Series::new([false, false, true, false]);
        assert_eq!(series.forward_bool(true).unwrap(), 2.0);
        assert_eq!(series.forward_bool(false).unwrap(), 3.0);
        series.end();
        assert_eq!(series.backward_bool(true).unwrap(), 2.0);

        let never = Series::new([false, false]);
        assert_eq!(never.forward_bool(true).unwrap(), 1.0);
    }

    #[test]
    fn test_reset_returns_to_departure() {
        let series = peak();
        series.end();
        assert_eq!(series.reset(), 0.0);
        assert_eq!(series.locate(), 0.0);
    }

    #[test]
    fn test_empty_series() {
        let series = Series::new(Vec::<f64>::new());
        assert!(series.is_empty());
        assert_eq!(series.arrival(), 0.0);
        assert_eq!(series.move_to(5.0), 0.0);
        assert!(series.get_real().unwrap().is_nan());
        assert_eq!(series.forward(1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_stream_thread_safe() {
        let series = Arc::new(peak());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let series = series.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let pos = series.move_to((i % 5) as Position);
                        assert!((0.0..=4.0).contains(&pos));
                        let _ = series.get_real().unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }
}
