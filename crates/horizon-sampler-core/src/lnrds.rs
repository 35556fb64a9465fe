//! Lnrds: piecewise-linear interpolation over another streamable.
//!
//! An [`Lnrds`] wraps an inner [`Streamable`] and keeps its own requested
//! position, independent of the inner source's native resolution. Reads
//! between two native samples are interpolated linearly; value searches are
//! refined from the inner source's coarse hit to the interpolated crossing.
//!
//! A read looks ahead on the inner source (step, read, restore) under the
//! interpolator's own look-ahead lock, so concurrent reads of one `Lnrds`
//! never interleave. The look-ahead is not atomic with respect to other
//! holders of the inner source; serialize access externally if the inner
//! source is shared across threads.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sampler_core::{Lnrds, Series, Streamable};
//!
//! let lnrds = Lnrds::wrap(Arc::new(Series::new([0.0, 10.0, 20.0])));
//! lnrds.move_to(0.25);
//! assert_eq!(lnrds.get_real().unwrap(), 2.5);
//! assert_eq!(lnrds.forward(15.0).unwrap(), 1.5);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::logging::targets;
use crate::position::{self, Position, UNDEFINED};
use crate::stream::{Cursor, Stream, Streamable};

/// Cursor state of an [`Lnrds`].
pub struct LinearCursor {
    inner: Option<Arc<dyn Streamable>>,
    spos: Position,
    /// Held across step, read and restore on the inner source.
    lookahead: Mutex<()>,
}

impl LinearCursor {
    /// Read at the requested position, interpolating between the inner
    /// sample the source sits on and its neighbour on the requested side.
    fn interpolated<F>(&self, read: F) -> Result<f64>
    where
        F: Fn(&dyn Streamable) -> Result<f64>,
    {
        let Some(inner) = self.inner.as_deref() else {
            return Ok(UNDEFINED);
        };
        let _lookahead = self.lookahead.lock();

        let base_pos = inner.locate();
        let base_val = read(inner)?;
        if base_pos == self.spos || position::is_undefined(self.spos) {
            return Ok(base_val);
        }

        let near_pos = if base_pos < self.spos {
            inner.next()
        } else {
            inner.prev()
        };
        let near_val = read(inner);
        inner.move_to(base_pos);
        let near_val = near_val?;

        if near_pos == base_pos || position::is_undefined(near_pos) {
            return Ok(base_val);
        }
        Ok(base_val + (near_val - base_val) / (near_pos - base_pos) * (self.spos - base_pos))
    }

    /// Coarse search on the inner source, then solve for the interpolated
    /// crossing of `target`.
    fn refine(&mut self, target: f64, forward: bool) -> Result<Position> {
        let Some(inner) = self.inner.clone() else {
            return Ok(if forward {
                self.arrival()
            } else {
                self.departure()
            });
        };

        if forward {
            inner.forward(target)?;
        } else {
            inner.backward(target)?;
        }
        // The inner search moved the source; follow it before refining.
        self.spos = inner.locate();

        let sval = self.read_real()?;
        if sval == target {
            return Ok(self.spos);
        }

        let npos = if forward { inner.next() } else { inner.prev() };
        let nval = inner.get_real();
        inner.move_to(self.spos);
        let nval = nval?;

        let slope = (nval - sval) / (npos - self.spos);
        let coarse = self.spos;
        let pos = coarse + (target - sval) / slope;
        let refined = if pos.is_finite() {
            self.seek(pos)
        } else if forward {
            let arrival = self.arrival();
            self.seek(arrival)
        } else {
            let departure = self.departure();
            self.seek(departure)
        };

        tracing::debug!(
            target: targets::LNRDS,
            value = target,
            coarse,
            refined,
            "refined search"
        );
        Ok(refined)
    }
}

impl Cursor for LinearCursor {
    fn departure(&self) -> Position {
        self.inner.as_ref().map_or(0.0, |inner| inner.departure())
    }

    fn arrival(&self) -> Position {
        self.inner.as_ref().map_or(UNDEFINED, |inner| inner.arrival())
    }

    fn locate(&self) -> Position {
        self.spos
    }

    fn seek(&mut self, pos: Position) -> Position {
        let Some(inner) = self.inner.as_deref() else {
            return UNDEFINED;
        };
        if position::is_undefined(pos) {
            return UNDEFINED;
        }

        let pos = position::clamp(pos, inner.departure(), inner.arrival());
        self.spos = if pos == inner.departure() {
            inner.begin()
        } else if pos == inner.arrival() {
            inner.end()
        } else {
            inner.move_to(pos);
            pos
        };
        self.spos
    }

    fn step_next(&mut self) -> Position {
        let Some(inner) = self.inner.as_deref() else {
            return UNDEFINED;
        };
        let base = inner.locate();
        self.spos = if base > self.spos { base } else { inner.next() };
        self.spos
    }

    fn step_prev(&mut self) -> Position {
        let Some(inner) = self.inner.as_deref() else {
            return UNDEFINED;
        };
        let base = inner.locate();
        self.spos = if base < self.spos { base } else { inner.prev() };
        self.spos
    }

    fn read_bool(&self) -> Result<bool> {
        match self.inner.as_deref() {
            Some(inner) => inner.get_bool(),
            None => Ok(false),
        }
    }

    fn read_long(&self) -> Result<i64> {
        let value = self.interpolated(|inner| inner.get_long().map(|v| v as f64))?;
        Ok(if value.is_nan() { 0 } else { value as i64 })
    }

    fn read_real(&self) -> Result<f64> {
        self.interpolated(|inner| inner.get_real())
    }

    fn search_forward(&mut self, target: f64) -> Result<Position> {
        self.refine(target, true)
    }

    fn search_backward(&mut self, target: f64) -> Result<Position> {
        self.refine(target, false)
    }
}

/// A streamable that linearly interpolates another streamable.
pub type Lnrds = Stream<LinearCursor>;

impl Stream<LinearCursor> {
    /// Create an interpolator, optionally wrapping `inner`.
    ///
    /// The requested position starts wherever `inner` currently is.
    pub fn new(inner: Option<Arc<dyn Streamable>>) -> Self {
        let spos = inner.as_ref().map_or(UNDEFINED, |inner| inner.locate());
        Self::from_cursor(LinearCursor {
            inner,
            spos,
            lookahead: Mutex::new(()),
        })
    }

    /// Create an interpolator wrapping `inner`.
    pub fn wrap(inner: Arc<dyn Streamable>) -> Self {
        Self::new(Some(inner))
    }

    /// The wrapped streamable, if any.
    pub fn inner(&self) -> Option<Arc<dyn Streamable>> {
        self.with_read(|c| c.inner.clone())
    }

    /// Replace the wrapped streamable.
    pub fn set_inner(&self, inner: Option<Arc<dyn Streamable>>) {
        self.with_write(|c| {
            c.spos = inner.as_ref().map_or(UNDEFINED, |inner| inner.locate());
            c.inner = inner;
        });
    }
}

static_assertions::assert_impl_all!(Lnrds: Send, Sync);
