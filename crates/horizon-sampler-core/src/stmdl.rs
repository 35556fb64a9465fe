//! Stmdl: localization by value search on a streamable.
//!
//! An [`Stmdl`] wraps one [`Streamable`] and answers "where does this value
//! occur?" by running the streamable's forward or backward search, as
//! selected by its [`LocalizationMethod`].
//!
//! On [`reset`](Localizer::reset) it captures the values found at the
//! streamable's departure and arrival. Those values, not the positions,
//! bound what [`validate`](Localizer::validate) accepts, and one of them
//! becomes the reference that relative methods offset from.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sampler_core::{LocalizationMethod, Localizer, Series, Stmdl};
//!
//! let series = Arc::new(Series::new([1.0, 2.0, 4.0, 8.0]));
//! let stmdl = Stmdl::new(Some(series), LocalizationMethod::RelativeForward);
//! stmdl.reset().unwrap();
//!
//! // Reference is 1.0, so an offset of 3.0 looks for 4.0.
//! assert!(stmdl.validate(3.0));
//! assert_eq!(stmdl.locate_real(3.0).unwrap(), 2.0);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::localizer::{LocalizationMethod, Localizer};
use crate::logging::targets;
use crate::position::{Position, UNDEFINED};
use crate::stream::Streamable;

struct StmdlState {
    streamable: Option<Arc<dyn Streamable>>,
    method: LocalizationMethod,
    /// Value at the departure, captured on reset.
    locd: f64,
    /// Value at the arrival, captured on reset.
    loca: f64,
    /// Reference value for relative methods.
    rpos: f64,
}

impl StmdlState {
    fn in_bounds(&self, value: f64) -> bool {
        self.locd <= value && value <= self.loca
    }

    fn clear_bounds(&mut self) {
        self.locd = UNDEFINED;
        self.loca = UNDEFINED;
        self.rpos = UNDEFINED;
    }
}

/// A localizer that searches a wrapped streamable.
///
/// # Thread Safety
///
/// `Stmdl` guards its state with a `RwLock`. Localizing takes a shared lock
/// on the `Stmdl` and moves the wrapped streamable under that streamable's
/// own lock.
pub struct Stmdl {
    state: RwLock<StmdlState>,
}

impl Stmdl {
    /// Create a localizer, optionally wrapping `streamable`.
    ///
    /// The captured bounds are undefined until [`reset`](Localizer::reset)
    /// is called.
    pub fn new(streamable: Option<Arc<dyn Streamable>>, method: LocalizationMethod) -> Self {
        Self {
            state: RwLock::new(StmdlState {
                streamable,
                method,
                locd: UNDEFINED,
                loca: UNDEFINED,
                rpos: UNDEFINED,
            }),
        }
    }

    /// Create an absolute-forward localizer wrapping `streamable`.
    pub fn wrap(streamable: Arc<dyn Streamable>) -> Self {
        Self::new(Some(streamable), LocalizationMethod::default())
    }

    /// The wrapped streamable, if any.
    pub fn streamable(&self) -> Option<Arc<dyn Streamable>> {
        self.state.read().streamable.clone()
    }

    /// Replace the wrapped streamable. The captured bounds are cleared.
    pub fn set_streamable(&self, streamable: Option<Arc<dyn Streamable>>) {
        let mut state = self.state.write();
        state.streamable = streamable;
        state.clear_bounds();
    }

    /// The value captured at the departure on the last reset.
    pub fn departure_value(&self) -> f64 {
        self.state.read().locd
    }

    /// The value captured at the arrival on the last reset.
    pub fn arrival_value(&self) -> f64 {
        self.state.read().loca
    }

    /// The reference value relative methods offset from.
    pub fn reference(&self) -> f64 {
        self.state.read().rpos
    }
}

impl Localizer for Stmdl {
    fn reset(&self) -> Result<()> {
        let mut state = self.state.write();
        let Some(streamable) = state.streamable.clone() else {
            state.clear_bounds();
            return Ok(());
        };

        streamable.begin();
        state.locd = streamable.get_real()?;
        streamable.end();
        state.loca = streamable.get_real()?;

        if state.method.is_forward() {
            state.rpos = state.locd;
            streamable.begin();
        } else {
            state.rpos = state.loca;
        }

        tracing::debug!(
            target: targets::STMDL,
            method = %state.method,
            locd = state.locd,
            loca = state.loca,
            rpos = state.rpos,
            "localizer reset"
        );
        Ok(())
    }

    fn set_method(&self, method: LocalizationMethod) {
        self.state.write().method = method;
    }

    fn method(&self) -> LocalizationMethod {
        self.state.read().method
    }

    fn validate(&self, pval: f64) -> bool {
        let state = self.state.read();
        match state.method {
            LocalizationMethod::AbsoluteForward | LocalizationMethod::AbsoluteBackward => {
                state.in_bounds(pval)
            }
            LocalizationMethod::RelativeForward => state.in_bounds(state.rpos + pval),
            LocalizationMethod::RelativeBackward => state.in_bounds(state.rpos - pval),
        }
    }

    fn locate_bool(&self, pval: bool) -> Result<Position> {
        let state = self.state.read();
        let Some(streamable) = state.streamable.as_deref() else {
            return Ok(UNDEFINED);
        };
        if state.method.is_forward() {
            streamable.forward_bool(pval)
        } else {
            streamable.backward_bool(pval)
        }
    }

    fn locate_long(&self, pval: i64) -> Result<Position> {
        let state = self.state.read();
        let Some(streamable) = state.streamable.as_deref() else {
            return Ok(UNDEFINED);
        };
        let reference = if state.rpos.is_nan() { 0 } else { state.rpos as i64 };
        match state.method {
            LocalizationMethod::AbsoluteForward => streamable.forward_long(pval),
            LocalizationMethod::AbsoluteBackward => streamable.backward_long(pval),
            LocalizationMethod::RelativeForward => {
                streamable.forward_long(reference.saturating_add(pval))
            }
            LocalizationMethod::RelativeBackward => {
                streamable.backward_long(reference.saturating_sub(pval))
            }
        }
    }

    fn locate_real(&self, pval: f64) -> Result<Position> {
        let state = self.state.read();
        let Some(streamable) = state.streamable.as_deref() else {
            return Ok(UNDEFINED);
        };
        let pos = match state.method {
            LocalizationMethod::AbsoluteForward => streamable.forward(pval)?,
            LocalizationMethod::AbsoluteBackward => streamable.backward(pval)?,
            LocalizationMethod::RelativeForward => streamable.forward(state.rpos + pval)?,
            LocalizationMethod::RelativeBackward => streamable.backward(state.rpos - pval)?,
        };
        tracing::trace!(target: targets::STMDL, pval, pos, method = %state.method, "located");
        Ok(pos)
    }

    fn get_bool_at(&self, pos: Position) -> Result<bool> {
        match self.state.read().streamable.as_deref() {
            Some(streamable) => streamable.get_bool_at(pos),
            None => Ok(false),
        }
    }

    fn get_long_at(&self, pos: Position) -> Result<i64> {
        match self.state.read().streamable.as_deref() {
            Some(streamable) => streamable.get_long_at(pos),
            None => Ok(0),
        }
    }

    fn get_real_at(&self, pos: Position) -> Result<f64> {
        match self.state.read().streamable.as_deref() {
            Some(streamable) => streamable.get_real_at(pos),
            None => Ok(UNDEFINED),
        }
    }
}

impl fmt::Debug for Stmdl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Stmdl")
            .field("wrapped", &state.streamable.is_some())
            .field("method", &state.method)
            .field("locd", &state.locd)
            .field("loca", &state.loca)
            .field("rpos", &state.rpos)
            .finish()
    }
}

static_assertions::assert_impl_all!(Stmdl: Send, Sync);
