//! Sampler: locate, then sample.
//!
//! A [`Sampler`] couples one [`Localizer`] with one [`Streamable`]. Each
//! `map_*` call asks the localizer where a target value occurs and reads
//! the streamable at that position, whatever search or interpolation
//! strategy sits underneath.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sampler_core::{Lnrds, Sampler, Series, Stmdl};
//!
//! // Time stamps and the readings taken at them.
//! let times = Arc::new(Lnrds::wrap(Arc::new(Series::new([0.0, 10.0, 20.0]))));
//! let readings = Arc::new(Lnrds::wrap(Arc::new(Series::new([5.0, 7.0, 3.0]))));
//!
//! let sampler = Sampler::builder()
//!     .localizer(Arc::new(Stmdl::wrap(times)))
//!     .streamable(readings)
//!     .build()
//!     .unwrap();
//!
//! // t = 5.0 lies halfway between the first two readings.
//! assert_eq!(sampler.map_real(5.0).unwrap(), 6.0);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::localizer::Localizer;
use crate::logging::{span_names, targets, PerfSpan};
use crate::position::{Position, UNDEFINED};
use crate::stream::Streamable;

#[derive(Default)]
struct Links {
    localizer: Option<Arc<dyn Localizer>>,
    streamable: Option<Arc<dyn Streamable>>,
}

impl Links {
    fn locate(&self, pval: f64) -> Result<Position> {
        match self.localizer.as_deref() {
            Some(localizer) => localizer.locate_real(pval),
            None => Ok(UNDEFINED),
        }
    }
}

/// Couples a localizer and a streamable into one value-to-value call.
///
/// Both collaborators are shared, not owned: the sampler holds `Arc`
/// handles and either may be absent, in which case the documented defaults
/// apply.
///
/// # Thread Safety
///
/// `Sampler` is `Send + Sync`. A `map_*` call holds a shared lock on the
/// sampler; `reset` and the setters take it exclusively.
#[derive(Default)]
pub struct Sampler {
    links: RwLock<Links>,
}

impl Sampler {
    /// Create a sampler over the given collaborators.
    pub fn new(
        localizer: Option<Arc<dyn Localizer>>,
        streamable: Option<Arc<dyn Streamable>>,
    ) -> Self {
        Self {
            links: RwLock::new(Links {
                localizer,
                streamable,
            }),
        }
    }

    /// Start building a sampler.
    pub fn builder() -> SamplerBuilder {
        SamplerBuilder::new()
    }

    /// The localizer, if any.
    pub fn localizer(&self) -> Option<Arc<dyn Localizer>> {
        self.links.read().localizer.clone()
    }

    /// The streamable, if any.
    pub fn streamable(&self) -> Option<Arc<dyn Streamable>> {
        self.links.read().streamable.clone()
    }

    /// Replace the localizer.
    pub fn set_localizer(&self, localizer: Option<Arc<dyn Localizer>>) {
        self.links.write().localizer = localizer;
    }

    /// Replace the streamable.
    pub fn set_streamable(&self, streamable: Option<Arc<dyn Streamable>>) {
        self.links.write().streamable = streamable;
    }

    /// Whether a localizer is attached.
    pub fn has_localizer(&self) -> bool {
        self.links.read().localizer.is_some()
    }

    /// Whether a streamable is attached.
    pub fn has_streamable(&self) -> bool {
        self.links.read().streamable.is_some()
    }

    /// Reset both collaborators and position the streamable at its
    /// departure.
    pub fn reset(&self) -> Result<()> {
        let links = self.links.write();
        if let Some(localizer) = links.localizer.as_deref() {
            localizer.reset()?;
        }
        if let Some(streamable) = links.streamable.as_deref() {
            streamable.reset();
            streamable.begin();
        }
        tracing::debug!(
            target: targets::SAMPLER,
            localizer = links.localizer.is_some(),
            streamable = links.streamable.is_some(),
            "sampler reset"
        );
        Ok(())
    }

    /// Whether the localizer accepts `pval`. False without a localizer.
    pub fn validate(&self, pval: f64) -> bool {
        self.links
            .read()
            .localizer
            .as_deref()
            .is_some_and(|localizer| localizer.validate(pval))
    }

    /// Locate `pval` and read a boolean there.
    pub fn map_bool(&self, pval: f64) -> Result<bool> {
        let _span = PerfSpan::new(span_names::MAP);
        let links = self.links.read();
        let pos = links.locate(pval)?;
        match links.streamable.as_deref() {
            Some(streamable) => streamable.get_bool_at(pos),
            None => Ok(false),
        }
    }

    /// Locate `pval` and read an integer there.
    pub fn map_long(&self, pval: f64) -> Result<i64> {
        let _span = PerfSpan::new(span_names::MAP);
        let links = self.links.read();
        let pos = links.locate(pval)?;
        match links.streamable.as_deref() {
            Some(streamable) => streamable.get_long_at(pos),
            None => Ok(0),
        }
    }

    /// Locate `pval` and read a real there.
    pub fn map_real(&self, pval: f64) -> Result<f64> {
        let _span = PerfSpan::new(span_names::MAP);
        let links = self.links.read();
        let pos = links.locate(pval)?;
        let value = match links.streamable.as_deref() {
            Some(streamable) => streamable.get_real_at(pos)?,
            None => UNDEFINED,
        };
        tracing::trace!(target: targets::SAMPLER, pval, pos, value, "mapped");
        Ok(value)
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links = self.links.read();
        f.debug_struct("Sampler")
            .field("localizer", &links.localizer.is_some())
            .field("streamable", &links.streamable.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(Sampler: Send, Sync);

/// Builder for creating a [`Sampler`].
#[derive(Default)]
pub struct SamplerBuilder {
    localizer: Option<Arc<dyn Localizer>>,
    streamable: Option<Arc<dyn Streamable>>,
    skip_reset: bool,
}

impl SamplerBuilder {
    /// Create a new SamplerBuilder with no collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the localizer.
    pub fn localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    /// Set the streamable.
    pub fn streamable(mut self, streamable: Arc<dyn Streamable>) -> Self {
        self.streamable = Some(streamable);
        self
    }

    /// Whether [`build`](Self::build) resets the sampler. Defaults to `true`.
    pub fn reset_on_build(mut self, reset: bool) -> Self {
        self.skip_reset = !reset;
        self
    }

    /// Build the sampler, resetting it unless disabled.
    pub fn build(self) -> Result<Sampler> {
        let sampler = Sampler::new(self.localizer, self.streamable);
        if !self.skip_reset {
            sampler.reset()?;
        }
        Ok(sampler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localizer::LocalizationMethod;
    use crate::stmdl::Stmdl;
    use crate::stream::Series;

    fn peak() -> Arc<Series> {
        Arc::new(Series::new([0.0, 10.0, 20.0, 10.0, 0.0]))
    }

    #[test]
    fn test_empty_sampler_defaults() {
        let sampler = Sampler::default();
        sampler.reset().unwrap();
        assert!(!sampler.validate(1.0));
        assert!(!sampler.map_bool(1.0).unwrap());
        assert_eq!(sampler.map_long(1.0).unwrap(), 0);
        assert!(sampler.map_real(1.0).unwrap().is_nan());
    }

    #[test]
    fn test_without_localizer_reads_default() {
        let sampler = Sampler::new(None, Some(peak()));
        assert!(sampler.map_real(10.0).unwrap().is_nan());
        assert_eq!(sampler.map_long(10.0).unwrap(), 0);
    }

    #[test]
    fn test_map_matches_locate_then_read() {
        let values = peak();
        let stmdl: Arc<dyn Localizer> = Arc::new(Stmdl::wrap(values.clone()));
        let sampler = Sampler::new(Some(stmdl.clone()), Some(values.clone()));

        for x in [0.0, 5.0, 10.0, 15.0, 20.0, 99.0] {
            sampler.reset().unwrap();
            let mapped = sampler.map_real(x).unwrap();

            sampler.reset().unwrap();
            let expected = values.get_real_at(stmdl.locate_real(x).unwrap()).unwrap();
            assert_eq!(mapped, expected, "at {x}");
        }
    }

    #[test]
    fn test_reset_positions_streamable() {
        let values = peak();
        let sampler = Sampler::new(None, Some(values.clone()));
        values.end();
        sampler.reset().unwrap();
        assert_eq!(values.locate(), 0.0);
    }

    #[test]
    fn test_validate_delegates() {
        let stmdl = Arc::new(Stmdl::new(
            Some(Arc::new(Series::new([1.0, 2.0, 3.0]))),
            LocalizationMethod::AbsoluteForward,
        ));
        let sampler = Sampler::builder().localizer(stmdl).build().unwrap();
        assert!(sampler.validate(2.5));
        assert!(!sampler.validate(3.5));
    }

    #[test]
    fn test_builder_without_reset() {
        let stmdl = Arc::new(Stmdl::wrap(peak()));
        let sampler = Sampler::builder()
            .localizer(stmdl.clone())
            .reset_on_build(false)
            .build()
            .unwrap();
        assert!(sampler.has_localizer());
        assert!(!sampler.has_streamable());
        assert!(stmdl.departure_value().is_nan());
    }

    #[test]
    fn test_replace_collaborators() {
        let sampler = Sampler::default();
        sampler.set_streamable(Some(peak()));
        sampler.set_localizer(Some(Arc::new(Stmdl::wrap(peak()))));
        assert!(sampler.localizer().is_some());
        assert!(sampler.streamable().is_some());
        assert_eq!(sampler.map_long(20.0).unwrap(), 20);

        sampler.set_localizer(None);
        assert!(!sampler.has_localizer());
    }
}
