//! Horizon Sampler - positional data sampling and interpolation.
//!
//! This is the main umbrella crate that re-exports all public APIs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sampler::prelude::*;
//!
//! let times = Arc::new(Lnrds::wrap(Arc::new(Series::new([0.0, 1.0, 2.0]))));
//! let values = Arc::new(Lnrds::wrap(Arc::new(Series::new([4.0, 8.0, 6.0]))));
//!
//! let sampler = Sampler::builder()
//!     .localizer(Arc::new(Stmdl::wrap(times)))
//!     .streamable(values)
//!     .build()?;
//!
//! assert_eq!(sampler.map_real(0.5)?, 6.0);
//! # Ok::<(), SampleError>(())
//! ```

pub use horizon_sampler_core::*;

pub mod host;

/// Prelude module with commonly used types.
pub mod prelude {
    pub use horizon_sampler_core::{
        Cell, LocalizationMethod, Lnrds, Localizer, MemoryTable, Position, Result, SampleError,
        Sampler, Series, Spsds, SpsdsConfig, Stmdl, Streamable, Table, UNDEFINED,
    };

    pub use crate::host::{HostObject, Value};
}
