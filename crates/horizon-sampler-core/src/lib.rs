//! Core engine for Horizon Sampler.
//!
//! This crate treats discretely sampled data as a continuous function over a
//! bounded position, and resamples it at arbitrary positions or at the
//! position where a target value occurs:
//!
//! - **Streamables**: continuous position, bounded domain, typed reads and
//!   monotonic value search ([`Streamable`], [`Cursor`], [`Stream`])
//! - **Spsds**: addressing a table by row, column, bundle or marker axis
//! - **Lnrds**: piecewise-linear interpolation over another streamable
//! - **Localizers**: mapping a value to a position ([`Localizer`], [`Stmdl`])
//! - **Sampler**: "locate, then sample" in one call
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sampler_core::{MemoryTable, Sampler, Spsds, SpsdsConfig, Stmdl};
//!
//! let table = Arc::new(MemoryTable::from_column([0.0, 10.0, 20.0, 10.0, 0.0]));
//! let column = Arc::new(Spsds::with_config(table, SpsdsConfig::column(0)));
//!
//! let sampler = Sampler::builder()
//!     .localizer(Arc::new(Stmdl::wrap(column.clone())))
//!     .streamable(column)
//!     .build()?;
//!
//! // 15.0 is first crossed between rows 1 and 2; row 1 is the last sample
//! // not past it.
//! assert_eq!(sampler.map_real(15.0)?, 10.0);
//! # Ok::<(), horizon_sampler_core::SampleError>(())
//! ```

mod error;
pub mod lnrds;
pub mod localizer;
pub mod logging;
pub mod position;
pub mod sampler;
pub mod spsds;
pub mod stmdl;
pub mod stream;
pub mod table;

pub use error::{Result, SampleError};
pub use lnrds::{LinearCursor, Lnrds};
pub use localizer::{LocalizationMethod, Localizer};
pub use logging::PerfSpan;
pub use position::{Position, UNDEFINED};
pub use sampler::{Sampler, SamplerBuilder};
pub use spsds::{AddressingMode, SheetCursor, Spsds, SpsdsConfig};
pub use stmdl::Stmdl;
pub use stream::{Cursor, Series, SeriesCursor, Stream, Streamable};
pub use table::{Cell, MemoryTable, Table};
