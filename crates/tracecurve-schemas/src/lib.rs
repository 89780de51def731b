//! Schema definitions shared across the tracecurve pipeline.
//!
//! This crate holds the data structures every phase agrees on:
//!
//! - **Records**: trace events and configuration are plain
//!   [`serde_json::Value`]s, addressed by RFC 6901 JSON pointers
//!   (`/args/detail`). See [`record`].
//! - **Benchmark sets**: the case → instance → repetition forest handed to
//!   the aggregation engine. See [`BenchmarkSet`].
//! - **Group descriptors**: named constraint lists in their serialized
//!   form. Compilation lives in `tracecurve-predicates`.
//! - **Plot artifacts**: the rendering-agnostic output of the plotting
//!   strategies. See [`PlotArtifact`].
//!
//! ## Pipeline
//!
//! ```text
//! Record -> Predicate -> GroupDescriptor -> CurveAggregateMap -> PlotArtifact
//! ```

mod artifact;
mod benchmark;
mod descriptor;
mod error;
pub mod record;
#[cfg(test)]
mod testutil;

#[doc(inline)]
pub use artifact::*;
#[doc(inline)]
pub use benchmark::*;
#[doc(inline)]
pub use descriptor::*;
#[doc(inline)]
pub use error::LoadError;
