//! Coordmap is an N-dimensional coordinate mapping engine.
//!
//! The engine composes coordinate transforms ("mappings") in series or
//! in parallel, reduces compound transforms to behaviorally equivalent
//! minimal forms, and routes between coordinate systems ("frames")
//! organized in a connected graph.
//!
//! # Pipeline overview
//!
//! 1. **Compose**: leaf [`Mapping`]s combine into [`CompoundMap`]s,
//!    in series (`a` then `b`) or in parallel (disjoint axis ranges).
//! 2. **Simplify** (on demand): [`simplify`] folds mergeable neighbors
//!    and drops identities without changing observable behavior.
//! 3. **Apply**: mappings transform [`CoordBatch`]es of coordinate
//!    tuples, forward or inverse.
//! 4. **Route**: a [`FrameSet`] connects [`Frame`]s by edge mappings
//!    and synthesizes the transform between any two frames from the
//!    unique path joining them.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Shared, not aliased**: compounds share their operands through
//!   reference-counted handles; deep copies are always explicit.
//! - **Fail fast**: composition and graph mutations validate eagerly
//!   and leave structures unchanged on error.
//! - **Per-call results**: every failure is returned from the call that
//!   produced it; the engine keeps no error state between calls.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod frame;
mod frameset;
mod mapping;
mod simplify;

pub use foundation::coords::{CoordBatch, POINT_INLINE_AXES, Point};
pub use foundation::error::{CoordError, CoordResult};
pub use frame::frame::{Axis, Frame};
pub use frameset::set::{FrameId, FrameSet};
pub use frameset::structure::{FrameEdgeInfo, FrameNodeInfo, FrameSetStructure};
pub use mapping::affine::{AffineMap, MatrixMap, ShiftMap, ZoomMap};
pub use mapping::compound::{CompoundMap, CompoundMode};
pub use mapping::map::{InvertedMap, MapRef, Mapping, MappingExt, map_ref};
pub use mapping::perm::PermMap;
pub use mapping::unit::UnitMap;
pub use simplify::simplifier::simplify;
