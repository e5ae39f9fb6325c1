//! # cwidth-core
//!
//! Resolves the portable integer type names of a C environment onto the
//! native kinds of one target, and synthesizes their bounds without relying
//! on overflow.
//!
//! All resolution is a pure function of an [`EnvironmentDescriptor`]; the
//! only shared state is the [`TypeRegistry`] that keeps headers agreeing on
//! names they both declare. No `unsafe` code is permitted.

#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod derived;
pub mod env;
pub mod error;
pub mod headers;
pub mod inttypes;
pub mod kind;
pub mod limits;
pub mod registry;
pub mod resolve;
pub mod table;

pub use catalog::{Bound, BoundConstant, CanonicalType, LiteralMacro, Rule};
pub use config::{Policy, SigAtomicOrder};
pub use derived::Domain;
pub use env::{BitWidthSpec, EnvironmentDescriptor, Param, Preset};
pub use error::WidthError;
pub use headers::Header;
pub use kind::NativeKind;
pub use limits::{LimitSet, limits};
pub use registry::{BindOutcome, TypeRegistry, global_registry};
pub use resolve::{Family, ResolvedType, resolve};
pub use table::{ResolutionEvent, TypeEntry, TypeTable};
