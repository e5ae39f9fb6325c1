//! Derived domain types.
//!
//! Each domain is realized by the kind whose width exactly matches the
//! domain's own descriptor parameter. There is no least-width fallback: a
//! pointer, size or character domain that no kind can hold is a fatal
//! configuration error. Signedness is fixed per domain, independent of the
//! realizing kind.

use serde::{Deserialize, Serialize};

use crate::config::Policy;
use crate::env::{EnvironmentDescriptor, Param};
use crate::error::WidthError;
use crate::kind::NativeKind;
use crate::resolve::{Family, ResolvedType, resolve};

const INT_LONG_LLONG: [NativeKind; 3] = [NativeKind::Int, NativeKind::Long, NativeKind::LongLong];

// `short` last so 16-bit wide characters still resolve.
const WIDE_ORDER: [NativeKind; 4] = [
    NativeKind::Int,
    NativeKind::Long,
    NativeKind::LongLong,
    NativeKind::Short,
];

const POINTER_ORDER: [NativeKind; 4] = [
    NativeKind::Int,
    NativeKind::Long,
    NativeKind::Short,
    NativeKind::LongLong,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Ptrdiff,
    Size,
    Intptr,
    Uintptr,
    Wchar,
    Wint,
    Wctrans,
    Wctype,
    SigAtomic,
    Clock,
    Time,
}

impl Domain {
    pub const ALL: [Domain; 11] = [
        Domain::Ptrdiff,
        Domain::Size,
        Domain::Intptr,
        Domain::Uintptr,
        Domain::Wchar,
        Domain::Wint,
        Domain::Wctrans,
        Domain::Wctype,
        Domain::SigAtomic,
        Domain::Clock,
        Domain::Time,
    ];

    /// Canonical type name.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Ptrdiff => "ptrdiff_t",
            Self::Size => "size_t",
            Self::Intptr => "intptr_t",
            Self::Uintptr => "uintptr_t",
            Self::Wchar => "wchar_t",
            Self::Wint => "wint_t",
            Self::Wctrans => "wctrans_t",
            Self::Wctype => "wctype_t",
            Self::SigAtomic => "sig_atomic_t",
            Self::Clock => "clock_t",
            Self::Time => "time_t",
        }
    }

    /// Descriptor parameter carrying the domain width.
    #[must_use]
    pub const fn param(self) -> Param {
        match self {
            Self::Ptrdiff => Param::Ptrdiff,
            Self::Size => Param::Size,
            Self::Intptr | Self::Uintptr => Param::Intptr,
            Self::Wchar => Param::Wchar,
            Self::Wint => Param::Wint,
            Self::Wctrans => Param::Wctrans,
            Self::Wctype => Param::Wctype,
            Self::SigAtomic => Param::SigAtomic,
            Self::Clock => Param::Clock,
            Self::Time => Param::Time,
        }
    }

    /// Signedness fixed by policy.
    #[must_use]
    pub const fn signed(self) -> bool {
        matches!(self, Self::Ptrdiff | Self::Intptr | Self::SigAtomic)
    }

    /// Candidate kinds, tried in order.
    #[must_use]
    pub fn order(self, policy: &Policy) -> &'static [NativeKind] {
        match self {
            Self::Intptr | Self::Uintptr => &POINTER_ORDER,
            Self::Wchar | Self::Wint | Self::Wctrans | Self::Wctype => &WIDE_ORDER,
            Self::SigAtomic => policy.sig_atomic_order.order(),
            Self::Ptrdiff | Self::Size | Self::Clock | Self::Time => &INT_LONG_LLONG,
        }
    }

    /// Resolve the domain against a descriptor.
    pub fn resolve(
        self,
        descriptor: &EnvironmentDescriptor,
        policy: &Policy,
    ) -> Result<ResolvedType, WidthError> {
        let width = descriptor.require(self.param())?;
        let kind = resolve(descriptor, width, Family::Exact, self.order(policy))?;
        ResolvedType::new(self.type_name(), kind, self.signed(), descriptor)
    }
}
