//! Resolved type table.
//!
//! [`TypeTable::resolve`] runs once per target configuration. It checks the
//! parameters every requested header needs, resolves each canonical name at
//! most once, binds every declaration through the shared [`TypeRegistry`],
//! and synthesizes the bound constants. The finished table is immutable.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::{
    Bound, BoundConstant, LiteralMacro, Rule, lookup, native_constants, weof,
};
use crate::config::Policy;
use crate::env::{EnvironmentDescriptor, Param};
use crate::error::WidthError;
use crate::headers::{Extra, Header};
use crate::inttypes::{FormatMacro, format_macros};
use crate::limits::{c_expressions, limits};
use crate::kind::NativeKind;
use crate::registry::{BindOutcome, TypeRegistry};
use crate::resolve::ResolvedType;

/// One resolved canonical name and everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeEntry {
    pub resolved: ResolvedType,
    pub rule: Rule,
    pub constants: Vec<BoundConstant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<LiteralMacro>,
}

/// Progress notifications from [`TypeTable::resolve_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionEvent<'a> {
    /// A header's declaration went through the registry.
    Bound {
        header: Header,
        resolved: &'a ResolvedType,
        outcome: BindOutcome,
    },
    /// An exact-width declaration has no realizing kind and is omitted.
    Unresolved { header: Header, name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTable {
    descriptor: EnvironmentDescriptor,
    policy: Policy,
    headers: Vec<Header>,
    types: BTreeMap<String, TypeEntry>,
    absent: BTreeSet<String>,
    native: Vec<BoundConstant>,
    weof: Option<BoundConstant>,
    rand_max: Option<BoundConstant>,
}

impl TypeTable {
    /// Resolve `headers` against `descriptor`, committing every declaration
    /// to `registry`.
    pub fn resolve(
        descriptor: &EnvironmentDescriptor,
        policy: Policy,
        registry: &TypeRegistry,
        headers: &[Header],
    ) -> Result<Self, WidthError> {
        Self::resolve_with(descriptor, policy, registry, headers, |_| {})
    }

    /// Like [`TypeTable::resolve`], reporting each bind to `observe`.
    pub fn resolve_with(
        descriptor: &EnvironmentDescriptor,
        policy: Policy,
        registry: &TypeRegistry,
        headers: &[Header],
        mut observe: impl FnMut(ResolutionEvent<'_>),
    ) -> Result<Self, WidthError> {
        descriptor.validate()?;
        let mut requested: Vec<Header> = Vec::with_capacity(headers.len());
        for header in headers {
            if !requested.contains(header) {
                requested.push(*header);
            }
        }
        // Every gap is reported before anything is declared.
        descriptor.require_all(requested.iter().flat_map(|h| h.requires().iter().copied()))?;

        let mut table = Self {
            descriptor: descriptor.clone(),
            policy,
            headers: requested.clone(),
            types: BTreeMap::new(),
            absent: BTreeSet::new(),
            native: Vec::new(),
            weof: None,
            rand_max: None,
        };

        for header in requested {
            for name in header.needs() {
                table.resolve_name(name)?;
            }
            for &name in header.declares() {
                match table.types.get(name) {
                    Some(entry) => {
                        let outcome = registry.bind_from(header.name(), &entry.resolved)?;
                        observe(ResolutionEvent::Bound {
                            header,
                            resolved: &entry.resolved,
                            outcome,
                        });
                    }
                    None => observe(ResolutionEvent::Unresolved { header, name }),
                }
            }
            for extra in header.extras() {
                table.resolve_extra(*extra)?;
            }
        }
        Ok(table)
    }

    fn resolve_name(&mut self, name: &str) -> Result<(), WidthError> {
        if self.types.contains_key(name) || self.absent.contains(name) {
            return Ok(());
        }
        let ty = lookup(name).ok_or_else(|| WidthError::InvalidParameter {
            param: String::from("type"),
            value: name.to_string(),
        })?;
        match ty.resolve(&self.descriptor, &self.policy)? {
            Some(resolved) => {
                let entry = TypeEntry {
                    constants: ty.constants(&resolved)?,
                    literal: ty.literal(&resolved),
                    rule: ty.rule,
                    resolved,
                };
                self.types.insert(name.to_string(), entry);
            }
            None => {
                self.absent.insert(name.to_string());
            }
        }
        Ok(())
    }

    fn resolve_extra(&mut self, extra: Extra) -> Result<(), WidthError> {
        match extra {
            Extra::NativeLimits if self.native.is_empty() => {
                self.native = native_constants(&self.descriptor)?;
            }
            Extra::Weof if self.weof.is_none() => {
                self.resolve_name("wint_t")?;
                if let Some(entry) = self.types.get("wint_t") {
                    self.weof = Some(weof(&entry.resolved)?);
                }
            }
            Extra::RandMax if self.rand_max.is_none() => {
                let width = self.descriptor.require(Param::Int)?;
                let set = limits(width, true)?;
                self.rand_max = Some(BoundConstant {
                    name: String::from("RAND_MAX"),
                    value: Bound::Unsigned(set.max),
                    expr: c_expressions(NativeKind::Int, width)?.max,
                    alias_of: None,
                });
            }
            _ => {}
        }
        Ok(())
    }

    #[must_use]
    pub fn descriptor(&self) -> &EnvironmentDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Headers in resolution order, without repeats.
    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// Realizing kind of a resolved name.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<NativeKind> {
        self.get(name).map(|entry| entry.resolved.kind)
    }

    /// Whether `name` is an exact-width type the target cannot provide.
    #[must_use]
    pub fn is_absent(&self, name: &str) -> bool {
        self.absent.contains(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }

    pub fn absent(&self) -> impl Iterator<Item = &str> {
        self.absent.iter().map(String::as_str)
    }

    /// `limits.h` constants, empty unless `limits` was requested.
    #[must_use]
    pub fn native_constants(&self) -> &[BoundConstant] {
        &self.native
    }

    /// Constants `header` defines, in emission order.
    #[must_use]
    pub fn constants_for(&self, header: Header) -> Vec<&BoundConstant> {
        let mut out: Vec<&BoundConstant> = header
            .bounds()
            .iter()
            .filter_map(|name| self.types.get(*name))
            .flat_map(|entry| entry.constants.iter())
            .collect();
        for extra in header.extras() {
            match extra {
                Extra::NativeLimits => out.extend(self.native.iter()),
                Extra::Weof => out.extend(self.weof.iter()),
                Extra::RandMax => out.extend(self.rand_max.iter()),
                Extra::LiteralMacros | Extra::FormatMacros => {}
            }
        }
        out
    }

    /// Literal constructors `header` defines.
    #[must_use]
    pub fn literal_macros(&self, header: Header) -> Vec<&LiteralMacro> {
        if !header.extras().contains(&Extra::LiteralMacros) {
            return Vec::new();
        }
        header
            .declares()
            .iter()
            .filter_map(|name| self.types.get(*name))
            .filter_map(|entry| entry.literal.as_ref())
            .collect()
    }

    /// `inttypes.h` format macros.
    #[must_use]
    pub fn format_macros(&self) -> Vec<FormatMacro> {
        format_macros(|name| self.kind_of(name))
    }

    /// Any constant the table synthesized, by name.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&BoundConstant> {
        self.all_constants().find(|constant| constant.name == name)
    }

    /// Every synthesized constant, each once.
    pub fn all_constants(&self) -> impl Iterator<Item = &BoundConstant> {
        self.types
            .values()
            .flat_map(|entry| entry.constants.iter())
            .chain(self.native.iter())
            .chain(self.weof.iter())
            .chain(self.rand_max.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Preset;

    fn resolve_all(descriptor: &EnvironmentDescriptor) -> Result<TypeTable, WidthError> {
        TypeTable::resolve(
            descriptor,
            Policy::default(),
            &TypeRegistry::new(),
            &Header::ALL,
        )
    }

    #[test]
    fn lp64_table() {
        let table = resolve_all(&Preset::Lp64.descriptor()).unwrap();
        assert_eq!(table.kind_of("int64_t"), Some(NativeKind::Long));
        assert_eq!(table.kind_of("int32_t"), Some(NativeKind::Int));
        assert_eq!(table.kind_of("uintmax_t"), Some(NativeKind::LongLong));
        assert_eq!(table.kind_of("size_t"), Some(NativeKind::Long));
        assert_eq!(table.absent().count(), 0);
        assert_eq!(
            table.constant("SIZE_MAX").unwrap().value,
            Bound::Unsigned(u128::from(u64::MAX))
        );
        assert_eq!(
            table.constant("INT_MIN").unwrap().value,
            Bound::Signed(i128::from(i32::MIN))
        );
        assert_eq!(
            table.constant("RAND_MAX").unwrap().value,
            Bound::Unsigned(i32::MAX as u128)
        );
        assert_eq!(
            table.constant("WEOF").unwrap().value,
            Bound::Unsigned(u128::from(u32::MAX))
        );
    }

    #[test]
    fn shared_names_bind_once() {
        let registry = TypeRegistry::new();
        let mut outcomes = Vec::new();
        TypeTable::resolve_with(
            &Preset::Ilp32.descriptor(),
            Policy::default(),
            &registry,
            &[Header::Stddef, Header::Stdio, Header::String],
            |event| {
                if let ResolutionEvent::Bound {
                    header,
                    resolved,
                    outcome,
                } = event
                {
                    if resolved.name == "size_t" {
                        outcomes.push((header, outcome));
                    }
                }
            },
        )
        .unwrap();
        assert_eq!(
            outcomes,
            [
                (Header::Stddef, BindOutcome::Committed),
                (Header::Stdio, BindOutcome::AlreadyBound),
                (Header::String, BindOutcome::AlreadyBound),
            ]
        );
        assert_eq!(registry.committed_by("size_t").as_deref(), Some("stddef"));
    }

    #[test]
    fn missing_parameter_is_reported_before_any_bind() {
        let registry = TypeRegistry::new();
        let descriptor = Preset::Lp64.descriptor().without(Param::Time);
        let err = TypeTable::resolve(
            &descriptor,
            Policy::default(),
            &registry,
            &[Header::Stddef, Header::Time],
        )
        .unwrap_err();
        assert_eq!(err, WidthError::MissingParameter { param: Param::Time });
        assert!(registry.is_empty());
    }

    #[test]
    fn second_configuration_conflicts_on_shared_registry() {
        let registry = TypeRegistry::new();
        TypeTable::resolve(
            &Preset::Lp64.descriptor(),
            Policy::default(),
            &registry,
            &[Header::Stddef],
        )
        .unwrap();
        let err = TypeTable::resolve(
            &Preset::Ilp32.descriptor(),
            Policy::default(),
            &registry,
            &[Header::Stddef],
        )
        .unwrap_err();
        assert!(matches!(err, WidthError::Conflict { ref name, .. } if name == "ptrdiff_t"));
        assert_eq!(registry.get("size_t").unwrap().width, 64);
    }

    #[test]
    fn thirty_six_bit_machine_omits_exact_types() {
        let descriptor = EnvironmentDescriptor::new()
            .with_width(Param::Char, 9)
            .with_width(Param::Short, 18)
            .with_width(Param::Int, 36)
            .with_width(Param::Long, 36)
            .with_width(Param::LongLong, 72)
            .with_width(Param::Intptr, 36)
            .with_width(Param::Size, 36)
            .with_width(Param::Ptrdiff, 36)
            .with_width(Param::SigAtomic, 36)
            .with_width(Param::Wchar, 36)
            .with_width(Param::Wint, 36);
        let table = TypeTable::resolve(
            &descriptor,
            Policy::default(),
            &TypeRegistry::new(),
            &[Header::Stdint],
        )
        .unwrap();
        for name in ["int8_t", "uint16_t", "int32_t", "uint64_t"] {
            assert!(table.is_absent(name), "{name}");
            assert!(table.get(name).is_none());
        }
        let least32 = table.get("int_least32_t").unwrap();
        assert_eq!(least32.resolved.width, 36);
        assert_eq!(
            table.constant("INT_LEAST32_MAX").unwrap().value,
            Bound::Unsigned((1 << 35) - 1)
        );
        assert_eq!(table.kind_of("int_least64_t"), Some(NativeKind::LongLong));
        assert!(table.constant("INT32_MAX").is_none());
        assert!(table.literal_macros(Header::Stdint).iter().all(|m| m.name != "INT32_C"));
    }

    #[test]
    fn header_constants_are_scoped() {
        let table = resolve_all(&Preset::Llp64.descriptor()).unwrap();
        let names = |header| -> Vec<String> {
            table
                .constants_for(header)
                .into_iter()
                .map(|c| c.name.clone())
                .collect()
        };
        assert!(names(Header::Stdio).is_empty());
        assert_eq!(names(Header::Wchar), ["WCHAR_MIN", "WCHAR_MAX", "WEOF"]);
        assert!(names(Header::Limits).contains(&String::from("CHAR_BIT")));
        assert!(names(Header::Stdint).contains(&String::from("UINTPTR_MAX")));
        assert_eq!(
            table.constant("WCHAR_MAX").unwrap().value,
            Bound::Unsigned(65535)
        );
    }

    #[test]
    fn duplicate_headers_resolve_once() {
        let table = TypeTable::resolve(
            &Preset::Lp64.descriptor(),
            Policy::default(),
            &TypeRegistry::new(),
            &[Header::Stdio, Header::Stdio, Header::String],
        )
        .unwrap();
        assert_eq!(table.headers(), [Header::Stdio, Header::String]);
    }
}
