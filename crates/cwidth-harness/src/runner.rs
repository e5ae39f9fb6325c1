//! Resolution driver.
//!
//! Runs one table resolution for a descriptor and records every registry
//! commit in the structured log, then records how the run ended.

use cwidth_core::{
    EnvironmentDescriptor, Header, Policy, ResolutionEvent, TypeRegistry, TypeTable, WidthError,
};

use crate::error::HarnessError;
use crate::structured_log::{
    DESCRIPTOR_LOADED, DESCRIPTOR_MISSING_PARAMETER, LogEmitter, LogEntry, LogLevel, Outcome,
    TABLE_FAILED, TABLE_RESOLVED, TYPEDEF_ALREADY_BOUND, TYPEDEF_COMMITTED, TYPEDEF_CONFLICT,
    TYPEDEF_UNRESOLVED,
};

/// One resolution campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRun {
    pub policy: Policy,
    pub headers: Vec<Header>,
}

impl ResolutionRun {
    #[must_use]
    pub fn new(policy: Policy, headers: impl Into<Vec<Header>>) -> Self {
        Self {
            policy,
            headers: headers.into(),
        }
    }

    /// Every header under the given policy.
    #[must_use]
    pub fn all_headers(policy: Policy) -> Self {
        Self::new(policy, Header::ALL)
    }

    /// Resolve `descriptor`, logging as it goes.
    pub fn run(
        &self,
        source: &str,
        descriptor: &EnvironmentDescriptor,
        registry: &TypeRegistry,
        log: &mut LogEmitter,
    ) -> Result<TypeTable, HarnessError> {
        let loaded = log
            .entry(LogLevel::Info, DESCRIPTOR_LOADED)
            .with_source(source)
            .with_details(serde_json::json!({
                "parameters": descriptor.len(),
                "char_signed": descriptor.char_signed(),
                "sig_atomic_order": self.policy.sig_atomic_order.name(),
            }));
        log.emit_entry(loaded)?;

        let mut pending = Vec::new();
        let result = TypeTable::resolve_with(
            descriptor,
            self.policy,
            registry,
            &self.headers,
            |event| pending.push(event_entry(log, event)),
        );
        for entry in pending {
            log.emit_entry(entry)?;
        }

        match result {
            Ok(table) => {
                let resolved = log
                    .entry(LogLevel::Info, TABLE_RESOLVED)
                    .with_source(source)
                    .with_outcome(Outcome::Pass)
                    .with_details(serde_json::json!({
                        "headers": table.headers().iter().map(|h| h.name()).collect::<Vec<_>>(),
                        "types": table.types().count(),
                        "absent": table.absent().collect::<Vec<_>>(),
                        "constants": table.all_constants().count(),
                    }));
                log.emit_entry(resolved)?;
                log.flush()?;
                Ok(table)
            }
            Err(err) => {
                let entry = failure_entry(log, source, &err);
                log.emit_entry(entry)?;
                log.flush()?;
                Err(err.into())
            }
        }
    }
}

fn event_entry(log: &mut LogEmitter, event: ResolutionEvent<'_>) -> LogEntry {
    match event {
        ResolutionEvent::Bound {
            header,
            resolved,
            outcome,
        } => {
            let name = match outcome {
                cwidth_core::BindOutcome::Committed => TYPEDEF_COMMITTED,
                cwidth_core::BindOutcome::AlreadyBound => TYPEDEF_ALREADY_BOUND,
            };
            log.entry(LogLevel::Debug, name)
                .with_header(header.name())
                .with_resolved(resolved)
                .with_outcome(outcome.into())
        }
        ResolutionEvent::Unresolved { header, name } => log
            .entry(LogLevel::Info, TYPEDEF_UNRESOLVED)
            .with_header(header.name())
            .with_symbol(name)
            .with_outcome(Outcome::Unresolved),
    }
}

fn failure_entry(log: &mut LogEmitter, source: &str, err: &WidthError) -> LogEntry {
    let entry = match err {
        WidthError::MissingParameter { param } => log
            .entry(LogLevel::Error, DESCRIPTOR_MISSING_PARAMETER)
            .with_param(param.name()),
        WidthError::Conflict {
            name,
            committed,
            attempted,
        } => log
            .entry(LogLevel::Error, TYPEDEF_CONFLICT)
            .with_symbol(name.as_str())
            .with_outcome(Outcome::Conflict)
            .with_details(serde_json::json!({
                "committed": committed.c_type(),
                "attempted": attempted.c_type(),
            })),
        _ => log.entry(LogLevel::Error, TABLE_FAILED).with_outcome(Outcome::Fail),
    };
    entry.with_source(source).with_error(err.to_string())
}
