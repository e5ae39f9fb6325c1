//! Machine-readable resolution report.

use serde::Serialize;

use cwidth_core::inttypes::FormatMacro;
use cwidth_core::{
    BoundConstant, EnvironmentDescriptor, Header, LiteralMacro, NativeKind, Policy, Rule,
    TypeTable,
};

/// One resolved canonical type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRow {
    pub name: String,
    pub c_type: String,
    pub kind: NativeKind,
    pub width: u32,
    pub signed: bool,
    pub rule: Rule,
}

/// Everything one table resolution produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub report_version: u32,
    pub source: String,
    pub policy: Policy,
    pub descriptor: EnvironmentDescriptor,
    pub headers: Vec<Header>,
    pub types: Vec<TypeRow>,
    /// Exact-width names the target cannot provide.
    pub absent: Vec<String>,
    pub constants: Vec<BoundConstant>,
    pub literal_macros: Vec<LiteralMacro>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub format_macros: Vec<FormatMacro>,
}

impl TableReport {
    #[must_use]
    pub fn from_table(table: &TypeTable, source: impl Into<String>) -> Self {
        let types = table
            .types()
            .map(|entry| TypeRow {
                name: entry.resolved.name.clone(),
                c_type: entry.resolved.c_type().to_string(),
                kind: entry.resolved.kind,
                width: entry.resolved.width,
                signed: entry.resolved.signed,
                rule: entry.rule,
            })
            .collect();
        let mut literal_macros: Vec<LiteralMacro> = Vec::new();
        for header in table.headers() {
            for literal in table.literal_macros(*header) {
                if !literal_macros.contains(literal) {
                    literal_macros.push(literal.clone());
                }
            }
        }
        let format_macros = if table.headers().contains(&Header::Inttypes) {
            table.format_macros()
        } else {
            Vec::new()
        };
        Self {
            report_version: 1,
            source: source.into(),
            policy: table.policy(),
            descriptor: table.descriptor().clone(),
            headers: table.headers().to_vec(),
            types,
            absent: table.absent().map(str::to_string).collect(),
            constants: table.all_constants().cloned().collect(),
            literal_macros,
            format_macros,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
