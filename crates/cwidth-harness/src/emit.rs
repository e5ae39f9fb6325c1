//! Header rendering.
//!
//! Turns a resolved [`TypeTable`] into C header text. Typedefs shared by
//! several headers are wrapped in a `_CWIDTH_<NAME>_DEFINED` guard so any
//! include order compiles; the registry has already guaranteed that every
//! copy agrees.

use std::fmt::Write as _;
use std::path::Path;

use cwidth_core::{Header, TypeTable};

use crate::error::HarnessError;
use crate::structured_log::{ArtifactIndex, HEADER_EMITTED, LogEmitter, LogLevel, Outcome};

fn shared(name: &str) -> bool {
    Header::ALL
        .into_iter()
        .filter(|header| *header != Header::Inttypes)
        .filter(|header| header.declares().contains(&name))
        .count()
        > 1
}

fn guard_macro(name: &str) -> String {
    format!("_CWIDTH_{}_DEFINED", name.to_ascii_uppercase())
}

/// Render one header.
#[must_use]
pub fn render_header(table: &TypeTable, header: Header) -> String {
    let include_guard = format!("_CWIDTH_{}_H_", header.name().to_ascii_uppercase());
    let mut out = String::new();
    let _ = writeln!(out, "/* {} generated by cwidth; do not edit. */", header.file_name());
    let _ = writeln!(out, "#ifndef {include_guard}");
    let _ = writeln!(out, "#define {include_guard}");
    out.push('\n');

    if header == Header::Inttypes {
        out.push_str("#include <stdint.h>\n\n");
        for format in table.format_macros() {
            let _ = writeln!(out, "#define {} {}", format.name, format.literal());
        }
    } else {
        render_typedefs(table, header, &mut out);
        let constants = table.constants_for(header);
        if !constants.is_empty() {
            out.push('\n');
        }
        for constant in constants {
            let _ = writeln!(out, "#define {} {}", constant.name, constant.definition());
        }
        let literals = table.literal_macros(header);
        if !literals.is_empty() {
            out.push('\n');
        }
        for literal in literals {
            let _ = writeln!(out, "#define {}(value) {}", literal.name, literal.definition());
        }
    }

    let _ = writeln!(out, "\n#endif /* {include_guard} */");
    out
}

fn render_typedefs(table: &TypeTable, header: Header, out: &mut String) {
    for name in header.declares() {
        let Some(entry) = table.get(name) else {
            let _ = writeln!(out, "/* {name}: no native type of this exact width */");
            continue;
        };
        let typedef = format!("typedef {} {};", entry.resolved.c_type(), name);
        if shared(name) {
            let guard = guard_macro(name);
            let _ = writeln!(out, "#ifndef {guard}\n#define {guard}\n{typedef}\n#endif");
        } else {
            let _ = writeln!(out, "{typedef}");
        }
    }
}

/// Write every header of `table` into `dir`, logging one event per file.
pub fn emit_headers(
    table: &TypeTable,
    dir: &Path,
    log: &mut LogEmitter,
) -> Result<ArtifactIndex, HarnessError> {
    std::fs::create_dir_all(dir)?;
    let mut index = ArtifactIndex::new(log.run_id());
    for header in table.headers() {
        let file_name = header.file_name();
        let body = render_header(table, *header);
        std::fs::write(dir.join(&file_name), &body)?;
        index.add_bytes(file_name.as_str(), "header", body.as_bytes());
        let entry = log
            .entry(LogLevel::Info, HEADER_EMITTED)
            .with_header(header.name())
            .with_outcome(Outcome::Pass)
            .with_artifacts(vec![file_name]);
        log.emit_entry(entry)?;
    }
    log.flush()?;
    Ok(index)
}
