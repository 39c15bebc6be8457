//! Serialization to the textual dictionary format.

use std::fmt::Write as _;

use crate::dictionary::Dictionary;
use crate::header::Header;
use crate::value::Value;

const INDENT: &str = "    ";
const KEY_WIDTH: usize = 16;

const SEPARATOR: &str =
    "// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //";

fn banner(version: (u32, u32)) -> String {
    let version = format!("{}.{}", version.0, version.1);
    format!(
        "/*--------------------------------*- C++ -*----------------------------------*\\\n\
         | =========                 |                                                 |\n\
         | \\\\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox           |\n\
         |  \\\\    /   O peration     | Version:  {version:<38}|\n\
         |   \\\\  /    A nd           | Web:      www.OpenFOAM.org                      |\n\
         |    \\\\/     M anipulation  |                                                 |\n\
         \\*---------------------------------------------------------------------------*/\n"
    )
}

pub(crate) fn write_header(out: &mut String, header: &Header) {
    out.push_str(&banner(header.banner_version));
    out.push_str("FoamFile\n{\n");
    let _ = writeln!(out, "{INDENT}{:<KEY_WIDTH$}{};", "version", header.version);
    let _ = writeln!(out, "{INDENT}{:<KEY_WIDTH$}{};", "format", header.format);
    let _ = writeln!(out, "{INDENT}{:<KEY_WIDTH$}{};", "class", header.class);
    if let Some(location) = &header.location {
        let _ = writeln!(out, "{INDENT}{:<KEY_WIDTH$}\"{location}\";", "location");
    }
    let _ = writeln!(out, "{INDENT}{:<KEY_WIDTH$}{};", "object", header.object);
    out.push_str("}\n");
    out.push_str(SEPARATOR);
    out.push_str("\n\n");
}

pub(crate) fn write_footer(out: &mut String) {
    out.push('\n');
    out.push_str(
        "// ************************************************************************* //\n",
    );
}

/// Write the entries of `dict` at the given nesting depth.
pub(crate) fn write_entries(out: &mut String, dict: &Dictionary, depth: usize) {
    for (key, value) in dict.iter() {
        write_entry(out, key, value, depth);
    }
}

fn write_entry(out: &mut String, key: &str, value: &Value, depth: usize) {
    let pad = INDENT.repeat(depth);
    match value {
        Value::Dict(d) => {
            let _ = writeln!(out, "{pad}{key}\n{pad}{{");
            write_entries(out, d, depth + 1);
            let _ = writeln!(out, "{pad}}}");
        }
        _ if key.starts_with('#') => {
            let _ = writeln!(out, "{pad}{key} {value}");
        }
        _ if value.is_empty() => {
            let _ = writeln!(out, "{pad}{key};");
        }
        _ if needs_block(value) => {
            let _ = write!(out, "{pad}{key}");
            write_block_value(out, value, depth);
            out.push_str(";\n");
        }
        _ => {
            let _ = writeln!(out, "{pad}{key:<KEY_WIDTH$} {value};");
        }
    }
}

/// Values holding dictionaries cannot be written inline.
fn needs_block(value: &Value) -> bool {
    match value {
        Value::Dict(_) => true,
        Value::List(items) | Value::Tuple(items) => items.iter().any(needs_block),
        _ => false,
    }
}

fn write_block_value(out: &mut String, value: &Value, depth: usize) {
    let pad = INDENT.repeat(depth);
    match value {
        Value::Dict(d) => {
            let _ = writeln!(out, "\n{pad}{{");
            write_entries(out, d, depth + 1);
            let _ = write!(out, "{pad}}}");
        }
        Value::List(items) => {
            let _ = writeln!(out, "\n{pad}(");
            for item in items {
                let inner = INDENT.repeat(depth + 1);
                if needs_block(item) {
                    out.push_str(&inner);
                    write_list_item(out, item, depth + 1);
                } else {
                    let _ = write!(out, "{inner}{item}");
                }
                out.push('\n');
            }
            let _ = write!(out, "{pad})");
        }
        Value::Tuple(items) => {
            for item in items {
                if needs_block(item) {
                    write_block_value(out, item, depth);
                } else {
                    let _ = write!(out, " {item}");
                }
            }
        }
        other => {
            let _ = write!(out, " {other}");
        }
    }
}

/// A block item inside a list: `name { ... }` or an anonymous `{ ... }`.
fn write_list_item(out: &mut String, item: &Value, depth: usize) {
    let pad = INDENT.repeat(depth);
    match item {
        Value::Tuple(parts) => {
            let mut first = true;
            for part in parts {
                match part {
                    Value::Dict(d) => {
                        let _ = writeln!(out, "\n{pad}{{");
                        write_entries(out, d, depth + 1);
                        let _ = write!(out, "{pad}}}");
                    }
                    other => {
                        if !first {
                            out.push(' ');
                        }
                        let _ = write!(out, "{other}");
                    }
                }
                first = false;
            }
        }
        Value::Dict(d) => {
            out.push_str("{\n");
            write_entries(out, d, depth + 1);
            let _ = write!(out, "{pad}}}");
        }
        other => write_block_value(out, other, depth),
    }
}

/// Patch list of a `polyMesh/boundary` file.
pub(crate) fn write_patch_list(out: &mut String, patches: &[(String, Dictionary)]) {
    let _ = writeln!(out, "{}\n(", patches.len());
    for (name, body) in patches {
        let _ = writeln!(out, "{INDENT}{name}\n{INDENT}{{");
        write_entries(out, body, 2);
        let _ = writeln!(out, "{INDENT}}}");
    }
    out.push_str(")\n");
}
