//! Stdout is reserved for results; progress goes through the logger (stderr)

use serde::Serialize;
use std::io::{self, Write};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{rendered}")?;
    Ok(())
}

pub fn print_line(s: impl std::fmt::Display) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{s}")
}
