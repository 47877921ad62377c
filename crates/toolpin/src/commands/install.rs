//! `toolpin install` - resolve, fetch and cache one version

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::context::Context;
use crate::output::{print_json, print_line};

#[derive(Serialize)]
struct InstallOutput<'a> {
    path: &'a Path,
    cached: bool,
    version: String,
}

/// Execute `toolpin install <version>`
pub fn execute_install(ctx: &Context, version: &str, json: bool) -> Result<()> {
    let (spec, result) = ctx.install(version)?;

    if json {
        print_json(&InstallOutput {
            path: result.path(),
            cached: result.is_cached(),
            version: spec.to_string(),
        })?;
    } else {
        print_line(result.path().display())?;
    }

    Ok(())
}
