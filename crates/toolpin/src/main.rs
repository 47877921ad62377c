mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use commands::setup::SetupOptions;
use context::Context;
use std::panic::{self, AssertUnwindSafe};
use toolpin_core::ToolpinError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    panic::set_hook(Box::new(|info| log::debug!("panic: {}", info)));

    if let Err(e) = guarded(|| run(cli)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Runs `f`, turning a panic into a generic internal error
fn guarded<F>(f: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| Err(ToolpinError::Internal.into()))
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::new(&cli.source)?;

    match cli.command {
        Commands::Install { version, json } => {
            commands::install::execute_install(&ctx, &version, json)
        }
        Commands::Setup {
            version,
            install_only,
            command,
            args,
        } => commands::setup::execute_setup(
            &ctx,
            SetupOptions {
                version,
                install_only,
                command,
                args,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_turns_panic_into_internal_error() {
        let err = guarded(|| panic!("index out of bounds")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ToolpinError>(),
            Some(ToolpinError::Internal)
        ));
        assert_eq!(err.to_string(), "INTERNAL_ERROR: Internal error");
        assert!(!err.to_string().contains("index out of bounds"));
    }

    #[test]
    fn test_guarded_passes_results_through() {
        assert!(guarded(|| Ok(())).is_ok());

        let err = guarded(|| Err(ToolpinError::CommandMissing.into())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolpinError>(),
            Some(ToolpinError::CommandMissing)
        ));
    }
}
