//! wflint CLI binary entry point.
//! Resolves configuration, lints the discovered workflows and exits with
//! a code derived from the highest severity found.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wflint::cli::{Cli, Commands};
use wflint::registry::http::HttpTransport;
use wflint::registry::{ActionRegistry, GithubRegistry, OfflineRegistry};
use wflint::{config, discover, lint, output, utils};

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_registry(eff: &config::Effective) -> Box<dyn ActionRegistry> {
    if eff.offline {
        tracing::info!("offline mode: registry lookups disabled");
        return Box::new(OfflineRegistry);
    }
    let token = std::env::var(&eff.token_env).ok();
    if token.is_none() {
        tracing::info!(var = %eff.token_env, "no registry token set; using anonymous rate limits");
    }
    match HttpTransport::new(eff.timeout, token) {
        Ok(transport) => Box::new(GithubRegistry::new(transport, eff.registry.clone())),
        Err(e) => {
            eprintln!(
                "{} cannot initialise registry client ({}); continuing offline",
                utils::note_prefix(),
                e
            );
            Box::new(OfflineRegistry)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Lint {
            input,
            strict,
            output,
            repo_root,
            offline,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                output.as_deref(),
                if strict { Some(true) } else { None },
                if offline { Some(true) } else { None },
            );
            if eff.output != "human" && eff.output != "json" {
                eprintln!(
                    "{} unknown output mode '{}' (expected human|json)",
                    utils::error_prefix(),
                    eff.output
                );
                std::process::exit(2);
            }
            if config::load_config(&eff.repo_root).is_none() {
                tracing::info!("no wflint config found; using defaults");
            }

            let files = discover::workflow_files(&input);
            if files.is_empty() {
                eprintln!(
                    "{} File(s)/Directory: \"{}\" does not exist, exiting.",
                    utils::error_prefix(),
                    input.join(" ")
                );
                std::process::exit(lint::EXIT_NO_INPUT);
            }
            tracing::info!(count = files.len(), "linting workflow files");

            let registry = build_registry(&eff);
            let cwd = std::env::current_dir().unwrap_or_else(|_| eff.repo_root.clone());
            let result = lint::run_lint(&files, &cwd, &eff.rules, registry.as_ref());
            output::print_lint(&result, &eff.output);
            if eff.output != "json" && result.summary.errors + result.summary.warnings > 0 {
                eprintln!(
                    "{} {} error(s), {} warning(s) in {} file(s)",
                    utils::info_prefix(),
                    result.summary.errors,
                    result.summary.warnings,
                    result.summary.files
                );
            }
            std::process::exit(lint::exit_code(result.severity, eff.strict));
        }
    }
}
