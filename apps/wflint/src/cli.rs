//! CLI argument parsing via `clap`.

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wflint",
    version,
    about = "Lint GitHub Actions workflow files",
    long_about = "wflint — checks workflow files for naming, pinning and action hygiene.\n\nConfiguration precedence: CLI > wflint.toml > defaults.",
    after_help = "Examples:\n  wflint lint .github/workflows\n  wflint lint --strict .github/workflows/ci.yml\n  wflint lint --output json --offline .github",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(short, long, action = ArgAction::Count, global = true, help = "Increase log verbosity (-v info, -vv debug)")]
    pub verbose: u8,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current wflint version.")]
    Version,
    /// Lint workflow files
    #[command(
        about = "Run lint checks",
        long_about = "Lint workflow files found in the given files, directories or glob patterns. Errors fail the run; warnings fail it only with --strict.",
        after_help = "Exit codes:\n  0  no problems (or only warnings without --strict)\n  1  warnings with --strict\n  2  errors\n  255  no workflow files found"
    )]
    Lint {
        #[arg(required = true, help = "Files, directories or glob patterns (whitespace-separated lists accepted)")]
        input: Vec<String>,
        #[arg(short, long, action = ArgAction::SetTrue, help = "Return a non-zero exit code on warnings as well as errors")]
        strict: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Repository root used for config discovery (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, action = ArgAction::SetTrue, help = "Skip registry lookups (existence and update checks)")]
        offline: bool,
    },
}
