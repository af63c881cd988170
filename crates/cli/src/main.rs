use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use sol_conform::commands::*;
use sol_conform::init_logging;

/// Heuristic compliance auditor for Solidity token entry points.
///
/// This CLI is a thin wrapper around `conform-core` (exposed in code as `conform_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "sol-conform",
    version,
    about = "Heuristic ERC compliance auditor for Solidity sources",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new audit project at the given root.
    ///
    /// This will:
    /// - Create a `.conform` metadata directory.
    /// - Create `audits`, `reports`, and `outputs/runs` directories.
    /// - Write a `.conform/project.json` config file and create the database.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show basic information about an existing project.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Analyze a Solidity file or directory without a project.
    Analyze {
        /// File or directory to analyze.
        #[arg(long)]
        path: String,

        /// Target function signature, e.g. "setApprovalForAll(address operator, bool approved)".
        #[arg(long)]
        signature: Option<String>,

        /// Standard preset (e.g. erc1155-batch-transfer). Inferred from the signature when omitted.
        #[arg(long)]
        standard: Option<String>,

        /// Verifier profile: standard or gas-family.
        #[arg(long)]
        profile: Option<String>,

        /// Source file extensions to include (repeatable). Defaults to sol.
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Analyze files on a worker pool.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the JSON report to this file.
        #[arg(long)]
        out: Option<String>,
    },

    /// Run an audit spec (YAML/JSON) and record the run in the project database.
    RunAudit {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Path to the audit spec file.
        #[arg(long)]
        file: String,

        /// Overwrite an existing output directory for this audit.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// List recorded audit runs.
    ListRuns {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Only show runs of this audit.
        #[arg(long)]
        audit: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the latest run of an audit with its per-file outcomes.
    ShowRun {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Audit name.
        #[arg(long)]
        audit: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the standard presets and their default signatures.
    Standards {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compute the normalized form, keccak-256 hash and selector of a signature.
    Selector {
        /// Function signature, with or without parameter names.
        signature: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scan deployed bytecode for known receiver-hook entry points.
    ScanBytecode {
        /// Hex-encoded bytecode.
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,

        /// File holding hex-encoded bytecode.
        #[arg(long)]
        file: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::Analyze { path, signature, standard, profile, extensions, parallel, json, out } => {
            let opts = AnalyzeOptions { signature, standard, profile, extensions, parallel, json, out };
            analyze_command(&path, &opts)?
        }
        Command::RunAudit { root, file, force } => run_audit_command(&root, &file, force)?,
        Command::ListRuns { root, audit, json } => list_runs_command(&root, audit.as_deref(), json)?,
        Command::ShowRun { root, audit, json } => show_run_command(&root, &audit, json)?,
        Command::Standards { json } => standards_command(json)?,
        Command::Selector { signature, json } => selector_command(&signature, json)?,
        Command::ScanBytecode { hex, file, json } => {
            scan_bytecode_command(hex.as_deref(), file.as_deref(), json)?
        }
    }

    Ok(())
}
