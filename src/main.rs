use clap::Parser;
use extidy::cli::{OrganizeCommand, OrganizeOverrides, run_cli_with_config};
use extidy::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Organize a folder's files into per-extension subfolders.
#[derive(Parser)]
#[command(name = "extidy", version, about)]
struct Args {
    /// Folder containing the files to organize
    directory: PathBuf,

    /// Show what would be moved without touching anything
    #[arg(long, conflicts_with = "undo")]
    dry_run: bool,

    /// Revert the previous organization run
    #[arg(long)]
    undo: bool,

    /// Group all extensions directly under the destination root instead of
    /// mirroring the source directory structure
    #[arg(long)]
    flatten: bool,

    /// Name of the destination root created inside DIRECTORY
    #[arg(long, value_name = "NAME")]
    dest: Option<String>,

    /// Path to a configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let command = if args.undo {
        OrganizeCommand::Undo
    } else {
        OrganizeCommand::Organize {
            dry_run: args.dry_run,
        }
    };
    let overrides = OrganizeOverrides {
        flatten: args.flatten,
        destination: args.dest,
    };

    match run_cli_with_config(command, &args.directory, overrides, args.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
