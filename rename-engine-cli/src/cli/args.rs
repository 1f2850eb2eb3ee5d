use clap::{Args, Parser, Subcommand};
use rename_engine_core::RenameFlags;
use std::path::PathBuf;

/// Batch, regex-driven renaming of a set of files and folders
#[derive(Parser, Debug)]
#[command(name = "rename-engine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Filter directive for the tracing subscriber (e.g. "info", "debug", "rename_engine_core=trace")
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute candidate renames and print them, without touching the filesystem
    Preview {
        /// Directory to enumerate
        root: PathBuf,

        /// Regex matched against each item's name
        #[arg(long)]
        search: String,

        /// Replacement text (may reference capture groups, e.g. "$1")
        #[arg(long, default_value = "")]
        replace: String,

        #[command(flatten)]
        flags: RenameFlagArgs,
    },

    /// Compute candidate renames, then commit them to disk
    Rename {
        /// Directory to enumerate
        root: PathBuf,

        /// Regex matched against each item's name
        #[arg(long)]
        search: String,

        /// Replacement text (may reference capture groups, e.g. "$1")
        #[arg(long, default_value = "")]
        replace: String,

        #[command(flatten)]
        flags: RenameFlagArgs,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Flags shared by `preview` and `rename`, mirroring [`RenameFlags`] plus the
/// enumeration-only `recursive` switch (not part of the rename predicate itself).
#[derive(Args, Debug, Clone)]
pub struct RenameFlagArgs {
    /// Match against the filename stem only, leaving the extension untouched
    #[arg(long, conflicts_with = "extension_only")]
    pub name_only: bool,

    /// Match against the extension only, without the leading dot
    #[arg(long, conflicts_with = "name_only")]
    pub extension_only: bool,

    /// Disambiguate same-run collisions within a directory with a numeric counter
    #[arg(long)]
    pub enumerate: bool,

    /// Skip folders
    #[arg(long)]
    pub exclude_folders: bool,

    /// Skip files
    #[arg(long)]
    pub exclude_files: bool,

    /// Only rename items directly under the root, not nested subfolder contents
    #[arg(long)]
    pub exclude_subfolder_items: bool,

    /// Case-insensitive regex matching
    #[arg(long)]
    pub case_insensitive: bool,

    /// Recurse into subdirectories while enumerating
    #[arg(long)]
    pub recursive: bool,
}

impl RenameFlagArgs {
    pub fn to_rename_flags(&self) -> RenameFlags {
        RenameFlags {
            name_only: self.name_only,
            extension_only: self.extension_only,
            enumerate_items: self.enumerate,
            exclude_folders: self.exclude_folders,
            exclude_files: self.exclude_files,
            exclude_subfolder_items: self.exclude_subfolder_items,
            case_insensitive: self.case_insensitive,
        }
    }
}

/// OR the config-file defaults together with the flags the user passed on the
/// command line - a flag is active if either source sets it.
pub fn merge_flags(config_defaults: RenameFlags, cli_flags: RenameFlags) -> RenameFlags {
    RenameFlags {
        name_only: config_defaults.name_only || cli_flags.name_only,
        extension_only: config_defaults.extension_only || cli_flags.extension_only,
        enumerate_items: config_defaults.enumerate_items || cli_flags.enumerate_items,
        exclude_folders: config_defaults.exclude_folders || cli_flags.exclude_folders,
        exclude_files: config_defaults.exclude_files || cli_flags.exclude_files,
        exclude_subfolder_items: config_defaults.exclude_subfolder_items || cli_flags.exclude_subfolder_items,
        case_insensitive: config_defaults.case_insensitive || cli_flags.case_insensitive,
    }
}
