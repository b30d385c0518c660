//! extidy - organize a folder by file extension
//!
//! This library walks a source directory tree, determines a destination
//! subfolder for each file from its lower-cased extension, and moves files
//! there, either mirroring the source structure or flattening everything
//! under one destination root. It also provides dry-run previews, undo of
//! a previous run, and TOML-configurable file filtering.

pub mod cli;
pub mod config;
pub mod extension;
pub mod organizer;
pub mod output;
pub mod undo;

pub use config::{CompiledFilters, Config, ConfigError};
pub use extension::extension_of;
pub use organizer::{
    MoveRecord, OrganizeError, OrganizeOptions, OrganizeReport, Organizer,
};
pub use undo::{UndoManager, UndoReport};

pub use cli::{OrganizeCommand, OrganizeOverrides, run_cli};
