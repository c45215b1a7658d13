//! runany - launch an unpacked game or application without knowing its format
//!
//! This library scans a package tree, scores every entry for a launch
//! strategy (native binary, JVM jar, LÖVE game, Windows executable, archive
//! to unpack, ...), runs the best one, and starts over on the extracted
//! contents when the best one was an archive.

pub mod action_catalog;
pub mod actions;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mime_sniffer;
pub mod output;
pub mod runner;
pub mod scanner;
pub mod strategy;

pub use action_catalog::ActionCatalog;
pub use config::{CompiledFilters, ConfigError, LaunchConfig};
pub use dispatcher::Dispatcher;
pub use error::{LaunchError, LaunchResult};
pub use mime_sniffer::{ContentSniffer, FileCommandSniffer, MimeSniffer};
pub use runner::{Invocation, ProcessRunner, SystemRunner};
pub use scanner::TreeScanner;
pub use strategy::{CandidateAction, Strategy};

pub use cli::{LaunchCommand, run_cli};
