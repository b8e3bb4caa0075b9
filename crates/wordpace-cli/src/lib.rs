#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

// Used by main.rs (the binary target shares this crate's dependency table)
use anyhow as _;
use tracing_subscriber as _;
use wordpace_espeak as _;

pub mod commands;
pub mod keys;
pub mod render;

pub use commands::{Cli, Commands};
pub use keys::{KeyCommand, spawn_key_reader};
pub use render::{TerminalView, ViewHandle};
