//! shellstate-lib: resources whose lifecycle is implemented by shell scripts.
//!
//! Each resource declares a command for create, read, update and delete.
//! Commands talk back by printing a JSON object as the last thing on stdout;
//! that object becomes the resource's stored output.
//!
//! - [`resource::Lifecycle`]: drives records through their lifecycle
//! - [`execute`]: spawns commands and streams their output
//! - [`output`]: pulls the trailing JSON object out of stdout
//! - [`redact`]: masks sensitive values in logs and errors
//! - [`gate`]: keeps commands from running concurrently

pub mod config;
pub mod execute;
pub mod gate;
pub mod output;
pub mod redact;
pub mod resource;
pub mod util;
