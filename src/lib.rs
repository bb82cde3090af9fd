//! NAACL Reproducibility Track utilities
//!
//! Submits Docker images as experiments on Beaker and checks their output.
//!
//! ## Flow
//!
//! 1. `setup` stores a Beaker user token and resolves the `NAACL/<user>` workspace
//! 2. `submit` registers the image, then creates a one-task GPU experiment
//! 3. `verify` fetches the finished run's logs, strips timestamps and looks
//!    for the expected output, uploading it as the run's result on success

pub mod auth;
pub mod beaker;
pub mod cli;
pub mod config;
pub mod error;
pub mod permissions;
pub mod publish;
pub mod submit;
pub mod ui;
pub mod verify;
pub mod version;

pub use auth::Session;
pub use beaker::{BeakerClient, Platform};
pub use config::Config;
pub use error::{Error, PlatformError, Result};
pub use verify::{Outcome, Verification};
