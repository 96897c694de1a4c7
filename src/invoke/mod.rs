//! Runs plans as subprocesses and reads tags back for verification.
pub mod error;
pub mod reader;
pub mod runner;
pub mod verify;

pub use reader::{ExifToolReader, TagReader};
pub use runner::{ProcessRunner, ToolOutput, ToolRunner};
pub use verify::{Mismatch, Verification, verify};
