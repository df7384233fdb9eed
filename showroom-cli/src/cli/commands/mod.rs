//! Subcommand handlers

pub mod config;
pub mod instructions;
pub mod preview;
pub mod template;
pub mod upload;
pub mod validate;

use colored::*;

use crate::error::UploadError;

/// Print a failed step the way the user sees every error
fn report_failure(err: &UploadError) {
    log::debug!("{:?} failure: {:?}", err.kind(), err);
    eprintln!("{}", err.to_string().red());
}
