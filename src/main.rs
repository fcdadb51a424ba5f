//! deckhand - command-line client for the Spinnaker Gate API
//!
//! ## Commands
//!
//! - `deckhand app create|delete|get|list` - Manage applications
//! - `deckhand pipeline save|save-json|list|get|delete` - Manage pipeline configs
//! - `deckhand pipeline-template publish|plan|delete` - Manage pipeline templates
//! - `deckhand completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! export SPINNAKER_API=https://gate.example.com
//!
//! # Publish a template and wait for the task to finish
//! deckhand pipeline-template publish template.yml
//!
//! # Plan a configuration against it
//! deckhand pipeline-template plan pipeline.yml
//!
//! # Save the configuration as a pipeline
//! deckhand pipeline save pipeline.yml
//!
//! # Generate shell completions
//! deckhand completions bash > /etc/bash_completion.d/deckhand
//! ```

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            cli::print_error_body(&e);
            eprintln!("Error: {e:#}");
            if std::env::var("DECKHAND_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
