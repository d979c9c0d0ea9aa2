//! Rex library - expose modules for testing
//!
//! This library exposes the command handlers and global options needed for
//! integration testing.

pub mod commands;

/// Options shared by every subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalOpts {
    pub fn verbosity_level(&self) -> u8 {
        self.verbose
    }
}
