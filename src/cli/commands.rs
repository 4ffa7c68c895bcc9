use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::entity::WorkArea;

use super::host::parse_screen;

#[derive(Parser, Debug)]
#[command(name = "stickies")]
#[command(version, about = "Desktop sticky notes, driven headless from the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the note records (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/stickies.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Screen size used as the work area
    #[arg(long, global = true, value_name = "WIDTHxHEIGHT", value_parser = parse_screen, default_value = "1920x1080")]
    pub screen: WorkArea,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Activate the notes and read shell events from stdin, one per line
    Run {
        /// Delete without asking for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Print the stored notes without modifying them
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
