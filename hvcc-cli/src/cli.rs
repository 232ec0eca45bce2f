use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    name = "hvcc",
    version,
    about = "HEVC decoder configuration record tool",
    long_about = "Builds an hvcC payload from the VPS, SPS and PPS of an Annex-B file,\n\
                  converts legacy SPS/PPS extradata and length-prefixed streams,\n\
                  and prints the fields of an existing hvcC payload."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging, -v for debug and -vv for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build an hvcC payload from an Annex-B file
    Build {
        /// Annex-B input holding at least one VPS, SPS and PPS
        input: PathBuf,

        /// Where to write the hvcC payload
        #[arg(short, long)]
        output: PathBuf,

        /// Set the array_completeness bit of every NAL unit array
        #[arg(long)]
        complete: bool,

        /// Leave SEI NAL units out of the record
        #[arg(long)]
        no_sei: bool,
    },

    /// Convert legacy SPS/PPS extradata to Annex-B
    Annexb {
        /// Extradata input
        input: PathBuf,

        /// Where to write the Annex-B output
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rewrite an Annex-B file with 4 byte length prefixes
    Split {
        /// Annex-B input
        input: PathBuf,

        /// Where to write the length-prefixed output
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the fields of an hvcC payload
    Inspect {
        /// hvcC input
        input: PathBuf,
    },
}
