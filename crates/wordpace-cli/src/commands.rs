//! Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Read text aloud one word at a time, with a synced terminal highlight.
#[derive(Parser)]
#[command(name = "wordpace")]
#[command(about = "Word-paced read-aloud for the terminal")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a text file aloud ("-" reads stdin)
    Read {
        /// Path to a UTF-8 text file, or "-" for stdin
        file: String,

        /// Playback rate multiplier (0.1–10.0)
        #[arg(long, default_value_t = 1.0)]
        rate: f32,

        /// Inter-word gap multiplier (strictly positive)
        #[arg(long = "gap", default_value_t = 1.0)]
        delay_multiplier: f32,

        /// Voice id, as listed by `wordpace voices`
        #[arg(long)]
        voice: Option<String>,

        /// Start from the Nth word (zero-based)
        #[arg(long)]
        from: Option<usize>,
    },

    /// List the voices the speech engine offers
    Voices,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn read_args_parse() {
        let cli = Cli::parse_from([
            "wordpace", "read", "notes.txt", "--rate", "1.5", "--gap", "0.5", "--from", "3",
        ]);
        let Commands::Read { file, rate, delay_multiplier, voice, from } = cli.command else {
            panic!("expected read command");
        };
        assert_eq!(file, "notes.txt");
        assert!((rate - 1.5).abs() < f32::EPSILON);
        assert!((delay_multiplier - 0.5).abs() < f32::EPSILON);
        assert_eq!(voice, None);
        assert_eq!(from, Some(3));
    }
}
