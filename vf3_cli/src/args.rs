//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// VF3 subgraph isomorphism matcher.
///
/// Prints a single line `<solution_count> <elapsed_seconds>` on success.
#[derive(Parser, Debug)]
#[command(name = "vf3")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the pattern graph file
    pub pattern: PathBuf,

    /// Path to the target graph file
    pub target: PathBuf,

    /// Worker pool size; runs the sequential engine when omitted
    pub num_threads: Option<usize>,

    /// First CPU index for worker pinning; negative disables pinning
    #[arg(allow_negative_numbers = true)]
    pub base_cpu: Option<i32>,

    /// Parallel engine flavor
    #[arg(long, value_enum, default_value = "wls")]
    pub engine: EngineArg,

    /// Keep the found mappings in memory and print them
    #[arg(long, default_value_t = false)]
    pub store_solutions: bool,
}

impl Args {
    /// Base CPU as the engines expect it: `None` disables pinning.
    pub fn base_cpu(&self) -> Option<usize> {
        self.base_cpu.and_then(|cpu| usize::try_from(cpu).ok())
    }
}

/// Which parallel engine to run when a thread count is given.
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum EngineArg {
    /// Shared stack only
    #[value(name = "basic")]
    Basic,
    /// Shared stack plus per-worker local stacks
    #[value(name = "wls")]
    Wls,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments_parse() {
        let args = Args::parse_from(["vf3", "patt.grf", "targ.grf", "8", "2"]);
        assert_eq!(args.num_threads, Some(8));
        assert_eq!(args.base_cpu(), Some(2));
    }

    #[test]
    fn thread_count_is_optional() {
        let args = Args::parse_from(["vf3", "patt.grf", "targ.grf"]);
        assert!(args.num_threads.is_none());
        assert!(args.base_cpu().is_none());
    }

    #[test]
    fn negative_base_cpu_disables_pinning() {
        let args = Args::parse_from(["vf3", "patt.grf", "targ.grf", "4", "-1"]);
        assert!(args.base_cpu().is_none());
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(Args::try_parse_from(["vf3", "patt.grf"]).is_err());
    }
}
