use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const COVERAGE_CMD: &str = "coverage";
pub const DEFAULT_PREFIX: &str = "rnaqc";

pub fn create_coverage_cli() -> Command {
    Command::new(COVERAGE_CMD)
        .about("Compute exon coverage, base-level coverage records and 5'/3' gene bias from resolved alignment blocks.")
        .arg(
            Arg::new("blocks")
                .required(true)
                .help("Tab separated resolved blocks (`-` for stdin, `.gz` accepted)"),
        )
        .arg(arg!(--config <config> "TOML file with [bias] and [output] settings"))
        .arg(arg!(--output <output> "Prefix for the output files"))
        .arg(
            arg!(--"bias-gene-length" <length> "Minimum gene length for bias estimation")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(--"bias-offset" <offset> "Bases trimmed from each gene end before windowing")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(--"bias-window" <window> "Width of the end-proximal bias windows")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(--gzip)
                .help("Gzip the base coverage records")
                .action(ArgAction::SetTrue),
        )
}
