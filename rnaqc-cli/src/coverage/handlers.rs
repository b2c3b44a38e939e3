use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use rnaqc_core::utils::get_dynamic_reader_w_stdin;
use rnaqc_coverage::{QcConfig, ScanOutputs, coverage_scan};

use super::cli::DEFAULT_PREFIX;

fn resolve_config(matches: &ArgMatches) -> Result<QcConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => QcConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => QcConfig::default(),
    };

    // flags win over the config file
    if let Some(length) = matches.get_one::<u32>("bias-gene-length") {
        config.bias.gene_length = *length;
    }
    if let Some(offset) = matches.get_one::<u32>("bias-offset") {
        config.bias.offset = *offset;
    }
    if let Some(window) = matches.get_one::<u32>("bias-window") {
        config.bias.window_size = *window;
    }
    if matches.get_flag("gzip") {
        config.output.gzip = true;
    }

    config.validate()?;
    Ok(config)
}

pub fn run_coverage(matches: &ArgMatches) -> Result<()> {
    // get arguments from CLI
    let blocks = matches
        .get_one::<String>("blocks")
        .expect("A path to resolved blocks is required.");

    let default_prefix = DEFAULT_PREFIX.to_string();
    let prefix = matches.get_one::<String>("output").unwrap_or(&default_prefix);

    let config = resolve_config(matches)?;
    info!(
        "Bias windows: gene length >= {}, offset {}, window {}",
        config.bias.gene_length, config.bias.offset, config.bias.window_size
    );

    let outputs = ScanOutputs::from_prefix(prefix, config.output.gzip);
    let reader = get_dynamic_reader_w_stdin(blocks)?;
    let summary = coverage_scan(reader, &config, &outputs)?;

    println!(
        "Processed {} blocks across {} genes; {} exons covered, bias computed for {} genes.",
        summary.blocks, summary.genes, summary.exons, summary.genes_with_bias
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::coverage::cli::{COVERAGE_CMD, create_coverage_cli};

    fn matches_for(args: &[&str]) -> ArgMatches {
        let mut argv = vec![COVERAGE_CMD];
        argv.extend_from_slice(args);
        create_coverage_cli().get_matches_from(argv)
    }

    #[test]
    fn test_flags_override_defaults() {
        let matches = matches_for(&["blocks.tsv", "--bias-offset", "0", "--gzip"]);
        let config = resolve_config(&matches).unwrap();
        assert_eq!(config.bias.offset, 0);
        assert_eq!(config.bias.window_size, QcConfig::default().bias.window_size);
        assert!(config.output.gzip);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let matches = matches_for(&["blocks.tsv", "--bias-window", "0"]);
        assert!(resolve_config(&matches).is_err());
    }
}
