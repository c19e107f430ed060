mod cli;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use cli::Cli;
use mxroads::{PipelineConfig, source::{NominatimBoundaries, OverpassRoads}};

/// `-v` for debug, `-vv` for trace; `RUST_LOG` still wins when set.
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .try_init()
        .ok(); // Ignore error if logger was already set
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = PipelineConfig::default();
    if let Some(output) = cli.output { config.output_dir = output }
    if let Some(url) = cli.nominatim_url { config.service.nominatim_url = url }
    if let Some(url) = cli.overpass_url { config.service.overpass_url = url }
    if cli.legend_font.is_some() { config.render.legend_font = cli.legend_font }

    let mut boundaries = NominatimBoundaries::new(&config.service)?;
    let mut roads = OverpassRoads::new(&config.service)?;
    mxroads::run(&config, &mut boundaries, &mut roads)?;
    Ok(())
}

fn main() -> Result<()> { run() }
