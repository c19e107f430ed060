use std::path::PathBuf;

/// Road network maps for the 32 Mexican states.
///
/// Fetches every state's boundary and drivable roads from OpenStreetMap and writes three
/// PNG maps per state.
#[derive(clap::Parser, Debug)]
#[command(name = "mxroads", version, about)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output directory, defaults to "./output"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Nominatim base URL
    #[arg(long, value_hint = clap::ValueHint::Url)]
    pub nominatim_url: Option<String>,

    /// Overpass interpreter URL
    #[arg(long, value_hint = clap::ValueHint::Url)]
    pub overpass_url: Option<String>,

    /// TrueType font for map legends
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub legend_font: Option<PathBuf>,
}
