// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "room-viewer")]
#[command(about = "Interactive 3D room viewer", long_about = None)]
pub struct Cli {
    /// Disable UI elements and console output
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Path to a JSON options file
    #[arg(long = "options")]
    pub options: Option<PathBuf>,

    /// Directory holding the furniture models (overrides the options file)
    #[arg(long = "assets")]
    pub assets: Option<PathBuf>,
}
