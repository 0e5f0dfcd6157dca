use std::path::Path;

use clap::Parser;
use mandala::cli::commands::Cli;
use mandala::cli::handlers;
use mandala::io::store::data_dir;
use mandala::logging;

fn main() {
    let cli = Cli::parse();
    let data_dir = data_dir(cli.data_dir.as_deref().map(Path::new));

    // Logging is best-effort; the file may be unwritable
    let _ = logging::init_logging(&data_dir);

    let result = match cli.command {
        // No subcommand → launch TUI
        None => mandala::tui::run(&data_dir),
        Some(command) => handlers::dispatch(command, cli.json, &data_dir),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
