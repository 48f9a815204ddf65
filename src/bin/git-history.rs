use clap::Parser;
use git_activity::{cli::HistoryCli, logging};

fn main() {
    let cli = HistoryCli::parse();
    logging::init(cli.output.verbose, cli.output.quiet);

    let g = cli.output.global();
    if let Err(e) = cli.command.run(&g) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
