use clap::Parser;
use git_activity::{cli::ActivityCli, logging};

fn main() {
    let cli = ActivityCli::parse();
    logging::init(cli.output.verbose, cli.output.quiet);

    let g = cli.output.global();
    if let Err(e) = cli.command.run(&g, &cli.github) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
