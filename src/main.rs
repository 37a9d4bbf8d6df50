use clap::Parser;
use skelly::cli::args::Cli;
use skelly::logging;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    if let Err(err) = skelly::cli::run(cli) {
        eprintln!("error: {err}");
        for suggestion in err.recovery_suggestions() {
            eprintln!("  hint: {suggestion}");
        }
        std::process::exit(err.exit_code());
    }
}
