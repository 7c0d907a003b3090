use proxsync::{cli, telemetry};

fn main() {
    let cli = cli::parse_from(std::env::args_os());

    let verbosity = if cli.quiet {
        0
    } else {
        cli.verbose.saturating_add(1)
    };
    telemetry::init(verbosity);

    if let Err(e) = cli::run(cli) {
        tracing::error!("error: {}", e);
        std::process::exit(1);
    }
}
