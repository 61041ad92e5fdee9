use slimify::cli::commands::{CliArgs, Commands};
use slimify::cli::handlers::{handle_fix, handle_scan};
use slimify::util::logging::{self, LoggingConfig};
use slimify::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("slimify v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Some(Commands::Scan(scan_args)) => handle_scan(scan_args, args.verbose).await,
        Some(Commands::Fix(fix_args)) => handle_fix(fix_args, args.quiet).await,
        None => handle_scan(&args.scan, args.verbose).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        logging::parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        logging::level_from_env()
    };

    logging::init_logging(LoggingConfig {
        level,
        use_json: logging::json_from_env(),
        ..Default::default()
    });
}
