use quayside::cli::commands::{CliArgs, Commands};
use quayside::cli::handlers::{handle_classify, handle_deploy, handle_list, handle_status};
use quayside::util::logging::{init_logging, parse_level, LoggingConfig};
use quayside::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("quayside v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Deploy(deploy_args) => handle_deploy(deploy_args).await,
        Commands::Classify(classify_args) => handle_classify(classify_args).await,
        Commands::Status(status_args) => handle_status(status_args).await,
        Commands::List(list_args) => handle_list(list_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str).unwrap_or_else(|| {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        })
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("QUAYSIDE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str).unwrap_or(Level::INFO)
    };

    let use_json = env::var("QUAYSIDE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level,
        use_json,
        include_target: true,
    });
}
