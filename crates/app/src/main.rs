use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, SimpleLogger, TermLogger, TerminalMode};

mod cli;
mod output;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    cli::run(&args)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Logs go to stderr so the trace can be piped from stdout.
    if TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        if let Err(e) = SimpleLogger::init(level, Config::default()) {
            eprintln!("logging disabled: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_logger_install_is_reported_not_fatal() {
        init_logging(0);
        // Both loggers are already taken; this must only print a notice.
        init_logging(3);
        assert_ne!(log::max_level(), LevelFilter::Off);
    }
}
