use std::process;

use clap::Parser;
use dotenv::dotenv;
use pathcheck::cli::Cli;
use pathcheck::{default_resolver, logging, CheckEngine, LogReporter, Settings, Verdict};
use tracing::debug;

fn main() {
    dotenv().ok();

    let args = Cli::parse();

    let config = match Settings::load(&args).and_then(Settings::validate) {
        Ok(config) => config,
        Err(err) => {
            let verdict = Verdict::config_failure(&err);
            print!("{}", verdict.render(None));
            process::exit(verdict.exit_code());
        }
    };

    let guard = logging::init_logger(config.log_level.as_filter());
    debug!(?config, "configuration loaded");

    let resolver = default_resolver();
    let verdict = CheckEngine::new(&config, resolver.as_ref(), &LogReporter).run();

    print!("{}", verdict.render(config.branding().as_deref()));

    // process::exit skips destructors; flush the log writers first
    drop(guard);
    process::exit(verdict.exit_code());
}
