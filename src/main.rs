use clap::Parser;
use rentacar::cli::{self, Args};
use rentacar::core::config;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::process::ExitCode;

fn main() -> std::io::Result<ExitCode> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to rentacar.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("rentacar.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("Rent-a-car starting: {:?}", args.command);

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{}, falling back to defaults", e);
            eprintln!("warning: {e}, falling back to defaults");
            config::RentacarConfig::default()
        }
    };
    let resolved = config::resolve(&file_config, args.overrides());
    log::debug!("Resolved config: {:?}", resolved);

    let ok = cli::run(args, &resolved)?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
