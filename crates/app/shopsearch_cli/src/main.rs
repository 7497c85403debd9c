// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};

mod cli;
mod commands;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Compile {
            operation,
            params,
            params_file,
            site_id,
        } => commands::compile(&operation, &params, params_file.as_deref(), site_id)?,
        Commands::Validate {
            file,
            code_type,
            platform,
            issue,
        } => commands::validate(&file, &code_type, platform.as_deref(), issue)?,
    }

    Ok(())
}
