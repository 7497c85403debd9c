use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shopsearch_cli")]
#[command(author, version, about = "ShopSearch request compiler and code validator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the CLI version
    Version,

    /// Compile operation parameters into the request that would be sent
    Compile {
        /// Operation: search, autocomplete, facets, suggest, trending,
        /// recommendations, meta or beacon (alias: tracking)
        operation: String,

        /// Parameters as a JSON object
        #[arg(long, default_value = "{}", conflicts_with = "params_file")]
        params: String,

        /// Read parameters from a JSON file instead
        #[arg(long)]
        params_file: Option<PathBuf>,

        /// Default site id (overrides SHOPSEARCH_SITE_ID)
        #[arg(long)]
        site_id: Option<String>,
    },

    /// Check integration code for common mistakes
    Validate {
        /// File containing the code to check
        #[arg(short, long)]
        file: PathBuf,

        /// tracking (alias: beacon), search, autocomplete or recommendations
        #[arg(short, long)]
        code_type: String,

        /// shopify, bigcommerce, magento2 or custom
        #[arg(short, long)]
        platform: Option<String>,

        /// Description of the problem you are seeing
        #[arg(short, long)]
        issue: Option<String>,
    },
}
