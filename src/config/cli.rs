use crate::adapters::catalog::ProductFilter;
use crate::config::toml_config::DEFAULT_CONFIG_PATH;
use crate::core::query::{LooseNumber, TireSearchRequest};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "tire-finder")]
#[command(about = "Tire size parsing and price-list search")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override the price list path from config
    #[arg(long)]
    pub catalog: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse a product name into a tire specification
    Parse {
        /// Product name, e.g. "185/60 R15 JK TYRE VECTRA 88 H"
        name: String,
    },
    /// Search the local price list by tire size
    Search(SpecArgs),
    /// Search the external catalog service by tire size
    SearchRemote(SpecArgs),
    /// Run several external searches from a JSON array of requests
    SearchRemoteMany {
        /// JSON file with `[{"width": 205, "aspect_ratio": 55, "rim_diameter": 16}, ...]`
        #[arg(long)]
        file: String,
        #[arg(long)]
        limit: Option<String>,
    },
    /// Keyword / price-range search over the price list
    Products {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price_min: Option<f64>,
        #[arg(long)]
        price_max: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Look up a single product by id
    Product { id: String },
}

#[derive(Debug, Clone, Args)]
pub struct SpecArgs {
    /// Tire width in millimeters (required)
    #[arg(long)]
    pub width: Option<String>,

    #[arg(long)]
    pub aspect_ratio: Option<String>,

    /// Rim diameter, "15" or "R15"
    #[arg(long)]
    pub rim_diameter: Option<String>,

    #[arg(long)]
    pub exact: bool,

    #[arg(long)]
    pub limit: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,
}

impl From<SpecArgs> for TireSearchRequest {
    fn from(args: SpecArgs) -> Self {
        TireSearchRequest {
            width: args.width.map(LooseNumber::from),
            aspect_ratio: args.aspect_ratio.map(LooseNumber::from),
            rim_diameter: args.rim_diameter.map(LooseNumber::from),
            exact_match: args.exact,
            limit: args.limit.map(LooseNumber::from),
            brand: args.brand,
        }
    }
}

impl Command {
    pub fn product_filter(&self) -> Option<ProductFilter> {
        match self {
            Command::Products {
                query,
                id,
                name,
                price_min,
                price_max,
                limit,
            } => Some(ProductFilter {
                query: query.clone(),
                product_id: id.clone(),
                product_name: name.clone(),
                price_min: *price_min,
                price_max: *price_max,
                limit: *limit,
            }),
            _ => None,
        }
    }
}
