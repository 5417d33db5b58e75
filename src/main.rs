use clap::Parser;
use tire_finder::config::Command;
use tire_finder::core::Catalog;
use tire_finder::utils::error::ErrorSeverity;
use tire_finder::utils::{logger, validation::Validate};
use tire_finder::{
    CliConfig, PriceListCatalog, PublicSearchClient, SpecificationMatcher, TireSearchError,
    TireSearchRequest, TireSearchService, TomlConfig,
};

type Service = TireSearchService<PriceListCatalog, PublicSearchClient>;

fn build_service(cli: &CliConfig, config: &TomlConfig, load_catalog: bool) -> tire_finder::Result<Service> {
    let catalog_path = cli.catalog.clone().unwrap_or_else(|| config.catalog.path.clone());
    let catalog = PriceListCatalog::new(&catalog_path);
    if load_catalog {
        catalog.load()?;
    }

    let client = PublicSearchClient::from_config(&config.search)?;
    let matcher = SpecificationMatcher::new(config.matcher.clone());

    Ok(TireSearchService::new(catalog, client, matcher)
        .with_aspect_ratio_defaults(config.search.aspect_ratio_defaults.clone()))
}

fn print_json<T: serde::Serialize>(value: &T) -> tire_finder::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: CliConfig, config: TomlConfig) -> tire_finder::Result<()> {
    let needs_catalog = matches!(
        cli.command,
        Command::Search(_) | Command::Products { .. } | Command::Product { .. }
    );
    let service = build_service(&cli, &config, needs_catalog)?;

    match &cli.command {
        Command::Parse { name } => print_json(&service.parse(name)),
        Command::Search(args) => {
            let outcome = service.search_catalog(TireSearchRequest::from(args.clone()))?;
            print_json(&outcome)
        }
        Command::SearchRemote(args) => {
            let outcome = service
                .search_external(TireSearchRequest::from(args.clone()))
                .await?;
            print_json(&outcome)
        }
        Command::SearchRemoteMany { file, limit } => {
            let content = std::fs::read_to_string(file)?;
            let mut requests: Vec<TireSearchRequest> = serde_json::from_str(&content)?;
            if let Some(limit) = limit {
                for request in &mut requests {
                    request.limit = Some(limit.clone().into());
                }
            }
            let outcome = service.search_external_many(requests).await?;
            print_json(&outcome)
        }
        Command::Products { .. } => {
            let filter = cli.command.product_filter().unwrap_or_default();
            let products = service.catalog().search(&filter)?;
            print_json(&products)
        }
        Command::Product { id } => match service.catalog().find_by_id(id) {
            Some(product) => print_json(&product),
            None => Err(TireSearchError::ValidationError {
                message: format!("Product ID {} not found", id),
            }),
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match TomlConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if cli.json_logs || config.logging.json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting tire-finder CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
