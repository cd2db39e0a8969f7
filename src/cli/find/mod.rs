//! Find command - one-shot lookup printed as JSON

use clap::Args;

use crate::api::types::GetRestaurantsResponse;
use crate::config::AppConfig;
use crate::domain::restaurant::time_of_day;
use crate::infrastructure::logging::init_logging;

#[derive(Args, Debug)]
pub struct FindArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub longitude: f64,

    /// Free-text search (restaurant name, cuisine, dish)
    #[arg(long)]
    pub search_for: Option<String>,

    /// Time of day (HH:MM[:SS]); defaults to the local time
    #[arg(long)]
    pub at: Option<String>,
}

/// Run a single lookup and print `{"restaurants": [...]}` to stdout
pub async fn run(args: FindArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let time = match &args.at {
        Some(at) => time_of_day::parse(at)?,
        None => chrono::Local::now().time(),
    };

    let state = crate::create_app_state_with_config(&config).await?;
    let restaurants = state
        .discovery
        .find(args.latitude, args.longitude, time, args.search_for.as_deref())
        .await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&GetRestaurantsResponse::new(restaurants))?
    );

    Ok(())
}
