use anyhow::Result;
use clap::Parser;
use colored::*;
use uuid::Uuid;

mod api_client;
mod output;
mod scenarios;
mod sse_client;

use api_client::ApiClient;
use output::print_test_summary;
use scenarios::Fixture;
use sse_client::Connection;

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "Order stream integration testing tool")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:4000)
    #[arg(long)]
    base_url: String,

    /// Restaurant whose order stream is watched
    #[arg(long)]
    restaurant_id: Uuid,

    /// Bearer token of a food provider with a role on the restaurant
    #[arg(long)]
    staff_token: String,

    /// Bearer token of a customer
    #[arg(long)]
    user_token: String,

    /// Customer id used for orders placed by staff
    #[arg(long, default_value_t = 1)]
    customer_id: i64,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Open both streams without placing any order
    ConnectionTest,
    /// Staff places an order; both streams receive it
    StaffOrder,
    /// Customer places an order; it does not come back on their own stream
    OwnOrderExcluded,
    /// Open orders are listed without closed ones
    Listing,
    /// Run every scenario
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());

    let api = ApiClient::new(reqwest::Client::new(), cli.base_url.clone());
    let fixture = Fixture {
        api: &api,
        restaurant_id: cli.restaurant_id,
        staff_token: &cli.staff_token,
        user_token: &cli.user_token,
        customer_id: cli.customer_id,
    };

    println!("{} Establishing order streams...", "→".blue());
    let orders_url = api.orders_url(&cli.restaurant_id);
    let mut staff = Connection::establish(&orders_url, &cli.staff_token, "Staff".to_string()).await?;
    let mut viewer = Connection::establish(
        &format!("{}?exclude_own=true", orders_url),
        &cli.user_token,
        "Customer".to_string(),
    )
    .await?;

    println!("{} Staff stream established", "✓".green());
    println!("{} Customer stream established", "✓".green());

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::ConnectionTest => {
            results.push(scenarios::test_connection(&mut staff, &mut viewer).await?);
        }
        ScenarioChoice::StaffOrder => {
            results.push(scenarios::test_staff_order(&fixture, &mut staff, &mut viewer).await?);
        }
        ScenarioChoice::OwnOrderExcluded => {
            results.push(
                scenarios::test_own_order_excluded(&fixture, &mut staff, &mut viewer).await?,
            );
        }
        ScenarioChoice::Listing => {
            results.push(scenarios::test_listing(&fixture).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_connection(&mut staff, &mut viewer).await?);
            results.push(scenarios::test_staff_order(&fixture, &mut staff, &mut viewer).await?);
            results.push(
                scenarios::test_own_order_excluded(&fixture, &mut staff, &mut viewer).await?,
            );
            results.push(scenarios::test_listing(&fixture).await?);
        }
    }

    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    if results.iter().all(|r| r.passed) {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
