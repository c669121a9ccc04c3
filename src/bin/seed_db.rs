use domain::jwt::{issue_token, Principal};
use domain::{CustomerId, FoodProviderId};
use log::{error, info, warn};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!("Seeding database [{}]...", config.database_url());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, &db);

    let seeded = match entity_api::seed_database(service_state.db_conn_ref()).await {
        Ok(seeded) => seeded,
        Err(e) => {
            error!("Failed to seed database: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "Seeded restaurant {} (customer {}, food provider {})",
        seeded.restaurant_id, seeded.user_id, seeded.food_provider_id
    );

    let principals = [
        ("customer", Principal::User(CustomerId(seeded.user_id))),
        (
            "food provider",
            Principal::FoodProvider(FoodProviderId(seeded.food_provider_id)),
        ),
    ];

    for (label, principal) in principals {
        match issue_token(&service_state.config, principal) {
            Ok(token) => info!("Bearer token for {label}: {}", token.token),
            Err(e) => {
                warn!("Skipping token for {label}: {e}");
            }
        }
    }
}
