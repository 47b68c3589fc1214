mod cors;

use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api_subs::{BillingState, models::plan::PlanCatalog};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, config.is_production())
        .await
        .expect("Failed to set up database");

    // plans, limits and billing are built once and shared by every worker
    let catalog = Arc::new(PlanCatalog::default());
    let enforcer = Arc::new(limiter::enforcer(catalog.clone()));
    let billing = Arc::new(BillingState::from_config(&config));
    if config.stripe_webhook_secret.is_empty() {
        log::warn!("STRIPE_WEBHOOK_SECRET is not set, every webhook will be rejected");
    }

    log::info!(
        "Starting server on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(catalog.clone()))
            .app_data(web::Data::new(enforcer.clone()))
            .app_data(web::Data::new(billing.clone()))
            .wrap(logger::middleware(config_data.console_logging_enabled)) // 3rd
            .wrap(cors::middleware(&origin)) // 2nd
            .wrap(api_auth::session_middleware(config_data.clone())) // 1st
            .service(
                web::scope("/api")
                    .service(api_subs::mount_webhook())
                    .service(api_auth::mount_auth())
                    .service(api_subs::routes::sub::get_plans)
                    .service(
                        web::scope("/dashboard")
                            .wrap(api_auth::auth_middleware(&config_data))
                            .service(api_auth::mount_user())
                            .service(api_subs::mount_billing())
                            .service(api_links::mount_dashboard()),
                    )
                    .service(
                        api_links::mount_public().wrap(api_auth::optional_auth_middleware(&config_data)),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
