mod config;
mod error;
mod i18n;
mod model;
mod session;
mod web;

use actix_web::{App, HttpServer, web::Data};
use actix_files as fs;
use dotenv::dotenv;
use log::{info, error};
use std::sync::{Arc, Mutex};
use std::collections::HashMap;
use tera::Tera;
use uuid::Uuid;

use config::Config;
use model::CompletionClient;
use session::{Orchestrator, PlanSession};
use web::routes;

// App state structure
struct AppState {
    tera: Tera,
    orchestrator: Orchestrator,
    sessions: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<PlanSession>>>>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Sportify");

    // The API key is required before anything is served
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let client = match CompletionClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to initialize completion client: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize template engine
    let mut tera = match Tera::new(&format!("{}/**/*", config.template_dir)) {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    tera.autoescape_on(vec![".html"]);

    // Create app state
    let app_state = Data::new(AppState {
        tera,
        orchestrator: Orchestrator::new(client),
        sessions: Mutex::new(HashMap::new()),
    });

    let static_dir = config.static_dir.clone();
    info!("Listening on http://{}:{}", config.host, config.port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", &static_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
