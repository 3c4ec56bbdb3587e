pub mod gateway;
pub mod routes;
pub mod store;
pub mod telemetry;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use secrecy::{ExposeSecret, SecretBox};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::gateway::FlutterwaveClient;

/// Build the server, but not await it.
///
/// Returns the port that the server has bound to by modifying the config.
pub async fn build(config: &mut Config) -> std::io::Result<Server> {
    let db_pool =
        web::Data::new(PgPool::connect(&config.database_url).await.unwrap());
    let gateway_client = web::Data::new(FlutterwaveClient::new(
        SecretBox::new(Box::new(
            config.flutterwave_secret_key.expose_secret().clone(),
        )),
        config.flutterwave_api_url.clone(),
    ));
    // Constructed once here and injected; request handlers never read the
    // process environment.
    let settings = web::Data::new(AppSettings {
        flutterwave_public_key: config.flutterwave_public_key.clone(),
        webhook_secret: config.webhook_secret.take(),
        app_base_url: config.app_base_url.clone(),
    });

    // Clone config values for use in closure
    let allowed_origins = config.allowed_origins.clone();

    // OS assigns the port if binding to 0
    let listener = TcpListener::bind(format!("{}:{}", config.ip, config.port))?;
    config.port = listener.local_addr()?.port();
    let server = HttpServer::new(move || {
        // Configure CORS based on allowed origins
        let cors = if allowed_origins.contains(&"*".to_string()) {
            // Allow any origin (for development)
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
        } else {
            // Production: Only allow specified origins
            let mut cors = Cors::default()
                .allow_any_method()
                .allow_any_header()
                .supports_credentials();

            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            cors
        };

        App::new()
            .wrap(cors)
            .service(routes::api_services())
            .app_data(db_pool.clone())
            .app_data(gateway_client.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}

pub struct Config {
    pub database_url: String,
    /// set to "0.0.0.0" for public access, "127.0.0.1" for local dev
    pub ip: String,
    /// set to 0 to get an os-assigned port
    pub port: u16,
    /// List of allowed CORS origins. Use "*" to allow any origin (development only)
    pub allowed_origins: Vec<String>,
    /// Public gateway credential handed to the client-side checkout.
    /// Deposits fail with a configuration error when absent.
    pub flutterwave_public_key: Option<String>,
    pub flutterwave_secret_key: SecretBox<String>,
    pub flutterwave_api_url: String,
    /// Shared secret compared against the webhook's `verif-hash` header.
    /// Verification is skipped when unset.
    pub webhook_secret: Option<SecretBox<String>>,
    /// Base URL for checkout redirect and logo links.
    pub app_base_url: String,
}

/// Request-facing subset of [`Config`], injected as app data.
pub struct AppSettings {
    pub flutterwave_public_key: Option<String>,
    pub webhook_secret: Option<SecretBox<String>>,
    pub app_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        use std::env::var;

        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string()) // Default to allow any origin for development
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Config {
            database_url: var("DATABASE_URL").unwrap(),
            ip: var("IP_ADDRESS").unwrap(),
            port: var("PORT").unwrap().parse().unwrap(),
            allowed_origins,
            flutterwave_public_key: var("FLUTTERWAVE_PUBLIC_KEY").ok(),
            flutterwave_secret_key: SecretBox::new(Box::new(
                var("FLUTTERWAVE_SECRET_KEY").unwrap_or_default(),
            )),
            flutterwave_api_url: var("FLUTTERWAVE_API_URL").unwrap_or_else(
                |_| "https://api.flutterwave.com/v3".to_string(),
            ),
            webhook_secret: var("FLUTTERWAVE_WEBHOOK_SECRET")
                .ok()
                .map(|s| SecretBox::new(Box::new(s))),
            app_base_url: var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}
