use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use credential_core::TokenIssuer;
use db_pool::{create_pool, DbConfig};
use social_api::handlers;
use social_api::services::media::{MediaStorage, S3MediaStorage};
use social_api::services::MediaService;
use social_api::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Liveness probe: answers ok while PostgreSQL is reachable.
async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "social-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "social-api"
        })),
    }
}

fn build_cors(allowed_origins: &str) -> Cors {
    if allowed_origins.trim() == "*" {
        return Cors::permissive();
    }

    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    for origin in allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        cors = cors.allowed_origin(origin);
    }
    cors
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;

    let db_config = DbConfig {
        service_name: "social-api".to_string(),
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DbConfig::default()
    };
    let pool = create_pool(&db_config).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    let token_issuer = TokenIssuer::new(config.jwt.clone());

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    let media_storage: Arc<dyn MediaStorage> =
        Arc::new(S3MediaStorage::new(s3_client, &config.media));
    let media_service = MediaService::new(media_storage);

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!(host = %config.app.host, port = config.app.port, "Starting social-api");

    let pool_data = web::Data::new(pool);
    let issuer_data = web::Data::new(token_issuer);
    let config_data = web::Data::new(config.clone());
    let media_data = web::Data::new(media_service);
    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(build_cors(&allowed_origins))
            .app_data(pool_data.clone())
            .app_data(issuer_data.clone())
            .app_data(config_data.clone())
            .app_data(media_data.clone())
            .route("/health", web::get().to(health))
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
