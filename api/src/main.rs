use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
};
use google_cloud_storage::client::Storage;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ledmap_api::AppState;
use ledmap_api::config::Config;
use ledmap_api::constants::{DB_MAX_CONNECTIONS, MAX_IMAGE_UPLOAD_SIZE};
use ledmap_api::domain::clip_requirements::ClipRequirementStore;
use ledmap_api::routes;
use ledmap_api::services::email::EmailClient;
use ledmap_api::services::local_storage::{FileStorage, LocalStorage, MemoryStorage};
use ledmap_api::services::session;
use ledmap_api::storage::ObjectStorage;

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let storage = match &config.local_storage_path {
        Some(path) => {
            std::fs::create_dir_all(path).expect("Failed to create local storage directory");
            info!("Storing images locally at {}", path.display());
            ObjectStorage::Local(path.clone())
        }
        None => {
            // GCS client uses GOOGLE_APPLICATION_CREDENTIALS env var
            let client = Storage::builder()
                .build()
                .await
                .expect("Failed to create GCS client");
            info!("Storing images in GCS bucket {}", config.gcs_bucket);
            ObjectStorage::Gcs {
                client,
                bucket: config.gcs_bucket.clone(),
            }
        }
    };

    let clip_storage: Box<dyn LocalStorage> = match std::fs::create_dir_all(&config.clip_storage_dir) {
        Ok(()) => Box::new(FileStorage::new(&config.clip_storage_dir)),
        Err(e) => {
            warn!(
                "Clip storage directory {} unusable, keeping clip requirements in memory: {}",
                config.clip_storage_dir.display(),
                e
            );
            Box::new(MemoryStorage::default())
        }
    };

    if config.email_webhook_url.is_none() {
        info!("EMAIL_WEBHOOK_URL not set, notification emails are only logged");
    }

    let state = Arc::new(AppState {
        db: pool,
        jwt_secret: config.jwt_secret.as_bytes().to_vec(),
        admin_password_digest: session::password_digest(&config.admin_password),
        session_ttl: chrono::Duration::hours(config.admin_session_hours),
        cookies: config.cookies,
        storage,
        clips: ClipRequirementStore::new(clip_storage),
        email: EmailClient::new(config.email_webhook_url.clone()),
        inquiry_notify_email: config.inquiry_notify_email.clone(),
    });

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));
    if let Some(origin) = &config.cors_origin {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => cors = cors.allow_origin(origin).allow_credentials(true),
            Err(e) => warn!("Ignoring invalid CORS_ORIGIN {}: {}", origin, e),
        }
    }

    let app = routes::build_routes()
        .layer(DefaultBodyLimit::max(MAX_IMAGE_UPLOAD_SIZE))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors)
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    info!("Listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server failed");

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
