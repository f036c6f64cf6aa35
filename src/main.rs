//! User management REST service.
//! Reads configuration from TOML file (~/.config/user-service/config.toml).

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use user_service::application::UserService;
use user_service::config::AppConfig;
use user_service::infrastructure::crypto::jwt::JwtConfig;
use user_service::infrastructure::crypto::DelegatingPasswordEncoder;
use user_service::infrastructure::database::migrator::Migrator;
use user_service::infrastructure::database::repositories::UserRepository;
use user_service::{create_api_router, default_config_path, init_database, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("USER_SERVICE_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            warn!("Failed to load config: {}. Using defaults.", e);
            let cfg = AppConfig::default().with_env_overrides();
            cfg.validate()?;
            cfg
        }
    };

    info!("Starting user service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    // ── Password encoder (validates the pbkdf2 secret invariant) ──
    let encoder = match DelegatingPasswordEncoder::new(&app_cfg.security.pbkdf2_secret) {
        Ok(encoder) => Arc::new(encoder),
        Err(e) => {
            error!("Invalid password encoder configuration: {}", e);
            return Err(e.into());
        }
    };

    let jwt_config = JwtConfig {
        secret: app_cfg.security.jwt_secret.clone(),
        expiration_hours: app_cfg.security.jwt_expiration_hours,
        issuer: "user-service".to_string(),
    };
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.url.clone(),
    };
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // Create default admin user if not exists
    create_default_admin(&db, &app_cfg, &encoder).await;

    // ── Services & router ──────────────────────────────────────
    let repo = Arc::new(UserRepository::new(db.clone()));
    let user_service = Arc::new(UserService::new(repo, encoder, jwt_config.clone()));

    let router = create_api_router(user_service, jwt_config, prometheus_handle);

    let addr = app_cfg.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Performing final cleanup...");
    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("User service shutdown complete");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Create default admin user if no users exist
async fn create_default_admin(
    db: &sea_orm::DatabaseConnection,
    app_cfg: &AppConfig,
    encoder: &DelegatingPasswordEncoder,
) {
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
    use user_service::domain::{ROLE_ADMIN, ROLE_USER};
    use user_service::infrastructure::database::entities::{authority, user};

    let users_count = user::Entity::find().count(db).await.unwrap_or(0);
    if users_count != 0 {
        return;
    }

    info!("Creating default admin user...");

    let password_hash = match encoder.encode(&app_cfg.admin.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash admin password: {}", e);
            return;
        }
    };

    let today = Utc::now().date_naive();
    let admin = user::ActiveModel {
        email: Set(app_cfg.admin.email.clone()),
        username: Set(app_cfg.admin.username.clone()),
        password: Set(password_hash),
        firstname: Set("Default".to_string()),
        lastname: Set("Admin".to_string()),
        birthdate: Set(None),
        phone_number: Set(None),
        profile_image: Set(None),
        status: Set(true),
        country_id: Set(None),
        status_change_at: Set(today),
        create_at: Set(today),
        update_at: Set(today),
        last_login: Set(None),
        ..Default::default()
    };

    let inserted = match admin.insert(db).await {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to create admin user: {}", e);
            return;
        }
    };

    for role in [ROLE_ADMIN, ROLE_USER] {
        let grant = authority::ActiveModel {
            authority: Set(role.to_string()),
            user_id: Set(inserted.id),
            create_at: Set(today),
            update_at: Set(today),
            ..Default::default()
        };
        if let Err(e) = grant.insert(db).await {
            error!("Failed to grant {} to admin user: {}", role, e);
        }
    }

    info!("Default admin created: {}", app_cfg.admin.email);
    warn!("Please change the admin password immediately!");
}
