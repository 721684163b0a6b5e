//! NovaDom server binary
//!
//! Starts the HTTP server by default. Subcommands validate configuration and
//! manage admin accounts against the configured database.

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use novadom::{
    admin::InitialAdmin,
    build_app,
    cli::{admin as admin_cli, output::Output, AdminCommands, Cli, Commands},
    utils::toml_config::{LogFormat, ServerConfig},
    AppState, NovadomConfig,
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config, cli.verbose, &output).await,
        Commands::Config { validate } => show_config(&cli.config, validate, &output),
        Commands::Admin(command) => run_admin(&cli.config, command, &output).await,
    }
}

fn load_config(path: &std::path::Path) -> Result<NovadomConfig> {
    NovadomConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn init_tracing(server: &ServerConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { server.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "novadom={level},novadom_server={level},tower_http={level}",
            level = default_level
        ))
    });

    let json = server.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().flatten_event(true)))
        .with((!json).then(|| fmt::layer().with_target(true)))
        .init();
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", o))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true))
}

async fn serve(config_path: &std::path::Path, verbose: bool, output: &Output) -> Result<()> {
    let config = load_config(config_path)?;
    init_tracing(&config.server, verbose);
    output.banner();

    let cors = cors_layer(&config.server.cors_origins)?;
    let bind_addr = config.bind_address();

    tracing::info!(
        database = %config.database.url,
        token_ttl_secs = config.auth.token_ttl_secs,
        "Starting NovaDom server"
    );

    let state = AppState::from_config(config)
        .await
        .context("Failed to initialize application state")?;

    if let Some(initial) = state.config.initial_admin() {
        state
            .admin_accounts()
            .bootstrap_initial_admin(&initial)
            .await
            .context("Failed to create the initial admin")?;
    } else {
        tracing::debug!("Initial admin env vars not set; skipping admin bootstrap");
    }

    let app = build_app(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    output.kv("Listening", &format!("http://{}", bind_addr));
    #[cfg(feature = "swagger-ui")]
    output.kv("API docs", &format!("http://{}/swagger-ui/", bind_addr));
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn show_config(config_path: &std::path::Path, validate: bool, output: &Output) -> Result<()> {
    output.header("Configuration");
    output.kv("File", &config_path.display().to_string());

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("{:#}", e));
            return Err(e);
        }
    };

    output.kv("Bind address", &config.bind_address());
    output.kv("Database", &config.database.url);
    output.kv("Algorithm", &config.auth.algorithm);
    output.kv("Token TTL (s)", &config.auth.token_ttl_secs.to_string());
    output.kv("CORS origins", &config.server.cors_origins.join(", "));
    output.kv(
        "Initial admin",
        if config.initial_admin().is_some() {
            "configured"
        } else {
            "not configured"
        },
    );

    if validate {
        // load() already validated; report it explicitly for scripts.
        output.success("Configuration is valid");
    }
    Ok(())
}

async fn run_admin(
    config_path: &std::path::Path,
    command: AdminCommands,
    output: &Output,
) -> Result<()> {
    let config = load_config(config_path)?;
    let state = AppState::from_config(config)
        .await
        .context("Failed to open the database")?;
    let accounts = state.admin_accounts();

    match command {
        AdminCommands::Create {
            email,
            first_name,
            last_name,
        } => {
            let initial = admin_from_args(&state.config, email, first_name, last_name)?;
            admin_cli::create(&accounts, &initial, output).await?;
        }
        AdminCommands::List => {
            admin_cli::list(&accounts, output).await?;
        }
        AdminCommands::Deactivate { email, yes } => {
            if !yes && !output.confirm(&format!("Deactivate admin {}?", email)) {
                output.info("Aborted");
                return Ok(());
            }
            admin_cli::deactivate(&accounts, &email, output).await?;
        }
    }
    Ok(())
}

/// Command-line values override the `[admin]` section. The password only
/// comes from the environment.
fn admin_from_args(
    config: &NovadomConfig,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<InitialAdmin> {
    let email = email
        .or_else(|| config.resolve_env(&config.admin.email_env))
        .with_context(|| {
            format!(
                "No admin email given; pass --email or set {}",
                config.admin.email_env
            )
        })?;
    let password = config
        .resolve_env(&config.admin.password_env)
        .with_context(|| format!("Set {} to the admin password", config.admin.password_env))?;

    Ok(InitialAdmin {
        email,
        password,
        first_name: first_name.unwrap_or_else(|| config.admin.first_name.clone()),
        last_name: last_name.unwrap_or_else(|| config.admin.last_name.clone()),
    })
}
