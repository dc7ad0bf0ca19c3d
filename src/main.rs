use std::{future::IntoFuture, process, sync::Arc};

use blogline::{
    application::{
        accounts::AccountService,
        error::AppError,
        identity::{IdentityVerifier, JwtIdentity},
        posts::PostService,
        repos::{PostsRepo, UsersRepo},
    },
    cache::{CacheAdapter, CacheConfig, CacheStore, InMemoryCacheStore},
    config,
    domain::types::ActorId,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, HttpState, RouterState},
        redis::RedisCacheStore,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::IssueToken(args) => run_issue_token(&settings, &args),
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let tokens = Arc::new(build_identity(&settings)?);
    let identity: Arc<dyn IdentityVerifier> = tokens.clone();
    let repositories = init_repositories(&settings).await?;
    let cache_config = CacheConfig::from(&settings.cache);
    let cache = init_cache(&settings, &cache_config).await?;

    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let posts_repo: Arc<dyn PostsRepo> = repositories;
    let accounts = Arc::new(AccountService::new(
        users_repo,
        tokens,
        token_ttl(&settings)?,
    ));
    info!(
        target = "blogline::serve",
        ttl_seconds = cache_config.ttl.as_secs(),
        invalidation = cache_config.invalidation.as_str(),
        "Post cache configured"
    );

    let posts = Arc::new(PostService::new(posts_repo.clone(), cache, cache_config));

    let router_state = RouterState {
        http: HttpState { repo: posts_repo },
        api: ApiState {
            posts,
            accounts,
            identity,
        },
    };

    serve_http(&settings, router_state).await
}

fn run_issue_token(
    settings: &config::Settings,
    args: &config::IssueTokenArgs,
) -> Result<(), AppError> {
    let identity = build_identity(settings)?;
    let ttl = token_ttl(settings)?;

    let token = identity
        .issue(ActorId(args.user_id), ttl)
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    println!("{token}");
    Ok(())
}

fn token_ttl(settings: &config::Settings) -> Result<time::Duration, AppError> {
    time::Duration::try_from(settings.auth.token_ttl)
        .map_err(|err| AppError::validation(format!("token ttl out of range: {err}")))
}

fn build_identity(settings: &config::Settings) -> Result<JwtIdentity, AppError> {
    let secret = settings
        .auth
        .jwt_secret
        .as_deref()
        .ok_or_else(|| InfraError::configuration("auth.jwt_secret is not configured"))?;
    Ok(JwtIdentity::new(secret))
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn init_cache(
    settings: &config::Settings,
    cache_config: &CacheConfig,
) -> Result<CacheAdapter, AppError> {
    let store: Arc<dyn CacheStore> = match RedisCacheStore::from_settings(&settings.cache).await? {
        Some(redis) => {
            info!(target = "blogline::serve", "Using redis cache store");
            Arc::new(redis)
        }
        None => {
            warn!(
                target = "blogline::serve",
                "cache.redis_url is not configured; using a process-local cache"
            );
            Arc::new(InMemoryCacheStore::with_capacity(
                cache_config.memory_capacity_non_zero(),
            ))
        }
    };
    Ok(CacheAdapter::new(store))
}

async fn serve_http(settings: &config::Settings, state: RouterState) -> Result<(), AppError> {
    let router = http::build_router(state, &settings.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "blogline::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(());
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    let drain_deadline = async move {
        if signal_rx.await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => result.map_err(|err| AppError::from(InfraError::from(err))),
        () = drain_deadline => {
            warn!(
                target = "blogline::serve",
                grace_seconds = grace.as_secs(),
                "In-flight requests did not drain before the shutdown deadline"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "blogline::serve", error = %err, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target = "blogline::serve", error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!(target = "blogline::serve", "Shutdown requested; draining connections");
}
