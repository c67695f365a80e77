use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{
    AdminAllowList, AuthGate, CaptchaVerifier, ContentService, LetterWorkflow, NotificationService,
    PublicContent, TokenVerifier,
};
use domain::store::{ContentStore, LetterRequestStore};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, submission_rate_limit, trace_id, RateLimiterState,
};
use crate::routes::{content, health, layanan, public};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_gate: Arc<AuthGate>,
    pub letters: Arc<LetterWorkflow>,
    pub letter_store: Arc<dyn LetterRequestStore>,
    pub content: Arc<ContentService>,
    pub public_content: Arc<PublicContent>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

/// External collaborators, constructed once at startup.
pub struct AppDependencies {
    pub letter_store: Arc<dyn LetterRequestStore>,
    pub content_store: Arc<dyn ContentStore>,
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub notifier: Arc<dyn NotificationService>,
}

impl AppState {
    pub fn new(config: Config, deps: AppDependencies) -> Self {
        let allow_list = AdminAllowList::from_csv(&config.admin.emails);
        let rate_limiter =
            RateLimiterState::new(config.security.submission_rate_limit_per_minute).map(Arc::new);

        Self {
            auth_gate: Arc::new(AuthGate::new(deps.token_verifier, allow_list)),
            letters: Arc::new(LetterWorkflow::new(
                deps.letter_store.clone(),
                deps.captcha,
                deps.notifier,
            )),
            letter_store: deps.letter_store,
            content: Arc::new(ContentService::new(deps.content_store.clone())),
            public_content: Arc::new(PublicContent::new(deps.content_store)),
            rate_limiter,
            config: Arc::new(config),
        }
    }
}

pub fn create_app(config: Config, deps: AppDependencies) -> Router {
    router(AppState::new(config, deps))
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Citizen submissions (anonymous, rate limited per client IP)
    let submission_routes = Router::new()
        .route("/api/layanan/:letter_type", post(layanan::submit_letter))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            submission_rate_limit,
        ));

    // Admin routes; every handler takes the AdminAuth extractor first
    let admin_routes = Router::new()
        .route("/api/admin/layanan/pending-count", get(layanan::pending_count))
        .route(
            "/api/admin/layanan/:letter_type",
            get(layanan::list_letters)
                .put(layanan::update_letter)
                .delete(layanan::delete_letter),
        )
        .route("/api/admin/layanan/:letter_type/pdf", get(layanan::letter_pdf))
        .route(
            "/api/admin/:entity_type",
            get(content::list_content).post(content::create_content),
        )
        .route(
            "/api/admin/:entity_type/:id",
            get(content::get_content)
                .put(content::update_content)
                .delete(content::delete_content),
        );

    let public_routes = Router::new()
        .route("/api/public/:entity_type", get(public::list_published))
        .route("/api/public/:entity_type/:slug", get(public::get_by_slug))
        .route("/api/public/:entity_type/:slug/pdf", get(public::budget_pdf))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(submission_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
