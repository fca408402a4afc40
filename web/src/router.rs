//! Router composition.

use crate::config::MediaConfig;
use crate::handlers::{
    admins, auth, categories, health_check, image_banners, profile, public, readiness_check, text_banners,
};
use crate::middleware::correlation_id_layer;
use crate::state::{AppState, Backend};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Extension, Router,
};
use linkboard_core::providers::MediaStorage;
use linkboard_core::ImageBannerKind;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Largest accepted request body (uploads included).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the application router.
///
/// # Routes
///
/// ## Probes
/// - `GET /health`, `GET /ready`
///
/// ## Public
/// - `GET /api/links`, `GET /api/guarantee`
///
/// ## Auth
/// - `POST /api/auth/register`, `GET /api/auth/check-username`
/// - `POST /api/auth/login`, `POST /api/auth/logout`, `GET /api/auth/session`
///
/// ## Profile (signed in)
/// - `POST /api/profile/update`, `POST /api/profile/delete-image`
///
/// ## Admin
/// - `/api/admin/text-banner-categories[/:id[/reorder]]`
/// - `/api/admin/text-banners[/:id[/reorder]]`
/// - `/api/admin/common-banners[/:id]`, `/api/admin/image-banners[/:id]`
/// - `/api/admin/admins[/:id]`
///
/// # Example
///
/// ```rust,ignore
/// let app = router(AppState::new(store, media, hasher, sessions));
/// let app = serve_media(app, &config.media);
/// axum::serve(listener, app).await?;
/// ```
pub fn router<B, M>(state: AppState<B, M>) -> Router
where
    B: Backend,
    M: MediaStorage + 'static,
{
    let auth_routes = Router::new()
        .route("/register", post(auth::register::<B, M>))
        .route("/check-username", get(auth::check_username::<B, M>))
        .route("/login", post(auth::login::<B, M>))
        .route("/logout", post(auth::logout::<B, M>))
        .route("/session", get(auth::session));

    let profile_routes = Router::new()
        .route("/update", post(profile::update_profile::<B, M>))
        .route("/delete-image", post(profile::delete_image::<B, M>));

    let admin_routes = Router::new()
        .route(
            "/text-banner-categories",
            get(categories::list_categories::<B, M>).post(categories::create_category::<B, M>),
        )
        .route(
            "/text-banner-categories/:id",
            put(categories::update_category::<B, M>).delete(categories::delete_category::<B, M>),
        )
        .route(
            "/text-banner-categories/:id/reorder",
            put(categories::reorder_category::<B, M>),
        )
        .route(
            "/text-banners",
            get(text_banners::list_text_banners::<B, M>).post(text_banners::create_text_banner::<B, M>),
        )
        .route(
            "/text-banners/:id",
            put(text_banners::update_text_banner::<B, M>).delete(text_banners::delete_text_banner::<B, M>),
        )
        .route("/text-banners/:id/reorder", put(text_banners::reorder_text_banner::<B, M>))
        .nest("/common-banners", image_banner_routes::<B, M>(ImageBannerKind::Common))
        .nest("/image-banners", image_banner_routes::<B, M>(ImageBannerKind::Guarantee))
        .route(
            "/admins",
            get(admins::list_admins::<B, M>).post(admins::create_admin::<B, M>),
        )
        .route(
            "/admins/:id",
            axum::routing::patch(admins::rename_admin::<B, M>).delete(admins::delete_admin::<B, M>),
        );

    let api_routes = Router::new()
        .route("/links", get(public::links::<B, M>))
        .route("/guarantee", get(public::guarantee::<B, M>))
        .nest("/auth", auth_routes)
        .nest("/profile", profile_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check::<B, M>))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}

fn image_banner_routes<B, M>(kind: ImageBannerKind) -> Router<AppState<B, M>>
where
    B: Backend,
    M: MediaStorage + 'static,
{
    Router::new()
        .route(
            "/",
            get(image_banners::list_image_banners::<B, M>).post(image_banners::create_image_banner::<B, M>),
        )
        .route(
            "/:id",
            put(image_banners::update_image_banner::<B, M>).delete(image_banners::delete_image_banner::<B, M>),
        )
        .layer(Extension(kind))
}

/// Serve stored media under `config.base_url`.
///
/// A base URL that is not a local path (a CDN, for instance) is left to
/// whatever serves it, and the router is returned unchanged.
#[must_use]
pub fn serve_media(router: Router, config: &MediaConfig) -> Router {
    let base = config.base_url.trim_end_matches('/');
    if !base.starts_with('/') || base.len() < 2 {
        tracing::info!(base_url = %config.base_url, "media served externally");
        return router;
    }
    router.nest_service(base, ServeDir::new(&config.root))
}

/// Allow credentialed cross-origin requests from `origin`.
///
/// # Errors
///
/// Returns an error if `origin` is not a valid header value.
pub fn allow_origin(router: Router, origin: &str) -> Result<Router, header::InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);
    Ok(router.layer(cors))
}
