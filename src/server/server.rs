use anyhow::Result;
use std::{
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, error};

use crate::catalog::{MovieQuery, MovieSort};
use crate::server::session::Session;
use crate::user::{
    FullUserStore, SignupError, TokenIssuer, User, UserManager, UserRole, WatchlistError,
};
use tower_http::services::ServeDir;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SignupBody {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug)]
struct SigninBody {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WatchlistMutationBody {
    pub movie_id: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct MoviesQueryParams {
    pub genre: Option<String>,
    pub release_year: Option<u16>,
    /// Minimum average review rating.
    pub rating: Option<f64>,
    pub sort_by: Option<String>,
}

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

#[derive(Serialize)]
struct SigninResponse {
    message: String,
    token: String,
    user: User,
}

#[derive(Serialize)]
struct WatchlistResponse {
    message: String,
    watchlist: Vec<crate::catalog::Movie>,
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(MessageBody {
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Maps a watchlist failure to its wire status and `{message}` body.
/// Internal faults are logged here with the failing operation and ids,
/// the client only sees a generic message.
fn watchlist_error_response(
    op: &str,
    user_id: usize,
    movie_id: Option<&str>,
    err: WatchlistError,
) -> Response {
    let status = match &err {
        WatchlistError::InvalidReference => StatusCode::BAD_REQUEST,
        WatchlistError::MovieNotFound => StatusCode::NOT_FOUND,
        WatchlistError::UserNotFound => StatusCode::NOT_FOUND,
        WatchlistError::AlreadyInWatchlist => StatusCode::BAD_REQUEST,
        WatchlistError::NotInWatchlist => StatusCode::BAD_REQUEST,
        WatchlistError::Internal(inner) => {
            error!(
                "{} failed for user {} movie {:?}: {:#}",
                op, user_id, movie_id, inner
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    message_response(status, &err.to_string())
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
    };
    Json(stats)
}

async fn signup(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<SignupBody>,
) -> Response {
    match user_manager.signup(&body.email, &body.full_name, &body.password) {
        Ok(user_id) => {
            debug!("Registered user {} as id {}", body.email, user_id);
            message_response(StatusCode::CREATED, "User registered successfully")
        }
        Err(err @ (SignupError::MissingField | SignupError::EmailTaken)) => {
            message_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Err(SignupError::Internal(inner)) => {
            error!("Signup failed for {}: {:#}", body.email, inner);
            message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn signin_response(token_issuer: &TokenIssuer, user: User) -> Response {
    match token_issuer.issue(user.id) {
        Ok(token) => Json(SigninResponse {
            message: "Login successful".to_string(),
            token,
            user,
        })
        .into_response(),
        Err(err) => {
            error!("Failed to issue token for user {}: {:#}", user.id, err);
            message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn signin(State(state): State<ServerState>, Json(body): Json<SigninBody>) -> Response {
    match state.user_manager.verify_credentials(&body.email, &body.password) {
        Ok(Some(user)) => signin_response(&state.token_issuer, user),
        Ok(None) => message_response(StatusCode::UNAUTHORIZED, "Invalid email or password"),
        Err(err) => {
            error!("Signin failed for {}: {:#}", body.email, err);
            message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn admin_signin(State(state): State<ServerState>, Json(body): Json<SigninBody>) -> Response {
    match state.user_manager.verify_credentials(&body.email, &body.password) {
        Ok(Some(user)) if user.role == UserRole::Admin => {
            signin_response(&state.token_issuer, user)
        }
        Ok(Some(_)) => message_response(StatusCode::UNAUTHORIZED, "Access denied"),
        Ok(None) => message_response(StatusCode::UNAUTHORIZED, "Invalid email or password"),
        Err(err) => {
            error!("Admin signin failed for {}: {:#}", body.email, err);
            message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn add_watchlist_movie(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<WatchlistMutationBody>,
) -> Response {
    match user_manager.add_to_watchlist(session.user_id, &body.movie_id) {
        Ok(watchlist) => Json(WatchlistResponse {
            message: "Movie added to watchlist".to_string(),
            watchlist,
        })
        .into_response(),
        Err(err) => watchlist_error_response(
            "add_to_watchlist",
            session.user_id,
            Some(&body.movie_id),
            err,
        ),
    }
}

async fn remove_watchlist_movie(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<WatchlistMutationBody>,
) -> Response {
    match user_manager.remove_from_watchlist(session.user_id, &body.movie_id) {
        Ok(watchlist) => Json(WatchlistResponse {
            message: "Movie removed from watchlist".to_string(),
            watchlist,
        })
        .into_response(),
        Err(err) => watchlist_error_response(
            "remove_from_watchlist",
            session.user_id,
            Some(&body.movie_id),
            err,
        ),
    }
}

async fn get_watchlist(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
) -> Response {
    match user_manager.get_watchlist(session.user_id) {
        Ok(watchlist) => Json(watchlist).into_response(),
        Err(err) => watchlist_error_response("get_watchlist", session.user_id, None, err),
    }
}

async fn list_movies(
    State(catalog_store): State<GuardedCatalogStore>,
    Query(params): Query<MoviesQueryParams>,
) -> Response {
    let sort_by = match params.sort_by.as_deref() {
        None => None,
        Some(key) => match MovieSort::from_str(key) {
            Ok(sort) => Some(sort),
            Err(_) => return message_response(StatusCode::BAD_REQUEST, "Invalid sort key"),
        },
    };
    let query = MovieQuery {
        genre: params.genre,
        release_year: params.release_year,
        min_rating: params.rating,
        sort_by,
    };
    match catalog_store.list_movies(&query) {
        Ok(movies) => Json(movies).into_response(),
        Err(err) => {
            error!("Failed to list movies: {:#}", err);
            message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn get_movie(
    State(catalog_store): State<GuardedCatalogStore>,
    Path(id): Path<String>,
) -> Response {
    match catalog_store.get_movie(&id) {
        Ok(Some(movie)) => Json(movie).into_response(),
        Ok(None) => message_response(StatusCode::NOT_FOUND, "Movie not found"),
        Err(err) => {
            error!("Failed to get movie {}: {:#}", id, err);
            message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

impl ServerState {
    fn new(
        config: ServerConfig,
        catalog_store: GuardedCatalogStore,
        user_manager: UserManager,
    ) -> ServerState {
        let token_issuer = TokenIssuer::new(&config.jwt_secret);
        ServerState {
            config,
            start_time: Instant::now(),
            catalog_store,
            user_manager: Arc::new(user_manager),
            token_issuer,
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    catalog_store: GuardedCatalogStore,
    user_store: Arc<dyn FullUserStore>,
) -> Result<Router> {
    let user_manager = UserManager::new(catalog_store.clone(), user_store);
    let state = ServerState::new(config.clone(), catalog_store, user_manager);

    let user_routes: Router = Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/admin/signin", post(admin_signin))
        .route("/watchlist/add", post(add_watchlist_movie))
        .route("/watchlist/remove", post(remove_watchlist_movie))
        .route("/watchlist", get(get_watchlist))
        .with_state(state.clone());

    let movie_routes: Router = Router::new()
        .route("/", get(list_movies))
        .route("/{id}", get(get_movie))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/api/users", user_routes)
        .nest("/api/movies", movie_routes);

    if let Some(poster_dir_path) = &state.config.poster_dir_path {
        app = app.nest_service("/posters", ServeDir::new(poster_dir_path));
    }

    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub async fn run_server(
    catalog_store: GuardedCatalogStore,
    user_store: Arc<dyn FullUserStore>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    poster_dir_path: Option<String>,
    jwt_secret: String,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        poster_dir_path,
        jwt_secret,
    };
    let app = make_app(config, catalog_store, user_store)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
