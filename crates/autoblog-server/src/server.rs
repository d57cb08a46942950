//! Axum routes for generation, posting and blog management

use crate::error::ApiError;
use crate::middleware;
use crate::state::SharedState;
use autoblog_core::fail_open::fail_open;
use autoblog_core::{AutoblogError, BlogDraft, BlogRecord, Credentials, Length, PublishRequest, Style};
use autoblog_publish::{BlogStore, PublishReport, Publisher};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the application router around `state`
pub fn router(state: SharedState) -> Router {
    let limited = Router::new()
        .route("/api/generate-blog", post(generate_blog))
        .route("/api/post-to-twitter", post(post_to_twitter))
        .route("/api/publish", post(publish))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/blogs", get(list_blogs).post(create_blog))
        .route(
            "/api/blogs/:id",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
        .route("/api/blogs/:id/like", post(like_blog))
        .merge(limited)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::block_bots,
        ))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until the process is stopped
pub async fn serve(state: SharedState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "autoblog"
    }))
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    length: Option<String>,
    #[serde(default)]
    style: Option<String>,
}

/// POST /api/generate-blog
async fn generate_blog(
    State(app): State<SharedState>,
    Json(body): Json<GenerateBody>,
) -> ApiResult<Json<Value>> {
    let topic = body.topic.unwrap_or_default();
    if topic.trim().is_empty() {
        return Err(ApiError::bad_request("Topic is required"));
    }

    let generator = app.generator.as_ref().ok_or_else(|| {
        AutoblogError::Auth("Gemini API key is not configured".to_string())
    })?;

    let length = Length::parse_or_default(body.length.as_deref());
    let style = Style::parse_or_default(body.style.as_deref());

    let content = generator.generate(&topic, length, style).await.map_err(|e| {
        warn!("Generation failed ({}): {}", e.code(), e);
        match e {
            // Topic was nothing but markup
            AutoblogError::Validation(_) => ApiError::bad_request("Topic is required"),
            other => ApiError::from(other),
        }
    })?;

    Ok(Json(json!({
        "success": true,
        "data": content,
    })))
}

/// Body of POST /api/post-to-twitter. No `Debug`: it carries a password.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostBody {
    #[serde(default)]
    tweet_content: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    blog_url: Option<String>,
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/post-to-twitter
async fn post_to_twitter(
    State(app): State<SharedState>,
    Json(body): Json<PostBody>,
) -> ApiResult<Json<Value>> {
    let (Some(text), Some(username), Some(password)) = (
        required(body.tweet_content),
        required(body.username),
        required(body.password),
    ) else {
        return Err(ApiError::bad_request(
            "Tweet content, username, and password are required",
        ));
    };

    let request = PublishRequest::new(text, Credentials::new(username, password))
        .with_placeholder(app.orchestrator.config().link_placeholder.clone())
        .with_link(body.blog_url);
    request.validate()?;

    let failed = |details: String| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "PUBLISH_FAILED", "Failed to post")
            .with_details(details)
    };

    let outcome = app
        .orchestrator
        .publisher()
        .publish(&request)
        .await
        .map_err(|e| failed(e.to_string()))?;

    if !outcome.succeeded {
        return Err(failed(
            outcome.diagnostic.unwrap_or_else(|| "unknown failure".to_string()),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Post published successfully!",
        "data": {
            "tweetContent": outcome.final_text,
            "timestamp": outcome.timestamp,
            "confirmed": outcome.confirmation.is_some(),
        }
    })))
}

/// Body of POST /api/publish. No `Debug`: it carries a password.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishBody {
    blog: BlogDraft,
    #[serde(default)]
    tweet_content: Option<String>,
    #[serde(default)]
    auto_post: bool,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// POST /api/publish
async fn publish(
    State(app): State<SharedState>,
    Json(body): Json<PublishBody>,
) -> ApiResult<Json<PublishReport>> {
    let credentials = match (required(body.username), required(body.password)) {
        (Some(username), Some(password)) => Some(Credentials::new(username, password)),
        _ => None,
    };
    let tweet = body.tweet_content.unwrap_or_default();

    let report = app
        .orchestrator
        .publish_both(body.blog, &tweet, body.auto_post, credentials)
        .await?;
    Ok(Json(report))
}

/// GET /api/blogs
async fn list_blogs(State(app): State<SharedState>) -> ApiResult<Json<Value>> {
    let blogs = app.orchestrator.store().list().await?;
    Ok(Json(json!({ "success": true, "data": blogs })))
}

/// POST /api/blogs
async fn create_blog(
    State(app): State<SharedState>,
    Json(draft): Json<BlogDraft>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let blog = app.orchestrator.store().create(draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": blog }))))
}

/// GET /api/blogs/:id, counting a view
async fn get_blog(State(app): State<SharedState>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let store = app.orchestrator.store();
    let mut blog: BlogRecord = store.get(id).await?;
    if let Some(views) = fail_open("record view", || store.record_view(id)).await {
        blog.views = views;
    }
    Ok(Json(json!({ "success": true, "data": blog })))
}

/// PUT /api/blogs/:id
async fn update_blog(
    State(app): State<SharedState>,
    Path(id): Path<u64>,
    Json(draft): Json<BlogDraft>,
) -> ApiResult<Json<Value>> {
    let blog = app.orchestrator.store().update(id, draft).await?;
    Ok(Json(json!({ "success": true, "data": blog })))
}

/// DELETE /api/blogs/:id
async fn delete_blog(State(app): State<SharedState>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let blog = app.orchestrator.store().delete(id).await?;
    Ok(Json(json!({ "success": true, "data": blog })))
}

/// POST /api/blogs/:id/like
async fn like_blog(State(app): State<SharedState>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let likes = app.orchestrator.store().like(id).await?;
    Ok(Json(json!({ "success": true, "data": { "id": id, "likes": likes } })))
}
