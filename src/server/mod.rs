//! JSON read API over the content store

use anyhow::Result;
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::content::{FsSource, Post, PostStore};
use crate::render::{Block, RenderPipeline, TocEntry};
use crate::Folio;

/// Shared server state
pub struct AppState {
    store: PostStore<FsSource>,
    pipeline: RenderPipeline,
}

/// Start the API server
pub async fn start(folio: &Folio, host: &str, port: u16, watch: bool) -> Result<()> {
    let state = Arc::new(AppState {
        store: folio.store(),
        pipeline: folio.pipeline(),
    });

    let app = router(state.clone()).nest_service("/assets", ServeDir::new(&folio.assets_dir));

    // Invalidate the post cache when content changes on disk
    if watch {
        let content_dir = folio.content_dir.clone();
        let watch_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_content(content_dir, watch_state).await {
                tracing::error!("content watcher error: {}", e);
            }
        });
    }

    let bind_host = if host == "localhost" { "127.0.0.1" } else { host };
    let addr: SocketAddr = format!("{}:{}", bind_host, port).parse()?;

    println!("API server running at http://{}:{}", host, port);
    if watch {
        println!("Watching content directory for changes.");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .route("/api/categories", get(list_categories))
        .route("/api/tags", get(list_tags))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch the content directory and invalidate the store on changes
async fn watch_content(content_dir: PathBuf, state: Arc<AppState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    if content_dir.exists() {
        debouncer
            .watcher()
            .watch(&content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("watching: {:?}", content_dir);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if events.is_empty() {
                    continue;
                }
                for event in &events {
                    tracing::info!("content changed: {}", event.path.display());
                }
                state.store.invalidate();
            }
            Ok(Err(e)) => {
                tracing::error!("watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Post metadata as returned in listings (no body)
#[derive(Serialize)]
struct PostSummary {
    slug: String,
    title: String,
    description: String,
    #[serde(rename = "publishedAt")]
    published_at: String,
    category: Option<String>,
    tags: Vec<String>,
    #[serde(rename = "coverImage")]
    cover_image: Option<String>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            published_at: post.published_at.format("%Y-%m-%d").to_string(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            cover_image: post.cover_image.clone(),
        }
    }
}

/// Full post response: metadata plus the rendered block tree
#[derive(Serialize)]
struct PostDetail {
    #[serde(flatten)]
    summary: PostSummary,
    blocks: Vec<Block>,
    toc: Vec<TocEntry>,
}

#[derive(Serialize)]
struct TagCount {
    name: String,
    count: usize,
}

#[derive(Deserialize)]
struct ListParams {
    category: Option<String>,
}

/// Structured error body, distinct from the empty-result case
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    message: String,
    detail: String,
}

struct ApiError {
    status: StatusCode,
    message: String,
    detail: String,
}

impl ApiError {
    fn not_found(slug: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "post not found".to_string(),
            detail: format!("no post with slug '{}'", slug),
        }
    }

    fn internal(e: anyhow::Error) -> Self {
        tracing::error!("request failed: {:#}", e);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".to_string(),
            detail: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                message: self.message,
                detail: self.detail,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = match params.category.as_deref() {
        Some(category) => state.store.list_by_category(category),
        None => state.store.list_all(),
    }
    .map_err(ApiError::internal)?;

    Ok(Json(posts.iter().map(PostSummary::from).collect()))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    AxumPath(slug): AxumPath<String>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = state
        .store
        .get(&slug)
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found(&slug))?;

    let blocks = state.pipeline.render(&post.body);
    let toc = RenderPipeline::toc(&blocks);

    Ok(Json(PostDetail {
        summary: PostSummary::from(&post),
        blocks,
        toc,
    }))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let categories = state.store.categories().map_err(ApiError::internal)?;
    Ok(Json(categories))
}

async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TagCount>>, ApiError> {
    let tags = state.store.tags().map_err(ApiError::internal)?;
    Ok(Json(
        tags.into_iter()
            .map(|(name, count)| TagCount { name, count })
            .collect(),
    ))
}
