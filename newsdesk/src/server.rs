use std::sync::Arc;

use anyhow::{anyhow, Result};
use rocket::serde::json::Json;
use rocket::{get, routes, Build, Rocket, State};
use serde::Serialize;
use tracing::warn;

use common::{Config, ServerConfig};

use crate::llm::LlmProvider;
use crate::news::{FetchError, NewsProvider};
use crate::pipeline::{
    self, CategorizedPayload, HeadlinesPayload, PipelineOptions, SummaryPayload, TopicPayload,
};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub news: Arc<dyn NewsProvider>,
    pub llm: Arc<dyn LlmProvider>,
}

impl AppState {
    fn options(&self) -> PipelineOptions {
        PipelineOptions::from(self.config.as_ref())
    }
}

/// Response structure for `/`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    message: &'static str,
}

/// Upstream failures are reported inside a 200 response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub status: u16,
}

/// Either the endpoint payload or the soft-fail error body.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Ok(T),
    Failed(ErrorBody),
}

fn reply<T>(result: Result<T, FetchError>, error: &'static str) -> Json<Reply<T>> {
    match result {
        Ok(payload) => Json(Reply::Ok(payload)),
        Err(e) => {
            warn!(status = e.status_code(), "{}: {}", error, e);
            Json(Reply::Failed(ErrorBody {
                error,
                status: e.status_code(),
            }))
        }
    }
}

/// Health check
#[get("/")]
async fn index() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        message: "Hello from News Aggregator!",
    })
}

#[get("/news?<country>")]
async fn headlines(
    state: &State<AppState>,
    country: Option<String>,
) -> Json<Reply<HeadlinesPayload>> {
    let country = country.unwrap_or_else(|| state.config.news.default_country.clone());
    let result = pipeline::headlines(state.news.as_ref(), &country).await;
    reply(result, "Failed to fetch news")
}

#[get("/news/topic?<query>")]
async fn topic(state: &State<AppState>, query: Option<String>) -> Json<Reply<TopicPayload>> {
    let query = query.unwrap_or_else(|| state.config.news.default_topic.clone());
    let result = pipeline::topic_articles(state.news.as_ref(), &query).await;
    reply(result, "Failed to fetch topic news")
}

#[get("/news/summary?<query>")]
async fn summary(state: &State<AppState>, query: Option<String>) -> Json<Reply<SummaryPayload>> {
    let query = query.unwrap_or_else(|| state.config.news.default_topic.clone());
    let result = pipeline::summarize_topic(
        state.news.as_ref(),
        state.llm.as_ref(),
        &query,
        state.options(),
    )
    .await;
    reply(result, "Failed to fetch news")
}

#[get("/news/categorized?<query>")]
async fn categorized(
    state: &State<AppState>,
    query: Option<String>,
) -> Json<Reply<CategorizedPayload>> {
    let query = query.unwrap_or_else(|| state.config.news.default_topic.clone());
    let result = pipeline::categorize_topic(
        state.news.as_ref(),
        state.llm.as_ref(),
        &query,
        state.options(),
    )
    .await;
    reply(result, "Failed to fetch news")
}

/// Build a Rocket instance with managed state and all routes mounted.
///
/// Separate from [`launch_rocket`] so tests can drive it with a local client.
pub fn build_rocket(state: AppState, figment: rocket::figment::Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![index, headlines, topic, summary, categorized])
}

/// Build and launch a Rocket server bound to the `[server]` address.
///
/// This function blocks until the Rocket server shuts down.
pub async fn launch_rocket(state: AppState, server: &ServerConfig) -> Result<()> {
    let fig = rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port));

    tracing::info!("Starting Rocket HTTP server on {}:{}", server.bind, server.port);
    build_rocket(state, fig)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
