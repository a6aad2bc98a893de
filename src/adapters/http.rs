//! HTTP 路由：把流程引擎接到 axum 上
//!
//! session id 放在 cookie 中。每個請求開始時從 `SessionStore` 載入 session，
//! 交給 `RequestContext` 獨佔，處理完畢後再寫回。

use crate::adapters::storage::FsManifestSource;
use crate::core::flow::{FlowEngine, PriceStep, QuestionStep, Submission};
use crate::core::price_manifest::PriceManifestProvider;
use crate::core::rules::ValidationIssue;
use crate::core::session_gateway::RequestContext;
use crate::core::{ConfigProvider, ManifestSource, Renderer, SessionId, SessionStore};
use crate::utils::error::{MarketplaceError, Result};
use axum::extract::{Form, Path, State};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct AppState<S: ManifestSource> {
    pub engine: Arc<FlowEngine<S>>,
    pub sessions: Arc<dyn SessionStore>,
    pub renderer: Arc<dyn Renderer>,
    pub cookie_name: String,
}

impl<S: ManifestSource> AppState<S> {
    pub fn new(
        engine: FlowEngine<S>,
        sessions: Arc<dyn SessionStore>,
        renderer: Arc<dyn Renderer>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            sessions,
            renderer,
            cookie_name: cookie_name.into(),
        }
    }
}

impl AppState<FsManifestSource> {
    /// 以設定建立讀取本機 manifests 目錄的應用狀態
    pub fn from_config<C: ConfigProvider>(
        config: &C,
        sessions: Arc<dyn SessionStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let source = FsManifestSource::new(config.manifests_root());
        let engine = FlowEngine::from_config(source, config);
        Self::new(engine, sessions, renderer, config.session_cookie_name())
    }
}

impl<S: ManifestSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            sessions: Arc::clone(&self.sessions),
            renderer: Arc::clone(&self.renderer),
            cookie_name: self.cookie_name.clone(),
        }
    }
}

/// 將核心錯誤轉為 HTTP 回應
#[derive(Debug)]
pub struct HttpError(MarketplaceError);

impl From<MarketplaceError> for HttpError {
    fn from(err: MarketplaceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = if self.0.is_not_found() {
            tracing::info!("Not found: {}", self.0);
            StatusCode::NOT_FOUND
        } else if self.0.is_bad_request() {
            tracing::info!("Bad request: {}", self.0);
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(
                "❌ Request failed: {} (Severity: {:?})",
                self.0,
                self.0.severity()
            );
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, self.0.user_friendly_message()).into_response()
    }
}

type HandlerResult = std::result::Result<Response, HttpError>;

#[derive(Serialize)]
struct QuestionView {
    #[serde(flatten)]
    step: QuestionStep,
    errors: Vec<ValidationIssue>,
}

#[derive(Serialize)]
struct PriceView {
    #[serde(flatten)]
    step: PriceStep,
    errors: Vec<ValidationIssue>,
}

pub fn build_router<S: ManifestSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/pages/{page}/questions/{question_id}",
            get(show_question::<S>).post(submit_question::<S>),
        )
        .route("/pages/{page}/summary", get(show_summary::<S>))
        .route(
            "/prices/{provisioning_type}",
            get(show_prices::<S>).post(submit_price::<S>),
        )
        .with_state(state)
}

pub async fn serve<S: ManifestSource + 'static>(
    listener: TcpListener,
    state: AppState<S>,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("🌐 Listening on http://{}", addr);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn show_question<S: ManifestSource + 'static>(
    State(state): State<AppState<S>>,
    Path((page, question_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> HandlerResult {
    let ctx = open_session(&state, &headers).await?;
    let step = state.engine.question_step(&page, &question_id, &ctx).await?;

    let status = if step.question.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    let view = QuestionView {
        step,
        errors: Vec::new(),
    };
    let response = render(&state, "question", &view, status)?;

    close_session(&state, ctx, response).await
}

async fn submit_question<S: ManifestSource + 'static>(
    State(state): State<AppState<S>>,
    Path((page, question_id)): Path<(String, String)>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> HandlerResult {
    let mut ctx = open_session(&state, &headers).await?;
    let answer = collect_field(&fields, "answer");

    let outcome = state
        .engine
        .submit_answer(&page, &question_id, answer.clone(), &mut ctx)
        .await?;

    let response = match outcome {
        Submission::Accepted { next: Some(next) } => {
            Redirect::to(&format!("/pages/{}/questions/{}", page, next)).into_response()
        }
        Submission::Accepted { next: None } => {
            Redirect::to(&format!("/pages/{}/summary", page)).into_response()
        }
        Submission::Invalid { issues } => {
            let mut step = state.engine.question_step(&page, &question_id, &ctx).await?;
            step.saved_answer = Some(answer);
            let view = QuestionView {
                step,
                errors: issues,
            };
            render(&state, "question", &view, StatusCode::BAD_REQUEST)?
        }
        Submission::UnknownQuestion => {
            let step = state.engine.question_step(&page, &question_id, &ctx).await?;
            let view = QuestionView {
                step,
                errors: Vec::new(),
            };
            render(&state, "question", &view, StatusCode::NOT_FOUND)?
        }
    };

    close_session(&state, ctx, response).await
}

async fn show_summary<S: ManifestSource + 'static>(
    State(state): State<AppState<S>>,
    Path(page): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    let ctx = open_session(&state, &headers).await?;
    let summary = state.engine.page_summary(&page, &ctx).await?;
    let response = render(&state, "summary", &summary, StatusCode::OK)?;

    close_session(&state, ctx, response).await
}

async fn show_prices<S: ManifestSource + 'static>(
    State(state): State<AppState<S>>,
    Path(provisioning_type): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    let ctx = open_session(&state, &headers).await?;
    let step = state.engine.price_step(&provisioning_type, &ctx).await?;
    let view = PriceView {
        step,
        errors: Vec::new(),
    };
    let response = render(&state, "price", &view, StatusCode::OK)?;

    close_session(&state, ctx, response).await
}

async fn submit_price<S: ManifestSource + 'static>(
    State(state): State<AppState<S>>,
    Path(provisioning_type): Path<String>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> HandlerResult {
    let mut ctx = open_session(&state, &headers).await?;
    let question_id = fields
        .iter()
        .find(|(name, _)| name == "question")
        .map(|(_, value)| value.clone())
        .ok_or_else(|| MarketplaceError::InvalidRequest {
            message: "Missing form field 'question'".to_string(),
        })?;
    let answer = collect_field(&fields, "answer");

    let outcome = state
        .engine
        .submit_price_selection(&provisioning_type, &question_id, answer, &mut ctx)
        .await?;

    let response = match outcome {
        Submission::Accepted { .. } => {
            let canonical = PriceManifestProvider::<S>::normalize_type(&provisioning_type)
                .unwrap_or_else(|| provisioning_type.to_lowercase());
            Redirect::to(&format!("/prices/{}", canonical)).into_response()
        }
        Submission::Invalid { issues } => {
            let step = state.engine.price_step(&provisioning_type, &ctx).await?;
            let view = PriceView {
                step,
                errors: issues,
            };
            render(&state, "price", &view, StatusCode::BAD_REQUEST)?
        }
        Submission::UnknownQuestion => {
            (StatusCode::NOT_FOUND, format!("Unknown question '{}'", question_id)).into_response()
        }
    };

    close_session(&state, ctx, response).await
}

async fn open_session<S: ManifestSource>(
    state: &AppState<S>,
    headers: &HeaderMap,
) -> Result<RequestContext> {
    if let Some(id) = session_id_from_cookies(headers, &state.cookie_name) {
        if let Some(session) = state.sessions.load(id).await? {
            return Ok(RequestContext::new(session, false));
        }
        tracing::debug!("Session {} unknown or expired, starting a new one", id);
    }

    Ok(RequestContext::fresh())
}

async fn close_session<S: ManifestSource>(
    state: &AppState<S>,
    ctx: RequestContext,
    mut response: Response,
) -> HandlerResult {
    let new_session = ctx.is_new_session();
    let session = ctx.into_session();
    let id = session.id;
    state.sessions.commit(session).await?;

    if new_session {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            state.cookie_name, id
        );
        let value = HeaderValue::from_str(&cookie).map_err(|e| MarketplaceError::SessionError {
            message: format!("Invalid session cookie: {}", e),
        })?;
        response.headers_mut().append(SET_COOKIE, value);
    }

    Ok(response)
}

fn render<S: ManifestSource, T: Serialize>(
    state: &AppState<S>,
    template: &str,
    view: &T,
    status: StatusCode,
) -> Result<Response> {
    let context = serde_json::to_value(view)?;
    let body = state.renderer.render(template, &context)?;
    Ok((status, [(CONTENT_TYPE, state.renderer.content_type())], body).into_response())
}

fn session_id_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| SessionId::parse(value.trim()))
}

/// 同名欄位出現多次（checkbox）時收成陣列
fn collect_field(fields: &[(String, String)], name: &str) -> Value {
    let mut values: Vec<Value> = fields
        .iter()
        .filter(|(field, _)| field == name)
        .map(|(_, value)| Value::String(value.clone()))
        .collect();

    match values.len() {
        0 => Value::Null,
        1 => values.remove(0),
        _ => Value::Array(values),
    }
}
