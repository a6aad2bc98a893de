mod common;

use marketplace_flow::{
    build_router, AppState, FlowEngine, FsManifestSource, InMemorySessionStore, JsonRenderer,
};
use reqwest::{redirect, Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const COOKIE_NAME: &str = "marketplace_session";

struct TestServer {
    base: String,
    client: Client,
    _manifests: TempDir,
}

/// Spin up the HTTP server on an OS-assigned port over a temporary manifest tree.
async fn spawn_test_server() -> TestServer {
    let manifests = common::manifest_tree();

    let mut pages = HashMap::new();
    pages.insert("order".to_string(), PathBuf::from("pages/order/manifest.json"));
    pages.insert("broken".to_string(), PathBuf::from("pages/broken/manifest.json"));
    let engine = FlowEngine::new(FsManifestSource::new(manifests.path()), "price", pages);

    let state = AppState::new(
        engine,
        Arc::new(InMemorySessionStore::new(30)),
        Arc::new(JsonRenderer),
        COOKIE_NAME,
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        client,
        _manifests: manifests,
    }
}

fn session_cookie(resp: &reqwest::Response) -> String {
    let header = resp
        .headers()
        .get("set-cookie")
        .expect("new session should set a cookie")
        .to_str()
        .unwrap();
    assert!(header.contains("HttpOnly"));
    header.split(';').next().unwrap().to_string()
}

async fn context(resp: reqwest::Response) -> Value {
    let body: Value = resp.json().await.unwrap();
    body["context"].clone()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .get(format!("{}/health", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn question_page_renders_definition_and_sets_cookie() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .get(format!("{}/pages/order/questions/solution", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("application/json"));
    let cookie = session_cookie(&resp);
    assert!(cookie.starts_with("marketplace_session="));

    let ctx = context(resp).await;
    assert_eq!(ctx["question"]["id"], "solution");
    assert_eq!(ctx["question"]["label"], "Which solution?");
    assert_eq!(ctx["savedAnswer"], Value::Null);
    assert_eq!(ctx["pageData"]["title"], "Order items");
}

#[tokio::test]
async fn unknown_question_returns_404_with_empty_question() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .get(format!("{}/pages/order/questions/typo", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let ctx = context(resp).await;
    assert_eq!(ctx["question"], Value::Null);
    assert_eq!(ctx["questionId"], "typo");
}

#[tokio::test]
async fn unknown_page_returns_404() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .get(format!("{}/pages/nope/questions/solution", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn broken_manifest_returns_500() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .get(format!("{}/pages/broken/questions/anything", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn answers_persist_across_requests_in_one_session() {
    let server = spawn_test_server().await;
    let first = server
        .client
        .get(format!("{}/pages/order/questions/solution", server.base))
        .send()
        .await
        .unwrap();
    let cookie = session_cookie(&first);

    let resp = server
        .client
        .post(format!("{}/pages/order/questions/solution", server.base))
        .header("cookie", &cookie)
        .form(&[("answer", "sol-42")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/pages/order/questions/quantity"
    );
    assert!(resp.headers().get("set-cookie").is_none());

    let resp = server
        .client
        .get(format!("{}/pages/order/questions/solution", server.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    let ctx = context(resp).await;
    assert_eq!(ctx["savedAnswer"], "sol-42");

    // 重新作答時以最後一次為準
    server
        .client
        .post(format!("{}/pages/order/questions/solution", server.base))
        .header("cookie", &cookie)
        .form(&[("answer", "sol-43")])
        .send()
        .await
        .unwrap();

    let resp = server
        .client
        .get(format!("{}/pages/order/summary", server.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ctx = context(resp).await;
    assert_eq!(ctx["questions"][0]["question"]["id"], "solution");
    assert_eq!(ctx["questions"][0]["savedAnswer"], "sol-43");
    assert_eq!(ctx["questions"][1]["savedAnswer"], Value::Null);
}

#[tokio::test]
async fn branching_follows_answer() {
    let server = spawn_test_server().await;
    let first = server
        .client
        .get(format!("{}/pages/order/questions/quantity", server.base))
        .send()
        .await
        .unwrap();
    let cookie = session_cookie(&first);

    let resp = server
        .client
        .post(format!("{}/pages/order/questions/quantity", server.base))
        .header("cookie", &cookie)
        .form(&[("answer", "many")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/pages/order/questions/estimate"
    );

    let resp = server
        .client
        .post(format!("{}/pages/order/questions/quantity", server.base))
        .header("cookie", &cookie)
        .form(&[("answer", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/pages/order/summary"
    );
}

#[tokio::test]
async fn invalid_answer_rerenders_with_errors() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .post(format!("{}/pages/order/questions/solution", server.base))
        .form(&[("answer", "   ")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let cookie = session_cookie(&resp);

    let ctx = context(resp).await;
    assert_eq!(ctx["errors"][0]["code"], "required");
    assert_eq!(ctx["errors"][0]["message"], "Select a solution");

    // 無效答案不會寫入 session
    let resp = server
        .client
        .get(format!("{}/pages/order/summary", server.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    let ctx = context(resp).await;
    assert_eq!(ctx["questions"][0]["savedAnswer"], Value::Null);
}

#[tokio::test]
async fn sessions_are_isolated_between_clients() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .post(format!("{}/pages/order/questions/solution", server.base))
        .form(&[("answer", "mine")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = server
        .client
        .get(format!("{}/pages/order/questions/solution", server.base))
        .send()
        .await
        .unwrap();
    let ctx = context(resp).await;
    assert_eq!(ctx["savedAnswer"], Value::Null);
}

#[tokio::test]
async fn price_page_formats_prices() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .get(format!("{}/prices/PATIENT", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let ctx = context(resp).await;
    assert_eq!(ctx["provisioningType"], "patient");
    assert_eq!(ctx["pricePoints"][0]["formattedPrice"], "1.64");
    assert_eq!(ctx["pricePoints"][0]["unit"], "per patient per year");
    assert_eq!(ctx["pricePoints"][1]["formattedPrice"], "1,234.56");
    assert_eq!(ctx["pricePoints"][2]["formattedPrice"], "1,000.00");
}

#[tokio::test]
async fn unknown_provisioning_type_returns_404() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .get(format!("{}/prices/on-demand", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn price_selection_is_saved() {
    let server = spawn_test_server().await;
    let first = server
        .client
        .get(format!("{}/prices/patient", server.base))
        .send()
        .await
        .unwrap();
    let cookie = session_cookie(&first);

    let resp = server
        .client
        .post(format!("{}/prices/Patient", server.base))
        .header("cookie", &cookie)
        .form(&[("question", "selectedPrice"), ("answer", "enterprise")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("location").unwrap(), "/prices/patient");

    let resp = server
        .client
        .get(format!("{}/prices/patient", server.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    let ctx = context(resp).await;
    assert_eq!(ctx["questions"][0]["savedAnswer"], "enterprise");
}

#[tokio::test]
async fn unknown_price_point_is_rejected() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .post(format!("{}/prices/patient", server.base))
        .form(&[("question", "selectedPrice"), ("answer", "platinum")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let ctx = context(resp).await;
    assert_eq!(ctx["errors"][0]["code"], "unknownPricePoint");
    assert_eq!(ctx["questions"][0]["savedAnswer"], Value::Null);
}

#[tokio::test]
async fn price_submission_for_unknown_question_returns_404() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .post(format!("{}/prices/patient", server.base))
        .form(&[("question", "nope"), ("answer", "standard")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn price_submission_without_question_field_returns_400() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .post(format!("{}/prices/patient", server.base))
        .form(&[("answer", "standard")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("question"));
}

#[tokio::test]
async fn padded_provisioning_type_redirects_to_canonical_path() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .post(format!("{}/prices/%20Patient%20", server.base))
        .form(&[("question", "selectedPrice"), ("answer", "standard")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("location").unwrap(), "/prices/patient");
}
