//! End-to-end behavior of the pipeline in both modes.

mod common;

use std::fs;
use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::StatusCode;
use pretty_assertions::assert_eq;
use voyage_core::RenderMode;
use voyage_render::OUTLET;
use voyage_server::{
    build_site, BootError, PipelineController, PipelineState, GENERIC_ERROR_PAGE, HTML_CONTENT_TYPE,
};

use common::{body, fixture, get, FixtureSite};

async fn booted(mode: RenderMode) -> (tempfile::TempDir, PipelineController) {
    let (dir, config) = fixture();
    if mode == RenderMode::Production {
        build_site(&FixtureSite::default(), &config).unwrap();
    }
    let controller = PipelineController::new(config, Arc::new(FixtureSite::default()));
    controller.boot(mode).await.unwrap();
    (dir, controller)
}

// === Scenario A: production render ===

#[tokio::test]
async fn test_prod_root_renders_into_shell() {
    let (_dir, controller) = booted(RenderMode::Production).await;
    assert_eq!(controller.state(), PipelineState::Production);

    let response = controller.handle(get("/")).await;
    let html = body(&response);

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
    assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert!(!html.contains(OUTLET));
    assert!(html.contains("<h1>Where next?</h1>"));
    assert!(html.contains("<title>Voyage | Home</title>"));
    assert!(html.contains("id=\"__VOYAGE_DATA__\""));
    assert_eq!(html.matches("<main class=\"home\">").count(), 1);
}

#[tokio::test]
async fn test_prod_serves_hashed_assets() {
    let (_dir, controller) = booted(RenderMode::Production).await;

    let html = body(&controller.handle(get("/")).await);
    let start = html.find("/assets/styles.").unwrap();
    let end = start + html[start..].find('"').unwrap();
    let asset_url = &html[start..end];
    assert!(!html.contains("/public/styles.css"));

    let asset = controller.handle(get(asset_url)).await;
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(asset.headers()[CONTENT_TYPE], "text/css");
    assert_eq!(body(&asset), "body { margin: 0; }\n");

    // Public files are not served in production.
    let public = controller.handle(get("/public/styles.css")).await;
    assert_ne!(body(&public), "body { margin: 0; }\n");
}

#[tokio::test]
async fn test_prod_ignores_source_edits() {
    let (dir, controller) = booted(RenderMode::Production).await;

    let before = body(&controller.handle(get("/")).await);
    fs::write(
        dir.path().join("pages/home.page"),
        "---\ntitle = \"Changed\"\n---\n<p>changed</p>\n",
    )
    .unwrap();
    let after = body(&controller.handle(get("/")).await);

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_prod_boot_rejects_stale_bundle() {
    let (_dir, config) = fixture();
    build_site(&FixtureSite::default(), &config).unwrap();

    let controller = PipelineController::new(config, Arc::new(FixtureSite { extra_route: true }));
    let err = controller.boot(RenderMode::Production).await.unwrap_err();

    assert!(matches!(err, BootError::FingerprintMismatch { .. }));
    assert_eq!(controller.state(), PipelineState::Uninitialized);
}

#[tokio::test]
async fn test_prod_boot_without_build_fails() {
    let (_dir, config) = fixture();
    let controller = PipelineController::new(config, Arc::new(FixtureSite::default()));

    let err = controller.boot(RenderMode::Production).await.unwrap_err();
    assert!(matches!(err, BootError::Template(_)));
}

// === Scenario B: catch-all ===

#[tokio::test]
async fn test_unmatched_url_renders_catch_all_with_200() {
    for mode in [RenderMode::Development, RenderMode::Production] {
        let (_dir, controller) = booted(mode).await;

        let response = controller.handle(get("/this-path-does-not-exist")).await;
        let html = body(&response);

        assert_eq!(response.status(), StatusCode::OK, "{:?}", mode);
        assert!(html.contains("data-marker=\"catch-all\""));
        assert!(html.contains("Nothing at /this-path-does-not-exist"));
    }
}

#[tokio::test]
async fn test_native_route_with_params() {
    let (_dir, controller) = booted(RenderMode::Development).await;

    let html = body(&controller.handle(get("/trips/kyoto/?ref=home")).await);
    assert!(html.contains("<article data-trip=\"kyoto\">Trip kyoto</article>"));
    assert!(html.contains("\"url\":\"/trips/kyoto?ref=home\""));
}

// === Scenario C: render failure ===

#[tokio::test]
async fn test_dev_failure_shows_source_mapped_trace() {
    let (_dir, controller) = booted(RenderMode::Development).await;

    let response = controller.handle(get("/broken")).await;
    let html = body(&response);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(html.contains("undefined value `props.itinerary.first_stop`"));
    assert!(html.contains("pages/broken.page:6:"), "{}", html);
    assert!(html.contains("at page broken (pages/broken.page:"));
}

#[tokio::test]
async fn test_prod_failure_is_generic() {
    let (_dir, controller) = booted(RenderMode::Production).await;

    let response = controller.handle(get("/broken")).await;
    let html = body(&response);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(html, GENERIC_ERROR_PAGE);
    assert!(!html.contains("undefined value"));
    assert!(!html.contains("itinerary"));
}

#[tokio::test]
async fn test_failure_does_not_affect_next_request() {
    let (_dir, controller) = booted(RenderMode::Production).await;

    assert_eq!(
        controller.handle(get("/broken")).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(controller.handle(get("/")).await.status(), StatusCode::OK);
}

// === Scenario D: dev liveness ===

#[tokio::test]
async fn test_dev_picks_up_page_edits() {
    let (dir, controller) = booted(RenderMode::Development).await;

    let first = body(&controller.handle(get("/")).await);
    fs::write(
        dir.path().join("pages/home.page"),
        common::HOME_PAGE.replace("<h1>{{ props.headline }}</h1>", "<h2>{{ props.headline }} (updated)</h2>"),
    )
    .unwrap();
    let second = body(&controller.handle(get("/")).await);

    assert_ne!(first, second);
    assert!(second.contains("<h2>Where next? (updated)</h2>"));
}

#[tokio::test]
async fn test_dev_picks_up_data_and_shell_edits() {
    let (dir, controller) = booted(RenderMode::Development).await;

    fs::write(
        dir.path().join("data/home.json"),
        r#"{ "headline": "Somewhere warm", "featured": [] }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("index.html"),
        common::SHELL.replace("<body>", "<body class=\"edited\">"),
    )
    .unwrap();

    let html = body(&controller.handle(get("/")).await);
    assert!(html.contains("<h1>Somewhere warm</h1>"));
    assert!(html.contains("<body class=\"edited\">"));
}

#[tokio::test]
async fn test_dev_broken_shell_fails_per_request() {
    let (dir, controller) = booted(RenderMode::Development).await;

    fs::write(dir.path().join("index.html"), "<html><body></body></html>").unwrap();
    let response = controller.handle(get("/")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body(&response).contains("placeholder"));
}

#[tokio::test]
async fn test_dev_serves_public_files_and_modules() {
    let (_dir, controller) = booted(RenderMode::Development).await;

    let html = body(&controller.handle(get("/")).await);
    assert!(html.contains("href=\"/public/styles.css?v="));
    assert!(html.contains("<meta name=\"voyage-env\" content=\"development\">"));

    let css = controller.handle(get("/public/styles.css")).await;
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.headers()[CONTENT_TYPE], "text/css");

    let module = controller.handle(get("/@modules/home")).await;
    assert_eq!(module.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body(&module)).unwrap();
    assert_eq!(json["name"], "home");
    assert_eq!(json["source"], "pages/home.page");

    let missing = controller.handle(get("/@modules/nope")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dev_module_syntax_error_is_source_mapped() {
    let (dir, controller) = booted(RenderMode::Development).await;

    fs::write(
        dir.path().join("pages/home.page"),
        "---\ntitle = \"Home\"\n---\n<main>\n  <p>{{ props.headline </p>\n</main>\n",
    )
    .unwrap();
    let response = controller.handle(get("/")).await;
    let html = body(&response);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(html.contains("pages/home.page:5:"), "{}", html);
}
