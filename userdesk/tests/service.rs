mod common;

use common::Harness;

#[tokio::test]
async fn root_reports_liveness() {
    let h = Harness::start().await;
    h.app
        .get("/")
        .send()
        .await
        .assert_ok()
        .assert_json_path("message", "userdesk is running");
}

#[tokio::test]
async fn health_pings_the_database() {
    let h = Harness::start().await;
    h.app
        .get("/health")
        .send()
        .await
        .assert_ok()
        .assert_json_path("status", "UP")
        .assert_json_path("checks[0].name", "database")
        .assert_json_path("checks[0].status", "UP");
}

#[tokio::test]
async fn trailing_slash_reaches_the_same_route() {
    let h = Harness::start().await;

    h.app
        .post("/users/")
        .form(&[("name", "Ada"), ("email", "ada@example.com")])
        .send()
        .await
        .assert_created();

    h.app
        .get("/users/?limit=1")
        .send()
        .await
        .assert_ok()
        .assert_json_path("len()", 1);
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let h = Harness::start().await;
    h.app
        .get("/nope")
        .send()
        .await
        .assert_not_found()
        .assert_json_path("error", "No route for /nope");
}

#[tokio::test]
async fn json_bodies_are_not_forms() {
    let h = Harness::start().await;
    h.app
        .post("/users")
        .json(&serde_json::json!({ "name": "Ada", "email": "ada@example.com" }))
        .send()
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let h = Harness::start().await;
    let resp = h
        .app
        .get("/")
        .header("origin", "http://app.example.com")
        .send()
        .await
        .assert_ok();
    assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
}
