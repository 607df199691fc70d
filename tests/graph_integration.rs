use igtoken::graph::{CheckOutcome, GraphClient, Overall, DEFAULT_ACCOUNT_METRICS};
use igtoken::oauth::GraphEndpoints;
use igtoken::IgtokenError;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

const IG_ID: &str = "17841400000000001";
const TOKEN: &str = "EAApage1";

fn client(server: &MockServer) -> GraphClient {
    GraphClient::with_endpoints(GraphEndpoints::with_base(&server.uri()))
}

async fn mount_basic_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/{IG_ID}")))
        .and(query_param("fields", "id,username,name,media_count"))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": IG_ID,
            "username": "coffeeshop",
            "name": "Coffee Shop",
            "media_count": 42
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn account_info_parses_basic_fields() {
    let server = MockServer::start().await;
    mount_basic_info(&server).await;

    let info = client(&server).account_info(TOKEN, IG_ID).await.unwrap();
    assert_eq!(info.username, "coffeeshop");
    assert_eq!(info.media_count, Some(42));
    assert_eq!(info.followers_count, None);
}

#[tokio::test]
async fn detailed_info_includes_follower_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{IG_ID}")))
        .and(query_param(
            "fields",
            "id,username,name,media_count,followers_count,follows_count,profile_picture_url,website,biography",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": IG_ID,
            "username": "coffeeshop",
            "followers_count": 1200,
            "follows_count": 80,
            "biography": "Fresh beans daily",
            "profile_picture_url": "https://cdn.example/p.jpg"
        })))
        .mount(&server)
        .await;

    let info = client(&server)
        .detailed_account_info(TOKEN, IG_ID)
        .await
        .unwrap();
    assert_eq!(info.followers_count, Some(1200));
    assert_eq!(info.biography.as_deref(), Some("Fresh beans daily"));
    assert_eq!(
        info.profile_picture_url.as_deref(),
        Some("https://cdn.example/p.jpg")
    );
}

#[tokio::test]
async fn detailed_info_falls_back_on_unsupported_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{IG_ID}")))
        .and(query_param(
            "fields",
            "id,username,name,media_count,followers_count,follows_count,profile_picture_url,website,biography",
        ))
        .respond_with(ResponseTemplate::new(400).set_body_json(common::graph_error(
            "(#100) Tried accessing nonexisting field (followers_count)",
            100,
        )))
        .mount(&server)
        .await;
    mount_basic_info(&server).await;

    let info = client(&server)
        .detailed_account_info(TOKEN, IG_ID)
        .await
        .unwrap();
    assert_eq!(info.username, "coffeeshop");
    assert_eq!(info.media_count, Some(42));
    assert_eq!(info.followers_count, None);
}

#[tokio::test]
async fn invalid_token_is_graph_error_with_status() {
    let server = MockServer::start().await;
    common::mount_json(
        &server,
        &format!("/{IG_ID}"),
        400,
        common::graph_error("Invalid OAuth access token - Cannot parse access token", 190),
    )
    .await;

    let err = client(&server).account_info(TOKEN, IG_ID).await.unwrap_err();
    match err {
        IgtokenError::GraphApi { status, message } => {
            assert_eq!(status, Some(400));
            assert!(message.contains("Invalid OAuth access token"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_graph_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{IG_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).account_info(TOKEN, IG_ID).await.unwrap_err();
    assert!(matches!(err, IgtokenError::GraphApi { status: None, .. }));
}

#[tokio::test]
async fn media_page_with_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{IG_ID}/media")))
        .and(query_param("limit", "2"))
        .and(query_param("after", "CURSOR1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "m1", "media_type": "IMAGE", "caption": "Latte art", "timestamp": "2024-05-01T10:00:00+0000" },
                { "id": "m2", "media_type": "VIDEO" }
            ],
            "paging": {
                "cursors": { "before": "CURSOR1", "after": "CURSOR2" },
                "next": "https://graph.facebook.com/v18.0/next"
            }
        })))
        .mount(&server)
        .await;

    let page = client(&server)
        .media(TOKEN, IG_ID, 2, Some("CURSOR1"))
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].caption.as_deref(), Some("Latte art"));
    assert_eq!(page.next_cursor.as_deref(), Some("CURSOR2"));
}

#[tokio::test]
async fn last_media_page_has_no_cursor() {
    let server = MockServer::start().await;
    common::mount_json(
        &server,
        &format!("/{IG_ID}/media"),
        200,
        json!({
            "data": [{ "id": "m9" }],
            "paging": { "cursors": { "before": "A", "after": "B" } }
        }),
    )
    .await;

    let page = client(&server).media(TOKEN, IG_ID, 25, None).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn media_details_include_engagement() {
    let server = MockServer::start().await;
    common::mount_json(
        &server,
        "/m1",
        200,
        json!({ "id": "m1", "like_count": 31, "comments_count": 4 }),
    )
    .await;

    let item = client(&server).media_details(TOKEN, "m1").await.unwrap();
    assert_eq!(item.like_count, Some(31));
    assert_eq!(item.comments_count, Some(4));
}

#[tokio::test]
async fn media_insights_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/m1/insights"))
        .and(query_param("metric", "impressions,reach"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "name": "impressions",
                "period": "lifetime",
                "values": [{ "value": 120 }],
                "title": "Impressions",
                "id": "m1/insights/impressions/lifetime"
            }]
        })))
        .mount(&server)
        .await;

    let insights = client(&server)
        .media_insights(TOKEN, "m1", &["impressions", "reach"])
        .await
        .unwrap();
    assert_eq!(insights.data.len(), 1);
    assert_eq!(insights.data[0].values[0].value, json!(120));
    assert!(insights.unavailable.is_none());
}

#[tokio::test]
async fn unsupported_insights_are_empty_not_error() {
    let server = MockServer::start().await;
    common::mount_json(
        &server,
        &format!("/{IG_ID}/insights"),
        400,
        common::graph_error("(#100) Unsupported get request.", 100),
    )
    .await;

    let insights = client(&server)
        .account_insights(TOKEN, IG_ID, "day", DEFAULT_ACCOUNT_METRICS)
        .await
        .unwrap();
    assert!(insights.data.is_empty());
    assert!(insights.unavailable.is_some());
}

#[tokio::test]
async fn validate_token_reports_failure_without_erroring() {
    let server = MockServer::start().await;
    common::mount_json(
        &server,
        &format!("/{IG_ID}"),
        400,
        common::graph_error("Error validating access token", 190),
    )
    .await;

    let result = client(&server).validate_token(TOKEN, IG_ID).await;
    assert!(!result.valid);
    assert!(result.account.is_none());
    assert!(result.error.unwrap().contains("Error validating access token"));
}

#[tokio::test]
async fn validate_token_success() {
    let server = MockServer::start().await;
    mount_basic_info(&server).await;
    let result = client(&server).validate_token(TOKEN, IG_ID).await;
    assert!(result.valid);
    assert_eq!(result.account.unwrap().username, "coffeeshop");
}

#[tokio::test]
async fn connection_test_with_detailed_failure_is_warning() {
    let server = MockServer::start().await;
    mount_basic_info(&server).await;
    common::mount_json(
        &server,
        &format!("/{IG_ID}/media"),
        200,
        json!({ "data": [{ "id": "m1" }] }),
    )
    .await;
    // Anything else on the node, i.e. the detailed field set, is rejected.
    common::mount_json(
        &server,
        &format!("/{IG_ID}"),
        403,
        common::graph_error("(#10) Application does not have permission", 10),
    )
    .await;

    let report = client(&server).test_connection(TOKEN, IG_ID).await;
    assert_eq!(report.checks.len(), 3);
    assert_eq!(report.checks[0].outcome, CheckOutcome::Passed);
    assert_eq!(report.checks[1].outcome, CheckOutcome::Passed);
    assert_eq!(report.checks[2].outcome, CheckOutcome::Warning);
    assert_eq!(report.overall(), Overall::Passed);
}

#[tokio::test]
async fn connection_test_all_failing() {
    let server = MockServer::start().await;
    let report = client(&server).test_connection(TOKEN, IG_ID).await;
    assert_eq!(report.count(CheckOutcome::Failed), 2);
    assert_eq!(report.overall(), Overall::Failed);
}
