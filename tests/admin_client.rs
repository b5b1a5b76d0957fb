use std::time::Duration;

use httpmock::MockServer;
use quire::{
    domain::types::{MutationAction, Resource, Role},
    infra::http::{AdminClient, AdminGateway, GatewayError, RouteTable},
};

fn client(server: &MockServer, token: Option<&str>) -> AdminClient {
    AdminClient::new(
        &server.base_url(),
        RouteTable::default(),
        token.map(str::to_string),
        Duration::from_secs(5),
    )
    .expect("client")
}

#[tokio::test]
async fn mutations_follow_the_route_table() -> Result<(), GatewayError> {
    let server = MockServer::start();
    let approve = server.mock(|when, then| {
        when.method("POST").path("/admin/comments/7/approve");
        then.status(204);
    });
    let reject = server.mock(|when, then| {
        when.method("POST").path("/admin/posts/8/reject");
        then.status(200).body("{}");
    });
    let destroy = server.mock(|when, then| {
        when.method("DELETE").path("/admin/users/9");
        then.status(204);
    });
    let role = server.mock(|when, then| {
        when.method("PATCH")
            .path("/admin/users/9/role")
            .header("content-type", "application/json")
            .json_body_includes(r#"{"role":"D"}"#);
        then.status(200).body("{}");
    });

    let client = client(&server, None);
    client
        .mutate(Resource::Comments, 7, MutationAction::Approve)
        .await?;
    client.mutate(Resource::Posts, 8, MutationAction::Reject).await?;
    client.mutate(Resource::Users, 9, MutationAction::Delete).await?;
    client
        .mutate(Resource::Users, 9, MutationAction::SetRole(Role::Developer))
        .await?;

    approve.assert();
    reject.assert();
    destroy.assert();
    role.assert();
    Ok(())
}

#[tokio::test]
async fn requests_carry_auth_accept_and_user_agent() -> Result<(), GatewayError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/admin/posts")
            .query_param("page", "3")
            .header("authorization", "Bearer s3cret")
            .header("accept", "application/json")
            .header("user-agent", AdminClient::user_agent());
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":[],"current_page":3,"last_page":3,"per_page":15,"total":30}"#);
    });

    let document = client(&server, Some("s3cret"))
        .fetch_page(Resource::Posts, 3)
        .await?;

    mock.assert();
    assert_eq!(document["current_page"], 3);
    Ok(())
}

#[tokio::test]
async fn custom_prefix_is_respected() -> Result<(), GatewayError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/dashboard/comments/1/reject");
        then.status(204);
    });

    let client = AdminClient::new(
        &server.base_url(),
        RouteTable::new("/dashboard/"),
        None,
        Duration::from_secs(5),
    )?;
    client
        .mutate(Resource::Comments, 1, MutationAction::Reject)
        .await?;

    mock.assert();
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_a_rejection() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("DELETE").path("/admin/posts/5");
        then.status(403).body("forbidden");
    });

    let err = client(&server, None)
        .mutate(Resource::Posts, 5, MutationAction::Delete)
        .await
        .expect_err("403 must fail");

    match err {
        GatewayError::Rejected { status, ref body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_transient());
    assert_eq!(err.reason(), "status 403: forbidden");
}

#[tokio::test]
async fn garbage_page_is_a_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/admin/users");
        then.status(200).body("<html>login</html>");
    });

    let err = client(&server, None)
        .fetch_page(Resource::Users, 1)
        .await
        .expect_err("html is not json");
    assert!(matches!(err, GatewayError::Decode(_)));
}
