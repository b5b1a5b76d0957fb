#![deny(clippy::all, clippy::pedantic)]

use std::{num::NonZeroU32, time::Duration};

use httpmock::MockServer;
use quire::{
    application::curator::DispatchPolicy,
    config::{
        ClientSettings, CriteriaArgs, DispatchSettings, ListArgs, LoggingSettings, ModerationCmd,
        SelectionArgs, Settings, SortKeyArg, ToastSettings, UsersCmd,
    },
    application::toasts::{ToastKind, ToastQueue},
    domain::{entities::CommentRecord, types::Role},
    infra::http::{AdminClient, RouteTable},
};
use url::Url;

use crate::client::{CliError, Ctx};
use crate::handlers::{self, Status};
use crate::print::toast_lines;

const COMMENTS_PAGE: &str = r#"{
    "data": [
        {"id": 1, "content": "First!", "approved": 1, "user": {"id": 9, "name": "Ada"}},
        {"id": 2, "content": "Rust lifetimes finally clicked", "approved": 0},
        {"id": 3, "content": "Buy cheap watches", "approved": 0}
    ],
    "current_page": 1,
    "last_page": 1,
    "per_page": 15,
    "total": 3
}"#;

fn ctx(server: &MockServer) -> Ctx {
    let gateway = AdminClient::new(
        &server.base_url(),
        RouteTable::default(),
        Some("token".into()),
        Duration::from_secs(5),
    )
    .expect("client");
    Ctx {
        gateway,
        policy: DispatchPolicy {
            retry_backoff: Duration::ZERO,
            ..DispatchPolicy::default()
        },
        toast_ttl: Duration::from_secs(6),
    }
}

fn settings(base_url: Option<&str>) -> Settings {
    Settings {
        client: ClientSettings {
            base_url: base_url.map(|url| Url::parse(url).expect("url")),
            path_prefix: "admin".to_string(),
            api_token: None,
            timeout: Duration::from_secs(5),
        },
        dispatch: DispatchSettings {
            concurrency: NonZeroU32::new(3).expect("non-zero"),
            max_attempts: NonZeroU32::new(1).expect("non-zero"),
            retry_backoff: Duration::from_millis(10),
        },
        toasts: ToastSettings {
            ttl: Duration::from_secs(2),
        },
        logging: LoggingSettings::default(),
    }
}

fn criteria(filter: Option<&str>) -> CriteriaArgs {
    CriteriaArgs {
        page: 1,
        search: None,
        filter: filter.map(str::to_string),
    }
}

#[test]
fn ctx_requires_a_site() {
    let err = Ctx::from_settings(&settings(None)).expect_err("no site");
    assert!(matches!(err, CliError::MissingSite));
}

#[test]
fn ctx_carries_dispatch_settings() -> Result<(), CliError> {
    let ctx = Ctx::from_settings(&settings(Some("https://blog.example.com")))?;
    assert_eq!(ctx.policy.concurrency, 3);
    assert_eq!(ctx.policy.max_attempts, 1);
    assert_eq!(ctx.toast_ttl, Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn list_fetches_requested_page() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/admin/comments")
            .query_param("page", "1")
            .header("authorization", "Bearer token");
        then.status(200)
            .header("content-type", "application/json")
            .body(COMMENTS_PAGE);
    });

    let status = handlers::moderate::<CommentRecord>(
        &ctx(&server),
        ModerationCmd::List(ListArgs {
            criteria: criteria(Some("pending")),
            sort: Some(SortKeyArg::Label),
            desc: true,
        }),
    )
    .await?;

    assert_eq!(status, Status::Clean);
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn approve_all_matching_reports_partial_failure() -> Result<(), CliError> {
    let server = MockServer::start();
    let index = server.mock(|when, then| {
        when.method("GET").path("/admin/comments");
        then.status(200)
            .header("content-type", "application/json")
            .body(COMMENTS_PAGE);
    });
    let approve_two = server.mock(|when, then| {
        when.method("POST").path("/admin/comments/2/approve");
        then.status(204);
    });
    let approve_three = server.mock(|when, then| {
        when.method("POST").path("/admin/comments/3/approve");
        then.status(500).body("boom");
    });

    let status = handlers::moderate::<CommentRecord>(
        &ctx(&server),
        ModerationCmd::Approve(SelectionArgs {
            ids: Vec::new(),
            all_matching: true,
            criteria: criteria(Some("pending")),
        }),
    )
    .await?;

    assert_eq!(status, Status::PartialFailure);
    index.assert();
    approve_two.assert();
    approve_three.assert();
    Ok(())
}

#[tokio::test]
async fn set_role_sends_role_code() -> Result<(), CliError> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/admin/users");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":[{"id":4,"name":"Ada","email":"ada@example.com","role":"U"}],"current_page":1,"last_page":1,"per_page":15,"total":1}"#);
    });
    let patch = server.mock(|when, then| {
        when.method("PATCH")
            .path("/admin/users/4/role")
            .json_body_includes(r#"{"role":"A"}"#);
        then.status(200).body("{}");
    });

    let status = handlers::users(
        &ctx(&server),
        UsersCmd::SetRole {
            role: Role::Admin,
            selection: SelectionArgs {
                ids: vec![4],
                all_matching: false,
                criteria: criteria(None),
            },
        },
    )
    .await?;

    assert_eq!(status, Status::Clean);
    patch.assert();
    Ok(())
}

#[tokio::test]
async fn approving_users_is_refused_before_any_mutation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/admin/users");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":[],"current_page":1,"last_page":1,"per_page":15,"total":0}"#);
    });

    let err = handlers::moderate::<quire::domain::entities::UserRecord>(
        &ctx(&server),
        ModerationCmd::Approve(SelectionArgs {
            ids: vec![1],
            all_matching: false,
            criteria: criteria(None),
        }),
    )
    .await
    .expect_err("users cannot be approved");

    assert!(matches!(
        err,
        CliError::Curator(quire::application::error::CuratorError::UnsupportedAction { .. })
    ));
}

#[test]
fn toast_lines_carry_kind_text_and_ttl() {
    let mut queue = ToastQueue::new(Duration::from_millis(1500));
    queue.success("Comment approved");
    queue.error("Failed to delete user: status 500");

    let lines = toast_lines(queue.drain_all());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].kind, ToastKind::Success);
    assert_eq!(lines[0].text, "Comment approved");
    assert_eq!(lines[0].ttl_ms, 1500);
    assert_eq!(lines[1].kind, ToastKind::Error);

    let json = serde_json::to_value(&lines[1]).expect("json");
    assert_eq!(json["kind"], "error");
    assert_eq!(json["ttl_ms"], 1500);
}
