//! End-to-end consistency checks for the data-synchronization layer, driven
//! against a mock HTTP backend.

use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use time::macros::datetime;
use uuid::Uuid;

use bantin::api::{ApiClient, ApiError};
use bantin::domain::diff::{ChangeSet, diff_records};
use bantin::domain::ordering::reposition;
use bantin::resources::{ReorderOutcome, SyncContext, SyncError, UpdateOutcome};
use bantin::session::SessionStore;
use bantin_api_types::{Category, ListQuery, User};

fn actor_id() -> Uuid {
    Uuid::from_u128(0xA11C_E000_0000_0000_0000_0000_0000_0001)
}

fn other_id() -> Uuid {
    Uuid::from_u128(0xB0B0_0000_0000_0000_0000_0000_0000_0002)
}

fn user(id: Uuid) -> User {
    User {
        id,
        email: "nga@example.com".into(),
        password: "$2b$10$mockhashed".into(),
        status: true,
        created_at: datetime!(2025-03-01 09:00:00 UTC),
        updated_at: datetime!(2025-03-01 09:00:00 UTC),
        creator_id: None,
        modifier_id: None,
    }
}

fn category(id: i64, order: i32, creator: Uuid) -> Category {
    Category {
        id,
        slug: format!("danh-muc-{id}"),
        name_vi: format!("Danh mục {id}"),
        name_en: Some(format!("Category {id}")),
        order,
        created_at: datetime!(2025-03-01 09:00:00 UTC),
        updated_at: datetime!(2025-03-01 09:00:00 UTC),
        creator_id: creator,
        modifier_id: None,
    }
}

fn context(server: &MockServer) -> (SyncContext, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = Arc::new(SessionStore::open(dir.path()).expect("session store"));
    let api = ApiClient::new(&server.base_url(), Duration::from_secs(5)).expect("api client");
    let cx = SyncContext::new(api, &Default::default(), session);
    (cx, dir)
}

fn signed_in_context(server: &MockServer, as_user: Uuid) -> (SyncContext, tempfile::TempDir) {
    let (cx, dir) = context(server);
    cx.session()
        .store_login("a.b.c".into(), Some("d.e.f".into()), user(as_user))
        .expect("seed session");
    (cx, dir)
}

fn page_query(page: u32) -> ListQuery {
    ListQuery {
        page,
        ..ListQuery::default()
    }
}

fn list_body(items: &[Category], total: u64) -> serde_json::Value {
    serde_json::json!({
        "data": items,
        "pagination": { "totalItem": total },
    })
}

#[tokio::test]
async fn no_op_edit_sends_no_request() {
    let server = MockServer::start();
    let patch = server.mock(|when, then| {
        when.method("PATCH").path("/categories/7");
        then.status(200).json_body(serde_json::json!({}));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    let current = category(7, 1, actor_id());
    let changes = diff_records(&current, &current.clone()).expect("diff");

    let outcome = cx
        .categories()
        .update(&current, changes)
        .await
        .expect("update");

    assert_eq!(outcome, UpdateOutcome::Unchanged);
    patch.assert_hits(0);
}

#[tokio::test]
async fn reorder_submits_a_dense_one_based_payload() {
    let server = MockServer::start();
    let bulk = server.mock(|when, then| {
        when.method("PATCH").path("/categories/order").json_body(
            serde_json::json!([
                { "id": 3, "order": 1 },
                { "id": 1, "order": 2 },
                { "id": 2, "order": 3 },
            ]),
        );
        then.status(200).json_body(serde_json::json!({}));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    let mut items = vec![
        category(1, 1, actor_id()),
        category(2, 2, actor_id()),
        category(3, 3, actor_id()),
    ];
    assert!(reposition(&mut items, 3, 0));

    let outcome = cx.categories().reorder(&items).await.expect("reorder");
    match outcome {
        ReorderOutcome::Submitted(plan) => assert_eq!(plan.len(), 3),
        other => panic!("unexpected outcome: {other:?}"),
    }
    bulk.assert();
}

#[tokio::test]
async fn reorder_with_one_item_is_a_no_op() {
    let server = MockServer::start();
    let bulk = server.mock(|when, then| {
        when.method("PATCH").path("/categories/order");
        then.status(200).json_body(serde_json::json!({}));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    let outcome = cx
        .categories()
        .reorder(&[category(1, 1, actor_id())])
        .await
        .expect("reorder");

    assert_eq!(outcome, ReorderOutcome::Skipped);
    bulk.assert_hits(0);
}

#[tokio::test]
async fn ownership_gate_blocks_foreign_records() {
    let server = MockServer::start();
    let any_mutation = server.mock(|when, then| {
        when.path_includes("/categories/7");
        then.status(200).json_body(serde_json::json!({}));
    });

    let (cx, _dir) = signed_in_context(&server, other_id());
    let foreign = category(7, 1, actor_id());

    let mut changes = ChangeSet::new();
    changes.pin("name_vi", "Thời sự");
    let update_err = cx
        .categories()
        .update(&foreign, changes)
        .await
        .expect_err("foreign update must be gated");
    assert!(matches!(update_err, SyncError::NotOwner));

    let delete_err = cx
        .categories()
        .delete(&foreign)
        .await
        .expect_err("foreign delete must be gated");
    assert!(matches!(delete_err, SyncError::NotOwner));

    any_mutation.assert_hits(0);
}

#[tokio::test]
async fn update_reconciles_every_loaded_page() {
    let server = MockServer::start();
    let shared = category(7, 1, actor_id());

    let page1 = server.mock(|when, then| {
        when.method("GET")
            .path("/categories")
            .query_param("page", "1");
        then.status(200)
            .json_body(list_body(&[shared.clone(), category(8, 2, actor_id())], 12));
    });
    let page2 = server.mock(|when, then| {
        when.method("GET")
            .path("/categories")
            .query_param("page", "2");
        then.status(200)
            .json_body(list_body(&[shared.clone()], 12));
    });

    let mut renamed = shared.clone();
    renamed.name_vi = "Thời sự".into();
    let patch = server.mock(|when, then| {
        when.method("PATCH").path("/categories/7");
        then.status(200)
            .json_body(serde_json::json!({ "data": renamed }));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    cx.categories().list(&page_query(1)).await.expect("page 1");
    cx.categories().list(&page_query(2)).await.expect("page 2");

    let mut submitted = shared.clone();
    submitted.name_vi = "Thời sự".into();
    let changes = diff_records(&shared, &submitted).expect("diff");
    let outcome = cx
        .categories()
        .update(&shared, changes)
        .await
        .expect("update");
    assert!(matches!(outcome, UpdateOutcome::Updated(ref c) if c.name_vi == "Thời sự"));

    // Every previously loaded page reflects the new value without a reload.
    for page in [1, 2] {
        let slot = cx
            .store()
            .get_categories(&page_query(page))
            .expect("cached page");
        let item = slot.items.iter().find(|c| c.id == 7).expect("entity");
        assert_eq!(item.name_vi, "Thời sự");
        assert!(slot.stale);
    }

    page1.assert();
    page2.assert();
    patch.assert();
}

#[tokio::test]
async fn delete_removes_from_every_page_and_decrements_totals() {
    let server = MockServer::start();
    let doomed = category(7, 1, actor_id());

    server.mock(|when, then| {
        when.method("GET")
            .path("/categories")
            .query_param("page", "1");
        then.status(200)
            .json_body(list_body(&[doomed.clone(), category(8, 2, actor_id())], 5));
    });
    server.mock(|when, then| {
        when.method("GET")
            .path("/categories")
            .query_param("page", "2");
        then.status(200).json_body(list_body(&[doomed.clone()], 5));
    });
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/categories/7");
        then.status(200).json_body(serde_json::json!({}));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    cx.categories().list(&page_query(1)).await.expect("page 1");
    cx.categories().list(&page_query(2)).await.expect("page 2");

    cx.categories().delete(&doomed).await.expect("delete");

    for page in [1, 2] {
        let slot = cx
            .store()
            .get_categories(&page_query(page))
            .expect("cached page");
        assert!(slot.items.iter().all(|c| c.id != 7));
        assert_eq!(slot.total, 4);
    }
    delete.assert();
}

#[tokio::test]
async fn data_less_update_response_is_repaired_locally() {
    let server = MockServer::start();
    let current = category(7, 1, actor_id());

    let patch = server.mock(|when, then| {
        when.method("PATCH").path("/categories/7");
        then.status(200).json_body(serde_json::json!({}));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    let mut submitted = current.clone();
    submitted.name_vi = "Thời sự".into();
    let changes = diff_records(&current, &submitted).expect("diff");

    let outcome = cx
        .categories()
        .update(&current, changes)
        .await
        .expect("update");

    let UpdateOutcome::Updated(repaired) = outcome else {
        panic!("expected an updated record");
    };
    assert_eq!(repaired.name_vi, "Thời sự");
    assert_eq!(repaired.slug, current.slug);
    // The repair stamps a fresh timestamp rather than keeping the old one.
    assert!(repaired.updated_at > current.updated_at);
    patch.assert();
}

#[tokio::test]
async fn create_flags_loaded_lists_for_refetch() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/categories");
        then.status(200)
            .json_body(list_body(&[category(1, 1, actor_id())], 1));
    });
    let created = category(2, 2, actor_id());
    let post = server.mock(|when, then| {
        when.method("POST").path("/categories");
        then.status(201).json_body(serde_json::to_value(&created).expect("encode"));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    cx.categories().list(&page_query(1)).await.expect("list");

    let returned = cx
        .categories()
        .create(bantin_api_types::CategoryCreateRequest {
            slug: None,
            name_vi: "Giải trí".into(),
            name_en: None,
            order: None,
        })
        .await
        .expect("create");

    // The mock answers with a bare entity; the handle still decodes it.
    assert_eq!(returned.expect("entity").id, 2);

    let slot = cx
        .store()
        .get_categories(&page_query(1))
        .expect("cached page");
    assert!(slot.stale);
    // No optimistic insert.
    assert_eq!(slot.items.len(), 1);
    post.assert();
}

#[tokio::test]
async fn login_round_trip_stores_tokens_and_user() {
    let server = MockServer::start();
    let me = user(actor_id());
    server.mock(|when, then| {
        when.method("POST").path("/users/login");
        then.status(200).json_body(serde_json::json!({
            "accessToken": "a.b.c",
            "refreshToken": "d.e.f",
            "data": me,
        }));
    });

    let (cx, _dir) = context(&server);
    let signed_in = cx
        .users()
        .login("nga@example.com", "mật-khẩu")
        .await
        .expect("login");

    assert_eq!(signed_in.id, actor_id());
    assert_eq!(cx.session().access_token().as_deref(), Some("a.b.c"));
    assert_eq!(cx.session().current_user_id(), Some(actor_id()));
}

#[tokio::test]
async fn rejected_login_stores_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/users/login");
        then.status(401)
            .json_body(serde_json::json!({ "message": "Sai email hoặc mật khẩu" }));
    });

    let (cx, _dir) = context(&server);
    let err = cx
        .users()
        .login("nga@example.com", "sai")
        .await
        .expect_err("login must fail");

    match err {
        SyncError::Api(ApiError::Server { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Sai email hoặc mật khẩu");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(cx.session().access_token().is_none());
    assert!(cx.session().current_user().is_none());
}

#[tokio::test]
async fn self_update_refreshes_the_stored_session_user() {
    let server = MockServer::start();
    let me = user(actor_id());
    let mut renamed = me.clone();
    renamed.email = "moi@example.com".into();

    let patch = server.mock(|when, then| {
        when.method("PATCH").path(format!("/users/{}", actor_id()));
        then.status(200)
            .json_body(serde_json::json!({ "data": renamed }));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    let mut submitted = me.clone();
    submitted.email = "moi@example.com".into();
    let changes = diff_records(&me, &submitted).expect("diff");

    cx.users().update(&me, changes).await.expect("update");

    let session_user = cx.session().current_user().expect("session user");
    assert_eq!(session_user.email, "moi@example.com");
    patch.assert();
}

#[tokio::test]
async fn foreign_user_update_is_self_edit_only() {
    let server = MockServer::start();
    let (cx, _dir) = signed_in_context(&server, actor_id());

    let someone_else = user(other_id());
    let mut changes = ChangeSet::new();
    changes.pin("email", "hacker@example.com");

    let err = cx
        .users()
        .update(&someone_else, changes)
        .await
        .expect_err("foreign user update must be gated");
    assert!(matches!(err, SyncError::SelfEditOnly));
}

#[tokio::test]
async fn failed_reorder_still_flags_lists_for_refetch() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/categories");
        then.status(200).json_body(list_body(
            &[category(1, 1, actor_id()), category(2, 2, actor_id())],
            2,
        ));
    });
    server.mock(|when, then| {
        when.method("PATCH").path("/categories/order");
        then.status(500)
            .json_body(serde_json::json!({ "message": "bulk write failed" }));
    });

    let (cx, _dir) = signed_in_context(&server, actor_id());
    let page = cx.categories().list(&page_query(1)).await.expect("list");

    let mut items = page.items;
    assert!(reposition(&mut items, 2, 0));
    let err = cx
        .categories()
        .reorder(&items)
        .await
        .expect_err("reorder must surface the failure");
    assert!(matches!(err, SyncError::Api(ApiError::Server { .. })));

    // Self-correcting: the next read refetches authoritative order.
    let slot = cx
        .store()
        .get_categories(&page_query(1))
        .expect("cached page");
    assert!(slot.stale);
}
