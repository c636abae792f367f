//! Integration tests for the requests repository.

use tramites_core::{ApprovalDocumentPath, CoreError, RequestId, RequestStatus};
use tramites_testing::{RequestBuilder, TestEnv};

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn created_requests_start_pending_without_document() {
    let env = TestEnv::new().await.expect("test env setup");

    let new = RequestBuilder::new().user("user-7").title("Permiso").description("obra").build();
    let request = env.storage().requests.create(&new).await.expect("create");

    assert_eq!(request.user_id, "user-7");
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.description.as_deref(), Some("obra"));
    assert!(request.approval_document_path.is_none());
    assert!(request.decided_at.is_none());

    let found = env.storage().requests.find_by_id(request.id).await.expect("find");
    assert_eq!(found, Some(request));

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn approval_sets_document_path_once() {
    let env = TestEnv::new().await.expect("test env setup");
    let storage = env.storage();
    let request = env.create_request("user-1", "Licencia").await.expect("create");

    let path = ApprovalDocumentPath::new("/srv/approvals/licencia-1.pdf").expect("valid path");
    let approved = storage.requests.approve(request.id, &path).await.expect("approve");

    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.approval_document_path.as_deref(), Some(path.as_str()));
    assert!(approved.decided_at.is_some());

    let other = ApprovalDocumentPath::new("/srv/approvals/other.pdf").expect("valid path");
    let err = storage.requests.approve(request.id, &other).await.expect_err("second approval");
    assert!(matches!(err, CoreError::Conflict(_)));

    let stored = storage.requests.find_by_id(request.id).await.expect("find").expect("exists");
    assert_eq!(stored.approval_document_path.as_deref(), Some(path.as_str()));

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn rejected_requests_cannot_be_approved() {
    let env = TestEnv::new().await.expect("test env setup");
    let storage = env.storage();
    let request = env.create_request("user-1", "Licencia").await.expect("create");

    let rejected = storage.requests.reject(request.id).await.expect("reject");
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert!(rejected.approval_document_path.is_none());

    let path = ApprovalDocumentPath::new("/srv/approvals/x.pdf").expect("valid path");
    let err = storage.requests.approve(request.id, &path).await.expect_err("approve rejected");
    assert!(matches!(err, CoreError::Conflict(_)));

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn deciding_unknown_request_is_not_found() {
    let env = TestEnv::new().await.expect("test env setup");

    let err = env.storage().requests.reject(RequestId::new()).await.expect_err("unknown id");
    assert!(matches!(err, CoreError::NotFound(_)));

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn listing_is_scoped_to_the_user() {
    let env = TestEnv::new().await.expect("test env setup");
    let storage = env.storage();

    env.create_request("alice", "A1").await.expect("create");
    env.create_request("alice", "A2").await.expect("create");
    let bob = env.create_request("bob", "B1").await.expect("create");

    let alice = storage.requests.list_for_user("alice", None).await.expect("list");
    assert_eq!(alice.len(), 2);
    assert!(alice.iter().all(|r| r.user_id == "alice"));

    let bobs = storage.requests.list_for_user("bob", None).await.expect("list");
    assert_eq!(bobs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![bob.id]);
    assert_eq!(storage.requests.count().await.expect("count"), 3);

    env.cleanup().await.expect("cleanup");
}
