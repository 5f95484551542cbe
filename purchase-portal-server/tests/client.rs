//! Drives a real listener with the HTTP submission client and a file-backed
//! draft session.

mod common;

use std::sync::Arc;

use purchase_portal::build_router;
use purchase_portal_core::{
    Action, ClientError, DraftRepository, FileDraftStore, FormData, FormSession, FormTemplate,
    HttpSubmissionClient, SubmissionClient, TracingNotifier,
};
use tokio::net::TcpListener;

use common::{app_state, Mail, StubTransport};

async fn spawn_server(mail: Mail, transport: Arc<StubTransport>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(app_state(mail, transport));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_client_submits_over_http() {
    let transport = Arc::new(StubTransport::default());
    let base = spawn_server(Mail::default(), transport.clone()).await;

    let receipt = HttpSubmissionClient::new(&base)
        .submit(&FormData::new().with("buyerName", "Acme"), Action::Download)
        .await
        .unwrap();

    assert!(receipt.success);
    assert_eq!(receipt.message, "Email sent successfully");
    assert_eq!(
        transport.sent()[0].subject,
        "Purchase Agreement Downloaded - Acme"
    );
}

#[tokio::test]
async fn test_client_surfaces_server_message() {
    let mail = Mail {
        recipient: None,
        ..Mail::default()
    };
    let base = spawn_server(mail, Arc::default()).await;

    let err = HttpSubmissionClient::new(&base)
        .submit(&FormData::new(), Action::Save)
        .await
        .unwrap_err();

    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "RECIPIENT_EMAIL is not set");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_session_over_http_with_file_store() {
    let transport = Arc::new(StubTransport::default());
    let base = spawn_server(Mail::default(), transport.clone()).await;
    let dir = tempfile::tempdir().unwrap();

    let session = FormSession::new(
        Arc::new(FormTemplate::purchase_agreement()),
        DraftRepository::new(Arc::new(FileDraftStore::open(dir.path()).await.unwrap())),
        Arc::new(HttpSubmissionClient::new(&base)),
        Arc::new(TracingNotifier),
    );
    for field in FormTemplate::purchase_agreement().required_fields() {
        session.set_field(field.name.clone(), "filled").await;
    }
    session.set_field("buyerName", "Acme").await;

    let draft = session.save().await.unwrap();
    assert_eq!(draft.record.title, "Acme - filled");
    assert_eq!(session.drafts().await.len(), 1);
    assert_eq!(
        transport.sent()[0].subject,
        "Purchase Agreement Draft Saved - Acme"
    );
}
