//! End-to-end tests of the submission pipeline and session layer using a
//! recording transport instead of an SMTP server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use purchase_portal_core::config::{MailSettings, SmtpCredentials, TransportSettings};
use purchase_portal_core::mail::MailMessage;
use purchase_portal_core::{
    Action, DispatchError, DocumentRenderer, DraftRepository, FileDraftStore, FormData,
    FormSession, FormTemplate, MailDispatcher, MailTransport, SessionError, SubmissionRequest,
    SubmissionService, TracingNotifier,
};

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn settings(recipient: Option<&str>) -> MailSettings {
    MailSettings {
        transport: TransportSettings::Smtp {
            host: "localhost".into(),
            port: 2525,
            secure: false,
        },
        credentials: Some(SmtpCredentials {
            user: "portal@example.com".into(),
            password: "app-password".into(),
        }),
        recipient: recipient.map(String::from),
        timeout: Duration::from_secs(5),
    }
}

fn service(transport: Arc<RecordingTransport>, recipient: Option<&str>) -> Arc<SubmissionService> {
    let template = Arc::new(FormTemplate::purchase_agreement());
    let renderer = Arc::new(DocumentRenderer::new(template).unwrap());
    let dispatcher = Arc::new(MailDispatcher::new(Arc::new(settings(recipient)), transport));
    Arc::new(SubmissionService::new(renderer, dispatcher))
}

fn sample_form() -> FormData {
    FormData::new()
        .with("buyerName", "Acme")
        .with("sellerName", "Globex")
        .with("agreementDate", "2024-01-01")
}

fn complete_form() -> FormData {
    FormTemplate::purchase_agreement()
        .required_fields()
        .map(|f| (f.name.clone(), format!("{} value", f.label)))
        .collect::<FormData>()
        .with("buyerName", "Acme Corp")
        .with("sellerName", "Globex")
}

#[tokio::test]
async fn test_save_submission_sends_one_addressed_message() {
    let transport = Arc::new(RecordingTransport::default());
    let service = service(transport.clone(), Some("legal@example.com"));

    let receipt = service
        .submit(SubmissionRequest {
            form_data: Some(sample_form()),
            action: Action::Save,
        })
        .await
        .unwrap();
    assert_eq!(receipt.message, "Email sent successfully");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.to, "legal@example.com");
    assert_eq!(
        message.sender(),
        "\"Purchase Agreement Portal\" <portal@example.com>"
    );
    assert_eq!(message.subject, "Purchase Agreement Draft Saved - Acme");
    assert!(message.html_body.contains("Agreement Information"));
    assert!(message.html_body.contains("Party Information"));
    assert!(!message.html_body.contains("Transaction Details"));
    assert!(!message.html_body.contains("Legal Provisions"));
    assert!(!message.html_body.contains("<h2>Signatures</h2>"));
}

#[tokio::test]
async fn test_missing_recipient_never_reaches_transport() {
    let transport = Arc::new(RecordingTransport::default());
    let service = service(transport.clone(), None);

    let err = service
        .submit(SubmissionRequest {
            form_data: Some(sample_form()),
            action: Action::Download,
        })
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Email recipient not configured");
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_session_saves_to_disk_and_emails_in_process() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileDraftStore::open(dir.path()).await.unwrap());
    let transport = Arc::new(RecordingTransport::default());
    let service = service(transport.clone(), Some("legal@example.com"));

    let session = FormSession::new(
        Arc::new(FormTemplate::purchase_agreement()),
        DraftRepository::new(store.clone()),
        service,
        Arc::new(TracingNotifier),
    );

    for (name, value) in complete_form().iter() {
        session.set_field(name, value).await;
    }
    let draft = session.save().await.unwrap();
    assert_eq!(draft.record.title, "Acme Corp - Globex");

    let reopened = DraftRepository::new(Arc::new(FileDraftStore::open(dir.path()).await.unwrap()));
    let drafts = reopened.list().await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].record.form_data, complete_form());

    let document = session.download().await.unwrap();
    assert!(document.file_name.starts_with("Purchase_Agreement_Acme_Corp_"));

    let subjects: Vec<_> = transport.sent().into_iter().map(|m| m.subject).collect();
    assert_eq!(
        subjects,
        vec![
            "Purchase Agreement Draft Saved - Acme Corp",
            "Purchase Agreement Downloaded - Acme Corp",
        ]
    );
}

#[tokio::test]
async fn test_session_save_survives_unconfigured_mail() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileDraftStore::open(dir.path()).await.unwrap());
    let transport = Arc::new(RecordingTransport::default());

    let session = FormSession::new(
        Arc::new(FormTemplate::purchase_agreement()),
        DraftRepository::new(store),
        service(transport.clone(), None),
        Arc::new(TracingNotifier),
    );
    for (name, value) in complete_form().iter() {
        session.set_field(name, value).await;
    }

    assert!(session.save().await.is_ok());
    assert_eq!(session.drafts().await.len(), 1);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_session_refuses_incomplete_download() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(RecordingTransport::default());
    let session = FormSession::new(
        Arc::new(FormTemplate::purchase_agreement()),
        DraftRepository::new(Arc::new(FileDraftStore::open(dir.path()).await.unwrap())),
        service(transport.clone(), Some("legal@example.com")),
        Arc::new(TracingNotifier),
    );
    session.set_field("buyerName", "Acme").await;

    match session.download().await {
        Err(SessionError::Incomplete { message, missing }) => {
            assert_eq!(missing.len(), 14);
            assert_eq!(
                message,
                "Please complete all required fields before downloading. Missing: 14 field(s)"
            );
        }
        other => panic!("expected incomplete form, got {other:?}"),
    }
    assert!(transport.sent().is_empty());
}
