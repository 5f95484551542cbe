//! Command-line interface
//!
//! ```bash
//! # Run the HTTP server
//! purchase-portal serve --port 3001
//!
//! # Write the agreement text for a form
//! purchase-portal render --file form.json --output ./out
//!
//! # Send the notification email without the HTTP layer
//! purchase-portal send --file form.json --action download
//!
//! # Work with drafts on disk
//! purchase-portal drafts --store-dir ./drafts save --file form.json
//! purchase-portal drafts list
//! ```
//!
//! Form files hold either a flat `{field: value}` object or a request body
//! shaped like `{"formData": {...}}`. A missing `--file` reads stdin.

use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use purchase_portal_core::render::download_file_name;
use purchase_portal_core::{
    Action, DocumentRenderer, DraftRepository, FileDraftStore, FormData, FormSession,
    FormTemplate, HttpSubmissionClient, MailDispatcher, MailSettings, PortalConfig,
    SmtpMailTransport, SubmissionClient, SubmissionRequest, SubmissionService, TracingNotifier,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "purchase-portal")]
#[command(version)]
#[command(about = "Purchase agreement portal: HTTP relay, document rendering and drafts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen port (overrides the configured default of 3001)
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Render the agreement text for a form
    Render {
        /// Form JSON file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file, or a directory to write the generated file name into.
        /// Prints to stdout if not provided.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Send the notification email for a form
    Send {
        /// Form JSON file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// save or download
        #[arg(short, long, default_value = "save")]
        action: Action,
    },

    /// Save, list and inspect drafts
    Drafts {
        /// Directory holding one JSON file per draft
        #[arg(long, env = "PORTAL_DRAFT_DIR", default_value = "drafts")]
        store_dir: PathBuf,

        /// Portal server to notify on save (sends in-process if not provided)
        #[arg(long, env = "PORTAL_API_URL")]
        api_url: Option<String>,

        #[command(subcommand)]
        command: DraftCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum DraftCommands {
    /// List drafts, newest first
    List,

    /// Print one draft as JSON
    Show { key: String },

    /// Save a form as a new draft and send the notification email
    Save {
        /// Form JSON file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { port } => cmd_serve(port).await,
        Commands::Render { file, output } => cmd_render(file.as_deref(), output.as_deref()).await,
        Commands::Send { file, action } => cmd_send(file.as_deref(), action).await,
        Commands::Drafts {
            store_dir,
            api_url,
            command,
        } => cmd_drafts(&store_dir, api_url.as_deref(), command).await,
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn cmd_serve(port: Option<u16>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let template = Arc::new(FormTemplate::purchase_agreement());
    let service = build_service(template.clone(), &config.mail)?;
    let app = build_router(AppState::new(service, template));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!("Server running on http://localhost:{}", config.server.port);
    info!(
        "Email recipient: {}",
        config.mail.recipient.as_deref().unwrap_or("Not configured")
    );
    if let Some(frontend) = &config.server.frontend_url {
        info!("Frontend: {}", frontend);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn cmd_render(file: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let form = read_form(file)?;
    let now = Utc::now();
    let renderer = DocumentRenderer::new(Arc::new(FormTemplate::purchase_agreement()))?;
    let content = renderer.render_agreement(&form, now);

    match output {
        None => print!("{}", content),
        Some(path) => {
            let target = if path.is_dir() {
                path.join(download_file_name(&form, now))
            } else {
                path.to_path_buf()
            };
            tokio::fs::write(&target, content)
                .await
                .with_context(|| format!("failed to write {}", target.display()))?;
            println!("{}", target.display());
        }
    }
    Ok(())
}

async fn cmd_send(file: Option<&Path>, action: Action) -> Result<()> {
    let form = read_form(file)?;
    let config = load_config()?;
    let service = build_service(Arc::new(FormTemplate::purchase_agreement()), &config.mail)?;

    let receipt = service
        .submit(SubmissionRequest {
            form_data: Some(form),
            action,
        })
        .await
        .map_err(|e| match e.detail() {
            Some(detail) => anyhow!("{}: {}", e.user_message(), detail),
            None => anyhow!("{}", e.user_message()),
        })?;

    println!("{}", receipt.message);
    Ok(())
}

async fn cmd_drafts(store_dir: &Path, api_url: Option<&str>, command: DraftCommands) -> Result<()> {
    let template = Arc::new(FormTemplate::purchase_agreement());
    let store = FileDraftStore::open(store_dir)
        .await
        .with_context(|| format!("failed to open draft store at {}", store_dir.display()))?;

    let client: Arc<dyn SubmissionClient> = match api_url {
        Some(url) => Arc::new(HttpSubmissionClient::new(url)),
        None => {
            let config = load_config()?;
            build_service(template.clone(), &config.mail)?
        }
    };
    let session = FormSession::new(
        template,
        DraftRepository::new(Arc::new(store)),
        client,
        Arc::new(TracingNotifier),
    );

    match command {
        DraftCommands::List => {
            for draft in session.refresh_drafts().await? {
                println!(
                    "{}\t{}\t{}",
                    draft.key,
                    draft.record.saved_at.to_rfc3339(),
                    draft.record.title
                );
            }
        }
        DraftCommands::Show { key } => {
            let draft = session.load_draft(&key).await?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        DraftCommands::Save { file } => {
            for (name, value) in read_form(file.as_deref())?.iter() {
                session.set_field(name, value).await;
            }
            let draft = session.save().await?;
            println!("{}\t{}", draft.key, draft.record.title);
        }
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn load_config() -> Result<PortalConfig> {
    PortalConfig::from_env().map_err(|e| anyhow!("{} ({})", e, e.hint()))
}

/// Wire template, renderer, SMTP transport and dispatcher into one service
pub fn build_service(
    template: Arc<FormTemplate>,
    mail: &MailSettings,
) -> Result<Arc<SubmissionService>> {
    template.validate()?;
    let renderer = Arc::new(DocumentRenderer::new(template)?);
    let transport = SmtpMailTransport::from_settings(mail)?;
    let dispatcher = Arc::new(MailDispatcher::new(
        Arc::new(mail.clone()),
        Arc::new(transport),
    ));
    Ok(Arc::new(SubmissionService::new(renderer, dispatcher)))
}

fn read_form(file: Option<&Path>) -> Result<FormData> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    parse_form(&raw)
}

/// Accept a flat form object or a `{"formData": {...}}` request body
pub fn parse_form(raw: &str) -> Result<FormData> {
    let value: serde_json::Value = serde_json::from_str(raw).context("form is not valid JSON")?;
    let serde_json::Value::Object(mut object) = value else {
        bail!("form must be a JSON object");
    };
    match object.remove("formData") {
        Some(serde_json::Value::Object(fields)) => Ok(FormData::from_json_map(fields)),
        Some(_) => bail!("formData must be a JSON object"),
        None => Ok(FormData::from_json_map(object)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_form() {
        let form = parse_form(r#"{"buyerName": "Acme", "purchasePrice": 500000}"#).unwrap();
        assert_eq!(form.value("buyerName"), Some("Acme"));
        assert_eq!(form.value("purchasePrice"), Some("500000"));
    }

    #[test]
    fn test_parse_request_body() {
        let form = parse_form(r#"{"formData": {"sellerName": "Globex"}, "action": "save"}"#)
            .unwrap();
        assert_eq!(form.value("sellerName"), Some("Globex"));
        assert!(form.raw("action").is_none());
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(parse_form("[1, 2]").is_err());
        assert!(parse_form(r#"{"formData": "Acme"}"#).is_err());
        assert!(parse_form("not json").is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["purchase-portal", "send", "--action", "download"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Send {
                file: None,
                action: Action::Download
            }
        ));

        let cli = Cli::try_parse_from([
            "purchase-portal",
            "drafts",
            "--store-dir",
            "/tmp/drafts",
            "show",
            "purchase:1",
        ])
        .unwrap();
        match cli.command {
            Commands::Drafts {
                store_dir, command, ..
            } => {
                assert_eq!(store_dir, PathBuf::from("/tmp/drafts"));
                assert!(matches!(command, DraftCommands::Show { key } if key == "purchase:1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["purchase-portal", "send", "--action", "print"]).is_err());
    }

    #[test]
    fn test_build_service_from_settings() {
        let config = PortalConfig::from_lookup(|key| match key {
            "EMAIL_HOST" => Some("localhost".to_string()),
            "EMAIL_PORT" => Some("2525".to_string()),
            _ => None,
        })
        .unwrap();
        let service =
            build_service(Arc::new(FormTemplate::purchase_agreement()), &config.mail).unwrap();
        assert_eq!(service.renderer().template().id, "purchase-agreement");
    }
}
