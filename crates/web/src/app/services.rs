//! Collaborators shared by every handler, built once at startup.

use std::sync::Arc;

use anyhow::Context;

use mesopotamia_contact::ContactValidator;
use mesopotamia_infra::{db, Mailer, ProductCatalog, Settings, SmtpMailer, SqliteProductCatalog};

use crate::session::SessionKey;

const DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<dyn ProductCatalog>,
    pub mailer: Arc<dyn Mailer>,
    pub validator: Arc<ContactValidator>,
    /// Destination for contact notifications; `None` disables sending.
    pub recipient: Option<String>,
    pub sessions: SessionKey,
}

impl AppServices {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        mailer: Arc<dyn Mailer>,
        recipient: Option<String>,
        secret: &str,
    ) -> Self {
        Self {
            catalog,
            mailer,
            validator: Arc::new(ContactValidator::default()),
            recipient,
            sessions: SessionKey::derive(secret),
        }
    }
}

/// Connect the database, create the schema, and build the SMTP mailer.
pub async fn build_services(settings: &Settings) -> anyhow::Result<AppServices> {
    let pool = db::connect(&settings.database_url, DB_MAX_CONNECTIONS)
        .await
        .with_context(|| format!("failed to open database {}", settings.database_url))?;
    db::init_schema(&pool)
        .await
        .context("failed to create database tables")?;

    let mailer = SmtpMailer::new(&settings.mail).context("failed to configure smtp transport")?;
    tracing::info!(
        server = %settings.mail.server,
        port = settings.mail.port,
        tls = settings.mail.use_tls,
        sender = mailer.sender(),
        "mailer configured"
    );

    Ok(AppServices::new(
        Arc::new(SqliteProductCatalog::new(pool)),
        Arc::new(mailer),
        settings.recipient.clone(),
        settings.secret_key.expose(),
    ))
}
