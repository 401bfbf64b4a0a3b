//! Outbound mail: contact notifications over SMTP.
//!
//! Delivery is a single synchronous attempt per submission. Every failure
//! is returned as a [`MailError`]; nothing here retries or queues.

use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use mesopotamia_contact::ContactSubmission;

use crate::config::MailSettings;

pub const CONTACT_SUBJECT: &str = "New Contact Form Submission - Mesopotamia Solar";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Sends contact notifications.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_contact_notification(
        &self,
        submission: &ContactSubmission,
        recipient: &str,
    ) -> Result<(), MailError>;
}

/// Plain-text body carrying the submission verbatim.
pub fn contact_notification_body(submission: &ContactSubmission) -> String {
    format!(
        "Name: {}\nEmail: {}\nMessage:\n{}\n",
        submission.name(),
        submission.email(),
        submission.message()
    )
}

pub fn compose_contact_notification(
    sender: &str,
    recipient: &str,
    submission: &ContactSubmission,
) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(sender)?)
        .to(parse_mailbox(recipient)?)
        .subject(CONTACT_SUBJECT)
        .header(ContentType::TEXT_PLAIN);

    // Replying from the inbox should reach the visitor, not the site account.
    if let Ok(reply_to) = submission.email().parse::<Mailbox>() {
        builder = builder.reply_to(reply_to);
    }

    Ok(builder.body(contact_notification_body(submission))?)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// SMTP relay mailer. Each send opens its own connection and closes it afterwards.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> Result<Self, MailError> {
        let builder = if settings.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.server)
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose().to_string(),
            ))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            transport,
            sender: settings.default_sender.clone(),
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_contact_notification(
        &self,
        submission: &ContactSubmission,
        recipient: &str,
    ) -> Result<(), MailError> {
        let message = compose_contact_notification(&self.sender, recipient, submission)?;
        let response = self.transport.send(message).await?;
        tracing::info!(code = %response.code(), "contact notification sent");
        Ok(())
    }
}
