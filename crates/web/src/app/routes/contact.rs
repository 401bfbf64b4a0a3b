use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use serde::Deserialize;

use mesopotamia_contact::{ContactForm, ContactSubmission, FieldErrors};

use crate::app::errors::PageError;
use crate::app::services::AppServices;
use crate::app::views::{self, ContactFormView};
use crate::session::{FlashLevel, Session};

pub const SENT_MESSAGE: &str = "Your message has been sent successfully!";
pub const NO_RECIPIENT_MESSAGE: &str = "Recipient email not configured!";
pub const FAILED_MESSAGE: &str = "Failed to send message. Please try again later.";

/// Body of `POST /contact`.
#[derive(Debug, Default, Deserialize)]
pub struct ContactFormBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

impl ContactFormBody {
    fn into_parts(self) -> (ContactForm, Option<String>) {
        let form = ContactForm {
            name: self.name,
            email: self.email,
            message: self.message,
        };
        (form, self.csrf_token)
    }
}

/// What happened to a valid submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    NoRecipient,
    Failed,
}

impl Delivery {
    fn notice(self) -> (FlashLevel, &'static str) {
        match self {
            Delivery::Sent => (FlashLevel::Success, SENT_MESSAGE),
            Delivery::NoRecipient => (FlashLevel::Warning, NO_RECIPIENT_MESSAGE),
            Delivery::Failed => (FlashLevel::Danger, FAILED_MESSAGE),
        }
    }
}

pub async fn show_form(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    let mut session = Session::from_headers(&headers, &services.sessions);
    let form = ContactForm::default();
    render_form(&mut session, &form, None, &services)
}

pub async fn submit_form(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Form<ContactFormBody>, FormRejection>,
) -> Result<Response, PageError> {
    let Form(body) = body.map_err(|rejection| PageError::BadRequest(rejection.body_text()))?;
    let (form, csrf_token) = body.into_parts();

    let mut session = Session::from_headers(&headers, &services.sessions);
    if !session.verify_csrf(csrf_token.as_deref()) {
        return Err(PageError::Forbidden("csrf token missing or invalid"));
    }

    let submission = match services.validator.validate(&form) {
        Ok(submission) => submission,
        Err(errors) => {
            tracing::debug!(invalid_fields = errors.len(), "contact form rejected");
            return Ok(render_form(&mut session, &form, Some(&errors), &services));
        }
    };

    let (level, message) = deliver(&services, &submission).await.notice();
    session.flash(level, message);
    Ok(session.apply(Redirect::to("/contact").into_response(), &services.sessions))
}

/// Single delivery attempt. Failures are logged here and reported as [`Delivery::Failed`].
pub async fn deliver(services: &AppServices, submission: &ContactSubmission) -> Delivery {
    let Some(recipient) = services.recipient.as_deref() else {
        tracing::warn!("contact submission received but RECIPIENT_EMAIL is not configured");
        return Delivery::NoRecipient;
    };

    match services
        .mailer
        .send_contact_notification(submission, recipient)
        .await
    {
        Ok(()) => Delivery::Sent,
        Err(e) => {
            tracing::error!(error = %e, error.debug = ?e, "mail sending failed");
            Delivery::Failed
        }
    }
}

fn render_form(
    session: &mut Session,
    form: &ContactForm,
    errors: Option<&FieldErrors>,
    services: &AppServices,
) -> Response {
    let csrf_token = session.csrf_token();
    let flashes = session.take_flashes();
    let view = ContactFormView {
        values: form,
        errors,
        csrf_token: &csrf_token,
    };
    let page = views::contact(view, &flashes).into_response();
    session.apply(page, &services.sessions)
}
