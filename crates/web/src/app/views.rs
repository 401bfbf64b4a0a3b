//! HTML views rendered with `maud`.
//!
//! Every page goes through [`layout`], which supplies the header with the
//! navigation menu, pending flash notices, and the footer.

use axum::http::StatusCode;
use chrono::Datelike;
use maud::{html, Markup, DOCTYPE};

use mesopotamia_contact::{ContactForm, Field, FieldErrors};
use mesopotamia_products::Product;

use crate::session::Flash;

pub const COMPANY_NAME: &str = "Mesopotamia Solar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePage {
    Home,
    About,
    Contact,
    None,
}

const NAV: [(ActivePage, &str, &str); 3] = [
    (ActivePage::Home, "/", "Home"),
    (ActivePage::About, "/about", "About"),
    (ActivePage::Contact, "/contact", "Contact"),
];

fn layout(title: &str, active: ActivePage, flashes: &[Flash], content: Markup) -> Markup {
    let year = chrono::Utc::now().year();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (COMPANY_NAME) }
                script src="/static/js/main.js" defer {}
            }
            body {
                header class="site-header" {
                    a class="brand" href="/" { (COMPANY_NAME) }
                    button id="menuToggle" class="menu-toggle" type="button" aria-label="Toggle navigation" {
                        span class="bar" {}
                        span class="bar" {}
                        span class="bar" {}
                    }
                    nav id="mainNav" class="main-nav" {
                        ul {
                            @for (page, href, label) in NAV {
                                li {
                                    @if page == active {
                                        a href=(href) class="active" aria-current="page" { (label) }
                                    } @else {
                                        a href=(href) { (label) }
                                    }
                                }
                            }
                        }
                    }
                }
                main {
                    @if !flashes.is_empty() {
                        div class="flashes" {
                            @for flash in flashes {
                                div class={ "alert alert-" (flash.level.as_str()) } role="alert" {
                                    (flash.message)
                                }
                            }
                        }
                    }
                    (content)
                }
                footer class="site-footer" {
                    p { "© " (year) " " (COMPANY_NAME) ". All rights reserved." }
                }
            }
        }
    }
}

pub fn home(products: &[Product], flashes: &[Flash]) -> Markup {
    layout(
        "Home",
        ActivePage::Home,
        flashes,
        html! {
            section class="hero" {
                h1 { "Clean energy for every home in Iraq" }
                p { "Solar panels, inverters and storage, installed and supported by " (COMPANY_NAME) "." }
                a class="button" href="/contact" { "Get a quote" }
            }
            section class="featured-products" {
                h2 { "Featured products" }
                @if products.is_empty() {
                    p class="empty" { "New products are on their way. Check back soon." }
                } @else {
                    div class="product-grid" {
                        @for product in products {
                            article class="product-card" {
                                h3 { (product.name()) }
                                @if let Some(description) = product.description() {
                                    p { (description) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn about(flashes: &[Flash]) -> Markup {
    layout(
        "About",
        ActivePage::About,
        flashes,
        html! {
            section class="about" {
                h1 { "About " (COMPANY_NAME) }
                p {
                    (COMPANY_NAME) " designs and installs solar power systems for homes and "
                    "businesses. We handle everything from the first site survey to "
                    "after-sales maintenance."
                }
                h2 { "What we offer" }
                ul {
                    li { "Grid-tied and off-grid photovoltaic systems" }
                    li { "Battery storage for reliable power during outages" }
                    li { "Inverters, charge controllers and mounting hardware" }
                    li { "Maintenance plans and system monitoring" }
                }
            }
        },
    )
}

/// State needed to render the contact form.
#[derive(Debug, Clone, Copy)]
pub struct ContactFormView<'a> {
    pub values: &'a ContactForm,
    /// `None` for a fresh form; `Some` after a rejected submission.
    pub errors: Option<&'a FieldErrors>,
    pub csrf_token: &'a str,
}

impl ContactFormView<'_> {
    fn field_class(&self, field: Field) -> &'static str {
        match self.errors {
            None => "form-control",
            Some(errors) if errors.is_valid(field) => "form-control is-valid",
            Some(_) => "form-control is-invalid",
        }
    }

    fn error(&self, field: Field) -> Option<&str> {
        self.errors.and_then(|errors| errors.get(field))
    }
}

pub fn contact(view: ContactFormView<'_>, flashes: &[Flash]) -> Markup {
    let value = |field: Field| view.values.value(field).unwrap_or_default();
    layout(
        "Contact",
        ActivePage::Contact,
        flashes,
        html! {
            section class="contact" {
                h1 { "Contact us" }
                p { "Tell us about your project and we will get back to you." }
                form method="post" action="/contact" novalidate {
                    input type="hidden" name="csrf_token" value=(view.csrf_token);
                    div class="form-group" {
                        label for="name" { (Field::Name.label()) }
                        input type="text" id="name" name="name" class=(view.field_class(Field::Name)) value=(value(Field::Name));
                        @if let Some(error) = view.error(Field::Name) {
                            div class="invalid-feedback" { (error) }
                        }
                    }
                    div class="form-group" {
                        label for="email" { (Field::Email.label()) }
                        input type="email" id="email" name="email" class=(view.field_class(Field::Email)) value=(value(Field::Email));
                        @if let Some(error) = view.error(Field::Email) {
                            div class="invalid-feedback" { (error) }
                        }
                    }
                    div class="form-group" {
                        label for="message" { (Field::Message.label()) }
                        textarea id="message" name="message" rows="6" class=(view.field_class(Field::Message)) {
                            (value(Field::Message))
                        }
                        @if let Some(error) = view.error(Field::Message) {
                            div class="invalid-feedback" { (error) }
                        }
                    }
                    button type="submit" class="button" { "Send" }
                }
            }
        },
    )
}

/// Error page for `status`. 400, 403, 404 and 500 have their own copy.
pub fn error_page(status: StatusCode) -> Markup {
    let (title, detail) = match status {
        StatusCode::BAD_REQUEST => (
            "Bad Request",
            "The request could not be understood. Please check the form and try again.",
        ),
        StatusCode::FORBIDDEN => (
            "Forbidden",
            "Your session may have expired. Reload the page and try again.",
        ),
        StatusCode::NOT_FOUND => (
            "Page Not Found",
            "The page you are looking for does not exist or has been moved.",
        ),
        StatusCode::INTERNAL_SERVER_ERROR => (
            "Internal Server Error",
            "Something went wrong on our side. Please try again later.",
        ),
        other => (
            other.canonical_reason().unwrap_or("Error"),
            "The request could not be completed.",
        ),
    };
    layout(
        title,
        ActivePage::None,
        &[],
        html! {
            section class="error-page" {
                h1 { (status.as_u16()) " " (title) }
                p { (detail) }
                a class="button" href="/" { "Back to home" }
            }
        },
    )
}

/// Shown when a page's data could not be loaded.
pub fn generic_error() -> Markup {
    layout(
        "Error",
        ActivePage::None,
        &[],
        html! {
            section class="error-page" {
                h1 { "We could not load this page" }
                p { "An unexpected error occurred. Please try again in a few minutes." }
                a class="button" href="/contact" { "Contact us" }
            }
        },
    )
}
