use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use reqwest::StatusCode;

use mesopotamia_contact::ContactSubmission;
use mesopotamia_infra::{
    db, MailError, MailSettings, Mailer, PersistenceError, ProductCatalog, Secret, SmtpMailer,
    SqliteProductCatalog,
};
use mesopotamia_products::{NewProduct, Product, ProductName};
use mesopotamia_web::app::{build_app, AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client that keeps the session cookie between requests and never follows redirects.
struct Browser {
    client: reqwest::Client,
    base_url: String,
    session: Mutex<Option<String>>,
}

impl Browser {
    fn new(srv: &TestServer) -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        Self {
            client,
            base_url: srv.base_url.clone(),
            session: Mutex::new(None),
        }
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        let req = self.client.get(format!("{}{}", self.base_url, path));
        self.send(req).await
    }

    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        let req = self.client.post(format!("{}{}", self.base_url, path)).form(fields);
        self.send(req).await
    }

    async fn send(&self, mut req: reqwest::RequestBuilder) -> reqwest::Response {
        let cookie = self.session.lock().unwrap().clone();
        if let Some(cookie) = cookie {
            req = req.header(COOKIE, cookie);
        }
        let res = req.send().await.unwrap();
        if let Some(set) = res.headers().get(SET_COOKIE) {
            let pair = set.to_str().unwrap().split(';').next().unwrap().to_string();
            *self.session.lock().unwrap() = Some(pair);
        }
        res
    }

    /// Load the contact page and pull the CSRF token out of the form.
    async fn csrf_token(&self) -> String {
        let body = self.get("/contact").await.text().await.unwrap();
        let marker = r#"name="csrf_token" value=""#;
        let start = body.find(marker).expect("csrf field missing") + marker.len();
        let end = start + body[start..].find('"').unwrap();
        body[start..end].to_string()
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(ContactSubmission, String)>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<(ContactSubmission, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_contact_notification(
        &self,
        submission: &ContactSubmission,
        recipient: &str,
    ) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((submission.clone(), recipient.to_string()));
        Ok(())
    }
}

struct PanickingCatalog;

#[async_trait]
impl ProductCatalog for PanickingCatalog {
    async fn list_featured_products(&self, _limit: u32) -> Result<Vec<Product>, PersistenceError> {
        panic!("catalog exploded");
    }
}

async fn seeded_catalog(products: &[(&str, bool)]) -> Arc<SqliteProductCatalog> {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::init_schema(&pool).await.unwrap();
    let catalog = SqliteProductCatalog::new(pool);
    for (name, featured) in products {
        let new = NewProduct::new(ProductName::parse(*name).unwrap(), Some(format!("About {name}")));
        let new = if *featured { new.featured() } else { new };
        catalog.create(new).await.unwrap();
    }
    Arc::new(catalog)
}

/// SMTP mailer pointed at a local port nobody listens on.
fn unreachable_smtp_mailer() -> SmtpMailer {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    SmtpMailer::new(&MailSettings {
        server: "127.0.0.1".into(),
        port,
        use_tls: false,
        username: "site@example.com".into(),
        password: Secret::new("app-password"),
        default_sender: "site@example.com".into(),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

async fn site(mailer: Arc<dyn Mailer>, recipient: Option<&str>) -> TestServer {
    let catalog = seeded_catalog(&[]).await;
    TestServer::spawn(AppServices::new(
        catalog,
        mailer,
        recipient.map(str::to_string),
        "test-secret",
    ))
    .await
}

fn valid_submission<'a>(token: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("csrf_token", token),
        ("name", "Jo"),
        ("email", "jo@example.com"),
        ("message", "Hello there, interested in panels."),
    ]
}

fn is_html(res: &reqwest::Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

#[tokio::test]
async fn home_lists_at_most_four_featured_products() {
    let catalog = seeded_catalog(&[
        ("Mono panel 400W", true),
        ("Cable kit", false),
        ("Hybrid inverter", true),
        ("Lithium battery", true),
        ("Charge controller", true),
        ("Roof mount", true),
    ])
    .await;
    let mailer = Arc::new(RecordingMailer::default());
    let srv = TestServer::spawn(AppServices::new(catalog, mailer, None, "test-secret")).await;
    let browser = Browser::new(&srv);

    let res = browser.get("/").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();

    for name in ["Mono panel 400W", "Hybrid inverter", "Lithium battery", "Charge controller"] {
        assert!(body.contains(name), "{name} missing from home page");
    }
    assert!(!body.contains("Roof mount"));
    assert!(!body.contains("Cable kit"));
    assert!(body.contains("About Hybrid inverter"));
    assert!(body.contains(r#"<a href="/" class="active" aria-current="page">Home</a>"#));
}

#[tokio::test]
async fn home_renders_error_page_when_catalog_fails() {
    // No schema: every catalog query fails.
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    let catalog = Arc::new(SqliteProductCatalog::new(pool));
    let mailer = Arc::new(RecordingMailer::default());
    let srv = TestServer::spawn(AppServices::new(catalog, mailer, None, "test-secret")).await;

    let res = Browser::new(&srv).get("/").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(is_html(&res));
    assert!(res.text().await.unwrap().contains("We could not load this page"));
}

#[tokio::test]
async fn handler_panic_becomes_500_page() {
    let mailer = Arc::new(RecordingMailer::default());
    let srv = TestServer::spawn(AppServices::new(
        Arc::new(PanickingCatalog),
        mailer,
        None,
        "test-secret",
    ))
    .await;
    let browser = Browser::new(&srv);

    let res = browser.get("/").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(is_html(&res));
    assert!(res.text().await.unwrap().contains("500 Internal Server Error"));

    // The server keeps serving after the panic.
    assert_eq!(browser.get("/about").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn about_page_renders() {
    let srv = site(Arc::new(RecordingMailer::default()), None).await;
    let res = Browser::new(&srv).get("/about").await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();
    assert!(body.contains("About Mesopotamia Solar"));
    assert!(body.contains(r#"id="menuToggle""#));
}

#[tokio::test]
async fn pages_allow_any_origin() {
    let srv = site(Arc::new(RecordingMailer::default()), None).await;
    let browser = Browser::new(&srv);
    let req = browser
        .client
        .get(format!("{}/about", srv.base_url))
        .header("origin", "https://partner.example.com");
    let res = browser.send(req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), "*");
    assert!(is_html(&res));
}

#[tokio::test]
async fn navigation_script_is_served() {
    let srv = site(Arc::new(RecordingMailer::default()), None).await;
    let res = Browser::new(&srv).get("/static/js/main.js").await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("menuToggle"));
}

#[tokio::test]
async fn unknown_path_renders_404_page() {
    let srv = site(Arc::new(RecordingMailer::default()), None).await;
    let res = Browser::new(&srv).get("/solar-farms").await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(is_html(&res));
    assert!(res.text().await.unwrap().contains("404 Page Not Found"));
}

#[tokio::test]
async fn wrong_method_renders_html_405_page() {
    let srv = site(Arc::new(RecordingMailer::default()), None).await;
    let browser = Browser::new(&srv);
    let res = browser
        .send(browser.client.delete(format!("{}/about", srv.base_url)))
        .await;

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(is_html(&res));
    assert!(res.headers().get("allow").is_some());
    assert!(res.text().await.unwrap().contains("405 Method Not Allowed"));
}

#[tokio::test]
async fn contact_page_renders_empty_form_with_csrf_token() {
    let srv = site(Arc::new(RecordingMailer::default()), None).await;
    let browser = Browser::new(&srv);

    let res = browser.get("/contact").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(SET_COOKIE).is_some());
    let body = res.text().await.unwrap();
    assert!(body.contains(r#"name="csrf_token""#));
    assert!(!body.contains("is-invalid"));

    let token = browser.csrf_token().await;
    assert_eq!(token.len(), 32);
}

#[tokio::test]
async fn healthy_send_redirects_and_flashes_success_once() {
    let mailer = Arc::new(RecordingMailer::default());
    let srv = site(mailer.clone(), Some("sales@example.com")).await;
    let browser = Browser::new(&srv);
    let token = browser.csrf_token().await;

    let res = browser.post_form("/contact", &valid_submission(&token)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(LOCATION).unwrap(), "/contact");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let (submission, recipient) = &sent[0];
    assert_eq!(recipient, "sales@example.com");
    assert_eq!(submission.name(), "Jo");
    assert_eq!(submission.email(), "jo@example.com");
    assert_eq!(submission.message(), "Hello there, interested in panels.");

    let page = browser.get("/contact").await.text().await.unwrap();
    assert!(page.contains("alert-success"));
    assert!(page.contains("Your message has been sent successfully!"));

    let again = browser.get("/contact").await.text().await.unwrap();
    assert!(!again.contains("Your message has been sent successfully!"));
}

#[tokio::test]
async fn missing_recipient_skips_mailer_and_warns() {
    let mailer = Arc::new(RecordingMailer::default());
    let srv = site(mailer.clone(), None).await;
    let browser = Browser::new(&srv);
    let token = browser.csrf_token().await;

    let res = browser.post_form("/contact", &valid_submission(&token)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(mailer.sent().is_empty());

    let page = browser.get("/contact").await.text().await.unwrap();
    assert!(page.contains("alert-warning"));
    assert!(page.contains("Recipient email not configured!"));
}

#[tokio::test]
async fn failing_transport_redirects_with_failure_notice() {
    let srv = site(Arc::new(unreachable_smtp_mailer()), Some("sales@example.com")).await;
    let browser = Browser::new(&srv);
    let token = browser.csrf_token().await;

    let res = browser.post_form("/contact", &valid_submission(&token)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(LOCATION).unwrap(), "/contact");

    let page = browser.get("/contact").await.text().await.unwrap();
    assert!(page.contains("alert-danger"));
    assert!(page.contains("Failed to send message. Please try again later."));
}

#[tokio::test]
async fn invalid_email_rerenders_form_with_errors() {
    let mailer = Arc::new(RecordingMailer::default());
    let srv = site(mailer.clone(), Some("sales@example.com")).await;
    let browser = Browser::new(&srv);
    let token = browser.csrf_token().await;

    let res = browser
        .post_form(
            "/contact",
            &[
                ("csrf_token", token.as_str()),
                ("name", "Jo"),
                ("email", "not-an-email"),
                ("message", "Hello there, interested in panels."),
            ],
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();
    assert!(body.contains("Invalid email address!"));
    assert!(body.contains(r#"class="form-control is-valid" value="Jo""#));
    assert!(body.contains(r#"class="form-control is-invalid" value="not-an-email""#));
    assert!(body.contains(r#"class="form-control is-valid">Hello there, interested in panels.</textarea>"#));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn empty_submission_reports_every_field() {
    let srv = site(Arc::new(RecordingMailer::default()), Some("sales@example.com")).await;
    let browser = Browser::new(&srv);
    let token = browser.csrf_token().await;

    let res = browser
        .post_form("/contact", &[("csrf_token", token.as_str())])
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();
    assert!(body.contains("Name is required!"));
    assert!(body.contains("Email is required!"));
    assert!(body.contains("Message is required!"));
}

#[tokio::test]
async fn missing_or_wrong_csrf_token_is_forbidden() {
    let mailer = Arc::new(RecordingMailer::default());
    let srv = site(mailer.clone(), Some("sales@example.com")).await;

    // No session at all.
    let stranger = Browser::new(&srv);
    let res = stranger.post_form("/contact", &valid_submission("forged")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(is_html(&res));
    assert!(res.text().await.unwrap().contains("403 Forbidden"));

    // Session exists but the token does not match.
    let browser = Browser::new(&srv);
    browser.csrf_token().await;
    let res = browser.post_form("/contact", &valid_submission("forged")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn non_form_body_is_bad_request() {
    let srv = site(Arc::new(RecordingMailer::default()), Some("sales@example.com")).await;
    let browser = Browser::new(&srv);
    browser.csrf_token().await;

    let req = browser
        .client
        .post(format!("{}/contact", srv.base_url))
        .header(CONTENT_TYPE, "application/json")
        .body(r#"{"name":"Jo"}"#);
    let res = browser.send(req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(is_html(&res));
    assert!(res.text().await.unwrap().contains("400 Bad Request"));
}
