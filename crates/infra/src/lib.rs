//! Infrastructure layer: configuration, database, outbound mail.

pub mod catalog;
pub mod config;
pub mod db;
pub mod mail;

pub use catalog::{ProductCatalog, SqliteProductCatalog};
pub use config::{ConfigError, MailSettings, Secret, ServerSettings, Settings};
pub use db::PersistenceError;
pub use mail::{MailError, Mailer, SmtpMailer};
