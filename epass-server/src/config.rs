//! E-pass server configuration
//!
//! Read once at process start (after `.env` loading) and passed by reference
//! into [`AppState::new`](crate::state::AppState::new). Nothing reads the
//! environment after startup.

use std::path::PathBuf;

use shared::models::DEFAULT_EVENT_NAME;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Port for SMTP submission over implicit TLS
pub const SMTPS_PORT: u16 = 465;

/// SMTP transport settings; present only when every value is set
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl SmtpConfig {
    /// Implicit TLS on the SMTPS port, opportunistic STARTTLS everywhere else
    pub fn implicit_tls(&self) -> bool {
        self.port == SMTPS_PORT
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP listen port
    pub http_port: u16,
    /// SMTP transport; `None` disables email delivery
    pub smtp: Option<SmtpConfig>,
    /// Sender address for e-pass emails
    pub email_from: String,
    /// Registration spreadsheet
    pub sheet_path: PathBuf,
    /// Directory for payment-proof uploads
    pub upload_dir: PathBuf,
    /// Restricted/ephemeral filesystem (serverless deploys)
    pub serverless: bool,
    /// Event name used when the form leaves it blank
    pub event_name: String,
    /// Default tracing filter (RUST_LOG takes precedence)
    pub log_level: String,
    /// Directory for daily rolling log files
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let http_port = match var("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| format!("PORT must be a valid port number, got {p:?}"))?,
            None => 5000,
        };

        let smtp = match (
            var("SMTP_HOST"),
            var("SMTP_PORT"),
            var("SMTP_USER"),
            var("SMTP_PASS"),
        ) {
            (Some(host), Some(port), Some(username), Some(password)) => Some(SmtpConfig {
                host,
                port: port
                    .trim()
                    .parse()
                    .map_err(|_| format!("SMTP_PORT must be a valid port number, got {port:?}"))?,
                username,
                password,
            }),
            _ => None,
        };

        let serverless = var("SERVERLESS").is_some_and(|v| is_truthy(&v)) || var("NETLIFY").is_some();

        let upload_dir = if serverless {
            std::env::temp_dir().join("uploads")
        } else {
            var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads"))
        };

        Ok(Self {
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            http_port,
            smtp,
            email_from: var("EMAIL_FROM").unwrap_or_else(|| "noreply@isai-illam.local".into()),
            sheet_path: var("EXCEL_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./registrations.xlsx")),
            upload_dir,
            serverless,
            event_name: var("EVENT_NAME").unwrap_or_else(|| DEFAULT_EVENT_NAME.into()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: var("LOG_DIR"),
        })
    }

    /// Log which SMTP settings are present, without their values
    pub fn log_smtp_status(&self) {
        match &self.smtp {
            Some(smtp) => tracing::info!(
                host = %smtp.host,
                port = smtp.port,
                implicit_tls = smtp.implicit_tls(),
                "SMTP transport configured"
            ),
            None => tracing::warn!(
                "SMTP not configured (need SMTP_HOST, SMTP_PORT, SMTP_USER, SMTP_PASS); \
                 email sending will be skipped"
            ),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, BoxError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, "development");
        assert_eq!(config.http_port, 5000);
        assert!(config.smtp.is_none());
        assert_eq!(config.sheet_path, PathBuf::from("./registrations.xlsx"));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(!config.serverless);
        assert_eq!(config.event_name, "Isai Illam");
        assert_eq!(config.log_level, "info");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_smtp_requires_all_four_values() {
        let config = config_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "587"),
            ("SMTP_USER", "mailer"),
        ])
        .unwrap();
        assert!(config.smtp.is_none());

        let config = config_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "587"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASS", "secret"),
        ])
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 587);
        assert!(!smtp.implicit_tls());
    }

    #[test]
    fn test_port_465_uses_implicit_tls() {
        let config = config_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASS", "secret"),
        ])
        .unwrap();
        assert!(config.smtp.unwrap().implicit_tls());
    }

    #[test]
    fn test_invalid_ports_are_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(
            config_from(&[
                ("SMTP_HOST", "smtp.example.com"),
                ("SMTP_PORT", "70000"),
                ("SMTP_USER", "mailer"),
                ("SMTP_PASS", "secret"),
            ])
            .is_err()
        );
    }

    #[test]
    fn test_serverless_uses_temp_upload_dir() {
        let config = config_from(&[("SERVERLESS", "true"), ("UPLOAD_DIR", "/srv/proofs")]).unwrap();
        assert!(config.serverless);
        assert_eq!(config.upload_dir, std::env::temp_dir().join("uploads"));

        let config = config_from(&[("NETLIFY", "true")]).unwrap();
        assert!(config.serverless);

        let config = config_from(&[("SERVERLESS", "false"), ("UPLOAD_DIR", "/srv/proofs")]).unwrap();
        assert!(!config.serverless);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/proofs"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("EVENT_NAME", "  "), ("PORT", "")]).unwrap();
        assert_eq!(config.event_name, "Isai Illam");
        assert_eq!(config.http_port, 5000);
    }

    #[test]
    fn test_debug_hides_smtp_password() {
        let smtp = SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: "mailer".into(),
            password: "hunter2".into(),
        };
        let printed = format!("{smtp:?}");
        assert!(!printed.contains("hunter2"));
    }
}
