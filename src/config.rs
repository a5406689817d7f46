use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// None when SMTP env vars are absent; mail is logged instead of sent.
    pub smtp: Option<SmtpConfig>,
    /// Base URL embedded in verification links sent to users.
    pub client_url: String,
    pub verification_ttl_hours: i64,
    pub restore_window_days: i64,
    pub email_timeout_secs: u64,
    /// APP_ENV=development includes internal error detail in responses.
    pub expose_internal_errors: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "booklist".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "booklist-users".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };

        let smtp = match (std::env::var("SMTP_HOST"), std::env::var("SMTP_USERNAME")) {
            (Ok(host), Ok(username)) => Some(SmtpConfig {
                host,
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse::<u16>().ok())
                    .unwrap_or(587),
                username,
                password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
                from_name: std::env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Booklist".into()),
                from_address: std::env::var("EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| "no-reply@booklist.local".into()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt,
            smtp,
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            verification_ttl_hours: std::env::var("VERIFICATION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
            restore_window_days: std::env::var("RESTORE_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
            email_timeout_secs: std::env::var("EMAIL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
            expose_internal_errors: std::env::var("APP_ENV")
                .map(|v| v == "development")
                .unwrap_or(false),
        })
    }
}
