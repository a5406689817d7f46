use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::SmtpConfig;
use crate::state::AppState;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: String) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .context("smtp relay")?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.port)
            .pool_config(PoolConfig::new().max_size(4))
            .build();

        Ok(Self {
            transport,
            from: format!("\"{}\" <{}>", config.from_name, config.from_address),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: String) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.parse().context("invalid from address")?)
            .to(to.parse().context("invalid to address")?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .context("build email")?;

        self.transport.send(email).await.context("smtp send")?;
        Ok(())
    }
}

/// Fallback used when SMTP is unconfigured; also the test mailer.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: String) -> anyhow::Result<()> {
        info!(%to, %subject, "mail suppressed (no SMTP transport)");
        Ok(())
    }
}

pub fn verification_email_body(username: &str, client_url: &str, token: &str) -> String {
    let verification_url = format!("{}/verify-email?token={}", client_url, token);
    format!(
        "Welcome to Booklist, {username}!\n\
        \n\
        Thank you for registering. Please verify your email address to get started.\n\
        \n\
        Open this link to verify your email address:\n\
        \n\
        {verification_url}\n\
        \n\
        This link will expire in 24 hours.\n\
        \n\
        If you did not create an account, please ignore this email.\n\
        \n\
        Best regards,\n\
        The Booklist Team",
    )
}

pub fn account_deactivated_body(username: &str) -> String {
    format!(
        "Goodbye, {username}!\n\
        \n\
        Your account has been deactivated as requested.\n\
        \n\
        If this was a mistake, you have 30 days to recover your account.\n\
        After 30 days the account can no longer be restored.\n\
        \n\
        Best regards,\n\
        The Booklist Team",
    )
}

/// Fire-and-forget dispatch. The lifecycle transition has already committed
/// when this runs; a slow or failing relay must never surface to the client.
pub fn dispatch(state: &AppState, to: String, subject: &'static str, body: String) {
    let mailer = state.mailer.clone();
    let timeout = Duration::from_secs(state.config.email_timeout_secs);
    tokio::spawn(async move {
        match tokio::time::timeout(timeout, mailer.send(&to, subject, body)).await {
            Ok(Ok(())) => info!(%to, %subject, "email dispatched"),
            Ok(Err(e)) => warn!(%to, %subject, error = %e, "email dispatch failed"),
            Err(_) => warn!(%to, %subject, "email dispatch timed out"),
        }
    });
}

pub fn dispatch_verification(state: &AppState, to: &str, username: &str, token: &str) {
    let body = verification_email_body(username, &state.config.client_url, token);
    dispatch(state, to.to_string(), "Verify Your Email Address", body);
}

pub fn dispatch_account_deactivated(state: &AppState, to: &str, username: &str) {
    let body = account_deactivated_body(username);
    dispatch(
        state,
        to.to_string(),
        "Your Account Has Been Deactivated",
        body,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_contains_link_and_token() {
        let body = verification_email_body("alice", "https://books.example", "deadbeef");
        assert!(body.contains("alice"));
        assert!(body.contains("https://books.example/verify-email?token=deadbeef"));
        assert!(body.contains("expire in 24 hours"));
    }

    #[test]
    fn deactivation_email_mentions_restore_window() {
        let body = account_deactivated_body("alice");
        assert!(body.contains("alice"));
        assert!(body.contains("30 days"));
    }
}
