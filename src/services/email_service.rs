use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

use crate::config::SmtpConfig;
use crate::error::AppError;

/// Envoi des emails de vérification
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(
        &self,
        to_email: &str,
        username: &str,
        verification_link: &str,
    ) -> Result<(), AppError>;
}

pub fn verification_body(username: &str, verification_link: &str) -> String {
    format!(
        "Hi {},\n\nPlease verify your email by clicking the link below:\n{}\n\nThanks!",
        username, verification_link
    )
}

pub fn verification_link(frontend_base_url: &str, token: &str) -> String {
    format!("{}/verify-email?token={}", frontend_base_url, token)
}

/// SMTP avec STARTTLS (ex: smtp.gmail.com:587)
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::internal(format!("Invalid SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_email(
        &self,
        to_email: &str,
        username: &str,
        verification_link: &str,
    ) -> Result<(), AppError> {
        let message = Message::builder()
            .from(self.from.parse().map_err(|e| {
                AppError::internal(format!("Invalid sender address: {}", e))
            })?)
            .to(to_email
                .parse()
                .map_err(|_| AppError::bad_request("Invalid email address."))?)
            .subject("Verify your email")
            .header(ContentType::TEXT_PLAIN)
            .body(verification_body(username, verification_link))
            .map_err(|e| AppError::internal(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::internal(format!("Failed to send email: {}", e)))?;

        info!(to = %to_email, "Verification email sent");
        Ok(())
    }
}

/// Utilisé quand SMTP n'est pas configuré (dev) : le lien est seulement loggé
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_email(
        &self,
        to_email: &str,
        username: &str,
        verification_link: &str,
    ) -> Result<(), AppError> {
        warn!(
            to = %to_email,
            username = %username,
            link = %verification_link,
            "SMTP not configured, verification email not sent"
        );
        Ok(())
    }
}
