use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlerterError {
    #[error("Could not reach the Telegram Bot API: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Telegram rejected the alert: {0}")]
    Rejected(String),

    #[error("'{0}' is not a valid email address")]
    InvalidAddress(String),

    #[error("Could not build the alert email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Could not set up the SMTP relay: {0}")]
    SmtpSetup(#[from] lettre::transport::smtp::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("No alert destination is configured (Telegram token and chat_id, or email to, from and password).")]
    NotConfigured,
}
