use crate::error::AlerterError;
use configuration::Config;
use lettre::AsyncTransport;
use std::fmt::Display;

pub mod email;
pub mod error;
pub mod message;
pub mod telegram;

pub use email::{EmailAlerter, SmtpMailer};
pub use message::{render_signal_alert, EmailAlert, SignalAlert};
pub use telegram::TelegramAlerter;

/// Where an alert can be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDestination {
    Email { address: String },
    Telegram { bot_token: String, chat_id: String },
}

/// What happened to one alert at one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Posted to the Telegram chat.
    Telegram { chat_id: String },
    /// Accepted by the SMTP relay.
    Email(EmailAlert),
}

/// Fans alerts out to every configured destination.
#[derive(Clone)]
pub struct AlertDispatcher<T = SmtpMailer> {
    telegram: Option<TelegramAlerter>,
    email: Option<EmailAlerter<T>>,
}

impl AlertDispatcher<SmtpMailer> {
    /// Enables Telegram when both token and chat_id are set, and email when
    /// `to`, `from` and `password` are set.
    pub fn from_config(config: &Config) -> Result<Self, AlerterError> {
        Ok(Self::new(
            TelegramAlerter::new(&config.telegram),
            EmailAlerter::new(&config.email)?,
        ))
    }
}

impl<T> AlertDispatcher<T>
where
    T: AsyncTransport + Sync,
    T::Error: Display,
{
    pub fn new(telegram: Option<TelegramAlerter>, email: Option<EmailAlerter<T>>) -> Self {
        Self { telegram, email }
    }

    pub fn destinations(&self) -> Vec<AlertDestination> {
        let mut destinations = Vec::new();
        if let Some(telegram) = &self.telegram {
            destinations.push(AlertDestination::Telegram {
                bot_token: telegram.token().to_string(),
                chat_id: telegram.chat_id().to_string(),
            });
        }
        if let Some(email) = &self.email {
            destinations.push(AlertDestination::Email {
                address: email.recipient(),
            });
        }
        destinations
    }

    pub fn is_configured(&self) -> bool {
        self.telegram.is_some() || self.email.is_some()
    }

    /// Sends `alert` to every destination.
    ///
    /// A failure at one destination does not stop the others; each outcome is
    /// returned in destination order. Fails only when nothing is configured.
    pub async fn dispatch(&self, alert: &SignalAlert) -> Result<Vec<Result<Delivery, AlerterError>>, AlerterError> {
        if !self.is_configured() {
            return Err(AlerterError::NotConfigured);
        }

        let mut outcomes = Vec::new();

        if let Some(telegram) = &self.telegram {
            let outcome = telegram
                .send_message(&alert.message())
                .await
                .map(|()| Delivery::Telegram {
                    chat_id: telegram.chat_id().to_string(),
                });
            if let Err(e) = &outcome {
                tracing::error!(error = %e, symbol = %alert.symbol, "Failed to send Telegram alert.");
            }
            outcomes.push(outcome);
        }

        if let Some(email) = &self.email {
            let outcome = email.send(alert).await.map(Delivery::Email);
            if let Err(e) = &outcome {
                tracing::error!(error = %e, symbol = %alert.symbol, "Failed to send email alert.");
            }
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
