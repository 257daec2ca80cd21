use crate::error::AlerterError;
use crate::message::{EmailAlert, SignalAlert};
use configuration::EmailConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt::Display;

/// The production transport: an SMTP relay reached over STARTTLS.
pub type SmtpMailer = AsyncSmtpTransport<Tokio1Executor>;

/// Sends plain-text alert emails through any `lettre` transport.
#[derive(Clone)]
pub struct EmailAlerter<T = SmtpMailer> {
    transport: T,
    from: Mailbox,
    to: Mailbox,
}

impl EmailAlerter<SmtpMailer> {
    /// Builds an SMTP alerter that logs in as `from`.
    ///
    /// Returns `Ok(None)` when the config leaves email disabled.
    pub fn new(config: &EmailConfig) -> Result<Option<Self>, AlerterError> {
        if !config.is_enabled() {
            return Ok(None);
        }

        let transport = SmtpMailer::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.from.clone(), config.password.clone()))
            .build();

        Self::with_transport(transport, &config.from, &config.to).map(Some)
    }
}

impl<T> EmailAlerter<T>
where
    T: AsyncTransport + Sync,
    T::Error: Display,
{
    pub fn with_transport(transport: T, from: &str, to: &str) -> Result<Self, AlerterError> {
        Ok(Self {
            transport,
            from: parse_mailbox(from)?,
            to: parse_mailbox(to)?,
        })
    }

    pub fn recipient(&self) -> String {
        self.to.email.to_string()
    }

    /// Sends `alert` and returns the email that went out.
    pub async fn send(&self, alert: &SignalAlert) -> Result<EmailAlert, AlerterError> {
        let email = EmailAlert::new(self.recipient(), alert);
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AlerterError::Smtp(e.to_string()))?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email alert sent.");
        Ok(email)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, AlerterError> {
    address
        .trim()
        .parse()
        .map_err(|_| AlerterError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{SignalAction, StrategyId};
    use lettre::transport::stub::AsyncStubTransport;
    use rust_decimal_macros::dec;

    fn alert() -> SignalAlert {
        SignalAlert {
            symbol: "AAPL".to_string(),
            strategy: StrategyId::VolumeSpike,
            action: SignalAction::Buy,
            price: dec!(190),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn sends_plain_text_alert_to_the_recipient() {
        let transport = AsyncStubTransport::new_ok();
        let alerter = EmailAlerter::with_transport(transport.clone(), "bot@example.com", "desk@example.com").unwrap();

        let email = alerter.send(&alert()).await.unwrap();
        assert_eq!(email.to, "desk@example.com");
        assert_eq!(email.subject, "SignalSprint: Buy AAPL (Volume Spike)");

        let sent = transport.messages().await;
        assert_eq!(sent.len(), 1);
        let (envelope, raw) = &sent[0];
        assert_eq!(envelope.to()[0].to_string(), "desk@example.com");
        assert_eq!(envelope.from().map(|a| a.to_string()).as_deref(), Some("bot@example.com"));
        assert!(raw.contains("Subject: SignalSprint: Buy AAPL (Volume Spike)"));
        assert!(raw.contains("Buy signal triggered for AAPL at 190 on 2024-05-06"));
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let alerter =
            EmailAlerter::with_transport(AsyncStubTransport::new_error(), "bot@example.com", "desk@example.com")
                .unwrap();
        assert!(matches!(alerter.send(&alert()).await, Err(AlerterError::Smtp(_))));
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        let result = EmailAlerter::with_transport(AsyncStubTransport::new_ok(), "bot@example.com", "not an address");
        assert!(matches!(result, Err(AlerterError::InvalidAddress(_))));
    }

    #[test]
    fn disabled_config_builds_no_alerter() {
        assert!(EmailAlerter::new(&EmailConfig::default()).unwrap().is_none());
    }

    #[tokio::test]
    async fn enabled_config_builds_a_relay() {
        let config = EmailConfig {
            to: "desk@example.com".to_string(),
            from: "bot@example.com".to_string(),
            password: "app-password".to_string(),
            ..EmailConfig::default()
        };
        let alerter = EmailAlerter::new(&config).unwrap().unwrap();
        assert_eq!(alerter.recipient(), "desk@example.com");
    }
}
