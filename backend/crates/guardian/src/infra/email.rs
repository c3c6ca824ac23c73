//! SMTP Mailer
//!
//! Delivers verification-code emails through an SMTP relay (STARTTLS).

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::repository::{CodeEmail, VerificationMailer};
use crate::domain::value_objects::Locale;
use crate::error::{GuardianError, GuardianResult};

/// SMTP relay configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_address: "Vibe Check <no-reply@vibecheck.app>".to_string(),
        }
    }
}

/// SMTP-backed verification mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: MailerConfig) -> GuardianResult<Self> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| GuardianError::Internal(format!("invalid sender address: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| GuardianError::Internal(format!("SMTP relay setup failed: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { transport, from })
    }
}

impl VerificationMailer for SmtpMailer {
    async fn send_code(&self, email: &CodeEmail) -> GuardianResult<()> {
        let to = email
            .to
            .as_str()
            .parse::<Mailbox>()
            .map_err(|e| GuardianError::EmailDispatch(format!("invalid recipient: {e}")))?;

        let minutes = (email.valid_for.as_secs() / 60).max(1);
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject(email.locale))
            .body(body(
                email.locale,
                email.child_name.as_deref(),
                email.code.as_str(),
                minutes,
            ))
            .map_err(|e| GuardianError::EmailDispatch(format!("message build failed: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| GuardianError::EmailDispatch(e.to_string()))?;

        tracing::info!(domain = email.to.domain(), "Guardian verification email sent");

        Ok(())
    }
}

fn subject(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Your Vibe Check guardian verification code",
        Locale::Es => "Tu código de verificación de tutor de Vibe Check",
        Locale::Ja => "Vibe Check 保護者確認コード",
    }
}

fn body(locale: Locale, child_name: Option<&str>, code: &str, minutes: u64) -> String {
    match locale {
        Locale::En => {
            let who = child_name.unwrap_or("A Vibe Check user");
            format!(
                "{who} has asked you to confirm that you are their guardian.\n\n\
                 Your verification code is: {code}\n\n\
                 The code is valid for {minutes} minutes.\n\n\
                 If you weren't expecting this email, you can safely ignore it."
            )
        }
        Locale::Es => {
            let who = child_name.unwrap_or("Una persona usuaria de Vibe Check");
            format!(
                "{who} te ha pedido confirmar que eres su tutor o tutora.\n\n\
                 Tu código de verificación es: {code}\n\n\
                 El código es válido durante {minutes} minutos.\n\n\
                 Si no esperabas este correo, puedes ignorarlo."
            )
        }
        Locale::Ja => {
            let who = child_name.unwrap_or("Vibe Check のユーザー");
            format!(
                "{who}さんがあなたを保護者として確認するよう依頼しました。\n\n\
                 確認コード: {code}\n\n\
                 このコードの有効期限は{minutes}分です。\n\n\
                 心当たりがない場合は、このメールを無視してください。"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_contains_code_and_validity() {
        for locale in [Locale::En, Locale::Es, Locale::Ja] {
            let text = body(locale, Some("Sam"), "482913", 15);
            assert!(text.contains("482913"));
            assert!(text.contains("15"));
            assert!(text.contains("Sam"));
        }
    }

    #[test]
    fn test_body_name_fallback() {
        let text = body(Locale::En, None, "482913", 15);
        assert!(text.contains("A Vibe Check user"));
    }

    #[test]
    fn test_subject_per_locale() {
        assert!(subject(Locale::En).contains("verification code"));
        assert!(subject(Locale::Es).contains("código"));
        assert!(subject(Locale::Ja).contains("コード"));
    }
}
