// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as paired credentials and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::DailyqConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DailyqConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    if config.broadcast.send_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "broadcast.send_timeout_secs must be at least 1".to_string(),
        });
    }

    // WhatsApp sends require both halves of the credential pair.
    if config.whatsapp.access_token.is_some() && config.whatsapp.phone_number_id.is_none() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.phone_number_id is required when whatsapp.access_token is set"
                .to_string(),
        });
    }

    if config.whatsapp.start_template.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.start_template must not be empty".to_string(),
        });
    }

    // VAPID keys only work as a pair, and signed pushes need a contact claim.
    let vapid_public = config.webpush.vapid_public_key.is_some();
    let vapid_private = config.webpush.vapid_private_key.is_some();
    if vapid_public != vapid_private {
        errors.push(ConfigError::Validation {
            message:
                "webpush.vapid_public_key and webpush.vapid_private_key must be set together"
                    .to_string(),
        });
    }
    if vapid_private && config.webpush.contact.is_none() {
        errors.push(ConfigError::Validation {
            message: "webpush.contact is required when VAPID keys are configured".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = DailyqConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = DailyqConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn whatsapp_token_without_phone_id_fails() {
        let mut config = DailyqConfig::default();
        config.whatsapp.access_token = Some("token".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("phone_number_id"))));
    }

    #[test]
    fn lone_vapid_key_fails() {
        let mut config = DailyqConfig::default();
        config.webpush.vapid_public_key = Some("pub".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("vapid"))));
    }

    #[test]
    fn vapid_pair_without_contact_fails() {
        let mut config = DailyqConfig::default();
        config.webpush.vapid_public_key = Some("pub".to_string());
        config.webpush.vapid_private_key = Some("priv".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("contact"))));
    }

    #[test]
    fn fully_configured_channels_pass() {
        let mut config = DailyqConfig::default();
        config.telegram.bot_token = Some("123:abc".to_string());
        config.whatsapp.access_token = Some("token".to_string());
        config.whatsapp.phone_number_id = Some("15550000000".to_string());
        config.webpush.vapid_public_key = Some("pub".to_string());
        config.webpush.vapid_private_key = Some("priv".to_string());
        config.webpush.contact = Some("ops@example.org".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_send_timeout_fails() {
        let mut config = DailyqConfig::default();
        config.broadcast.send_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("send_timeout_secs"))));
    }
}
