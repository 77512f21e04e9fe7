// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport registry: one transport per channel, selected once by kind.

use std::collections::HashMap;
use std::sync::Arc;

use dailyq_core::error::DailyqError;
use dailyq_core::traits::ChannelTransport;
use dailyq_core::types::ChannelKind;

/// Maps each channel kind to its transport.
///
/// Populated once at startup from the configured channels; dispatch code
/// resolves transports here and then works purely against the
/// [`ChannelTransport`] trait.
#[derive(Default)]
pub struct TransportRegistry {
    transports: HashMap<ChannelKind, Arc<dyn ChannelTransport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transport under its own kind, replacing any previous one.
    pub fn register(&mut self, transport: Arc<dyn ChannelTransport>) {
        self.transports.insert(transport.kind(), transport);
    }

    /// Resolve the transport for a channel.
    pub fn get(&self, kind: ChannelKind) -> Result<Arc<dyn ChannelTransport>, DailyqError> {
        self.transports
            .get(&kind)
            .cloned()
            .ok_or(DailyqError::TransportNotFound { kind })
    }

    pub fn contains(&self, kind: ChannelKind) -> bool {
        self.transports.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// The registered channel kinds, for startup logging.
    pub fn kinds(&self) -> Vec<ChannelKind> {
        self.transports.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyq_test_utils::MockTransport;

    #[test]
    fn register_and_resolve_by_kind() {
        let mut registry = TransportRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(MockTransport::telegram_like()));
        registry.register(Arc::new(MockTransport::whatsapp_like()));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ChannelKind::Telegram));
        assert!(registry.get(ChannelKind::WhatsApp).is_ok());
        assert!(matches!(
            registry.get(ChannelKind::WebPush),
            Err(DailyqError::TransportNotFound {
                kind: ChannelKind::WebPush
            })
        ));
    }
}
