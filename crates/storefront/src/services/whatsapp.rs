//! WhatsApp order hand-off via `wa.me` deep links.

use async_trait::async_trait;
use tracing::info;

use simea_core::checkout::OrderHandoff;

const WA_ME_BASE: &str = "https://wa.me";

/// Hands orders off to the store's WhatsApp number.
///
/// The shopper's client opens the returned link; the server sends nothing.
#[derive(Debug, Clone)]
pub struct WhatsAppHandoff {
    number: String,
}

impl WhatsAppHandoff {
    /// Create a hand-off for `number`. Anything but digits is dropped, since
    /// `wa.me` only accepts the bare international number.
    #[must_use]
    pub fn new(number: &str) -> Self {
        Self {
            number: number.chars().filter(char::is_ascii_digit).collect(),
        }
    }

    /// Deep link carrying an already percent-encoded message.
    #[must_use]
    pub fn link(&self, encoded_message: &str) -> String {
        format!("{WA_ME_BASE}/{}?text={encoded_message}", self.number)
    }
}

#[async_trait]
impl OrderHandoff for WhatsAppHandoff {
    async fn hand_off(&self, encoded_message: &str) -> String {
        info!(number = %self.number, "Order handed off to WhatsApp");
        self.link(encoded_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_strips_formatting() {
        let handoff = WhatsAppHandoff::new("+54 9 379 400-0000");
        assert_eq!(
            handoff.link("hola%20mundo"),
            "https://wa.me/5493794000000?text=hola%20mundo"
        );
    }

    #[tokio::test]
    async fn test_hand_off_returns_link() {
        let handoff = WhatsAppHandoff::new("5493794000000");
        let link = handoff.hand_off("%F0%9F%9B%8D").await;
        assert_eq!(link, "https://wa.me/5493794000000?text=%F0%9F%9B%8D");
    }
}
