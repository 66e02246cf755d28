//! Anonymous forwarding.
//!
//! A sender opens a session by presenting someone's access code; the relay
//! remembers the code as that sender's pending intent and forwards exactly
//! one later message to the code's owner. Intents live in memory only and
//! are consumed by the forward attempt whatever its outcome, so a delivery
//! can never happen twice.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    domain::{AccessCode, UserId},
    outbound::SendPort,
    registry::LinkRegistry,
};

/// Outcome of presenting a code to open a send session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStart {
    /// Code resolved; the sender may now compose one message.
    Accepted,
    /// Code never existed or was rotated away. Nothing was recorded.
    Rejected,
}

/// Outcome of a forward attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The owner's chat accepted the message.
    Delivered,
    /// The intent's code stopped resolving between session start and now,
    /// which is what a rotation in the interim looks like.
    StaleLink,
    /// The transport could not reach the owner. No retry is made.
    DeliveryFailed,
    /// The sender has no open session, either because they never presented a
    /// valid code or because their one message was already spent.
    NoPendingIntent,
    /// Blank or command-like text. Nothing was sent and the intent stands.
    Skipped,
}

/// One-way anonymous relay between strangers and link owners.
pub struct MessageRelay {
    registry: Arc<LinkRegistry>,
    outbound: Arc<dyn SendPort>,
    pending: Mutex<HashMap<UserId, AccessCode>>,
}

impl MessageRelay {
    pub fn new(registry: Arc<LinkRegistry>, outbound: Arc<dyn SendPort>) -> Self {
        Self {
            registry,
            outbound,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Open a send session: validate the code and remember it for `sender`.
    ///
    /// A later valid code overwrites an earlier one, so a sender can hop
    /// between links and their next message goes to the newest target. An
    /// invalid code records nothing at all.
    pub async fn begin_session(&self, sender: UserId, code: AccessCode) -> SessionStart {
        if self.registry.resolve(&code).await.is_none() {
            return SessionStart::Rejected;
        }
        self.pending.lock().await.insert(sender, code);
        SessionStart::Accepted
    }

    /// Forward one message from `sender` to the owner of their pending code.
    ///
    /// The code is re-resolved here rather than trusted from session start,
    /// so a rotation in the interim turns the intent stale instead of
    /// leaking a message to a revoked link. Delivery is at most once: the
    /// intent is gone after this call even if the transport failed.
    pub async fn forward(&self, sender: UserId, text: &str) -> ForwardOutcome {
        let code = {
            let mut pending = self.pending.lock().await;
            let Some(code) = pending.get(&sender).cloned() else {
                return ForwardOutcome::NoPendingIntent;
            };
            if !is_forwardable(text) {
                return ForwardOutcome::Skipped;
            }
            pending.remove(&sender);
            code
        };

        let Some(owner) = self.registry.resolve(&code).await else {
            return ForwardOutcome::StaleLink;
        };

        match self
            .outbound
            .send_text(owner.private_chat(), &anonymous_envelope(text))
            .await
        {
            Ok(()) => ForwardOutcome::Delivered,
            Err(e) => {
                eprintln!("[RELAY] delivery to {} failed: {e}", owner.0);
                ForwardOutcome::DeliveryFailed
            }
        }
    }
}

/// Text worth forwarding: non-blank and not something that looks like a
/// command aimed at the bot itself.
fn is_forwardable(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !trimmed.starts_with('/')
}

/// What the owner sees. The fixed header is the only hint about provenance;
/// the sender's identity is nowhere in the payload.
fn anonymous_envelope(text: &str) -> String {
    format!("📨 Anonymous message:\n\n{text}")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::domain::ChatId;
    use crate::errors::Error;

    #[derive(Default)]
    struct FakeSendPort {
        unreachable: AtomicBool,
        sent: Mutex<Vec<(ChatId, String)>>,
    }

    impl FakeSendPort {
        fn sent(&self) -> Vec<(ChatId, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl SendPort for FakeSendPort {
        async fn send_text(&self, chat_id: ChatId, text: &str) -> crate::Result<()> {
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(Error::External("recipient unreachable".to_string()));
            }
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    fn setup() -> (Arc<LinkRegistry>, Arc<FakeSendPort>, MessageRelay) {
        let registry = Arc::new(LinkRegistry::in_memory());
        let port = Arc::new(FakeSendPort::default());
        let relay = MessageRelay::new(registry.clone(), port.clone());
        (registry, port, relay)
    }

    #[tokio::test]
    async fn accepted_session_delivers_one_enveloped_message() {
        let (registry, port, relay) = setup();
        let code = registry.get_or_create(UserId(1)).await.code;

        assert_eq!(
            relay.begin_session(UserId(2), code).await,
            SessionStart::Accepted
        );
        assert_eq!(
            relay.forward(UserId(2), "hello there").await,
            ForwardOutcome::Delivered
        );

        let sent = port.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChatId(1));
        assert!(sent[0].1.starts_with("📨 Anonymous message:"));
        assert!(sent[0].1.ends_with("hello there"));
    }

    #[tokio::test]
    async fn unknown_code_is_rejected_and_records_nothing() {
        let (_registry, port, relay) = setup();
        assert_eq!(
            relay
                .begin_session(UserId(2), AccessCode("ghost".to_string()))
                .await,
            SessionStart::Rejected
        );
        assert_eq!(
            relay.forward(UserId(2), "hello").await,
            ForwardOutcome::NoPendingIntent
        );
        assert!(port.sent().is_empty());
    }

    #[tokio::test]
    async fn rotation_turns_an_open_session_stale() {
        let (registry, port, relay) = setup();
        let code = registry.get_or_create(UserId(1)).await.code;
        relay.begin_session(UserId(2), code).await;

        registry.rotate(UserId(1)).await;

        assert_eq!(relay.forward(UserId(2), "hi").await, ForwardOutcome::StaleLink);
        assert!(port.sent().is_empty());
    }

    #[tokio::test]
    async fn forward_without_a_session_reports_no_intent() {
        let (_registry, port, relay) = setup();
        assert_eq!(
            relay.forward(UserId(3), "hi").await,
            ForwardOutcome::NoPendingIntent
        );
        assert!(port.sent().is_empty());
    }

    #[tokio::test]
    async fn unreachable_owner_maps_to_delivery_failed() {
        let (registry, port, relay) = setup();
        let code = registry.get_or_create(UserId(1)).await.code;
        relay.begin_session(UserId(2), code).await;

        port.unreachable.store(true, Ordering::SeqCst);
        assert_eq!(
            relay.forward(UserId(2), "hi").await,
            ForwardOutcome::DeliveryFailed
        );
    }

    #[tokio::test]
    async fn blank_and_command_text_skip_without_consuming_the_intent() {
        let (registry, port, relay) = setup();
        let code = registry.get_or_create(UserId(1)).await.code;
        relay.begin_session(UserId(2), code).await;

        assert_eq!(
            relay.forward(UserId(2), "/start").await,
            ForwardOutcome::Skipped
        );
        assert_eq!(
            relay.forward(UserId(2), "   ").await,
            ForwardOutcome::Skipped
        );
        assert_eq!(
            relay.forward(UserId(2), "still here").await,
            ForwardOutcome::Delivered
        );
        assert_eq!(port.sent().len(), 1);
    }

    #[tokio::test]
    async fn intent_is_single_use() {
        let (registry, port, relay) = setup();
        let code = registry.get_or_create(UserId(1)).await.code;
        relay.begin_session(UserId(2), code).await;

        assert_eq!(relay.forward(UserId(2), "one").await, ForwardOutcome::Delivered);
        assert_eq!(
            relay.forward(UserId(2), "two").await,
            ForwardOutcome::NoPendingIntent
        );
        assert_eq!(port.sent().len(), 1);
    }

    #[tokio::test]
    async fn intent_is_consumed_even_when_delivery_fails() {
        let (registry, port, relay) = setup();
        let code = registry.get_or_create(UserId(1)).await.code;
        relay.begin_session(UserId(2), code).await;

        port.unreachable.store(true, Ordering::SeqCst);
        assert_eq!(
            relay.forward(UserId(2), "hi").await,
            ForwardOutcome::DeliveryFailed
        );

        port.unreachable.store(false, Ordering::SeqCst);
        assert_eq!(
            relay.forward(UserId(2), "hi").await,
            ForwardOutcome::NoPendingIntent
        );
        assert!(port.sent().is_empty());
    }

    #[tokio::test]
    async fn a_later_session_overwrites_the_earlier_one() {
        let (registry, port, relay) = setup();
        let first = registry.get_or_create(UserId(1)).await.code;
        let second = registry.get_or_create(UserId(5)).await.code;

        relay.begin_session(UserId(2), first).await;
        relay.begin_session(UserId(2), second).await;

        assert_eq!(
            relay.forward(UserId(2), "hello").await,
            ForwardOutcome::Delivered
        );
        let sent = port.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChatId(5));
    }

    #[tokio::test]
    async fn sessions_from_different_senders_stay_independent() {
        let (registry, port, relay) = setup();
        let code = registry.get_or_create(UserId(1)).await.code;

        relay.begin_session(UserId(2), code.clone()).await;
        relay.begin_session(UserId(3), code).await;

        assert_eq!(relay.forward(UserId(2), "from two").await, ForwardOutcome::Delivered);
        assert_eq!(relay.forward(UserId(3), "from three").await, ForwardOutcome::Delivered);
        assert_eq!(port.sent().len(), 2);
    }
}
