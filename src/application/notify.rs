use tokio::sync::broadcast;

use crate::domain::events::ServerEvent;

/// Difusor de eventos hacia los clientes del canal en tiempo real.
/// Cada conexión WebSocket se suscribe y recibe su propia copia.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<ServerEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self { tx }
    }

    /// Publica un evento. Sin suscriptores el envío se descarta.
    pub fn emit(&self, event: ServerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.emit(ServerEvent::Error {
            message: "boom".into(),
        });

        match rx.recv().await.unwrap() {
            ServerEvent::Error { message } => assert_eq!(message, "boom"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn emit_without_subscribers_is_a_noop() {
        let notifier = Notifier::new();
        notifier.emit(ServerEvent::Error {
            message: "nobody listening".into(),
        });
    }
}
