//! Navigation requests emitted by the core.

use tokio::sync::mpsc;

/// Route of the login entry point.
pub const LOGIN_ROUTE: &str = "/login";

/// Receives navigation requests.
///
/// The core only ever asks for [`LOGIN_ROUTE`], after tearing down an
/// expired session. Routing itself belongs to the host.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Forwards routes over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    /// Creates a navigator and the receiver the host listens on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: &str) {
        if self.tx.send(route.to_string()).is_err() {
            log::warn!("Navigation to {} dropped: receiver closed", route);
        }
    }
}

/// Navigator that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: &str) {
        log::debug!("Navigation requested: {}", route);
    }
}
