//! Host Bridge
//!
//! The page-level effects a session cannot perform itself. The engine only
//! calls out through [`HostBridge`]; it never inspects or retries the
//! outcome.

use std::sync::Arc;
use tokio::sync::mpsc;

/// Effect requested by a finished scheduled step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEffect {
    /// Boot script finished
    BootComplete,
    /// Swap the mounted top-level screen
    ScreenTransition,
    /// Leave the page for an external URL
    Navigate(String),
}

/// Callbacks provided by the enclosing application
///
/// Callbacks run while the session state is locked, so they must return
/// quickly and must not call back into the session.
pub trait HostBridge: Send + Sync {
    /// Called once when the boot script completes
    fn on_boot_complete(&self) {}

    /// Called when a "start" style command hands off control
    fn on_screen_transition(&self);

    /// Called at the end of a redirect sequence
    fn on_external_navigate(&self, url: &str);
}

/// Route an effect to the matching callback
pub fn deliver(bridge: &dyn HostBridge, effect: &HostEffect) {
    match effect {
        HostEffect::BootComplete => {
            debug!("Host bridge: boot complete");
            bridge.on_boot_complete();
        }
        HostEffect::ScreenTransition => {
            info!("Host bridge: screen transition");
            bridge.on_screen_transition();
        }
        HostEffect::Navigate(url) => {
            info!("Host bridge: navigate to {}", url);
            bridge.on_external_navigate(url);
        }
    }
}

/// Bridge that ignores every effect
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBridge;

impl HostBridge for NoopBridge {
    fn on_screen_transition(&self) {}

    fn on_external_navigate(&self, _url: &str) {}
}

/// Event forwarded by [`ChannelBridge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    BootComplete,
    ScreenTransition,
    Navigate(String),
}

/// Bridge that forwards effects to the host's event loop
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    tx: mpsc::UnboundedSender<BridgeEvent>,
}

impl ChannelBridge {
    /// Create a bridge and the receiver the host polls
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<BridgeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }

    fn forward(&self, event: BridgeEvent) {
        // A closed receiver means the host is gone; nothing to do.
        if self.tx.send(event).is_err() {
            debug!("Host bridge receiver dropped, event discarded");
        }
    }
}

impl HostBridge for ChannelBridge {
    fn on_boot_complete(&self) {
        self.forward(BridgeEvent::BootComplete);
    }

    fn on_screen_transition(&self) {
        self.forward(BridgeEvent::ScreenTransition);
    }

    fn on_external_navigate(&self, url: &str) {
        self.forward(BridgeEvent::Navigate(url.to_string()));
    }
}
