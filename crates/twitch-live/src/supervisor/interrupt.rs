use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

/// Something that can ask a running download to stop.
///
/// `interrupted` resolves once per interruption and may be awaited again
/// afterwards. It must be cancel safe: the supervisor drops the future
/// whenever the child exits first.
#[async_trait]
pub trait InterruptSource: Send {
    async fn interrupted(&mut self);
}

/// Ctrl-C / SIGINT delivered to this process.
#[derive(Debug, Default, Clone, Copy)]
pub struct CtrlC;

#[async_trait]
impl InterruptSource for CtrlC {
    async fn interrupted(&mut self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c, interrupts are disabled");
            std::future::pending::<()>().await;
        }
    }
}

/// Programmatic interrupts. A closed channel never fires.
#[async_trait]
impl InterruptSource for mpsc::UnboundedReceiver<()> {
    async fn interrupted(&mut self) {
        if self.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}
