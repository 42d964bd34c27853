//! Now-playing event loop
//!
//! Ties the pairing coordinator, renderer and output sink together on a single
//! task. The debounce timer is one pinned `Sleep` re-armed to the coordinator's
//! deadline, so arming always replaces the previous timer.

use std::future::Future;
use tokio::time::{sleep_until, Instant};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::metadata::{DisplayPair, MetadataEvent};
use crate::pairing::PairingCoordinator;
use crate::render::Renderer;
use crate::sink::{FrameSink, OutputSink};

pub struct NowPlaying {
    coordinator: PairingCoordinator,
    renderer: Renderer,
    sink: OutputSink,
}

impl NowPlaying {
    /// The sink is expected to be open already
    pub fn new(coordinator: PairingCoordinator, renderer: Renderer, sink: OutputSink) -> Self {
        Self {
            coordinator,
            renderer,
            sink,
        }
    }

    pub fn coordinator(&self) -> &PairingCoordinator {
        &self.coordinator
    }

    /// Process events until `shutdown` resolves, then drop pending state and close the sink
    ///
    /// Source errors are logged and skipped. When the source ends the loop keeps
    /// running (a pending partial pair still times out) until shutdown.
    pub async fn run<S, E>(&mut self, mut events: S, shutdown: impl Future<Output = ()>)
    where
        S: Stream<Item = Result<MetadataEvent, E>> + Unpin,
        E: std::fmt::Display,
    {
        info!(
            "Waiting for metadata (debounce {} ms)...",
            self.coordinator.window().as_millis()
        );

        let mut source_open = true;

        let timer = sleep_until(Instant::now());
        tokio::pin!(timer);
        tokio::pin!(shutdown);

        loop {
            let armed = self.coordinator.deadline();
            if let Some(deadline) = armed {
                if timer.deadline() != deadline {
                    timer.as_mut().reset(deadline);
                }
            }

            tokio::select! {
                item = events.next(), if source_open => match item {
                    Some(Ok(event)) => self.on_event(event),
                    Some(Err(e)) => warn!("Metadata source error: {}", e),
                    None => {
                        info!("Metadata source completed, idling until shutdown");
                        source_open = false;
                    }
                },

                _ = &mut timer, if armed.is_some() => {
                    if let Some(pair) = self.coordinator.on_timer(Instant::now()) {
                        self.present(pair);
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping event loop");
                    break;
                }
            }
        }

        self.shutdown();
    }

    /// Handle one event from the source
    pub fn on_event(&mut self, event: MetadataEvent) {
        match self.coordinator.handle_event(event, Instant::now()) {
            Ok(Some(pair)) => self.present(pair),
            Ok(None) => {}
            Err(e) => warn!("Ignoring metadata event: {}", e),
        }
    }

    /// Render `pair` and push the frame to the sink
    ///
    /// A failed write invalidates the renderer so the same pair is drawn again
    /// next time instead of being treated as already shown.
    pub fn present(&mut self, pair: DisplayPair) {
        info!("Received metadata: {}", pair);

        let Some(frame) = self.renderer.render(&pair) else {
            return;
        };

        match self.sink.write(&frame, &pair) {
            Ok(()) => debug!("Display updated"),
            Err(e) => {
                error!("Failed to update display: {}", e);
                self.renderer.invalidate();
            }
        }
    }

    fn shutdown(&mut self) {
        info!("Shutting down...");
        self.coordinator.clear();
        self.sink.close();
    }
}
