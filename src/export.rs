//! Export controller: drives capture and submission, one attempt at a
//! time.
//!
//! The phase variant is the single source of truth for the export
//! control: a trigger is accepted only from a settled phase, and every
//! attempt ends in `Done` or `Failed` with the control re-enabled.

use crate::bridge::HostBridge;
use crate::capture::{capture, CaptureOptions};
use crate::card::VisualTree;
use crate::error::{CardError, CardResult};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Progress of the current or most recent export attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPhase {
    Idle,
    Capturing,
    Submitting,
    Done { artifact_size: usize },
    Failed { reason: CardError },
}

impl ExportPhase {
    /// True while an attempt holds the pipeline
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ExportPhase::Capturing | ExportPhase::Submitting)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportPhase::Idle => "idle",
            ExportPhase::Capturing => "capturing",
            ExportPhase::Submitting => "submitting",
            ExportPhase::Done { .. } => "done",
            ExportPhase::Failed { .. } => "failed",
        }
    }
}

/// Serializes export attempts and records their outcome.
pub struct ExportController {
    phase: Mutex<ExportPhase>,
}

impl ExportController {
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(ExportPhase::Idle),
        }
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase.lock().unwrap().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.phase.lock().unwrap().is_in_flight()
    }

    /// Run one export attempt end to end.
    ///
    /// Rejects synchronously, without touching the phase, when an
    /// attempt is already in flight, the bridge is not ready, or there
    /// is no rendered card. A successful attempt performs exactly one
    /// document mutation; a failed one performs none and leaves the
    /// control re-enabled.
    pub async fn export(
        &self,
        bridge: &HostBridge,
        region: Option<&VisualTree>,
        options: &CaptureOptions,
    ) -> CardResult<usize> {
        let (tree, capability) = {
            let mut phase = self.phase.lock().unwrap();
            if phase.is_in_flight() {
                return Err(CardError::ExportBusy {
                    phase: phase.name().to_owned(),
                });
            }
            if !bridge.is_ready() {
                return Err(CardError::ExportNotReady);
            }
            let Some(tree) = region else {
                return Err(CardError::ExportNoRegion);
            };
            let capability = bridge.capability().ok_or(CardError::ExportNotReady)?;
            *phase = ExportPhase::Capturing;
            (tree, capability)
        };

        debug!("export attempt started");
        let artifact = match capture(tree, options).await {
            Ok(artifact) => artifact,
            Err(error) => {
                warn!(%error, "capture failed");
                *self.phase.lock().unwrap() = ExportPhase::Failed {
                    reason: error.clone(),
                };
                return Err(error);
            }
        };

        *self.phase.lock().unwrap() = ExportPhase::Submitting;
        let artifact_size = artifact.len();
        debug!(bytes = artifact_size, "submitting artifact");
        match capability.add_image(artifact.png).await {
            Ok(()) => {
                info!(bytes = artifact_size, "export finished");
                *self.phase.lock().unwrap() = ExportPhase::Done { artifact_size };
                Ok(artifact_size)
            }
            Err(error) => {
                warn!(%error, "submission failed");
                *self.phase.lock().unwrap() = ExportPhase::Failed {
                    reason: error.clone(),
                };
                Err(error)
            }
        }
    }
}

impl Default for ExportController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeState, CapabilityRequest, DocumentRequest, HostCapability, HostHandshake};
    use crate::render::CardRenderer;
    use crate::state::ViewState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{mpsc, oneshot};

    /// Ready bridge whose host counts every document mutation
    async fn counting_bridge() -> (HostBridge, Arc<AtomicUsize>) {
        let mutations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&mutations);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (cap_tx, mut cap_rx) = mpsc::channel::<CapabilityRequest>(1);
        tokio::spawn(async move {
            let (doc_tx, mut doc_rx) = mpsc::channel(8);
            while let Some(reply) = cap_rx.recv().await {
                let _ = reply.send(Ok(HostCapability::new(doc_tx.clone())));
            }
            while let Some(DocumentRequest::AddImage { done, .. }) = doc_rx.recv().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = done.send(Ok(()));
            }
        });
        let _ = ready_tx.send(Ok(()));
        let bridge = HostBridge::new();
        let state = bridge
            .connect(HostHandshake {
                ready: ready_rx,
                capability: cap_tx,
            })
            .await;
        assert_eq!(state, BridgeState::Ready);
        (bridge, mutations)
    }

    async fn standalone_bridge() -> HostBridge {
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), String>>();
        let (cap_tx, _cap_rx) = mpsc::channel(1);
        let bridge = HostBridge::with_timeout_ms(10);
        bridge
            .connect(HostHandshake {
                ready: ready_rx,
                capability: cap_tx,
            })
            .await;
        drop(ready_tx);
        bridge
    }

    fn rendered_tree() -> VisualTree {
        CardRenderer::new().render(&ViewState::default())
    }

    #[tokio::test]
    async fn test_happy_path_reaches_done() {
        let (bridge, mutations) = counting_bridge().await;
        let controller = ExportController::new();
        let tree = rendered_tree();

        let size = controller
            .export(&bridge, Some(&tree), &CaptureOptions::default())
            .await
            .unwrap();
        assert!(size > 0);
        assert_eq!(
            controller.phase(),
            ExportPhase::Done {
                artifact_size: size
            }
        );
        assert_eq!(mutations.load(Ordering::SeqCst), 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_rejects_when_bridge_is_standalone() {
        let bridge = standalone_bridge().await;
        let controller = ExportController::new();
        let tree = rendered_tree();

        let result = controller
            .export(&bridge, Some(&tree), &CaptureOptions::default())
            .await;
        assert_eq!(result, Err(CardError::ExportNotReady));
        assert_eq!(controller.phase(), ExportPhase::Idle);
    }

    #[tokio::test]
    async fn test_rejects_without_a_rendered_card() {
        let (bridge, mutations) = counting_bridge().await;
        let controller = ExportController::new();

        let result = controller
            .export(&bridge, None, &CaptureOptions::default())
            .await;
        assert_eq!(result, Err(CardError::ExportNoRegion));
        assert_eq!(controller.phase(), ExportPhase::Idle);
        assert_eq!(mutations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_capture_failure_lands_failed_with_zero_mutations() {
        let (bridge, mutations) = counting_bridge().await;
        let controller = ExportController::new();
        let tree = rendered_tree();
        let options = CaptureOptions {
            pixel_ratio: 0.0,
            ..CaptureOptions::default()
        };

        let result = controller.export(&bridge, Some(&tree), &options).await;
        assert!(matches!(result, Err(CardError::CaptureEmpty { .. })));
        assert!(matches!(
            controller.phase(),
            ExportPhase::Failed {
                reason: CardError::CaptureEmpty { .. }
            }
        ));
        assert_eq!(mutations.load(Ordering::SeqCst), 0);
        // A failed attempt must leave the control usable again
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_second_trigger_while_busy_is_rejected() {
        let (bridge, mutations) = counting_bridge().await;
        let controller = ExportController::new();
        let tree = rendered_tree();
        let options = CaptureOptions::default();

        let (first, second) = tokio::join!(
            controller.export(&bridge, Some(&tree), &options),
            controller.export(&bridge, Some(&tree), &options),
        );
        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(CardError::ExportBusy { .. }))));
        assert_eq!(mutations.load(Ordering::SeqCst), 1);
    }
}
