//! The editor panel facade: the surface a host UI talks to.
//!
//! Holds the current form state and its rendered card together under
//! one lock, so edits are total replacements applied in dispatch order
//! and every reader sees a state/tree pair that matches.

use crate::bridge::{BridgeState, HostBridge, HostHandshake};
use crate::capture::CaptureOptions;
use crate::card::VisualTree;
use crate::error::CardResult;
use crate::export::{ExportController, ExportPhase};
use crate::render::CardRenderer;
use crate::state::{Field, ViewState};
use std::sync::{Arc, Mutex};

/// One code-card editor panel instance.
pub struct CardPanel {
    view: Mutex<(ViewState, VisualTree)>,
    renderer: CardRenderer,
    bridge: Arc<HostBridge>,
    controller: ExportController,
    options: CaptureOptions,
}

impl CardPanel {
    /// Panel with default form state, already rendered once.
    pub fn new(bridge: Arc<HostBridge>) -> Self {
        let renderer = CardRenderer::new();
        let state = ViewState::default();
        let tree = renderer.render(&state);
        Self {
            view: Mutex::new((state, tree)),
            renderer,
            bridge,
            controller: ExportController::new(),
            options: CaptureOptions::default(),
        }
    }

    pub fn with_capture_options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    /// Drive the host handshake; resolves to a terminal bridge state.
    pub async fn connect(&self, handshake: HostHandshake) -> BridgeState {
        self.bridge.connect(handshake).await
    }

    pub fn bridge(&self) -> &HostBridge {
        &self.bridge
    }

    /// Read-only snapshot of the form fields.
    pub fn snapshot(&self) -> ViewState {
        self.view.lock().unwrap().0.clone()
    }

    /// The card rendered from the latest state.
    pub fn tree(&self) -> VisualTree {
        self.view.lock().unwrap().1.clone()
    }

    /// Apply one field edit as a whole-state replacement and re-render.
    pub fn on_change(&self, field: Field) {
        let mut view = self.view.lock().unwrap();
        let next = view.0.with(field);
        view.1 = self.renderer.render(&next);
        view.0 = next;
    }

    /// Whether the export control should be greyed out.
    pub fn is_export_disabled(&self) -> bool {
        !self.bridge.is_ready() || self.controller.is_busy()
    }

    pub fn export_phase(&self) -> ExportPhase {
        self.controller.phase()
    }

    /// Capture the current card and submit it to the host document.
    pub async fn on_export(&self) -> CardResult<usize> {
        let tree = self.tree();
        self.controller
            .export(&self.bridge, Some(&tree), &self.options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{CapabilityRequest, DocumentRequest, HostCapability};
    use pretty_assertions::assert_eq;
    use tokio::sync::{mpsc, oneshot};

    fn ready_handshake() -> HostHandshake {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (cap_tx, mut cap_rx) = mpsc::channel::<CapabilityRequest>(1);
        tokio::spawn(async move {
            let (doc_tx, mut doc_rx) = mpsc::channel(8);
            while let Some(reply) = cap_rx.recv().await {
                let _ = reply.send(Ok(HostCapability::new(doc_tx.clone())));
            }
            while let Some(DocumentRequest::AddImage { done, .. }) = doc_rx.recv().await {
                let _ = done.send(Ok(()));
            }
        });
        let _ = ready_tx.send(Ok(()));
        HostHandshake {
            ready: ready_rx,
            capability: cap_tx,
        }
    }

    fn panel() -> CardPanel {
        CardPanel::new(Arc::new(HostBridge::new()))
    }

    #[test]
    fn test_panel_starts_rendered_with_defaults() {
        let panel = panel();
        assert_eq!(panel.snapshot(), ViewState::default());
        assert_eq!(
            panel.tree(),
            CardRenderer::new().render(&ViewState::default())
        );
    }

    #[test]
    fn test_on_change_replaces_state_and_rerenders() {
        let panel = panel();
        panel.on_change(Field::Language("python".to_owned()));
        assert_eq!(panel.snapshot().language, "python");
        assert_eq!(panel.tree().frame.window.header.badge.label, "PYTHON");

        let before = panel.snapshot();
        panel.on_change(Field::GlassEffect(false));
        // Only the edited field moves
        assert_eq!(panel.snapshot().language, before.language);
        assert_eq!(panel.snapshot().code, before.code);
        assert!(!panel.snapshot().glass_effect);
    }

    #[test]
    fn test_edit_order_converges_to_the_same_tree() {
        let a = panel();
        a.on_change(Field::Code("let x = 1".to_owned()));
        a.on_change(Field::Theme("vsDark".to_owned()));

        let b = panel();
        b.on_change(Field::Theme("vsDark".to_owned()));
        b.on_change(Field::Code("let x = 1".to_owned()));

        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.tree(), b.tree());
    }

    #[tokio::test]
    async fn test_export_control_follows_bridge_state() {
        let panel = panel();
        assert!(panel.is_export_disabled());
        assert_eq!(panel.connect(ready_handshake()).await, BridgeState::Ready);
        assert!(!panel.is_export_disabled());
    }

    #[tokio::test]
    async fn test_on_export_round_trip() {
        let panel = panel();
        panel.connect(ready_handshake()).await;
        let size = panel.on_export().await.unwrap();
        assert!(size > 0);
        assert_eq!(
            panel.export_phase(),
            ExportPhase::Done {
                artifact_size: size
            }
        );
        assert!(!panel.is_export_disabled());
    }
}
