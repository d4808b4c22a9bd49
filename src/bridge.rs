//! Host bridge: the panel's connection to the embedding application.
//!
//! On startup the panel races the host's readiness signal against a
//! fixed timeout, then acquires the document-write capability. Whatever
//! happens, the bridge settles into a terminal state and the panel
//! becomes interactive; a missing or broken host only disables export.

use crate::error::{CardError, CardResult};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// How long the panel waits for the host before going standalone
pub const HANDSHAKE_TIMEOUT_MS: u64 = 3_000;

/// Lifecycle of the host connection. Every state except `Initializing`
/// is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BridgeState {
    Initializing,
    Ready,
    /// The host never answered in time; interactive, export disabled
    ReadyStandalone,
    /// The host answered with a rejection; interactive, export disabled
    FailedStandalone,
}

/// A write the panel asks the host document to perform.
#[derive(Debug)]
pub enum DocumentRequest {
    AddImage {
        png: Vec<u8>,
        done: oneshot::Sender<Result<(), String>>,
    },
}

/// One capability acquisition request; the host answers on the enclosed
/// sender
pub type CapabilityRequest = oneshot::Sender<Result<HostCapability, String>>;

/// What the host offers the panel at startup.
pub struct HostHandshake {
    /// Resolves once the host finished its own initialization
    pub ready: oneshot::Receiver<Result<(), String>>,
    /// Endpoint for acquiring the document capability after readiness
    pub capability: mpsc::Sender<CapabilityRequest>,
}

/// Opaque proxy for host document writes.
///
/// Cloning shares the underlying request channel, so the handle is
/// acquired once and read-shared afterwards, never locked.
#[derive(Debug, Clone)]
pub struct HostCapability {
    tx: mpsc::Sender<DocumentRequest>,
}

impl HostCapability {
    pub fn new(tx: mpsc::Sender<DocumentRequest>) -> Self {
        Self { tx }
    }

    /// Insert one image into the host document.
    pub async fn add_image(&self, png: Vec<u8>) -> CardResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(DocumentRequest::AddImage { png, done: done_tx })
            .await
            .map_err(|_| CardError::SubmissionRejected {
                reason: "host document channel closed".to_owned(),
            })?;
        match done_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(CardError::SubmissionRejected { reason }),
            Err(_) => Err(CardError::SubmissionRejected {
                reason: "host dropped the request before acknowledging".to_owned(),
            }),
        }
    }
}

struct BridgeInner {
    state: BridgeState,
    capability: Option<HostCapability>,
    handshake_error: Option<CardError>,
}

/// Drives the handshake and holds the settled connection state.
pub struct HostBridge {
    inner: Mutex<BridgeInner>,
    timeout_ms: u64,
}

impl HostBridge {
    pub fn new() -> Self {
        Self::with_timeout_ms(HANDSHAKE_TIMEOUT_MS)
    }

    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            inner: Mutex::new(BridgeInner {
                state: BridgeState::Initializing,
                capability: None,
                handshake_error: None,
            }),
            timeout_ms,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.inner.lock().unwrap().state
    }

    /// True only in [`BridgeState::Ready`]
    pub fn is_ready(&self) -> bool {
        self.state() == BridgeState::Ready
    }

    pub fn capability(&self) -> Option<HostCapability> {
        self.inner.lock().unwrap().capability.clone()
    }

    /// Why the bridge went standalone, if it did
    pub fn last_handshake_error(&self) -> Option<CardError> {
        self.inner.lock().unwrap().handshake_error.clone()
    }

    /// Drive the handshake to a terminal state.
    ///
    /// Settles at most once; a call after settlement returns the settled
    /// state untouched. This never hangs: readiness and capability
    /// acquisition each get at most one timeout window.
    pub async fn connect(&self, handshake: HostHandshake) -> BridgeState {
        {
            let inner = self.inner.lock().unwrap();
            if inner.state != BridgeState::Initializing {
                return inner.state;
            }
        }
        let window = Duration::from_millis(self.timeout_ms);
        let HostHandshake { ready, capability } = handshake;

        match tokio::time::timeout(window, ready).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(reason))) => {
                warn!(%reason, "host rejected readiness, continuing standalone");
                return self.settle(
                    BridgeState::FailedStandalone,
                    None,
                    Some(CardError::HandshakeRejected { reason }),
                );
            }
            Ok(Err(_)) => {
                warn!("host readiness channel closed, continuing standalone");
                return self.settle(
                    BridgeState::FailedStandalone,
                    None,
                    Some(CardError::HandshakeRejected {
                        reason: "readiness channel closed".to_owned(),
                    }),
                );
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout_ms,
                    "host readiness timed out, continuing standalone"
                );
                return self.settle(
                    BridgeState::ReadyStandalone,
                    None,
                    Some(CardError::HandshakeTimeout {
                        timeout_ms: self.timeout_ms,
                    }),
                );
            }
        }

        // Readiness arrived; the capability request gets its own window
        // covering both the send and the reply, so a half-alive host
        // with a full request channel still cannot park us here
        let (reply_tx, reply_rx) = oneshot::channel();
        let acquire = async move {
            // A failed send drops reply_tx, surfacing below as a closed
            // channel
            let _ = capability.send(reply_tx).await;
            reply_rx.await
        };
        match tokio::time::timeout(window, acquire).await {
            Ok(Ok(Ok(capability))) => {
                info!("host bridge ready");
                self.settle(BridgeState::Ready, Some(capability), None)
            }
            Ok(Ok(Err(reason))) => {
                warn!(%reason, "capability acquisition rejected, continuing standalone");
                self.settle(
                    BridgeState::ReadyStandalone,
                    None,
                    Some(CardError::HandshakeRejected { reason }),
                )
            }
            Ok(Err(_)) => {
                warn!("capability channel closed, continuing standalone");
                self.settle(
                    BridgeState::ReadyStandalone,
                    None,
                    Some(CardError::HandshakeRejected {
                        reason: "capability channel closed".to_owned(),
                    }),
                )
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout_ms,
                    "capability acquisition timed out, continuing standalone"
                );
                self.settle(
                    BridgeState::ReadyStandalone,
                    None,
                    Some(CardError::HandshakeTimeout {
                        timeout_ms: self.timeout_ms,
                    }),
                )
            }
        }
    }

    fn settle(
        &self,
        state: BridgeState,
        capability: Option<HostCapability>,
        error: Option<CardError>,
    ) -> BridgeState {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == BridgeState::Initializing {
            inner.state = state;
            inner.capability = capability;
            inner.handshake_error = error;
        }
        inner.state
    }
}

impl Default for HostBridge {
    fn default() -> Self {
        Self::new()
    }
}
