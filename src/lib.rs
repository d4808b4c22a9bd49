//! # CodeCard Editor Panel
//!
//! An embeddable code-card editor: edit a snippet, style it, and export
//! it into the host document as a rendered PNG.
//!
//! ## Features
//! - Pure, deterministic card rendering from an immutable view state
//! - Built-in syntax highlighting themes with a safe default fallback
//! - Self-contained rasterization: gradients, glass blur, shadows and an
//!   embedded bitmap font, no browser or font files involved
//! - Host handshake with a hard timeout; a silent host degrades the
//!   panel to a standalone preview instead of blocking it
//! - One-at-a-time export with an explicit phase state machine
//!
//! ## Example: render and capture a card
//! ```ignore
//! use codecard::{capture, CaptureOptions, render_card, ViewState};
//!
//! let tree = render_card(&ViewState::default());
//! let artifact = capture(&tree, &CaptureOptions::default()).await?;
//! std::fs::write("card.png", &artifact.png)?;
//! ```
//!
//! ## Example: a panel wired to a host
//! ```ignore
//! use codecard::{CardPanel, Field, HostBridge};
//! use std::sync::Arc;
//!
//! let panel = CardPanel::new(Arc::new(HostBridge::new()));
//! panel.connect(handshake).await;
//! panel.on_change(Field::Language("python".into()));
//! let bytes = panel.on_export().await?;
//! ```

pub mod bridge;
pub mod capture;
pub mod card;
pub mod error;
pub mod export;
pub mod highlight;
pub mod panel;
pub mod render;
pub mod state;
pub mod style;
pub mod theme;

// --- Core types ---
pub use card::VisualTree;
pub use error::{CardError, CardResult};
pub use render::CardRenderer;
pub use state::{Field, ViewState};
pub use theme::{ThemeCatalog, ThemeDescriptor};

// --- Host integration ---
pub use bridge::{BridgeState, HostBridge, HostCapability, HostHandshake};
pub use export::{ExportController, ExportPhase};
pub use panel::CardPanel;

// --- Capture pipeline ---
pub use capture::{capture, CaptureArtifact, CaptureOptions};

/// Render a card from a view state, without holding a panel
pub fn render_card(state: &ViewState) -> VisualTree {
    CardRenderer::new().render(state)
}

/// Render and capture in one go, without a panel or host
pub async fn capture_card(
    state: &ViewState,
    options: &CaptureOptions,
) -> CardResult<CaptureArtifact> {
    capture(&render_card(state), options).await
}
