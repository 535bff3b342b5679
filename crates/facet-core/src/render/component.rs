//! The stateful responsive image.
//!
//! Each reference moves `Pending → Resolved | Failed`. Changing the reference
//! starts over at `Pending` and any fetch still running for the old reference
//! is aborted; should it complete anyway, its result is dropped because its
//! generation no longer matches.

use maud::Markup;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ResolutionError;
use crate::types::Manifest;

use super::markup::{failed_markup, loading_markup, ImageElement, SizesHint};
use super::source::ManifestSource;

/// What the component can currently render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderState {
    Pending,
    Resolved(Arc<Manifest>),
    Failed(ResolutionError),
}

impl RenderState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        match self {
            Self::Resolved(manifest) => Some(manifest),
            _ => None,
        }
    }
}

/// State published to subscribers, tagged with the reference it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Bumped on every reference change
    pub generation: u64,
    pub reference: String,
    pub state: RenderState,
}

pub struct ResponsiveImage {
    source: Arc<dyn ManifestSource>,
    alt: String,
    sizes: SizesHint,
    state: Arc<watch::Sender<Snapshot>>,
    in_flight: Option<JoinHandle<()>>,
}

impl ResponsiveImage {
    /// Create the component and start resolving `reference`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        source: Arc<dyn ManifestSource>,
        reference: impl Into<String>,
        alt: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(Snapshot {
            generation: 0,
            reference: reference.into(),
            state: RenderState::Pending,
        });
        let mut image = Self {
            source,
            alt: alt.into(),
            sizes: SizesHint::default(),
            state: Arc::new(state),
            in_flight: None,
        };
        image.resolve();
        image
    }

    pub fn with_sizes(mut self, sizes: SizesHint) -> Self {
        self.sizes = sizes;
        self
    }

    /// Point the component at a new reference.
    ///
    /// Setting the current reference again is a no-op.
    pub fn set_src(&mut self, reference: impl Into<String>) {
        let reference = reference.into();
        if self.state.borrow().reference == reference {
            return;
        }
        tracing::debug!("Reference changed to '{}'", reference);
        self.state.send_modify(|snap| {
            snap.generation += 1;
            snap.reference = reference;
            snap.state = RenderState::Pending;
        });
        self.resolve();
    }

    pub fn reference(&self) -> String {
        self.state.borrow().reference.clone()
    }

    pub fn state(&self) -> RenderState {
        self.state.borrow().state.clone()
    }

    /// Stream of state changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    /// Wait until the current reference is resolved or has failed.
    pub async fn settled(&self) -> RenderState {
        let mut rx = self.state.subscribe();
        loop {
            {
                let snap = rx.borrow_and_update();
                if snap.state.is_settled() {
                    return snap.state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Markup for the current state.
    pub fn render(&self) -> Markup {
        match self.state() {
            RenderState::Pending => loading_markup(),
            RenderState::Resolved(manifest) => {
                ImageElement::from_manifest(&manifest, &self.alt, &self.sizes).to_markup()
            }
            RenderState::Failed(_) => failed_markup(&self.alt),
        }
    }

    fn resolve(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let (generation, reference) = {
            let snap = self.state.borrow();
            (snap.generation, snap.reference.clone())
        };
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = source.fetch(&reference).await;
            if let Err(e) = &outcome {
                tracing::warn!("{}", e);
            }
            if !publish(&state, generation, outcome) {
                tracing::debug!("Discarded stale manifest for '{}'", reference);
            }
        }));
    }
}

impl Drop for ResponsiveImage {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

/// Apply a fetch result if `generation` is still current.
///
/// The comparison and the write happen under the channel's lock.
fn publish(
    state: &watch::Sender<Snapshot>,
    generation: u64,
    outcome: Result<Manifest, ResolutionError>,
) -> bool {
    state.send_if_modified(|snap| {
        if snap.generation != generation {
            return false;
        }
        snap.state = match outcome {
            Ok(manifest) => RenderState::Resolved(Arc::new(manifest)),
            Err(e) => RenderState::Failed(e),
        };
        true
    })
}
