//! Render-time side: resolve a reference to its manifest and emit markup that
//! lets the browser pick the best-fitting variant.

pub mod component;
pub mod markup;
pub mod source;

pub use component::{RenderState, ResponsiveImage, Snapshot};
pub use markup::{
    candidate_list, fallback_format, select_candidate, srcset, ImageElement, SizesHint,
};
pub use source::{ManifestSource, MemorySource, RegistrySource};
