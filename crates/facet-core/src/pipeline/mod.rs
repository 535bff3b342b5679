//! Build-time pipeline components.
//!
//! - **discovery**: find source images in directories
//! - **validate**: pre-decode checks (size, magic bytes)
//! - **decode**: decode a source and probe its alpha channel once
//! - **hash**: source identity and variant name tokens
//! - **eligibility**: which formats a source gets
//! - **transcode**: resize + encode one (format, width) pair
//! - **placeholder**: tiny WebP preview
//! - **naming**: content-addressed file names and public paths
//! - **generator**: orchestrates the stages for one or many sources
//! - **store**: atomic writes, manifests and the registry file

pub mod decode;
pub mod discovery;
pub mod eligibility;
pub mod generator;
pub mod hash;
pub mod naming;
pub mod placeholder;
pub mod store;
pub mod transcode;
pub mod validate;

pub use decode::{ImageDecoder, SourceImage};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use eligibility::{is_eligible, EligibleFormats};
pub use generator::{GenerateOptions, ImageOutcome, VariantGenerator};
pub use hash::Hasher;
pub use placeholder::PlaceholderGenerator;
pub use store::ManifestStore;
pub use transcode::{Transcoder, VariantJob};
pub use validate::Validator;
