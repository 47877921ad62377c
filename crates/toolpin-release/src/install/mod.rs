pub mod cache;
pub mod download;
pub mod error;
pub mod naming;
pub mod platform;
pub mod release;
pub mod resolve;

pub use cache::{CacheKey, ToolCache};
pub use download::{ArchiveFetcher, ExtractedTool};
pub use error::ReleaseError;
pub use naming::{ArchiveKind, AssetNameTemplate};
pub use platform::{Arch, MachineIdentity, Os, PlatformKey, binary_name, detect_platform};
pub use release::{Asset, GitHubRegistry, Release, ReleaseRegistry};
pub use resolve::{VersionResolver, VersionSpec, normalize_tag};
