//! Domain logic - the version value type and the rules for deriving one
//! version from another, independent of git or configuration

mod parser;
pub mod pep440;
pub mod policy;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use pep440::{Pep440Pre, Pep440Version, PreLabel};
pub use policy::{ReleaseGranularity, DECREMENT_SENTINEL};
pub use prerelease::PrereleaseType;
pub use tag::{Tag, TagPattern};
pub use version::{ReleaseKind, RenderStyle, SemanticVersion, Stage, VersionTuple};
