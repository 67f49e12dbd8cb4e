// Video metadata resolution
//
// probe -> seed records -> platform title cascade -> fallback naming

pub mod assembler;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod platform;
pub mod probe;
pub mod session;
pub mod strategies;
pub mod tools;
pub mod traits;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ResolverConfig, ToolMode};
pub use errors::ResolveError;
pub use models::{CollectionContext, Platform, ProbeReport, RawEntry, VideoRecord};
pub use orchestrator::TitleResolver;
pub use platform::detect_platform;
pub use session::SessionContext;
pub use traits::{MediaTool, PageFetcher};
