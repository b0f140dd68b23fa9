mod fetcher;
mod runtime;

pub use fetcher::SunTimesFetcher;
pub use runtime::{SceneRuntime, SceneStats};
