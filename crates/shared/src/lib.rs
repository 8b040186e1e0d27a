pub mod env;
pub mod error;
pub mod logging;
pub mod params;
pub mod test_utils;
// re-exported for the code generated by shared-macros
pub use tracing;
