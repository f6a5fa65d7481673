pub mod config;
pub mod error;
pub mod issue;
pub mod metric;
pub mod quality_config;
pub mod verdict;

pub use config::Config;
pub use error::*;
pub use issue::*;
pub use metric::*;
pub use quality_config::*;
pub use verdict::Verdict;
