//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`app_data`] - Application data directory and `config.json`
//! - [`encoding`] - Variable-length integer encoding (varint)
//! - [`paths`] - Root resolution, containment and separator normalization
//! - [`progress`] - Progress bars that vanish without the `progress` feature
//! - [`tokenizer`] - Term extraction shared by indexing and querying
//!
//! ```no_run
//! use orphanmd::utils::tokenize_to_vec;
//!
//! let terms = tokenize_to_vec("see assets/img/cat.png");
//! // Returns: ["see", "assets", "img", "cat", "png"]
//! ```

pub mod app_data;
pub mod encoding;
pub mod paths;
pub mod progress;
pub mod tokenizer;

pub use app_data::*;
pub use encoding::*;
pub use paths::*;
pub use tokenizer::*;
