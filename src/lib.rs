//! Tailor Core - Staging Compiler Configuration
//!
//! Translates flags into the invocation of the buildpack compiler that turns
//! raw app bits into a droplet.
//!
//! # Guarantees
//! 1. One value store: typed accessors and iteration read the same options
//! 2. Flags are emitted in definition order
//! 3. Validation reports every missing flag at once
//! 4. Buildpack directories are named by the MD5 of their identifier

pub mod schema;
pub mod config;
pub mod validation;
pub mod hashing;

pub use schema::{ConfigSchema, ConfigOption, OptionRef, FlagError};
pub use config::{TailorConfig, COMPILER_PATH, DEFAULTS, default_for};
pub use validation::{ValidationError, missing_flags};
pub use hashing::{md5_hex, buildpack_dir_name};
