//! relprep - release-preparation text tools
//!
//! Loads requirement lists, rewrites the README into a release description,
//! and generates a meta-package whose modules are thin re-export stubs of an
//! existing Python package.

pub mod cli;
pub mod config;
pub mod error;
pub mod meta_package;
pub mod readme;
pub mod requirements;

pub use error::SetupError;
pub use meta_package::{create_meta_package, MetaPackageReport};
pub use readme::{load_readme_description, rewrite_description};
pub use requirements::load_requirements;
