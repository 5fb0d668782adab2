//! Test helpers shared by the `lazy_gettext` test suites.
//!
//! Provides guards for the locale environment variables, a writer for binary
//! MO catalogs and temporary locale directory trees.

pub mod locale_env;
pub mod locale_tree;
pub mod mo;
