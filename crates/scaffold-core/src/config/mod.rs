//! Workspace configuration detection

pub mod package_manager;

pub use package_manager::PackageManager;
