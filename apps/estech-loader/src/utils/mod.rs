//! Utility modules for ES Tech Loader

pub mod paths;
