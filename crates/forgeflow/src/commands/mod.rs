pub mod apps;
pub mod build;
pub mod releases;
pub mod sync;
