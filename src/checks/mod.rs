pub mod existence;
pub mod format;
pub mod version;

pub use existence::ExistenceCheck;
pub use format::FormatCheck;
pub use version::VersionCheck;
