//! includelint Index
//!
//! Read-only lookup tables loaded from build outputs: the compilation
//! database, the GN build description and the virtual filesystem mapping.

pub mod compdb;
pub mod description;
pub mod label;
pub mod vfs;
pub mod workspace;

pub use compdb::CompilationDatabase;
pub use description::{Description, TargetDescription};
pub use vfs::VirtualFilesystemResolver;
pub use workspace::Workspace;
