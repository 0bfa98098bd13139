// Drive operation traits and implementations
pub mod download;
pub mod estimate;
pub mod filter;
pub mod mkdir;
pub mod plan;
pub mod report;
pub mod upload;
pub mod walk;

pub use download::Downloader;
pub use estimate::SizeEstimator;
pub use filter::{FilterDecision, TransferOptions};
pub use mkdir::FolderCreator;
pub use report::{SkipReason, TransferDescriptor, TransferReport};
pub use upload::Uploader;
pub use walk::{RemoteWalker, WalkEntry};
