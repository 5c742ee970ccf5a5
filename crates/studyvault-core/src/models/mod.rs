pub mod catalog;
pub mod storage;
pub mod submission;
pub mod verdict;

pub use catalog::*;
pub use storage::*;
pub use submission::*;
pub use verdict::*;
