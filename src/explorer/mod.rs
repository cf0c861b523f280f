pub mod filter;
pub mod pagination;
pub mod render;
pub mod view;

pub use filter::{FilterState, FilterStore};
pub use pagination::Pagination;
pub use view::{Explorer, MountHandle, ViewSnapshot};
