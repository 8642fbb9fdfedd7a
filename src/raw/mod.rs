mod arena;
mod handle;
mod node;
mod path;
mod raw_bplus_tree;
mod verify;

pub(crate) use handle::Handle;
pub(crate) use node::SearchResult;
pub(crate) use raw_bplus_tree::RawBPlusTree;
