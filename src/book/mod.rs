//! Turning fetched chapters into a book: the volume tree and its pictures.

pub mod illustrations;
pub mod tree;

pub use illustrations::{extract_illustrations, picture_id, rewrite_images};
pub use tree::assemble;
