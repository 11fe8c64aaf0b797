pub mod content_block;
pub mod page;
pub mod page_visit;
