pub mod allocator;
pub mod batch;
pub mod category;
pub mod category_tree;
pub mod monitoring;
pub mod stock;

pub use batch::{BatchDraft, DraftStore};
pub use category::CategoryService;
pub use stock::StockService;
