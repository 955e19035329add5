pub mod catalog;
pub mod category;
pub mod line_item;
pub mod numeric;
pub mod result;
pub mod transaction;

pub use catalog::CatalogItem;
pub use category::{CategoryNode, CategoryOption, CategoryPayload, CategoryRecord};
pub use line_item::{BatchCharges, BatchKind, BatchSummary, LineItem};
pub use result::SubmissionReport;
pub use transaction::{
    MovedProduct, StockAdjustment, StockMove, StockTransaction, StockUpdate, TransactionRecord,
};
