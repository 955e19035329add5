use crate::api::ApiResponse;
use crate::backend::BackendError;
use crate::models::{BatchKind, SubmissionReport};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// 服务层错误
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("No items to {}.", .0.label())]
    EmptyBatch(BatchKind),

    #[error("Quantity for product {product_id} must be greater than zero")]
    InvalidQuantity { product_id: String },

    #[error("Product {product_id} is already in batch {batch_number}")]
    DuplicateProduct {
        batch_number: String,
        product_id: String,
    },

    #[error("Batch {0} not found")]
    BatchNotFound(String),

    #[error("Batch {0} is being submitted")]
    SubmissionInProgress(String),

    #[error("Product {product_id} not found in batch {batch_number}")]
    LineNotFound {
        batch_number: String,
        product_id: String,
    },

    #[error("Category {0} not found")]
    CategoryNotFound(String),

    #[error("Catalog item {0} not found")]
    CatalogItemNotFound(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// 提交中途失败，已生效的请求不回滚
    #[error(
        "Batch {} partially submitted ({} of {} stock updates, {} transactions): {}",
        .report.batch_number,
        .report.stock_updates_applied.len(),
        .report.total_lines,
        .report.transactions_recorded.len(),
        .source
    )]
    PartialSubmission {
        report: SubmissionReport,
        source: BackendError,
    },

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::EmptyBatch(_)
            | AppError::InvalidQuantity { .. }
            | AppError::DuplicateProduct { .. } => StatusCode::BAD_REQUEST,
            AppError::BatchNotFound(_)
            | AppError::LineNotFound { .. }
            | AppError::CategoryNotFound(_)
            | AppError::CatalogItemNotFound(_) => StatusCode::NOT_FOUND,
            AppError::SubmissionInProgress(_) => StatusCode::CONFLICT,
            AppError::Backend(_) | AppError::PartialSubmission { .. } => StatusCode::BAD_GATEWAY,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        match self {
            AppError::PartialSubmission { ref report, .. } => {
                let body = ApiResponse::failure(self.to_string(), Some(report.clone()));
                (status, Json(body)).into_response()
            }
            other => {
                let body = ApiResponse::<()>::failure(other.to_string(), None);
                (status, Json(body)).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
