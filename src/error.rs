use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Unknown order state code {0}")]
    UnknownOrderState(i32),
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::MealNotFound(_))
            | AppError::Store(StoreError::OrderNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::EmptyMealName)
            | AppError::Store(StoreError::NegativePrice)
            | AppError::UnknownOrderState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreError::DuplicateMealName(_))
            | AppError::Store(StoreError::MealInUse(_)) => StatusCode::CONFLICT,
            AppError::Store(StoreError::Database(_)) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {self}");
        }
        (status, self.to_string()).into_response()
    }
}
