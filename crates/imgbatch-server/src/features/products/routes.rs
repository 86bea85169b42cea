use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::{
    commands::{
        upload::{UPLOAD_FIELD, UPLOAD_FIELD_ALIAS},
        UploadBatchCommand, UploadBatchError,
    },
    queries::{GetStatusError, GetStatusQuery, ListProductsError, ListProductsQuery},
};
use crate::api::response::ErrorResponse;
use crate::features::FeatureState;

/// Fixed greeting served at the root
pub const GREETING: &str = "hello route";

pub fn products_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(greeting))
        .route("/upload", post(upload_batch))
        .route("/status", post(get_status))
        .route("/products", get(list_products))
}

async fn greeting() -> &'static str {
    GREETING
}

#[tracing::instrument(skip(state, multipart))]
async fn upload_batch(
    State(state): State<FeatureState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ProductApiError> {
    let mut multipart = multipart.map_err(UploadBatchError::from)?;
    let mut command: Option<UploadBatchCommand> = None;

    while let Some(field) = multipart.next_field().await.map_err(UploadBatchError::from)? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == UPLOAD_FIELD || (field_name == UPLOAD_FIELD_ALIAS && command.is_none()) {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(UploadBatchError::from)?;
            command = Some(UploadBatchCommand {
                file_name,
                content: data.to_vec(),
            });
        }
    }

    let command = command.ok_or(UploadBatchError::FileRequired)?;

    let response =
        super::commands::upload::handle(&state.orchestrator, &state.upload_dir, command).await?;

    tracing::info!(
        tracking_id = %response.tracking_id,
        products = response.products.len(),
        "Batch processed via API"
    );

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(state, body))]
async fn get_status(
    State(state): State<FeatureState>,
    body: Option<Json<GetStatusQuery>>,
) -> Result<Response, ProductApiError> {
    let query = body.map(|Json(q)| q).unwrap_or_default();

    let response = super::queries::get_status::handle(state.store.as_ref(), query).await?;

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(state))]
async fn list_products(
    State(state): State<FeatureState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Response, ProductApiError> {
    let response = super::queries::list::handle(state.store.as_ref(), query).await?;

    tracing::debug!(count = response.products.len(), "Products listed via API");

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug)]
enum ProductApiError {
    Upload(UploadBatchError),
    Status(GetStatusError),
    List(ListProductsError),
}

impl From<UploadBatchError> for ProductApiError {
    fn from(err: UploadBatchError) -> Self {
        Self::Upload(err)
    }
}

impl From<GetStatusError> for ProductApiError {
    fn from(err: GetStatusError) -> Self {
        Self::Status(err)
    }
}

impl From<ListProductsError> for ProductApiError {
    fn from(err: ListProductsError) -> Self {
        Self::List(err)
    }
}

impl IntoResponse for ProductApiError {
    fn into_response(self) -> Response {
        match self {
            ProductApiError::Upload(UploadBatchError::FileRequired) => {
                ErrorResponse::new("VALIDATION_ERROR", self.to_string())
                    .with_status(StatusCode::BAD_REQUEST)
            },
            ProductApiError::Upload(UploadBatchError::Rejected(_))
            | ProductApiError::Upload(UploadBatchError::Transport(_)) => {
                tracing::error!("Upload transport error: {}", self);
                ErrorResponse::new("UPLOAD_ERROR", self.to_string())
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            },
            ProductApiError::Upload(UploadBatchError::Staging { .. }) => {
                tracing::error!("Staging error during upload: {}", self);
                ErrorResponse::new("STORAGE_ERROR", "Failed to stage the uploaded file")
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            },
            ProductApiError::Upload(UploadBatchError::Batch(_)) => {
                tracing::error!("Batch processing error: {}", self);
                ErrorResponse::new("PROCESSING_ERROR", self.to_string())
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            },

            ProductApiError::Status(GetStatusError::TrackingIdRequired) => {
                ErrorResponse::new("VALIDATION_ERROR", self.to_string())
                    .with_status(StatusCode::BAD_REQUEST)
            },
            ProductApiError::Status(GetStatusError::NotFound) => {
                ErrorResponse::new("NOT_FOUND", self.to_string()).with_status(StatusCode::NOT_FOUND)
            },
            ProductApiError::Status(GetStatusError::Store(_))
            | ProductApiError::List(ListProductsError::Store(_)) => {
                tracing::error!("Store error during product query: {}", self);
                ErrorResponse::new("DATABASE_ERROR", "A database error occurred")
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}

impl std::fmt::Display for ProductApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload(e) => write!(f, "{}", e),
            Self::Status(e) => write!(f, "{}", e),
            Self::List(e) => write!(f, "{}", e),
        }
    }
}
