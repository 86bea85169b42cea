//! Product batches: upload, status lookup and listing

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{UploadBatchCommand, UploadBatchError, UploadBatchResponse};

pub use queries::{
    GetStatusError, GetStatusQuery, GetStatusResponse, ListProductsError, ListProductsQuery,
    ListProductsResponse, ProductItem,
};

pub use routes::products_routes;
