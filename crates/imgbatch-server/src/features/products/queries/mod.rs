pub mod get_status;
pub mod list;

pub use get_status::{GetStatusError, GetStatusQuery, GetStatusResponse};
pub use list::{ListProductsError, ListProductsQuery, ListProductsResponse, ProductItem};
