pub mod extract;
pub mod pagination;
pub mod response;

pub use extract::{IdPath, JsonBody};
pub use pagination::{Page, PageQuery, PageRequest};
pub use response::{ApiResponse, LoginResponse, ServiceResult};
