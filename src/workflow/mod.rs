pub mod set_ctx;
pub mod upload_flow;

pub use set_ctx::SetCtx;
pub use upload_flow::{UploadFlow, UploadReport};
