mod error;
mod http;
mod listener;

pub use crate::error::{HttpError, HttpResult};
pub use crate::http::{HttpControllerService, ServiceConfig};
pub use crate::listener::PushListener;
