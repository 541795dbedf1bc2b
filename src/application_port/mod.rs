mod login_service;
mod session_service;

pub use login_service::*;
pub use session_service::*;
