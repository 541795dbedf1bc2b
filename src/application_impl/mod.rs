mod credential_verifier_impl;
mod login_service_impl;
mod session_service_fake;
mod session_service_impl;
mod token_codec_jwt;

pub use credential_verifier_impl::*;
pub use login_service_impl::*;
pub use session_service_fake::*;
pub use session_service_impl::*;
pub use token_codec_jwt::*;
