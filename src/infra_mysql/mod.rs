mod credential_repo_mysql;
mod refresh_token_store_mysql;

pub use credential_repo_mysql::*;
pub use refresh_token_store_mysql::*;

mod util;
