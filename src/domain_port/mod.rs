// store

mod refresh_token_store;

pub use refresh_token_store::*;

// repo

mod credential_repo;

pub use credential_repo::*;
