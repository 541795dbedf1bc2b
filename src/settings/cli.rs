use super::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sessionkeep", about = "Issue, refresh and revoke session tokens")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue a token pair for an identity that was verified elsewhere
    Issue {
        #[arg(long)]
        id: String,
        #[arg(long)]
        username: String,
    },
    /// Check a username/password pair and issue a token pair
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SESSIONKEEP_PASSWORD")]
        password: String,
    },
    /// Mint a new access token from a refresh token
    Refresh { refresh_token: String },
    /// Revoke a refresh token
    Revoke { refresh_token: String },
    /// Verify an access token and print its identity
    Verify { access_token: String },
    /// Print an argon2 PHC hash for seeding credentials
    HashPassword {
        #[arg(env = "SESSIONKEEP_PASSWORD")]
        password: String,
    },
}
