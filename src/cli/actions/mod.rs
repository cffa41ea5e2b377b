pub mod server;

use anyhow::Result;
use secrecy::SecretString;

/// Action parsed from the command line, executed by the binary.
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        main_domain: String,
        api_base_url: Option<String>,
        token_secret: SecretString,
        production: bool,
    },
}

impl Action {
    /// Execute the action.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to start or stops abnormally.
    pub async fn execute(self) -> Result<()> {
        match self {
            Action::Server { .. } => server::handle(self).await,
        }
    }
}
