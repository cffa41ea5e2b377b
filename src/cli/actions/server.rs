use crate::api;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::actions::Action;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    let Action::Server {
        port,
        dsn,
        main_domain,
        api_base_url,
        token_secret,
        production,
    } = action;

    let mut config = AuthConfig::new(main_domain, production);
    if let Some(base_url) = api_base_url {
        config = config.with_api_base_url(base_url);
    }

    api::new(port, dsn, config, token_secret).await
}
