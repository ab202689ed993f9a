use crate::auth::{TokenCodec, TokenSubject};
use crate::config::AppConfig;

/// Mint a token with the configured secret and print it to stdout
pub fn handle(config: &AppConfig, username: &str, admin: bool) -> anyhow::Result<()> {
    config.validate()?;

    let codec = TokenCodec::from_config(&config.security);
    let token = codec.issue(&TokenSubject::new(username, admin))?;
    println!("{}", token);
    Ok(())
}
