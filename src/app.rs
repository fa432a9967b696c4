use crate::api::{JulesClient, SessionName};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{JulesError, Result};

pub struct AppContext {
    pub config: Config,
    pub client: JulesClient,
    pub robot_mode: bool,
    default_session: Option<String>,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let client = JulesClient::from_config(&config)?;

        Ok(Self {
            config,
            client,
            robot_mode: cli.robot,
            default_session: cli.session_id.clone(),
        })
    }

    /// Resolve the session from a positional argument, falling back to
    /// `--session-id` / `JULES_SESSION_ID`.
    pub fn session(&self, positional: Option<&str>) -> Result<SessionName> {
        let raw = positional
            .or(self.default_session.as_deref())
            .ok_or_else(|| JulesError::MissingConfig("session_id is required".to_string()))?;
        SessionName::parse(raw)
    }
}
