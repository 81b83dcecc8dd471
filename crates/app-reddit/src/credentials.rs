use std::env;

pub const REQUIRED_ENV_VARS: &[&str] = &[
    "REDDIT_CLIENT_ID",
    "REDDIT_CLIENT_SECRET",
    "REDDIT_USERNAME",
    "REDDIT_PASSWORD",
    "REDDIT_USER_AGENT",
];

/// Reddit API credentials.
///
/// These come from the environment only, never from CLI arguments,
/// so they can't end up in `--dump-config` output or shell history.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("missing environment variables: {}", _0.join(", "))]
    Missing(Vec<String>),
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    ///
    /// Reports every missing variable at once instead of failing on the
    /// first one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |k: &str| lookup(k).filter(|x| !x.trim().is_empty());

        let missing = REQUIRED_ENV_VARS
            .iter()
            .filter(|k| lookup(k).is_none())
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(CredentialsError::Missing(missing));
        }

        let get = |k: &str| lookup(k).expect("checked above");

        Ok(Self {
            client_id: get("REDDIT_CLIENT_ID"),
            client_secret: get("REDDIT_CLIENT_SECRET"),
            username: get("REDDIT_USERNAME"),
            password: get("REDDIT_PASSWORD"),
            user_agent: get("REDDIT_USER_AGENT"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("REDDIT_CLIENT_ID", "id"),
            ("REDDIT_CLIENT_SECRET", "secret"),
            ("REDDIT_USERNAME", "user"),
            ("REDDIT_PASSWORD", "hunter2"),
            ("REDDIT_USER_AGENT", "test-agent/1.0"),
        ])
    }

    #[test]
    fn loads_from_complete_environment() {
        let env = full_env();
        let creds = RedditCredentials::from_lookup(|k| env.get(k).map(ToString::to_string))
            .expect("should load");

        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.user_agent, "test-agent/1.0");
    }

    #[test]
    fn reports_all_missing_variables() {
        let mut env = full_env();
        env.remove("REDDIT_CLIENT_SECRET");
        env.insert("REDDIT_PASSWORD", "   ");

        let err = RedditCredentials::from_lookup(|k| env.get(k).map(ToString::to_string))
            .expect_err("should fail");

        let CredentialsError::Missing(missing) = err;
        assert_eq!(missing, vec!["REDDIT_CLIENT_SECRET", "REDDIT_PASSWORD"]);
    }
}
