use std::time::Duration;

pub use reqwest::{Client as RequestClient, ClientBuilder as RequestClientBuilder};

pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like \
                              Gecko) Chrome/88.0.4324.182 Safari/537.36";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct Client;

impl Client {
    pub fn base() -> Result<RequestClient, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> RequestClientBuilder {
        RequestClient::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}
