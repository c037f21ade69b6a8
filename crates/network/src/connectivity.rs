//! Network connectivity probing

use reqwest::Client as ReqwestClient;
use std::time::Duration;

/// Probes a small set of well-known hosts to decide if the device is online
#[derive(Clone)]
pub struct ConnectivityChecker {
    client: ReqwestClient,
    check_urls: Vec<String>,
}

impl ConnectivityChecker {
    /// Creates a checker with the default probe targets
    pub fn new() -> reqwest::Result<Self> {
        Self::with_urls(vec![
            "https://www.google.com".to_string(),
            "https://www.cloudflare.com".to_string(),
        ])
    }

    /// Creates a checker with custom probe targets
    pub fn with_urls(urls: Vec<String>) -> reqwest::Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            check_urls: urls,
        })
    }

    /// Returns true if any probe target answers a HEAD request
    pub async fn is_online(&self) -> bool {
        for url in &self.check_urls {
            if self.client.head(url).send().await.is_ok() {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_creation() {
        let _checker = ConnectivityChecker::new().expect("Failed to create checker");
    }

    #[tokio::test]
    async fn test_unreachable_urls_report_offline() {
        let checker =
            ConnectivityChecker::with_urls(vec!["http://127.0.0.1:1".to_string()]).unwrap();
        assert!(!checker.is_online().await);
    }
}
