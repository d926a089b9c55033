//! User prompts raised by the manager.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::ComponentResult;

/// A yes/no question shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub text: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

#[async_trait]
pub trait AlertService: Send + Sync {
    async fn alert(&self, title: &str, text: &str);

    /// `Ok(true)` only on explicit confirmation.
    async fn confirm(&self, request: &ConfirmRequest) -> ComponentResult<bool>;
}

/// Headless alerts: log everything, decline every confirmation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertService;

#[async_trait]
impl AlertService for LogAlertService {
    async fn alert(&self, title: &str, text: &str) {
        warn!(title = %title, "{}", text);
    }

    async fn confirm(&self, request: &ConfirmRequest) -> ComponentResult<bool> {
        info!(title = %request.title, "Declining confirmation without an interactive user");
        Ok(false)
    }
}
