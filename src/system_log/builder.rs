use sqlx::{Pool, Postgres};
use tracing::error;

use crate::{
    auth::models::SubjectId,
    common::error::ServerError,
    system_log::{
        db,
        models::{LogAction, LogCeverity, SubjectType, SystemLogEntry},
    },
};

const MAX_DESCRIPTION_LEN: usize = 512;

pub struct SystemLogBuilder {
    pool: Pool<Postgres>,
    subject: Option<SubjectId>,
    action: Option<LogAction>,
    ceverity: Option<LogCeverity>,
    function: Option<String>,
    description: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl SystemLogBuilder {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self {
            pool: pool.clone(),
            subject: None,
            action: None,
            ceverity: None,
            function: None,
            description: None,
            metadata: None,
        }
    }

    pub fn subject(mut self, subject: SubjectId) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn action(mut self, action: LogAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn ceverity(mut self, ceverity: LogCeverity) -> Self {
        self.ceverity = Some(ceverity);
        self
    }

    pub fn function(mut self, function: &str) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build_entry(&self) -> SystemLogEntry {
        let (subject_id, subject_type) = match self.subject {
            Some(subject) => (subject.to_string(), SubjectType::User),
            None => ("system".to_string(), SubjectType::System),
        };

        SystemLogEntry {
            subject_id,
            subject_type,
            action: self.action.unwrap_or(LogAction::Other),
            ceverity: self.ceverity.unwrap_or(LogCeverity::Info),
            function: self
                .function
                .clone()
                .unwrap_or_else(|| "Not specified".into()),
            description: truncate_description(
                self.description
                    .as_deref()
                    .unwrap_or("No description"),
            ),
            metadata: self.metadata.clone(),
        }
    }

    pub async fn log(self) -> Result<(), ServerError> {
        let entry = self.build_entry();
        db::create_system_log(&self.pool, &entry).await
    }

    pub fn log_async(self) {
        tokio::spawn(async move {
            if let Err(e) = self.log().await {
                error!("Failed to system log async: {}", e);
            }
        });
    }
}

/// Fits the description into the VARCHAR(512) column without splitting a char.
pub fn truncate_description(description: &str) -> String {
    if description.len() <= MAX_DESCRIPTION_LEN {
        return description.to_string();
    }

    let mut end = MAX_DESCRIPTION_LEN - 3;
    while !description.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &description[..end])
}
