use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ceverity", rename_all = "lowercase")]
pub enum LogCeverity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for LogCeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogCeverity::Critical => write!(f, "critical"),
            LogCeverity::Warning => write!(f, "warning"),
            LogCeverity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "log_action", rename_all = "lowercase")]
pub enum LogAction {
    Create,
    Read,
    Update,
    Other,
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogAction::Create => write!(f, "create"),
            LogAction::Read => write!(f, "read"),
            LogAction::Update => write!(f, "update"),
            LogAction::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subject_type", rename_all = "lowercase")]
pub enum SubjectType {
    User,
    System,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectType::User => write!(f, "user"),
            SubjectType::System => write!(f, "system"),
        }
    }
}

/// A row ready to be written to `system_log`.
#[derive(Debug, Clone)]
pub struct SystemLogEntry {
    pub subject_id: String,
    pub subject_type: SubjectType,
    pub action: LogAction,
    pub ceverity: LogCeverity,
    pub function: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
}
