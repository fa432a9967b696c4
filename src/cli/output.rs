use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

use crate::api::Activity;
use crate::error::{JulesError, Result};

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
    }
}

/// Flat error object printed on stdout in robot mode.
#[must_use]
pub fn robot_error(err: &JulesError) -> serde_json::Value {
    serde_json::json!({
        "error": true,
        "code": err.code(),
        "message": err.to_string(),
        "status": err.status(),
    })
}

pub fn emit_robot<T: Serialize>(response: &RobotResponse<T>) -> Result<()> {
    emit_json(response)
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 14,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let key_style = style(key).dim().to_string();
        self.lines.push(format!(
            "{key_style:width$} {value}",
            width = self.key_width
        ));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// One line per activity: id, originator, kind, create time.
    pub fn activities(&mut self, activities: &[Activity]) -> &mut Self {
        if activities.is_empty() {
            return self.push_line("No activities.");
        }
        for activity in activities {
            let originator = activity
                .originator
                .as_ref()
                .map_or("-", crate::api::Originator::as_str);
            let line = format!(
                "{}  {:<6} {:<20} {}",
                style(&activity.id).cyan(),
                originator,
                activity.kind().unwrap_or("-"),
                activity.create_time.as_deref().unwrap_or("")
            );
            self.lines.push(line.trim_end().to_string());
        }
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}
