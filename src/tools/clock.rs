use chrono::Local;
use serde_json::json;

use crate::providers::types::tool::Tool;

pub const NAME: &str = "time_checker";

/// `YYYY-MM-DD HH:MM:SS`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local date and time.
pub fn time_checker() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

pub fn time_checker_tool() -> Tool {
    Tool::new(
        NAME,
        "Get the current date and time.",
        json!({"type": "object", "properties": {}, "required": []}),
        |_| Ok(time_checker()),
    )
}
