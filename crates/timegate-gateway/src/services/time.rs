//! The `get_time` tool: current date and time in a caller-supplied timezone.
//!
//! Timezone resolution order: explicit `timezone` argument, then the
//! `X-Timezone` header the stream was opened with (carried in `CallContext`),
//! which defaults to UTC.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{json, Value};

use timegate_core::error::{Result, TimeGateError};
use timegate_core::protocol::mcp;

use crate::dispatch::{CallContext, ToolService};

pub const TOOL_NAME: &str = "get_time";

const TIME_FORMAT: &str = "%A, %d %B %Y, %H:%M:%S %Z";

#[derive(Default)]
pub struct TimeService;

impl TimeService {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GetTimeArgs {
    #[serde(default)]
    timezone: Option<String>,
}

fn resolve_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| TimeGateError::BadRequest(format!("unknown timezone: {name}")))
}

fn format_in(tz: Tz, at: DateTime<Utc>) -> String {
    at.with_timezone(&tz).format(TIME_FORMAT).to_string()
}

#[async_trait]
impl ToolService for TimeService {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn descriptor(&self) -> Value {
        mcp::tool_descriptor(
            TOOL_NAME,
            "Get current date and time in the requested timezone",
            json!({
                "type": "object",
                "properties": {
                    "timezone": {
                        "type": "string",
                        "description": "IANA timezone name (e.g. 'Europe/London'). Defaults to the stream's X-Timezone header, then UTC"
                    }
                }
            }),
        )
    }

    async fn call(&self, ctx: CallContext, args: Value) -> Result<Value> {
        let args: GetTimeArgs = if args.is_null() {
            GetTimeArgs::default()
        } else {
            serde_json::from_value(args)
                .map_err(|e| TimeGateError::BadRequest(format!("invalid arguments: {e}")))?
        };
        let name = args.timezone.as_deref().unwrap_or_else(|| ctx.timezone());
        let tz = resolve_timezone(name)?;
        Ok(mcp::tool_result_text(format_in(tz, Utc::now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_in_requested_timezone() {
        // 2024-06-01 12:00:00 UTC is 13:00 BST in London.
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let tz = resolve_timezone("Europe/London").unwrap();
        assert_eq!(format_in(tz, at), "Saturday, 01 June 2024, 13:00:00 BST");
    }

    #[test]
    fn utc_formatting_matches_reference_shape() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 5, 7).unwrap();
        let tz = resolve_timezone("UTC").unwrap();
        assert_eq!(format_in(tz, at), "Monday, 15 January 2024, 09:05:07 UTC");
    }

    #[test]
    fn unknown_timezone_is_a_bad_request() {
        let err = resolve_timezone("Mars/Olympus_Mons").unwrap_err();
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }
}
