use rmcp::{
    RoleServer, ServerHandler,
    handler::server::{
        router::{prompt::PromptRouter, tool::ToolRouter},
        wrapper::Parameters,
    },
    model::*,
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router,
};

use crate::cli::Config;
use crate::core::provider::TimeServer;
use crate::core::{
    error::McpResult,
    models::{
        GetCurrentTimeRequest, ListTimezonesRequest, TimeCalculateRequest, TimezoneConvertRequest,
    },
};

/// Time MCP Server with timezone-aware time operations
#[derive(Clone)]
pub struct TimeService {
    time_server: TimeServer,
    default_timezone_name: String, // Cache this
    local_timezone_name: String,
    tool_router: ToolRouter<TimeService>,
    prompt_router: PromptRouter<TimeService>,
}

impl TimeService {
    pub fn new(config: Config) -> Self {
        let time_server = TimeServer::new(config.default_timezone);
        let default_timezone_name = time_server.default_timezone.name().to_string();
        let local_timezone_name = time_server.local_timezone.name().to_string();

        Self {
            time_server,
            default_timezone_name,
            local_timezone_name,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    fn create_resource_text(&self, uri: &str, name: &str) -> Resource {
        RawResource::new(uri, name.to_string()).no_annotation()
    }

    pub(crate) fn get_default_timezone_name(&self) -> &str {
        &self.default_timezone_name
    }

    fn generate_status_content(&self) -> McpResult<String> {
        let current_time = self.time_server.get_current_time(None)?;

        Ok(format!(
            r#"Time MCP Server Status

Server: Running
Default Timezone: {}
Detected Local Timezone: {}
Current Time: {} ({})
Tools Available: 4
Prompts Available: 1
Resources Available: 3

Capabilities:
- Current time queries for any IANA timezone
- Calendar arithmetic with month-overflow clamping
- Time conversion between timezones
- Timezone catalog listing with region filtering
- Automatic DST handling"#,
            self.default_timezone_name,
            self.local_timezone_name,
            current_time.datetime,
            current_time.weekday
        ))
    }

    fn generate_help_content(&self) -> String {
        format!(
            r#"Time MCP Server Help

TOOLS:
- get_current_time: Get the current time in a timezone
  - timezone: IANA timezone name (optional, default {default_tz})
  - format: custom strftime pattern (optional; returns a plain string instead of the record)
  - Example: {{"timezone": "America/New_York"}}

- time_calculate: Add or subtract a calendar offset from a base time
  - base_time: epoch seconds/milliseconds or date-time string (optional, default now)
  - years, months, days, hours, minutes, seconds: signed integers (optional, default 0)
  - timezone: IANA timezone name (optional, default {default_tz})
  - Example: {{"base_time": "2026-01-01", "months": -1}}

- timezone_convert: Convert a time between timezones
  - time: epoch seconds/milliseconds or date-time string (required)
  - from_tz: source IANA timezone name (optional, default {default_tz})
  - to_tz: target IANA timezone name (required)
  - Example: {{"time": "2026-01-12 12:00:00", "from_tz": "Asia/Shanghai", "to_tz": "America/New_York"}}

- list_timezones: List available IANA timezone identifiers
  - region: area filter such as "Asia", "America", "Europe" (optional)
  - Example: {{"region": "Asia"}}

PROMPTS:
- timezone_guidance: Get best practices for time and timezone usage

RESOURCES:
- time://status: Current server status and default timezone
- time://help: This help documentation
- time://timezones: Quick reference of commonly used timezones

TIME INPUT FORMATS:
- Epoch seconds: 1704067200 (10 digits or fewer)
- Epoch milliseconds: 1704067200000 (more than 10 digits)
- Date: "2026-01-01" (midnight)
- Date-time: "2026-01-01 12:30:00"
- ISO 8601 with offset: "2026-01-01T12:30:00+08:00"
- Numeric strings like "1704067200" behave exactly like the number

TIMEZONE FORMAT:
- Use full IANA names: 'America/New_York', 'Europe/London'
- Avoid abbreviations: 'EST', 'PST' (ambiguous)

DST HANDLING:
- Conversions account for daylight saving rules in effect at the given date
- Month arithmetic clamps to the last valid day (Jan 31 + 1 month = Feb 28/29)"#,
            default_tz = self.default_timezone_name
        )
    }

    fn generate_timezone_list_content(&self) -> &'static str {
        r#"Commonly Used IANA Timezone Names

ASIA:
- Asia/Shanghai (China Standard Time)
- Asia/Tokyo (Japan Standard Time)
- Asia/Seoul (Korea Standard Time)
- Asia/Singapore (Singapore Time)
- Asia/Hong_Kong (Hong Kong Time)

AMERICAS:
- America/New_York (Eastern Time)
- America/Chicago (Central Time)
- America/Los_Angeles (Pacific Time)

EUROPE:
- Europe/London (Greenwich Mean Time)
- Europe/Paris (Central European Time)
- Europe/Berlin (Central European Time)

OCEANIA:
- Australia/Sydney (Australian Eastern Time)
- Pacific/Auckland (New Zealand Time)

SPECIAL:
- UTC (Coordinated Universal Time)

Use the list_timezones tool for the full catalog, optionally filtered by
region. Many timezones observe Daylight Saving Time (DST) and will
automatically adjust their offsets during DST periods."#
    }
}

impl Default for TimeService {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[tool_router]
impl TimeService {
    #[tool(
        description = "Get the current time in a timezone, as a structured record or rendered with a custom strftime pattern"
    )]
    pub(crate) async fn get_current_time(
        &self,
        Parameters(req): Parameters<GetCurrentTimeRequest>,
    ) -> McpResult<CallToolResult> {
        let pattern = req.format.as_deref().filter(|pattern| !pattern.is_empty());
        let rendered = match pattern {
            Some(pattern) => self
                .time_server
                .format_current_time(req.timezone.as_deref(), pattern)?,
            None => {
                let result = self.time_server.get_current_time(req.timezone.as_deref())?;
                serde_json::to_string_pretty(&result).unwrap()
            }
        };

        Ok(CallToolResult::success(vec![Content::text(rendered)]))
    }

    #[tool(
        description = "Add or subtract years, months, days, hours, minutes and seconds from a base time"
    )]
    pub(crate) async fn time_calculate(
        &self,
        Parameters(req): Parameters<TimeCalculateRequest>,
    ) -> McpResult<CallToolResult> {
        let result = self.time_server.calculate_time(
            req.base_time.as_ref(),
            &req.offset,
            req.timezone.as_deref(),
        )?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&result).unwrap(),
        )]))
    }

    #[tool(description = "Convert a time from one timezone to another")]
    pub(crate) async fn timezone_convert(
        &self,
        Parameters(req): Parameters<TimezoneConvertRequest>,
    ) -> McpResult<CallToolResult> {
        let result = self.time_server.convert_timezone(
            req.time.as_ref(),
            req.from_tz.as_deref(),
            &req.to_tz,
        )?;

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&result).unwrap(),
        )]))
    }

    #[tool(
        description = "List available IANA timezone identifiers, optionally filtered by region"
    )]
    pub(crate) async fn list_timezones(
        &self,
        Parameters(req): Parameters<ListTimezonesRequest>,
    ) -> McpResult<CallToolResult> {
        let region = req.region.as_deref().filter(|region| !region.is_empty());
        let result = self.time_server.list_timezones(region);

        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&result).unwrap(),
        )]))
    }
}

#[prompt_router]
impl TimeService {
    /// Generate guidance for effective time and timezone usage
    #[prompt(name = "timezone_guidance")]
    async fn timezone_guidance(
        &self,
        _ctx: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<Vec<PromptMessage>> {
        let default_tz = self.get_default_timezone_name();
        let guidance = format!(
            r#"Time and Timezone Best Practices:

1. **IANA Timezone Names**
   - Use full IANA timezone names (e.g., 'America/New_York', 'Europe/London')
   - Avoid abbreviations like 'EST' or 'PST' as they can be ambiguous
   - The server default timezone is: {}

2. **Time Inputs**
   - Epoch timestamps work in seconds (1704067200) or milliseconds (1704067200000);
     the resolution is detected from the number of digits
   - Date-time strings: '2026-01-01', '2026-01-01 12:30:00', or ISO 8601 with offset
   - A string carrying its own offset keeps that instant; a naive string is
     interpreted in the requested timezone

3. **Calendar Arithmetic**
   - time_calculate applies years/months first, then days and smaller units
   - Adding a month to Jan 31 clamps to the last day of February, it never
     rolls into March
   - Month arithmetic across a clamp is not reversible; day/hour offsets are

4. **Daylight Saving Time**
   - Conversions use the DST rules in effect at the given date
   - Wall-clock times that fall in a spring-forward gap are rejected

5. **Error Handling**
   - Invalid timezone names, unparsable times and unsupported format
     patterns each return a structured error"#,
            default_tz
        );

        Ok(vec![PromptMessage {
            role: PromptMessageRole::Assistant,
            content: PromptMessageContent::text(guidance),
        }])
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for TimeService {
    fn get_info(&self) -> ServerInfo {
        let default_tz = self.get_default_timezone_name();
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "Time MCP Server for time queries, calendar arithmetic and timezone conversion. Tools: get_current_time, time_calculate, timezone_convert, list_timezones. Default timezone: {}. Use IANA timezone names.",
                default_tz
            )),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ListResourcesResult> {
        Ok(ListResourcesResult {
            resources: vec![
                self.create_resource_text("time://status", "server-status"),
                self.create_resource_text("time://help", "help-documentation"),
                self.create_resource_text("time://timezones", "timezone-list"),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ReadResourceResult> {
        match uri.as_str() {
            "time://status" => {
                let status = self.generate_status_content()?;
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(status, uri)],
                })
            }
            "time://help" => {
                let help = self.generate_help_content();
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(help, uri)],
                })
            }
            "time://timezones" => {
                let common_timezones = self.generate_timezone_list_content();
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(common_timezones, uri)],
                })
            }
            _ => Err(crate::core::error::TimeServerError::ResourceNotFound {
                uri: uri.to_string(),
            }
            .into()),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<rmcp::RoleServer>,
    ) -> McpResult<ListResourceTemplatesResult> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: Vec::new(),
        })
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<InitializeResult> {
        tracing::info!("Time MCP Server initialized successfully");
        Ok(self.get_info())
    }
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    use rmcp::{ServiceExt, transport::stdio};

    let service = TimeService::new(config).serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
