//! Weather lookup tools
//!
//! Realtime conditions, hourly forecast and daily forecast for a named city.
//! Every outcome, including a missing token or an unknown city, is rendered
//! as text for the model to read.

use std::{fmt, sync::Arc};

use ai_core::ToolDefinition;
use async_trait::async_trait;
use domain::{LocationTable, ToolArguments};
use integration_weather::{CurrentConditions, DailyForecast, HourlyForecast, WeatherClient};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::ToolHandler;

const REALTIME_TOOL: &str = "get_realtime_weather";
const HOURLY_TOOL: &str = "get_hourly_forecast";
const DAILY_TOOL: &str = "get_daily_forecast";

const DEFAULT_HOURS: u8 = 24;
const MAX_HOURS: u8 = 72;
const DEFAULT_DAYS: u8 = 7;
const MAX_DAYS: u8 = 7;

const MISSING_TOKEN: &str = "Error: CAIYUN_WEATHER_API_TOKEN is not set";

/// Clamp a requested forecast horizon in hours
///
/// Values below 1 fall back to 24, values above 72 are capped at 72.
#[must_use]
pub fn clamp_hours(requested: i64) -> u8 {
    if requested < 1 {
        return DEFAULT_HOURS;
    }
    u8::try_from(requested.min(i64::from(MAX_HOURS))).unwrap_or(MAX_HOURS)
}

/// Clamp a requested forecast horizon in days
///
/// Anything outside 1..=7 falls back to 7.
#[must_use]
pub fn clamp_days(requested: i64) -> u8 {
    match u8::try_from(requested) {
        Ok(days) if (1..=MAX_DAYS).contains(&days) => days,
        _ => DEFAULT_DAYS,
    }
}

/// Shared state of the weather tools
#[derive(Clone)]
pub struct WeatherTools {
    client: Arc<dyn WeatherClient>,
    locations: Arc<LocationTable>,
}

impl fmt::Debug for WeatherTools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherTools")
            .field("locations", &self.locations.len())
            .field("has_credentials", &self.client.has_credentials())
            .finish_non_exhaustive()
    }
}

impl WeatherTools {
    pub fn new(client: Arc<dyn WeatherClient>, locations: Arc<LocationTable>) -> Self {
        Self { client, locations }
    }

    /// Known location names
    #[must_use]
    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    fn not_found(&self, location: &str) -> String {
        let available: Vec<&str> = self.locations.names().collect();
        format!(
            "Location '{location}' not found. Available locations: {}",
            available.join(", ")
        )
    }

    /// Current conditions for a named location
    #[instrument(skip(self))]
    pub async fn get_realtime_weather(&self, location: &str) -> String {
        if !self.client.has_credentials() {
            return MISSING_TOKEN.to_string();
        }
        let Some(coords) = self.locations.lookup(location) else {
            debug!("Location not in table");
            return self.not_found(location);
        };

        match self.client.get_realtime(coords).await {
            Ok(conditions) => format_realtime(location, &conditions),
            Err(e) => {
                warn!(error = %e, "Realtime weather lookup failed");
                format!("Error fetching weather for {location}: {e}")
            },
        }
    }

    /// Hourly forecast for a named location
    #[instrument(skip(self))]
    pub async fn get_hourly_forecast(&self, location: &str, hours: i64) -> String {
        if !self.client.has_credentials() {
            return MISSING_TOKEN.to_string();
        }
        let hours = clamp_hours(hours);
        let Some(coords) = self.locations.lookup(location) else {
            debug!("Location not in table");
            return self.not_found(location);
        };

        match self.client.get_hourly(coords, hours).await {
            Ok(forecast) => format_hourly(location, hours, &forecast),
            Err(e) => {
                warn!(error = %e, "Hourly forecast lookup failed");
                format!("Error fetching hourly forecast for {location}: {e}")
            },
        }
    }

    /// Daily forecast for a named location
    #[instrument(skip(self))]
    pub async fn get_daily_forecast(&self, location: &str, days: i64) -> String {
        if !self.client.has_credentials() {
            return MISSING_TOKEN.to_string();
        }
        let days = clamp_days(days);
        let Some(coords) = self.locations.lookup(location) else {
            debug!("Location not in table");
            return self.not_found(location);
        };

        match self.client.get_daily(coords, days).await {
            Ok(forecast) => format_daily(location, days, &forecast),
            Err(e) => {
                warn!(error = %e, "Daily forecast lookup failed");
                format!("Error fetching daily forecast for {location}: {e}")
            },
        }
    }
}

fn format_realtime(location: &str, c: &CurrentConditions) -> String {
    format!(
        "Weather in {location}:\n\
         Temperature: {}°C\n\
         Humidity: {}%\n\
         Wind: {} m/s from {}°\n\
         Precipitation: {} mm/h\n\
         Air Quality:\n  \
         PM2.5: {} μg/m³\n  \
         PM10: {} μg/m³\n  \
         AQI (China): {}\n\
         Life Index:\n  \
         UV: {}\n  \
         Comfort: {}",
        c.temperature,
        c.humidity_percent(),
        c.wind_speed,
        c.wind_direction,
        c.precipitation_intensity,
        c.air_quality.pm25,
        c.air_quality.pm10,
        c.air_quality.aqi_chn,
        c.ultraviolet,
        c.comfort,
    )
}

fn format_hourly(location: &str, hours: u8, forecast: &HourlyForecast) -> String {
    let lines: String = forecast
        .hours
        .iter()
        .take(usize::from(hours))
        .map(|h| {
            format!(
                "\n{}: {}°C, {}, Wind: {}m/s",
                h.local_time(),
                h.temperature,
                h.sky,
                h.wind_speed
            )
        })
        .collect();
    format!("{hours}-Hour Forecast for {location}:\n{lines}")
}

fn format_daily(location: &str, days: u8, forecast: &DailyForecast) -> String {
    let lines: String = forecast
        .days
        .iter()
        .take(usize::from(days))
        .map(|d| {
            format!(
                "\n{}: {}°C ~ {}°C, {}, Rain: {}%",
                d.day(),
                d.temperature_min,
                d.temperature_max,
                d.sky,
                d.precipitation_probability
            )
        })
        .collect();
    format!("{days}-Day Forecast for {location}:\n{lines}")
}

// ---------------------------------------------------------------------------
// Argument decoding
// ---------------------------------------------------------------------------

fn invalid(tool: &str, reason: impl fmt::Display) -> String {
    format!("Invalid arguments for {tool}: {reason}")
}

fn location_arg<'a>(tool: &str, args: &'a ToolArguments) -> Result<&'a str, String> {
    match args.get("location") {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(Value::Null) | None => Err(invalid(tool, "missing required parameter 'location'")),
        Some(other) => Err(invalid(tool, format!("'location' must be a string, got {other}"))),
    }
}

/// Decode an optional integer horizon parameter
///
/// Accepts integers, integral floats and numeric strings; absent or null
/// yields `default`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn horizon_arg(tool: &str, args: &ToolArguments, key: &str, default: u8) -> Result<i64, String> {
    let integral = |f: f64| (f.fract() == 0.0 && f.is_finite()).then(|| f as i64);

    let value = match args.get(key) {
        None | Some(Value::Null) => return Ok(i64::from(default)),
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        },
        _ => None,
    };

    parsed.ok_or_else(|| invalid(tool, format!("'{key}' must be an integer, got {value}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `get_realtime_weather(location)`
#[derive(Debug, Clone)]
pub struct RealtimeWeatherTool {
    tools: WeatherTools,
}

impl RealtimeWeatherTool {
    pub const fn new(tools: WeatherTools) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolHandler for RealtimeWeatherTool {
    fn name(&self) -> &str {
        REALTIME_TOOL
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            REALTIME_TOOL,
            "Get the current weather for a location",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "City name (e.g., Beijing, Shanghai, London)"
                    }
                },
                "required": ["location"]
            }),
        )
    }

    async fn invoke(&self, arguments: &ToolArguments) -> String {
        match location_arg(REALTIME_TOOL, arguments) {
            Ok(location) => self.tools.get_realtime_weather(location).await,
            Err(message) => message,
        }
    }
}

/// `get_hourly_forecast(location, hours = 24)`
#[derive(Debug, Clone)]
pub struct HourlyForecastTool {
    tools: WeatherTools,
}

impl HourlyForecastTool {
    pub const fn new(tools: WeatherTools) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolHandler for HourlyForecastTool {
    fn name(&self) -> &str {
        HOURLY_TOOL
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            HOURLY_TOOL,
            "Get hourly weather forecast for a location",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string", "description": "City name"},
                    "hours": {"type": "integer", "description": "Number of hours (max 72)"}
                },
                "required": ["location"]
            }),
        )
    }

    async fn invoke(&self, arguments: &ToolArguments) -> String {
        let parsed = location_arg(HOURLY_TOOL, arguments).and_then(|location| {
            horizon_arg(HOURLY_TOOL, arguments, "hours", DEFAULT_HOURS).map(|h| (location, h))
        });
        match parsed {
            Ok((location, hours)) => self.tools.get_hourly_forecast(location, hours).await,
            Err(message) => message,
        }
    }
}

/// `get_daily_forecast(location, days = 7)`
#[derive(Debug, Clone)]
pub struct DailyForecastTool {
    tools: WeatherTools,
}

impl DailyForecastTool {
    pub const fn new(tools: WeatherTools) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolHandler for DailyForecastTool {
    fn name(&self) -> &str {
        DAILY_TOOL
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            DAILY_TOOL,
            "Get daily weather forecast for a location",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string", "description": "City name"},
                    "days": {"type": "integer", "description": "Number of days (max 7)"}
                },
                "required": ["location"]
            }),
        )
    }

    async fn invoke(&self, arguments: &ToolArguments) -> String {
        let parsed = location_arg(DAILY_TOOL, arguments).and_then(|location| {
            horizon_arg(DAILY_TOOL, arguments, "days", DEFAULT_DAYS).map(|d| (location, d))
        });
        match parsed {
            Ok((location, days)) => self.tools.get_daily_forecast(location, days).await,
            Err(message) => message,
        }
    }
}
