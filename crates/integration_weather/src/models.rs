//! Weather data models
//!
//! Wire types for the Caiyun v2.6 JSON documents and the flattened forecast
//! types handed to callers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::client::WeatherError;

/// Sky condition ("skycon") as reported by Caiyun
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SkyCondition {
    /// CLEAR_DAY
    ClearDay,
    /// CLEAR_NIGHT
    ClearNight,
    /// PARTLY_CLOUDY_DAY
    PartlyCloudyDay,
    /// PARTLY_CLOUDY_NIGHT
    PartlyCloudyNight,
    /// CLOUDY
    Cloudy,
    /// LIGHT_HAZE
    LightHaze,
    /// MODERATE_HAZE
    ModerateHaze,
    /// HEAVY_HAZE
    HeavyHaze,
    /// LIGHT_RAIN
    LightRain,
    /// MODERATE_RAIN
    ModerateRain,
    /// HEAVY_RAIN
    HeavyRain,
    /// STORM_RAIN
    StormRain,
    /// FOG
    Fog,
    /// LIGHT_SNOW
    LightSnow,
    /// MODERATE_SNOW
    ModerateSnow,
    /// HEAVY_SNOW
    HeavySnow,
    /// STORM_SNOW
    StormSnow,
    /// DUST
    Dust,
    /// SAND
    Sand,
    /// WIND
    Wind,
    /// Code not known to this client, kept verbatim
    Other(String),
}

impl SkyCondition {
    /// Parse a Caiyun skycon code
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "CLEAR_DAY" => Self::ClearDay,
            "CLEAR_NIGHT" => Self::ClearNight,
            "PARTLY_CLOUDY_DAY" => Self::PartlyCloudyDay,
            "PARTLY_CLOUDY_NIGHT" => Self::PartlyCloudyNight,
            "CLOUDY" => Self::Cloudy,
            "LIGHT_HAZE" => Self::LightHaze,
            "MODERATE_HAZE" => Self::ModerateHaze,
            "HEAVY_HAZE" => Self::HeavyHaze,
            "LIGHT_RAIN" => Self::LightRain,
            "MODERATE_RAIN" => Self::ModerateRain,
            "HEAVY_RAIN" => Self::HeavyRain,
            "STORM_RAIN" => Self::StormRain,
            "FOG" => Self::Fog,
            "LIGHT_SNOW" => Self::LightSnow,
            "MODERATE_SNOW" => Self::ModerateSnow,
            "HEAVY_SNOW" => Self::HeavySnow,
            "STORM_SNOW" => Self::StormSnow,
            "DUST" => Self::Dust,
            "SAND" => Self::Sand,
            "WIND" => Self::Wind,
            other => Self::Other(other.to_string()),
        }
    }

    /// The Caiyun code for this condition
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::ClearDay => "CLEAR_DAY",
            Self::ClearNight => "CLEAR_NIGHT",
            Self::PartlyCloudyDay => "PARTLY_CLOUDY_DAY",
            Self::PartlyCloudyNight => "PARTLY_CLOUDY_NIGHT",
            Self::Cloudy => "CLOUDY",
            Self::LightHaze => "LIGHT_HAZE",
            Self::ModerateHaze => "MODERATE_HAZE",
            Self::HeavyHaze => "HEAVY_HAZE",
            Self::LightRain => "LIGHT_RAIN",
            Self::ModerateRain => "MODERATE_RAIN",
            Self::HeavyRain => "HEAVY_RAIN",
            Self::StormRain => "STORM_RAIN",
            Self::Fog => "FOG",
            Self::LightSnow => "LIGHT_SNOW",
            Self::ModerateSnow => "MODERATE_SNOW",
            Self::HeavySnow => "HEAVY_SNOW",
            Self::StormSnow => "STORM_SNOW",
            Self::Dust => "DUST",
            Self::Sand => "SAND",
            Self::Wind => "WIND",
            Self::Other(code) => code,
        }
    }

    /// Get a human-readable description of the condition
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::ClearDay => "Clear (day)",
            Self::ClearNight => "Clear (night)",
            Self::PartlyCloudyDay => "Partly cloudy (day)",
            Self::PartlyCloudyNight => "Partly cloudy (night)",
            Self::Cloudy => "Cloudy",
            Self::LightHaze => "Light haze",
            Self::ModerateHaze => "Moderate haze",
            Self::HeavyHaze => "Heavy haze",
            Self::LightRain => "Light rain",
            Self::ModerateRain => "Moderate rain",
            Self::HeavyRain => "Heavy rain",
            Self::StormRain => "Storm rain",
            Self::Fog => "Fog",
            Self::LightSnow => "Light snow",
            Self::ModerateSnow => "Moderate snow",
            Self::HeavySnow => "Heavy snow",
            Self::StormSnow => "Storm snow",
            Self::Dust => "Dust",
            Self::Sand => "Sand",
            Self::Wind => "Windy",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for SkyCondition {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<SkyCondition> for String {
    fn from(sky: SkyCondition) -> Self {
        sky.code().to_string()
    }
}

impl fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Air quality readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    /// PM2.5 in μg/m³
    pub pm25: f64,
    /// PM10 in μg/m³
    pub pm10: f64,
    /// Air quality index (China standard)
    pub aqi_chn: f64,
}

/// Realtime conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity as a fraction (0.0-1.0)
    pub humidity: f64,
    /// Sky condition
    pub sky: SkyCondition,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees
    pub wind_direction: f64,
    /// Local precipitation intensity in mm/h
    pub precipitation_intensity: f64,
    /// Air quality
    pub air_quality: AirQuality,
    /// Ultraviolet life index description
    pub ultraviolet: String,
    /// Comfort life index description
    pub comfort: String,
}

impl CurrentConditions {
    /// Humidity as a percentage (0-100)
    #[must_use]
    pub fn humidity_percent(&self) -> f64 {
        (self.humidity * 100.0).round()
    }
}

/// One hour of an hourly forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastEntry {
    /// Local date-time as reported, e.g. `2024-01-15T12:00+08:00`
    pub datetime: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Sky condition
    pub sky: SkyCondition,
    /// Wind speed in m/s
    pub wind_speed: f64,
}

impl HourlyForecastEntry {
    /// Date-time without the timezone offset
    #[must_use]
    pub fn local_time(&self) -> &str {
        self.datetime.split('+').next().unwrap_or(&self.datetime)
    }
}

/// Hourly forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Forecast hours, oldest first
    pub hours: Vec<HourlyForecastEntry>,
}

/// One day of a daily forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    /// Date as reported, e.g. `2024-01-15T00:00+08:00`
    pub date: String,
    /// Minimum temperature in Celsius
    pub temperature_min: f64,
    /// Maximum temperature in Celsius
    pub temperature_max: f64,
    /// Dominant sky condition
    pub sky: SkyCondition,
    /// Precipitation probability percentage (0-100)
    pub precipitation_probability: f64,
}

impl DailyForecastEntry {
    /// Calendar date portion (before `T`)
    #[must_use]
    pub fn day(&self) -> &str {
        self.date.split('T').next().unwrap_or(&self.date)
    }
}

/// Daily forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Forecast days, oldest first
    pub days: Vec<DailyForecastEntry>,
}

// ============================================================================
// Wire types
// ============================================================================

/// Caiyun response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub status: String,
    pub error: Option<String>,
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RealtimeResult {
    pub realtime: RealtimeData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RealtimeData {
    pub temperature: f64,
    pub humidity: f64,
    pub skycon: SkyCondition,
    pub wind: WindData,
    pub precipitation: RealtimePrecipitation,
    pub air_quality: AirQualityData,
    pub life_index: LifeIndexData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WindData {
    pub speed: f64,
    pub direction: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RealtimePrecipitation {
    pub local: LocalPrecipitation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocalPrecipitation {
    pub intensity: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirQualityData {
    pub pm25: f64,
    pub pm10: f64,
    pub aqi: AqiData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AqiData {
    pub chn: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LifeIndexData {
    pub ultraviolet: LifeIndexEntry,
    pub comfort: LifeIndexEntry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LifeIndexEntry {
    pub desc: String,
}

impl From<RealtimeData> for CurrentConditions {
    fn from(data: RealtimeData) -> Self {
        Self {
            temperature: data.temperature,
            humidity: data.humidity,
            sky: data.skycon,
            wind_speed: data.wind.speed,
            wind_direction: data.wind.direction,
            precipitation_intensity: data.precipitation.local.intensity,
            air_quality: AirQuality {
                pm25: data.air_quality.pm25,
                pm10: data.air_quality.pm10,
                aqi_chn: data.air_quality.aqi.chn,
            },
            ultraviolet: data.life_index.ultraviolet.desc,
            comfort: data.life_index.comfort.desc,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourlyResult {
    pub hourly: HourlyData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourlyData {
    pub temperature: Vec<HourlyValue>,
    pub skycon: Vec<HourlySkycon>,
    pub wind: Vec<HourlyWind>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourlyValue {
    pub datetime: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourlySkycon {
    pub value: SkyCondition,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourlyWind {
    pub speed: f64,
}

impl TryFrom<HourlyData> for HourlyForecast {
    type Error = WeatherError;

    fn try_from(data: HourlyData) -> Result<Self, Self::Error> {
        let mut hours = Vec::with_capacity(data.temperature.len());

        for (i, temp) in data.temperature.into_iter().enumerate() {
            let sky = data
                .skycon
                .get(i)
                .ok_or_else(|| WeatherError::ParseError(format!("missing hourly skycon #{i}")))?;
            let wind = data
                .wind
                .get(i)
                .ok_or_else(|| WeatherError::ParseError(format!("missing hourly wind #{i}")))?;

            hours.push(HourlyForecastEntry {
                datetime: temp.datetime,
                temperature: temp.value,
                sky: sky.value.clone(),
                wind_speed: wind.speed,
            });
        }

        Ok(Self { hours })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyResult {
    pub daily: DailyData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyData {
    pub temperature: Vec<DailyTemperature>,
    pub skycon: Vec<DailySkycon>,
    pub precipitation: Vec<DailyPrecipitation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyTemperature {
    pub date: String,
    pub max: f64,
    pub min: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailySkycon {
    pub value: SkyCondition,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyPrecipitation {
    #[serde(default)]
    pub probability: Option<f64>,
}

impl TryFrom<DailyData> for DailyForecast {
    type Error = WeatherError;

    fn try_from(data: DailyData) -> Result<Self, Self::Error> {
        let mut days = Vec::with_capacity(data.temperature.len());

        for (i, temp) in data.temperature.into_iter().enumerate() {
            let sky = data
                .skycon
                .get(i)
                .ok_or_else(|| WeatherError::ParseError(format!("missing daily skycon #{i}")))?;
            let precipitation = data.precipitation.get(i).ok_or_else(|| {
                WeatherError::ParseError(format!("missing daily precipitation #{i}"))
            })?;

            days.push(DailyForecastEntry {
                date: temp.date,
                temperature_min: temp.min,
                temperature_max: temp.max,
                sky: sky.value.clone(),
                precipitation_probability: precipitation.probability.unwrap_or(0.0),
            });
        }

        Ok(Self { days })
    }
}
