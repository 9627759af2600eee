//! Caiyun weather integration
//!
//! Client for the Caiyun Weather API v2.6 (<https://docs.caiyunapp.com>).
//! Provides realtime conditions, hourly and daily forecasts for a coordinate
//! pair. Requires an API token.

pub mod client;
mod models;

pub use client::{CaiyunClient, TOKEN_ENV_VAR, WeatherClient, WeatherConfig, WeatherError};
pub use models::{
    AirQuality, CurrentConditions, DailyForecast, DailyForecastEntry, HourlyForecast,
    HourlyForecastEntry, SkyCondition,
};
