use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::WeatherConfig;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Weather provider error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Weather provider unreachable: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        // the request URL carries the API key
        WeatherError::Transport(e.without_url())
    }
}

/// Current conditions for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherReport {
    pub city: String,
    pub country: Option<String>,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u32,
    pub wind_speed: f64,
    pub units: String,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherReport, WeatherError>;
}

/// OpenWeatherMap current-weather client
pub struct OpenWeatherClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            units: config.units.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        tracing::debug!(url = %url, city = %city, "Weather request");

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", self.units.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(WeatherError::CityNotFound(city.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let raw: OwmResponse = response.json().await?;
        Ok(WeatherReport {
            city: raw.name,
            country: raw.sys.and_then(|s| s.country),
            description: raw
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like,
            humidity: raw.main.humidity,
            wind_speed: raw.wind.map(|w| w.speed).unwrap_or_default(),
            units: self.units.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    sys: Option<OwmSys>,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main: OwmMain,
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> OpenWeatherClient {
        let config = WeatherConfig {
            base_url: server.url(),
            units: "metric".to_string(),
        };
        OpenWeatherClient::new(&config, "weather-key").unwrap()
    }

    #[tokio::test]
    async fn test_current_weather() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "London".into()),
                Matcher::UrlEncoded("appid".into(), "weather-key".into()),
                Matcher::UrlEncoded("units".into(), "metric".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{
                    "name": "London",
                    "sys": {"country": "GB"},
                    "weather": [{"main": "Rain", "description": "light rain"}],
                    "main": {"temp": 12.5, "feels_like": 11.0, "humidity": 81},
                    "wind": {"speed": 4.6}
                }"#,
            )
            .create_async()
            .await;

        let report = client_for(&server).current("London").await.unwrap();

        mock.assert_async().await;
        assert_eq!(report.city, "London");
        assert_eq!(report.country.as_deref(), Some("GB"));
        assert_eq!(report.description, "light rain");
        assert_eq!(report.humidity, 81);
        assert_eq!(report.wind_speed, 4.6);
    }

    #[tokio::test]
    async fn test_unknown_city() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"cod": "404", "message": "city not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server).current("Atlantis").await.unwrap_err();
        assert!(matches!(err, WeatherError::CityNotFound(ref c) if c == "Atlantis"));
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("Invalid API key")
            .create_async()
            .await;

        let err = client_for(&server).current("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::Upstream { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_provider_does_not_expose_key() {
        let config = WeatherConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            units: "metric".to_string(),
        };
        let client = OpenWeatherClient::new(&config, "SECRET-KEY-123").unwrap();

        let err = client.current("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::Transport(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));

        let response = crate::error::ApiError::from(err).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_GATEWAY);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("SECRET-KEY-123"));
        assert!(body.contains("Weather provider unreachable"));
    }
}
