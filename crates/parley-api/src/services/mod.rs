pub mod in_flight;
pub mod orchestrator;
pub mod weather;

pub use in_flight::{InFlight, InFlightGuard};
pub use orchestrator::{ChatOrchestrator, GenerateInput, GenerateOutput};
pub use weather::{OpenWeatherClient, WeatherError, WeatherProvider, WeatherReport};
