pub mod settings;

pub use settings::{
    AppConfig, CalculationConfig, DisplayConfig, LocationConfig, NetworkConfig, TimingProvider,
};
