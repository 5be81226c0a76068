use crate::domain::{Tolerances, AMOUNT_EPSILON, TRANSFER_AMOUNT_EPSILON};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub events_path: String,
    pub method: CostBasisMethod,
    pub tolerances: Tolerances,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBasisMethod {
    /// Average cost basis.
    Acb,
    /// First-in-first-out lot matching.
    Fifo,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let events_path = env_map
            .get("EVENTS_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("EVENTS_PATH".to_string()))?;

        let method = match env_map
            .get("COST_BASIS_METHOD")
            .map(|s| s.as_str())
            .unwrap_or("acb")
        {
            "acb" => CostBasisMethod::Acb,
            "fifo" => CostBasisMethod::Fifo,
            other => {
                return Err(ConfigError::InvalidValue(
                    "COST_BASIS_METHOD".to_string(),
                    format!("must be acb or fifo, got {}", other),
                ))
            }
        };

        let tolerances = Tolerances {
            amount: parse_epsilon(&env_map, "AMOUNT_EPSILON", AMOUNT_EPSILON)?,
            transfer_amount: parse_epsilon(
                &env_map,
                "TRANSFER_AMOUNT_EPSILON",
                TRANSFER_AMOUNT_EPSILON,
            )?,
        };

        Ok(Config {
            events_path,
            method,
            tolerances,
        })
    }
}

fn parse_epsilon(
    env_map: &HashMap<String, String>,
    key: &str,
    default: f64,
) -> Result<f64, ConfigError> {
    let Some(raw) = env_map.get(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be a positive finite number".to_string(),
        )),
    }
}
