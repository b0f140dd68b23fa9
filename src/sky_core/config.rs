use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub location: LocationConfig,
    pub timelapse: TimelapseConfig,
    pub stars: StarsConfig,
    pub skyline: SkylineConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            location: LocationConfig::default(),
            timelapse: TimelapseConfig::default(),
            stars: StarsConfig::default(),
            skyline: SkylineConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn load() -> Self {
        let path = std::path::Path::new("config.json");
        if !path.exists() {
            log::info!("no config.json found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("loaded config.json");
                    config
                }
                Err(e) => {
                    log::warn!("failed to parse config.json: {e}, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("failed to read config.json: {e}, using defaults");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "New York City".to_string(),
            latitude: 40.7128,
            longitude: -74.0060,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelapseConfig {
    pub speed_minutes_per_second: i32,
}

impl Default for TimelapseConfig {
    fn default() -> Self {
        Self {
            speed_minutes_per_second: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarsConfig {
    pub count: u32,
    pub seed: u64,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            count: 4000,
            seed: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkylineConfig {
    pub seed: u64,
    pub width: f32,
    pub max_building_height: f32,
}

impl Default for SkylineConfig {
    fn default() -> Self {
        Self {
            seed: 3,
            width: 150.0,
            max_building_height: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SceneConfig;

    #[test]
    fn defaults_describe_the_stock_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.location.name, "New York City");
        assert!((config.location.latitude - 40.7128).abs() < 1e-9);
        assert_eq!(config.timelapse.speed_minutes_per_second, 60);
        assert_eq!(config.stars.count, 4000);
    }

    #[test]
    fn partial_config_files_fall_back_per_field() {
        let config: SceneConfig =
            serde_json::from_str(r#"{"timelapse": {"speed_minutes_per_second": 10}}"#).unwrap();
        assert_eq!(config.timelapse.speed_minutes_per_second, 10);
        assert_eq!(config.location.name, "New York City");
    }
}
