use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub api_version: String,
    pub debug_api_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStateResponse {
    pub api_version: String,
    pub telemetry: Option<TelemetrySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub frame: u64,
    pub frame_time_ms: f32,
    pub fps: f32,
    pub clock_mode: String,
    pub scene_time: Option<String>,
    pub speed: i32,
    pub period: Option<String>,
    pub sun_y: Option<f32>,
    pub stars_visible: Option<bool>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub id: String,
    #[serde(flatten)]
    pub command: CommandKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandKind {
    SetSpeed { value: i32 },
    SetTime { hour: u32, minute: u32 },
    SetPlaying { value: bool },
    ResetNow,
    TakeScreenshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandAcceptedResponse {
    pub api_version: String,
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub api_version: String,
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandAppliedEvent {
    pub id: String,
    pub frame: u64,
    pub ok: bool,
    pub message: String,
    pub speed: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    Telemetry(TelemetrySnapshot),
    CommandApplied(CommandAppliedEvent),
}

#[cfg(test)]
mod tests {
    use super::{CommandKind, CommandRequest};

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let request: CommandRequest =
            serde_json::from_str(r#"{"id": "c1", "type": "set_time", "hour": 18, "minute": 30}"#)
                .unwrap();
        assert_eq!(request.id, "c1");
        assert!(matches!(
            request.command,
            CommandKind::SetTime {
                hour: 18,
                minute: 30
            }
        ));

        let request: CommandRequest =
            serde_json::from_str(r#"{"id": "c2", "type": "set_speed", "value": -30}"#).unwrap();
        assert!(matches!(
            request.command,
            CommandKind::SetSpeed { value: -30 }
        ));

        let request: CommandRequest =
            serde_json::from_str(r#"{"id": "c3", "type": "reset_now"}"#).unwrap();
        assert!(matches!(request.command, CommandKind::ResetNow));
    }
}
