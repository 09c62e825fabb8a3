//! Request and response types for the model-serving API.
//!
//! Every operation has its own request type and its own event or response
//! type; streaming operations decode one event per line.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inference hyperparameters forwarded to the server untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub seed: i64,

    // Backend options
    #[serde(rename = "numa")]
    pub use_numa: bool,

    // Model options
    pub num_ctx: u32,
    pub num_batch: u32,
    pub num_gpu: u32,
    pub main_gpu: u32,
    pub low_vram: bool,
    pub f16_kv: bool,
    pub logits_all: bool,
    pub vocab_only: bool,
    pub use_mmap: bool,
    pub use_mlock: bool,
    pub embedding_only: bool,

    // Predict options
    pub repeat_last_n: i32,
    pub repeat_penalty: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub temperature: f32,
    pub top_k: i32,
    pub top_p: f32,
    pub tfs_z: f32,
    pub typical_p: f32,
    pub mirostat: i32,
    pub mirostat_tau: f32,
    pub mirostat_eta: f32,

    pub num_thread: u32,
}

impl Default for Options {
    fn default() -> Self {
        let num_thread = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1);

        Self {
            seed: -1,

            use_numa: false,

            num_ctx: 2048,
            num_batch: 512,
            num_gpu: 1,
            main_gpu: 0,
            low_vram: false,
            f16_kv: true,
            logits_all: false,
            vocab_only: false,
            use_mmap: true,
            use_mlock: false,
            embedding_only: false,

            repeat_last_n: 512,
            repeat_penalty: 1.1,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            temperature: 0.8,
            top_k: 40,
            top_p: 0.9,
            tfs_z: 1.0,
            typical_p: 1.0,
            mirostat: 0,
            mirostat_tau: 5.0,
            mirostat_eta: 0.1,

            num_thread,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,

    #[serde(default)]
    pub options: Options,
}

/// One chunk of a generation stream. The final chunk has `done` set and
/// carries the updated context and the timing counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateResponse {
    pub model: String,
    pub created_at: Option<DateTime<Utc>>,
    pub response: String,

    pub done: bool,
    pub context: Vec<i64>,
    pub session_id: Option<i64>,

    /// Durations are nanoseconds on the wire
    pub total_duration: u64,
    pub prompt_eval_count: u64,
    pub prompt_eval_duration: u64,
    pub eval_count: u64,
    pub eval_duration: u64,
}

impl GenerateResponse {
    /// Timing report for verbose output. Lines for zero counters are left out.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if self.total_duration > 0 {
            lines.push(format!(
                "total duration:       {:?}",
                Duration::from_nanos(self.total_duration)
            ));
        }

        if self.prompt_eval_count > 0 {
            lines.push(format!("prompt eval count:    {} token(s)", self.prompt_eval_count));
        }

        if self.prompt_eval_duration > 0 {
            let duration = Duration::from_nanos(self.prompt_eval_duration);
            lines.push(format!("prompt eval duration: {:?}", duration));
            lines.push(format!(
                "prompt eval rate:     {:.2} tokens/s",
                rate(self.prompt_eval_count, duration)
            ));
        }

        if self.eval_count > 0 {
            lines.push(format!("eval count:           {} token(s)", self.eval_count));
        }

        if self.eval_duration > 0 {
            let duration = Duration::from_nanos(self.eval_duration);
            lines.push(format!("eval duration:        {:?}", duration));
            lines.push(format!("eval rate:            {:.2} tokens/s", rate(self.eval_count, duration)));
        }

        lines
    }
}

fn rate(count: u64, duration: Duration) -> f64 {
    count as f64 / duration.as_secs_f64()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Progress record streamed by pull and push.
///
/// `digest` is empty for phases that are not transferring a layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferProgress {
    pub status: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub digest: String,

    pub total: u64,
    pub completed: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateProgress {
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListResponse {
    pub models: Vec<ModelSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSummary {
    pub name: String,
    pub modified_at: DateTime<Utc>,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = Options::default();
        assert_eq!(options.seed, -1);
        assert_eq!(options.num_ctx, 2048);
        assert_eq!(options.num_batch, 512);
        assert!(options.f16_kv);
        assert!(options.use_mmap);
        assert!(!options.use_mlock);
        assert_eq!(options.top_k, 40);
        assert!((options.temperature - 0.8).abs() < f32::EPSILON);
        assert!(options.num_thread >= 1);
    }

    #[test]
    fn test_options_partial_override() {
        let options: Options = serde_json::from_str(r#"{"temperature": 0.2, "numa": true}"#).unwrap();
        assert!((options.temperature - 0.2).abs() < f32::EPSILON);
        assert!(options.use_numa);
        assert_eq!(options.num_ctx, 2048);
    }

    #[test]
    fn test_generate_request_first_turn_omits_state() {
        let request = GenerateRequest {
            model: "llama".to_string(),
            prompt: "hi".to_string(),
            context: Vec::new(),
            session_id: None,
            options: Options::default(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama");
        assert!(json.get("context").is_none());
        assert!(json.get("session_id").is_none());
        assert_eq!(json["options"]["seed"], -1);
    }

    #[test]
    fn test_generate_request_carries_state() {
        let request = GenerateRequest {
            model: "llama".to_string(),
            prompt: "again".to_string(),
            context: vec![1, 2, 3],
            session_id: Some(7),
            options: Options::default(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["context"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["session_id"], 7);
    }

    #[test]
    fn test_generate_response_chunk() {
        let line = r#"{"model":"llama","created_at":"2023-07-04T10:00:00.123Z","response":"Hel","done":false}"#;
        let resp: GenerateResponse = serde_json::from_str(line).unwrap();
        assert_eq!(resp.response, "Hel");
        assert!(!resp.done);
        assert!(resp.context.is_empty());
        assert!(resp.created_at.is_some());
    }

    #[test]
    fn test_generate_response_final() {
        let line = concat!(
            r#"{"model":"llama","done":true,"context":[5,6],"session_id":42,"#,
            r#""eval_count":10,"eval_duration":2000000000}"#,
        );
        let resp: GenerateResponse = serde_json::from_str(line).unwrap();
        assert!(resp.done);
        assert_eq!(resp.context, vec![5, 6]);
        assert_eq!(resp.session_id, Some(42));
        assert_eq!(resp.eval_count, 10);
    }

    #[test]
    fn test_summary_skips_zero_counters() {
        let resp = GenerateResponse {
            eval_count: 10,
            eval_duration: 2_000_000_000,
            ..Default::default()
        };

        let lines = resp.summary();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("eval count:"));
        assert!(lines[1].contains("2s"));
        assert!(lines[2].contains("5.00 tokens/s"));
    }

    #[test]
    fn test_summary_empty() {
        assert!(GenerateResponse::default().summary().is_empty());
    }

    #[test]
    fn test_transfer_progress_without_digest() {
        let event: TransferProgress = serde_json::from_str(r#"{"status":"verifying sha256 digest"}"#).unwrap();
        assert_eq!(event.status, "verifying sha256 digest");
        assert!(event.digest.is_empty());
        assert_eq!(event.total, 0);
        assert_eq!(event.percent, None);
    }

    #[test]
    fn test_transfer_progress_with_digest() {
        let line = r#"{"status":"downloading","digest":"sha256:abc","total":100,"completed":40,"percent":40.0}"#;
        let event: TransferProgress = serde_json::from_str(line).unwrap();
        assert_eq!(event.digest, "sha256:abc");
        assert_eq!(event.total, 100);
        assert_eq!(event.completed, 40);
        assert_eq!(event.percent, Some(40.0));
    }

    #[test]
    fn test_list_response() {
        let body = concat!(
            r#"{"models":[{"name":"llama:latest","#,
            r#""modified_at":"2023-07-04T10:00:00-07:00","size":3825819519}]}"#,
        );
        let list: ListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(list.models.len(), 1);
        assert_eq!(list.models[0].name, "llama:latest");
        assert_eq!(list.models[0].size, 3825819519);
        assert_eq!(list.models[0].modified_at.to_rfc3339(), "2023-07-04T17:00:00+00:00");
    }
}
