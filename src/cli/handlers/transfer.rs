//! `pull` and `push`: stream transfer progress into a [`TransferTracker`].

use eyre::Result;
use log::info;
use ollama::api::{ModelService, PullRequest, PushRequest, TransferProgress};
use ollama::error::SinkError;
use ollama::progress::{DigestLabel, TransferDisplay, TransferTracker};

use crate::cli::commands::Credentials;

/// Pull `model`, returning the display once every indicator is closed
pub async fn pull_model<S, D>(
    service: &S,
    model: &str,
    credentials: &Credentials,
    display: D,
    labels: DigestLabel,
) -> Result<D>
where
    S: ModelService + ?Sized,
    D: TransferDisplay + Send,
{
    info!("Pulling model: {}", model);

    let request = PullRequest {
        name: model.to_string(),
        username: credentials.username.clone(),
        password: credentials.password.clone(),
    };

    let mut tracker = TransferTracker::new(display, labels);
    let result = service
        .pull(&request, &mut |event: TransferProgress| -> std::result::Result<(), SinkError> {
            tracker.handle(&event);
            Ok(())
        })
        .await;

    let display = tracker.finish();
    result?;
    Ok(display)
}

/// Push `model`; same progress contract as [`pull_model`]
pub async fn push_model<S, D>(
    service: &S,
    model: &str,
    credentials: &Credentials,
    display: D,
    labels: DigestLabel,
) -> Result<D>
where
    S: ModelService + ?Sized,
    D: TransferDisplay + Send,
{
    info!("Pushing model: {}", model);

    let request = PushRequest {
        name: model.to_string(),
        username: credentials.username.clone(),
        password: credentials.password.clone(),
    };

    let mut tracker = TransferTracker::new(display, labels);
    let result = service
        .push(&request, &mut |event: TransferProgress| -> std::result::Result<(), SinkError> {
            tracker.handle(&event);
            Ok(())
        })
        .await;

    let display = tracker.finish();
    result?;
    Ok(display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollama::api::MockService;
    use ollama::{ClientError, ErrorResponse};

    /// Records what the tracker asked for, one string per call
    #[derive(Debug, Default)]
    struct Log(Vec<String>);

    impl TransferDisplay for Log {
        fn open(&mut self, label: &str, total: u64, position: u64) {
            self.0.push(format!("open {} {} {}", label, total, position));
        }

        fn set_position(&mut self, position: u64) {
            self.0.push(format!("set {}", position));
        }

        fn finish(&mut self) {
            self.0.push("finish".to_string());
        }

        fn status(&mut self, line: &str) {
            self.0.push(format!("status {}", line));
        }
    }

    fn layer(digest: &str, total: u64, completed: u64) -> TransferProgress {
        TransferProgress {
            status: "downloading".to_string(),
            digest: digest.to_string(),
            total,
            completed,
            percent: None,
        }
    }

    fn status(text: &str) -> TransferProgress {
        TransferProgress {
            status: text.to_string(),
            ..Default::default()
        }
    }

    const LAYER_A: &str = "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const LAYER_B: &str = "sha256:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[tokio::test]
    async fn test_pull_drives_tracker() {
        let service = MockService::new().with_transfer(vec![
            status("pulling manifest"),
            layer(LAYER_A, 100, 0),
            layer(LAYER_A, 100, 100),
            layer(LAYER_B, 10, 10),
            status("success"),
        ]);

        let log = pull_model(&service, "llama", &Credentials::default(), Log::default(), DigestLabel::default())
            .await
            .unwrap();

        assert_eq!(
            log.0,
            vec![
                "status pulling manifest",
                "open aaaaaaaaaaaaaaaa... 100 0",
                "set 100",
                "finish",
                "open bbbbbbbbbbbbbbbb... 10 10",
                "finish",
                "status success",
            ]
        );
    }

    #[tokio::test]
    async fn test_pull_forwards_credentials() {
        let service = MockService::new();
        let credentials = Credentials {
            username: "me".to_string(),
            password: "secret".to_string(),
        };

        pull_model(&service, "me/llama", &credentials, Log::default(), DigestLabel::default())
            .await
            .unwrap();

        let requests = service.pull_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "me/llama");
        assert_eq!(requests[0].username, "me");
        assert_eq!(requests[0].password, "secret");
    }

    #[tokio::test]
    async fn test_pull_error_is_reported() {
        let service = MockService::new()
            .with_transfer(vec![layer(LAYER_A, 100, 50), layer(LAYER_A, 100, 60)])
            .failing_after(1, ErrorResponse::new(500, "disk full"));

        let err = pull_model(&service, "llama", &Credentials::default(), Log::default(), DigestLabel::default())
            .await
            .unwrap_err();

        let client_err = err.downcast_ref::<ClientError>().unwrap();
        assert_eq!(client_err.status_code(), Some(500));
    }

    #[tokio::test]
    async fn test_push_prints_status_lines() {
        let service = MockService::new().with_transfer(vec![
            status("retrieving manifest"),
            layer(LAYER_B, 10, 5),
            status("pushing manifest"),
            status("success"),
        ]);

        let log = push_model(&service, "me/llama", &Credentials::default(), Log::default(), DigestLabel::new(4))
            .await
            .unwrap();

        assert_eq!(
            log.0,
            vec![
                "status retrieving manifest",
                "open bbbb... 10 5",
                "finish",
                "status pushing manifest",
                "status success",
            ]
        );
        assert_eq!(service.push_requests().len(), 1);
    }
}
