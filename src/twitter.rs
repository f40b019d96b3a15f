//! Blocking HTTP client for `statuses/destroy`, signed with OAuth 1.0a.

use crate::api::{ApiError, DeleteApi, DeleteOutcome, RateLimit};
use crate::date::reset_from_epoch;
use crate::oauth::{authorization_header, new_nonce, Credentials};
use std::time::Duration;
use time::OffsetDateTime;
use ureq::Agent;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1";
pub const HEADER_REMAINING: &str = "x-rate-limit-remaining";
pub const HEADER_RESET: &str = "x-rate-limit-reset";

pub struct TwitterClient {
    agent: Agent,
    api_base: String,
    creds: Credentials,
}

impl TwitterClient {
    pub fn new(creds: Credentials, api_base: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let missing = creds.missing();
        if !missing.is_empty() {
            return Err(ApiError::Credentials(missing.join(", ")));
        }
        // Non-2xx responses still carry rate-limit headers; keep them as responses.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .into();
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Ok(Self { agent, api_base, creds })
    }

    pub fn destroy_url(&self, id: &str) -> String {
        format!("{}/statuses/destroy/{}.json", self.api_base, id.trim())
    }
}

impl DeleteApi for TwitterClient {
    fn delete_post(&mut self, id: &str) -> DeleteOutcome {
        let url = self.destroy_url(id);
        let auth = authorization_header(
            &self.creds,
            "POST",
            &url,
            &[],
            &new_nonce(),
            OffsetDateTime::now_utc().unix_timestamp(),
        );

        let mut response = match self.agent.post(&url).header("Authorization", &auth).send_empty() {
            Ok(r) => r,
            Err(e) => return DeleteOutcome::failed(ApiError::Transport(e.to_string()), None),
        };

        let headers = response.headers();
        let rate_limit = parse_rate_limit(
            headers.get(HEADER_REMAINING).and_then(|v| v.to_str().ok()),
            headers.get(HEADER_RESET).and_then(|v| v.to_str().ok()),
        );

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return DeleteOutcome::ok(rate_limit);
        }
        let body = response.body_mut().read_to_string().unwrap_or_default();
        DeleteOutcome::failed(ApiError::Status { status, body }, Some(rate_limit))
    }
}

/// Header values that do not parse as integers are reported as unknown.
pub fn parse_rate_limit(remaining: Option<&str>, reset: Option<&str>) -> RateLimit {
    RateLimit {
        remaining: remaining.and_then(|s| s.trim().parse::<u64>().ok()),
        reset_at: reset.and_then(|s| s.trim().parse::<i64>().ok()).and_then(reset_from_epoch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn creds() -> Credentials {
        Credentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token_key: "tk".into(),
            access_token_secret: "ts".into(),
        }
    }

    /// Serve one canned response and hand back the raw request text.
    fn spawn_one_shot_http(response: String) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request_buf = [0u8; 4096];
            let n = stream.read(&mut request_buf).unwrap_or(0);
            stream.write_all(response.as_bytes()).unwrap();
            let _ = stream.flush();
            String::from_utf8_lossy(&request_buf[..n]).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn parse_rate_limit_values() {
        let rl = parse_rate_limit(Some("0"), Some("1700000000"));
        assert!(rl.exhausted());
        assert_eq!(rl.reset_at.unwrap().unix_timestamp(), 1_700_000_000);

        let unknown = parse_rate_limit(Some("n/a"), None);
        assert_eq!(unknown.remaining, None);
        assert!(!unknown.exhausted());
    }

    #[test]
    fn success_reads_headers_and_signs_request() {
        let body = "{}";
        let (base, handle) = spawn_one_shot_http(format!(
            "HTTP/1.1 200 OK\r\nx-rate-limit-remaining: 12\r\nx-rate-limit-reset: 1700000000\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));
        let mut client = TwitterClient::new(creds(), base, Duration::from_secs(5)).unwrap();
        let out = client.delete_post("12345");
        let request = handle.join().unwrap();

        assert!(out.error.is_none(), "{:?}", out.error);
        assert_eq!(out.rate_limit.unwrap().remaining, Some(12));
        assert!(request.starts_with("POST /statuses/destroy/12345.json"));
        assert!(request.to_ascii_lowercase().contains("authorization: oauth "));
    }

    #[test]
    fn rate_limited_status_keeps_headers() {
        let body = r#"{"errors":[{"code":88,"message":"Rate limit exceeded"}]}"#;
        let (base, handle) = spawn_one_shot_http(format!(
            "HTTP/1.1 429 Too Many Requests\r\nx-rate-limit-remaining: 0\r\nx-rate-limit-reset: 1700000000\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));
        let mut client = TwitterClient::new(creds(), base, Duration::from_secs(5)).unwrap();
        let out = client.delete_post("1");
        handle.join().unwrap();

        match out.error {
            Some(ApiError::Status { status, ref body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit exceeded"));
            }
            ref other => panic!("expected status error, got {:?}", other),
        }
        assert!(out.rate_limit.unwrap().exhausted());
    }

    #[test]
    fn connection_refused_is_transport_error_without_headers() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let mut client = TwitterClient::new(creds(), format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let out = client.delete_post("1");
        assert!(matches!(out.error, Some(ApiError::Transport(_))));
        assert!(out.rate_limit.is_none());
    }

    #[test]
    fn missing_credentials_rejected() {
        let err = TwitterClient::new(Credentials::default(), DEFAULT_API_BASE, Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, ApiError::Credentials(_)));
    }
}
