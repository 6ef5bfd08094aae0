//! Code verification backends.
//!
//! A completed code is either compared against an expected value or handed to
//! an external command. Commands run through `sh -c` with the code available
//! as `$1` and in `$KODO_CODE`, under a timeout so a hung verifier cannot
//! wedge the UI.

use std::process::Command;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Default timeout for external verifier commands.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verifier command timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("failed to run verifier command: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("verifier task failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// How a completed code gets checked.
#[derive(Debug, Clone)]
pub enum Verifier {
    /// Compare against a known code.
    Expected(String),
    /// Run a shell command; exit status 0 accepts the code.
    Command(String),
}

impl Verifier {
    pub async fn verify(&self, code: &str, limit: Duration) -> Result<Verdict, VerifyError> {
        match self {
            Verifier::Expected(want) => Ok(if code == want {
                Verdict::Accepted
            } else {
                Verdict::Rejected
            }),
            Verifier::Command(cmd) => run_check(cmd, code, limit).await,
        }
    }
}

async fn run_check(cmd: &str, code: &str, limit: Duration) -> Result<Verdict, VerifyError> {
    let cmd = cmd.to_string();
    let code = code.to_string();

    let result = timeout(
        limit,
        tokio::task::spawn_blocking(move || {
            Command::new("sh")
                .args(["-c", cmd.as_str(), "kodo-check", code.as_str()])
                .env("KODO_CODE", &code)
                .output()
        }),
    )
    .await;

    match result {
        Ok(Ok(Ok(output))) => {
            if output.status.success() {
                Ok(Verdict::Accepted)
            } else {
                tracing::debug!(
                    status = ?output.status.code(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                    "verifier rejected code"
                );
                Ok(Verdict::Rejected)
            }
        }
        Ok(Ok(Err(e))) => Err(VerifyError::Spawn(e)),
        Ok(Err(e)) => Err(VerifyError::Join(e.to_string())),
        Err(_) => Err(VerifyError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expected_code_verdicts() {
        let verifier = Verifier::Expected("123456".to_string());
        let ok = verifier.verify("123456", DEFAULT_CHECK_TIMEOUT).await.unwrap();
        assert_eq!(ok, Verdict::Accepted);
        let bad = verifier.verify("654321", DEFAULT_CHECK_TIMEOUT).await.unwrap();
        assert_eq!(bad, Verdict::Rejected);
    }

    #[tokio::test]
    async fn test_command_verifier_uses_exit_status() {
        let verifier = Verifier::Command(r#"test "$1" = "4242""#.to_string());
        let ok = verifier.verify("4242", DEFAULT_CHECK_TIMEOUT).await.unwrap();
        assert_eq!(ok, Verdict::Accepted);
        let bad = verifier.verify("0000", DEFAULT_CHECK_TIMEOUT).await.unwrap();
        assert_eq!(bad, Verdict::Rejected);
    }

    #[tokio::test]
    async fn test_command_sees_code_in_env() {
        let verifier = Verifier::Command(r#"test "$KODO_CODE" = "$1""#.to_string());
        let verdict = verifier.verify("9876", DEFAULT_CHECK_TIMEOUT).await.unwrap();
        assert_eq!(verdict, Verdict::Accepted);
    }

    #[tokio::test]
    async fn test_command_timeout_is_reported() {
        let verifier = Verifier::Command("sleep 5".to_string());
        let err = verifier
            .verify("1111", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Timeout(_)));
        assert!(err.to_string().contains("timed out"));
    }
}
