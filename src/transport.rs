//! Remote secret-store transport.
//!
//! The engine never talks to the network itself; it hands the encoded
//! payload to a [`SecretStore`] implementation. The production
//! implementation shells out to the GitHub CLI, which carries its own
//! authentication state.

use crate::error::TransportError;
use crate::exec;

/// Destination for encoded bundle payloads.
///
/// Implementations must be injectable so orchestration can be tested
/// without a live store.
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    /// Write `payload` as secret `secret` in `environment` of `repo`,
    /// creating or overwriting it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unavailable`] when the store client is not
    /// installed and [`TransportError::StoreRejected`] when the store
    /// refuses the write.
    fn put_secret(
        &self,
        repo: &str,
        environment: &str,
        secret: &str,
        payload: &str,
    ) -> Result<(), TransportError>;
}

/// Secret store backed by the `gh` CLI.
///
/// Writes environment-scoped repository secrets with
/// `gh secret set <NAME> --repo <repo> --env <environment>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GhSecretStore;

impl SecretStore for GhSecretStore {
    fn put_secret(
        &self,
        repo: &str,
        environment: &str,
        secret: &str,
        payload: &str,
    ) -> Result<(), TransportError> {
        if !exec::which("gh") {
            return Err(TransportError::Unavailable {
                client: "gh".to_string(),
            });
        }

        let result = exec::run_unchecked(
            "gh",
            &[
                "secret",
                "set",
                secret,
                "--repo",
                repo,
                "--env",
                environment,
                "--body",
                payload,
            ],
        )
        .map_err(|e| TransportError::StoreRejected {
            message: e.to_string(),
        })?;

        if result.success {
            Ok(())
        } else {
            let detail = result.stderr.trim();
            Err(TransportError::StoreRejected {
                message: if detail.is_empty() {
                    format!("gh exited with code {:?}", result.code)
                } else {
                    detail.to_string()
                },
            })
        }
    }
}
