use tracing::{info, warn};

use crate::config::Settings;
use crate::metrics::{PROVIDER_CALLS, PROVIDER_FALLBACKS};
use crate::models::{GenerationResult, Provenance, ProviderKind};
use crate::providers::{
    BackendError, BackendErrorKind, BackendOutput, Completion, MockBackend, ModelServiceBackend,
    OpenAiBackend, ProviderBackend,
};

// model names reported when the mock answers instead of a live backend
const MODEL_UNKNOWN_PROVIDER: &str = "mock-unknown";
const MODEL_FALLBACK_ERROR: &str = "mock-fallback-error";

/// Outcome of provider selection, before anything is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    // mock by configuration; `tag` is the provider that would otherwise be used
    ForcedMock { tag: String },
    Backend(ProviderKind),
    Unknown(String),
}

impl Selection {
    /// Identifier of whatever will answer, used in cache keys.
    pub fn identifier(&self) -> &str {
        match self {
            Selection::ForcedMock { .. } => ProviderKind::Mock.as_str(),
            Selection::Backend(kind) => kind.as_str(),
            Selection::Unknown(id) => id,
        }
    }
}

/// Picks a backend for each prompt and turns every backend failure into a
/// mock answer tagged with the provider that was attempted.
pub struct ProviderRouter {
    force_mock: bool,
    default_provider: String,
    mock: MockBackend,
    backends: Vec<ProviderBackend>,
}

impl ProviderRouter {
    pub fn new(settings: &Settings, client: reqwest::Client) -> Self {
        let mut backends = vec![
            ProviderBackend::Mock(MockBackend::new()),
            ProviderBackend::SecondaryHosted(ModelServiceBackend::new(
                client.clone(),
                &settings.model_service,
            )),
        ];

        match OpenAiBackend::new(client, &settings.hosted) {
            Ok(backend) => backends.push(ProviderBackend::PrimaryHosted(backend)),
            Err(e) => warn!(error = %e, "hosted backend disabled"),
        }

        info!(
            force_mock = settings.force_mock,
            default_provider = %settings.default_provider,
            "provider router ready"
        );

        Self::with_backends(settings.force_mock, &settings.default_provider, backends)
    }

    pub fn with_backends(
        force_mock: bool,
        default_provider: &str,
        backends: Vec<ProviderBackend>,
    ) -> Self {
        Self {
            force_mock,
            default_provider: default_provider.trim().to_lowercase(),
            mock: MockBackend::new(),
            backends,
        }
    }

    pub fn select(&self, provider_override: Option<ProviderKind>) -> Selection {
        // an explicit override wins over the blanket mock flag
        if self.force_mock && provider_override.is_none() {
            return Selection::ForcedMock {
                tag: self.default_provider.clone(),
            };
        }

        match provider_override {
            Some(kind) => Selection::Backend(kind),
            None => match ProviderKind::from_identifier(&self.default_provider) {
                Some(kind) => Selection::Backend(kind),
                None => Selection::Unknown(self.default_provider.clone()),
            },
        }
    }

    /// Never fails: a broken or missing backend yields mock text whose
    /// provenance is `mock-fallback-<attempted>`.
    pub async fn dispatch(
        &self,
        prompt: &str,
        provider_override: Option<ProviderKind>,
    ) -> GenerationResult {
        self.complete(&Completion::prompt(prompt), provider_override)
            .await
    }

    /// Same contract as [`dispatch`](Self::dispatch) for a whole conversation.
    pub async fn complete(
        &self,
        completion: &Completion,
        provider_override: Option<ProviderKind>,
    ) -> GenerationResult {
        match self.select(provider_override) {
            Selection::ForcedMock { tag } => {
                info!(provider = %tag, "mock mode, skipping live backends");
                let out = self.mock.complete(completion, &tag);
                result(out, Provenance::Mock)
            }
            Selection::Unknown(id) => {
                warn!(provider = %id, "unknown provider, falling back to mock");
                PROVIDER_FALLBACKS.with_label_values(&[id.as_str()]).inc();
                self.fallback(completion, &id, MODEL_UNKNOWN_PROVIDER)
            }
            Selection::Backend(kind) => {
                if kind != ProviderKind::Mock {
                    PROVIDER_CALLS.with_label_values(&[kind.as_str()]).inc();
                }
                match self.call(kind, completion).await {
                    Ok(out) => result(out, Provenance::from(kind)),
                    Err(e) => {
                        warn!(
                            provider = %kind,
                            kind = %e.kind,
                            error = %e.message,
                            "backend call failed, falling back to mock"
                        );
                        PROVIDER_FALLBACKS.with_label_values(&[kind.as_str()]).inc();
                        self.fallback(completion, kind.as_str(), MODEL_FALLBACK_ERROR)
                    }
                }
            }
        }
    }

    async fn call(
        &self,
        kind: ProviderKind,
        completion: &Completion,
    ) -> Result<BackendOutput, BackendError> {
        match self.backends.iter().find(|b| b.kind() == kind) {
            Some(backend) => backend.complete(completion).await,
            None => Err(BackendError::new(
                BackendErrorKind::AuthMissing,
                format!("{} backend is not configured", kind),
            )),
        }
    }

    fn fallback(&self, completion: &Completion, attempted: &str, model: &str) -> GenerationResult {
        let out = self.mock.complete(completion, attempted);
        GenerationResult {
            text: out.text,
            provider_used: Provenance::MockFallback(attempted.to_string()),
            model: Some(model.to_string()),
        }
    }
}

fn result(out: BackendOutput, provider_used: Provenance) -> GenerationResult {
    GenerationResult {
        text: out.text,
        provider_used,
        model: out.model,
    }
}
