use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use crate::cache::{CacheStore, KeyFields};
use crate::metrics::{CACHE_HITS, CACHE_MISSES};
use crate::models::{GenerationRequest, GenerationResult, ProviderKind};
use crate::providers::Completion;
use crate::router::{ProviderRouter, Selection};

pub const GENERATE_NAMESPACE: &str = "genai:generate";

/// One call site: how to key it, what to ask, and how to shape the answer.
pub trait Operation {
    type Output: Serialize + DeserializeOwned;

    /// Prefix that keeps keys of different call sites apart.
    fn namespace(&self) -> &'static str;

    fn provider_override(&self) -> Option<ProviderKind>;

    /// Semantic fields for the cache key, or `None` when answers must not be
    /// reused. `selection` is the backend the router will pick.
    fn key_fields(&self, selection: &Selection) -> Option<KeyFields>;

    fn render_prompt(&self) -> String;

    /// What the backend receives; a single user turn unless overridden.
    fn completion(&self) -> Completion {
        Completion::prompt(self.render_prompt())
    }

    fn shape(&self, result: GenerationResult) -> Self::Output;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated<T> {
    pub value: T,
    pub from_cache: bool,
}

// Cache lookup -> router dispatch -> cache write
pub struct GenerationService {
    router: ProviderRouter,
    cache: CacheStore,
    ttl: Duration,
}

impl GenerationService {
    pub fn new(router: ProviderRouter, cache: CacheStore, ttl: Duration) -> Self {
        Self { router, cache, ttl }
    }

    pub fn router(&self) -> &ProviderRouter {
        &self.router
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn cache_key<O: Operation>(&self, op: &O) -> Option<String> {
        let selection = self.router.select(op.provider_override());
        op.key_fields(&selection)
            .map(|fields| fields.derive_key(op.namespace()))
    }

    pub async fn run<O: Operation>(&self, op: &O) -> Generated<O::Output> {
        let key = self.cache_key(op);

        if let Some(key) = key.as_deref() {
            if let Some(value) = self.cache.get_json::<O::Output>(key).await {
                CACHE_HITS.inc();
                info!(key = key, "cache HIT");
                return Generated {
                    value,
                    from_cache: true,
                };
            }
            CACHE_MISSES.inc();
            info!(key = key, "cache MISS");
        }

        let completion = op.completion();
        debug!(
            namespace = op.namespace(),
            turns = completion.messages.len(),
            chars = completion.last_content().len(),
            "prompt rendered"
        );

        let result = self
            .router
            .complete(&completion, op.provider_override())
            .await;
        let value = op.shape(result);

        // a failed write does not change what we return
        if let Some(key) = key.as_deref() {
            self.cache.put_json(key, &value, self.ttl).await;
        }

        Generated {
            value,
            from_cache: false,
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Generated<GenerationResult> {
        self.run(request).await
    }
}

// The bare request is itself an operation: prompt in, result out
impl Operation for GenerationRequest {
    type Output = GenerationResult;

    fn namespace(&self) -> &'static str {
        GENERATE_NAMESPACE
    }

    fn provider_override(&self) -> Option<ProviderKind> {
        self.provider_override
    }

    fn key_fields(&self, selection: &Selection) -> Option<KeyFields> {
        self.cacheable.then(|| {
            KeyFields::new()
                .field("prompt", &self.prompt)
                .field("provider", selection.identifier())
        })
    }

    fn render_prompt(&self) -> String {
        self.prompt.clone()
    }

    fn shape(&self, result: GenerationResult) -> GenerationResult {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;
    use crate::providers::{MockBackend, ProviderBackend};

    fn service(force_mock: bool, cache: CacheStore) -> GenerationService {
        let router = ProviderRouter::with_backends(
            force_mock,
            "openai",
            vec![ProviderBackend::Mock(MockBackend::new())],
        );
        GenerationService::new(router, cache, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn second_cacheable_call_hits() {
        let svc = service(true, CacheStore::memory());
        let req = GenerationRequest::new("Describe the rollout").cacheable(true);

        let first = svc.generate(&req).await;
        let second = svc.generate(&req).await;

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.value, second.value);
    }

    #[tokio::test]
    async fn non_cacheable_calls_skip_the_cache() {
        let svc = service(true, CacheStore::memory());
        let req = GenerationRequest::new("Ad-hoc question");

        svc.generate(&req).await;
        let again = svc.generate(&req).await;
        assert!(!again.from_cache);
        assert!(svc.cache_key(&req).is_none());
    }

    #[tokio::test]
    async fn disabled_cache_still_answers() {
        let svc = service(true, CacheStore::Disabled);
        let req = GenerationRequest::new("hello").cacheable(true);
        let out = svc.generate(&req).await;
        assert!(!out.from_cache);
        assert_eq!(out.value.provider_used, Provenance::Mock);
    }

    #[tokio::test]
    async fn provider_is_part_of_the_key() {
        let svc = service(true, CacheStore::memory());
        let plain = GenerationRequest::new("hello").cacheable(true);
        let overridden = plain
            .clone()
            .with_override(Some(ProviderKind::SecondaryHosted));
        assert_ne!(svc.cache_key(&plain), svc.cache_key(&overridden));
    }

    #[tokio::test]
    async fn fallback_results_are_cached_with_their_provenance() {
        let svc = service(false, CacheStore::memory());
        let req = GenerationRequest::new("hello").cacheable(true);

        svc.generate(&req).await;
        let hit = svc.generate(&req).await;
        assert!(hit.from_cache);
        assert_eq!(hit.value.provider_used, Provenance::MockFallback("openai".into()));
    }
}
