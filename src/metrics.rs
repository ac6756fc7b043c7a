use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec, register_gauge,
    register_histogram,
};

// Registration only fails on duplicate names, which would be a programming error
lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("genai_requests_total", "Total number of generation requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("genai_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("genai_cache_misses_total", "Total cache misses").unwrap();
    pub static ref CACHE_ERRORS: Counter =
        register_counter!("genai_cache_errors_total", "Cache reads or writes that failed").unwrap();
    pub static ref PROVIDER_CALLS: CounterVec = register_counter_vec!(
        "genai_provider_calls_total",
        "Live backend calls attempted",
        &["provider"]
    )
    .unwrap();
    pub static ref PROVIDER_FALLBACKS: CounterVec = register_counter_vec!(
        "genai_provider_fallbacks_total",
        "Requests answered by the mock because the attempted provider failed",
        &["provider"]
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "genai_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("genai_cache_size", "Current number of items in the in-memory cache").unwrap();
}
