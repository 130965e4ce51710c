// sandbox/ - Request boundary of the AI sandbox
//
// The page next to the particle canvas turns a prompt into a small
// self-contained HTML document. This module holds everything about that
// exchange that isn't network I/O: per-client rate limiting, the request
// and response shapes, the upstream payload and the document check.

mod generate;
mod limiter;

pub use generate::{
    api_key, build_payload, extract_document, validate_prompt, GenerateError, GenerateRequest, GenerateResponse,
    GenerationConfig, SYSTEM_PROMPT,
};
pub use limiter::{client_key, LimiterConfig, RateLimit, RateLimiter};
