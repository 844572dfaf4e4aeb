/// DIAL proxy used when `DIAL_URL` is not set.
pub const DEFAULT_DIAL_URL: &str = "https://ai-proxy.lab.epam.com";

/// Deployment used when none is configured.
pub const DEFAULT_DEPLOYMENT: &str = "dall-e-3";

/// `api-version` query parameter sent with chat completion requests.
pub const DEFAULT_API_VERSION: &str = "2025-01-01-preview";

/// Prompt used when the user submits an empty line.
pub const DEFAULT_PROMPT: &str = "Sunny day on Bali";

pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 4;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Prefix of the name given to attachments that carry no title.
pub const GENERATED_NAME_PREFIX: &str = "generated";

/// `chrono` format of the per-batch timestamp (second granularity).
pub const BATCH_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
