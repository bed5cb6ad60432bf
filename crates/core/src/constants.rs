/// Constants used throughout the secrets-init codebase
// Scheme tags
pub const GCP_SECRET_MANAGER_SCHEME: &str = "gcp:secretmanager:";

// Version sentinel used when a reference does not pin one
pub const LATEST_VERSION: &str = "latest";

// Environment variable names
pub const SECRETS_INIT_LOG_VAR: &str = "SECRETS_INIT_LOG";

// Default log filter when SECRETS_INIT_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "info";
