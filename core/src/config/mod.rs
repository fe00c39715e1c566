mod load;
mod types;

pub use load::{
    apply_env_overrides, get_workshop_data_dir, load_default, load_from_path, ENV_ACCESS_TOKEN,
    ENV_API_BASE_URL, ENV_IN_FLIGHT_POLICY,
};
pub use types::{ApiConfig, AppConfig, InFlightPolicy, LoggingConfig, SyncConfig};
