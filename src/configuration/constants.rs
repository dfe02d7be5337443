pub mod cargo_env {
    pub const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");
}

pub mod env {
    /// Prefix of environment variables overriding settings keys.
    pub const SETTINGS_PREFIX: &str = "TRACKER";
    pub const HOME_DIR: &str = "TRACKER_HOME";
    /// Keys the prefix picks up from the loader's own variables.
    pub const LOADER_KEYS: [&str; 2] = ["home", "settings"];
}

pub mod defaults {
    use std::path::PathBuf;

    pub const HOME_DIR: &str = ".";

    pub fn log_dir() -> PathBuf {
        PathBuf::from("logs")
    }

    pub fn log_file() -> String {
        "run.log".to_owned()
    }

    pub fn log_level() -> String {
        "info".to_owned()
    }
}
