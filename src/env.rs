//! Fns to read variables from the environment more conveniently and help other
//! functions figure out what environment they're running in.

use std::env;

use lazy_static::lazy_static;
use tracing::debug;

const SECRET_LOG_BLACKLIST: [&str; 1] = ["FLIPSIDE_API_KEY"];

lazy_static! {
    pub static ref ENV_CONFIG: EnvConfig = get_env_config();
}

fn obfuscate_if_secret(blacklist: &[&str], key: &str, value: &str) -> String {
    if blacklist.contains(&key) {
        let mut last_four = value.to_string();
        last_four.drain(0..value.len().saturating_sub(4));
        format!("****{last_four}")
    } else {
        value.to_string()
    }
}

/// Get an environment variable, encoding found or missing as Option, and panic otherwise.
pub fn get_env_var(key: &str) -> Option<String> {
    let var = match env::var(key) {
        Err(env::VarError::NotPresent) => None,
        Err(e) => panic!("{e}"),
        Ok(var) => Some(var),
    };

    if let Some(ref existing_var) = var {
        let output = obfuscate_if_secret(&SECRET_LOG_BLACKLIST, key, existing_var);
        debug!("env var {key}: {output}");
    } else {
        debug!("env var {key} requested but not found")
    };

    var
}

pub fn get_env_bool(key: &str) -> Option<bool> {
    get_env_var(key).map(|var| match var.to_lowercase().as_str() {
        "true" => true,
        "false" => false,
        "t" => true,
        "f" => false,
        "1" => true,
        "0" => false,
        str => panic!("invalid bool value {str} for {key}"),
    })
}

pub fn get_env_i64(key: &str) -> Option<i64> {
    get_env_var(key).map(|var| {
        var.parse::<i64>()
            .unwrap_or_else(|_| panic!("invalid i64 value {var} for {key}"))
    })
}

pub struct EnvConfig {
    pub cache_dir: String,
    pub flipside_api_key: String,
    pub flipside_api_url: Option<String>,
    pub log_json: bool,
    pub log_perf: bool,
    pub page_size: Option<i64>,
}

pub fn get_env_config() -> EnvConfig {
    EnvConfig {
        cache_dir: get_env_var("CACHE_DIR").unwrap_or_else(|| "data".to_string()),
        flipside_api_key: get_env_var("FLIPSIDE_API_KEY")
            .expect("FLIPSIDE_API_KEY is required"),
        flipside_api_url: get_env_var("FLIPSIDE_API_URL"),
        log_json: get_env_bool("LOG_JSON").unwrap_or(false),
        log_perf: get_env_bool("LOG_PERF").unwrap_or(false),
        page_size: get_env_i64("PAGE_SIZE"),
    }
}
