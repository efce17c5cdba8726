use crate::config::{AppConfig, ConfigError};
use std::collections::HashMap;

fn base_env() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("TELEGRAM_TOKEN", "123:abc"),
        ("BOOKING_LOGIN_URL", "https://booking.example/login"),
        ("BOOKING_TABLE_URL", "https://booking.example/bookings"),
        ("BOOKING_USERNAME", "staff@example.com"),
        ("BOOKING_PASSWORD", "hunter2"),
    ])
}

fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
}

#[test]
fn defaults_fill_optional_settings() {
    let config = load(&base_env()).expect("config");

    assert_eq!(config.telegram_chat_id, None);
    assert_eq!(config.telegram_api_base, "https://api.telegram.org");
    assert_eq!(config.scraper.row_selector, ".table-responsive tr");
    assert_eq!(config.scraper.timeout.as_secs(), 60);
    assert_eq!(config.database_path, "booking_watch.sqlite3");
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
    assert!(config.state_file.is_none());
    assert_eq!(config.normalizer.min_cells, 9);
    assert!(matches!(config.require_chat_id(), Err(ConfigError::Missing("TELEGRAM_CHAT_ID"))));
}

#[test]
fn missing_required_value_is_named() {
    let mut env = base_env();
    env.remove("BOOKING_PASSWORD");

    assert!(matches!(load(&env), Err(ConfigError::Missing("BOOKING_PASSWORD"))));
}

#[test]
fn blank_values_count_as_missing() {
    let mut env = base_env();
    env.insert("TELEGRAM_TOKEN", "   ");

    assert!(matches!(load(&env), Err(ConfigError::Missing("TELEGRAM_TOKEN"))));
}

#[test]
fn chat_id_must_be_numeric() {
    let mut env = base_env();
    env.insert("TELEGRAM_CHAT_ID", "-100123");
    assert_eq!(load(&env).expect("config").telegram_chat_id, Some(-100123));

    env.insert("TELEGRAM_CHAT_ID", "@mygroup");
    assert!(matches!(
        load(&env),
        Err(ConfigError::InvalidValue { field: "TELEGRAM_CHAT_ID", .. })
    ));
}

#[test]
fn unassigned_prefix_is_configurable() {
    let mut env = base_env();
    env.insert("UNASSIGNED_PREFIX", "Nobody");
    let config = load(&env).expect("config");

    assert!(config.report.mentions.is_unassigned("Nobody yet"));
    assert!(!config.report.mentions.is_unassigned("Ingen"));
}
