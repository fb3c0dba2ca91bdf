use super::builder::default_config_content;
use super::validation::validate_config;
use super::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn create_test_config() -> Config {
    Config {
        wake_time: Some("06:00".to_string()),
        work_time: Some("09:00".to_string()),
        bedtime: Some("21:00".to_string()),
        sleep_time: Some("22:00".to_string()),
        time_zone: Some("UTC".to_string()),
        ..Config::default()
    }
}

fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lullaby.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn test_config_defaults() {
    let config = create_test_config();
    assert_eq!(config.base_volume(), DEFAULT_BASE_VOLUME);
    assert_eq!(config.wake_volume(), DEFAULT_WAKE_VOLUME);
    assert_eq!(config.volume_up_amount(), DEFAULT_VOLUME_UP_AMOUNT);
    assert_eq!(config.volume_down_amount(), DEFAULT_VOLUME_DOWN_AMOUNT);
    assert_eq!(config.ticker_interval().unwrap(), Duration::from_secs(30));
    assert_eq!(config.dial_mode(), DialMode::Schedule);
    assert_eq!(config.dial_file(), PathBuf::from(DEFAULT_DIAL_FILE));
    assert_eq!(config.stream(), DEFAULT_STREAM);
    assert_eq!(config.player_command(), "mpc");
    assert!(!config.debug());
}

#[test]
fn test_config_schedule_uses_configured_times() {
    let schedule = create_test_config().schedule();
    assert_eq!(schedule.wake, "06:00");
    assert_eq!(schedule.work, "09:00");
    assert_eq!(schedule.bedtime, "21:00");
    assert_eq!(schedule.sleep, "22:00");
    assert_eq!(schedule.time_zone, "UTC");
}

#[test]
fn test_config_validation_basic() {
    assert!(validate_config(&create_test_config()).is_ok());
}

#[test]
fn test_config_validation_volume_ranges() {
    let mut config = create_test_config();
    config.base_volume = Some(101);
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("base_volume"), "{err}");

    let mut config = create_test_config();
    config.wake_volume = Some(0);
    assert!(validate_config(&config).is_ok());

    let mut config = create_test_config();
    config.volume_down_amount = Some(0);
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("volume_down_amount"), "{err}");
}

#[test]
fn test_config_validation_ticker_interval() {
    let mut config = create_test_config();
    config.ticker_interval = Some("thirty".to_string());
    assert!(validate_config(&config).is_err());

    config.ticker_interval = Some("500ms".to_string());
    assert!(validate_config(&config).is_err());

    config.ticker_interval = Some("2h".to_string());
    assert!(validate_config(&config).is_err());

    config.ticker_interval = Some("1m30s".to_string());
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_config_validation_dial_mode() {
    let mut config = create_test_config();
    config.dial_mode = Some("basic".to_string());
    assert!(validate_config(&config).is_ok());
    assert_eq!(config.dial_mode(), DialMode::Basic);

    config.dial_mode = Some("turbo".to_string());
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("dial_mode"), "{err}");
}

#[test]
fn test_config_validation_schedule_ordering() {
    let mut config = create_test_config();
    config.sleep_time = Some("20:00".to_string());
    let err = validate_config(&config).unwrap_err();
    assert!(format!("{err:#}").contains("sleep time"), "{err:#}");

    let mut config = create_test_config();
    config.time_zone = Some("Nowhere/Special".to_string());
    let err = validate_config(&config).unwrap_err();
    assert!(format!("{err:#}").contains("Nowhere/Special"), "{err:#}");
}

#[test]
fn test_restart_required_changes() {
    let current = create_test_config();
    let mut reloaded = create_test_config();
    reloaded.base_volume = Some(20);
    reloaded.bedtime = Some("20:30".to_string());
    assert!(current.restart_required_changes(&reloaded).is_empty());

    reloaded.ticker_interval = Some("1m".to_string());
    reloaded.player_host = Some("kitchen.local".to_string());
    assert_eq!(
        current.restart_required_changes(&reloaded),
        vec!["ticker_interval", "player_host"]
    );

    // Spelling out a default is not a change
    let explicit = Config {
        ticker_interval: Some(DEFAULT_TICKER_INTERVAL.to_string()),
        player_command: Some(DEFAULT_PLAYER_COMMAND.to_string()),
        ..create_test_config()
    };
    assert!(current.restart_required_changes(&explicit).is_empty());
}

#[test]
fn test_load_from_path_parses_all_keys() {
    let (_dir, path) = write_config(
        r#"
dial_file = "/dev/input/event3"
stream = "http://example.org/stream.mp3"
wake_time = "6:30AM"
work_time = "8:45AM"
bedtime = "9:15PM"
sleep_time = "10:30PM"
time_zone = "America/Chicago"
base_volume = 60
wake_volume = 20
volume_up_amount = 3
volume_down_amount = 4
ticker_interval = "1m"
dial_mode = "basic"
player_command = "/usr/local/bin/mpc"
player_host = "bedroom.local"
debug = true
"#,
    );

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.dial_file(), PathBuf::from("/dev/input/event3"));
    assert_eq!(config.stream(), "http://example.org/stream.mp3");
    assert_eq!(config.schedule().bedtime, "9:15PM");
    assert_eq!(config.time_zone(), "America/Chicago");
    assert_eq!(config.base_volume(), 60);
    assert_eq!(config.wake_volume(), 20);
    assert_eq!(config.volume_up_amount(), 3);
    assert_eq!(config.volume_down_amount(), 4);
    assert_eq!(config.ticker_interval().unwrap(), Duration::from_secs(60));
    assert_eq!(config.dial_mode(), DialMode::Basic);
    assert_eq!(config.player_command(), "/usr/local/bin/mpc");
    assert_eq!(config.player_host.as_deref(), Some("bedroom.local"));
    assert!(config.debug());
}

#[test]
fn test_load_from_path_rejects_unknown_keys() {
    let (_dir, path) = write_config("bedtime = \"21:00\"\nlatitude = 40.0\n");
    assert!(load_from_path(&path).is_err());
}

#[test]
fn test_load_from_path_fills_time_zone() {
    let (_dir, path) = write_config("bedtime = \"21:00\"\n");
    let config = load_from_path(&path).unwrap();
    assert!(config.time_zone.is_some());
}

#[test]
fn test_load_explicit_missing_path_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = load(Some(&missing)).unwrap_err().to_string();
    assert!(err.contains("not found"), "{err}");
    assert!(!missing.exists());
}

#[test]
fn test_default_config_content_is_valid() {
    let (_dir, path) = write_config(&default_config_content("Europe/Berlin"));
    let config = load_from_path(&path).unwrap();
    assert_eq!(config.time_zone(), "Europe/Berlin");
    assert_eq!(config.base_volume(), DEFAULT_BASE_VOLUME);
    assert_eq!(config.schedule().wake, DEFAULT_WAKE_TIME);
}

#[test]
#[serial]
fn test_config_load_default_creation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("lullaby").join("lullaby.toml");

    // Save and restore XDG_CONFIG_HOME
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    let result = load(None);

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    let (_, loaded_from) = result.unwrap();
    assert_eq!(loaded_from, config_path);
    assert!(config_path.exists());
}
