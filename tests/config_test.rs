use color_eyre::Result;
use datascope::config::{AppConfig, ConfigManager};
use datascope::ClassifyOptions;

#[test]
fn test_missing_config_file_yields_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let manager = ConfigManager::with_dir(dir.path().join("datascope"));
    let config = manager.load()?;
    assert_eq!(config.classify.cardinality_cap, 20);
    assert_eq!(config.classify.unique_display_cap, 100);
    Ok(())
}

#[test]
fn test_write_and_load_default_config() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let manager = ConfigManager::with_dir(dir.path().join("datascope"));
    let path = manager.write_default_config(false)?;
    assert!(path.exists());

    // fully commented out: loading it still yields defaults
    let config = manager.load()?;
    assert_eq!(config.classify.cardinality_cap, 20);
    Ok(())
}

#[test]
fn test_generate_config_refuses_overwrite_without_force() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let manager = ConfigManager::with_dir(dir.path().join("datascope"));
    manager.write_default_config(false)?;
    assert!(manager.write_default_config(false).is_err());
    assert!(manager.write_default_config(true).is_ok());
    Ok(())
}

#[test]
fn test_user_overrides_are_loaded() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_dir = dir.path().join("datascope");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(
        config_dir.join("config.toml"),
        "[classify]\ncardinality_cap = 50\ncategory_plot_cap = 10\n\n[file_loading]\nparse_dates = false\n",
    )?;
    let manager = ConfigManager::with_dir(config_dir);
    let config = manager.load()?;
    assert_eq!(config.classify.cardinality_cap, 50);
    assert_eq!(config.classify.category_plot_cap, 10);
    assert!(!config.file_loading.parse_dates);
    // untouched fields keep defaults
    assert_eq!(config.classify.unique_display_cap, 100);

    let options = ClassifyOptions::from(&config.classify);
    assert_eq!(options.cardinality_cap, 50);
    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_dir = dir.path().join("datascope");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(config_dir.join("config.toml"), "not valid toml [[[")?;
    let manager = ConfigManager::with_dir(config_dir);
    assert!(manager.load().is_err());
    Ok(())
}

#[test]
fn test_default_app_config_matches_classify_defaults() {
    let config = AppConfig::default();
    let defaults = ClassifyOptions::default();
    assert_eq!(config.classify.cardinality_cap, defaults.cardinality_cap);
    assert_eq!(
        config.classify.category_plot_cap,
        defaults.category_plot_cap
    );
}
