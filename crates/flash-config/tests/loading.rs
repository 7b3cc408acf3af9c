//! Layering tests for `FlashConfig::load`.
//!
//! `figment::Jail` runs each case in a scratch directory with an isolated
//! environment, so cwd-relative lookups and `FLASH_*` variables do not leak.

use flash_config::{ConfigError, ConfigOverrides, FlashConfig};
use figment::Jail;
use std::path::PathBuf;

#[test]
fn defaults_apply_without_config_file() {
    Jail::expect_with(|jail| {
        let config = FlashConfig::load(&ConfigOverrides::default()).map_err(|e| e.to_string())?;

        assert_eq!(config.root, jail.directory().to_path_buf());
        assert_eq!(config.port, 5000);
        assert_eq!(config.hmr_port, 4000);
        assert_eq!(config.src_dir, PathBuf::from("src"));
        assert_eq!(config.debounce_ms, 100);
        assert!(config.sourcemap);
        Ok(())
    });
}

#[test]
fn config_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "flash.config.json",
            r#"{ "port": 6100, "src_dir": "app", "sourcemap": false }"#,
        )?;

        let config = FlashConfig::load(&ConfigOverrides::default()).map_err(|e| e.to_string())?;

        assert_eq!(config.port, 6100);
        assert_eq!(config.src_dir, PathBuf::from("app"));
        assert!(!config.sourcemap);
        assert_eq!(config.hmr_port, 4000);
        Ok(())
    });
}

#[test]
fn environment_overrides_config_file() {
    Jail::expect_with(|jail| {
        jail.create_file("flash.config.json", r#"{ "port": 6100, "hmr_port": 6101 }"#)?;
        jail.set_env("FLASH_HMR_PORT", 7101);

        let config = FlashConfig::load(&ConfigOverrides::default()).map_err(|e| e.to_string())?;

        assert_eq!(config.port, 6100);
        assert_eq!(config.hmr_port, 7101);
        Ok(())
    });
}

#[test]
fn cli_overrides_everything() {
    Jail::expect_with(|jail| {
        jail.create_file("flash.config.json", r#"{ "port": 6100 }"#)?;
        jail.set_env("FLASH_PORT", 6200);

        let overrides = ConfigOverrides {
            port: Some(6300),
            ..ConfigOverrides::default()
        };
        let config = FlashConfig::load(&overrides).map_err(|e| e.to_string())?;

        assert_eq!(config.port, 6300);
        Ok(())
    });
}

#[test]
fn explicit_config_file_must_exist() {
    Jail::expect_with(|_jail| {
        let overrides = ConfigOverrides {
            config_file: Some(PathBuf::from("missing.json")),
            ..ConfigOverrides::default()
        };

        match FlashConfig::load(&overrides) {
            Err(ConfigError::NotFound(path)) => assert!(path.ends_with("missing.json")),
            other => panic!("expected NotFound, got {:?}", other),
        }
        Ok(())
    });
}

#[test]
fn config_file_is_found_in_root_override() {
    Jail::expect_with(|jail| {
        jail.create_dir("site")?;
        jail.create_file("site/flash.config.json", r#"{ "port": 6500 }"#)?;

        let overrides = ConfigOverrides {
            root: Some(PathBuf::from("site")),
            ..ConfigOverrides::default()
        };
        let config = FlashConfig::load(&overrides).map_err(|e| e.to_string())?;

        assert_eq!(config.port, 6500);
        assert_eq!(config.root, jail.directory().join("site"));
        Ok(())
    });
}

#[test]
fn malformed_values_are_reported() {
    Jail::expect_with(|jail| {
        jail.create_file("flash.config.json", r#"{ "port": "not-a-port" }"#)?;

        let err = FlashConfig::load(&ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
