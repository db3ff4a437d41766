//! 🔧 App Configuration: the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." (every developer at 3am) 🦆
//!
//! 🏗️ Powered by Figment. TOML file first, `YTX_*` environment variables on top, so the
//! API key can live in the environment instead of in a file someone will eventually commit.

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::backends::{FileSinkConfig, KafkaSinkConfig};

/// 📦 One struct to rule them all, one struct to find them,
/// one struct to bring them all, and in the Figment bind them.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 📺 Where the videos come from.
    pub youtube: YouTubeSourceConfig,
    /// 🕳️ Where the summaries go.
    pub sink_config: SinkConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// 📺 Platform API settings. The key is a secret; prefer `YTX_YOUTUBE__GOOGLE_API_KEY`.
#[derive(Deserialize, Clone)]
pub struct YouTubeSourceConfig {
    pub google_api_key: String,
    pub youtube_playlist_id: String,
    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,
}

impl std::fmt::Debug for YouTubeSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 🔒 the key stays out of logs. config gets dumped at startup, keys get leaked at startup.
        f.debug_struct("YouTubeSourceConfig")
            .field("google_api_key", &"<redacted>")
            .field("youtube_playlist_id", &self.youtube_playlist_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

/// 🎭 The many faces of a Sink, as written in TOML.
///
/// `[sink_config.Kafka]` for the real thing, `[sink_config.File]` to see what would have
/// been published, `sink_config = "InMemory"` to just watch the logs scroll by.
#[derive(Debug, Deserialize, Clone)]
pub enum SinkConfig {
    Kafka(KafkaSinkConfig),
    File(FileSinkConfig),
    InMemory,
}

/// 🎛️ Knobs that are about how the run behaves, not where the data goes.
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// ⏱️ Per-request timeout for platform API calls. Unset means the HTTP client's default,
    /// which is "wait forever". A hung call hangs the run.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// 📊 Draw a progress bar on stderr. Only shows up when stderr is a terminal anyway.
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

fn default_show_progress() -> bool {
    true
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: None,
            show_progress: default_show_progress(),
        }
    }
}

/// 🚀 Load the config from an optional TOML file plus `YTX_*` env vars.
///
/// - `None` → env vars only.
/// - `Some(path)` → TOML file, then env vars merged on top. Env wins on conflicts.
///
/// Nested keys use a double underscore: `YTX_SINK_CONFIG__KAFKA__TOPIC=...`.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = match config_file_name {
        Some(file_name) => Figment::new().merge(Toml::file(file_name)),
        None => Figment::new(),
    };
    // -- 🔠 lowercase(false) has to come last: every map() turns lowercasing back on
    let config = config.merge(
        Env::prefixed("YTX_")
            .split("__")
            .map(|key| env_key_path(key.as_str()).into())
            .lowercase(false),
    );

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (YTX_*). \
             The file exists in our hearts, but apparently not in the shape we need.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (YTX_*). \
                 No file was provided, so this one's all on the environment."
            .to_string(),
    };

    config.extract().context(context_msg)
}

/// 🔠 `SINK_CONFIG.KAFKA.TOPIC` → `sink_config.Kafka.topic`.
///
/// Env keys come in shouting and figment would lowercase them, but the sink variant tag is
/// case-sensitive. Everything is lowercased except that tag, which gets its TOML spelling
/// back so env and file values merge into the same `[sink_config.Kafka]` table.
fn env_key_path(key: &str) -> String {
    let lowered = key.to_ascii_lowercase();
    let mut segments: Vec<&str> = lowered.split('.').collect();
    if segments.len() > 1 && segments[0] == "sink_config" {
        segments[1] = match segments[1] {
            "kafka" => "Kafka",
            "file" => "File",
            "inmemory" | "in_memory" => "InMemory",
            other => other,
        };
    }
    segments.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn jailed<T>(result: anyhow::Result<T>) -> figment::error::Result<T> {
        result.map_err(|err| figment::Error::from(format!("{err:#}")))
    }

    #[test]
    fn the_one_where_a_full_kafka_config_lands_in_the_right_drawers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ytx.toml",
                r#"
                [youtube]
                google_api_key = "file-key"
                youtube_playlist_id = "PL123"

                [runtime]
                request_timeout_secs = 15

                [sink_config.Kafka]
                topic = "youtube_videos"
                flush_timeout_secs = 45

                [sink_config.Kafka.schema_registry]
                url = "http://registry:8081"
                username = "sr-user"
                password = "sr-pass"

                [sink_config.Kafka.producer]
                "bootstrap.servers" = "broker:9092"
                "security.protocol" = "SASL_SSL"
                "#,
            )?;

            let app_config = jailed(load_config(Some(Path::new("ytx.toml"))))?;

            assert_eq!(app_config.youtube.google_api_key, "file-key");
            assert_eq!(app_config.youtube.youtube_playlist_id, "PL123");
            assert_eq!(app_config.youtube.base_url, "https://www.googleapis.com/youtube/v3");
            assert_eq!(app_config.runtime.request_timeout_secs, Some(15));
            assert!(app_config.runtime.show_progress);
            match app_config.sink_config {
                SinkConfig::Kafka(kafka) => {
                    assert_eq!(kafka.topic, "youtube_videos");
                    assert_eq!(kafka.subject(), "youtube_videos-value");
                    assert_eq!(kafka.flush_timeout_secs, Some(45));
                    assert_eq!(kafka.schema_registry.url, "http://registry:8081");
                    assert_eq!(kafka.schema_registry.username.as_deref(), Some("sr-user"));
                    assert_eq!(
                        kafka.producer.get("bootstrap.servers").map(String::as_str),
                        Some("broker:9092")
                    );
                }
                honestly_who_knows => panic!(
                    "💀 Expected a Kafka sink config, serde took us to {honestly_who_knows:?}. Plot twist energy."
                ),
            }
            Ok(())
        });
    }

    #[test]
    fn the_one_where_the_environment_outranks_the_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ytx.toml",
                r#"
                sink_config = "InMemory"

                [youtube]
                google_api_key = "committed-by-accident"
                youtube_playlist_id = "PL123"
                "#,
            )?;
            jail.set_env("YTX_YOUTUBE__GOOGLE_API_KEY", "from-the-vault");

            let app_config = jailed(load_config(Some(Path::new("ytx.toml"))))?;

            assert_eq!(app_config.youtube.google_api_key, "from-the-vault");
            assert!(matches!(app_config.sink_config, SinkConfig::InMemory));
            Ok(())
        });
    }

    #[test]
    fn the_one_where_there_is_no_file_and_env_carries_everything() {
        Jail::expect_with(|jail| {
            jail.set_env("YTX_YOUTUBE__GOOGLE_API_KEY", "k");
            jail.set_env("YTX_YOUTUBE__YOUTUBE_PLAYLIST_ID", "PLenv");
            jail.set_env("YTX_YOUTUBE__BASE_URL", "http://localhost:9999/youtube/v3");
            jail.set_env("YTX_SINK_CONFIG", "InMemory");
            jail.set_env("YTX_RUNTIME__SHOW_PROGRESS", "false");

            let app_config = jailed(load_config(None))?;

            assert_eq!(app_config.youtube.youtube_playlist_id, "PLenv");
            assert_eq!(app_config.youtube.base_url, "http://localhost:9999/youtube/v3");
            assert!(!app_config.runtime.show_progress);
            Ok(())
        });
    }

    #[test]
    fn the_one_where_the_playlist_id_went_missing() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ytx.toml",
                r#"
                sink_config = "InMemory"

                [youtube]
                google_api_key = "k"
                "#,
            )?;

            let err = load_config(Some(Path::new("ytx.toml")))
                .expect_err("💀 a config without a playlist id should not parse");
            assert!(format!("{err:#}").contains("youtube_playlist_id"));
            Ok(())
        });
    }

    #[test]
    fn the_one_where_debug_output_keeps_the_secret() {
        let config = YouTubeSourceConfig {
            google_api_key: "super-secret".into(),
            youtube_playlist_id: "PL1".into(),
            base_url: default_youtube_base_url(),
        };

        let printed = format!("{config:?}");

        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("PL1"));
    }

    #[test]
    fn the_one_where_the_registry_password_comes_from_the_vault() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ytx.toml",
                r#"
                [youtube]
                google_api_key = "k"
                youtube_playlist_id = "PL123"

                [sink_config.Kafka]
                topic = "from-the-file"

                [sink_config.Kafka.schema_registry]
                url = "http://registry:8081"
                username = "sr-user"
                "#,
            )?;
            jail.set_env("YTX_SINK_CONFIG__KAFKA__SCHEMA_REGISTRY__PASSWORD", "from-the-vault");
            jail.set_env("YTX_SINK_CONFIG__KAFKA__FLUSH_TIMEOUT_SECS", "30");

            let app_config = jailed(load_config(Some(Path::new("ytx.toml"))))?;

            match app_config.sink_config {
                SinkConfig::Kafka(kafka) => {
                    assert_eq!(kafka.topic, "from-the-file");
                    assert_eq!(kafka.schema_registry.url, "http://registry:8081");
                    assert_eq!(kafka.schema_registry.username.as_deref(), Some("sr-user"));
                    assert_eq!(kafka.schema_registry.password.as_deref(), Some("from-the-vault"));
                    assert_eq!(kafka.flush_timeout_secs, Some(30));
                }
                honestly_who_knows => panic!(
                    "💀 Expected a Kafka sink config, got {honestly_who_knows:?}"
                ),
            }
            Ok(())
        });
    }

    #[test]
    fn the_one_where_kafka_is_configured_without_a_single_file() {
        Jail::expect_with(|jail| {
            jail.set_env("YTX_YOUTUBE__GOOGLE_API_KEY", "k");
            jail.set_env("YTX_YOUTUBE__YOUTUBE_PLAYLIST_ID", "PLenv");
            jail.set_env("YTX_SINK_CONFIG__KAFKA__TOPIC", "env_videos");
            jail.set_env("YTX_SINK_CONFIG__KAFKA__SCHEMA_REGISTRY__URL", "http://registry:8081");

            let app_config = jailed(load_config(None))?;

            match app_config.sink_config {
                SinkConfig::Kafka(kafka) => {
                    assert_eq!(kafka.topic, "env_videos");
                    assert_eq!(kafka.subject(), "env_videos-value");
                    assert_eq!(kafka.schema_registry.url, "http://registry:8081");
                }
                honestly_who_knows => panic!(
                    "💀 Expected a Kafka sink config, got {honestly_who_knows:?}"
                ),
            }
            Ok(())
        });
    }

    #[test]
    fn the_one_where_env_keys_get_their_variant_capitalized_back() {
        assert_eq!(
            env_key_path("SINK_CONFIG.KAFKA.SCHEMA_REGISTRY.PASSWORD"),
            "sink_config.Kafka.schema_registry.password"
        );
        assert_eq!(env_key_path("SINK_CONFIG.FILE.FILE_NAME"), "sink_config.File.file_name");
        assert_eq!(env_key_path("SINK_CONFIG"), "sink_config");
        assert_eq!(env_key_path("YOUTUBE.GOOGLE_API_KEY"), "youtube.google_api_key");
    }
}
