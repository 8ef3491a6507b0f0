use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use pasteburn_core::engine::DEFAULT_MAX_PAYLOAD_BYTES;
use pasteburn_core::{EngineConfig, PolicyConfig, ServerKey, StoreConfig};

#[derive(Debug, Serialize, Deserialize)]
pub struct PasteburnConfig {
    pub network: NetworkSection,
    pub store: StoreSection,
    #[serde(default)]
    pub content: ContentSection,
    #[serde(default)]
    pub recaptcha: RecaptchaSection,
    pub security: SecuritySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkSection {
    pub host: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
    #[serde(default = "default_min_idle")]
    pub min_idle: u32,
    #[serde(default = "default_max_size")]
    pub max_size: u32,
    #[serde(default = "default_op_timeout_secs")]
    pub op_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    pub expire_hours: i64,
    pub max_expire_hours: i64,
    pub verify_window_secs: i64,
    pub detect_abuse: bool,
    pub max_payload_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct RecaptchaSection {
    pub enable: bool,
}

#[derive(Serialize, Deserialize)]
pub struct SecuritySection {
    /// age identity used to encrypt every paste
    pub identity: String,
    pub master_key: Option<String>,
}

impl std::fmt::Debug for SecuritySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySection")
            .field("identity", &"[REDACTED]")
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn default_min_idle() -> u32 {
    StoreConfig::default().min_idle
}

fn default_max_size() -> u32 {
    StoreConfig::default().max_size
}

fn default_op_timeout_secs() -> u64 {
    StoreConfig::default().op_timeout.as_secs()
}

fn default_connect_timeout_secs() -> u64 {
    StoreConfig::default().connect_timeout.as_secs()
}

impl Default for ContentSection {
    fn default() -> Self {
        let policy = PolicyConfig::default();
        Self {
            expire_hours: policy.default_expire_hours,
            max_expire_hours: policy.max_expire_hours,
            verify_window_secs: policy.verify_window_secs,
            detect_abuse: false,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl PasteburnConfig {
    pub fn new(
        host: String,
        store_path: PathBuf,
        key: &ServerKey,
        master_key: Option<String>,
        captcha: bool,
    ) -> Self {
        Self {
            network: NetworkSection { host },
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
                min_idle: default_min_idle(),
                max_size: default_max_size(),
                op_timeout_secs: default_op_timeout_secs(),
                connect_timeout_secs: default_connect_timeout_secs(),
            },
            content: ContentSection::default(),
            recaptcha: RecaptchaSection { enable: captcha },
            security: SecuritySection {
                identity: key.encode().to_string(),
                master_key,
            },
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            path: PathBuf::from(&self.store.path),
            min_idle: self.store.min_idle,
            max_size: self.store.max_size,
            op_timeout: Duration::from_secs(self.store.op_timeout_secs),
            connect_timeout: Duration::from_secs(self.store.connect_timeout_secs),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            host: self.network.host.clone(),
            policy: PolicyConfig {
                default_expire_hours: self.content.expire_hours,
                max_expire_hours: self.content.max_expire_hours,
                verify_window_secs: self.content.verify_window_secs,
            },
            captcha_enabled: self.recaptcha.enable,
            detect_abuse: self.content.detect_abuse,
            max_payload_bytes: self.content.max_payload_bytes,
            master_key: self.master_key(),
        }
    }

    pub fn server_key(&self) -> anyhow::Result<ServerKey> {
        ServerKey::parse(&self.security.identity).map_err(|e| anyhow::anyhow!("{}", e))
    }

    pub fn master_key(&self) -> Option<Zeroizing<String>> {
        self.security
            .master_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .map(|key| Zeroizing::new(key.clone()))
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("pasteburn.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<PasteburnConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Write the config readable only by its owner; it holds the identity.
pub fn write_config(path: &Path, config: &PasteburnConfig) -> anyhow::Result<()> {
    let contents = Zeroizing::new(
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?,
    );
    pasteburn_core::fs::write_private_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("pasteburn"));
        }
    }
    Ok(home_dir()?.join(".config").join("pasteburn"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("pasteburn"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("pasteburn"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let key = ServerKey::generate();
        let contents = format!(
            "[network]\nhost = \"paste.example.org\"\n\n[store]\npath = \"/tmp/p.db\"\n\n[security]\nidentity = \"{}\"\n",
            key.encode().as_str()
        );
        let config: PasteburnConfig = toml::from_str(&contents).unwrap();

        assert_eq!(config.store_config().max_size, 4);
        assert_eq!(config.store_config().op_timeout, Duration::from_secs(5));
        let engine = config.engine_config();
        assert_eq!(engine.policy, PolicyConfig::default());
        assert!(!engine.captcha_enabled);
        assert!(engine.master_key.is_none());
        assert_eq!(config.server_key().unwrap(), key);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let key = ServerKey::generate();
        let config = PasteburnConfig::new(
            "paste.example.org".to_string(),
            PathBuf::from("/var/lib/pasteburn/p.db"),
            &key,
            Some("master".to_string()),
            true,
        );
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: PasteburnConfig = toml::from_str(&text).unwrap();

        assert!(parsed.recaptcha.enable);
        assert_eq!(parsed.master_key().unwrap().as_str(), "master");
        assert_eq!(parsed.server_key().unwrap(), key);
    }

    #[test]
    fn test_empty_master_key_is_unset() {
        let key = ServerKey::generate();
        let config = PasteburnConfig::new(
            "h".to_string(),
            PathBuf::from("p.db"),
            &key,
            Some(String::new()),
            false,
        );
        assert!(config.master_key().is_none());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let key = ServerKey::generate();
        let config = PasteburnConfig::new(
            "h".to_string(),
            PathBuf::from("p.db"),
            &key,
            Some("master-secret".to_string()),
            false,
        );
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("master-secret"));
        assert!(!rendered.contains(key.encode().as_str()));
    }
}
