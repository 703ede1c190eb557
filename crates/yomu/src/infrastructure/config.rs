use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A content source the gateway can talk to. `id` 1 is reserved for the
/// local filesystem source.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SourceConfig {
    pub id: i64,
    pub name: String,
    pub url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_create_database")]
    pub create_database: bool,
    #[serde(default = "default_thumbnail_path")]
    pub thumbnail_path: String,
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
    #[serde(default)]
    pub chapter_languages: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: yomu_home().join("config.yml"),
            database_path: default_database_path(),
            create_database: default_create_database(),
            thumbnail_path: default_thumbnail_path(),
            update_interval: default_update_interval(),
            chapter_languages: vec![],
            sources: vec![],
        }
    }
}

fn yomu_home() -> PathBuf {
    match std::env::var("YOMU_HOME") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir().expect("should have home").join(".yomu"),
    }
}

fn default_database_path() -> String {
    let path = yomu_home();
    if !path.exists() {
        let _ = std::fs::create_dir_all(&path);
    }
    path.join("yomu.db").display().to_string()
}

fn default_create_database() -> bool {
    true
}

fn default_thumbnail_path() -> String {
    let path = yomu_home().join("thumbnails");
    if !path.exists() {
        let _ = std::fs::create_dir_all(&path);
    }
    path.display().to_string()
}

fn default_update_interval() -> u64 {
    3600
}

impl Config {
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config, anyhow::Error> {
        let config_path = match path {
            Some(p) => PathBuf::new().join(p),
            None => yomu_home().join("config.yml"),
        };

        match std::fs::File::open(config_path.clone()) {
            Ok(file) => {
                info!("open config from {:?}", config_path);
                let mut cfg: Self = serde_yml::from_reader(file)?;
                cfg.path = config_path;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Config {
                    path: config_path,
                    ..Default::default()
                };
                cfg.save()?;
                info!("write default config at {:?}", cfg.path);
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        std::fs::write(&self.path, serde_yml::to_string(&self)?)?;

        Ok(())
    }
}
