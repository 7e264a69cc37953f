//! Configuration loading and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizmark_core::boundary::DEFAULT_USER_HEADER;
use quizmark_core::parser::parse_quiz_file;
use quizmark_core::service::ServiceConfig;
use quizmark_core::traits::{QuestionStore, ResponseStore};

use crate::memory::InMemoryStore;
use crate::rest::RestStore;

/// Which store backs the service.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory {
        /// Quiz file whose questions and submissions are loaded at startup.
        #[serde(default)]
        seed: Option<PathBuf>,
    },
    Rest {
        url: String,
        api_key: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Memory { seed } => f.debug_struct("Memory").field("seed", seed).finish(),
            StoreConfig::Rest {
                url,
                api_key: _,
                timeout_secs,
            } => f
                .debug_struct("Rest")
                .field("url", url)
                .field("api_key", &"***")
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory { seed: None }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Top-level quizmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Header carrying the acting user's id.
    #[serde(default = "default_user_header")]
    pub user_header: String,
    /// Max concurrent write-backs when regrading.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for grade reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_user_header() -> String {
    DEFAULT_USER_HEADER.to_string()
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizmark-results")
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            user_header: default_user_header(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

impl QuizmarkConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            parallelism: self.parallelism.max(1),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Memory { seed } => StoreConfig::Memory { seed: seed.clone() },
        StoreConfig::Rest {
            url,
            api_key,
            timeout_secs,
        } => StoreConfig::Rest {
            url: resolve_env_vars(url),
            api_key: resolve_env_vars(api_key),
            timeout_secs: *timeout_secs,
        },
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `quizmark.toml` in the current directory
/// 2. `~/.config/quizmark/config.toml`
///
/// Environment variable overrides: `QUIZMARK_STORE_URL`, `QUIZMARK_STORE_KEY`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizmark.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizmarkConfig::default(),
    };

    apply_env_overrides(&mut config);
    config.store = resolve_store_config(&config.store);

    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn apply_env_overrides(config: &mut QuizmarkConfig) {
    if let Ok(url) = std::env::var("QUIZMARK_STORE_URL") {
        let (api_key, timeout_secs) = match &config.store {
            StoreConfig::Rest {
                api_key,
                timeout_secs,
                ..
            } => (api_key.clone(), *timeout_secs),
            StoreConfig::Memory { .. } => (String::new(), default_timeout_secs()),
        };
        config.store = StoreConfig::Rest {
            url,
            api_key,
            timeout_secs,
        };
    }

    if let Ok(key) = std::env::var("QUIZMARK_STORE_KEY") {
        if let StoreConfig::Rest { api_key, .. } = &mut config.store {
            *api_key = key;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}

/// The two collaborators the evaluation service needs.
#[derive(Clone)]
pub struct Stores {
    pub questions: Arc<dyn QuestionStore>,
    pub responses: Arc<dyn ResponseStore>,
}

impl Stores {
    /// Use one value for both roles.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: QuestionStore + ResponseStore + 'static,
    {
        Self {
            questions: store.clone(),
            responses: store,
        }
    }
}

/// Create the configured stores.
pub fn create_stores(config: &StoreConfig) -> Result<Stores> {
    match config {
        StoreConfig::Memory { seed } => {
            let store = InMemoryStore::new();
            if let Some(path) = seed {
                let quiz = parse_quiz_file(path)?;
                tracing::info!(
                    "seeded memory store with {} questions from {}",
                    quiz.questions.len(),
                    path.display()
                );
                store.seed_quiz(&quiz);
            }
            Ok(Stores::shared(Arc::new(store)))
        }
        StoreConfig::Rest {
            url,
            api_key,
            timeout_secs,
        } => {
            anyhow::ensure!(!url.is_empty(), "store url is empty");
            let store = RestStore::with_timeout(url, api_key, *timeout_secs)
                .context("failed to create REST store")?;
            Ok(Stores::shared(Arc::new(store)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZMARK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZMARK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZMARK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_QUIZMARK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizmarkConfig::default();
        assert!(matches!(config.store, StoreConfig::Memory { seed: None }));
        assert_eq!(config.user_header, "x-user-id");
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.service_config().parallelism, 4);
    }

    #[test]
    fn parse_rest_config() {
        let toml_str = r#"
user_header = "x-student-id"
parallelism = 8

[store]
type = "rest"
url = "https://example.supabase.co"
api_key = "anon-key"
"#;
        let config: QuizmarkConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.user_header, "x-student-id");
        assert_eq!(config.parallelism, 8);
        let StoreConfig::Rest {
            url, timeout_secs, ..
        } = &config.store
        else {
            panic!("expected rest store");
        };
        assert_eq!(url, "https://example.supabase.co");
        assert_eq!(*timeout_secs, 30);
    }

    #[test]
    fn debug_masks_api_key() {
        let config = StoreConfig::Rest {
            url: "https://example.supabase.co".into(),
            api_key: "super-secret".into(),
            timeout_secs: 30,
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn missing_explicit_config_fails() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn memory_store_with_seed() {
        let dir = tempfile::tempdir().unwrap();
        let quiz_path = dir.path().join("quiz.toml");
        std::fs::write(
            &quiz_path,
            r#"
[quiz]
id = "bio"
title = "Biology"

[[questions]]
id = "q1"
prompt = "What do mitochondria do?"
correct_answer = "produce energy"

[[submissions]]
question_id = "q1"
user_id = "alice"
answer = "energy"
"#,
        )
        .unwrap();

        let stores = create_stores(&StoreConfig::Memory {
            seed: Some(quiz_path),
        })
        .unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            assert!(stores.questions.get_question("q1").await.is_ok());
            let response = stores.responses.get_response("q1", "alice").await.unwrap();
            assert_eq!(response.unwrap().answer, "energy");
        });
    }
}
