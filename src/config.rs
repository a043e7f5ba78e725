use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "spam-filter")]
#[command(about = "Web form that labels email text as Spam or Ham")]
pub struct Config {
    #[arg(long, env = "SPAM_FILTER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "SPAM_FILTER_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Exported TF-IDF vectorizer (.json)
    #[arg(long, env = "SPAM_FILTER_VECTORIZER", default_value = "artifacts/tfidf_vectorizer.json")]
    pub vectorizer: PathBuf,

    /// Exported classifier (.json or .onnx)
    #[arg(long, env = "SPAM_FILTER_CLASSIFIER", default_value = "artifacts/spam_classifier.json")]
    pub classifier: PathBuf,

    /// HTTP worker threads, defaults to one per core
    #[arg(long, env = "SPAM_FILTER_WORKERS")]
    pub workers: Option<usize>,

    /// Enable debug logging (the env var takes 1/0, yes/no, on/off, true/false)
    #[arg(
        long,
        env = "SPAM_FILTER_DEBUG",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // Tests that read or write SPAM_FILTER_* variables must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_point_at_bundled_artifacts() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = Config::try_parse_from(["spam-filter"]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.vectorizer, PathBuf::from("artifacts/tfidf_vectorizer.json"));
        assert_eq!(config.classifier, PathBuf::from("artifacts/spam_classifier.json"));
        assert_eq!(config.workers, None);
        assert!(!config.debug);
    }

    #[test]
    fn flags_override_defaults() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = Config::try_parse_from([
            "spam-filter",
            "--port",
            "8080",
            "--classifier",
            "models/spam.onnx",
            "--workers",
            "2",
            "--debug",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.classifier, PathBuf::from("models/spam.onnx"));
        assert_eq!(config.workers, Some(2));
        assert!(config.debug);
    }

    #[test]
    fn debug_env_accepts_numeric_and_word_toggles() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let cases = [("1", true), ("yes", true), ("true", true), ("0", false), ("off", false)];
        for (value, expected) in cases {
            std::env::set_var("SPAM_FILTER_DEBUG", value);
            let parsed = Config::try_parse_from(["spam-filter"]);
            std::env::remove_var("SPAM_FILTER_DEBUG");

            let config = parsed.unwrap_or_else(|e| panic!("SPAM_FILTER_DEBUG={value}: {e}"));
            assert_eq!(config.debug, expected, "SPAM_FILTER_DEBUG={value}");
        }
    }
}
