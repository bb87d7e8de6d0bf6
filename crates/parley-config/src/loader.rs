use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::Config;
use crate::env::{ADMIN_API_KEY_VAR, API_KEY_VAR, HOST_VAR, ORGANIZATION_VAR, PROJECT_VAR, expand_env, non_empty_var};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Placeholders are expanded first, then the text is parsed, unset
    /// connection fields are filled from the environment, and the result is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// resolved, the TOML is invalid, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let mut config = Self::parse(&raw)?;
        config.apply_env_fallbacks();
        config.validate()?;

        tracing::debug!(path = %path.display(), host = %config.openai.host(), "configuration loaded");

        Ok(config)
    }

    /// Build configuration from environment variables alone
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.apply_env_fallbacks();
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text after placeholder expansion, without validation
    ///
    /// # Errors
    ///
    /// Returns an error if expansion or parsing fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded = expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;
        toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }

    /// Fill unset connection fields from `OPENAI_*` variables
    pub fn apply_env_fallbacks(&mut self) {
        let openai = &mut self.openai;

        if openai.api_key.is_none() {
            openai.api_key = non_empty_var(API_KEY_VAR).map(SecretString::from);
        }
        if openai.admin_api_key.is_none() {
            openai.admin_api_key = non_empty_var(ADMIN_API_KEY_VAR).map(SecretString::from);
        }
        if openai.host.is_none() {
            openai.host = non_empty_var(HOST_VAR);
        }
        if openai.organization.is_none() {
            openai.organization = non_empty_var(ORGANIZATION_VAR);
        }
        if openai.project.is_none() {
            openai.project = non_empty_var(PROJECT_VAR);
        }
    }

    /// Validate that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor host is used without an API key, the
    /// host is not a URL, the timeout is zero, or a capability override has
    /// an empty model identifier
    pub fn validate(&self) -> anyhow::Result<()> {
        let openai = &self.openai;

        url::Url::parse(openai.host()).map_err(|e| anyhow::anyhow!("invalid openai.host '{}': {e}", openai.host()))?;

        let has_key = openai
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty());
        if !has_key && openai.uses_default_host() {
            anyhow::bail!("{API_KEY_VAR} must be defined or openai.api_key set when using {}", openai.host());
        }

        if openai.timeout == 0 {
            anyhow::bail!("openai.timeout must be greater than 0");
        }

        if openai.models.keys().any(|model| model.trim().is_empty()) {
            anyhow::bail!("openai.models keys must be non-empty model identifiers");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use crate::{Config, WireFormat};

    const VARS: [&str; 5] = [
        "OPENAI_API_KEY",
        "OPENAI_ADMIN_API_KEY",
        "OPENAI_HOST",
        "OPENAI_ORGANIZATION",
        "OPENAI_PROJECT",
    ];

    fn without_openai_env<F: FnOnce()>(f: F) {
        temp_env::with_vars_unset(VARS, f);
    }

    #[test]
    fn parses_full_config() {
        let raw = r#"
            [openai]
            api_key = "sk-abc"
            organization = "org-1"
            timeout = 30
            wire_format = "chat_completions"
            default_model = "gpt-4o"

            [openai.chat_defaults]
            store = false

            [openai.models."ft:gpt-4o:acme"]
            temperature = false

            [telemetry]
            filter = "parley_llm=debug"
            json = true
        "#;

        let config = Config::parse(raw).unwrap();
        assert_eq!(config.openai.api_key.as_ref().unwrap().expose_secret(), "sk-abc");
        assert_eq!(config.openai.timeout, 30);
        assert_eq!(config.openai.wire_format, WireFormat::ChatCompletions);
        assert_eq!(config.openai.chat_defaults["store"], serde_json::json!(false));
        assert_eq!(config.openai.models["ft:gpt-4o:acme"].temperature, Some(false));
        assert!(config.telemetry.json);
        config.validate().unwrap();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse("[openai]\napi_keys = \"x\"").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn default_host_requires_api_key() {
        without_openai_env(|| {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("OPENAI_API_KEY"));
        });
    }

    #[test]
    fn custom_host_does_not_require_api_key() {
        without_openai_env(|| {
            let config = Config::parse("[openai]\nhost = \"http://localhost:8080\"").unwrap();
            config.validate().unwrap();
        });
    }

    #[test]
    fn env_fills_unset_fields_only() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-env")),
                ("OPENAI_ADMIN_API_KEY", Some("sk-admin-env")),
                ("OPENAI_HOST", None),
                ("OPENAI_ORGANIZATION", Some("org-env")),
                ("OPENAI_PROJECT", None),
            ],
            || {
                let mut config = Config::parse("[openai]\norganization = \"org-file\"").unwrap();
                config.apply_env_fallbacks();
                assert_eq!(config.openai.api_key.as_ref().unwrap().expose_secret(), "sk-env");
                assert_eq!(config.openai.admin_api_key.as_ref().unwrap().expose_secret(), "sk-admin-env");
                assert_eq!(config.openai.organization.as_deref(), Some("org-file"));
                assert_eq!(config.openai.host(), crate::DEFAULT_HOST);
            },
        );
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = Config::parse("[openai]\napi_key = \"k\"\ntimeout = 0").unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn load_reads_file_and_expands_placeholders() {
        without_openai_env(|| {
            temp_env::with_var("PARLEY_LOADER_KEY", Some("sk-file"), || {
                let mut file = tempfile::NamedTempFile::new().unwrap();
                writeln!(file, "[openai]\napi_key = \"{{{{ env.PARLEY_LOADER_KEY }}}}\"").unwrap();

                let config = Config::load(file.path()).unwrap();
                assert_eq!(config.openai.api_key.as_ref().unwrap().expose_secret(), "sk-file");
            });
        });
    }
}
