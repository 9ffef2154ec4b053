//! INI configuration loading

use colloquy_core::{Error, Options, Result};
use colloquy_providers::constants::OPENAI_DEFAULT_BASE_URL;
use colloquy_providers::OpenAIConfig;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Flat key/value settings read from one or more INI sections
///
/// Keys are lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings(HashMap<String, String>);

impl Settings {
    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Look up a value that must be present and non-blank
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Configuration(format!("missing required key '{}'", key)))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no keys were read
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all settings
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Settings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Read settings from an INI file
///
/// With `section = None` every section is merged in file order, later keys
/// overriding earlier ones. A named section that does not exist is an error.
pub fn read_config(path: impl AsRef<Path>, section: Option<&str>) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Configuration(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!("cannot read config file {}: {}", path.display(), e))
    })?;
    let sections = parse_ini(&text)?;
    debug!(path = %path.display(), sections = sections.len(), "Read config");

    match section {
        Some(name) => sections
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| Settings(values))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "section [{}] not found in {}",
                    name,
                    path.display()
                ))
            }),
        None => Ok(sections.into_iter().flat_map(|(_, values)| values).collect()),
    }
}

type Section = (String, HashMap<String, String>);

fn parse_ini(text: &str) -> Result<Vec<Section>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut sections: Vec<Section> = Vec::new();
    let mut last_key: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            last_key = None;
            continue;
        }
        if trimmed.starts_with(';') || trimmed.starts_with('#') {
            continue;
        }

        let indented = raw.starts_with(|c: char| c.is_whitespace());
        if indented {
            if let (Some(key), Some((_, values))) = (&last_key, sections.last_mut()) {
                if let Some(value) = values.get_mut(key) {
                    value.push('\n');
                    value.push_str(trimmed);
                    continue;
                }
            }
        }

        if let Some(name) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let name = name.trim().to_string();
            // a repeated header reopens the earlier section
            if let Some(pos) = sections.iter().position(|(n, _)| *n == name) {
                let existing = sections.remove(pos);
                sections.push(existing);
            } else {
                sections.push((name, HashMap::new()));
            }
            last_key = None;
            continue;
        }

        let split = trimmed.find(|c: char| c == '=' || c == ':').ok_or_else(|| {
            Error::Configuration(format!(
                "line {}: expected 'key = value', found '{}'",
                line_no, trimmed
            ))
        })?;
        let key = trimmed[..split].trim().to_lowercase();
        let value = trimmed[split + 1..].trim().to_string();
        if key.is_empty() {
            return Err(Error::Configuration(format!("line {}: empty key", line_no)));
        }

        let (_, values) = sections.last_mut().ok_or_else(|| {
            Error::Configuration(format!(
                "line {}: key '{}' appears before any [section] header",
                line_no, key
            ))
        })?;
        values.insert(key.clone(), value);
        last_key = Some(key);
    }

    Ok(sections)
}

/// Connection and request settings for a chat session
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Bearer API key
    pub api_key: String,
    /// Endpoint base URL
    pub base_url: String,
    /// Model identifier
    pub model_name: String,
    /// Optional system prompt seeded into new conversations
    pub system_prompt: Option<String>,
    /// Request options derived from the optional tuning keys
    pub options: Options,
}

impl ClientConfig {
    /// Build from settings
    ///
    /// `api_key` and `model_name` are required. `temperature`, `top_p` and
    /// `enable_thinking` become request options when present.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require("api_key")?.to_string();
        let model_name = settings.require("model_name")?.to_string();
        let base_url = settings
            .get("base_url")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(OPENAI_DEFAULT_BASE_URL)
            .to_string();
        let system_prompt = settings
            .get("system_prompt")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let mut options = Options::new();
        if let Some(value) = settings.get("temperature") {
            options = options.temperature(parse_float("temperature", value)?);
        }
        if let Some(value) = settings.get("top_p") {
            options = options.top_p(parse_float("top_p", value)?);
        }
        if let Some(value) = settings.get("enable_thinking") {
            options = options.enable_thinking(parse_bool("enable_thinking", value)?);
        }

        Ok(Self {
            api_key,
            base_url,
            model_name,
            system_prompt,
            options,
        })
    }

    /// Read and build in one step
    pub fn load(path: impl AsRef<Path>, section: Option<&str>) -> Result<Self> {
        Self::from_settings(&read_config(path, section)?)
    }

    /// Transport configuration for the OpenAI-compatible provider
    pub fn openai_config(&self) -> OpenAIConfig {
        OpenAIConfig::new(self.api_key.clone()).with_base_url(self.base_url.clone())
    }
}

fn parse_float(key: &str, value: &str) -> Result<f32> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("'{}' is not a number: {}", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(Error::Configuration(format!(
            "'{}' is not a boolean: {}",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\u{feff}; chat settings
[deepseek]
API_KEY = sk-deep
base_url = https://api.deepseek.com/v1
model_name: deepseek-reasoner
system_prompt = You are terse.
    Answer in one line.

[qwen]
# local endpoint
api_key = sk-qwen
model_name = qwen3
enable_thinking = yes
temperature = 0.6
";

    fn write_config(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_named_section() {
        let file = write_config(SAMPLE);
        let settings = read_config(file.path(), Some("deepseek")).unwrap();

        assert_eq!(settings.get("api_key"), Some("sk-deep"));
        assert_eq!(settings.get("model_name"), Some("deepseek-reasoner"));
        assert_eq!(
            settings.get("system_prompt"),
            Some("You are terse.\nAnswer in one line.")
        );
        assert_eq!(settings.get("enable_thinking"), None);
    }

    #[test]
    fn test_read_all_sections_later_wins() {
        let file = write_config(SAMPLE);
        let settings = read_config(file.path(), None).unwrap();

        assert_eq!(settings.get("api_key"), Some("sk-qwen"));
        assert_eq!(settings.get("base_url"), Some("https://api.deepseek.com/v1"));
        assert_eq!(settings.get("enable_thinking"), Some("yes"));
    }

    #[test]
    fn test_missing_section_and_file() {
        let file = write_config(SAMPLE);
        assert!(matches!(
            read_config(file.path(), Some("claude")),
            Err(Error::Configuration(msg)) if msg.contains("[claude]")
        ));
        assert!(matches!(
            read_config("/definitely/not/here.ini", None),
            Err(Error::Configuration(msg)) if msg.contains("not found")
        ));
    }

    #[test]
    fn test_malformed_lines_name_line_number() {
        let err = parse_ini("[a]\nkey = v\njust words\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));

        let err = parse_ini("orphan = 1\n[a]\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_client_config_from_settings() {
        let file = write_config(SAMPLE);
        let config = ClientConfig::load(file.path(), Some("qwen")).unwrap();

        assert_eq!(config.base_url, OPENAI_DEFAULT_BASE_URL);
        assert_eq!(config.model_name, "qwen3");
        assert_eq!(config.system_prompt, None);
        assert_eq!(config.options.get("enable_thinking"), Some(&true.into()));
        assert!(config.options.get("temperature").is_some());
        assert_eq!(config.openai_config().api_key, "sk-qwen");
    }

    #[test]
    fn test_client_config_requires_keys() {
        let settings: Settings = [("api_key".to_string(), "k".to_string())]
            .into_iter()
            .collect();
        let err = ClientConfig::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("model_name"));

        let settings: Settings = [
            ("api_key".to_string(), "k".to_string()),
            ("model_name".to_string(), "m".to_string()),
            ("top_p".to_string(), "high".to_string()),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            ClientConfig::from_settings(&settings),
            Err(Error::Configuration(_))
        ));
    }
}
