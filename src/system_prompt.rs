use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{AgentConfig, Config};

/// Something that can produce a system prompt
#[async_trait]
pub trait PromptSource: Send + Sync {
    async fn construct(&self) -> Result<String>;
}

/// Tools the built-in prompt knows how to describe
const KNOWN_TOOLS: &[(&str, &str)] = &[
    ("readFile", "Read the contents of a file by path"),
    ("writeFile", "Create a new file (asks the user first)"),
    ("editFile", "Replace the full contents of an existing file (read it first)"),
    ("listFiles", "List the entries of a directory, optionally recursively"),
    ("searchInDirectory", "Search files under a directory for a keyword"),
];

const WORKING_RULES: &str = r#"## Working Rules
1. Never guess file names, extensions, locations or contents. Look them up.
2. Gather information before changing anything.
3. Read a file with readFile before you write or edit anything based on it.
4. Do not stop to ask for permission between steps.
5. Finish the whole task in one pass."#;

const WORKFLOW: &str = r#"## Workflow
### Step 1: Explore
- Use listFiles to learn the project layout when it matters.
- Read every file the request refers to.
- Use searchInDirectory when you are unsure where something lives.

### Step 2: Implement
- Use writeFile for new files and editFile for existing ones.
- Make every related change before you finish.

Move from Step 1 to Step 2 without asking."#;

/// Assembles a system prompt from sections separated by blank lines
#[derive(Debug, Default)]
pub struct SystemPromptBuilder {
    sections: Vec<String>,
}

impl SystemPromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.sections.push(text.trim_end().to_string());
        }
        self
    }

    /// Adds the "Available Tools" section; fails on a name outside `KNOWN_TOOLS`
    pub fn tools(self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }

        let mut lines = vec!["## Available Tools".to_string()];
        for name in names {
            let (_, description) = KNOWN_TOOLS
                .iter()
                .find(|(known, _)| *known == name.as_str())
                .ok_or_else(|| anyhow!("Unknown tool in config: {}", name))?;
            lines.push(format!("- {}: {}", name, description));
        }
        Ok(self.section(lines.join("\n")))
    }

    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

/// The built-in coding assistant prompt
pub struct BuiltinPrompt {
    agent: AgentConfig,
    append: Option<String>,
}

impl BuiltinPrompt {
    pub fn new(agent: AgentConfig, append: Option<String>) -> Self {
        Self { agent, append }
    }

    pub fn build(&self) -> Result<String> {
        let mut builder = SystemPromptBuilder::new()
            .section(self.agent.role.as_str())
            .section(WORKING_RULES)
            .section(WORKFLOW)
            .tools(&self.agent.tools)?;

        if let Some(extra) = self.append.as_deref().filter(|s| !s.trim().is_empty()) {
            builder = builder.section(format!("## Additional Instructions\n{}", extra));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl PromptSource for BuiltinPrompt {
    async fn construct(&self) -> Result<String> {
        debug!(tools = self.agent.tools.len(), "Building built-in system prompt");
        self.build()
    }
}

/// Reads the prompt verbatim from a file
pub struct FilePrompt {
    path: PathBuf,
}

impl FilePrompt {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PromptSource for FilePrompt {
    async fn construct(&self) -> Result<String> {
        debug!("Reading system prompt from {:?}", self.path);
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read prompt file {}", self.path.display()))?;
        info!("Read {} bytes from {:?}", content.len(), self.path);
        Ok(content)
    }
}

/// Picks a source from the config: `prompt.file` if set, otherwise the built-in prompt
#[derive(Default)]
pub struct ConfiguredPrompt {
    config: Option<Config>,
}

impl ConfiguredPrompt {
    /// Loads the config file when `construct` is called
    pub fn new() -> Self {
        Self { config: None }
    }

    #[cfg(test)]
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Some(config),
        }
    }
}

#[async_trait]
impl PromptSource for ConfiguredPrompt {
    async fn construct(&self) -> Result<String> {
        let config = match &self.config {
            Some(config) => config.clone(),
            None => Config::load()?,
        };

        match config.prompt.file {
            Some(path) => FilePrompt::new(path).construct().await,
            None => {
                BuiltinPrompt::new(config.agent, config.prompt.append)
                    .construct()
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptConfig;

    #[test]
    fn test_builder_skips_blank_sections() {
        let prompt = SystemPromptBuilder::new()
            .section("first")
            .section("   ")
            .section("second\n")
            .build();
        assert_eq!(prompt, "first\n\nsecond");
    }

    #[test]
    fn test_builtin_prompt_lists_configured_tools() {
        let agent = AgentConfig {
            role: "You are a test assistant.".to_string(),
            tools: vec!["readFile".to_string(), "listFiles".to_string()],
        };
        let prompt = BuiltinPrompt::new(agent, None).build().unwrap();

        assert!(prompt.starts_with("You are a test assistant.\n\n## Working Rules"));
        assert!(prompt.contains("- readFile: Read the contents of a file by path"));
        assert!(prompt.contains("- listFiles:"));
        assert!(!prompt.contains("- writeFile:"));
        assert!(!prompt.contains("Additional Instructions"));
    }

    #[test]
    fn test_builtin_prompt_appends_instructions_last() {
        let prompt = BuiltinPrompt::new(AgentConfig::default(), Some("Be brief.".to_string()))
            .build()
            .unwrap();
        assert!(prompt.ends_with("## Additional Instructions\nBe brief."));
    }

    #[test]
    fn test_builtin_prompt_is_deterministic() {
        let a = BuiltinPrompt::new(AgentConfig::default(), None).build().unwrap();
        let b = BuiltinPrompt::new(AgentConfig::default(), None).build().unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_unknown_tool_fails() {
        let agent = AgentConfig {
            tools: vec!["deleteEverything".to_string()],
            ..AgentConfig::default()
        };
        let err = BuiltinPrompt::new(agent, None).construct().await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool in config: deleteEverything");
    }

    #[tokio::test]
    async fn test_file_prompt_reads_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "Hello world\n\n  keep spacing  ").unwrap();

        let prompt = FilePrompt::new(&path).construct().await.unwrap();
        assert_eq!(prompt, "Hello world\n\n  keep spacing  ");
    }

    #[tokio::test]
    async fn test_file_prompt_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");

        let err = FilePrompt::new(&path).construct().await.unwrap_err();
        assert!(err.to_string().contains("missing.md"));
    }

    #[tokio::test]
    async fn test_configured_prompt_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "from file").unwrap();

        let config = Config {
            prompt: PromptConfig {
                file: Some(path),
                append: Some("ignored".to_string()),
            },
            ..Config::default()
        };
        let prompt = ConfiguredPrompt::with_config(config).construct().await.unwrap();
        assert_eq!(prompt, "from file");
    }

    #[tokio::test]
    async fn test_configured_prompt_falls_back_to_builtin() {
        let prompt = ConfiguredPrompt::with_config(Config::default())
            .construct()
            .await
            .unwrap();
        assert!(prompt.contains("## Available Tools"));
    }
}
