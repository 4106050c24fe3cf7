//! Prompt library for the analysis provider
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/finsight/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! This lets users tune the analysis instructions without rebuilding, while
//! still picking up new default prompts on upgrade. A prompt that does not
//! reference every variable its task needs is rejected at load time.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const ANALYZE_EXPENSES: &str = include_str!("../../../prompts/analyze_expenses.md");
}

/// Template variable carrying the raw expense text
pub const EXPENSES_VAR: &str = "expenses";

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Full expense analysis with search grounding
    AnalyzeExpenses,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnalyzeExpenses => "analyze_expenses",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::AnalyzeExpenses]
    }

    /// Variables the user section must reference
    pub fn required_vars(&self) -> &'static [&'static str] {
        match self {
            Self::AnalyzeExpenses => &[EXPENSES_VAR],
        }
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::AnalyzeExpenses => defaults::ANALYZE_EXPENSES,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// Kind of task the prompt drives
    pub task_type: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// The prompt body (everything after the frontmatter)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// User section, or the whole body when there is no `# User` header
    pub fn user_template(&self) -> &str {
        self.user_section().unwrap_or(&self.content)
    }

    /// Render the user template with `{{var}}` replaced
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        render_template(self.user_template(), vars)
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    ///
    /// Fails with [`Error::InvalidData`] when the prompt's user template
    /// leaves out one of [`PromptId::required_vars`].
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        match self.cache.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let prompt = load(self.override_dir.as_deref(), id)?;
                Ok(entry.insert(prompt))
            }
        }
    }

    /// Where an override for this prompt is looked up, whether or not it exists
    pub fn override_file(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("prompts").join("overrides"))
}

/// Load a prompt (checking override first, then default)
fn load(override_dir: Option<&Path>, id: PromptId) -> Result<Prompt> {
    if let Some(dir) = override_dir {
        let override_path = dir.join(format!("{}.md", id.as_str()));
        if override_path.exists() {
            let content = fs::read_to_string(&override_path).map_err(|e| {
                Error::InvalidData(format!("Failed to read prompt override: {}", e))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            let prompt = Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            };
            check_required_vars(&prompt, id)?;
            tracing::debug!(prompt = id.as_str(), "Using prompt override");
            return Ok(prompt);
        }
    }

    let (metadata, body) = parse_prompt(id.default_content())?;
    let prompt = Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    };
    check_required_vars(&prompt, id)?;
    Ok(prompt)
}

/// Reject a prompt that would send the request without a required variable
fn check_required_vars(prompt: &Prompt, id: PromptId) -> Result<()> {
    let present = template_vars(prompt.user_template());
    let missing: Vec<String> = id
        .required_vars()
        .iter()
        .filter(|var| !present.contains(*var))
        .map(|var| format!("{{{{{}}}}}", var))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let source = prompt
        .override_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "embedded default".to_string());
    Err(Error::InvalidData(format!(
        "Prompt {} ({}) does not reference {} in its user section",
        id.as_str(),
        source,
        missing.join(", ")
    )))
}

/// Names of the `{{var}}` placeholders in a template
fn template_vars(template: &str) -> Vec<&str> {
    let mut vars = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        vars.push(after[..end].trim());
        rest = &after[end + 2..];
    }
    vars
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Up to the next top-level header or end of content
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Mustache-style `{{var}}` replacement in a single pass
///
/// Substituted values are never re-scanned, so expense text containing
/// braces is embedded verbatim.
fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
