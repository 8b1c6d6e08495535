use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_max_rules() -> usize {
    500 // pairwise scan is O(n^2); above this the table is reported instead of scanned
}

fn default_element_kinds() -> Vec<String> {
    vec![
        "decision".to_string(),
        "inputData".to_string(),
        "businessKnowledgeModel".to_string(),
    ]
}

fn default_documentation_tags() -> Vec<String> {
    vec!["description".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Which checks run. Order in this list does not change execution order.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Whether an ERROR from one check stops the checks after it
    #[serde(default)]
    pub gating: GatingPolicy,
    #[serde(default)]
    pub overlap: OverlapConfig,
    #[serde(default)]
    pub description: DescriptionConfig,
    #[serde(default)]
    pub type_consistency: TypeConsistencyConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub checks: Vec<CheckConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Name of the check: HitPolicy, Description, TypeConsistency or RuleGap
    pub name: String,
    /// Whether this check is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl CheckConfig {
    fn enabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            checks: vec![
                CheckConfig::enabled("HitPolicy"),
                CheckConfig::enabled("Description"),
                CheckConfig::enabled("TypeConsistency"),
                CheckConfig::enabled("RuleGap"),
            ],
        }
    }
}

impl PipelineConfig {
    /// Names of the enabled checks, as written in the config.
    pub fn enabled_names(&self) -> impl Iterator<Item = &str> {
        self.checks
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingPolicy {
    /// Every enabled check runs once the document parsed
    #[default]
    Independent,
    /// Once a check reports an ERROR the remaining checks are skipped
    StopOnError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapConfig {
    /// Rule-count ceiling for the pairwise overlap scan of a single table
    #[serde(default = "default_max_rules")]
    pub max_rules: usize,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            max_rules: default_max_rules(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionConfig {
    /// Element kinds (local names) that must carry a description
    #[serde(default = "default_element_kinds")]
    pub element_kinds: Vec<String>,
    /// Also require one on the root definitions element
    #[serde(default = "default_true")]
    pub check_definitions: bool,
    /// Child element names accepted as documentation
    #[serde(default = "default_documentation_tags")]
    pub tags: Vec<String>,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            element_kinds: default_element_kinds(),
            check_definitions: true,
            tags: default_documentation_tags(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeConsistencyConfig {
    /// Follow typeRefs that name an itemDefinition down to a built-in type
    #[serde(default = "default_true")]
    pub resolve_item_definitions: bool,
}

impl Default for TypeConsistencyConfig {
    fn default() -> Self {
        Self {
            resolve_item_definitions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Worker threads for batch analysis; 0 uses the rayon global pool
    #[serde(default)]
    pub threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: 0,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            gating: GatingPolicy::default(),
            overlap: OverlapConfig::default(),
            description: DescriptionConfig::default(),
            type_consistency: TypeConsistencyConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl ValidationConfig {
    /// Load config from a YAML file. Missing sections take their defaults.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config file {path}"))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ValidationConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("Failed to load config from {}, using defaults: {:#}", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject settings no run could honour.
    pub fn validate(&self) -> Result<()> {
        if self.overlap.max_rules < 2 {
            bail!(
                "overlap.max_rules must be at least 2, got {}",
                self.overlap.max_rules
            );
        }
        if self.description.tags.iter().all(|t| t.trim().is_empty()) {
            bail!("description.tags must name at least one documentation element");
        }
        if self.description.element_kinds.iter().any(|k| k.trim().is_empty()) {
            bail!("description.element_kinds must not contain blank names");
        }
        Ok(())
    }
}
