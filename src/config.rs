use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Root {
    pub project: Option<Project>,
    pub job: Job,
    #[serde(default, rename = "expression")]
    pub expressions: Vec<Expression>,
    #[serde(default, rename = "curve")]
    pub curves: Vec<Curve>,
}

/// Optional metadata echoed into the generation manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Job {
    /// Domains to load, in upstream discovery order.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Result files for the per-file expression pass; may be empty.
    #[serde(default)]
    pub result_files: Vec<String>,
    pub output_dir: String,
    #[serde(default = "default_script_name")]
    pub script_name: String,
    #[serde(default = "default_expression_table")]
    pub expression_table: String,
    #[serde(default = "default_map_table")]
    pub map_table: String,
}

fn default_script_name() -> String {
    "output.cse".to_string()
}

fn default_expression_table() -> String {
    "expressions.csv".to_string()
}

fn default_map_table() -> String {
    "performance_map.csv".to_string()
}

/// A user-authored derived variable. `body` is opaque text handed through
/// to the session script verbatim; it is never parsed here. Order matters:
/// the dialect scopes variables sequentially, so an expression may refer to
/// any variable declared before it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Expression {
    pub variable: String,
    pub body: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Expression {
    /// Column name for the output table header: the variable with the
    /// conventional `$` sigil stripped.
    pub fn header_name(&self) -> &str {
        self.variable.strip_prefix('$').unwrap_or(&self.variable)
    }
}

/// One performance-map speedline: an ordered set of operating-point result
/// files bracketed by an inlet and an outlet domain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Curve {
    pub name: String,
    pub inlet: String,
    pub outlet: String,
    pub files: Vec<String>,
}

impl Root {
    /// Enabled expressions in declaration order. Disabled expressions are
    /// invisible to every downstream consumer.
    pub fn enabled_expressions(&self) -> Vec<&Expression> {
        self.expressions.iter().filter(|e| e.enabled).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.job.output_dir.is_empty() {
            bail!("job.output_dir must not be empty");
        }
        if self.job.script_name.is_empty() {
            bail!("job.script_name must not be empty");
        }

        for (i, d) in self.job.domains.iter().enumerate() {
            if d.is_empty() {
                bail!("job.domains[{}] must not be empty", i);
            }
            if self.job.domains[..i].contains(d) {
                bail!("duplicate domain: {}", d);
            }
        }

        for (i, f) in self.job.result_files.iter().enumerate() {
            if f.is_empty() {
                bail!("job.result_files[{}] must not be empty", i);
            }
        }

        let enabled = self.enabled_expressions();
        for (i, e) in enabled.iter().enumerate() {
            if e.variable.is_empty() {
                bail!("expression.variable must not be empty");
            }
            if enabled[..i].iter().any(|p| p.variable == e.variable) {
                bail!("duplicate enabled expression variable: {}", e.variable);
            }
        }

        for (i, c) in self.curves.iter().enumerate() {
            if c.name.is_empty() {
                bail!("curve.name must not be empty");
            }
            if self.curves[..i].iter().any(|p| p.name == c.name) {
                bail!("duplicate curve name: {}", c.name);
            }
            if c.inlet.is_empty() {
                bail!("curve '{}' is missing an inlet domain", c.name);
            }
            if c.outlet.is_empty() {
                bail!("curve '{}' is missing an outlet domain", c.name);
            }
            if c.files.is_empty() {
                bail!("curve '{}' has no result files", c.name);
            }
        }

        Ok(())
    }
}
