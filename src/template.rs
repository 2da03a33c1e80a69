//! Expression-template persistence.
//!
//! A template is a named, ordered expression list saved as JSON, so a set
//! of derived variables can be reused across jobs. Loading never touches
//! expression bodies; they stay opaque strings.

use crate::config::Expression;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Template {
    pub name: String,
    pub expressions: Vec<Expression>,
}

pub fn load(path: &Path) -> Result<Template> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read template: {}", path.display()))?;
    let tpl: Template = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse template: {}", path.display()))?;
    Ok(tpl)
}

pub fn save(path: &Path, tpl: &Template) -> Result<()> {
    let json = serde_json::to_string_pretty(tpl)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write template: {}", path.display()))?;
    Ok(())
}

/// Starter template for an axial-centrifugal compressor stage. Interface
/// placeholders (`{interface}`) are meant to be replaced by the user with
/// the pasteable tokens of their own case.
pub fn builtin() -> Template {
    Template {
        name: "Axial Centrifugal Compressor".to_string(),
        expressions: vec![
            Expression {
                variable: "$n".to_string(),
                body: "44400".to_string(),
                description: "Mechanical Speed [rev min-1]".to_string(),
                enabled: true,
            },
            Expression {
                variable: "$R2".to_string(),
                body: "0.141".to_string(),
                description: "Exit Radius [m]".to_string(),
                enabled: true,
            },
            Expression {
                variable: "$Vcirc".to_string(),
                body: "pi * $R2 * $n / 30".to_string(),
                description: "Exit Blade Speed [m s-1]".to_string(),
                enabled: true,
            },
            Expression {
                variable: "$Phi".to_string(),
                body: "massFlowAve(\"Velocity Axial\", {interface})/$Vcirc"
                    .to_string(),
                description: "Flow Coefficient".to_string(),
                enabled: true,
            },
        ],
    }
}
