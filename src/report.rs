//! Provenance report
//!
//! What each registered field resolved from, rendered as a table or JSON.

use crate::binding::{Binding, Provenance};
use crate::managed::ManagedField;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub type_name: String,
    /// `unset`, `default` or `<source> (<bound name>)`.
    pub resolved_from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_name: Option<String>,
    /// Every binding of the field as `<source>: <bound name>`, lowest precedence first.
    pub bindings: Vec<String>,
}

impl FieldReport {
    pub fn from_managed(managed: &ManagedField) -> Self {
        let field = managed.field();
        let provenance = field.provenance();
        Self {
            name: managed.name().to_string(),
            description: managed.description().to_string(),
            required: managed.is_required(),
            type_name: field.type_name().to_string(),
            resolved_from: provenance.to_string(),
            source: provenance.source_name().map(str::to_string),
            bound_name: match provenance {
                Provenance::FromSource { bound_name, .. } => Some(bound_name.clone()),
                _ => None,
            },
            bindings: field.bindings().iter().map(describe_binding).collect(),
        }
    }
}

fn describe_binding(binding: &Binding) -> String {
    match binding.source() {
        Some(source) => format!("{}: {}", source.name(), binding.bound_name()),
        None => binding.bound_name().to_string(),
    }
}

/// Report output for JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigReport {
    pub fields: Vec<FieldReport>,
    pub total: usize,
    pub from_sources: usize,
}

impl ConfigReport {
    pub fn new(fields: Vec<FieldReport>) -> Self {
        let from_sources = fields.iter().filter(|f| f.source.is_some()).count();
        Self {
            total: fields.len(),
            from_sources,
            fields,
        }
    }
}

/// Human-readable report (section heading plus comfy-table).
pub fn render_table(report: &ConfigReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", "Configuration".bold().underline()));
    if report.fields.is_empty() {
        out.push_str("No fields registered.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Resolved from", "Required", "Bindings", "Description"]);
    for row in &report.fields {
        table.add_row(vec![
            row.name.clone(),
            row.resolved_from.clone(),
            if row.required { "yes" } else { "no" }.to_string(),
            row.bindings.join("\n"),
            row.description.clone(),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!(
        "Total: {} fields, {} set from a source.\n",
        report.total, report.from_sources
    ));
    out
}

pub fn render_json(report: &ConfigReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
