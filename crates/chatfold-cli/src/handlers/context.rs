use crate::config::Config;
use crate::types::OutputFormat;
use anyhow::Result;
use chatfold_types::UsageComponent;
use serde::Serialize;

/// What every handler needs besides its own arguments
pub struct HandlerContext {
    pub format: OutputFormat,
    pub config: Config,
}

impl HandlerContext {
    pub fn new(format: OutputFormat, config: Config) -> Self {
        Self { format, config }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Pretty JSON on stdout
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// `$0.0123`, `>= $0.0123` for lower bounds, `-` when unknown
pub fn format_cost(cost: Option<f64>, lower_bound: bool) -> String {
    match cost {
        Some(cost) if lower_bound => format!(">= ${:.4}", cost),
        Some(cost) => format!("${:.4}", cost),
        None => "-".to_string(),
    }
}

/// Wire name of a unit enum variant, e.g. `output-available`
pub fn wire_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub fn format_component(component: &UsageComponent) -> String {
    match component.cost_usd {
        Some(cost) => format!("{} (${:.4})", component.tokens, cost),
        None => component.tokens.to_string(),
    }
}
