use super::HandlerContext;
use anyhow::Result;
use chatfold_providers::{PricingRecord, candidate_keys, normalize_gateway_model};
use owo_colors::OwoColorize;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceOutput {
    model: String,
    normalized: String,
    candidates: Vec<String>,
    pricing: Option<PricingRecord>,
}

/// Unknown models are reported, not treated as errors
pub fn handle(ctx: &HandlerContext, model: &str) -> Result<()> {
    let pricing = ctx.config.pricing()?;
    let output = PriceOutput {
        model: model.to_string(),
        normalized: normalize_gateway_model(model).into_owned(),
        candidates: candidate_keys(model),
        pricing: pricing.resolve(model),
    };

    if ctx.is_json() {
        return ctx.print_json(&output);
    }

    println!("{} {}", "Model:".bold(), output.normalized.cyan());
    let Some(record) = output.pricing else {
        println!("{}", "Pricing not found.".yellow());
        println!("  tried: {}", output.candidates.join(", ").dimmed());
        return Ok(());
    };

    println!("  input:        {}", per_million(Some(record.input_cost_per_token)));
    println!("  output:       {}", per_million(Some(record.output_cost_per_token)));
    println!("  cache read:   {}", per_million(record.cache_read_input_token_cost));
    println!("  cache write:  {}", per_million(record.cache_creation_input_token_cost));
    println!("  context:      {} tokens", record.max_input_tokens);
    Ok(())
}

fn per_million(cost_per_token: Option<f64>) -> String {
    match cost_per_token {
        Some(cost) => format!("${:.4} / 1M tokens", cost * 1_000_000.0),
        None => "-".dimmed().to_string(),
    }
}
