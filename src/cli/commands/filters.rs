//! filters command - List available filters or describe one

use crate::cli::output::print_json;
use crate::engine::Context;
use crate::filter::{Filter, FilterRegistry};
use anyhow::{anyhow, Result};
use serde_json::json;

pub fn filters(ctx: &Context, filter: Option<&str>, json: bool) -> Result<()> {
    let registry = FilterRegistry::with_builtin();
    match filter {
        None => list(ctx, &registry, json),
        Some(id) => {
            let filter = registry
                .resolve(id)
                .ok_or_else(|| anyhow!("Unknown filter: {}", id))?;
            describe(filter.as_ref(), json)
        }
    }
}

fn list(ctx: &Context, registry: &FilterRegistry, json: bool) -> Result<()> {
    let metadata = registry.list();
    if json {
        return print_json(&metadata);
    }
    for meta in &metadata {
        if ctx.quiet {
            println!("{}", meta.name);
        } else {
            println!("{:<28} {:<32} {}", meta.name, meta.human_name, meta.uuid);
        }
    }
    Ok(())
}

fn describe(filter: &dyn Filter, json: bool) -> Result<()> {
    let meta = filter.metadata();
    let params = filter.parameters();

    if json {
        let params: Vec<_> = params
            .iter()
            .map(|p| {
                json!({
                    "key": p.key,
                    "human_name": p.human_name,
                    "help": p.help,
                    "kind": p.kind,
                    "required": p.is_required(),
                    "default": p.default,
                    "constraint": p.constraint.as_ref().map(|c| c.to_string()),
                })
            })
            .collect();
        return print_json(&json!({ "filter": meta, "parameters": params }));
    }

    println!("{} ({})", meta.human_name, meta.name);
    println!("  uuid:    {}", meta.uuid);
    println!("  version: {}", meta.version);
    println!("  tags:    {}", meta.tags.join(", "));
    println!();
    println!("Parameters:");
    for p in &params {
        let default = match &p.default {
            Some(value) => format!("default {}", value),
            None => "required".to_string(),
        };
        let constraint = p
            .constraint
            .as_ref()
            .map(|c| format!(", {}", c))
            .unwrap_or_default();
        println!("  {:<26} {} ({}{})", p.key, p.kind, default, constraint);
        if !p.help.is_empty() {
            println!("  {:<26} {}", "", p.help);
        }
    }
    Ok(())
}
