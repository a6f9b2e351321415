//! List command
//!
//! Loads plugins and shows each one's name, location, description and the
//! hook kinds it handles.

use colored::*;
use eyre::Result;
use serde::Serialize;
use std::path::Path;

use super::{load_registry, release};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::hook::HookKind;
use crate::plugin::{Matchers, Registry};

#[derive(Debug, Serialize)]
struct PluginListing {
    name: String,
    path: String,
    description: String,
    matcher: Matchers,
    events: Vec<HookKind>,
}

pub fn run(plugins: &[String], format: OutputFormat, dir: Option<&Path>, config: &Config) -> Result<()> {
    let registry = load_registry(plugins, dir, config)?;
    let listings = collect(&registry);
    release(&registry);

    if listings.is_empty() {
        eyre::bail!("no plugins loaded");
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listings)?),
        OutputFormat::Text => print_text(&listings),
    }
    Ok(())
}

fn collect(registry: &Registry) -> Vec<PluginListing> {
    registry
        .list()
        .into_iter()
        .filter_map(|info| {
            let metadata = registry.get(&info.name)?.metadata();
            Some(PluginListing {
                path: Config::display_path(&info.path),
                name: info.name,
                description: info.description,
                matcher: metadata.matcher,
                events: metadata.events,
            })
        })
        .collect()
}

fn print_text(listings: &[PluginListing]) {
    println!("{}", "Loaded plugins:".bold());

    for listing in listings {
        println!();
        let location = format!("({})", listing.path);
        println!("{} {} {}", "•".green(), listing.name.as_str().bold(), location.as_str().dimmed());
        println!("  {:13} {}", "Description:".dimmed(), listing.description);
        println!("  {}", "Matchers:".dimmed());

        let matchers = [HookKind::PreToolUse, HookKind::PostToolUse]
            .into_iter()
            .filter_map(|kind| listing.matcher.for_kind(kind).map(|m| (kind, m)))
            .collect::<Vec<_>>();
        if matchers.is_empty() {
            println!("    {}", "No matchers configured".dimmed());
        }
        for (kind, matcher) in matchers {
            println!("    {}: {}", kind.as_str().cyan(), matcher);
        }

        if !listing.events.is_empty() {
            let events: Vec<&str> = listing.events.iter().map(|k| k.as_str()).collect();
            println!("  {:13} {}", "Events:".dimmed(), events.join(", "));
        }
    }
}
