use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

// Import from rulebook-core
use rulebook_core::workflow::{
    export_collection, import_collection, ExportOutcome, ImportOutcome, StdFileSystem,
};
use rulebook_core::{EngineConfig, EntryFields, EntryIndex, RuleStore, SessionDocument, Tab};

// Import CLI utilities
use rulebook::logging::init_logging;
use rulebook::{ArgDialog, ConsoleErrorSink};

#[derive(Parser)]
#[command(name = "rulebook")]
#[command(about = "Compose regex libraries into section and expression rule sets")]
struct Args {
    /// Session file holding all three collections (created on first save)
    #[arg(short, long, default_value = "rulebook_session.json")]
    session: String,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the entries of one tab, or all tabs
    Show {
        #[arg(short, long)]
        tab: Option<Tab>,
    },
    /// Add an entry, or replace the one at --index
    Add {
        #[arg(short, long)]
        tab: Tab,
        #[arg(short, long)]
        name: String,
        /// Regex, or #<library name> on the expressions tab
        #[arg(short, long)]
        pattern: String,
        /// Skip this section when segmenting (sections tab only)
        #[arg(long)]
        ignore: bool,
        #[arg(long)]
        index: Option<usize>,
    },
    /// Remove the entry at an index
    Remove {
        #[arg(short, long)]
        tab: Tab,
        #[arg(long)]
        index: usize,
    },
    /// Print the active (usable) rules of a tab as JSON
    Active {
        #[arg(short, long)]
        tab: Tab,
    },
    /// Change section-level settings
    Sections {
        #[arg(long)]
        section_break: Option<String>,
        #[arg(long)]
        ignore_header: Option<bool>,
        #[arg(long)]
        ignore_unnamed_sections: Option<bool>,
    },
    /// Replace a tab with the contents of an exchange file
    Import {
        #[arg(short, long)]
        tab: Tab,
        file: PathBuf,
    },
    /// Write a tab as an exchange file (default name: <prefix>_<tab>.json)
    Export {
        #[arg(short, long)]
        tab: Tab,
        file: Option<PathBuf>,
    },
    /// Write the resolved, active rules for the extraction pipeline
    ExportRules {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = load_config(args.config.as_deref());
    let mut store = load_session(&args.session, &config)?;

    let changed = match args.command {
        Command::Show { tab } => {
            match tab {
                Some(tab) => show_tab(&store, tab),
                None => Tab::ALL.iter().for_each(|tab| show_tab(&store, *tab)),
            }
            false
        }
        Command::Add {
            tab,
            name,
            pattern,
            ignore,
            index,
        } => {
            let fields = EntryFields::new(name.clone(), pattern).ignored(ignore);
            let position = store.upsert_entry(tab, EntryIndex::from(index), fields)?;
            println!("✅ Saved {} entry at index {}", tab, position);
            if !store.active_set(tab).iter().any(|rule| rule.name == name) {
                println!(
                    "⚠️  '{}' is not active (empty name, invalid pattern or unresolved alias)",
                    name
                );
            }
            true
        }
        Command::Remove { tab, index } => {
            let name = store.remove_entry(tab, index)?;
            println!("🗑️  Removed '{}' from {}", name, tab);
            true
        }
        Command::Active { tab } => {
            store.select_tab(tab);
            println!("{}", serde_json::to_string_pretty(store.active_set(tab))?);
            false
        }
        Command::Sections {
            section_break,
            ignore_header,
            ignore_unnamed_sections,
        } => {
            if let Some(section_break) = section_break {
                store.set_section_break(section_break);
            }
            if let Some(ignore_header) = ignore_header {
                store.set_ignore_header(ignore_header);
            }
            if let Some(ignore_unnamed) = ignore_unnamed_sections {
                store.set_ignore_unnamed_sections(ignore_unnamed);
            }
            let settings = &store.sections().settings;
            println!("📋 Section settings:");
            println!("   - section_break: {:?}", settings.section_break);
            println!("   - ignore_header: {}", settings.ignore_header);
            println!("   - ignore_unnamed_sections: {}", settings.ignore_unnamed_sections);
            if !settings.is_usable() {
                println!("⚠️  No section break set - sections stay inactive until one is");
            }
            true
        }
        Command::Import { tab, file } => {
            let mut sink = ConsoleErrorSink::new();
            let outcome = import_collection(
                &mut store,
                tab,
                &mut ArgDialog::new(Some(file)),
                &StdFileSystem,
                &mut sink,
                &config,
            );
            let imported = match outcome {
                ImportOutcome::Imported(summary) => {
                    println!("✅ Imported {} {} entries", summary.entries, tab);
                    println!("   - active: {}", store.active_set(tab).len());
                    if sink.warnings() > 0 {
                        println!("   - warnings: {}", sink.warnings());
                    }
                    true
                }
                ImportOutcome::Cancelled | ImportOutcome::Failed => false,
            };
            if sink.has_errors() {
                std::process::exit(1);
            }
            imported
        }
        Command::Export { tab, file } => {
            let mut sink = ConsoleErrorSink::new();
            match export_collection(
                &store,
                tab,
                &mut ArgDialog::new(file),
                &StdFileSystem,
                &mut sink,
                &config,
            ) {
                ExportOutcome::Saved(path) => {
                    println!("💾 {} saved to: {}", tab, path.display());
                }
                ExportOutcome::Cancelled | ExportOutcome::Failed => {}
            }
            if sink.has_errors() {
                std::process::exit(1);
            }
            false
        }
        Command::ExportRules { output } => {
            let export = store.export_rules()?;
            let json = serde_json::to_string_pretty(&export)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("💾 Rules saved to: {}", path.display());
                    println!("   - expressions: {}", export.expressions.len());
                    println!("   - sections: {}", export.sections.named_sections.len());
                    println!("   - fingerprint: {}", export.fingerprint);
                }
                None => println!("{json}"),
            }
            false
        }
    };

    if changed {
        save_session(&store, &args.session)?;
    }
    Ok(())
}

/// Explicit --config, then the per-user config file, then defaults
fn load_config(path: Option<&str>) -> EngineConfig {
    if path.is_some() {
        return EngineConfig::load_with_fallback(path);
    }
    let user_config = dirs::config_dir().map(|dir| dir.join("rulebook").join("config.yaml"));
    match user_config {
        Some(p) if p.exists() => EngineConfig::load_with_fallback(p.to_str()),
        _ => EngineConfig::default(),
    }
}

fn load_session(path: &str, config: &EngineConfig) -> Result<RuleStore> {
    let mut store = RuleStore::new(config);
    if !Path::new(path).exists() {
        tracing::info!(path, "no session file yet, starting empty");
        return Ok(store);
    }
    let json = std::fs::read_to_string(path)?;
    let session = SessionDocument::from_json(&json)
        .map_err(|e| anyhow!("Failed to read session {}: {}", path, e))?;
    store
        .load(&session)
        .map_err(|e| anyhow!("Failed to restore session {}: {}", path, e))?;
    Ok(store)
}

fn save_session(store: &RuleStore, path: &str) -> Result<()> {
    let session = store.export_session()?;
    std::fs::write(path, session.to_json_pretty()?)?;
    println!("💾 Session saved to: {}", path);
    Ok(())
}

fn show_tab(store: &RuleStore, tab: Tab) {
    let active = store.active_set(tab);
    println!("\n📚 {} ({} entries, {} active)", tab, store.len(tab), active.len());
    let is_active = |name: &str| active.iter().any(|rule| rule.name == name);
    match tab {
        Tab::Library => {
            for (i, entry) in store.library().iter().enumerate() {
                println!(
                    "  {} [{}] {} {} = {}",
                    marker(is_active(&entry.name)),
                    i,
                    entry.color,
                    entry.name,
                    entry.pattern
                );
            }
        }
        Tab::Expressions => {
            for (i, entry) in store.expressions().iter().enumerate() {
                let resolved = if entry.raw_pattern() == entry.resolved_pattern {
                    String::new()
                } else if entry.is_unresolved_alias() {
                    "  (unresolved)".to_string()
                } else {
                    format!("  -> {}", entry.resolved_pattern)
                };
                println!(
                    "  {} [{}] {} {} = {}{}",
                    marker(is_active(&entry.name)),
                    i,
                    entry.color,
                    entry.name,
                    entry.raw_pattern(),
                    resolved
                );
            }
        }
        Tab::Sections => {
            let settings = &store.sections().settings;
            println!(
                "  section_break={:?} ignore_header={} ignore_unnamed_sections={}",
                settings.section_break, settings.ignore_header, settings.ignore_unnamed_sections
            );
            for (i, entry) in store.sections().entries.iter().enumerate() {
                println!(
                    "  {} [{}] {} {} = {}{}",
                    marker(is_active(&entry.name)),
                    i,
                    entry.color,
                    entry.name,
                    entry.pattern,
                    if entry.ignore { "  (ignored)" } else { "" }
                );
            }
        }
    }
}

fn marker(active: bool) -> &'static str {
    if active {
        "✓"
    } else {
        "·"
    }
}
