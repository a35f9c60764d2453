//! Item Aliases CLI
//!
//! Resolve item names and name items from alias files.

use clap::{Parser, Subcommand};
use item_aliases::{
    load_platform, AliasLoader, AliasRegistry, CanonicalItem, Conditions, Diagnostics, ItemStack,
    Platform, ResolutionContext,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "item-aliases")]
#[command(author, version, about = "Resolve Minecraft item names with alias files", long_about = None)]
struct Cli {
    /// Platform table (JSON) with materials and enchantments
    #[arg(short, long, global = true, default_value = "platform.json")]
    platform: PathBuf,

    /// Alias sources: .sk files, directories or ZIP archives
    #[arg(short, long, global = true)]
    aliases: Vec<PathBuf>,

    /// Also name materials that no alias covers
    #[arg(long, global = true)]
    missing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a name such as "3 oak boats" or "every sword of sharpness 5"
    Resolve {
        /// Name to resolve
        name: String,
    },

    /// Find the alias name of an item
    Name {
        /// Material id (e.g., "minecraft:oak_boat" or "oak_boat")
        material: String,

        /// Item tags as JSON
        #[arg(short, long)]
        tags: Option<String>,

        /// Damage value
        #[arg(short, long, default_value = "0")]
        damage: u16,
    },

    /// Show information about the loaded aliases
    Info,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let platform: Arc<dyn Platform> = Arc::new(load_platform(&cli.platform)?);
    let (registry, diagnostics) = load_aliases(platform.clone(), &cli.aliases, cli.missing)?;
    if !diagnostics.is_empty() {
        eprintln!(
            "Loaded with {} errors and {} warnings",
            diagnostics.errors().count(),
            diagnostics.warnings().count()
        );
    }

    match cli.command {
        Commands::Resolve { name } => resolve(&registry, &name),
        Commands::Name {
            material,
            tags,
            damage,
        } => name_item(&registry, &material, tags.as_deref(), damage)?,
        Commands::Info => show_info(&registry, &diagnostics),
    }

    Ok(())
}

fn load_aliases(
    platform: Arc<dyn Platform>,
    sources: &[PathBuf],
    missing: bool,
) -> Result<(AliasRegistry, Diagnostics), Box<dyn std::error::Error>> {
    let conditions = Conditions::with_version(platform.version().clone());
    let mut loader = AliasLoader::new(AliasRegistry::new(platform), conditions);

    for source in sources {
        println!("Loading aliases from {:?}...", source);
        load_source(&mut loader, source)?;
    }
    if missing {
        loader.load_missing_aliases();
    }
    Ok(loader.finish())
}

fn load_source(loader: &mut AliasLoader, path: &Path) -> item_aliases::Result<()> {
    if path.is_dir() {
        loader.load_directory(path)
    } else if path.extension().map_or(false, |ext| ext == "zip") {
        loader.load_archive(path)
    } else {
        loader.load_file(path)
    }
}

fn resolve(registry: &AliasRegistry, name: &str) {
    let ctx = ResolutionContext::new(registry);
    let selector = match ctx.resolve_name(name) {
        Some(selector) => selector,
        None => {
            println!("'{}' is not an item type", name);
            return;
        }
    };

    println!("{}", ctx.describe(&selector));
    println!("  Amount: {}", selector.internal_amount());
    println!("  All: {}", selector.is_all());
    for (item, id) in selector.types().iter().zip(ctx.raw_names(&selector)) {
        let tags = item.tags();
        if tags.is_empty() {
            println!("  - {}", id);
        } else {
            println!("  - {} {}", id, serde_json::Value::Object(tags));
        }
    }
}

fn name_item(
    registry: &AliasRegistry,
    material_id: &str,
    tags: Option<&str>,
    damage: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let platform = registry.platform();
    let material = platform
        .material(material_id)
        .ok_or_else(|| item_aliases::AliasError::UnknownMaterial(material_id.to_string()))?;
    let info = platform
        .material_info(material)
        .ok_or_else(|| item_aliases::AliasError::UnknownMaterial(material_id.to_string()))?;

    let mut stack = ItemStack::new(material).with_damage(damage);
    if let Some(tags) = tags {
        stack.tags = serde_json::from_str(tags)?;
    }
    let item = CanonicalItem::from_stack(&stack, info);

    let ctx = ResolutionContext::new(registry);
    let found = registry.match_alias(&item);
    println!("{}", ctx.material_name(&item, false));
    println!("  Plural: {}", ctx.material_name(&item, true));
    println!("  Gender: {:?}", ctx.gender(&item));
    println!("  Match: {:?}", found.quality);
    if let Some(id) = ctx.minecraft_id(&item) {
        println!("  Minecraft id: {}", id);
    }
    if let Some(entity) = ctx.related_entity(&item) {
        println!("  Related entity: {}", entity);
    }
    Ok(())
}

fn show_info(registry: &AliasRegistry, diagnostics: &Diagnostics) {
    println!("\nAlias Info:");
    println!("  Names: {}", registry.alias_count());
    println!("  Items: {}", registry.index().len());
    println!("  Errors: {}", diagnostics.errors().count());
    println!("  Warnings: {}", diagnostics.warnings().count());

    for diagnostic in diagnostics.iter() {
        println!("  {}", diagnostic);
    }
}
