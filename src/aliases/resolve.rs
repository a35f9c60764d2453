//! Name resolution against a script-local and a global registry.

use crate::parser::Gender;
use crate::platform::Platform;
use crate::registry::AliasRegistry;
use crate::types::{CanonicalItem, EnchantmentType, EntityRef, ItemSelector};

const ANY_PREFIX: &str = "any ";
const EVERY_PREFIX: &str = "every ";
const OF_EVERY: &str = "of every ";
const ENCHANTMENT_OF: &str = " of ";

/// Registries consulted by name lookups: the script-local registry first,
/// then the global one.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    script_local: Option<&'a AliasRegistry>,
    global: &'a AliasRegistry,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(global: &'a AliasRegistry) -> Self {
        Self {
            script_local: None,
            global,
        }
    }

    pub fn with_script(mut self, script_local: &'a AliasRegistry) -> Self {
        self.script_local = Some(script_local);
        self
    }

    fn registry(&self) -> &'a AliasRegistry {
        self.script_local.unwrap_or(self.global)
    }

    fn platform(&self) -> &'a dyn Platform {
        self.global.platform()
    }

    /// Resolve a full item name with quantifiers and enchantments:
    ///
    /// - `*` is every item
    /// - `3 of every sword`, `3 swords`, `3 of sword`, `every sword`,
    ///   `a sword`
    /// - `sword of sharpness 5, unbreaking and mending`
    /// - `any sword`, `stone block`, `stone items`
    ///
    /// Returns `None` when the name does not resolve.
    pub fn resolve_name(&self, text: &str) -> Option<ItemSelector> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        if text == "*" {
            return Some(ItemSelector::everything());
        }

        let mut selector = ItemSelector::new();
        let rest = parse_quantifier(&text, &mut selector);

        let mut from = 0;
        while let Some(found) = rest[from..].find(ENCHANTMENT_OF) {
            let at = from + found;
            from = at + 1;

            let mut candidate = selector.clone();
            if !self.parse_type(&rest[..at], &mut candidate) || candidate.is_empty() {
                continue;
            }
            let enchantments: Option<Vec<EnchantmentType>> = split_enchantments(&rest[at + ENCHANTMENT_OF.len()..])
                .map(|name| parse_enchantment(self.platform(), name))
                .collect();
            if let Some(enchantments) = enchantments {
                candidate.add_enchantments(&enchantments);
                return Some(candidate);
            }
        }

        if !self.parse_type(rest, &mut selector) || selector.is_empty() {
            return None;
        }
        Some(selector)
    }

    /// Resolve a comma separated list of plain alias names, without
    /// quantifiers. Every part must resolve.
    pub fn parse_alias_list(&self, text: &str) -> Option<ItemSelector> {
        let text = text.trim();
        if text.is_empty() {
            log::warn!("Empty item type");
            return None;
        }
        if text == "*" {
            return Some(ItemSelector::everything());
        }

        let mut selector = ItemSelector::new();
        for part in text.split(',').map(str::trim) {
            if !self.parse_type(&part.to_lowercase(), &mut selector) {
                log::warn!("'{}' is not an item type", part);
                return None;
            }
        }
        Some(selector)
    }

    fn parse_type(&self, name: &str, selector: &mut ItemSelector) -> bool {
        if name.is_empty() {
            return match self.air() {
                Some(air) => {
                    selector.add(air);
                    true
                }
                None => false,
            };
        }
        if name.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match self.alias(name) {
            Some(items) => {
                selector.add_all(items);
                true
            }
            None => false,
        }
    }

    fn air(&self) -> Option<CanonicalItem> {
        let platform = self.platform();
        let material = platform.material("air")?;
        Some(CanonicalItem::new(material, platform.material_info(material)?))
    }

    fn alias(&self, name: &str) -> Option<Vec<CanonicalItem>> {
        let name = name.strip_prefix(ANY_PREFIX).unwrap_or(name);
        let registry = self.registry();
        if let Some(items) = registry.alias_items(name) {
            return Some(items.iter().map(|item| (**item).clone()).collect());
        }

        let (base, blocks) = if let Some(base) = strip_word(name, &["block", "blocks"]) {
            (base, true)
        } else if let Some(base) = strip_word(name, &["item", "items"]) {
            (base, false)
        } else {
            return None;
        };

        let items: Vec<CanonicalItem> = registry
            .alias_items(base)?
            .iter()
            .filter(|item| if blocks { item.is_block() } else { item.is_anything() || !item.is_block() })
            .map(|item| (**item).clone())
            .collect();
        (!items.is_empty()).then_some(items)
    }

    /// Name of the alias best describing `item`, or its material key when no
    /// alias matches.
    pub fn material_name(&self, item: &CanonicalItem, plural: bool) -> String {
        if let Some(name) = self.registry().material_name(item) {
            return name.form(plural).to_string();
        }
        if item.is_anything() {
            return "*".to_string();
        }
        self.platform()
            .material_info(item.material())
            .map(|info| info.key().replace('_', " "))
            .unwrap_or_default()
    }

    pub fn gender(&self, item: &CanonicalItem) -> Gender {
        self.registry()
            .material_name(item)
            .map_or(Gender::Unspecified, |name| name.gender)
    }

    pub fn minecraft_id(&self, item: &CanonicalItem) -> Option<&'a str> {
        self.registry().minecraft_id(item)
    }

    pub fn related_entity(&self, item: &CanonicalItem) -> Option<&'a EntityRef> {
        self.registry().related_entity(item)
    }

    /// Minecraft ids of every item of a selector.
    pub fn raw_names(&self, selector: &ItemSelector) -> Vec<String> {
        selector
            .types()
            .iter()
            .filter(|item| !item.is_anything())
            .filter_map(|item| match self.minecraft_id(item) {
                Some(id) => Some(id.to_string()),
                None => self
                    .platform()
                    .material_info(item.material())
                    .map(|info| info.id.clone()),
            })
            .collect()
    }

    /// English description of a selector, e.g. "every diamond sword",
    /// "3 oak boats" or "a stone or an apple".
    pub fn describe(&self, selector: &ItemSelector) -> String {
        let amount = selector.internal_amount();
        let all = selector.is_all();
        let plural = amount > 1 || (all && amount >= 0);

        let names: Vec<String> = selector
            .types()
            .iter()
            .map(|item| {
                let name = self.material_name(item, plural);
                if all || amount > 1 {
                    return name;
                }
                match self.gender(item).indefinite_article(&name) {
                    Some(article) => format!("{} {}", article, name),
                    None => name,
                }
            })
            .collect();

        let joined = join(&names, if all { "and" } else { "or" });
        match (all, amount) {
            (true, amount) if amount >= 0 => format!("{} of every {}", amount, joined),
            (true, _) => format!("every {}", joined),
            (false, amount) if amount > 1 => format!("{} {}", amount, joined),
            _ => joined,
        }
    }
}

/// Strip a leading quantifier into `selector` and return the rest.
fn parse_quantifier<'t>(text: &'t str, selector: &mut ItemSelector) -> &'t str {
    if let Some((digits, rest)) = text.split_once(' ') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(amount) = digits.parse::<i32>() {
                selector.set_amount(amount);
                if let Some(rest) = rest.strip_prefix(OF_EVERY) {
                    selector.set_all(true);
                    return rest;
                }
                return rest.strip_prefix("of ").unwrap_or(rest);
            }
        }
    }
    if let Some(rest) = text.strip_prefix(EVERY_PREFIX) {
        selector.set_all(true);
        return rest;
    }
    if let Some(rest) = text.strip_prefix("an ").or_else(|| text.strip_prefix("a ")) {
        selector.set_amount(1);
        return rest;
    }
    text
}

fn strip_word<'t>(name: &'t str, words: &[&str]) -> Option<&'t str> {
    words.iter().find_map(|word| {
        name.strip_suffix(word)?
            .strip_suffix(' ')
            .filter(|base| !base.is_empty())
    })
}

fn split_enchantments(list: &str) -> impl Iterator<Item = &str> {
    list.split(',')
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
}

/// Parse `sharpness`, `sharpness 5` or `sharpness v`.
fn parse_enchantment(platform: &dyn Platform, text: &str) -> Option<EnchantmentType> {
    if text.is_empty() {
        return None;
    }
    if let Some((name, level)) = text.rsplit_once(' ') {
        if let Some(level) = parse_level(level) {
            return Some(EnchantmentType {
                enchantment: platform.enchantment(name)?,
                level: Some(level),
            });
        }
    }
    Some(EnchantmentType {
        enchantment: platform.enchantment(text)?,
        level: None,
    })
}

fn parse_level(text: &str) -> Option<u32> {
    if let Ok(level) = text.parse::<u32>() {
        return Some(level);
    }
    parse_roman(text)
}

fn parse_roman(text: &str) -> Option<u32> {
    let mut total = 0u32;
    let mut previous = 0u32;
    for c in text.chars().rev() {
        let value = match c.to_ascii_lowercase() {
            'i' => 1,
            'v' => 5,
            'x' => 10,
            'l' => 50,
            'c' => 100,
            _ => return None,
        };
        if value < previous {
            total = total.checked_sub(value)?;
        } else {
            total += value;
            previous = value;
        }
    }
    (total > 0).then_some(total)
}

fn join(names: &[String], conjunction: &str) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} {} {}", init.join(", "), conjunction, last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AliasParser, Conditions};
    use crate::platform::PlatformData;
    use crate::types::{Enchantment, ItemStack, MaterialInfo, Version};
    use std::sync::Arc;

    fn registry() -> AliasRegistry {
        let platform = PlatformData::new(Version::new(1, 20, 4))
            .with_material(MaterialInfo::new("air"))
            .with_material(MaterialInfo::new("diamond_sword").with_durability(1561))
            .with_material(MaterialInfo::new("stone").block())
            .with_material(MaterialInfo::new("apple"))
            .with_material(MaterialInfo::new("shears").with_durability(238))
            .with_enchantment("sharpness", &[])
            .with_enchantment("unbreaking", &[])
            .with_enchantment("mending", &[]);
        let mut registry = AliasRegistry::new(Arc::new(platform));
        let conditions = Conditions::new();
        let mut parser = AliasParser::new(&mut registry, &conditions);
        parser.load_text(
            "\
items:
    diamond sword¦s = minecraft:diamond_sword
    stone¦s = minecraft:stone
    apple¦s @an = minecraft:apple
    shears @x = minecraft:shears
    rock¦s = minecraft:stone, minecraft:apple
",
        );
        assert!(parser.diagnostics().is_empty());
        registry
    }

    #[test]
    fn test_quantifiers() {
        let registry = registry();
        let ctx = ResolutionContext::new(&registry);

        let every = ctx.resolve_name("every diamond sword").unwrap();
        assert!(every.is_all());
        assert_eq!(every.internal_amount(), -1);

        let three = ctx.resolve_name("3 of diamond sword").unwrap();
        assert_eq!(three.amount(), 3);
        assert!(!three.is_all());

        let plural = ctx.resolve_name("5 diamond swords").unwrap();
        assert_eq!(plural.amount(), 5);

        let both = ctx.resolve_name("2 of every stone").unwrap();
        assert!(both.is_all());
        assert_eq!(both.amount(), 2);

        let article = ctx.resolve_name("an apple").unwrap();
        assert_eq!(article.internal_amount(), 1);

        let bare = ctx.resolve_name("Diamond Sword").unwrap();
        assert_eq!(bare.internal_amount(), -1);
    }

    #[test]
    fn test_wildcard_and_misses() {
        let registry = registry();
        let ctx = ResolutionContext::new(&registry);

        let everything = ctx.resolve_name("*").unwrap();
        assert!(everything.is_all());
        assert!(everything.types()[0].is_anything());

        assert!(ctx.resolve_name("").is_none());
        assert!(ctx.resolve_name("42").is_none());
        assert!(ctx.resolve_name("unknown thing").is_none());
    }

    #[test]
    fn test_enchantments() {
        let registry = registry();
        let ctx = ResolutionContext::new(&registry);

        let sword = ctx
            .resolve_name("diamond sword of sharpness 5, unbreaking iii and mending")
            .unwrap();
        let meta = sword.types()[0].meta();
        assert_eq!(meta.enchantments.get(&Enchantment::new("sharpness")), Some(&5));
        assert_eq!(meta.enchantments.get(&Enchantment::new("unbreaking")), Some(&3));
        assert_eq!(meta.enchantments.get(&Enchantment::new("mending")), Some(&1));

        assert!(ctx.resolve_name("diamond sword of nothing").is_none());
    }

    #[test]
    fn test_any_and_form_filters() {
        let registry = registry();
        let ctx = ResolutionContext::new(&registry);

        assert_eq!(ctx.resolve_name("any rock").unwrap().len(), 2);

        let blocks = ctx.resolve_name("rock blocks").unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks.types()[0].is_block());

        let items = ctx.resolve_name("rock item").unwrap();
        assert_eq!(items.len(), 1);
        assert!(!items.types()[0].is_block());

        assert!(ctx.resolve_name("apple block").is_none());
    }

    #[test]
    fn test_alias_list() {
        let registry = registry();
        let ctx = ResolutionContext::new(&registry);
        assert_eq!(ctx.parse_alias_list("stone, apple").unwrap().len(), 2);
        assert!(ctx.parse_alias_list("stone, nope").is_none());
        assert!(ctx.parse_alias_list("*").unwrap().is_all());
        // Empty entries stand for air.
        assert_eq!(ctx.parse_alias_list("stone,").unwrap().len(), 2);
    }

    #[test]
    fn test_script_local_first() {
        let global = Arc::new(registry());
        let mut local = AliasRegistry::with_parent(global.clone());
        let conditions = Conditions::new();
        let mut parser = AliasParser::new(&mut local, &conditions);
        parser.load_text("local:\n    blade¦s = minecraft:diamond_sword\n    stone¦s = minecraft:apple\n");

        let ctx = ResolutionContext::new(&global).with_script(&local);
        assert!(ctx.resolve_name("blade").is_some());
        assert!(ctx.resolve_name("diamond sword").is_some());
        let stone = ctx.resolve_name("stone").unwrap();
        assert!(!stone.types()[0].is_block());

        assert!(ResolutionContext::new(&global).resolve_name("blade").is_none());
    }

    #[test]
    fn test_names_for_items() {
        let registry = registry();
        let ctx = ResolutionContext::new(&registry);
        let platform = registry.platform();
        let apple = platform.material("apple").unwrap();
        let held = CanonicalItem::from_stack(&ItemStack::new(apple), platform.material_info(apple).unwrap());

        assert_eq!(ctx.material_name(&held, false), "apple");
        assert_eq!(ctx.material_name(&held, true), "apples");
        assert_eq!(ctx.gender(&held), Gender::An);
        assert_eq!(ctx.minecraft_id(&held), Some("minecraft:apple"));
        assert_eq!(ctx.related_entity(&held), None);
    }

    #[test]
    fn test_describe() {
        let registry = registry();
        let ctx = ResolutionContext::new(&registry);

        assert_eq!(ctx.describe(&ctx.resolve_name("every diamond sword").unwrap()), "every diamond sword");
        assert_eq!(ctx.describe(&ctx.resolve_name("3 diamond swords").unwrap()), "3 diamond swords");
        assert_eq!(ctx.describe(&ctx.resolve_name("rock").unwrap()), "a stone or an apple");
        assert_eq!(ctx.describe(&ctx.resolve_name("shears").unwrap()), "shears");
        assert_eq!(
            ctx.raw_names(&ctx.resolve_name("rock").unwrap()),
            vec!["minecraft:stone".to_string(), "minecraft:apple".to_string()]
        );
    }

    #[test]
    fn test_roman_levels() {
        assert_eq!(parse_level("iv"), Some(4));
        assert_eq!(parse_level("IX"), Some(9));
        assert_eq!(parse_level("10"), Some(10));
        assert_eq!(parse_level("abc"), None);
    }
}
