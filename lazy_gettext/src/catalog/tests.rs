//! Unit tests for catalog resolution.

use super::*;
use rstest::{fixture, rstest};

fn query<'a>(domain: &'a str, locales: &'a [String]) -> CatalogQuery<'a> {
    CatalogQuery {
        domain,
        localedir: None,
        locales,
    }
}

fn locales(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|tag| (*tag).to_owned()).collect()
}

#[fixture]
fn resolver() -> MemoryResolver {
    MemoryResolver::new()
        .with_catalog(
            "shop",
            "fr",
            MemoryCatalog::new()
                .with_message("Cart", "Panier")
                .with_contextual("button", "Open", "Ouvrir")
                .with_plural("apple", ["pomme", "pommes"]),
        )
        .with_catalog(
            "shop",
            "fr_CA",
            MemoryCatalog::new().with_message("Checkout", "Passer à la caisse"),
        )
}

#[rstest]
fn context_key_joins_with_separator() {
    assert_eq!(context_key("menu", "File"), "menu\u{4}File");
}

#[rstest]
#[case(1, "file")]
#[case(0, "files")]
#[case(7, "files")]
fn null_translations_echo_source(#[case] count: u64, #[case] expected: &str) {
    assert_eq!(NullTranslations.gettext("Hello"), "Hello");
    assert_eq!(NullTranslations.ngettext("file", "files", count), expected);
}

#[rstest]
fn chain_prefers_earlier_layers(resolver: MemoryResolver) {
    let requested = locales(&["fr_CA"]);
    let translations = resolver.resolve(&query("shop", &requested));
    assert_eq!(translations.gettext("Checkout"), "Passer à la caisse");
    assert_eq!(translations.gettext("Cart"), "Panier");
    assert_eq!(translations.gettext("Unknown"), "Unknown");
}

#[rstest]
fn chain_miss_returns_source_slice() {
    let first: Arc<dyn Translations> = Arc::new(MemoryCatalog::new().with_message("a", "A"));
    let second: Arc<dyn Translations> = Arc::new(MemoryCatalog::new().with_message("b", "B"));
    let chain = TranslationChain::new(vec![first, second]);
    let key = String::from("c");
    assert!(std::ptr::eq(chain.gettext(&key), key.as_str()));
    assert_eq!(chain.gettext("b"), "B");
    assert_eq!(chain.len(), 2);
}

#[rstest]
fn identical_translation_counts_as_hit() {
    let same: Arc<dyn Translations> = Arc::new(MemoryCatalog::new().with_message("OK", "OK"));
    let other: Arc<dyn Translations> =
        Arc::new(MemoryCatalog::new().with_message("OK", "D'accord"));
    let chain = TranslationChain::new(vec![same, other]);
    assert_eq!(chain.gettext("OK"), "OK");
}

#[rstest]
#[case(1, "pomme")]
#[case(3, "pommes")]
fn plural_lookup_uses_catalog_forms(
    resolver: MemoryResolver,
    #[case] count: u64,
    #[case] expected: &str,
) {
    let requested = locales(&["fr"]);
    let found = resolver.plural_lookup(&query("shop", &requested), "apple", "apples", count);
    assert_eq!(found, expected);
}

#[rstest]
fn plural_rule_can_be_replaced() {
    fn always_second(_count: u64) -> usize {
        1
    }
    let catalog = MemoryCatalog::new()
        .with_plural("day", ["dzień", "dni"])
        .with_plural_rule(always_second);
    assert_eq!(catalog.ngettext("day", "days", 1), "dni");
}

#[rstest]
fn missing_plural_form_falls_back_to_source() {
    let catalog = MemoryCatalog::new().with_plural("cat", ["chat"]);
    assert_eq!(catalog.ngettext("cat", "cats", 2), "cats");
}

#[rstest]
fn contextual_lookup_uses_composite_key(resolver: MemoryResolver) {
    let requested = locales(&["fr"]);
    let shop = query("shop", &requested);
    assert_eq!(
        resolver.simple_lookup(&shop, &context_key("button", "Open")),
        "Ouvrir"
    );
    let untranslated = context_key("door", "Open");
    assert_eq!(resolver.simple_lookup(&shop, &untranslated), untranslated);
}

#[rstest]
#[case(&["de"])]
#[case(&["C", "fr"])]
fn unmatched_locales_resolve_to_null(resolver: MemoryResolver, #[case] tags: &[&str]) {
    let requested = locales(tags);
    assert_eq!(resolver.simple_lookup(&query("shop", &requested), "Cart"), "Cart");
}

#[rstest]
fn other_domains_are_isolated(resolver: MemoryResolver) {
    let requested = locales(&["fr"]);
    assert_eq!(resolver.simple_lookup(&query("admin", &requested), "Cart"), "Cart");
}

#[rstest]
fn gettext_resolver_tolerates_missing_directory() {
    let missing = Utf8Path::new("/nonexistent/lazy-gettext/locale");
    let resolver = GettextResolver::with_default_localedir(missing);
    let requested = locales(&["fr"]);
    let shop = query("shop", &requested);
    assert!(resolver.find(&shop).is_empty());
    assert_eq!(resolver.simple_lookup(&shop, "Cart"), "Cart");
    assert_eq!(
        resolver.available_languages("shop", None),
        vec![String::from(crate::locale::FALLBACK_LOCALE)]
    );
}
