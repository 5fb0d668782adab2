//! Translator factories backed by MO catalogs, in eager and lazy mode.
#![allow(
    unfulfilled_lint_expectations,
    reason = "clippy::expect_used is denied globally; tests may not hit those branches"
)]
#![expect(
    clippy::expect_used,
    reason = "fixtures panic when the temporary locale tree cannot be written"
)]

use anyhow::{Result, anyhow, ensure};
use lazy_gettext::{
    LazyMode, LogLevel, Param, Params, Translated, TranslatorFactory, enable_lazy,
};
use rstest::{fixture, rstest};
use serial_test::serial;
use test_helpers::locale_env;
use test_helpers::locale_tree::LocaleTree;
use test_helpers::mo::MoCatalog;

const DOMAIN: &str = "billing";

#[fixture]
fn tree() -> LocaleTree {
    let tree = LocaleTree::new().expect("create locale tree");
    tree.install(
        "nl",
        DOMAIN,
        &MoCatalog::new()
            .message("Invoice", "Factuur")
            .message("Invoice %(number)s for %(customer)s", "Factuur %(number)s voor %(customer)s")
            .message("Customer", "Klant")
            .contextual("button", "Pay", "Betalen")
            .plural("%(n)d invoice", "%(n)d invoices", ["%(n)d factuur", "%(n)d facturen"]),
    )
    .expect("install nl catalog");
    tree.install(
        "it",
        DOMAIN,
        &MoCatalog::new()
            .message("Invoice", "Fattura")
            .contextual("button", "Pay", "Paga"),
    )
    .expect("install it catalog");
    for level in [LogLevel::Warning, LogLevel::Critical] {
        tree.install(
            "nl",
            &level.domain_for(DOMAIN),
            &MoCatalog::new().message("Payment failed", &format!("Betaling mislukt ({level})")),
        )
        .expect("install log catalog");
    }
    tree
}

fn factory(tree: &LocaleTree, lazy: LazyMode) -> TranslatorFactory {
    TranslatorFactory::builder(DOMAIN)
        .localedir(tree.path())
        .lazy(lazy)
        .build()
}

#[rstest]
#[serial(locale_env)]
fn lazy_messages_render_in_any_locale(tree: LocaleTree) -> Result<()> {
    let _scope = locale_env::scoped(None);
    let factory = factory(&tree, LazyMode::Enabled);
    let translate = factory.primary();
    let invoice = translate("Invoice %(number)s for %(customer)s").format(Params::mapping([
        ("number", Param::from(42)),
        ("customer", Param::from(translate("Customer"))),
    ]))?;
    ensure!(invoice.is_lazy(), "expected a lazy message");
    ensure!(
        invoice.as_str() == "Invoice 42 for Customer",
        "default text {}",
        invoice.as_str()
    );
    for (locale, expected) in [
        ("nl_BE.UTF-8", "Factuur 42 voor Klant"),
        ("it", "Invoice 42 for Customer"),
        ("ko", "Invoice 42 for Customer"),
    ] {
        let rendered = invoice.translate(Some(locale))?;
        ensure!(rendered == expected, "{locale}: got {rendered}");
    }
    Ok(())
}

#[rstest]
#[case("nl", 1, "1 factuur")]
#[case("nl", 12, "12 facturen")]
#[case("it", 12, "12 invoices")]
fn lazy_plurals_keep_their_count(
    tree: LocaleTree,
    #[case] locale: &str,
    #[case] count: u32,
    #[case] expected: &str,
) -> Result<()> {
    let ngettext = factory(&tree, LazyMode::Enabled).plural_form();
    let invoices = ngettext("%(n)d invoice", "%(n)d invoices", u64::from(count))
        .format(Params::mapping([("n", count)]))?;
    let rendered = invoices.translate(Some(locale))?;
    ensure!(rendered == expected, "{locale}/{count}: got {rendered}");
    Ok(())
}

#[rstest]
#[case("nl", "Betalen")]
#[case("it_IT", "Paga")]
#[case("sv", "Pay")]
fn lazy_contextual_lookups(
    tree: LocaleTree,
    #[case] locale: &str,
    #[case] expected: &str,
) -> Result<()> {
    let pgettext = factory(&tree, LazyMode::Enabled).contextual_form();
    let rendered = pgettext("button", "Pay").translate(Some(locale))?;
    ensure!(rendered == expected, "{locale}: got {rendered}");
    let other = pgettext("heading", "Pay").translate(Some(locale))?;
    ensure!(other == "Pay", "{locale}: context leaked into {other}");
    Ok(())
}

#[rstest]
#[case(LogLevel::Warning, "Betaling mislukt (warning)")]
#[case(LogLevel::Critical, "Betaling mislukt (critical)")]
#[case(LogLevel::Error, "Payment failed")]
fn log_translators_read_level_catalogs(
    tree: LocaleTree,
    #[case] level: LogLevel,
    #[case] expected: &str,
) -> Result<()> {
    let factory = factory(&tree, LazyMode::Enabled);
    let record = factory.log_translator(level)("Payment failed");
    let rendered = record.translate(Some("nl"))?;
    ensure!(rendered == expected, "{level}: got {rendered}");
    let message = record
        .into_message()
        .ok_or_else(|| anyhow!("expected a lazy log message"))?;
    ensure!(
        message.domain() == level.domain_for(DOMAIN),
        "domain {}",
        message.domain()
    );
    Ok(())
}

#[rstest]
#[serial(locale_env)]
fn eager_translators_follow_the_environment(tree: LocaleTree) -> Result<()> {
    let scope = locale_env::scoped(Some("it_IT.UTF-8"));
    let _language = scope.set_var("LANGUAGE", "nl:it");
    let factory = factory(&tree, LazyMode::Disabled);
    let gettext = factory.primary();
    let pgettext = factory.contextual_form();
    let ngettext = factory.plural_form();

    let invoice = gettext("Invoice");
    ensure!(
        invoice == Translated::Text(String::from("Factuur")),
        "primary {invoice:?}"
    );
    let pay = pgettext("button", "Pay");
    ensure!(pay == "Betalen", "contextual {pay:?}");
    let plural = ngettext("%(n)d invoice", "%(n)d invoices", 3)
        .format(Params::mapping([("n", 3)]))?;
    ensure!(plural == "3 facturen", "plural {plural:?}");
    let warning = factory.log_warning()("Payment failed");
    ensure!(
        warning == "Betaling mislukt (warning)",
        "warning {warning:?}"
    );
    Ok(())
}

#[rstest]
#[serial(locale_env)]
fn eager_translators_without_catalogs_echo(tree: LocaleTree) -> Result<()> {
    let scope = locale_env::scoped(Some("C"));
    let _language = scope.remove_var("LANGUAGE");
    let factory = factory(&tree, LazyMode::Disabled);
    let invoice = factory.primary()("Invoice");
    let plural = factory.plural_form()("%(n)d invoice", "%(n)d invoices", 1);
    ensure!(invoice == "Invoice", "primary {invoice:?}");
    ensure!(plural == "%(n)d invoice", "plural {plural:?}");
    Ok(())
}

#[rstest]
#[serial(lazy_mode)]
fn process_switch_governs_default_factories(tree: LocaleTree) -> Result<()> {
    let factory = factory(&tree, LazyMode::Process);
    let gettext = factory.primary();

    enable_lazy(true);
    let deferred = gettext("Invoice");
    enable_lazy(false);
    let immediate = gettext("Invoice");

    ensure!(deferred.is_lazy(), "switch on should defer");
    ensure!(!immediate.is_lazy(), "switch off should translate eagerly");
    let italian = deferred.translate(Some("it"))?;
    ensure!(italian == "Fattura", "it: got {italian}");
    Ok(())
}

#[rstest]
#[serial(locale_env)]
fn bare_system_language_reaches_territory_catalogs(tree: LocaleTree) -> Result<()> {
    tree.install("de_DE", DOMAIN, &MoCatalog::new().message("Invoice", "Rechnung"))?;
    let _scope = locale_env::scoped(Some("de"));
    let invoice = factory(&tree, LazyMode::Enabled).primary()("Invoice");
    ensure!(invoice.as_str() == "Rechnung", "default text {}", invoice.as_str());
    Ok(())
}
