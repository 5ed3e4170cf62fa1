//! `roundhouse purchase` — record purchases and find similar ones.

use serde::Serialize;

use roundhouse_core::{
    application::PurchaseService,
    domain::{Condition, DisplayName, MatchKind, Purchase, SimilarPurchases},
};

use crate::{
    cli::{GlobalArgs, PurchaseAddArgs, PurchaseCommands, SimilarArgs},
    commands::{Session, parse_named, resolve_id, short_id},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Serialize)]
struct SimilarView<'a> {
    kind: Option<&'static str>,
    purchases: &'a [Purchase],
}

impl<'a> From<&'a SimilarPurchases> for SimilarView<'a> {
    fn from(similar: &'a SimilarPurchases) -> Self {
        Self {
            kind: similar.kind().map(|kind| match kind {
                MatchKind::Exact => "exact",
                MatchKind::Prefix => "prefix",
            }),
            purchases: similar.purchases(),
        }
    }
}

pub fn execute(
    cmd: PurchaseCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let session = Session::open(&global, &config)?;
    let service = session.purchases();

    match cmd {
        PurchaseCommands::Add(args) => add(&service, args, &output)?,

        PurchaseCommands::List { manufacturer } => {
            let purchases: Vec<Purchase> = service
                .list()?
                .into_iter()
                .filter(|p| manufacturer.as_ref().is_none_or(|m| &p.manufacturer == m))
                .collect();
            if output.is_json() {
                output.json(&purchases)?;
            } else if purchases.is_empty() {
                output.info("No purchases recorded")?;
            } else {
                print_purchases(&purchases, &output)?;
            }
        }

        PurchaseCommands::Show { purchase } => {
            let purchase = find(&service, &purchase)?;
            if output.is_json() {
                output.json(&purchase)?;
            } else {
                show(&purchase, &output)?;
            }
        }

        PurchaseCommands::Similar(args) => {
            let similar = similar(&service, args)?;
            if output.is_json() {
                output.json(&SimilarView::from(&similar))?;
            } else {
                print_similar(&similar, &output)?;
            }
        }

        PurchaseCommands::Remove { purchase } => {
            let purchase = find(&service, &purchase)?;
            service.remove(purchase.id)?;
            output.success(&format!("Removed {}", purchase.title()))?;
        }
    }

    session.finish();
    Ok(())
}

/// Look up a purchase by id or unique id prefix.
pub fn find(service: &PurchaseService, input: &str) -> CliResult<Purchase> {
    let purchases = service.list()?;
    let id = resolve_id("purchase", input, purchases.iter().map(|p| p.id))?;
    Ok(service.get(id)?)
}

fn add(service: &PurchaseService, args: PurchaseAddArgs, output: &OutputManager) -> CliResult<()> {
    let mut purchase = Purchase::new(args.manufacturer, args.catalog_number);
    purchase.catalog_description = args.description.unwrap_or_default();
    purchase.date = args.date;
    purchase.store = args.shop.unwrap_or_default();
    purchase.price = args.price;
    purchase.condition = args.condition.as_deref().map(parse_named::<Condition>).transpose()?;
    purchase.catalog_year = args.catalog_year;
    purchase.notes = args.notes.unwrap_or_default();

    let added = service.add(purchase)?;
    let similar = service.similar_purchases(&added)?;

    if output.is_json() {
        #[derive(Serialize)]
        struct Added<'a> {
            purchase: &'a Purchase,
            similar: SimilarView<'a>,
        }
        return output.json(&Added {
            purchase: &added,
            similar: SimilarView::from(&similar),
        });
    }

    output.success(&format!("Added {} [{}]", added.title(), short_id(added.id)))?;
    if !similar.is_empty() {
        print_similar(&similar, output)?;
    }
    Ok(())
}

fn similar(service: &PurchaseService, args: SimilarArgs) -> CliResult<SimilarPurchases> {
    match (args.purchase, args.manufacturer, args.catalog_number) {
        (Some(input), _, _) => {
            let purchase = find(service, &input)?;
            Ok(service.similar_to(purchase.id)?)
        }
        (None, Some(manufacturer), Some(catalog_number)) => {
            let candidate = Purchase::new(manufacturer, catalog_number);
            Ok(service.similar_purchases(&candidate)?)
        }
        // clap's `candidate` group and `requires` rule this out.
        _ => Ok(SimilarPurchases::none()),
    }
}

fn print_purchases(purchases: &[Purchase], output: &OutputManager) -> CliResult<()> {
    let rows: Vec<Vec<String>> = purchases
        .iter()
        .map(|p| {
            vec![
                output.dim(&short_id(p.id)),
                p.date.map_or_else(|| "-".into(), |d| d.to_string()),
                p.title(),
                p.models.len().to_string(),
                p.catalog_description.clone(),
            ]
        })
        .collect();
    output.table(&["ID", "Date", "Purchase", "Models", "Description"], &rows)?;
    Ok(())
}

fn print_similar(similar: &SimilarPurchases, output: &OutputManager) -> CliResult<()> {
    match similar.kind() {
        None => output.info("No similar purchases")?,
        Some(MatchKind::Exact) => output.warning(&format!(
            "{} purchase(s) with the same catalog number",
            similar.len()
        ))?,
        Some(MatchKind::Prefix) => output.info(&format!(
            "{} purchase(s) with a related catalog number",
            similar.len()
        ))?,
    }
    if !similar.is_empty() {
        print_purchases(similar.purchases(), output)?;
    }
    Ok(())
}

fn show(purchase: &Purchase, output: &OutputManager) -> CliResult<()> {
    output.header(&purchase.title())?;

    let mut fields = vec![("Id", purchase.id.to_string())];
    if !purchase.catalog_description.is_empty() {
        fields.push(("Description", purchase.catalog_description.clone()));
    }
    if let Some(year) = purchase.catalog_year {
        fields.push(("Catalog year", year.to_string()));
    }
    if let Some(date) = purchase.date {
        fields.push(("Date", date.to_string()));
    }
    if !purchase.store.is_empty() {
        fields.push(("Shop", purchase.store.clone()));
    }
    if let Some(price) = purchase.price {
        fields.push(("Price", format!("{price:.2}")));
    }
    if let Some(condition) = purchase.condition {
        fields.push(("Condition", condition.display_name().to_string()));
    }
    if !purchase.notes.is_empty() {
        fields.push(("Notes", purchase.notes.clone()));
    }
    for (label, value) in fields {
        output.print(&format!("  {label:<13}{value}"))?;
    }

    if purchase.models.is_empty() {
        return Ok(());
    }
    output.print("")?;
    let rows: Vec<Vec<String>> = purchase
        .models
        .iter()
        .enumerate()
        .map(|(i, m)| {
            vec![
                (i + 1).to_string(),
                output.dim(&short_id(m.id)),
                m.title(),
                m.dispatch.map(|d| d.display_name().to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    output.table(&["#", "ID", "Model", "Dispatch"], &rows)?;
    Ok(())
}
