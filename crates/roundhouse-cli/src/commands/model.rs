//! `roundhouse model` — the models within a purchase, in collector order.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use roundhouse_core::domain::{
    DisplayName, Model, ModelClassification, ModelDispatch, ModelId, Purchase,
};

use crate::{
    cli::{GlobalArgs, ModelAddArgs, ModelCommands},
    commands::{Session, parse_era, parse_named, purchase::find, resolve_id, short_id, zero_based},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Serialize)]
struct ModelView<'a> {
    position: usize,
    needs_oiling: bool,
    #[serde(flatten)]
    model: &'a Model,
}

pub fn execute(
    cmd: ModelCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let session = Session::open(&global, &config)?;
    let service = session.purchases();

    match cmd {
        ModelCommands::Add(args) => {
            let purchase = find(&service, &args.purchase)?;
            let position = args.position;
            let model = build_model(args)?;

            let added = match position {
                Some(position) => {
                    let at = zero_based(position, purchase.models.len() + 1)?;
                    service.insert_model(purchase.id, model, at)?
                }
                None => service.append_model(purchase.id, model)?,
            };
            output.success(&format!(
                "Added {} to {} [{}]",
                added.title(),
                purchase.title(),
                short_id(added.id)
            ))?;
        }

        ModelCommands::List { purchase } => {
            let purchase = find(&service, &purchase)?;
            let today = Local::now().date_naive();
            list(&purchase, today, config.maintenance.oil_interval_days, &output)?;
        }

        ModelCommands::Move {
            purchase,
            model,
            position,
        } => {
            let purchase = find(&service, &purchase)?;
            let model_id = find_model(&purchase, &model)?;
            let to = zero_based(position, purchase.models.len())?;

            let moved = service.move_model(purchase.id, model_id, to)?;
            output.success(&format!("Moved {} to position {position}", moved.title()))?;
        }

        ModelCommands::Remove { purchase, model } => {
            let purchase = find(&service, &purchase)?;
            let model_id = find_model(&purchase, &model)?;

            let removed = service.remove_model(purchase.id, model_id)?;
            output.success(&format!("Removed {} from {}", removed.title(), purchase.title()))?;
            if let Some(decoder) = removed.decoder {
                output.info(&format!("Decoder {} is spare again", short_id(decoder)))?;
            }
        }
    }

    session.finish();
    Ok(())
}

/// Look up a model of `purchase` by id or unique id prefix.
pub fn find_model(purchase: &Purchase, input: &str) -> CliResult<ModelId> {
    resolve_id("model", input, purchase.models.iter().map(|m| m.id))
}

fn build_model(args: ModelAddArgs) -> CliResult<Model> {
    let mut model = Model::new(args.model_class, args.number.unwrap_or_default());
    model.name = args.name.unwrap_or_default();
    model.livery = args.livery.unwrap_or_default();
    model.era = args.era.as_deref().map(parse_era).transpose()?;
    model.classification = args
        .classification
        .as_deref()
        .map(parse_named::<ModelClassification>)
        .transpose()?;
    model.dispatch = args
        .dispatch
        .as_deref()
        .map(parse_named::<ModelDispatch>)
        .transpose()?;
    Ok(model)
}

fn list(
    purchase: &Purchase,
    today: NaiveDate,
    oil_interval_days: i64,
    output: &OutputManager,
) -> CliResult<()> {
    let views: Vec<ModelView<'_>> = purchase
        .models
        .iter()
        .enumerate()
        .map(|(i, model)| ModelView {
            position: i + 1,
            needs_oiling: model.needs_oiling(today, oil_interval_days),
            model,
        })
        .collect();

    if output.is_json() {
        return output.json(&views);
    }
    if views.is_empty() {
        output.info(&format!("{} has no models", purchase.title()))?;
        return Ok(());
    }

    output.header(&purchase.title())?;
    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|v| {
            vec![
                v.position.to_string(),
                output.dim(&short_id(v.model.id)),
                v.model.title(),
                v.model.era.map(|e| e.number().to_string()).unwrap_or_default(),
                v.model
                    .dispatch
                    .map(|d| d.display_name().to_string())
                    .unwrap_or_default(),
                if v.needs_oiling { "oil due".into() } else { String::new() },
            ]
        })
        .collect();
    output.table(&["#", "ID", "Model", "Era", "Dispatch", "Service"], &rows)?;
    Ok(())
}
