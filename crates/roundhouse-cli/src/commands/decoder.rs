//! `roundhouse decoder` — decoder types, spare stock and fitting.

use std::collections::HashMap;

use serde::Serialize;

use roundhouse_core::{
    application::DecoderService,
    domain::{Decoder, DecoderId, DecoderType, DecoderTypeId, StockLevel},
};

use crate::{
    cli::{AddDecoderArgs, AddTypeArgs, DecoderCommands, GlobalArgs},
    commands::{Session, model::find_model, purchase::find as find_purchase, resolve_id, short_id},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Serialize)]
struct DecoderView<'a> {
    fitted: bool,
    #[serde(flatten)]
    decoder: &'a Decoder,
}

#[derive(Serialize)]
struct StockView<'a> {
    low: bool,
    #[serde(flatten)]
    level: &'a StockLevel,
}

pub fn execute(
    cmd: DecoderCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let session = Session::open(&global, &config)?;
    let service = session.decoders();

    match cmd {
        DecoderCommands::AddType(args) => {
            let added = service.add_type(build_type(args))?;
            if output.is_json() {
                output.json(&added)?;
            } else {
                output.success(&format!("Added {} [{}]", added.title(), short_id(added.id)))?;
            }
        }

        DecoderCommands::Add(args) => add(&service, args, &output)?,

        DecoderCommands::List { types: true } => {
            let types = service.list_types()?;
            if output.is_json() {
                output.json(&types)?;
            } else {
                let rows: Vec<Vec<String>> = types
                    .iter()
                    .map(|t| {
                        vec![
                            output.dim(&short_id(t.id)),
                            t.title(),
                            t.socket.clone(),
                            if t.has_sound { "sound".into() } else { String::new() },
                        ]
                    })
                    .collect();
                output.table(&["ID", "Type", "Socket", ""], &rows)?;
            }
        }

        DecoderCommands::List { types: false } => list(&service, &output)?,

        DecoderCommands::Fit {
            decoder,
            purchase,
            model,
        } => {
            let decoder_id = find_decoder(&service, &decoder)?;
            let purchase = find_purchase(&session.purchases(), &purchase)?;
            let model_id = find_model(&purchase, &model)?;

            let fitted = service.fit_decoder(purchase.id, model_id, decoder_id)?;
            output.success(&format!(
                "Fitted decoder {} to {}",
                short_id(decoder_id),
                fitted.title()
            ))?;
        }

        DecoderCommands::Unfit { purchase, model } => {
            let purchase = find_purchase(&session.purchases(), &purchase)?;
            let model_id = find_model(&purchase, &model)?;
            let previous = purchase.model(model_id).and_then(|m| m.decoder);

            let model = service.unfit_decoder(purchase.id, model_id)?;
            match previous {
                Some(decoder) => output.success(&format!(
                    "Decoder {} removed from {}",
                    short_id(decoder),
                    model.title()
                ))?,
                None => output.info(&format!("{} has no decoder fitted", model.title()))?,
            }
        }

        DecoderCommands::Remove { decoder } => {
            let decoder_id = find_decoder(&service, &decoder)?;
            service.remove_decoder(decoder_id)?;
            output.success(&format!("Removed decoder {}", short_id(decoder_id)))?;
        }

        DecoderCommands::Stock { low } => {
            let report: Vec<StockLevel> = service
                .stock_report()?
                .into_iter()
                .filter(|level| !low || level.is_low())
                .collect();
            stock(&report, &output)?;
        }
    }

    session.finish();
    Ok(())
}

fn find_decoder(service: &DecoderService, input: &str) -> CliResult<DecoderId> {
    let decoders = service.list_decoders()?;
    resolve_id("decoder", input, decoders.iter().map(|d| d.id))
}

fn find_type(service: &DecoderService, input: &str) -> CliResult<DecoderTypeId> {
    let types = service.list_types()?;
    resolve_id("decoder type", input, types.iter().map(|t| t.id))
}

fn build_type(args: AddTypeArgs) -> DecoderType {
    let mut decoder_type = DecoderType::new(args.manufacturer, args.product_code);
    decoder_type.product_family = args.family.unwrap_or_default();
    decoder_type.product_description = args.description.unwrap_or_default();
    decoder_type.socket = args.socket.unwrap_or_default();
    decoder_type.has_sound = args.sound;
    decoder_type.has_railcom = args.railcom;
    decoder_type.minimum_stock = args.minimum_stock;
    decoder_type
}

fn add(service: &DecoderService, args: AddDecoderArgs, output: &OutputManager) -> CliResult<()> {
    let type_id = find_type(service, &args.decoder_type)?;

    let mut decoder = Decoder::new(type_id);
    decoder.serial_number = args.serial_number.unwrap_or_default();
    decoder.address = args.address;
    decoder.firmware_version = args.firmware_version.unwrap_or_default();

    let added = service.add_decoder(decoder)?;
    if output.is_json() {
        return output.json(&added);
    }
    output.success(&format!("Added decoder [{}]", short_id(added.id)))?;
    Ok(())
}

fn list(service: &DecoderService, output: &OutputManager) -> CliResult<()> {
    let decoders = service.list_decoders()?;
    let fitted = service.fitted_decoders()?;

    if output.is_json() {
        let views: Vec<DecoderView<'_>> = decoders
            .iter()
            .map(|decoder| DecoderView {
                fitted: fitted.contains(&decoder.id),
                decoder,
            })
            .collect();
        return output.json(&views);
    }
    if decoders.is_empty() {
        output.info("No decoders")?;
        return Ok(());
    }

    let titles: HashMap<DecoderTypeId, String> = service
        .list_types()?
        .into_iter()
        .map(|t| (t.id, t.title()))
        .collect();
    let rows: Vec<Vec<String>> = decoders
        .iter()
        .map(|d| {
            vec![
                output.dim(&short_id(d.id)),
                titles.get(&d.decoder_type).cloned().unwrap_or_default(),
                d.serial_number.clone(),
                d.address.map(|a| a.to_string()).unwrap_or_default(),
                if fitted.contains(&d.id) { "fitted".into() } else { "spare".into() },
            ]
        })
        .collect();
    output.table(&["ID", "Type", "Serial", "Address", "State"], &rows)?;
    Ok(())
}

fn stock(report: &[StockLevel], output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        let views: Vec<StockView<'_>> = report
            .iter()
            .map(|level| StockView {
                low: level.is_low(),
                level,
            })
            .collect();
        return output.json(&views);
    }
    if report.is_empty() {
        output.info("Nothing to report")?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = report
        .iter()
        .map(|level| {
            vec![
                level.decoder_type.title(),
                level.spare.to_string(),
                level.decoder_type.minimum_stock.to_string(),
                if level.is_low() { "LOW".into() } else { String::new() },
            ]
        })
        .collect();
    output.table(&["Type", "Spare", "Minimum", ""], &rows)?;

    let low = report.iter().filter(|level| level.is_low()).count();
    if low > 0 {
        output.warning(&format!("{low} decoder type(s) below minimum stock"))?;
    }
    Ok(())
}
