//! `roundhouse train` — trains and the order of their members.

use roundhouse_core::{
    application::TrainService,
    domain::{Train, TrainMember, TrainMemberId},
};

use crate::{
    cli::{AddMemberArgs, GlobalArgs, TrainCommands},
    commands::{Session, resolve_id, short_id, zero_based},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    cmd: TrainCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let session = Session::open(&global, &config)?;
    let service = session.trains();

    match cmd {
        TrainCommands::Create { name, number } => {
            let train = service.create(&name, number.as_deref())?;
            if output.is_json() {
                output.json(&train)?;
            } else {
                output.success(&format!("Created {} [{}]", train.title(), short_id(train.id)))?;
            }
        }

        TrainCommands::List => {
            let trains = service.list()?;
            if output.is_json() {
                output.json(&trains)?;
            } else if trains.is_empty() {
                output.info("No trains")?;
            } else {
                let rows: Vec<Vec<String>> = trains
                    .iter()
                    .map(|t| {
                        vec![
                            output.dim(&short_id(t.id)),
                            t.title(),
                            t.members.len().to_string(),
                        ]
                    })
                    .collect();
                output.table(&["ID", "Train", "Members"], &rows)?;
            }
        }

        TrainCommands::Show { train } => {
            let train = find(&service, &train)?;
            if output.is_json() {
                output.json(&train)?;
            } else {
                show(&train, &output)?;
            }
        }

        TrainCommands::Rename { train, name } => {
            let train = find(&service, &train)?;
            let renamed = service.rename(train.id, &name)?;
            output.success(&format!("Renamed {} to {}", train.title(), renamed.title()))?;
        }

        TrainCommands::AddMember(args) => add_member(&service, args, &output)?,

        TrainCommands::MoveMember {
            train,
            member,
            position,
        } => {
            let train = find(&service, &train)?;
            let member_id = find_member(&train, &member)?;
            let to = zero_based(position, train.members.len())?;

            let moved = service.move_member(train.id, member_id, to)?;
            output.success(&format!(
                "Moved {} to position {position}",
                moved.number_or_name
            ))?;
        }

        TrainCommands::RemoveMember { train, member } => {
            let train = find(&service, &train)?;
            let member_id = find_member(&train, &member)?;

            let removed = service.remove_member(train.id, member_id)?;
            output.success(&format!(
                "Removed {} from {}",
                removed.number_or_name,
                train.title()
            ))?;
        }

        TrainCommands::FlipMember { train, member } => {
            let train = find(&service, &train)?;
            let member_id = find_member(&train, &member)?;

            let flipped = service.flip_member(train.id, member_id)?;
            let facing = if flipped.is_flipped { "reversed" } else { "forward" };
            output.success(&format!("{} now runs {facing}", flipped.number_or_name))?;
        }

        TrainCommands::Remove { train } => {
            let train = find(&service, &train)?;
            service.remove(train.id)?;
            output.success(&format!("Removed {}", train.title()))?;
        }
    }

    session.finish();
    Ok(())
}

fn find(service: &TrainService, input: &str) -> CliResult<Train> {
    let trains = service.list()?;
    let id = resolve_id("train", input, trains.iter().map(|t| t.id))?;
    Ok(service.get(id)?)
}

fn find_member(train: &Train, input: &str) -> CliResult<TrainMemberId> {
    resolve_id("train member", input, train.members.iter().map(|m| m.id))
}

fn add_member(service: &TrainService, args: AddMemberArgs, output: &OutputManager) -> CliResult<()> {
    let train = find(service, &args.train)?;

    let mut member = TrainMember::new(args.model_class, args.number_or_name);
    if let Some(title) = args.title {
        member = member.with_title(title);
    }
    if args.flipped {
        member = member.flipped();
    }

    let added = match args.position {
        Some(position) => {
            let at = zero_based(position, train.members.len() + 1)?;
            service.insert_member(train.id, member, at)?
        }
        None => service.append_member(train.id, member)?,
    };
    output.success(&format!(
        "Added {} to {} [{}]",
        added.number_or_name,
        train.title(),
        short_id(added.id)
    ))?;
    Ok(())
}

fn show(train: &Train, output: &OutputManager) -> CliResult<()> {
    output.header(&train.title())?;
    if train.members.is_empty() {
        output.info("No members")?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = train
        .members
        .iter()
        .enumerate()
        .map(|(i, m)| {
            vec![
                (i + 1).to_string(),
                output.dim(&short_id(m.id)),
                m.model_class.clone(),
                m.number_or_name.clone(),
                m.title.clone(),
                if m.is_flipped { "reversed".into() } else { String::new() },
            ]
        })
        .collect();
    output.table(&["#", "ID", "Class", "Number", "Title", ""], &rows)?;
    Ok(())
}
