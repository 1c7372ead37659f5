use crate::infra::InMemoryProjectRepository;
use chrono::Local;
use clap::Args;
use plan_check::config::AppConfig;
use plan_check::drawing::DrawingImporter;
use plan_check::error::AppError;
use plan_check::projects::{NewDocument, NewProject, ValidationService};
use plan_check::room_list::{RoomList, RoomListImporter};
use plan_check::validation::{RuleCatalog, RuleCategory, RuleEngine, ValidationResult};
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) const DEMO_DRAWING: &str = include_str!("../fixtures/demo_drawing.json");
pub(crate) const DEMO_ROOM_LIST: &str = include_str!("../fixtures/demo_room_list.csv");

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Drawing exported with `dwgread -O JSON`
    #[arg(long)]
    pub(crate) drawing: PathBuf,
    /// Room list CSV exported from the Excel "Raumliste"
    #[arg(long)]
    pub(crate) room_list: Option<PathBuf>,
    /// Print the full validation result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the resulting project summary as JSON after the report.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let ValidateArgs {
        drawing,
        room_list,
        json,
    } = args;

    let config = AppConfig::load()?;
    let engine = RuleEngine::new(config.validation);

    let label = drawing.display().to_string();
    let imported_drawing = DrawingImporter::from_path(&drawing);
    let imported_room_list = match room_list {
        Some(path) => RoomListImporter::from_path(path),
        None => Ok(RoomList::default()),
    };
    let result = engine.validate_input(imported_drawing, imported_room_list);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(&label, &result);
    }
    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let catalog = RuleCatalog::standard();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog.entries())?);
        return Ok(());
    }

    println!("Rule catalog ({} rules)", catalog.len());
    for category in RuleCategory::ordered() {
        let mut rules = catalog.iter().filter(|rule| rule.category == category).peekable();
        if rules.peek().is_none() {
            continue;
        }
        println!("\n{}", category.label());
        for rule in rules {
            println!(
                "- {} [{}] {}: {}",
                rule.code,
                rule.severity.label(),
                rule.name,
                rule.description
            );
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Plan check demo");
    let repository = Arc::new(InMemoryProjectRepository::default());
    let service = ValidationService::new(repository, RuleEngine::default());

    let project = service.create_project(NewProject {
        name: "Bern, Verwaltungsgebäude Liebefeld".to_string(),
        location: None,
        sia_phase: "53".to_string(),
        project_number: Some("BBL-2022-014".to_string()),
        created_by: "max.muster@bbl.admin.ch".to_string(),
    })?;
    println!(
        "Project {} ({}, SIA phase {}) created {}",
        project.id.0,
        project.location,
        project.sia_phase,
        project.created_at.with_timezone(&Local).format("%d.%m.%Y %H:%M")
    );

    let drawing: serde_json::Value = serde_json::from_str(DEMO_DRAWING)?;
    let uploads = [
        ("Erdgeschoss (EG).dwg", Some(DEMO_ROOM_LIST.to_string())),
        ("Erdgeschoss (EG) ohne Raumliste.dwg", None),
    ];

    for (name, room_list_csv) in uploads {
        let record = service.upload_document(
            &project.id,
            NewDocument {
                name: name.to_string(),
                created_by: "anna.mueller@bbl.admin.ch".to_string(),
                drawing: drawing.clone(),
                room_list_csv,
            },
        )?;
        println!();
        match &record.result {
            Some(result) => render_result(&record.name, result),
            None => println!("{}: no result yet ({})", record.name, record.status.label()),
        }
    }

    let summary = service.project(&project.id)?;
    println!("\nProject overview");
    for document in &summary.documents {
        println!(
            "- {} | {} | score {}",
            document.name,
            document.status,
            document
                .score
                .map(|score| score.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    match (summary.score, summary.status) {
        (Some(score), Some(status)) => {
            println!("Project score: {} ({})", score, status.label())
        }
        _ => println!("Project score: not available"),
    }

    if args.json {
        println!("\n{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

pub(crate) fn render_result(label: &str, result: &ValidationResult) {
    println!("Validation report: {label}");
    println!(
        "Evaluated {} | score {} ({})",
        Local::now().format("%d.%m.%Y %H:%M"),
        result.score,
        result.status.label()
    );

    if result.blocked {
        println!("Input could not be read, no rules were evaluated");
    }

    println!(
        "{} errors, {} warnings, {} notes",
        result.summary.errors, result.summary.warnings, result.summary.infos
    );
    if result.findings.is_empty() {
        println!("Findings: none");
    } else {
        println!("Findings");
        for finding in &result.findings {
            let mut context = Vec::new();
            if let Some(layer) = &finding.layer {
                context.push(format!("layer {layer}"));
            }
            if let Some(handle) = &finding.handle {
                context.push(format!("handle {handle}"));
            }
            if let Some(point) = finding.location {
                context.push(format!("at {:.0}/{:.0}", point.x, point.y));
            }
            let context = if context.is_empty() {
                String::new()
            } else {
                format!(" ({})", context.join(", "))
            };
            println!(
                "- [{}] {} {}{}",
                finding.severity.label(),
                finding.code,
                finding.message,
                context
            );
        }
    }

    if !result.rooms.is_empty() {
        println!("Rooms");
        for room in &result.rooms {
            println!(
                "- {} | {} | {:.2} m² | {}",
                room.aoid,
                room.function.label(),
                room.area_m2,
                room.status.label()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_check::validation::RuleCode;

    #[test]
    fn demo_fixtures_import() {
        let drawing = DrawingImporter::from_reader(DEMO_DRAWING.as_bytes())
            .expect("demo drawing imports");
        let room_list = RoomListImporter::from_reader(DEMO_ROOM_LIST.as_bytes())
            .expect("demo room list imports");

        assert_eq!(room_list.len(), 4);
        assert_eq!(drawing.texts().count(), 5);
    }

    #[test]
    fn demo_plan_shows_cross_reference_findings() {
        let drawing = DrawingImporter::from_reader(DEMO_DRAWING.as_bytes())
            .expect("demo drawing imports");
        let room_list = RoomListImporter::from_reader(DEMO_ROOM_LIST.as_bytes())
            .expect("demo room list imports");

        let result = RuleEngine::default().validate(&drawing, &room_list);

        let undrawn: Vec<_> = result.findings_for(RuleCode::Aoid004).collect();
        assert_eq!(undrawn.len(), 1);
        assert!(undrawn[0].message.contains("2011.DM.04.005"));
        assert_eq!(result.findings_for(RuleCode::Aoid003).count(), 1);
        assert_eq!(result.findings_for(RuleCode::Layer003).count(), 1);
        assert_eq!(result.findings_for(RuleCode::Geom007).count(), 1);
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs::default()).expect("demo completes");
    }
}
