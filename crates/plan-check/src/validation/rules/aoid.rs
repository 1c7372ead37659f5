use super::{Rule, RuleContext, RuleFailure};
use crate::validation::domain::{Finding, RuleCategory, RuleCode, Severity};
use crate::validation::identifiers;

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            RuleCode::Aoid001,
            "AOID-Format gültig",
            RuleCategory::Aoid,
            Severity::Warning,
            "Prüft, ob alle AOIDs dem BBL-Format entsprechen (z.B. \"2011.DM.04.015\")",
            aoid_format,
        ),
        Rule::new(
            RuleCode::Aoid002,
            "AOID eindeutig",
            RuleCategory::Aoid,
            Severity::Error,
            "Prüft, ob jede AOID nur einmal in der Zeichnung vorkommt",
            aoid_unique,
        ),
        Rule::new(
            RuleCode::Aoid003,
            "AOID in Raumliste",
            RuleCategory::Aoid,
            Severity::Warning,
            "Prüft, ob alle AOIDs in der hochgeladenen Excel-Raumliste vorhanden sind",
            aoid_listed,
        ),
        Rule::new(
            RuleCode::Aoid004,
            "Raumliste vollständig gezeichnet",
            RuleCategory::Aoid,
            Severity::Error,
            "Prüft, ob jeder Raum der Excel-Raumliste in der Zeichnung vorkommt",
            rooms_drawn,
        ),
        Rule::new(
            RuleCode::Aoid005,
            "AOID innerhalb Raumpolygon",
            RuleCategory::Aoid,
            Severity::Error,
            "Prüft, ob jede AOID innerhalb eines Raumpolygons platziert ist",
            aoid_placed,
        ),
    ]
}

fn aoid_format(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(identifiers::format_findings(&ctx.aoids))
}

fn aoid_unique(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(identifiers::duplicate_findings(&ctx.aoids))
}

fn aoid_listed(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(identifiers::unlisted_findings(&ctx.aoids, ctx.room_list))
}

fn rooms_drawn(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    if ctx.room_list.is_empty() {
        return Ok(Vec::new());
    }
    Ok(identifiers::undrawn_findings(&ctx.aoids, ctx.room_list))
}

fn aoid_placed(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(identifiers::placement_findings(
        &ctx.aoids,
        &ctx.room_polygons(),
    ))
}
