use super::{Rule, RuleContext, RuleFailure};
use crate::validation::domain::{Finding, RuleCategory, RuleCode, Severity};
use crate::validation::layers;

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            RuleCode::Entity001,
            "Erlaubte Entitätstypen",
            RuleCategory::Entity,
            Severity::Error,
            "Prüft, ob nur erlaubte Entitätstypen verwendet werden (LINE, POLYLINE, TEXT, etc.)",
            allowed_kinds,
        ),
        Rule::new(
            RuleCode::Entity002,
            "Keine OLE-Objekte",
            RuleCategory::Entity,
            Severity::Error,
            "Prüft, ob keine eingebetteten OLE-Objekte vorhanden sind",
            no_ole_objects,
        ),
        Rule::new(
            RuleCode::Entity003,
            "Entitätstyp auf Layer erlaubt",
            RuleCategory::Entity,
            Severity::Warning,
            "Prüft, ob jede Entität auf einem Layer liegt, der ihren Typ erlaubt",
            kinds_per_layer,
        ),
    ]
}

fn allowed_kinds(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(layers::forbidden_entities(
        &ctx.drawing.entities,
        &ctx.config.entity_policy,
    ))
}

fn no_ole_objects(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(layers::ole_objects(
        &ctx.drawing.entities,
        &ctx.config.entity_policy,
    ))
}

fn kinds_per_layer(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(layers::misplaced_entities(
        &ctx.drawing.entities,
        &ctx.config.layer_schema,
        &ctx.config.entity_policy,
    ))
}
