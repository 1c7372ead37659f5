use super::{Rule, RuleContext, RuleFailure};
use crate::validation::domain::{Finding, RuleCategory, RuleCode, Severity};
use crate::validation::layers;

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            RuleCode::Layer001,
            "Pflichtlayer vorhanden",
            RuleCategory::Layer,
            Severity::Error,
            "Prüft, ob alle vorgeschriebenen Layer gemäss BBL CAD-Richtlinie vorhanden sind",
            required_layers,
        ),
        Rule::new(
            RuleCode::Layer002,
            "Layer-Farben korrekt",
            RuleCategory::Layer,
            Severity::Warning,
            "Prüft, ob die Layer-Farben den Vorgaben entsprechen (z.B. Layer 7 = weiss)",
            layer_colors,
        ),
        Rule::new(
            RuleCode::Layer003,
            "Keine fremden Layer",
            RuleCategory::Layer,
            Severity::Warning,
            "Prüft, ob keine nicht definierten Layer in der Zeichnung vorhanden sind",
            foreign_layers,
        ),
    ]
}

fn required_layers(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(layers::missing_layers(
        &ctx.drawing.layer_observations(),
        &ctx.config.layer_schema,
    ))
}

fn layer_colors(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(layers::color_mismatches(
        &ctx.drawing.layer_observations(),
        &ctx.config.layer_schema,
    ))
}

fn foreign_layers(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(layers::unexpected_layers(
        &ctx.drawing.layer_observations(),
        &ctx.config.layer_schema,
    ))
}
