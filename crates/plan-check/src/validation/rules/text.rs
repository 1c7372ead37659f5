use super::{Rule, RuleContext, RuleFailure};
use crate::drawing::BYLAYER;
use crate::validation::domain::{Finding, RuleCategory, RuleCode, Severity};

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            RuleCode::Text001,
            "Schriftart korrekt",
            RuleCategory::Text,
            Severity::Error,
            "Prüft, ob nur die vorgeschriebene Schriftart \"Arial\" verwendet wird",
            font_required,
        ),
        Rule::new(
            RuleCode::Text002,
            "Textgrösse korrekt",
            RuleCategory::Text,
            Severity::Warning,
            "Prüft, ob die Texthöhe den Vorgaben entspricht (min. 2.5mm)",
            minimum_height,
        ),
        Rule::new(
            RuleCode::Text003,
            "Text auf erlaubtem Layer",
            RuleCategory::Text,
            Severity::Error,
            "Prüft, ob Texte nur auf den dafür vorgesehenen Layern liegen",
            text_layer,
        ),
        Rule::new(
            RuleCode::Text004,
            "Farbe VonLayer",
            RuleCategory::Text,
            Severity::Info,
            "Prüft, ob Texte ihre Farbe vom Layer übernehmen",
            color_by_layer,
        ),
    ]
}

/// Texts whose style resolves to a font other than the required one. Styles missing from the
/// style table, or without a font file, are not judged.
fn font_required(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    let required = ctx.config.required_font.to_lowercase();
    let mut findings = Vec::new();
    for (entity, text) in ctx.drawing.texts() {
        let Some(style) = ctx.drawing.text_style(&text.style) else {
            continue;
        };
        let font = style.font_file.to_lowercase();
        if !font.is_empty() && !font.contains(&required) {
            findings.push(
                Finding::error(
                    RuleCode::Text001,
                    format!(
                        "Text uses font \"{}\", only {} is allowed",
                        style.font_file, ctx.config.required_font
                    ),
                )
                .at(Some(text.insertion))
                .on_layer(entity.layer.clone())
                .for_handle(entity.handle.clone()),
            );
        }
    }
    Ok(findings)
}

/// A height of 0 defers to the text style and is not judged.
fn minimum_height(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    let minimum = ctx.config.min_text_height;
    Ok(ctx
        .drawing
        .texts()
        .filter(|(_, text)| text.height > 0.0 && text.height < minimum)
        .map(|(entity, text)| {
            Finding::warning(
                RuleCode::Text002,
                format!(
                    "Text height {} is below the minimum of {}",
                    text.height, minimum
                ),
            )
            .at(Some(text.insertion))
            .on_layer(entity.layer.clone())
            .for_handle(entity.handle.clone())
        })
        .collect())
}

fn text_layer(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    let schema = &ctx.config.layer_schema;
    Ok(ctx
        .drawing
        .texts()
        .filter(|(entity, _)| !schema.allows_text_on(&entity.layer))
        .map(|(entity, text)| {
            Finding::error(
                RuleCode::Text003,
                format!(
                    "Text on layer \"{}\" is only allowed on {}",
                    entity.layer,
                    schema.text_layers.join(", ")
                ),
            )
            .at(Some(text.insertion))
            .on_layer(entity.layer.clone())
            .for_handle(entity.handle.clone())
        })
        .collect())
}

fn color_by_layer(ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure> {
    Ok(ctx
        .drawing
        .texts()
        .filter(|(entity, _)| entity.color != BYLAYER)
        .map(|(entity, text)| {
            Finding::info(
                RuleCode::Text004,
                format!(
                    "Text has explicit color {}, should be BYLAYER",
                    entity.color
                ),
            )
            .at(Some(text.insertion))
            .on_layer(entity.layer.clone())
            .for_handle(entity.handle.clone())
        })
        .collect())
}
