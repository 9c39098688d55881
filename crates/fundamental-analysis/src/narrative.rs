use std::collections::BTreeSet;

use analysis_core::{Entity, RatioCategory};
use serde::Serialize;

use crate::classifier::{classify, KEY_RATIOS};
use crate::ranker::{rank, ComparativeProfile};
use crate::table::ComparisonTable;

const ENTITY_HEADING: &str = "#### Análisis Intrínseco de Ratios Clave\n\n";
const CONCLUSION_HEADING: &str = "#### Análisis Comparativo y Conclusión Final\n\n";
const PANORAMA_INTRO: &str = "Al comparar las empresas, se observa el siguiente panorama:\n\n";
const RECOMMENDATION: &str = "**Recomendación:** La elección dependerá del perfil del inversor. Aquellos que buscan **calidad y eficiencia** podrían preferir al líder en rentabilidad, mientras que los inversores de **valor** se inclinarán por la empresa con la mejor valoración. La opción más **segura** suele ser la de mayor solidez financiera.";
const NO_CLEAR_LEADER: &str = "No se encontró un líder claro en las categorías principales dentro del grupo analizado.";
pub const NEEDS_TWO_ENTITIES: &str = "El análisis comparativo requiere al menos dos empresas.";

/// A leadership sentence and the categories that earn it.
struct Leadership {
    categories: &'static [RatioCategory],
    title: &'static str,
    body: &'static str,
}

// First match wins.
const LEADERSHIP: &[Leadership] = &[
    Leadership {
        categories: &[RatioCategory::Rentabilidad],
        title: "Líder en Rentabilidad",
        body: "destaca por su alta eficiencia y retornos.",
    },
    Leadership {
        categories: &[RatioCategory::Valoracion],
        title: "Mejor Valoración",
        body: "presenta la relación precio-valor más atractiva del grupo.",
    },
    Leadership {
        categories: &[RatioCategory::Solvencia, RatioCategory::Liquidez],
        title: "Perfil más Sólido/Seguro",
        body: "opera con la estructura financiera más robusta.",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct EntityNarrative {
    pub ticker: String,
    pub text: String,
}

/// Key-ratio narrative for one company. Ratios the entity does not carry are skipped.
pub fn entity_narrative(entity: &Entity) -> String {
    let lines: Vec<String> = KEY_RATIOS
        .iter()
        .filter(|ratio| entity.ratios.contains_key(*ratio))
        .map(|&ratio| format!("- {}", classify(ratio, entity.value(ratio)).text))
        .collect();

    format!("{}{}", ENTITY_HEADING, lines.join("\n\n"))
}

pub fn summarize(entities: &[Entity]) -> Vec<EntityNarrative> {
    entities
        .iter()
        .map(|e| EntityNarrative {
            ticker: e.ticker.clone(),
            text: entity_narrative(e),
        })
        .collect()
}

fn leadership_sentence(profile: &ComparativeProfile) -> Option<String> {
    LEADERSHIP
        .iter()
        .find(|l| l.categories.iter().any(|c| profile.categories_won.contains(c)))
        .map(|l| format!("**{}:** `{}` {}", l.title, profile.ticker, l.body))
}

/// Group conclusion from comparative profiles: one sentence per leading entity,
/// deduplicated and sorted.
pub fn summarize_overall(profiles: &[ComparativeProfile]) -> String {
    let sentences: BTreeSet<String> = profiles.iter().filter_map(leadership_sentence).collect();

    let mut text = String::from(CONCLUSION_HEADING);
    if sentences.is_empty() {
        text.push_str(NO_CLEAR_LEADER);
        return text;
    }

    text.push_str(PANORAMA_INTRO);
    let bullets: Vec<String> = sentences.iter().map(|s| format!("- {}", s)).collect();
    text.push_str(&bullets.join("\n"));
    text.push_str("\n\n");
    text.push_str(RECOMMENDATION);
    text
}

/// Rank the table and summarise it, or explain why a comparison is not possible.
pub fn comparative_conclusion(table: &ComparisonTable) -> String {
    if table.entity_count() < 2 {
        return format!("{}{}", CONCLUSION_HEADING, NEEDS_TWO_ENTITIES);
    }
    summarize_overall(&rank(table))
}
