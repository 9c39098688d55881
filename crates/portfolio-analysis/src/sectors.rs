use std::collections::{BTreeMap, HashMap};

use analysis_core::format::percent;

use crate::models::{SectorWeight, WeightedAsset};

pub const UNKNOWN_SECTOR: &str = "Desconocido";
/// Sectors at or below this weight are left out of the chart and the narrative.
pub const MIN_SECTOR_WEIGHT: f64 = 0.001;

const NOTHING_TO_SHOW: &str = "No hay asignaciones sectoriales significativas que mostrar.";

/// Sum ticker weights per sector, drop negligible sectors and sort heaviest first.
///
/// Tickers without a known sector are grouped under [`UNKNOWN_SECTOR`]. Equal weights
/// are ordered by sector name.
pub fn aggregate_by_sector(weights: &[WeightedAsset], sectors: &HashMap<String, String>) -> Vec<SectorWeight> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for asset in weights {
        let sector = sectors
            .get(&asset.ticker)
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN_SECTOR);
        *totals.entry(sector).or_insert(0.0) += asset.weight;
    }

    let mut allocation: Vec<SectorWeight> = totals
        .into_iter()
        .filter(|(_, w)| *w > MIN_SECTOR_WEIGHT)
        .map(|(sector, weight)| SectorWeight {
            sector: sector.to_string(),
            weight,
        })
        .collect();
    allocation.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    allocation
}

/// Narrate sector concentration. `allocation` must already be aggregated, filtered
/// and sorted heaviest first (see [`aggregate_by_sector`]).
pub fn narrate_sectors(allocation: &[SectorWeight]) -> String {
    let leader = match allocation.first() {
        Some(l) => l,
        None => return NOTHING_TO_SHOW.to_string(),
    };

    let mut text = format!(
        "Su portafolio muestra una estrategia con una asignación principal en el sector **{}**, que representa un **{}** del total.",
        leader.sector,
        percent(leader.weight, 1)
    );

    if leader.weight > 0.5 {
        text.push_str(" Esta es una **alta concentración**, que puede generar mayores retornos si el sector tiene un buen desempeño, pero también incrementa el riesgo específico del sector.");
    } else if leader.weight > 0.3 {
        text.push_str(" Esta es una **concentración significativa**, indicando una fuerte convicción en el potencial de este sector.");
    }

    if let Some(second) = allocation.get(1) {
        if allocation.len() > 2 {
            text.push_str(&format!(
                " La exposición se diversifica con una asignación del **{}** al sector **{}**, que actúa como un contrapeso y ayuda a mitigar la volatilidad.",
                percent(second.weight, 1),
                second.sector
            ));
        } else {
            text.push_str(&format!(
                " El resto del portafolio se asigna al sector **{}** ({}), creando un portafolio enfocado en dos áreas principales.",
                second.sector,
                percent(second.weight, 1)
            ));
        }
    }

    text
}
