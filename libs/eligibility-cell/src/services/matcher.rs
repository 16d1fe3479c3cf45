use tracing::debug;

use crate::models::{EligibilityResult, EligibleRegion};

pub const REASON_MISSING_REGION: &str = "Região não informada";
pub const REASON_NOT_ELIGIBLE: &str =
    "Região não está na lista de áreas elegíveis para atendimento gratuito";

/// Words that, together with a state name, mark an underserved area.
pub const REGION_KEYWORDS: [&str; 11] = [
    "interior",
    "rural",
    "zona rural",
    "amazônia",
    "sertão",
    "pantanal",
    "serra gaúcha",
    "fronteira oeste",
    "campanha",
    "norte",
    "vale do taquari",
];

/// Matches a free-text region typed by a patient against the active regions.
///
/// The first active region (in list order) wins when the normalized input
/// equals its name, contains its name, or contains its state together with
/// one of [`REGION_KEYWORDS`].
pub fn check_eligibility(regions: &[EligibleRegion], input: &str) -> EligibilityResult {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return EligibilityResult::rejected(REASON_MISSING_REGION);
    }

    let found = regions
        .iter()
        .filter(|region| region.active)
        .find(|region| matches_region(region, &normalized));

    match found {
        Some(region) => {
            debug!("Region '{}' matched eligible region {}", input, region.id);
            EligibilityResult::eligible(region.clone())
        }
        None => {
            debug!("Region '{}' is not eligible", input);
            EligibilityResult::rejected(REASON_NOT_ELIGIBLE)
        }
    }
}

fn matches_region(region: &EligibleRegion, normalized: &str) -> bool {
    let name = region.name.to_lowercase();
    if normalized == name || normalized.contains(&name) {
        return true;
    }

    let state = region.state.to_lowercase();
    normalized.contains(&state)
        && REGION_KEYWORDS.iter().any(|keyword| normalized.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::registry::default_regions;

    #[test]
    fn exact_name_matches_case_insensitively() {
        let regions = default_regions();
        let result = check_eligibility(&regions, "  ZONA RURAL - BAHIA ");

        assert!(result.eligible);
        assert_eq!(result.matched_region.unwrap().id, "2");
        assert!(result.reason.is_none());
    }

    #[test]
    fn input_containing_region_name_matches() {
        let regions = default_regions();
        let result = check_eligibility(&regions, "Moro no Sertão Nordestino, perto de Quixadá");

        assert!(result.eligible);
        assert_eq!(result.matched_region.unwrap().name, "Sertão Nordestino");
    }

    #[test]
    fn state_with_keyword_matches_first_region_of_that_state() {
        let regions = default_regions();
        let result = check_eligibility(&regions, "zona rural de são paulo");

        assert!(result.eligible);
        assert_eq!(result.matched_region.unwrap().name, "Interior de São Paulo");

        let gaucho = check_eligibility(&regions, "norte do estado, Rio Grande do Sul");
        assert_eq!(gaucho.matched_region.unwrap().name, "Interior do Rio Grande do Sul");
    }

    #[test]
    fn state_without_keyword_is_rejected() {
        let regions = default_regions();
        let result = check_eligibility(&regions, "Capital da Bahia");

        assert!(!result.eligible);
        assert_eq!(result.reason.as_deref(), Some(REASON_NOT_ELIGIBLE));
    }

    #[test]
    fn unknown_region_is_rejected() {
        let regions = default_regions();
        let result = check_eligibility(&regions, "Centro de Curitiba");

        assert!(!result.eligible);
        assert!(result.matched_region.is_none());
    }

    #[test]
    fn blank_input_reports_missing_region() {
        let regions = default_regions();
        let result = check_eligibility(&regions, "   ");

        assert!(!result.eligible);
        assert_eq!(result.reason.as_deref(), Some(REASON_MISSING_REGION));
    }

    #[test]
    fn inactive_regions_are_skipped() {
        let mut regions = default_regions();
        regions.iter_mut().for_each(|r| {
            if r.state == "Acre" {
                r.active = false;
            }
        });

        assert!(!check_eligibility(&regions, "Amazônia - Acre").eligible);
    }
}
