//! Static registry of built-in panel cards.
//!
//! The registry answers two questions the layout engine cannot answer from
//! a bare id: which sizes a panel supports, and whether it may be removed
//! from the dashboard. Text cards are not registered here; they are
//! recognized by their id prefix (see [`crate::textcards::is_text_card`])
//! and are always deletable and freely resizable.

use crate::model::CardSize;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Metadata for one built-in panel type.
#[derive(Debug, Clone, Copy)]
pub struct CardSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub allowed_sizes: &'static [CardSize],
    pub default_size: CardSize,
    pub deletable: bool,
}

const ALL_SIZES: &[CardSize] = &[CardSize::Small, CardSize::Medium, CardSize::Large];
const WIDE_ONLY: &[CardSize] = &[CardSize::Medium, CardSize::Large];

const PANELS: &[CardSpec] = &[
    CardSpec {
        id: "readiness",
        title: "Readiness",
        allowed_sizes: ALL_SIZES,
        default_size: CardSize::Large,
        deletable: false,
    },
    CardSpec {
        id: "sleep",
        title: "Sleep",
        allowed_sizes: ALL_SIZES,
        default_size: CardSize::Medium,
        deletable: true,
    },
    CardSpec {
        id: "activity",
        title: "Activity",
        allowed_sizes: ALL_SIZES,
        default_size: CardSize::Medium,
        deletable: true,
    },
    CardSpec {
        id: "heart-rate",
        title: "Heart Rate & HRV",
        allowed_sizes: WIDE_ONLY,
        default_size: CardSize::Medium,
        deletable: true,
    },
    CardSpec {
        id: "nutrition",
        title: "Nutrition",
        allowed_sizes: ALL_SIZES,
        default_size: CardSize::Medium,
        deletable: true,
    },
    CardSpec {
        id: "hydration",
        title: "Hydration",
        allowed_sizes: ALL_SIZES,
        default_size: CardSize::Small,
        deletable: true,
    },
    CardSpec {
        id: "training",
        title: "Training Load",
        allowed_sizes: WIDE_ONLY,
        default_size: CardSize::Large,
        deletable: true,
    },
    CardSpec {
        id: "habits",
        title: "Habits",
        allowed_sizes: ALL_SIZES,
        default_size: CardSize::Medium,
        deletable: true,
    },
    CardSpec {
        id: "goals",
        title: "Goals",
        allowed_sizes: ALL_SIZES,
        default_size: CardSize::Medium,
        deletable: true,
    },
    CardSpec {
        id: "weight-trend",
        title: "Weight Trend",
        allowed_sizes: ALL_SIZES,
        default_size: CardSize::Small,
        deletable: true,
    },
];

static REGISTRY: Lazy<HashMap<&'static str, &'static CardSpec>> =
    Lazy::new(|| PANELS.iter().map(|spec| (spec.id, spec)).collect());

/// Look up a built-in panel by id.
pub fn panel_spec(id: &str) -> Option<&'static CardSpec> {
    REGISTRY.get(id).copied()
}

/// Whether an id resolves to anything the dashboard can render: a
/// registered panel or a text card.
pub fn is_known_card(id: &str) -> bool {
    panel_spec(id).is_some() || crate::textcards::is_text_card(id)
}

/// Whether a card may take the given size. Text cards accept any size.
pub fn size_allowed(id: &str, size: CardSize) -> bool {
    match panel_spec(id) {
        Some(spec) => spec.allowed_sizes.contains(&size),
        None => crate::textcards::is_text_card(id),
    }
}

/// Whether a card may be deleted from a layout.
pub fn is_deletable(id: &str) -> bool {
    match panel_spec(id) {
        Some(spec) => spec.deletable,
        None => crate::textcards::is_text_card(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_panel_resolves() {
        let spec = panel_spec("readiness").unwrap();
        assert_eq!(spec.title, "Readiness");
        assert!(!spec.deletable);
    }

    #[test]
    fn unknown_id_is_not_a_card() {
        assert!(!is_known_card("mystery-panel"));
        assert!(is_known_card("sleep"));
        assert!(is_known_card("text-card-1700000000000"));
    }

    #[test]
    fn size_constraints_enforced_for_panels() {
        assert!(!size_allowed("heart-rate", CardSize::Small));
        assert!(size_allowed("heart-rate", CardSize::Large));
        assert!(size_allowed("text-card-42", CardSize::Small));
        assert!(!size_allowed("mystery-panel", CardSize::Small));
    }

    #[test]
    fn text_cards_are_always_deletable() {
        assert!(is_deletable("text-card-42"));
        assert!(!is_deletable("readiness"));
        assert!(is_deletable("sleep"));
    }
}
