use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Refinery process family a compound is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompoundCategory {
    Aromatics,
    Olefins,
    Alkanes,
    Other,
}

impl CompoundCategory {
    pub const ALL: [CompoundCategory; 4] = [
        CompoundCategory::Aromatics,
        CompoundCategory::Olefins,
        CompoundCategory::Alkanes,
        CompoundCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundCategory::Aromatics => "Aromatics",
            CompoundCategory::Olefins => "Olefins",
            CompoundCategory::Alkanes => "Alkanes",
            CompoundCategory::Other => "Other",
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            CompoundCategory::Aromatics => "#FF6B6B",
            CompoundCategory::Olefins => "#4ECDC4",
            CompoundCategory::Alkanes => "#45B7D1",
            CompoundCategory::Other => "#96A5A6",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            CompoundCategory::Aromatics => (0xFF, 0x6B, 0x6B),
            CompoundCategory::Olefins => (0x4E, 0xCD, 0xC4),
            CompoundCategory::Alkanes => (0x45, 0xB7, 0xD1),
            CompoundCategory::Other => (0x96, 0xA5, 0xA6),
        }
    }
}

impl fmt::Display for CompoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static REFINERY_COMPOUNDS: Lazy<HashMap<&'static str, CompoundCategory>> = Lazy::new(|| {
    use CompoundCategory::*;
    HashMap::from([
        // catalytic reforming
        ("Benzene", Aromatics),
        ("Toluene", Aromatics),
        ("m/p Xylene", Aromatics),
        ("o-Xylene", Aromatics),
        ("Ethylbenzene", Aromatics),
        ("Styrene", Aromatics),
        ("1,2,3-Trimethylbenzene", Aromatics),
        ("1,2,4-Trimethylbenzene", Aromatics),
        ("1,3,5-Trimethylbenzene", Aromatics),
        // fluid catalytic cracking
        ("Ethylene", Olefins),
        ("Propylene", Olefins),
        ("1,3-Butadiene", Olefins),
        ("1-Butene", Olefins),
        ("cis-2-Butene", Olefins),
        ("trans-2-Butene", Olefins),
        ("n-Hexane", Alkanes),
        ("n-Heptane", Alkanes),
        ("n-Octane", Alkanes),
        ("n-Nonane", Alkanes),
        ("n-Decane", Alkanes),
        ("Cyclohexane", Alkanes),
        ("Methylcyclohexane", Alkanes),
    ])
});

/// Category for any compound name; names outside the refinery table are `Other`.
pub fn classify(compound: &str) -> CompoundCategory {
    REFINERY_COMPOUNDS
        .get(compound)
        .copied()
        .unwrap_or(CompoundCategory::Other)
}

pub fn is_refinery_compound(compound: &str) -> bool {
    REFINERY_COMPOUNDS.contains_key(compound)
}

pub fn compound_rgb(compound: &str) -> (u8, u8, u8) {
    classify(compound).rgb()
}
