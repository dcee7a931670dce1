//! Fixed catalog of procedures offered by the clinic.
//!
//! The public appointment form only accepts a procedure from this catalog
//! (or the explicit consultation-only option, which is part of it).

use serde::Serialize;

pub const OTHER_OPTION: &str = "Other/Consultation Only";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProcedureCategory {
    pub category: &'static str,
    pub procedures: &'static [&'static str],
}

pub const PROCEDURE_CATALOG: &[ProcedureCategory] = &[
    ProcedureCategory {
        category: "Breast Procedures",
        procedures: &[
            "Breast Reduction",
            "Breast Augmentation (Implants)",
            "Breast Augmentation (Fat Transfer)",
            "Mastopexy (Breast Lift)",
            "Nipple Revision",
            "Breast Reconstruction",
            "Breast Asymmetry Correction",
        ],
    },
    ProcedureCategory {
        category: "Body Contouring",
        procedures: &[
            "360° Liposuction",
            "Abdominoplasty (Tummy Tuck)",
            "Lipoabdominoplasty",
            "Brazilian Butt Lift (BBL)",
            "Body Lift",
            "Thigh Lift",
            "Arm Lift (Brachioplasty)",
            "General Liposuction",
        ],
    },
    ProcedureCategory {
        category: "Facial Procedures",
        procedures: &[
            "Rhinoplasty",
            "Face Lift",
            "Mini Face Lift",
            "Brow Lift",
            "Eyelid Surgery",
            "Lip Procedures",
        ],
    },
    ProcedureCategory {
        category: "Gynecomastia",
        procedures: &[
            "Gynecomastia Treatment (Lipo + Excision)",
            "Gynecomastia Treatment (Lipo Only)",
            "Gynecomastia Treatment (Excision Only)",
        ],
    },
    ProcedureCategory {
        category: "Hair & Skin",
        procedures: &[
            "Hair Transplant",
            "Beard Hair Transplant",
            "Laser Hair Removal",
            "PRP Stem Cell Treatment",
            "Nanofat Facial Rejuvenation",
            "Morpheus 8 Treatment",
        ],
    },
    ProcedureCategory {
        category: "Intimate Procedures",
        procedures: &["Penile Enlargement", "Penile PRP Treatment", "Vaginoplasty"],
    },
    ProcedureCategory {
        category: "Other Procedures",
        procedures: &[OTHER_OPTION],
    },
];

pub fn is_known_procedure(name: &str) -> bool {
    PROCEDURE_CATALOG
        .iter()
        .any(|cat| cat.procedures.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_consultation_option() {
        assert!(is_known_procedure(OTHER_OPTION));
    }

    #[test]
    fn catalog_lookup_is_exact() {
        assert!(is_known_procedure("Rhinoplasty"));
        assert!(!is_known_procedure("rhinoplasty"));
        assert!(!is_known_procedure("Time Travel"));
    }
}
