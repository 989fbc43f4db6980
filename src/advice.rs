//! Treatment recommendations in English and Swahili.

#[derive(Debug, Clone, Copy)]
pub struct Advice {
    pub en: &'static str,
    pub sw: &'static str,
}

const DISEASE_ADVICE: &[(&str, Advice)] = &[
    (
        "Early Blight",
        Advice {
            en: "Remove affected leaves. Apply fungicide containing chlorothalonil or mancozeb. Ensure good air circulation. Water at soil level, not leaves. Rotate crops yearly.",
            sw: "Ondoa majani yaliyoathirika. Tumia dawa ya kuvu yenye chlorothalonil au mancozeb. Hakikisha mzunguko mzuri wa hewa. Mwagilia kwenye udongo, si majani. Badilisha mazao kila mwaka.",
        },
    ),
    (
        "Late Blight",
        Advice {
            en: "Act immediately - this spreads fast! Remove and destroy infected plants. Apply copper-based fungicide. Avoid overhead watering. Plant resistant varieties.",
            sw: "Fanya haraka - inasambaa haraka! Ondoa na uharibu mimea iliyoambukizwa. Tumia dawa ya kuvu yenye shaba. Epuka kumwagilia juu. Panda aina zinazostahimili.",
        },
    ),
    (
        "Leaf Mold",
        Advice {
            en: "Improve ventilation around plants. Reduce humidity. Apply sulfur-based fungicide. Remove affected leaves. Space plants properly.",
            sw: "Boresha mzunguko wa hewa kuzunguka mimea. Punguza unyevu. Tumia dawa ya kuvu yenye sulfuri. Ondoa majani yaliyoathirika. Weka nafasi sahihi kati ya mimea.",
        },
    ),
    (
        "Common Rust",
        Advice {
            en: "Apply fungicide early. Remove infected leaves. Plant resistant hybrids. Ensure proper spacing. Monitor regularly during humid weather.",
            sw: "Tumia dawa ya kuvu mapema. Ondoa majani yaliyoambukizwa. Panda mchanganyiko unaostahimili. Hakikisha nafasi sahihi. Fuatilia mara kwa mara wakati wa hali ya hewa yenye unyevu.",
        },
    ),
    (
        "Northern Leaf Blight",
        Advice {
            en: "Use resistant varieties. Rotate crops. Apply fungicide if severe. Remove crop debris after harvest. Avoid dense planting.",
            sw: "Tumia aina zinazostahimili. Badilisha mazao. Tumia dawa ya kuvu ikiwa ni kali. Ondoa mabaki ya mazao baada ya kuvuna. Epuka kupanda kwa msongamano.",
        },
    ),
    (
        "Gray Leaf Spot",
        Advice {
            en: "Plant resistant hybrids. Rotate with non-host crops. Apply fungicide at first signs. Manage crop residue. Ensure good drainage.",
            sw: "Panda mchanganyiko unaostahimili. Badilisha na mazao yasiyo na ugonjwa. Tumia dawa ya kuvu kwenye ishara za kwanza. Simamia mabaki ya mazao. Hakikisha mtiririko mzuri wa maji.",
        },
    ),
    (
        "Mosaic Disease",
        Advice {
            en: "Use disease-free planting material. Control whiteflies (disease vectors). Remove infected plants immediately. Plant resistant varieties. Practice crop rotation.",
            sw: "Tumia vifaa vya kupanda visivyo na magonjwa. Dhibiti nzi weupe (wasambazaji wa ugonjwa). Ondoa mimea iliyoambukizwa mara moja. Panda aina zinazostahimili. Fanya mzunguko wa mazao.",
        },
    ),
    (
        "Brown Streak",
        Advice {
            en: "Use clean planting material. Remove infected plants. Control whiteflies. Harvest earlier if needed. Plant resistant varieties when available.",
            sw: "Tumia vifaa safi vya kupanda. Ondoa mimea iliyoambukizwa. Dhibiti nzi weupe. Vuna mapema ikiwa ni lazima. Panda aina zinazostahimili zinapopatikana.",
        },
    ),
    (
        "Healthy",
        Advice {
            en: "Your crop looks healthy! Continue good practices: proper watering, fertilization, pest monitoring, and crop rotation. Prevention is key.",
            sw: "Mazao yako yanaonekana yenye afya njema! Endelea na mazoezi mazuri: kumwagilia vizuri, mbolea, ufuatiliaji wa wadudu, na mzunguko wa mazao. Kuzuia ni muhimu.",
        },
    ),
];

const GENERIC_ADVICE: Advice = Advice {
    en: "Consult with a local agricultural extension officer for specific treatment recommendations. General tips: maintain plant health, monitor regularly, and practice good crop hygiene.",
    sw: "Wasiliana na afisa wa ugani wa kilimo wa eneo lako kwa mapendekezo maalum ya matibabu. Vidokezo vya jumla: dumisha afya ya mimea, fuatilia mara kwa mara, na fanya usafi mzuri wa mazao.",
};

/// Treatment advice for a disease name. Unknown names get the generic
/// guidance rather than an error.
pub fn advice_for(disease_name: &str) -> &'static Advice {
    DISEASE_ADVICE
        .iter()
        .find(|(name, _)| *name == disease_name)
        .map(|(_, advice)| advice)
        .unwrap_or(&GENERIC_ADVICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DISEASE_CLASSES;

    #[test]
    fn known_disease_returns_registered_pair() {
        let advice = advice_for("Early Blight");
        assert!(advice.en.starts_with("Remove affected leaves."));
        assert!(advice.sw.starts_with("Ondoa majani yaliyoathirika."));
    }

    #[test]
    fn unknown_disease_falls_back_to_generic() {
        let advice = advice_for("Nonexistent Disease");
        assert_eq!(advice.en, GENERIC_ADVICE.en);
        assert_eq!(advice.sw, GENERIC_ADVICE.sw);
    }

    #[test]
    fn every_registered_class_has_dedicated_advice() {
        for class in DISEASE_CLASSES {
            let advice = advice_for(class.disease);
            assert_ne!(
                advice.en, GENERIC_ADVICE.en,
                "no advice entry for {}",
                class.disease
            );
        }
    }
}
