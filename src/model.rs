//! Disease classification model.
//!
//! The class registry and preprocessing match the deployment target of the
//! trained checkpoint (224x224 RGB, ImageNet normalization). Inference is a
//! randomized stand-in until that checkpoint ships; a real backend replaces
//! only the class-selection step behind the same `classify` contract.

use std::path::Path;

use image::imageops::FilterType;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::error::ServiceError;

const IMAGE_SIZE: u32 = 224;
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// One entry in the fixed class registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseaseClass {
    pub id: u32,
    pub crop: &'static str,
    pub disease: &'static str,
    pub disease_sw: &'static str,
}

/// PlantVillage disease classes (subset for the demo deployment).
pub const DISEASE_CLASSES: &[DiseaseClass] = &[
    DiseaseClass { id: 0, crop: "tomato", disease: "Early Blight", disease_sw: "Ugonjwa wa Mapema" },
    DiseaseClass { id: 1, crop: "tomato", disease: "Late Blight", disease_sw: "Ugonjwa wa Mwisho" },
    DiseaseClass { id: 2, crop: "tomato", disease: "Leaf Mold", disease_sw: "Kuvu ya Majani" },
    DiseaseClass { id: 3, crop: "tomato", disease: "Healthy", disease_sw: "Afya Njema" },
    DiseaseClass { id: 4, crop: "maize", disease: "Common Rust", disease_sw: "Kutu ya Kawaida" },
    DiseaseClass { id: 5, crop: "maize", disease: "Northern Leaf Blight", disease_sw: "Ukungu wa Kaskazini" },
    DiseaseClass { id: 6, crop: "maize", disease: "Gray Leaf Spot", disease_sw: "Madoa ya Kijivu" },
    DiseaseClass { id: 7, crop: "maize", disease: "Healthy", disease_sw: "Afya Njema" },
    DiseaseClass { id: 8, crop: "cassava", disease: "Mosaic Disease", disease_sw: "Ugonjwa wa Mozaiki" },
    DiseaseClass { id: 9, crop: "cassava", disease: "Brown Streak", disease_sw: "Mistari ya Kahawia" },
    DiseaseClass { id: 10, crop: "cassava", disease: "Healthy", disease_sw: "Afya Njema" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Moderate,
    Severe,
}

/// A single ranked prediction. `severity_score` stays internal; the HTTP
/// layer decides which fields go on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_id: u32,
    pub crop: &'static str,
    pub disease: &'static str,
    pub disease_sw: &'static str,
    pub confidence: f64,
    pub severity: Severity,
    pub severity_score: f64,
}

pub struct Model {
    classes: Vec<DiseaseClass>,
}

impl Model {
    /// Load the model. Without a checkpoint path the demo backend is used;
    /// a configured path must at least exist on disk.
    pub fn load(checkpoint: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = checkpoint {
            if !path.exists() {
                anyhow::bail!("model checkpoint not found: {}", path.display());
            }
        }

        info!("model initialized (demo mode)");
        Ok(Self {
            classes: DISEASE_CLASSES.to_vec(),
        })
    }

    /// Decode and preprocess raw image bytes, then classify.
    pub fn predict(
        &self,
        image_data: &[u8],
        crop_hint: Option<&str>,
    ) -> Result<Vec<Prediction>, ServiceError> {
        let input = preprocess_image(image_data)?;
        let mut rng = StdRng::from_entropy();
        Ok(self.classify(&input, crop_hint, &mut rng))
    }

    /// Rank up to three candidate classes for a preprocessed image.
    ///
    /// A `crop_hint` matching a registered crop (case-insensitive) narrows
    /// the candidate pool to that crop; anything else leaves the full
    /// registry in play. The random source is passed in so callers can seed
    /// it.
    pub fn classify<R: Rng>(
        &self,
        _input: &[f32],
        crop_hint: Option<&str>,
        rng: &mut R,
    ) -> Vec<Prediction> {
        let pool: Vec<DiseaseClass> = match crop_hint {
            Some(hint) => {
                let filtered: Vec<DiseaseClass> = self
                    .classes
                    .iter()
                    .filter(|class| class.crop.eq_ignore_ascii_case(hint))
                    .copied()
                    .collect();
                if filtered.is_empty() {
                    self.classes.clone()
                } else {
                    filtered
                }
            }
            None => self.classes.clone(),
        };

        let top = *pool.choose(rng).expect("class registry is never empty");
        let top_confidence = rng.gen_range(0.55..0.95);
        let (severity, severity_score) = severity_for(top.disease, rng);

        let mut predictions = vec![Prediction {
            class_id: top.id,
            crop: top.crop,
            disease: top.disease,
            disease_sw: top.disease_sw,
            confidence: round4(top_confidence),
            severity,
            severity_score: round4(severity_score),
        }];

        // Runner-up candidates, sampled without replacement.
        let remaining: Vec<DiseaseClass> = pool
            .iter()
            .filter(|class| class.id != top.id)
            .copied()
            .collect();

        for class in remaining.choose_multiple(rng, 2) {
            let confidence = rng.gen_range(0.05..top_confidence - 0.1);
            predictions.push(Prediction {
                class_id: class.id,
                crop: class.crop,
                disease: class.disease,
                disease_sw: class.disease_sw,
                confidence: round4(confidence),
                severity: Severity::Moderate,
                severity_score: round4(rng.gen_range(0.3..0.6)),
            });
        }

        predictions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        predictions
    }

    #[cfg(test)]
    fn with_classes(classes: Vec<DiseaseClass>) -> Self {
        Self { classes }
    }
}

/// Severity tier for a disease name, with a score inside that tier's band.
fn severity_for<R: Rng>(disease: &str, rng: &mut R) -> (Severity, f64) {
    if disease.contains("Healthy") {
        (Severity::None, 0.0)
    } else if disease.contains("Blight") || disease.contains("Rust") {
        (Severity::Severe, rng.gen_range(0.7..0.9))
    } else {
        (Severity::Moderate, rng.gen_range(0.4..0.7))
    }
}

/// Decode image bytes and normalize into the model input layout
/// (CHW, 3x224x224).
pub fn preprocess_image(image_data: &[u8]) -> Result<Vec<f32>, ServiceError> {
    let img = image::load_from_memory(image_data)?;
    let resized = img.resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Lanczos3);
    let rgb = resized.to_rgb8();

    let num_pixels = (IMAGE_SIZE * IMAGE_SIZE) as usize;
    let mut input = vec![0.0f32; 3 * num_pixels];

    for (i, pixel) in rgb.pixels().enumerate() {
        let r = (pixel[0] as f32 / 255.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        let g = (pixel[1] as f32 / 255.0 - IMAGENET_MEAN[1]) / IMAGENET_STD[1];
        let b = (pixel[2] as f32 / 255.0 - IMAGENET_MEAN[2]) / IMAGENET_STD[2];

        input[i] = r;
        input[num_pixels + i] = g;
        input[2 * num_pixels + i] = b;
    }

    Ok(input)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Cursor;

    fn demo_model() -> Model {
        Model::load(None).expect("demo model loads")
    }

    fn classify_seeded(model: &Model, crop_hint: Option<&str>, seed: u64) -> Vec<Prediction> {
        let mut rng = StdRng::seed_from_u64(seed);
        model.classify(&[], crop_hint, &mut rng)
    }

    fn sample_png() -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(64, 48);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .expect("png encoding succeeds");
        bytes
    }

    #[test]
    fn registry_ids_are_unique_and_contiguous() {
        let ids: HashSet<u32> = DISEASE_CLASSES.iter().map(|class| class.id).collect();
        assert_eq!(ids.len(), DISEASE_CLASSES.len());
        for id in 0..DISEASE_CLASSES.len() as u32 {
            assert!(ids.contains(&id), "missing class id {id}");
        }
    }

    #[test]
    fn matching_crop_hint_restricts_pool() {
        let model = demo_model();
        for seed in 0..50 {
            for hint in ["tomato", "TOMATO", "Maize"] {
                for prediction in classify_seeded(&model, Some(hint), seed) {
                    assert!(prediction.crop.eq_ignore_ascii_case(hint));
                }
            }
        }
    }

    #[test]
    fn unmatched_crop_hint_falls_back_to_full_registry() {
        let model = demo_model();
        let crops: HashSet<&str> = (0..50)
            .flat_map(|seed| classify_seeded(&model, Some("banana"), seed))
            .map(|prediction| prediction.crop)
            .collect();
        // With the unrestricted pool the draws span several crops.
        assert!(crops.len() > 1);
    }

    #[test]
    fn predictions_are_ranked_and_within_bands() {
        let model = demo_model();
        for seed in 0..100 {
            let predictions = classify_seeded(&model, None, seed);
            assert!((1..=3).contains(&predictions.len()));

            // Bounds are checked on the rounded values, so the band edges
            // are inclusive here.
            let top = &predictions[0];
            assert!(top.confidence >= 0.55 && top.confidence <= 0.95);

            for pair in predictions.windows(2) {
                assert!(pair[0].confidence >= pair[1].confidence);
            }
            for runner_up in &predictions[1..] {
                assert!(runner_up.confidence >= 0.05);
                assert!(runner_up.confidence < top.confidence - 0.1 + 1e-3);
                assert_eq!(runner_up.severity, Severity::Moderate);
                assert!(runner_up.severity_score >= 0.3 && runner_up.severity_score <= 0.6);
            }
        }
    }

    #[test]
    fn every_prediction_references_a_registered_class() {
        let model = demo_model();
        for seed in 0..50 {
            for prediction in classify_seeded(&model, None, seed) {
                let class = DISEASE_CLASSES
                    .iter()
                    .find(|class| class.id == prediction.class_id)
                    .expect("class id is registered");
                assert_eq!(class.disease, prediction.disease);
                assert_eq!(class.crop, prediction.crop);
            }
        }
    }

    #[test]
    fn severity_follows_the_name_rule() {
        let mut rng = StdRng::seed_from_u64(7);

        let (severity, score) = severity_for("Healthy", &mut rng);
        assert_eq!(severity, Severity::None);
        assert_eq!(score, 0.0);

        for name in ["Early Blight", "Late Blight", "Common Rust", "Northern Leaf Blight"] {
            let (severity, score) = severity_for(name, &mut rng);
            assert_eq!(severity, Severity::Severe);
            assert!((0.7..0.9).contains(&score));
        }

        for name in ["Leaf Mold", "Gray Leaf Spot", "Mosaic Disease", "Brown Streak"] {
            let (severity, score) = severity_for(name, &mut rng);
            assert_eq!(severity, Severity::Moderate);
            assert!((0.4..0.7).contains(&score));
        }
    }

    #[test]
    fn same_seed_gives_identical_output() {
        let model = demo_model();
        assert_eq!(
            classify_seeded(&model, None, 42),
            classify_seeded(&model, None, 42)
        );
        assert_eq!(
            classify_seeded(&model, Some("cassava"), 9),
            classify_seeded(&model, Some("cassava"), 9)
        );
    }

    #[test]
    fn prediction_count_never_exceeds_pool_size() {
        let single = Model::with_classes(vec![DISEASE_CLASSES[0]]);
        let predictions = classify_seeded(&single, None, 1);
        assert_eq!(predictions.len(), 1);

        let pair = Model::with_classes(DISEASE_CLASSES[..2].to_vec());
        let predictions = classify_seeded(&pair, None, 1);
        assert_eq!(predictions.len(), 2);
    }

    #[test]
    fn preprocess_accepts_valid_image() {
        let input = preprocess_image(&sample_png()).expect("valid png decodes");
        assert_eq!(input.len(), 3 * 224 * 224);
    }

    #[test]
    fn preprocess_rejects_undecodable_bytes() {
        let result = preprocess_image(b"definitely not an image");
        assert!(matches!(result, Err(ServiceError::InvalidImage(_))));
    }

    #[test]
    fn missing_checkpoint_fails_load() {
        let result = Model::load(Some(Path::new("/nonexistent/model.pt")));
        assert!(result.is_err());
    }
}
