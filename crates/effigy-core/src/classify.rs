//! Semantic classification of feature labels into anatomical body parts.
//!
//! Classification depends only on the label text. Keywords are tested in a
//! fixed priority order, so `"eye_pupil"` is a pupil and `"head_horn"` is a
//! head regardless of where the feature sits in the descriptor.

use crate::descriptor::{Feature, VisualDescriptor};

/// Anatomical bucket a feature is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Head,
    Mane,
    Nose,
    Mouth,
    Eye,
    Pupil,
    Ear,
    Leg,
    Tail,
    Wing,
    Other,
}

impl BodyPart {
    /// Parts that sit on, or belong to, the face.
    pub fn is_face_like(self) -> bool {
        matches!(
            self,
            Self::Head | Self::Mane | Self::Nose | Self::Mouth | Self::Eye | Self::Pupil | Self::Ear
        )
    }
}

/// Keyword table in priority order. `pupil` precedes `eye`.
const KEYWORDS: &[(&[&str], BodyPart)] = &[
    (&["pupil"], BodyPart::Pupil),
    (&["eye"], BodyPart::Eye),
    (&["head", "face"], BodyPart::Head),
    (&["mane"], BodyPart::Mane),
    (&["nose", "snout", "beak"], BodyPart::Nose),
    (&["mouth", "jaw"], BodyPart::Mouth),
    (&["ear", "horn", "antenna"], BodyPart::Ear),
    (&["leg", "foot", "paw", "tentacle"], BodyPart::Leg),
    (&["tail"], BodyPart::Tail),
    (&["wing", "fin"], BodyPart::Wing),
];

/// Classifies a free-text label.
pub fn classify(label: &str) -> BodyPart {
    let lower = label.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(words, _)| words.iter().any(|w| lower.contains(w)))
        .map_or(BodyPart::Other, |&(_, part)| part)
}

/// Left/right placement hint taken from a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Center,
}

impl Side {
    /// Reads `left` / `right` from the label. A label naming both is
    /// treated as centered.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        match (lower.contains("left"), lower.contains("right")) {
            (true, false) => Self::Left,
            (false, true) => Self::Right,
            _ => Self::Center,
        }
    }

    /// Mirror sign: `-1` for left, `+1` for right, `0` for center.
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
            Self::Center => 0.0,
        }
    }
}

/// Features grouped by body part. Entries are indices into the
/// descriptor's feature list, in descriptor order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anatomy {
    pub head: Option<usize>,
    pub mane: Option<usize>,
    pub nose: Option<usize>,
    pub mouth: Option<usize>,
    pub eyes: Vec<usize>,
    pub pupils: Vec<usize>,
    pub ears: Vec<usize>,
    pub legs: Vec<usize>,
    pub tails: Vec<usize>,
    pub wings: Vec<usize>,
    /// Unclassified features, plus repeats of singleton parts.
    pub other: Vec<usize>,
}

impl Anatomy {
    /// Buckets an ordered feature list.
    pub fn from_features(features: &[Feature]) -> Self {
        let mut anatomy = Self::default();
        for (index, feature) in features.iter().enumerate() {
            let slot = match classify(&feature.label) {
                BodyPart::Head => &mut anatomy.head,
                BodyPart::Mane => &mut anatomy.mane,
                BodyPart::Nose => &mut anatomy.nose,
                BodyPart::Mouth => &mut anatomy.mouth,
                BodyPart::Eye => {
                    anatomy.eyes.push(index);
                    continue;
                }
                BodyPart::Pupil => {
                    anatomy.pupils.push(index);
                    continue;
                }
                BodyPart::Ear => {
                    anatomy.ears.push(index);
                    continue;
                }
                BodyPart::Leg => {
                    anatomy.legs.push(index);
                    continue;
                }
                BodyPart::Tail => {
                    anatomy.tails.push(index);
                    continue;
                }
                BodyPart::Wing => {
                    anatomy.wings.push(index);
                    continue;
                }
                BodyPart::Other => {
                    anatomy.other.push(index);
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(index);
            } else {
                anatomy.other.push(index);
            }
        }
        anatomy
    }

    /// Buckets a descriptor's features.
    pub fn of(descriptor: &VisualDescriptor) -> Self {
        Self::from_features(&descriptor.features)
    }
}

/// A sanitized descriptor paired with its cached classification.
///
/// Descriptors are passed through [`VisualDescriptor::sanitized`] on the
/// way in, so typed values built in code obey the same ranges as parsed
/// JSON. The anatomy is computed once and only recomputed when the
/// descriptor is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    descriptor: VisualDescriptor,
    anatomy: Anatomy,
}

impl Classified {
    pub fn new(descriptor: VisualDescriptor) -> Self {
        let descriptor = descriptor.sanitized();
        let anatomy = Anatomy::of(&descriptor);
        Self {
            descriptor,
            anatomy,
        }
    }

    pub fn descriptor(&self) -> &VisualDescriptor {
        &self.descriptor
    }

    pub fn anatomy(&self) -> &Anatomy {
        &self.anatomy
    }

    /// Looks up a feature by index.
    pub fn feature(&self, index: usize) -> Option<&Feature> {
        self.descriptor.features.get(index)
    }

    /// Swaps in a new descriptor (e.g. after regeneration) and reclassifies.
    pub fn replace(&mut self, descriptor: VisualDescriptor) {
        let descriptor = descriptor.sanitized();
        self.anatomy = Anatomy::of(&descriptor);
        self.descriptor = descriptor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Circle, Shape};
    use proptest::prelude::*;

    fn circle(label: &str) -> Feature {
        Feature::new(
            label,
            "#000",
            Shape::Circle(Circle {
                x: 0.0,
                y: 0.0,
                radius: 1.0,
            }),
        )
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(classify("eye_pupil"), BodyPart::Pupil);
        assert_eq!(classify("Eye_Left"), BodyPart::Eye);
        assert_eq!(classify("face"), BodyPart::Head);
        assert_eq!(classify("head_horn"), BodyPart::Head);
        assert_eq!(classify("lion mane"), BodyPart::Mane);
        assert_eq!(classify("beak"), BodyPart::Nose);
        assert_eq!(classify("JAW"), BodyPart::Mouth);
        assert_eq!(classify("antenna_2"), BodyPart::Ear);
        assert_eq!(classify("tentacle"), BodyPart::Leg);
        assert_eq!(classify("tail_tip"), BodyPart::Tail);
        assert_eq!(classify("dorsal fin"), BodyPart::Wing);
        assert_eq!(classify("body"), BodyPart::Other);
        assert_eq!(classify(""), BodyPart::Other);
    }

    #[test]
    fn test_side() {
        assert_eq!(Side::from_label("ear_LEFT"), Side::Left);
        assert_eq!(Side::from_label("right wing"), Side::Right);
        assert_eq!(Side::from_label("eye"), Side::Center);
        assert_eq!(Side::from_label("left-right"), Side::Center);
    }

    #[test]
    fn test_anatomy_buckets() {
        let features: Vec<Feature> = [
            "body", "head", "leg_fl", "eye_left", "pupil_left", "head_2", "leg_fr", "tail", "nose",
        ]
        .iter()
        .map(|l| circle(l))
        .collect();
        let anatomy = Anatomy::from_features(&features);

        assert_eq!(anatomy.head, Some(1));
        assert_eq!(anatomy.nose, Some(8));
        assert_eq!(anatomy.mouth, None);
        assert_eq!(anatomy.eyes, vec![3]);
        assert_eq!(anatomy.pupils, vec![4]);
        assert_eq!(anatomy.legs, vec![2, 6]);
        assert_eq!(anatomy.tails, vec![7]);
        // Repeated singleton falls through to `other`.
        assert_eq!(anatomy.other, vec![0, 5]);
    }

    #[test]
    fn test_classified_replace() {
        let mut classified = Classified::new(VisualDescriptor {
            features: vec![circle("head")],
            ..Default::default()
        });
        assert_eq!(classified.anatomy().head, Some(0));

        classified.replace(VisualDescriptor {
            features: vec![circle("tail"), circle("head")],
            ..Default::default()
        });
        assert_eq!(classified.anatomy().head, Some(1));
        assert_eq!(classified.anatomy().tails, vec![0]);
    }

    #[test]
    fn test_classified_sanitizes_typed_input() {
        let mut head = circle("head");
        head.shape = Shape::Circle(Circle {
            x: f32::NAN,
            y: 5000.0,
            radius: -3.0,
        });
        let mut ear = circle("ear");
        ear.shape = Shape::Circle(Circle {
            x: 0.0,
            y: 0.0,
            radius: f32::NAN,
        });
        let descriptor = VisualDescriptor {
            width: -10.0,
            features: vec![head, ear],
            ..Default::default()
        };

        let mut classified = Classified::new(descriptor.clone());
        assert_eq!(classified.descriptor(), &descriptor.sanitized());
        assert!(classified.descriptor().width >= 8.0);
        let Shape::Circle(c) = &classified.descriptor().features[0].shape else {
            panic!("head is not a circle");
        };
        assert!(c.x.is_finite() && c.y <= 1024.0 && c.radius > 0.0);
        let Shape::Circle(c) = &classified.descriptor().features[1].shape else {
            panic!("ear is not a circle");
        };
        assert!(c.radius.is_finite() && c.radius > 0.0);

        classified.replace(descriptor.clone());
        assert_eq!(classified.descriptor(), &descriptor.sanitized());
        assert_eq!(classified.anatomy().head, Some(0));
    }

    proptest! {
        #[test]
        fn prop_classification_ignores_position(label in "[a-z_ ]{0,16}", before in 0usize..6, after in 0usize..6) {
            let mut features: Vec<Feature> = (0..before).map(|i| circle(&format!("filler{i}"))).collect();
            features.push(circle(&label));
            features.extend((0..after).map(|i| circle(&format!("pad{i}"))));

            let anatomy = Anatomy::from_features(&features);
            let index = before;
            let expected = classify(&label);
            let found = match expected {
                BodyPart::Eye => anatomy.eyes.contains(&index),
                BodyPart::Pupil => anatomy.pupils.contains(&index),
                BodyPart::Ear => anatomy.ears.contains(&index),
                BodyPart::Leg => anatomy.legs.contains(&index),
                BodyPart::Tail => anatomy.tails.contains(&index),
                BodyPart::Wing => anatomy.wings.contains(&index),
                BodyPart::Other => anatomy.other.contains(&index),
                BodyPart::Head => anatomy.head == Some(index),
                BodyPart::Mane => anatomy.mane == Some(index),
                BodyPart::Nose => anatomy.nose == Some(index),
                BodyPart::Mouth => anatomy.mouth == Some(index),
            };
            prop_assert!(found);
            prop_assert_eq!(classify(&label.to_uppercase()), expected);
        }
    }
}
