/// Soil classes in the order used at training time.
///
/// Position `i` corresponds to output index `i` of the model's probability
/// vector. Length and order are an external contract with the trained
/// artifact: a mismatch produces wrong labels, not a runtime error.
pub(super) const SOIL_LABELS: [&str; 4] = [
    "Alluvial Soil",
    "Black Soil",
    "Clay Soil",
    "Red Soil",
];
