// src/analysis/config.rs

use crate::math::{
    algorithms::triangulation::Triangulation,
    error::{MathError, MathResult},
    geometry::{
        alpha_shape::{AlphaCriterion, AlphaShapeBuilder},
        dilation::BoundaryDilator,
    },
    point_distribution::density::DensityEstimator,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Schlüsselwort `"default"` in der Konfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultKeyword {
    Default,
}

/// Länge in Pixeln oder `"default"` (aus dem ICD abgeleitet).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthSetting {
    Value(f64),
    Keyword(DefaultKeyword),
}

impl Default for LengthSetting {
    fn default() -> Self {
        LengthSetting::Keyword(DefaultKeyword::Default)
    }
}

impl LengthSetting {
    fn value(&self) -> Option<f64> {
        match self {
            LengthSetting::Value(v) => Some(*v),
            LengthSetting::Keyword(_) => None,
        }
    }
}

/// Welche Alpha-Polygone die Boundary bilden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundarySelection {
    #[default]
    All,
    /// Nur das flächengrößte Polygon
    Largest,
}

/// Alle Optionen einer Mosaikanalyse. Unbekannte Schlüssel werden abgelehnt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Alpha-Schwelle; Standard ist der ICD.
    pub alpha: LengthSetting,
    /// Dilatationsabstand; Standard ist 0.5 * ICD.
    pub dilation_factor: LengthSetting,
    pub pdf_bandwidth: f64,
    pub grid_density: usize,
    pub contour_levels: usize,
    pub cutoff: f64,
    pub alpha_criterion: AlphaCriterion,
    pub boundary_selection: BoundarySelection,
    pub keep_holes: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let density = DensityEstimator::default();
        Self {
            alpha: LengthSetting::default(),
            dilation_factor: LengthSetting::default(),
            pdf_bandwidth: density.bandwidth,
            grid_density: density.resolution,
            contour_levels: density.contour_levels,
            cutoff: density.cutoff,
            alpha_criterion: AlphaCriterion::default(),
            boundary_selection: BoundarySelection::default(),
            keep_holes: true,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Liest und validiert eine Konfiguration aus einem beliebigen serde-Format.
    pub fn from_deserializer<'de, D>(deserializer: D) -> MathResult<Self>
    where
        D: Deserializer<'de>,
    {
        let config = Self::deserialize(deserializer)
            .map_err(|e| MathError::invalid("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = LengthSetting::Value(alpha);
        self
    }

    pub fn with_dilation(mut self, distance: f64) -> Self {
        self.dilation_factor = LengthSetting::Value(distance);
        self
    }

    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.pdf_bandwidth = bandwidth;
        self
    }

    pub fn with_grid_density(mut self, nodes: usize) -> Self {
        self.grid_density = nodes;
        self
    }

    pub fn with_contour_levels(mut self, levels: usize) -> Self {
        self.contour_levels = levels;
        self
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_criterion(mut self, criterion: AlphaCriterion) -> Self {
        self.alpha_criterion = criterion;
        self
    }

    pub fn with_selection(mut self, selection: BoundarySelection) -> Self {
        self.boundary_selection = selection;
        self
    }

    pub fn with_holes(mut self, keep_holes: bool) -> Self {
        self.keep_holes = keep_holes;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if let Some(alpha) = self.alpha.value() {
            AlphaShapeBuilder::new().with_alpha(alpha).validate()?;
        }
        if let Some(distance) = self.dilation_factor.value() {
            BoundaryDilator::new(distance)?;
        }
        self.density_estimator().validate()
    }

    /// Setzt die Standardwerte einmalig ein. Danach gibt es keine
    /// "ungesetzten" Werte mehr.
    pub fn resolve(&self, triangulation: &Triangulation) -> MathResult<ResolvedConfig> {
        self.validate()?;
        let icd = triangulation.mean_nearest_neighbor_distance();
        let resolved = ResolvedConfig {
            alpha: self.alpha.value().unwrap_or(icd),
            dilation: self.dilation_factor.value().unwrap_or(0.5 * icd),
            pdf_bandwidth: self.pdf_bandwidth,
            grid_density: self.grid_density,
            contour_levels: self.contour_levels,
            cutoff: self.cutoff,
            alpha_criterion: self.alpha_criterion,
            boundary_selection: self.boundary_selection,
            keep_holes: self.keep_holes,
        };
        debug!("AnalysisConfig resolved with ICD {:.3}: {:?}", icd, resolved);
        Ok(resolved)
    }

    fn density_estimator(&self) -> DensityEstimator {
        DensityEstimator::new()
            .with_bandwidth(self.pdf_bandwidth)
            .with_resolution(self.grid_density)
            .with_contour_levels(self.contour_levels)
            .with_cutoff(self.cutoff)
    }
}

/// Konfiguration mit aufgelösten Zahlenwerten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub alpha: f64,
    pub dilation: f64,
    pub pdf_bandwidth: f64,
    pub grid_density: usize,
    pub contour_levels: usize,
    pub cutoff: f64,
    pub alpha_criterion: AlphaCriterion,
    pub boundary_selection: BoundarySelection,
    pub keep_holes: bool,
}

impl ResolvedConfig {
    pub fn alpha_builder(&self) -> AlphaShapeBuilder {
        AlphaShapeBuilder::new()
            .with_alpha(self.alpha)
            .with_criterion(self.alpha_criterion)
            .with_holes(self.keep_holes)
    }

    pub fn dilator(&self) -> MathResult<BoundaryDilator> {
        BoundaryDilator::new(self.dilation)
    }

    pub fn density_estimator(&self) -> DensityEstimator {
        DensityEstimator::new()
            .with_bandwidth(self.pdf_bandwidth)
            .with_resolution(self.grid_density)
            .with_contour_levels(self.contour_levels)
            .with_cutoff(self.cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::types::PointSet;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn grid_triangulation() -> Triangulation {
        let mut pairs = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                pairs.push((5.0 + 10.0 * i as f64, 5.0 + 10.0 * j as f64));
            }
        }
        Triangulation::build(&PointSet::from_pairs(pairs, 40.0, 40.0, 1.0).unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_from_empty_mapping() {
        let config = AnalysisConfig::from_deserializer(json!({})).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.grid_density, 200);
        assert_eq!(config.contour_levels, 10);
        assert_relative_eq!(config.cutoff, 0.4);
        assert_relative_eq!(config.pdf_bandwidth, 0.1);
        assert!(config.keep_holes);
    }

    #[test]
    fn test_full_mapping() {
        let config = AnalysisConfig::from_deserializer(json!({
            "alpha": 12.5,
            "dilation_factor": "default",
            "pdf_bandwidth": 0.2,
            "grid_density": 50,
            "contour_levels": 4,
            "cutoff": 0.5,
            "alpha_criterion": "edge_length",
            "boundary_selection": "largest",
            "keep_holes": false
        }))
        .unwrap();
        assert_eq!(config.alpha, LengthSetting::Value(12.5));
        assert_eq!(config.dilation_factor, LengthSetting::default());
        assert_eq!(config.alpha_criterion, AlphaCriterion::EdgeLength);
        assert_eq!(config.boundary_selection, BoundarySelection::Largest);
        assert!(!config.keep_holes);
    }

    #[test]
    fn test_integer_length_is_accepted() {
        let config = AnalysisConfig::from_deserializer(json!({ "alpha": 10 })).unwrap();
        assert_eq!(config.alpha, LengthSetting::Value(10.0));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = AnalysisConfig::from_deserializer(json!({ "alpah": 3.0 })).unwrap_err();
        assert!(matches!(err, MathError::InvalidParameter { ref name, .. } if name == "config"));
    }

    #[test]
    fn test_bad_values_are_rejected() {
        for value in [
            json!({ "alpha": "auto" }),
            json!({ "alpha": -1.0 }),
            json!({ "dilation_factor": -0.5 }),
            json!({ "cutoff": 1.5 }),
            json!({ "grid_density": 1 }),
            json!({ "pdf_bandwidth": 0.0 }),
            json!({ "alpha_criterion": "area" }),
        ] {
            let result = AnalysisConfig::from_deserializer(value.clone());
            assert!(
                matches!(result, Err(MathError::InvalidParameter { .. })),
                "accepted {}",
                value
            );
        }
    }

    #[test]
    fn test_resolve_defaults_from_icd() {
        let tri = grid_triangulation();
        let resolved = AnalysisConfig::new().resolve(&tri).unwrap();
        assert_relative_eq!(resolved.alpha, 10.0, epsilon = 1e-9);
        assert_relative_eq!(resolved.dilation, 5.0, epsilon = 1e-9);

        let explicit = AnalysisConfig::new()
            .with_alpha(7.0)
            .with_dilation(0.0)
            .resolve(&tri)
            .unwrap();
        assert_relative_eq!(explicit.alpha, 7.0);
        assert_relative_eq!(explicit.dilation, 0.0);
    }

    #[test]
    fn test_resolve_validates() {
        let tri = grid_triangulation();
        assert!(AnalysisConfig::new().with_cutoff(-0.1).resolve(&tri).is_err());
    }
}
