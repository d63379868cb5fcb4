//! Two-species Lotka-Volterra competition: vector field, nullclines and the
//! equilibrium set selected by comparing the isocline intercepts.

use crate::{
    equilibrium::{linearize, Linearization},
    error::PhaseSpaceError,
    traits::{DynamicalSystem, Scalar},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on the number of nodes in a sampled vector field.
pub const MAX_FIELD_NODES: usize = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitionParams {
    /// Carrying capacity of species 1.
    pub k1: f64,
    /// Carrying capacity of species 2.
    pub k2: f64,
    /// Effect of species 1 on species 2.
    pub alpha1: f64,
    /// Effect of species 2 on species 1.
    pub alpha2: f64,
}

impl Default for CompetitionParams {
    fn default() -> Self {
        Self {
            k1: 100.0,
            k2: 100.0,
            alpha1: 3.0,
            alpha2: 3.0,
        }
    }
}

impl CompetitionParams {
    pub fn validate(&self) -> Result<(), PhaseSpaceError> {
        for (name, value) in [
            ("k1", self.k1),
            ("k2", self.k2),
            ("alpha1", self.alpha1),
            ("alpha2", self.alpha2),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PhaseSpaceError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Upper bound of the N1 axis: `max(K1, K2/α1)`.
    pub fn n1_extent(&self) -> f64 {
        self.k1.max(self.k2 / self.alpha1)
    }

    /// Upper bound of the N2 axis: `max(K2, K1/α2)`.
    pub fn n2_extent(&self) -> f64 {
        self.k2.max(self.k1 / self.alpha2)
    }
}

/// dN1/dt = r1·N1·(K1 − N1 − α2·N2)/K1, dN2/dt = r2·N2·(K2 − N2 − α1·N1)/K2
#[derive(Debug, Clone, Copy)]
pub struct CompetitionModel {
    pub params: CompetitionParams,
    pub r1: f64,
    pub r2: f64,
}

impl CompetitionModel {
    pub fn new(params: CompetitionParams) -> Self {
        Self {
            params,
            r1: 1.0,
            r2: 1.0,
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for CompetitionModel {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let p = &self.params;
        let (n1, n2) = (x[0], x[1]);
        let (k1, k2) = (T::from(p.k1), T::from(p.k2));
        out[0] = T::from(self.r1) * n1 * (k1 - n1 - T::from(p.alpha2) * n2) / k1;
        out[1] = T::from(self.r2) * n2 * (k2 - n2 - T::from(p.alpha1) * n1) / k2;
    }
}

/// Qualitative outcome of the competition, named after which isocline lies outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// `K1/α2 ≥ K2` and `K1 ≥ K2/α1`: species 1 excludes species 2.
    Species1Wins,
    /// `K2 ≥ K1/α2` and `K2/α1 ≥ K1`: species 2 excludes species 1.
    Species2Wins,
    /// `K1/α2 ≥ K2` and `K2/α1 ≥ K1`: both persist at the interior point.
    StableCoexistence,
    /// `K2 ≥ K1/α2` and `K1 ≥ K2/α1`: the interior point is a saddle and
    /// either species may win depending on the initial state.
    UnstableCoexistence,
}

impl Regime {
    /// Evaluation order at exact boundaries, where several conditions hold at
    /// once: the first match wins.
    pub const DECISION_ORDER: [Regime; 4] = [
        Regime::UnstableCoexistence,
        Regime::StableCoexistence,
        Regime::Species2Wins,
        Regime::Species1Wins,
    ];

    pub fn matches(self, p: &CompetitionParams) -> bool {
        let n2_isocline_outside_k2 = p.k1 / p.alpha2 >= p.k2;
        let k2_outside_n2_isocline = p.k2 >= p.k1 / p.alpha2;
        let k1_outside_n1_isocline = p.k1 >= p.k2 / p.alpha1;
        let n1_isocline_outside_k1 = p.k2 / p.alpha1 >= p.k1;
        match self {
            Regime::Species1Wins => n2_isocline_outside_k2 && k1_outside_n1_isocline,
            Regime::Species2Wins => k2_outside_n2_isocline && n1_isocline_outside_k1,
            Regime::StableCoexistence => n2_isocline_outside_k2 && n1_isocline_outside_k1,
            Regime::UnstableCoexistence => k2_outside_n2_isocline && k1_outside_n1_isocline,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Regime::Species1Wins => "K1/α2 ≥ K2, K1 ≥ K2/α1",
            Regime::Species2Wins => "K2 ≥ K1/α2, K2/α1 ≥ K1",
            Regime::StableCoexistence => "K1/α2 ≥ K2, K2/α1 ≥ K1",
            Regime::UnstableCoexistence => "K2 ≥ K1/α2, K1 ≥ K2/α1",
        }
    }
}

pub fn classify_regime(params: &CompetitionParams) -> Result<Regime, PhaseSpaceError> {
    Regime::DECISION_ORDER
        .into_iter()
        .find(|regime| regime.matches(params))
        .ok_or(PhaseSpaceError::UnclassifiedRegime {
            k1: params.k1,
            k2: params.k2,
            alpha1: params.alpha1,
            alpha2: params.alpha2,
        })
}

/// Intersection of the two isoclines:
/// `N1* = (K1 − α2·K2)/(1 − α1·α2)`, `N2* = (K2 − α1·K1)/(1 − α1·α2)`.
///
/// Fails with [`PhaseSpaceError::DegenerateInteraction`] when `α1·α2 = 1`.
pub fn interior_fixed_point(params: &CompetitionParams) -> Result<[f64; 2], PhaseSpaceError> {
    let denom = 1.0 - params.alpha1 * params.alpha2;
    if denom == 0.0 {
        return Err(PhaseSpaceError::DegenerateInteraction {
            alpha1: params.alpha1,
            alpha2: params.alpha2,
        });
    }
    Ok([
        (params.k1 - params.alpha2 * params.k2) / denom,
        (params.k2 - params.alpha1 * params.k1) / denom,
    ])
}

/// Fixed points selected for a regime, in `(N1, N2)` coordinates.
pub fn equilibrium_points(
    params: &CompetitionParams,
    regime: Regime,
    interior: [f64; 2],
) -> Vec<[f64; 2]> {
    let species1_only = [params.k1, 0.0];
    let species2_only = [0.0, params.k2];
    match regime {
        Regime::Species1Wins => vec![species1_only],
        Regime::Species2Wins => vec![species2_only],
        Regime::StableCoexistence => vec![interior],
        Regime::UnstableCoexistence => vec![species1_only, species2_only, interior],
    }
}

/// Vector field sampled on the unit grid, meshgrid layout: row `j` holds
/// `N2 = n2[j]`, column `i` holds `N1 = n1[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorField {
    pub n1: Vec<f64>,
    pub n2: Vec<f64>,
    pub dn1: Vec<f64>,
    pub dn2: Vec<f64>,
}

impl VectorField {
    /// Fails with [`PhaseSpaceError::FieldTooLarge`] before allocating when the
    /// grid would hold more than [`MAX_FIELD_NODES`] nodes.
    pub fn sample(model: &CompetitionModel) -> Result<Self, PhaseSpaceError> {
        let cols = model.params.n1_extent().max(0.0).ceil();
        let rows = model.params.n2_extent().max(0.0).ceil();
        let nodes = cols * rows;
        if nodes.is_nan() || nodes > MAX_FIELD_NODES as f64 {
            return Err(PhaseSpaceError::FieldTooLarge {
                cols,
                rows,
                limit: MAX_FIELD_NODES,
            });
        }

        let n1 = unit_axis(model.params.n1_extent());
        let n2 = unit_axis(model.params.n2_extent());
        let mut dn1 = Vec::with_capacity(n1.len() * n2.len());
        let mut dn2 = Vec::with_capacity(n1.len() * n2.len());
        let mut out = [0.0; 2];
        for &y in &n2 {
            for &x in &n1 {
                model.apply(0.0, &[x, y], &mut out);
                dn1.push(out[0]);
                dn2.push(out[1]);
            }
        }
        Ok(Self { n1, n2, dn1, dn2 })
    }

    pub fn rows(&self) -> usize {
        self.n2.len()
    }

    pub fn cols(&self) -> usize {
        self.n1.len()
    }

    /// `(N1, N2, dN1/dt, dN2/dt)` at grid node `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> Option<[f64; 4]> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        let idx = row * self.cols() + col;
        Some([self.n1[col], self.n2[row], self.dn1[idx], self.dn2[idx]])
    }
}

/// `0, 1, 2, …` strictly below `upper`.
fn unit_axis(upper: f64) -> Vec<f64> {
    (0..)
        .map(|i| i as f64)
        .take_while(|v| *v < upper)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: [f64; 2],
    pub to: [f64; 2],
}

/// Axis intercepts of the isoclines, as labelled on the phase portrait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intercepts {
    /// `K1` on the N1 axis.
    pub k1: f64,
    /// `K1/α2` on the N2 axis.
    pub k1_over_alpha2: f64,
    /// `K2` on the N2 axis.
    pub k2: f64,
    /// `K2/α1` on the N1 axis.
    pub k2_over_alpha1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub point: [f64; 2],
    pub linearization: Linearization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpace {
    pub params: CompetitionParams,
    pub regime: Regime,
    pub label: String,
    pub field: VectorField,
    pub equilibria: Vec<Equilibrium>,
    /// dN1/dt = 0 away from the axis: from `(K1, 0)` to `(0, K1/α2)`.
    pub n1_isocline: Segment,
    /// dN2/dt = 0 away from the axis: from `(K2/α1, 0)` to `(0, K2)`.
    pub n2_isocline: Segment,
    pub intercepts: Intercepts,
    /// `N2 = (K1²·α1)/(K2²·α2)·N1` across the N1 extent.
    pub reference_line: Segment,
}

impl PhaseSpace {
    pub fn equilibrium_points(&self) -> Vec<[f64; 2]> {
        self.equilibria.iter().map(|e| e.point).collect()
    }
}

/// Builds everything needed to draw the phase portrait for `params`.
///
/// The vector field is sampled at unit spacing, so very large carrying
/// capacities or very weak interactions are rejected with
/// [`PhaseSpaceError::FieldTooLarge`].
pub fn phase_space(params: &CompetitionParams) -> Result<PhaseSpace, PhaseSpaceError> {
    params.validate()?;
    let interior = interior_fixed_point(params)?;
    let regime = classify_regime(params)?;
    let model = CompetitionModel::new(*params);
    let field = VectorField::sample(&model)?;

    let equilibria = equilibrium_points(params, regime, interior)
        .into_iter()
        .map(|point| {
            linearize(&model, &point).map(|linearization| Equilibrium {
                point,
                linearization,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        regime = regime.label(),
        rows = field.rows(),
        cols = field.cols(),
        equilibria = equilibria.len(),
        "phase space computed"
    );

    let intercepts = Intercepts {
        k1: params.k1,
        k1_over_alpha2: params.k1 / params.alpha2,
        k2: params.k2,
        k2_over_alpha1: params.k2 / params.alpha1,
    };
    let slope = (params.k1 * params.k1 * params.alpha1) / (params.k2 * params.k2 * params.alpha2);
    let n1_max = params.n1_extent();

    Ok(PhaseSpace {
        params: *params,
        regime,
        label: regime.label().to_string(),
        field,
        equilibria,
        n1_isocline: Segment {
            from: [intercepts.k1, 0.0],
            to: [0.0, intercepts.k1_over_alpha2],
        },
        n2_isocline: Segment {
            from: [intercepts.k2_over_alpha1, 0.0],
            to: [0.0, intercepts.k2],
        },
        intercepts,
        reference_line: Segment {
            from: [0.0, 0.0],
            to: [n1_max, slope * n1_max],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::{
        classify_regime, interior_fixed_point, phase_space, unit_axis, CompetitionModel,
        CompetitionParams, Regime, VectorField, MAX_FIELD_NODES,
    };
    use crate::equilibrium::Stability;
    use crate::error::PhaseSpaceError;
    use crate::traits::DynamicalSystem;

    fn params(k1: f64, k2: f64, alpha1: f64, alpha2: f64) -> CompetitionParams {
        CompetitionParams {
            k1,
            k2,
            alpha1,
            alpha2,
        }
    }

    #[test]
    fn symmetric_strong_competition_selects_all_three_points() {
        let p = params(100.0, 100.0, 3.0, 3.0);
        let space = phase_space(&p).expect("phase space should compute");
        assert_eq!(space.regime, Regime::UnstableCoexistence);
        assert_eq!(
            space.equilibrium_points(),
            vec![[100.0, 0.0], [0.0, 100.0], [25.0, 25.0]]
        );

        let [n1, n2] = interior_fixed_point(&p).expect("interior point exists");
        assert_eq!(n1, p.k1 - p.alpha2 * n2);
        assert_eq!(n2, p.k2 - p.alpha1 * n1);

        let stabilities: Vec<Stability> = space
            .equilibria
            .iter()
            .map(|e| e.linearization.stability)
            .collect();
        assert_eq!(
            stabilities,
            vec![Stability::StableNode, Stability::StableNode, Stability::Saddle]
        );
    }

    #[test]
    fn each_regime_selects_its_point_set() {
        let space = phase_space(&params(200.0, 150.0, 0.5, 0.5)).expect("stable coexistence");
        assert_eq!(space.regime, Regime::StableCoexistence);
        let points = space.equilibrium_points();
        assert_eq!(points.len(), 1);
        // (200 - 75)/0.75, (150 - 100)/0.75
        assert!((points[0][0] - 500.0 / 3.0).abs() < 1e-9);
        assert!((points[0][1] - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            space.equilibria[0].linearization.stability,
            Stability::StableNode
        );

        let space = phase_space(&params(100.0, 200.0, 1.5, 2.0)).expect("species 2 wins");
        assert_eq!(space.regime, Regime::Species2Wins);
        assert_eq!(space.equilibrium_points(), vec![[0.0, 200.0]]);

        let space = phase_space(&params(200.0, 100.0, 2.0, 1.5)).expect("species 1 wins");
        assert_eq!(space.regime, Regime::Species1Wins);
        assert_eq!(space.equilibrium_points(), vec![[200.0, 0.0]]);
        assert!(space.equilibria[0].linearization.stability.is_attracting());
    }

    #[test]
    fn boundary_ties_resolve_by_decision_order() {
        // K1/α2 = K2 and K1 = K2/α1: all four conditions hold.
        let p = params(100.0, 50.0, 0.5, 2.0);
        for regime in Regime::DECISION_ORDER {
            assert!(regime.matches(&p), "{regime:?} should match at the tie");
        }
        assert_eq!(
            classify_regime(&p).expect("classified"),
            Regime::UnstableCoexistence
        );

        // K2/α1 = K1: both the species-1 and stable-coexistence conditions hold.
        let p = params(100.0, 100.0, 1.0, 0.5);
        assert!(Regime::StableCoexistence.matches(&p));
        assert!(Regime::Species1Wins.matches(&p));
        assert!(!Regime::Species2Wins.matches(&p));
        assert!(!Regime::UnstableCoexistence.matches(&p));
        assert_eq!(
            classify_regime(&p).expect("classified"),
            Regime::StableCoexistence
        );
    }

    #[test]
    fn degenerate_interaction_is_reported() {
        let p = params(100.0, 100.0, 2.0, 0.5);
        assert_eq!(
            interior_fixed_point(&p),
            Err(PhaseSpaceError::DegenerateInteraction {
                alpha1: 2.0,
                alpha2: 0.5
            })
        );
        assert!(matches!(
            phase_space(&p),
            Err(PhaseSpaceError::DegenerateInteraction { .. })
        ));
    }

    #[test]
    fn nan_parameters_are_unclassified() {
        let p = params(f64::NAN, 100.0, 1.0, 1.0);
        assert!(matches!(
            classify_regime(&p),
            Err(PhaseSpaceError::UnclassifiedRegime { .. })
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected_before_analysis() {
        assert_eq!(
            phase_space(&params(100.0, -1.0, 3.0, 3.0)),
            Err(PhaseSpaceError::InvalidParameter {
                name: "k2",
                value: -1.0
            })
        );
        assert!(matches!(
            phase_space(&params(100.0, 100.0, 3.0, f64::INFINITY)),
            Err(PhaseSpaceError::InvalidParameter { name: "alpha2", .. })
        ));
    }

    #[test]
    fn vector_field_uses_meshgrid_layout() {
        let p = params(100.0, 200.0, 1.5, 2.0);
        let space = phase_space(&p).expect("phase space should compute");
        let field = &space.field;

        // max(100, 200/1.5) = 133.3.., max(200, 100/2) = 200
        assert_eq!(field.cols(), 134);
        assert_eq!(field.rows(), 200);
        assert_eq!(field.dn1.len(), 134 * 200);
        assert_eq!(field.n1[133], 133.0);
        assert_eq!(field.n2[199], 199.0);

        let model = CompetitionModel::new(p);
        let mut out = [0.0; 2];
        model.apply(0.0, &[10.0, 30.0], &mut out);
        assert_eq!(field.at(30, 10), Some([10.0, 30.0, out[0], out[1]]));
        assert_eq!(field.at(200, 0), None);

        // Axes are invariant: no flow across N1 = 0 or N2 = 0.
        let [_, _, dn1, _] = field.at(5, 0).expect("node exists");
        assert_eq!(dn1, 0.0);
        let [_, _, _, dn2] = field.at(0, 5).expect("node exists");
        assert_eq!(dn2, 0.0);
    }

    #[test]
    fn annotations_follow_intercepts() {
        let space = phase_space(&CompetitionParams::default()).expect("phase space");
        assert_eq!(space.n1_isocline.from, [100.0, 0.0]);
        assert!((space.n1_isocline.to[1] - 100.0 / 3.0).abs() < 1e-12);
        assert!((space.n2_isocline.from[0] - 100.0 / 3.0).abs() < 1e-12);
        assert_eq!(space.n2_isocline.to, [0.0, 100.0]);
        assert_eq!(space.reference_line.from, [0.0, 0.0]);
        assert_eq!(space.reference_line.to, [100.0, 100.0]);
        assert_eq!(space.label, "K2 ≥ K1/α2, K1 ≥ K2/α1");
    }

    #[test]
    fn oversized_fields_are_rejected_before_sampling() {
        assert!(matches!(
            phase_space(&params(1e12, 100.0, 3.0, 3.0)),
            Err(PhaseSpaceError::FieldTooLarge { limit: MAX_FIELD_NODES, .. })
        ));
        // K2/α1 = 1e11 stretches the N1 axis.
        assert!(matches!(
            phase_space(&params(100.0, 100.0, 1e-9, 3.0)),
            Err(PhaseSpaceError::FieldTooLarge { .. })
        ));

        // 2000 x 2000 sits exactly on the limit.
        let model = CompetitionModel::new(params(2000.0, 2000.0, 3.0, 3.0));
        let field = VectorField::sample(&model).expect("field at the limit");
        assert_eq!(field.rows() * field.cols(), MAX_FIELD_NODES);

        let model = CompetitionModel::new(params(2001.0, 2000.0, 3.0, 3.0));
        let err = VectorField::sample(&model).expect_err("field over the limit");
        assert!(err.to_string().contains("exceeds the limit of 4000000"));
    }

    #[test]
    fn unit_axis_excludes_upper_bound() {
        assert_eq!(unit_axis(3.0), vec![0.0, 1.0, 2.0]);
        assert_eq!(unit_axis(2.5), vec![0.0, 1.0, 2.0]);
        assert!(unit_axis(0.0).is_empty());
    }
}
