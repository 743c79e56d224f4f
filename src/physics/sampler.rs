//! Adaptive-step orbit sampling
//!
//! The sampler advances a [`ThreeBodySystem`] with a time-reversible
//! integrator and watches the projected point rather than the physical state.
//! Step size is controlled by how far that point moves per raw step:
//!
//! - a step that moves it more than `reject_threshold` is undone by stepping
//!   back with `-dt`, and retried at half the step size
//! - a step that moves it less than `grow_threshold` is kept and the next step
//!   is doubled
//!
//! Accepted states are decimated into polyline vertices: a vertex is emitted
//! once the point has moved `emit_threshold` away from the previous vertex, or
//! `keepalive_threshold` away on every `keepalive_period`-th step. Sampling
//! stops as soon as the requested number of vertices has been emitted.

use crate::config::SamplerConfig;
use crate::physics::aabb3d::Aabb3d;
use crate::physics::body::{BODY_COUNT, ThreeBodySystem};
use crate::physics::error::OrbitError;
use crate::physics::generator::CancellationToken;
use crate::physics::gravity::GravitySolver;
use crate::physics::integrators::Integrator;
use crate::physics::math::{DisplayVector, Scalar, Vector};
use crate::physics::projection::Projection;
use crate::utils::color::{ColorMode, speed_color};
use bevy::log::{debug, warn};
use std::time::{Duration, Instant};

/// Counters collected while sampling one orbit
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplerStats {
    /// Accepted raw integration steps
    pub steps: u64,
    /// Steps that were rolled back and retried at half the step size
    pub rejections: u64,
    /// Steps accepted only because the rejection cap was reached
    pub forced_acceptances: u64,
    pub final_step: Scalar,
    pub elapsed: Duration,
}

/// A sampled orbit: a polyline in visualization space with per-vertex colors
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    pub points: Vec<DisplayVector>,
    pub colors: Vec<DisplayVector>,
    pub line_color: DisplayVector,
    /// Bounds of the emitted vertices, in full precision
    pub bounds: Aabb3d,
    pub stats: SamplerStats,
}

impl Orbit {
    fn with_capacity(capacity: usize, line_color: DisplayVector) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
            line_color,
            bounds: Aabb3d::EMPTY,
            stats: SamplerStats::default(),
        }
    }

    fn push(&mut self, point: Vector, color: DisplayVector) {
        self.bounds.extend(point);
        self.points.push(point.as_vec3());
        self.colors.push(color);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Componentwise minimum over all vertices, or zero for an empty orbit
    pub fn min_corner(&self) -> DisplayVector {
        if self.bounds.is_empty() {
            DisplayVector::ZERO
        } else {
            self.bounds.min.as_vec3()
        }
    }

    /// Componentwise maximum over all vertices, or zero for an empty orbit
    pub fn max_corner(&self) -> DisplayVector {
        if self.bounds.is_empty() {
            DisplayVector::ZERO
        } else {
            self.bounds.max.as_vec3()
        }
    }
}

/// Turns an initial system into an [`Orbit`] under a fixed projection.
///
/// The sampler only borrows the projection and integrator, so one instance
/// can be shared by every worker computing lines of the same batch.
pub struct OrbitSampler<'a> {
    projection: &'a Projection,
    integrator: &'a dyn Integrator,
    solver: GravitySolver,
    config: SamplerConfig,
    color_mode: ColorMode,
    colored_body: usize,
    speed_reference: Scalar,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> OrbitSampler<'a> {
    pub fn new(projection: &'a Projection, integrator: &'a dyn Integrator) -> Self {
        Self {
            projection,
            integrator,
            solver: GravitySolver::default(),
            config: SamplerConfig::default(),
            color_mode: ColorMode::Line,
            colored_body: 0,
            speed_reference: 1.0,
            cancel: None,
        }
    }

    pub fn with_config(mut self, config: SamplerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_solver(mut self, solver: GravitySolver) -> Self {
        self.solver = solver;
        self
    }

    /// Selects how vertex colors are derived. Body indices wrap modulo three.
    pub fn with_color_mode(
        mut self,
        color_mode: ColorMode,
        colored_body: usize,
        speed_reference: Scalar,
    ) -> Self {
        self.color_mode = color_mode;
        self.colored_body = colored_body % BODY_COUNT;
        self.speed_reference = speed_reference;
        self
    }

    /// Abandons the orbit with [`OrbitError::Cancelled`] once `cancel` trips
    pub fn with_cancellation(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    fn vertex_color(
        &self,
        system: &ThreeBodySystem,
        line_color: DisplayVector,
    ) -> DisplayVector {
        match self.color_mode {
            ColorMode::Line => line_color,
            ColorMode::BodySpeed => speed_color(
                line_color,
                system[self.colored_body].speed(),
                self.speed_reference,
            ),
        }
    }

    /// Integrates `system` until exactly `sample_count` vertices are emitted.
    ///
    /// The system is taken by value; the caller's copy is never touched.
    ///
    /// # Errors
    ///
    /// - [`OrbitError::DegenerateGeometry`] from the solver under the rejecting policy
    /// - [`OrbitError::NonFinite`] if the projected point stops being finite
    /// - [`OrbitError::StepBudgetExhausted`] after `max_steps` accepted steps
    /// - [`OrbitError::Cancelled`] if the cancellation token trips mid-orbit
    pub fn compute_orbit(
        &self,
        mut system: ThreeBodySystem,
        sample_count: usize,
        line_color: DisplayVector,
    ) -> Result<Orbit, OrbitError> {
        let start = Instant::now();
        let config = &self.config;
        let mut orbit = Orbit::with_capacity(sample_count, line_color);

        let mut dt = config.initial_step;
        let mut last_raw = Vector::ZERO;
        let mut last_vertex = Vector::ZERO;
        let mut stats = SamplerStats::default();
        let mut consecutive_rejections = 0u32;

        while orbit.len() < sample_count {
            if self.cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(OrbitError::Cancelled);
            }
            if stats.steps >= config.max_steps {
                return Err(OrbitError::StepBudgetExhausted {
                    steps: stats.steps,
                    emitted: orbit.len(),
                });
            }

            self.integrator.step(&mut system, &self.solver, dt)?;
            let projected = self.projection.phase_space_to_viz_space(&system);
            if !projected.is_finite() {
                return Err(OrbitError::NonFinite { step: stats.steps });
            }

            let raw_distance = projected.distance(last_raw);
            if raw_distance > config.reject_threshold && stats.steps != 0 {
                if consecutive_rejections < config.max_rejections {
                    self.integrator.step(&mut system, &self.solver, -dt)?;
                    dt *= 0.5;
                    consecutive_rejections += 1;
                    stats.rejections += 1;
                    continue;
                }

                stats.forced_acceptances += 1;
                warn!(
                    "Accepting step {} after {} rejections (dt = {:e}, moved {:e})",
                    stats.steps, consecutive_rejections, dt, raw_distance
                );
            } else if raw_distance < config.grow_threshold {
                dt *= 2.0;
                if let Some(max_step) = config.max_step {
                    dt = dt.min(max_step);
                }
            }

            consecutive_rejections = 0;
            last_raw = projected;

            let vertex_distance = projected.distance(last_vertex);
            let keepalive = config.keepalive_period > 0
                && stats.steps % config.keepalive_period == 1
                && vertex_distance > config.keepalive_threshold;
            if vertex_distance > config.emit_threshold || keepalive {
                last_vertex = projected;
                orbit.push(projected, self.vertex_color(&system, line_color));
            }

            stats.steps += 1;
        }

        stats.final_step = dt;
        stats.elapsed = start.elapsed();
        orbit.stats = stats;

        debug!(
            "Orbit stats: {} vertices, {} steps, {} rejections, {} forced, final dt {:e}, {:.2?}",
            orbit.len(),
            stats.steps,
            stats.rejections,
            stats.forced_acceptances,
            stats.final_step,
            stats.elapsed
        );

        Ok(orbit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::Body;
    use crate::physics::gravity::DegeneratePolicy;
    use crate::physics::integrators::{AccelerationField, Pefrl, VelocityVerlet};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Moves body 0 along x by a scripted amount per forward step and undoes
    /// the last move on a backward step. Logs `(dt, x)` after every call.
    struct ScriptedIntegrator {
        moves: Mutex<VecDeque<Scalar>>,
        last_move: Mutex<Scalar>,
        log: Mutex<Vec<(Scalar, Scalar)>>,
    }

    impl ScriptedIntegrator {
        fn new(moves: &[Scalar]) -> Self {
            Self {
                moves: Mutex::new(moves.iter().copied().collect()),
                last_move: Mutex::new(0.0),
                log: Mutex::new(Vec::new()),
            }
        }

        fn log(&self) -> Vec<(Scalar, Scalar)> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Integrator for ScriptedIntegrator {
        fn step(
            &self,
            system: &mut ThreeBodySystem,
            _field: &dyn AccelerationField,
            dt: Scalar,
        ) -> Result<(), OrbitError> {
            let mut last_move = self.last_move.lock().unwrap();
            if dt < 0.0 {
                system[0].position.x -= *last_move;
            } else {
                *last_move = self.moves.lock().unwrap().pop_front().unwrap_or(0.0);
                system[0].position.x += *last_move;
            }
            self.log.lock().unwrap().push((dt, system[0].position.x));
            Ok(())
        }

        fn convergence_order(&self) -> usize {
            2
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    /// Projects body 0's position unchanged and ignores everything else
    fn identity_projection() -> Projection {
        let mut rows = [[0.0; crate::physics::math::PHASE_SPACE_DIMENSIONS]; 3];
        rows[0][0] = 1.0;
        rows[1][1] = 1.0;
        rows[2][2] = 1.0;
        Projection::from_rows(rows)
    }

    fn resting_system() -> ThreeBodySystem {
        ThreeBodySystem::new([Body::new(Vector::ZERO, Vector::ZERO); 3])
    }

    const SMALL: Scalar = 1.0 / 2048.0; // between grow and reject thresholds
    const LARGE: Scalar = 1.0 / 512.0; // above the reject threshold
    const TINY: Scalar = 1.0 / 32768.0; // below the grow threshold

    fn projection(seed: u64) -> Projection {
        Projection::random(&mut ChaCha8Rng::seed_from_u64(seed))
    }

    fn offset_system() -> ThreeBodySystem {
        ThreeBodySystem::new([
            Body::new(Vector::ZERO, Vector::ZERO),
            Body::new(Vector::new(0.03, -1.0, 0.0), Vector::ZERO),
            Body::new(Vector::new(-0.04, 2.0, 0.0), Vector::ZERO),
        ])
    }

    const LINE_COLOR: DisplayVector = DisplayVector::new(0.2, 0.6, 0.9);

    #[test]
    fn test_large_move_is_rolled_back_and_halved() {
        let projection = identity_projection();
        let integrator = ScriptedIntegrator::new(&[SMALL, LARGE, SMALL]);
        let config = SamplerConfig {
            max_steps: 2,
            ..SamplerConfig::default()
        };
        let sampler = OrbitSampler::new(&projection, &integrator).with_config(config);

        let error = sampler
            .compute_orbit(resting_system(), 1, LINE_COLOR)
            .unwrap_err();

        assert_eq!(
            error,
            OrbitError::StepBudgetExhausted {
                steps: 2,
                emitted: 0
            }
        );
        assert_eq!(
            integrator.log(),
            vec![
                (0.01, SMALL),
                (0.01, SMALL + LARGE),
                (-0.01, SMALL),
                (0.005, 2.0 * SMALL),
            ]
        );
    }

    #[test]
    fn test_small_move_doubles_step() {
        let projection = identity_projection();
        let config = SamplerConfig {
            max_steps: 3,
            ..SamplerConfig::default()
        };

        let integrator = ScriptedIntegrator::new(&[TINY, TINY, SMALL]);
        let sampler = OrbitSampler::new(&projection, &integrator).with_config(config.clone());
        sampler
            .compute_orbit(resting_system(), 1, LINE_COLOR)
            .unwrap_err();
        let steps: Vec<Scalar> = integrator.log().iter().map(|&(dt, _)| dt).collect();
        assert_eq!(steps, vec![0.01, 0.02, 0.04]);

        let capped = SamplerConfig {
            max_step: Some(0.015),
            ..config
        };
        let integrator = ScriptedIntegrator::new(&[TINY, TINY, SMALL]);
        let sampler = OrbitSampler::new(&projection, &integrator).with_config(capped);
        sampler
            .compute_orbit(resting_system(), 1, LINE_COLOR)
            .unwrap_err();
        let steps: Vec<Scalar> = integrator.log().iter().map(|&(dt, _)| dt).collect();
        assert_eq!(steps, vec![0.01, 0.015, 0.015]);
    }

    #[test]
    fn test_first_step_is_never_rejected() {
        let projection = identity_projection();
        let integrator = ScriptedIntegrator::new(&[0.5]);
        let sampler = OrbitSampler::new(&projection, &integrator);

        let orbit = sampler.compute_orbit(resting_system(), 1, LINE_COLOR).unwrap();

        assert_eq!(orbit.points, vec![DisplayVector::new(0.5, 0.0, 0.0)]);
        assert_eq!(orbit.stats.steps, 1);
        assert_eq!(orbit.stats.rejections, 0);
        assert_eq!(integrator.log(), vec![(0.01, 0.5)]);
    }

    #[test]
    fn test_keepalive_vertices_only_on_period_steps() {
        let projection = identity_projection();
        let step = 1.0 / 64.0; // between keep-alive and emit thresholds
        let integrator = ScriptedIntegrator::new(&[step, 0.0, step]);
        let config = SamplerConfig {
            reject_threshold: 1.0,
            grow_threshold: 0.0,
            max_steps: 500,
            ..SamplerConfig::default()
        };
        let sampler = OrbitSampler::new(&projection, &integrator).with_config(config);

        let orbit = sampler.compute_orbit(resting_system(), 2, LINE_COLOR).unwrap();

        // Emitted on step indices 1 and 101, not on 0 or 2 where the point moved
        assert_eq!(
            orbit.points,
            vec![
                DisplayVector::new(step as f32, 0.0, 0.0),
                DisplayVector::new(2.0 * step as f32, 0.0, 0.0),
            ]
        );
        assert_eq!(orbit.stats.steps, 102);
        assert_eq!(orbit.stats.rejections, 0);
    }

    #[test]
    fn test_cancelled_token_stops_orbit() {
        let projection = projection(12);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet).with_cancellation(&cancel);

        let error = sampler
            .compute_orbit(offset_system(), 10, LINE_COLOR)
            .unwrap_err();

        assert_eq!(error, OrbitError::Cancelled);
    }

    #[test]
    fn test_zero_samples_does_not_step() {
        let projection = projection(1);
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet);

        let orbit = sampler.compute_orbit(offset_system(), 0, LINE_COLOR).unwrap();

        assert!(orbit.is_empty());
        assert!(orbit.colors.is_empty());
        assert_eq!(orbit.stats.steps, 0);
        assert_eq!(orbit.min_corner(), DisplayVector::ZERO);
        assert_eq!(orbit.max_corner(), DisplayVector::ZERO);
    }

    #[test]
    fn test_emits_exact_sample_count() {
        let projection = projection(2);
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet);

        let orbit = sampler.compute_orbit(offset_system(), 300, LINE_COLOR).unwrap();

        assert_eq!(orbit.points.len(), 300);
        assert_eq!(orbit.colors.len(), 300);
        assert!(orbit.colors.iter().all(|&c| c == LINE_COLOR));
        assert!(orbit.points.iter().all(|p| p.is_finite()));
        assert!(orbit.stats.steps >= 300);
    }

    #[test]
    fn test_bounds_contain_every_vertex() {
        let projection = projection(3);
        let sampler = OrbitSampler::new(&projection, &Pefrl);

        let orbit = sampler.compute_orbit(offset_system(), 200, LINE_COLOR).unwrap();
        let min = orbit.min_corner();
        let max = orbit.max_corner();

        assert!(min.cmple(max).all());
        for point in &orbit.points {
            assert!(point.cmpge(min).all() && point.cmple(max).all());
        }
    }

    #[test]
    fn test_consecutive_vertices_are_spaced() {
        let projection = projection(4);
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet);
        let keepalive = sampler.config().keepalive_threshold as f32;

        let orbit = sampler.compute_orbit(offset_system(), 200, LINE_COLOR).unwrap();

        for pair in orbit.points.windows(2) {
            // Vertices are stored in single precision
            assert!(pair[0].distance(pair[1]) > keepalive * 0.999);
        }
    }

    #[test]
    fn test_adaptive_step_rejects_and_grows() {
        let projection = projection(5);
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet);

        let orbit = sampler.compute_orbit(offset_system(), 500, LINE_COLOR).unwrap();

        assert!(orbit.stats.rejections > 0);
        assert_eq!(orbit.stats.forced_acceptances, 0);
        assert!(orbit.stats.final_step > 0.0);
    }

    #[test]
    fn test_rejection_cap_forces_acceptance() {
        let projection = projection(6);
        let config = SamplerConfig {
            reject_threshold: 1e-5,
            grow_threshold: 1e-6,
            max_rejections: 0,
            ..SamplerConfig::default()
        };
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet).with_config(config);

        let orbit = sampler.compute_orbit(offset_system(), 20, LINE_COLOR).unwrap();

        assert_eq!(orbit.len(), 20);
        assert_eq!(orbit.stats.rejections, 0);
        assert!(orbit.stats.forced_acceptances > 0);
    }

    #[test]
    fn test_max_step_caps_growth() {
        let projection = projection(7);
        let config = SamplerConfig {
            max_step: Some(0.02),
            ..SamplerConfig::default()
        };
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet).with_config(config);

        let orbit = sampler.compute_orbit(offset_system(), 100, LINE_COLOR).unwrap();

        assert!(orbit.stats.final_step <= 0.02);
    }

    #[test]
    fn test_step_budget_exhaustion() {
        let projection = projection(8);
        let config = SamplerConfig {
            max_steps: 10,
            ..SamplerConfig::default()
        };
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet).with_config(config);

        let error = sampler
            .compute_orbit(offset_system(), 1_000, LINE_COLOR)
            .unwrap_err();

        match error {
            OrbitError::StepBudgetExhausted { steps, emitted } => {
                assert_eq!(steps, 10);
                assert!(emitted < 1_000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejecting_policy_reports_near_collision() {
        let projection = projection(9);
        let system = ThreeBodySystem::new([
            Body::new(Vector::ZERO, Vector::ZERO),
            Body::new(Vector::new(1e-6, 0.0, 0.0), Vector::ZERO),
            Body::new(Vector::new(0.0, 1.0, 0.0), Vector::ZERO),
        ]);
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet)
            .with_solver(GravitySolver::new(1e-3, DegeneratePolicy::Reject));

        let error = sampler.compute_orbit(system, 10, LINE_COLOR).unwrap_err();

        assert!(matches!(
            error,
            OrbitError::DegenerateGeometry { bodies: (0, 1), .. }
        ));
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let projection = projection(10);
        let sampler = OrbitSampler::new(&projection, &Pefrl);

        let a = sampler.compute_orbit(offset_system(), 150, LINE_COLOR).unwrap();
        let b = sampler.compute_orbit(offset_system(), 150, LINE_COLOR).unwrap();

        assert_eq!(a.points, b.points);
        assert_eq!(a.stats.steps, b.stats.steps);
    }

    #[test]
    fn test_body_speed_coloring() {
        let projection = projection(11);
        let sampler = OrbitSampler::new(&projection, &VelocityVerlet).with_color_mode(
            ColorMode::BodySpeed,
            4,
            1.0,
        );

        let orbit = sampler.compute_orbit(offset_system(), 100, LINE_COLOR).unwrap();

        assert_eq!(orbit.colors.len(), orbit.points.len());
        for color in &orbit.colors {
            assert!(color.cmple(LINE_COLOR).all());
        }
        assert!(orbit.colors.iter().any(|&c| c != orbit.colors[0]));
    }
}
