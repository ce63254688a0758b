use std::f32::consts::TAU;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::geometry::polar_to_cartesian;
use crate::prelude::{CoreError, CoreResult, SensorGeometry};

/// Motion parameters shared by every target in the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub target_count: usize,
    pub target_radius: f32,
    pub min_speed: f32,
    pub speed_range: f32,
    /// Distance past the field edge at which a target is recycled.
    pub exit_margin: f32,
    /// Distance outside the field edge where recycled targets re-enter.
    pub entry_pad: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            target_count: 5,
            target_radius: 3.0,
            min_speed: 0.3,
            speed_range: 0.5,
            exit_margin: 50.0,
            entry_pad: 20.0,
        }
    }
}

/// A point target moving at constant velocity between resets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
}

impl Target {
    pub fn new(x: f32, y: f32, dx: f32, dy: f32, radius: f32) -> CoreResult<Self> {
        let finite = [x, y, dx, dy, radius].iter().all(|v| v.is_finite());
        if !finite || radius <= 0.0 {
            return Err(CoreError::InvalidTarget(format!(
                "position ({x}, {y}) velocity ({dx}, {dy}) radius {radius}"
            )));
        }
        Ok(Self {
            x,
            y,
            dx,
            dy,
            radius,
        })
    }

    /// Spawns at a uniformly random in-bounds position.
    pub fn spawn_inside<R: Rng + ?Sized>(
        rng: &mut R,
        geometry: &SensorGeometry,
        config: &MotionConfig,
    ) -> Self {
        let (dx, dy) = draw_velocity(rng, config);
        Self {
            x: rng.gen::<f32>() * geometry.width as f32,
            y: rng.gen::<f32>() * geometry.height as f32,
            dx,
            dy,
            radius: config.target_radius,
        }
    }

    pub fn speed(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    pub fn step(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }

    pub fn is_outside(&self, geometry: &SensorGeometry, margin: f32) -> bool {
        self.x < -margin
            || self.x > geometry.width as f32 + margin
            || self.y < -margin
            || self.y > geometry.height as f32 + margin
    }

    /// Redraws velocity and places the target just outside the edge it must
    /// cross to travel inward along its dominant axis.
    pub fn reenter<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        geometry: &SensorGeometry,
        config: &MotionConfig,
    ) {
        let (dx, dy) = draw_velocity(rng, config);
        self.dx = dx;
        self.dy = dy;

        let width = geometry.width as f32;
        let height = geometry.height as f32;
        if dx.abs() > dy.abs() {
            self.x = if dx > 0.0 {
                -config.entry_pad
            } else {
                width + config.entry_pad
            };
            self.y = rng.gen::<f32>() * height;
        } else {
            self.x = rng.gen::<f32>() * width;
            self.y = if dy > 0.0 {
                -config.entry_pad
            } else {
                height + config.entry_pad
            };
        }
    }
}

fn draw_velocity<R: Rng + ?Sized>(rng: &mut R, config: &MotionConfig) -> (f32, f32) {
    let speed = config.min_speed + rng.gen::<f32>() * config.speed_range;
    let heading = rng.gen::<f32>() * TAU;
    polar_to_cartesian(speed, heading)
}

/// Owns the target set and integrates it one fixed step per tick.
#[derive(Debug, Clone)]
pub struct MotionModel {
    geometry: SensorGeometry,
    config: MotionConfig,
    targets: Vec<Target>,
}

impl MotionModel {
    /// Model seeded with `config.target_count` randomly placed targets.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        geometry: SensorGeometry,
        config: MotionConfig,
    ) -> Self {
        let targets = (0..config.target_count)
            .map(|_| Target::spawn_inside(rng, &geometry, &config))
            .collect();
        Self {
            geometry,
            config,
            targets,
        }
    }

    pub fn with_targets(geometry: SensorGeometry, config: MotionConfig, targets: Vec<Target>) -> Self {
        Self {
            geometry,
            config,
            targets,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn geometry(&self) -> &SensorGeometry {
        &self.geometry
    }

    /// Advances every target by one step, recycling those that left the
    /// field. Returns the number of resets performed.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut resets = 0;
        for target in &mut self.targets {
            target.step();
            if target.is_outside(&self.geometry, self.config.exit_margin) {
                target.reenter(rng, &self.geometry, &self.config);
                resets += 1;
            }
        }
        if resets > 0 {
            debug!("motion: {} target(s) re-entered the field", resets);
        }
        resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field() -> SensorGeometry {
        SensorGeometry::default()
    }

    #[test]
    fn random_model_starts_in_bounds_with_bounded_speed() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = MotionConfig::default();
        let model = MotionModel::random(&mut rng, field(), config);

        assert_eq!(model.targets().len(), 5);
        for target in model.targets() {
            assert!((0.0..400.0).contains(&target.x));
            assert!((0.0..400.0).contains(&target.y));
            let speed = target.speed();
            assert!(speed >= 0.3 - 1e-5 && speed <= 0.8 + 1e-5, "speed {speed}");
        }
    }

    #[test]
    fn target_rejects_non_positive_radius() {
        assert!(Target::new(0.0, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(Target::new(f32::NAN, 0.0, 0.0, 0.0, 1.0).is_err());
        assert!(Target::new(10.0, 10.0, 0.0, 0.0, 3.0).is_ok());
    }

    #[test]
    fn stationary_target_never_resets() {
        let mut rng = StdRng::seed_from_u64(1);
        let target = Target::new(200.0, 200.0, 0.0, 0.0, 3.0).unwrap();
        let mut model = MotionModel::with_targets(field(), MotionConfig::default(), vec![target]);
        for _ in 0..100 {
            assert_eq!(model.advance(&mut rng), 0);
        }
        assert_eq!(model.targets()[0], target);
    }

    #[test]
    fn reset_triggers_exactly_when_margin_is_crossed() {
        let mut rng = StdRng::seed_from_u64(3);
        let target = Target::new(449.5, 100.0, 0.4, 0.0, 3.0).unwrap();
        let mut model = MotionModel::with_targets(field(), MotionConfig::default(), vec![target]);

        // 449.9 is still inside the margin
        assert_eq!(model.advance(&mut rng), 0);
        assert!((model.targets()[0].x - 449.9).abs() < 1e-3);

        assert_eq!(model.advance(&mut rng), 1);
        let recycled = model.targets()[0];
        assert!(!recycled.is_outside(&field(), 50.0));
    }

    #[test]
    fn recycled_targets_reenter_moving_inward() {
        let mut rng = StdRng::seed_from_u64(42);
        let geometry = field();
        let config = MotionConfig::default();
        let mut target = Target::new(0.0, 0.0, 0.0, 0.0, 3.0).unwrap();

        for _ in 0..500 {
            target.reenter(&mut rng, &geometry, &config);
            let speed = target.speed();
            assert!(speed >= 0.3 - 1e-5 && speed <= 0.8 + 1e-5);

            if target.dx.abs() > target.dy.abs() {
                if target.dx > 0.0 {
                    assert_eq!(target.x, -20.0);
                } else {
                    assert_eq!(target.x, 420.0);
                }
                assert!((0.0..400.0).contains(&target.y));
            } else {
                if target.dy > 0.0 {
                    assert_eq!(target.y, -20.0);
                } else {
                    assert_eq!(target.y, 420.0);
                }
                assert!((0.0..400.0).contains(&target.x));
            }
        }
    }

    #[test]
    fn targets_stay_within_margin_over_long_runs() {
        let mut rng = StdRng::seed_from_u64(11);
        let geometry = field();
        let mut model = MotionModel::random(&mut rng, geometry, MotionConfig::default());
        let mut total_resets = 0;

        for _ in 0..5_000 {
            total_resets += model.advance(&mut rng);
            for target in model.targets() {
                assert!(!target.is_outside(&geometry, 50.0));
            }
        }
        assert!(total_resets > 0);
    }
}
