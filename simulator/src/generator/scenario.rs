use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sweepcore::scene::{MotionConfig, RasterConfig, Target};
use sweepcore::{SensorGeometry, SweepSimulation};

/// One explicitly placed target. Velocity defaults to stationary and the
/// radius to the motion config's target radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub dx: f32,
    #[serde(default)]
    pub dy: f32,
    #[serde(default)]
    pub radius: Option<f32>,
}

/// Named, hand-placed target set replacing the random initial placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub description: Option<String>,
    pub targets: Vec<TargetSpec>,
}

impl ScenarioConfig {
    /// Single stationary target in the middle of the field.
    #[cfg(test)]
    pub fn centered(geometry: &SensorGeometry, radius: f32) -> Self {
        let (x, y) = geometry.center();
        Self {
            name: "centered".into(),
            description: Some("stationary target at the sensor center".into()),
            targets: vec![TargetSpec {
                x,
                y,
                dx: 0.0,
                dy: 0.0,
                radius: Some(radius),
            }],
        }
    }

    pub fn build_targets(&self, motion: &MotionConfig) -> anyhow::Result<Vec<Target>> {
        self.targets
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let radius = spec.radius.unwrap_or(motion.target_radius);
                Target::new(spec.x, spec.y, spec.dx, spec.dy, radius)
                    .with_context(|| format!("target #{} of scenario '{}'", index, self.name))
            })
            .collect()
    }
}

pub fn build_simulation<R: Rng + ?Sized>(
    rng: &mut R,
    geometry: SensorGeometry,
    motion: MotionConfig,
    raster: RasterConfig,
    scenario: Option<&ScenarioConfig>,
) -> anyhow::Result<SweepSimulation> {
    match scenario {
        Some(scenario) if !scenario.targets.is_empty() => {
            let targets = scenario.build_targets(&motion)?;
            log::info!(
                "scenario '{}' with {} fixed target(s)",
                scenario.name,
                targets.len()
            );
            SweepSimulation::with_targets(geometry, motion, raster, targets)
                .context("building fixed-target simulation")
        }
        _ => SweepSimulation::random(rng, geometry, motion, raster)
            .context("building random-target simulation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn centered_scenario_places_one_stationary_target() {
        let geometry = SensorGeometry::default();
        let scenario = ScenarioConfig::centered(&geometry, 3.0);
        let targets = scenario.build_targets(&MotionConfig::default()).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!((targets[0].x, targets[0].y), (200.0, 200.0));
        assert_eq!(targets[0].speed(), 0.0);
    }

    #[test]
    fn missing_radius_falls_back_to_motion_config() {
        let scenario = ScenarioConfig {
            name: "defaults".into(),
            targets: vec![TargetSpec {
                x: 10.0,
                y: 20.0,
                dx: 0.5,
                dy: 0.0,
                radius: None,
            }],
            ..Default::default()
        };
        let motion = MotionConfig {
            target_radius: 4.5,
            ..Default::default()
        };
        let targets = scenario.build_targets(&motion).unwrap();
        assert_eq!(targets[0].radius, 4.5);
    }

    #[test]
    fn invalid_target_reports_its_index() {
        let scenario = ScenarioConfig {
            name: "broken".into(),
            targets: vec![
                TargetSpec {
                    x: 1.0,
                    y: 1.0,
                    dx: 0.0,
                    dy: 0.0,
                    radius: None,
                },
                TargetSpec {
                    x: 1.0,
                    y: 1.0,
                    dx: 0.0,
                    dy: 0.0,
                    radius: Some(-2.0),
                },
            ],
            ..Default::default()
        };
        let err = scenario.build_targets(&MotionConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("target #1 of scenario 'broken'"));
    }

    #[test]
    fn empty_scenario_uses_random_targets() {
        let mut rng = StdRng::seed_from_u64(8);
        let sim = build_simulation(
            &mut rng,
            SensorGeometry::default(),
            MotionConfig::default(),
            RasterConfig::default(),
            Some(&ScenarioConfig::default()),
        )
        .unwrap();
        assert_eq!(sim.targets().len(), 5);
    }
}
