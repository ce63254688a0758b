use crate::math::stats::StatsHelper;
use crate::prelude::{FrameOptions, ProcessingStage, SensorGeometry};
use crate::scene::raster::RasterBuffer;
use crate::telemetry::log::LogManager;
use crate::vision::blob::{Blob, BlobDetector, Detections};
use crate::vision::blur::BoxBlurStage;
use crate::vision::grayscale::{GrayImage, GrayscaleStage};
use crate::vision::threshold::{empty_map, BinaryMap, ThresholdStage};

/// Everything the vision chain derived from one raw frame.
#[derive(Debug, Clone)]
pub struct VisionFrame {
    pub gray: GrayImage,
    pub blurred: Option<GrayImage>,
    pub binary: BinaryMap,
    pub detections: Detections,
    /// Intensity level used for the binary map, if thresholding ran.
    pub threshold_level: Option<f32>,
    pub mean_intensity: f32,
    /// Names of the stages that ran, in execution order.
    pub stages: Vec<&'static str>,
}

impl VisionFrame {
    /// The buffer fed to thresholding: blurred when blur ran, gray otherwise.
    pub fn filtered(&self) -> &GrayImage {
        self.blurred.as_ref().unwrap_or(&self.gray)
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.detections.accepted
    }

    pub fn detection_count(&self) -> usize {
        self.detections.count()
    }
}

/// Grayscale, optional blur, optional threshold and blob detection, in
/// that order, recomputed from scratch for every frame.
pub struct VisionPipeline {
    geometry: SensorGeometry,
    logger: LogManager,
}

impl VisionPipeline {
    pub fn new(geometry: SensorGeometry) -> Self {
        Self {
            geometry,
            logger: LogManager::new("vision"),
        }
    }

    pub fn geometry(&self) -> &SensorGeometry {
        &self.geometry
    }

    fn run<S: ProcessingStage>(
        &self,
        stage: &mut S,
        input: &S::Input,
        trace: &mut Vec<&'static str>,
    ) -> S::Output {
        let output = stage.execute(input);
        self.logger.record(&format!("stage {} complete", stage.name()));
        trace.push(stage.name());
        output
    }

    pub fn process(&mut self, raw: &RasterBuffer, options: &FrameOptions) -> VisionFrame {
        assert_eq!(
            (raw.width(), raw.height()),
            (self.geometry.width, self.geometry.height),
            "raw frame does not match sensor geometry"
        );
        let options = options.clamped();

        let mut stages = Vec::with_capacity(4);
        let gray = self.run(&mut GrayscaleStage, raw, &mut stages);
        let mean_intensity =
            StatsHelper::mean_intensity(gray.as_slice().unwrap_or_default());
        let blurred = options
            .use_blur
            .then(|| self.run(&mut BoxBlurStage, &gray, &mut stages));
        let filtered = blurred.as_ref().unwrap_or(&gray);

        let (binary, threshold_level) = if options.use_threshold {
            let mut stage = ThresholdStage::new(self.geometry, options.threshold_percent);
            let binary = self.run(&mut stage, filtered, &mut stages);
            (binary, Some(stage.level()))
        } else {
            (empty_map(&self.geometry), None)
        };

        let detections = if options.detection_enabled() {
            let mut detector = BlobDetector::for_blur(options.use_blur);
            self.run(&mut detector, &binary, &mut stages)
        } else {
            Detections::default()
        };

        self.logger.record(&format!(
            "mean {:.2} threshold {:?} detections {} rejected {}",
            mean_intensity,
            threshold_level,
            detections.count(),
            detections.rejected
        ));

        VisionFrame {
            gray,
            blurred,
            binary,
            detections,
            threshold_level,
            mean_intensity,
            stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::disc_pixels;

    fn frame_with_disc(geometry: &SensorGeometry, cx: f32, cy: f32, radius: f32) -> RasterBuffer {
        let mut raster = RasterBuffer::new(geometry);
        for (x, y) in disc_pixels(cx, cy, radius, geometry.width, geometry.height) {
            raster.set_rgb(x, y, [255, 255, 255]);
        }
        raster
    }

    #[test]
    fn disabled_threshold_clears_map_and_detections() {
        let geometry = SensorGeometry::default();
        let raw = frame_with_disc(&geometry, 150.0, 150.0, 4.0);
        let options = FrameOptions {
            use_threshold: false,
            ..Default::default()
        };

        let frame = VisionPipeline::new(geometry).process(&raw, &options);
        assert!(frame.binary.iter().all(|&f| !f));
        assert_eq!(frame.detection_count(), 0);
        assert!(frame.threshold_level.is_none());
    }

    #[test]
    fn disabled_detection_still_produces_binary_map() {
        let geometry = SensorGeometry::default();
        let raw = frame_with_disc(&geometry, 150.0, 150.0, 4.0);
        let options = FrameOptions {
            use_detection: false,
            use_blur: false,
            ..Default::default()
        };

        let frame = VisionPipeline::new(geometry).process(&raw, &options);
        assert!(frame.blurred.is_none());
        assert_eq!(frame.binary.iter().filter(|&&f| f).count(), 49);
        assert_eq!(frame.detection_count(), 0);
    }

    #[test]
    fn unblurred_disc_is_detected_at_full_size() {
        let geometry = SensorGeometry::default();
        let raw = frame_with_disc(&geometry, 120.0, 260.0, 3.0);
        let options = FrameOptions {
            use_blur: false,
            threshold_percent: 50,
            ..Default::default()
        };

        let frame = VisionPipeline::new(geometry).process(&raw, &options);
        assert_eq!(frame.detection_count(), 1);
        let blob = frame.blobs()[0];
        assert_eq!(blob.area, 29);
        assert_eq!(blob.center(), (120.0, 260.0));
    }

    #[test]
    fn stages_run_in_dependency_order() {
        let geometry = SensorGeometry::default();
        let raw = frame_with_disc(&geometry, 150.0, 150.0, 4.0);
        let mut pipeline = VisionPipeline::new(geometry);

        let full = pipeline.process(&raw, &FrameOptions::default());
        assert_eq!(
            full.stages,
            vec!["grayscale", "box-blur", "threshold", "blob-detector"]
        );

        let unthresholded = pipeline.process(
            &raw,
            &FrameOptions {
                use_threshold: false,
                ..Default::default()
            },
        );
        assert_eq!(unthresholded.stages, vec!["grayscale", "box-blur"]);

        let undetected = pipeline.process(
            &raw,
            &FrameOptions {
                use_blur: false,
                use_detection: false,
                ..Default::default()
            },
        );
        assert_eq!(undetected.stages, vec!["grayscale", "threshold"]);
    }

    #[test]
    fn luma_just_below_threshold_is_not_detected() {
        // luma 165.63 truncates to 165, under the 65% level of 165.75
        let geometry = SensorGeometry::default();
        let mut raw = RasterBuffer::new(&geometry);
        for y in 150..157 {
            for x in 150..157 {
                raw.set_rgb(x, y, [0, 255, 138]);
            }
        }
        let options = FrameOptions {
            use_blur: false,
            threshold_percent: 65,
            ..Default::default()
        };

        let frame = VisionPipeline::new(geometry).process(&raw, &options);
        assert_eq!(frame.gray[[153, 153]], 165);
        assert!(frame.binary.iter().all(|&f| !f));
        assert_eq!(frame.detection_count(), 0);
    }

    #[test]
    fn filtered_buffer_follows_blur_toggle() {
        let geometry = SensorGeometry::new(20, 20, 8.0).unwrap();
        let raw = frame_with_disc(&geometry, 10.0, 10.0, 1.0);
        let mut pipeline = VisionPipeline::new(geometry);

        let blurred = pipeline.process(&raw, &FrameOptions::default());
        assert_eq!(blurred.filtered(), blurred.blurred.as_ref().unwrap());

        let plain = pipeline.process(
            &raw,
            &FrameOptions {
                use_blur: false,
                ..Default::default()
            },
        );
        assert_eq!(plain.filtered(), &plain.gray);
    }
}
