//! Motion sampling
//!
//! Turns a raw input source into this tick's contact points (game-space) and
//! feeds the rendering trail. Pointer mode yields one point per tick plus
//! interpolated points along long jumps; camera mode differences two
//! downsampled, mirrored frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Why an input source could not be acquired or read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found")]
    NoDevice,

    #[error("camera acquisition failed: {0}")]
    Acquisition(String),

    #[error("frame buffer has {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
}

/// Input source for a session (switchable only between sessions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputMode {
    #[default]
    #[serde(alias = "MOUSE")]
    Pointer,
    Camera,
}

/// Trail point for rendering only
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSample {
    pub pos: Vec2,
    pub life: f32,
}

/// Decaying gesture trail (oldest first)
#[derive(Debug, Clone, Default)]
pub struct Trail {
    samples: Vec<TrailSample>,
}

impl Trail {
    pub fn push(&mut self, pos: Vec2) {
        if self.samples.len() >= MAX_TRAIL {
            self.samples.remove(0);
        }
        self.samples.push(TrailSample {
            pos,
            life: TRAIL_LIFE,
        });
    }

    /// Age every sample by one tick and drop the dead ones
    pub fn decay(&mut self) {
        for sample in &mut self.samples {
            sample.life -= TRAIL_DECAY;
        }
        self.samples.retain(|s| s.life > 0.0);
    }

    pub fn samples(&self) -> &[TrailSample] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// A downsampled RGBA camera frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl Frame {
    /// Wrap an already downsampled and mirrored RGBA buffer
    pub fn from_rgba(width: usize, height: usize, rgba: Vec<u8>) -> Result<Self, InputError> {
        let expected = width * height * 4;
        if rgba.len() != expected {
            return Err(InputError::FrameSize {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self { width, height, rgba })
    }

    /// Nearest-neighbour downsample of a full-size RGBA image to the sampler
    /// resolution, mirrored horizontally
    pub fn downsample_mirrored(
        src_width: usize,
        src_height: usize,
        src_rgba: &[u8],
    ) -> Result<Self, InputError> {
        let expected = src_width * src_height * 4;
        if src_rgba.len() != expected {
            return Err(InputError::FrameSize {
                expected,
                actual: src_rgba.len(),
            });
        }
        let (width, height) = sample_resolution();
        let mut rgba = vec![0u8; width * height * 4];
        if src_width == 0 || src_height == 0 {
            return Ok(Self { width, height, rgba });
        }
        for y in 0..height {
            let sy = y * src_height / height;
            for x in 0..width {
                let sx = (width - 1 - x) * src_width / width;
                let src = (sy * src_width + sx) * 4;
                let dst = (y * width + x) * 4;
                rgba[dst..dst + 4].copy_from_slice(&src_rgba[src..src + 4]);
            }
        }
        Ok(Self { width, height, rgba })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    fn same_shape(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Downsampled frame size used by the camera sampler
pub fn sample_resolution() -> (usize, usize) {
    (
        (FIELD_WIDTH * CAMERA_DOWNSAMPLE) as usize,
        (FIELD_HEIGHT * CAMERA_DOWNSAMPLE) as usize,
    )
}

/// Summed per-channel threshold for a sensitivity slider value.
/// Out-of-range values are pulled back onto the slider.
pub fn motion_threshold(sensitivity: u32) -> u32 {
    sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY) * 3
}

/// Pointer/touch sampler
#[derive(Debug, Clone, Default)]
pub struct PointerSampler {
    current: Option<Vec2>,
    previous: Option<Vec2>,
}

impl PointerSampler {
    /// Record the latest pointer position, already in game-space
    pub fn set_position(&mut self, pos: Vec2) {
        self.current = Some(pos);
    }

    pub fn position(&self) -> Option<Vec2> {
        self.current
    }

    fn sample(&mut self, contacts: &mut Vec<Vec2>, trail: &mut Trail) {
        let Some(current) = self.current else {
            return;
        };
        contacts.push(current);

        if let Some(previous) = self.previous {
            let delta = current - previous;
            let steps = (delta.length() / POINTER_STEP).floor() as u32;
            for i in 1..steps {
                contacts.push(previous + delta * (i as f32 / steps as f32));
            }
        }

        trail.push(current);
        self.previous = Some(current);
    }
}

/// Camera acquisition state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CameraStatus {
    /// Waiting for the first frame
    #[default]
    Pending,
    /// Frames are flowing
    Ready,
    /// Terminal; requires a user-triggered reload
    Failed(InputError),
}

/// Frame-differencing sampler
#[derive(Debug, Clone)]
pub struct CameraSampler {
    threshold: u32,
    previous: Option<Frame>,
    last_centroid: Option<Vec2>,
    status: CameraStatus,
}

impl CameraSampler {
    pub fn new(sensitivity: u32) -> Self {
        Self {
            threshold: motion_threshold(sensitivity),
            previous: None,
            last_centroid: None,
            status: CameraStatus::Pending,
        }
    }

    pub fn status(&self) -> &CameraStatus {
        &self.status
    }

    pub fn fail(&mut self, err: InputError) {
        log::warn!("Camera unavailable: {}", err);
        self.previous = None;
        self.last_centroid = None;
        self.status = CameraStatus::Failed(err);
    }

    /// Difference `frame` against the previous one. Returns the changed-pixel
    /// count (the motion volume).
    fn sample(&mut self, frame: Option<Frame>, contacts: &mut Vec<Vec2>, trail: &mut Trail) -> u32 {
        if matches!(self.status, CameraStatus::Failed(_)) {
            return 0;
        }
        let Some(frame) = frame else {
            return 0;
        };
        self.status = CameraStatus::Ready;

        let Some(previous) = self.previous.take().filter(|p| p.same_shape(&frame)) else {
            self.previous = Some(frame);
            return 0;
        };

        let scale = Vec2::new(
            FIELD_WIDTH / frame.width as f32,
            FIELD_HEIGHT / frame.height as f32,
        );
        let mut changed: Vec<Vec2> = Vec::new();
        for (i, (cur, prev)) in frame
            .rgba
            .chunks_exact(4)
            .zip(previous.rgba.chunks_exact(4))
            .enumerate()
        {
            let diff: u32 = (0..3).map(|c| cur[c].abs_diff(prev[c]) as u32).sum();
            if diff > self.threshold {
                let x = (i % frame.width) as f32;
                let y = (i / frame.width) as f32;
                changed.push(Vec2::new(x, y) * scale);
            }
        }

        if changed.len() >= MIN_MOTION_CLUSTER {
            let centroid = changed.iter().copied().sum::<Vec2>() / changed.len() as f32;
            if let Some(last) = self.last_centroid
                && centroid.distance_squared(last) > CENTROID_MIN_DIST_SQ
            {
                trail.push(centroid);
            }
            self.last_centroid = Some(centroid);
            contacts.extend_from_slice(&changed);
        } else {
            self.last_centroid = None;
        }

        // Swap buffers: this frame becomes the reference for the next tick
        self.previous = Some(frame);
        changed.len() as u32
    }
}

/// The active input source
#[derive(Debug, Clone)]
pub enum MotionSource {
    Pointer(PointerSampler),
    Camera(CameraSampler),
}

/// Output of one sampling pass
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionSample {
    /// Number of contact points produced
    pub contacts: usize,
    /// Changed-pixel count (camera only)
    pub motion_volume: u32,
}

/// Motion sampler owning the contact buffer and the trail
#[derive(Debug, Clone)]
pub struct MotionSampler {
    source: MotionSource,
    contacts: Vec<Vec2>,
    trail: Trail,
}

impl MotionSampler {
    pub fn new(mode: InputMode, sensitivity: u32) -> Self {
        let source = match mode {
            InputMode::Pointer => MotionSource::Pointer(PointerSampler::default()),
            InputMode::Camera => MotionSource::Camera(CameraSampler::new(sensitivity)),
        };
        Self {
            source,
            contacts: Vec::new(),
            trail: Trail::default(),
        }
    }

    pub fn mode(&self) -> InputMode {
        match self.source {
            MotionSource::Pointer(_) => InputMode::Pointer,
            MotionSource::Camera(_) => InputMode::Camera,
        }
    }

    pub fn source(&self) -> &MotionSource {
        &self.source
    }

    /// Pointer moved (game-space). Ignored in camera mode.
    pub fn pointer_moved(&mut self, pos: Vec2) {
        if let MotionSource::Pointer(p) = &mut self.source {
            p.set_position(pos);
        }
    }

    /// Camera acquisition failed; the sampler yields no contacts from now on
    pub fn camera_failed(&mut self, err: InputError) {
        if let MotionSource::Camera(c) = &mut self.source {
            c.fail(err);
        }
    }

    /// Produce this tick's contact points. `frame` is the latest camera frame,
    /// if one is ready.
    pub fn sample(&mut self, frame: Option<Frame>) -> MotionSample {
        self.contacts.clear();
        let motion_volume = match &mut self.source {
            MotionSource::Pointer(p) => {
                p.sample(&mut self.contacts, &mut self.trail);
                0
            }
            MotionSource::Camera(c) => c.sample(frame, &mut self.contacts, &mut self.trail),
        };
        MotionSample {
            contacts: self.contacts.len(),
            motion_volume,
        }
    }

    /// Contact points from the last `sample` call
    pub fn contacts(&self) -> &[Vec2] {
        &self.contacts
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn trail_mut(&mut self) -> &mut Trail {
        &mut self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_frame(value: u8) -> Frame {
        let (w, h) = sample_resolution();
        Frame::from_rgba(w, h, vec![value; w * h * 4]).unwrap()
    }

    fn frame_with_block(value: u8, x0: usize, y0: usize, size: usize) -> Frame {
        let (w, h) = sample_resolution();
        let mut rgba = vec![0u8; w * h * 4];
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                let i = (y * w + x) * 4;
                rgba[i..i + 3].fill(value);
            }
        }
        Frame::from_rgba(w, h, rgba).unwrap()
    }

    #[test]
    fn test_pointer_single_point_without_history() {
        let mut sampler = MotionSampler::new(InputMode::Pointer, DEFAULT_SENSITIVITY);
        sampler.pointer_moved(Vec2::new(100.0, 100.0));
        let sample = sampler.sample(None);
        assert_eq!(sample.contacts, 1);
        assert_eq!(sampler.contacts()[0], Vec2::new(100.0, 100.0));
        assert_eq!(sampler.trail().samples().len(), 1);
    }

    #[test]
    fn test_pointer_interpolates_long_jumps() {
        let mut sampler = MotionSampler::new(InputMode::Pointer, DEFAULT_SENSITIVITY);
        sampler.pointer_moved(Vec2::new(0.0, 0.0));
        sampler.sample(None);
        sampler.pointer_moved(Vec2::new(200.0, 0.0));
        sampler.sample(None);

        // 200 units / 20 step = 10 steps -> 9 intermediates + current
        let contacts = sampler.contacts();
        assert_eq!(contacts.len(), 10);
        assert_eq!(contacts[0], Vec2::new(200.0, 0.0));
        for pair in contacts[1..].windows(2) {
            assert!(pair[1].x - pair[0].x <= POINTER_STEP + 0.001);
        }
    }

    #[test]
    fn test_pointer_short_move_has_no_intermediates() {
        let mut sampler = MotionSampler::new(InputMode::Pointer, DEFAULT_SENSITIVITY);
        sampler.pointer_moved(Vec2::new(0.0, 0.0));
        sampler.sample(None);
        sampler.pointer_moved(Vec2::new(15.0, 0.0));
        assert_eq!(sampler.sample(None).contacts, 1);
    }

    #[test]
    fn test_pointer_without_position_yields_nothing() {
        let mut sampler = MotionSampler::new(InputMode::Pointer, DEFAULT_SENSITIVITY);
        assert_eq!(sampler.sample(None).contacts, 0);
        assert!(sampler.trail().samples().is_empty());
    }

    #[test]
    fn test_trail_decays_and_expires() {
        let mut trail = Trail::default();
        trail.push(Vec2::ZERO);
        let mut last = trail.samples()[0].life;
        let mut ticks = 0;
        while !trail.samples().is_empty() {
            trail.decay();
            ticks += 1;
            if let Some(s) = trail.samples().first() {
                assert!(s.life < last);
                last = s.life;
            }
            assert!(ticks <= 5, "trail sample outlived its life");
        }
    }

    #[test]
    fn test_camera_first_frame_is_reference_only() {
        let mut sampler = MotionSampler::new(InputMode::Camera, DEFAULT_SENSITIVITY);
        let sample = sampler.sample(Some(flat_frame(0)));
        assert_eq!(sample.contacts, 0);
        assert_eq!(sample.motion_volume, 0);
    }

    #[test]
    fn test_camera_emits_contacts_for_changed_block() {
        let mut sampler = MotionSampler::new(InputMode::Camera, DEFAULT_SENSITIVITY);
        sampler.sample(Some(flat_frame(0)));
        let sample = sampler.sample(Some(frame_with_block(200, 10, 10, 4)));
        assert_eq!(sample.motion_volume, 16);
        assert_eq!(sample.contacts, 16);
        // Scaled back to field space
        let (w, h) = sample_resolution();
        let scale = Vec2::new(FIELD_WIDTH / w as f32, FIELD_HEIGHT / h as f32);
        assert!(sampler.contacts().contains(&(Vec2::new(10.0, 10.0) * scale)));
    }

    #[test]
    fn test_camera_small_cluster_is_ignored() {
        let mut sampler = MotionSampler::new(InputMode::Camera, DEFAULT_SENSITIVITY);
        sampler.sample(Some(flat_frame(0)));
        // 2x2 = 4 changed pixels, below the cluster minimum
        let sample = sampler.sample(Some(frame_with_block(200, 10, 10, 2)));
        assert_eq!(sample.motion_volume, 4);
        assert_eq!(sample.contacts, 0);
        assert!(sampler.trail().samples().is_empty());
    }

    #[test]
    fn test_camera_below_threshold_is_static() {
        let mut sampler = MotionSampler::new(InputMode::Camera, DEFAULT_SENSITIVITY);
        sampler.sample(Some(flat_frame(0)));
        // 3 channels * 25 = 75 is the threshold; 3 * 20 = 60 stays under it
        let sample = sampler.sample(Some(frame_with_block(20, 0, 0, 10)));
        assert_eq!(sample.motion_volume, 0);
    }

    #[test]
    fn test_threshold_clamps_to_slider_range() {
        assert_eq!(motion_threshold(0), 3);
        assert_eq!(motion_threshold(40), 120);
        assert_eq!(motion_threshold(u32::MAX), 300);
    }

    #[test]
    fn test_zero_sensitivity_ignores_sensor_noise() {
        let mut sampler = MotionSampler::new(InputMode::Camera, 0);
        sampler.sample(Some(flat_frame(0)));
        // One level per channel sums to 3, which is not above the floor
        let sample = sampler.sample(Some(flat_frame(1)));
        assert_eq!(sample.motion_volume, 0);
        assert_eq!(sample.contacts, 0);
    }

    #[test]
    fn test_huge_sensitivity_still_sees_motion() {
        let mut sampler = MotionSampler::new(InputMode::Camera, u32::MAX);
        sampler.sample(Some(flat_frame(0)));
        let sample = sampler.sample(Some(frame_with_block(255, 10, 10, 4)));
        assert_eq!(sample.motion_volume, 16);
    }

    #[test]
    fn test_camera_centroid_gates_trail() {
        let mut sampler = MotionSampler::new(InputMode::Camera, DEFAULT_SENSITIVITY);
        sampler.sample(Some(flat_frame(0)));
        // First cluster sets the centroid but lays no trail
        sampler.sample(Some(frame_with_block(200, 10, 10, 4)));
        assert!(sampler.trail().samples().is_empty());
        // Block moves far: differencing sees both the old and new block
        sampler.sample(Some(frame_with_block(200, 40, 40, 4)));
        assert_eq!(sampler.trail().samples().len(), 1);
    }

    #[test]
    fn test_camera_failure_yields_nothing_forever() {
        let mut sampler = MotionSampler::new(InputMode::Camera, DEFAULT_SENSITIVITY);
        sampler.camera_failed(InputError::PermissionDenied);
        sampler.sample(Some(flat_frame(0)));
        let sample = sampler.sample(Some(frame_with_block(200, 10, 10, 8)));
        assert_eq!(sample.contacts, 0);
        match sampler.source() {
            MotionSource::Camera(c) => {
                assert_eq!(c.status(), &CameraStatus::Failed(InputError::PermissionDenied))
            }
            MotionSource::Pointer(_) => panic!("expected camera source"),
        }
    }

    #[test]
    fn test_frame_size_is_validated() {
        let err = Frame::from_rgba(4, 4, vec![0; 10]).unwrap_err();
        assert_eq!(
            err,
            InputError::FrameSize {
                expected: 64,
                actual: 10
            }
        );
    }

    #[test]
    fn test_downsample_mirrors_horizontally() {
        let (w, h) = sample_resolution();
        let src_w = w * 10;
        let src_h = h * 10;
        let mut src = vec![0u8; src_w * src_h * 4];
        // Light up the left-most source column
        for y in 0..src_h {
            let i = y * src_w * 4;
            src[i..i + 3].fill(255);
        }
        let frame = Frame::downsample_mirrored(src_w, src_h, &src).unwrap();
        let right = ((w - 1) * 4) as usize;
        assert_eq!(frame.rgba()[right], 255);
        assert_eq!(frame.rgba()[0], 0);
    }
}
