//! Orbit-style camera controls.
//!
//! The eye sits on a sphere around a target point. Dragging changes the
//! azimuth and polar angles, the wheel scales the radius, and panning
//! slides the target in the screen plane. With damping enabled, input
//! accumulates and bleeds into the pose over several updates.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::options::CameraOptions;

/// Keeps the eye off the poles, where `look_at` with a Y up vector
/// degenerates.
const POLAR_EPSILON: f32 = 1e-6;
/// Smallest radius the eye may reach, keeping the view matrix defined.
const MIN_RADIUS: f32 = 1e-3;
/// Per-step dolly ratio at `zoom_speed = 1`.
const DOLLY_BASE: f32 = 0.95;
/// Residual motion below which damping is considered settled.
const SETTLE_EPSILON: f32 = 1e-6;

/// Spherical orbit around a target.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    target: Vec3,
    radius: f32,
    /// Angle around +Y, measured from +Z toward +X.
    azimuth: f32,
    /// Angle down from +Y.
    polar: f32,

    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    pending_scale: f32,

    home_target: Vec3,
    home_eye: Vec3,

    fovy: f32,
    min_distance: f32,
    max_distance: f32,
    enable_damping: bool,
    damping_factor: f32,
    enable_pan: bool,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl OrbitControls {
    /// Controls at the initial pose described by `options`.
    #[must_use]
    pub fn new(options: &CameraOptions) -> Self {
        let home_target = Vec3::from_array(options.target);
        let home_eye = Vec3::from_array(options.position);
        let mut controls = Self {
            target: home_target,
            radius: 1.0,
            azimuth: 0.0,
            polar: PI / 2.0,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
            home_target,
            home_eye,
            fovy: options.fovy,
            min_distance: options.min_distance,
            max_distance: options.max_distance,
            enable_damping: options.enable_damping,
            damping_factor: options.damping_factor,
            enable_pan: options.enable_pan,
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
        };
        controls.reset();
        controls
    }

    /// Apply new limits and speeds. The current pose is kept unless the
    /// home pose changed, in which case the controls jump to it.
    pub fn configure(&mut self, options: &CameraOptions) {
        let home_target = Vec3::from_array(options.target);
        let home_eye = Vec3::from_array(options.position);
        let home_changed =
            home_target != self.home_target || home_eye != self.home_eye;

        self.home_target = home_target;
        self.home_eye = home_eye;
        self.fovy = options.fovy;
        self.min_distance = options.min_distance;
        self.max_distance = options.max_distance;
        self.enable_damping = options.enable_damping;
        self.damping_factor = options.damping_factor.clamp(0.0, 1.0);
        self.enable_pan = options.enable_pan;
        self.rotate_speed = options.rotate_speed;
        self.pan_speed = options.pan_speed;
        self.zoom_speed = options.zoom_speed;

        if home_changed {
            self.reset();
        } else {
            self.radius = self.clamp_radius(self.radius);
        }
    }

    /// Return to the initial pose and drop pending motion.
    pub fn reset(&mut self) {
        self.target = self.home_target;
        let offset = self.home_eye - self.home_target;
        let radius = offset.length();
        if radius > 0.0 {
            self.azimuth = offset.x.atan2(offset.z);
            self.polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        }
        self.radius = self.clamp_radius(radius);
        self.polar = self.polar.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.pending_scale = 1.0;
    }

    /// Queue a rotation from a drag of `delta` pixels on a viewport
    /// `viewport_height` pixels tall. A full-height drag turns one
    /// revolution at `rotate_speed = 1`.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.pending_azimuth -= TAU * delta.x / height * self.rotate_speed;
        self.pending_polar -= TAU * delta.y / height * self.rotate_speed;
    }

    /// Queue a screen-space pan so the point under the cursor follows it.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.enable_pan {
            return;
        }
        let height = viewport_height.max(1.0);
        let half_height = self.radius * (self.fovy.to_radians() / 2.0).tan();
        let scale = 2.0 * half_height / height * self.pan_speed;
        let (right, up) = self.screen_axes();
        self.pending_pan += -right * delta.x * scale + up * delta.y * scale;
    }

    /// Queue a dolly. Positive `delta` moves toward the target.
    pub fn zoom(&mut self, delta: f32) {
        if !delta.is_finite() || delta == 0.0 {
            return;
        }
        let factor = DOLLY_BASE.powf(self.zoom_speed * delta.abs());
        if delta > 0.0 {
            self.pending_scale *= factor;
        } else {
            self.pending_scale /= factor;
        }
    }

    /// Fold pending input into the pose. Returns `true` if the pose
    /// changed.
    pub fn update(&mut self) -> bool {
        let blend = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        let d_azimuth = self.pending_azimuth * blend;
        let d_polar = self.pending_polar * blend;
        let d_pan = self.pending_pan * blend;

        let polar = (self.polar + d_polar)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = self.clamp_radius(self.radius * self.pending_scale);
        let moved = d_azimuth.abs() > SETTLE_EPSILON
            || (polar - self.polar).abs() > SETTLE_EPSILON
            || (radius - self.radius).abs() > SETTLE_EPSILON
            || d_pan.length() > SETTLE_EPSILON;

        self.azimuth = (self.azimuth + d_azimuth).rem_euclid(TAU);
        self.polar = polar;
        self.radius = radius;
        self.target += d_pan;

        let keep = 1.0 - blend;
        self.pending_azimuth *= keep;
        self.pending_polar *= keep;
        self.pending_pan *= keep;
        self.pending_scale = 1.0;

        moved
    }

    /// Eye position.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    /// Look-at target.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Eye-to-target distance.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.radius
    }

    /// Angle down from +Y in radians.
    #[must_use]
    pub fn polar(&self) -> f32 {
        self.polar
    }

    /// Angle around +Y in radians.
    #[must_use]
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    /// Vertical field of view in degrees used for pan scaling.
    #[must_use]
    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    fn clamp_radius(&self, radius: f32) -> f32 {
        let lo = self.min_distance.max(MIN_RADIUS);
        let hi = self.max_distance.max(lo);
        if radius.is_finite() {
            radius.clamp(lo, hi)
        } else {
            hi
        }
    }

    /// Camera right and up vectors in world space.
    fn screen_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        (right, up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> OrbitControls {
        OrbitControls::new(&CameraOptions::default())
    }

    #[test]
    fn starts_at_configured_pose() {
        let c = controls();
        assert!((c.eye() - Vec3::new(0.0, 20.0, 30.0)).length() < 1e-4);
        assert_eq!(c.target(), Vec3::ZERO);
        assert!((c.distance() - 1300.0_f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn rotate_preserves_distance() {
        let mut c = controls();
        let before = c.distance();
        c.rotate(Vec2::new(120.0, -40.0), 800.0);
        assert!(c.update());
        assert!(!c.update());
        assert!((c.eye().distance(c.target()) - before).abs() < 1e-3);
        assert!(c.azimuth() > 0.0);
    }

    #[test]
    fn polar_angle_is_clamped_away_from_poles() {
        let mut c = controls();
        c.rotate(Vec2::new(0.0, 10_000.0), 100.0);
        let _ = c.update();
        assert!(c.polar() >= POLAR_EPSILON);
        c.rotate(Vec2::new(0.0, -10_000.0), 100.0);
        let _ = c.update();
        assert!(c.polar() <= PI - POLAR_EPSILON);
        assert!(c.eye().is_finite());
    }

    #[test]
    fn zoom_is_clamped_to_distance_limits() {
        let mut c = controls();
        for _ in 0..200 {
            c.zoom(-1.0);
            let _ = c.update();
        }
        assert!((c.distance() - 150.0).abs() < 1e-3);

        for _ in 0..2000 {
            c.zoom(1.0);
            let _ = c.update();
        }
        assert!(c.distance() <= MIN_RADIUS + 1e-6);
        assert!(c.eye().is_finite());
    }

    #[test]
    fn zoom_in_moves_closer() {
        let mut c = controls();
        let before = c.distance();
        c.zoom(1.0);
        assert!(c.update());
        assert!((c.distance() - before * 0.95).abs() < 1e-3);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let mut c = controls();
        let offset = c.eye() - c.target();
        c.pan(Vec2::new(-50.0, 0.0), 600.0);
        let _ = c.update();
        assert!(c.target().x > 0.0);
        assert!(((c.eye() - c.target()) - offset).length() < 1e-3);
    }

    #[test]
    fn pan_can_be_disabled() {
        let options = CameraOptions {
            enable_pan: false,
            ..CameraOptions::default()
        };
        let mut c = OrbitControls::new(&options);
        c.pan(Vec2::new(100.0, 100.0), 600.0);
        let _ = c.update();
        assert_eq!(c.target(), Vec3::ZERO);
    }

    #[test]
    fn damping_converges_to_undamped_result() {
        let mut undamped = controls();
        undamped.rotate(Vec2::new(-200.0, 0.0), 800.0);
        let _ = undamped.update();

        let options = CameraOptions {
            enable_damping: true,
            ..CameraOptions::default()
        };
        let mut damped = OrbitControls::new(&options);
        damped.rotate(Vec2::new(-200.0, 0.0), 800.0);
        assert!(damped.update());
        assert!(damped.azimuth() < undamped.azimuth());
        for _ in 0..400 {
            let _ = damped.update();
        }
        assert!((damped.azimuth() - undamped.azimuth()).abs() < 1e-4);
        assert!(!damped.update());
    }

    #[test]
    fn reset_restores_home_pose() {
        let mut c = controls();
        c.rotate(Vec2::new(300.0, 100.0), 800.0);
        c.pan(Vec2::new(30.0, 30.0), 800.0);
        c.zoom(3.0);
        let _ = c.update();
        c.reset();
        assert!((c.eye() - Vec3::new(0.0, 20.0, 30.0)).length() < 1e-4);
        assert_eq!(c.target(), Vec3::ZERO);
    }

    #[test]
    fn configure_tightens_distance_limit() {
        let mut c = controls();
        let options = CameraOptions {
            max_distance: 10.0,
            ..CameraOptions::default()
        };
        c.configure(&options);
        assert!((c.distance() - 10.0).abs() < 1e-5);
    }
}
