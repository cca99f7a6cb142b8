use glam::Vec3;

use crate::options::{FogOptions, LightingOptions};
use crate::scene::catalog::PointLightDescriptor;

/// GPU mirror of `SceneLighting` in `modules/lighting.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// World position of the point light.
    pub light_position: [f32; 3],
    /// Point light intensity.
    pub light_intensity: f32,
    /// Linear point light color.
    pub light_color: [f32; 3],
    /// Range at which the light fades to zero (0 = unbounded).
    pub light_distance: f32,
    /// Ambient color pre-multiplied by its level.
    pub ambient_color: [f32; 3],
    /// Falloff exponent.
    pub light_decay: f32,
    /// Linear fog color.
    pub fog_color: [f32; 3],
    /// Distance where fog starts.
    pub fog_near: f32,
    /// Distance where fog is opaque.
    pub fog_far: f32,
    /// 1.0 when fog is applied.
    pub fog_enabled: f32,
    /// 1.0 when a point light is active.
    pub light_enabled: f32,
    pub(crate) _pad: f32,
}

impl LightingUniform {
    /// Pack the active light (if any) with the scene-wide terms.
    #[must_use]
    pub fn new(
        light: Option<(Vec3, PointLightDescriptor)>,
        lighting: &LightingOptions,
        fog: &FogOptions,
    ) -> Self {
        let ambient =
            Vec3::from_array(lighting.ambient_color) * lighting.ambient;
        let (position, descriptor, enabled) = match light {
            Some((position, descriptor)) => (position, descriptor, 1.0),
            None => (Vec3::ZERO, PointLightDescriptor::default(), 0.0),
        };
        Self {
            light_position: position.to_array(),
            light_intensity: descriptor.intensity * lighting.point_light_scale,
            light_color: descriptor.color,
            light_distance: descriptor.distance.max(0.0),
            ambient_color: ambient.to_array(),
            light_decay: descriptor.decay,
            fog_color: fog.color,
            fog_near: fog.near,
            fog_far: fog.far.max(fog.near + f32::EPSILON),
            fog_enabled: if fog.enabled { 1.0 } else { 0.0 },
            light_enabled: enabled,
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_wgsl() {
        assert_eq!(size_of::<LightingUniform>(), 80);
    }

    #[test]
    fn light_is_disabled_until_present() {
        let lighting = LightingOptions::default();
        let fog = FogOptions::default();
        let off = LightingUniform::new(None, &lighting, &fog);
        assert_eq!(off.light_enabled, 0.0);
        assert_eq!(off.fog_enabled, 1.0);
        assert_eq!(off.fog_far, 500.0);

        let on = LightingUniform::new(
            Some((Vec3::new(0.0, 4.0, 0.0), PointLightDescriptor::default())),
            &lighting,
            &fog,
        );
        assert_eq!(on.light_enabled, 1.0);
        assert_eq!(on.light_position, [0.0, 4.0, 0.0]);
        assert_eq!(on.light_intensity, 300.0);
        assert_eq!(on.light_decay, 2.0);
    }

    #[test]
    fn fog_toggle_and_degenerate_range() {
        let fog = FogOptions {
            enabled: false,
            near: 10.0,
            far: 10.0,
            ..FogOptions::default()
        };
        let u = LightingUniform::new(None, &LightingOptions::default(), &fog);
        assert_eq!(u.fog_enabled, 0.0);
        assert!(u.fog_far > u.fog_near);
    }
}
