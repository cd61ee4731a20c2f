use glam::Vec3;

use crate::math::rgb_from_hex;

pub const CEILING_LIGHT_POSITION: Vec3 = Vec3::new(0.1, 7.0, 0.1);
pub const CEILING_LIGHT_INTENSITY: f32 = 0.3;

const PULSE_STEP: f32 = 0.01;
const PULSE_MIN: f32 = 0.8;
const PULSE_MAX: f32 = 1.2;

/// Local point light with a falloff range, one per neon triangle plus
/// the ceiling fixture.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: f32,
}

/// All light sources in the room. The ceiling fixture can be switched
/// off and slowly pulses while on; triangle lights track their host
/// triangle's palette color.
#[derive(Debug)]
pub struct LightRig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: Vec3,
    ceiling: PointLight,
    ceiling_on: bool,
    pulse_direction: f32,
    triangle_lights: Vec<PointLight>,
}

impl LightRig {
    pub fn new() -> Self {
        Self {
            ambient_color: rgb_from_hex(0xFFFFFF),
            ambient_intensity: 0.6,
            directional_color: rgb_from_hex(0xFFFFFF),
            directional_intensity: 0.5,
            directional_position: Vec3::new(0.0, 0.3, 0.0),
            ceiling: PointLight {
                position: CEILING_LIGHT_POSITION,
                color: rgb_from_hex(0xFFFFFF),
                intensity: CEILING_LIGHT_INTENSITY,
                range: 0.0,
            },
            ceiling_on: true,
            pulse_direction: 1.0,
            triangle_lights: Vec::new(),
        }
    }

    pub fn toggle_ceiling(&mut self) {
        self.ceiling_on = !self.ceiling_on;
    }

    pub fn ceiling_on(&self) -> bool {
        self.ceiling_on
    }

    /// The fixture as the renderer should see it: intensity zero while
    /// switched off so the toggle needs no shader-side flag.
    pub fn ceiling(&self) -> PointLight {
        let mut light = self.ceiling;
        if !self.ceiling_on {
            light.intensity = 0.0;
        }
        light
    }

    /// Slow breathing pulse. Intensity drifts by a fixed step each frame
    /// and the direction flips outside [0.8, 1.2], so the initial 0.3
    /// climbs into the band and then oscillates.
    pub fn pulse(&mut self) {
        self.ceiling.intensity += self.pulse_direction * PULSE_STEP;
        if self.ceiling.intensity > PULSE_MAX || self.ceiling.intensity < PULSE_MIN {
            self.pulse_direction = -self.pulse_direction;
        }
    }

    /// Registers a neon triangle's glow light; returns its slot index.
    pub fn add_triangle_light(&mut self, position: Vec3, color: [f32; 3]) -> usize {
        self.triangle_lights.push(PointLight {
            position,
            color,
            intensity: 1.0,
            range: 5.0,
        });
        self.triangle_lights.len() - 1
    }

    /// Retints a triangle light, or douses it when the palette entry is
    /// the unlit grey.
    pub fn set_triangle_light(&mut self, slot: usize, color: [f32; 3], lit: bool) {
        if let Some(light) = self.triangle_lights.get_mut(slot) {
            light.color = color;
            light.intensity = if lit { 1.0 } else { 0.0 };
        }
    }

    pub fn triangle_lights(&self) -> &[PointLight] {
        &self.triangle_lights
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new()
    }
}
