// config.rs - Tunables for each particle scene
//
// Defaults are the values the site ships with. Any field can be
// overridden from JSON; missing fields fall back to the default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::render::Rgba;

const GRAY: Rgba = Rgba::rgb(160, 160, 160);

/// Sanity checks run after parsing.
pub trait Validate {
    fn validate(&self) -> Result<(), EngineError>;
}

/// Parse a config from JSON and validate it.
pub fn from_json<T: DeserializeOwned + Validate>(json: &str) -> Result<T, EngineError> {
    let cfg: T = serde_json::from_str(json)?;
    cfg.validate()?;
    Ok(cfg)
}

fn check_friction(name: &str, f: f32) -> Result<(), EngineError> {
    if f > 0.0 && f < 1.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!("{} must be in (0, 1), got {}", name, f)))
    }
}

fn check_positive(name: &str, v: f32) -> Result<(), EngineError> {
    if v > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!("{} must be positive, got {}", name, v)))
    }
}

fn check_size(min: f32, span: f32) -> Result<(), EngineError> {
    check_positive("size_min", min)?;
    if span < 0.0 {
        return Err(EngineError::InvalidConfig(format!("size_span must not be negative, got {}", span)));
    }
    Ok(())
}

// ============================================================================
// Sand
// ============================================================================

/// Contact response constants. Picked for feel, not derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub capsule_restitution: f32,
    pub capsule_friction: f32,
    pub capsule_escape_speed: f32,
    pub face_bounce: f32,
    pub side_bounce: f32,
    pub nudge: f32,
    pub nudge_below: f32,
    pub floor_bounce: f32,
    pub floor_drag: f32,
    pub wall_bounce: f32,
    pub pair_restitution: f32,
    /// Extra resting-contact sweeps over all pairs after the main pass.
    pub relax_passes: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            capsule_restitution: 1.2,
            capsule_friction: 0.95,
            capsule_escape_speed: 2.0,
            face_bounce: 0.3,
            side_bounce: 0.4,
            nudge: 0.1,
            nudge_below: 0.5,
            floor_bounce: 0.2,
            floor_drag: 0.7,
            wall_bounce: 0.3,
            pair_restitution: 0.3,
            relax_passes: 4,
        }
    }
}

impl Validate for CollisionConfig {
    fn validate(&self) -> Result<(), EngineError> {
        for (name, v) in [
            ("face_bounce", self.face_bounce),
            ("side_bounce", self.side_bounce),
            ("floor_bounce", self.floor_bounce),
            ("wall_bounce", self.wall_bounce),
        ] {
            if !(0.0..1.0).contains(&v) {
                return Err(EngineError::InvalidConfig(format!("{} must be in [0, 1), got {}", name, v)));
            }
        }
        check_friction("capsule_friction", self.capsule_friction)?;
        check_friction("floor_drag", self.floor_drag)?;
        if !(0.0..=0.5).contains(&self.pair_restitution) {
            return Err(EngineError::InvalidConfig(format!(
                "pair_restitution must be in [0, 0.5], got {}",
                self.pair_restitution
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandConfig {
    pub count: usize,
    pub gravity: f32,
    pub friction: f32,
    pub pointer_radius: f32,
    pub pointer_force: f32,
    pub click_radius: f32,
    pub click_force: f32,
    pub click_lift: f32,
    /// Share of the input's width the burst falls from, centered.
    pub spawn_width: f32,
    /// Vertical spread of the burst below the input, in px.
    pub spawn_stagger: f32,
    pub spawn_vy_min: f32,
    pub spawn_vy_max: f32,
    pub spawn_vx_spread: f32,
    pub size_min: f32,
    pub size_span: f32,
    pub glyph_padding: f32,
    pub colors: Vec<Rgba>,
    pub collision: CollisionConfig,
}

impl Default for SandConfig {
    fn default() -> Self {
        Self {
            count: 300,
            gravity: 0.15,
            friction: 0.96,
            pointer_radius: 30.0,
            pointer_force: 2.0,
            click_radius: 300.0,
            click_force: 20.0,
            click_lift: 3.0,
            spawn_width: 0.8,
            spawn_stagger: 20.0,
            spawn_vy_min: 1.0,
            spawn_vy_max: 3.0,
            spawn_vx_spread: 2.0,
            size_min: 3.0,
            size_span: 2.0,
            glyph_padding: 1.0,
            colors: vec![
                Rgba::rgb(0xd4, 0xa5, 0x74),
                Rgba::rgb(0xc9, 0x98, 0x6a),
                Rgba::rgb(0xbe, 0x8b, 0x60),
                Rgba::rgb(0xb3, 0x7e, 0x56),
            ],
            collision: CollisionConfig::default(),
        }
    }
}

impl Validate for SandConfig {
    fn validate(&self) -> Result<(), EngineError> {
        check_friction("friction", self.friction)?;
        check_positive("pointer_radius", self.pointer_radius)?;
        check_positive("click_radius", self.click_radius)?;
        check_size(self.size_min, self.size_span)?;
        if !(self.spawn_width > 0.0 && self.spawn_width <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "spawn_width must be in (0, 1], got {}",
                self.spawn_width
            )));
        }
        if self.spawn_vy_max < self.spawn_vy_min {
            return Err(EngineError::InvalidConfig("spawn_vy_max below spawn_vy_min".into()));
        }
        if self.colors.is_empty() {
            return Err(EngineError::InvalidConfig("colors must not be empty".into()));
        }
        self.collision.validate()
    }
}

// ============================================================================
// Drift (ambient, follows the pointer)
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub count: usize,
    pub initial_speed: f32,
    pub wander: f32,
    /// Distance at which attraction reaches full strength.
    pub attract_range: f32,
    pub attract_cap: f32,
    pub attract_strength: f32,
    pub repel_below: f32,
    pub repel_force: f32,
    pub pair_below: f32,
    pub pair_push: f32,
    pub friction: f32,
    pub max_speed: f32,
    pub wrap_margin: f32,
    pub size_min: f32,
    pub size_span: f32,
    pub opacity_min: f32,
    pub opacity_span: f32,
    pub color: Rgba,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            count: 80,
            initial_speed: 1.0,
            wander: 0.3,
            attract_range: 200.0,
            attract_cap: 1.5,
            attract_strength: 0.15,
            repel_below: 8.0,
            repel_force: 0.8,
            pair_below: 6.0,
            pair_push: 0.15,
            friction: 0.94,
            max_speed: 8.0,
            wrap_margin: 20.0,
            size_min: 1.5,
            size_span: 1.0,
            opacity_min: 0.2,
            opacity_span: 0.15,
            color: GRAY,
        }
    }
}

impl Validate for DriftConfig {
    fn validate(&self) -> Result<(), EngineError> {
        check_friction("friction", self.friction)?;
        check_positive("attract_range", self.attract_range)?;
        check_positive("max_speed", self.max_speed)?;
        check_size(self.size_min, self.size_span)
    }
}

// ============================================================================
// Grid (anchored particles, spring back after pointer pushes them)
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub spacing: f32,
    pub jitter: f32,
    pub pointer_radius: f32,
    pub pointer_force: f32,
    pub spring: f32,
    pub pair_below: f32,
    pub pair_push: f32,
    pub friction: f32,
    pub size_min: f32,
    pub size_span: f32,
    pub opacity_min: f32,
    pub opacity_span: f32,
    pub color: Rgba,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 60.0,
            jitter: 20.0,
            pointer_radius: 150.0,
            pointer_force: 2.0,
            spring: 0.03,
            pair_below: 4.0,
            pair_push: 0.1,
            friction: 0.92,
            size_min: 1.5,
            size_span: 1.0,
            opacity_min: 0.15,
            opacity_span: 0.15,
            color: GRAY,
        }
    }
}

impl Validate for GridConfig {
    fn validate(&self) -> Result<(), EngineError> {
        check_friction("friction", self.friction)?;
        check_positive("spacing", self.spacing)?;
        check_positive("pointer_radius", self.pointer_radius)?;
        check_size(self.size_min, self.size_span)
    }
}

// ============================================================================
// Triangle field
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangleConfig {
    pub spacing: f32,
    pub size: f32,
    /// Distance beyond which triangles turn at `min_turn`.
    pub turn_range: f32,
    pub min_turn: f32,
    pub max_turn: f32,
    pub glow_range: f32,
    pub base_opacity: f32,
    pub max_opacity: f32,
    pub color: Rgba,
}

impl Default for TriangleConfig {
    fn default() -> Self {
        Self {
            spacing: 50.0,
            size: 5.0,
            turn_range: 400.0,
            min_turn: 0.02,
            max_turn: 0.12,
            glow_range: 300.0,
            base_opacity: 0.08,
            max_opacity: 0.25,
            color: Rgba::rgb(150, 150, 150),
        }
    }
}

impl Validate for TriangleConfig {
    fn validate(&self) -> Result<(), EngineError> {
        check_positive("spacing", self.spacing)?;
        check_positive("turn_range", self.turn_range)?;
        check_positive("glow_range", self.glow_range)?;
        if !(0.0 < self.max_turn && self.max_turn <= 1.0) {
            return Err(EngineError::InvalidConfig(format!("max_turn must be in (0, 1], got {}", self.max_turn)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SandConfig = from_json(r#"{ "gravity": 0.3, "collision": { "wall_bounce": 0.5 } }"#).unwrap();
        assert_eq!(cfg.gravity, 0.3);
        assert_eq!(cfg.count, 300);
        assert_eq!(cfg.collision.wall_bounce, 0.5);
        assert_eq!(cfg.collision.pair_restitution, 0.3);
        assert_eq!(cfg.collision.relax_passes, 4);
    }

    #[test]
    fn colors_parse_from_hex() {
        let cfg: SandConfig = from_json(r##"{ "colors": ["#ff0000", "#00ff0080"] }"##).unwrap();
        assert_eq!(cfg.colors[0], Rgba::rgb(255, 0, 0));
        assert!(cfg.colors[1].a < 1.0);

        let bad = from_json::<SandConfig>(r#"{ "colors": ["red"] }"#);
        assert!(matches!(bad, Err(EngineError::Config(_))));
    }

    #[test]
    fn friction_must_decay() {
        let err = from_json::<DriftConfig>(r#"{ "friction": 1.0 }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        assert!(from_json::<GridConfig>(r#"{ "friction": 0.0 }"#).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        SandConfig::default().validate().unwrap();
        DriftConfig::default().validate().unwrap();
        GridConfig::default().validate().unwrap();
        TriangleConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_palette_rejected() {
        assert!(from_json::<SandConfig>(r#"{ "colors": [] }"#).is_err());
    }
}
