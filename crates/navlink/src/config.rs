//! Configuration for jump-link generation
//!
//! Designer-facing parameters live in the plain `*Settings` structs. The
//! builder consumes the validated `JumpDownConfig` / `JumpOverConfig` values,
//! which compute their derived constants once at construction.

use bitflags::bitflags;
use glam::Vec2;

use super::compact_heightfield::CompactHeightfield;
use super::link::JumpAction;
use navlink_common::{Error, Result};

/// Number of points in a jump spine
pub const MAX_SPINE: usize = 8;

bitflags! {
    /// Flags controlling which off-mesh connections are exported per jump link
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(
        feature = "serialization",
        derive(serde::Serialize, serde::Deserialize)
    )]
    pub struct LinkBuilderFlags: u8 {
        /// One connection through the middle of the link
        const CREATE_CENTER_POINT_LINK = 1 << 0;
        /// One connection along each lateral bound of the link
        const CREATE_EXTREMITY_LINK = 1 << 1;
        /// Also export the reverse (upward) direction
        const BIDIRECTIONAL = 1 << 2;
    }
}

impl Default for LinkBuilderFlags {
    fn default() -> Self {
        Self::CREATE_CENTER_POINT_LINK
    }
}

/// Agent and voxel parameters shared by every link action
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LinkBuilderConfig {
    /// Radius of the agent following the links
    pub agent_radius: f32,
    /// Height of the agent
    pub agent_height: f32,
    /// Maximum step height the agent can climb
    pub agent_climb: f32,
    /// The width/depth resolution of the heightfields (cell size)
    pub cell_size: f32,
    /// The height resolution of the heightfields (cell height)
    pub cell_height: f32,
}

impl Default for LinkBuilderConfig {
    fn default() -> Self {
        Self {
            agent_radius: 35.0,
            agent_height: 144.0,
            agent_climb: 35.0,
            cell_size: 10.0,
            cell_height: 5.0,
        }
    }
}

impl LinkBuilderConfig {
    /// Creates a config using the voxel sizes of a compact heightfield
    pub fn from_compact_heightfield(
        chf: &CompactHeightfield,
        agent_radius: f32,
        agent_height: f32,
        agent_climb: f32,
    ) -> Self {
        Self {
            agent_radius,
            agent_height,
            agent_climb,
            cell_size: chf.cs,
            cell_height: chf.ch,
        }
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.cell_size <= 0.0 || self.cell_height <= 0.0 {
            return Err(Error::InvalidConfig(
                "Invalid cell size or height".to_string(),
            ));
        }

        if self.agent_radius < 0.0 || self.agent_height <= 0.0 || self.agent_climb < 0.0 {
            return Err(Error::InvalidConfig("Invalid agent dimensions".to_string()));
        }

        Ok(())
    }
}

/// Raw parameters of the jump-down action
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct JumpDownSettings {
    /// Whether jump-down links are generated
    pub enabled: bool,
    /// Horizontal distance from take-off to landing
    pub jump_length: f32,
    /// Distance behind the edge where the jump starts
    pub jump_distance_from_edge: f32,
    /// Maximum depth of the landing below the take-off
    pub jump_max_depth: f32,
    /// Height of the jump arc above the take-off
    pub jump_height: f32,
    /// Vertical tolerance when looking for ground at the ends
    pub jump_ends_height_tolerance: f32,
    /// Ground sample spacing in cell sizes (>= 1)
    pub sampling_separation_factor: f32,
    /// Links whose ends lie closer than this to another link's ends are merged
    pub filter_distance_threshold: f32,
    /// Off-mesh export options
    pub link_builder_flags: LinkBuilderFlags,
    /// Poly flags of the downward connection
    pub down_dir_poly_flag: u16,
    /// Poly flags of the upward connection
    pub up_dir_poly_flag: u16,
    /// Area id of the downward connection
    pub down_dir_area: u8,
    /// Area id of the upward connection
    pub up_dir_area: u8,
}

impl Default for JumpDownSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            jump_length: 150.0,
            jump_distance_from_edge: 10.0,
            jump_max_depth: 150.0,
            jump_height: 50.0,
            jump_ends_height_tolerance: 80.0,
            sampling_separation_factor: 1.0,
            filter_distance_threshold: 80.0,
            link_builder_flags: LinkBuilderFlags::default(),
            down_dir_poly_flag: 1,
            up_dir_poly_flag: 1,
            down_dir_area: 1,
            up_dir_area: 1,
        }
    }
}

/// Validated jump-down configuration with its cached parabola constants
#[derive(Debug, Clone, PartialEq)]
pub struct JumpDownConfig {
    settings: JumpDownSettings,
    parabola_constant: f32,
    down_ratio: f32,
}

impl JumpDownConfig {
    /// Validates the settings and solves the jump parabola.
    ///
    /// The parabola `y(u) = a u² + (-d/l - a l) u` passes through the take-off
    /// `(0, 0)` and the landing `(l, -d)` and peaks at `h` above the take-off.
    pub fn new(settings: JumpDownSettings) -> Result<Self> {
        let l = settings.jump_length;
        let d = settings.jump_max_depth;
        let h = settings.jump_height;

        if l <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "jump_length must be positive, got {}",
                l
            )));
        }
        if d < 0.0 || h < 0.0 || d + h <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "jump_max_depth ({}) and jump_height ({}) must be non-negative and not both zero",
                d, h
            )));
        }
        if settings.jump_distance_from_edge < 0.0 || settings.jump_distance_from_edge >= l {
            return Err(Error::InvalidConfig(format!(
                "jump_distance_from_edge must be in [0, {}), got {}",
                l, settings.jump_distance_from_edge
            )));
        }
        validate_common(
            settings.sampling_separation_factor,
            settings.filter_distance_threshold,
            settings.jump_ends_height_tolerance,
        )?;

        let parabola_constant = -(d + 2.0 * h + 2.0 * (h * (h + d)).sqrt()) / (l * l);
        let down_ratio = d / l;

        Ok(Self {
            settings,
            parabola_constant,
            down_ratio,
        })
    }

    /// The raw settings
    pub fn settings(&self) -> &JumpDownSettings {
        &self.settings
    }

    /// Quadratic coefficient `a` of the jump parabola
    pub fn parabola_constant(&self) -> f32 {
        self.parabola_constant
    }

    /// Depth over length of the jump
    pub fn down_ratio(&self) -> f32 {
        self.down_ratio
    }

    /// Height of the jump parabola at `x`, measured from the edge.
    ///
    /// The jump starts at `x = -jump_distance_from_edge`.
    pub fn height_at(&self, x: f32) -> f32 {
        let u = x + self.settings.jump_distance_from_edge;
        let a = self.parabola_constant;
        let b = -self.down_ratio - a * self.settings.jump_length;
        a * u * u + b * u
    }

    /// Position of the parabola's highest point, measured from the edge
    pub fn apex(&self) -> Vec2 {
        let a = self.parabola_constant;
        let b = -self.down_ratio - a * self.settings.jump_length;
        let x = -b / (2.0 * a) - self.settings.jump_distance_from_edge;
        Vec2::new(x, self.height_at(x))
    }
}

/// Raw parameters of the jump-over action
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct JumpOverSettings {
    /// Whether jump-over links are generated
    pub enabled: bool,
    /// Width of the gap to cross
    pub jump_gap_width: f32,
    /// Maximum height difference between the two sides of the gap
    pub jump_gap_height_tolerance: f32,
    /// Horizontal distance from the gap centre to each end of the jump
    pub jump_distance_from_gap_center: f32,
    /// Height of the jump arc
    pub jump_height: f32,
    /// Vertical tolerance when looking for ground at the take-off
    pub jump_ends_height_tolerance: f32,
    /// Ground sample spacing in cell sizes (>= 1)
    pub sampling_separation_factor: f32,
    /// Links whose ends lie closer than this to another link's ends are merged
    pub filter_distance_threshold: f32,
}

impl Default for JumpOverSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            jump_gap_width: 100.0,
            jump_gap_height_tolerance: 50.0,
            jump_distance_from_gap_center: 80.0,
            jump_height: 50.0,
            jump_ends_height_tolerance: 50.0,
            sampling_separation_factor: 1.0,
            filter_distance_threshold: 80.0,
        }
    }
}

/// Validated jump-over configuration
#[derive(Debug, Clone, PartialEq)]
pub struct JumpOverConfig {
    settings: JumpOverSettings,
}

impl JumpOverConfig {
    /// Validates the settings
    pub fn new(settings: JumpOverSettings) -> Result<Self> {
        if settings.jump_gap_width <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "jump_gap_width must be positive, got {}",
                settings.jump_gap_width
            )));
        }
        if settings.jump_distance_from_gap_center <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "jump_distance_from_gap_center must be positive, got {}",
                settings.jump_distance_from_gap_center
            )));
        }
        if settings.jump_height < 0.0 || settings.jump_gap_height_tolerance < 0.0 {
            return Err(Error::InvalidConfig(
                "jump_height and jump_gap_height_tolerance must be non-negative".to_string(),
            ));
        }
        validate_common(
            settings.sampling_separation_factor,
            settings.filter_distance_threshold,
            settings.jump_ends_height_tolerance,
        )?;

        Ok(Self { settings })
    }

    /// The raw settings
    pub fn settings(&self) -> &JumpOverSettings {
        &self.settings
    }

    /// Distance of the gap centre from the edge
    pub fn gap_center(&self) -> f32 {
        self.settings.jump_gap_width * 0.5
    }

    /// Height of the jump arc at `x`, measured from the edge
    pub fn height_at(&self, x: f32) -> f32 {
        let start = self.gap_center() - self.settings.jump_distance_from_gap_center;
        let end = self.gap_center() + self.settings.jump_distance_from_gap_center;
        let u = ((x - start) / (end - start)).clamp(0.0, 1.0);
        let v = 2.0 * u - 1.0;
        (1.0 - v * v) * self.settings.jump_height
    }
}

fn validate_common(separation: f32, filter_threshold: f32, ends_tolerance: f32) -> Result<()> {
    if separation < 1.0 {
        return Err(Error::InvalidConfig(format!(
            "sampling_separation_factor must be >= 1, got {}",
            separation
        )));
    }
    if filter_threshold < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "filter_distance_threshold must be non-negative, got {}",
            filter_threshold
        )));
    }
    if ends_tolerance < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "jump_ends_height_tolerance must be non-negative, got {}",
            ends_tolerance
        )));
    }
    Ok(())
}

/// A link action together with its configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ActionConfig {
    /// Jump down from a ledge
    JumpDown(JumpDownConfig),
    /// Jump over a gap
    JumpOver(JumpOverConfig),
}

impl ActionConfig {
    /// The action kind
    pub fn action(&self) -> JumpAction {
        match self {
            ActionConfig::JumpDown(_) => JumpAction::Down,
            ActionConfig::JumpOver(_) => JumpAction::Over,
        }
    }

    /// Whether links of this kind should be generated
    pub fn enabled(&self) -> bool {
        match self {
            ActionConfig::JumpDown(c) => c.settings().enabled,
            ActionConfig::JumpOver(c) => c.settings().enabled,
        }
    }

    /// Ground sample spacing in cell sizes
    pub fn sampling_separation_factor(&self) -> f32 {
        match self {
            ActionConfig::JumpDown(c) => c.settings().sampling_separation_factor,
            ActionConfig::JumpOver(c) => c.settings().sampling_separation_factor,
        }
    }

    /// Distance under which two links count as duplicates
    pub fn filter_distance_threshold(&self) -> f32 {
        match self {
            ActionConfig::JumpDown(c) => c.settings().filter_distance_threshold,
            ActionConfig::JumpOver(c) => c.settings().filter_distance_threshold,
        }
    }
}

impl From<JumpDownConfig> for ActionConfig {
    fn from(config: JumpDownConfig) -> Self {
        ActionConfig::JumpDown(config)
    }
}

impl From<JumpOverConfig> for ActionConfig {
    fn from(config: JumpOverConfig) -> Self {
        ActionConfig::JumpOver(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_down_parabola_closed_form() {
        let config = JumpDownConfig::new(JumpDownSettings::default()).unwrap();
        let s = config.settings().clone();

        // Take-off and landing
        assert!(config.height_at(-s.jump_distance_from_edge).abs() < 1e-3);
        let landing = config.height_at(-s.jump_distance_from_edge + s.jump_length);
        assert!((landing + s.jump_max_depth).abs() < 1e-3 * s.jump_max_depth);

        // The vertex reproduces the configured peak height
        let apex = config.apex();
        assert!((apex.y - s.jump_height).abs() < 1e-3 * s.jump_height);
        assert!(config.height_at(apex.x - 1.0) < apex.y);
        assert!(config.height_at(apex.x + 1.0) < apex.y);
    }

    #[test]
    fn test_jump_down_parabola_other_shapes() {
        for (l, d, h) in [(100.0, 20.0, 10.0), (300.0, 250.0, 5.0), (80.0, 0.0, 40.0)] {
            let config = JumpDownConfig::new(JumpDownSettings {
                jump_length: l,
                jump_max_depth: d,
                jump_height: h,
                jump_distance_from_edge: 0.0,
                ..Default::default()
            })
            .unwrap();

            assert!((config.height_at(l) + d).abs() < 1e-3 * l);
            assert!((config.apex().y - h).abs() < 1e-3 * h.max(1.0));
            assert!((config.down_ratio() - d / l).abs() < 1e-6);
        }
    }

    #[test]
    fn test_jump_down_validation() {
        let bad = [
            JumpDownSettings {
                jump_length: 0.0,
                ..Default::default()
            },
            JumpDownSettings {
                jump_max_depth: 0.0,
                jump_height: 0.0,
                ..Default::default()
            },
            JumpDownSettings {
                sampling_separation_factor: 0.5,
                ..Default::default()
            },
            JumpDownSettings {
                jump_distance_from_edge: 200.0,
                ..Default::default()
            },
        ];

        for settings in bad {
            assert!(matches!(
                JumpDownConfig::new(settings),
                Err(Error::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_jump_over_arc() {
        let config = JumpOverConfig::new(JumpOverSettings::default()).unwrap();
        let center = config.gap_center();
        let reach = config.settings().jump_distance_from_gap_center;

        assert!((config.height_at(center) - config.settings().jump_height).abs() < 1e-4);
        assert!(config.height_at(center - reach).abs() < 1e-4);
        assert!(config.height_at(center + reach).abs() < 1e-4);

        for t in [5.0, 20.0, 47.5, 79.0] {
            let a = config.height_at(center + t);
            let b = config.height_at(center - t);
            assert!((a - b).abs() < 1e-3);
        }

        assert!(JumpOverConfig::new(JumpOverSettings {
            jump_gap_width: -1.0,
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_action_config_accessors() {
        let down: ActionConfig = JumpDownConfig::new(JumpDownSettings::default())
            .unwrap()
            .into();
        assert_eq!(down.action(), JumpAction::Down);
        assert!(down.enabled());

        let over: ActionConfig = JumpOverConfig::new(JumpOverSettings::default())
            .unwrap()
            .into();
        assert_eq!(over.action(), JumpAction::Over);
        assert!(!over.enabled());
        assert_eq!(over.filter_distance_threshold(), 80.0);
    }

    #[test]
    fn test_builder_config_validation() {
        assert!(LinkBuilderConfig::default().validate().is_ok());
        let config = LinkBuilderConfig {
            cell_size: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
