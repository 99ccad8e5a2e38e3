//! Universe serialization
//!
//! Provides a serializable template for loading/saving universes from RON
//! files. Templates reference worlds by name; `instantiate` resolves the
//! names into generational ids.

use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use riftgate_math::{Aabb, Quat, Vec3};

use crate::body::{Body, BodyKind};
use crate::portal::Portal;
use crate::world::{Universe, World, WorldId};

/// A serializable universe description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseTemplate {
    /// Display name (for logs)
    pub name: String,
    /// Worlds, referenced by name from portals and bodies
    pub worlds: Vec<WorldTemplate>,
    /// Portals connecting the worlds
    #[serde(default)]
    pub portals: Vec<PortalTemplate>,
    /// Bodies to spawn
    #[serde(default)]
    pub bodies: Vec<BodyTemplate>,
}

/// One world with its static terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldTemplate {
    pub name: String,
    #[serde(default)]
    pub terrain: Vec<BoxTemplate>,
}

/// A solid terrain box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxTemplate {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// A portal between two named worlds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalTemplate {
    /// Name of the world the portal surface lives in
    pub world: String,
    pub position: [f32; 3],
    pub right: [f32; 3],
    pub up: [f32; 3],
    pub width: f32,
    pub height: f32,
    /// Name of the destination world
    pub dest_world: String,
    pub destination: [f32; 3],
    /// Orientation delta as (axis, angle in degrees)
    #[serde(default)]
    pub rotation: Option<([f32; 3], f32)>,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default = "default_true")]
    pub interactable: bool,
    /// Register in the global portal list instead of spatial storage
    #[serde(default)]
    pub global: bool,
}

/// A body to spawn in a named world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyTemplate {
    pub world: String,
    pub kind: BodyKind,
    pub position: [f32; 3],
    pub half_extents: [f32; 3],
    #[serde(default)]
    pub velocity: [f32; 3],
    #[serde(default)]
    pub eye_height: Option<f32>,
}

fn default_scale() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

impl UniverseTemplate {
    /// Create an empty template
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            worlds: Vec::new(),
            portals: Vec::new(),
            bodies: Vec::new(),
        }
    }

    /// Load a template from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let template = ron::from_str(&contents)?;
        Ok(template)
    }

    /// Save a template to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Build a universe from this template
    pub fn instantiate(&self) -> Result<Universe, SceneInstantiateError> {
        let mut universe = Universe::new();
        let mut ids: HashMap<&str, WorldId> = HashMap::new();

        for world_template in &self.worlds {
            let mut world = World::new(world_template.name.clone());
            for terrain_box in &world_template.terrain {
                world.add_terrain(Aabb::new(terrain_box.min.into(), terrain_box.max.into()));
            }
            let id = universe.add_world(world);
            ids.insert(world_template.name.as_str(), id);
        }

        let resolve = |name: &str| -> Result<WorldId, SceneInstantiateError> {
            ids.get(name)
                .copied()
                .ok_or_else(|| SceneInstantiateError::UnknownWorld(name.to_string()))
        };

        for portal_template in &self.portals {
            let world = resolve(&portal_template.world)?;
            let dest_world = resolve(&portal_template.dest_world)?;

            let mut portal = Portal::new(
                world,
                portal_template.position.into(),
                portal_template.right.into(),
                portal_template.up.into(),
                portal_template.width,
                portal_template.height,
                dest_world,
                portal_template.destination.into(),
            );
            if let Some((axis, degrees)) = portal_template.rotation {
                portal = portal.with_rotation(Quat::from_axis_angle(
                    axis.into(),
                    degrees.to_radians(),
                ));
            }
            portal.scale = portal_template.scale;
            portal.mirror = portal_template.mirror;
            portal.interactable = portal_template.interactable;

            if portal_template.global {
                universe.add_global_portal(portal);
            } else {
                universe.add_portal(portal);
            }
        }

        for body_template in &self.bodies {
            let world = resolve(&body_template.world)?;
            let mut body = Body::new(
                body_template.kind,
                world,
                body_template.position.into(),
                body_template.half_extents.into(),
            )
            .with_velocity(Vec3::from(body_template.velocity));
            if let Some(eye_height) = body_template.eye_height {
                body = body.with_eye_height(eye_height);
            }
            universe.add_body(body);
        }

        Ok(universe)
    }
}

/// Error loading a universe template
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Error saving a universe template
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

/// Error instantiating a template into a universe
#[derive(Debug)]
pub enum SceneInstantiateError {
    /// A portal or body references a world name the template does not define
    UnknownWorld(String),
}

impl std::fmt::Display for SceneInstantiateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneInstantiateError::UnknownWorld(name) => {
                write!(f, "unknown world name: {}", name)
            }
        }
    }
}

impl std::error::Error for SceneInstantiateError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_world_template() -> UniverseTemplate {
        let mut template = UniverseTemplate::new("test");
        template.worlds.push(WorldTemplate {
            name: "overworld".to_string(),
            terrain: vec![BoxTemplate {
                min: [-16.0, 63.0, -16.0],
                max: [16.0, 64.0, 16.0],
            }],
        });
        template.worlds.push(WorldTemplate {
            name: "depths".to_string(),
            terrain: vec![],
        });
        template.portals.push(PortalTemplate {
            world: "overworld".to_string(),
            position: [0.0, 66.0, 0.0],
            right: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
            width: 2.0,
            height: 3.0,
            dest_world: "depths".to_string(),
            destination: [0.0, 36.0, 0.0],
            rotation: None,
            scale: 1.0,
            mirror: false,
            interactable: true,
            global: false,
        });
        template.bodies.push(BodyTemplate {
            world: "overworld".to_string(),
            kind: BodyKind::LocalCamera,
            position: [0.5, 64.0, 0.5],
            half_extents: [0.3, 0.9, 0.3],
            velocity: [0.0, 0.0, 0.0],
            eye_height: Some(1.62),
        });
        template
    }

    #[test]
    fn test_instantiate_resolves_world_names() {
        let universe = two_world_template().instantiate().expect("instantiate");
        assert_eq!(universe.worlds.len(), 2);
        assert_eq!(universe.portals.len(), 1);
        assert_eq!(universe.bodies.len(), 1);

        let (_, portal) = universe.portals.iter().next().expect("one portal");
        let dest = universe.world(portal.dest_world).expect("dest world");
        assert_eq!(dest.name, "depths");
    }

    #[test]
    fn test_instantiate_unknown_world_fails() {
        let mut template = two_world_template();
        template.portals[0].dest_world = "nowhere".to_string();
        match template.instantiate() {
            Err(SceneInstantiateError::UnknownWorld(name)) => assert_eq!(name, "nowhere"),
            other => panic!("expected UnknownWorld, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_ron_round_trip() {
        let template = two_world_template();
        let pretty = ron::ser::PrettyConfig::new().struct_names(true);
        let text = ron::ser::to_string_pretty(&template, pretty).expect("serialize");
        let parsed: UniverseTemplate = ron::from_str(&text).expect("parse");
        assert_eq!(parsed.name, template.name);
        assert_eq!(parsed.worlds.len(), 2);
        assert_eq!(parsed.portals.len(), 1);
    }
}
