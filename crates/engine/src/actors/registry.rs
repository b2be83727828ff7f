use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::geometry::Vec2;

use super::actor::{Actor, ActorId, BasicActor};
use super::manager::ActorManager;

/// One placed object from a level file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    #[serde(rename = "type", default)]
    pub type_tag: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl ObjectDesc {
    pub fn new(type_tag: impl Into<String>, position: Vec2) -> Self {
        Self {
            type_tag: type_tag.into(),
            x: position.x,
            y: position.y,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Explicit size, only when both dimensions are present.
    pub fn size(&self) -> Option<Vec2> {
        Some(Vec2::new(self.width?, self.height?))
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn property_f32(&self, key: &str) -> Option<f32> {
        self.property(key)
            .and_then(Value::as_f64)
            .map(|value| value as f32)
    }

    pub fn property_bool(&self, key: &str) -> Option<bool> {
        self.property(key).and_then(Value::as_bool)
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("actor type '{type_tag}' is already registered")]
    DuplicateType { type_tag: String },
    #[error("no actor type registered for '{type_tag}'")]
    UnknownType { type_tag: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub spawned: Vec<ActorId>,
    /// Type tags of objects that had no registered constructor.
    pub skipped: Vec<String>,
}

type Factory = Box<dyn Fn(&ObjectDesc) -> Box<dyn Actor>>;

/// Maps object type tags to actor constructors.
#[derive(Default)]
pub struct ActorRegistry {
    factories: HashMap<String, Factory>,
}

impl fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("ActorRegistry").field("types", &tags).finish()
    }
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its short type name, e.g. `Coin` for `game::actors::Coin`.
    pub fn register<T: Actor + Default>(&mut self) -> Result<(), RegistryError> {
        self.register_as::<T>(short_type_name::<T>())
    }

    pub fn register_as<T: Actor + Default>(
        &mut self,
        type_tag: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.register_with(type_tag, |_| Box::new(T::default()))
    }

    /// Registers a constructor that can read the object's properties.
    pub fn register_with<F>(
        &mut self,
        type_tag: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ObjectDesc) -> Box<dyn Actor> + 'static,
    {
        let type_tag = type_tag.into();
        if self.factories.contains_key(&type_tag) {
            return Err(RegistryError::DuplicateType { type_tag });
        }
        self.factories.insert(type_tag, Box::new(factory));
        Ok(())
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.factories.contains_key(type_tag)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds a detached actor for `desc`. An empty type tag yields a
    /// [`BasicActor`]. Name, position, and an explicit size are applied on top
    /// of whatever the constructor produced.
    pub fn create(&self, desc: &ObjectDesc) -> Result<Box<dyn Actor>, RegistryError> {
        let mut actor: Box<dyn Actor> = if desc.type_tag.is_empty() {
            warn!(name = desc.name.as_str(), x = desc.x, y = desc.y, "object_without_type");
            Box::new(BasicActor::default())
        } else {
            let factory =
                self.factories
                    .get(&desc.type_tag)
                    .ok_or_else(|| RegistryError::UnknownType {
                        type_tag: desc.type_tag.clone(),
                    })?;
            factory(desc)
        };

        let core = actor.core_mut();
        if !desc.name.is_empty() {
            core.set_name(desc.name.clone());
        }
        core.set_position(desc.position());
        if let Some(size) = desc.size() {
            core.set_bbox_size(size);
        }
        core.set_source(desc.clone());
        Ok(actor)
    }

    /// Adds one actor per object. Objects with unregistered type tags are
    /// skipped and listed in the report.
    pub fn spawn_objects(&self, manager: &mut ActorManager, objects: &[ObjectDesc]) -> SpawnReport {
        let mut report = SpawnReport::default();
        for desc in objects {
            match self.create(desc) {
                Ok(actor) => report.spawned.push(manager.add_boxed(actor)),
                Err(error) => {
                    warn!(
                        error = %error,
                        name = desc.name.as_str(),
                        x = desc.x,
                        y = desc.y,
                        "object_skipped"
                    );
                    report.skipped.push(desc.type_tag.clone());
                }
            }
        }
        debug!(
            spawned = report.spawned.len(),
            skipped = report.skipped.len(),
            "objects_spawned"
        );
        report
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::actors::{ActorContext, ActorCore};
    use crate::geometry::Rect;

    #[derive(Default)]
    struct Coin {
        core: ActorCore,
        value: u32,
    }

    impl Actor for Coin {
        fn core(&self) -> &ActorCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ActorCore {
            &mut self.core
        }

        fn on_ready(&mut self, _ctx: &mut ActorContext<'_>) {
            self.core.persistent = true;
        }
    }

    fn objects() -> Vec<ObjectDesc> {
        serde_json::from_value(json!([
            { "type": "Coin", "x": 32.0, "y": 16.0, "properties": { "value": 5 } },
            { "type": "Dragon", "name": "boss", "x": 0.0, "y": 0.0 },
            { "name": "marker", "x": 4.0, "y": 8.0, "width": 2.0, "height": 3.0 }
        ]))
        .expect("valid objects")
    }

    #[test]
    fn short_type_name_strips_module_path() {
        assert_eq!(short_type_name::<Coin>(), "Coin");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ActorRegistry::new();
        registry.register::<Coin>().expect("first");
        assert_eq!(
            registry.register_as::<Coin>("Coin"),
            Err(RegistryError::DuplicateType {
                type_tag: "Coin".to_string()
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn object_desc_reads_properties_and_size() {
        let objects = objects();
        assert_eq!(objects[0].property_f32("value"), Some(5.0));
        assert_eq!(objects[0].size(), None);
        assert_eq!(objects[2].size(), Some(Vec2::new(2.0, 3.0)));
        assert!(objects[2].type_tag.is_empty());
    }

    #[test]
    fn unknown_type_fails_create() {
        let registry = ActorRegistry::new();
        let desc = ObjectDesc::new("Ghost", Vec2::ZERO);
        assert!(matches!(
            registry.create(&desc),
            Err(RegistryError::UnknownType { .. })
        ));
    }

    #[test]
    fn spawn_objects_skips_unknown_types() {
        let mut registry = ActorRegistry::new();
        registry
            .register_with("Coin", |desc| {
                Box::new(Coin {
                    value: desc.property_f32("value").unwrap_or(1.0) as u32,
                    ..Coin::default()
                })
            })
            .expect("register");
        let mut manager = ActorManager::new();

        let report = registry.spawn_objects(&mut manager, &objects());
        assert_eq!(report.spawned.len(), 2);
        assert_eq!(report.skipped, vec!["Dragon".to_string()]);
        assert_eq!(manager.len(), 2);

        let coin = manager.get_as::<Coin>(report.spawned[0]).expect("coin");
        assert_eq!(coin.value, 5);
        assert!(coin.core.persistent);
        assert_eq!(coin.core.position(), Vec2::new(32.0, 16.0));
        assert_eq!(coin.core.name(), "Coin (32, 16)");
        assert_eq!(coin.core.source().map(|source| source.x), Some(32.0));

        let marker = manager.get_as::<BasicActor>(report.spawned[1]).expect("marker");
        assert_eq!(marker.core.name(), "marker");
        assert!(!marker.core.calc_bbox_off_graphics);
        assert_eq!(marker.core.bbox(), Rect::new(4.0, 8.0, 2.0, 3.0));
    }
}
