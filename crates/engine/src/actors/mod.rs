mod actor;
mod manager;
mod registry;

pub use actor::{Actor, ActorCore, ActorId, AsAny, BasicActor};
pub use manager::{ActorContext, ActorManager, ManagerError};
pub use registry::{ActorRegistry, ObjectDesc, RegistryError, SpawnReport};
