use slotmap::new_key_type;

new_key_type! {
    /// Stable handle for a physics object, backed by a generational slot map.
    /// Handles of removed objects never alias a newer object.
    pub struct BodyId;
}

/// Handle of a sympathy link. Issued fresh for every link, so a handle left
/// on an object never matches a later link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LinkId(pub u32);

/// Something that happened during a tick, for the shell/UI/audio layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// An object's stress reached 1.0 and it entered the terminal broken state.
    ObjectBroken(BodyId),
    /// A broken or collected object was pruned from the world.
    ObjectRemoved(BodyId),
    /// A sympathy link was established between two objects.
    LinkCreated { a: BodyId, b: BodyId, similarity: f32 },
    /// The active sympathy link was torn down.
    LinkBroken { a: BodyId, b: BodyId },
    /// The player picked up a collectable worth `value`.
    Collected { id: BodyId, value: u32 },
    /// The player entered a goal trigger.
    GoalReached,
    /// The player dropped below the bottom of the map.
    PlayerFellOut,
}
