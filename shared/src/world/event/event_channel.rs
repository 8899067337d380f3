use std::collections::VecDeque;

use log::debug;

use tether_serde::{BitReader, BitWrite, BitWriter, Serde};

use crate::{
    types::SubObjectIndex,
    world::{
        entity_world::World,
        event::{
            dispatch,
            entity_event::{ComponentState, EntityEvent, EntityEventKind, EventPayload},
            error::{DispatchError, EventChannelError},
        },
        registry::EntityRegistry,
        world_events::WorldEvents,
    },
    EntityId,
};

/// Counts of what happened to the envelopes of one inbound message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadReport {
    pub applied: usize,
    pub dropped: usize,
}

/// FIFO of outgoing entity events, and the reader that applies inbound ones.
#[derive(Default)]
pub struct EntityEventChannel {
    outgoing: VecDeque<EntityEvent>,
}

impl EntityEventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, target: EntityId, sub_object: SubObjectIndex, payload: EventPayload) {
        self.outgoing
            .push_back(EntityEvent::new(target, sub_object, payload));
    }

    /// Queues the current state of sub-object `index` of `target`, serialized
    /// by the sub-object itself.
    pub fn write_component_state(
        &mut self,
        registry: &EntityRegistry,
        target: EntityId,
        index: u8,
    ) -> Result<(), DispatchError> {
        let kind = EntityEventKind::ComponentState;
        let entity = registry
            .get(&target)
            .ok_or(DispatchError::EntityNotFound {
                entity: target,
                kind,
            })?;
        let sub_object = entity
            .sub_object(index)
            .ok_or(DispatchError::SubObjectOutOfRange {
                entity: target,
                index,
                count: entity.sub_objects().len(),
                kind,
            })?;
        if !sub_object.has_component_state() {
            return Err(DispatchError::Rejected {
                entity: target,
                sub_object: SubObjectIndex::Index(index),
                kind,
            });
        }

        let mut writer = BitWriter::new();
        sub_object.write_state(&mut writer);
        self.write(
            target,
            SubObjectIndex::Index(index),
            EventPayload::ComponentState(ComponentState::new(writer.to_bytes())),
        );
        Ok(())
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    pub fn outgoing_len(&self) -> usize {
        self.outgoing.len()
    }

    pub fn clear(&mut self) {
        self.outgoing.clear();
    }

    /// Drains the queue into `writer` as a continue-bit list of envelopes.
    /// Returns the number of envelopes written.
    pub fn write_messages(&mut self, writer: &mut dyn BitWrite) -> usize {
        let mut count = 0;
        while let Some(event) = self.outgoing.pop_front() {
            // write message continue bit
            true.ser(writer);
            event.ser(writer);
            count += 1;
        }
        // finish messages
        false.ser(writer);
        count
    }

    /// Reads and applies every envelope of one message, strictly in order.
    ///
    /// Envelopes that cannot be applied are dropped and counted. A decode
    /// failure stops the read, since the following envelopes cannot be located.
    ///
    /// On the authoritative host every accepted envelope is queued again on
    /// this channel so the next outgoing message relays it to all observers.
    pub fn read_messages(
        &mut self,
        reader: &mut BitReader,
        world: &mut World,
        events: &mut WorldEvents,
    ) -> Result<ReadReport, EventChannelError> {
        let mut report = ReadReport::default();
        let mut position = 0;
        let relay = world.host_type().is_authoritative();

        loop {
            let malformed = |source, applied| EventChannelError::Malformed {
                position,
                applied,
                source,
            };

            // read message continue bit
            let message_continue =
                bool::de(reader).map_err(|source| malformed(source, report.applied))?;
            if !message_continue {
                break;
            }

            let event = EntityEvent::de(reader).map_err(|source| malformed(source, report.applied))?;
            let accepted = relay.then(|| event.clone());

            match dispatch::apply(world, event, events) {
                Ok(()) => {
                    report.applied += 1;
                    if let Some(event) = accepted {
                        self.relay(world.registry(), event);
                    }
                }
                Err(error) => {
                    debug!("Dropping entity event {}: {}", position, error);
                    report.dropped += 1;
                    events.push_dispatch_error(error);
                }
            }

            position += 1;
        }

        Ok(report)
    }

    // container changes are relayed as the slots the registry ended up with,
    // which may differ from the requested ones
    fn relay(&mut self, registry: &EntityRegistry, event: EntityEvent) {
        let EntityEvent {
            target,
            sub_object,
            payload,
        } = event;

        let payload = match payload {
            EventPayload::ContainerState { .. } => {
                let SubObjectIndex::Index(index) = sub_object else {
                    return;
                };
                let Some(inventory) = registry
                    .get(&target)
                    .and_then(|entity| entity.sub_object(index))
                    .and_then(|part| part.inventory())
                else {
                    return;
                };
                EventPayload::ContainerState {
                    slots: inventory.slots().to_vec(),
                }
            }
            other => other,
        };

        self.write(target, sub_object, payload);
    }
}
