//! Movement system - advances trajectories and maintains tile occupancy

use hecs::{Entity, World};

use gridtown_logic::{Coordinates, Geography, NpcId, Position, Trajectory};

use crate::components::{Mobility, Npc};

/// A tile crossing performed by an NPC during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileTransfer {
    pub id: NpcId,
    pub from: Coordinates,
    pub to: Coordinates,
}

/// An NPC that reached the end of its trajectory during one tick.
#[derive(Debug, Clone, Copy)]
pub struct Arrival {
    pub entity: Entity,
    pub id: NpcId,
    pub position: Position,
}

/// What one movement tick produced. Transfers feed the fog bookkeeping;
/// arrivals feed events and re-ordering.
#[derive(Debug, Default)]
pub struct MovementOutcome {
    pub transfers: Vec<TileTransfer>,
    pub arrivals: Vec<Arrival>,
}

/// Advances every moving NPC by `dt` seconds and keeps tile occupancy lists
/// in step with the crossings. Occupancy is applied after the query so the
/// map sees each crossing exactly once.
pub fn movement_system(world: &mut World, map: &mut Geography, dt: f32) -> MovementOutcome {
    let mut outcome = MovementOutcome::default();

    for (entity, (npc, mobility, trajectory)) in
        world.query_mut::<(&Npc, &Mobility, &mut Trajectory)>()
    {
        if trajectory.has_arrived() {
            continue;
        }
        let before = trajectory.position().tile_coords();
        trajectory.update(dt, mobility.speed, map);
        let after = trajectory.position().tile_coords();
        if before != after {
            outcome.transfers.push(TileTransfer {
                id: npc.id,
                from: before,
                to: after,
            });
        }
        if trajectory.has_arrived() {
            outcome.arrivals.push(Arrival {
                entity,
                id: npc.id,
                position: trajectory.position(),
            });
        }
    }

    for transfer in &outcome.transfers {
        map.tile_mut(transfer.from).remove_npc(transfer.id);
        map.tile_mut(transfer.to).add_npc(transfer.id);
    }

    outcome
}
