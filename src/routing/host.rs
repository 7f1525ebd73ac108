use bevy::prelude::*;
use super::components::{Bounds, MapPos, Routable};
use super::config::RouteConfig;
use super::scheduler::RouteHost;
use super::types::Cell;

/// Query data for every entity that takes part in route resolution.
pub type RoutableItem = (Entity, &'static MapPos, Option<&'static Bounds>, &'static mut Routable);

/// `RouteHost` over the live ECS world.
///
/// An entity is active while it matches the query, so despawning it or
/// removing its `Routable` both count as "gone".
pub struct QueryHost<'a, 'w, 's> {
    query: &'a mut Query<'w, 's, RoutableItem>,
    config: &'a RouteConfig,
}

impl<'a, 'w, 's> QueryHost<'a, 'w, 's> {
    pub fn new(query: &'a mut Query<'w, 's, RoutableItem>, config: &'a RouteConfig) -> Self {
        Self { query, config }
    }
}

impl RouteHost for QueryHost<'_, '_, '_> {
    fn is_active(&self, entity: Entity) -> bool {
        self.query.contains(entity)
    }

    fn cell_of(&self, entity: Entity) -> Option<Cell> {
        let (_, pos, bounds, _) = self.query.get(entity).ok()?;
        Some(self.config.pixel_to_cell(pos.0, bounds))
    }

    fn routable_mut(&mut self, entity: Entity) -> Option<&mut Routable> {
        let (_, _, _, routable) = self.query.get_mut(entity).ok()?;
        Some(routable.into_inner())
    }

    fn for_each_routable(&mut self, f: &mut dyn FnMut(Entity, &mut Routable)) {
        for (entity, _, _, routable) in self.query.iter_mut() {
            f(entity, routable.into_inner());
        }
    }
}
