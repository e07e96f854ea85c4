//! "ApplyWeather" action

use actor_factory::WorldHandle;
use contracts::{NodeStatus, WeatherParameters};
use tracing::{debug, instrument};

use crate::tree::TickContext;

/// Sets the world weather to a fixed preset
///
/// Single-tick, always `Success`. Re-applying the same preset leaves the
/// world in the same state.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyWeather {
    parameters: WeatherParameters,
}

impl ApplyWeather {
    pub fn new(parameters: WeatherParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &WeatherParameters {
        &self.parameters
    }

    #[instrument(name = "apply_weather", skip_all, fields(tick = ctx.clock.tick))]
    pub fn execute<W: WorldHandle>(&mut self, ctx: &mut TickContext<'_, W>) -> NodeStatus {
        ctx.world.set_weather(&self.parameters);
        debug!(
            cloudiness = self.parameters.cloudiness,
            fog_density = self.parameters.fog_density,
            sun_altitude_angle = self.parameters.sun_altitude_angle,
            "weather applied"
        );
        NodeStatus::Success
    }
}
