use rovia_domain::Vehicle;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory vehicle registry. Read-mostly reference data for the
/// allocation engine; hosts register and (de)activate their vehicles here.
pub struct FleetRegistry {
    vehicles: HashMap<Uuid, Vehicle>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self {
            vehicles: HashMap::new(),
        }
    }

    /// Register a vehicle
    pub fn register(&mut self, vehicle: Vehicle) -> Uuid {
        let id = vehicle.id;
        self.vehicles.insert(id, vehicle);
        id
    }

    /// Get a vehicle by ID
    pub fn get(&self, vehicle_id: &Uuid) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// Activate or deactivate a listing
    pub fn set_active(&mut self, vehicle_id: &Uuid, active: bool) -> Result<(), FleetError> {
        let vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or_else(|| FleetError::NotFound(vehicle_id.to_string()))?;

        vehicle.is_active = active;
        Ok(())
    }

    /// Update the base daily rate
    pub fn set_daily_rate(&mut self, vehicle_id: &Uuid, rate_cents: i32) -> Result<(), FleetError> {
        let vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or_else(|| FleetError::NotFound(vehicle_id.to_string()))?;

        vehicle.daily_rate_cents = rate_cents;
        Ok(())
    }

    pub fn vehicles_for_host(&self, host_id: &Uuid) -> Vec<&Vehicle> {
        self.vehicles
            .values()
            .filter(|v| v.host_id == *host_id)
            .collect()
    }

    /// Active listing count for a host. Feeds the fleet-size commission default.
    pub fn fleet_size(&self, host_id: &Uuid) -> usize {
        self.vehicles
            .values()
            .filter(|v| v.host_id == *host_id && v.is_active)
            .count()
    }
}

impl Default for FleetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("Vehicle not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_size_counts_active_only() {
        let mut registry = FleetRegistry::new();
        let host_id = Uuid::new_v4();

        let car_a = Vehicle::new(host_id, "Toyota".into(), "Corolla".into(), 2022, 4500);
        let car_b = Vehicle::new(host_id, "Honda".into(), "Civic".into(), 2021, 4800);
        let parked = car_b.id;

        registry.register(car_a);
        registry.register(car_b);
        registry.register(Vehicle::new(Uuid::new_v4(), "Ford".into(), "Focus".into(), 2020, 4000));

        assert_eq!(registry.fleet_size(&host_id), 2);

        registry.set_active(&parked, false).unwrap();
        assert_eq!(registry.fleet_size(&host_id), 1);
        assert_eq!(registry.vehicles_for_host(&host_id).len(), 2);
    }

    #[test]
    fn test_unknown_vehicle() {
        let mut registry = FleetRegistry::new();
        assert!(registry.set_active(&Uuid::new_v4(), false).is_err());
    }
}
