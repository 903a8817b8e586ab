use tracing::{info, warn};

use super::domain::{House, Tenant};
use super::store::{RentalStore, StorageError};

/// Booking failure. Absent and already-booked ids are deliberately not told
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("House not found or already booked.")]
    Unavailable,
}

/// Per-destination outcome of a save. One side failing never skips the other.
#[derive(Debug)]
pub struct SaveReport {
    pub houses: Result<usize, StorageError>,
    pub tenants: Result<usize, StorageError>,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.houses.is_ok() && self.tenants.is_ok()
    }
}

/// In-memory owner of the house and tenant sequences.
#[derive(Debug, Default)]
pub struct HouseRentalSystem {
    houses: Vec<House>,
    tenants: Vec<Tenant>,
}

impl HouseRentalSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrates a repository from previously saved data.
    pub fn load<S: RentalStore + ?Sized>(store: &S) -> Result<Self, StorageError> {
        let houses = store.load_houses()?;
        let tenants = store.load_tenants()?;
        info!(
            houses = houses.len(),
            tenants = tenants.len(),
            "loaded saved data"
        );
        Ok(Self { houses, tenants })
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    /// Appends a house. Duplicate ids are accepted.
    pub fn add_house(&mut self, house: House) -> &House {
        info!(house_id = house.id(), location = house.location(), "house added");
        let index = self.houses.len();
        self.houses.push(house);
        &self.houses[index]
    }

    pub fn register_tenant(&mut self, tenant: Tenant) -> &Tenant {
        info!(tenant = tenant.name(), "tenant registered");
        let index = self.tenants.len();
        self.tenants.push(tenant);
        &self.tenants[index]
    }

    /// Unbooked houses in `location` (any case) priced at or below
    /// `max_price`, in insertion order.
    pub fn search(&self, location: &str, max_price: f64) -> Vec<&House> {
        self.houses
            .iter()
            .filter(|house| house.is_available_in(location, max_price))
            .collect()
    }

    /// Books the first unbooked house carrying `id`.
    pub fn book(&self, id: u32) -> Result<&House, BookingError> {
        for house in self.houses.iter().filter(|house| house.id() == id) {
            if house.book() {
                info!(house_id = id, "house booked");
                return Ok(house);
            }
        }
        info!(house_id = id, "booking rejected");
        Err(BookingError::Unavailable)
    }

    /// Writes both sequences. Each destination is attempted regardless of the
    /// other's outcome.
    pub fn save<S: RentalStore + ?Sized>(&self, store: &S) -> SaveReport {
        let houses = store.save_houses(&self.houses);
        if let Err(err) = &houses {
            warn!(error = %err, "saving houses failed");
        }
        let tenants = store.save_tenants(&self.tenants);
        if let Err(err) = &tenants {
            warn!(error = %err, "saving tenants failed");
        }
        info!(complete = houses.is_ok() && tenants.is_ok(), "save finished");
        SaveReport { houses, tenants }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rental::domain::RecordError;
    use std::cell::RefCell;
    use std::io;
    use std::path::PathBuf;

    /// Store double that records what was written and can fail either side.
    #[derive(Default)]
    struct MemoryStore {
        fail_houses: bool,
        fail_tenants: bool,
        houses: RefCell<Vec<House>>,
        tenants: RefCell<Vec<Tenant>>,
    }

    fn unavailable(path: &str) -> StorageError {
        StorageError::Io {
            path: PathBuf::from(path),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"),
        }
    }

    impl RentalStore for MemoryStore {
        fn save_houses(&self, houses: &[House]) -> Result<usize, StorageError> {
            if self.fail_houses {
                return Err(unavailable("houses.txt"));
            }
            *self.houses.borrow_mut() = houses.to_vec();
            Ok(houses.len())
        }

        fn save_tenants(&self, tenants: &[Tenant]) -> Result<usize, StorageError> {
            if self.fail_tenants {
                return Err(unavailable("tenants.txt"));
            }
            *self.tenants.borrow_mut() = tenants.to_vec();
            Ok(tenants.len())
        }

        fn load_houses(&self) -> Result<Vec<House>, StorageError> {
            Ok(self.houses.borrow().clone())
        }

        fn load_tenants(&self) -> Result<Vec<Tenant>, StorageError> {
            Ok(self.tenants.borrow().clone())
        }
    }

    fn house(id: i32, location: &str, price: f64) -> House {
        House::new(id, location, price, 2, "Owner").expect("valid house")
    }

    fn seeded() -> HouseRentalSystem {
        let mut system = HouseRentalSystem::new();
        system.add_house(house(1, "Lagos", 500.0));
        system.add_house(house(2, "Abuja", 300.0));
        system.add_house(house(3, "lagos", 650.0));
        system.add_house(house(4, "LAGOS", 200.0));
        system
    }

    #[test]
    fn add_house_appends_unbooked_record() {
        let mut system = HouseRentalSystem::new();
        let added = system.add_house(
            House::new(1, "Lagos", 500.0, 3, "Ade").expect("valid house"),
        );
        assert!(!added.is_booked());
        assert_eq!(system.houses().len(), 1);
    }

    #[test]
    fn rejected_records_never_reach_the_sequences() {
        let system = HouseRentalSystem::new();
        assert_eq!(
            House::new(1, "Lagos", -1.0, 3, "Ade").unwrap_err(),
            RecordError::NegativePrice
        );
        assert!(system.houses().is_empty());
        assert!(system.tenants().is_empty());
    }

    #[test]
    fn search_filters_case_insensitively_in_insertion_order() {
        let system = seeded();
        let ids: Vec<u32> = system
            .search("Lagos", 600.0)
            .iter()
            .map(|house| house.id())
            .collect();
        assert_eq!(ids, vec![1, 4]);
        assert!(system.search("Lagos", 100.0).is_empty());
        assert!(system.search("Kano", 10_000.0).is_empty());
    }

    #[test]
    fn search_skips_booked_houses() {
        let system = seeded();
        system.book(1).expect("house 1 is free");
        let ids: Vec<u32> = system
            .search("lagos", 600.0)
            .iter()
            .map(|house| house.id())
            .collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn booking_is_one_way_and_unavailable_is_uniform() {
        let system = seeded();
        let booked = system.book(2).expect("house 2 is free");
        assert!(booked.is_booked());
        assert_eq!(system.book(2).unwrap_err(), BookingError::Unavailable);
        assert_eq!(system.book(99).unwrap_err(), BookingError::Unavailable);
    }

    #[test]
    fn duplicate_ids_book_first_free_match() {
        let mut system = HouseRentalSystem::new();
        system.add_house(house(5, "Lagos", 100.0));
        system.add_house(house(5, "Abuja", 200.0));

        let first = system.book(5).expect("first duplicate free");
        assert_eq!(first.location(), "Lagos");
        assert!(!system.houses()[1].is_booked(), "scan stops at first match");

        let second = system.book(5).expect("second duplicate still free");
        assert_eq!(second.location(), "Abuja");
        assert_eq!(system.book(5).unwrap_err(), BookingError::Unavailable);
    }

    #[test]
    fn save_writes_tenants_when_houses_fail() {
        let mut system = seeded();
        system.register_tenant(Tenant::new("Chioma", "0801", "Lagos").expect("valid tenant"));
        let store = MemoryStore {
            fail_houses: true,
            ..MemoryStore::default()
        };

        let report = system.save(&store);
        assert!(!report.is_complete());
        assert!(report.houses.is_err());
        assert_eq!(report.tenants.expect("tenants saved"), 1);
        assert_eq!(store.tenants.borrow().len(), 1);
    }

    #[test]
    fn save_writes_houses_when_tenants_fail() {
        let system = seeded();
        let store = MemoryStore {
            fail_tenants: true,
            ..MemoryStore::default()
        };

        let report = system.save(&store);
        assert_eq!(report.houses.expect("houses saved"), 4);
        assert!(report.tenants.is_err());
        assert_eq!(store.houses.borrow().len(), 4);
    }

    #[test]
    fn load_restores_saved_state() {
        let mut system = seeded();
        system.register_tenant(Tenant::new("Chioma", "0801", "").expect("valid tenant"));
        system.book(3).expect("house 3 free");
        let store = MemoryStore::default();
        assert!(system.save(&store).is_complete());

        let restored = HouseRentalSystem::load(&store).expect("load succeeds");
        assert_eq!(restored.houses(), system.houses());
        assert_eq!(restored.tenants(), system.tenants());
        assert!(restored.houses()[2].is_booked());
    }
}
