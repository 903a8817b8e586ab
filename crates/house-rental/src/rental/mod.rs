//! House listings, tenants, booking, and flat-file persistence.

pub mod console;
pub mod domain;
pub mod repository;
pub mod store;

pub use console::{
    parse_decimal, parse_integer, print_matches, CommandLoop, Console, InputError, MenuChoice,
};
pub use domain::{format_price, House, RecordError, Tenant};
pub use repository::{BookingError, HouseRentalSystem, SaveReport};
pub use store::{
    read_houses, read_tenants, write_houses, write_tenants, FileStore, RentalStore, StorageError,
};
