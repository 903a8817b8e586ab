use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::{Serialize, Serializer};
use tracing::debug;

use super::domain::{format_price, House, RecordError, Tenant};

const HOUSE_FIELDS: usize = 6;
const TENANT_FIELDS: usize = 3;

/// Destination for the two record sequences. `save_*` return the number of
/// rows written.
pub trait RentalStore {
    fn save_houses(&self, houses: &[House]) -> Result<usize, StorageError>;
    fn save_tenants(&self, tenants: &[Tenant]) -> Result<usize, StorageError>;
    fn load_houses(&self) -> Result<Vec<House>, StorageError>;
    fn load_tenants(&self) -> Result<Vec<Tenant>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("line {line}: {source}")]
    InvalidRecord { line: u64, source: RecordError },
}

/// Flat-file store: one comma separated line per record, no header.
#[derive(Debug, Clone)]
pub struct FileStore {
    houses_path: PathBuf,
    tenants_path: PathBuf,
}

impl FileStore {
    pub fn new(houses_path: impl Into<PathBuf>, tenants_path: impl Into<PathBuf>) -> Self {
        Self {
            houses_path: houses_path.into(),
            tenants_path: tenants_path.into(),
        }
    }

    pub fn houses_path(&self) -> &Path {
        &self.houses_path
    }

    pub fn tenants_path(&self) -> &Path {
        &self.tenants_path
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, StorageError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Opens `path` for reading; a missing file reads as empty.
fn open(path: &Path) -> Result<Option<BufReader<File>>, StorageError> {
    match File::open(path) {
        Ok(file) => Ok(Some(BufReader::new(file))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no saved data");
            Ok(None)
        }
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl RentalStore for FileStore {
    fn save_houses(&self, houses: &[House]) -> Result<usize, StorageError> {
        write_houses(create(&self.houses_path)?, houses)?;
        Ok(houses.len())
    }

    fn save_tenants(&self, tenants: &[Tenant]) -> Result<usize, StorageError> {
        write_tenants(create(&self.tenants_path)?, tenants)?;
        Ok(tenants.len())
    }

    fn load_houses(&self) -> Result<Vec<House>, StorageError> {
        match open(&self.houses_path)? {
            Some(reader) => read_houses(reader),
            None => Ok(Vec::new()),
        }
    }

    fn load_tenants(&self) -> Result<Vec<Tenant>, StorageError> {
        match open(&self.tenants_path)? {
            Some(reader) => read_tenants(reader),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Serialize)]
struct HouseRow<'a> {
    id: u32,
    location: &'a str,
    #[serde(serialize_with = "price_as_decimal")]
    price: f64,
    bedrooms: u32,
    owner: &'a str,
    booked: bool,
}

impl<'a> From<&'a House> for HouseRow<'a> {
    fn from(house: &'a House) -> Self {
        Self {
            id: house.id(),
            location: house.location(),
            price: house.price(),
            bedrooms: house.bedrooms(),
            owner: house.owner(),
            booked: house.is_booked(),
        }
    }
}

fn price_as_decimal<S>(price: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_price(*price))
}

#[derive(Serialize)]
struct TenantRow<'a> {
    name: &'a str,
    contact: &'a str,
    preferred_location: &'a str,
}

impl<'a> From<&'a Tenant> for TenantRow<'a> {
    fn from(tenant: &'a Tenant) -> Self {
        Self {
            name: tenant.name(),
            contact: tenant.contact(),
            preferred_location: tenant.preferred_location(),
        }
    }
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Writes `id,location,price,bedrooms,owner,booked` lines. Fields holding a
/// comma, quote, or line break are quoted.
pub fn write_houses<W: Write>(writer: W, houses: &[House]) -> Result<(), csv::Error> {
    let mut csv_writer = csv_writer(writer);
    for house in houses {
        csv_writer.serialize(HouseRow::from(house))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes `name,contact,preferredLocation` lines.
pub fn write_tenants<W: Write>(writer: W, tenants: &[Tenant]) -> Result<(), csv::Error> {
    let mut csv_writer = csv_writer(writer);
    for tenant in tenants {
        csv_writer.serialize(TenantRow::from(tenant))?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

fn malformed(line: u64, reason: impl Into<String>) -> StorageError {
    StorageError::MalformedRow {
        line,
        reason: reason.into(),
    }
}

/// Reads house lines. Unquoted rows with more than six fields are treated as
/// a location containing commas.
pub fn read_houses<R: Read>(reader: R) -> Result<Vec<House>, StorageError> {
    let mut houses = Vec::new();
    for record in csv_reader(reader).records() {
        let record = record?;
        houses.push(decode_house(&record)?);
    }
    Ok(houses)
}

fn decode_house(record: &StringRecord) -> Result<House, StorageError> {
    let line = line_of(record);
    let fields: Vec<&str> = record.iter().collect();
    let count = fields.len();
    if count < HOUSE_FIELDS {
        return Err(malformed(
            line,
            format!("expected {HOUSE_FIELDS} house fields, found {count}"),
        ));
    }

    let id = fields[0]
        .parse::<i32>()
        .map_err(|_| malformed(line, format!("invalid house id '{}'", fields[0])))?;
    let location = fields[1..count - 4].join(",");
    let price = fields[count - 4]
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| malformed(line, format!("invalid price '{}'", fields[count - 4])))?;
    let bedrooms = fields[count - 3]
        .parse::<i32>()
        .map_err(|_| malformed(line, format!("invalid bedrooms '{}'", fields[count - 3])))?;
    let owner = fields[count - 2];
    let booked = fields[count - 1]
        .parse::<bool>()
        .map_err(|_| malformed(line, format!("invalid booked flag '{}'", fields[count - 1])))?;

    let house = House::new(id, location, price, bedrooms, owner)
        .map_err(|source| StorageError::InvalidRecord { line, source })?;
    Ok(house.with_booked(booked))
}

/// Reads tenant lines. Extra unquoted fields belong to the preferred location.
pub fn read_tenants<R: Read>(reader: R) -> Result<Vec<Tenant>, StorageError> {
    let mut tenants = Vec::new();
    for record in csv_reader(reader).records() {
        let record = record?;
        let line = line_of(&record);
        let fields: Vec<&str> = record.iter().collect();
        if fields.len() < TENANT_FIELDS {
            return Err(malformed(
                line,
                format!(
                    "expected {TENANT_FIELDS} tenant fields, found {}",
                    fields.len()
                ),
            ));
        }
        let tenant = Tenant::new(fields[0], fields[1], fields[2..].join(","))
            .map_err(|source| StorageError::InvalidRecord { line, source })?;
        tenants.push(tenant);
    }
    Ok(tenants)
}
