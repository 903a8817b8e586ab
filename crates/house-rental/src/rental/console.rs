//! Interactive menu over an injected line-oriented reader and writer.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use tracing::debug;

use super::domain::{format_price, House, Tenant};
use super::repository::HouseRentalSystem;
use super::store::RentalStore;

/// Line-oriented input/output pair. Tests hand in a `Cursor` and a `Vec<u8>`;
/// the binary hands in locked stdin/stdout.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `label` without a newline and reads one line. `None` once input
    /// is exhausted. Bytes that are not UTF-8 become U+FFFD.
    pub fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        while matches!(raw.last().copied(), Some(b'\n' | b'\r')) {
            raw.pop();
        }
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// Entries of the main menu, numbered as printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddHouse,
    RegisterTenant,
    SearchHouses,
    BookHouse,
    SaveData,
    Exit,
}

impl MenuChoice {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::AddHouse,
            Self::RegisterTenant,
            Self::SearchHouses,
            Self::BookHouse,
            Self::SaveData,
            Self::Exit,
        ]
    }

    pub fn from_number(number: i32) -> Option<Self> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        Self::ordered().get(index).copied()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AddHouse => "Add House",
            Self::RegisterTenant => "Register Tenant",
            Self::SearchHouses => "Search Houses",
            Self::BookHouse => "Book House",
            Self::SaveData => "Save Data",
            Self::Exit => "Exit",
        }
    }

    /// Message shown when a numeric prompt of this operation gets text.
    const fn invalid_input_hint(self) -> &'static str {
        match self {
            Self::AddHouse => {
                "Invalid input. Please enter numeric values for ID, Price, and Bedrooms."
            }
            Self::SearchHouses => "Invalid input. Please enter a numeric value for Max Price.",
            Self::BookHouse => "Invalid input. Please enter a valid House ID.",
            Self::RegisterTenant | Self::SaveData | Self::Exit => "Invalid input.",
        }
    }
}

/// Non-numeric text where a number was expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("'{0}' is not a whole number")]
    NotAnInteger(String),
    #[error("'{0}' is not a decimal number")]
    NotADecimal(String),
}

pub fn parse_integer(raw: &str) -> Result<i32, InputError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| InputError::NotAnInteger(raw.to_string()))
}

/// Accepts finite decimals only; `NaN` and infinities are rejected.
pub fn parse_decimal(raw: &str) -> Result<f64, InputError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputError::NotADecimal(raw.to_string()))
}

/// Why an operation stopped before finishing.
#[derive(Debug, thiserror::Error)]
enum Interrupt {
    #[error("input closed")]
    Closed,
    #[error(transparent)]
    Invalid(#[from] InputError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn ask<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    label: &str,
) -> Result<String, Interrupt> {
    console.prompt(label)?.ok_or(Interrupt::Closed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
    Closed,
}

/// The menu state machine: read a choice, run it, repeat until Exit or end of
/// input.
pub struct CommandLoop<'a, S: ?Sized> {
    system: &'a mut HouseRentalSystem,
    store: &'a S,
    save_on_exit: bool,
}

impl<'a, S: RentalStore + ?Sized> CommandLoop<'a, S> {
    pub fn new(system: &'a mut HouseRentalSystem, store: &'a S) -> Self {
        Self {
            system,
            store,
            save_on_exit: false,
        }
    }

    /// Save both files before leaving the loop.
    pub fn save_on_exit(mut self, enabled: bool) -> Self {
        self.save_on_exit = enabled;
        self
    }

    pub fn run<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<()> {
        loop {
            self.print_menu(console)?;
            let Some(raw) = console.prompt("Choose an option: ")? else {
                debug!("input closed at menu");
                return self.finish(console, Flow::Closed);
            };

            let number = match parse_integer(&raw) {
                Ok(number) => number,
                Err(_) => {
                    console.say("Please enter a valid number.")?;
                    continue;
                }
            };
            let Some(choice) = MenuChoice::from_number(number) else {
                console.say("Invalid choice!")?;
                continue;
            };

            match self.dispatch(choice, console)? {
                Flow::Continue => {}
                flow => return self.finish(console, flow),
            }
        }
    }

    fn print_menu<R: BufRead, W: Write>(&self, console: &mut Console<R, W>) -> io::Result<()> {
        console.say("\nHouse Rental Management System")?;
        for (position, choice) in MenuChoice::ordered().iter().enumerate() {
            console.say(format_args!("{}. {}", position + 1, choice.label()))?;
        }
        Ok(())
    }

    fn dispatch<R: BufRead, W: Write>(
        &mut self,
        choice: MenuChoice,
        console: &mut Console<R, W>,
    ) -> io::Result<Flow> {
        let outcome = match choice {
            MenuChoice::AddHouse => self.add_house(console),
            MenuChoice::RegisterTenant => self.register_tenant(console),
            MenuChoice::SearchHouses => self.search_houses(console),
            MenuChoice::BookHouse => self.book_house(console),
            MenuChoice::SaveData => self.save_data(console).map_err(Interrupt::from),
            MenuChoice::Exit => return Ok(Flow::Exit),
        };

        match outcome {
            Ok(()) => Ok(Flow::Continue),
            Err(Interrupt::Invalid(err)) => {
                debug!(?choice, error = %err, "input rejected");
                console.say(choice.invalid_input_hint())?;
                Ok(Flow::Continue)
            }
            Err(Interrupt::Closed) => {
                debug!(?choice, "input closed mid-operation");
                Ok(Flow::Closed)
            }
            Err(Interrupt::Io(err)) => Err(err),
        }
    }

    fn finish<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        flow: Flow,
    ) -> io::Result<()> {
        if self.save_on_exit {
            self.save_data(console)?;
        }
        if flow == Flow::Exit {
            console.say("Exiting...")?;
        }
        debug!(?flow, "command loop finished");
        console.output.flush()
    }

    fn add_house<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> Result<(), Interrupt> {
        let id = parse_integer(&ask(console, "Enter House ID: ")?)?;
        let location = ask(console, "Enter Location: ")?;
        let price = parse_decimal(&ask(console, "Enter Price: ")?)?;
        let bedrooms = parse_integer(&ask(console, "Enter Bedrooms: ")?)?;
        let owner = ask(console, "Enter Owner Name: ")?;

        match House::new(id, location, price, bedrooms, owner) {
            Ok(house) => {
                self.system.add_house(house);
                console.say("House added successfully.")?;
            }
            Err(err) => console.say(format_args!("Error: {err}"))?,
        }
        Ok(())
    }

    fn register_tenant<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> Result<(), Interrupt> {
        let name = ask(console, "Enter Tenant Name: ")?;
        let contact = ask(console, "Enter Contact: ")?;
        let preferred_location = ask(console, "Enter Preferred Location: ")?;

        match Tenant::new(name, contact, preferred_location) {
            Ok(tenant) => {
                self.system.register_tenant(tenant);
                console.say("Tenant registered successfully.")?;
            }
            Err(err) => console.say(format_args!("Error: {err}"))?,
        }
        Ok(())
    }

    fn search_houses<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<(), Interrupt> {
        let location = ask(console, "Enter Location: ")?;
        let max_price = parse_decimal(&ask(console, "Enter Max Price: ")?)?;

        let matches = self.system.search(&location, max_price);
        print_matches(console, &matches, &location, max_price)?;
        Ok(())
    }

    fn book_house<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<(), Interrupt> {
        let id = parse_integer(&ask(console, "Enter House ID to book: ")?)?;

        // Negative ids can never match a stored house.
        let outcome = u32::try_from(id)
            .ok()
            .and_then(|id| self.system.book(id).ok());
        match outcome {
            Some(_) => console.say("House booked successfully.")?,
            None => console.say("House not found or already booked.")?,
        }
        Ok(())
    }

    fn save_data<R: BufRead, W: Write>(&self, console: &mut Console<R, W>) -> io::Result<()> {
        let report = self.system.save(self.store);

        match &report.houses {
            Ok(_) => console.say("Houses saved successfully.")?,
            Err(err) => console.say(format_args!("Error saving houses: {err}"))?,
        }
        match &report.tenants {
            Ok(_) => console.say("Tenants saved successfully.")?,
            Err(err) => console.say(format_args!("Error saving tenants: {err}"))?,
        }
        Ok(())
    }
}

/// Prints search results, or a single "nothing found" line naming the query.
pub fn print_matches<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    matches: &[&House],
    location: &str,
    max_price: f64,
) -> io::Result<()> {
    if matches.is_empty() {
        return console.say(format_args!(
            "No available houses found in {location} up to {}.",
            format_price(max_price)
        ));
    }
    for house in matches {
        console.say(house)?;
    }
    Ok(())
}
