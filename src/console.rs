//! Line-oriented operator console over `ReservationService`.
//!
//! One command per line; arguments are whitespace separated, double quotes group
//! words (`book "Lecture Hall" 2026-03-02T09:00 2026-03-02T10:00 Kickoff`).

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use ulid::Ulid;

use crate::engine::BookingError;
use crate::model::Role;
use crate::service::{CreateReservation, ReservationService};
use crate::time::TimeInput;

pub const HELP: &str = "\
commands:
  login <user>                         act as <user> for subsequent commands
  logout
  rooms                                list rooms
  add-room <capacity> <name>           add a room (admin)
  delete-room <room>                   delete a room and its bookings (admin)
  book <room> <start> <end> <title>    reserve a slot; times are RFC 3339 or local YYYY-MM-DDTHH:MM
  cancel <reservation-id>              cancel one of your reservations
  day <YYYY-MM-DD>                     rooms and bookings for a local day
  mine                                 your upcoming reservations
  users                                known users
  seed                                 add sample rooms and users (admin)
  help
  quit";

/// A room referenced either by id or by (case-insensitive) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomRef {
    Id(Ulid),
    Name(String),
}

/// Parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { login: String },
    Logout,
    ListRooms,
    AddRoom { name: String, capacity: i64 },
    DeleteRoom { room: RoomRef },
    Book {
        room: RoomRef,
        start: TimeInput,
        end: TimeInput,
        title: String,
    },
    Cancel { id: Ulid },
    Day { date: NaiveDate },
    Upcoming,
    Users,
    Seed,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0}: expected {1} arguments, got {2}")]
    WrongArity(&'static str, usize, usize),
    #[error("log in first")]
    NotLoggedIn,
    #[error("admin only")]
    NotAdmin,
    #[error("room not found: {0}")]
    UnknownRoom(String),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("output error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_command(line: &str) -> Result<Command, ConsoleError> {
    let args = tokenize(line)?;
    let Some((head, rest)) = args.split_first() else {
        return Err(ConsoleError::Empty);
    };

    match head.to_ascii_lowercase().as_str() {
        "login" => {
            arity("login", rest, 1)?;
            Ok(Command::Login { login: rest[0].clone() })
        }
        "logout" => Ok(Command::Logout),
        "rooms" => Ok(Command::ListRooms),
        "add-room" => {
            if rest.len() < 2 {
                return Err(ConsoleError::WrongArity("add-room", 2, rest.len()));
            }
            let capacity = rest[0]
                .parse()
                .map_err(|_| ConsoleError::Parse(format!("capacity '{}' is not a number", rest[0])))?;
            Ok(Command::AddRoom {
                name: rest[1..].join(" "),
                capacity,
            })
        }
        "delete-room" => {
            arity("delete-room", rest, 1)?;
            Ok(Command::DeleteRoom { room: room_ref(&rest[0]) })
        }
        "book" => {
            if rest.len() < 4 {
                return Err(ConsoleError::WrongArity("book", 4, rest.len()));
            }
            Ok(Command::Book {
                room: room_ref(&rest[0]),
                start: rest[1].parse()?,
                end: rest[2].parse()?,
                title: rest[3..].join(" "),
            })
        }
        "cancel" => {
            arity("cancel", rest, 1)?;
            Ok(Command::Cancel { id: parse_ulid(&rest[0])? })
        }
        "day" => {
            arity("day", rest, 1)?;
            let date = NaiveDate::parse_from_str(&rest[0], "%Y-%m-%d")
                .map_err(|e| ConsoleError::Parse(format!("date '{}': {e}", rest[0])))?;
            Ok(Command::Day { date })
        }
        "mine" => Ok(Command::Upcoming),
        "users" => Ok(Command::Users),
        "seed" => Ok(Command::Seed),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ConsoleError::Unknown(other.to_string())),
    }
}

fn arity(cmd: &'static str, rest: &[String], expected: usize) -> Result<(), ConsoleError> {
    if rest.len() != expected {
        return Err(ConsoleError::WrongArity(cmd, expected, rest.len()));
    }
    Ok(())
}

fn room_ref(s: &str) -> RoomRef {
    match Ulid::from_string(s) {
        Ok(id) => RoomRef::Id(id),
        Err(_) => RoomRef::Name(s.to_string()),
    }
}

fn parse_ulid(s: &str) -> Result<Ulid, ConsoleError> {
    Ulid::from_string(s).map_err(|e| ConsoleError::Parse(format!("id '{s}': {e}")))
}

/// Whitespace split that keeps double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>, ConsoleError> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    out.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if in_quotes {
        return Err(ConsoleError::Parse("unterminated quote".into()));
    }
    if pending {
        out.push(current);
    }
    Ok(out)
}

/// Console session: the service plus whoever is currently logged in.
pub struct Console {
    service: Arc<ReservationService>,
    login: Option<String>,
}

impl Console {
    pub fn new(service: Arc<ReservationService>) -> Self {
        Self { service, login: None }
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub async fn execute(&mut self, cmd: Command) -> Result<String, ConsoleError> {
        match cmd {
            Command::Login { login } => {
                let role = if login.eq_ignore_ascii_case("admin") { Role::Admin } else { Role::User };
                let user = self.service.users().add_or_get(&login, role)?;
                let msg = format!("logged in as {} ({:?})", user.login, user.role);
                self.login = Some(user.login);
                Ok(msg)
            }
            Command::Logout => {
                self.login = None;
                Ok("logged out".into())
            }
            Command::ListRooms => json(&self.service.list_resources().await),
            Command::AddRoom { name, capacity } => {
                self.require_admin()?;
                let room = self.service.add_resource(&name, capacity).await?;
                Ok(format!("added room {} ({})", room.name, room.id))
            }
            Command::DeleteRoom { room } => {
                self.require_admin()?;
                let id = self.resolve_room(&room).await?;
                if self.service.delete_resource(id).await {
                    Ok(format!("deleted room {id}"))
                } else {
                    Err(ConsoleError::UnknownRoom(id.to_string()))
                }
            }
            Command::Book { room, start, end, title } => {
                let owner = self.require_login()?.to_string();
                let resource_id = self.resolve_room(&room).await?;
                let reservation = self
                    .service
                    .create_reservation(CreateReservation {
                        resource_id,
                        start,
                        end,
                        title,
                        owner,
                    })
                    .await?;
                Ok(format!("booked {}", reservation.id))
            }
            Command::Cancel { id } => {
                let owner = self.require_login()?.to_string();
                self.service.cancel_reservation(id, &owner).await?;
                Ok(format!("cancelled {id}"))
            }
            Command::Day { date } => json(&self.service.day_schedule(date).await?),
            Command::Upcoming => {
                let owner = self.require_login()?.to_string();
                let upcoming: Vec<_> = self
                    .service
                    .upcoming_for(&owner)
                    .await
                    .into_iter()
                    .map(|r| self.service.localize(r))
                    .collect();
                json(&upcoming)
            }
            Command::Users => json(&self.service.users().list()),
            Command::Seed => {
                self.require_admin()?;
                self.service.seed_defaults().await?;
                Ok("seeded".into())
            }
            Command::Help => Ok(HELP.into()),
            Command::Quit => Ok("bye".into()),
        }
    }

    fn require_login(&self) -> Result<&str, ConsoleError> {
        self.login.as_deref().ok_or(ConsoleError::NotLoggedIn)
    }

    fn require_admin(&self) -> Result<(), ConsoleError> {
        let login = self.require_login()?;
        match self.service.users().find(login) {
            Some(user) if user.role == Role::Admin => Ok(()),
            _ => Err(ConsoleError::NotAdmin),
        }
    }

    async fn resolve_room(&self, room: &RoomRef) -> Result<Ulid, ConsoleError> {
        match room {
            RoomRef::Id(id) => Ok(*id),
            RoomRef::Name(name) => self
                .service
                .catalog()
                .find_by_name(name)
                .await
                .map(|r| r.id)
                .ok_or_else(|| ConsoleError::UnknownRoom(name.clone())),
        }
    }
}

fn json<T: Serialize>(value: &T) -> Result<String, ConsoleError> {
    Ok(serde_json::to_string_pretty(value)?)
}
