//! Command-line surface. Every command prints its result as JSON on stdout.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use oasis_core::{BookingDraft, CabinDraft, ImageSource, ImageUpload, Session};
use oasis_types::{BookingId, CabinId, GuestData};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

/// Operator tool for the Oasis hotel back-office.
#[derive(Debug, Parser)]
#[command(name = "oasis-desk", version, about)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, short, env = "OASIS_CONFIG", default_value = "oasis-desk.yaml")]
    pub config: PathBuf,

    /// Use an empty in-process store instead of the hosted one.
    #[arg(long)]
    pub memory: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Desk commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List one page of bookings, e.g. `bookings status=checked-in page=2`.
    Bookings {
        /// Window parameters as `key=value` (`status`, `sortBy`, `page`).
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Show one booking.
    Booking {
        /// Booking id.
        id: i64,
    },
    /// List every cabin.
    Cabins,
    /// Show the hotel settings.
    Settings,
    /// Check a guest in and mark the booking paid.
    CheckIn {
        /// Booking id.
        id: i64,
        /// Add breakfast for the whole stay.
        #[arg(long)]
        breakfast: bool,
    },
    /// Check a guest out.
    CheckOut {
        /// Booking id.
        id: i64,
    },
    /// Delete a booking.
    DeleteBooking {
        /// Booking id.
        id: i64,
    },
    /// Delete a cabin.
    DeleteCabin {
        /// Cabin id.
        id: i64,
    },
    /// Create a cabin, or edit one with `--id`. A new image is uploaded
    /// after the record is written and the record is removed if that fails.
    SaveCabin(Box<CabinArgs>),
    /// Book a cabin. The price is derived from the cabin rates and settings.
    CreateBooking(Box<BookingArgs>),
}

/// Fields of `save-cabin`.
#[derive(Debug, Args)]
pub struct CabinArgs {
    /// Cabin to edit. Omit to create.
    #[arg(long)]
    pub id: Option<i64>,
    /// Display name.
    #[arg(long)]
    pub name: String,
    /// Maximum number of guests.
    #[arg(long)]
    pub max_capacity: Option<u32>,
    /// Nightly price.
    #[arg(long)]
    pub regular_price: Option<Decimal>,
    /// Flat discount off the nightly price.
    #[arg(long)]
    pub discount: Option<Decimal>,
    /// Free-text description.
    #[arg(long, default_value = "")]
    pub description: String,
    /// Local image file to upload.
    #[arg(long, conflicts_with = "image_url")]
    pub image: Option<PathBuf>,
    /// Already-hosted image URL to keep.
    #[arg(long)]
    pub image_url: Option<String>,
}

/// Fields of `create-booking`.
#[derive(Debug, Args)]
pub struct BookingArgs {
    /// Cabin to book.
    #[arg(long)]
    pub cabin: i64,
    /// First night, `YYYY-MM-DD`.
    #[arg(long)]
    pub from: NaiveDate,
    /// Departure day, `YYYY-MM-DD`.
    #[arg(long)]
    pub to: NaiveDate,
    /// Party size. Defaults to one guest.
    #[arg(long)]
    pub guests: Option<u32>,
    /// Include breakfast.
    #[arg(long)]
    pub breakfast: bool,
    /// Already paid.
    #[arg(long)]
    pub paid: bool,
    /// Notes for the front desk.
    #[arg(long)]
    pub observations: Option<String>,
    /// Guest's full name.
    #[arg(long)]
    pub full_name: String,
    /// Guest's email.
    #[arg(long)]
    pub email: String,
    /// Guest's nationality.
    #[arg(long)]
    pub nationality: Option<String>,
    /// ISO 3166 alpha-2 country code.
    #[arg(long)]
    pub country_code: String,
    /// National identity document number.
    #[arg(long)]
    pub national_id: String,
}

impl CabinArgs {
    /// Turn the arguments into a draft, reading the image file if one is given.
    async fn into_draft(self) -> anyhow::Result<CabinDraft> {
        let image = match (self.image, self.image_url) {
            (Some(path), _) => Some(ImageSource::Pending(read_image(&path).await?)),
            (None, Some(url)) => Some(ImageSource::Stored(url)),
            (None, None) => None,
        };
        Ok(CabinDraft {
            id: self.id.map(CabinId),
            name: self.name,
            max_capacity: self.max_capacity,
            regular_price: self.regular_price,
            discount: self.discount,
            description: self.description,
            image,
        })
    }
}

impl From<BookingArgs> for BookingDraft {
    fn from(args: BookingArgs) -> Self {
        Self {
            cabin_id: CabinId(args.cabin),
            start_date: midnight(args.from),
            end_date: midnight(args.to),
            num_guests: args.guests,
            has_breakfast: args.breakfast,
            is_paid: args.paid,
            observations: args.observations,
            guest: GuestData {
                full_name: args.full_name,
                email: args.email,
                nationality: args.nationality,
                country_code: args.country_code,
                national_id: args.national_id,
            },
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(ImageUpload {
        content_type: content_type(path).to_owned(),
        file_name,
        bytes,
    })
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

/// Run `command` against `session`.
pub async fn run(command: Command, session: &Session) -> anyhow::Result<()> {
    match command {
        Command::Bookings { params } => {
            let fetched = session
                .pager
                .fetch_params(params)
                .await
                .context("failed to load bookings")?;
            let view = &fetched.view;
            print(&json!({
                "page": view.window.page,
                "pageCount": view.page_count,
                "count": view.page.count,
                "sortBy": view.window.sort.to_string(),
                "fromCache": view.from_cache,
                "rows": view.page.rows,
            }))?;
            fetched.warmup.settle().await;
        }
        Command::Booking { id } => {
            let booking = session.bookings.get_booking(BookingId(id)).await?;
            print(booking.as_ref())?;
        }
        Command::Cabins => {
            let cabins = session.cabins.list().await?;
            print(cabins.as_ref())?;
        }
        Command::Settings => {
            let settings = session.bookings.settings().await?;
            print(settings.as_ref())?;
        }
        Command::CheckIn { id, breakfast } => {
            let booking = session.bookings.check_in(BookingId(id), breakfast).await?;
            print(&booking)?;
        }
        Command::CheckOut { id } => {
            let booking = session.bookings.check_out(BookingId(id)).await?;
            print(&booking)?;
        }
        Command::DeleteBooking { id } => {
            session.bookings.delete_booking(BookingId(id)).await?;
            print(&json!({ "deleted": id }))?;
        }
        Command::DeleteCabin { id } => {
            session.cabins.delete(CabinId(id)).await?;
            print(&json!({ "deleted": id }))?;
        }
        Command::SaveCabin(args) => {
            let draft = (*args).into_draft().await?;
            let cabin = session.cabins.save(draft).await?;
            print(&cabin)?;
        }
        Command::CreateBooking(args) => {
            let booking = session.bookings.create_booking((*args).into()).await?;
            print(&booking)?;
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
