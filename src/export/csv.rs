//! Excel-friendly CSV: UTF-8 with a byte order mark.

use crate::errors::AppResult;
use chrono::Local;
use crate::models::attendance::AttendanceDetail;
use crate::models::person::Person;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const BOM: &str = "\u{feff}";

pub const PERSON_HEADERS: [&str; 10] = [
    "First Name",
    "Middle Initial",
    "Last Name",
    "Phone",
    "Email",
    "Address",
    "City",
    "State/Province",
    "Postal Code",
    "Country",
];

pub const ATTENDEE_HEADERS: [&str; 12] = [
    "First Name",
    "Middle Initial",
    "Last Name",
    "Check-in Time",
    "Family",
    "Phone",
    "Email",
    "Address",
    "City",
    "State/Province",
    "Postal Code",
    "Country",
];

fn contact_fields(p: &Person) -> [&str; 7] {
    [
        &p.phone,
        &p.email,
        &p.street_address,
        &p.city,
        &p.state_province,
        &p.postal_code,
        &p.country,
    ]
}

/// Write people rows (PERSON_HEADERS) to any writer, BOM first.
pub fn write_people<W: Write>(mut out: W, people: &[Person]) -> AppResult<()> {
    out.write_all(BOM.as_bytes())?;
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(PERSON_HEADERS)?;

    for p in people {
        let mut row = vec![p.first_name.as_str(), p.middle_initial.as_str(), p.last_name.as_str()];
        row.extend(contact_fields(p));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write attendee rows (ATTENDEE_HEADERS) to any writer, BOM first.
pub fn write_attendees<W: Write>(mut out: W, attendees: &[AttendanceDetail]) -> AppResult<()> {
    out.write_all(BOM.as_bytes())?;
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(ATTENDEE_HEADERS)?;

    for d in attendees {
        let p = &d.person;
        let checked_in = d.attendance.checked_in_at.with_timezone(&Local).to_rfc3339();
        let family = d.family_name.clone().unwrap_or_default();
        let mut row = vec![
            p.first_name.as_str(),
            p.middle_initial.as_str(),
            p.last_name.as_str(),
            checked_in.as_str(),
            family.as_str(),
        ];
        row.extend(contact_fields(p));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn people_to_file(path: &Path, people: &[Person]) -> AppResult<()> {
    write_people(File::create(path)?, people)
}

pub fn attendees_to_file(path: &Path, attendees: &[AttendanceDetail]) -> AppResult<()> {
    write_attendees(File::create(path)?, attendees)
}
