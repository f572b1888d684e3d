//! NMEA 0183 RMC sentences as formatted GPS geolocation.

use time::{Date, Month, PrimitiveDateTime, Time};

use super::error::VrtError;
use super::geolocation::Geolocation;
use super::layout;
use super::prologue::Timestamp;

const METERS_PER_SECOND_PER_KNOT: f64 = 1852.0 / 3600.0;
const RMC_MIN_FIELDS: usize = 12;

fn invalid(reason: &'static str) -> VrtError {
    VrtError::InvalidSentence { reason }
}

impl Geolocation {
    /// Builds the geolocation block a receiver emits from an RMC sentence
    /// (`$GPRMC`, `$GNRMC`, ...).
    ///
    /// Latitude, longitude, speed over ground (converted from knots), track
    /// angle and magnetic variation come from the sentence; altitude and
    /// heading stay unspecified. A void fix (`V`) keeps the timestamp and
    /// leaves every coordinate unspecified. The checksum is verified when
    /// present.
    ///
    /// # Examples
    /// ```
    /// use vrtkit_core::protocols::vrt::Geolocation;
    ///
    /// let geo = Geolocation::from_nmea_rmc(
    ///     "$GPRMC,081836,A,3751.65,S,14507.36,E,000.0,360.0,130998,011.3,E*62",
    /// )?;
    /// assert_eq!(geo.timestamp.seconds, 905_674_716);
    /// assert!((geo.latitude_deg.unwrap() + 37.860833).abs() < 1e-5);
    /// # Ok::<(), vrtkit_core::VrtError>(())
    /// ```
    pub fn from_nmea_rmc(sentence: &str) -> Result<Self, VrtError> {
        let body = sentence_body(sentence)?;
        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() < RMC_MIN_FIELDS {
            return Err(invalid("too few RMC fields"));
        }
        if !fields[0].ends_with("RMC") {
            return Err(invalid("not an RMC sentence"));
        }

        let timestamp = parse_timestamp(fields[9], fields[1])?;
        let mut geo = Geolocation {
            tsi: layout::TSI_UTC,
            tsf: layout::TSF_REAL_TIME,
            timestamp,
            ..Geolocation::default()
        };

        match fields[2] {
            "A" => {}
            "V" => return Ok(geo),
            _ => return Err(invalid("unknown fix status")),
        }

        geo.latitude_deg = parse_angle(fields[3], fields[4], 2, ('N', 'S'))?;
        geo.longitude_deg = parse_angle(fields[5], fields[6], 3, ('E', 'W'))?;
        geo.speed_over_ground_mps =
            parse_optional(fields[7])?.map(|knots| knots * METERS_PER_SECOND_PER_KNOT);
        geo.track_deg = parse_optional(fields[8])?;
        geo.magnetic_variation_deg = match parse_optional(fields[10])? {
            Some(variation) => Some(apply_hemisphere(variation, fields[11], ('E', 'W'))?),
            None => None,
        };
        Ok(geo)
    }
}

/// Text between `$` and `*`, with the checksum checked when one is given.
fn sentence_body(sentence: &str) -> Result<&str, VrtError> {
    let rest = sentence
        .trim()
        .strip_prefix('$')
        .ok_or_else(|| invalid("missing '$' start delimiter"))?;
    let Some((body, checksum)) = rest.split_once('*') else {
        return Ok(rest);
    };
    let provided = checksum
        .get(..2)
        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        .ok_or_else(|| invalid("unreadable checksum"))?;
    let computed = body.bytes().fold(0u8, |acc, b| acc ^ b);
    if computed != provided {
        return Err(invalid("checksum mismatch"));
    }
    Ok(body)
}

fn parse_optional(field: &str) -> Result<Option<f64>, VrtError> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse::<f64>()
        .map(Some)
        .map_err(|_| invalid("unreadable number"))
}

fn parse_number<T: std::str::FromStr>(text: Option<&str>) -> Result<T, VrtError> {
    text.and_then(|t| t.parse().ok())
        .ok_or_else(|| invalid("unreadable date or time"))
}

/// `ddmm.mmmm` / `dddmm.mmmm` plus a hemisphere letter.
fn parse_angle(
    field: &str,
    hemisphere: &str,
    degree_digits: usize,
    signs: (char, char),
) -> Result<Option<f64>, VrtError> {
    if field.is_empty() {
        return Ok(None);
    }
    let degrees: f64 = field
        .get(..degree_digits)
        .and_then(|d| d.parse().ok())
        .ok_or_else(|| invalid("unreadable coordinate"))?;
    let minutes: f64 = field
        .get(degree_digits..)
        .and_then(|m| m.parse().ok())
        .ok_or_else(|| invalid("unreadable coordinate"))?;
    apply_hemisphere(degrees + minutes / 60.0, hemisphere, signs).map(Some)
}

fn apply_hemisphere(
    value: f64,
    hemisphere: &str,
    (positive, negative): (char, char),
) -> Result<f64, VrtError> {
    let mut letters = hemisphere.chars();
    match (letters.next(), letters.next()) {
        (Some(c), None) if c == positive => Ok(value),
        (Some(c), None) if c == negative => Ok(-value),
        _ => Err(invalid("unknown hemisphere")),
    }
}

/// `ddmmyy` and `hhmmss[.sss]` into UNIX seconds plus picoseconds.
fn parse_timestamp(date: &str, time_of_day: &str) -> Result<Timestamp, VrtError> {
    if date.len() != 6 || time_of_day.len() < 6 {
        return Err(invalid("unreadable date or time"));
    }
    let day: u8 = parse_number(date.get(0..2))?;
    let month: u8 = parse_number(date.get(2..4))?;
    let year: i32 = parse_number(date.get(4..6))?;
    // Two-digit years pivot at 1980, the start of GPS time.
    let year = if year < 80 { 2000 + year } else { 1900 + year };

    let hour: u8 = parse_number(time_of_day.get(0..2))?;
    let minute: u8 = parse_number(time_of_day.get(2..4))?;
    let seconds: f64 = parse_number(time_of_day.get(4..))?;
    if !(0.0..60.0).contains(&seconds) {
        return Err(invalid("unreadable date or time"));
    }
    let whole = seconds.trunc() as u8;
    let picoseconds = ((seconds - seconds.trunc()) * 1e12).round() as u64;

    let month = Month::try_from(month).map_err(|_| invalid("date out of range"))?;
    let date =
        Date::from_calendar_date(year, month, day).map_err(|_| invalid("date out of range"))?;
    let time = Time::from_hms(hour, minute, whole).map_err(|_| invalid("time out of range"))?;
    let unix = PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp();
    let seconds = u32::try_from(unix).map_err(|_| invalid("date out of range"))?;
    Ok(Timestamp {
        seconds,
        picoseconds,
    })
}
