mod common;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use common::{utc, LinearEphemeris};
use horai::ephemeris::GeoLocation;
use horai::hours::{partition, planetary_hours_for_date, RulerRotation};
use horai::{Body, HoraiError};

fn local(offset_hours: i32, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(offset_hours * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
}

#[test]
fn test_hours_are_equal_and_fill_each_span() {
    // Sunday 7 January 2024
    let rise = local(0, 2024, 1, 7, 7, 12);
    let set = local(0, 2024, 1, 7, 16, 48);
    let next_rise = local(0, 2024, 1, 8, 7, 12);

    let division = partition(rise, set, next_rise, &RulerRotation::chaldean()).unwrap();
    assert_eq!(division.day_hours.len(), 12);
    assert_eq!(division.night_hours.len(), 12);

    let day_total: Duration = division.day_hours.iter().map(|h| h.duration()).sum();
    let night_total: Duration = division.night_hours.iter().map(|h| h.duration()).sum();
    assert_eq!(day_total, set - rise);
    assert_eq!(night_total, next_rise - set);
    assert!(division.day_hours.iter().all(|h| h.duration() == Duration::minutes(48)));
    assert!(division.night_hours.iter().all(|h| h.duration() == Duration::minutes(72)));

    assert_eq!(division.day_hours[0].start, rise);
    assert_eq!(division.day_hours[11].end, set);
    assert_eq!(division.night_hours[0].start, division.day_hours[11].end);
    assert_eq!(division.night_hours[11].end, next_rise);
}

#[test]
fn test_hours_are_contiguous_and_numbered() {
    let rise = local(0, 2024, 1, 7, 7, 12);
    let set = local(0, 2024, 1, 7, 16, 48);
    let next_rise = local(0, 2024, 1, 8, 7, 12);

    let division = partition(rise, set, next_rise, &RulerRotation::chaldean()).unwrap();
    let hours: Vec<_> = division.hours().collect();
    assert_eq!(hours.len(), 24);
    for (i, hour) in hours.iter().enumerate() {
        assert_eq!(hour.index as usize, i + 1);
        if i > 0 {
            assert_eq!(hours[i - 1].end, hour.start);
        }
    }
}

#[test]
fn test_uneven_spans_still_end_on_set_and_next_rise() {
    // Neither span is a multiple of 12 ns, as with sub-second rise/set times.
    let rise = local(0, 2024, 1, 7, 7, 0);
    let set = rise + Duration::hours(10) + Duration::nanoseconds(7);
    let next_rise = rise + Duration::hours(24) + Duration::nanoseconds(5);

    let division = partition(rise, set, next_rise, &RulerRotation::chaldean()).unwrap();
    assert_eq!(division.day_hours[11].end, set);
    assert_eq!(division.night_hours[0].start, set);
    assert_eq!(division.night_hours[11].end, next_rise);

    let day_total: Duration = division.day_hours.iter().map(|h| h.duration()).sum();
    let night_total: Duration = division.night_hours.iter().map(|h| h.duration()).sum();
    assert_eq!(day_total, set - rise);
    assert_eq!(night_total, next_rise - set);

    for hours in [&division.day_hours, &division.night_hours] {
        let shortest = hours.iter().map(|h| h.duration()).min().unwrap();
        let longest = hours.iter().map(|h| h.duration()).max().unwrap();
        assert!(longest - shortest <= Duration::nanoseconds(1));
    }

    let last_instant = next_rise - Duration::nanoseconds(1);
    assert_eq!(division.find_hour(last_instant).map(|h| h.index), Some(24));
    assert_eq!(division.find_hour(set).map(|h| h.index), Some(13));
}

#[test]
fn test_sunday_rulers_continue_into_night() {
    let rise = local(0, 2024, 1, 7, 7, 0);
    let set = local(0, 2024, 1, 7, 17, 0);
    let next_rise = local(0, 2024, 1, 8, 7, 0);

    let division = partition(rise, set, next_rise, &RulerRotation::chaldean()).unwrap();
    assert_eq!(division.day_ruler, Body::Sun);

    let day: Vec<_> = division.day_hours.iter().map(|h| h.ruler).collect();
    assert_eq!(
        &day[..8],
        &[
            Body::Sun,
            Body::Venus,
            Body::Mercury,
            Body::Moon,
            Body::Saturn,
            Body::Jupiter,
            Body::Mars,
            Body::Sun,
        ]
    );
    // Hour 13 carries on from hour 12 (Saturn) rather than restarting.
    assert_eq!(division.day_hours[11].ruler, Body::Saturn);
    assert_eq!(division.night_hours[0].ruler, Body::Jupiter);
    assert_eq!(division.night_hours[11].ruler, Body::Mercury);
}

#[test]
fn test_weekday_is_taken_in_local_offset() {
    // 23:30 UTC on Sunday is already Monday at +05:00.
    let rise = local(5, 2024, 1, 8, 4, 30);
    assert_eq!(rise, utc(2024, 1, 7, 23, 30));
    let set = rise + Duration::hours(11);
    let next_rise = rise + Duration::hours(24);

    let division = partition(rise, set, next_rise, &RulerRotation::chaldean()).unwrap();
    assert_eq!(division.day_ruler, Body::Moon);
    assert_eq!(division.day_hours[0].ruler, Body::Moon);
}

#[test]
fn test_malformed_spans_are_rejected() {
    let rise = local(0, 2024, 1, 7, 7, 0);
    let set = local(0, 2024, 1, 7, 17, 0);

    let reversed = partition(set, rise, set + Duration::hours(14), &RulerRotation::chaldean());
    assert!(matches!(reversed, Err(HoraiError::InvalidSpan { span: "day", .. })));

    let no_night = partition(rise, set, set, &RulerRotation::chaldean());
    assert!(matches!(no_night, Err(HoraiError::InvalidSpan { span: "night", .. })));
}

#[test]
fn test_find_hour() {
    let rise = local(0, 2024, 1, 7, 6, 0);
    let set = local(0, 2024, 1, 7, 18, 0);
    let next_rise = local(0, 2024, 1, 8, 6, 0);
    let division = partition(rise, set, next_rise, &RulerRotation::chaldean()).unwrap();

    assert_eq!(division.find_hour(rise).unwrap().index, 1);
    assert_eq!(division.find_hour(local(0, 2024, 1, 7, 12, 30)).unwrap().index, 7);
    assert_eq!(division.find_hour(set).unwrap().index, 13);
    assert_eq!(division.find_hour(local(0, 2024, 1, 8, 5, 59)).unwrap().index, 24);
    assert!(division.find_hour(next_rise).is_none());
    assert!(division.find_hour(local(0, 2024, 1, 7, 5, 0)).is_none());
}

#[test]
fn test_hours_from_provider() {
    let eph = LinearEphemeris::new(utc(2024, 3, 20, 0, 0)).with_daylight(
        NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
    );
    let offset = FixedOffset::east_opt(3600).unwrap();

    // Wednesday
    let division = planetary_hours_for_date(
        &eph,
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
        &GeoLocation::new(51.48, 0.0),
        offset,
        &RulerRotation::chaldean(),
    )
    .unwrap();

    assert_eq!(division.day_ruler, Body::Mercury);
    assert_eq!(division.day_hours[0].start, utc(2024, 3, 20, 6, 0));
    assert_eq!(division.day_hours[0].start.offset(), &offset);
    assert_eq!(division.night_hours[11].end, utc(2024, 3, 21, 6, 0));
    assert_eq!(division.day_hours[0].duration(), Duration::minutes(62) + Duration::seconds(30));
}
