use super::*;

fn sample_record() -> Record {
    let mut record = Record::new(3, "dentists in Karachi", "https://www.google.com/maps/place/a");
    record.name = "Smile Dental".to_string();
    record.address = "12 Main Rd, Karachi 75500, Pakistan".to_string();
    record.reviews_count = Some(1234);
    record.reviews_average = Some(4.6);
    record.latitude = 24.8;
    record.longitude = 67.0;
    record.hours.monday_hours = "9 AM to 5 PM".to_string();
    record
}

#[test]
fn new_record_carries_identity_fields_only() {
    let record = Record::new(1, "cafes", "https://maps/place/x");
    assert_eq!(record.s_no, 1);
    assert_eq!(record.source, "cafes");
    assert_eq!(record.listing_url, "https://maps/place/x");
    assert!(record.name.is_empty());
    assert_eq!(record.reviews_count, None);
    assert!(record.latitude.abs() < f64::EPSILON);
}

#[test]
fn normalized_replaces_blank_strings_with_placeholder() {
    let mut record = sample_record();
    record.phone_number = "   ".to_string();
    let record = record.normalized();

    assert_eq!(record.phone_number, PLACEHOLDER);
    assert_eq!(record.website, PLACEHOLDER);
    assert_eq!(record.hours.tuesday_hours, PLACEHOLDER);
    assert_eq!(record.social.x_url, PLACEHOLDER);
    assert_eq!(record.name, "Smile Dental");
    assert_eq!(record.hours.monday_hours, "9 AM to 5 PM");
    assert!(record.is_normalized());
}

#[test]
fn normalized_is_idempotent() {
    let once = sample_record().normalized();
    let twice = once.clone().normalized();
    assert_eq!(once, twice);
}

#[test]
fn unnormalized_record_is_detected() {
    assert!(!Record::new(1, "q", "u").is_normalized());
}

#[test]
fn row_matches_columns() {
    let record = sample_record().normalized();
    let row = record.to_row();
    assert_eq!(row.len(), Record::COLUMNS.len());
    assert_eq!(Record::COLUMNS[0], "s_no");
    assert_eq!(row[0], "3");
    assert_eq!(row[5], "1234");
    assert_eq!(row[6], "4.6");
    assert_eq!(row[13], "9 AM to 5 PM");
    assert_eq!(row[24], "https://www.google.com/maps/place/a");
    assert_eq!(row[25], "dentists in Karachi");
}

#[test]
fn row_leaves_missing_ratings_empty() {
    let record = Record::new(1, "q", "u").normalized();
    let row = record.to_row();
    assert_eq!(row[5], "");
    assert_eq!(row[6], "");
}

#[test]
fn json_keys_follow_column_order() {
    let record = sample_record().normalized();
    let value = serde_json::to_value(&record).expect("serialize");
    let object = value.as_object().expect("object");
    for column in Record::COLUMNS {
        assert!(object.contains_key(column), "missing key {column}");
    }
    assert_eq!(object.len(), Record::COLUMNS.len());
}

#[test]
fn week_hours_unknown_is_all_placeholder() {
    let hours = WeekHours::unknown();
    assert!(hours.days().iter().all(|d| *d == PLACEHOLDER));
}
