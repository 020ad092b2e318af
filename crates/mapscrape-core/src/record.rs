//! The business record produced for every scraped listing.
//!
//! Field order is the export column order. `s_no` is always the first column.

use serde::{Deserialize, Serialize};

/// Canonical value for a string field that could not be extracted.
pub const PLACEHOLDER: &str = "-";

/// Opening hours for each day of the week.
///
/// Each value is one of `"<open> to <close>"`, `"Open 24 hours"`, `"Closed"`
/// or [`PLACEHOLDER`] once the record has been normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekHours {
    pub monday_hours: String,
    pub tuesday_hours: String,
    pub wednesday_hours: String,
    pub thursday_hours: String,
    pub friday_hours: String,
    pub saturday_hours: String,
    pub sunday_hours: String,
}

impl WeekHours {
    /// All seven days set to [`PLACEHOLDER`].
    #[must_use]
    pub fn unknown() -> Self {
        let p = || PLACEHOLDER.to_string();
        Self {
            monday_hours: p(),
            tuesday_hours: p(),
            wednesday_hours: p(),
            thursday_hours: p(),
            friday_hours: p(),
            saturday_hours: p(),
            sunday_hours: p(),
        }
    }

    /// Monday-first view of the seven day values.
    #[must_use]
    pub fn days(&self) -> [&str; 7] {
        [
            self.monday_hours.as_str(),
            self.tuesday_hours.as_str(),
            self.wednesday_hours.as_str(),
            self.thursday_hours.as_str(),
            self.friday_hours.as_str(),
            self.saturday_hours.as_str(),
            self.sunday_hours.as_str(),
        ]
    }

    fn days_mut(&mut self) -> [&mut String; 7] {
        [
            &mut self.monday_hours,
            &mut self.tuesday_hours,
            &mut self.wednesday_hours,
            &mut self.thursday_hours,
            &mut self.friday_hours,
            &mut self.saturday_hours,
            &mut self.sunday_hours,
        ]
    }
}

/// Social profile URLs discovered on a business website.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub instagram_url: String,
    pub facebook_url: String,
    pub linkedin_url: String,
    pub x_url: String,
}

/// One business listing.
///
/// Built field-by-field by the extractor, then passed through
/// [`Record::normalized`] before it is handed to the result sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based position within the run, in discovery order.
    pub s_no: usize,
    pub name: String,
    pub address: String,
    pub website: String,
    pub phone_number: String,
    /// Review count with thousands separators removed.
    pub reviews_count: Option<u64>,
    /// Star rating, conventionally 0.0 to 5.0.
    pub reviews_average: Option<f64>,
    pub category: String,
    /// `0.0` when the listing URL carries no coordinates.
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub zip_code: String,
    pub country: String,
    #[serde(flatten)]
    pub hours: WeekHours,
    #[serde(flatten)]
    pub social: SocialLinks,
    /// Listing reference the record was extracted from; the dedup key.
    pub listing_url: String,
    /// The user query or URL that started the run.
    pub source: String,
}

impl Record {
    /// Export column names, in field order.
    pub const COLUMNS: [&'static str; 26] = [
        "s_no",
        "name",
        "address",
        "website",
        "phone_number",
        "reviews_count",
        "reviews_average",
        "category",
        "latitude",
        "longitude",
        "city",
        "zip_code",
        "country",
        "monday_hours",
        "tuesday_hours",
        "wednesday_hours",
        "thursday_hours",
        "friday_hours",
        "saturday_hours",
        "sunday_hours",
        "instagram_url",
        "facebook_url",
        "linkedin_url",
        "x_url",
        "listing_url",
        "source",
    ];

    /// An empty record carrying only its identity fields.
    #[must_use]
    pub fn new(s_no: usize, source: &str, listing_url: &str) -> Self {
        Self {
            s_no,
            source: source.to_string(),
            listing_url: listing_url.to_string(),
            ..Self::default()
        }
    }

    /// Replace every empty or whitespace-only string field with
    /// [`PLACEHOLDER`]. Already-normalized records come back unchanged.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for field in self.string_fields_mut() {
            if field.trim().is_empty() {
                *field = PLACEHOLDER.to_string();
            }
        }
        self
    }

    /// `true` when no string field is blank.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.string_fields().iter().all(|f| !f.trim().is_empty())
    }

    /// Every string-valued field, in column order.
    #[must_use]
    pub fn string_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = vec![
            self.name.as_str(),
            self.address.as_str(),
            self.website.as_str(),
            self.phone_number.as_str(),
            self.category.as_str(),
            self.city.as_str(),
            self.zip_code.as_str(),
            self.country.as_str(),
        ];
        fields.extend(self.hours.days());
        fields.extend([
            self.social.instagram_url.as_str(),
            self.social.facebook_url.as_str(),
            self.social.linkedin_url.as_str(),
            self.social.x_url.as_str(),
            self.listing_url.as_str(),
            self.source.as_str(),
        ]);
        fields
    }

    fn string_fields_mut(&mut self) -> Vec<&mut String> {
        let mut fields: Vec<&mut String> = vec![
            &mut self.name,
            &mut self.address,
            &mut self.website,
            &mut self.phone_number,
            &mut self.category,
            &mut self.city,
            &mut self.zip_code,
            &mut self.country,
        ];
        fields.extend(self.hours.days_mut());
        fields.extend([
            &mut self.social.instagram_url,
            &mut self.social.facebook_url,
            &mut self.social.linkedin_url,
            &mut self.social.x_url,
            &mut self.listing_url,
            &mut self.source,
        ]);
        fields
    }

    /// The record as export cells, matching [`Record::COLUMNS`]. Absent
    /// optional numbers become empty cells.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.s_no.to_string(),
            self.name.clone(),
            self.address.clone(),
            self.website.clone(),
            self.phone_number.clone(),
            self.reviews_count.map(|c| c.to_string()).unwrap_or_default(),
            self.reviews_average
                .map(|a| a.to_string())
                .unwrap_or_default(),
            self.category.clone(),
            self.latitude.to_string(),
            self.longitude.to_string(),
            self.city.clone(),
            self.zip_code.clone(),
            self.country.clone(),
            self.hours.monday_hours.clone(),
            self.hours.tuesday_hours.clone(),
            self.hours.wednesday_hours.clone(),
            self.hours.thursday_hours.clone(),
            self.hours.friday_hours.clone(),
            self.hours.saturday_hours.clone(),
            self.hours.sunday_hours.clone(),
            self.social.instagram_url.clone(),
            self.social.facebook_url.clone(),
            self.social.linkedin_url.clone(),
            self.social.x_url.clone(),
            self.listing_url.clone(),
            self.source.clone(),
        ]
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
