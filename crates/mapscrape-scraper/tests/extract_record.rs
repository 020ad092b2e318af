//! Integration tests for `extract_record` against the scripted `FakePage`.

use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use mapscrape_core::{SelectorSet, WeekHours, PLACEHOLDER};
use mapscrape_scraper::testing::{FakePage, FakeView};
use mapscrape_scraper::{extract_record, BrowsingPage, ListingRef, SocialSniffer};

const LISTING: &str = "https://www.google.com/maps/place/Karachi+Bakes/@24.8607,67.0011,17z/data=!4m6";
const SOURCE: &str = "bakeries in karachi";

fn listing_ref(url: &str) -> ListingRef<'_> {
    ListingRef {
        s_no: 7,
        url,
        source: SOURCE,
    }
}

fn full_view(selectors: &SelectorSet, website: &str) -> FakeView {
    FakeView::new()
        .text(&selectors.name, "Karachi Bakes")
        .text(
            &selectors.address,
            "Shop 3, Block 5 Clifton, Karachi 75600, Pakistan",
        )
        .text(&selectors.phone, "+92 21 1234567")
        .text(&selectors.category, "Bakery")
        .attr(&selectors.rating, "aria-label", "4.6 stars ")
        .attr(&selectors.reviews, "aria-label", "1,284 reviews")
        .attr(&selectors.website, "href", website)
        .table_behind(
            &selectors.hours_button,
            &selectors.hours_rows[0],
            &[
                &["Monday", "9 AM–9 PM"],
                &["Tuesday", "9 AM–9 PM"],
                &["Wednesday", "Closed"],
                &["Thursday", "Open 24 hours"],
                &["Friday", "2–11 PM"],
                &["Saturday", "10 AM to 11 PM"],
                &["Sunday", "10 AM–11 PM"],
            ],
        )
}

async fn page_at(url: &str, view: FakeView) -> FakePage {
    let mut page = FakePage::new().with_view(url, view);
    page.navigate(url).await.expect("fake navigation succeeds");
    page
}

#[tokio::test]
async fn extracts_every_field_from_a_complete_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="https://www.instagram.com/karachibakes">ig</a>
               <a href="https://facebook.com/karachibakes">fb</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let selectors = SelectorSet::default();
    let mut page = page_at(LISTING, full_view(&selectors, &server.uri())).await;
    let sniffer = SocialSniffer::new(2, "mapscrape-test/0.1").expect("test sniffer");

    let record = extract_record(&mut page, &selectors, Some(&sniffer), listing_ref(LISTING)).await;

    assert_eq!(record.s_no, 7);
    assert_eq!(record.name, "Karachi Bakes");
    assert_eq!(record.phone_number, "+92 21 1234567");
    assert_eq!(record.category, "Bakery");
    assert_eq!(record.reviews_average, Some(4.6));
    assert_eq!(record.reviews_count, Some(1284));
    assert_eq!(record.website, server.uri());
    assert_eq!((record.latitude, record.longitude), (24.8607, 67.0011));
    assert_eq!(record.city, "Karachi");
    assert_eq!(record.zip_code, "75600");
    assert_eq!(record.country, "Pakistan");
    assert_eq!(
        record.hours.days(),
        [
            "9 AM to 9 PM",
            "9 AM to 9 PM",
            "Closed",
            "Open 24 hours",
            "2 to 11 PM",
            "10 AM to 11 PM",
            "10 AM to 11 PM",
        ]
    );
    assert_eq!(record.social.instagram_url, "https://www.instagram.com/karachibakes");
    assert_eq!(record.social.facebook_url, "https://facebook.com/karachibakes");
    assert_eq!(record.social.linkedin_url, PLACEHOLDER);
    assert_eq!(record.social.x_url, PLACEHOLDER);
    assert_eq!(record.listing_url, LISTING);
    assert_eq!(record.source, SOURCE);
    assert!(record.is_normalized());
    assert!(page.clicks.contains(&selectors.hours_button));
}

#[tokio::test]
async fn empty_listing_yields_a_normalized_placeholder_record() {
    let selectors = SelectorSet::default();
    let url = "https://www.google.com/maps/place/Nowhere";
    let mut page = page_at(url, FakeView::new()).await;

    let record = extract_record(&mut page, &selectors, None, listing_ref(url)).await;

    assert!(record.is_normalized());
    assert_eq!(record.name, PLACEHOLDER);
    assert_eq!(record.website, PLACEHOLDER);
    assert_eq!(record.reviews_average, None);
    assert_eq!(record.reviews_count, None);
    assert_eq!((record.latitude, record.longitude), (0.0, 0.0));
    assert_eq!(
        (record.city.as_str(), record.zip_code.as_str(), record.country.as_str()),
        ("-", "-", "-")
    );
    assert_eq!(record.hours, WeekHours::unknown());
    assert_eq!(record.listing_url, url);
}

#[tokio::test]
async fn failing_lookups_degrade_to_placeholders() {
    let selectors = SelectorSet::default();
    let view = full_view(&selectors, "karachibakes.example")
        .failing(&selectors.name)
        .failing(&selectors.rating)
        .failing(&selectors.hours_rows[0]);
    let mut page = page_at(LISTING, view).await;

    let record = extract_record(&mut page, &selectors, None, listing_ref(LISTING)).await;

    assert!(record.is_normalized());
    assert_eq!(record.name, PLACEHOLDER);
    assert_eq!(record.reviews_average, None);
    assert_eq!(record.reviews_count, Some(1284));
    assert_eq!(record.hours, WeekHours::unknown());
    assert_eq!(record.website, "https://karachibakes.example");
    assert_eq!(record.social.instagram_url, PLACEHOLDER);
}

#[tokio::test]
async fn hours_fall_back_to_later_row_selectors() {
    let selectors = SelectorSet::default();
    let view = FakeView::new().table(
        &selectors.hours_rows[1],
        &[&["Sunday", "Closed"], &["Note"], &["Monday", "8 AM–4 PM"]],
    );
    let mut page = page_at(LISTING, view).await;

    let record = extract_record(&mut page, &selectors, None, listing_ref(LISTING)).await;

    assert_eq!(record.hours.sunday_hours, "Closed");
    assert_eq!(record.hours.monday_hours, "8 AM to 4 PM");
    assert_eq!(record.hours.tuesday_hours, PLACEHOLDER);
    assert!(page.clicks.is_empty(), "no hours button to click");
}

#[tokio::test]
async fn coordinates_come_from_listing_url_not_current_page() {
    let selectors = SelectorSet::default();
    let current = "https://www.google.com/maps/place/Elsewhere/@10.0,20.0,17z";
    let mut page = page_at(current, FakeView::new().text(&selectors.name, "Elsewhere")).await;

    let record = extract_record(&mut page, &selectors, None, listing_ref(LISTING)).await;

    assert_eq!((record.latitude, record.longitude), (24.8607, 67.0011));
    assert_eq!(record.listing_url, LISTING);
}

#[tokio::test]
async fn social_sniffing_failure_keeps_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let selectors = SelectorSet::default();
    let mut page = page_at(LISTING, full_view(&selectors, &server.uri())).await;
    let sniffer = SocialSniffer::new(2, "mapscrape-test/0.1").expect("test sniffer");

    let record = extract_record(&mut page, &selectors, Some(&sniffer), listing_ref(LISTING)).await;

    assert_eq!(record.name, "Karachi Bakes");
    assert_eq!(record.social.instagram_url, PLACEHOLDER);
    assert_eq!(record.social.facebook_url, PLACEHOLDER);
}
