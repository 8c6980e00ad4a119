use crate::domain::VenueDetails;
use scraper::{Html, Selector};

/// Extracts the auxiliary attributes of a venue page. Both fields are
/// optional; a venue page without an illustration or a maps link is normal.
pub fn extract_venue_details(document: &Html, base_url: &str) -> VenueDetails {
    VenueDetails {
        img_url: super::image_url(document, base_url),
        gmaps_url: gmaps_url(document),
    }
}

/// First hyperlink whose target contains a maps path.
fn gmaps_url(document: &Html) -> Option<String> {
    let link_selector = Selector::parse("a[href]").unwrap();
    document.select(&link_selector).find_map(|link| {
        let href = link.value().attr("href")?;
        href.contains("/maps/").then(|| href.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_image_and_maps_link() {
        let html = r#"
            <picture><source srcset="/media/venue.jpg"><img src="/media/venue_fallback.jpg"></picture>
            <p><a href="https://www.example.com/about">About</a></p>
            <p><a href="https://www.google.com/maps/place/KKL+Luzern">Directions</a></p>
        "#;
        let document = Html::parse_document(html);
        let details = extract_venue_details(&document, "https://example.ch");
        assert_eq!(
            details.img_url.as_deref(),
            Some("https://example.ch/media/venue.jpg")
        );
        assert_eq!(
            details.gmaps_url.as_deref(),
            Some("https://www.google.com/maps/place/KKL+Luzern")
        );
    }

    #[test]
    fn absent_markup_degrades_to_none() {
        let document = Html::parse_document("<html><body><p>Nothing here</p></body></html>");
        let details = extract_venue_details(&document, "https://example.ch");
        assert_eq!(details, VenueDetails::default());
    }
}
