use scraper::{Html, Selector};

/// Collects the event page URLs linked from the program listing page.
pub fn event_urls(document: &Html, base_url: &str) -> Vec<String> {
    let item_selector = Selector::parse("li.event-item.fl-clr.yellow").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    document
        .select(&item_selector)
        .filter_map(|item| item.select(&link_selector).next())
        .filter_map(|link| link.value().attr("href"))
        .map(|href| format!("{base_url}{href}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_event_links_from_listing() {
        let html = r#"
            <ul>
                <li class="event-item fl-clr yellow"><a href="/en/program/a">A</a></li>
                <li class="event-item fl-clr grey"><a href="/en/program/b">B</a></li>
                <li class="event-item fl-clr yellow"><a href="/en/program/c">C</a></li>
            </ul>
        "#;
        let document = Html::parse_document(html);
        let urls = event_urls(&document, "https://example.ch");
        assert_eq!(
            urls,
            vec![
                "https://example.ch/en/program/a",
                "https://example.ch/en/program/c"
            ]
        );
    }
}
