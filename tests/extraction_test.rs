#[cfg(test)]
mod tests {
    use festival_scraper::domain::TicketObservation;
    use festival_scraper::extract::event::extract_event;
    use scraper::Html;

    const BASE_URL: &str = "https://www.lucernefestival.ch";
    const EVENT_URL: &str = "https://www.lucernefestival.ch/en/program/symphony-concert-1";

    /// Builds a full event page with the given ticket section markup.
    fn event_page(ticket_section: &str) -> String {
        format!(
            r#"<html><body>
            <h1>Symphony Concert 1</h1>
            <picture><source srcset="/media/event.jpg"><img src="/media/event_small.jpg"></picture>
            <p><strong>Date and Venue</strong><br>
                Tue 16.08. | 19.30 | KKL Luzern, Concert Hall
            </p>
            <section id="venue"><a href="/en/venues/kkl-luzern">KKL Luzern</a></section>
            <div class="program">
                <div class="program-item"><strong>Symphony Concert 1</strong></div>
                <div class="program-item negative-margin"></div>
                <div class="program-item"><strong>Johann Sebastian Bach</strong> 1685–1750
                    <br><em>Concerto</em>
                </div>
                <div class="program-item"><em>Suite</em></div>
                <div class="program-item"><strong>Interval</strong> approx. twenty minutes
                    <br><em>Orphan</em>
                </div>
            </div>
            <ul class="performers-list">
                <li><strong>Herbert Blomstedt:</strong> conductor</li>
                <li><strong>
	Martha Argerich:</strong> piano</li>
            </ul>
            {ticket_section}
            </body></html>"#
        )
    }

    #[test]
    fn extracts_scalar_fields() {
        let html = event_page("");
        let document = Html::parse_document(&html);
        let record = extract_event(&document, EVENT_URL, BASE_URL, 2022).unwrap();

        assert_eq!(record.title, "Symphony Concert 1");
        assert_eq!(record.starting_time.to_string(), "2022-08-16 19:30:00");
        assert_eq!(record.venue_name, "KKL Luzern, Concert Hall");
        assert_eq!(record.url, EVENT_URL);
        assert_eq!(
            record.img_url.as_deref(),
            Some("https://www.lucernefestival.ch/media/event.jpg")
        );
        assert_eq!(
            record.venue_url.as_deref(),
            Some("https://www.lucernefestival.ch/en/venues/kkl-luzern")
        );
    }

    #[test]
    fn composer_state_machine_attaches_pieces_across_headerless_rows() {
        let html = event_page("");
        let document = Html::parse_document(&html);
        let record = extract_event(&document, EVENT_URL, BASE_URL, 2022).unwrap();

        // The event-title header is an annotation, "Interval" fails the year
        // parse, so Bach is the only composer row
        assert_eq!(record.composers.len(), 1);
        assert_eq!(record.composers[0].name, "Johann Sebastian Bach");
        assert_eq!(record.composers[0].birth_year, 1685);
        assert_eq!(record.composers[0].death_year, Some(1750));

        // "Suite" sits in a headerless continuation row and still attaches to
        // Bach; "Orphan" follows the failed "Interval" header and is dropped
        assert_eq!(
            record.pieces,
            vec![
                (
                    "Johann Sebastian Bach".to_string(),
                    "Concerto".to_string()
                ),
                ("Johann Sebastian Bach".to_string(), "Suite".to_string()),
            ]
        );
    }

    #[test]
    fn performers_are_cleaned() {
        let html = event_page("");
        let document = Html::parse_document(&html);
        let record = extract_event(&document, EVENT_URL, BASE_URL, 2022).unwrap();

        assert_eq!(
            record.performers,
            vec!["Herbert Blomstedt".to_string(), "Martha Argerich".to_string()]
        );
    }

    #[test]
    fn event_without_program_items_is_valid() {
        let html = r#"<html><body>
            <h1>Festival Talk</h1>
            <p><strong>Date and Venue</strong><br> Wed 17.08. | 18.00 | Inseli Park </p>
        </body></html>"#;
        let document = Html::parse_document(html);
        let record = extract_event(&document, EVENT_URL, BASE_URL, 2022).unwrap();

        assert!(record.composers.is_empty());
        assert!(record.pieces.is_empty());
        assert!(record.performers.is_empty());
        assert!(record.tickets.is_empty());
        assert_eq!(record.img_url, None);
        assert_eq!(record.venue_url, None);
    }

    #[test]
    fn past_event_marker_wins_over_price_container() {
        let html = event_page(
            r#"<span class="status past-event">Past event</span>
               <div class="prices">CHF 30 / 50</div>"#,
        );
        let document = Html::parse_document(&html);
        let record = extract_event(&document, EVENT_URL, BASE_URL, 2022).unwrap();
        assert!(record.tickets.is_empty());
    }

    #[test]
    fn free_entry_yields_single_zero_price_observation() {
        let html = event_page(r#"<span class="status free-entry">Free entry</span>"#);
        let document = Html::parse_document(&html);
        let record = extract_event(&document, EVENT_URL, BASE_URL, 2022).unwrap();
        assert_eq!(
            record.tickets,
            vec![TicketObservation {
                price: 0,
                available: true
            }]
        );
    }

    #[test]
    fn priced_tickets_distinguish_available_and_sold_out() {
        let html = event_page(
            r#"<div class="prices">CHF 30 / 50<span class="striked">120</span><span class="limited">99</span></div>"#,
        );
        let document = Html::parse_document(&html);
        let record = extract_event(&document, EVENT_URL, BASE_URL, 2022).unwrap();

        // The unrecognized "limited" element is skipped, not an error
        assert_eq!(
            record.tickets,
            vec![
                TicketObservation {
                    price: 30,
                    available: true
                },
                TicketObservation {
                    price: 50,
                    available: true
                },
                TicketObservation {
                    price: 120,
                    available: false
                },
            ]
        );
    }

    #[test]
    fn no_price_container_yields_empty_collection() {
        let html = event_page("");
        let document = Html::parse_document(&html);
        let record = extract_event(&document, EVENT_URL, BASE_URL, 2022).unwrap();
        assert!(record.tickets.is_empty());
    }

    #[test]
    fn missing_title_is_fatal_for_the_event() {
        let html = r#"<html><body>
            <p><strong>Date and Venue</strong><br> Tue 16.08. | 19.30 | KKL Luzern </p>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert!(extract_event(&document, EVENT_URL, BASE_URL, 2022).is_err());
    }

    #[test]
    fn missing_date_venue_marker_is_fatal_for_the_event() {
        let html = "<html><body><h1>Symphony Concert 1</h1></body></html>";
        let document = Html::parse_document(html);
        assert!(extract_event(&document, EVENT_URL, BASE_URL, 2022).is_err());
    }

    #[test]
    fn malformed_date_venue_line_is_fatal_for_the_event() {
        let html = r#"<html><body>
            <h1>Symphony Concert 1</h1>
            <p><strong>Date and Venue</strong><br> Tue 16.08. | KKL Luzern </p>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert!(extract_event(&document, EVENT_URL, BASE_URL, 2022).is_err());
    }
}
