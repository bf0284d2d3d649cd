//! Extraction of the tracking handle from an asynchronous search service's
//! HTML "please wait" page.
//!
//! The page carries two literal markers, `RID =` (request id) and `RTOE =`
//! (estimated seconds to completion), each terminated by a newline. When
//! neither is present the page is usually an error page, so a sequence of
//! independent extractors is tried against known error-container markup
//! before giving up with a generic layout error.

use serde::Serialize;

use crate::{IrisError, Result};

const RID_MARKER: &str = "RID =";
const RTOE_MARKER: &str = "RTOE =";

/// Tracking handle for an accepted asynchronous search job.
///
/// Produced by [`parse_wait_page`]; a poller later resolves the handle into
/// real results or a timeout failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHandle {
    pub request_id: String,
    pub estimated_seconds: u64,
}

/// Parse the interstitial page into a [`SearchHandle`].
///
/// Fails with a descriptive error when either marker is missing or the
/// estimate is not a non-negative integer; the error cites whichever value
/// was found.
pub fn parse_wait_page(html: &str) -> Result<SearchHandle> {
    let rid = marker_value(html, RID_MARKER);
    let rtoe = marker_value(html, RTOE_MARKER);

    match (rid, rtoe) {
        (Some(rid), Some(rtoe)) => {
            let estimated_seconds = rtoe.parse::<u64>().map_err(|_| {
                IrisError::Parse(format!(
                    "a non-integer estimated time to completion was found in the \
                     'please wait' page: '{rtoe}'"
                ))
            })?;
            Ok(SearchHandle { request_id: rid.to_string(), estimated_seconds })
        }
        (Some(rid), None) => Err(IrisError::Parse(format!(
            "no estimated time to completion was found in the 'please wait' page \
             (although request id = {rid})"
        ))),
        (None, Some(rtoe)) => Err(IrisError::Parse(format!(
            "no request id was found in the 'please wait' page \
             (although estimated time to completion = {rtoe})"
        ))),
        (None, None) => Err(error_from_page(html)),
    }
}

/// Value following a literal marker, up to the next line break. Empty values
/// count as missing.
fn marker_value<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    let value = rest[..end].trim();
    (!value.is_empty()).then_some(value)
}

type ErrorExtractor = fn(&str) -> Option<String>;

/// Extractors tried in order when the page carries neither marker. All of
/// them operate on the same decoded page text.
const ERROR_EXTRACTORS: [ErrorExtractor; 3] =
    [classed_error_div, classed_error_paragraph, message_id_marker];

fn error_from_page(html: &str) -> IrisError {
    for extract in ERROR_EXTRACTORS {
        if let Some(msg) = extract(html) {
            return IrisError::Parse(format!("error message from NCBI: {msg}"));
        }
    }
    IrisError::Parse(
        "no request id and no estimated time to completion were found in the \
         'please wait' page"
            .to_string(),
    )
}

fn classed_error_div(html: &str) -> Option<String> {
    enclosed_message(html, r#"<div class="error msInf">"#, "</div>")
}

fn classed_error_paragraph(html: &str) -> Option<String> {
    enclosed_message(html, r#"<p class="error">"#, "</p>")
}

fn message_id_marker(html: &str) -> Option<String> {
    let start = html.find("Message ID#")?;
    // Break the message at the first HTML tag or line break.
    let msg = html[start..]
        .split('<')
        .next()
        .and_then(|m| m.split('\n').next())
        .map(str::trim)
        .unwrap_or_default();
    (!msg.is_empty()).then(|| msg.to_string())
}

fn enclosed_message(html: &str, open: &str, close: &str) -> Option<String> {
    let start = html.find(open)? + open.len();
    let msg = html[start..]
        .split(close)
        .next()
        .and_then(|m| m.split('\n').next())
        .map(str::trim)
        .unwrap_or_default();
    (!msg.is_empty()).then(|| msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_request_id_and_estimate() {
        let html = "<html>\nRID = ABC123\nRTOE = 15\n</html>";
        let handle = parse_wait_page(html).unwrap();
        assert_eq!(
            handle,
            SearchHandle { request_id: "ABC123".into(), estimated_seconds: 15 }
        );
    }

    #[test]
    fn marker_values_are_trimmed() {
        let html = "RID =   XYZ-99  \nRTOE =  0 \n";
        let handle = parse_wait_page(html).unwrap();
        assert_eq!(handle.request_id, "XYZ-99");
        assert_eq!(handle.estimated_seconds, 0);
    }

    #[test]
    fn missing_estimate_cites_the_id_found() {
        let err = parse_wait_page("RID = ABC123\n").unwrap_err();
        assert!(err.to_string().contains("ABC123"));
        assert!(err.to_string().contains("no estimated time to completion"));
    }

    #[test]
    fn missing_id_cites_the_estimate_found() {
        let err = parse_wait_page("RTOE = 12\n").unwrap_err();
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("no request id"));
    }

    #[test]
    fn non_integer_estimate_cites_the_literal_value() {
        let err = parse_wait_page("RID = ABC123\nRTOE = fifteen\n").unwrap_err();
        assert!(err.to_string().contains("'fifteen'"));
    }

    #[test]
    fn negative_estimate_is_rejected() {
        let err = parse_wait_page("RID = ABC123\nRTOE = -3\n").unwrap_err();
        assert!(err.to_string().contains("'-3'"));
    }

    #[test]
    fn error_div_message_is_surfaced() {
        let html = r#"<body><div class="error msInf">No results found</div></body>"#;
        let err = parse_wait_page(html).unwrap_err();
        assert!(err.to_string().contains("No results found"));
    }

    #[test]
    fn error_paragraph_is_tried_after_the_div() {
        let html = r#"<p class="error">Query contains no data</p>"#;
        let err = parse_wait_page(html).unwrap_err();
        assert!(err.to_string().contains("Query contains no data"));
    }

    #[test]
    fn message_id_marker_is_the_last_resort() {
        let html = "<body>Message ID#24 Error: Failed to read the Blast query.</body>";
        let err = parse_wait_page(html).unwrap_err();
        assert!(err
            .to_string()
            .contains("Message ID#24 Error: Failed to read the Blast query."));
    }

    #[test]
    fn unrecognized_layout_gets_a_generic_error() {
        let err = parse_wait_page("<html><body>nothing here</body></html>").unwrap_err();
        assert!(err.to_string().contains("no request id"));
        assert!(err.to_string().contains("no estimated time"));
    }

    #[test]
    fn empty_marker_value_counts_as_missing() {
        let err = parse_wait_page("RID =\nRTOE = 5\n").unwrap_err();
        assert!(err.to_string().contains("no request id"));
    }
}
