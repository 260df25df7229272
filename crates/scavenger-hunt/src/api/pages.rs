//! HTML pages returned to participants' phones.

use hunt_progress::ParticipantState;

const CONGRATULATIONS: &str = "Congratulations! You\u{2019}ve completed the hunt!";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

/// Escape text for use in element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// "n/N" as shown on the progress page.
pub fn progress_label(state: &ParticipantState) -> String {
    format!("{}/{}", state.count, state.catalog_size)
}

/// Form asking for a registration number, carrying the scanned code along.
///
/// The form posts to the sibling `register` route so it works both at the
/// root and under the `/api` prefix.
pub fn registration_form(code: &str) -> String {
    let body = format!(
        "<h1>Enter Your Registration Number</h1>\n\
         <form action=\"register\" method=\"post\">\n\
         <input type=\"text\" name=\"registrationNumber\" placeholder=\"e.g., A12345\" \
         pattern=\"[A-Z0-9]+\" required />\n\
         <input type=\"hidden\" name=\"code\" value=\"{}\" />\n\
         <button type=\"submit\">Submit</button>\n\
         </form>\n\
         <p><strong>Important:</strong> Please enable cookies to participate in the scavenger hunt.</p>",
        escape(code)
    );
    layout("Scavenger Hunt Registration", &body)
}

pub fn progress(state: &ParticipantState) -> String {
    let footer = if state.is_complete() {
        format!("<p><strong>{}</strong></p>", CONGRATULATIONS)
    } else {
        "<p>Scan the next QR code!</p>".to_string()
    };

    let body = format!(
        "<h1>Component Collected!</h1>\n<p>Progress: {}</p>\n{}",
        progress_label(state),
        footer
    );
    layout("Scavenger Hunt Progress", &body)
}

pub fn invalid_code() -> String {
    layout("Invalid QR Code", "<h1>Invalid QR Code</h1>")
}

pub fn invalid_registration() -> String {
    layout(
        "Invalid Registration Number",
        "<h1>Invalid Registration Number</h1>\n<p>Use only uppercase letters and numbers.</p>",
    )
}

pub fn rate_limited() -> String {
    layout(
        "Slow Down",
        "<h1>Too Many Scans</h1>\n<p>Please wait a minute before scanning again.</p>",
    )
}

pub fn server_error() -> String {
    layout(
        "Something Broke",
        "<h1>Something broke!</h1>\n<p>Your scan was not recorded. Please try again shortly.</p>",
    )
}
