//! Reply-text builders. Pure functions from ranked results and closure
//! annotations to the HTML-style rich text the transport sends out; none of
//! them can fail on well-typed input.

use hawker_query::{ClosureReport, NameMatch, ProximityMatch, QueryWindow};
use hawker_types::{Snapshot, StationRef, MARKERS, TOP_K};
use rand::seq::SliceRandom;

/// Window bounds render as day/month, matching the upstream dataset.
const DAY_MONTH: &str = "%d/%m";
const DAY_MONTH_YEAR: &str = "%d/%m/%Y";

/// The marker palette, shuffled once. Call once per response so the whole
/// result list shares one assignment.
pub fn shuffled_markers() -> Vec<&'static str> {
    let mut markers = MARKERS.to_vec();
    markers.shuffle(&mut rand::rng());
    markers
}

/// Python-style title case: uppercase every letter that follows a
/// non-letter, used for station labels ("botanic gardens" -> "Botanic
/// Gardens", "one-north" -> "One-North").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            boundary = true;
            out.push(ch);
        }
    }
    out
}

pub fn greeting(first_name: &str) -> String {
    [
        format!("Hello, {first_name}! This is SG Hawker bot."),
        "\nDo you need information about SG's hawker centres?".to_string(),
        "\n\t \u{1F9F9} /closed tells you which hawker centres are closed today.".to_string(),
        "\t \u{1F50D} /search Input a search term and I'll tell you the hawker centres \
         that best match your query. For example, <b>/search bedok</b> or \
         <b>/search west coast drive</b>."
            .to_string(),
        "\t \u{1F69D} /mrt lets you know the hawker centres near an MRT/LRT station.".to_string(),
        "\t \u{1F9ED} Want to know which hawker centres are near you? Simply send me your \
         location!"
            .to_string(),
        "\t \u{2139} Need more information about me? Type /info.".to_string(),
    ]
    .join("\n")
}

pub fn info(first_name: &str) -> String {
    [
        format!("Hello, {first_name}! This is SG Hawker bot."),
        "\nSome things about me:".to_string(),
        "\t\u{2022} My data comes from <a href=\"https://data.gov.sg/\">data.gov.sg</a>. \
         This data contains basic information about hawker centres, and their cleaning \
         dates."
            .to_string(),
        "\t\u{2022} My data is updated every week so that I can get the latest information \
         about hawker centres."
            .to_string(),
        "\t\u{2022} MRT/LRT information can be found at <a \
         href=\"https://datamall.lta.gov.sg/content/datamall/en/static-data.html\">DataMall</a> \
         by LTA. This data contains the names, numbers and coordinates of MRT/LRT stations."
            .to_string(),
    ]
    .join("\n")
}

pub fn nearest_prompt() -> String {
    "To list the hawker centres near you, simply send your location!".to_string()
}

pub fn unknown() -> String {
    "Sorry, I didn't understand that. Try /start to see a list of instructions.".to_string()
}

pub fn first_letter_prompt() -> String {
    "\u{1F689} Select the first letter of an MRT/LRT station:".to_string()
}

pub fn station_prompt(letter: char) -> String {
    format!(
        "\u{1F689} Select an MRT/LRT station that starts with {}:",
        letter.to_uppercase()
    )
}

/// Per-venue annotation lines: the cleaning window it is closed for, the
/// status text when permanently closed, or nothing.
pub fn closure_annotation(name: &str, report: &ClosureReport) -> String {
    let mut text = String::new();
    if let Some(entry) = report.cleaning_for(name) {
        text.push_str(&format!(
            "\t\t * <b>Closed</b> from {} to {}\n",
            entry.window.start.format(DAY_MONTH),
            entry.window.end.format(DAY_MONTH)
        ));
    }
    if let Some(entry) = report.closed_for(name) {
        text.push_str(&format!("\t\t * <b>{}</b>\n", entry.status));
    }
    text
}

fn linked_name(snapshot: &Snapshot, name: &str) -> String {
    match snapshot.venue(name) {
        Some(venue) => format!("<a href='{}'>{}</a>", venue.map_url, name),
        None => name.to_string(),
    }
}

/// Result list for a `/search` query.
pub fn name_results(
    snapshot: &Snapshot,
    query: &str,
    matches: &[NameMatch],
    report: &ClosureReport,
    markers: &[&str],
) -> String {
    let mut text = format!(
        "<i>Here are the top {TOP_K} hawker centres that match your query </i>{query}. \
         <i>Click on each link to open its location.</i>\n\n"
    );
    for (idx, entry) in matches.iter().enumerate() {
        text.push_str(&format!(
            "{} {}\n",
            markers[idx % markers.len()],
            linked_name(snapshot, &entry.name)
        ));
        text.push_str(&closure_annotation(&entry.name, report));
    }
    text
}

/// Result list for a shared location.
pub fn location_results(
    snapshot: &Snapshot,
    matches: &[ProximityMatch],
    report: &ClosureReport,
    markers: &[&str],
) -> String {
    let mut text = format!(
        "<i>Here are the top {TOP_K} hawker centres near you. \
         Click on each link to open its location.</i>\n\n"
    );
    for (idx, entry) in matches.iter().enumerate() {
        text.push_str(&format!(
            "{} {} ({} km)\n",
            markers[idx % markers.len()],
            linked_name(snapshot, &entry.name),
            entry.display_km()
        ));
        text.push_str(&closure_annotation(&entry.name, report));
    }
    text
}

/// Result list for a picked station.
pub fn station_results(
    snapshot: &Snapshot,
    station: &StationRef,
    matches: &[ProximityMatch],
    report: &ClosureReport,
    markers: &[&str],
) -> String {
    let mut text = format!(
        "<i>Here are the {TOP_K} hawker centres nearest to {} ({}). \
         Click on each link to open its location on Google Maps.</i>\n\n",
        title_case(&station.cleaned),
        station.code
    );
    for (idx, entry) in matches.iter().enumerate() {
        text.push_str(&format!(
            "{} ({} km) {}\n",
            markers[idx % markers.len()],
            entry.display_km(),
            linked_name(snapshot, &entry.name)
        ));
        text.push_str(&closure_annotation(&entry.name, report));
    }
    text
}

/// The `/closed` listing: numbered cleaning and permanently-closed sections,
/// or a friendly line when both are empty.
pub fn closed_list(window: QueryWindow, report: &ClosureReport) -> String {
    let span = if window.start == window.end {
        format!("today ({})", window.start.format(DAY_MONTH_YEAR))
    } else {
        format!(
            "from {} to {}",
            window.start.format(DAY_MONTH_YEAR),
            window.end.format(DAY_MONTH_YEAR)
        )
    };

    if report.is_empty() {
        return format!("No hawkers are closed {span}!");
    }

    let mut text = format!("<i>The following hawker centres are closed {span}:</i>\n\n");

    if !report.cleaning.is_empty() {
        text.push_str("<b>\u{1F9F9} Hawkers cleaning:</b>\n");
        for (idx, entry) in report.cleaning.iter().enumerate() {
            text.push_str(&format!(
                "{}) {}\n\t * {} to {}\n",
                idx + 1,
                entry.name,
                entry.window.start.format(DAY_MONTH),
                entry.window.end.format(DAY_MONTH)
            ));
        }
    }

    if !report.closed.is_empty() {
        text.push_str("\n<b>\u{1F3D7} Hawkers closed:</b>\n");
        for (idx, entry) in report.closed.iter().enumerate() {
            text.push_str(&format!("{}) {} ({})\n", idx + 1, entry.name, entry.status));
        }
    }

    text
}
