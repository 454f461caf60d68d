//! A small council: three people, four meetings and records on a rezoning,
//! a bike lane pilot and the fire hall budget.
//!
//! Embeddings come from [`MockProvider`] so vector search behaves the same
//! way on every run.

use crate::embeddings::providers::mock::MockProvider;
use crate::types::*;
use chrono::NaiveDate;

/// Dimensions of every fixture embedding.
pub const FIXTURE_DIMENSIONS: usize = 64;

/// Date of the most recent fixture meeting.
pub const LAST_MEETING: (i32, u32, u32) = (2024, 6, 11);

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// A [`MockProvider`] matching the fixture embeddings.
pub fn fixture_provider() -> MockProvider {
    MockProvider::new(FIXTURE_DIMENSIONS)
}

fn s(text: &str) -> String {
    text.to_string()
}

fn person(id: &str, name: &str, role: &str) -> Person {
    Person {
        id: s(id),
        name: s(name),
        role: Some(s(role)),
    }
}

fn meeting(id: &str, title: &str, on: NaiveDate, kind: &str) -> Meeting {
    Meeting {
        id: s(id),
        title: s(title),
        meeting_date: on,
        meeting_type: Some(s(kind)),
    }
}

fn segment(
    id: &str,
    meeting_id: &str,
    label: &str,
    speaker: Option<(&str, &str)>,
    start_time: f64,
    text: &str,
) -> TranscriptSegment {
    TranscriptSegment {
        id: s(id),
        meeting_id: s(meeting_id),
        speaker_label: s(label),
        person_id: speaker.map(|(id, _)| s(id)),
        speaker_name: speaker.map(|(_, name)| s(name)),
        text: s(text),
        start_time,
        embedding: Some(fixture_provider().vector(text)),
    }
}

fn motion(id: &str, meeting_id: &str, text: &str, summary: &str, result: &str) -> Motion {
    Motion {
        id: s(id),
        meeting_id: s(meeting_id),
        agenda_item_id: None,
        text: s(text),
        plain_english_summary: Some(s(summary)),
        mover: Some(s("Helen Lin")),
        seconder: Some(s("Marcus Brandt")),
        result: Some(s(result)),
        embedding: Some(fixture_provider().vector(&format!("{} {}", text, summary))),
    }
}

fn vote(motion_id: &str, person_id: &str, value: VoteValue) -> Vote {
    Vote {
        id: format!("{}:{}", motion_id, person_id),
        motion_id: s(motion_id),
        person_id: s(person_id),
        value,
    }
}

fn matter(
    id: &str,
    identifier: &str,
    title: &str,
    status: &str,
    summary: &str,
    first_seen: NaiveDate,
    last_seen: NaiveDate,
) -> Matter {
    Matter {
        id: s(id),
        identifier: Some(s(identifier)),
        title: s(title),
        status: Some(s(status)),
        category: None,
        summary: Some(s(summary)),
        first_seen: Some(first_seen),
        last_seen: Some(last_seen),
        embedding: Some(fixture_provider().vector(&format!("{} {}", title, summary))),
    }
}

fn agenda_item(
    id: &str,
    meeting_id: &str,
    order: &str,
    title: &str,
    summary: Option<&str>,
    debate: Option<&str>,
    is_procedural: bool,
) -> AgendaItem {
    AgendaItem {
        id: s(id),
        meeting_id: s(meeting_id),
        item_order: Some(s(order)),
        title: s(title),
        category: None,
        plain_english_summary: summary.map(s),
        debate_summary: debate.map(s),
        is_procedural,
        matter_id: None,
    }
}

/// The sample council records.
pub fn sample_snapshot() -> CouncilSnapshot {
    use VoteValue::*;

    let okafor = ("p-okafor", "Jane Okafor");
    let brandt = ("p-brandt", "Marcus Brandt");
    let lin = ("p-lin", "Helen Lin");

    CouncilSnapshot {
        people: vec![
            person("p-okafor", "Jane Okafor", "Councillor"),
            person("p-brandt", "Marcus Brandt", "Councillor"),
            person("p-lin", "Helen Lin", "Mayor"),
        ],
        speaker_aliases: vec![SpeakerAlias {
            meeting_id: s("m-2024-05"),
            speaker_label: s("Speaker 2"),
            person_id: s("p-okafor"),
        }],
        meetings: vec![
            meeting("m-2023-11", "Regular Council Meeting", date(2023, 11, 14), "regular"),
            meeting("m-2024-03", "Regular Council Meeting", date(2024, 3, 12), "regular"),
            meeting("m-2024-05", "Public Hearing", date(2024, 5, 14), "public_hearing"),
            meeting("m-2024-06", "Regular Council Meeting", date(2024, 6, 11), "regular"),
        ],
        segments: vec![
            segment(
                "seg-1",
                "m-2023-11",
                "Speaker 1",
                Some(okafor),
                120.0,
                "I support protected bike lanes on Oak Street because cycling safety matters.",
            ),
            segment(
                "seg-2",
                "m-2024-03",
                "Speaker 3",
                Some(brandt),
                300.0,
                "Bike lanes on Oak Street will remove parking for local businesses.",
            ),
            segment(
                "seg-3",
                "m-2024-05",
                "Speaker 2",
                None,
                45.0,
                "The rezoning at 1200 Main Street adds housing but the density is too high for the neighbourhood.",
            ),
            segment(
                "seg-4",
                "m-2024-05",
                "Speaker 2",
                None,
                400.0,
                "I move that we refer the rezoning back to staff for more consultation.",
            ),
            segment(
                "seg-5",
                "m-2024-06",
                "Mayor",
                Some(lin),
                60.0,
                "Bike lanes pilot results show fewer collisions on Oak Street.",
            ),
            segment(
                "seg-6",
                "m-2024-06",
                "Speaker 3",
                Some(brandt),
                200.0,
                "The budget amendment for the fire hall is necessary.",
            ),
        ],
        motions: vec![
            motion(
                "mo-rezoning",
                "m-2024-05",
                "THAT Council approve the rezoning of 1200 Main Street from RS-1 to RM-4.",
                "Approve rezoning of 1200 Main Street for multi-family housing",
                "CARRIED",
            ),
            motion(
                "mo-bike-lanes",
                "m-2024-03",
                "THAT Council approve protected bike lanes on Oak Street.",
                "Build protected bike lanes on Oak Street",
                "CARRIED",
            ),
            motion(
                "mo-budget",
                "m-2023-11",
                "THAT Council adopt the 2024 operating budget.",
                "Adopt the 2024 operating budget",
                "CARRIED",
            ),
            motion(
                "mo-fire-hall",
                "m-2024-06",
                "THAT Council approve the fire hall budget amendment.",
                "Add funding for the fire hall",
                "DEFEATED",
            ),
        ],
        votes: vec![
            vote("mo-rezoning", "p-okafor", No),
            vote("mo-rezoning", "p-brandt", Yes),
            vote("mo-rezoning", "p-lin", Yes),
            vote("mo-bike-lanes", "p-okafor", Yes),
            vote("mo-bike-lanes", "p-brandt", No),
            vote("mo-bike-lanes", "p-lin", Yes),
            vote("mo-budget", "p-okafor", Yes),
            vote("mo-budget", "p-brandt", Yes),
            vote("mo-budget", "p-lin", Yes),
            vote("mo-fire-hall", "p-okafor", Absent),
            vote("mo-fire-hall", "p-brandt", No),
            vote("mo-fire-hall", "p-lin", Yes),
        ],
        matters: vec![
            matter(
                "mt-rezoning",
                "RZ-2024-01",
                "Rezoning: 1200 Main Street",
                "Approved",
                "Rezoning application for a six-storey apartment building",
                date(2024, 3, 12),
                date(2024, 5, 14),
            ),
            matter(
                "mt-bike-lanes",
                "TR-2023-07",
                "Oak Street Bike Lanes",
                "Active",
                "Protected bike lanes pilot on Oak Street",
                date(2023, 11, 14),
                date(2024, 6, 11),
            ),
            matter(
                "mt-fire-hall",
                "FS-2024-02",
                "Fire Hall Replacement",
                "Deferred",
                "Replacement of the downtown fire hall",
                date(2023, 11, 14),
                date(2024, 6, 11),
            ),
        ],
        agenda_items: vec![
            agenda_item("ai-call", "m-2024-06", "1", "Call to Order", None, None, true),
            agenda_item(
                "ai-minutes",
                "m-2024-06",
                "2",
                "Adoption of Minutes",
                Some("Adoption of minutes of the previous meeting"),
                None,
                true,
            ),
            agenda_item(
                "ai-bike-update",
                "m-2024-06",
                "5.1",
                "Oak Street Bike Lane Pilot Update",
                Some("Staff reported collision data from the bike lane pilot."),
                Some("Councillors asked about winter maintenance of the bike lanes."),
                false,
            ),
            agenda_item(
                "ai-fire-hall",
                "m-2024-06",
                "6.1",
                "Fire Hall Budget Amendment",
                Some("Request for additional fire hall funding."),
                Some("Council debated the cost and the amendment was defeated."),
                false,
            ),
            agenda_item(
                "ai-rezoning",
                "m-2024-05",
                "3.1",
                "Rezoning Application: 1200 Main Street",
                Some("Public hearing on rezoning 1200 Main Street to allow a six-storey apartment."),
                None,
                false,
            ),
        ],
        key_statements: vec![
            KeyStatement {
                id: s("ks-density"),
                meeting_id: s("m-2024-05"),
                segment_id: Some(s("seg-3")),
                speaker_name: Some(s("Jane Okafor")),
                statement_text: s("The density is too high for the neighbourhood."),
                statement_type: Some(s("opposition")),
                embedding: Some(
                    fixture_provider().vector("The density is too high for the neighbourhood."),
                ),
            },
            KeyStatement {
                id: s("ks-collisions"),
                meeting_id: s("m-2024-06"),
                segment_id: Some(s("seg-5")),
                speaker_name: Some(s("Helen Lin")),
                statement_text: s("Collisions fell after the bike lane pilot."),
                statement_type: Some(s("finding")),
                embedding: Some(
                    fixture_provider().vector("Collisions fell after the bike lane pilot."),
                ),
            },
        ],
        document_sections: vec![
            DocumentSection {
                id: s("doc-rz-rec"),
                document_id: s("staff-report-rz-2024-01"),
                meeting_id: Some(s("m-2024-05")),
                heading: s("Rezoning Recommendation"),
                content: s("Staff recommend approval of the rezoning of 1200 Main Street to RM-4."),
                embedding: Some(fixture_provider().vector(
                    "Rezoning Recommendation Staff recommend approval of the rezoning of 1200 Main Street to RM-4.",
                )),
            },
            DocumentSection {
                id: s("doc-budget-fire"),
                document_id: s("budget-2024"),
                meeting_id: Some(s("m-2023-11")),
                heading: s("Fire Services"),
                content: s("The 2024 budget allocates funds for fire hall maintenance."),
                embedding: Some(fixture_provider().vector(
                    "Fire Services The 2024 budget allocates funds for fire hall maintenance.",
                )),
            },
        ],
    }
}
