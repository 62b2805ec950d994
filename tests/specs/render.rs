//! Specs for `fleetreport render`.

use crate::prelude::*;

// =============================================================================
// FORMATS
// =============================================================================

/// > csv quotes every field, with field names as the header
#[test]
fn csv_event_count() {
    cli(&["render", "EventCount", "--account", "acme", "-f", "csv"])
        .on("fleet")
        .passes()
        .stdout_eq(
            "\"index\",\"deviceId\",\"deviceDesc\",\"count\"\n\
             \"1\",\"van2\",\"Alpha Van\",\"1\"\n\
             \"2\",\"truck1\",\"Truck One\",\"3\"\n",
        );
}

/// > html is the default format and produces a full page
#[test]
fn html_is_the_default_format() {
    let run = cli(&["render", "EventDetail", "--account", "acme", "--device", "truck1"])
        .on("fleet")
        .passes();
    let stdout = run.stdout();
    assert!(stdout.starts_with("<html>\n"), "{}", stdout);
    assert!(stdout.contains("100 Main St"));
    assert!(stdout.ends_with("</html>\n"));
}

/// > xml describes the report in the document root
#[test]
fn xml_names_the_report() {
    cli(&[
        "render", "EventDetail", "--account", "acme", "--device", "truck1", "-f", "xml",
    ])
    .on("fleet")
    .passes()
    .stdout_has("<Report name=\"EventDetail\" type=\"device.detail\" format=\"xml\">")
    .stdout_has("<Account>acme</Account>");
}

/// > Format names are case-insensitive
#[test]
fn format_is_case_insensitive() {
    cli(&["render", "EventCount", "--account", "acme", "-f", "CSV"])
        .on("fleet")
        .passes()
        .stdout_has("\"index\",\"deviceId\",\"deviceDesc\",\"count\"\n");
}

// =============================================================================
// SELECTION
// =============================================================================

/// > --group renders the group's devices
#[test]
fn group_selects_devices() {
    cli(&[
        "render", "EventSummary", "--account", "acme", "--group", "west", "-f", "csv",
    ])
    .on("fleet")
    .passes()
    .stdout_eq(
        "\"deviceId\",\"deviceDesc\",\"dateTime\",\"status\"\n\
         \"van2\",\"Alpha Van\",\"2024/01/01 01:30:00\",\"Stop\"\n\
         \"truck1\",\"Truck One\",\"2024/01/01 03:00:00\",\"Stop\"\n",
    );
}

/// > --user limits the report to that user's authorized devices
#[test]
fn user_limits_devices() {
    cli(&[
        "render", "EventCount", "--account", "acme", "--user", "driver", "-f", "csv",
    ])
    .on("fleet")
    .passes()
    .stdout_eq(
        "\"index\",\"deviceId\",\"deviceDesc\",\"count\"\n\
         \"1\",\"truck1\",\"Truck One\",\"3\"\n",
    );
}

/// > --limit caps the number of records
#[test]
fn limit_caps_records() {
    let run = cli(&[
        "render", "EventDetail", "--account", "acme", "--device", "truck1", "--limit", "1",
        "-f", "csv",
    ])
    .on("fleet")
    .passes();
    assert_eq!(run.stdout().lines().count(), 2);
}

/// > --from drops earlier events
#[test]
fn from_limits_time_range() {
    let run = cli(&[
        "render", "EventDetail", "--account", "acme", "--device", "truck1", "--from",
        "1704074400", "-f", "csv",
    ])
    .on("fleet")
    .passes();
    let stdout = run.stdout();
    assert_eq!(stdout.lines().count(), 3);
    assert!(!stdout.contains("100 Main St"));
}

// =============================================================================
// OUTPUT
// =============================================================================

/// > --output writes the report to a file instead of stdout
#[test]
fn output_writes_file() {
    let temp = Project::fleet();
    let out = temp.path().join("counts.csv");
    cli(&[
        "render", "EventCount", "--account", "acme", "-f", "csv", "-o",
        out.to_str().unwrap(),
    ])
    .pwd(temp.path())
    .passes()
    .stdout_eq("");
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("\"index\",\"deviceId\",\"deviceDesc\",\"count\"\n"));
}

/// > --info describes the report instead of rendering it
#[test]
fn info_describes_report() {
    cli(&[
        "render", "EventDetail", "--account", "acme", "--device", "truck1", "--info",
    ])
    .on("fleet")
    .passes()
    .stdout_has("Report: EventDetail [device.detail]\n")
    .stdout_has("ReportDeviceList: Account=acme")
    .stdout_has("ReportConstraints: ")
    .stdout_lacks("<html>");
}

/// > email writes the message to the outbox and reports success
#[test]
fn email_writes_outbox() {
    let temp = Project::fleet();
    temp.config(
        r#"version = 1

[mail]
from = "reports@acme.test"
outbox = "outbox"
"#,
    );
    cli(&["render", "EventCount", "--account", "acme", "-f", "email"])
        .pwd(temp.path())
        .passes()
        .stdout_has("<ReportEmail sent=\"true\">");

    let messages: Vec<_> = std::fs::read_dir(temp.path().join("outbox"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "eml"))
        .collect();
    assert_eq!(messages.len(), 1);
    let message = std::fs::read_to_string(messages[0].path()).unwrap();
    assert!(message.contains("To: ops@acme.test"));
}

// =============================================================================
// FAILURES
// =============================================================================

/// > Unknown reports exit 1
#[test]
fn unknown_report_fails() {
    cli(&["render", "TripReport", "--account", "acme"])
        .on("fleet")
        .fails()
        .stderr_has("Report name not found: TripReport");
}

/// > Unknown accounts exit 1
#[test]
fn unknown_account_fails() {
    cli(&["render", "EventCount", "--account", "nobody"])
        .on("fleet")
        .fails()
        .stderr_has("Account not found: nobody");
}

/// > Unknown groups exit 1
#[test]
fn unknown_group_fails() {
    cli(&["render", "EventCount", "--account", "acme", "--group", "east"])
        .on("fleet")
        .fails()
        .stderr_has("Device group not found: east");
}

/// > A missing fleet store exits 1
#[test]
fn missing_store_fails() {
    let temp = Project::fleet();
    std::fs::remove_file(temp.path().join("fleet.json")).unwrap();
    cli(&["render", "EventCount", "--account", "acme"])
        .pwd(temp.path())
        .fails()
        .stderr_has("fleet.json");
}
