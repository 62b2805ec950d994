//! Specs for commands that inspect the report definition.

use crate::prelude::*;

// =============================================================================
// LIST
// =============================================================================

/// > list prints one line per report, in definition order
#[test]
fn list_shows_reports() {
    cli(&["list"]).on("fleet").passes().stdout_eq(
        "EventDetail [device.detail]  Event Detail\n\
         EventSummary [fleet.summary]  Menu Item\n\
         EventCount [fleet.summary]  Menu Item\n",
    );
}

/// > list --json describes each report
#[test]
fn list_json_describes_reports() {
    let run = cli(&["list", "--json"]).on("fleet").passes();
    let json: serde_json::Value = serde_json::from_str(&run.stdout()).unwrap();
    let reports = json.as_array().unwrap();
    assert_eq!(reports.len(), 3);

    let detail = &reports[0];
    assert_eq!(detail["name"], "EventDetail");
    assert_eq!(detail["type"], "device.detail");
    assert_eq!(detail["className"], "fleetreport.reports.EventDetailReport");
    assert_eq!(detail["layout"], "fleetreport.reports.EventDataLayout");
    assert_eq!(detail["title"], "Event Detail");
    assert_eq!(
        detail["columns"],
        serde_json::json!(["index", "dateTime", "status", "speed", "address"])
    );
    assert_eq!(reports[2]["layout"], "fleetreport.reports.FieldLayout");
}

/// > Without a config file, reports.xml in the current directory is used
#[test]
fn list_without_config_uses_defaults() {
    let temp = Project::empty();
    temp.file(
        "reports.xml",
        r#"<ReportDefinition>
  <ReportTypes><ReportType name="fleet">Fleet</ReportType></ReportTypes>
  <Report name="Counts" type="fleet" class="EventCountReport">
    <MenuDescription>Counts per device</MenuDescription>
  </Report>
</ReportDefinition>
"#,
    );
    cli(&["list"])
        .pwd(temp.path())
        .passes()
        .stdout_eq("Counts [fleet]  Counts per device\n");
}

// =============================================================================
// COLUMNS
// =============================================================================

/// > columns lists the layout's columns and marks the ones the report shows
#[test]
fn columns_marks_used_columns() {
    let run = cli(&["columns", "EventCount"]).on("fleet").passes();
    let stdout = run.stdout();
    assert!(stdout.starts_with("Layout: fleetreport.reports.FieldLayout\n"));
    assert!(stdout.contains("* count        Count\n"));
    assert!(stdout.contains("  eventcount   Count\n"));
    assert!(stdout.contains("* index        #\n"));
}

/// > Event reports offer the event layout's columns
#[test]
fn columns_of_an_event_report() {
    cli(&["columns", "EventDetail"])
        .on("fleet")
        .passes()
        .stdout_has("Layout: fleetreport.reports.EventDataLayout\n")
        .stdout_has("* speed        Speed\n")
        .stdout_has("  odometer     Odometer\n");
}

/// > columns on an unknown report fails
#[test]
fn columns_unknown_report_fails() {
    cli(&["columns", "TripReport"])
        .on("fleet")
        .fails()
        .stderr_has("Report name not found: TripReport");
}

// =============================================================================
// CHECK
// =============================================================================

/// > check reports a clean definition
#[test]
fn check_clean_definition() {
    cli(&["check"])
        .on("fleet")
        .passes()
        .stdout_has("ok: 3 report(s), 0 warning(s)\n");
}

/// > check exits 2 and lists every error in a broken definition
#[test]
fn check_broken_definition() {
    cli(&["check"])
        .on("broken")
        .exits(2)
        .stdout_has("error: Report already defined: EventDetail\n")
        .stdout_has("error: Report 'Orphan' [Report type not defined: fleet.summary]\n")
        .stdout_has("2 error(s), 0 warning(s)\n");
}

/// > check on a missing definition reports the unreadable file
#[test]
fn check_missing_definition() {
    let temp = Project::empty();
    temp.config("[reports]\ndefinition = \"missing.xml\"\n");
    cli(&["check"])
        .pwd(temp.path())
        .exits(2)
        .stdout_has("error: Unable to read report definition");
}
