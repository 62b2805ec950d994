// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use tempfile::TempDir;

use super::*;
use crate::factory::ReportFactory;
use crate::test_utils::{REPORTS_XML, create_tree};
use yare::parameterized;

fn parse(xml: &str) -> ReportRegistry {
    parse_definition(xml, None, &LoadOptions::default())
}

fn definition(body: &str) -> String {
    format!(
        r#"<ReportDefinition>
  <ReportTypes><ReportType name="t">Type</ReportType></ReportTypes>
  {}
</ReportDefinition>"#,
        body
    )
}

fn detail(body: &str) -> String {
    definition(&format!(
        r#"<Report name="R" type="t" class="EventDetailReport">{}</Report>"#,
        body
    ))
}

fn only_report(registry: &ReportRegistry) -> &ReportFactory {
    assert_eq!(registry.len(), 1, "{:?}", registry.log());
    &registry.reports()[0]
}

#[test]
fn parses_the_sample_definition() {
    let registry = parse(REPORTS_XML);
    assert!(!registry.has_parsing_errors(), "{:?}", registry.log());
    assert_eq!(
        registry.report_names(),
        vec!["EventDetail", "EventSummary", "EventCount"]
    );
    assert_eq!(registry.property("fleetName"), Some("Acme"));
    assert_eq!(registry.default_style().css_files(), ["css/Reports.css".to_string()]);
    assert!(registry.report_type("fleet.summary").unwrap().is_group);
    assert_eq!(registry.report_type("device.detail").unwrap().description, "Device Detail");
}

#[test]
fn malformed_xml_is_an_error() {
    let registry = parse("<ReportDefinition><Report");
    assert!(registry.has_parsing_errors());
    assert!(registry.is_empty());
}

#[test]
fn wrong_root_is_an_error() {
    let registry = parse("<Reports/>");
    assert_eq!(
        registry.log().errors(),
        ["[<inline>] Invalid root tag ID: Reports".to_string()]
    );
}

#[test]
fn unknown_top_level_tag_is_an_error_but_parsing_continues() {
    let registry = parse(&detail("").replace("<ReportTypes>", "<Bogus/><ReportTypes>"));
    assert!(registry.has_parsing_errors());
    assert_eq!(registry.len(), 1);
}

#[test]
fn simple_columns_split_on_commas_and_whitespace() {
    let registry = parse(&detail("<SimpleColumns>index, speed:mph\n  address</SimpleColumns>"));
    let columns = only_report(&registry).columns();
    let keys: Vec<String> = columns.iter().map(ReportColumn::key_name).collect();
    assert_eq!(keys, vec!["index", "speed:mph", "address"]);
}

#[test]
fn first_column_list_wins() {
    let registry = parse(&detail(
        "<SimpleColumns>index</SimpleColumns><SimpleColumns>speed</SimpleColumns>",
    ));
    assert_eq!(only_report(&registry).columns().len(), 1);
    assert_eq!(only_report(&registry).columns()[0].name(), "index");
}

#[test]
fn explicit_columns_carry_title_and_blank_fill() {
    let registry = parse(&detail(
        r#"<Columns>
             <Column name="speed" arg="kph" blankFill="--">Speed\nKPH</Column>
             <Column key="address"/>
             <Column/>
           </Columns>"#,
    ));
    let columns = only_report(&registry).columns();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].key_name(), "speed:kph");
    assert_eq!(columns[0].title(), Some("Speed\\nKPH"));
    assert_eq!(columns[0].blank_fill(), "--");
    assert_eq!(columns[1].name(), "address");
    assert_eq!(columns[1].title(), None);
    assert_eq!(
        registry.log().errors(),
        ["Column name is blank".to_string()]
    );
}

#[test]
fn columns_honor_if_true_and_if_false() {
    let xml = r#"<ReportDefinition>
  <Property key="showSpeed">true</Property>
  <Property key="hideAddress">true</Property>
  <ReportTypes><ReportType name="t">Type</ReportType></ReportTypes>
  <Report name="R" type="t" class="EventDetailReport">
    <Columns>
      <Column name="index"/>
      <Column name="speed" ifTrue="showSpeed"/>
      <Column name="address" ifFalse="hideAddress"/>
      <Column name="status" ifTrue="missing"/>
    </Columns>
  </Report>
</ReportDefinition>"#;
    let registry = parse(xml);
    let names: Vec<&str> = only_report(&registry).columns().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["index", "speed"]);
}

#[test]
fn runtime_property_overrides_gate_columns() {
    let xml = detail(r#"<Columns><Column name="index"/><Column name="speed" ifTrue="showSpeed"/></Columns>"#);
    let mut options = LoadOptions::default();
    options
        .property_overrides
        .insert("showSpeed".into(), "yes".into());
    let registry = parse_definition(&xml, None, &options);
    assert_eq!(only_report(&registry).columns().len(), 2);
}

#[test]
fn only_sortable_reports_have_sortable_columns() {
    let xml = definition(
        r#"<Report name="R" type="t" class="EventDetailReport" sortable="true">
             <Columns><Column name="index"/><Column name="speed" sortable="false"/></Columns>
           </Report>
           <Report name="S" type="t" class="EventDetailReport">
             <SimpleColumns>index</SimpleColumns>
           </Report>"#,
    );
    let registry = parse(&xml);
    let sortable = registry.report_factory("R", false).unwrap().unwrap();
    assert!(sortable.is_sortable());
    assert!(sortable.columns()[0].is_sortable());
    assert!(!sortable.columns()[1].is_sortable());
    let plain = registry.report_factory("S", false).unwrap().unwrap();
    assert!(!plain.columns()[0].is_sortable());
}

#[test]
fn duplicate_option_is_skipped() {
    let registry = parse(&detail(
        r#"<Options>
             <Option name="a"><Description>First</Description></Option>
             <Option name="a"><Description>Second</Description></Option>
             <Option name="b"/>
           </Options>"#,
    ));
    let factory = only_report(&registry);
    assert_eq!(factory.options.len(), 2);
    assert_eq!(factory.options[0].description, "First");
    assert_eq!(
        registry.log().errors(),
        ["Report 'R' Option already defined: a".to_string()]
    );
}

#[test]
fn report_properties_fill_definition_keys() {
    let xml = r#"<ReportDefinition>
  <Property key="limit">25</Property>
  <ReportTypes><ReportType name="t">Type</ReportType></ReportTypes>
  <Report name="R" type="t" class="EventDetailReport">
    <Property key="maxRows">${limit}</Property>
    <Property key="other">${unknown}</Property>
  </Report>
</ReportDefinition>"#;
    let registry = parse(xml);
    let factory = only_report(&registry);
    assert_eq!(factory.properties().get("maxRows").map(String::as_str), Some("25"));
    assert_eq!(
        factory.properties().get("other").map(String::as_str),
        Some("${unknown}")
    );
}

#[test]
fn constraints_are_parsed() {
    let registry = parse(&detail(
        r#"<Constraints>
             <TimeStart>100</TimeStart>
             <TimeEnd>200</TimeEnd>
             <ValidGPSRequired>true</ValidGPSRequired>
             <OrderDescending>true</OrderDescending>
             <SelectionLimit>10</SelectionLimit>
             <ReportLimit>50</ReportLimit>
             <Where>statusCode = 61472</Where>
           </Constraints>"#,
    ));
    let rc = only_report(&registry).constraints();
    assert_eq!(rc.time_start(), 100);
    assert_eq!(rc.time_end(), 200);
    assert!(rc.valid_gps_required());
    assert!(!rc.order_ascending());
    assert_eq!(rc.selection_limit(), 10);
    assert_eq!(rc.selection_limit_type(), LimitType::Last);
    assert_eq!(rc.report_limit(), 50);
    assert_eq!(rc.where_clause(), "(statusCode = 61472)");
}

#[parameterized(
    empty = { "<OrderDescending/>", true },
    blank = { "<OrderDescending> </OrderDescending>", true },
    garbled = { "<OrderDescending>maybe</OrderDescending>", true },
    no = { "<OrderDescending>false</OrderDescending>", true },
    yes = { "<OrderDescending>yes</OrderDescending>", false },
    ascending_empty = { "<OrderAscending/>", true },
    ascending_no = { "<OrderAscending>no</OrderAscending>", false },
)]
fn sort_order_flags(constraint: &str, ascending: bool) {
    let registry = parse(&detail(&format!("<Constraints>{}</Constraints>", constraint)));
    assert_eq!(only_report(&registry).constraints().order_ascending(), ascending);
}

#[test]
fn selection_limit_type_attribute_wins() {
    let registry = parse(&detail(
        r#"<Constraints><SelectionLimit type="first">3</SelectionLimit></Constraints>"#,
    ));
    let rc = only_report(&registry).constraints();
    assert_eq!(rc.selection_limit_type(), LimitType::First);
    assert_eq!(rc.selection_limit(), 3);
}

#[test]
fn ascending_and_descending_together_skip_the_report() {
    let registry = parse(&detail(
        "<Constraints><OrderAscending>true</OrderAscending><OrderDescending>true</OrderDescending></Constraints>",
    ));
    assert!(registry.is_empty());
    assert_eq!(
        registry.log().errors(),
        ["Report 'R' [validation failed: OrderAscending and OrderDescending are both specified]".to_string()]
    );
}

#[test]
fn unknown_constraint_skips_the_report() {
    let registry = parse(&detail("<Constraints><Speed>10</Speed></Constraints>"));
    assert!(registry.is_empty());
    assert!(registry.has_parsing_errors());
}

#[test]
fn rule_selector_needs_an_engine() {
    let xml = detail("<Constraints><RuleSelector>speedKPH &gt; 10</RuleSelector></Constraints>");
    let registry = parse(&xml);
    assert!(!only_report(&registry).constraints().has_rule_selector());

    let options = LoadOptions {
        rule_engine: filter::rule_engine_for("simple"),
        ..LoadOptions::default()
    };
    let registry = parse_definition(&xml, None, &options);
    assert_eq!(only_report(&registry).constraints().rule_selector(), "speedKPH > 10");
}

#[test]
fn rule_selector_for_another_engine_is_ignored() {
    let xml = detail(
        r#"<Constraints><RuleSelector ruleFactoryName="drools">x ~~ y</RuleSelector></Constraints>"#,
    );
    let options = LoadOptions {
        rule_engine: filter::rule_engine_for("simple"),
        ..LoadOptions::default()
    };
    let registry = parse_definition(&xml, None, &options);
    assert!(!only_report(&registry).constraints().has_rule_selector());
}

#[test]
fn invalid_rule_selector_skips_the_report() {
    let xml = detail("<Constraints><RuleSelector>speedKPH &gt;</RuleSelector></Constraints>");
    let options = LoadOptions {
        rule_engine: filter::rule_engine_for("simple"),
        ..LoadOptions::default()
    };
    let registry = parse_definition(&xml, None, &options);
    assert!(registry.is_empty());
    assert!(registry.log().errors()[0].contains("Invalid RuleSelector syntax"));
}

#[test]
fn invalid_icon_selector_is_dropped() {
    let xml = detail("<MapIconSelector>( statusCode</MapIconSelector>");
    let options = LoadOptions {
        rule_engine: filter::rule_engine_for("simple"),
        ..LoadOptions::default()
    };
    let registry = parse_definition(&xml, None, &options);
    assert_eq!(only_report(&registry).icon_selector(), None);
    assert!(registry.has_parsing_errors());
}

#[test]
fn layout_settings_are_applied() {
    let xml = definition(
        r#"<ReportLayout class="EventDataLayout">
             <DateFormat>dd.MM.yyyy</DateFormat>
             <TimeFormat>HH:mm</TimeFormat>
             <LayoutStyle cssFile="css/Event.css">
               .evt { color: red; }
             </LayoutStyle>
             <Extra/>
           </ReportLayout>
           <Report name="R" type="t" class="EventDetailReport"/>"#,
    );
    let registry = parse(&xml);
    let layout = only_report(&registry).layout();
    assert_eq!(layout.date_time_format(), "dd.MM.yyyy HH:mm");
    assert_eq!(layout.css_files(false), vec!["css/Event.css".to_string()]);
    assert_eq!(layout.style_sheet(false), ".evt { color: red; }\n");
    assert_eq!(
        registry.log().warnings(),
        ["Unrecognized ReportLayout tag name: Extra".to_string()]
    );
}

#[test]
fn includes_resolve_next_to_the_definition() {
    let dir = TempDir::new().unwrap();
    create_tree(
        dir.path(),
        &[
            (
                "reports.xml",
                r#"<ReportDefinition>
  <ReportTypes><ReportType name="t">Type</ReportType></ReportTypes>
  <Include file="more.xml"/>
  <Include file="absent.xml" optional="true"/>
</ReportDefinition>"#,
            ),
            (
                "more.xml",
                r#"<ReportDefinition>
  <Report name="Included" type="t" class="EventCountReport"/>
</ReportDefinition>"#,
            ),
        ],
    );
    let registry = load_definition(&dir.path().join("reports.xml"), &LoadOptions::default());
    assert!(!registry.has_parsing_errors(), "{:?}", registry.log());
    assert_eq!(registry.report_names(), vec!["Included"]);
}

#[test]
fn missing_include_is_an_error() {
    let registry = parse(&definition(r#"<Include file="absent.xml"/>"#));
    assert_eq!(
        registry.log().errors(),
        ["Include file not found: absent.xml".to_string()]
    );
}

#[test]
fn include_cycle_is_a_warning() {
    let dir = TempDir::new().unwrap();
    create_tree(
        dir.path(),
        &[
            ("a.xml", r#"<ReportDefinition><Include file="b.xml"/></ReportDefinition>"#),
            ("b.xml", r#"<ReportDefinition><Include file="a.xml"/></ReportDefinition>"#),
        ],
    );
    let registry = load_definition(&dir.path().join("a.xml"), &LoadOptions::default());
    assert!(!registry.has_parsing_errors(), "{:?}", registry.log());
    assert!(registry.has_parsing_warnings());
}

#[test]
fn unreadable_definition_is_an_error() {
    let dir = TempDir::new().unwrap();
    let registry = load_definition(&dir.path().join("none.xml"), &LoadOptions::default());
    assert!(registry.is_empty());
    assert!(registry.log().errors()[0].starts_with("Unable to read report definition"));
}

#[test]
fn from_config_strips_the_property_prefix() {
    let mut config = Config::default();
    config.properties.insert("color".into(), "plain".into());
    config
        .properties
        .insert("ReportDefinition.color".into(), "prefixed".into());
    config.reports.include_dir = Some(PathBuf::from("inc"));
    let options = LoadOptions::from_config(&config, Some(Path::new("/etc/fleet")));
    assert_eq!(
        options.property_overrides.get("color").map(String::as_str),
        Some("prefixed")
    );
    assert_eq!(options.include_dir, Some(PathBuf::from("/etc/fleet/inc")));
    assert!(options.rule_engine.is_some());
}

#[test]
fn reformat_style_drops_blank_lines() {
    assert_eq!(reformat_style("\n  a { }\n\n   b { }  \n"), "a { }\nb { }");
}
