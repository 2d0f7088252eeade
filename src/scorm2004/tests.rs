use super::sequencing::{
    ChildActivitySet, ConditionCombination, ConditionOperator, RandomizationTiming, RollupAction,
    RollupRequirement, RuleAction, RuleConditionType,
};
use super::*;
use crate::access::InMemoryFileAccess;
use crate::common::error::ParseError;
use crate::manifest::PackageManifest;
use std::time::Duration;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="com.example.photoshop" version="1"
    xmlns="http://www.imsglobal.org/xsd/imscp_v1p1"
    xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_v1p3"
    xmlns:adlseq="http://www.adlnet.org/xsd/adlseq_v1p3"
    xmlns:adlnav="http://www.adlnet.org/xsd/adlnav_v1p3"
    xmlns:imsss="http://www.imsglobal.org/xsd/imsss">
  <metadata>
    <schema>ADL SCORM</schema>
    <schemaversion>2004 4th Edition</schemaversion>
  </metadata>
  <organizations default="ORG-PS">
    <organization identifier="ORG-PS" adlseq:objectivesGlobalToSystem="false">
      <title>Photoshop Essentials</title>
      <item identifier="MODULE-1">
        <title>Module 1</title>
        <item identifier="LESSON-1" identifierref="RES-1" isvisible="true">
          <title>Lesson 1</title>
          <adlcp:completionThreshold completedByMeasure="true" minProgressMeasure="0.75"/>
          <adlcp:data><adlcp:map targetID="com.example.notes" writeSharedData="false"/></adlcp:data>
          <adlnav:presentation>
            <adlnav:navigationInterface>
              <adlnav:hideLMSUI>continue</adlnav:hideLMSUI>
              <adlnav:hideLMSUI>previous</adlnav:hideLMSUI>
            </adlnav:navigationInterface>
          </adlnav:presentation>
          <imsss:sequencing IDRef="common">
            <imsss:sequencingRules>
              <imsss:preConditionRule>
                <imsss:ruleConditions conditionCombination="any">
                  <imsss:ruleCondition referencedObjective="OBJ-1" operator="not" condition="satisfied"/>
                  <imsss:ruleCondition condition="attemptLimitExceeded"/>
                </imsss:ruleConditions>
                <imsss:ruleAction action="disabled"/>
              </imsss:preConditionRule>
              <imsss:postConditionRule>
                <imsss:ruleConditions>
                  <imsss:ruleCondition condition="objectiveMeasureGreaterThan" measureThreshold="0.6"/>
                </imsss:ruleConditions>
                <imsss:ruleAction action="continue"/>
              </imsss:postConditionRule>
            </imsss:sequencingRules>
            <imsss:limitConditions attemptLimit="2" attemptAbsoluteDurationLimit="PT1H"/>
            <imsss:objectives>
              <imsss:primaryObjective objectiveID="OBJ-1" satisfiedByMeasure="true">
                <imsss:minNormalizedMeasure>0.8</imsss:minNormalizedMeasure>
                <imsss:mapInfo targetObjectiveID="com.example.global.obj1" writeSatisfiedStatus="true"/>
              </imsss:primaryObjective>
              <imsss:objective objectiveID="OBJ-2"/>
            </imsss:objectives>
            <adlseq:objectives>
              <adlseq:objective objectiveID="OBJ-1">
                <adlseq:mapInfo targetObjectiveID="com.example.global.obj1" writeCompletionStatus="true"/>
              </adlseq:objective>
            </adlseq:objectives>
          </imsss:sequencing>
        </item>
      </item>
      <imsss:sequencing>
        <imsss:controlMode choice="false" flow="true"/>
        <imsss:rollupRules objectiveMeasureWeight="0.5">
          <imsss:rollupRule childActivitySet="atLeastPercent" minimumPercent="0.5">
            <imsss:rollupConditions>
              <imsss:rollupCondition condition="completed"/>
            </imsss:rollupConditions>
            <imsss:rollupAction action="completed"/>
          </imsss:rollupRule>
        </imsss:rollupRules>
        <imsss:randomizationControls reorderChildren="true" selectCount="1" selectionTiming="onEachNewAttempt"/>
        <imsss:deliveryControls tracked="false"/>
        <adlseq:constrainedChoiceConsiderations preventActivation="true"/>
        <adlseq:rollupConsiderations requiredForSatisfied="ifAttempted" measureSatisfactionIfActive="false"/>
        <imsss:limitConditions attemptAbsoluteDurationLimit="PT2H30M"/>
      </imsss:sequencing>
    </organization>
  </organizations>
  <resources>
    <resource identifier="RES-1" type="webcontent" adlcp:scormType="sco" href="lesson1/index.html">
      <file href="lesson1/index.html"/>
    </resource>
  </resources>
  <imsss:sequencingCollection>
    <imsss:sequencing ID="common">
      <imsss:controlMode choiceExit="false"/>
      <imsss:deliveryControls completionSetByContent="true" objectiveSetByContent="true"/>
    </imsss:sequencing>
  </imsss:sequencingCollection>
</manifest>"#;

fn parse(xml: &str) -> Result<Scorm2004Manifest, ParseError> {
    Scorm2004Parser::new(InMemoryFileAccess::new("mem").with_file("imsmanifest.xml", xml.to_string()))
        .parse_manifest()
}

fn lesson(manifest: &Scorm2004Manifest) -> &Item {
    &manifest.organizations.organizations[0].items[0].items[0]
}

#[test]
fn test_normalized_fields() {
    let manifest = parse(MANIFEST).unwrap();
    assert_eq!(manifest.identifier(), Some("com.example.photoshop"));
    assert_eq!(manifest.title(), Some("Photoshop Essentials"));
    assert_eq!(manifest.launch_url(), Some("lesson1/index.html"));
    assert_eq!(manifest.version(), Some("1"));
    assert_eq!(manifest.edition, Some(Scorm2004Edition::Fourth));
    // No LOM: falls back to the organization's attempt duration limit.
    assert_eq!(manifest.duration(), Some(Duration::from_secs(9_000)));
}

#[test]
fn test_padded_title_is_kept_as_written() {
    let xml = MANIFEST.replace("<title>Photoshop Essentials</title>", "<title> Photoshop\n Essentials </title>");
    let manifest = parse(&xml).unwrap();
    assert_eq!(manifest.title(), Some(" Photoshop\n Essentials "));
}

#[test]
fn test_item_extensions() {
    let manifest = parse(MANIFEST).unwrap();
    let item = lesson(&manifest);
    let threshold = item.completion_threshold.unwrap();
    assert!(threshold.completed_by_measure);
    assert_eq!(threshold.min_progress_measure, 0.75);
    assert_eq!(threshold.progress_weight, 1.0);
    assert_eq!(item.hide_lms_ui, vec![HideLmsUi::Continue, HideLmsUi::Previous]);
    assert_eq!(item.data.len(), 1);
    assert!(item.data[0].read_shared_data);
    assert!(!item.data[0].write_shared_data);
}

#[test]
fn test_sequencing_rules_and_objectives() {
    let manifest = parse(MANIFEST).unwrap();
    let sequencing = lesson(&manifest).sequencing.as_ref().unwrap();
    assert_eq!(sequencing.id_ref.as_deref(), Some("common"));

    let rules = sequencing.sequencing_rules.as_ref().unwrap();
    let pre = &rules.pre_condition[0];
    assert_eq!(pre.action, RuleAction::Disabled);
    assert_eq!(pre.conditions.combination, ConditionCombination::Any);
    assert_eq!(pre.conditions.conditions[0].operator, ConditionOperator::Not);
    assert_eq!(pre.conditions.conditions[0].condition, RuleConditionType::Satisfied);
    assert_eq!(pre.conditions.conditions[0].referenced_objective.as_deref(), Some("OBJ-1"));
    assert_eq!(pre.conditions.conditions[1].operator, ConditionOperator::NoOp);
    let post = &rules.post_condition[0];
    assert_eq!(post.conditions.combination, ConditionCombination::All);
    assert_eq!(post.conditions.conditions[0].measure_threshold, 0.6);
    assert_eq!(post.action, RuleAction::Continue);
    assert!(rules.exit_condition.is_empty());

    let limits = sequencing.limit_conditions.as_ref().unwrap();
    assert_eq!(limits.attempt_limit, Some(2));

    let objectives = sequencing.objectives.as_ref().unwrap();
    let primary = objectives.primary.as_ref().unwrap();
    assert!(primary.satisfied_by_measure);
    assert_eq!(primary.min_normalized_measure, 0.8);
    let map = &primary.map_info[0];
    assert!(map.read_satisfied_status && map.read_normalized_measure);
    assert!(map.write_satisfied_status && !map.write_normalized_measure);
    assert!(objectives.declares("OBJ-2"));
    assert_eq!(objectives.objectives[0].min_normalized_measure, 1.0);

    assert_eq!(sequencing.adl_objectives.len(), 1);
    let adl_map = &sequencing.adl_objectives[0].map_info[0];
    assert!(adl_map.write_completion_status && !adl_map.write_raw_score && adl_map.read_raw_score);
}

#[test]
fn test_organization_sequencing() {
    let manifest = parse(MANIFEST).unwrap();
    let organization = &manifest.organizations.organizations[0];
    assert!(!organization.objectives_global_to_system);
    assert!(organization.shared_data_global_to_system);

    let sequencing = organization.sequencing.as_ref().unwrap();
    let control = sequencing.effective_control_mode();
    assert!(!control.choice && control.flow && control.choice_exit);

    let rollup = sequencing.rollup_rules.as_ref().unwrap();
    assert_eq!(rollup.objective_measure_weight, 0.5);
    let rule = &rollup.rules[0];
    assert_eq!(rule.child_activity_set, ChildActivitySet::AtLeastPercent);
    assert_eq!(rule.minimum_percent, 0.5);
    assert_eq!(rule.conditions.combination, ConditionCombination::Any);
    assert_eq!(rule.action, RollupAction::Completed);

    let randomization = sequencing.randomization_controls.unwrap();
    assert_eq!(randomization.selection_timing, RandomizationTiming::OnEachNewAttempt);
    assert_eq!(randomization.randomization_timing, RandomizationTiming::Never);
    assert_eq!(randomization.select_count, Some(1));
    assert!(!sequencing.effective_delivery_controls().tracked);
    assert!(sequencing.constrained_choice_considerations.unwrap().prevent_activation);
    let considerations = sequencing.rollup_considerations.unwrap();
    assert_eq!(considerations.required_for_satisfied, RollupRequirement::IfAttempted);
    assert_eq!(considerations.required_for_completed, RollupRequirement::Always);
    assert!(!considerations.measure_satisfaction_if_active);
}

#[test]
fn test_sequencing_collection_reference() {
    let manifest = parse(MANIFEST).unwrap();
    assert_eq!(manifest.sequencing_collection.len(), 1);
    let local = lesson(&manifest).sequencing.as_ref().unwrap();
    let effective = manifest.effective_sequencing(local);
    assert!(!effective.effective_control_mode().choice_exit);
    assert!(effective.effective_delivery_controls().completion_set_by_content);
    // Local parts stay in place.
    assert_eq!(effective.limit_conditions.unwrap().attempt_limit, Some(2));
}

#[test]
fn test_editions() {
    let with_version = |v: &str| {
        format!(
            "<manifest identifier=\"M\"><metadata><schemaversion>{}</schemaversion></metadata></manifest>",
            v
        )
    };
    assert_eq!(parse(&with_version("CAM 1.3")).unwrap().edition, Some(Scorm2004Edition::Second));
    assert_eq!(parse(&with_version("2004 3rd Edition")).unwrap().edition, Some(Scorm2004Edition::Third));
    let unknown = parse(&with_version("2004 5th Edition")).unwrap();
    assert_eq!(unknown.edition, None);
    assert_eq!(unknown.version(), Some("2004 5th Edition"));
}

#[test]
fn test_third_edition_completion_threshold_text() {
    let xml = r#"<manifest identifier="M"><organizations><organization identifier="O">
        <item identifier="I"><adlcp:completionThreshold>0.6</adlcp:completionThreshold></item>
        </organization></organizations></manifest>"#;
    let manifest = parse(xml).unwrap();
    let item = &manifest.organizations.organizations[0].items[0];
    assert_eq!(item.completion_threshold.unwrap().min_progress_measure, 0.6);
}

#[test]
fn test_unknown_tokens_fail_naming_attribute() {
    let xml = r#"<manifest identifier="M"><organizations><organization identifier="O">
        <item identifier="I"><imsss:sequencing><imsss:sequencingRules><imsss:preConditionRule>
          <imsss:ruleConditions><imsss:ruleCondition condition="sunny"/></imsss:ruleConditions>
          <imsss:ruleAction action="skip"/>
        </imsss:preConditionRule></imsss:sequencingRules></imsss:sequencing></item>
        </organization></organizations></manifest>"#;
    let err = parse(xml).unwrap_err();
    match err {
        ParseError::Format { field, message, .. } => {
            assert_eq!(field, "imsss:ruleCondition@condition");
            assert!(message.contains("sunny"));
        },
        other => panic!("unexpected error: {other:?}"),
    }

    let xml = r#"<manifest identifier="M"><organizations><organization identifier="O">
        <imsss:sequencing><imsss:randomizationControls randomizationTiming="sometimes"/></imsss:sequencing>
        </organization></organizations></manifest>"#;
    assert!(matches!(
        parse(xml),
        Err(ParseError::Format { ref field, .. }) if field == "imsss:randomizationControls@randomizationTiming"
    ));
}

#[test]
fn test_missing_rule_action_fails() {
    let xml = r#"<manifest identifier="M"><organizations><organization identifier="O">
        <imsss:sequencing><imsss:sequencingRules><imsss:exitConditionRule>
          <imsss:ruleConditions><imsss:ruleCondition condition="completed"/></imsss:ruleConditions>
        </imsss:exitConditionRule></imsss:sequencingRules></imsss:sequencing>
        </organization></organizations></manifest>"#;
    assert!(matches!(parse(xml), Err(ParseError::Format { .. })));
}

#[test]
fn test_objectives_without_namespace_declarations_use_prefix() {
    let xml = r#"<manifest identifier="M"><organizations><organization identifier="O">
        <item identifier="I"><imsss:sequencing>
          <imsss:objectives><imsss:primaryObjective objectiveID="P"/></imsss:objectives>
          <adlseq:objectives><adlseq:objective objectiveID="P"/></adlseq:objectives>
        </imsss:sequencing></item></organization></organizations></manifest>"#;
    let manifest = parse(xml).unwrap();
    let sequencing = manifest.organizations.organizations[0].items[0].sequencing.as_ref().unwrap();
    assert!(sequencing.objectives.as_ref().unwrap().declares("P"));
    assert_eq!(sequencing.adl_objectives[0].objective_id, "P");
}

#[test]
fn test_activity_tree_is_hierarchical() {
    let manifest = parse(MANIFEST).unwrap();
    let organization = manifest.organizations.default_organization().unwrap();
    let ids: Vec<&str> = organization.all_items().iter().map(|i| i.identifier.as_str()).collect();
    assert_eq!(ids, vec!["MODULE-1", "LESSON-1"]);
    assert!(!organization.items[0].is_leaf());
    assert!(organization.items[0].items[0].is_leaf());
}
