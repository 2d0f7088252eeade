//! Decoding of `<imsss:sequencing>` and the ADL sequencing extensions.

use super::sequencing::{
    AdlMapInfo, AdlObjective, ConditionCombination, ConditionOperator, ConstrainedChoiceConsiderations,
    ControlMode, DeliveryControls, LimitConditions, MapInfo, Objective, Objectives, RandomizationControls,
    RandomizationTiming, RollupCondition, RollupConditions, RollupConsiderations, RollupRequirement, RollupRule,
    RollupRules, RuleCondition, RuleConditions, Sequencing, SequencingRule, SequencingRules, ChildActivitySet,
};
use crate::common::error::{ParseError, ParseResult};
use crate::common::xml::XmlElement;
use crate::cp::PackageContext;
use std::fmt::Display;
use std::str::FromStr;

/// Whether an element belongs to the ADL sequencing extension namespace.
fn is_adlseq(element: &XmlElement) -> bool {
    element.in_namespace("adlseq") || element.prefix.as_deref() == Some("adlseq")
}

fn required_attr<T>(ctx: &PackageContext<'_>, element: &XmlElement, attribute: &str) -> ParseResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    ctx.parse_attr(element, attribute)?
        .ok_or_else(|| ctx.attribute_error(element, attribute, "missing required attribute"))
}

fn attr_or<T>(ctx: &PackageContext<'_>, element: &XmlElement, attribute: &str, default: T) -> ParseResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(ctx.parse_attr(element, attribute)?.unwrap_or(default))
}

/// Decode an `<imsss:sequencing>` element.
pub fn decode_sequencing(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<Sequencing> {
    let mut objectives = None;
    let mut adl_objectives = Vec::new();
    for candidate in element.children_named("objectives") {
        if is_adlseq(candidate) {
            adl_objectives = decode_adl_objectives(ctx, candidate)?;
        } else {
            objectives = Some(decode_objectives(ctx, candidate)?);
        }
    }

    Ok(Sequencing {
        id: element.attr("ID").map(str::to_string),
        id_ref: element.attr("IDRef").map(str::to_string),
        control_mode: element
            .child("controlMode")
            .map(|e| decode_control_mode(ctx, e))
            .transpose()?,
        sequencing_rules: element
            .child("sequencingRules")
            .map(|e| decode_sequencing_rules(ctx, e))
            .transpose()?,
        limit_conditions: element
            .child("limitConditions")
            .map(|e| decode_limit_conditions(ctx, e))
            .transpose()?,
        rollup_rules: element
            .child("rollupRules")
            .map(|e| decode_rollup_rules(ctx, e))
            .transpose()?,
        objectives,
        randomization_controls: element
            .child("randomizationControls")
            .map(|e| decode_randomization(ctx, e))
            .transpose()?,
        delivery_controls: element
            .child("deliveryControls")
            .map(|e| decode_delivery_controls(ctx, e))
            .transpose()?,
        constrained_choice_considerations: element
            .child("constrainedChoiceConsiderations")
            .map(|e| {
                Ok::<_, ParseError>(ConstrainedChoiceConsiderations {
                    prevent_activation: ctx.bool_attr(e, "preventActivation", false)?,
                    constrain_choice: ctx.bool_attr(e, "constrainChoice", false)?,
                })
            })
            .transpose()?,
        rollup_considerations: element
            .child("rollupConsiderations")
            .map(|e| decode_rollup_considerations(ctx, e))
            .transpose()?,
        adl_objectives,
    })
}

fn decode_control_mode(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<ControlMode> {
    let defaults = ControlMode::default();
    Ok(ControlMode {
        choice: ctx.bool_attr(element, "choice", defaults.choice)?,
        choice_exit: ctx.bool_attr(element, "choiceExit", defaults.choice_exit)?,
        flow: ctx.bool_attr(element, "flow", defaults.flow)?,
        forward_only: ctx.bool_attr(element, "forwardOnly", defaults.forward_only)?,
        use_current_attempt_objective_info: ctx.bool_attr(
            element,
            "useCurrentAttemptObjectiveInfo",
            defaults.use_current_attempt_objective_info,
        )?,
        use_current_attempt_progress_info: ctx.bool_attr(
            element,
            "useCurrentAttemptProgressInfo",
            defaults.use_current_attempt_progress_info,
        )?,
    })
}

fn decode_sequencing_rules(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<SequencingRules> {
    let rules = |name: &str| -> ParseResult<Vec<SequencingRule>> {
        element
            .children
            .iter()
            .filter(|c| c.is(name))
            .map(|rule| decode_sequencing_rule(ctx, rule))
            .collect()
    };
    Ok(SequencingRules {
        pre_condition: rules("preConditionRule")?,
        exit_condition: rules("exitConditionRule")?,
        post_condition: rules("postConditionRule")?,
    })
}

fn decode_sequencing_rule(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<SequencingRule> {
    let conditions = match element.child("ruleConditions") {
        Some(conditions) => RuleConditions {
            combination: attr_or(ctx, conditions, "conditionCombination", ConditionCombination::All)?,
            conditions: conditions
                .children_named("ruleCondition")
                .map(|c| {
                    Ok(RuleCondition {
                        referenced_objective: c.attr("referencedObjective").map(str::to_string),
                        measure_threshold: attr_or(ctx, c, "measureThreshold", 0.0)?,
                        operator: attr_or(ctx, c, "operator", ConditionOperator::NoOp)?,
                        condition: required_attr(ctx, c, "condition")?,
                    })
                })
                .collect::<ParseResult<Vec<_>>>()?,
        },
        None => RuleConditions {
            combination: ConditionCombination::All,
            conditions: Vec::new(),
        },
    };
    let action_element = element.child("ruleAction").ok_or_else(|| {
        ParseError::format(ctx.path, element.qualified_name(), "missing <ruleAction>")
    })?;
    Ok(SequencingRule {
        conditions,
        action: required_attr(ctx, action_element, "action")?,
    })
}

fn decode_limit_conditions(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<LimitConditions> {
    Ok(LimitConditions {
        attempt_limit: ctx.parse_attr(element, "attemptLimit")?,
        attempt_absolute_duration_limit: element.attr("attemptAbsoluteDurationLimit").map(str::to_string),
    })
}

fn decode_rollup_rules(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<RollupRules> {
    let defaults = RollupRules::default();
    let rules = element
        .children_named("rollupRule")
        .map(|rule| {
            let conditions = match rule.child("rollupConditions") {
                Some(conditions) => RollupConditions {
                    combination: attr_or(ctx, conditions, "conditionCombination", ConditionCombination::Any)?,
                    conditions: conditions
                        .children_named("rollupCondition")
                        .map(|c| {
                            Ok(RollupCondition {
                                operator: attr_or(ctx, c, "operator", ConditionOperator::NoOp)?,
                                condition: required_attr(ctx, c, "condition")?,
                            })
                        })
                        .collect::<ParseResult<Vec<_>>>()?,
                },
                None => RollupConditions {
                    combination: ConditionCombination::Any,
                    conditions: Vec::new(),
                },
            };
            let action_element = rule.child("rollupAction").ok_or_else(|| {
                ParseError::format(ctx.path, rule.qualified_name(), "missing <rollupAction>")
            })?;
            Ok(RollupRule {
                child_activity_set: attr_or(ctx, rule, "childActivitySet", ChildActivitySet::All)?,
                minimum_count: attr_or(ctx, rule, "minimumCount", 0)?,
                minimum_percent: attr_or(ctx, rule, "minimumPercent", 0.0)?,
                conditions,
                action: required_attr(ctx, action_element, "action")?,
            })
        })
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(RollupRules {
        rollup_objective_satisfied: ctx.bool_attr(
            element,
            "rollupObjectiveSatisfied",
            defaults.rollup_objective_satisfied,
        )?,
        rollup_progress_completion: ctx.bool_attr(
            element,
            "rollupProgressCompletion",
            defaults.rollup_progress_completion,
        )?,
        objective_measure_weight: attr_or(ctx, element, "objectiveMeasureWeight", defaults.objective_measure_weight)?,
        rules,
    })
}

fn decode_objectives(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<Objectives> {
    Ok(Objectives {
        primary: element
            .child("primaryObjective")
            .map(|o| decode_objective(ctx, o))
            .transpose()?,
        objectives: element
            .children_named("objective")
            .map(|o| decode_objective(ctx, o))
            .collect::<ParseResult<Vec<_>>>()?,
    })
}

fn decode_objective(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<Objective> {
    let min_normalized_measure = match element.child("minNormalizedMeasure") {
        Some(measure) => {
            let text = measure.text.trim();
            text.parse::<f64>().map_err(|e| {
                ParseError::format(
                    ctx.path,
                    measure.qualified_name(),
                    format!("invalid value '{}': {}", text, e),
                )
            })?
        },
        None => 1.0,
    };
    Ok(Objective {
        objective_id: element.attr("objectiveID").map(str::to_string),
        satisfied_by_measure: ctx.bool_attr(element, "satisfiedByMeasure", false)?,
        min_normalized_measure,
        map_info: element
            .children_named("mapInfo")
            .map(|m| {
                Ok(MapInfo {
                    target_objective_id: required_attr(ctx, m, "targetObjectiveID")?,
                    read_satisfied_status: ctx.bool_attr(m, "readSatisfiedStatus", true)?,
                    read_normalized_measure: ctx.bool_attr(m, "readNormalizedMeasure", true)?,
                    write_satisfied_status: ctx.bool_attr(m, "writeSatisfiedStatus", false)?,
                    write_normalized_measure: ctx.bool_attr(m, "writeNormalizedMeasure", false)?,
                })
            })
            .collect::<ParseResult<Vec<_>>>()?,
    })
}

fn decode_adl_objectives(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<Vec<AdlObjective>> {
    element
        .children_named("objective")
        .map(|objective| {
            Ok(AdlObjective {
                objective_id: required_attr(ctx, objective, "objectiveID")?,
                map_info: objective
                    .children_named("mapInfo")
                    .map(|m| {
                        Ok(AdlMapInfo {
                            target_objective_id: required_attr(ctx, m, "targetObjectiveID")?,
                            read_raw_score: ctx.bool_attr(m, "readRawScore", true)?,
                            read_min_score: ctx.bool_attr(m, "readMinScore", true)?,
                            read_max_score: ctx.bool_attr(m, "readMaxScore", true)?,
                            read_completion_status: ctx.bool_attr(m, "readCompletionStatus", true)?,
                            read_progress_measure: ctx.bool_attr(m, "readProgressMeasure", true)?,
                            write_raw_score: ctx.bool_attr(m, "writeRawScore", false)?,
                            write_min_score: ctx.bool_attr(m, "writeMinScore", false)?,
                            write_max_score: ctx.bool_attr(m, "writeMaxScore", false)?,
                            write_completion_status: ctx.bool_attr(m, "writeCompletionStatus", false)?,
                            write_progress_measure: ctx.bool_attr(m, "writeProgressMeasure", false)?,
                        })
                    })
                    .collect::<ParseResult<Vec<_>>>()?,
            })
        })
        .collect()
}

fn decode_randomization(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<RandomizationControls> {
    Ok(RandomizationControls {
        randomization_timing: attr_or(ctx, element, "randomizationTiming", RandomizationTiming::Never)?,
        select_count: ctx.parse_attr(element, "selectCount")?,
        reorder_children: ctx.bool_attr(element, "reorderChildren", false)?,
        selection_timing: attr_or(ctx, element, "selectionTiming", RandomizationTiming::Never)?,
    })
}

fn decode_delivery_controls(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<DeliveryControls> {
    Ok(DeliveryControls {
        tracked: ctx.bool_attr(element, "tracked", true)?,
        completion_set_by_content: ctx.bool_attr(element, "completionSetByContent", false)?,
        objective_set_by_content: ctx.bool_attr(element, "objectiveSetByContent", false)?,
    })
}

fn decode_rollup_considerations(
    ctx: &PackageContext<'_>,
    element: &XmlElement,
) -> ParseResult<RollupConsiderations> {
    Ok(RollupConsiderations {
        required_for_satisfied: attr_or(ctx, element, "requiredForSatisfied", RollupRequirement::Always)?,
        required_for_not_satisfied: attr_or(ctx, element, "requiredForNotSatisfied", RollupRequirement::Always)?,
        required_for_completed: attr_or(ctx, element, "requiredForCompleted", RollupRequirement::Always)?,
        required_for_incomplete: attr_or(ctx, element, "requiredForIncomplete", RollupRequirement::Always)?,
        measure_satisfaction_if_active: ctx.bool_attr(element, "measureSatisfactionIfActive", true)?,
    })
}
