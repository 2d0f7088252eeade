//! IMS Simple Sequencing definitions as used by SCORM 2004.
//!
//! This is a read-only model of what a manifest declares. Nothing here
//! evaluates rules; that is the job of an LMS at run time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declare a closed vocabulary with its XML tokens.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $token)] $variant),+
        }

        impl $name {
            /// Token as written in the manifest.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($token => Ok($name::$variant),)+
                    other => Err(format!("unknown token '{}'", other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// How the conditions of a rule are combined.
    ConditionCombination { All => "all", Any => "any" }
}

vocabulary! {
    ConditionOperator { Not => "not", NoOp => "noOp" }
}

vocabulary! {
    /// Conditions usable in pre-, exit- and post-condition rules.
    RuleConditionType {
        Satisfied => "satisfied",
        ObjectiveStatusKnown => "objectiveStatusKnown",
        ObjectiveMeasureKnown => "objectiveMeasureKnown",
        ObjectiveMeasureGreaterThan => "objectiveMeasureGreaterThan",
        ObjectiveMeasureLessThan => "objectiveMeasureLessThan",
        Completed => "completed",
        ActivityProgressKnown => "activityProgressKnown",
        Attempted => "attempted",
        AttemptLimitExceeded => "attemptLimitExceeded",
        TimeLimitExceeded => "timeLimitExceeded",
        OutsideAvailableTimeRange => "outsideAvailableTimeRange",
        Always => "always",
    }
}

vocabulary! {
    /// Actions of sequencing rules. Which ones are legal depends on the rule kind.
    RuleAction {
        Skip => "skip",
        Disabled => "disabled",
        HiddenFromChoice => "hiddenFromChoice",
        StopForwardTraversal => "stopForwardTraversal",
        Exit => "exit",
        ExitParent => "exitParent",
        ExitAll => "exitAll",
        Retry => "retry",
        RetryAll => "retryAll",
        Continue => "continue",
        Previous => "previous",
    }
}

vocabulary! {
    RollupConditionType {
        Satisfied => "satisfied",
        ObjectiveStatusKnown => "objectiveStatusKnown",
        ObjectiveMeasureKnown => "objectiveMeasureKnown",
        Completed => "completed",
        ActivityProgressKnown => "activityProgressKnown",
        Attempted => "attempted",
        AttemptLimitExceeded => "attemptLimitExceeded",
        TimeLimitExceeded => "timeLimitExceeded",
        OutsideAvailableTimeRange => "outsideAvailableTimeRange",
    }
}

vocabulary! {
    RollupAction {
        Satisfied => "satisfied",
        NotSatisfied => "notSatisfied",
        Completed => "completed",
        Incomplete => "incomplete",
    }
}

vocabulary! {
    /// Which children a rollup rule looks at.
    ChildActivitySet {
        All => "all",
        Any => "any",
        None => "none",
        AtLeastCount => "atLeastCount",
        AtLeastPercent => "atLeastPercent",
    }
}

vocabulary! {
    RandomizationTiming {
        Never => "never",
        Once => "once",
        OnEachNewAttempt => "onEachNewAttempt",
    }
}

vocabulary! {
    /// When a child takes part in rollup (`adlseq:rollupConsiderations`).
    RollupRequirement {
        Always => "always",
        IfAttempted => "ifAttempted",
        IfNotSkipped => "ifNotSkipped",
        IfNotSuspended => "ifNotSuspended",
    }
}

/// `<imsss:controlMode>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMode {
    pub choice: bool,
    pub choice_exit: bool,
    pub flow: bool,
    pub forward_only: bool,
    pub use_current_attempt_objective_info: bool,
    pub use_current_attempt_progress_info: bool,
}

impl Default for ControlMode {
    fn default() -> Self {
        Self {
            choice: true,
            choice_exit: true,
            flow: false,
            forward_only: false,
            use_current_attempt_objective_info: true,
            use_current_attempt_progress_info: true,
        }
    }
}

/// One `<imsss:ruleCondition>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    /// Objective the condition is evaluated against; the primary objective when absent
    pub referenced_objective: Option<String>,
    pub measure_threshold: f64,
    pub operator: ConditionOperator,
    pub condition: RuleConditionType,
}

/// `<imsss:ruleConditions>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConditions {
    pub combination: ConditionCombination,
    pub conditions: Vec<RuleCondition>,
}

/// A pre-condition, exit-condition or post-condition rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencingRule {
    pub conditions: RuleConditions,
    pub action: RuleAction,
}

/// `<imsss:sequencingRules>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequencingRules {
    pub pre_condition: Vec<SequencingRule>,
    pub exit_condition: Vec<SequencingRule>,
    pub post_condition: Vec<SequencingRule>,
}

impl SequencingRules {
    /// All rules, pre, exit then post.
    pub fn all(&self) -> impl Iterator<Item = &SequencingRule> {
        self.pre_condition
            .iter()
            .chain(&self.exit_condition)
            .chain(&self.post_condition)
    }
}

/// `<imsss:limitConditions>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LimitConditions {
    pub attempt_limit: Option<u32>,
    /// ISO 8601 duration, as written
    pub attempt_absolute_duration_limit: Option<String>,
}

impl LimitConditions {
    pub fn attempt_duration(&self) -> Option<std::time::Duration> {
        self.attempt_absolute_duration_limit
            .as_deref()
            .and_then(crate::common::duration::parse_iso8601)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupCondition {
    pub operator: ConditionOperator,
    pub condition: RollupConditionType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupConditions {
    pub combination: ConditionCombination,
    pub conditions: Vec<RollupCondition>,
}

/// `<imsss:rollupRule>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupRule {
    pub child_activity_set: ChildActivitySet,
    pub minimum_count: u32,
    pub minimum_percent: f64,
    pub conditions: RollupConditions,
    pub action: RollupAction,
}

/// `<imsss:rollupRules>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupRules {
    pub rollup_objective_satisfied: bool,
    pub rollup_progress_completion: bool,
    pub objective_measure_weight: f64,
    pub rules: Vec<RollupRule>,
}

impl Default for RollupRules {
    fn default() -> Self {
        Self {
            rollup_objective_satisfied: true,
            rollup_progress_completion: true,
            objective_measure_weight: 1.0,
            rules: Vec::new(),
        }
    }
}

/// `<imsss:mapInfo>`: link from a local objective to a global one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    pub target_objective_id: String,
    pub read_satisfied_status: bool,
    pub read_normalized_measure: bool,
    pub write_satisfied_status: bool,
    pub write_normalized_measure: bool,
}

/// A primary or secondary `<imsss:objective>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub objective_id: Option<String>,
    pub satisfied_by_measure: bool,
    pub min_normalized_measure: f64,
    pub map_info: Vec<MapInfo>,
}

/// `<imsss:objectives>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Objectives {
    pub primary: Option<Objective>,
    pub objectives: Vec<Objective>,
}

impl Objectives {
    /// Primary objective first, then the others.
    pub fn all(&self) -> impl Iterator<Item = &Objective> {
        self.primary.iter().chain(&self.objectives)
    }

    /// Whether an objective with this ID is declared.
    pub fn declares(&self, id: &str) -> bool {
        self.all().any(|o| o.objective_id.as_deref() == Some(id))
    }
}

/// `<adlseq:mapInfo>` (4th Edition extended global objective access).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdlMapInfo {
    pub target_objective_id: String,
    pub read_raw_score: bool,
    pub read_min_score: bool,
    pub read_max_score: bool,
    pub read_completion_status: bool,
    pub read_progress_measure: bool,
    pub write_raw_score: bool,
    pub write_min_score: bool,
    pub write_max_score: bool,
    pub write_completion_status: bool,
    pub write_progress_measure: bool,
}

/// `<adlseq:objective>`: extensions to an `imsss` objective with the same ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdlObjective {
    pub objective_id: String,
    pub map_info: Vec<AdlMapInfo>,
}

/// `<imsss:randomizationControls>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizationControls {
    pub randomization_timing: RandomizationTiming,
    pub select_count: Option<u32>,
    pub reorder_children: bool,
    pub selection_timing: RandomizationTiming,
}

impl Default for RandomizationControls {
    fn default() -> Self {
        Self {
            randomization_timing: RandomizationTiming::Never,
            select_count: None,
            reorder_children: false,
            selection_timing: RandomizationTiming::Never,
        }
    }
}

/// `<imsss:deliveryControls>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryControls {
    pub tracked: bool,
    pub completion_set_by_content: bool,
    pub objective_set_by_content: bool,
}

impl Default for DeliveryControls {
    fn default() -> Self {
        Self {
            tracked: true,
            completion_set_by_content: false,
            objective_set_by_content: false,
        }
    }
}

/// `<adlseq:constrainedChoiceConsiderations>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstrainedChoiceConsiderations {
    pub prevent_activation: bool,
    pub constrain_choice: bool,
}

/// `<adlseq:rollupConsiderations>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupConsiderations {
    pub required_for_satisfied: RollupRequirement,
    pub required_for_not_satisfied: RollupRequirement,
    pub required_for_completed: RollupRequirement,
    pub required_for_incomplete: RollupRequirement,
    pub measure_satisfaction_if_active: bool,
}

impl Default for RollupConsiderations {
    fn default() -> Self {
        Self {
            required_for_satisfied: RollupRequirement::Always,
            required_for_not_satisfied: RollupRequirement::Always,
            required_for_completed: RollupRequirement::Always,
            required_for_incomplete: RollupRequirement::Always,
            measure_satisfaction_if_active: true,
        }
    }
}

/// An `<imsss:sequencing>` element, on an item, an organization or in the
/// `<imsss:sequencingCollection>`.
///
/// Every part is optional: an absent part means the defaults apply, or,
/// when `id_ref` is set, that the referenced collection entry supplies it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sequencing {
    /// `ID`, set on collection entries
    pub id: Option<String>,
    /// `IDRef` to a collection entry
    pub id_ref: Option<String>,
    pub control_mode: Option<ControlMode>,
    pub sequencing_rules: Option<SequencingRules>,
    pub limit_conditions: Option<LimitConditions>,
    pub rollup_rules: Option<RollupRules>,
    pub objectives: Option<Objectives>,
    pub randomization_controls: Option<RandomizationControls>,
    pub delivery_controls: Option<DeliveryControls>,
    pub constrained_choice_considerations: Option<ConstrainedChoiceConsiderations>,
    pub rollup_considerations: Option<RollupConsiderations>,
    pub adl_objectives: Vec<AdlObjective>,
}

impl Sequencing {
    /// Fill parts this element leaves out from `base`.
    ///
    /// Used to apply a collection entry referenced by `IDRef`; the local
    /// declaration wins part by part.
    pub fn merged_over(&self, base: &Sequencing) -> Sequencing {
        Sequencing {
            id: self.id.clone(),
            id_ref: self.id_ref.clone(),
            control_mode: self.control_mode.or(base.control_mode),
            sequencing_rules: self.sequencing_rules.clone().or_else(|| base.sequencing_rules.clone()),
            limit_conditions: self.limit_conditions.clone().or_else(|| base.limit_conditions.clone()),
            rollup_rules: self.rollup_rules.clone().or_else(|| base.rollup_rules.clone()),
            objectives: self.objectives.clone().or_else(|| base.objectives.clone()),
            randomization_controls: self.randomization_controls.or(base.randomization_controls),
            delivery_controls: self.delivery_controls.or(base.delivery_controls),
            constrained_choice_considerations: self
                .constrained_choice_considerations
                .or(base.constrained_choice_considerations),
            rollup_considerations: self.rollup_considerations.or(base.rollup_considerations),
            adl_objectives: if self.adl_objectives.is_empty() {
                base.adl_objectives.clone()
            } else {
                self.adl_objectives.clone()
            },
        }
    }

    /// Control mode in effect, defaults included.
    pub fn effective_control_mode(&self) -> ControlMode {
        self.control_mode.unwrap_or_default()
    }

    /// Delivery controls in effect, defaults included.
    pub fn effective_delivery_controls(&self) -> DeliveryControls {
        self.delivery_controls.unwrap_or_default()
    }

    /// Objective IDs referenced by rule conditions.
    pub fn referenced_objectives(&self) -> impl Iterator<Item = &str> {
        self.sequencing_rules
            .iter()
            .flat_map(SequencingRules::all)
            .flat_map(|rule| &rule.conditions.conditions)
            .filter_map(|c| c.referenced_objective.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_tokens_are_exact() {
        assert_eq!("hiddenFromChoice".parse::<RuleAction>(), Ok(RuleAction::HiddenFromChoice));
        assert!("HiddenFromChoice".parse::<RuleAction>().is_err());
        assert_eq!(ChildActivitySet::AtLeastPercent.to_string(), "atLeastPercent");
        assert_eq!(
            serde_json::to_string(&RandomizationTiming::OnEachNewAttempt).unwrap(),
            "\"onEachNewAttempt\""
        );
    }

    #[test]
    fn test_defaults() {
        let control = ControlMode::default();
        assert!(control.choice && control.choice_exit);
        assert!(!control.flow && !control.forward_only);
        assert!(DeliveryControls::default().tracked);
        let rollup = RollupRules::default();
        assert!(rollup.rollup_objective_satisfied && rollup.rollup_progress_completion);
        assert_eq!(rollup.objective_measure_weight, 1.0);
    }

    #[test]
    fn test_merge_keeps_local_parts() {
        let base = Sequencing {
            id: Some("common".into()),
            control_mode: Some(ControlMode {
                flow: true,
                ..ControlMode::default()
            }),
            limit_conditions: Some(LimitConditions {
                attempt_limit: Some(3),
                attempt_absolute_duration_limit: None,
            }),
            ..Sequencing::default()
        };
        let local = Sequencing {
            id_ref: Some("common".into()),
            limit_conditions: Some(LimitConditions {
                attempt_limit: Some(1),
                attempt_absolute_duration_limit: Some("PT1H".into()),
            }),
            ..Sequencing::default()
        };
        let merged = local.merged_over(&base);
        assert!(merged.effective_control_mode().flow);
        let limits = merged.limit_conditions.unwrap();
        assert_eq!(limits.attempt_limit, Some(1));
        assert_eq!(limits.attempt_duration(), Some(std::time::Duration::from_secs(3_600)));
        assert_eq!(merged.id, None);
    }
}
