// ABOUTME: Step-gated wizard controller for entity intake
// Owns the live entity, current step and completed steps; funnels every edit through named operations

use super::draft::{DraftSnapshot, DraftStore};
use super::phases::{AutoPopulationEngine, EvaluationPhase, PopulationContext, PopulationOutcome};
use super::steps::{StepDescriptor, StepRegistry};
use crate::models::EntityDraft;
use crate::schema::firm::{CHALLENGE, CHALLENGE_TYPE, PHASES, PHASE_COUNT};
use crate::schema::{FieldErrors, FieldKind, FieldSchema, FieldSpec};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Whether the session creates a new record or edits a stored one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit { id: String },
}

/// Position and content of a wizard session
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    /// 1-indexed, always within the registry
    pub current_step: usize,
    /// Steps that passed validation at least once
    pub completed_steps: BTreeSet<usize>,
    pub entity: EntityDraft,
}

impl WizardState {
    fn fresh(entity: EntityDraft) -> Self {
        Self {
            current_step: 1,
            completed_steps: BTreeSet::new(),
            entity,
        }
    }
}

/// Result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { from: usize, to: usize },
    /// Request accepted but the step did not change (already at the boundary)
    Stayed,
    /// Validation of the current step failed; nothing advanced
    Blocked(FieldErrors),
}

impl StepOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, StepOutcome::Blocked(_))
    }
}

pub struct WizardController {
    registry: StepRegistry,
    schema: FieldSchema,
    mode: WizardMode,
    state: WizardState,
    template: EntityDraft,
    drafts: Option<DraftStore>,
    engine: AutoPopulationEngine,
    errors: FieldErrors,
    dirty: bool,
    submitting: bool,
    last_population: Option<PopulationOutcome>,
}

impl WizardController {
    /// Start a create session, recovering the stored draft when one parses
    pub fn create(registry: StepRegistry, schema: FieldSchema, drafts: Option<DraftStore>) -> Self {
        let template = schema.form_defaults();
        let mut controller = Self {
            state: WizardState::fresh(template.clone()),
            registry,
            schema,
            mode: WizardMode::Create,
            template,
            drafts,
            engine: AutoPopulationEngine::new(),
            errors: FieldErrors::new(),
            dirty: false,
            submitting: false,
            last_population: None,
        };
        controller.recover_draft();
        controller
    }

    /// Start an edit session seeded from the stored record; drafts are never used
    pub fn edit(
        registry: StepRegistry,
        schema: FieldSchema,
        id: impl Into<String>,
        initial: EntityDraft,
    ) -> Self {
        let template = schema.form_defaults();
        let mut entity = template.clone();
        for (key, value) in initial.as_map() {
            match (value, schema.field(key)) {
                (Value::Object(fields), None) => {
                    let section = entity.section_mut(key);
                    for (field, v) in fields {
                        section.insert(field.clone(), v.clone());
                    }
                }
                _ => entity.set(None, key, value.clone()),
            }
        }

        let mut controller = Self {
            state: WizardState::fresh(entity),
            registry,
            schema,
            mode: WizardMode::Edit { id: id.into() },
            template,
            drafts: None,
            engine: AutoPopulationEngine::new(),
            errors: FieldErrors::new(),
            dirty: false,
            submitting: false,
            last_population: None,
        };

        let tag = controller.challenge_type_tag();
        let outcome =
            controller
                .engine
                .apply(&mut controller.state.entity, &tag, PopulationContext::Hydrating);
        controller.last_population = Some(outcome);
        controller
    }

    fn recover_draft(&mut self) {
        let Some(snapshot) = self.drafts.as_ref().and_then(DraftStore::load) else {
            return;
        };
        let step_count = self.registry.len();
        self.state = WizardState {
            current_step: self.registry.clamp(snapshot.current_step),
            completed_steps: snapshot
                .completed_steps
                .into_iter()
                .filter(|s| (1..=step_count).contains(s))
                .collect(),
            entity: snapshot.form_data,
        };
        self.dirty = self.state.entity != self.template;
        info!("Resumed wizard at step {}", self.state.current_step);
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn entity(&self) -> &EntityDraft {
        &self.state.entity
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn current_descriptor(&self) -> Option<&StepDescriptor> {
        self.registry.get(self.state.current_step)
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn is_edit_mode(&self) -> bool {
        matches!(self.mode, WizardMode::Edit { .. })
    }

    pub fn entity_id(&self) -> Option<&str> {
        match &self.mode {
            WizardMode::Edit { id } => Some(id),
            WizardMode::Create => None,
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn draft_store(&self) -> Option<&DraftStore> {
        self.drafts.as_ref()
    }

    pub fn last_population(&self) -> Option<&PopulationOutcome> {
        self.last_population.as_ref()
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot::new(
            self.state.entity.clone(),
            self.state.current_step,
            &self.state.completed_steps,
        )
    }

    // ---- navigation -------------------------------------------------------

    /// Validate the current step and advance by one on success
    pub fn go_next(&mut self) -> StepOutcome {
        let from = self.state.current_step;
        let errors = match self.registry.get(from) {
            Some(step) => self.schema.validate_section(&self.state.entity, step.section),
            None => FieldErrors::new(),
        };

        if !errors.is_empty() {
            debug!("Step {} blocked by {} field errors", from, errors.len());
            self.errors = errors.clone();
            return StepOutcome::Blocked(errors);
        }

        self.errors = FieldErrors::new();
        self.state.completed_steps.insert(from);
        let to = self.registry.clamp(from + 1);
        self.state.current_step = to;
        self.persist_draft();

        if to == from {
            StepOutcome::Stayed
        } else {
            debug!("Advanced wizard from step {} to {}", from, to);
            StepOutcome::Moved { from, to }
        }
    }

    /// Step back one page; never validates
    pub fn go_previous(&mut self) -> StepOutcome {
        let from = self.state.current_step;
        let to = self.registry.clamp(from.saturating_sub(1));
        self.errors = FieldErrors::new();
        if to == from {
            return StepOutcome::Stayed;
        }
        self.state.current_step = to;
        self.persist_draft();
        StepOutcome::Moved { from, to }
    }

    /// Jump to step `n`.
    ///
    /// Going back (or staying) is unconditional. Going forward advances one
    /// validated step at a time and stops at the first step that fails.
    pub fn go_to_step(&mut self, n: usize) -> StepOutcome {
        let from = self.state.current_step;
        let target = self.registry.clamp(n);

        if target <= from {
            if target == from {
                return StepOutcome::Stayed;
            }
            self.errors = FieldErrors::new();
            self.state.current_step = target;
            self.persist_draft();
            return StepOutcome::Moved { from, to: target };
        }

        while self.state.current_step < target {
            match self.go_next() {
                StepOutcome::Moved { .. } => {}
                StepOutcome::Blocked(errors) => return StepOutcome::Blocked(errors),
                StepOutcome::Stayed => break,
            }
        }

        StepOutcome::Moved {
            from,
            to: self.state.current_step,
        }
    }

    // ---- mutations --------------------------------------------------------

    /// Set a scalar or whole-list field by key
    pub fn set_field(&mut self, key: &str, value: Value) -> bool {
        if key == CHALLENGE_TYPE {
            if let Value::String(tag) = &value {
                self.set_challenge_type(tag);
                return true;
            }
        }
        let Some(spec) = self.schema.field(key).copied() else {
            warn!("Ignoring edit to unknown field {}", key);
            return false;
        };
        self.state.entity.set(spec.section, spec.key, value);
        self.after_mutation(spec.key);
        true
    }

    /// Change the discriminator and synchronously run phase auto-population
    pub fn set_challenge_type(&mut self, tag: &str) -> PopulationOutcome {
        self.state
            .entity
            .set(Some(CHALLENGE), CHALLENGE_TYPE, Value::String(tag.to_string()));
        let outcome = self
            .engine
            .apply(&mut self.state.entity, tag, PopulationContext::Interactive);
        self.last_population = Some(outcome.clone());
        self.errors.clear_field(PHASES);
        self.errors.clear_field(PHASE_COUNT);
        self.after_mutation(CHALLENGE_TYPE);
        outcome
    }

    /// Append a value to a multi-valued field
    pub fn push_item(&mut self, key: &str, item: Value) -> bool {
        let Some(spec) = self.list_field(key) else {
            return false;
        };
        let Some(section) = spec.section else {
            return false;
        };
        self.state.entity.list_mut(section, spec.key).push(item);
        self.after_mutation(spec.key);
        true
    }

    /// Set one key of the record at `index`
    pub fn update_item(&mut self, key: &str, index: usize, item_key: &str, value: Value) -> bool {
        let Some(spec) = self.list_field(key) else {
            return false;
        };
        if !matches!(spec.kind, FieldKind::Records(_)) {
            return false;
        }
        let Some(section) = spec.section else {
            return false;
        };
        let updated = match self
            .state
            .entity
            .list_mut(section, spec.key)
            .get_mut(index)
            .and_then(Value::as_object_mut)
        {
            Some(record) => {
                record.insert(item_key.to_string(), value);
                true
            }
            None => false,
        };
        if updated {
            self.dirty = true;
            self.errors.remove(&format!("{}[{index}].{item_key}", spec.key));
            self.persist_draft();
        }
        updated
    }

    /// Remove the item at `index`; positions of later items shift down
    pub fn remove_item(&mut self, key: &str, index: usize) -> bool {
        let Some(spec) = self.list_field(key) else {
            return false;
        };
        let Some(section) = spec.section else {
            return false;
        };
        let items = self.state.entity.list_mut(section, spec.key);
        if index >= items.len() {
            return false;
        }
        items.remove(index);
        if spec.key == PHASES {
            renumber_phases(items);
        }
        self.after_mutation(spec.key);
        true
    }

    /// Append a blank phase numbered after the existing ones
    pub fn add_phase(&mut self) -> usize {
        let number = self.state.entity.list(CHALLENGE, PHASES).len() + 1;
        let phase = EvaluationPhase::blank(number, &format!("Phase {number}"));
        self.push_item(PHASES, phase.to_value());
        number
    }

    pub fn update_phase(&mut self, index: usize, item_key: &str, value: Value) -> bool {
        if item_key == "stepNumber" {
            return false;
        }
        self.update_item(PHASES, index, item_key, value)
    }

    pub fn remove_phase(&mut self, index: usize) -> bool {
        self.remove_item(PHASES, index)
    }

    /// `(phases in list, phase count field)` when the two disagree
    pub fn phase_count_mismatch(&self) -> Option<(usize, usize)> {
        let phases = self.state.entity.list(CHALLENGE, PHASES).len();
        let count = match self.state.entity.get(Some(CHALLENGE), PHASE_COUNT) {
            Some(Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Some(Value::String(s)) => s.trim().parse::<usize>().ok(),
            _ => None,
        }?;
        (phases != count).then_some((phases, count))
    }

    fn list_field(&self, key: &str) -> Option<FieldSpec> {
        match self.schema.field(key) {
            Some(spec) if spec.is_multi_valued() => Some(*spec),
            Some(_) => {
                warn!("Field {} is not a list", key);
                None
            }
            None => {
                warn!("Ignoring edit to unknown field {}", key);
                None
            }
        }
    }

    fn challenge_type_tag(&self) -> String {
        self.state
            .entity
            .get(Some(CHALLENGE), CHALLENGE_TYPE)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn after_mutation(&mut self, key: &str) {
        self.dirty = true;
        self.errors.clear_field(key);
        self.persist_draft();
    }

    /// Write the draft when in create mode with unsaved edits
    fn persist_draft(&self) -> bool {
        if self.is_edit_mode() || !self.dirty {
            return false;
        }
        match &self.drafts {
            Some(drafts) => drafts.persist(&self.snapshot()),
            None => false,
        }
    }

    // ---- submission lifecycle ---------------------------------------------

    /// Mark a submission as outstanding; `false` if one already is
    pub fn begin_submission(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        true
    }

    pub fn finish_submission(&mut self) {
        self.submitting = false;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Back to a blank step-1 session after the record was created
    pub fn reset_after_create(&mut self) {
        self.state = WizardState::fresh(self.template.clone());
        self.errors = FieldErrors::new();
        self.dirty = false;
        self.last_population = None;
    }
}

fn renumber_phases(phases: &mut [Value]) {
    for (index, phase) in phases.iter_mut().enumerate() {
        if let Some(record) = phase.as_object_mut() {
            record.insert("stepNumber".to_string(), Value::from(index + 1));
        }
    }
}
