// ABOUTME: Behavioral tests for challenge-type phase auto-population
// Covers canonical defaults, the no-clobber rule, instant funding and edit hydration

use super::fixtures::{edit_wizard, new_wizard};
use firm_intake::wizard::{ChallengeType, PopulationOutcome};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn phases(wizard: &firm_intake::wizard::WizardController) -> Vec<Value> {
    wizard.entity().list("challenge", "phases").to_vec()
}

fn phase_count(wizard: &firm_intake::wizard::WizardController) -> Option<Value> {
    wizard.entity().get(Some("challenge"), "phaseCount").cloned()
}

#[test]
fn test_each_type_gets_its_canonical_phases() {
    for (tag, expected) in [("single-phase", 1), ("two-phase", 2), ("three-phase", 3)] {
        let mut wizard = new_wizard(None);
        let outcome = wizard.set_challenge_type(tag);

        assert_eq!(phases(&wizard).len(), expected, "{tag}");
        assert_eq!(phase_count(&wizard), Some(json!(expected)), "{tag}");
        assert!(matches!(outcome, PopulationOutcome::Applied { count, .. } if count == expected));
        assert_eq!(wizard.phase_count_mismatch(), None);
    }
}

#[test]
fn test_default_phases_are_numbered_from_one() {
    let mut wizard = new_wizard(None);
    wizard.set_challenge_type("three-phase");

    let numbers: Vec<Value> = phases(&wizard).iter().map(|p| p["stepNumber"].clone()).collect();
    assert_eq!(numbers, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(phases(&wizard)[0]["profitTarget"], json!(""));
}

#[test]
fn test_existing_phases_are_never_overwritten() {
    let mut wizard = new_wizard(None);
    wizard.set_challenge_type("two-phase");
    wizard.update_phase(0, "profitTarget", json!("8"));
    let before = phases(&wizard);

    let outcome = wizard.set_challenge_type("three-phase");

    assert_eq!(phases(&wizard), before, "User-entered phases must survive");
    assert_eq!(outcome, PopulationOutcome::Preserved { existing: 2, canonical: 3 });
    assert_eq!(phase_count(&wizard), Some(json!(3)));
    assert_eq!(wizard.phase_count_mismatch(), Some((2, 3)));
}

#[test]
fn test_instant_funding_clears_phases() {
    let mut wizard = new_wizard(None);
    wizard.set_challenge_type("two-phase");

    let outcome = wizard.set_challenge_type("instant");

    assert_eq!(outcome, PopulationOutcome::Cleared { removed: 2 });
    assert!(phases(&wizard).is_empty());
    assert_eq!(phase_count(&wizard), Some(json!(0)));

    // Choosing a phased type afterwards repopulates
    wizard.set_challenge_type("single-phase");
    assert_eq!(phases(&wizard).len(), 1);
}

#[test]
fn test_instant_on_fresh_draft_keeps_phase_count() {
    let mut wizard = new_wizard(None);
    assert!(wizard.set_field("phaseCount", json!(1)));

    let outcome = wizard.set_challenge_type("instant");

    assert_eq!(outcome, PopulationOutcome::Cleared { removed: 0 });
    assert!(phases(&wizard).is_empty());
    assert_eq!(phase_count(&wizard), Some(json!(1)));
}

#[test]
fn test_unknown_type_changes_nothing_but_the_tag() {
    let mut wizard = new_wizard(None);
    wizard.set_challenge_type("two-phase");
    let before = phases(&wizard);

    assert_eq!(wizard.set_challenge_type("four-phase"), PopulationOutcome::Skipped);
    assert_eq!(phases(&wizard), before);
    assert_eq!(phase_count(&wizard), Some(json!(2)));
    assert_eq!(
        wizard.entity().get(Some("challenge"), "challengeType"),
        Some(&json!("four-phase"))
    );
}

#[test]
fn test_set_field_on_challenge_type_runs_population() {
    let mut wizard = new_wizard(None);
    assert!(wizard.set_field("challengeType", json!("single-phase")));
    assert_eq!(phases(&wizard).len(), 1);
    assert!(matches!(
        wizard.last_population(),
        Some(PopulationOutcome::Applied { challenge_type: ChallengeType::SinglePhase, .. })
    ));
}

#[test]
fn test_manual_phase_edits_renumber_on_removal() {
    let mut wizard = new_wizard(None);
    wizard.set_challenge_type("three-phase");

    assert!(wizard.remove_phase(0));
    let numbers: Vec<Value> = phases(&wizard).iter().map(|p| p["stepNumber"].clone()).collect();
    assert_eq!(numbers, vec![json!(1), json!(2)]);

    assert_eq!(wizard.add_phase(), 3);
    assert!(!wizard.update_phase(0, "stepNumber", json!(9)), "stepNumber is not editable");
    assert!(!wizard.remove_phase(10));
}

#[test]
fn test_edit_session_keeps_stored_phases() {
    let wizard = edit_wizard(
        "firm-1",
        json!({
            "basicInfo": {"name": "Stored Firm"},
            "challenge": {
                "challengeType": "two-phase",
                "phaseCount": 2,
                "phases": [{"stepNumber": 1, "name": "Only one", "profitTarget": "9"}],
            },
        }),
    );

    assert!(wizard.is_edit_mode());
    assert_eq!(wizard.entity_id(), Some("firm-1"));
    assert_eq!(wizard.last_population(), Some(&PopulationOutcome::Skipped));
    assert_eq!(phases(&wizard).len(), 1);
    assert_eq!(wizard.phase_count_mismatch(), Some((1, 2)));
    assert!(!wizard.is_dirty());
}
