//! End-to-end modeling scenarios across sketches, parts and assemblies

use std::collections::{HashMap, HashSet};

use approx::assert_abs_diff_eq;
use glam::{DVec2, DVec3};

use pm_cad::{
    BooleanOp, Configuration, Constraint, Parameter, RecordingEngine, Sketch, evaluate_parameters,
};
use pm_core::{Assembly, Part, Transform};

fn bracket_part() -> Part {
    let mut part = Part::new("Bracket");
    part.create_extrude("Sketch1", 10.0, false, BooleanOp::New);
    part.create_hole(3.0, 10.0, true);
    part.create_fillet(1.0, vec!["e1".into()]);
    part
}

#[test]
fn test_identifiers_are_unique_per_container() {
    let mut sketch = Sketch::new("s");
    let mut ids = vec![
        sketch.add_point(DVec2::ZERO),
        sketch.add_line(DVec2::ZERO, DVec2::X),
        sketch.add_circle(DVec2::ZERO, 1.0),
        sketch.add_arc(DVec2::ZERO, 1.0, 0.0, 90.0),
        sketch.add_rectangle(DVec2::ZERO, 2.0, 1.0),
        sketch.add_ellipse(DVec2::ZERO, 2.0, 1.0),
        sketch.add_polygon(vec![DVec2::ZERO, DVec2::X, DVec2::Y]).unwrap(),
        sketch.add_spline(vec![DVec2::ZERO, DVec2::ONE]).unwrap(),
        sketch.add_text(DVec2::ZERO, "label"),
    ];
    let removed = ids.remove(3);
    sketch.remove_geometry(&removed).unwrap();
    ids.push(sketch.add_point(DVec2::ONE));
    ids.push(removed);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());

    let mut part = bracket_part();
    part.create_extrude("Sketch2", 5.0, false, BooleanOp::Join);
    part.create_pattern("Extrude1", [2, 1, 1], [5.0, 0.0, 0.0]);
    let names: HashSet<_> = part.features().iter().map(|f| f.name.clone()).collect();
    assert_eq!(names.len(), part.features().len());

    let mut assembly = Assembly::new("asm");
    let components: HashSet<_> = (0..5)
        .map(|_| assembly.add_component(&part, Transform::IDENTITY))
        .collect();
    assert_eq!(components.len(), 5);
}

#[test]
fn test_expression_chain() {
    let mut parameters = vec![
        Parameter::new("W", 10.0),
        Parameter::with_expression("H", "W"),
        Parameter::with_expression("A", "H*2"),
        Parameter::with_expression("B", "W+H+1"),
    ];
    let report = evaluate_parameters(&mut parameters);

    assert_eq!(parameters[1].value, 10.0);
    assert_eq!(parameters[2].value, 20.0);
    // only one operator per expression: "H+1" is not an operand
    assert!(!report.all_resolved());
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].name, "B");
    assert_eq!(parameters[3].value, 0.0);
}

#[test]
fn test_distance_constraint_and_idempotent_pass() {
    let mut sketch = Sketch::new("s");
    let a = sketch.add_line(DVec2::new(0.0, 0.0), DVec2::new(0.0, 4.0));
    let b = sketch.add_line(DVec2::new(10.0, 0.0), DVec2::new(10.0, 4.0));
    let c = sketch.add_point(DVec2::new(3.0, 7.0));
    let d = sketch.add_point(DVec2::new(-2.0, 1.0));

    sketch.add_constraint(Constraint::distance(&a, &b, 5.0));
    sketch.add_constraint(Constraint::horizontal(&a, &c));
    sketch.add_constraint(Constraint::vertical(&c, &d));
    sketch.add_constraint(Constraint::coincident(&b, &d));

    let report = sketch.solve();
    assert!(report.is_complete());
    assert_eq!(report.applied, 4);

    let start = sketch.find_geometry(&b).unwrap().start;
    assert_abs_diff_eq!(start.x, 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(start.y, 0.0, epsilon = 1e-12);

    let once = sketch.clone();
    sketch.solve();
    assert_eq!(sketch, once);
}

#[test]
fn test_rollback_ignores_later_suppression() {
    let mut part = bracket_part();
    part.set_rollback_position(Some(1));
    part.set_feature_suppressed("Fillet3", false).unwrap();

    let participating: Vec<_> = part.participating_features().map(|(i, _)| i).collect();
    assert_eq!(participating, vec![0, 1]);

    part.set_feature_suppressed("Fillet3", true).unwrap();
    let participating: Vec<_> = part.participating_features().map(|(i, _)| i).collect();
    assert_eq!(participating, vec![0, 1]);

    let mut engine = RecordingEngine::new();
    let report = part.rebuild(&mut engine, &HashMap::new());
    assert_eq!(engine.evaluated(), vec!["Extrude1", "Hole2"]);
    assert_eq!(report.skipped, vec!["Fillet3".to_string()]);
}

#[test]
fn test_configuration_feeds_rebuild() {
    let mut part = bracket_part();
    part.add_user_parameter(Parameter::new("Depth", 10.0));
    part.add_user_parameter(Parameter::with_expression("Half", "Depth/2"));
    part.evaluate_parameters();

    let long = part.add_configuration(Configuration::new("Long").with_override("Depth", 30.0));
    part.set_active_configuration(Some(long)).unwrap();

    let mut engine = RecordingEngine::new();
    part.rebuild(&mut engine, &HashMap::new());
    let parameters = &engine.calls()[0].parameters;
    assert_eq!(parameters["Depth"], 30.0);
    assert_eq!(parameters["Half"], 15.0);

    // the stored parameters keep their base values
    assert_eq!(part.find_parameter("Depth").unwrap().value, 10.0);
}

#[test]
fn test_dof_scenario() {
    let mut assembly = Assembly::new("asm");
    let part = Part::new("Block");
    let a = assembly.add_component(&part, Transform::IDENTITY);
    let b = assembly.add_component(&part, Transform::IDENTITY);

    assembly.create_mate(a, b, 0.0);
    assert_eq!(assembly.degrees_of_freedom(), 9);
    assembly.create_flush(a, b, 0.0);
    assert_eq!(assembly.degrees_of_freedom(), 8);
    assert!(!assembly.is_over_constrained());
    assembly.create_insert(a, b);
    assert!(assembly.is_over_constrained());
}

#[test]
fn test_components_are_never_removed() {
    let mut assembly = Assembly::new("asm");
    let part = bracket_part();
    let ids: Vec<_> = (0..4)
        .map(|i| {
            assembly.add_component(
                &part,
                Transform::from_translation(DVec3::new(i as f64, 0.0, 0.0)),
            )
        })
        .collect();

    assembly.create_mate(ids[0], ids[1], 1.0);
    let dangling = assembly.create_flush(ids[2], 42, 0.0);
    assembly.solve_mates();
    assembly.remove_mate(&dangling).unwrap();
    assembly.set_explosion_offset(ids[3], DVec3::Z).unwrap();
    assembly.clear_explosion_offsets();
    assert!(assembly.validate().is_ok());

    assert_eq!(assembly.components().len(), 4);
}

#[test]
fn test_mate_pass_places_chain() {
    let mut assembly = Assembly::new("asm");
    let part = Part::new("Link");
    let base = assembly.add_component(&part, Transform::from_translation(DVec3::new(1.0, 1.0, 1.0)));
    let mid = assembly.add_component(&part, Transform::IDENTITY);
    let tip = assembly.add_component(&part, Transform::from_translation(DVec3::new(0.0, 5.0, 5.0)));

    assembly.create_mate(base, mid, 2.0);
    assembly.create_flush(mid, tip, 1.0);

    let report = assembly.solve_mates();
    assert!(report.is_complete());
    assert_eq!(report.applied, 2);

    let mid_at = assembly.find_component(mid).unwrap().transform.translation;
    let tip_at = assembly.find_component(tip).unwrap().transform.translation;
    assert_abs_diff_eq!(mid_at.distance(DVec3::new(3.0, 1.0, 1.0)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(tip_at.distance(DVec3::new(4.0, 5.0, 5.0)), 0.0, epsilon = 1e-12);

    let once = assembly.clone();
    assembly.solve_mates();
    assert_eq!(assembly, once);
}

#[test]
fn test_assembly_round_trip_continues_numbering() {
    let mut assembly = Assembly::new("asm");
    let part = bracket_part();
    let a = assembly.add_component(&part, Transform::IDENTITY);
    let b = assembly.add_component(&part, Transform::from_translation(DVec3::Y));
    assembly.create_concentric(a, b, 0.0);

    let text = ron::ser::to_string_pretty(&assembly, ron::ser::PrettyConfig::default()).unwrap();
    let mut restored: Assembly = ron::from_str(&text).unwrap();
    assert_eq!(restored, assembly);

    let placed = &restored.find_component(b).unwrap().part;
    assert_eq!(placed.features().len(), 3);
    assert_eq!(restored.add_component(&part, Transform::IDENTITY), 3);
    assert_eq!(restored.create_flush(a, b, 0.0), "Flush_2");
}
