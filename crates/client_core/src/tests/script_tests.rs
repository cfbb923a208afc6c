use super::*;

fn ids(raw: &[&str]) -> Vec<Identifier> {
    raw.iter().map(|id| Identifier::from(*id)).collect()
}

fn lines_starting_with<'a>(script: &'a str, prefix: &str) -> Vec<&'a str> {
    script
        .lines()
        .filter(|line| line.starts_with(prefix))
        .collect()
}

#[test]
fn two_structure_script_is_idempotent_and_aligns_only_the_non_reference() {
    let generator = ScriptGenerator;
    let input = ids(&["1ABC", "2XYZ"]);
    let reference = Identifier::from("1ABC");

    let first = generator.generate(&input, &reference);
    let second = generator.generate(&input, &reference);
    assert_eq!(first, second);

    assert_eq!(lines_starting_with(&first, "fetch "), vec!["fetch 1ABC", "fetch 2XYZ"]);
    assert_eq!(
        lines_starting_with(&first, "show cartoon, "),
        vec!["show cartoon, 1ABC", "show cartoon, 2XYZ"]
    );
    assert_eq!(
        lines_starting_with(&first, "color "),
        vec!["color cyan, 1ABC", "color magenta, 2XYZ"]
    );
    assert_eq!(lines_starting_with(&first, "align "), vec!["align 2XYZ, 1ABC"]);
    assert!(first.ends_with(VIEW_SETUP));
}

#[test]
fn show_and_color_lines_are_paired_per_structure() {
    let script = ScriptGenerator.generate(&ids(&["A1", "B2", "C3"]), &Identifier::from("B2"));
    let lines: Vec<&str> = script.lines().collect();
    let show_at = lines
        .iter()
        .position(|line| *line == "show cartoon, C3")
        .expect("show line");
    assert_eq!(lines[show_at + 1], "color yellow, C3");
}

#[test]
fn ninth_structure_reuses_first_palette_color() {
    let input = ids(&["S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8", "S9"]);
    let script = ScriptGenerator.generate(&input, &input[0]);
    let colors = lines_starting_with(&script, "color ");
    assert_eq!(colors.len(), 9);
    assert_eq!(colors[0], "color cyan, S1");
    assert_eq!(colors[8], "color cyan, S9");
    assert_eq!(palette_color(8), palette_color(0));
}

#[test]
fn reference_in_the_middle_keeps_input_order_for_alignments() {
    let input = ids(&["1AAA", "2BBB", "3CCC"]);
    let script = ScriptGenerator.generate(&input, &Identifier::from("2BBB"));
    assert_eq!(
        lines_starting_with(&script, "align "),
        vec!["align 1AAA, 2BBB", "align 3CCC, 2BBB"]
    );
}

#[test]
fn identifiers_are_written_with_their_original_case() {
    let script = ScriptGenerator.generate(&ids(&["1abc", "1ABC"]), &Identifier::from("1ABC"));
    assert_eq!(lines_starting_with(&script, "align "), vec!["align 1abc, 1ABC"]);
}
