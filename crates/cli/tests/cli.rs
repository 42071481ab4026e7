//! Black-box tests of the `decor` binary against a temporary data directory.

use std::path::Path;
use std::process::{Command, Output};

struct Run {
    ok: bool,
    stdout: String,
    stderr: String,
}

fn decor(data: &Path, args: &[&str]) -> Run {
    let output: Output = Command::new(env!("CARGO_BIN_EXE_decor"))
        .env_remove("DECOR_DATA_DIR")
        .env_remove("DECOR_REPORT_DIR")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data.join("data"))
        .arg("--report-dir")
        .arg(data.join("reports"))
        .args(args)
        .output()
        .expect("failed to run decor");
    Run {
        ok: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

fn seed(dir: &Path, inventory: &str, deleted: &str) {
    let data = dir.join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("inventory.csv"), inventory).unwrap();
    std::fs::write(data.join("deleted_items.csv"), deleted).unwrap();
}

fn inventory_csv(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("data").join("inventory.csv")).unwrap_or_default()
}

fn deleted_csv(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("data").join("deleted_items.csv")).unwrap_or_default()
}

#[test]
fn create_then_list() {
    let dir = tempfile::tempdir().unwrap();

    let run = decor(dir.path(), &["create", "--name", "  Gold   Vase ", "--quantity", "5", "--type", "vases"]);
    assert!(run.ok, "{}", run.stderr);
    assert!(run.stdout.contains("Item Created Successfully!"));

    let csv = inventory_csv(dir.path());
    let fields: Vec<&str> = csv.trim_end().split(',').collect();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[0], "Gold Vase");
    assert_eq!(fields[1], "5");
    let number: u32 = fields[2].parse().unwrap();
    assert!((100..200).contains(&number));
    assert_eq!(fields[3], "Vases");

    let list = decor(dir.path(), &["list"]);
    assert!(list.ok);
    assert!(list.stdout.contains("Type: Vases"));
    assert!(list.stdout.contains("Gold Vase"));
}

#[test]
fn create_rejections_use_prompt_messages() {
    let dir = tempfile::tempdir().unwrap();

    let run = decor(dir.path(), &["create", "--name", "Gold, Vase", "--quantity", "5", "--type", "Vases"]);
    assert!(!run.ok);
    assert!(run.stderr.contains("Invalid characters in item name!"), "{}", run.stderr);

    let run = decor(dir.path(), &["create", "--name", "Gold Vase", "--quantity", "0", "--type", "Vases"]);
    assert!(!run.ok);
    assert!(run.stderr.contains("Quantity must be a positive number!"));

    let run = decor(dir.path(), &["create", "--name", "Gold Vase", "--quantity", "5", "--type", "Chairs"]);
    assert!(!run.ok);
    assert!(run.stderr.contains("Unknown item type"));
    assert_eq!(inventory_csv(dir.path()), "");
}

#[test]
fn update_reports_duplicates_and_no_change() {
    let dir = tempfile::tempdir().unwrap();
    seed(
        dir.path(),
        "Gold Vase,5,150,Vases,2024-06-15\nBud Vase,2,160,Vases,2024-06-15\n",
        "",
    );

    let dup = decor(dir.path(), &["update", "150", "--number", "160"]);
    assert!(!dup.ok);
    assert!(dup.stderr.contains("The entered item number already exists!"));

    let same = decor(dir.path(), &["update", "150", "--quantity", "5"]);
    assert!(same.ok);
    assert!(same.stdout.contains("No Change Detected"));

    let range = decor(dir.path(), &["update", "150", "--number", "250"]);
    assert!(!range.ok);
    assert!(range.stderr.contains("must be between 100 - 199"));

    let ok = decor(dir.path(), &["update", "150", "--name", "Grand Gold Vase"]);
    assert!(ok.ok);
    assert!(inventory_csv(dir.path()).starts_with("Grand Gold Vase,5,150,Vases,2024-06-15"));
}

#[test]
fn renaming_to_the_stored_name_is_no_change_even_outside_the_charset() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "Gold-Vase,5,150,Vases,2024-06-15\n", "");

    let same = decor(dir.path(), &["update", "150", "--name", "  Gold-Vase "]);
    assert!(same.ok, "{}", same.stderr);
    assert!(same.stdout.contains("No Change Detected: New item name matches the current item name."));

    let bad = decor(dir.path(), &["update", "150", "--name", "Gold-Vase 2"]);
    assert!(!bad.ok);
    assert!(bad.stderr.contains("Invalid characters in item name!"));
}

#[test]
fn delete_restore_and_purge_cycle() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "Gold Vase,5,150,Vases,2024-06-15\n", "");

    assert!(decor(dir.path(), &["delete", "150"]).ok);
    assert_eq!(inventory_csv(dir.path()), "");
    assert!(deleted_csv(dir.path()).contains("Gold Vase,5,150,Vases,2024-06-15"));

    let deleted = decor(dir.path(), &["deleted"]);
    assert!(deleted.stdout.contains("Deleted Items Report"));

    assert!(decor(dir.path(), &["restore", "150"]).ok);
    assert_eq!(inventory_csv(dir.path()).trim_end(), "Gold Vase,5,150,Vases,2024-06-15");
    assert_eq!(deleted_csv(dir.path()), "");

    assert!(decor(dir.path(), &["delete", "150"]).ok);
    assert!(decor(dir.path(), &["purge", "--all"]).ok);
    assert_eq!(deleted_csv(dir.path()), "");

    let again = decor(dir.path(), &["restore", "150"]);
    assert!(!again.ok);
    assert!(again.stderr.contains("No Items to Restore"));
}

#[test]
fn unknown_item_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "Gold Vase,5,150,Vases,2024-06-15\n", "");

    let run = decor(dir.path(), &["delete", "151"]);
    assert!(!run.ok);
    assert!(run.stderr.contains("Item number 151 does not exist"));
}

#[test]
fn report_is_saved_with_date_stamp() {
    let dir = tempfile::tempdir().unwrap();
    seed(
        dir.path(),
        "Gold Vase,5,150,Vases,2024-06-15\nIvy,40,305,Greeneries,2024-06-15\n",
        "",
    );

    let run = decor(dir.path(), &["report", "--sort", "quantity"]);
    assert!(run.ok, "{}", run.stderr);
    assert!(run.stdout.contains("Report generated and saved to:"));

    let reports: Vec<_> = std::fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("inventory_report_") && reports[0].ends_with(".txt"));

    let printed = decor(dir.path(), &["report", "--sort", "number", "--print"]);
    assert!(printed.stdout.starts_with("Inventory Report (Sorted by Item Number)"));
    assert!(printed.stdout.contains("June 15, 2024"));
}

#[test]
fn empty_inventory_has_no_report() {
    let dir = tempfile::tempdir().unwrap();
    let run = decor(dir.path(), &["report"]);
    assert!(!run.ok);
    assert!(run.stderr.contains("No items to generate report for!"));
}

#[test]
fn json_listing_serializes_records() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "Lace Runner,3,210,Table Runners,2024-06-15\n", "");

    let run = decor(dir.path(), &["--json", "list"]);
    assert!(run.ok);
    let value: serde_json::Value = serde_json::from_str(&run.stdout).unwrap();
    assert_eq!(value[0]["item_type"], "Table Runners");
    assert_eq!(value[0]["item_number"], 210);
    assert_eq!(value[0]["creation_date"], "2024-06-15");
}
