use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const OUTRE_TEXT: &str = "\
OUTRE
INVOICE #: SINV001234
INVOICE DATE: 01/15/2025
QTY SHIPPED
DESCRIPTION UNIT PRICE DISC PRICE EXT PRICE
10
BIG BEAUTIFUL HAIR CLIP-IN 18\"
CBRN- 2   JBLK- 0 (2)
18.00
17.00
85.00
4
QW WIG PERRY
1B- 4
30.00
25.00
100.00
SUBTOTAL 185.00
TOTAL US$ 185.00
";

#[allow(deprecated)]
fn invrecon(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("invrecon").expect("binary");
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home);
    cmd
}

#[test]
fn parse_outre_invoice_as_json() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("SINV001234.txt");
    fs::write(&input, OUTRE_TEXT).unwrap();

    let output = invrecon(temp.path())
        .arg("parse")
        .arg(&input)
        .output()
        .expect("command run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["vendor"], "OUTRE");
    assert_eq!(body["invoice_number"], "SINV001234");
    assert_eq!(body["line_items"].as_array().map(|a| a.len()), Some(3));
}

#[test]
fn parse_outre_invoice_as_csv() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("SINV001234.txt");
    fs::write(&input, OUTRE_TEXT).unwrap();

    invrecon(temp.path())
        .args(["parse", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("VENDOR,Invoice No,Invoice Date"))
        .stdout(predicate::str::contains("OUTRE,SINV001234,01/15/2025,185.00"));
}

#[test]
fn parse_with_catalog_fills_upc() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("SINV001234.txt");
    fs::write(&input, OUTRE_TEXT).unwrap();
    let catalog = temp.path().join("catalog.csv");
    fs::write(
        &catalog,
        "ITEM NUMBER,ITEM NAME,COLOR,BARCODE\nQW-PERRY-1B,QW WIG PERRY,1B,827298000017\n",
    )
    .unwrap();

    invrecon(temp.path())
        .args(["parse", "--format", "csv", "--catalog"])
        .arg(&catalog)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("QW-PERRY-1B,827298000017,QW WIG PERRY"));
}

#[test]
fn parse_unknown_vendor_fails() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("scan.txt");
    fs::write(&input, "ACME SUPPLY\n1 WIDGET 10.00\n").unwrap();

    invrecon(temp.path())
        .arg("parse")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not detect invoice vendor"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let temp = tempdir().unwrap();
    let inputs = temp.path().join("in");
    let out = temp.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("SINV001234.txt"), OUTRE_TEXT).unwrap();
    fs::write(inputs.join("scan.txt"), "ACME SUPPLY\n").unwrap();

    invrecon(temp.path())
        .arg("batch")
        .arg(format!("{}/*.txt", inputs.display()))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary written to"));

    assert!(out.join("SINV001234.json").exists());
    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,vendor"));
    assert!(summary.contains("SINV001234.txt,success,OUTRE,SINV001234"));
    assert!(summary.contains("scan.txt,error"));
}

#[test]
fn batch_stops_on_first_error() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("scan.txt"), "ACME SUPPLY\n").unwrap();

    invrecon(temp.path())
        .arg("batch")
        .arg(format!("{}/*.txt", temp.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn config_path_and_init() {
    let temp = tempdir().unwrap();

    invrecon(temp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));

    let config = temp.path().join("engine.json");
    invrecon(temp.path())
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();

    let body: Value = serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert!(body["matching"]["min_base_score"].is_number());
}

#[test]
fn config_set_then_get() {
    let temp = tempdir().unwrap();

    invrecon(temp.path())
        .args(["config", "set", "matching.min_base_score", "0.8"])
        .assert()
        .success();

    invrecon(temp.path())
        .args(["config", "get", "matching.min_base_score"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.8"));

    invrecon(temp.path())
        .args(["config", "set", "ocr.detection_threshold", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<section>.<field>"));
}
