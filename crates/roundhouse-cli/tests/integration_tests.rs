//! End-to-end tests driving the `roundhouse` binary against a temp collection.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self::with_config("")
    }

    fn with_config(toml: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), toml).unwrap();
        Self { dir }
    }

    fn store(&self) -> PathBuf {
        self.dir.path().join("collection.json")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("roundhouse").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.dir.path().join("config.toml"))
            .arg("--store")
            .arg(self.store());
        cmd
    }

    /// Run with JSON output and parse stdout.
    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(["--output-format", "json"])
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).unwrap()
    }

    fn add_purchase(&self, manufacturer: &str, catalog_number: &str) -> Value {
        self.json(&["purchase", "add", manufacturer, catalog_number])
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

fn strings(values: &Value, key: &str) -> Vec<String> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v[key].as_str().unwrap().to_string())
        .collect()
}

fn indices(values: &Value) -> Vec<i64> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["index"].as_i64().unwrap())
        .collect()
}

fn is_strictly_increasing(keys: &[i64]) -> bool {
    keys.windows(2).all(|pair| pair[0] < pair[1])
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap()
}

// ── purchases and matching ───────────────────────────────────────────────────

#[test]
fn adding_a_purchase_writes_the_collection() {
    let ws = Workspace::new();
    assert!(!exists(&ws.store()));

    let added = ws.json(&[
        "purchase",
        "add",
        "Bachmann",
        "32-381A",
        "--date",
        "2019-05-04",
        "--condition",
        "new",
    ]);

    assert_eq!(added["purchase"]["catalog_number"], "32-381A");
    assert_eq!(added["similar"]["kind"], Value::Null);
    assert!(exists(&ws.store()));

    let listed = ws.json(&["purchase", "list"]);
    assert_eq!(strings(&listed, "catalog_number"), vec!["32-381A"]);
}

#[test]
fn prefix_matches_are_offered_when_nothing_is_exact() {
    let ws = Workspace::new();
    ws.add_purchase("Bachmann", "32-381A");
    ws.add_purchase("Bachmann", "32-382");
    ws.add_purchase("Hornby", "32-381");

    let added = ws.add_purchase("Bachmann", "32-381");

    assert_eq!(added["similar"]["kind"], "prefix");
    assert_eq!(
        strings(&added["similar"]["purchases"], "catalog_number"),
        vec!["32-381A", "32-382"]
    );
}

#[test]
fn exact_matches_replace_prefix_matches() {
    let ws = Workspace::new();
    ws.add_purchase("Bachmann", "32-381A");
    ws.add_purchase("Bachmann", "32-382");

    let similar = ws.json(&[
        "purchase",
        "similar",
        "--manufacturer",
        "Bachmann",
        "--catalog-number",
        "32-381A",
    ]);

    assert_eq!(similar["kind"], "exact");
    assert_eq!(strings(&similar["purchases"], "catalog_number"), vec!["32-381A"]);
}

#[test]
fn similar_by_id_excludes_the_purchase_itself() {
    let ws = Workspace::new();
    let first = ws.add_purchase("Dapol", "4D-022-001");
    ws.add_purchase("Dapol", "4D-022-002");

    let id = id_of(&first["purchase"]);
    let similar = ws.json(&["purchase", "similar", &id[..8]]);

    assert_eq!(similar["kind"], "prefix");
    assert_eq!(
        strings(&similar["purchases"], "catalog_number"),
        vec!["4D-022-002"]
    );
}

#[test]
fn catalog_numbers_without_digits_match_nothing() {
    let ws = Workspace::new();
    ws.add_purchase("Peco", "SL-E");

    let added = ws.add_purchase("Peco", "SL-E");
    assert_eq!(added["similar"]["kind"], Value::Null);
}

// ── models and ordering ──────────────────────────────────────────────────────

#[test]
fn models_keep_the_order_they_were_placed_in() {
    let ws = Workspace::new();
    let purchase = id_of(&ws.add_purchase("Hornby", "R3174")["purchase"]);

    for class in ["Mk1 BSK", "Mk1 SK"] {
        ws.cmd()
            .args(["model", "add", purchase.as_str(), "--class", class])
            .assert()
            .success();
    }
    ws.cmd()
        .args([
            "model", "add", purchase.as_str(), "--class", "Class 47", "--number", "47 401", "--position",
            "1",
        ])
        .assert()
        .success();

    let models = ws.json(&["model", "list", purchase.as_str()]);
    assert_eq!(
        strings(&models, "model_class"),
        vec!["Class 47", "Mk1 BSK", "Mk1 SK"]
    );
    assert!(is_strictly_increasing(&indices(&models)));
    assert_eq!(models[0]["position"], 1);
}

#[test]
fn moving_a_model_changes_only_its_position() {
    let ws = Workspace::new();
    let purchase = id_of(&ws.add_purchase("Hornby", "R3174")["purchase"]);
    for class in ["A", "B", "C"] {
        ws.cmd()
            .args(["model", "add", purchase.as_str(), "--class", class])
            .assert()
            .success();
    }
    let models = ws.json(&["model", "list", purchase.as_str()]);
    let c = id_of(&models[2]);

    ws.cmd()
        .args(["model", "move", purchase.as_str(), c.as_str(), "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("position 1"));

    let models = ws.json(&["model", "list", purchase.as_str()]);
    assert_eq!(strings(&models, "model_class"), vec!["C", "A", "B"]);
    assert!(is_strictly_increasing(&indices(&models)));
}

#[test]
fn a_small_baseline_renumbers_and_keeps_order() {
    let ws = Workspace::with_config("[ordering]\nbaseline = 4\n");
    let purchase = id_of(&ws.add_purchase("Lima", "205")["purchase"]);

    for class in ["E", "D", "C", "B", "A"] {
        ws.cmd()
            .args(["model", "add", purchase.as_str(), "--class", class, "--position", "1"])
            .assert()
            .success();
    }

    let models = ws.json(&["model", "list", purchase.as_str()]);
    assert_eq!(strings(&models, "model_class"), vec!["A", "B", "C", "D", "E"]);
    assert!(is_strictly_increasing(&indices(&models)));
}

#[test]
fn environment_overrides_the_config_file() {
    let ws = Workspace::with_config("[ordering]\nbaseline = 4\n");

    let value = ws
        .cmd()
        .env("ROUNDHOUSE__ORDERING__BASELINE", "32")
        .args(["config", "get", "ordering.baseline"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(value).unwrap().trim(), "32");
}

// ── trains ───────────────────────────────────────────────────────────────────

#[test]
fn train_members_can_be_reordered_and_flipped() {
    let ws = Workspace::new();
    let train = id_of(&ws.json(&["train", "create", "Night Riviera", "--number", "1C99"]));

    for (class, number) in [("Class 57", "57 602"), ("Mk3 SLEP", "10584"), ("Mk2 TSO", "6183")] {
        ws.cmd()
            .args(["train", "add-member", train.as_str(), class, number])
            .assert()
            .success();
    }
    let shown = ws.json(&["train", "show", train.as_str()]);
    let loco = id_of(&shown["members"][0]);

    ws.cmd()
        .args(["train", "move-member", train.as_str(), loco.as_str(), "3"])
        .assert()
        .success();
    ws.cmd()
        .args(["train", "flip-member", train.as_str(), loco.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("reversed"));

    let shown = ws.json(&["train", "show", train.as_str()]);
    assert_eq!(
        strings(&shown["members"], "number_or_name"),
        vec!["10584", "6183", "57 602"]
    );
    assert_eq!(shown["members"][2]["is_flipped"], true);
    assert!(is_strictly_increasing(&indices(&shown["members"])));
}

// ── decoders ─────────────────────────────────────────────────────────────────

#[test]
fn fitting_a_decoder_draws_down_spare_stock() {
    let ws = Workspace::new();
    let esu = id_of(&ws.json(&[
        "decoder",
        "add-type",
        "ESU",
        "58429",
        "--family",
        "LokSound 5",
        "--minimum-stock",
        "1",
    ]));
    let decoder = id_of(&ws.json(&["decoder", "add", esu.as_str(), "--address", "3"]));

    let stock = ws.json(&["decoder", "stock"]);
    assert_eq!(stock[0]["spare"], 1);
    assert_eq!(stock[0]["low"], false);

    let purchase = id_of(&ws.add_purchase("Heljan", "4670")["purchase"]);
    ws.cmd()
        .args(["model", "add", purchase.as_str(), "--class", "Class 47"])
        .assert()
        .success();
    let model = id_of(&ws.json(&["model", "list", purchase.as_str()])[0]);

    ws.cmd()
        .args(["decoder", "fit", decoder.as_str(), purchase.as_str(), model.as_str()])
        .assert()
        .success();

    let models = ws.json(&["model", "list", purchase.as_str()]);
    assert_eq!(models[0]["dispatch"], "dcc-fitted");

    let low = ws.json(&["decoder", "stock", "--low"]);
    assert_eq!(low[0]["spare"], 0);
    assert_eq!(low[0]["low"], true);

    let decoders = ws.json(&["decoder", "list"]);
    assert_eq!(decoders[0]["fitted"], true);
}

// ── misc commands ────────────────────────────────────────────────────────────

#[test]
fn init_writes_a_loadable_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("rh.toml");

    Command::cargo_bin("roundhouse")
        .unwrap()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("init")
        .assert()
        .success();
    assert!(exists(&config));

    Command::cargo_bin("roundhouse")
        .unwrap()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "ordering.baseline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("64"));
}

#[test]
fn completions_name_the_binary() {
    Command::cargo_bin("roundhouse")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("roundhouse"));
}

#[test]
fn help_lists_the_subcommands() {
    Command::cargo_bin("roundhouse")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("purchase"))
        .stdout(predicate::str::contains("decoder"));
}
